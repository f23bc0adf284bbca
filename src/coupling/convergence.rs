//! Fixed-point convergence test on the norm of nodal positions

use log::debug;

/// Tracks the position-norm residual across the iterations of one load step
#[derive(Debug, Clone)]
pub struct ResidualMonitor {
    tolerance: f64,
    initial: f64,
    previous: f64,
    last_change: Option<f64>,
}

impl ResidualMonitor {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            initial: 0.0,
            previous: 0.0,
            last_change: None,
        }
    }

    /// Feed the residual of iteration `iteration` and report convergence
    ///
    /// Iteration 0 only records the initial residual. Afterwards the change
    /// against the last unconverged residual is scaled by the initial
    /// residual, or taken as is when the initial residual is zero.
    pub fn check(&mut self, iteration: usize, residual: f64) -> bool {
        if iteration == 0 {
            self.initial = residual;
            self.previous = residual;
            self.last_change = None;
            return false;
        }

        let change = (residual - self.previous).abs();
        let scaled = if self.initial < f64::EPSILON {
            change
        } else {
            change / self.initial
        };
        self.last_change = Some(scaled);
        debug!("iteration {iteration}: residual {residual:e}, change {scaled:e}");

        if scaled < self.tolerance {
            true
        } else {
            self.previous = residual;
            false
        }
    }

    pub fn initial(&self) -> f64 {
        self.initial
    }

    /// Scaled change computed by the last `check`, if any
    pub fn last_change(&self) -> Option<f64> {
        self.last_change
    }
}
