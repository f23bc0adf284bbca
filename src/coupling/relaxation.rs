//! Under-relaxation of transferred nodal forces

use crate::math::Vec6;

/// `f = (1 - a) * f_new + a * f_prev`, where `f_prev` is the last relaxed force
#[derive(Debug, Clone)]
pub struct ForceRelaxation {
    factor: f64,
    previous: Vec<Vec6>,
}

impl ForceRelaxation {
    pub fn new(factor: f64) -> Self {
        Self {
            factor,
            previous: Vec::new(),
        }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Forget the relaxation history; the next force is relaxed against zero
    pub fn reset(&mut self, num_node: usize) {
        self.previous = vec![Vec6::zeros(); num_node];
    }

    /// Relax `forces` in place and remember the result
    pub fn apply(&mut self, forces: &mut [Vec6]) {
        if self.factor == 0.0 {
            return;
        }
        if self.previous.len() != forces.len() {
            self.reset(forces.len());
        }
        let a = self.factor;
        for (force, previous) in forces.iter_mut().zip(self.previous.iter_mut()) {
            *force = (1.0 - a) * *force + a * *previous;
            *previous = *force;
        }
    }
}
