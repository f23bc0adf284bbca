//! Result types for coupled runs

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::Vec3;
use crate::state::TimestepState;

/// Total applied force and moment on the structure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resultants {
    /// Sum of nodal forces
    pub force: Vec3,
    /// Sum of nodal moments plus the moments of nodal forces about the body-frame origin
    pub moment: Vec3,
}

impl Resultants {
    /// Resultants of the steady and unsteady applied loads of a state
    pub fn from_state(state: &TimestepState) -> Self {
        let mut force = Vec3::zeros();
        let mut moment = Vec3::zeros();
        let loads = state
            .steady_applied_forces
            .iter()
            .zip(&state.unsteady_applied_forces);

        for ((steady, unsteady), pos) in loads.zip(&state.pos) {
            let load = steady + unsteady;
            let f = load.fixed_rows::<3>(0).into_owned();
            let m = load.fixed_rows::<3>(3).into_owned();
            force += f;
            moment += m + pos.cross(&f);
        }

        Self { force, moment }
    }

    pub fn as_array(&self) -> [f64; 6] {
        [
            self.force.x,
            self.force.y,
            self.force.z,
            self.moment.x,
            self.moment.y,
            self.moment.z,
        ]
    }
}

impl fmt::Display for Resultants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "F = [{:.4e}, {:.4e}, {:.4e}], M = [{:.4e}, {:.4e}, {:.4e}]",
            self.force.x, self.force.y, self.force.z, self.moment.x, self.moment.y, self.moment.z
        )
    }
}

/// How one load step ended
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadStepOutcome {
    pub step: usize,
    pub multiplier: f64,
    /// Iterations run, including the converged one
    pub iterations: usize,
    pub converged: bool,
    /// Last scaled residual change, if more than one iteration ran
    pub residual: Option<f64>,
}

/// Summary of a staggered coupling run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouplingSummary {
    pub steps: Vec<LoadStepOutcome>,
    pub resultants: Resultants,
}

impl CouplingSummary {
    /// Whether every load step converged
    pub fn converged(&self) -> bool {
        self.steps.iter().all(|s| s.converged)
    }

    pub fn total_iterations(&self) -> usize {
        self.steps.iter().map(|s| s.iterations).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec6;
    use approx::assert_relative_eq;

    #[test]
    fn test_resultants_about_origin() {
        let mut state = TimestepState::new(2, 1, 2, 6, 1);
        state.pos[1] = Vec3::new(0.0, 2.0, 0.0);
        state.steady_applied_forces[1] = Vec6::new(0.0, 0.0, 5.0, 0.0, 0.0, 0.0);
        state.unsteady_applied_forces[1] = Vec6::new(0.0, 0.0, 1.0, 0.5, 0.0, 0.0);

        let r = Resultants::from_state(&state);
        assert_relative_eq!(r.force, Vec3::new(0.0, 0.0, 6.0));
        // 0.5 applied plus y * Fz = 12
        assert_relative_eq!(r.moment, Vec3::new(12.5, 0.0, 0.0));
        assert_eq!(r.as_array()[3], 12.5);
    }

    #[test]
    fn test_summary_convergence() {
        let step = |converged| LoadStepOutcome {
            step: 0,
            multiplier: 1.0,
            iterations: 3,
            converged,
            residual: None,
        };
        let summary = CouplingSummary {
            steps: vec![step(true), step(false)],
            resultants: Resultants {
                force: Vec3::zeros(),
                moment: Vec3::zeros(),
            },
        };
        assert!(!summary.converged());
        assert_eq!(summary.total_iterations(), 6);
    }
}
