//! Staggered coupling options

use serde::{Deserialize, Serialize};

use crate::error::{AeroelasticError, AeroelasticResult};

/// Options for the staggered fluid-structure coupling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CouplingOptions {
    /// Maximum fixed-point iterations per load step
    pub max_iter: usize,
    /// Number of load steps; 0 runs a single step at full load
    pub n_load_steps: usize,
    /// Convergence tolerance on the relative change of the position norm
    pub tolerance: f64,
    /// Under-relaxation factor for transferred forces, in `[0, 1)`
    pub relaxation_factor: f64,
    /// Log progress per load step and iteration
    pub print_info: bool,
    /// Gravity handed to the structural kernel during coupled iterations
    pub gravity: f64,
}

impl Default for CouplingOptions {
    fn default() -> Self {
        Self {
            max_iter: 100,
            n_load_steps: 1,
            tolerance: 1e-5,
            relaxation_factor: 0.0,
            print_info: true,
            gravity: 0.0,
        }
    }
}

impl CouplingOptions {
    /// Set maximum iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_load_steps(mut self, n_load_steps: usize) -> Self {
        self.n_load_steps = n_load_steps;
        self
    }

    /// Set convergence tolerance
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_relaxation(mut self, factor: f64) -> Self {
        self.relaxation_factor = factor;
        self
    }

    pub fn with_gravity(mut self, gravity: f64) -> Self {
        self.gravity = gravity;
        self
    }

    /// Disable progress output
    pub fn quiet(mut self) -> Self {
        self.print_info = false;
        self
    }

    /// Load multiplier of each step, `(i + 1) / N`, or a single 1.0 for N = 0
    pub fn load_multipliers(&self) -> Vec<f64> {
        if self.n_load_steps == 0 {
            return vec![1.0];
        }
        let n = self.n_load_steps as f64;
        (0..self.n_load_steps).map(|i| (i as f64 + 1.0) / n).collect()
    }

    pub fn validate(&self) -> AeroelasticResult<()> {
        if !(0.0..1.0).contains(&self.relaxation_factor) {
            return Err(AeroelasticError::Configuration(format!(
                "relaxation factor must lie in [0, 1), got {}",
                self.relaxation_factor
            )));
        }
        if self.tolerance.is_nan() || self.tolerance <= 0.0 {
            return Err(AeroelasticError::Configuration(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_iter == 0 {
            return Err(AeroelasticError::Configuration(
                "max_iter must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let opts: CouplingOptions = serde_json::from_str(r#"{"tolerance": 1e-3}"#).unwrap();
        assert_eq!(opts.max_iter, 100);
        assert_eq!(opts.n_load_steps, 1);
        assert_relative_eq!(opts.tolerance, 1e-3);
        assert_relative_eq!(opts.relaxation_factor, 0.0);
        assert!(opts.print_info);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_load_multipliers() {
        let opts = CouplingOptions::default().with_load_steps(4);
        assert_eq!(opts.load_multipliers(), vec![0.25, 0.5, 0.75, 1.0]);
        let single = CouplingOptions::default().with_load_steps(0);
        assert_eq!(single.load_multipliers(), vec![1.0]);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(CouplingOptions::default().with_relaxation(1.0).validate().is_err());
        assert!(CouplingOptions::default().with_relaxation(-0.1).validate().is_err());
        assert!(CouplingOptions::default().with_tolerance(0.0).validate().is_err());
        assert!(CouplingOptions::default().with_tolerance(f64::NAN).validate().is_err());
        assert!(CouplingOptions::default().with_max_iter(0).validate().is_err());
        assert!(CouplingOptions::default().with_relaxation(0.5).validate().is_ok());
    }
}
