//! Sectional stiffness and mass databases

use serde::{Deserialize, Serialize};

use crate::error::{AeroelasticError, AeroelasticResult};
use crate::math::Mat6;

/// Row-major 6x6 matrix as it appears in input files
pub type Matrix6Rows = [[f64; 6]; 6];

/// Convert a row-major 6x6 array into a matrix
pub fn mat6_from_rows(rows: &Matrix6Rows) -> Mat6 {
    Mat6::from_fn(|i, j| rows[i][j])
}

/// Stiffness and mass tables shared by all elements
///
/// Elements reference entries by index. Stiffness inverses are computed
/// once here and reused by every export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyTables {
    stiffness: Vec<Mat6>,
    inv_stiffness: Vec<Mat6>,
    mass: Vec<Mat6>,
}

impl PropertyTables {
    /// Build the tables, inverting every stiffness matrix
    pub fn new(stiffness: Vec<Mat6>, mass: Vec<Mat6>) -> AeroelasticResult<Self> {
        let inv_stiffness = stiffness
            .iter()
            .enumerate()
            .map(|(i, k)| k.try_inverse().ok_or(AeroelasticError::SingularStiffness(i)))
            .collect::<AeroelasticResult<Vec<_>>>()?;

        Ok(Self {
            stiffness,
            inv_stiffness,
            mass,
        })
    }

    /// Build from row-major input arrays
    pub fn from_rows(stiffness: &[Matrix6Rows], mass: &[Matrix6Rows]) -> AeroelasticResult<Self> {
        Self::new(
            stiffness.iter().map(mat6_from_rows).collect(),
            mass.iter().map(mat6_from_rows).collect(),
        )
    }

    pub fn n_stiff(&self) -> usize {
        self.stiffness.len()
    }

    pub fn n_mass(&self) -> usize {
        self.mass.len()
    }

    pub fn stiffness(&self) -> &[Mat6] {
        &self.stiffness
    }

    pub fn inv_stiffness(&self) -> &[Mat6] {
        &self.inv_stiffness
    }

    pub fn mass(&self) -> &[Mat6] {
        &self.mass
    }

    /// Check that an element's table indices exist
    pub fn check_indices(&self, stiffness_index: usize, mass_index: usize) -> AeroelasticResult<()> {
        if stiffness_index >= self.n_stiff() {
            return Err(AeroelasticError::IndexOutOfRange {
                what: "stiffness table",
                index: stiffness_index,
                len: self.n_stiff(),
            });
        }
        if mass_index >= self.n_mass() {
            return Err(AeroelasticError::IndexOutOfRange {
                what: "mass table",
                index: mass_index,
                len: self.n_mass(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_inverse_is_cached() {
        let k = Mat6::from_diagonal(&crate::math::Vec6::new(1e6, 2e5, 2e5, 1e3, 4e3, 8e3));
        let tables = PropertyTables::new(vec![k], vec![Mat6::identity()]).unwrap();
        assert_relative_eq!(tables.inv_stiffness()[0] * k, Mat6::identity(), epsilon = 1e-12);
        assert_eq!(tables.n_mass(), 1);
    }

    #[test]
    fn test_singular_stiffness_rejected() {
        let err = PropertyTables::new(vec![Mat6::identity(), Mat6::zeros()], vec![]).unwrap_err();
        assert!(matches!(err, AeroelasticError::SingularStiffness(1)));
    }

    #[test]
    fn test_index_check() {
        let tables = PropertyTables::new(vec![Mat6::identity()], vec![Mat6::identity()]).unwrap();
        assert!(tables.check_indices(0, 0).is_ok());
        assert!(tables.check_indices(1, 0).is_err());
        assert!(tables.check_indices(0, 3).is_err());
    }
}
