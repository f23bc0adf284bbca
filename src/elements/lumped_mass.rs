//! Lumped (rigid-body) masses attached to structural nodes

use serde::{Deserialize, Serialize};

use crate::math::{skew, Mat3, Mat6, Vec3};

/// A point mass with rotary inertia, offset from its node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LumpedMass {
    /// Global node the mass is attached to
    pub node: usize,
    /// Mass
    pub mass: f64,
    /// Inertia tensor about the mass's own centre, row-major
    #[serde(default)]
    pub inertia: [[f64; 3]; 3],
    /// Offset of the mass from the node, in the node's local frame
    #[serde(default)]
    pub position: [f64; 3],
}

impl LumpedMass {
    /// Point mass with no rotary inertia and no offset
    pub fn point(node: usize, mass: f64) -> Self {
        Self {
            node,
            mass,
            inertia: [[0.0; 3]; 3],
            position: [0.0; 3],
        }
    }

    /// Set the inertia tensor
    pub fn with_inertia(mut self, inertia: [[f64; 3]; 3]) -> Self {
        self.inertia = inertia;
        self
    }

    /// Set the offset from the node
    pub fn with_position(mut self, position: [f64; 3]) -> Self {
        self.position = position;
        self
    }

    /// Same mass re-attached to another node
    pub fn moved_to(&self, node: usize) -> Self {
        Self {
            node,
            ..self.clone()
        }
    }

    /// 6x6 rigid-body inertia block referred to the node
    ///
    /// ```text
    /// [ m*I          -m*skew(r)                  ]
    /// [ m*skew(r)    J + m*skew(r)^T * skew(r)   ]
    /// ```
    pub fn inertia_tensor(&self) -> Mat6 {
        let m = self.mass;
        let r_skew = skew(&Vec3::from(self.position));
        let j = Mat3::from_fn(|i, k| self.inertia[i][k]);

        let mut tensor = Mat6::zeros();
        tensor
            .fixed_view_mut::<3, 3>(0, 0)
            .copy_from(&(m * Mat3::identity()));
        tensor.fixed_view_mut::<3, 3>(0, 3).copy_from(&(-m * r_skew));
        tensor.fixed_view_mut::<3, 3>(3, 0).copy_from(&(m * r_skew));
        tensor
            .fixed_view_mut::<3, 3>(3, 3)
            .copy_from(&(j + m * r_skew.transpose() * r_skew));
        tensor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_point_mass_block() {
        let block = LumpedMass::point(0, 3.0).inertia_tensor();
        let mut expected = Mat6::zeros();
        expected.fixed_view_mut::<3, 3>(0, 0).copy_from(&(3.0 * Mat3::identity()));
        assert_relative_eq!(block, expected);
    }

    #[test]
    fn test_offset_mass_parallel_axis() {
        // 2 kg at r = (0, 1, 0): rotational block picks up m * (|r|^2 I - r r^T)
        let block = LumpedMass::point(4, 2.0)
            .with_position([0.0, 1.0, 0.0])
            .inertia_tensor();
        assert_relative_eq!(block[(3, 3)], 2.0);
        assert_relative_eq!(block[(4, 4)], 0.0);
        assert_relative_eq!(block[(5, 5)], 2.0);
        // coupling blocks are antisymmetric images of each other
        let upper = block.fixed_view::<3, 3>(0, 3).into_owned();
        let lower = block.fixed_view::<3, 3>(3, 0).into_owned();
        assert_relative_eq!(upper, lower.transpose());
    }

    #[test]
    fn test_block_is_symmetric() {
        let block = LumpedMass::point(1, 5.0)
            .with_position([0.3, -0.2, 0.7])
            .with_inertia([[1.0, 0.1, 0.0], [0.1, 2.0, 0.0], [0.0, 0.0, 3.0]])
            .inertia_tensor();
        assert_relative_eq!(block, block.transpose(), epsilon = 1e-12);
    }
}
