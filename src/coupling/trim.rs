//! Trim changes: body attitude, thrust and control-surface deflection

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{AeroelasticError, AeroelasticResult};
use crate::math::{self, Vec3, Vec6};

/// A new trim point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrimChange {
    /// Angle of attack, as pitch of the body frame (radians)
    pub alpha: f64,
    /// Thrust magnitude applied at every thrust node
    pub thrust: f64,
    pub thrust_nodes: Vec<usize>,
    /// Control-surface deflection (radians)
    pub deflection: f64,
    /// Index of the deflected control surface
    pub control_surface: usize,
}

impl TrimChange {
    pub fn new(alpha: f64, thrust: f64, thrust_nodes: Vec<usize>) -> Self {
        Self {
            alpha,
            thrust,
            thrust_nodes,
            deflection: 0.0,
            control_surface: 0,
        }
    }

    pub fn with_deflection(mut self, control_surface: usize, deflection: f64) -> Self {
        self.control_surface = control_surface;
        self.deflection = deflection;
        self
    }
}

/// Unit thrust direction of each thrust node
///
/// A node's direction is taken from the reference applied force the first
/// time the node is used for thrust and never recaptured, so later trims
/// that zero or reverse the force keep the original direction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThrustDirections {
    directions: BTreeMap<usize, Vec3>,
}

impl ThrustDirections {
    /// Record the direction of every node in `nodes` that has none yet
    ///
    /// All new nodes are checked before any is recorded, so a failed call
    /// leaves the cache unchanged.
    pub fn capture(&mut self, forces: &[Vec6], nodes: &[usize]) -> AeroelasticResult<()> {
        let mut captured = Vec::new();
        for &node in nodes {
            if self.directions.contains_key(&node) || captured.iter().any(|&(n, _)| n == node) {
                continue;
            }
            let force = forces.get(node).ok_or(AeroelasticError::IndexOutOfRange {
                what: "thrust node",
                index: node,
                len: forces.len(),
            })?;
            let direction = math::unit_vector(&force.fixed_rows::<3>(0).into_owned()).ok_or_else(|| {
                AeroelasticError::PreconditionViolation(format!(
                    "thrust node {node} has no applied force to take a direction from"
                ))
            })?;
            captured.push((node, direction));
        }
        self.directions.extend(captured);
        Ok(())
    }

    /// Cached direction of `node`
    pub fn direction(&self, node: usize) -> Option<Vec3> {
        self.directions.get(&node).copied()
    }

    pub fn len(&self) -> usize {
        self.directions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }

    /// Write `thrust` along the cached direction of each of `nodes` into `forces`
    pub fn apply(&self, thrust: f64, nodes: &[usize], forces: &mut [Vec6]) -> AeroelasticResult<()> {
        for &node in nodes {
            let direction = self.direction(node).ok_or_else(|| {
                AeroelasticError::PreconditionViolation(format!(
                    "thrust node {node} has no captured direction"
                ))
            })?;
            let len = forces.len();
            let force = forces.get_mut(node).ok_or(AeroelasticError::IndexOutOfRange {
                what: "thrust node",
                index: node,
                len,
            })?;
            force.fixed_rows_mut::<3>(0).copy_from(&(direction * thrust));
        }
        Ok(())
    }
}

/// Body orientation for an angle of attack
pub fn attitude(alpha: f64) -> math::Quat {
    math::euler2quat(&Vec3::new(0.0, alpha, 0.0))
}
