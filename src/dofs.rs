//! Degree-of-freedom numbering from nodal boundary conditions

use serde::{Deserialize, Serialize};

use crate::elements::BoundaryCondition;

/// Unknowns per structural node
pub const DOFS_PER_NODE: usize = 6;

/// Position and force DOF numbers of every node
///
/// The two numberings are independent: a node gets a position number iff it
/// is `Internal` or `FreeEnd`, and a force number iff it is `Internal` or
/// `Clamped`. Numbers are assigned in node order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DofNumbering {
    vdof: Vec<Option<usize>>,
    fdof: Vec<Option<usize>>,
    num_dof: usize,
}

impl DofNumbering {
    pub fn from_boundary_conditions(boundary_conditions: &[BoundaryCondition]) -> Self {
        let mut vdof = vec![None; boundary_conditions.len()];
        let mut fdof = vec![None; boundary_conditions.len()];
        let mut vcounter = 0;
        let mut fcounter = 0;

        for (inode, bc) in boundary_conditions.iter().enumerate() {
            if bc.has_position_dof() {
                vdof[inode] = Some(vcounter);
                vcounter += 1;
            }
            if bc.has_force_dof() {
                fdof[inode] = Some(fcounter);
                fcounter += 1;
            }
        }

        Self {
            vdof,
            fdof,
            num_dof: DOFS_PER_NODE * vcounter,
        }
    }

    /// Position DOF number of each node
    pub fn vdof(&self) -> &[Option<usize>] {
        &self.vdof
    }

    /// Force DOF number of each node
    pub fn fdof(&self) -> &[Option<usize>] {
        &self.fdof
    }

    /// Total number of structural unknowns (6 per position-DOF node)
    pub fn num_dof(&self) -> usize {
        self.num_dof
    }

    /// Number of nodes with a force DOF
    pub fn num_force_nodes(&self) -> usize {
        self.fdof.iter().flatten().count()
    }
}
