//! Structural state at one time index and the history of such states

use serde::{Deserialize, Serialize};

use crate::elements::MAX_NODES_ELEM;
use crate::math::{DVec, Mat3, Quat, Vec3, Vec6};
use crate::multibody::BodyRange;

/// Extra generalized coordinates after the structural DOFs:
/// 6 body-frame velocities and 4 quaternion components
pub const RIGID_BODY_COORDS: usize = 10;

/// Snapshot of the structure at one time index
///
/// Rotations are stored per (element, local node), not per node: nodes shared
/// by several elements carry one rotation vector per element until the
/// master/slave propagation makes them consistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestepState {
    pub num_node: usize,
    pub num_elem: usize,
    pub num_node_elem: usize,

    /// Node positions in the body (A) frame
    pub pos: Vec<Vec3>,
    pub pos_dot: Vec<Vec3>,
    /// Rotation vectors by element and local node
    pub psi: Vec<[Vec3; MAX_NODES_ELEM]>,
    pub psi_dot: Vec<[Vec3; MAX_NODES_ELEM]>,

    /// Body-frame position and Euler angles in the inertial (G) frame
    pub for_pos: Vec6,
    pub for_vel: Vec6,
    pub for_acc: Vec6,
    /// Orientation of the body frame relative to the inertial frame
    pub quat: Quat,

    pub steady_applied_forces: Vec<Vec6>,
    pub unsteady_applied_forces: Vec<Vec6>,

    /// Generalized coordinates and their rates, filled by the kernel's finalizer
    pub q: DVec,
    pub dqdt: DVec,

    /// Per-body frame-of-reference kinematics
    pub mb_for_pos: Vec<Vec6>,
    pub mb_for_vel: Vec<Vec6>,
    pub mb_for_acc: Vec<Vec6>,
    pub mb_quat: Vec<Quat>,
}

impl TimestepState {
    /// Zero state sized for a model
    pub fn new(
        num_node: usize,
        num_elem: usize,
        num_node_elem: usize,
        num_dof: usize,
        num_bodies: usize,
    ) -> Self {
        Self {
            num_node,
            num_elem,
            num_node_elem,
            pos: vec![Vec3::zeros(); num_node],
            pos_dot: vec![Vec3::zeros(); num_node],
            psi: vec![[Vec3::zeros(); MAX_NODES_ELEM]; num_elem],
            psi_dot: vec![[Vec3::zeros(); MAX_NODES_ELEM]; num_elem],
            for_pos: Vec6::zeros(),
            for_vel: Vec6::zeros(),
            for_acc: Vec6::zeros(),
            quat: Quat::identity(),
            steady_applied_forces: vec![Vec6::zeros(); num_node],
            unsteady_applied_forces: vec![Vec6::zeros(); num_node],
            q: DVec::zeros(num_dof + RIGID_BODY_COORDS),
            dqdt: DVec::zeros(num_dof + RIGID_BODY_COORDS),
            mb_for_pos: vec![Vec6::zeros(); num_bodies],
            mb_for_vel: vec![Vec6::zeros(); num_bodies],
            mb_for_acc: vec![Vec6::zeros(); num_bodies],
            mb_quat: vec![Quat::identity(); num_bodies],
        }
    }

    /// Rotation from the body (A) frame to the inertial (G) frame
    pub fn cga(&self) -> Mat3 {
        self.quat.to_rotation_matrix().into_inner()
    }

    /// Rotation from the inertial (G) frame to the body (A) frame
    pub fn cag(&self) -> Mat3 {
        self.cga().transpose()
    }

    /// Zero the generalized coordinates, sized for `num_dof` structural DOFs
    pub fn reset_coordinates(&mut self, num_dof: usize) {
        self.q = DVec::zeros(num_dof + RIGID_BODY_COORDS);
        self.dqdt = DVec::zeros(num_dof + RIGID_BODY_COORDS);
    }

    /// Frobenius norm of all node positions
    pub fn position_norm(&self) -> f64 {
        self.pos.iter().map(|p| p.norm_squared()).sum::<f64>().sqrt()
    }

    /// State of one body of a multibody system
    ///
    /// Node and element data are sliced to the body's ranges; the body-frame
    /// kinematics come from the body's `mb_*` entries.
    pub fn body(&self, range: &BodyRange, num_dof: usize, ibody: usize) -> Self {
        let nodes = range.first_node..range.last_node;
        let elems = range.first_elem..range.last_elem;

        Self {
            num_node: range.num_node(),
            num_elem: range.num_elem(),
            num_node_elem: self.num_node_elem,
            pos: self.pos[nodes.clone()].to_vec(),
            pos_dot: self.pos_dot[nodes.clone()].to_vec(),
            psi: self.psi[elems.clone()].to_vec(),
            psi_dot: self.psi_dot[elems].to_vec(),
            for_pos: self.mb_for_pos[ibody],
            for_vel: self.mb_for_vel[ibody],
            for_acc: self.mb_for_acc[ibody],
            quat: self.mb_quat[ibody],
            steady_applied_forces: self.steady_applied_forces[nodes.clone()].to_vec(),
            unsteady_applied_forces: self.unsteady_applied_forces[nodes].to_vec(),
            q: DVec::zeros(num_dof + RIGID_BODY_COORDS),
            dqdt: DVec::zeros(num_dof + RIGID_BODY_COORDS),
            mb_for_pos: vec![self.mb_for_pos[ibody]],
            mb_for_vel: vec![self.mb_for_vel[ibody]],
            mb_for_acc: vec![self.mb_for_acc[ibody]],
            mb_quat: vec![self.mb_quat[ibody]],
        }
    }
}

/// Time history of structural states
///
/// Never empty. Slot 0 is the oldest retained state and the last slot is the
/// working state. States are only appended (as copies of the latest),
/// collapsed onto slot 0, or reset to a given state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimestepHistory {
    slots: Vec<TimestepState>,
}

impl TimestepHistory {
    pub fn new(first: TimestepState) -> Self {
        Self { slots: vec![first] }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Index of the working state
    pub fn ts(&self) -> usize {
        self.slots.len() - 1
    }

    pub fn get(&self, ts: usize) -> Option<&TimestepState> {
        self.slots.get(ts)
    }

    pub fn get_mut(&mut self, ts: usize) -> Option<&mut TimestepState> {
        self.slots.get_mut(ts)
    }

    pub fn first(&self) -> &TimestepState {
        &self.slots[0]
    }

    pub fn latest(&self) -> &TimestepState {
        &self.slots[self.slots.len() - 1]
    }

    pub fn latest_mut(&mut self) -> &mut TimestepState {
        let last = self.slots.len() - 1;
        &mut self.slots[last]
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimestepState> {
        self.slots.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TimestepState> {
        self.slots.iter_mut()
    }

    /// Append a deep copy of the latest state and return it
    pub fn push_next(&mut self) -> &mut TimestepState {
        let next = self.latest().clone();
        self.slots.push(next);
        self.latest_mut()
    }

    /// Keep only the latest state, moved into slot 0
    pub fn collapse(&mut self) {
        let last = self.slots.len() - 1;
        if last > 0 {
            self.slots.swap(0, last);
            self.slots.truncate(1);
        }
    }

    /// Discard everything and restart from `state`
    pub fn reset(&mut self, state: TimestepState) {
        self.slots.clear();
        self.slots.push(state);
    }
}
