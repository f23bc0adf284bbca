//! Beam finite element - connectivity, material indices and initial orientation

use serde::Serialize;

use crate::error::{AeroelasticError, AeroelasticResult};
use crate::math::{self, Mat6, Vec3};

/// Largest number of nodes an element may have
pub const MAX_NODES_ELEM: usize = 3;

/// Material indices that are bound to an element after construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ElementAttributes {
    pub stiffness_index: usize,
    pub mass_index: usize,
}

/// A 2- or 3-noded beam element
///
/// Local node 0 and 1 are the element ends; local node 2 (if present) is the
/// mid node. The element is treated as straight between its end nodes.
#[derive(Debug, Clone, Serialize)]
pub struct Element {
    /// Position of the element in the model
    pub index: usize,
    /// Number of nodes (2 or 3)
    pub n_nodes: usize,
    /// Global node ids, by local node
    pub global_nodes: Vec<usize>,
    /// Reference coordinates of the element's nodes
    pub coordinates: Vec<Vec3>,
    /// Preferred direction of the local y axis, by local node
    pub frame_of_reference_delta: Vec<Vec3>,
    /// Structural twist, by local node (radians)
    pub structural_twist: Vec<f64>,
    /// Beam group the element belongs to
    pub beam_number: usize,
    pub stiffness_index: usize,
    pub mass_index: usize,

    /// Distance between the two end nodes
    pub(crate) length: f64,
    /// Initial rotation vector of each local node's triad
    pub(crate) psi_ini: [Vec3; MAX_NODES_ELEM],
    /// Consolidated lumped masses by local node, allocated on first use
    pub(crate) rbmass: Option<Box<[Mat6; MAX_NODES_ELEM]>>,
}

impl Element {
    /// Create an element and compute its length and initial orientation
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        index: usize,
        n_nodes: usize,
        global_nodes: &[usize],
        coordinates: &[Vec3],
        frame_of_reference_delta: &[Vec3],
        structural_twist: &[f64],
        beam_number: usize,
        stiffness_index: usize,
        mass_index: usize,
    ) -> AeroelasticResult<Self> {
        if !(2..=MAX_NODES_ELEM).contains(&n_nodes) {
            return Err(AeroelasticError::InvalidInput(format!(
                "element {index}: {n_nodes} nodes per element, expected 2 or 3"
            )));
        }
        for (what, len) in [
            ("connectivity", global_nodes.len()),
            ("coordinates", coordinates.len()),
            ("frame_of_reference_delta", frame_of_reference_delta.len()),
            ("structural_twist", structural_twist.len()),
        ] {
            if len != n_nodes {
                return Err(AeroelasticError::InvalidInput(format!(
                    "element {index}: {what} has {len} entries, expected {n_nodes}"
                )));
            }
        }

        let chord = coordinates[1] - coordinates[0];
        let length = chord.norm();
        if length < 1e-10 {
            return Err(AeroelasticError::InvalidGeometry(format!(
                "element {index} has zero length: nodes {}, {}",
                global_nodes[0], global_nodes[1]
            )));
        }

        let mut psi_ini = [Vec3::zeros(); MAX_NODES_ELEM];
        for inode in 0..n_nodes {
            let triad = math::element_triad(
                &chord,
                &frame_of_reference_delta[inode],
                structural_twist[inode],
            )
            .ok_or_else(|| {
                AeroelasticError::InvalidGeometry(format!(
                    "element {index}, local node {inode}: frame_of_reference_delta is parallel to the element"
                ))
            })?;
            psi_ini[inode] = math::rotation2crv(&triad);
        }

        Ok(Self {
            index,
            n_nodes,
            global_nodes: global_nodes.to_vec(),
            coordinates: coordinates.to_vec(),
            frame_of_reference_delta: frame_of_reference_delta.to_vec(),
            structural_twist: structural_twist.to_vec(),
            beam_number,
            stiffness_index,
            mass_index,
            length,
            psi_ini,
            rbmass: None,
        })
    }

    /// Bind material table indices
    pub fn add_attributes(&mut self, attributes: ElementAttributes) {
        self.stiffness_index = attributes.stiffness_index;
        self.mass_index = attributes.mass_index;
    }

    pub fn attributes(&self) -> ElementAttributes {
        ElementAttributes {
            stiffness_index: self.stiffness_index,
            mass_index: self.mass_index,
        }
    }

    /// Element length
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Initial rotation vector at a local node
    pub fn psi_ini(&self, local: usize) -> Vec3 {
        self.psi_ini[local]
    }

    /// Accumulated lumped-mass block at a local node, if any was added
    pub fn rbmass(&self, local: usize) -> Option<&Mat6> {
        self.rbmass.as_ref().map(|blocks| &blocks[local])
    }

    /// Add a 6x6 inertia block to a local node
    pub(crate) fn add_rbmass(&mut self, local: usize, block: &Mat6) {
        let blocks = self
            .rbmass
            .get_or_insert_with(|| Box::new([Mat6::zeros(); MAX_NODES_ELEM]));
        blocks[local] += block;
    }

    /// Drop all lumped-mass contributions
    pub(crate) fn clear_rbmass(&mut self) {
        self.rbmass = None;
    }
}
