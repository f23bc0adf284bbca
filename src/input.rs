//! Model input: mesh description, model settings and time-dependent input

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::elements::{BoundaryCondition, LumpedMass, Matrix6Rows, MAX_NODES_ELEM};
use crate::error::{AeroelasticError, AeroelasticResult};
use crate::math::Vec6;

/// Description of a beam mesh and its properties
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeamInput {
    /// Nodes per element (2 or 3), the same for every element
    pub num_node_elem: usize,
    /// Node coordinates in the body frame
    pub coordinates: Vec<[f64; 3]>,
    /// Global node ids of every element, by local node
    pub connectivities: Vec<Vec<usize>>,
    pub boundary_conditions: Vec<BoundaryCondition>,
    /// Stiffness table index of every element
    pub elem_stiffness: Vec<usize>,
    /// Mass table index of every element
    pub elem_mass: Vec<usize>,
    pub stiffness_db: Vec<Matrix6Rows>,
    pub mass_db: Vec<Matrix6Rows>,
    /// Preferred local y direction, by element and local node
    pub frame_of_reference_delta: Vec<Vec<[f64; 3]>>,
    /// Twist angle, by element and local node
    pub structural_twist: Vec<Vec<f64>>,
    /// Beam group of every element; all zero when absent
    #[serde(default)]
    pub beam_number: Option<Vec<usize>>,
    /// Body of every element; a single body when absent
    #[serde(default)]
    pub body_number: Option<Vec<usize>>,
    /// Steady applied nodal forces and moments; zero when absent
    #[serde(default)]
    pub app_forces: Option<Vec<[f64; 6]>>,
    #[serde(default)]
    pub lumped_masses: Vec<LumpedMass>,
    /// Frame-of-reference kinematics of every body
    #[serde(default)]
    pub bodies: Option<Vec<BodyFrame>>,
}

impl BeamInput {
    pub fn num_node(&self) -> usize {
        self.coordinates.len()
    }

    pub fn num_elem(&self) -> usize {
        self.connectivities.len()
    }

    /// Parse a JSON mesh description
    pub fn from_json(json: &str) -> AeroelasticResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON mesh description from disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> AeroelasticResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Check array sizes against the node and element counts
    pub fn validate(&self) -> AeroelasticResult<()> {
        let num_node = self.num_node();
        let num_elem = self.num_elem();

        let per_node = [("boundary_conditions", self.boundary_conditions.len())];
        let mut per_elem = vec![
            ("elem_stiffness", self.elem_stiffness.len()),
            ("elem_mass", self.elem_mass.len()),
            ("frame_of_reference_delta", self.frame_of_reference_delta.len()),
            ("structural_twist", self.structural_twist.len()),
        ];
        if let Some(beam_number) = &self.beam_number {
            per_elem.push(("beam_number", beam_number.len()));
        }
        if let Some(body_number) = &self.body_number {
            per_elem.push(("body_number", body_number.len()));
        }

        for (what, len) in per_node {
            if len != num_node {
                return Err(AeroelasticError::InvalidInput(format!(
                    "{what} has {len} entries for {num_node} nodes"
                )));
            }
        }
        for (what, len) in per_elem {
            if len != num_elem {
                return Err(AeroelasticError::InvalidInput(format!(
                    "{what} has {len} entries for {num_elem} elements"
                )));
            }
        }
        if num_elem == 0 {
            return Err(AeroelasticError::InvalidInput("model has no elements".to_string()));
        }

        for (ielem, conn) in self.connectivities.iter().enumerate() {
            if conn.len() != self.num_node_elem {
                return Err(AeroelasticError::InvalidInput(format!(
                    "element {ielem} has {} nodes, expected {}",
                    conn.len(),
                    self.num_node_elem
                )));
            }
            if let Some(&bad) = conn.iter().find(|&&n| n >= num_node) {
                return Err(AeroelasticError::IndexOutOfRange {
                    what: "connectivity node",
                    index: bad,
                    len: num_node,
                });
            }
        }

        if let Some(bodies) = &self.bodies {
            let num_bodies = self.num_bodies();
            if bodies.len() < num_bodies {
                return Err(AeroelasticError::InvalidInput(format!(
                    "{} body frames given for {num_bodies} bodies",
                    bodies.len()
                )));
            }
        }
        Ok(())
    }

    /// Number of bodies implied by `body_number`
    pub fn num_bodies(&self) -> usize {
        self.body_number
            .as_ref()
            .and_then(|b| b.iter().max())
            .map_or(1, |&max| max + 1)
    }

    /// Uniform straight cantilever along the body y axis
    ///
    /// Node 0 is clamped and the tip is free. The local y axis of every
    /// element points along -x (leading edge forward). `num_node_elem` is
    /// clamped to 2..=3 and `num_elem` to at least 1.
    pub fn cantilever(num_elem: usize, num_node_elem: usize, span: f64) -> Self {
        let num_elem = num_elem.max(1);
        let num_node_elem = num_node_elem.clamp(2, MAX_NODES_ELEM);
        let nodes_per_elem_step = num_node_elem - 1;
        let num_node = num_elem * nodes_per_elem_step + 1;
        let dy = span / (num_node - 1) as f64;

        let coordinates = (0..num_node).map(|i| [0.0, i as f64 * dy, 0.0]).collect();
        let connectivities = (0..num_elem)
            .map(|e| {
                let start = e * nodes_per_elem_step;
                if num_node_elem == 3 {
                    vec![start, start + 2, start + 1]
                } else {
                    vec![start, start + 1]
                }
            })
            .collect();

        let mut boundary_conditions = vec![BoundaryCondition::Internal; num_node];
        boundary_conditions[0] = BoundaryCondition::Clamped;
        boundary_conditions[num_node - 1] = BoundaryCondition::FreeEnd;

        let diag = |d: [f64; 6]| {
            let mut rows = [[0.0; 6]; 6];
            for (i, v) in d.into_iter().enumerate() {
                rows[i][i] = v;
            }
            rows
        };

        Self {
            num_node_elem,
            coordinates,
            connectivities,
            boundary_conditions,
            elem_stiffness: vec![0; num_elem],
            elem_mass: vec![0; num_elem],
            stiffness_db: vec![diag([1e7, 1e6, 1e6, 1e4, 2e4, 4e5])],
            mass_db: vec![diag([0.75, 0.75, 0.75, 0.1, 0.001, 0.1])],
            frame_of_reference_delta: vec![vec![[-1.0, 0.0, 0.0]; num_node_elem]; num_elem],
            structural_twist: vec![vec![0.0; num_node_elem]; num_elem],
            beam_number: None,
            body_number: None,
            app_forces: None,
            lumped_masses: Vec::new(),
            bodies: None,
        }
    }
}

fn identity_quat() -> [f64; 4] {
    [1.0, 0.0, 0.0, 0.0]
}

/// Model-wide settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamSettings {
    /// Initial orientation of the body frame, `[w, x, y, z]`
    pub orientation: [f64; 4],
    /// Whether the model will be used for time-marching runs
    pub unsteady: bool,
}

impl Default for BeamSettings {
    fn default() -> Self {
        Self {
            orientation: identity_quat(),
            unsteady: false,
        }
    }
}

impl BeamSettings {
    pub fn with_orientation(mut self, orientation: [f64; 4]) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn unsteady(mut self) -> Self {
        self.unsteady = true;
        self
    }
}

/// Initial frame-of-reference kinematics of one body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyFrame {
    #[serde(default)]
    pub for_position: [f64; 6],
    #[serde(default)]
    pub for_velocity: [f64; 6],
    #[serde(default)]
    pub for_acceleration: [f64; 6],
    #[serde(default = "identity_quat")]
    pub quat: [f64; 4],
}

impl Default for BodyFrame {
    fn default() -> Self {
        Self {
            for_position: [0.0; 6],
            for_velocity: [0.0; 6],
            for_acceleration: [0.0; 6],
            quat: identity_quat(),
        }
    }
}

/// Time-dependent input as supplied by the user; every field is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicInputSource {
    /// Nodal forces by step and node
    pub dynamic_forces: Option<Vec<Vec<[f64; 6]>>>,
    pub for_pos: Option<Vec<[f64; 6]>>,
    pub for_vel: Option<Vec<[f64; 6]>>,
    pub for_acc: Option<Vec<[f64; 6]>>,
    /// Per step and node, which position components are enforced
    pub enforce_trajectory: Option<Vec<Vec<[bool; 3]>>>,
}

/// Time-dependent input of one step, with absent data replaced by zeros
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DynamicInput {
    pub dynamic_forces: Vec<Vec6>,
    pub for_pos: Vec6,
    pub for_vel: Vec6,
    pub for_acc: Vec6,
    pub enforce_trajectory: Vec<[bool; 3]>,
}

impl DynamicInput {
    pub fn from_source(source: &DynamicInputSource, step: usize, num_node: usize) -> Self {
        let six = |series: &Option<Vec<[f64; 6]>>| {
            series
                .as_ref()
                .and_then(|s| s.get(step))
                .map_or_else(Vec6::zeros, |v| Vec6::from(*v))
        };

        let dynamic_forces = source
            .dynamic_forces
            .as_ref()
            .and_then(|f| f.get(step))
            .filter(|f| f.len() == num_node)
            .map_or_else(
                || vec![Vec6::zeros(); num_node],
                |f| f.iter().map(|v| Vec6::from(*v)).collect(),
            );

        let enforce_trajectory = source
            .enforce_trajectory
            .as_ref()
            .and_then(|e| e.get(step))
            .filter(|e| e.len() == num_node)
            .cloned()
            .unwrap_or_else(|| vec![[false; 3]; num_node]);

        Self {
            dynamic_forces,
            for_pos: six(&source.for_pos),
            for_vel: six(&source.for_vel),
            for_acc: six(&source.for_acc),
            enforce_trajectory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cantilever_shape() {
        let input = BeamInput::cantilever(4, 3, 8.0);
        assert_eq!(input.num_node(), 9);
        assert_eq!(input.connectivities[1], vec![2, 4, 3]);
        assert_eq!(input.coordinates[8], [0.0, 8.0, 0.0]);
        assert_eq!(input.boundary_conditions[0], BoundaryCondition::Clamped);
        assert_eq!(input.boundary_conditions[8], BoundaryCondition::FreeEnd);
        assert!(input.validate().is_ok());

        let two = BeamInput::cantilever(4, 2, 8.0);
        assert_eq!(two.num_node(), 5);
        assert_eq!(two.connectivities[3], vec![3, 4]);
    }

    #[test]
    fn test_cantilever_clamps_degenerate_sizes() {
        let input = BeamInput::cantilever(0, 0, 2.0);
        assert_eq!(input.num_node_elem, 2);
        assert_eq!(input.num_elem(), 1);
        assert_eq!(input.coordinates[1], [0.0, 2.0, 0.0]);
        assert!(input.validate().is_ok());

        assert_eq!(BeamInput::cantilever(2, 7, 2.0).num_node_elem, 3);
    }

    #[test]
    fn test_validate_catches_size_mismatch() {
        let mut input = BeamInput::cantilever(2, 2, 1.0);
        input.elem_mass.pop();
        assert!(input.validate().is_err());

        let mut input = BeamInput::cantilever(2, 2, 1.0);
        input.connectivities[1][1] = 10;
        assert!(matches!(
            input.validate(),
            Err(AeroelasticError::IndexOutOfRange { index: 10, .. })
        ));
    }

    #[test]
    fn test_json_round_trip_with_optional_fields_absent() {
        let input = BeamInput::cantilever(2, 2, 1.0);
        let mut value = serde_json::to_value(&input).unwrap();
        let obj = value.as_object_mut().unwrap();
        for key in ["beam_number", "body_number", "app_forces", "lumped_masses", "bodies"] {
            obj.remove(key);
        }
        let parsed = BeamInput::from_json(&value.to_string()).unwrap();
        assert_eq!(parsed.num_elem(), 2);
        assert!(parsed.app_forces.is_none());
        assert!(parsed.lumped_masses.is_empty());
        assert_eq!(parsed.num_bodies(), 1);
    }

    #[test]
    fn test_dynamic_input_defaults_to_zero() {
        let source = DynamicInputSource {
            for_vel: Some(vec![[1.0, 0.0, 0.0, 0.0, 0.0, 0.0]]),
            ..Default::default()
        };
        let first = DynamicInput::from_source(&source, 0, 3);
        assert_eq!(first.for_vel[0], 1.0);
        assert_eq!(first.for_pos, Vec6::zeros());
        assert_eq!(first.dynamic_forces.len(), 3);
        assert_eq!(first.enforce_trajectory, vec![[false; 3]; 3]);

        let later = DynamicInput::from_source(&source, 5, 3);
        assert_eq!(later.for_vel, Vec6::zeros());
    }

    #[test]
    fn test_settings_default_orientation() {
        let settings: BeamSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.orientation, [1.0, 0.0, 0.0, 0.0]);
        assert!(!settings.unsteady);
    }
}
