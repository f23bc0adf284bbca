//! Splitting a multibody model into standalone single-body models

use log::debug;
use serde::{Deserialize, Serialize};

use crate::dofs::DofNumbering;
use crate::error::{AeroelasticError, AeroelasticResult};
use crate::model::{BeamModel, ModelParts};

/// Element and node ranges of one body (end-exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyRange {
    pub first_elem: usize,
    pub last_elem: usize,
    pub first_node: usize,
    pub last_node: usize,
}

impl BodyRange {
    pub fn num_elem(&self) -> usize {
        self.last_elem - self.first_elem
    }

    pub fn num_node(&self) -> usize {
        self.last_node - self.first_node
    }

    pub fn contains_node(&self, node: usize) -> bool {
        (self.first_node..self.last_node).contains(&node)
    }
}

impl BeamModel {
    /// Element and node ranges of body `ibody`
    ///
    /// The body's elements must form one contiguous run, and the node range
    /// runs from the first node of its first element to the second (end) node
    /// of its last element. Every node the body references must fall inside.
    pub fn body_range(&self, ibody: usize) -> AeroelasticResult<BodyRange> {
        let body_number = self.body_number();
        let first_elem = body_number
            .iter()
            .position(|&b| b == ibody)
            .ok_or_else(|| {
                AeroelasticError::PreconditionViolation(format!("body {ibody} has no elements"))
            })?;
        let last_elem = body_number
            .iter()
            .rposition(|&b| b == ibody)
            .unwrap_or(first_elem)
            + 1;

        if let Some(stray) = (first_elem..last_elem).find(|&e| body_number[e] != ibody) {
            return Err(AeroelasticError::PreconditionViolation(format!(
                "elements of body {ibody} are not contiguous: element {stray} belongs to body {}",
                body_number[stray]
            )));
        }

        let conn = self.connectivities();
        let range = BodyRange {
            first_elem,
            last_elem,
            first_node: conn[first_elem][0],
            last_node: conn[last_elem - 1][1] + 1,
        };

        let outside = conn[first_elem..last_elem]
            .iter()
            .flatten()
            .find(|&&node| !range.contains_node(node));
        if let Some(node) = outside {
            return Err(AeroelasticError::PreconditionViolation(format!(
                "node {node} of body {ibody} lies outside nodes {}..{}",
                range.first_node, range.last_node
            )));
        }

        Ok(range)
    }

    /// Standalone model of body `ibody`
    ///
    /// Nodes and elements are renumbered from zero. The reference state comes
    /// from this model's reference state and the time history restarts from
    /// the latest state, both with the body's own frame-of-reference
    /// kinematics.
    pub fn extract_body(&self, ibody: usize) -> AeroelasticResult<BeamModel> {
        if ibody >= self.num_bodies() {
            return Err(AeroelasticError::IndexOutOfRange {
                what: "body",
                index: ibody,
                len: self.num_bodies(),
            });
        }
        let range = self.body_range(ibody)?;
        let nodes = range.first_node..range.last_node;
        let elems = range.first_elem..range.last_elem;

        let boundary_conditions = self.boundary_conditions()[nodes.clone()].to_vec();
        let dofs = DofNumbering::from_boundary_conditions(&boundary_conditions);
        let num_dof = dofs.num_dof();

        let connectivities = self.connectivities()[elems.clone()]
            .iter()
            .map(|conn| conn.iter().map(|n| n - range.first_node).collect())
            .collect();

        let lumped_masses = self
            .lumped_masses()
            .iter()
            .filter(|m| range.contains_node(m.node))
            .map(|m| m.moved_to(m.node - range.first_node))
            .collect();

        let parts = ModelParts {
            settings: self.settings().clone(),
            num_node_elem: self.num_node_elem(),
            connectivities,
            boundary_conditions,
            dofs,
            properties: self.properties().clone(),
            elem_stiffness: self.elem_stiffness()[elems.clone()].to_vec(),
            elem_mass: self.elem_mass()[elems.clone()].to_vec(),
            frame_of_reference_delta: self.frame_of_reference_delta()[elems.clone()].to_vec(),
            structural_twist: self.structural_twist()[elems.clone()].to_vec(),
            beam_number: self.beam_number()[elems].to_vec(),
            body_number: vec![0; range.num_elem()],
            num_bodies: 1,
            steady_app_forces: self.steady_app_forces()[nodes].to_vec(),
            lumped_masses,
            ini_info: self.ini_info().body(&range, num_dof, ibody),
            history_start: Some(self.timestep_info().latest().body(&range, num_dof, ibody)),
        };

        let body = BeamModel::assemble(parts)?;
        debug!(
            "extracted body {ibody}: elements {}..{}, nodes {}..{}, {} dofs",
            range.first_elem, range.last_elem, range.first_node, range.last_node, num_dof
        );
        Ok(body)
    }

    /// Every body of the model as a standalone model
    pub fn extract_bodies(&self) -> AeroelasticResult<Vec<BeamModel>> {
        (0..self.num_bodies()).map(|ibody| self.extract_body(ibody)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{BoundaryCondition, LumpedMass};
    use crate::input::{BeamInput, BeamSettings, BodyFrame};
    use approx::assert_relative_eq;

    /// Two cantilevers side by side: body 0 on nodes 0..=4, body 1 on 5..=9
    fn two_bodies() -> BeamInput {
        let mut input = BeamInput::cantilever(4, 2, 4.0);
        let second = BeamInput::cantilever(4, 2, 4.0);
        let offset = input.num_node();

        input
            .coordinates
            .extend(second.coordinates.iter().map(|c| [c[0] + 2.0, c[1], c[2]]));
        input.connectivities.extend(
            second
                .connectivities
                .iter()
                .map(|c| c.iter().map(|n| n + offset).collect::<Vec<_>>()),
        );
        input.boundary_conditions.extend(second.boundary_conditions);
        input.elem_stiffness.extend(second.elem_stiffness);
        input.elem_mass.extend(second.elem_mass);
        input.frame_of_reference_delta.extend(second.frame_of_reference_delta);
        input.structural_twist.extend(second.structural_twist);
        input.body_number = Some(vec![0, 0, 0, 0, 1, 1, 1, 1]);
        input.bodies = Some(vec![
            BodyFrame::default(),
            BodyFrame {
                for_position: [2.0, 0.0, 0.0, 0.0, 0.0, 0.0],
                ..Default::default()
            },
        ]);
        input.lumped_masses = vec![LumpedMass::point(3, 2.0), LumpedMass::point(7, 5.0)];
        input
    }

    #[test]
    fn test_body_range() {
        let model = BeamModel::generate(&two_bodies(), BeamSettings::default()).unwrap();
        let range = model.body_range(1).unwrap();
        assert_eq!(
            range,
            BodyRange {
                first_elem: 4,
                last_elem: 8,
                first_node: 5,
                last_node: 10,
            }
        );
        assert_eq!(range.num_node(), 5);
    }

    #[test]
    fn test_extract_second_body() {
        let model = BeamModel::generate(&two_bodies(), BeamSettings::default()).unwrap();
        let body = model.extract_body(1).unwrap();

        assert_eq!(body.num_node(), 5);
        assert_eq!(body.num_elem(), 4);
        assert_eq!(body.num_bodies(), 1);
        assert_eq!(body.connectivities()[0], vec![0, 1]);
        assert_eq!(body.boundary_conditions()[0], BoundaryCondition::Clamped);
        assert_eq!(body.num_dof(), 24);

        assert_eq!(body.lumped_masses().len(), 1);
        assert_eq!(body.lumped_masses()[0].node, 2);
        assert_relative_eq!(body.lumped_masses()[0].mass, 5.0);

        assert_relative_eq!(body.ini_info().pos[0].x, 2.0);
        assert_relative_eq!(body.ini_info().for_pos[0], 2.0);
        assert_relative_eq!(body.timestep_info().latest().for_pos[0], 2.0);
        assert_eq!(body.timestep_info().len(), 1);
        assert_eq!(body.flat_arrays().num_node, 5);
    }

    #[test]
    fn test_extracted_bodies_cover_the_model() {
        let model = BeamModel::generate(&two_bodies(), BeamSettings::default()).unwrap();
        let bodies = model.extract_bodies().unwrap();
        let nodes: usize = bodies.iter().map(|b| b.num_node()).sum();
        let elems: usize = bodies.iter().map(|b| b.num_elem()).sum();
        let dofs: usize = bodies.iter().map(|b| b.num_dof()).sum();
        assert_eq!(nodes, model.num_node());
        assert_eq!(elems, model.num_elem());
        assert_eq!(dofs, model.num_dof());
    }

    #[test]
    fn test_non_contiguous_body_rejected() {
        let mut input = two_bodies();
        input.body_number = Some(vec![0, 0, 1, 0, 1, 1, 1, 1]);
        let model = BeamModel::generate(&input, BeamSettings::default()).unwrap();
        assert!(matches!(
            model.extract_body(0),
            Err(AeroelasticError::PreconditionViolation(_))
        ));
    }

    #[test]
    fn test_unknown_body() {
        let model = BeamModel::generate(&two_bodies(), BeamSettings::default()).unwrap();
        assert!(model.extract_body(2).is_err());
    }
}
