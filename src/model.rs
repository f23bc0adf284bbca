//! Beam model - elements, DOF numbering, master/slave tables and time history

use log::debug;
use serde::Serialize;

use crate::dofs::DofNumbering;
use crate::elements::{BoundaryCondition, Element, ElementAttributes, LumpedMass, PropertyTables};
use crate::error::{AeroelasticError, AeroelasticResult};
use crate::export::FlatArrays;
use crate::input::{BeamInput, BeamSettings, DynamicInput, DynamicInputSource};
use crate::master::MasterTable;
use crate::math::{self, Mat3, Vec3, Vec6};
use crate::state::{TimestepHistory, TimestepState};

/// Everything needed to assemble a model, before elements are generated
pub(crate) struct ModelParts {
    pub settings: BeamSettings,
    pub num_node_elem: usize,
    pub connectivities: Vec<Vec<usize>>,
    pub boundary_conditions: Vec<BoundaryCondition>,
    pub dofs: DofNumbering,
    pub properties: PropertyTables,
    pub elem_stiffness: Vec<usize>,
    pub elem_mass: Vec<usize>,
    pub frame_of_reference_delta: Vec<Vec<Vec3>>,
    pub structural_twist: Vec<Vec<f64>>,
    pub beam_number: Vec<usize>,
    pub body_number: Vec<usize>,
    pub num_bodies: usize,
    pub steady_app_forces: Vec<Vec6>,
    pub lumped_masses: Vec<LumpedMass>,
    /// Reference state with positions and body kinematics already set
    pub ini_info: TimestepState,
    /// First entry of the time history; a copy of `ini_info` when `None`
    pub history_start: Option<TimestepState>,
}

/// The structural beam model
#[derive(Debug, Clone, Serialize)]
pub struct BeamModel {
    settings: BeamSettings,
    num_node_elem: usize,
    num_node: usize,
    num_elem: usize,

    connectivities: Vec<Vec<usize>>,
    boundary_conditions: Vec<BoundaryCondition>,
    dofs: DofNumbering,

    properties: PropertyTables,
    elem_stiffness: Vec<usize>,
    elem_mass: Vec<usize>,
    frame_of_reference_delta: Vec<Vec<Vec3>>,
    structural_twist: Vec<Vec<f64>>,
    beam_number: Vec<usize>,

    body_number: Vec<usize>,
    num_bodies: usize,

    steady_app_forces: Vec<Vec6>,
    lumped_masses: Vec<LumpedMass>,

    elements: Vec<Element>,
    master: MasterTable,

    /// Reference (undeformed) state
    ini_info: TimestepState,
    timestep_info: TimestepHistory,
    dynamic_input: Vec<DynamicInput>,

    /// Kernel export, rebuilt whenever the model changes
    #[serde(skip)]
    flat: FlatArrays,
}

impl BeamModel {
    /// Build a model from a mesh description
    pub fn generate(input: &BeamInput, settings: BeamSettings) -> AeroelasticResult<Self> {
        input.validate()?;
        let num_node = input.num_node();
        let num_elem = input.num_elem();

        let body_number = input.body_number.clone().unwrap_or_else(|| vec![0; num_elem]);
        let num_bodies = input.num_bodies();

        let boundary_conditions = input.boundary_conditions.clone();
        let dofs = DofNumbering::from_boundary_conditions(&boundary_conditions);

        let mut ini_info = TimestepState::new(
            num_node,
            num_elem,
            input.num_node_elem,
            dofs.num_dof(),
            num_bodies,
        );
        ini_info.quat = math::quat_from_array(&settings.orientation);
        ini_info.pos = input.coordinates.iter().map(|c| Vec3::from(*c)).collect();

        match &input.bodies {
            Some(bodies) => {
                for (ibody, frame) in bodies.iter().take(num_bodies).enumerate() {
                    ini_info.mb_for_pos[ibody] = Vec6::from(frame.for_position);
                    ini_info.mb_for_vel[ibody] = Vec6::from(frame.for_velocity);
                    ini_info.mb_for_acc[ibody] = Vec6::from(frame.for_acceleration);
                    ini_info.mb_quat[ibody] = math::quat_from_array(&frame.quat);
                }
            }
            None => {
                ini_info.mb_for_pos[0] = ini_info.for_pos;
                ini_info.mb_for_vel[0] = ini_info.for_vel;
                ini_info.mb_for_acc[0] = ini_info.for_acc;
                ini_info.mb_quat[0] = ini_info.quat;
            }
        }

        let properties = PropertyTables::from_rows(&input.stiffness_db, &input.mass_db)?;

        let steady_app_forces = match &input.app_forces {
            Some(forces) if forces.len() == num_node => {
                forces.iter().map(|f| Vec6::from(*f)).collect()
            }
            Some(forces) => {
                debug!(
                    "app_forces has {} rows for {} nodes, using zero applied forces",
                    forces.len(),
                    num_node
                );
                vec![Vec6::zeros(); num_node]
            }
            None => vec![Vec6::zeros(); num_node],
        };
        ini_info.steady_applied_forces = steady_app_forces.clone();

        let parts = ModelParts {
            settings,
            num_node_elem: input.num_node_elem,
            connectivities: input.connectivities.clone(),
            boundary_conditions,
            dofs,
            properties,
            elem_stiffness: input.elem_stiffness.clone(),
            elem_mass: input.elem_mass.clone(),
            frame_of_reference_delta: input
                .frame_of_reference_delta
                .iter()
                .map(|e| e.iter().map(|v| Vec3::from(*v)).collect())
                .collect(),
            structural_twist: input.structural_twist.clone(),
            beam_number: input.beam_number.clone().unwrap_or_else(|| vec![0; num_elem]),
            body_number,
            num_bodies,
            steady_app_forces,
            lumped_masses: input.lumped_masses.clone(),
            ini_info,
            history_start: None,
        };

        let model = Self::assemble(parts)?;
        debug!(
            "generated beam model: {} nodes, {} elements, {} dofs, {} bodies, {} lumped masses",
            model.num_node,
            model.num_elem,
            model.num_dof(),
            model.num_bodies,
            model.lumped_masses.len()
        );
        Ok(model)
    }

    /// Generate elements, masters and the export from prepared parts
    pub(crate) fn assemble(parts: ModelParts) -> AeroelasticResult<Self> {
        let ModelParts {
            settings,
            num_node_elem,
            connectivities,
            boundary_conditions,
            dofs,
            properties,
            elem_stiffness,
            elem_mass,
            frame_of_reference_delta,
            structural_twist,
            beam_number,
            body_number,
            num_bodies,
            steady_app_forces,
            lumped_masses,
            mut ini_info,
            history_start,
        } = parts;

        let num_node = ini_info.pos.len();
        let num_elem = connectivities.len();

        let mut elements = Vec::with_capacity(num_elem);
        for (ielem, conn) in connectivities.iter().enumerate() {
            properties.check_indices(elem_stiffness[ielem], elem_mass[ielem])?;
            let coords: Vec<Vec3> = conn.iter().map(|&n| ini_info.pos[n]).collect();
            let elem = Element::new(
                ielem,
                num_node_elem,
                conn,
                &coords,
                &frame_of_reference_delta[ielem],
                &structural_twist[ielem],
                beam_number[ielem],
                elem_stiffness[ielem],
                elem_mass[ielem],
            )?;
            ini_info.psi[ielem] = elem.psi_ini;
            elements.push(elem);
        }

        let master = MasterTable::resolve(&connectivities, num_node)?;

        let history_start = history_start.unwrap_or_else(|| ini_info.clone());

        let mut model = Self {
            settings,
            num_node_elem,
            num_node,
            num_elem,
            connectivities,
            boundary_conditions,
            dofs,
            properties,
            elem_stiffness,
            elem_mass,
            frame_of_reference_delta,
            structural_twist,
            beam_number,
            body_number,
            num_bodies,
            steady_app_forces,
            lumped_masses: Vec::new(),
            elements,
            master,
            ini_info,
            timestep_info: TimestepHistory::new(history_start),
            dynamic_input: Vec::new(),
            flat: FlatArrays::default(),
        };

        model.add_lumped_masses(lumped_masses)?;
        Ok(model)
    }

    // ========================
    // Accessors
    // ========================

    pub fn settings(&self) -> &BeamSettings {
        &self.settings
    }

    pub fn num_node(&self) -> usize {
        self.num_node
    }

    pub fn num_elem(&self) -> usize {
        self.num_elem
    }

    pub fn num_node_elem(&self) -> usize {
        self.num_node_elem
    }

    pub fn num_dof(&self) -> usize {
        self.dofs.num_dof()
    }

    pub fn num_bodies(&self) -> usize {
        self.num_bodies
    }

    pub fn connectivities(&self) -> &[Vec<usize>] {
        &self.connectivities
    }

    pub fn boundary_conditions(&self) -> &[BoundaryCondition] {
        &self.boundary_conditions
    }

    pub fn dofs(&self) -> &DofNumbering {
        &self.dofs
    }

    pub fn properties(&self) -> &PropertyTables {
        &self.properties
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn master_table(&self) -> &MasterTable {
        &self.master
    }

    pub fn elem_stiffness(&self) -> &[usize] {
        &self.elem_stiffness
    }

    pub fn elem_mass(&self) -> &[usize] {
        &self.elem_mass
    }

    pub fn frame_of_reference_delta(&self) -> &[Vec<Vec3>] {
        &self.frame_of_reference_delta
    }

    pub fn structural_twist(&self) -> &[Vec<f64>] {
        &self.structural_twist
    }

    pub fn beam_number(&self) -> &[usize] {
        &self.beam_number
    }

    pub fn body_number(&self) -> &[usize] {
        &self.body_number
    }

    pub fn steady_app_forces(&self) -> &[Vec6] {
        &self.steady_app_forces
    }

    pub fn lumped_masses(&self) -> &[LumpedMass] {
        &self.lumped_masses
    }

    pub fn ini_info(&self) -> &TimestepState {
        &self.ini_info
    }

    pub fn ini_info_mut(&mut self) -> &mut TimestepState {
        &mut self.ini_info
    }

    pub fn timestep_info(&self) -> &TimestepHistory {
        &self.timestep_info
    }

    pub fn timestep_info_mut(&mut self) -> &mut TimestepHistory {
        &mut self.timestep_info
    }

    /// Kernel export, reference state and working state, borrowed together
    pub fn kernel_view(&mut self) -> (&FlatArrays, &TimestepState, &mut TimestepState) {
        (&self.flat, &self.ini_info, self.timestep_info.latest_mut())
    }

    pub fn dynamic_input(&self) -> &[DynamicInput] {
        &self.dynamic_input
    }

    /// Arrays for the structural kernel, current with the model
    pub fn flat_arrays(&self) -> &FlatArrays {
        &self.flat
    }

    // ========================
    // Model Editing Methods
    // ========================

    /// Rebuild the kernel export from the current model
    pub fn generate_flat_arrays(&mut self) {
        self.flat = FlatArrays::from_model(self);
    }

    /// Replace the boundary conditions and renumber the DOFs
    ///
    /// Generalized coordinates of the reference state and of every history
    /// slot are zeroed and resized to the new DOF count.
    pub fn set_boundary_conditions(
        &mut self,
        boundary_conditions: Vec<BoundaryCondition>,
    ) -> AeroelasticResult<()> {
        if boundary_conditions.len() != self.num_node {
            return Err(AeroelasticError::InvalidInput(format!(
                "{} boundary conditions for {} nodes",
                boundary_conditions.len(),
                self.num_node
            )));
        }
        self.boundary_conditions = boundary_conditions;
        self.dofs = DofNumbering::from_boundary_conditions(&self.boundary_conditions);

        let num_dof = self.num_dof();
        self.ini_info.reset_coordinates(num_dof);
        for state in self.timestep_info.iter_mut() {
            state.reset_coordinates(num_dof);
        }

        self.generate_flat_arrays();
        Ok(())
    }

    /// Rebind the material table indices of one element
    pub fn set_element_attributes(
        &mut self,
        ielem: usize,
        attributes: ElementAttributes,
    ) -> AeroelasticResult<()> {
        if ielem >= self.num_elem {
            return Err(AeroelasticError::IndexOutOfRange {
                what: "element",
                index: ielem,
                len: self.num_elem,
            });
        }
        self.properties
            .check_indices(attributes.stiffness_index, attributes.mass_index)?;

        self.elements[ielem].add_attributes(attributes);
        self.elem_stiffness[ielem] = attributes.stiffness_index;
        self.elem_mass[ielem] = attributes.mass_index;

        self.generate_flat_arrays();
        Ok(())
    }

    /// Attach lumped masses and consolidate them into the element mass blocks
    ///
    /// Fails without modifying the model if any mass sits on a node that no
    /// element references.
    pub fn add_lumped_masses(&mut self, masses: Vec<LumpedMass>) -> AeroelasticResult<()> {
        for lumped in &masses {
            if lumped.node >= self.num_node || self.master.node_master(lumped.node).is_none() {
                return Err(AeroelasticError::PreconditionViolation(format!(
                    "lumped mass on node {} which belongs to no element",
                    lumped.node
                )));
            }
        }
        self.lumped_masses.extend(masses);
        self.lump_masses();
        self.generate_flat_arrays();
        Ok(())
    }

    /// Rebuild every element's lumped-mass blocks from the lumped-mass list
    fn lump_masses(&mut self) {
        for elem in &mut self.elements {
            elem.clear_rbmass();
        }
        for lumped in &self.lumped_masses {
            let Some(owner) = self.master.node_master(lumped.node) else {
                continue;
            };
            self.elements[owner.elem].add_rbmass(owner.local, &lumped.inertia_tensor());
        }
    }

    // ========================
    // Time History Methods
    // ========================

    /// Append a working state cloned from the latest one
    pub fn next_step(&mut self) -> &mut TimestepState {
        self.timestep_info.push_next()
    }

    /// Store time-dependent input for `num_steps` steps, zero-filling gaps
    pub fn add_unsteady_information(&mut self, source: &DynamicInputSource, num_steps: usize) {
        self.dynamic_input = (0..num_steps)
            .map(|step| DynamicInput::from_source(source, step, self.num_node))
            .collect();
    }

    /// Advance the body-frame position of history slot `ts` by `dt`
    ///
    /// `for_pos[0..3] += dt * C_ga * for_vel[0..3]`
    pub fn integrate_position(&mut self, ts: usize, dt: f64) -> AeroelasticResult<()> {
        let len = self.timestep_info.len();
        let state = self
            .timestep_info
            .get_mut(ts)
            .ok_or(AeroelasticError::IndexOutOfRange {
                what: "timestep",
                index: ts,
                len,
            })?;

        let velocity = state.for_vel.fixed_rows::<3>(0).into_owned();
        let delta = dt * state.cga() * velocity;
        let mut position = state.for_pos.fixed_rows_mut::<3>(0);
        position += delta;
        Ok(())
    }

    // ========================
    // Nodal Transformations
    // ========================

    /// Rotate nodal forces and moments from the master element frame (B) to
    /// the body frame (A); only components with `filter` set are replaced
    pub fn nodal_b_for_2_a_for(
        &self,
        nodal: &[Vec6],
        state: &TimestepState,
        filter: [bool; 6],
    ) -> AeroelasticResult<Vec<Vec6>> {
        self.map_nodal(nodal, state, filter, |_, psi| Ok(math::crv2rotation(psi)))
    }

    /// Premultiply nodal forces and moments by `T(psi)^-T` of the master node
    pub fn nodal_premultiply_inv_t_transpose(
        &self,
        nodal: &[Vec6],
        state: &TimestepState,
        filter: [bool; 6],
    ) -> AeroelasticResult<Vec<Vec6>> {
        self.map_nodal(nodal, state, filter, |inode, psi| {
            math::crv2invtant(psi).ok_or_else(|| {
                AeroelasticError::InvalidGeometry(format!(
                    "singular tangent operator at node {inode}, |psi| = {}",
                    psi.norm()
                ))
            })
        })
    }

    fn map_nodal<F>(
        &self,
        nodal: &[Vec6],
        state: &TimestepState,
        filter: [bool; 6],
        operator: F,
    ) -> AeroelasticResult<Vec<Vec6>>
    where
        F: Fn(usize, &Vec3) -> AeroelasticResult<Mat3>,
    {
        if nodal.len() != self.num_node {
            return Err(AeroelasticError::InvalidInput(format!(
                "{} nodal values for {} nodes",
                nodal.len(),
                self.num_node
            )));
        }
        if state.psi.len() != self.num_elem {
            return Err(AeroelasticError::InvalidInput(format!(
                "state has rotations for {} elements, model has {}",
                state.psi.len(),
                self.num_elem
            )));
        }

        let mut out = nodal.to_vec();
        for (inode, value) in out.iter_mut().enumerate() {
            let Some(owner) = self.master.node_master(inode) else {
                continue;
            };
            let op = operator(inode, &state.psi[owner.elem][owner.local])?;

            let force = op * value.fixed_rows::<3>(0);
            let moment = op * value.fixed_rows::<3>(3);
            for i in 0..6 {
                if filter[i] {
                    value[i] = if i < 3 { force[i] } else { moment[i - 3] };
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::RIGID_BODY_COORDS;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn cantilever(num_elem: usize) -> BeamModel {
        BeamModel::generate(&BeamInput::cantilever(num_elem, 3, 10.0), BeamSettings::default())
            .unwrap()
    }

    #[test]
    fn test_simple_cantilever() {
        let model = cantilever(5);
        assert_eq!(model.num_node(), 11);
        assert_eq!(model.num_elem(), 5);
        // clamped root has no position DOF
        assert_eq!(model.num_dof(), 60);
        assert_eq!(model.timestep_info().len(), 1);
        assert_relative_eq!(model.elements()[2].length(), 2.0);
        assert_eq!(model.ini_info().psi[0], model.elements()[0].psi_ini);
        assert_eq!(model.flat_arrays().num_dof, 60);
    }

    #[test]
    fn test_lumped_masses_accumulate_on_master() {
        let mut input = BeamInput::cantilever(3, 3, 6.0);
        let a = LumpedMass::point(2, 4.0).with_position([0.1, 0.0, 0.2]);
        let b = LumpedMass::point(2, 1.5).with_inertia([[0.2, 0.0, 0.0], [0.0, 0.3, 0.0], [0.0, 0.0, 0.4]]);
        input.lumped_masses = vec![a.clone(), b.clone()];
        let model = BeamModel::generate(&input, BeamSettings::default()).unwrap();

        // node 2 is the end of element 0 (local node 1) and the start of element 1
        let owner = model.master_table().node_master(2).unwrap();
        assert_eq!((owner.elem, owner.local), (0, 1));
        let block = model.elements()[0].rbmass(1).unwrap();
        assert_relative_eq!(*block, a.inertia_tensor() + b.inertia_tensor(), epsilon = 1e-12);
        assert!(model.elements()[1].rbmass(0).is_none());
        assert_eq!(
            model.flat_arrays().rbmass.get(&[0, 1, 0, 0]),
            a.mass + b.mass
        );
    }

    #[test]
    fn test_lumped_mass_on_orphan_node_rejected() {
        let mut input = BeamInput::cantilever(2, 2, 2.0);
        input.coordinates.push([5.0, 5.0, 5.0]);
        input.boundary_conditions.push(BoundaryCondition::Internal);
        input.lumped_masses = vec![LumpedMass::point(3, 1.0)];
        let err = BeamModel::generate(&input, BeamSettings::default()).unwrap_err();
        assert!(matches!(err, AeroelasticError::PreconditionViolation(_)));
    }

    #[test]
    fn test_added_masses_reach_flat_arrays() {
        let input = BeamInput::cantilever(2, 2, 2.0);
        let mut model = BeamModel::generate(&input, BeamSettings::default()).unwrap();
        let owner = model.master_table().node_master(2).unwrap();
        let at = [owner.elem, owner.local, 0, 0];
        assert_eq!(model.flat_arrays().rbmass.get(&at), 0.0);

        model.add_lumped_masses(vec![LumpedMass::point(2, 3.0)]).unwrap();
        assert_eq!(model.flat_arrays().rbmass.get(&at), 3.0);

        model.add_lumped_masses(vec![LumpedMass::point(2, 1.5)]).unwrap();
        assert_eq!(model.flat_arrays().rbmass.get(&at), 4.5);
        assert_eq!(model.lumped_masses().len(), 2);
    }

    #[test]
    fn test_missing_applied_forces_default_to_zero() {
        let mut input = BeamInput::cantilever(2, 2, 2.0);
        input.app_forces = Some(vec![[1.0; 6]]);
        let model = BeamModel::generate(&input, BeamSettings::default()).unwrap();
        assert!(model.steady_app_forces().iter().all(|f| *f == Vec6::zeros()));
    }

    #[test]
    fn test_export_regenerated_on_boundary_change() {
        let mut model = cantilever(2);
        assert_eq!(model.flat_arrays().vdof[0], 0);
        let mut bcs = model.boundary_conditions().to_vec();
        bcs[0] = BoundaryCondition::Internal;
        model.set_boundary_conditions(bcs).unwrap();
        assert_eq!(model.flat_arrays().vdof[0], 1);
        assert_eq!(model.num_dof(), 30);
        assert_eq!(model.ini_info().q.len(), 30 + RIGID_BODY_COORDS);
    }

    #[test]
    fn test_boundary_change_resizes_history() {
        let mut model =
            BeamModel::generate(&BeamInput::cantilever(2, 2, 2.0), BeamSettings::default()).unwrap();
        model.next_step().q[0] = 1.5;
        assert_eq!(model.timestep_info().latest().q.len(), 12 + RIGID_BODY_COORDS);

        let mut bcs = model.boundary_conditions().to_vec();
        bcs[0] = BoundaryCondition::Internal;
        model.set_boundary_conditions(bcs).unwrap();

        assert_eq!(model.num_dof(), 18);
        for state in model.timestep_info().iter() {
            assert_eq!(state.q.len(), 18 + RIGID_BODY_COORDS);
            assert_eq!(state.dqdt.len(), 18 + RIGID_BODY_COORDS);
            assert!(state.q.iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn test_set_element_attributes() {
        let mut input = BeamInput::cantilever(2, 2, 2.0);
        input.stiffness_db.push(input.stiffness_db[0]);
        let mut model = BeamModel::generate(&input, BeamSettings::default()).unwrap();
        let attrs = ElementAttributes {
            stiffness_index: 1,
            mass_index: 0,
        };
        model.set_element_attributes(1, attrs).unwrap();
        assert_eq!(model.elements()[1].attributes(), attrs);
        assert_eq!(model.flat_arrays().stiffness_indices, vec![1, 2]);
        assert!(model
            .set_element_attributes(0, ElementAttributes { stiffness_index: 5, mass_index: 0 })
            .is_err());
    }

    #[test]
    fn test_integrate_position() {
        let mut model = cantilever(2);
        model.next_step();
        {
            let state = model.timestep_info_mut().latest_mut();
            state.quat = math::euler2quat(&Vec3::new(0.0, 0.0, FRAC_PI_2));
            state.for_vel[0] = 2.0;
        }
        model.integrate_position(1, 0.5).unwrap();
        let for_pos = model.timestep_info().latest().for_pos;
        assert_relative_eq!(for_pos[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(for_pos[1], 1.0, epsilon = 1e-12);
        assert!(model.integrate_position(4, 0.5).is_err());
    }

    #[test]
    fn test_nodal_b_for_2_a_for() {
        let model = cantilever(2);
        let nodal = vec![Vec6::new(1.0, 0.0, 0.0, 0.0, 0.0, 1.0); model.num_node()];
        // beam along y with local y along -x: local x maps to body y
        let rotated = model
            .nodal_b_for_2_a_for(&nodal, model.ini_info(), [true; 6])
            .unwrap();
        assert_relative_eq!(rotated[3], Vec6::new(0.0, 1.0, 0.0, 0.0, 0.0, 1.0), epsilon = 1e-12);

        let forces_only = model
            .nodal_b_for_2_a_for(&nodal, model.ini_info(), [true, true, true, false, false, false])
            .unwrap();
        assert_relative_eq!(forces_only[3][5], 1.0);
        assert_relative_eq!(forces_only[3][1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_nodal_transforms_check_sizes() {
        let model = cantilever(2);
        let too_long = vec![Vec6::zeros(); model.num_node() + 1];
        assert!(matches!(
            model.nodal_b_for_2_a_for(&too_long, model.ini_info(), [true; 6]),
            Err(AeroelasticError::InvalidInput(_))
        ));

        // states of differently sized models
        let nodal = vec![Vec6::zeros(); model.num_node()];
        let shorter = cantilever(1);
        let longer = cantilever(4);
        assert!(matches!(
            model.nodal_premultiply_inv_t_transpose(&nodal, shorter.ini_info(), [true; 6]),
            Err(AeroelasticError::InvalidInput(_))
        ));
        assert!(model
            .nodal_b_for_2_a_for(&nodal, longer.ini_info(), [true; 6])
            .is_err());
    }

    #[test]
    fn test_inv_t_transpose_is_identity_for_zero_rotation() {
        let model = cantilever(2);
        let mut state = model.ini_info().clone();
        for psi in &mut state.psi {
            *psi = [Vec3::zeros(); crate::elements::MAX_NODES_ELEM];
        }
        let nodal = vec![Vec6::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0); model.num_node()];
        let out = model
            .nodal_premultiply_inv_t_transpose(&nodal, &state, [true; 6])
            .unwrap();
        assert_relative_eq!(out[2], nodal[2], epsilon = 1e-12);
    }

    #[test]
    fn test_unsteady_information() {
        let mut model = cantilever(2);
        let source = DynamicInputSource {
            for_pos: Some(vec![[0.0, 0.0, 1.0, 0.0, 0.0, 0.0]; 2]),
            ..Default::default()
        };
        model.add_unsteady_information(&source, 4);
        assert_eq!(model.dynamic_input().len(), 4);
        assert_relative_eq!(model.dynamic_input()[1].for_pos[2], 1.0);
        assert_eq!(model.dynamic_input()[3].for_pos, Vec6::zeros());
        assert_eq!(model.dynamic_input()[0].dynamic_forces.len(), model.num_node());
    }
}
