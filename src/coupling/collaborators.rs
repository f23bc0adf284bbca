//! Interfaces of the structural and aerodynamic solvers driven by the coupling

use crate::coupling::mapping::{AeroTimestep, PanelMapping};
use crate::error::AeroelasticResult;
use crate::export::FlatArrays;
use crate::math::Vec6;
use crate::state::TimestepState;

/// Everything the structural kernel reads for one solve
#[derive(Debug, Clone, Copy)]
pub struct KernelInput<'a> {
    pub arrays: &'a FlatArrays,
    /// Reference (undeformed) state
    pub ini_info: &'a TimestepState,
    /// Nodal forces and moments for this solve, in the master element frames
    pub applied_forces: &'a [Vec6],
    pub gravity: f64,
}

/// Structural integration kernel
pub trait StructuralKernel {
    /// Solve for the equilibrium state under the given loads, writing it into `state`
    fn run(&mut self, input: KernelInput<'_>, state: &mut TimestepState) -> AeroelasticResult<()>;

    /// Called when the model history gains a new working state
    fn next_step(&mut self) {}

    /// Fill the generalized coordinates of a converged state
    fn update(&mut self, state: &mut TimestepState) -> AeroelasticResult<()>;
}

/// Aerodynamic solver
pub trait AeroSolver {
    /// Solve the flow on the current surface geometry
    fn run(&mut self) -> AeroelasticResult<()>;

    /// Latest grid state, including vertex loads from the last `run`
    fn current(&self) -> &AeroTimestep;

    /// Which vertex lines load each structural node
    fn struct2aero_mapping(&self) -> &PanelMapping;

    /// Regenerate the surface geometry from a structural state
    fn update_step(&mut self, structure: &TimestepState) -> AeroelasticResult<()>;

    /// Append a new working grid state cloned from the latest
    fn next_step(&mut self);

    /// Keep only the latest grid state
    fn collapse_history(&mut self);

    /// Control-surface deflections, or `None` if the model has no control surfaces
    fn control_surface_deflection_mut(&mut self) -> Option<&mut [f64]>;
}
