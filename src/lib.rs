//! Aerobeam - geometrically-exact beam models for static aeroelastic coupling
//!
//! This library provides the structural side of a fluid-structure solver:
//! - Beam models with master/slave node resolution and DOF numbering
//! - Lumped-mass consolidation and multibody decomposition
//! - Flat-array export for a compiled structural kernel
//! - Staggered coupling with load stepping, under-relaxation and trim changes
//!
//! ## Example
//! ```rust
//! use aerobeam::prelude::*;
//!
//! // Clamped cantilever with 10 three-noded elements along y
//! let input = BeamInput::cantilever(10, 3, 16.0);
//! let model = BeamModel::generate(&input, BeamSettings::default()).unwrap();
//!
//! assert_eq!(model.num_node(), 21);
//! assert_eq!(model.num_dof(), 120);
//!
//! // Arrays for the structural kernel
//! let arrays = model.flat_arrays();
//! assert_eq!(arrays.vdof[0], 0);
//! ```

pub mod coupling;
pub mod dofs;
pub mod elements;
pub mod error;
pub mod export;
pub mod input;
pub mod master;
pub mod math;
pub mod model;
pub mod multibody;
pub mod results;
pub mod state;

// Re-export common types
pub mod prelude {
    pub use crate::coupling::{
        AeroSolver, AeroSurface, AeroTimestep, CouplingOptions, KernelInput, PanelMapping,
        PanelRef, StaggeredCoupling, StructuralKernel, TrimChange,
    };
    pub use crate::dofs::DofNumbering;
    pub use crate::elements::{BoundaryCondition, Element, ElementAttributes, LumpedMass};
    pub use crate::error::{AeroelasticError, AeroelasticResult};
    pub use crate::export::FlatArrays;
    pub use crate::input::{BeamInput, BeamSettings, BodyFrame, DynamicInputSource};
    pub use crate::master::{MasterTable, NodeRef};
    pub use crate::math::{Mat3, Mat6, Quat, Vec3, Vec6};
    pub use crate::model::BeamModel;
    pub use crate::multibody::BodyRange;
    pub use crate::results::{CouplingSummary, Resultants};
    pub use crate::state::{TimestepHistory, TimestepState};
}
