//! Structural elements module

mod boundary;
mod element;
mod lumped_mass;
mod properties;

pub use boundary::BoundaryCondition;
pub use element::{Element, ElementAttributes, MAX_NODES_ELEM};
pub use lumped_mass::LumpedMass;
pub use properties::{mat6_from_rows, Matrix6Rows, PropertyTables};
