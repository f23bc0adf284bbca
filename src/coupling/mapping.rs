//! Aerodynamic grid data and the transfer of panel forces to beam nodes

use serde::{Deserialize, Serialize};

use crate::error::{AeroelasticError, AeroelasticResult};
use crate::master::MasterTable;
use crate::math::{self, Vec3, Vec6};
use crate::state::TimestepState;

/// One lifting surface: vertex positions and vertex loads
///
/// Both grids are indexed `[chordwise][spanwise]`. Positions are in the
/// inertial (G) frame; each load holds a force and a moment, also in G.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AeroSurface {
    pub zeta: Vec<Vec<Vec3>>,
    pub forces: Vec<Vec<Vec6>>,
}

impl AeroSurface {
    /// Surface with the given vertex grid and zero loads
    pub fn new(zeta: Vec<Vec<Vec3>>) -> Self {
        let forces = zeta.iter().map(|row| vec![Vec6::zeros(); row.len()]).collect();
        Self { zeta, forces }
    }

    pub fn num_chordwise(&self) -> usize {
        self.zeta.len()
    }

    pub fn num_spanwise(&self) -> usize {
        self.zeta.first().map_or(0, Vec::len)
    }
}

/// Aerodynamic grid state at one time index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AeroTimestep {
    pub surfaces: Vec<AeroSurface>,
}

/// A spanwise vertex line of one surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelRef {
    pub surface: usize,
    pub span: usize,
}

/// Which vertex lines load each structural node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelMapping {
    nodes: Vec<Vec<PanelRef>>,
}

impl PanelMapping {
    pub fn new(nodes: Vec<Vec<PanelRef>>) -> Self {
        Self { nodes }
    }

    pub fn num_node(&self) -> usize {
        self.nodes.len()
    }

    /// Vertex lines mapped to `node`; empty for unmapped nodes
    pub fn node(&self, node: usize) -> &[PanelRef] {
        self.nodes.get(node).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Nodal forces and moments, in each node's master element frame (B), from
/// aerodynamic vertex loads
///
/// Every chordwise vertex of a mapped spanwise line loads the node. Moments
/// include the lever arm between the vertex and the node. Nodes without
/// mapped lines receive zero.
pub fn aero2struct_force_mapping(
    aero: &AeroTimestep,
    mapping: &PanelMapping,
    state: &TimestepState,
    master: &MasterTable,
) -> AeroelasticResult<Vec<Vec6>> {
    if mapping.num_node() > state.num_node {
        return Err(AeroelasticError::IndexOutOfRange {
            what: "mapped node",
            index: mapping.num_node() - 1,
            len: state.num_node,
        });
    }

    let cga = state.cga();
    let cag = state.cag();
    let mut nodal = vec![Vec6::zeros(); state.num_node];

    for (inode, load) in nodal.iter_mut().enumerate() {
        let panels = mapping.node(inode);
        if panels.is_empty() {
            continue;
        }
        let owner = master.node_master(inode).ok_or_else(|| {
            AeroelasticError::PreconditionViolation(format!(
                "aerodynamic loads mapped to node {inode} which belongs to no element"
            ))
        })?;

        let cab = math::crv2rotation(&state.psi[owner.elem][owner.local]);
        let cbg = cab.transpose() * cag;
        let node_g = cga * state.pos[inode];

        let mut force_b = Vec3::zeros();
        let mut moment_b = Vec3::zeros();
        for panel in panels {
            let surface = aero.surfaces.get(panel.surface).ok_or(AeroelasticError::IndexOutOfRange {
                what: "aerodynamic surface",
                index: panel.surface,
                len: aero.surfaces.len(),
            })?;
            for (zeta_row, force_row) in surface.zeta.iter().zip(&surface.forces) {
                let out_of_span = || AeroelasticError::IndexOutOfRange {
                    what: "spanwise vertex",
                    index: panel.span,
                    len: zeta_row.len().min(force_row.len()),
                };
                let zeta = zeta_row.get(panel.span).ok_or_else(out_of_span)?;
                let vertex = force_row.get(panel.span).ok_or_else(out_of_span)?;

                let force = vertex.fixed_rows::<3>(0).into_owned();
                let moment = vertex.fixed_rows::<3>(3).into_owned();
                let chi = zeta - node_g;

                force_b += cbg * force;
                moment_b += cbg * (moment + chi.cross(&force));
            }
        }

        load.fixed_rows_mut::<3>(0).copy_from(&force_b);
        load.fixed_rows_mut::<3>(3).copy_from(&moment_b);
    }

    Ok(nodal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn two_node_state() -> (TimestepState, MasterTable) {
        let mut state = TimestepState::new(2, 1, 2, 6, 1);
        state.pos[1] = Vec3::new(0.0, 1.0, 0.0);
        let master = MasterTable::resolve(&[vec![0, 1]], 2).unwrap();
        (state, master)
    }

    /// Two chordwise vertices at x = 1 and x = 2, each carrying a unit lift
    fn lifting_line() -> AeroTimestep {
        let mut surface = AeroSurface::new(vec![
            vec![Vec3::new(1.0, 0.0, 0.0)],
            vec![Vec3::new(2.0, 0.0, 0.0)],
        ]);
        for row in &mut surface.forces {
            row[0] = Vec6::new(0.0, 0.0, 1.0, 0.0, 0.0, 0.0);
        }
        AeroTimestep {
            surfaces: vec![surface],
        }
    }

    #[test]
    fn test_forces_and_lever_arm_moments() {
        let (state, master) = two_node_state();
        let mapping = PanelMapping::new(vec![vec![PanelRef { surface: 0, span: 0 }], vec![]]);
        let nodal = aero2struct_force_mapping(&lifting_line(), &mapping, &state, &master).unwrap();

        assert_relative_eq!(nodal[0], Vec6::new(0.0, 0.0, 2.0, 0.0, -3.0, 0.0), epsilon = 1e-12);
        assert_eq!(nodal[1], Vec6::zeros());
    }

    #[test]
    fn test_forces_rotated_into_master_frame() {
        let (mut state, master) = two_node_state();
        state.psi[0][0] = Vec3::new(0.0, 0.0, FRAC_PI_2);
        let mut aero = lifting_line();
        aero.surfaces[0].forces[0][0] = Vec6::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        aero.surfaces[0].forces[1][0] = Vec6::zeros();

        let mapping = PanelMapping::new(vec![vec![PanelRef { surface: 0, span: 0 }]]);
        let nodal = aero2struct_force_mapping(&aero, &mapping, &state, &master).unwrap();
        assert_relative_eq!(nodal[0][0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(nodal[0][1], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bad_panel_reference() {
        let (state, master) = two_node_state();
        let mapping = PanelMapping::new(vec![vec![PanelRef { surface: 0, span: 3 }]]);
        assert!(matches!(
            aero2struct_force_mapping(&lifting_line(), &mapping, &state, &master),
            Err(AeroelasticError::IndexOutOfRange { index: 3, .. })
        ));
    }
}
