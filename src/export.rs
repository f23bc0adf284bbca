//! Flat-array export for the compiled structural kernel
//!
//! This is the only place that knows the kernel's conventions: arrays are
//! column-major and every index is 1-based, with `0` standing for "none".
//! The rest of the crate stays 0-based.

use serde::Serialize;

use crate::elements::MAX_NODES_ELEM;
use crate::math::{Mat6, Vec3};
use crate::model::BeamModel;

/// Dense n-dimensional array stored in column-major order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnMajor<T> {
    dims: Vec<usize>,
    data: Vec<T>,
}

impl<T: Copy + Default> ColumnMajor<T> {
    pub fn zeros(dims: &[usize]) -> Self {
        Self {
            dims: dims.to_vec(),
            data: vec![T::default(); dims.iter().product()],
        }
    }

    /// Linear offset of a multi-index; the first index varies fastest
    pub fn offset(&self, index: &[usize]) -> usize {
        debug_assert_eq!(index.len(), self.dims.len());
        let mut offset = 0;
        let mut stride = 1;
        for (&i, &dim) in index.iter().zip(&self.dims) {
            debug_assert!(i < dim, "index {i} out of bounds for dimension {dim}");
            offset += i * stride;
            stride *= dim;
        }
        offset
    }

    pub fn get(&self, index: &[usize]) -> T {
        self.data[self.offset(index)]
    }

    pub fn set(&mut self, index: &[usize], value: T) {
        let offset = self.offset(index);
        self.data[offset] = value;
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl ColumnMajor<f64> {
    fn set_mat6(&mut self, prefix: &[usize], m: &Mat6) {
        let mut index = prefix.to_vec();
        index.extend([0, 0]);
        let n = index.len();
        for i in 0..6 {
            for j in 0..6 {
                index[n - 2] = i;
                index[n - 1] = j;
                self.set(&index, m[(i, j)]);
            }
        }
    }

    fn set_vec3(&mut self, prefix: &[usize], v: &Vec3) {
        let mut index = prefix.to_vec();
        index.push(0);
        let n = index.len();
        for k in 0..3 {
            index[n - 1] = k;
            self.set(&index, v[k]);
        }
    }

    fn from_mat6s(mats: &[Mat6]) -> Self {
        let mut out = Self::zeros(&[mats.len(), 6, 6]);
        for (i, m) in mats.iter().enumerate() {
            out.set_mat6(&[i], m);
        }
        out
    }
}

/// 0-based index to the kernel's 1-based encoding; `None` becomes 0
pub fn one_based(index: Option<usize>) -> i32 {
    index.map_or(0, |i| i as i32 + 1)
}

/// Model arrays in the layout the structural kernel consumes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlatArrays {
    pub num_node: usize,
    pub num_elem: usize,
    pub num_node_elem: usize,
    pub num_dof: usize,

    /// Nodes per element
    pub num_nodes: Vec<i32>,
    /// Beam group per element
    pub num_mem: Vec<i32>,
    /// `[num_elem, num_node_elem]`, 1-based node ids
    pub connectivities: ColumnMajor<i32>,
    /// `[num_elem, num_node_elem, 2]`, 1-based (element, local node)
    pub master: ColumnMajor<i32>,
    /// `[num_node, 2]`, 1-based (element, local node)
    pub node_master_elem: ColumnMajor<i32>,
    pub length: Vec<f64>,

    /// `[n_mass, 6, 6]`
    pub mass: ColumnMajor<f64>,
    /// `[n_stiff, 6, 6]`
    pub stiffness: ColumnMajor<f64>,
    /// `[n_stiff, 6, 6]`
    pub inv_stiffness: ColumnMajor<f64>,
    pub mass_indices: Vec<i32>,
    pub stiffness_indices: Vec<i32>,

    /// `[num_elem, num_node_elem, 3]`
    pub frame_of_reference_delta: ColumnMajor<f64>,

    pub vdof: Vec<i32>,
    pub fdof: Vec<i32>,

    /// `[num_node, 3]`
    pub pos_ini: ColumnMajor<f64>,
    /// `[num_elem, num_node_elem, 3]`
    pub psi_ini: ColumnMajor<f64>,
    /// `[num_elem, MAX_NODES_ELEM, 6, 6]`
    pub rbmass: ColumnMajor<f64>,
}

impl FlatArrays {
    /// Encode the current model
    pub fn from_model(model: &BeamModel) -> Self {
        let num_node = model.num_node();
        let num_elem = model.num_elem();
        let nne = model.num_node_elem();
        let elements = model.elements();
        let masters = model.master_table();
        let tables = model.properties();

        let mut connectivities = ColumnMajor::zeros(&[num_elem, nne]);
        let mut master = ColumnMajor::zeros(&[num_elem, nne, 2]);
        let mut frame_of_reference_delta = ColumnMajor::zeros(&[num_elem, nne, 3]);
        let mut psi_ini = ColumnMajor::zeros(&[num_elem, nne, 3]);
        let mut rbmass = ColumnMajor::zeros(&[num_elem, MAX_NODES_ELEM, 6, 6]);

        for elem in elements {
            let ielem = elem.index;
            for local in 0..elem.n_nodes {
                connectivities.set(&[ielem, local], one_based(Some(elem.global_nodes[local])));

                let m = masters.master(ielem, local);
                master.set(&[ielem, local, 0], one_based(m.map(|r| r.elem)));
                master.set(&[ielem, local, 1], one_based(m.map(|r| r.local)));

                frame_of_reference_delta.set_vec3(&[ielem, local], &elem.frame_of_reference_delta[local]);
                psi_ini.set_vec3(&[ielem, local], &elem.psi_ini(local));

                if let Some(block) = elem.rbmass(local) {
                    rbmass.set_mat6(&[ielem, local], block);
                }
            }
        }

        let mut node_master_elem = ColumnMajor::zeros(&[num_node, 2]);
        for (inode, m) in masters.node_master_entries().iter().enumerate() {
            node_master_elem.set(&[inode, 0], one_based(m.map(|r| r.elem)));
            node_master_elem.set(&[inode, 1], one_based(m.map(|r| r.local)));
        }

        let mut pos_ini = ColumnMajor::zeros(&[num_node, 3]);
        for (inode, p) in model.ini_info().pos.iter().enumerate() {
            pos_ini.set_vec3(&[inode], p);
        }

        Self {
            num_node,
            num_elem,
            num_node_elem: nne,
            num_dof: model.num_dof(),
            num_nodes: elements.iter().map(|e| e.n_nodes as i32).collect(),
            num_mem: elements.iter().map(|e| e.beam_number as i32).collect(),
            connectivities,
            master,
            node_master_elem,
            length: elements.iter().map(|e| e.length()).collect(),
            mass: ColumnMajor::from_mat6s(tables.mass()),
            stiffness: ColumnMajor::from_mat6s(tables.stiffness()),
            inv_stiffness: ColumnMajor::from_mat6s(tables.inv_stiffness()),
            mass_indices: elements.iter().map(|e| one_based(Some(e.mass_index))).collect(),
            stiffness_indices: elements
                .iter()
                .map(|e| one_based(Some(e.stiffness_index)))
                .collect(),
            frame_of_reference_delta,
            vdof: model.dofs().vdof().iter().map(|&d| one_based(d)).collect(),
            fdof: model.dofs().fdof().iter().map(|&d| one_based(d)).collect(),
            pos_ini,
            psi_ini,
            rbmass,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_major_offsets() {
        let mut a: ColumnMajor<i32> = ColumnMajor::zeros(&[2, 3]);
        a.set(&[1, 0], 5);
        a.set(&[0, 2], 7);
        assert_eq!(a.as_slice(), &[0, 5, 0, 0, 7, 0]);
        assert_eq!(a.get(&[1, 0]), 5);
        assert_eq!(a.offset(&[1, 2]), 5);
    }

    #[test]
    fn test_one_based() {
        assert_eq!(one_based(None), 0);
        assert_eq!(one_based(Some(0)), 1);
        assert_eq!(one_based(Some(9)), 10);
    }

    #[test]
    fn test_mat6_block_layout() {
        let mut m = Mat6::zeros();
        m[(1, 4)] = 2.5;
        let arr = ColumnMajor::from_mat6s(&[Mat6::zeros(), m]);
        assert_eq!(arr.dims(), &[2, 6, 6]);
        assert_eq!(arr.get(&[1, 1, 4]), 2.5);
        assert_eq!(arr.as_slice()[1 + 2 * (1 + 6 * 4)], 2.5);
    }
}
