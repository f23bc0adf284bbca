//! Master/slave resolution of element-local nodes
//!
//! Every global node may be shared by several (element, local node) pairs.
//! One of them is canonical: orientation-dependent quantities of the node are
//! evaluated in that pair's frame and propagated to the others.

use serde::{Deserialize, Serialize};

use crate::error::{AeroelasticError, AeroelasticResult};

/// An (element, local node) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeRef {
    pub elem: usize,
    pub local: usize,
}

impl NodeRef {
    pub fn new(elem: usize, local: usize) -> Self {
        Self { elem, local }
    }
}

/// Master table and the per-node master lookup derived from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterTable {
    /// Master of each (element, local node); `None` only for the very first pair
    master: Vec<Vec<Option<NodeRef>>>,
    /// Master pair of each global node; `None` for nodes no element references
    node_master_elem: Vec<Option<NodeRef>>,
}

impl MasterTable {
    /// Resolve masters for the given connectivities
    ///
    /// Pairs are visited in element order, then local-node order. The master of
    /// a pair is the earliest pair in that order referencing the same global
    /// node, which can be the pair itself. The first pair of the first element
    /// is left unresolved.
    pub fn resolve(connectivities: &[Vec<usize>], num_node: usize) -> AeroelasticResult<Self> {
        let mut first_seen: Vec<Option<NodeRef>> = vec![None; num_node];
        let mut master = Vec::with_capacity(connectivities.len());

        for (ielem, conn) in connectivities.iter().enumerate() {
            let mut row = Vec::with_capacity(conn.len());
            for (ilocal, &node) in conn.iter().enumerate() {
                let slot = first_seen.get_mut(node).ok_or(AeroelasticError::IndexOutOfRange {
                    what: "connectivity node",
                    index: node,
                    len: num_node,
                })?;
                let first = *slot.get_or_insert(NodeRef::new(ielem, ilocal));

                if ielem == 0 && ilocal == 0 {
                    row.push(None);
                } else {
                    row.push(Some(first));
                }
            }
            master.push(row);
        }

        let node_master_elem = Self::node_master_elem(connectivities, &master, num_node);

        Ok(Self {
            master,
            node_master_elem,
        })
    }

    /// One master pair per global node; the first assignment for a node wins
    fn node_master_elem(
        connectivities: &[Vec<usize>],
        master: &[Vec<Option<NodeRef>>],
        num_node: usize,
    ) -> Vec<Option<NodeRef>> {
        let mut node_master = vec![None; num_node];
        for (ielem, conn) in connectivities.iter().enumerate() {
            for (ilocal, &node) in conn.iter().enumerate() {
                if node_master[node].is_some() {
                    continue;
                }
                node_master[node] = Some(master[ielem][ilocal].unwrap_or(NodeRef::new(ielem, ilocal)));
            }
        }
        node_master
    }

    /// Master entry of an (element, local node) pair
    pub fn master(&self, elem: usize, local: usize) -> Option<NodeRef> {
        self.master[elem][local]
    }

    /// Master pair of a global node
    pub fn node_master(&self, node: usize) -> Option<NodeRef> {
        self.node_master_elem[node]
    }

    /// Whether a pair is the canonical master of its node
    pub fn is_master(&self, elem: usize, local: usize) -> bool {
        match self.master[elem][local] {
            None => true,
            Some(m) => m == NodeRef::new(elem, local),
        }
    }

    pub fn entries(&self) -> &[Vec<Option<NodeRef>>] {
        &self.master
    }

    pub fn node_master_entries(&self) -> &[Option<NodeRef>] {
        &self.node_master_elem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Direct scan over all earlier pairs, element by element
    fn scan_masters(conn: &[Vec<usize>]) -> Vec<Vec<Option<NodeRef>>> {
        let mut master: Vec<Vec<Option<NodeRef>>> =
            conn.iter().map(|c| vec![None; c.len()]).collect();
        for i_elem in 0..conn.len() {
            for i_local in 0..conn[i_elem].len() {
                if i_elem == 0 && i_local == 0 {
                    continue;
                }
                'search: for j_elem in 0..=i_elem {
                    for j_local in 0..conn[j_elem].len() {
                        if conn[i_elem][i_local] == conn[j_elem][j_local] {
                            master[i_elem][i_local] = Some(NodeRef::new(j_elem, j_local));
                            break 'search;
                        }
                    }
                }
            }
        }
        master
    }

    fn three_noded_chain(num_elem: usize) -> Vec<Vec<usize>> {
        (0..num_elem).map(|e| vec![2 * e, 2 * e + 2, 2 * e + 1]).collect()
    }

    #[test]
    fn test_chain_masters() {
        let conn = three_noded_chain(3);
        let table = MasterTable::resolve(&conn, 7).unwrap();

        assert_eq!(table.master(0, 0), None);
        assert_eq!(table.master(0, 1), Some(NodeRef::new(0, 1)));
        // first node of element 1 is the end node of element 0
        assert_eq!(table.master(1, 0), Some(NodeRef::new(0, 1)));
        assert_eq!(table.master(2, 0), Some(NodeRef::new(1, 1)));
        assert!(table.is_master(1, 2));
        assert!(!table.is_master(1, 0));

        assert_eq!(table.node_master(0), Some(NodeRef::new(0, 0)));
        assert_eq!(table.node_master(2), Some(NodeRef::new(0, 1)));
        assert_eq!(table.node_master(5), Some(NodeRef::new(2, 2)));
    }

    #[test]
    fn test_matches_direct_scan_on_star_mesh() {
        // three beams sharing node 0, listed out of order
        let conn = vec![
            vec![3, 4],
            vec![0, 1],
            vec![2, 0],
            vec![0, 5],
            vec![4, 0],
        ];
        let table = MasterTable::resolve(&conn, 6).unwrap();
        assert_eq!(table.entries(), scan_masters(&conn).as_slice());
        assert_eq!(table.node_master(0), Some(NodeRef::new(1, 0)));
        assert_eq!(table.node_master(4), Some(NodeRef::new(0, 1)));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let conn = three_noded_chain(5);
        let first = MasterTable::resolve(&conn, 11).unwrap();
        let second = MasterTable::resolve(&conn, 11).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unreferenced_node_has_no_master() {
        let conn = vec![vec![0, 1]];
        let table = MasterTable::resolve(&conn, 3).unwrap();
        assert_eq!(table.node_master(2), None);
    }

    #[test]
    fn test_out_of_range_node() {
        let conn = vec![vec![0, 7]];
        assert!(MasterTable::resolve(&conn, 2).is_err());
    }
}
