use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

/// A stereo ligand: either a graph node or the `n`-th hydrogen folded into
/// the given parent atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomId {
    Node(NodeIndex),
    VirtualH(NodeIndex, u8),
}

/// Tetrahedral center. Looking from `above[0]` towards `center`, the
/// remaining three ligands run counter-clockwise (SMILES `@` when written
/// in this order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TetrahedralStereo {
    pub center: NodeIndex,
    pub above: [AtomId; 4],
}

impl TetrahedralStereo {
    pub fn map(self, f: impl Fn(AtomId) -> AtomId) -> Self {
        Self {
            center: self.center,
            above: self.above.map(f),
        }
    }
}

/// Double-bond configuration. `bond` is stored low index first, `refs[0]`
/// is a neighbor of `bond.0` and `refs[1]` a neighbor of `bond.1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EZStereo {
    pub bond: (NodeIndex, NodeIndex),
    pub refs: [AtomId; 2],
    /// Whether the two references sit on the same side of the double bond.
    pub cis: bool,
}

impl EZStereo {
    /// Builds a record with the endpoints in either order.
    pub fn new(a: NodeIndex, b: NodeIndex, ref_a: AtomId, ref_b: AtomId, cis: bool) -> Self {
        if a.index() <= b.index() {
            Self { bond: (a, b), refs: [ref_a, ref_b], cis }
        } else {
            Self { bond: (b, a), refs: [ref_b, ref_a], cis }
        }
    }
}

pub struct Mol<A, B> {
    graph: UnGraph<A, B>,
    tetrahedral_stereo: Vec<TetrahedralStereo>,
    ez_stereo: Vec<EZStereo>,
}

impl<A, B> Mol<A, B> {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::default(),
            tetrahedral_stereo: Vec::new(),
            ez_stereo: Vec::new(),
        }
    }

    pub fn graph(&self) -> &UnGraph<A, B> {
        &self.graph
    }

    pub fn atom(&self, idx: NodeIndex) -> &A {
        &self.graph[idx]
    }

    pub fn atom_mut(&mut self, idx: NodeIndex) -> &mut A {
        &mut self.graph[idx]
    }

    pub fn bond(&self, idx: EdgeIndex) -> &B {
        &self.graph[idx]
    }

    pub fn bond_mut(&mut self, idx: EdgeIndex) -> &mut B {
        &mut self.graph[idx]
    }

    pub fn add_atom(&mut self, atom: A) -> NodeIndex {
        self.graph.add_node(atom)
    }

    pub fn add_bond(&mut self, a: NodeIndex, b: NodeIndex, bond: B) -> EdgeIndex {
        self.graph.add_edge(a, b, bond)
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    pub fn bonds_of(&self, idx: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edges(idx).map(|e| e.id())
    }

    pub fn atoms(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn bonds(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    pub fn bond_between(&self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(a, b)
    }

    pub fn bond_endpoints(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(idx)
    }

    pub fn tetrahedral_stereo(&self) -> &[TetrahedralStereo] {
        &self.tetrahedral_stereo
    }

    pub fn set_tetrahedral_stereo(&mut self, stereo: Vec<TetrahedralStereo>) {
        self.tetrahedral_stereo = stereo;
    }

    pub fn tetrahedral_stereo_for(&self, center: NodeIndex) -> Option<&TetrahedralStereo> {
        self.tetrahedral_stereo.iter().find(|s| s.center == center)
    }

    pub fn add_tetrahedral_stereo(&mut self, stereo: TetrahedralStereo) {
        self.tetrahedral_stereo.push(stereo);
    }

    pub fn ez_stereo(&self) -> &[EZStereo] {
        &self.ez_stereo
    }

    pub fn set_ez_stereo(&mut self, stereo: Vec<EZStereo>) {
        self.ez_stereo = stereo;
    }

    pub fn ez_stereo_for(&self, a: NodeIndex, b: NodeIndex) -> Option<&EZStereo> {
        let (lo, hi) = if a.index() < b.index() {
            (a, b)
        } else {
            (b, a)
        };
        self.ez_stereo.iter().find(|s| s.bond == (lo, hi))
    }

    pub fn add_ez_stereo(&mut self, stereo: EZStereo) {
        self.ez_stereo.push(stereo);
    }
}

impl<A: Clone, B: Clone> Clone for Mol<A, B> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            tetrahedral_stereo: self.tetrahedral_stereo.clone(),
            ez_stereo: self.ez_stereo.clone(),
        }
    }
}

impl<A, B> Default for Mol<A, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: PartialEq, B: PartialEq> PartialEq for Mol<A, B> {
    fn eq(&self, other: &Self) -> bool {
        if self.atom_count() != other.atom_count() || self.bond_count() != other.bond_count() {
            return false;
        }
        for idx in self.atoms() {
            if idx.index() >= other.atom_count() {
                return false;
            }
            if self.atom(idx) != other.atom(idx) {
                return false;
            }
        }
        for idx in self.bonds() {
            if idx.index() >= other.bond_count() {
                return false;
            }
            if self.bond(idx) != other.bond(idx) {
                return false;
            }
            if self.bond_endpoints(idx) != other.bond_endpoints(idx) {
                return false;
            }
        }
        self.tetrahedral_stereo == other.tetrahedral_stereo && self.ez_stereo == other.ez_stereo
    }
}

impl<A: std::fmt::Debug, B: std::fmt::Debug> std::fmt::Debug for Mol<A, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mol")
            .field("atom_count", &self.atom_count())
            .field("bond_count", &self.bond_count())
            .field("tetrahedral_stereo", &self.tetrahedral_stereo)
            .field("ez_stereo", &self.ez_stereo)
            .finish()
    }
}

pub(crate) fn permutation_parity<T: Eq>(from: &[T], to: &[T]) -> bool {
    let n = from.len();
    if n != to.len() {
        return true;
    }
    let perm: Vec<usize> = from
        .iter()
        .map(|f| to.iter().position(|t| t == f).unwrap_or(0))
        .collect();
    let mut visited = vec![false; n];
    let mut swaps = 0usize;
    for i in 0..n {
        if visited[i] {
            continue;
        }
        let mut cycle_len = 0;
        let mut j = i;
        while !visited[j] {
            visited[j] = true;
            j = perm[j];
            cycle_len += 1;
        }
        swaps += cycle_len - 1;
    }
    swaps % 2 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parity_counts_transpositions() {
        assert!(permutation_parity(&[0, 1, 2, 3], &[0, 1, 2, 3]));
        assert!(!permutation_parity(&[0, 1, 2, 3], &[1, 0, 2, 3]));
        assert!(permutation_parity(&[0, 1, 2, 3], &[1, 2, 0, 3]));
        assert!(permutation_parity(&[0, 1, 2, 3], &[3, 2, 1, 0]));
    }

    #[test]
    fn ez_record_is_stored_low_index_first() {
        let (a, b) = (NodeIndex::new(4), NodeIndex::new(1));
        let ref_a = AtomId::Node(NodeIndex::new(5));
        let ref_b = AtomId::VirtualH(b, 0);
        let ez = EZStereo::new(a, b, ref_a, ref_b, true);
        assert_eq!(ez.bond, (b, a));
        assert_eq!(ez.refs, [ref_b, ref_a]);

        let mut mol = Mol::<(), ()>::new();
        mol.add_ez_stereo(ez);
        assert_eq!(mol.ez_stereo_for(a, b), Some(&ez));
        assert_eq!(mol.ez_stereo_for(b, a), Some(&ez));
    }

    #[test]
    fn tetrahedral_map_keeps_center() {
        let c = NodeIndex::new(0);
        let ids = [1, 2, 3, 4].map(|i| AtomId::Node(NodeIndex::new(i)));
        let t = TetrahedralStereo { center: c, above: ids };
        let mapped = t.map(|id| match id {
            AtomId::Node(n) if n.index() == 4 => AtomId::VirtualH(c, 0),
            other => other,
        });
        assert_eq!(mapped.center, c);
        assert_eq!(mapped.above[3], AtomId::VirtualH(c, 0));
        assert_eq!(mapped.above[..3], ids[..3]);
    }
}
