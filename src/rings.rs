//! Smallest set of smallest rings.
//!
//! Candidate cycles are built Horton-style from shortest paths (one per
//! vertex/edge pair), sorted by length and kept greedily while they are
//! linearly independent over GF(2) in edge space.

use std::collections::VecDeque;

use petgraph::algo::connected_components;
use petgraph::graph::NodeIndex;

use crate::mol::Mol;

#[derive(Debug, Clone, Default)]
pub struct RingInfo {
    rings: Vec<Vec<NodeIndex>>,
}

impl RingInfo {
    pub fn sssr<A, B>(mol: &Mol<A, B>) -> Self {
        let needed = Self::cyclomatic_number(mol);
        if needed == 0 {
            return Self::default();
        }

        let mut basis = CycleBasis::new(mol.bond_count());
        let mut rings = Vec::with_capacity(needed);
        for ring in candidate_rings(mol) {
            if rings.len() == needed {
                break;
            }
            if basis.insert(edge_set(&ring, mol, basis.words)) {
                rings.push(canonical_rotation(&ring));
            }
        }
        rings.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        Self { rings }
    }

    /// `E − V + C`: the number of independent cycles.
    pub fn cyclomatic_number<A, B>(mol: &Mol<A, B>) -> usize {
        let components = connected_components(mol.graph());
        (mol.bond_count() + components).saturating_sub(mol.atom_count())
    }

    pub fn num_rings(&self) -> usize {
        self.rings.len()
    }

    pub fn rings(&self) -> &[Vec<NodeIndex>] {
        &self.rings
    }

    pub fn is_ring_atom(&self, atom: NodeIndex) -> bool {
        self.rings.iter().any(|ring| ring.contains(&atom))
    }

    pub fn is_ring_bond(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.bond_ring_sizes(a, b).next().is_some()
    }

    pub fn smallest_ring_size(&self, atom: NodeIndex) -> Option<usize> {
        self.rings
            .iter()
            .filter(|ring| ring.contains(&atom))
            .map(Vec::len)
            .min()
    }

    /// Size of the smallest SSSR ring containing the bond `a`–`b`.
    pub fn smallest_bond_ring_size(&self, a: NodeIndex, b: NodeIndex) -> Option<usize> {
        self.bond_ring_sizes(a, b).min()
    }

    fn bond_ring_sizes(&self, a: NodeIndex, b: NodeIndex) -> impl Iterator<Item = usize> + '_ {
        self.rings
            .iter()
            .filter(move |ring| ring_has_edge(ring, a, b))
            .map(Vec::len)
    }
}

fn ring_has_edge(ring: &[NodeIndex], a: NodeIndex, b: NodeIndex) -> bool {
    let len = ring.len();
    (0..len).any(|i| {
        let (x, y) = (ring[i], ring[(i + 1) % len]);
        (x == a && y == b) || (x == b && y == a)
    })
}

/// BFS distances and predecessors from every source.
struct ShortestPaths {
    dist: Vec<Vec<u32>>,
    pred: Vec<Vec<Option<NodeIndex>>>,
}

impl ShortestPaths {
    fn new<A, B>(mol: &Mol<A, B>) -> Self {
        let n = mol.atom_count();
        let mut dist = vec![vec![u32::MAX; n]; n];
        let mut pred = vec![vec![None; n]; n];
        for src in 0..n {
            dist[src][src] = 0;
            let mut queue = VecDeque::from([NodeIndex::new(src)]);
            while let Some(cur) = queue.pop_front() {
                let d = dist[src][cur.index()];
                for nb in mol.neighbors(cur) {
                    if dist[src][nb.index()] == u32::MAX {
                        dist[src][nb.index()] = d + 1;
                        pred[src][nb.index()] = Some(cur);
                        queue.push_back(nb);
                    }
                }
            }
        }
        Self { dist, pred }
    }

    fn path(&self, src: NodeIndex, dst: NodeIndex) -> Option<Vec<NodeIndex>> {
        let mut path = vec![dst];
        let mut cur = dst;
        while cur != src {
            cur = self.pred[src.index()][cur.index()]?;
            path.push(cur);
        }
        path.reverse();
        Some(path)
    }
}

/// Horton candidates: for each vertex `w` and edge `u–v`, the cycle
/// `w → u`, `u–v`, `v → w` when the two shortest paths only meet at `w`.
fn candidate_rings<A, B>(mol: &Mol<A, B>) -> Vec<Vec<NodeIndex>> {
    let paths = ShortestPaths::new(mol);
    let mut candidates = Vec::new();

    for edge in mol.bonds() {
        let Some((u, v)) = mol.bond_endpoints(edge) else {
            continue;
        };
        for w in mol.atoms() {
            let du = paths.dist[w.index()][u.index()];
            let dv = paths.dist[w.index()][v.index()];
            if du == u32::MAX || dv == u32::MAX || du + dv + 1 < 3 {
                continue;
            }
            let (Some(to_u), Some(to_v)) = (paths.path(w, u), paths.path(w, v)) else {
                continue;
            };
            if to_u[1..].iter().any(|x| to_v[1..].contains(x)) {
                continue;
            }
            let mut ring = to_u;
            ring.extend(to_v[1..].iter().rev());
            candidates.push(ring);
        }
    }

    candidates.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    candidates.dedup();
    candidates
}

fn edge_set<A, B>(ring: &[NodeIndex], mol: &Mol<A, B>, words: usize) -> Vec<u64> {
    let mut bits = vec![0u64; words];
    let len = ring.len();
    for i in 0..len {
        if let Some(edge) = mol.bond_between(ring[i], ring[(i + 1) % len]) {
            let k = edge.index();
            bits[k / 64] |= 1u64 << (k % 64);
        }
    }
    bits
}

/// Incrementally reduced GF(2) basis of edge sets.
struct CycleBasis {
    rows: Vec<(usize, Vec<u64>)>,
    words: usize,
}

impl CycleBasis {
    fn new(edges: usize) -> Self {
        Self {
            rows: Vec::new(),
            words: edges.div_ceil(64),
        }
    }

    /// Adds `bits` if it is independent of the rows so far.
    fn insert(&mut self, mut bits: Vec<u64>) -> bool {
        for (pivot, row) in &self.rows {
            if bits[pivot / 64] & (1u64 << (pivot % 64)) != 0 {
                for (b, r) in bits.iter_mut().zip(row) {
                    *b ^= *r;
                }
            }
        }
        let pivot = bits
            .iter()
            .enumerate()
            .find(|&(_, &w)| w != 0)
            .map(|(i, &w)| i * 64 + w.trailing_zeros() as usize);
        match pivot {
            Some(pivot) => {
                self.rows.push((pivot, bits));
                true
            }
            None => false,
        }
    }
}

/// Rotates a ring to start at its lowest atom, walking toward the lower
/// of that atom's two ring neighbors.
fn canonical_rotation(ring: &[NodeIndex]) -> Vec<NodeIndex> {
    let len = ring.len();
    let start = ring
        .iter()
        .enumerate()
        .min_by_key(|&(_, idx)| idx)
        .map_or(0, |(i, _)| i);
    let mut out: Vec<NodeIndex> = (0..len).map(|i| ring[(start + i) % len]).collect();
    if len > 2 && out[1] > out[len - 1] {
        out[1..].reverse();
    }
    out
}
