//! Canonical atom ranking.
//!
//! Atoms start from a hash of local invariants and are refined Morgan-style
//! by their neighbors' ranks. Stereo descriptors then split atoms that are
//! only distinguished by configuration, and remaining ties are broken by
//! promoting whichever tied atom gives the smallest invariant trace.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use petgraph::graph::NodeIndex;

use crate::bond::BondOrder;
use crate::mol::{permutation_parity, AtomId, EZStereo, Mol, TetrahedralStereo};
use crate::traits::{
    HasAromaticity, HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount, HasIsotope,
    HasRadicalElectrons,
};

/// Atom properties every canonical ranking starts from.
pub trait CanonicalAtom:
    HasAtomicNum + HasHydrogenCount + HasFormalCharge + HasAromaticity + HasIsotope + HasRadicalElectrons
{
}

impl<T> CanonicalAtom for T where
    T: HasAtomicNum
        + HasHydrogenCount
        + HasFormalCharge
        + HasAromaticity
        + HasIsotope
        + HasRadicalElectrons
{
}

/// Bond properties every canonical ranking starts from.
pub trait CanonicalBond: HasBondOrder + HasAromaticity {}

impl<T> CanonicalBond for T where T: HasBondOrder + HasAromaticity {}

struct Fnv1aHasher(u64);

impl Fnv1aHasher {
    fn new() -> Self {
        Self(0xcbf29ce484222325)
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(0x100000001b3);
        }
    }
}

fn fnv<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut h = Fnv1aHasher::new();
    value.hash(&mut h);
    h.finish()
}

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct AtomInvariant {
    atomic_num: u8,
    degree: u8,
    hydrogen_count: u8,
    formal_charge: i8,
    radical_electrons: u8,
    is_aromatic: bool,
    isotope: u16,
    singles: u8,
    doubles: u8,
    triples: u8,
    aromatic_bonds: u8,
}

fn atom_invariant<A: CanonicalAtom, B: CanonicalBond>(
    mol: &Mol<A, B>,
    idx: NodeIndex,
) -> AtomInvariant {
    let atom = mol.atom(idx);
    let mut inv = AtomInvariant {
        atomic_num: atom.atomic_num(),
        degree: mol.neighbors(idx).count() as u8,
        hydrogen_count: atom.hydrogen_count(),
        formal_charge: atom.formal_charge(),
        radical_electrons: atom.radical_electrons(),
        is_aromatic: atom.is_aromatic(),
        isotope: atom.isotope(),
        singles: 0,
        doubles: 0,
        triples: 0,
        aromatic_bonds: 0,
    };
    for edge in mol.bonds_of(idx) {
        let bond = mol.bond(edge);
        if bond.is_aromatic() {
            inv.aromatic_bonds += 1;
            continue;
        }
        match bond.bond_order() {
            BondOrder::Single => inv.singles += 1,
            BondOrder::Double => inv.doubles += 1,
            BondOrder::Triple => inv.triples += 1,
        }
    }
    inv
}

fn ranks_from_values(values: &[u64]) -> Vec<usize> {
    let n = values.len();
    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by_key(|&i| values[i]);
    let mut ranks = vec![0usize; n];
    for k in 1..n {
        ranks[indices[k]] = if values[indices[k]] == values[indices[k - 1]] {
            ranks[indices[k - 1]]
        } else {
            k
        };
    }
    ranks
}

fn count_distinct(ranks: &[usize]) -> usize {
    let mut sorted = ranks.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len()
}

fn morgan_refine<A, B>(mol: &Mol<A, B>, ranks: &mut Vec<usize>) {
    let mut prev_distinct = count_distinct(ranks);
    loop {
        let values: Vec<u64> = mol
            .atoms()
            .map(|node| {
                let mut nb: Vec<usize> = mol.neighbors(node).map(|x| ranks[x.index()]).collect();
                nb.sort_unstable();
                fnv(&(ranks[node.index()], nb))
            })
            .collect();
        let next = ranks_from_values(&values);
        let distinct = count_distinct(&next);
        if distinct <= prev_distinct {
            return;
        }
        *ranks = next;
        prev_distinct = distinct;
    }
}

fn neighbor_ranks(stereo: &TetrahedralStereo, ranks: &[usize]) -> [usize; 4] {
    let virtual_rank = ranks.len();
    std::array::from_fn(|i| match stereo.above[i] {
        AtomId::Node(idx) => ranks[idx.index()],
        AtomId::VirtualH(..) => virtual_rank,
    })
}

/// Hash of a center's configuration relative to its neighbors' ranks.
/// Tied neighbors make the configuration undefined and hash alike.
fn tetrahedral_hash(ranks4: &[usize; 4], center_rank: usize) -> u64 {
    let mut sorted = *ranks4;
    sorted.sort_unstable();
    if sorted.windows(2).any(|w| w[0] == w[1]) {
        return fnv(&(center_rank, sorted, 3u8));
    }
    let parity: u8 = if permutation_parity(&sorted, ranks4) { 1 } else { 2 };
    fnv(&(center_rank, parity))
}

/// Whether the highest-ranked substituents on either end of `ez` are cis.
fn canonical_cis<A, B>(mol: &Mol<A, B>, ez: &EZStereo, ranks: &[usize]) -> Option<bool> {
    let (a, b) = ez.bond;
    let top = |end: NodeIndex, other: NodeIndex| {
        mol.neighbors(end)
            .filter(|&nb| nb != other)
            .max_by_key(|nb| ranks[nb.index()])
    };
    let (top_a, top_b) = (top(a, b)?, top(b, a)?);
    let flip_a = ez.refs[0] != AtomId::Node(top_a);
    let flip_b = ez.refs[1] != AtomId::Node(top_b);
    Some(ez.cis ^ flip_a ^ flip_b)
}

fn rehash_with(ranks: &mut Vec<usize>, stereo_values: &[Option<u64>]) {
    if stereo_values.iter().all(Option::is_none) {
        return;
    }
    let values: Vec<u64> = ranks
        .iter()
        .zip(stereo_values)
        .map(|(&r, s)| fnv(&(r, *s)))
        .collect();
    *ranks = ranks_from_values(&values);
}

fn chirality_refine<A, B>(mol: &Mol<A, B>, ranks: &mut Vec<usize>) {
    let n = ranks.len();
    let mut values = vec![None; n];
    for stereo in mol.tetrahedral_stereo() {
        let c = stereo.center.index();
        if c < n {
            values[c] = Some(tetrahedral_hash(&neighbor_ranks(stereo, ranks), ranks[c]));
        }
    }
    rehash_with(ranks, &values);
}

fn ez_refine<A, B>(mol: &Mol<A, B>, ranks: &mut Vec<usize>) {
    let n = ranks.len();
    let mut values = vec![None; n];
    for ez in mol.ez_stereo() {
        let (a, b) = ez.bond;
        if a.index() >= n || b.index() >= n {
            continue;
        }
        if let Some(cis) = canonical_cis(mol, ez, ranks) {
            let parity: u64 = if cis { 1 } else { 2 };
            values[a.index()] = Some(parity);
            values[b.index()] = Some(parity);
        }
    }
    rehash_with(ranks, &values);
}

fn refine_fully<A, B>(mol: &Mol<A, B>, ranks: &mut Vec<usize>) {
    morgan_refine(mol, ranks);
    loop {
        let prev = count_distinct(ranks);
        chirality_refine(mol, ranks);
        ez_refine(mol, ranks);
        morgan_refine(mol, ranks);
        if count_distinct(ranks) <= prev {
            break;
        }
    }
}

fn initial_ranks<A: CanonicalAtom, B: CanonicalBond>(
    mol: &Mol<A, B>,
) -> (Vec<AtomInvariant>, Vec<usize>) {
    let invariants: Vec<AtomInvariant> = mol.atoms().map(|i| atom_invariant(mol, i)).collect();
    let values: Vec<u64> = invariants.iter().map(fnv).collect();
    let ranks = ranks_from_values(&values);
    (invariants, ranks)
}

/// Graph symmetry classes: refined ranks from atom invariants alone, ignoring
/// stereo and without tie breaking. Atoms in the same class are
/// (up to the limits of Morgan refinement) topologically equivalent.
pub fn symmetry_classes<A: CanonicalAtom, B: CanonicalBond>(mol: &Mol<A, B>) -> Vec<usize> {
    let (_, mut ranks) = initial_ranks(mol);
    morgan_refine(mol, &mut ranks);
    ranks
}

/// A permutation `ranks` with `ranks[atom]` the canonical position of `atom`.
pub fn canonical_ordering<A: CanonicalAtom, B: CanonicalBond>(mol: &Mol<A, B>) -> Vec<usize> {
    let n = mol.atom_count();
    if n == 0 {
        return Vec::new();
    }

    let (invariants, mut ranks) = initial_ranks(mol);
    refine_fully(mol, &mut ranks);
    if count_distinct(&ranks) < n {
        break_ties(mol, &mut ranks, &invariants);
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&i| ranks[i]);
    let mut final_ranks = vec![0usize; n];
    for (rank, &atom) in order.iter().enumerate() {
        final_ranks[atom] = rank;
    }
    final_ranks
}

fn trace<A, B>(mol: &Mol<A, B>, ranks: &[usize], invariants: &[AtomInvariant]) -> Vec<u64> {
    let mut order: Vec<usize> = (0..ranks.len()).collect();
    order.sort_by_key(|&i| ranks[i]);
    order
        .iter()
        .map(|&i| {
            let node = NodeIndex::new(i);
            let mut nb: Vec<usize> = mol.neighbors(node).map(|x| ranks[x.index()]).collect();
            nb.sort_unstable();
            let tetra = mol
                .tetrahedral_stereo_for(node)
                .map(|s| tetrahedral_hash(&neighbor_ranks(s, ranks), ranks[i]));
            let ez = mol
                .ez_stereo()
                .iter()
                .find(|ez| ez.bond.0 == node || ez.bond.1 == node)
                .and_then(|ez| canonical_cis(mol, ez, ranks));
            fnv(&(&invariants[i], nb, tetra, ez))
        })
        .collect()
}

fn break_ties<A, B>(mol: &Mol<A, B>, ranks: &mut Vec<usize>, invariants: &[AtomInvariant]) {
    let n = ranks.len();
    while count_distinct(ranks) < n {
        let Some(target) = tied_rank_to_split(mol, ranks) else {
            return;
        };
        let tied: Vec<usize> = (0..n).filter(|&i| ranks[i] == target).collect();
        let promoted = ranks.iter().copied().max().unwrap_or(0) + 1;

        // Promote each tied atom in turn; keep the smallest invariant trace.
        let mut best: Option<(Vec<u64>, Vec<usize>)> = None;
        for &candidate in &tied {
            let mut trial = ranks.clone();
            trial[candidate] = promoted;
            refine_fully(mol, &mut trial);
            let t = trace(mol, &trial, invariants);
            if best.as_ref().map_or(true, |(bt, _)| t < *bt) {
                best = Some((t, trial));
            }
        }
        match best {
            Some((_, trial)) => *ranks = trial,
            None => return,
        }
    }
}

/// The smallest tied rank, preferring ranks that hold no stereocenter.
fn tied_rank_to_split<A, B>(mol: &Mol<A, B>, ranks: &[usize]) -> Option<usize> {
    let mut counts: HashMap<usize, usize> = HashMap::new();
    for &r in ranks {
        *counts.entry(r).or_default() += 1;
    }
    let tied: Vec<usize> = counts
        .into_iter()
        .filter(|&(_, c)| c > 1)
        .map(|(r, _)| r)
        .collect();

    let holds_stereo = |r: usize| {
        mol.tetrahedral_stereo()
            .iter()
            .any(|s| ranks.get(s.center.index()) == Some(&r))
    };
    tied.iter()
        .copied()
        .filter(|&r| !holds_stereo(r))
        .min()
        .or_else(|| tied.iter().copied().min())
}
