//! Bond-order and formal-charge inference from a connectivity matrix.
//!
//! Every atom gets a list of candidate valences. For each combination of
//! candidates (in lexicographic order), unsaturated atoms are paired up by a
//! maximum matching and their bonds raised one order at a time until no
//! further pairing is possible. The first assignment that saturates every
//! atom with the requested total charge wins; otherwise the best partial
//! assignment seen is kept.

use log::warn;
use nalgebra::DMatrix;
use petgraph::algo::matching::maximum_matching;
use petgraph::graph::{NodeIndex, UnGraph};
use thiserror::Error;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::charges::clean_charges;
use crate::element::outer_shell_electrons;
use crate::mol::Mol;
use crate::neighbors::ConnectivityMatrix;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BondOrderError {
    #[error("atom {index}: no valence table for atomic number {atomic_num}")]
    UnsupportedElement { index: usize, atomic_num: u8 },
    #[error("atom {index}: {degree} neighbors exceed the maximum valence {max}")]
    ValenceExceeded { index: usize, degree: usize, max: u8 },
    #[error("bond {i}-{j}: order {order} outside 1..=3")]
    BadBondOrder { i: usize, j: usize, order: i32 },
    #[error("atom {index}: formal charge {charge} out of range")]
    ChargeOutOfRange { index: usize, charge: i32 },
    #[error("formal charges sum to {found}, expected {expected}")]
    ChargeMismatch { expected: i32, found: i32 },
    #[error("{atoms} atoms but a {size}x{size} connectivity matrix")]
    SizeMismatch { atoms: usize, size: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BondOrderOptions {
    /// Total molecular charge.
    pub charge: i32,
    /// Express valence deficits as formal charges. When false they become
    /// radical electrons and every formal charge stays zero.
    pub allow_charged_fragments: bool,
    /// Pair unsaturated atoms with a maximum matching instead of trying
    /// every maximal set of disjoint pairs.
    pub use_graph: bool,
    pub max_valence_combinations: usize,
}

impl Default for BondOrderOptions {
    fn default() -> Self {
        Self {
            charge: 0,
            allow_charged_fragments: true,
            use_graph: true,
            max_valence_combinations: 100_000,
        }
    }
}

/// Allowed total valences, in the order they are tried.
pub fn atomic_valences(atomic_num: u8) -> Option<&'static [u8]> {
    let valences: &'static [u8] = match atomic_num {
        1 => &[1],
        5 => &[3, 4],
        6 => &[4],
        7 => &[3, 4],
        8 => &[2, 1, 3],
        9 => &[1],
        14 => &[4],
        15 => &[5, 3],
        16 => &[6, 3, 2],
        17 => &[1],
        32 => &[4],
        35 => &[1],
        53 => &[1],
        _ => return None,
    };
    Some(valences)
}

/// Formal charge implied by a total bond order `valence`.
pub fn atomic_charge(atomic_num: u8, valence: i32) -> i32 {
    match (atomic_num, valence) {
        (1, v) => 1 - v,
        (5, v) => 3 - v,
        (15, 5) | (16, 6) => 0,
        (z, v) => i32::from(outer_shell_electrons(z)) - 8 + v,
    }
}

/// Infers a bond-order matrix over the bonds present in `connectivity`.
pub fn infer_bond_orders(
    atomic_numbers: &[u8],
    connectivity: &ConnectivityMatrix,
    options: &BondOrderOptions,
) -> Result<DMatrix<i32>, BondOrderError> {
    let n = atomic_numbers.len();
    if connectivity.len() != n {
        return Err(BondOrderError::SizeMismatch {
            atoms: n,
            size: connectivity.len(),
        });
    }
    let ac = DMatrix::from_fn(n, n, |i, j| i32::from(connectivity.bonded(i, j)));
    let degree: Vec<i32> = (0..n).map(|i| ac.row(i).sum()).collect();

    let mut candidates = Vec::with_capacity(n);
    for (index, (&z, &d)) in atomic_numbers.iter().zip(&degree).enumerate() {
        let table = atomic_valences(z).ok_or(BondOrderError::UnsupportedElement {
            index,
            atomic_num: z,
        })?;
        let possible: Vec<u8> = table
            .iter()
            .copied()
            .filter(|&v| i32::from(v) >= d)
            .collect();
        if possible.is_empty() {
            return Err(BondOrderError::ValenceExceeded {
                index,
                degree: d as usize,
                max: table.iter().copied().max().unwrap_or(0),
            });
        }
        candidates.push(possible);
    }

    let ctx = Context {
        atoms: atomic_numbers,
        ac: &ac,
        options,
    };
    let mut best = ac.clone();
    for (tried, valences) in ValenceProduct::new(&candidates).enumerate() {
        if tried == options.max_valence_combinations {
            warn!(
                "stopped after {} valence combinations, keeping best partial assignment",
                tried
            );
            break;
        }
        let (ua, du) = unsaturated(&valences, &degree);
        if ua.is_empty() && ctx.bo_is_ok(&ac, &du, &valences) {
            return Ok(ac);
        }
        for pairs in ua_pairs(&ua, &ac, options.use_graph) {
            let bo = ctx.grow(&pairs, du.clone(), &valences);
            if ctx.bo_is_ok(&bo, &du, &valences) {
                return Ok(bo);
            }
            if bo.sum() >= best.sum()
                && valences_not_too_large(&bo, &valences)
                && ctx.charge_is_ok(&bo)
            {
                best = bo;
            }
        }
    }
    Ok(best)
}

/// Builds a molecule from a bond-order matrix, assigning formal charges
/// (or radical electrons) from each atom's total bond order. Charged
/// molecules then go through [`clean_charges`].
pub fn build_molecule(
    atomic_numbers: &[u8],
    bo: &DMatrix<i32>,
    options: &BondOrderOptions,
) -> Result<Mol<Atom, Bond>, BondOrderError> {
    let n = atomic_numbers.len();
    if bo.nrows() != n || bo.ncols() != n {
        return Err(BondOrderError::SizeMismatch {
            atoms: n,
            size: bo.nrows(),
        });
    }

    let mut mol = Mol::new();
    let nodes: Vec<NodeIndex> = atomic_numbers
        .iter()
        .map(|&z| mol.add_atom(Atom::new(z)))
        .collect();
    for i in 0..n {
        for j in (i + 1)..n {
            let order = bo[(i, j)];
            if order == 0 {
                continue;
            }
            let bond_order = u8::try_from(order)
                .ok()
                .and_then(BondOrder::from_multiplicity)
                .ok_or(BondOrderError::BadBondOrder { i, j, order })?;
            mol.add_bond(nodes[i], nodes[j], Bond::new(bond_order));
        }
    }

    let valence: Vec<i32> = (0..n).map(|i| bo.row(i).sum()).collect();
    let mut running = 0;
    for (i, &z) in atomic_numbers.iter().enumerate() {
        let mut charge = atomic_charge(z, valence[i]);
        let atom = mol.atom_mut(nodes[i]);
        if !options.allow_charged_fragments {
            atom.radical_electrons = u8::try_from(charge.unsigned_abs())
                .map_err(|_| BondOrderError::ChargeOutOfRange { index: i, charge })?;
            continue;
        }
        running += charge;
        if z == 6 {
            let singles = bo.row(i).iter().filter(|&&v| v == 1).count();
            if singles == 2 && valence[i] == 2 {
                running += 1;
                charge = 0;
            }
            if singles == 3 && running + 1 < options.charge {
                running += 2;
                charge = 1;
            }
        }
        atom.formal_charge = i8::try_from(charge)
            .map_err(|_| BondOrderError::ChargeOutOfRange { index: i, charge })?;
    }

    if options.allow_charged_fragments {
        clean_charges(&mut mol);
    }

    let found: i32 = mol
        .atoms()
        .map(|a| i32::from(mol.atom(a).formal_charge))
        .sum();
    if found != options.charge {
        return Err(BondOrderError::ChargeMismatch {
            expected: options.charge,
            found,
        });
    }
    Ok(mol)
}

/// [`infer_bond_orders`] followed by [`build_molecule`].
pub fn assign_bond_orders(
    atomic_numbers: &[u8],
    connectivity: &ConnectivityMatrix,
    options: &BondOrderOptions,
) -> Result<Mol<Atom, Bond>, BondOrderError> {
    let bo = infer_bond_orders(atomic_numbers, connectivity, options)?;
    build_molecule(atomic_numbers, &bo, options)
}

struct Context<'a> {
    atoms: &'a [u8],
    ac: &'a DMatrix<i32>,
    options: &'a BondOrderOptions,
}

impl Context<'_> {
    /// Raises bond orders between paired unsaturated atoms until the
    /// deficits stop changing.
    fn grow(&self, pairs: &[(usize, usize)], mut du: Vec<i32>, valences: &[u8]) -> DMatrix<i32> {
        let mut bo = self.ac.clone();
        let mut pairs = pairs.to_vec();
        let mut previous = Vec::new();
        while previous != du {
            for &(i, j) in &pairs {
                bo[(i, j)] += 1;
                bo[(j, i)] += 1;
            }
            let bo_valence: Vec<i32> = (0..bo.nrows()).map(|i| bo.row(i).sum()).collect();
            previous = du;
            let (ua, next) = unsaturated(valences, &bo_valence);
            du = next;
            pairs = ua_pairs(&ua, self.ac, self.options.use_graph)
                .into_iter()
                .next()
                .unwrap_or_default();
        }
        bo
    }

    fn bo_is_ok(&self, bo: &DMatrix<i32>, du: &[i32], valences: &[u8]) -> bool {
        if !valences_not_too_large(bo, valences) {
            return false;
        }
        let added = (bo - self.ac).sum();
        added == du.iter().sum::<i32>() && self.charge_is_ok(bo)
    }

    fn charge_is_ok(&self, bo: &DMatrix<i32>) -> bool {
        let target = self.options.charge;
        if !self.options.allow_charged_fragments {
            return target == 0;
        }
        let mut total = 0;
        for (i, &z) in self.atoms.iter().enumerate() {
            let valence = bo.row(i).sum();
            total += atomic_charge(z, valence);
            if z == 6 {
                let singles = bo.row(i).iter().filter(|&&v| v == 1).count();
                if singles == 2 && valence == 2 {
                    total += 1;
                }
                if singles == 3 && total + 1 < target {
                    total += 2;
                }
            }
        }
        total == target
    }
}

fn valences_not_too_large(bo: &DMatrix<i32>, valences: &[u8]) -> bool {
    valences
        .iter()
        .enumerate()
        .all(|(i, &v)| bo.row(i).sum() <= i32::from(v))
}

/// Atoms whose valence exceeds their current bond-order sum, with the deficit.
fn unsaturated(valences: &[u8], bond_valence: &[i32]) -> (Vec<usize>, Vec<i32>) {
    let mut ua = Vec::new();
    let mut du = Vec::new();
    for (i, (&max, &current)) in valences.iter().zip(bond_valence).enumerate() {
        let deficit = i32::from(max) - current;
        if deficit > 0 {
            ua.push(i);
            du.push(deficit);
        }
    }
    (ua, du)
}

/// Candidate pairings of bonded unsaturated atoms. Always holds at least
/// one (possibly empty) pairing.
fn ua_pairs(ua: &[usize], ac: &DMatrix<i32>, use_graph: bool) -> Vec<Vec<(usize, usize)>> {
    let mut bonds = Vec::new();
    for (k, &i) in ua.iter().enumerate() {
        for &j in &ua[k + 1..] {
            if ac[(i, j)] == 1 {
                bonds.push((i.min(j), i.max(j)));
            }
        }
    }
    if bonds.is_empty() {
        return vec![Vec::new()];
    }

    if use_graph {
        let mut graph = UnGraph::<usize, ()>::new_undirected();
        let nodes: Vec<NodeIndex> = ua.iter().map(|&i| graph.add_node(i)).collect();
        let position = |atom: usize| ua.iter().position(|&u| u == atom);
        for &(i, j) in &bonds {
            if let (Some(a), Some(b)) = (position(i), position(j)) {
                graph.add_edge(nodes[a], nodes[b], ());
            }
        }
        let matching = maximum_matching(&graph);
        let pairs = matching
            .edges()
            .map(|(a, b)| {
                let (i, j) = (graph[a], graph[b]);
                (i.min(j), i.max(j))
            })
            .collect();
        return vec![pairs];
    }

    let mut best_cover = 0;
    let mut result = vec![Vec::new()];
    for combo in Combinations::new(bonds.len(), ua.len() / 2) {
        let mut covered: Vec<usize> = combo
            .iter()
            .flat_map(|&k| [bonds[k].0, bonds[k].1])
            .collect();
        covered.sort_unstable();
        covered.dedup();
        let pairs: Vec<(usize, usize)> = combo.iter().map(|&k| bonds[k]).collect();
        if covered.len() > best_cover {
            best_cover = covered.len();
            result = vec![pairs];
        } else if covered.len() == best_cover {
            result.push(pairs);
        }
    }
    result
}

/// Cartesian product of per-atom candidate lists, last atom varying fastest.
struct ValenceProduct<'a> {
    lists: &'a [Vec<u8>],
    index: Vec<usize>,
    done: bool,
}

impl<'a> ValenceProduct<'a> {
    fn new(lists: &'a [Vec<u8>]) -> Self {
        Self {
            lists,
            index: vec![0; lists.len()],
            done: lists.iter().any(Vec::is_empty),
        }
    }
}

impl Iterator for ValenceProduct<'_> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        if self.done {
            return None;
        }
        let item = self
            .index
            .iter()
            .zip(self.lists)
            .map(|(&k, list)| list[k])
            .collect();
        self.done = true;
        for k in (0..self.index.len()).rev() {
            self.index[k] += 1;
            if self.index[k] < self.lists[k].len() {
                self.done = false;
                break;
            }
            self.index[k] = 0;
        }
        Some(item)
    }
}

/// `k`-subsets of `0..n` in lexicographic order.
struct Combinations {
    n: usize,
    current: Option<Vec<usize>>,
}

impl Combinations {
    fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            current: (k <= n).then(|| (0..k).collect()),
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let item = self.current.take()?;
        let k = item.len();
        let mut next = item.clone();
        let mut i = k;
        while i > 0 {
            i -= 1;
            if next[i] < self.n - k + i {
                next[i] += 1;
                for j in (i + 1)..k {
                    next[j] = next[j - 1] + 1;
                }
                self.current = Some(next);
                break;
            }
        }
        Some(item)
    }
}
