//! Charge clean-up after bond orders and formal charges are assigned.
//!
//! The valence enumeration can settle on a carbanion sitting next to a
//! conjugated system that would rather carry the charge elsewhere. Two
//! rewrites move the negative charge along an alternating single/double
//! path, swapping bond orders on the way:
//!
//! * a ring carbanion (or aza-anion) in a six-membered C/N ring hands its
//!   charge to an exocyclic C/N double-bonded to the ring, leaving the ring
//!   with three alternating double bonds;
//! * a carbanion conjugated to a carbonyl oxygen becomes an enolate.
//!
//! Rewrites repeat until none applies. The total charge never changes.

use log::debug;
use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::rings::RingInfo;

/// Longest carbonyl-to-carbanion path, in bonds.
const MAX_ENOLATE_PATH: usize = 6;

/// Applies every charge shift that matches and returns how many were made.
pub fn clean_charges(mol: &mut Mol<Atom, Bond>) -> usize {
    let mut shifts = 0;
    while shifts < mol.atom_count() {
        let rings = RingInfo::sssr(mol);
        let Some(path) = ring_anion_path(mol, &rings).or_else(|| enolate_path(mol)) else {
            break;
        };
        debug!(
            "moving charge from atom {} to atom {}",
            path[0].index(),
            path[path.len() - 1].index()
        );
        shift_charge(mol, &path);
        shifts += 1;
    }
    shifts
}

fn order(mol: &Mol<Atom, Bond>, a: NodeIndex, b: NodeIndex) -> Option<BondOrder> {
    mol.bond_between(a, b).map(|e| mol.bond(e).order)
}

fn is_c_or_n(mol: &Mol<Atom, Bond>, atom: NodeIndex) -> bool {
    matches!(mol.atom(atom).atomic_num, 6 | 7)
}

fn is_carbanion(mol: &Mol<Atom, Bond>, atom: NodeIndex) -> bool {
    let a = mol.atom(atom);
    a.atomic_num == 6 && a.formal_charge == -1
}

/// Three-connected C⁻ or N⁻.
fn is_ring_anion(mol: &Mol<Atom, Bond>, atom: NodeIndex) -> bool {
    let a = mol.atom(atom);
    let connections = mol.neighbors(atom).count() + usize::from(a.hydrogen_count);
    is_c_or_n(mol, atom) && a.formal_charge == -1 && connections == 3
}

/// Path anion → ... → exocyclic acceptor, for a six-membered C/N ring
/// that becomes fully alternating once the path is flipped.
fn ring_anion_path(mol: &Mol<Atom, Bond>, rings: &RingInfo) -> Option<Vec<NodeIndex>> {
    for ring in rings.rings() {
        if ring.len() != 6 || !ring.iter().all(|&a| is_c_or_n(mol, a)) {
            continue;
        }
        for start in 0..6 {
            if !is_ring_anion(mol, ring[start]) {
                continue;
            }
            for step in [1, 5] {
                let seq: Vec<NodeIndex> = (0..6).map(|i| ring[(start + i * step) % 6]).collect();
                for along in [1, 3] {
                    if let Some(path) = ring_shift(mol, &seq, along) {
                        return Some(path);
                    }
                }
            }
        }
    }
    None
}

/// `seq` walks the ring from the anion. The charge travels `along` ring
/// bonds, then leaves through an exocyclic double bond.
fn ring_shift(mol: &Mol<Atom, Bond>, seq: &[NodeIndex], along: usize) -> Option<Vec<NodeIndex>> {
    let pivot = seq[along];
    let acceptor = mol.neighbors(pivot).find(|&x| {
        !seq.contains(&x)
            && is_c_or_n(mol, x)
            && mol.atom(x).formal_charge == 0
            && order(mol, pivot, x) == Some(BondOrder::Double)
    })?;

    for i in 0..6 {
        let current = order(mol, seq[i], seq[(i + 1) % 6])?;
        let flipped = if i < along { flip(current)? } else { current };
        let wanted = if i % 2 == 0 {
            BondOrder::Double
        } else {
            BondOrder::Single
        };
        if flipped != wanted {
            return None;
        }
    }

    let mut path = seq[..=along].to_vec();
    path.push(acceptor);
    Some(path)
}

/// Path carbanion → ... → carbonyl oxygen, alternating single/double.
fn enolate_path(mol: &Mol<Atom, Bond>) -> Option<Vec<NodeIndex>> {
    for oxygen in mol.atoms() {
        let o = mol.atom(oxygen);
        if o.atomic_num != 8 || o.formal_charge != 0 {
            continue;
        }
        let mut path = vec![oxygen];
        if extend_enolate(mol, &mut path) {
            path.reverse();
            return Some(path);
        }
    }
    None
}

/// Depth-first walk from the oxygen; bond `k` of the path must be double
/// for even `k` and single for odd `k`, ending on a carbanion.
fn extend_enolate(mol: &Mol<Atom, Bond>, path: &mut Vec<NodeIndex>) -> bool {
    let k = path.len() - 1;
    if k >= MAX_ENOLATE_PATH {
        return false;
    }
    let wanted = if k % 2 == 0 {
        BondOrder::Double
    } else {
        BondOrder::Single
    };
    let tip = path[k];
    let next: Vec<NodeIndex> = mol
        .neighbors(tip)
        .filter(|n| !path.contains(n) && order(mol, tip, *n) == Some(wanted))
        .collect();
    for n in next {
        if k == 0 && mol.atom(n).atomic_num != 6 {
            continue;
        }
        path.push(n);
        if wanted == BondOrder::Single && is_carbanion(mol, n) {
            return true;
        }
        if mol.atom(n).formal_charge == 0 && extend_enolate(mol, path) {
            return true;
        }
        path.pop();
    }
    false
}

fn flip(order: BondOrder) -> Option<BondOrder> {
    match order {
        BondOrder::Single => Some(BondOrder::Double),
        BondOrder::Double => Some(BondOrder::Single),
        _ => None,
    }
}

/// Moves one negative charge from `path[0]` to its last atom and swaps
/// single and double bonds along the way.
fn shift_charge(mol: &mut Mol<Atom, Bond>, path: &[NodeIndex]) {
    for pair in path.windows(2) {
        if let Some(e) = mol.bond_between(pair[0], pair[1]) {
            let bond = mol.bond_mut(e);
            if let Some(flipped) = flip(bond.order) {
                bond.order = flipped;
            }
        }
    }
    mol.atom_mut(path[0]).formal_charge += 1;
    if let Some(&last) = path.last() {
        mol.atom_mut(last).formal_charge -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::molecule;

    fn charged(mut mol: Mol<Atom, Bond>, anion: usize) -> Mol<Atom, Bond> {
        mol.atom_mut(NodeIndex::new(anion)).formal_charge = -1;
        mol
    }

    fn order_of(mol: &Mol<Atom, Bond>, i: usize, j: usize) -> Option<BondOrder> {
        order(mol, NodeIndex::new(i), NodeIndex::new(j))
    }

    fn charges(mol: &Mol<Atom, Bond>) -> Vec<i8> {
        mol.atoms().map(|a| mol.atom(a).formal_charge).collect()
    }

    #[test]
    fn carbanion_next_to_carbonyl_becomes_enolate() {
        // O=CH-CH2(-)
        let mut mol = charged(molecule(&[(8, 0), (6, 1), (6, 2)], &[(0, 1, 2), (1, 2, 1)]), 2);
        assert_eq!(clean_charges(&mut mol), 1);
        assert_eq!(charges(&mol), vec![-1, 0, 0]);
        assert_eq!(order_of(&mol, 0, 1), Some(BondOrder::Single));
        assert_eq!(order_of(&mol, 1, 2), Some(BondOrder::Double));
    }

    #[test]
    fn vinylogous_enolate() {
        // O=CH-CH=CH-CH2(-)
        let mut mol = charged(
            molecule(
                &[(8, 0), (6, 1), (6, 1), (6, 1), (6, 2)],
                &[(0, 1, 2), (1, 2, 1), (2, 3, 2), (3, 4, 1)],
            ),
            4,
        );
        assert_eq!(clean_charges(&mut mol), 1);
        assert_eq!(charges(&mol), vec![-1, 0, 0, 0, 0]);
        assert_eq!(order_of(&mol, 0, 1), Some(BondOrder::Single));
        assert_eq!(order_of(&mol, 1, 2), Some(BondOrder::Double));
        assert_eq!(order_of(&mol, 2, 3), Some(BondOrder::Single));
        assert_eq!(order_of(&mol, 3, 4), Some(BondOrder::Double));
    }

    #[test]
    fn ring_anion_moves_to_adjacent_exocyclic_atom() {
        // ring 0..5, anion at 0, exocyclic C6 double-bonded to ring atom 1
        let mut mol = charged(
            molecule(
                &[(6, 1), (6, 0), (6, 1), (6, 1), (6, 1), (6, 1), (6, 2)],
                &[
                    (0, 1, 1),
                    (1, 2, 1),
                    (2, 3, 2),
                    (3, 4, 1),
                    (4, 5, 2),
                    (5, 0, 1),
                    (1, 6, 2),
                ],
            ),
            0,
        );
        assert_eq!(clean_charges(&mut mol), 1);
        assert_eq!(charges(&mol), vec![0, 0, 0, 0, 0, 0, -1]);
        assert_eq!(order_of(&mol, 0, 1), Some(BondOrder::Double));
        assert_eq!(order_of(&mol, 1, 6), Some(BondOrder::Single));
        assert_eq!(order_of(&mol, 2, 3), Some(BondOrder::Double));
        assert_eq!(order_of(&mol, 4, 5), Some(BondOrder::Double));
    }

    #[test]
    fn ring_anion_moves_across_the_ring() {
        // anion at 0; exocyclic C6 double-bonded to ring atom 3
        let mut mol = charged(
            molecule(
                &[(6, 1), (6, 1), (6, 1), (6, 0), (6, 1), (6, 1), (6, 2)],
                &[
                    (0, 1, 1),
                    (1, 2, 2),
                    (2, 3, 1),
                    (3, 4, 1),
                    (4, 5, 2),
                    (5, 0, 1),
                    (3, 6, 2),
                ],
            ),
            0,
        );
        assert_eq!(clean_charges(&mut mol), 1);
        assert_eq!(charges(&mol), vec![0, 0, 0, 0, 0, 0, -1]);
        assert_eq!(order_of(&mol, 0, 1), Some(BondOrder::Double));
        assert_eq!(order_of(&mol, 1, 2), Some(BondOrder::Single));
        assert_eq!(order_of(&mol, 2, 3), Some(BondOrder::Double));
        assert_eq!(order_of(&mol, 3, 6), Some(BondOrder::Single));
        assert_eq!(order_of(&mol, 4, 5), Some(BondOrder::Double));
    }

    #[test]
    fn aza_anion_in_ring() {
        // same as the adjacent case with the anion on nitrogen
        let mut mol = charged(
            molecule(
                &[(7, 1), (6, 0), (6, 1), (6, 1), (6, 1), (6, 1), (6, 2)],
                &[
                    (0, 1, 1),
                    (1, 2, 1),
                    (2, 3, 2),
                    (3, 4, 1),
                    (4, 5, 2),
                    (5, 0, 1),
                    (1, 6, 2),
                ],
            ),
            0,
        );
        assert_eq!(clean_charges(&mut mol), 1);
        assert_eq!(charges(&mol), vec![0, 0, 0, 0, 0, 0, -1]);
    }

    #[test]
    fn isolated_and_neutral_molecules_untouched() {
        // CH3(-) has nowhere to go
        let mut methyl = charged(molecule(&[(6, 3)], &[]), 0);
        assert_eq!(clean_charges(&mut methyl), 0);
        assert_eq!(charges(&methyl), vec![-1]);

        // acetaldehyde
        let mut neutral = molecule(&[(8, 0), (6, 1), (6, 3)], &[(0, 1, 2), (1, 2, 1)]);
        assert_eq!(clean_charges(&mut neutral), 0);
        assert_eq!(order_of(&neutral, 0, 1), Some(BondOrder::Double));

        // the carbanion is not conjugated to the carbonyl
        let mut saturated = charged(
            molecule(&[(8, 0), (6, 1), (6, 2), (6, 2)], &[(0, 1, 2), (1, 2, 1), (2, 3, 1)]),
            3,
        );
        assert_eq!(clean_charges(&mut saturated), 0);
        assert_eq!(charges(&saturated), vec![0, 0, 0, -1]);
    }
}
