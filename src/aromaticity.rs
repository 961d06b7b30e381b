//! Hückel aromaticity perception on Kekulé structures.
//!
//! Each SSSR ring is tested on its own: every member must be able to
//! contribute to a π system, the ring needs a double bond and may not
//! contain a triple bond, and the π electron count must be `4n + 2`. Bond orders are left untouched;
//! only the `is_aromatic` flags of atoms and ring bonds are set.

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::rings::RingInfo;
use crate::traits::{HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount};

const SP2_CAPABLE: [u8; 9] = [
    5,  // B
    6,  // C
    7,  // N
    8,  // O
    15, // P
    16, // S
    33, // As
    34, // Se
    52, // Te
];

/// SSSR rings that satisfy the Hückel rule.
pub fn aromatic_rings<A, B>(mol: &Mol<A, B>) -> Vec<Vec<NodeIndex>>
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    RingInfo::sssr(mol)
        .rings()
        .iter()
        .filter(|ring| is_aromatic_ring(mol, ring))
        .cloned()
        .collect()
}

pub fn find_aromatic_atoms<A, B>(mol: &Mol<A, B>) -> Vec<bool>
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    let mut aromatic = vec![false; mol.atom_count()];
    for ring in aromatic_rings(mol) {
        for atom in ring {
            aromatic[atom.index()] = true;
        }
    }
    aromatic
}

/// Marks atoms and ring bonds of aromatic rings. Previous flags are cleared.
pub fn set_aromaticity(mol: &mut Mol<Atom, Bond>) {
    let rings = aromatic_rings(mol);

    let atoms: Vec<NodeIndex> = mol.atoms().collect();
    for &idx in &atoms {
        mol.atom_mut(idx).is_aromatic = false;
    }
    let bonds: Vec<_> = mol.bonds().collect();
    for e in bonds {
        mol.bond_mut(e).is_aromatic = false;
    }

    for ring in rings {
        let len = ring.len();
        for i in 0..len {
            let (a, b) = (ring[i], ring[(i + 1) % len]);
            mol.atom_mut(a).is_aromatic = true;
            if let Some(e) = mol.bond_between(a, b) {
                mol.bond_mut(e).is_aromatic = true;
            }
        }
    }
}

fn is_aromatic_ring<A, B>(mol: &Mol<A, B>, ring: &[NodeIndex]) -> bool
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    if ring.len() < 3 {
        return false;
    }
    if ring
        .iter()
        .any(|&a| !SP2_CAPABLE.contains(&mol.atom(a).atomic_num()))
    {
        return false;
    }

    let len = ring.len();
    let ring_bond = |i: usize| mol.bond_between(ring[i], ring[(i + 1) % len]);
    if (0..len)
        .filter_map(ring_bond)
        .any(|e| mol.bond(e).bond_order() == BondOrder::Triple)
    {
        return false;
    }
    // a ring of lone-pair donors alone is saturated, not aromatic
    if !(0..len)
        .filter_map(ring_bond)
        .any(|e| mol.bond(e).bond_order() == BondOrder::Double)
    {
        return false;
    }

    let mut total = 0u32;
    for &atom in ring {
        match pi_electrons(mol, atom, ring) {
            Some(e) => total += u32::from(e),
            None => return false,
        }
    }
    total >= 2 && (total - 2) % 4 == 0
}

/// Where the double bonds of `atom` point, relative to `ring`.
struct DoubleBonds {
    in_ring: bool,
    exocyclic_to_heteroatom: bool,
    exocyclic_other: bool,
}

fn double_bonds<A, B>(mol: &Mol<A, B>, atom: NodeIndex, ring: &[NodeIndex]) -> DoubleBonds
where
    A: HasAtomicNum,
    B: HasBondOrder,
{
    let pos = ring.iter().position(|&r| r == atom);
    let len = ring.len();
    let ring_neighbors = pos.map(|p| [ring[(p + len - 1) % len], ring[(p + 1) % len]]);

    let mut out = DoubleBonds {
        in_ring: false,
        exocyclic_to_heteroatom: false,
        exocyclic_other: false,
    };
    for nb in mol.neighbors(atom) {
        let Some(e) = mol.bond_between(atom, nb) else {
            continue;
        };
        if mol.bond(e).bond_order() != BondOrder::Double {
            continue;
        }
        if ring_neighbors.is_some_and(|rn| rn.contains(&nb)) {
            out.in_ring = true;
        } else if matches!(mol.atom(nb).atomic_num(), 7 | 8 | 16) {
            out.exocyclic_to_heteroatom = true;
        } else {
            out.exocyclic_other = true;
        }
    }
    out
}

fn pi_electrons<A, B>(mol: &Mol<A, B>, atom: NodeIndex, ring: &[NodeIndex]) -> Option<u8>
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    let a = mol.atom(atom);
    let doubles = double_bonds(mol, atom, ring);
    let any_double =
        doubles.in_ring || doubles.exocyclic_to_heteroatom || doubles.exocyclic_other;
    let degree = mol.neighbors(atom).count() + usize::from(a.hydrogen_count());

    match (a.atomic_num(), a.formal_charge()) {
        (6, 0) => {
            if doubles.in_ring || doubles.exocyclic_other {
                Some(1)
            } else if doubles.exocyclic_to_heteroatom {
                Some(0)
            } else {
                None
            }
        }
        (6, -1) => Some(if any_double { 1 } else { 2 }),
        (6, 1) => Some(if any_double { 1 } else { 0 }),
        (7 | 15 | 33, 0) => {
            if doubles.in_ring {
                Some(1)
            } else if !any_double && degree <= 3 {
                Some(2)
            } else {
                None
            }
        }
        (7 | 15 | 33, 1) => doubles.in_ring.then_some(1),
        (7, -1) => (!any_double && degree == 2).then_some(2),
        (8 | 16 | 34 | 52, 0) => (!any_double && degree == 2).then_some(2),
        (8 | 16 | 34 | 52, 1) => doubles.in_ring.then_some(1),
        (5, 0) => Some(if any_double { 1 } else { 0 }),
        _ => None,
    }
}
