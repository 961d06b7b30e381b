//! Hand-built molecules shared by unit tests.

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;

/// Atoms as `(atomic number, hydrogen count)`, bonds as `(i, j, order)`.
pub fn molecule(atoms: &[(u8, u8)], bonds: &[(usize, usize, u8)]) -> Mol<Atom, Bond> {
    let mut mol = Mol::new();
    for &(atomic_num, hydrogen_count) in atoms {
        mol.add_atom(Atom {
            hydrogen_count,
            ..Atom::new(atomic_num)
        });
    }
    for &(i, j, order) in bonds {
        let order = BondOrder::from_multiplicity(order).expect("bond order 1..=3");
        mol.add_bond(NodeIndex::new(i), NodeIndex::new(j), Bond::new(order));
    }
    mol
}

/// A carbon skeleton with single bonds and no hydrogens.
pub fn skeleton(n: usize, bonds: &[(usize, usize)]) -> Mol<Atom, Bond> {
    let atoms = vec![(6, 0); n];
    let bonds: Vec<_> = bonds.iter().map(|&(i, j)| (i, j, 1)).collect();
    molecule(&atoms, &bonds)
}
