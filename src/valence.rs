use petgraph::graph::NodeIndex;
use thiserror::Error;

use crate::element::Element;
use crate::mol::Mol;
use crate::traits::{
    HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount, HasRadicalElectrons,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("atom {} ({symbol}{formal_charge:+}): valence {actual_valence} exceeds {max_valence}", .atom_idx.index())]
pub struct ValenceError {
    pub atom_idx: NodeIndex,
    pub symbol: &'static str,
    pub formal_charge: i8,
    pub actual_valence: u8,
    pub max_valence: u8,
}

/// Bond-order sum plus hydrogens plus unpaired electrons.
pub fn total_valence<A, B>(mol: &Mol<A, B>, atom: NodeIndex) -> u8
where
    A: HasHydrogenCount + HasRadicalElectrons,
    B: HasBondOrder,
{
    let bond_sum: u8 = mol
        .bonds_of(atom)
        .map(|ei| mol.bond(ei).bond_order().multiplicity())
        .sum();
    let a = mol.atom(atom);
    bond_sum + a.hydrogen_count() + a.radical_electrons()
}

/// Largest default valence of the element isoelectronic with a charged atom
/// (N⁺ behaves like C, O⁻ like F). `None` when no valence is tabulated.
pub fn max_valence(atomic_num: u8, formal_charge: i8) -> Option<u8> {
    let effective = i16::from(atomic_num) - i16::from(formal_charge);
    let effective = u8::try_from(effective).ok()?;
    Element::from_atomic_num(effective)?
        .default_valences()
        .iter()
        .copied()
        .max()
}

/// Rejects atoms whose total valence exceeds what their (charge-adjusted)
/// element allows. Elements without default valences are not checked.
pub fn check_valence<A, B>(mol: &Mol<A, B>) -> Result<(), Vec<ValenceError>>
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount + HasRadicalElectrons,
    B: HasBondOrder,
{
    let errors: Vec<ValenceError> = mol
        .atoms()
        .filter_map(|idx| {
            let atom = mol.atom(idx);
            let max = max_valence(atom.atomic_num(), atom.formal_charge())?;
            let v = total_valence(mol, idx);
            if v <= max {
                return None;
            }
            Some(ValenceError {
                atom_idx: idx,
                symbol: Element::from_atomic_num(atom.atomic_num())
                    .map(|e| e.symbol())
                    .unwrap_or("?"),
                formal_charge: atom.formal_charge(),
                actual_valence: v,
                max_valence: max,
            })
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;
    use crate::bond::{Bond, BondOrder};

    fn single_atom(atomic_num: u8, formal_charge: i8, hydrogen_count: u8) -> Mol<Atom, Bond> {
        let mut mol = Mol::new();
        mol.add_atom(Atom {
            atomic_num,
            formal_charge,
            hydrogen_count,
            ..Atom::default()
        });
        mol
    }

    #[test]
    fn methane_valid() {
        assert!(check_valence(&single_atom(6, 0, 4)).is_ok());
    }

    #[test]
    fn ethene_total_valence() {
        let mut mol = Mol::<Atom, Bond>::new();
        let a = mol.add_atom(Atom {
            hydrogen_count: 2,
            ..Atom::new(6)
        });
        let b = mol.add_atom(Atom {
            hydrogen_count: 2,
            ..Atom::new(6)
        });
        mol.add_bond(a, b, Bond::new(BondOrder::Double));
        assert_eq!(total_valence(&mol, a), 4);
        assert!(check_valence(&mol).is_ok());
    }

    #[test]
    fn pentavalent_carbon_invalid() {
        let mol = single_atom(6, 0, 5);
        let errs = check_valence(&mol).unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].atom_idx, NodeIndex::new(0));
        assert_eq!(errs[0].actual_valence, 5);
        assert_eq!(errs[0].max_valence, 4);
        assert_eq!(errs[0].to_string(), "atom 0 (C+0): valence 5 exceeds 4");
    }

    #[test]
    fn ammonium_checked_as_carbon() {
        assert!(check_valence(&single_atom(7, 1, 4)).is_ok());
        assert!(check_valence(&single_atom(7, 1, 5)).is_err());
    }

    #[test]
    fn hydroxide_checked_as_fluorine() {
        assert!(check_valence(&single_atom(8, -1, 1)).is_ok());
        assert!(check_valence(&single_atom(8, -1, 2)).is_err());
    }

    #[test]
    fn radical_counts_toward_valence() {
        let mut mol = single_atom(6, 0, 3);
        mol.atom_mut(NodeIndex::new(0)).radical_electrons = 1;
        assert!(check_valence(&mol).is_ok());
        mol.atom_mut(NodeIndex::new(0)).radical_electrons = 2;
        assert!(check_valence(&mol).is_err());
    }

    #[test]
    fn metal_and_proton_skipped() {
        assert!(check_valence(&single_atom(26, 0, 6)).is_ok());
        assert!(check_valence(&single_atom(1, 1, 0)).is_ok());
    }
}
