use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::{AtomId, EZStereo, Mol, TetrahedralStereo};

/// Whether `idx` is a plain hydrogen that can become part of its neighbor's
/// hydrogen count: neutral, no isotope label, no unpaired electron, a
/// single bond to exactly one non-hydrogen atom.
fn is_foldable(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> Option<NodeIndex> {
    let atom = mol.atom(idx);
    if atom.atomic_num != 1
        || atom.isotope != 0
        || atom.formal_charge != 0
        || atom.radical_electrons != 0
    {
        return None;
    }
    let mut neighbors = mol.neighbors(idx);
    let parent = neighbors.next()?;
    if neighbors.next().is_some() || mol.atom(parent).atomic_num == 1 {
        return None;
    }
    let bond = mol.bond_between(idx, parent)?;
    (mol.bond(bond).order == BondOrder::Single).then_some(parent)
}

/// Removes explicit hydrogen atoms, adding them to their neighbor's
/// `hydrogen_count`.
///
/// Hydrogens bonded to another hydrogen, isolated hydrogens and labelled
/// hydrogens stay in the graph. Stereo records that referred to a folded
/// hydrogen refer to [`AtomId::VirtualH`] of its parent afterwards;
/// surviving atoms keep their relative order.
pub fn fold_hydrogens(mol: &Mol<Atom, Bond>) -> Mol<Atom, Bond> {
    let n = mol.atom_count();
    let mut folded_into: Vec<Option<(NodeIndex, u8)>> = vec![None; n];
    let mut extra_h = vec![0u8; n];

    for idx in mol.atoms() {
        if let Some(parent) = is_foldable(mol, idx) {
            let slot = mol.atom(parent).hydrogen_count + extra_h[parent.index()];
            folded_into[idx.index()] = Some((parent, slot));
            extra_h[parent.index()] += 1;
        }
    }

    let mut out = Mol::new();
    let mut index_map: Vec<Option<NodeIndex>> = vec![None; n];
    for idx in mol.atoms() {
        if folded_into[idx.index()].is_some() {
            continue;
        }
        let atom = mol.atom(idx);
        index_map[idx.index()] = Some(out.add_atom(Atom {
            hydrogen_count: atom.hydrogen_count + extra_h[idx.index()],
            ..atom.clone()
        }));
    }

    for edge in mol.bonds() {
        let Some((a, b)) = mol.bond_endpoints(edge) else {
            continue;
        };
        if let (Some(na), Some(nb)) = (index_map[a.index()], index_map[b.index()]) {
            out.add_bond(na, nb, mol.bond(edge).clone());
        }
    }

    let remap = |aid: AtomId| -> Option<AtomId> {
        match aid {
            AtomId::Node(idx) => match folded_into[idx.index()] {
                Some((parent, slot)) => Some(AtomId::VirtualH(index_map[parent.index()]?, slot)),
                None => Some(AtomId::Node(index_map[idx.index()]?)),
            },
            AtomId::VirtualH(parent, k) => Some(AtomId::VirtualH(index_map[parent.index()]?, k)),
        }
    };

    let tetrahedral: Vec<TetrahedralStereo> = mol
        .tetrahedral_stereo()
        .iter()
        .filter_map(|s| {
            let center = index_map[s.center.index()]?;
            let [a, b, c, d] = s.above;
            Some(TetrahedralStereo {
                center,
                above: [remap(a)?, remap(b)?, remap(c)?, remap(d)?],
            })
        })
        .collect();
    out.set_tetrahedral_stereo(tetrahedral);

    let ez: Vec<EZStereo> = mol
        .ez_stereo()
        .iter()
        .filter_map(|s| {
            Some(EZStereo::new(
                index_map[s.bond.0.index()]?,
                index_map[s.bond.1.index()]?,
                remap(s.refs[0])?,
                remap(s.refs[1])?,
                s.cis,
            ))
        })
        .collect();
    out.set_ez_stereo(ez);

    out
}
