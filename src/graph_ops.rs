use petgraph::graph::NodeIndex;
use thiserror::Error;

use crate::mol::{AtomId, EZStereo, Mol};

/// Connected components, each sorted by atom index, in order of their
/// lowest atom.
pub fn connected_components<A, B>(mol: &Mol<A, B>) -> Vec<Vec<NodeIndex>> {
    let mut visited = vec![false; mol.atom_count()];
    let mut components = Vec::new();
    for start in mol.atoms() {
        if visited[start.index()] {
            continue;
        }
        visited[start.index()] = true;
        let mut component = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            component.push(current);
            for nb in mol.neighbors(current) {
                if !visited[nb.index()] {
                    visited[nb.index()] = true;
                    stack.push(nb);
                }
            }
        }
        component.sort();
        components.push(component);
    }
    components
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenumberError {
    #[error("new order has {got} entries for {expected} atoms")]
    LengthMismatch { expected: usize, got: usize },
    #[error("new order is not a permutation")]
    InvalidPermutation,
}

fn validate_permutation(new_order: &[usize], n: usize) -> Result<(), RenumberError> {
    if new_order.len() != n {
        return Err(RenumberError::LengthMismatch {
            expected: n,
            got: new_order.len(),
        });
    }
    let mut seen = vec![false; n];
    for &idx in new_order {
        if idx >= n || seen[idx] {
            return Err(RenumberError::InvalidPermutation);
        }
        seen[idx] = true;
    }
    Ok(())
}

/// Copy of `mol` in which new atom `i` is old atom `new_order[i]`. Stereo
/// records follow their atoms.
pub fn renumber_atoms<A: Clone, B: Clone>(
    mol: &Mol<A, B>,
    new_order: &[usize],
) -> Result<Mol<A, B>, RenumberError> {
    let n = mol.atom_count();
    validate_permutation(new_order, n)?;

    let mut out = Mol::new();
    for &old in new_order {
        out.add_atom(mol.atom(NodeIndex::new(old)).clone());
    }

    let mut old_to_new = vec![NodeIndex::new(0); n];
    for (new, &old) in new_order.iter().enumerate() {
        old_to_new[old] = NodeIndex::new(new);
    }
    let remap = |aid: AtomId| match aid {
        AtomId::Node(idx) => AtomId::Node(old_to_new[idx.index()]),
        AtomId::VirtualH(parent, k) => AtomId::VirtualH(old_to_new[parent.index()], k),
    };

    for edge in mol.bonds() {
        if let Some((a, b)) = mol.bond_endpoints(edge) {
            out.add_bond(
                old_to_new[a.index()],
                old_to_new[b.index()],
                mol.bond(edge).clone(),
            );
        }
    }

    let tetrahedral = mol
        .tetrahedral_stereo()
        .iter()
        .map(|s| {
            let mut s = s.map(remap);
            s.center = old_to_new[s.center.index()];
            s
        })
        .collect();
    out.set_tetrahedral_stereo(tetrahedral);

    let ez = mol
        .ez_stereo()
        .iter()
        .map(|s| {
            EZStereo::new(
                old_to_new[s.bond.0.index()],
                old_to_new[s.bond.1.index()],
                remap(s.refs[0]),
                remap(s.refs[1]),
                s.cis,
            )
        })
        .collect();
    out.set_ez_stereo(ez);

    Ok(out)
}
