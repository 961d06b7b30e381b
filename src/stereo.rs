//! Tetrahedral and double-bond stereo perception from 3D coordinates.
//!
//! A stereocenter needs four single-bonded ligands in four different
//! symmetry classes; its configuration is read from the sign of the
//! signed volume spanned by the ligands. A stereo double bond needs one or
//! two substituents per end (distinct when there are two) and must not sit
//! in a ring smaller than eight; cis/trans is read from the torsion angle
//! between the reference substituents. Geometries too close to planar (or
//! to a 90° torsion) are left unassigned.

use nalgebra::{Point3, Vector3};
use petgraph::graph::NodeIndex;
use thiserror::Error;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::canonical::symmetry_classes;
use crate::mol::{AtomId, EZStereo, Mol, TetrahedralStereo};
use crate::rings::RingInfo;

/// Smallest ring in which a double bond can carry E/Z.
pub const MIN_STEREO_RING_SIZE: usize = 8;

const MIN_CHIRAL_VOLUME: f64 = 0.1;
const MIN_TORSION_COS: f64 = 0.2;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StereoError {
    #[error("{positions} positions for {atoms} atoms")]
    LengthMismatch { atoms: usize, positions: usize },
}

/// Replaces the stereo records of `mol` with those perceived from
/// `positions` (indexed by atom).
pub fn assign_from_coordinates(
    mol: &mut Mol<Atom, Bond>,
    positions: &[Point3<f64>],
) -> Result<(), StereoError> {
    if positions.len() != mol.atom_count() {
        return Err(StereoError::LengthMismatch {
            atoms: mol.atom_count(),
            positions: positions.len(),
        });
    }
    let classes = symmetry_classes(mol);
    let rings = RingInfo::sssr(mol);
    let tetrahedral = perceive_tetrahedral(mol, positions, &classes);
    let ez = perceive_double_bonds(mol, positions, &classes, &rings);
    mol.set_tetrahedral_stereo(tetrahedral);
    mol.set_ez_stereo(ez);
    Ok(())
}

fn sorted_neighbors(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> Vec<NodeIndex> {
    let mut nbs: Vec<NodeIndex> = mol.neighbors(idx).collect();
    nbs.sort();
    nbs
}

fn all_distinct(classes: &[usize]) -> bool {
    let mut sorted = classes.to_vec();
    sorted.sort_unstable();
    sorted.windows(2).all(|w| w[0] != w[1])
}

/// `a · (b × c)` of unit vectors.
pub fn signed_volume(a: Vector3<f64>, b: Vector3<f64>, c: Vector3<f64>) -> f64 {
    let (Some(a), Some(b), Some(c)) = (
        a.try_normalize(1e-12),
        b.try_normalize(1e-12),
        c.try_normalize(1e-12),
    ) else {
        return 0.0;
    };
    a.dot(&b.cross(&c))
}

pub fn perceive_tetrahedral(
    mol: &Mol<Atom, Bond>,
    positions: &[Point3<f64>],
    classes: &[usize],
) -> Vec<TetrahedralStereo> {
    let mut out = Vec::new();
    for center in mol.atoms() {
        let atom = mol.atom(center);
        let nbs = sorted_neighbors(mol, center);
        let implicit_h = usize::from(atom.hydrogen_count);
        if nbs.len() + implicit_h != 4 || implicit_h > 1 {
            continue;
        }
        if mol
            .bonds_of(center)
            .any(|e| mol.bond(e).order != BondOrder::Single)
        {
            continue;
        }

        let mut ligand_classes: Vec<usize> = nbs.iter().map(|n| classes[n.index()]).collect();
        if implicit_h == 1 {
            ligand_classes.push(usize::MAX);
        }
        if !all_distinct(&ligand_classes) {
            continue;
        }

        let c = positions[center.index()];
        let mut dirs: Vec<Vector3<f64>> = nbs
            .iter()
            .map(|n| (positions[n.index()] - c).try_normalize(1e-12).unwrap_or_default())
            .collect();
        let mut ligands: Vec<AtomId> = nbs.iter().map(|&n| AtomId::Node(n)).collect();
        if implicit_h == 1 {
            // Opposite the three heavy ligands.
            dirs.push(-(dirs[0] + dirs[1] + dirs[2]));
            ligands.push(AtomId::VirtualH(center, 0));
        }

        let v = signed_volume(dirs[1], dirs[2], dirs[3]);
        if v.abs() < MIN_CHIRAL_VOLUME {
            continue;
        }
        let mut above = [ligands[0], ligands[1], ligands[2], ligands[3]];
        if v > 0.0 {
            above.swap(2, 3);
        }
        out.push(TetrahedralStereo { center, above });
    }
    out
}

/// Cosine of the torsion angle `a-b-c-d`.
pub fn torsion_cos(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>, d: Point3<f64>) -> Option<f64> {
    let b1 = b - a;
    let b2 = c - b;
    let b3 = d - c;
    let n1 = b1.cross(&b2).try_normalize(1e-12)?;
    let n2 = b2.cross(&b3).try_normalize(1e-12)?;
    Some(n1.dot(&n2))
}

fn double_bond_count(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> usize {
    mol.bonds_of(idx)
        .filter(|&e| mol.bond(e).order == BondOrder::Double)
        .count()
}

/// Substituents of `end` other than `other`, or `None` if the end cannot
/// carry E/Z.
fn stereo_substituents(
    mol: &Mol<Atom, Bond>,
    end: NodeIndex,
    other: NodeIndex,
    classes: &[usize],
) -> Option<Vec<NodeIndex>> {
    if double_bond_count(mol, end) != 1 {
        return None;
    }
    let subs: Vec<NodeIndex> = sorted_neighbors(mol, end)
        .into_iter()
        .filter(|&n| n != other)
        .collect();
    let implicit_h = usize::from(mol.atom(end).hydrogen_count);
    match (subs.len(), implicit_h) {
        (1, 0) | (1, 1) => Some(subs),
        (2, 0) if classes[subs[0].index()] != classes[subs[1].index()] => Some(subs),
        _ => None,
    }
}

pub fn perceive_double_bonds(
    mol: &Mol<Atom, Bond>,
    positions: &[Point3<f64>],
    classes: &[usize],
    rings: &RingInfo,
) -> Vec<EZStereo> {
    let mut out = Vec::new();
    for edge in mol.bonds() {
        if mol.bond(edge).order != BondOrder::Double {
            continue;
        }
        let Some((a, b)) = mol.bond_endpoints(edge) else {
            continue;
        };
        if rings
            .smallest_bond_ring_size(a, b)
            .is_some_and(|size| size < MIN_STEREO_RING_SIZE)
        {
            continue;
        }
        let (Some(subs_a), Some(subs_b)) = (
            stereo_substituents(mol, a, b, classes),
            stereo_substituents(mol, b, a, classes),
        ) else {
            continue;
        };
        let (ref_a, ref_b) = (subs_a[0], subs_b[0]);
        let Some(cos) = torsion_cos(
            positions[ref_a.index()],
            positions[a.index()],
            positions[b.index()],
            positions[ref_b.index()],
        ) else {
            continue;
        };
        if cos.abs() < MIN_TORSION_COS {
            continue;
        }
        out.push(EZStereo::new(
            a,
            b,
            AtomId::Node(ref_a),
            AtomId::Node(ref_b),
            cos > 0.0,
        ));
    }
    out
}
