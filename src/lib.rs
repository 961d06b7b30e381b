//! Bonding and canonical SMILES from 3D coordinates.
//!
//! An extended-XYZ frame is turned into a molecule by trying a list of
//! covalent-radius multipliers: each builds a neighbor graph, checks it is
//! one symmetric connected component, infers bond orders and formal charges
//! from valence rules, and writes the result as canonical SMILES.
//!
//! ```
//! use geosmiles::{smiles_for, xyz::read_frames, Emit, Options};
//!
//! let text = "3\nwater\nO 0.0 0.0 0.0\nH 0.9572 0.0 0.0\nH -0.239988 0.926627 0.0\n";
//! let frames = read_frames(text.as_bytes()).unwrap();
//! // one SMILES per successful multiplier, hydrogens kept as atoms
//! assert_eq!(smiles_for(&frames[0], &Options::default()), vec!["[H]O[H]"; 5]);
//!
//! let folded = Options { explicit_hydrogens: false, emit: Emit::First, ..Options::default() };
//! assert_eq!(smiles_for(&frames[0], &folded), vec!["O"]);
//! ```

pub mod aromaticity;
pub mod atom;
pub mod bond;
pub mod bond_order;
pub mod canonical;
pub mod charges;
pub mod config;
pub mod element;
pub mod graph_ops;
pub mod hydrogen;
pub mod mol;
pub mod neighbors;
pub mod pipeline;
pub mod rings;
pub mod smiles;
pub mod stereo;
pub mod traits;
pub mod valence;
pub mod xyz;

pub use atom::Atom;
pub use bond::{Bond, BondOrder};
pub use bond_order::{assign_bond_orders, BondOrderError, BondOrderOptions};
pub use config::{Emit, Options};
pub use element::Element;
pub use mol::{AtomId, EZStereo, Mol, TetrahedralStereo};
pub use neighbors::{ConnectivityMatrix, NeighborError, NeighborList};
pub use pipeline::{infer, smiles_for, Attempt, InferenceError};
pub use smiles::{to_canonical_smiles, to_smiles};
pub use traits::{
    HasAromaticity, HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount, HasIsotope,
    HasRadicalElectrons,
};
pub use xyz::{Frame, XyzError};

#[cfg(test)]
mod fixtures;
#[cfg(test)]
mod tests;
