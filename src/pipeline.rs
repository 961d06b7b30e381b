//! From coordinates to SMILES.
//!
//! Each covalent-radius multiplier is an independent attempt: neighbor list,
//! connectivity checks, bond orders and charges, valence check, stereo,
//! hydrogen folding, aromaticity and the canonical string. A failed attempt
//! is logged and the next multiplier is tried.

use std::path::Path;

use log::{debug, info};
use thiserror::Error;

use crate::aromaticity::set_aromaticity;
use crate::atom::Atom;
use crate::bond::Bond;
use crate::bond_order::{assign_bond_orders, BondOrderError};
use crate::config::{Emit, Options};
use crate::hydrogen::fold_hydrogens;
use crate::mol::Mol;
use crate::neighbors::{covalent_cutoffs, Cell, NeighborError, NeighborList};
use crate::smiles::to_canonical_smiles;
use crate::stereo::{assign_from_coordinates, StereoError};
use crate::valence::{check_valence, ValenceError};
use crate::xyz::{read_file, read_first_frame, Frame, XyzError};

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error(transparent)]
    Xyz(#[from] XyzError),
    #[error(transparent)]
    Neighbors(#[from] NeighborError),
    #[error(transparent)]
    BondOrder(#[from] BondOrderError),
    #[error(transparent)]
    Stereo(#[from] StereoError),
    #[error("connectivity matrix is not symmetric")]
    NotSymmetric,
    #[error("atoms do not form a single connected molecule")]
    Disconnected,
    #[error("{}", describe_valence(.0))]
    Valence(Vec<ValenceError>),
}

fn describe_valence(errors: &[ValenceError]) -> String {
    let parts: Vec<String> = errors.iter().map(ToString::to_string).collect();
    format!("valence check failed: {}", parts.join("; "))
}

/// Result of one covalent-radius multiplier.
#[derive(Debug)]
pub struct Attempt {
    pub multiplier: f64,
    pub outcome: Result<String, InferenceError>,
}

impl Attempt {
    pub fn smiles(&self) -> Option<&str> {
        self.outcome.as_deref().ok()
    }
}

/// The molecule a single multiplier yields, ready to be written.
pub fn molecule_for(
    frame: &Frame,
    multiplier: f64,
    options: &Options,
) -> Result<Mol<Atom, Bond>, InferenceError> {
    let cutoffs = covalent_cutoffs(&frame.atomic_numbers, multiplier)?;
    let cell = Cell::from_frame(frame);
    let neighbors = NeighborList::build(&frame.positions, &cutoffs, options.skin, cell.as_ref())?;
    let connectivity = neighbors.connectivity_matrix();
    if !connectivity.is_symmetric(options.tolerance) {
        return Err(InferenceError::NotSymmetric);
    }
    if !connectivity.is_connected(options.tolerance) {
        return Err(InferenceError::Disconnected);
    }

    let mut mol = assign_bond_orders(
        &frame.atomic_numbers,
        &connectivity,
        &options.bond_order_options(),
    )?;
    check_valence(&mol).map_err(InferenceError::Valence)?;

    if options.embed_chiral {
        let positions = neighbors.unwrapped_positions(&frame.positions, cell.as_ref())?;
        assign_from_coordinates(&mut mol, &positions)?;
    }
    if !options.explicit_hydrogens {
        mol = fold_hydrogens(&mol);
    }
    set_aromaticity(&mut mol);
    Ok(mol)
}

fn attempt(frame: &Frame, multiplier: f64, options: &Options) -> Attempt {
    let outcome = molecule_for(frame, multiplier, options).map(|mol| to_canonical_smiles(&mol));
    match &outcome {
        Ok(smiles) => info!("multiplier {multiplier}: {smiles}"),
        Err(e) => debug!("multiplier {multiplier}: {e}"),
    }
    Attempt {
        multiplier,
        outcome,
    }
}

/// One attempt per multiplier in `options.factors`, in order.
pub fn infer(frame: &Frame, options: &Options) -> Vec<Attempt> {
    options
        .factors
        .iter()
        .map(|&multiplier| attempt(frame, multiplier, options))
        .collect()
}

/// The SMILES to emit for `frame`: every success, or only the first one
/// with [`Emit::First`]. Empty when every multiplier fails.
pub fn smiles_for(frame: &Frame, options: &Options) -> Vec<String> {
    let mut successes = options
        .factors
        .iter()
        .map(|&multiplier| attempt(frame, multiplier, options))
        .filter_map(|a| a.outcome.ok());
    match options.emit {
        Emit::First => successes.next().into_iter().collect(),
        Emit::All => successes.collect(),
    }
}

/// Reads an XYZ file and runs [`smiles_for`] on its first frame, or on
/// every frame when `all_frames` is set. One entry per frame processed;
/// frames after the first are not parsed unless asked for.
pub fn smiles_for_file(
    path: impl AsRef<Path>,
    options: &Options,
    all_frames: bool,
) -> Result<Vec<Vec<String>>, InferenceError> {
    let frames = if all_frames {
        read_file(path)?
    } else {
        vec![read_first_frame(path)?]
    };
    Ok(frames
        .iter()
        .map(|frame| smiles_for(frame, options))
        .collect())
}
