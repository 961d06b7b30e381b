use std::path::PathBuf;

use thiserror::Error;

/// Errors produced when reading an (extended) XYZ file.
#[derive(Debug, Error)]
pub enum XyzError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The path does not carry a `.xyz` extension.
    #[error("{}: expected a .xyz file", .path.display())]
    Extension { path: PathBuf },
    /// The input holds no frame, or a frame with zero atoms.
    #[error("no atoms found")]
    Empty,
    /// The first line of a frame is not a non-negative integer.
    #[error("line {line}: invalid atom count '{text}'")]
    InvalidCount { line: usize, text: String },
    /// The input ended before the announced number of atoms was read.
    #[error("line {line}: frame ended after {found} of {expected} atoms")]
    Truncated {
        line: usize,
        expected: usize,
        found: usize,
    },
    /// An atom line has fewer columns than the `Properties` layout needs.
    #[error("line {line}: expected at least {expected} columns, found {found}")]
    TooFewColumns {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: invalid number '{text}'")]
    InvalidNumber { line: usize, text: String },
    #[error("line {line}: unknown element '{text}'")]
    UnknownElement { line: usize, text: String },
    /// `Properties=` is not a sequence of `name:type:ncols` triples.
    #[error("line {line}: malformed Properties '{text}'")]
    InvalidProperties { line: usize, text: String },
    /// `Properties=` lacks a `pos` column, or both `species` and `Z`.
    #[error("line {line}: Properties needs a species (or Z) and a pos column")]
    MissingColumn { line: usize },
    #[error("line {line}: Lattice needs nine numbers, got '{text}'")]
    InvalidLattice { line: usize, text: String },
}
