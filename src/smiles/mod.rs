//! SMILES output.
//!
//! Atoms are written depth-first from a spanning tree of each fragment.
//! Non-tree bonds become ring-closure digits, reused once closed. Bracket
//! atoms are used only where a reader could not recover the atom from its
//! symbol and bonds alone: elements outside the organic subset, charges,
//! isotopes, radicals, hydrogen counts that differ from the default valence,
//! and stereocenters.

mod writer;

pub use writer::{to_canonical_smiles, to_smiles};
