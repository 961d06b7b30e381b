//! Run options, loadable from JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bond_order::BondOrderOptions;

/// Covalent-radius multipliers, in the order they are tried.
pub const DEFAULT_FACTORS: [f64; 5] = [1.10, 1.15, 1.05, 1.20, 1.00];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which successful multipliers produce output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emit {
    /// One SMILES per successful multiplier.
    #[default]
    All,
    /// Stop at the first multiplier that yields a molecule.
    First,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Covalent-radius multipliers, tried in order.
    pub factors: Vec<f64>,
    /// Total molecular charge.
    pub charge: i32,
    /// Neighbor-list skin added to every cutoff, in ångström.
    pub skin: f64,
    /// Tolerance for the symmetry and Laplacian checks.
    pub tolerance: f64,
    pub allow_charged_fragments: bool,
    pub use_graph: bool,
    /// Perceive tetrahedral and double-bond stereo from the coordinates.
    pub embed_chiral: bool,
    /// Keep hydrogens as graph atoms (`[H]`); when unset they are folded
    /// into their neighbors' hydrogen counts.
    pub explicit_hydrogens: bool,
    pub emit: Emit,
    pub max_valence_combinations: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            factors: DEFAULT_FACTORS.to_vec(),
            charge: 0,
            skin: 0.3,
            tolerance: 1e-8,
            allow_charged_fragments: true,
            use_graph: true,
            embed_chiral: true,
            explicit_hydrogens: true,
            emit: Emit::All,
            max_valence_combinations: 100_000,
        }
    }
}

impl Options {
    /// Defaults overridden by whatever keys the file sets.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn bond_order_options(&self) -> BondOrderOptions {
        BondOrderOptions {
            charge: self.charge,
            allow_charged_fragments: self.allow_charged_fragments,
            use_graph: self.use_graph,
            max_valence_combinations: self.max_valence_combinations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = Options::default();
        assert_eq!(opts.factors, vec![1.10, 1.15, 1.05, 1.20, 1.00]);
        assert_eq!(opts.skin, 0.3);
        assert_eq!(opts.emit, Emit::All);
        assert!(opts.allow_charged_fragments && opts.use_graph && opts.embed_chiral);
        assert!(opts.explicit_hydrogens);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let opts = Options::from_json(r#"{"charge": -1, "emit": "first"}"#).unwrap();
        assert_eq!(opts.charge, -1);
        assert_eq!(opts.emit, Emit::First);
        assert!(opts.explicit_hydrogens);
        assert_eq!(opts.factors, DEFAULT_FACTORS.to_vec());
        assert_eq!(opts.max_valence_combinations, 100_000);
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(Options::from_json("{}").unwrap(), Options::default());
    }

    #[test]
    fn rejects_bad_json() {
        assert!(matches!(
            Options::from_json(r#"{"charge": "two"}"#),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            Options::from_json_file("/nonexistent/geosmiles.json"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn bond_order_options_follow() {
        let opts = Options {
            charge: 2,
            allow_charged_fragments: false,
            use_graph: false,
            max_valence_combinations: 7,
            ..Options::default()
        };
        let bo = opts.bond_order_options();
        assert_eq!(bo.charge, 2);
        assert!(!bo.allow_charged_fragments);
        assert!(!bo.use_graph);
        assert_eq!(bo.max_valence_combinations, 7);
    }

    #[test]
    fn serializes_round_trip() {
        let opts = Options {
            emit: Emit::First,
            ..Options::default()
        };
        let json = serde_json::to_string(&opts).unwrap();
        assert!(json.contains(r#""emit":"first""#));
        assert_eq!(Options::from_json(&json).unwrap(), opts);
    }
}
