mod common;

use serde::Deserialize;

use geosmiles::{smiles_for, Options};

#[derive(Deserialize)]
struct Entry {
    name: String,
    #[serde(default)]
    options: Options,
    atoms: Vec<(String, f64, f64, f64)>,
    smiles: Vec<String>,
}

#[test]
fn approval_molecules() {
    let data: Vec<Entry> =
        serde_json::from_str(include_str!("approval_data/molecules.json")).unwrap();

    let mut failures = Vec::new();
    for entry in &data {
        let atoms: Vec<(&str, [f64; 3])> = entry
            .atoms
            .iter()
            .map(|(symbol, x, y, z)| (symbol.as_str(), [*x, *y, *z]))
            .collect();
        let frame = common::frame(&atoms);
        let got = smiles_for(&frame, &entry.options);
        if got != entry.smiles {
            failures.push(format!(
                "{}: expected {:?}, got {:?}",
                entry.name, entry.smiles, got
            ));
        }
    }

    assert!(
        failures.is_empty(),
        "{} of {} molecules disagree:\n{}",
        failures.len(),
        data.len(),
        failures.join("\n")
    );
}
