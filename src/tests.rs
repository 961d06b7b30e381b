use crate::xyz::read_frames;
use crate::*;

#[test]
fn mol_add_atoms_and_bonds() {
    let mut mol = Mol::<Atom, Bond>::new();
    let c = mol.add_atom(Atom::new(6));
    let o = mol.add_atom(Atom::new(8));
    let bond_idx = mol.add_bond(c, o, Bond::new(BondOrder::Double));

    assert_eq!(mol.atom_count(), 2);
    assert_eq!(mol.bond_count(), 1);
    assert_eq!(mol.atom(o).atomic_num, 8);
    assert_eq!(mol.bond(bond_idx).order, BondOrder::Double);
    assert_eq!(mol.bond_between(o, c), Some(bond_idx));
}

#[test]
fn mol_neighbors_and_bonds_of() {
    let mut mol = Mol::<Atom, Bond>::new();
    let a = mol.add_atom(Atom::default());
    let b = mol.add_atom(Atom::default());
    let c = mol.add_atom(Atom::default());
    mol.add_bond(a, b, Bond::default());
    mol.add_bond(a, c, Bond::default());

    assert_eq!(mol.neighbors(a).count(), 2);
    assert_eq!(mol.bonds_of(a).count(), 2);
    assert_eq!(mol.neighbors(b).collect::<Vec<_>>(), vec![a]);
}

#[test]
fn atom_trait_impls() {
    let atom = Atom {
        atomic_num: 7,
        formal_charge: 1,
        hydrogen_count: 4,
        ..Atom::default()
    };
    assert_eq!(atom.atomic_num(), 7);
    assert_eq!(atom.formal_charge(), 1);
    assert_eq!(atom.hydrogen_count(), 4);
    assert_eq!(atom.radical_electrons(), 0);
    assert!(!HasAromaticity::is_aromatic(&atom));
}

fn smiles(xyz: &str, options: &Options) -> Vec<String> {
    let frames = read_frames(xyz.as_bytes()).unwrap();
    smiles_for(&frames[0], options)
}

/// Hydrogens folded into counts, first successful multiplier only.
fn folded_first() -> Options {
    Options {
        explicit_hydrogens: false,
        emit: Emit::First,
        ..Options::default()
    }
}

fn first(xyz: &str) -> String {
    let mut out = smiles(xyz, &folded_first());
    assert_eq!(out.len(), 1, "{xyz}");
    out.remove(0)
}

const WATER: &str = "3
water
O 0.0 0.0 0.0
H 0.9572 0.0 0.0
H -0.239988 0.926627 0.0
";

const ETHYLENE: &str = "6
Properties=species:S:1:pos:R:3
C  0.6695  0.0000 0.0
C -0.6695  0.0000 0.0
H  1.2321  0.9289 0.0
H  1.2321 -0.9289 0.0
H -1.2321  0.9289 0.0
H -1.2321 -0.9289 0.0
";

const BENZENE: &str = "12
benzene
C  1.3900  0.0000 0.0
C  0.6950  1.2038 0.0
C -0.6950  1.2038 0.0
C -1.3900  0.0000 0.0
C -0.6950 -1.2038 0.0
C  0.6950 -1.2038 0.0
H  2.4800  0.0000 0.0
H  1.2400  2.1477 0.0
H -1.2400  2.1477 0.0
H -2.4800  0.0000 0.0
H -1.2400 -2.1477 0.0
H  1.2400 -2.1477 0.0
";

#[test]
fn small_molecules() {
    assert_eq!(first(WATER), "O");
    assert_eq!(first(ETHYLENE), "C=C");
    assert_eq!(
        first("4\n\nC 0.6013 0 0\nC -0.6013 0 0\nH 1.6644 0 0\nH -1.6644 0 0\n"),
        "C#C"
    );
    assert_eq!(first("3\n\nO -1.16 0 0\nC 0 0 0\nO 1.16 0 0\n"), "O=C=O");
}

#[test]
fn carbon_monoxide_is_charge_separated() {
    let co = first("2\n\nC 0 0 0\nO 1.128 0 0\n");
    assert!(matches!(co.as_str(), "[C-]#[O+]" | "[O+]#[C-]"), "{co}");
}

#[test]
fn benzene_is_aromatic() {
    assert_eq!(first(BENZENE), "c1ccccc1");
}

#[test]
fn benzene_fails_at_large_multiplier() {
    // meta carbons (2.41 Å) fall inside the 1.20 cutoff
    let frames = read_frames(BENZENE.as_bytes()).unwrap();
    let attempts = infer(&frames[0], &Options::default());
    let by_factor: Vec<(f64, bool)> = attempts
        .iter()
        .map(|a| (a.multiplier, a.outcome.is_ok()))
        .collect();
    assert_eq!(
        by_factor,
        vec![(1.10, true), (1.15, true), (1.05, true), (1.20, false), (1.00, true)]
    );
}

#[test]
fn hydrogens_stay_atoms_by_default() {
    assert_eq!(smiles(WATER, &Options::default()), vec!["[H]O[H]"; 5]);
    let options = Options {
        emit: Emit::First,
        ..Options::default()
    };
    let ethylene = smiles(ETHYLENE, &options);
    assert_eq!(ethylene.len(), 1);
    assert_eq!(ethylene[0].matches("[H]").count(), 4);
    assert_eq!(ethylene[0].matches('=').count(), 1);
}

const CHFCLBR: &str = "5
Properties=species:S:1:pos:R:3 name=bromochlorofluoromethane
C   0.00  0.00  0.00
F   0.00  0.00  1.35
Cl  1.66  0.00 -0.59
Br -0.97  1.68 -0.65
H  -0.51 -0.89 -0.36
";

fn mirror(xyz: &str) -> String {
    xyz.lines()
        .enumerate()
        .map(|(i, line)| {
            if i < 2 {
                return line.to_string();
            }
            let cols: Vec<&str> = line.split_whitespace().collect();
            let y: f64 = cols[2].parse().unwrap();
            format!("{} {} {} {}", cols[0], cols[1], -y, cols[3])
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn enantiomers_differ_only_in_chirality_mark() {
    let left = first(CHFCLBR);
    let right = first(&mirror(CHFCLBR));
    assert!(left.contains('@'), "{left}");
    assert_ne!(left, right);
    assert_eq!(left.replace("@@", "@"), right.replace("@@", "@"));

    let flat = smiles(
        CHFCLBR,
        &Options {
            embed_chiral: false,
            ..folded_first()
        },
    );
    assert!(!flat[0].contains('@'));
}

fn difluoroethene(cis: bool) -> String {
    let y = if cis { 1.15 } else { -1.15 };
    format!(
        "6\n\nC 0 0 0\nC 1.33 0 0\nF -0.68 1.15 0\nF 2.01 {y} 0\nH -0.55 -0.95 0\nH 1.88 {} 0\n",
        -y * 0.95 / 1.15
    )
}

#[test]
fn double_bond_configuration() {
    assert_eq!(first(&difluoroethene(false)), "F/C=C/F");
    assert_eq!(first(&difluoroethene(true)), "F/C=C\\F");

    let flat = Options {
        embed_chiral: false,
        ..folded_first()
    };
    assert_eq!(smiles(&difluoroethene(true), &flat), vec!["FC=CF"]);
}
