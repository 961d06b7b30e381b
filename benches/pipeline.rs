use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra::Point3;

use geosmiles::neighbors::covalent_cutoffs;
use geosmiles::pipeline::molecule_for;
use geosmiles::{smiles_for, to_canonical_smiles, Frame, NeighborList, Options};

fn benzene() -> Frame {
    let mut numbers = Vec::new();
    let mut positions = Vec::new();
    for (z, radius) in [(6u8, 1.39), (1u8, 2.48)] {
        for k in 0..6 {
            let angle = std::f64::consts::PI / 3.0 * k as f64;
            numbers.push(z);
            positions.push(Point3::new(radius * angle.cos(), radius * angle.sin(), 0.0));
        }
    }
    Frame::new(numbers, positions)
}

/// `n`³ water molecules on a 3.1 Å grid.
fn water_box(n: usize) -> Frame {
    let mut numbers = Vec::new();
    let mut positions = Vec::new();
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                let o = Point3::new(i as f64, j as f64, k as f64) * 3.1;
                numbers.extend([8, 1, 1]);
                positions.push(o);
                positions.push(Point3::new(o.x + 0.9572, o.y, o.z));
                positions.push(Point3::new(o.x - 0.239988, o.y + 0.926627, o.z));
            }
        }
    }
    Frame::new(numbers, positions)
}

fn bench_pipeline(c: &mut Criterion) {
    let options = Options::default();
    let benzene = benzene();

    let mut group = c.benchmark_group("pipeline");
    group.bench_function("benzene_smiles", |b| {
        b.iter(|| black_box(smiles_for(black_box(&benzene), &options)))
    });
    group.bench_function("benzene_molecule", |b| {
        b.iter(|| black_box(molecule_for(black_box(&benzene), 1.1, &options).unwrap()))
    });
    let mol = molecule_for(&benzene, 1.1, &options).unwrap();
    group.bench_function("benzene_write", |b| {
        b.iter(|| black_box(to_canonical_smiles(black_box(&mol))))
    });
    group.finish();
}

fn bench_neighbors(c: &mut Criterion) {
    let frame = water_box(10);
    let cutoffs = covalent_cutoffs(&frame.atomic_numbers, 1.1).unwrap();

    c.bench_function("neighbors_water_box_3000", |b| {
        b.iter(|| black_box(NeighborList::build(&frame.positions, &cutoffs, 0.3, None).unwrap()))
    });
}

criterion_group!(benches, bench_pipeline, bench_neighbors);
criterion_main!(benches);
