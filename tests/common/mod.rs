#![allow(dead_code)]

use geosmiles::xyz::read_frames;
use geosmiles::{Emit, Frame, Options};
use nalgebra::{Point3, Rotation3, Unit, Vector3};

/// Parses `atoms` through the XYZ reader so every fixture exercises it.
pub fn frame(atoms: &[(&str, [f64; 3])]) -> Frame {
    let mut text = format!("{}\nfixture\n", atoms.len());
    for (symbol, [x, y, z]) in atoms {
        text.push_str(&format!("{symbol} {x:.6} {y:.6} {z:.6}\n"));
    }
    let mut frames = read_frames(text.as_bytes()).unwrap();
    assert_eq!(frames.len(), 1);
    frames.remove(0)
}

/// Hydrogens folded into counts, first successful multiplier only.
pub fn folded_first() -> Options {
    Options {
        explicit_hydrogens: false,
        emit: Emit::First,
        ..Options::default()
    }
}

/// Same structure with atom `i` of the result taken from `order[i]`.
pub fn permuted(frame: &Frame, order: &[usize]) -> Frame {
    assert_eq!(order.len(), frame.len());
    Frame::new(
        order.iter().map(|&i| frame.atomic_numbers[i]).collect(),
        order.iter().map(|&i| frame.positions[i]).collect(),
    )
}

/// Every deterministic reordering the invariance tests try: reversal,
/// rotations and strided walks over the atom list.
pub fn orderings(n: usize) -> Vec<Vec<usize>> {
    let mut out = vec![(0..n).rev().collect::<Vec<_>>()];
    for shift in 1..n {
        out.push((0..n).map(|i| (i + shift) % n).collect());
    }
    for stride in 2..n {
        if gcd(stride, n) == 1 {
            out.push((0..n).map(|i| (i * stride) % n).collect());
        }
    }
    out
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Rotated about `axis` by `angle` radians, then shifted by `shift`.
pub fn moved(frame: &Frame, axis: [f64; 3], angle: f64, shift: [f64; 3]) -> Frame {
    let rotation = Rotation3::from_axis_angle(&Unit::new_normalize(Vector3::from(axis)), angle);
    let shift = Vector3::from(shift);
    Frame::new(
        frame.atomic_numbers.clone(),
        frame
            .positions
            .iter()
            .map(|p| rotation * p + shift)
            .collect(),
    )
}

/// Mirror image through the xz plane.
pub fn mirrored(frame: &Frame) -> Frame {
    Frame::new(
        frame.atomic_numbers.clone(),
        frame
            .positions
            .iter()
            .map(|p| Point3::new(p.x, -p.y, p.z))
            .collect(),
    )
}

pub fn water() -> Frame {
    frame(&[
        ("O", [0.0, 0.0, 0.0]),
        ("H", [0.9572, 0.0, 0.0]),
        ("H", [-0.239988, 0.926627, 0.0]),
    ])
}

pub fn methanol() -> Frame {
    frame(&[
        ("C", [0.0, 0.0, 0.0]),
        ("O", [1.43, 0.0, 0.0]),
        ("H", [1.7346, 0.9104, 0.0]),
        ("H", [-0.3633, -1.0277, 0.0]),
        ("H", [-0.3633, 0.5138, 0.89]),
        ("H", [-0.3633, 0.5138, -0.89]),
    ])
}

pub fn benzene() -> Frame {
    frame(&[
        ("C", [1.39, 0.0, 0.0]),
        ("C", [0.695, 1.2038, 0.0]),
        ("C", [-0.695, 1.2038, 0.0]),
        ("C", [-1.39, 0.0, 0.0]),
        ("C", [-0.695, -1.2038, 0.0]),
        ("C", [0.695, -1.2038, 0.0]),
        ("H", [2.48, 0.0, 0.0]),
        ("H", [1.24, 2.1477, 0.0]),
        ("H", [-1.24, 2.1477, 0.0]),
        ("H", [-2.48, 0.0, 0.0]),
        ("H", [-1.24, -2.1477, 0.0]),
        ("H", [1.24, -2.1477, 0.0]),
    ])
}

pub fn bromochlorofluoromethane() -> Frame {
    frame(&[
        ("C", [0.0, 0.0, 0.0]),
        ("F", [0.0, 0.0, 1.35]),
        ("Cl", [1.66, 0.0, -0.59]),
        ("Br", [-0.97, 1.68, -0.65]),
        ("H", [-0.51, -0.89, -0.36]),
    ])
}

pub fn difluoroethene(cis: bool) -> Frame {
    let y = if cis { 1.15 } else { -1.15 };
    frame(&[
        ("C", [0.0, 0.0, 0.0]),
        ("C", [1.33, 0.0, 0.0]),
        ("F", [-0.68, 1.15, 0.0]),
        ("F", [2.01, y, 0.0]),
        ("H", [-0.55, -0.95, 0.0]),
        ("H", [1.88, -y * 0.95 / 1.15, 0.0]),
    ])
}
