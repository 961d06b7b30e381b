//! Geometric connectivity from covalent radii.
//!
//! Two atoms are neighbors when their distance is below the sum of their
//! scaled covalent radii, each padded by a skin. The resulting
//! [`ConnectivityMatrix`] carries the two sanity checks applied before bond
//! orders are inferred: symmetry and a single connected component.

use std::collections::VecDeque;

use nalgebra::{DMatrix, Matrix3, Point3, Vector3};
use thiserror::Error;

use crate::element::Element;
use crate::xyz::Frame;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NeighborError {
    #[error("atom {index}: no covalent radius for atomic number {atomic_num}")]
    NoRadius { index: usize, atomic_num: u8 },
    #[error("{positions} positions but {cutoffs} cutoffs")]
    LengthMismatch { positions: usize, cutoffs: usize },
    #[error("cell matrix is singular")]
    SingularCell,
}

/// Per-atom cutoff radii: the covalent radius scaled by `multiplier`.
pub fn covalent_cutoffs(atomic_numbers: &[u8], multiplier: f64) -> Result<Vec<f64>, NeighborError> {
    atomic_numbers
        .iter()
        .enumerate()
        .map(|(index, &z)| {
            Element::from_atomic_num(z)
                .and_then(Element::covalent_radius)
                .map(|r| r * multiplier)
                .ok_or(NeighborError::NoRadius {
                    index,
                    atomic_num: z,
                })
        })
        .collect()
}

/// A periodic simulation cell. Rows of `lattice` are the cell vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub lattice: Matrix3<f64>,
    pub pbc: [bool; 3],
}

impl Cell {
    pub fn new(lattice: Matrix3<f64>, pbc: [bool; 3]) -> Self {
        Self { lattice, pbc }
    }

    /// The cell of `frame`, if it has a lattice with at least one periodic axis.
    pub fn from_frame(frame: &Frame) -> Option<Self> {
        if !frame.is_periodic() {
            return None;
        }
        frame.lattice.map(|lattice| Self::new(lattice, frame.pbc))
    }
}

/// Wraps displacements into the minimum image along periodic axes.
struct MinimumImage {
    to_cartesian: Matrix3<f64>,
    to_fractional: Matrix3<f64>,
    pbc: [bool; 3],
}

impl MinimumImage {
    fn new(cell: &Cell) -> Result<Self, NeighborError> {
        let to_cartesian = cell.lattice.transpose();
        let to_fractional = to_cartesian
            .try_inverse()
            .ok_or(NeighborError::SingularCell)?;
        Ok(Self {
            to_cartesian,
            to_fractional,
            pbc: cell.pbc,
        })
    }

    fn wrap(&self, d: Vector3<f64>) -> Vector3<f64> {
        let mut frac = self.to_fractional * d;
        for axis in 0..3 {
            if self.pbc[axis] {
                frac[axis] -= frac[axis].round();
            }
        }
        self.to_cartesian * frac
    }
}

/// Symmetric neighbor list without self-interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborList {
    neighbors: Vec<Vec<usize>>,
}

impl NeighborList {
    /// Atoms `i != j` are neighbors iff
    /// `d(i, j) < (cutoffs[i] + skin) + (cutoffs[j] + skin)`.
    pub fn build(
        positions: &[Point3<f64>],
        cutoffs: &[f64],
        skin: f64,
        cell: Option<&Cell>,
    ) -> Result<Self, NeighborError> {
        if positions.len() != cutoffs.len() {
            return Err(NeighborError::LengthMismatch {
                positions: positions.len(),
                cutoffs: cutoffs.len(),
            });
        }
        let image = cell.map(MinimumImage::new).transpose()?;

        let n = positions.len();
        let mut neighbors = vec![Vec::new(); n];
        for i in 0..n {
            for j in (i + 1)..n {
                let mut d = positions[j] - positions[i];
                if let Some(image) = &image {
                    d = image.wrap(d);
                }
                let limit = (cutoffs[i] + skin) + (cutoffs[j] + skin);
                if d.norm() < limit {
                    neighbors[i].push(j);
                    neighbors[j].push(i);
                }
            }
        }
        Ok(Self { neighbors })
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn neighbors(&self, i: usize) -> &[usize] {
        &self.neighbors[i]
    }

    /// Positions with every bonded neighbor moved to its minimum image
    /// relative to the atom it was reached from, so molecules split by a
    /// periodic boundary come out whole. Without a cell the input is returned.
    pub fn unwrapped_positions(
        &self,
        positions: &[Point3<f64>],
        cell: Option<&Cell>,
    ) -> Result<Vec<Point3<f64>>, NeighborError> {
        if positions.len() != self.neighbors.len() {
            return Err(NeighborError::LengthMismatch {
                positions: positions.len(),
                cutoffs: self.neighbors.len(),
            });
        }
        let Some(image) = cell.map(MinimumImage::new).transpose()? else {
            return Ok(positions.to_vec());
        };

        let mut out = positions.to_vec();
        let mut placed = vec![false; positions.len()];
        for root in 0..positions.len() {
            if placed[root] {
                continue;
            }
            placed[root] = true;
            let mut queue = VecDeque::from([root]);
            while let Some(i) = queue.pop_front() {
                for &j in &self.neighbors[i] {
                    if !placed[j] {
                        placed[j] = true;
                        out[j] = out[i] + image.wrap(positions[j] - positions[i]);
                        queue.push_back(j);
                    }
                }
            }
        }
        Ok(out)
    }

    pub fn connectivity_matrix(&self) -> ConnectivityMatrix {
        let n = self.neighbors.len();
        let mut counts = DMatrix::zeros(n, n);
        for (i, list) in self.neighbors.iter().enumerate() {
            for &j in list {
                counts[(i, j)] += 1.0;
            }
        }
        ConnectivityMatrix { counts }
    }
}

/// Dense adjacency matrix, entry `(i, j)` counting the `i → j` neighbor pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectivityMatrix {
    counts: DMatrix<f64>,
}

impl ConnectivityMatrix {
    pub fn from_matrix(counts: DMatrix<f64>) -> Self {
        Self { counts }
    }

    pub fn len(&self) -> usize {
        self.counts.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.nrows() == 0
    }

    /// `‖A − Aᵀ‖∞ < tol`, with the infinity norm taken as the maximum row sum.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        if !self.counts.is_square() {
            return false;
        }
        let diff = &self.counts - self.counts.transpose();
        let norm = diff
            .row_iter()
            .map(|row| row.iter().map(|v| v.abs()).sum::<f64>())
            .fold(0.0, f64::max);
        norm < tol
    }

    /// A single connected component: fewer than two Laplacian eigenvalues
    /// with magnitude below `tol`.
    pub fn is_connected(&self, tol: f64) -> bool {
        let n = self.len();
        if n == 0 {
            return false;
        }
        let mut laplacian = -self.counts.clone();
        for i in 0..n {
            laplacian[(i, i)] += self.counts.row(i).sum();
        }
        let zeros = laplacian
            .symmetric_eigenvalues()
            .iter()
            .filter(|ev| ev.abs() < tol)
            .count();
        zeros < 2
    }

    pub fn degree(&self, i: usize) -> usize {
        self.counts.row(i).iter().filter(|&&v| v != 0.0).count()
    }

    pub fn bonded(&self, i: usize, j: usize) -> bool {
        self.counts[(i, j)] != 0.0
    }

    /// Bonded pairs `(i, j)` with `i < j`, in row-major order.
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        let n = self.len();
        let mut out = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                if self.bonded(i, j) {
                    out.push((i, j));
                }
            }
        }
        out
    }
}
