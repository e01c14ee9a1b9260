//! Small He-dimer fixtures shared by the unit tests.

use crate::dft::{BasisPointsEvaluator, QuadratureBlock};
use basis::ContractedGTO;
use nalgebra::{DMatrix, Vector3};

/// STO-3G helium 1s
pub fn he_1s(center: Vector3<f64>) -> ContractedGTO {
    ContractedGTO::new(
        "He 1s",
        center,
        Vector3::zeros(),
        &[6.36242139, 1.15892300, 0.31364979],
        &[0.15432897, 0.53532814, 0.44463454],
    )
    .unwrap()
}

/// A single polarisation function so the gradient terms see some anisotropy.
pub fn p_z(center: Vector3<f64>) -> ContractedGTO {
    ContractedGTO::new("He 2pz", center, Vector3::new(0, 0, 1), &[0.8], &[1.0]).unwrap()
}

pub fn he_dimer_basis(separation: f64) -> Vec<ContractedGTO> {
    let a = Vector3::new(0.0, 0.0, -0.5 * separation);
    let b = Vector3::new(0.0, 0.0, 0.5 * separation);
    vec![he_1s(a), he_1s(b), p_z(a)]
}

pub fn he_dimer_evaluator() -> BasisPointsEvaluator<ContractedGTO> {
    BasisPointsEvaluator::new(he_dimer_basis(2.8))
}

/// Symmetric positive-definite, so the density is positive everywhere.
pub fn he_dimer_density() -> DMatrix<f64> {
    DMatrix::from_row_slice(
        3,
        3,
        &[
            1.10, 0.15, 0.05, //
            0.15, 1.10, 0.02, //
            0.05, 0.02, 0.20,
        ],
    )
}

/// Uniform cubic grid of `n^3` points on [-half, half]^3, weights h^3,
/// cut into `nblocks` contiguous blocks that all map every basis function.
pub fn cubic_grid(n: usize, half: f64, nblocks: usize, nbf: usize) -> Vec<QuadratureBlock> {
    let h = 2.0 * half / (n - 1) as f64;
    let mut points = Vec::with_capacity(n * n * n);
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                points.push(Vector3::new(
                    -half + i as f64 * h,
                    -half + j as f64 * h,
                    -half + k as f64 * h,
                ));
            }
        }
    }
    split_into_blocks(&points, h * h * h, nblocks, nbf)
}

pub fn split_into_blocks(
    points: &[Vector3<f64>],
    weight: f64,
    nblocks: usize,
    nbf: usize,
) -> Vec<QuadratureBlock> {
    let chunk = (points.len() + nblocks - 1) / nblocks;
    points
        .chunks(chunk)
        .map(|c| QuadratureBlock::new(c.to_vec(), vec![weight; c.len()], (0..nbf).collect()).unwrap())
        .collect()
}
