//! Quadrature blocks and the point values tabulated on them.
//!
//! Grids arrive pre-built (points, weights, and the list of basis functions
//! that are significant on each block). Every SCF iteration the
//! [`PointsEvaluator`] turns the current density matrix into [`PointFields`]
//! for one block at a time.

extern crate nalgebra as na;

use basis::Basis;
use color_eyre::eyre::{bail, ensure, Result};
use na::{DMatrix, Vector3};
use std::collections::HashSet;

/// A group of quadrature points sharing one local basis-function list.
#[derive(Clone, Debug)]
pub struct QuadratureBlock {
    points: Vec<Vector3<f64>>,
    weights: Vec<f64>,
    /// local basis-function index -> global basis-function index
    basis_map: Vec<usize>,
}

impl QuadratureBlock {
    pub fn new(points: Vec<Vector3<f64>>, weights: Vec<f64>, basis_map: Vec<usize>) -> Result<Self> {
        ensure!(
            points.len() == weights.len(),
            "quadrature block has {} points but {} weights",
            points.len(),
            weights.len()
        );
        let mut seen = HashSet::with_capacity(basis_map.len());
        for &g in &basis_map {
            ensure!(seen.insert(g), "basis function {} listed twice in block map", g);
        }
        Ok(Self {
            points,
            weights,
            basis_map,
        })
    }

    pub fn points(&self) -> &[Vector3<f64>] {
        &self.points
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn basis_map(&self) -> &[usize] {
        &self.basis_map
    }

    pub fn npoints(&self) -> usize {
        self.points.len()
    }

    pub fn nfunctions(&self) -> usize {
        self.basis_map.len()
    }

    /// Same block restricted to the points at `keep` (in that order).
    pub fn select(&self, keep: &[usize]) -> Self {
        Self {
            points: keep.iter().map(|&p| self.points[p]).collect(),
            weights: keep.iter().map(|&p| self.weights[p]).collect(),
            basis_map: self.basis_map.clone(),
        }
    }
}

/// Density, its gradient and the basis tables on the points of one block.
///
/// Tables are `npoints x nfunctions`, columns ordered like the block's
/// basis map.
#[derive(Clone, Debug)]
pub struct PointFields {
    pub rho: Vec<f64>,
    /// |∇ρ|²
    pub gamma: Vec<f64>,
    /// ∂ρ/∂x, ∂ρ/∂y, ∂ρ/∂z
    pub rho_grad: [Vec<f64>; 3],
    pub phi: DMatrix<f64>,
    pub phi_grad: [DMatrix<f64>; 3],
}

impl PointFields {
    pub fn npoints(&self) -> usize {
        self.rho.len()
    }

    pub fn nfunctions(&self) -> usize {
        self.phi.ncols()
    }

    /// Fails unless every array matches the block's point and function counts.
    pub fn check_block(&self, block: &QuadratureBlock) -> Result<()> {
        let np = block.npoints();
        let nf = block.nfunctions();
        ensure!(
            self.rho.len() == np && self.gamma.len() == np,
            "density arrays have {}/{} entries for a block of {} points",
            self.rho.len(),
            self.gamma.len(),
            np
        );
        for (d, g) in self.rho_grad.iter().enumerate() {
            ensure!(
                g.len() == np,
                "density gradient component {} has {} entries for {} points",
                d,
                g.len(),
                np
            );
        }
        for table in std::iter::once(&self.phi).chain(self.phi_grad.iter()) {
            ensure!(
                table.shape() == (np, nf),
                "basis table is {:?}, block needs ({}, {})",
                table.shape(),
                np,
                nf
            );
        }
        Ok(())
    }

    pub fn select(&self, keep: &[usize]) -> Self {
        let pick = |v: &Vec<f64>| keep.iter().map(|&p| v[p]).collect::<Vec<_>>();
        Self {
            rho: pick(&self.rho),
            gamma: pick(&self.gamma),
            rho_grad: [
                pick(&self.rho_grad[0]),
                pick(&self.rho_grad[1]),
                pick(&self.rho_grad[2]),
            ],
            phi: self.phi.select_rows(keep),
            phi_grad: [
                self.phi_grad[0].select_rows(keep),
                self.phi_grad[1].select_rows(keep),
                self.phi_grad[2].select_rows(keep),
            ],
        }
    }
}

/// Drops the points whose density is not strictly above `cutoff`.
///
/// Returns `None` when nothing survives. The VV10 kernel divides by the
/// density, so every point handed to it must come through here.
pub fn screen_block(
    block: &QuadratureBlock,
    fields: &PointFields,
    cutoff: f64,
) -> Option<(QuadratureBlock, PointFields)> {
    let keep: Vec<usize> = fields
        .rho
        .iter()
        .enumerate()
        .filter(|&(_, &r)| r.is_finite() && r > cutoff)
        .map(|(p, _)| p)
        .collect();

    if keep.is_empty() {
        None
    } else if keep.len() == fields.npoints() {
        Some((block.clone(), fields.clone()))
    } else {
        Some((block.select(&keep), fields.select(&keep)))
    }
}

/// Produces point values for a block from a density matrix.
pub trait PointsEvaluator: Sync {
    fn num_basis(&self) -> usize;

    fn compute_points(&self, block: &QuadratureBlock, density: &DMatrix<f64>) -> Result<PointFields>;
}

/// [`PointsEvaluator`] backed by analytic basis functions.
///
/// `density` is the total (alpha + beta) density matrix and must be
/// symmetric: ρ(r) = Σ_ab P_ab φ_a(r) φ_b(r).
pub struct BasisPointsEvaluator<B: Basis> {
    functions: Vec<B>,
}

impl<B: Basis> BasisPointsEvaluator<B> {
    pub fn new(functions: Vec<B>) -> Self {
        Self { functions }
    }

    pub fn functions(&self) -> &[B] {
        &self.functions
    }
}

impl<B: Basis + Sync> PointsEvaluator for BasisPointsEvaluator<B> {
    fn num_basis(&self) -> usize {
        self.functions.len()
    }

    fn compute_points(&self, block: &QuadratureBlock, density: &DMatrix<f64>) -> Result<PointFields> {
        let nbf = self.functions.len();
        ensure!(
            density.shape() == (nbf, nbf),
            "density matrix is {:?} but the basis has {} functions",
            density.shape(),
            nbf
        );
        let map = block.basis_map();
        if let Some(&bad) = map.iter().find(|&&g| g >= nbf) {
            bail!("block references basis function {} of {}", bad, nbf);
        }

        let np = block.npoints();
        let nl = map.len();
        let mut phi = DMatrix::<f64>::zeros(np, nl);
        let mut phi_grad = [
            DMatrix::<f64>::zeros(np, nl),
            DMatrix::<f64>::zeros(np, nl),
            DMatrix::<f64>::zeros(np, nl),
        ];
        for (p, r) in block.points().iter().enumerate() {
            for (a, &g) in map.iter().enumerate() {
                let (value, grad) = self.functions[g].evaluate_with_gradient(r);
                phi[(p, a)] = value;
                for d in 0..3 {
                    phi_grad[d][(p, a)] = grad[d];
                }
            }
        }

        // X[p, b] = Σ_a φ_a(p) P_ab over the block's local functions
        let local_density = density.select_rows(map).select_columns(map);
        let x = &phi * &local_density;

        let mut rho = vec![0.0_f64; np];
        let mut rho_grad = [vec![0.0_f64; np], vec![0.0_f64; np], vec![0.0_f64; np]];
        for p in 0..np {
            rho[p] = x.row(p).dot(&phi.row(p));
            for d in 0..3 {
                rho_grad[d][p] = 2.0 * x.row(p).dot(&phi_grad[d].row(p));
            }
        }
        let gamma = (0..np)
            .map(|p| rho_grad.iter().map(|g| g[p] * g[p]).sum::<f64>())
            .collect();

        Ok(PointFields {
            rho,
            gamma,
            rho_grad,
            phi,
            phi_grad,
        })
    }
}
