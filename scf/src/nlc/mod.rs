//! VV10 non-local correlation on a block-structured quadrature grid.
//!
//! The evaluation runs in two phases:
//!
//! 1. per point: kernel parameters (W0, κ) from (ρ, γ), O(N)
//! 2. per outer block: pair sums against every inner block, O(N²), followed
//!    by the derivative assembly and the projection onto the basis
//!
//! The non-local energy is
//!
//!   E_nl = Σ_i w_i ρ_i (β + ½ Σ_j w_j ρ_j Φ(i, j))
//!
//! and the returned matrix already contains the semilocal potential passed in
//! with each block, so it can be added to the Fock matrix directly.
//!
//! Every density handed to [`Vv10::compute`] must be strictly positive; see
//! [`crate::dft::grid::screen_block`].

extern crate nalgebra as na;

mod assemble;
mod kernel;
mod pair;
mod project;

pub use assemble::{assemble_derivatives, RESTRICTED_VRHO_SCALE};
pub use kernel::{kernel, KernelState, Vv10Params};
pub use pair::{KernelPoints, PairAccumulators};
pub use project::{project_block, scatter_symmetrized};

use crate::dft::grid::{PointFields, QuadratureBlock};
use color_eyre::eyre::{ensure, Result, WrapErr};
use na::DMatrix;
use rayon::prelude::*;
use tracing::debug;

/// One screened block together with the semilocal derivatives on its points.
pub struct GridSample<'a> {
    pub block: &'a QuadratureBlock,
    pub fields: &'a PointFields,
    pub v_rho: &'a [f64],
    pub v_gamma: &'a [f64],
}

impl GridSample<'_> {
    fn check(&self, num_basis: usize) -> Result<()> {
        self.fields.check_block(self.block)?;
        let np = self.block.npoints();
        ensure!(
            self.v_rho.len() == np && self.v_gamma.len() == np,
            "potential derivatives have {}/{} entries for a block of {} points",
            self.v_rho.len(),
            self.v_gamma.len(),
            np
        );
        ensure!(
            self.block.basis_map().iter().all(|&g| g < num_basis),
            "block maps onto basis functions beyond the {} available",
            num_basis
        );
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct Vv10Output {
    pub energy: f64,
    /// Symmetric, `num_basis x num_basis`.
    pub matrix: DMatrix<f64>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Vv10 {
    params: Vv10Params,
}

impl Vv10 {
    pub fn new(params: Vv10Params) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &Vv10Params {
        &self.params
    }

    /// Non-local energy and potential matrix over all block pairs.
    pub fn compute(&self, samples: &[GridSample], num_basis: usize) -> Result<Vv10Output> {
        for (i, s) in samples.iter().enumerate() {
            s.check(num_basis)
                .wrap_err_with(|| format!("grid block {}", i))?;
        }

        let kernels: Vec<KernelState> = samples
            .par_iter()
            .map(|s| KernelState::new(&self.params, &s.fields.rho, &s.fields.gamma))
            .collect();

        let views: Vec<KernelPoints> = samples
            .iter()
            .zip(&kernels)
            .map(|(s, k)| KernelPoints {
                coords: s.block.points(),
                weights: s.block.weights(),
                rho: &s.fields.rho,
                kernel: k,
            })
            .collect();

        let (energy, matrix) = samples
            .par_iter()
            .zip(views.par_iter())
            .fold(
                || (0.0_f64, DMatrix::<f64>::zeros(num_basis, num_basis)),
                |(mut e_acc, mut v_acc), (sample, outer)| {
                    let mut acc = PairAccumulators::zeros(outer.len());
                    for inner in &views {
                        acc.accumulate(outer, inner);
                    }

                    let mut v_rho = sample.v_rho.to_vec();
                    let mut v_gamma = sample.v_gamma.to_vec();
                    e_acc += assemble_derivatives(
                        &self.params,
                        outer,
                        &sample.fields.gamma,
                        &acc,
                        &mut v_rho,
                        &mut v_gamma,
                    );

                    let local = project_block(sample.fields, outer.weights, &v_rho, &v_gamma);
                    scatter_symmetrized(&mut v_acc, &local, sample.block.basis_map());
                    (e_acc, v_acc)
                },
            )
            .reduce(
                || (0.0_f64, DMatrix::<f64>::zeros(num_basis, num_basis)),
                |(e1, v1), (e2, v2)| (e1 + e2, v1 + v2),
            );

        debug!(
            "VV10 over {} blocks / {} points: E_nl = {:.10}",
            samples.len(),
            views.iter().map(|v| v.len()).sum::<usize>(),
            energy
        );

        Ok(Vv10Output { energy, matrix })
    }
}
