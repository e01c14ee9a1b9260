//! Exchange-correlation energy and potential matrix for one SCF iteration.

extern crate nalgebra as na;

use super::functional::{FunctionalValues, SemilocalFunctional, XcFunctional};
use super::grid::{screen_block, PointFields, PointsEvaluator, QuadratureBlock};
use crate::nlc::{project_block, scatter_symmetrized, GridSample, Vv10, Vv10Params, RESTRICTED_VRHO_SCALE};
use color_eyre::eyre::{ensure, Result, WrapErr};
use na::DMatrix;
use rayon::prelude::*;
use tracing::{debug, info};

/// Density threshold below which grid points are dropped.
pub const DEFAULT_DENSITY_CUTOFF: f64 = 1e-14;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct XcSettings {
    pub functional: XcFunctional,
    /// `None` disables the non-local correction.
    pub vv10: Option<Vv10Params>,
    pub density_cutoff: f64,
}

impl Default for XcSettings {
    fn default() -> Self {
        Self {
            functional: XcFunctional::Null,
            vv10: Some(Vv10Params::default()),
            density_cutoff: DEFAULT_DENSITY_CUTOFF,
        }
    }
}

#[derive(Clone, Debug)]
pub struct XcOutput {
    pub e_semilocal: f64,
    pub e_nonlocal: f64,
    /// Contribution to the Kohn-Sham matrix, `num_basis x num_basis`.
    pub matrix: DMatrix<f64>,
    /// Grid points that survived density screening.
    pub points_used: usize,
}

impl XcOutput {
    pub fn energy(&self) -> f64 {
        self.e_semilocal + self.e_nonlocal
    }
}

/// A block after screening, with its semilocal values attached.
struct PreparedBlock {
    block: QuadratureBlock,
    fields: PointFields,
    values: FunctionalValues,
}

/// Evaluates E_xc and V_xc on a fixed grid; the SCF driver calls
/// [`XcIntegrator::compute`] once per iteration with its current density.
pub struct XcIntegrator<'a, E: PointsEvaluator> {
    grid: &'a [QuadratureBlock],
    evaluator: &'a E,
    settings: XcSettings,
}

impl<'a, E: PointsEvaluator> XcIntegrator<'a, E> {
    pub fn new(grid: &'a [QuadratureBlock], evaluator: &'a E, settings: XcSettings) -> Self {
        Self {
            grid,
            evaluator,
            settings,
        }
    }

    pub fn settings(&self) -> &XcSettings {
        &self.settings
    }

    pub fn compute(&self, density: &DMatrix<f64>) -> Result<XcOutput> {
        let nbf = self.evaluator.num_basis();
        ensure!(
            density.shape() == (nbf, nbf),
            "density matrix is {:?}, expected {}x{}",
            density.shape(),
            nbf,
            nbf
        );

        let prepared = self.prepare_blocks(density)?;
        let points_used = prepared.iter().map(|b| b.block.npoints()).sum::<usize>();
        debug!(
            "{} of {} blocks kept after density screening ({} points)",
            prepared.len(),
            self.grid.len(),
            points_used
        );

        let e_semilocal: f64 = prepared
            .iter()
            .map(|b| {
                b.block
                    .weights()
                    .iter()
                    .zip(&b.values.exc)
                    .map(|(w, e)| w * e)
                    .sum::<f64>()
            })
            .sum();

        let (e_nonlocal, matrix) = match &self.settings.vv10 {
            Some(params) => {
                let samples: Vec<GridSample> = prepared
                    .iter()
                    .map(|b| GridSample {
                        block: &b.block,
                        fields: &b.fields,
                        v_rho: &b.values.v_rho,
                        v_gamma: &b.values.v_gamma,
                    })
                    .collect();
                let out = Vv10::new(*params).compute(&samples, nbf)?;
                (out.energy, out.matrix)
            }
            None => (0.0, semilocal_matrix(&prepared, nbf)),
        };

        info!(
            "XC energy ({}{}): semilocal = {:.10}, non-local = {:.10}",
            self.settings.functional,
            if self.settings.vv10.is_some() { " + VV10" } else { "" },
            e_semilocal,
            e_nonlocal
        );

        Ok(XcOutput {
            e_semilocal,
            e_nonlocal,
            matrix,
            points_used,
        })
    }

    fn prepare_blocks(&self, density: &DMatrix<f64>) -> Result<Vec<PreparedBlock>> {
        let cutoff = self.settings.density_cutoff;
        let functional = &self.settings.functional;

        let prepared: Vec<Option<PreparedBlock>> = self
            .grid
            .par_iter()
            .enumerate()
            .map(|(i, block)| -> Result<Option<PreparedBlock>> {
                let fields = self
                    .evaluator
                    .compute_points(block, density)
                    .wrap_err_with(|| format!("evaluating points of grid block {}", i))?;
                fields
                    .check_block(block)
                    .wrap_err_with(|| format!("grid block {}", i))?;

                let Some((block, fields)) = screen_block(block, &fields, cutoff) else {
                    return Ok(None);
                };
                let values = functional
                    .compute_functional(&fields.rho, &fields.gamma)
                    .wrap_err_with(|| format!("{} on grid block {}", functional.name(), i))?;
                ensure!(
                    values.exc.len() == block.npoints()
                        && values.v_rho.len() == block.npoints()
                        && values.v_gamma.len() == block.npoints(),
                    "{} returned arrays of the wrong length for grid block {}",
                    functional.name(),
                    i
                );
                Ok(Some(PreparedBlock {
                    block,
                    fields,
                    values,
                }))
            })
            .collect::<Result<_>>()?;

        Ok(prepared.into_iter().flatten().collect())
    }
}

/// Semilocal-only matrix, with the same ½ `v_rho` convention the VV10 path
/// applies after its correction.
fn semilocal_matrix(prepared: &[PreparedBlock], nbf: usize) -> DMatrix<f64> {
    prepared
        .par_iter()
        .fold(
            || DMatrix::<f64>::zeros(nbf, nbf),
            |mut v_acc, b| {
                let v_rho: Vec<f64> = b.values.v_rho.iter().map(|v| v * RESTRICTED_VRHO_SCALE).collect();
                let local = project_block(&b.fields, b.block.weights(), &v_rho, &b.values.v_gamma);
                scatter_symmetrized(&mut v_acc, &local, b.block.basis_map());
                v_acc
            },
        )
        .reduce(|| DMatrix::<f64>::zeros(nbf, nbf), |a, b| a + b)
}
