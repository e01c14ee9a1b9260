//! Configuration for one-shot XC evaluations
//!
//! A configuration file is a snapshot of everything the XC step of an SCF
//! iteration sees: basis functions, the density matrix, the quadrature grid
//! and the functional settings. Optional reference energies turn a run into
//! a regression check.

mod args;

pub use args::Args;

use crate::dft::{XcFunctional, DEFAULT_DENSITY_CUTOFF};
use crate::nlc::Vv10Params;
use color_eyre::eyre::{bail, ensure, Result};
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub atoms: Option<Vec<Atom>>,
    pub basis: Vec<BasisFunctionSpec>,
    /// Total (alpha + beta) density matrix, row by row.
    pub density_matrix: Vec<Vec<f64>>,
    pub grid: Vec<BlockSpec>,
    pub xc: Option<XcParams>,
    pub reference: Option<ReferenceValues>,
}

/// Atomic position configuration
#[derive(Debug, Deserialize, Serialize)]
pub struct Atom {
    pub element: String,
    pub coords: [f64; 3],
}

/// One contracted Cartesian Gaussian, centred either on an explicit point or
/// on one of the configured atoms.
#[derive(Debug, Deserialize, Serialize)]
pub struct BasisFunctionSpec {
    pub label: Option<String>,
    pub center: Option<[f64; 3]>,
    pub atom: Option<usize>,
    /// Cartesian powers (lx, ly, lz); s-type when absent.
    pub powers: Option<[i32; 3]>,
    pub exponents: Vec<f64>,
    pub coefficients: Vec<f64>,
}

/// A block of quadrature points. Without `basis_map` the block covers every
/// basis function in order.
#[derive(Debug, Deserialize, Serialize)]
pub struct BlockSpec {
    pub points: Vec<[f64; 3]>,
    pub weights: Vec<f64>,
    pub basis_map: Option<Vec<usize>>,
}

/// XC settings
#[derive(Debug, Deserialize, Serialize)]
pub struct XcParams {
    pub functional: Option<String>,
    pub vv10: Option<bool>,
    pub vv10_b: Option<f64>,
    pub vv10_c: Option<f64>,
    pub density_cutoff: Option<f64>,
}

impl Default for XcParams {
    fn default() -> Self {
        let vv10 = Vv10Params::default();
        XcParams {
            functional: Some(XcFunctional::Null.to_string()),
            vv10: Some(true),
            vv10_b: Some(vv10.b),
            vv10_c: Some(vv10.c),
            density_cutoff: Some(DEFAULT_DENSITY_CUTOFF),
        }
    }
}

impl XcParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.functional.is_none() {
            self.functional = defaults.functional;
        }
        if self.vv10.is_none() {
            self.vv10 = defaults.vv10;
        }
        if self.vv10_b.is_none() {
            self.vv10_b = defaults.vv10_b;
        }
        if self.vv10_c.is_none() {
            self.vv10_c = defaults.vv10_c;
        }
        if self.density_cutoff.is_none() {
            self.density_cutoff = defaults.density_cutoff;
        }
        self
    }
}

/// Expected energies for regression runs
#[derive(Debug, Deserialize, Serialize)]
pub struct ReferenceValues {
    pub nl_energy: Option<f64>,
    pub xc_energy: Option<f64>,
    pub tolerance: Option<f64>,
}

impl Default for ReferenceValues {
    fn default() -> Self {
        ReferenceValues {
            nl_energy: None,
            xc_energy: None,
            tolerance: Some(1e-6),
        }
    }
}

impl ReferenceValues {
    pub fn with_defaults(mut self) -> Self {
        if self.tolerance.is_none() {
            self.tolerance = Self::default().tolerance;
        }
        self
    }
}

impl Config {
    /// Apply defaults to all configuration sections
    pub fn with_defaults(mut self) -> Self {
        self.xc = Some(self.xc.take().unwrap_or_default().with_defaults());
        if let Some(reference) = self.reference.take() {
            self.reference = Some(reference.with_defaults());
        }
        self
    }

    /// Checks the sizes the snapshot sections must agree on.
    pub fn validate(&self) -> Result<()> {
        let nbf = self.basis.len();
        ensure!(nbf > 0, "no basis functions configured");
        ensure!(!self.grid.is_empty(), "no grid blocks configured");

        ensure!(
            self.density_matrix.len() == nbf,
            "density matrix has {} rows for {} basis functions",
            self.density_matrix.len(),
            nbf
        );
        for (i, row) in self.density_matrix.iter().enumerate() {
            ensure!(
                row.len() == nbf,
                "density matrix row {} has {} entries, expected {}",
                i,
                row.len(),
                nbf
            );
        }

        let natoms = self.atoms.as_ref().map_or(0, |a| a.len());
        for (i, f) in self.basis.iter().enumerate() {
            match (f.center, f.atom) {
                (Some(_), Some(_)) => bail!("basis function {} sets both center and atom", i),
                (None, None) => bail!("basis function {} needs a center or an atom index", i),
                (None, Some(a)) if a >= natoms => {
                    bail!("basis function {} refers to atom {} of {}", i, a, natoms)
                }
                _ => {}
            }
            if let Some(powers) = f.powers {
                ensure!(
                    powers.iter().all(|&l| l >= 0),
                    "basis function {} has negative Cartesian powers {:?}",
                    i,
                    powers
                );
            }
        }

        for (i, block) in self.grid.iter().enumerate() {
            ensure!(
                block.points.len() == block.weights.len(),
                "grid block {} has {} points but {} weights",
                i,
                block.points.len(),
                block.weights.len()
            );
            if let Some(map) = &block.basis_map {
                if let Some(bad) = map.iter().find(|&&g| g >= nbf) {
                    bail!("grid block {} maps basis function {} of {}", i, bad, nbf);
                }
            }
        }
        Ok(())
    }

    pub fn xc_params(&self) -> XcParams {
        XcParams {
            functional: self.xc.as_ref().and_then(|x| x.functional.clone()),
            vv10: self.xc.as_ref().and_then(|x| x.vv10),
            vv10_b: self.xc.as_ref().and_then(|x| x.vv10_b),
            vv10_c: self.xc.as_ref().and_then(|x| x.vv10_c),
            density_cutoff: self.xc.as_ref().and_then(|x| x.density_cutoff),
        }
        .with_defaults()
    }

    pub fn num_points(&self) -> usize {
        self.grid.iter().map(|b| b.points.len()).sum()
    }
}
