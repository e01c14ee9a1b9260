//! Semilocal exchange-correlation functionals in (ρ, γ) form.
//!
//! All quantities refer to the total, spin-unpolarized density:
//! - `exc`:     energy per unit volume e(ρ, γ)
//! - `v_rho`:   ∂e/∂ρ
//! - `v_gamma`: ∂e/∂γ with γ = |∇ρ|²

use color_eyre::eyre::{bail, ensure, Result};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Debug, Default)]
pub struct FunctionalValues {
    pub exc: Vec<f64>,
    pub v_rho: Vec<f64>,
    pub v_gamma: Vec<f64>,
}

impl FunctionalValues {
    pub fn zeros(n: usize) -> Self {
        Self {
            exc: vec![0.0; n],
            v_rho: vec![0.0; n],
            v_gamma: vec![0.0; n],
        }
    }
}

pub trait SemilocalFunctional: Sync {
    fn name(&self) -> &str;

    /// Whether `v_gamma` can be non-zero.
    fn is_gga(&self) -> bool;

    fn compute_functional(&self, rho: &[f64], gamma: &[f64]) -> Result<FunctionalValues>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum XcFunctional {
    /// No semilocal part; only the non-local correction contributes.
    Null,
    /// Local-density approximation exchange only (Slater exchange)
    LdaX,
    /// PBE GGA exchange only (no correlation)
    PbeX,
}

impl FromStr for XcFunctional {
    type Err = color_eyre::eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" | "null" => Ok(XcFunctional::Null),
            "lda" | "lda_x" | "slater" => Ok(XcFunctional::LdaX),
            "pbe" | "pbe_x" => Ok(XcFunctional::PbeX),
            other => bail!("unknown semilocal functional '{}' (expected none, lda_x or pbe_x)", other),
        }
    }
}

impl fmt::Display for XcFunctional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl SemilocalFunctional for XcFunctional {
    fn name(&self) -> &str {
        match self {
            XcFunctional::Null => "none",
            XcFunctional::LdaX => "lda_x",
            XcFunctional::PbeX => "pbe_x",
        }
    }

    fn is_gga(&self) -> bool {
        matches!(self, XcFunctional::PbeX)
    }

    fn compute_functional(&self, rho: &[f64], gamma: &[f64]) -> Result<FunctionalValues> {
        ensure!(
            rho.len() == gamma.len(),
            "{}: {} densities but {} gradient norms",
            self.name(),
            rho.len(),
            gamma.len()
        );
        let mut out = FunctionalValues::zeros(rho.len());
        match self {
            XcFunctional::Null => {}
            XcFunctional::LdaX => {
                for (p, &r) in rho.iter().enumerate() {
                    out.exc[p] = lda_x_energy_density(r);
                    out.v_rho[p] = lda_x_potential(r);
                }
            }
            XcFunctional::PbeX => {
                for (p, (&r, &g)) in rho.iter().zip(gamma).enumerate() {
                    let (e, de_drho, de_dgamma) = pbe_x(r, g);
                    out.exc[p] = e;
                    out.v_rho[p] = de_drho;
                    out.v_gamma[p] = de_dgamma;
                }
            }
        }
        Ok(out)
    }
}

#[inline]
fn c_x() -> f64 {
    -0.75 * (3.0 / PI).powf(1.0 / 3.0)
}

/// Slater exchange, e_x(ρ) = c_x ρ^(4/3)
pub(crate) fn lda_x_energy_density(rho: f64) -> f64 {
    if rho <= 0.0 {
        return 0.0;
    }
    c_x() * rho.powf(4.0 / 3.0)
}

/// v_x(ρ) = d/dρ [c_x ρ^(4/3)] = -(3/π)^(1/3) ρ^(1/3)
pub(crate) fn lda_x_potential(rho: f64) -> f64 {
    if rho <= 0.0 {
        return 0.0;
    }
    -(3.0 / PI).powf(1.0 / 3.0) * rho.powf(1.0 / 3.0)
}

// ---------------------------------------------------------------------------
// PBE exchange-only (GGA) helpers
// ---------------------------------------------------------------------------

const PBE_KAPPA: f64 = 0.804;
const PBE_MU: f64 = 0.219_514_972_764_517_1;

/// PBE exchange enhancement factor as a function of s².
#[inline]
fn pbe_fx(s2: f64) -> f64 {
    let t = 1.0 + (PBE_MU / PBE_KAPPA) * s2;
    1.0 + PBE_KAPPA - PBE_KAPPA / t
}

/// dF_x/d(s²) = μ / t²
#[inline]
fn pbe_dfx_ds2(s2: f64) -> f64 {
    let t = 1.0 + (PBE_MU / PBE_KAPPA) * s2;
    PBE_MU / (t * t)
}

/// (e, ∂e/∂ρ, ∂e/∂γ) for PBE exchange with the reduced gradient
///
/// s² = γ / ( 2 (3π²)^(1/3) ρ^(4/3) )²
///
/// Working in s² keeps ∂e/∂γ finite at γ = 0.
pub(crate) fn pbe_x(rho: f64, gamma: f64) -> (f64, f64, f64) {
    if rho <= 0.0 {
        return (0.0, 0.0, 0.0);
    }
    let gamma = gamma.max(0.0);

    let e_lda = c_x() * rho.powf(4.0 / 3.0);
    let de_lda_drho = (4.0 / 3.0) * c_x() * rho.powf(1.0 / 3.0);

    let denom = 2.0 * (3.0 * PI * PI).powf(1.0 / 3.0) * rho.powf(4.0 / 3.0);
    let denom2 = denom * denom;
    let s2 = gamma / denom2;

    let fx = pbe_fx(s2);
    let dfx = pbe_dfx_ds2(s2);

    // ∂(s²)/∂ρ = -(8/3) s² / ρ at fixed γ
    let ds2_drho = -(8.0 / 3.0) * s2 / rho;

    let e = e_lda * fx;
    let de_drho = de_lda_drho * fx + e_lda * dfx * ds2_drho;
    let de_dgamma = e_lda * dfx / denom2;

    (e, de_drho, de_dgamma)
}
