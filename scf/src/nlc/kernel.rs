//! Local VV10 kernel parameters W0(ρ, γ) and κ(ρ).

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Empirical VV10 constants.
///
/// `b` sets the short-range damping (and hence β), `c` the gradient
/// correction to the local plasma frequency.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vv10Params {
    pub b: f64,
    pub c: f64,
}

impl Default for Vv10Params {
    fn default() -> Self {
        Self { b: 5.9, c: 0.0093 }
    }
}

impl Vv10Params {
    pub fn new(b: f64, c: f64) -> Self {
        Self { b, c }
    }

    /// Parametrisation used with rPW86-PBE in rVV10.
    pub fn rvv10() -> Self {
        Self { b: 6.3, c: 0.0093 }
    }

    /// β = (1/32) (3/b²)^(3/4), makes the energy vanish for the uniform gas.
    pub fn beta(&self) -> f64 {
        (1.0 / 32.0) * (3.0 / (self.b * self.b)).powf(0.75)
    }

    /// b (3π/2) / (9π)^(1/6)
    pub fn kappa_prefactor(&self) -> f64 {
        self.b * 1.5 * PI / (9.0 * PI).powf(1.0 / 6.0)
    }
}

/// (W0, κ) at a single point. Requires `rho > 0`.
#[inline]
pub fn kernel(params: &Vv10Params, rho: f64, gamma: f64) -> (f64, f64) {
    let wp = (4.0 / 3.0) * PI * rho;
    let gr = gamma / (rho * rho);
    let wg = params.c * gr * gr;
    let w0 = (wg + wp).sqrt();
    let kappa = rho.powf(1.0 / 6.0) * params.kappa_prefactor();
    (w0, kappa)
}

/// Kernel parameters for every point of a block.
#[derive(Clone, Debug, Default)]
pub struct KernelState {
    pub w0: Vec<f64>,
    pub kappa: Vec<f64>,
}

impl KernelState {
    pub fn new(params: &Vv10Params, rho: &[f64], gamma: &[f64]) -> Self {
        debug_assert_eq!(rho.len(), gamma.len());
        let (w0, kappa) = rho
            .iter()
            .zip(gamma)
            .map(|(&r, &g)| kernel(params, r, g))
            .unzip();
        Self { w0, kappa }
    }

    pub fn len(&self) -> usize {
        self.w0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.w0.is_empty()
    }
}
