//! All-pairs accumulation of the VV10 kernel.
//!
//! For an outer point i and inner point j with R² = |r_i - r_j|²:
//!
//!   g  = W0_i R² + κ_i,   g' = W0_j R² + κ_j
//!   F  = -1.5 w_j ρ_j / (g g' (g + g'))
//!   F_U = F (1/g + 1/(g + g')),   F_W = F_U R²
//!
//! and the outer point collects Σ F, -Σ F_U, -Σ F_W over every inner point
//! of the grid (itself included).

use super::kernel::KernelState;
use nalgebra::Vector3;

/// Positions, weights, densities and kernel parameters of one block.
#[derive(Clone, Copy)]
pub struct KernelPoints<'a> {
    pub coords: &'a [Vector3<f64>],
    pub weights: &'a [f64],
    pub rho: &'a [f64],
    pub kernel: &'a KernelState,
}

impl KernelPoints<'_> {
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

/// Running sums for the points of one outer block.
#[derive(Clone, Debug)]
pub struct PairAccumulators {
    pub phi_kernel: Vec<f64>,
    pub phi_u: Vec<f64>,
    pub phi_w: Vec<f64>,
}

impl PairAccumulators {
    pub fn zeros(n: usize) -> Self {
        Self {
            phi_kernel: vec![0.0; n],
            phi_u: vec![0.0; n],
            phi_w: vec![0.0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.phi_kernel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phi_kernel.is_empty()
    }

    /// Adds the contribution of every point in `inner` to every point in `outer`.
    pub fn accumulate(&mut self, outer: &KernelPoints, inner: &KernelPoints) {
        debug_assert_eq!(outer.len(), self.len());

        // w_j ρ_j does not depend on the outer point
        let inner_charge: Vec<f64> = inner
            .weights
            .iter()
            .zip(inner.rho)
            .map(|(w, r)| -1.5 * w * r)
            .collect();

        for i in 0..outer.len() {
            let ri = outer.coords[i];
            let w0_i = outer.kernel.w0[i];
            let kappa_i = outer.kernel.kappa[i];

            let mut sum_k = 0.0;
            let mut sum_u = 0.0;
            let mut sum_w = 0.0;
            for j in 0..inner.len() {
                let r2 = (ri - inner.coords[j]).norm_squared();
                let g = w0_i * r2 + kappa_i;
                let gp = inner.kernel.w0[j] * r2 + inner.kernel.kappa[j];
                let gt = g + gp;

                let f = inner_charge[j] / (g * gp * gt);
                let f_u = f * (1.0 / g + 1.0 / gt);

                sum_k += f;
                sum_u -= f_u;
                sum_w -= f_u * r2;
            }

            self.phi_kernel[i] += sum_k;
            self.phi_u[i] += sum_u;
            self.phi_w[i] += sum_w;
        }
    }
}
