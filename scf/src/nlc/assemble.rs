//! Turns finished pair sums into the non-local energy and the perturbed
//! potential derivatives of one outer block.

use super::kernel::Vv10Params;
use super::pair::{KernelPoints, PairAccumulators};
use std::f64::consts::PI;

/// Scale applied to `v_rho` before projection.
///
/// The projector adds `V + Vᵀ`, which doubles the local (LDA-type) term for a
/// closed-shell density; the gradient term is already split between `V` and
/// `Vᵀ`. Only valid for the spin-restricted formulation.
pub const RESTRICTED_VRHO_SCALE: f64 = 0.5;

/// Applies the VV10 correction to `v_rho`/`v_gamma` in place and returns the
/// block's non-local energy Σ w ρ (β + ½ Φ).
///
/// `v_rho` is scaled by [`RESTRICTED_VRHO_SCALE`] after the correction is
/// added, so it comes out ready for [`super::project_block`].
pub fn assemble_derivatives(
    params: &Vv10Params,
    points: &KernelPoints,
    gamma: &[f64],
    acc: &PairAccumulators,
    v_rho: &mut [f64],
    v_gamma: &mut [f64],
) -> f64 {
    debug_assert_eq!(points.len(), acc.len());
    let beta = params.beta();
    let c = params.c;

    let mut energy = 0.0;
    for p in 0..points.len() {
        let rho = points.rho[p];
        let g = gamma[p];
        let w0 = points.kernel.w0[p];
        let kappa = points.kernel.kappa[p];

        let kappa_dn = kappa / (6.0 * rho);
        let w0_dgamma = c * g / (w0 * rho.powi(4));
        let w0_drho = 2.0 / w0 * (PI / 3.0 - c * g * g / rho.powi(5));

        energy += points.weights[p] * rho * (beta + 0.5 * acc.phi_kernel[p]);

        v_rho[p] += beta + acc.phi_kernel[p] + rho * (kappa_dn * acc.phi_u[p] + w0_drho * acc.phi_w[p]);
        v_rho[p] *= RESTRICTED_VRHO_SCALE;
        v_gamma[p] += rho * w0_dgamma * acc.phi_w[p];
    }
    energy
}
