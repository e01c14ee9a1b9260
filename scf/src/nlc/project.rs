//! Projection of point-wise potential derivatives onto basis-function pairs.

extern crate nalgebra as na;

use crate::dft::grid::PointFields;
use itertools::iproduct;
use na::DMatrix;

/// Block matrix before symmetrisation:
///
///   V[a,b] = Σ_p φ_b(p) w_p v_ρ(p) φ_a(p)
///          + Σ_d Σ_p φ_b(p) 2 w_p v_γ(p) ∂_dρ(p) ∂_dφ_a(p)
///
/// Indices are local to the block.
pub fn project_block(fields: &PointFields, weights: &[f64], v_rho: &[f64], v_gamma: &[f64]) -> DMatrix<f64> {
    let phi = &fields.phi;

    let mut lda = phi.clone();
    for (p, mut row) in lda.row_iter_mut().enumerate() {
        row *= weights[p] * v_rho[p];
    }
    let mut v = lda.tr_mul(phi);

    if v_gamma.iter().any(|&x| x != 0.0) {
        for (d, phi_d) in fields.phi_grad.iter().enumerate() {
            let rho_d = &fields.rho_grad[d];
            let mut gga = phi.clone();
            for (p, mut row) in gga.row_iter_mut().enumerate() {
                row *= 2.0 * weights[p] * v_gamma[p] * rho_d[p];
            }
            // Σ_p ∂_dφ_a(p) s(p) φ_b(p)
            v += phi_d.tr_mul(&gga);
        }
    }
    v
}

/// Adds `local + localᵀ` into `global` at the block's global indices.
pub fn scatter_symmetrized(global: &mut DMatrix<f64>, local: &DMatrix<f64>, basis_map: &[usize]) {
    debug_assert_eq!(local.shape(), (basis_map.len(), basis_map.len()));
    for ((a, &ga), (b, &gb)) in iproduct!(basis_map.iter().enumerate(), basis_map.iter().enumerate()) {
        global[(ga, gb)] += local[(a, b)] + local[(b, a)];
    }
}
