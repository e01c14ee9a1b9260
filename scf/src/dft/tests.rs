use super::functional::{lda_x_energy_density, lda_x_potential, pbe_x};
use super::*;
use crate::nlc::Vv10Params;
use crate::test_utils::{cubic_grid, he_dimer_density, he_dimer_evaluator};
use basis::Basis;
use nalgebra::{DMatrix, Vector3};
use std::f64::consts::PI;

fn rel_diff(a: f64, b: f64) -> f64 {
    (a - b).abs() / a.abs().max(b.abs()).max(1e-300)
}

#[test]
fn test_lda_exchange_closed_form() {
    let cx = -0.75 * (3.0 / PI).powf(1.0 / 3.0);
    assert!(rel_diff(lda_x_energy_density(1.0), cx) < 1e-15);
    for &rho in &[0.01_f64, 0.3, 2.0] {
        // v = (4/3) e / rho for e ~ rho^(4/3)
        let e = lda_x_energy_density(rho);
        assert!(rel_diff(lda_x_potential(rho), 4.0 / 3.0 * e / rho) < 1e-13);
    }
    assert_eq!(lda_x_energy_density(0.0), 0.0);
    assert_eq!(lda_x_potential(-1.0), 0.0);
}

#[test]
fn test_pbe_exchange_reduces_to_lda_without_gradient() {
    for &rho in &[0.05, 0.5, 3.0] {
        let (e, v_rho, v_gamma) = pbe_x(rho, 0.0);
        assert!(rel_diff(e, lda_x_energy_density(rho)) < 1e-14);
        assert!(rel_diff(v_rho, lda_x_potential(rho)) < 1e-13);
        // finite at zero gradient, and negative: exchange gets stronger with γ
        assert!(v_gamma < 0.0 && v_gamma.is_finite());
    }
}

#[test]
fn test_pbe_exchange_derivatives() {
    let h = 1e-6;
    for &(rho, gamma) in &[(0.2_f64, 0.05_f64), (1.3, 2.0), (0.02, 1e-4)] {
        let (_, v_rho, v_gamma) = pbe_x(rho, gamma);
        let fd_rho = (pbe_x(rho + h * rho, gamma).0 - pbe_x(rho - h * rho, gamma).0) / (2.0 * h * rho);
        let fd_gamma = (pbe_x(rho, gamma + h * gamma).0 - pbe_x(rho, gamma - h * gamma).0) / (2.0 * h * gamma);
        assert!(rel_diff(v_rho, fd_rho) < 1e-7, "v_rho {} vs {}", v_rho, fd_rho);
        assert!(rel_diff(v_gamma, fd_gamma) < 1e-7, "v_gamma {} vs {}", v_gamma, fd_gamma);
    }
}

#[test]
fn test_functional_parsing() {
    assert_eq!("LDA_X".parse::<XcFunctional>().unwrap(), XcFunctional::LdaX);
    assert_eq!("pbe".parse::<XcFunctional>().unwrap(), XcFunctional::PbeX);
    assert_eq!("none".parse::<XcFunctional>().unwrap(), XcFunctional::Null);
    assert!("b3lyp".parse::<XcFunctional>().is_err());
    assert_eq!(XcFunctional::PbeX.to_string(), "pbe_x");
    assert!(XcFunctional::PbeX.is_gga());
    assert!(!XcFunctional::LdaX.is_gga());
}

#[test]
fn test_functional_rejects_mismatched_arrays() {
    assert!(XcFunctional::LdaX.compute_functional(&[0.1, 0.2], &[0.0]).is_err());
    let values = XcFunctional::Null.compute_functional(&[0.1, 0.2], &[0.0, 0.3]).unwrap();
    assert_eq!(values.exc, vec![0.0, 0.0]);
    assert_eq!(values.v_gamma, vec![0.0, 0.0]);
}

#[test]
fn test_block_construction_checks() {
    let pts = vec![Vector3::zeros(), Vector3::new(1.0, 0.0, 0.0)];
    assert!(QuadratureBlock::new(pts.clone(), vec![1.0], vec![0]).is_err());
    assert!(QuadratureBlock::new(pts.clone(), vec![1.0, 1.0], vec![0, 2, 0]).is_err());

    let block = QuadratureBlock::new(pts, vec![0.5, 0.25], vec![2, 0]).unwrap();
    assert_eq!(block.npoints(), 2);
    assert_eq!(block.nfunctions(), 2);
    let sub = block.select(&[1]);
    assert_eq!(sub.weights(), &[0.25]);
    assert_eq!(sub.basis_map(), &[2, 0]);
}

#[test]
fn test_point_fields_match_basis() {
    let evaluator = he_dimer_evaluator();
    let density = he_dimer_density();
    let r = Vector3::new(0.3, -0.4, 0.9);
    let h = 1e-5;

    let mut points = vec![r];
    for d in 0..3 {
        let mut step = Vector3::zeros();
        step[d] = h;
        points.push(r + step);
        points.push(r - step);
    }
    let n = points.len();
    let block = QuadratureBlock::new(points, vec![1.0; n], vec![0, 1, 2]).unwrap();
    let fields = evaluator.compute_points(&block, &density).unwrap();
    fields.check_block(&block).unwrap();

    let phi: Vec<f64> = evaluator.functions().iter().map(|f| f.evaluate(&r)).collect();
    let mut rho = 0.0;
    for a in 0..3 {
        for b in 0..3 {
            rho += density[(a, b)] * phi[a] * phi[b];
        }
    }
    assert!(rel_diff(fields.rho[0], rho) < 1e-13);

    let mut gamma = 0.0;
    for d in 0..3 {
        let fd = (fields.rho[1 + 2 * d] - fields.rho[2 + 2 * d]) / (2.0 * h);
        assert!(
            (fd - fields.rho_grad[d][0]).abs() < 1e-7,
            "d{}: {} vs {}",
            d,
            fd,
            fields.rho_grad[d][0]
        );
        gamma += fields.rho_grad[d][0].powi(2);
    }
    assert!(rel_diff(fields.gamma[0], gamma) < 1e-13);
}

#[test]
fn test_local_basis_map_reorders_columns() {
    let evaluator = he_dimer_evaluator();
    let density = he_dimer_density();
    let r = Vector3::new(0.1, 0.2, -0.3);

    let full = QuadratureBlock::new(vec![r], vec![1.0], vec![0, 1, 2]).unwrap();
    let permuted = QuadratureBlock::new(vec![r], vec![1.0], vec![2, 0, 1]).unwrap();
    let a = evaluator.compute_points(&full, &density).unwrap();
    let b = evaluator.compute_points(&permuted, &density).unwrap();

    assert!(rel_diff(a.rho[0], b.rho[0]) < 1e-14);
    assert_eq!(a.phi[(0, 2)], b.phi[(0, 0)]);
    assert_eq!(a.phi[(0, 0)], b.phi[(0, 1)]);
}

#[test]
fn test_evaluator_shape_errors() {
    let evaluator = he_dimer_evaluator();
    let block = QuadratureBlock::new(vec![Vector3::zeros()], vec![1.0], vec![0, 1]).unwrap();
    assert!(evaluator.compute_points(&block, &DMatrix::identity(2, 2)).is_err());

    let bad_map = QuadratureBlock::new(vec![Vector3::zeros()], vec![1.0], vec![0, 5]).unwrap();
    assert!(evaluator
        .compute_points(&bad_map, &he_dimer_density())
        .is_err());
}

#[test]
fn test_screening_drops_empty_points() {
    let evaluator = he_dimer_evaluator();
    let density = he_dimer_density();
    // far enough that every Gaussian underflows to exactly zero
    let far = Vector3::new(1.0e3, 0.0, 0.0);
    let block = QuadratureBlock::new(vec![Vector3::zeros(), far], vec![1.0, 1.0], vec![0, 1, 2]).unwrap();
    let fields = evaluator.compute_points(&block, &density).unwrap();
    assert_eq!(fields.rho[1], 0.0);

    let (kept, kept_fields) = screen_block(&block, &fields, DEFAULT_DENSITY_CUTOFF).unwrap();
    assert_eq!(kept.npoints(), 1);
    assert_eq!(kept_fields.npoints(), 1);
    assert_eq!(kept_fields.phi.nrows(), 1);
    kept_fields.check_block(&kept).unwrap();

    let empty = QuadratureBlock::new(vec![far], vec![1.0], vec![0, 1, 2]).unwrap();
    let empty_fields = evaluator.compute_points(&empty, &density).unwrap();
    assert!(screen_block(&empty, &empty_fields, DEFAULT_DENSITY_CUTOFF).is_none());
}

#[test]
fn test_zero_density_blocks_never_reach_the_kernel() {
    let evaluator = he_dimer_evaluator();
    let density = he_dimer_density();
    let settings = XcSettings {
        functional: XcFunctional::PbeX,
        vv10: Some(Vv10Params::default()),
        density_cutoff: DEFAULT_DENSITY_CUTOFF,
    };

    let clean = cubic_grid(5, 3.0, 2, 3);
    let mut dirty = clean.clone();
    let far: Vec<Vector3<f64>> = (0..4).map(|i| Vector3::new(1.0e3 + i as f64, 0.0, 0.0)).collect();
    dirty.push(QuadratureBlock::new(far, vec![1.0; 4], vec![0, 1, 2]).unwrap());

    let a = XcIntegrator::new(&clean, &evaluator, settings).compute(&density).unwrap();
    let b = XcIntegrator::new(&dirty, &evaluator, settings).compute(&density).unwrap();

    assert!(b.energy().is_finite());
    assert!(b.matrix.iter().all(|x| x.is_finite()));
    assert_eq!(a.points_used, b.points_used);
    assert!(rel_diff(a.energy(), b.energy()) < 1e-12);
}

#[test]
fn test_semilocal_matrix_convention() {
    // Without VV10 the LDA matrix must come out as Σ_p w v φ_a φ_b, which
    // only holds if v_rho is halved before the V + Vᵀ projection.
    let evaluator = he_dimer_evaluator();
    let density = he_dimer_density();
    let grid = cubic_grid(5, 3.0, 3, 3);
    let settings = XcSettings {
        functional: XcFunctional::LdaX,
        vv10: None,
        density_cutoff: DEFAULT_DENSITY_CUTOFF,
    };
    let out = XcIntegrator::new(&grid, &evaluator, settings).compute(&density).unwrap();

    let mut expected = DMatrix::<f64>::zeros(3, 3);
    let mut energy = 0.0;
    for block in &grid {
        for (r, w) in block.points().iter().zip(block.weights()) {
            let phi: Vec<f64> = evaluator.functions().iter().map(|f| f.evaluate(r)).collect();
            let mut rho = 0.0;
            for a in 0..3 {
                for b in 0..3 {
                    rho += density[(a, b)] * phi[a] * phi[b];
                }
            }
            energy += w * lda_x_energy_density(rho);
            let v = w * lda_x_potential(rho);
            for a in 0..3 {
                for b in 0..3 {
                    expected[(a, b)] += v * phi[a] * phi[b];
                }
            }
        }
    }

    assert_eq!(out.e_nonlocal, 0.0);
    assert!(rel_diff(out.e_semilocal, energy) < 1e-12);
    assert!((&out.matrix - &expected).amax() < 1e-12 * expected.amax());
}

#[test]
fn test_xc_matrix_is_energy_derivative() {
    let evaluator = he_dimer_evaluator();
    let density = he_dimer_density();
    let grid = cubic_grid(6, 3.0, 3, 3);
    let settings = XcSettings {
        functional: XcFunctional::PbeX,
        vv10: Some(Vv10Params::rvv10()),
        density_cutoff: DEFAULT_DENSITY_CUTOFF,
    };
    let xc = XcIntegrator::new(&grid, &evaluator, settings);
    let out = xc.compute(&density).unwrap();
    assert!(out.e_nonlocal.is_finite() && out.e_nonlocal != 0.0);
    assert!(out.e_semilocal < 0.0);
    assert!((&out.matrix - out.matrix.transpose()).amax() < 1e-14);

    let eps = 1e-5;
    for &(a, b) in &[(0, 0), (0, 2), (1, 1)] {
        let mut plus = density.clone();
        let mut minus = density.clone();
        plus[(a, b)] += eps;
        minus[(a, b)] -= eps;
        if a != b {
            plus[(b, a)] += eps;
            minus[(b, a)] -= eps;
        }
        let de = (xc.compute(&plus).unwrap().energy() - xc.compute(&minus).unwrap().energy()) / (2.0 * eps);
        let expected = if a == b { out.matrix[(a, b)] } else { 2.0 * out.matrix[(a, b)] };
        assert!(
            (de - expected).abs() < 1e-5 * expected.abs().max(1e-2),
            "dE/dP[{},{}]: {} vs {}",
            a,
            b,
            de,
            expected
        );
    }
}

#[test]
fn test_density_shape_mismatch() {
    let evaluator = he_dimer_evaluator();
    let grid = cubic_grid(3, 1.0, 1, 3);
    let xc = XcIntegrator::new(&grid, &evaluator, XcSettings::default());
    assert!(xc.compute(&DMatrix::identity(2, 2)).is_err());
}
