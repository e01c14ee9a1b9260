#![allow(non_snake_case)]
extern crate nalgebra as na;

use crate::basis::Basis;
use na::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

#[derive(Debug, Serialize, Deserialize, Copy, Clone)]
pub struct GTO1d {
    pub alpha: f64,
    pub l: i32,
    pub center: f64,
    pub norm: f64,
}

fn factorial(n: i32) -> f64 {
    (1..=n).fold(1.0, |acc, x| acc * x as f64)
}

impl GTO1d {
    pub fn new(alpha: f64, l: i32, center: f64) -> Self {
        let norm = GTO1d::compute_norm(alpha, l);
        Self {
            alpha,
            l,
            center,
            norm,
        }
    }

    fn compute_norm(alpha: f64, l: i32) -> f64 {
        // N^2 = (2^(3l) * l! * alpha^l * sqrt(2 alpha / pi)) / (2l)!
        let numerator = 2.0_f64.powi(3 * l) * factorial(l) * alpha.powi(l);
        let denominator = factorial(2 * l);
        let factor = (2.0 * alpha / PI).sqrt();

        (numerator * factor / denominator).sqrt()
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let x = x - self.center;
        self.norm * x.powi(self.l) * (-self.alpha * x * x).exp()
    }

    /// d/dx [N x^l e^{-a x^2}] = N (l x^{l-1} - 2a x^{l+1}) e^{-a x^2}
    pub fn derivative(&self, x: f64) -> f64 {
        let x = x - self.center;
        let gauss = (-self.alpha * x * x).exp();
        let outer = -2.0 * self.alpha * x.powi(self.l + 1);
        if self.l == 0 {
            self.norm * outer * gauss
        } else {
            let inner = self.l as f64 * x.powi(self.l - 1);
            self.norm * (inner + outer) * gauss
        }
    }
}

/// Cartesian primitive Gaussian x^i y^j z^k e^{-alpha r^2}, stored as a
/// product of three normalised 1D factors.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GTO {
    pub alpha: f64,
    pub l_xyz: Vector3<i32>,
    pub center: Vector3<f64>,
    pub norm: f64,
    pub gto1d: [GTO1d; 3],
}

impl GTO {
    pub fn new(alpha: f64, l_xyz: Vector3<i32>, center: Vector3<f64>) -> Self {
        let gto1d = [
            GTO1d::new(alpha, l_xyz.x, center.x),
            GTO1d::new(alpha, l_xyz.y, center.y),
            GTO1d::new(alpha, l_xyz.z, center.z),
        ];
        let norm = gto1d[0].norm * gto1d[1].norm * gto1d[2].norm;
        Self {
            alpha,
            l_xyz,
            center,
            norm,
            gto1d,
        }
    }

    /// Total angular momentum i + j + k.
    pub fn angular_momentum(&self) -> i32 {
        self.l_xyz.x + self.l_xyz.y + self.l_xyz.z
    }
}

impl Basis for GTO {
    fn evaluate(&self, r: &Vector3<f64>) -> f64 {
        self.gto1d[0].evaluate(r.x) * self.gto1d[1].evaluate(r.y) * self.gto1d[2].evaluate(r.z)
    }

    fn gradient(&self, r: &Vector3<f64>) -> Vector3<f64> {
        self.evaluate_with_gradient(r).1
    }

    fn evaluate_with_gradient(&self, r: &Vector3<f64>) -> (f64, Vector3<f64>) {
        let (gx, gy, gz) = (
            self.gto1d[0].evaluate(r.x),
            self.gto1d[1].evaluate(r.y),
            self.gto1d[2].evaluate(r.z),
        );
        let (dx, dy, dz) = (
            self.gto1d[0].derivative(r.x),
            self.gto1d[1].derivative(r.y),
            self.gto1d[2].derivative(r.z),
        );
        (
            gx * gy * gz,
            Vector3::new(dx * gy * gz, gx * dy * gz, gx * gy * dz),
        )
    }

    fn center(&self) -> Vector3<f64> {
        self.center
    }
}
