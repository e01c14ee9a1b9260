/* Contracted Gaussian type orbitals (CGTO), a fixed linear combination of
   primitives from gto.rs sharing one center and one Cartesian shape.
*/

use crate::basis::Basis;
use crate::gto::GTO;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ContractionError {
    #[error("{exponents} exponents but {coefficients} contraction coefficients")]
    LengthMismatch { exponents: usize, coefficients: usize },
    #[error("contraction has no primitives")]
    Empty,
    #[error("Gaussian exponent must be positive, got {0}")]
    NonPositiveExponent(f64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractedGTO {
    pub primitives: Vec<GTO>,
    pub coefficients: Vec<f64>,
    // e.g. "He 1s", "O 2px"; informational only
    pub label: String,
}

impl ContractedGTO {
    pub fn new(
        label: &str,
        center: Vector3<f64>,
        l_xyz: Vector3<i32>,
        exponents: &[f64],
        coefficients: &[f64],
    ) -> Result<Self, ContractionError> {
        if exponents.len() != coefficients.len() {
            return Err(ContractionError::LengthMismatch {
                exponents: exponents.len(),
                coefficients: coefficients.len(),
            });
        }
        if exponents.is_empty() {
            return Err(ContractionError::Empty);
        }
        if let Some(&bad) = exponents.iter().find(|&&a| !(a > 0.0)) {
            return Err(ContractionError::NonPositiveExponent(bad));
        }

        let primitives = exponents
            .iter()
            .map(|&alpha| GTO::new(alpha, l_xyz, center))
            .collect();

        Ok(Self {
            primitives,
            coefficients: coefficients.to_vec(),
            label: label.to_string(),
        })
    }

    pub fn l_xyz(&self) -> Vector3<i32> {
        self.primitives[0].l_xyz
    }

    /// Smallest exponent; sets how far the function reaches.
    pub fn most_diffuse_exponent(&self) -> f64 {
        self.primitives
            .iter()
            .map(|p| p.alpha)
            .fold(f64::INFINITY, f64::min)
    }
}

impl Basis for ContractedGTO {
    fn evaluate(&self, r: &Vector3<f64>) -> f64 {
        self.primitives
            .iter()
            .zip(&self.coefficients)
            .map(|(p, c)| c * p.evaluate(r))
            .sum()
    }

    fn gradient(&self, r: &Vector3<f64>) -> Vector3<f64> {
        self.evaluate_with_gradient(r).1
    }

    fn evaluate_with_gradient(&self, r: &Vector3<f64>) -> (f64, Vector3<f64>) {
        self.primitives.iter().zip(&self.coefficients).fold(
            (0.0, Vector3::zeros()),
            |(v, g), (p, c)| {
                let (pv, pg) = p.evaluate_with_gradient(r);
                (v + c * pv, g + pg * *c)
            },
        )
    }

    fn center(&self) -> Vector3<f64> {
        self.primitives[0].center
    }
}
