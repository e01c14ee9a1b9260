//! Grid-based DFT pieces surrounding the non-local correction.
//!
//! - [`grid`]: quadrature blocks and point values from a density matrix
//! - [`functional`]: semilocal exchange functionals in (ρ, γ) form
//! - [`xc`]: the per-iteration E_xc / V_xc driver

pub mod functional;
pub mod grid;
#[cfg(test)]
mod tests;
pub mod xc;

pub use functional::{FunctionalValues, SemilocalFunctional, XcFunctional};
pub use grid::{screen_block, BasisPointsEvaluator, PointFields, PointsEvaluator, QuadratureBlock};
pub use xc::{XcIntegrator, XcOutput, XcSettings, DEFAULT_DENSITY_CUTOFF};
