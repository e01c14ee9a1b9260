//! Grid-based exchange-correlation for Kohn-Sham DFT with the VV10
//! non-local correlation correction.
//!
//! - [`dft`]: quadrature blocks, point values, semilocal functionals and the
//!   per-iteration XC driver
//! - [`nlc`]: the VV10 kernel, pair sums, derivative assembly and projection
//! - [`config`], [`io`], [`app`]: YAML snapshots, logging and the `vv10` binary

pub mod app;
pub mod config;
pub mod dft;
pub mod io;
pub mod nlc;

#[cfg(test)]
pub(crate) mod test_utils;
