//! Gaussian basis functions evaluated on real-space grids.
//!
//! Only point evaluation (values and first derivatives) lives here; the
//! quadrature code in `scf` tabulates these per grid block.

pub mod basis;
pub mod cgto;
pub mod gto;

pub use basis::Basis;
pub use cgto::{ContractedGTO, ContractionError};
pub use gto::{GTO, GTO1d};
