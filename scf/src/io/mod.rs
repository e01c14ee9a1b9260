//! Input/Output operations
//!
//! This module handles logging setup and writing results to disk.

mod output;

pub use output::{matrix_rows, setup_output, write_xc_result, XcResultDump};
