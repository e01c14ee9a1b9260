//! Command-line argument parsing for XC evaluations

use clap::Parser;

/// Evaluate the semilocal and VV10 non-local XC energy and potential matrix
/// for a YAML snapshot
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    pub config_file: String,

    /// Override output file: (default stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Override semilocal functional (none, lda_x, pbe_x)
    #[arg(long)]
    pub functional: Option<String>,

    /// Override the VV10 damping parameter b
    #[arg(long)]
    pub vv10_b: Option<f64>,

    /// Override the VV10 gradient parameter C
    #[arg(long)]
    pub vv10_c: Option<f64>,

    /// Skip the non-local correction
    #[arg(long)]
    pub no_vv10: bool,

    /// Override density screening cutoff
    #[arg(long)]
    pub density_cutoff: Option<f64>,

    /// Write the XC potential matrix to this YAML file
    #[arg(long)]
    pub matrix_output: Option<String>,

    /// Log per-block details
    #[arg(short, long)]
    pub verbose: bool,
}
