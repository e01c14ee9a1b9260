//! Output formatting and logging utilities

use crate::dft::XcOutput;
use color_eyre::eyre::{Result, WrapErr};
use nalgebra::DMatrix;
use serde::Serialize;
use std::fmt;
use std::fs::{self, File};
use std::time::SystemTime as StdSystemTime;
use tracing::info;
use tracing_subscriber::{
    filter::LevelFilter, fmt::format::Writer, fmt::layer, fmt::time::FormatTime,
    layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry,
};

/// Custom time formatter that shows only seconds
struct SecondPrecisionTimer;

impl FormatTime for SecondPrecisionTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let now = StdSystemTime::now();
        let duration = now
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();

        let total_seconds = duration.as_secs();
        let hours = (total_seconds / 3600) % 24;
        let minutes = (total_seconds / 60) % 60;
        let seconds = total_seconds % 60;

        write!(w, "{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

/// Setup output logging to file or stdout
pub fn setup_output(output_path: Option<&String>, level: LevelFilter) {
    match output_path {
        Some(path) => {
            if let Ok(log) = File::create(path) {
                let file_layer = layer()
                    .with_writer(log)
                    .with_timer(SecondPrecisionTimer)
                    .with_ansi(false)
                    .with_filter(level);
                Registry::default().with(file_layer).init();
                info!("Output will be written to: {}", path);
            } else {
                eprintln!("Could not create output file: {}", path);
            }
        }
        None => {
            let stdout_layer = layer()
                .with_writer(std::io::stdout)
                .with_timer(SecondPrecisionTimer)
                .with_ansi(true)
                .with_filter(level);
            Registry::default().with(stdout_layer).init();
            info!("Output will be printed to stdout");
        }
    }
}

/// What `--matrix-output` writes: the energies and V_xc row by row.
#[derive(Debug, Serialize)]
pub struct XcResultDump {
    pub e_semilocal: f64,
    pub e_nonlocal: f64,
    pub e_xc: f64,
    pub matrix: Vec<Vec<f64>>,
}

impl From<&XcOutput> for XcResultDump {
    fn from(out: &XcOutput) -> Self {
        XcResultDump {
            e_semilocal: out.e_semilocal,
            e_nonlocal: out.e_nonlocal,
            e_xc: out.energy(),
            matrix: matrix_rows(&out.matrix),
        }
    }
}

pub fn matrix_rows(m: &DMatrix<f64>) -> Vec<Vec<f64>> {
    m.row_iter().map(|row| row.iter().copied().collect()).collect()
}

pub fn write_xc_result(path: &str, out: &XcOutput) -> Result<()> {
    let yaml = serde_yml::to_string(&XcResultDump::from(out))
        .wrap_err("Failed to serialize XC result")?;
    fs::write(path, yaml).wrap_err_with(|| format!("Unable to write XC result to: {}", path))?;
    info!("XC potential matrix written to: {}", path);
    Ok(())
}
