mod geometry;
mod report;
mod runner;
mod workspace;

pub use geometry::{build_geometry, Geometry};
pub use report::{check_reference, report_summary};
pub use runner::{resolve_settings, run_xc};
pub use workspace::CalculationWorkspace;

use crate::config::{Args, Config};
use crate::dft::XcOutput;
use crate::io::{setup_output, write_xc_result};
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use std::fs;
use std::path::Path;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;

pub struct XcApplication {
    args: Args,
    config: Config,
}

impl XcApplication {
    pub fn from_cli() -> Result<Self> {
        let args = Args::parse();
        let config = load_config(&args.config_file)?;
        Ok(Self { args, config })
    }

    pub fn run(self) -> Result<XcOutput> {
        let level = if self.args.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        };
        setup_output(self.args.output.as_ref(), level);
        info!("Configuration loaded from: {}", self.args.config_file);

        let settings = resolve_settings(&self.args, &self.config)?;
        let workspace = CalculationWorkspace::from_config(&self.config)?;
        let out = run_xc(&workspace, settings)?;
        report_summary(&out, self.config.num_points());

        if let Some(path) = &self.args.matrix_output {
            write_xc_result(path, &out)?;
        }
        if let Some(reference) = &self.config.reference {
            check_reference(&out, reference)?;
        }
        Ok(out)
    }
}

pub fn load_config(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let config_content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Unable to read configuration file: {}", path.display()))?;

    let config = serde_yml::from_str::<Config>(&config_content)
        .wrap_err("Failed to parse configuration file")?
        .with_defaults();

    Ok(config)
}
