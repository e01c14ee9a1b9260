//! Command-line interface for one-shot XC evaluations with VV10.

use color_eyre::eyre::Result;
use vv10_scf::app::XcApplication;

fn main() -> Result<()> {
    color_eyre::install()?;
    XcApplication::from_cli()?.run()?;
    Ok(())
}
