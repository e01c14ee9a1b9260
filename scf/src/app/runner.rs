use crate::app::workspace::CalculationWorkspace;
use crate::config::{Args, Config};
use crate::dft::{XcFunctional, XcIntegrator, XcOutput, XcSettings, DEFAULT_DENSITY_CUTOFF};
use crate::nlc::Vv10Params;
use color_eyre::eyre::{ensure, Result, WrapErr};
use tracing::info;

/// Merge command-line overrides into the configured XC settings.
pub fn resolve_settings(args: &Args, config: &Config) -> Result<XcSettings> {
    let xc = config.xc_params();
    let defaults = Vv10Params::default();

    let functional: XcFunctional = args
        .functional
        .as_deref()
        .or(xc.functional.as_deref())
        .unwrap_or("none")
        .parse()
        .wrap_err("Invalid semilocal functional")?;

    let density_cutoff = args
        .density_cutoff
        .or(xc.density_cutoff)
        .unwrap_or(DEFAULT_DENSITY_CUTOFF);
    ensure!(
        density_cutoff >= 0.0,
        "density cutoff must be non-negative, got {}",
        density_cutoff
    );

    let vv10 = if args.no_vv10 || !xc.vv10.unwrap_or(true) {
        None
    } else {
        let params = Vv10Params::new(
            args.vv10_b.or(xc.vv10_b).unwrap_or(defaults.b),
            args.vv10_c.or(xc.vv10_c).unwrap_or(defaults.c),
        );
        ensure!(
            params.b > 0.0 && params.c >= 0.0,
            "VV10 parameters must satisfy b > 0 and C >= 0, got b = {}, C = {}",
            params.b,
            params.c
        );
        Some(params)
    };

    Ok(XcSettings {
        functional,
        vv10,
        density_cutoff,
    })
}

/// One XC evaluation with the snapshot's density matrix.
pub fn run_xc(workspace: &CalculationWorkspace, settings: XcSettings) -> Result<XcOutput> {
    info!("\nXC settings:");
    info!("  semilocal functional: {}", settings.functional);
    match &settings.vv10 {
        Some(p) => info!("  VV10: b = {}, C = {}, beta = {:.8}", p.b, p.c, p.beta()),
        None => info!("  VV10: disabled"),
    }
    info!("  density cutoff: {:e}", settings.density_cutoff);

    let integrator = XcIntegrator::new(&workspace.grid, &workspace.evaluator, settings);
    integrator.compute(&workspace.density)
}
