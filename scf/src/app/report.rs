use crate::config::ReferenceValues;
use crate::dft::XcOutput;
use color_eyre::eyre::{bail, Result};
use tracing::info;

pub fn report_summary(out: &XcOutput, total_points: usize) {
    info!("\nXC evaluation finished.");
    info!(
        "  grid points used: {} of {}",
        out.points_used, total_points
    );
    info!("  E_semilocal = {:.10} au", out.e_semilocal);
    info!("  E_nl (VV10) = {:.10} au", out.e_nonlocal);
    info!("  E_xc        = {:.10} au", out.energy());

    let n = out.matrix.nrows();
    info!("\nV_xc diagonal:");
    for i in 0..n {
        info!("  {:>3}: {:+.10}", i + 1, out.matrix[(i, i)]);
    }
}

/// Compares against the configured reference energies; any entry outside the
/// tolerance is an error.
pub fn check_reference(out: &XcOutput, reference: &ReferenceValues) -> Result<()> {
    let tolerance = reference.tolerance.unwrap_or(1e-6);
    let checks = [
        ("non-local", reference.nl_energy, out.e_nonlocal),
        ("total XC", reference.xc_energy, out.energy()),
    ];

    let mut failed = Vec::new();
    for (name, expected, actual) in checks {
        let Some(expected) = expected else { continue };
        let diff = (actual - expected).abs();
        if diff <= tolerance {
            info!(
                "Reference {} energy matched: {:.10} (|diff| = {:.2e})",
                name, expected, diff
            );
        } else {
            failed.push(format!(
                "{} energy {:.10} differs from reference {:.10} by {:.2e} (tolerance {:.2e})",
                name, actual, expected, diff, tolerance
            ));
        }
    }

    if !failed.is_empty() {
        bail!("{}", failed.join("; "));
    }
    Ok(())
}
