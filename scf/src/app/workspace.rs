use crate::app::geometry::{build_geometry, Geometry};
use crate::config::{BasisFunctionSpec, Config};
use crate::dft::{BasisPointsEvaluator, QuadratureBlock};
use ::basis::ContractedGTO;
use color_eyre::eyre::{ensure, eyre, Result, WrapErr};
use nalgebra::{DMatrix, Vector3};
use tracing::info;

/// Relative asymmetry tolerated in the configured density matrix.
const SYMMETRY_TOLERANCE: f64 = 1e-10;

/// In-memory representation of everything needed to evaluate E_xc and V_xc.
pub struct CalculationWorkspace {
    pub geometry: Geometry,
    pub evaluator: BasisPointsEvaluator<ContractedGTO>,
    pub grid: Vec<QuadratureBlock>,
    pub density: DMatrix<f64>,
}

impl CalculationWorkspace {
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate().wrap_err("Invalid configuration")?;
        let geometry = build_geometry(config)?;

        let functions = config
            .basis
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                build_function(spec, &geometry).wrap_err_with(|| format!("basis function {}", i))
            })
            .collect::<Result<Vec<_>>>()?;
        let nbf = functions.len();

        let density = DMatrix::from_row_iterator(
            nbf,
            nbf,
            config.density_matrix.iter().flat_map(|row| row.iter().copied()),
        );
        let asymmetry = (&density - density.transpose()).amax();
        ensure!(
            asymmetry <= SYMMETRY_TOLERANCE * density.amax().max(1.0),
            "density matrix is not symmetric (max |P - Pᵀ| = {:e})",
            asymmetry
        );

        let grid = config
            .grid
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let points = spec
                    .points
                    .iter()
                    .map(|p| Vector3::new(p[0], p[1], p[2]))
                    .collect();
                let map = spec.basis_map.clone().unwrap_or_else(|| (0..nbf).collect());
                QuadratureBlock::new(points, spec.weights.clone(), map)
                    .wrap_err_with(|| format!("grid block {}", i))
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Workspace: {} atoms, {} basis functions, {} grid blocks, {} points",
            geometry.len(),
            nbf,
            grid.len(),
            config.num_points()
        );

        Ok(Self {
            geometry,
            evaluator: BasisPointsEvaluator::new(functions),
            grid,
            density,
        })
    }

    pub fn num_basis(&self) -> usize {
        self.density.nrows()
    }
}

fn build_function(spec: &BasisFunctionSpec, geometry: &Geometry) -> Result<ContractedGTO> {
    let center = match (spec.center, spec.atom) {
        (Some(c), _) => Vector3::new(c[0], c[1], c[2]),
        (None, Some(a)) => *geometry
            .coords
            .get(a)
            .ok_or_else(|| eyre!("atom index {} out of range", a))?,
        (None, None) => return Err(eyre!("no center given")),
    };
    let powers = spec.powers.unwrap_or([0, 0, 0]);
    let label = spec.label.as_deref().unwrap_or("");
    let function = ContractedGTO::new(
        label,
        center,
        Vector3::new(powers[0], powers[1], powers[2]),
        &spec.exponents,
        &spec.coefficients,
    )?;
    Ok(function)
}
