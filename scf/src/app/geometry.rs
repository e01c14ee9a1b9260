use crate::config::Config;
use color_eyre::eyre::{eyre, Result};
use nalgebra::Vector3;
use periodic_table_on_an_enum::Element;
use tracing::info;

/// Geometry information (elements and coordinates) prepared from the user
/// configuration.
#[derive(Clone, Debug, Default)]
pub struct Geometry {
    pub elements: Vec<Element>,
    pub coords: Vec<Vector3<f64>>,
}

impl Geometry {
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

/// Build the atoms listed in the YAML configuration. Snapshots without atoms
/// give an empty geometry; basis functions then carry explicit centers.
pub fn build_geometry(config: &Config) -> Result<Geometry> {
    let atoms = match &config.atoms {
        Some(atoms) => atoms,
        None => return Ok(Geometry::default()),
    };
    info!("\nPreparing geometry...");

    let mut elements = Vec::with_capacity(atoms.len());
    let mut coords = Vec::with_capacity(atoms.len());

    for atom in atoms {
        let element = Element::from_symbol(&atom.element)
            .ok_or_else(|| eyre!("Invalid element symbol: {}", atom.element))?;
        let vector = Vector3::new(atom.coords[0], atom.coords[1], atom.coords[2]);
        info!(
            "  {:>2} [{:+.6}, {:+.6}, {:+.6}]",
            element.get_symbol(),
            vector.x,
            vector.y,
            vector.z
        );
        elements.push(element);
        coords.push(vector);
    }

    Ok(Geometry { elements, coords })
}
