use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{HsiError, Result};
use crate::types::{Material, MaterialLibrary, ReflectanceCurve, VoxelKey};

#[derive(Debug, Deserialize)]
struct CatalogFile {
    materials: Vec<MaterialEntry>,
}

#[derive(Debug, Deserialize)]
struct MaterialEntry {
    name: String,
    block: u16,
    #[serde(default)]
    data: u8,
    transparency: f64,
    reflectance: ReflectanceEntry,
}

/// Either a flat reflectance or `[wavelength, value]` samples.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReflectanceEntry {
    Constant(f64),
    Samples(Vec<[f64; 2]>),
}

/// Load a material catalog from a JSON file.
pub fn load_catalog(path: &Path) -> Result<MaterialLibrary> {
    let text = fs::read_to_string(path).map_err(|e| {
        HsiError::Catalog(format!("Failed to read {}: {e}", path.display()))
    })?;
    parse_catalog(&text)
}

/// Parse catalog JSON. A later entry for the same key replaces an earlier one.
pub fn parse_catalog(text: &str) -> Result<MaterialLibrary> {
    let file: CatalogFile = serde_json::from_str(text)
        .map_err(|e| HsiError::Catalog(format!("Failed to parse catalog: {e}")))?;

    let mut library = MaterialLibrary::default();
    for entry in file.materials {
        let curve = match entry.reflectance {
            ReflectanceEntry::Constant(value) => ReflectanceCurve::constant(value),
            ReflectanceEntry::Samples(samples) => {
                ReflectanceCurve::new(samples.into_iter().map(|[w, r]| (w, r)).collect())
                    .map_err(|e| match e {
                        HsiError::Catalog(msg) => {
                            HsiError::Catalog(format!("material '{}': {msg}", entry.name))
                        }
                        other => other,
                    })?
            }
        };

        let key = VoxelKey::new(entry.block, entry.data);
        let material = Material::new(entry.name, entry.transparency, curve)?;
        debug!(block = key.block, data = key.data, name = %material.name, "Catalog entry");
        if let Some(previous) = library.insert(key, material) {
            warn!(
                block = key.block,
                data = key.data,
                replaced = %previous.name,
                "Duplicate catalog key"
            );
        }
    }

    Ok(library)
}
