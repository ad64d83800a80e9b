pub mod catalog_loader;
pub mod scene_loader;

use tracing::{debug, info};

use crate::config::GeneratorConfig;
use crate::error::{HsiError, Result};
use crate::scene::VoxelWorld;
use crate::types::{MaterialLibrary, VoxelBox};

/// Result of the ingestion stage.
#[derive(Debug)]
pub struct IngestionResult {
    pub world: VoxelWorld,
    pub catalog: MaterialLibrary,
    /// Region to scan: the configured box, or the scene bounds.
    pub region: VoxelBox,
    pub stats: IngestionStats,
}

/// Statistics about the ingested scene and catalog.
#[derive(Debug)]
pub struct IngestionStats {
    pub material_count: usize,
    pub chunk_count: usize,
    pub world_height: usize,
    pub scene_bounds: Option<VoxelBox>,
}

/// Run the full ingestion stage.
pub fn ingest(config: &GeneratorConfig) -> Result<IngestionResult> {
    // 1. Validate inputs exist
    if !config.materials.exists() {
        return Err(HsiError::Catalog(format!(
            "Material catalog not found: {}",
            config.materials.display()
        )));
    }
    if !config.scene.exists() {
        return Err(HsiError::Scene(format!(
            "Scene file not found: {}",
            config.scene.display()
        )));
    }

    // 2. Load
    let catalog = catalog_loader::load_catalog(&config.materials)?;
    info!(materials = catalog.len(), path = %config.materials.display(), "Loaded material catalog");

    let world = scene_loader::load_scene(&config.scene)?;
    info!(chunks = world.chunk_count(), path = %config.scene.display(), "Loaded scene");

    // 3. Resolve scan region
    let region = match (config.region, world.bounds()) {
        (Some(region), _) => region,
        (None, Some(bounds)) => bounds,
        (None, None) => {
            return Err(HsiError::Configuration(
                "scene is empty and no region was given".into(),
            ));
        }
    };
    region.validate()?;

    let stats = IngestionStats {
        material_count: catalog.len(),
        chunk_count: world.chunk_count(),
        world_height: world.height(),
        scene_bounds: world.bounds(),
    };
    debug!(
        min = %region.min,
        max = %region.max,
        height = stats.world_height,
        "Scan region"
    );

    Ok(IngestionResult {
        world,
        catalog,
        region,
        stats,
    })
}
