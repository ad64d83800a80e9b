use std::fs;
use std::path::Path;

use glam::IVec3;
use serde::Deserialize;
use tracing::debug;

use crate::error::{HsiError, Result};
use crate::scene::VoxelWorld;
use crate::types::{VoxelBox, VoxelKey};

/// Tallest scene accepted; every chunk allocates `16 * 16 * height` voxels.
pub const MAX_SCENE_HEIGHT: usize = 4096;

#[derive(Debug, Deserialize)]
struct SceneFile {
    height: usize,
    #[serde(default)]
    fills: Vec<FillEntry>,
    #[serde(default)]
    voxels: Vec<VoxelEntry>,
}

/// Solid region; `max` is exclusive.
#[derive(Debug, Deserialize)]
struct FillEntry {
    min: [i32; 3],
    max: [i32; 3],
    block: u16,
    #[serde(default)]
    data: u8,
}

#[derive(Debug, Deserialize)]
struct VoxelEntry {
    x: i32,
    y: i32,
    z: i32,
    block: u16,
    #[serde(default)]
    data: u8,
}

/// Load a scene from a JSON file.
pub fn load_scene(path: &Path) -> Result<VoxelWorld> {
    let text = fs::read_to_string(path)
        .map_err(|e| HsiError::Scene(format!("Failed to read {}: {e}", path.display())))?;
    parse_scene(&text)
}

/// Parse scene JSON. Fills are applied in order, then single voxels on top.
pub fn parse_scene(text: &str) -> Result<VoxelWorld> {
    let file: SceneFile = serde_json::from_str(text)
        .map_err(|e| HsiError::Scene(format!("Failed to parse scene: {e}")))?;

    if file.height == 0 {
        return Err(HsiError::Scene("scene height must be positive".into()));
    }
    if file.height > MAX_SCENE_HEIGHT {
        return Err(HsiError::Scene(format!(
            "scene height {} too large (max {MAX_SCENE_HEIGHT})",
            file.height
        )));
    }

    let mut world = VoxelWorld::new(file.height);
    for fill in &file.fills {
        let region = VoxelBox::new(IVec3::from_array(fill.min), IVec3::from_array(fill.max));
        if region.validate().is_err() {
            return Err(HsiError::Scene(format!(
                "fill min {:?} exceeds max {:?}",
                fill.min, fill.max
            )));
        }
        world.fill(&region, VoxelKey::new(fill.block, fill.data))?;
    }
    for v in &file.voxels {
        world.set_voxel(v.x, v.y, v.z, VoxelKey::new(v.block, v.data))?;
    }

    debug!(
        fills = file.fills.len(),
        voxels = file.voxels.len(),
        chunks = world.chunk_count(),
        "Parsed scene"
    );
    Ok(world)
}
