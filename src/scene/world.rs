use std::collections::HashMap;
use std::sync::Arc;

use glam::IVec3;

use crate::error::{HsiError, Result};
use crate::types::{VoxelBox, VoxelKey};

use super::chunk::{local_offset, Chunk, ChunkCoord};
use super::{ChunkProvider, VoxelSource};

/// In-memory voxel world made of fixed-height chunks.
///
/// Only chunks that have been written to exist; every other chunk
/// reports as not loaded.
#[derive(Debug, Clone)]
pub struct VoxelWorld {
    height: usize,
    chunks: HashMap<ChunkCoord, Arc<Chunk>>,
    bounds: Option<VoxelBox>,
}

impl VoxelWorld {
    pub fn new(height: usize) -> Self {
        Self {
            height,
            chunks: HashMap::new(),
            bounds: None,
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Tight box around every voxel written so far.
    pub fn bounds(&self) -> Option<VoxelBox> {
        self.bounds
    }

    pub fn set_voxel(&mut self, x: i32, y: i32, z: i32, key: VoxelKey) -> Result<()> {
        if y < 0 || y as usize >= self.height {
            return Err(HsiError::Scene(format!(
                "voxel ({x}, {y}, {z}) outside world height 0..{}",
                self.height
            )));
        }

        let height = self.height;
        let chunk = self
            .chunks
            .entry(ChunkCoord::containing(x, z))
            .or_insert_with(|| Arc::new(Chunk::new(height)));
        let (lx, lz) = local_offset(x, z);
        Arc::make_mut(chunk).set(lx, y, lz, key);

        let p = IVec3::new(x, y, z);
        let voxel = VoxelBox::new(p, p + IVec3::ONE);
        self.bounds = Some(match self.bounds {
            Some(b) => b.union(&voxel),
            None => voxel,
        });
        Ok(())
    }

    /// Write `key` into every voxel of `region`.
    pub fn fill(&mut self, region: &VoxelBox, key: VoxelKey) -> Result<()> {
        region.validate()?;
        for x in region.min.x..region.max.x {
            for z in region.min.z..region.max.z {
                for y in region.min.y..region.max.y {
                    self.set_voxel(x, y, z, key)?;
                }
            }
        }
        Ok(())
    }
}

impl ChunkProvider for VoxelWorld {
    fn load_chunk(&self, coord: ChunkCoord) -> Option<Arc<Chunk>> {
        self.chunks.get(&coord).cloned()
    }
}

impl VoxelSource for VoxelWorld {
    fn voxel_at(&self, x: i32, y: i32, z: i32) -> Option<VoxelKey> {
        let chunk = self.chunks.get(&ChunkCoord::containing(x, z))?;
        let (lx, lz) = local_offset(x, z);
        chunk.get(lx, y, lz)
    }
}
