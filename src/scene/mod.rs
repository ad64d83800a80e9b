//! Voxel access: chunk storage, the per-run chunk cache, and the
//! traits the spectral builder reads voxels through.

pub mod cache;
pub mod chunk;
pub mod world;

use std::sync::Arc;

use crate::types::VoxelKey;

pub use cache::{CacheStats, ChunkCache};
pub use chunk::{Chunk, ChunkCoord, CHUNK_SIDE};
pub use world::VoxelWorld;

/// Resolves a world position to a voxel identity.
///
/// `None` means no data is loaded there, which callers treat as empty space.
pub trait VoxelSource {
    fn voxel_at(&self, x: i32, y: i32, z: i32) -> Option<VoxelKey>;
}

/// Backing store that hands out whole chunks.
pub trait ChunkProvider {
    fn load_chunk(&self, coord: ChunkCoord) -> Option<Arc<Chunk>>;
}
