use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::types::VoxelKey;

use super::chunk::{local_offset, Chunk, ChunkCoord};
use super::{ChunkProvider, VoxelSource};

/// Counts of chunks the cache has resolved so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub loaded: usize,
    pub absent: usize,
}

/// Read-through chunk cache scoped to a single run.
///
/// Each chunk is asked of the provider at most once; absent chunks are
/// remembered too. Entries are never invalidated, so the cache is safe
/// to share between column workers.
pub struct ChunkCache<'a, P: ChunkProvider> {
    provider: &'a P,
    chunks: RwLock<HashMap<ChunkCoord, Option<Arc<Chunk>>>>,
}

impl<'a, P: ChunkProvider> ChunkCache<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self {
            provider,
            chunks: RwLock::new(HashMap::new()),
        }
    }

    /// Chunk at `coord`, loading it on first access.
    pub fn chunk(&self, coord: ChunkCoord) -> Option<Arc<Chunk>> {
        if let Some(entry) = self.chunks.read().get(&coord) {
            return entry.clone();
        }

        let loaded = self.provider.load_chunk(coord);
        self.chunks
            .write()
            .entry(coord)
            .or_insert(loaded)
            .clone()
    }

    pub fn stats(&self) -> CacheStats {
        let chunks = self.chunks.read();
        let loaded = chunks.values().filter(|c| c.is_some()).count();
        CacheStats {
            loaded,
            absent: chunks.len() - loaded,
        }
    }
}

impl<P: ChunkProvider> VoxelSource for ChunkCache<'_, P> {
    fn voxel_at(&self, x: i32, y: i32, z: i32) -> Option<VoxelKey> {
        let chunk = self.chunk(ChunkCoord::containing(x, z))?;
        let (lx, lz) = local_offset(x, z);
        chunk.get(lx, y, lz)
    }
}
