use crate::types::VoxelKey;

/// Horizontal side length of a chunk, in voxels.
pub const CHUNK_SIDE: i32 = 16;

const CHUNK_SHIFT: u32 = 4;

/// Chunk address on the x/z grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk holding world column `(x, z)`. Floors for negative coordinates.
    #[inline]
    pub const fn containing(x: i32, z: i32) -> Self {
        Self {
            x: x >> CHUNK_SHIFT,
            z: z >> CHUNK_SHIFT,
        }
    }
}

/// Local column offset of world column `(x, z)` inside its chunk.
#[inline]
pub fn local_offset(x: i32, z: i32) -> (usize, usize) {
    (
        x.rem_euclid(CHUNK_SIDE) as usize,
        z.rem_euclid(CHUNK_SIDE) as usize,
    )
}

/// A 16x16 stack of voxel columns, `height` voxels tall, stored `[x][z][y]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    height: usize,
    voxels: Vec<VoxelKey>,
}

impl Chunk {
    /// A chunk filled with air.
    pub fn new(height: usize) -> Self {
        let side = CHUNK_SIDE as usize;
        Self {
            height,
            voxels: vec![VoxelKey::AIR; side * side * height],
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn idx(&self, lx: usize, y: usize, lz: usize) -> usize {
        (lx * CHUNK_SIDE as usize + lz) * self.height + y
    }

    /// Voxel at local `(lx, y, lz)`; `None` when `y` is outside the chunk.
    #[inline]
    pub fn get(&self, lx: usize, y: i32, lz: usize) -> Option<VoxelKey> {
        if y < 0 || y as usize >= self.height {
            return None;
        }
        Some(self.voxels[self.idx(lx, y as usize, lz)])
    }

    /// Overwrite local `(lx, y, lz)`. Returns false when `y` is outside the chunk.
    pub fn set(&mut self, lx: usize, y: i32, lz: usize, key: VoxelKey) -> bool {
        if y < 0 || y as usize >= self.height {
            return false;
        }
        let i = self.idx(lx, y as usize, lz);
        self.voxels[i] = key;
        true
    }
}
