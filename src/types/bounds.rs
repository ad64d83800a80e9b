use glam::IVec3;

use crate::error::{HsiError, Result};

/// Integer voxel region to scan. `min` is inclusive, `max` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoxelBox {
    pub min: IVec3,
    pub max: IVec3,
}

impl VoxelBox {
    pub fn new(min: IVec3, max: IVec3) -> Self {
        Self { min, max }
    }

    /// Reject boxes with `min > max` on any axis.
    pub fn validate(&self) -> Result<()> {
        if self.min.cmpgt(self.max).any() {
            return Err(HsiError::Configuration(format!(
                "box min {} exceeds max {}",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// Extent along each axis (`max - min`).
    pub fn size(&self) -> IVec3 {
        self.max - self.min
    }

    /// Number of sampled columns along x and z for the given stride,
    /// rounded up so a partial trailing stride still gets a column.
    pub fn sampled_extent(&self, sample_step: u32) -> (usize, usize) {
        let step = sample_step.max(1) as usize;
        let size = self.size().max(IVec3::ZERO);
        (
            (size.x as usize).div_ceil(step),
            (size.z as usize).div_ceil(step),
        )
    }

    /// Whether a voxel position lies inside the half-open box.
    pub fn contains(&self, p: IVec3) -> bool {
        p.cmpge(self.min).all() && p.cmplt(self.max).all()
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &VoxelBox) -> VoxelBox {
        VoxelBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}
