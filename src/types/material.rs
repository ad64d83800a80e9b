use std::collections::HashMap;

use crate::error::{HsiError, Result};

/// Voxel identity: block type plus auxiliary data value.
///
/// Only ever used as a catalog key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct VoxelKey {
    pub block: u16,
    pub data: u8,
}

impl VoxelKey {
    pub const AIR: VoxelKey = VoxelKey { block: 0, data: 0 };

    pub const fn new(block: u16, data: u8) -> Self {
        Self { block, data }
    }
}

/// Piecewise-linear reflectance over wavelength, clamped outside the sampled range.
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectanceCurve {
    /// `(wavelength, reflectance)` sorted by wavelength.
    samples: Vec<(f64, f64)>,
}

impl ReflectanceCurve {
    pub fn new(mut samples: Vec<(f64, f64)>) -> Result<Self> {
        if samples.is_empty() {
            return Err(HsiError::Catalog("reflectance curve has no samples".into()));
        }
        if samples.iter().any(|(w, r)| !w.is_finite() || !r.is_finite()) {
            return Err(HsiError::Catalog(
                "reflectance curve contains a non-finite sample".into(),
            ));
        }
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(Self { samples })
    }

    /// Same reflectance at every wavelength.
    pub fn constant(value: f64) -> Self {
        Self {
            samples: vec![(0.0, value)],
        }
    }

    pub fn samples(&self) -> &[(f64, f64)] {
        &self.samples
    }

    pub fn at(&self, wavelength: f64) -> f64 {
        let first = self.samples[0];
        let last = self.samples[self.samples.len() - 1];
        if wavelength <= first.0 {
            return first.1;
        }
        if wavelength >= last.0 {
            return last.1;
        }

        // First sample strictly above `wavelength`; both neighbours exist here.
        let hi = self.samples.partition_point(|&(w, _)| w <= wavelength);
        let (w0, r0) = self.samples[hi - 1];
        let (w1, r1) = self.samples[hi];
        r0 + (r1 - r0) * (wavelength - w0) / (w1 - w0)
    }
}

/// Optical properties of one voxel type.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    /// 0 = opaque, 1 = passes all light.
    pub transparency: f64,
    pub curve: ReflectanceCurve,
}

impl Material {
    pub fn new(name: impl Into<String>, transparency: f64, curve: ReflectanceCurve) -> Result<Self> {
        let name = name.into();
        if !(0.0..=1.0).contains(&transparency) {
            return Err(HsiError::Catalog(format!(
                "material '{name}': transparency {transparency} outside [0, 1]"
            )));
        }
        Ok(Self {
            name,
            transparency,
            curve,
        })
    }

    #[inline]
    pub fn reflectance(&self, wavelength: f64) -> f64 {
        self.curve.at(wavelength)
    }
}

/// Resolves a voxel identity to its optical properties.
pub trait MaterialCatalog {
    fn lookup(&self, key: VoxelKey) -> Option<&Material>;
}

/// In-memory material catalog.
#[derive(Debug, Clone, Default)]
pub struct MaterialLibrary {
    materials: HashMap<VoxelKey, Material>,
}

impl MaterialLibrary {
    /// Insert a material, returning the one it replaced.
    pub fn insert(&mut self, key: VoxelKey, material: Material) -> Option<Material> {
        self.materials.insert(key, material)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl MaterialCatalog for MaterialLibrary {
    fn lookup(&self, key: VoxelKey) -> Option<&Material> {
        self.materials.get(&key)
    }
}
