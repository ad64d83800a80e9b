use rayon::prelude::*;
use tracing::debug;

use crate::config::SamplingParams;
use crate::error::Result;
use crate::scene::VoxelSource;
use crate::types::{MaterialCatalog, SpectralCube, VoxelBox};

/// Remaining column light below which further voxels are negligible.
pub const LIGHT_THRESHOLD: f64 = 0.0001;

/// Traversal counters for one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub columns: usize,
    /// Voxels that matched a catalog material.
    pub contributing_voxels: usize,
    /// Positions with no loaded data.
    pub unloaded_voxels: usize,
    /// Columns whose descent stopped before reaching the bottom of the box.
    pub exhausted_columns: usize,
}

impl BuildStats {
    fn absorb(&mut self, other: BuildStats) {
        self.columns += other.columns;
        self.contributing_voxels += other.contributing_voxels;
        self.unloaded_voxels += other.unloaded_voxels;
        self.exhausted_columns += other.exhausted_columns;
    }
}

/// Output of [`build_cube`].
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub cube: SpectralCube,
    pub stats: BuildStats,
}

/// Trace every sampled column of `region` and accumulate the spectral cube.
///
/// The cube has shape `(bands, width, depth)` with width and depth the
/// number of sampled x and z positions. Columns are independent, so sampled
/// x rows run in parallel; within a column voxels are always visited top-down.
pub fn build_cube<S, C>(
    region: &VoxelBox,
    params: &SamplingParams,
    source: &S,
    catalog: &C,
) -> Result<BuildResult>
where
    S: VoxelSource + Sync,
    C: MaterialCatalog + Sync,
{
    params.validate()?;
    region.validate()?;

    let bands = params.bands as usize;
    let step = params.sample_step as i32;
    let (width, depth) = region.sampled_extent(params.sample_step);
    let wavelengths = params.wavelengths();

    let tracer = ColumnTracer {
        region,
        early_exit: params.early_exit,
        wavelengths: &wavelengths,
        source,
        catalog,
    };

    debug!(bands, width, depth, "Tracing columns");

    // Each row holds `depth` spectra of `bands` values, z-major.
    let rows: Vec<(Vec<f32>, BuildStats)> = (0..width)
        .into_par_iter()
        .map(|sx| {
            let x = region.min.x + sx as i32 * step;
            let mut row = vec![0.0f32; depth * bands];
            let mut stats = BuildStats::default();
            for (sz, spectrum) in row.chunks_exact_mut(bands).enumerate() {
                let z = region.min.z + sz as i32 * step;
                stats.absorb(tracer.trace(x, z, spectrum));
            }
            (row, stats)
        })
        .collect();

    let mut cube = SpectralCube::new(bands, width, depth);
    let mut stats = BuildStats::default();
    for (sx, (row, row_stats)) in rows.into_iter().enumerate() {
        for (sz, spectrum) in row.chunks_exact(bands).enumerate() {
            for (k, &value) in spectrum.iter().enumerate() {
                cube.add(k, sx, sz, value);
            }
        }
        stats.absorb(row_stats);
    }

    debug!(
        columns = stats.columns,
        contributing = stats.contributing_voxels,
        unloaded = stats.unloaded_voxels,
        exhausted = stats.exhausted_columns,
        "Traversal stats"
    );

    Ok(BuildResult { cube, stats })
}

/// Per-run state shared by every column of one build.
struct ColumnTracer<'a, S: ?Sized, C: ?Sized> {
    region: &'a VoxelBox,
    early_exit: bool,
    wavelengths: &'a [f64],
    source: &'a S,
    catalog: &'a C,
}

impl<S, C> ColumnTracer<'_, S, C>
where
    S: VoxelSource + ?Sized,
    C: MaterialCatalog + ?Sized,
{
    /// Walk column `(x, z)` from the top of the region down, adding each
    /// material's light-weighted reflectance into `spectrum` (one value per band).
    ///
    /// Light reaching a voxel is split: the opaque share `1 - transparency`
    /// is reflected there and the rest passes on to the voxels below.
    fn trace(&self, x: i32, z: i32, spectrum: &mut [f32]) -> BuildStats {
        let mut stats = BuildStats {
            columns: 1,
            ..Default::default()
        };
        let mut column_light = 1.0f64;

        for y in (self.region.min.y..self.region.max.y).rev() {
            let Some(key) = self.source.voxel_at(x, y, z) else {
                stats.unloaded_voxels += 1;
                continue;
            };
            let Some(material) = self.catalog.lookup(key) else {
                continue;
            };
            stats.contributing_voxels += 1;

            let current_light = column_light * (1.0 - material.transparency);
            column_light *= material.transparency;

            for (cell, &wavelength) in spectrum.iter_mut().zip(self.wavelengths) {
                *cell =
                    (f64::from(*cell) + current_light * material.reflectance(wavelength)) as f32;
            }

            // Nothing passes an opaque voxel, so stopping there never changes output.
            if column_light == 0.0 || (self.early_exit && column_light < LIGHT_THRESHOLD) {
                if y > self.region.min.y {
                    stats.exhausted_columns += 1;
                }
                break;
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::IVec3;

    use super::*;
    use crate::error::HsiError;
    use crate::scene::VoxelWorld;
    use crate::types::{Material, MaterialLibrary, ReflectanceCurve, VoxelKey};

    const GLASS: VoxelKey = VoxelKey::new(20, 0);
    const LEAVES: VoxelKey = VoxelKey::new(18, 0);
    const STONE: VoxelKey = VoxelKey::new(1, 0);
    const DIRT: VoxelKey = VoxelKey::new(3, 0);
    const UNKNOWN: VoxelKey = VoxelKey::new(99, 0);

    fn catalog() -> MaterialLibrary {
        let mut lib = MaterialLibrary::default();
        lib.insert(
            GLASS,
            Material::new("glass", 0.5, ReflectanceCurve::constant(0.2)).unwrap(),
        );
        lib.insert(
            LEAVES,
            Material::new(
                "leaves",
                0.5,
                ReflectanceCurve::new(vec![(400.0, 0.1), (800.0, 0.5)]).unwrap(),
            )
            .unwrap(),
        );
        lib.insert(
            STONE,
            Material::new("stone", 0.0, ReflectanceCurve::constant(0.4)).unwrap(),
        );
        lib.insert(
            DIRT,
            Material::new("dirt", 0.0, ReflectanceCurve::constant(0.9)).unwrap(),
        );
        lib
    }

    fn params(bands: u32) -> SamplingParams {
        SamplingParams {
            bands,
            min_wavelength: 400.0,
            max_wavelength: 800.0,
            ..Default::default()
        }
    }

    fn column_box(height: i32) -> VoxelBox {
        VoxelBox::new(IVec3::ZERO, IVec3::new(1, height, 1))
    }

    #[test]
    fn stacked_column_splits_light() {
        // Top to bottom: glass (0.5), leaves (0.5), stone (0.0).
        let mut world = VoxelWorld::new(8);
        world.set_voxel(0, 3, 0, GLASS).unwrap();
        world.set_voxel(0, 2, 0, LEAVES).unwrap();
        world.set_voxel(0, 1, 0, STONE).unwrap();
        world.set_voxel(0, 0, 0, DIRT).unwrap();

        let result = build_cube(&column_box(4), &params(3), &world, &catalog()).unwrap();
        let cube = result.cube;
        assert_eq!(cube.shape(), (3, 1, 1));

        // Wavelengths 400, 600, 800; leaves reflect 0.1, 0.3, 0.5.
        let leaves = [0.1, 0.3, 0.5];
        for (k, leaf) in leaves.iter().enumerate() {
            let expected = 0.5 * 0.2 + 0.25 * leaf + 0.25 * 0.4;
            assert_relative_eq!(cube.get(k, 0, 0), expected as f32, epsilon = 1e-6);
        }

        assert_eq!(result.stats.contributing_voxels, 3);
        assert_eq!(result.stats.exhausted_columns, 1);
    }

    #[test]
    fn contributions_sum_to_full_light() {
        let mut lib = MaterialLibrary::default();
        for (i, t) in [0.5, 0.5, 0.0].into_iter().enumerate() {
            lib.insert(
                VoxelKey::new(i as u16 + 1, 0),
                Material::new("white", t, ReflectanceCurve::constant(1.0)).unwrap(),
            );
        }
        let mut world = VoxelWorld::new(3);
        world.set_voxel(0, 2, 0, VoxelKey::new(1, 0)).unwrap();
        world.set_voxel(0, 1, 0, VoxelKey::new(2, 0)).unwrap();
        world.set_voxel(0, 0, 0, VoxelKey::new(3, 0)).unwrap();

        let cube = build_cube(&column_box(3), &params(2), &world, &lib)
            .unwrap()
            .cube;
        assert_relative_eq!(cube.get(0, 0, 0), 1.0);
        assert_relative_eq!(cube.get(1, 0, 0), 1.0);
    }

    #[test]
    fn opaque_top_hides_everything_below() {
        let mut world = VoxelWorld::new(4);
        world.set_voxel(0, 3, 0, STONE).unwrap();
        world.set_voxel(0, 2, 0, DIRT).unwrap();
        world.set_voxel(0, 1, 0, GLASS).unwrap();

        let cube = build_cube(&column_box(4), &params(2), &world, &catalog())
            .unwrap()
            .cube;
        assert_relative_eq!(cube.get(0, 0, 0), 0.4);
        assert_relative_eq!(cube.get(1, 0, 0), 0.4);
    }

    #[test]
    fn unknown_materials_and_air_are_skipped() {
        let mut world = VoxelWorld::new(4);
        world.set_voxel(0, 3, 0, UNKNOWN).unwrap();
        world.set_voxel(0, 1, 0, STONE).unwrap();

        let result = build_cube(&column_box(4), &params(1), &world, &catalog()).unwrap();
        assert_relative_eq!(result.cube.get(0, 0, 0), 0.4);
        assert_eq!(result.stats.contributing_voxels, 1);
        assert_eq!(result.stats.unloaded_voxels, 0);
    }

    #[test]
    fn unloaded_column_is_all_zero() {
        let world = VoxelWorld::new(4);
        let region = VoxelBox::new(IVec3::ZERO, IVec3::new(3, 4, 2));
        let result = build_cube(&region, &params(4), &world, &catalog()).unwrap();

        assert_eq!(result.cube.shape(), (4, 3, 2));
        assert!(result.cube.as_slice().iter().all(|&v| v == 0.0));
        assert_eq!(result.stats.columns, 6);
        assert_eq!(result.stats.unloaded_voxels, 24);
    }

    #[test]
    fn unloaded_positions_leave_light_untouched() {
        // Box reaches above the world height, so the top two levels are unloaded.
        let mut world = VoxelWorld::new(2);
        world.set_voxel(0, 1, 0, GLASS).unwrap();
        world.set_voxel(0, 0, 0, STONE).unwrap();

        let result = build_cube(&column_box(4), &params(1), &world, &catalog()).unwrap();
        assert_relative_eq!(
            result.cube.get(0, 0, 0),
            (0.5 * 0.2 + 0.5 * 0.4) as f32,
            epsilon = 1e-6
        );
        assert_eq!(result.stats.unloaded_voxels, 2);
    }

    #[test]
    fn sample_step_picks_strided_columns() {
        let mut world = VoxelWorld::new(2);
        let floor = VoxelBox::new(IVec3::new(0, 0, 0), IVec3::new(5, 1, 5));
        world.fill(&floor, DIRT).unwrap();
        // Only column (2, 2) carries stone; (1, *) is never sampled.
        world.set_voxel(2, 0, 2, STONE).unwrap();
        world.set_voxel(1, 0, 0, STONE).unwrap();

        let p = SamplingParams {
            sample_step: 2,
            ..params(1)
        };
        let region = VoxelBox::new(IVec3::ZERO, IVec3::new(5, 2, 5));
        let cube = build_cube(&region, &p, &world, &catalog()).unwrap().cube;

        assert_eq!(cube.shape(), (1, 3, 3));
        assert_relative_eq!(cube.get(0, 0, 0), 0.9);
        assert_relative_eq!(cube.get(0, 1, 1), 0.4);
        assert_relative_eq!(cube.get(0, 2, 2), 0.9);
    }

    #[test]
    fn region_offset_maps_to_sampled_index() {
        let mut world = VoxelWorld::new(4);
        world.set_voxel(-5, 0, 7, STONE).unwrap();

        let region = VoxelBox::new(IVec3::new(-6, 0, 6), IVec3::new(-3, 4, 9));
        let cube = build_cube(&region, &params(1), &world, &catalog()).unwrap().cube;

        assert_eq!(cube.shape(), (1, 3, 3));
        assert_relative_eq!(cube.get(0, 1, 1), 0.4);
        assert_eq!(cube.as_slice().iter().filter(|&&v| v != 0.0).count(), 1);
    }

    #[test]
    fn early_exit_stops_below_threshold() {
        let mut lib = MaterialLibrary::default();
        lib.insert(
            GLASS,
            Material::new("fog", 0.005, ReflectanceCurve::constant(0.0)).unwrap(),
        );
        lib.insert(
            STONE,
            Material::new("stone", 0.0, ReflectanceCurve::constant(1.0)).unwrap(),
        );
        let mut world = VoxelWorld::new(4);
        world.set_voxel(0, 3, 0, GLASS).unwrap();
        world.set_voxel(0, 2, 0, GLASS).unwrap();
        world.set_voxel(0, 1, 0, GLASS).unwrap();
        world.set_voxel(0, 0, 0, STONE).unwrap();

        // Light after three fog voxels is 1.25e-7, which still lands on the stone.
        let full = build_cube(&column_box(4), &params(1), &world, &lib).unwrap();
        assert_relative_eq!(full.cube.get(0, 0, 0), 1.25e-7, epsilon = 1e-10);
        assert_eq!(full.stats.contributing_voxels, 4);

        let p = SamplingParams {
            early_exit: true,
            ..params(1)
        };
        let cut = build_cube(&column_box(4), &p, &world, &lib).unwrap();
        assert_eq!(cut.cube.get(0, 0, 0), 0.0);
        assert_eq!(cut.stats.contributing_voxels, 2);
        assert_eq!(cut.stats.exhausted_columns, 1);
    }

    #[test]
    fn single_band_samples_min_wavelength() {
        let mut world = VoxelWorld::new(1);
        world.set_voxel(0, 0, 0, LEAVES).unwrap();

        let cube = build_cube(&column_box(1), &params(1), &world, &catalog())
            .unwrap()
            .cube;
        // 0.5 of the light is reflected at 400 nm (reflectance 0.1).
        assert_relative_eq!(cube.get(0, 0, 0), 0.05);
    }

    #[test]
    fn empty_region_gives_empty_cube() {
        let world = VoxelWorld::new(4);
        let region = VoxelBox::new(IVec3::new(2, 0, 2), IVec3::new(2, 4, 6));
        let result = build_cube(&region, &params(3), &world, &catalog()).unwrap();
        assert_eq!(result.cube.shape(), (3, 0, 4));
        assert!(result.cube.is_empty());
    }

    #[test]
    fn invalid_params_rejected_before_traversal() {
        let world = VoxelWorld::new(4);
        let p = SamplingParams {
            sample_step: 0,
            ..params(2)
        };
        let err = build_cube(&column_box(4), &p, &world, &catalog()).unwrap_err();
        assert!(matches!(err, HsiError::Configuration(_)));

        let inverted = VoxelBox::new(IVec3::new(0, 4, 0), IVec3::new(1, 0, 1));
        let err = build_cube(&inverted, &params(2), &world, &catalog()).unwrap_err();
        assert!(matches!(err, HsiError::Configuration(_)));
    }

    #[test]
    fn tracer_adds_into_existing_spectrum() {
        let mut world = VoxelWorld::new(4);
        world.set_voxel(3, 2, -1, GLASS).unwrap();
        world.set_voxel(3, 0, -1, STONE).unwrap();

        let region = VoxelBox::new(IVec3::new(0, 0, -4), IVec3::new(8, 4, 4));
        let lib = catalog();
        let wavelengths = [400.0, 800.0];
        let tracer = ColumnTracer {
            region: &region,
            early_exit: false,
            wavelengths: &wavelengths,
            source: &world,
            catalog: &lib,
        };

        let mut spectrum = [1.0f32, 2.0];
        let stats = tracer.trace(3, -1, &mut spectrum);
        assert_relative_eq!(spectrum[0], 1.3, epsilon = 1e-6);
        assert_relative_eq!(spectrum[1], 2.3, epsilon = 1e-6);
        assert_eq!(stats.columns, 1);
        assert_eq!(stats.contributing_voxels, 2);
        assert_eq!(stats.exhausted_columns, 0);
    }
}
