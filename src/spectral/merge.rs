use crate::types::SpectralCube;

/// Box-downsample a cube by `merge_factor` along x and z.
///
/// Output shape is `(bands, ceil(width / f), ceil(depth / f))`. Every input
/// cell is weighted by `1 / f²`, including cells on a partial trailing block,
/// so edge pixels of a non-multiple extent come out darker than a true mean.
/// A factor of 0 or 1 returns the cube unchanged.
pub fn merge_cube(cube: SpectralCube, merge_factor: u32) -> SpectralCube {
    if merge_factor <= 1 {
        return cube;
    }

    let f = merge_factor as usize;
    let (bands, width, depth) = cube.shape();
    let mut merged = SpectralCube::new(bands, width.div_ceil(f), depth.div_ceil(f));
    let weight = 1.0 / (f * f) as f64;

    for x in 0..width {
        for z in 0..depth {
            for k in 0..bands {
                merged.accumulate(k, x / f, z / f, weight * f64::from(cube.get(k, x, z)));
            }
        }
    }

    merged
}
