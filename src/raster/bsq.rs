use std::fs::File;
use std::io::Write;
use std::path::Path;

use memmap2::Mmap;

use crate::error::{HsiError, Result};
use crate::types::SpectralCube;

const VALUE_SIZE: usize = std::mem::size_of::<f32>();

/// Write the cube as raw little-endian f32, band-sequential, no header.
pub fn write_bsq<W: Write>(writer: &mut W, cube: &SpectralCube) -> Result<()> {
    #[cfg(target_endian = "little")]
    writer.write_all(bytemuck::cast_slice(cube.as_slice()))?;

    #[cfg(target_endian = "big")]
    for value in cube.as_slice() {
        writer.write_all(&value.to_le_bytes())?;
    }

    writer.flush()?;
    Ok(())
}

/// Read a band-sequential f32 file of the given shape back into a cube.
pub fn read_bsq(path: &Path, bands: usize, width: usize, depth: usize) -> Result<SpectralCube> {
    let expected = bands * width * depth * VALUE_SIZE;
    let file = File::open(path)?;
    let actual = file.metadata()?.len();
    if actual != expected as u64 {
        return Err(HsiError::Output(format!(
            "{} holds {actual} bytes, expected {expected}",
            path.display()
        )));
    }
    if expected == 0 {
        return Ok(SpectralCube::new(bands, width, depth));
    }

    // SAFETY: the mapping is read-only and dropped before this function returns.
    let mmap = unsafe { Mmap::map(&file)? };
    let data = mmap
        .chunks_exact(VALUE_SIZE)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    SpectralCube::from_vec(bands, width, depth, data)
}
