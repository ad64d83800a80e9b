//! ENVI band-sequential output: raw `.bsq` data plus its `.hdr` header.

pub mod bsq;
pub mod envi_header;

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::types::SpectralCube;

pub use bsq::{read_bsq, write_bsq};
pub use envi_header::{write_header, EnviHeader, GENERATOR_VERSION};

/// Load a cube and its header from a `.bsq`/`.hdr` pair.
pub fn read_raster(bsq_path: &Path, hdr_path: &Path) -> Result<(EnviHeader, SpectralCube)> {
    let header = EnviHeader::parse(&fs::read_to_string(hdr_path)?)?;
    let cube = read_bsq(bsq_path, header.bands, header.lines, header.samples)?;
    Ok((header, cube))
}
