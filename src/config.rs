use std::path::PathBuf;

use clap::Parser;
use glam::IVec3;

use crate::error::{HsiError, Result};
use crate::types::VoxelBox;

/// Band layout, sampling stride and traversal options for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingParams {
    pub bands: u32,
    pub min_wavelength: f64,
    pub max_wavelength: f64,
    /// Stride over x and z, in voxels.
    pub sample_step: u32,
    /// Side of the square block averaged into one output cell.
    pub merge_factor: u32,
    /// Stop descending a column once its remaining light drops below
    /// `LIGHT_THRESHOLD`. Slightly changes output, so off by default.
    pub early_exit: bool,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            bands: 10,
            min_wavelength: 410.0,
            max_wavelength: 2500.0,
            sample_step: 1,
            merge_factor: 1,
            early_exit: false,
        }
    }
}

impl SamplingParams {
    pub fn validate(&self) -> Result<()> {
        if self.bands < 1 {
            return Err(HsiError::Configuration("band count must be at least 1".into()));
        }
        if self.sample_step < 1 {
            return Err(HsiError::Configuration("sample step must be at least 1".into()));
        }
        if self.merge_factor < 1 {
            return Err(HsiError::Configuration("merge factor must be at least 1".into()));
        }
        if !self.min_wavelength.is_finite() || !self.max_wavelength.is_finite() {
            return Err(HsiError::Configuration("wavelengths must be finite".into()));
        }
        if self.min_wavelength >= self.max_wavelength {
            return Err(HsiError::Configuration(format!(
                "minimum wavelength {} must be below maximum {}",
                self.min_wavelength, self.max_wavelength
            )));
        }
        Ok(())
    }

    /// Spacing between consecutive bands. A single band has no spacing.
    pub fn wavelength_step(&self) -> f64 {
        if self.bands > 1 {
            (self.max_wavelength - self.min_wavelength) / f64::from(self.bands - 1)
        } else {
            0.0
        }
    }

    #[inline]
    pub fn wavelength(&self, band: usize) -> f64 {
        self.min_wavelength + band as f64 * self.wavelength_step()
    }

    /// Centre wavelength of every band, starting at `min_wavelength`.
    pub fn wavelengths(&self) -> Vec<f64> {
        (0..self.bands as usize).map(|k| self.wavelength(k)).collect()
    }
}

/// Fully resolved generator configuration (constructed from CLI args).
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfig {
    pub scene: PathBuf,
    pub materials: PathBuf,
    /// Output path without extension; `.bsq` and `.hdr` are appended.
    pub output: PathBuf,
    /// Region to scan. Defaults to the scene bounds.
    pub region: Option<VoxelBox>,
    pub sampling: SamplingParams,
    pub verbose: bool,
    pub threads: Option<usize>,
}

impl GeneratorConfig {
    pub fn bsq_path(&self) -> PathBuf {
        self.output_with_suffix(".bsq")
    }

    pub fn hdr_path(&self) -> PathBuf {
        self.output_with_suffix(".hdr")
    }

    // Appended rather than substituted so "run.v2" stays "run.v2.bsq".
    fn output_with_suffix(&self, suffix: &str) -> PathBuf {
        let mut path = self.output.clone().into_os_string();
        path.push(suffix);
        PathBuf::from(path)
    }
}

/// CLI argument definition (clap derive).
#[derive(Parser, Debug)]
#[command(
    name = "voxel-hsi",
    about = "Generate an ENVI hyperspectral image from a voxel scene",
    version
)]
pub struct CliArgs {
    /// Scene description (JSON)
    #[arg(long)]
    pub scene: PathBuf,

    /// Material catalog (JSON)
    #[arg(long)]
    pub materials: PathBuf,

    /// Output path without extension
    #[arg(short = 'o', long)]
    pub output: PathBuf,

    /// Number of bands
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=300))]
    pub bands: u32,

    /// Wavelength of the first band
    #[arg(long, default_value_t = 410.0)]
    pub min_wavelength: f64,

    /// Wavelength of the last band
    #[arg(long, default_value_t = 2500.0)]
    pub max_wavelength: f64,

    /// Sample every n blocks along x and z
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=256))]
    pub sample_step: u32,

    /// Average every n x n samples into one pixel
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=256))]
    pub merge: u32,

    /// Region minimum corner x,y,z (inclusive)
    #[arg(long, value_delimiter = ',', num_args = 3, allow_negative_numbers = true, requires = "max_corner")]
    pub min_corner: Option<Vec<i32>>,

    /// Region maximum corner x,y,z (exclusive)
    #[arg(long, value_delimiter = ',', num_args = 3, allow_negative_numbers = true, requires = "min_corner")]
    pub max_corner: Option<Vec<i32>>,

    /// Stop descending a column once almost no light remains
    #[arg(long)]
    pub early_exit: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Worker thread count (default: all cores)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,
}

impl From<CliArgs> for GeneratorConfig {
    fn from(args: CliArgs) -> Self {
        let region = match (args.min_corner, args.max_corner) {
            (Some(min), Some(max)) => Some(VoxelBox::new(
                IVec3::from_slice(&min),
                IVec3::from_slice(&max),
            )),
            _ => None,
        };

        GeneratorConfig {
            scene: args.scene,
            materials: args.materials,
            output: args.output,
            region,
            sampling: SamplingParams {
                bands: args.bands,
                min_wavelength: args.min_wavelength,
                max_wavelength: args.max_wavelength,
                sample_step: args.sample_step,
                merge_factor: args.merge,
                early_exit: args.early_exit,
            },
            verbose: args.verbose,
            threads: args.threads,
        }
    }
}
