pub mod config;
pub mod error;
pub mod ingestion;
pub mod pipeline;
pub mod raster;
pub mod scene;
pub mod spectral;
pub mod types;

pub use config::{GeneratorConfig, SamplingParams};
pub use pipeline::Generator;
