use std::io;

/// All error types for the hyperspectral generator.
#[derive(thiserror::Error, Debug)]
pub enum HsiError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Scene error: {0}")]
    Scene(String),
    #[error("Catalog error: {0}")]
    Catalog(String),
    #[error("Output error: {0}")]
    Output(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HsiError>;
