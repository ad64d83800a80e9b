pub mod builder;
pub mod merge;

pub use builder::{build_cube, BuildResult, BuildStats, LIGHT_THRESHOLD};
pub use merge::merge_cube;
