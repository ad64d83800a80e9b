pub mod bounds;
pub mod cube;
pub mod material;

pub use bounds::VoxelBox;
pub use cube::SpectralCube;
pub use material::{Material, MaterialCatalog, MaterialLibrary, ReflectanceCurve, VoxelKey};
