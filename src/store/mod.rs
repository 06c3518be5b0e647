pub mod fs;
pub mod memory;
pub mod repo;

pub use repo::ArtifactStore;
