//! In-memory voxel world used to host and exercise the teleport core.
//!
//! Chunks are column-shaped, dimensions are independent chunk maps, and
//! [`VoxelWorld`] ties them together with an entity table behind the
//! collaborator traits from `mirage-core`.

mod blocks;
mod chunk;
mod storage;
mod terrain;
mod voxel_world;

pub use blocks::*;
pub use chunk::*;
pub use storage::*;
pub use terrain::*;
pub use voxel_world::*;
