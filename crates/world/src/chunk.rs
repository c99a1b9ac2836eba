use crate::blocks::BLOCK_AIR;
use mirage_core::{BlockId, BlockPos};
use std::fmt;

/// Chunk width (X axis) in blocks.
pub const CHUNK_SIZE_X: usize = 16;
/// Chunk height (Y axis) in blocks; also the tallest supported dimension.
pub const CHUNK_SIZE_Y: usize = 256;
/// Chunk depth (Z axis) in blocks.
pub const CHUNK_SIZE_Z: usize = 16;
/// Total block count per chunk.
pub const CHUNK_VOLUME: usize = CHUNK_SIZE_X * CHUNK_SIZE_Y * CHUNK_SIZE_Z;

/// Convert a world y coordinate into a chunk-local one, if it is in range.
pub fn world_y_to_local_y(y: i32) -> Option<usize> {
    usize::try_from(y).ok().filter(|&y| y < CHUNK_SIZE_Y)
}

/// Chunk-local position (X, Y, Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalPos {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl LocalPos {
    /// Convert to a linear index within the block array.
    pub fn index(self) -> usize {
        debug_assert!(self.x < CHUNK_SIZE_X);
        debug_assert!(self.y < CHUNK_SIZE_Y);
        debug_assert!(self.z < CHUNK_SIZE_Z);
        (self.y * CHUNK_SIZE_Z + self.z) * CHUNK_SIZE_X + self.x
    }
}

/// Chunk coordinate (X,Z) in chunk space.
/// Implements Ord for deterministic iteration in BTreeMap (sorts by x, then z).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing a world-space block position.
    pub fn containing(pos: BlockPos) -> Self {
        Self::new(
            pos.x.div_euclid(CHUNK_SIZE_X as i32),
            pos.z.div_euclid(CHUNK_SIZE_Z as i32),
        )
    }

    /// World-space x/z of this chunk's (0, 0) column, saturating for chunks
    /// past the edge of the `i32` block range.
    pub fn origin(self) -> (i32, i32) {
        (
            self.x.saturating_mul(CHUNK_SIZE_X as i32),
            self.z.saturating_mul(CHUNK_SIZE_Z as i32),
        )
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Split a world position into its chunk and chunk-local coordinates.
pub fn split_block_pos(pos: BlockPos) -> Option<(ChunkPos, LocalPos)> {
    let y = world_y_to_local_y(pos.y)?;
    let local = LocalPos {
        x: pos.x.rem_euclid(CHUNK_SIZE_X as i32) as usize,
        y,
        z: pos.z.rem_euclid(CHUNK_SIZE_Z as i32) as usize,
    };
    Some((ChunkPos::containing(pos), local))
}

/// Column of blocks 16 wide, 16 deep and [`CHUNK_SIZE_Y`] tall.
pub struct Chunk {
    position: ChunkPos,
    blocks: Vec<BlockId>,
}

impl Chunk {
    /// Allocate a fresh chunk filled with air.
    pub fn new(position: ChunkPos) -> Self {
        Self {
            position,
            blocks: vec![BLOCK_AIR; CHUNK_VOLUME],
        }
    }

    #[inline]
    pub fn position(&self) -> ChunkPos {
        self.position
    }

    /// Block at local coordinates.
    pub fn block(&self, local: LocalPos) -> BlockId {
        self.blocks[local.index()]
    }

    /// Set a block; returns whether the stored value changed.
    pub fn set_block(&mut self, local: LocalPos, block: BlockId) -> bool {
        let slot = &mut self.blocks[local.index()];
        let changed = *slot != block;
        *slot = block;
        changed
    }

    /// Number of non-air blocks.
    pub fn filled_count(&self) -> usize {
        self.blocks.iter().filter(|&&id| id != BLOCK_AIR).count()
    }
}
