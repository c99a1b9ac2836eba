//! Terminal placement strategy: build the ground to stand on.

use mirage_core::{BlockId, BlockPos, EntityState, WorldMutation};

/// Builds a 3×3 platform at y=0 under the entity and stands it on top.
///
/// Never fails, and re-running it at the same coordinates rewrites the same
/// nine blocks and yields the same landing position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoidFallback {
    platform_block: BlockId,
}

impl VoidFallback {
    /// Fallback that builds platforms out of `platform_block`.
    pub fn new(platform_block: BlockId) -> Self {
        Self { platform_block }
    }

    /// Block the platform is made of.
    pub fn platform_block(&self) -> BlockId {
        self.platform_block
    }

    /// Platform center for an entity: its column at height 0.
    pub fn platform_center(entity: &EntityState) -> BlockPos {
        let column = entity.block_pos();
        BlockPos::new(column.x, 0, column.z)
    }

    /// Build the platform and move the entity onto it. Returns the landing block.
    pub fn place<W: WorldMutation + ?Sized>(
        &self,
        world: &mut W,
        entity: &EntityState,
    ) -> BlockPos {
        let center = Self::platform_center(entity);
        for dx in -1..=1 {
            for dz in -1..=1 {
                world.set_block(center.offset(dx, 0, dz), self.platform_block);
            }
        }

        let landing = center.up();
        world.move_entity(entity.id, landing, entity.yaw, entity.pitch);
        landing
    }
}
