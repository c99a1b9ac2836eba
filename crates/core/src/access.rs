//! Collaborator traits between the teleport core and the host world.
//!
//! The teleport logic never touches chunk storage or entity tables directly.
//! It sees one dimension at a time through [`WorldQuery`] / [`WorldMutation`],
//! asks a [`DimensionClassifier`] how to treat a dimension, and drives the
//! actual dimension change through a [`TeleportHost`]. Tests supply small
//! in-memory implementations; an embedding game supplies adapters over its
//! own registries.

use crate::dimension::DimensionId;
use crate::position::{BlockId, BlockPos, EntityId, EntityState};

/// Read-only terrain queries within a single dimension.
pub trait WorldQuery {
    /// Block at `pos` blocks movement (an entity can stand on it).
    fn is_solid(&self, pos: BlockPos) -> bool;

    /// An entity may occupy the space of the block at `pos`.
    fn can_occupy(&self, pos: BlockPos) -> bool;

    /// Block at `pos` is a liquid (water, lava, ...).
    fn is_liquid(&self, pos: BlockPos) -> bool;

    /// Block at `pos` is empty air (unloaded space counts as air).
    fn is_air(&self, pos: BlockPos) -> bool;

    /// Exclusive upper bound of usable y coordinates in this dimension.
    fn height_limit(&self) -> i32;
}

/// Mutations the teleport core is allowed to make within a single dimension.
pub trait WorldMutation: WorldQuery {
    /// Replace the block at `pos`.
    fn set_block(&mut self, pos: BlockPos, block: BlockId);

    /// Move `entity` to stand in `pos` with the given facing.
    fn move_entity(&mut self, entity: EntityId, pos: BlockPos, yaw: f32, pitch: f32);
}

/// Dimension classification supplied by the host's dimension registry.
pub trait DimensionClassifier {
    /// Dimension belongs to the mirage group, whose visitors remember the
    /// dimension they came from.
    fn is_member_of_mirage_group(&self, dimension: &DimensionId) -> bool;

    /// Dimension is cave-like; landing searches start lower.
    fn is_subterranean_style(&self, dimension: &DimensionId) -> bool;
}

/// Entity lookup and dimension transfer, owned by the host simulation.
pub trait TeleportHost {
    /// Mutable view of one dimension, borrowed from the host.
    type World<'a>: WorldMutation
    where
        Self: 'a;

    /// Whether this side owns the simulation (server / singleplayer logic
    /// thread). Requests from any other side are ignored.
    fn is_authoritative(&self) -> bool;

    /// Current state of `entity`, if it exists.
    fn entity(&self, entity: EntityId) -> Option<EntityState>;

    /// Move `entity` into `dimension`, keeping its horizontal coordinates,
    /// and hand back the destination world for final placement.
    ///
    /// Returns `None` when the host refuses the transfer (unknown dimension,
    /// entity vanished).
    fn change_dimension(
        &mut self,
        entity: EntityId,
        dimension: &DimensionId,
    ) -> Option<Self::World<'_>>;

    /// Make `pos` the spawn point of `entity` in `dimension` unless one is
    /// already set there. Returns whether a spawn point was written.
    fn ensure_spawn_point(
        &mut self,
        entity: EntityId,
        dimension: &DimensionId,
        pos: BlockPos,
    ) -> bool;
}
