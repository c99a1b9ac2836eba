//! Multi-dimension world with an entity table.
//!
//! [`VoxelWorld`] is the authoritative host the teleport core talks to:
//! each dimension is an independent [`DimensionWorld`], and a
//! [`DimensionView`] lends one dimension plus the entity table out as the
//! mutable world handed to placement.

use crate::blocks::{block_properties, BLOCK_AIR};
use crate::chunk::{split_block_pos, ChunkPos, CHUNK_SIZE_Y};
use crate::storage::ChunkStorage;
use crate::terrain::{TerrainGenerator, TerrainProfile};
use mirage_core::{
    BlockId, BlockPos, DimensionId, EntityId, EntityState, TeleportHost, WorldMutation, WorldQuery,
};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Chunk radius generated around an entity arriving in a dimension.
pub const ARRIVAL_LOAD_RADIUS: i32 = 3;

/// One dimension's blocks and terrain generator.
pub struct DimensionWorld {
    id: DimensionId,
    height_limit: i32,
    generator: TerrainGenerator,
    chunks: ChunkStorage,
}

impl DimensionWorld {
    /// Create an empty dimension; `height_limit` is clamped to the chunk height.
    pub fn new(
        id: DimensionId,
        world_seed: u64,
        height_limit: i32,
        profile: TerrainProfile,
    ) -> Self {
        let height_limit = height_limit.clamp(1, CHUNK_SIZE_Y as i32);
        Self {
            id,
            height_limit,
            generator: TerrainGenerator::new(world_seed, profile, height_limit),
            chunks: ChunkStorage::new(),
        }
    }

    /// Dimension identifier.
    pub fn id(&self) -> &DimensionId {
        &self.id
    }

    /// Block at `pos`; air outside the height range or in unloaded chunks.
    pub fn block(&self, pos: BlockPos) -> BlockId {
        if pos.y < 0 || pos.y >= self.height_limit {
            return BLOCK_AIR;
        }
        split_block_pos(pos)
            .and_then(|(chunk_pos, local)| {
                self.chunks.get(chunk_pos).map(|chunk| chunk.block(local))
            })
            .unwrap_or(BLOCK_AIR)
    }

    /// Replace the block at `pos`, loading an empty chunk if needed.
    ///
    /// Writes outside the height range are dropped.
    pub fn set_block(&mut self, pos: BlockPos, block: BlockId) {
        if pos.y < 0 || pos.y >= self.height_limit {
            debug!(dimension = %self.id, %pos, "ignoring block write outside height range");
            return;
        }
        if let Some((chunk_pos, local)) = split_block_pos(pos) {
            self.chunks.ensure_chunk(chunk_pos).set_block(local, block);
        }
    }

    /// Fill the inclusive box between `from` and `to`.
    pub fn fill(&mut self, from: BlockPos, to: BlockPos, block: BlockId) {
        for x in from.x.min(to.x)..=from.x.max(to.x) {
            for y in from.y.min(to.y)..=from.y.max(to.y) {
                for z in from.z.min(to.z)..=from.z.max(to.z) {
                    self.set_block(BlockPos::new(x, y, z), block);
                }
            }
        }
    }

    /// Generate every missing chunk within `radius` chunks of `center`.
    ///
    /// Already loaded chunks are left alone so edits survive.
    pub fn generate_around(&mut self, center: BlockPos, radius: i32) -> usize {
        let center = ChunkPos::containing(center);
        let mut generated = 0;
        for cx in center.x - radius..=center.x + radius {
            for cz in center.z - radius..=center.z + radius {
                let pos = ChunkPos::new(cx, cz);
                if !self.chunks.contains(pos) {
                    self.chunks.insert(self.generator.generate_chunk(pos));
                    generated += 1;
                }
            }
        }
        trace!(dimension = %self.id, %center, generated, "generated arrival area");
        generated
    }

    /// Number of resident chunks.
    pub fn loaded_chunks(&self) -> usize {
        self.chunks.len()
    }
}

impl WorldQuery for DimensionWorld {
    fn is_solid(&self, pos: BlockPos) -> bool {
        block_properties(self.block(pos)).is_solid
    }

    fn can_occupy(&self, pos: BlockPos) -> bool {
        block_properties(self.block(pos)).can_spawn_in()
    }

    fn is_liquid(&self, pos: BlockPos) -> bool {
        block_properties(self.block(pos)).is_liquid
    }

    fn is_air(&self, pos: BlockPos) -> bool {
        self.block(pos) == BLOCK_AIR
    }

    fn height_limit(&self) -> i32 {
        self.height_limit
    }
}

/// Mutable view of one dimension together with the shared entity table.
pub struct DimensionView<'a> {
    dimension: &'a mut DimensionWorld,
    entities: &'a mut BTreeMap<EntityId, EntityState>,
}

impl DimensionView<'_> {
    /// Dimension this view covers.
    pub fn id(&self) -> &DimensionId {
        &self.dimension.id
    }

    /// Block at `pos`.
    pub fn block(&self, pos: BlockPos) -> BlockId {
        self.dimension.block(pos)
    }
}

impl WorldQuery for DimensionView<'_> {
    fn is_solid(&self, pos: BlockPos) -> bool {
        self.dimension.is_solid(pos)
    }

    fn can_occupy(&self, pos: BlockPos) -> bool {
        self.dimension.can_occupy(pos)
    }

    fn is_liquid(&self, pos: BlockPos) -> bool {
        self.dimension.is_liquid(pos)
    }

    fn is_air(&self, pos: BlockPos) -> bool {
        self.dimension.is_air(pos)
    }

    fn height_limit(&self) -> i32 {
        self.dimension.height_limit()
    }
}

impl WorldMutation for DimensionView<'_> {
    fn set_block(&mut self, pos: BlockPos, block: BlockId) {
        self.dimension.set_block(pos, block);
    }

    fn move_entity(&mut self, entity: EntityId, pos: BlockPos, yaw: f32, pitch: f32) {
        match self.entities.get_mut(&entity) {
            Some(state) => {
                state.dimension = self.dimension.id.clone();
                state.position = pos.standing_point();
                state.yaw = yaw;
                state.pitch = pitch;
            }
            None => debug!(%entity, "move requested for unknown entity"),
        }
    }
}

/// In-memory authoritative world: dimensions plus entities.
pub struct VoxelWorld {
    seed: u64,
    authoritative: bool,
    dimensions: BTreeMap<DimensionId, DimensionWorld>,
    entities: BTreeMap<EntityId, EntityState>,
    spawn_points: BTreeMap<(EntityId, DimensionId), BlockPos>,
}

impl VoxelWorld {
    /// Create an empty, authoritative world.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            authoritative: true,
            dimensions: BTreeMap::new(),
            entities: BTreeMap::new(),
            spawn_points: BTreeMap::new(),
        }
    }

    /// World seed used for terrain generation.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Mark this world as a non-authoritative mirror (e.g. a client copy).
    pub fn set_authoritative(&mut self, authoritative: bool) {
        self.authoritative = authoritative;
    }

    /// Register a dimension, replacing any previous one with the same id.
    pub fn add_dimension(
        &mut self,
        id: DimensionId,
        height_limit: i32,
        profile: TerrainProfile,
    ) -> &mut DimensionWorld {
        let world = DimensionWorld::new(id.clone(), self.seed, height_limit, profile);
        match self.dimensions.entry(id) {
            Entry::Occupied(mut slot) => {
                slot.insert(world);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(world),
        }
    }

    /// Borrow a dimension.
    pub fn dimension(&self, id: &DimensionId) -> Option<&DimensionWorld> {
        self.dimensions.get(id)
    }

    /// Borrow a dimension mutably.
    pub fn dimension_mut(&mut self, id: &DimensionId) -> Option<&mut DimensionWorld> {
        self.dimensions.get_mut(id)
    }

    /// Mutable view of a dimension together with the entity table.
    pub fn view(&mut self, id: &DimensionId) -> Option<DimensionView<'_>> {
        let dimension = self.dimensions.get_mut(id)?;
        Some(DimensionView {
            dimension,
            entities: &mut self.entities,
        })
    }

    /// Add or replace an entity.
    pub fn spawn_entity(&mut self, state: EntityState) {
        self.entities.insert(state.id, state);
    }

    /// Current entity state.
    pub fn entity_state(&self, id: EntityId) -> Option<&EntityState> {
        self.entities.get(&id)
    }

    /// Spawn point of `entity` in `dimension`, if one was set.
    pub fn spawn_point(&self, entity: EntityId, dimension: &DimensionId) -> Option<BlockPos> {
        self.spawn_points.get(&(entity, dimension.clone())).copied()
    }
}

impl TeleportHost for VoxelWorld {
    type World<'a> = DimensionView<'a>;

    fn is_authoritative(&self) -> bool {
        self.authoritative
    }

    fn entity(&self, entity: EntityId) -> Option<EntityState> {
        self.entities.get(&entity).cloned()
    }

    fn change_dimension(
        &mut self,
        entity: EntityId,
        dimension: &DimensionId,
    ) -> Option<DimensionView<'_>> {
        let state = self.entities.get_mut(&entity)?;
        let destination = self.dimensions.get_mut(dimension)?;

        state.dimension = dimension.clone();
        destination.generate_around(state.block_pos(), ARRIVAL_LOAD_RADIUS);
        debug!(%entity, %dimension, "entity changed dimension");

        Some(DimensionView {
            dimension: destination,
            entities: &mut self.entities,
        })
    }

    fn ensure_spawn_point(
        &mut self,
        entity: EntityId,
        dimension: &DimensionId,
        pos: BlockPos,
    ) -> bool {
        match self.spawn_points.entry((entity, dimension.clone())) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(pos);
                debug!(%entity, %dimension, %pos, "spawn point set");
                true
            }
        }
    }
}
