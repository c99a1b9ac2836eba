//! Per-entity teleport memory.
//!
//! A [`PlayerTeleportRecord`] remembers, for each teleport context, the
//! dimension a visitor came from and where the entity last stood in each
//! dimension it left. [`PositionCache`] owns the records of every entity and
//! exposes the entity-keyed contract the coordinator uses.
//!
//! Positions are always keyed by the dimension they belong to. Leaving A for
//! B stores the departure point under A, so the entry is only consulted when
//! A is entered again.

use mirage_core::{BlockPos, DimensionId, EntityId, SimTick, TeleportContext};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A landing position remembered for one dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPosition {
    /// Dimension the position belongs to.
    pub dimension: DimensionId,
    /// Block the entity stood in.
    pub pos: BlockPos,
}

/// Memory for one teleport context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextRecord {
    last_dimension: Option<DimensionId>,
    positions: BTreeMap<DimensionId, BlockPos>,
}

impl ContextRecord {
    /// Dimension to return to, if one was recorded.
    pub fn last_dimension(&self) -> Option<&DimensionId> {
        self.last_dimension.as_ref()
    }

    /// Cached positions in deterministic order.
    pub fn positions(&self) -> impl Iterator<Item = CachedPosition> + '_ {
        self.positions.iter().map(|(dimension, pos)| CachedPosition {
            dimension: dimension.clone(),
            pos: *pos,
        })
    }

    fn is_empty(&self) -> bool {
        self.last_dimension.is_none() && self.positions.is_empty()
    }
}

/// Everything the teleport core persists for one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerTeleportRecord {
    contexts: BTreeMap<TeleportContext, ContextRecord>,
    teleport_ticks: BTreeMap<DimensionId, SimTick>,
}

impl PlayerTeleportRecord {
    /// Empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the record holds nothing worth saving.
    pub fn is_empty(&self) -> bool {
        self.contexts.values().all(ContextRecord::is_empty) && self.teleport_ticks.is_empty()
    }

    /// Memory for one context, if any was recorded.
    pub fn context(&self, context: &TeleportContext) -> Option<&ContextRecord> {
        self.contexts.get(context)
    }

    /// Whether a position is cached for `dimension`.
    pub fn has_last_position(&self, context: &TeleportContext, dimension: &DimensionId) -> bool {
        self.last_position(context, dimension).is_some()
    }

    /// Cached position for `dimension`.
    pub fn last_position(
        &self,
        context: &TeleportContext,
        dimension: &DimensionId,
    ) -> Option<BlockPos> {
        self.contexts.get(context)?.positions.get(dimension).copied()
    }

    /// Cache a position for `dimension`; `None` clears the entry.
    pub fn set_last_position(
        &mut self,
        context: &TeleportContext,
        dimension: &DimensionId,
        pos: Option<BlockPos>,
    ) {
        match pos {
            Some(pos) => {
                self.contexts
                    .entry(context.clone())
                    .or_default()
                    .positions
                    .insert(dimension.clone(), pos);
            }
            None => {
                if let Some(record) = self.contexts.get_mut(context) {
                    record.positions.remove(dimension);
                }
            }
        }
    }

    /// Dimension to return to, or `default` when none was recorded.
    pub fn last_dimension(
        &self,
        context: &TeleportContext,
        default: Option<DimensionId>,
    ) -> Option<DimensionId> {
        self.contexts
            .get(context)
            .and_then(|record| record.last_dimension.clone())
            .or(default)
    }

    /// Remember the dimension to return to.
    pub fn set_last_dimension(&mut self, context: &TeleportContext, dimension: DimensionId) {
        self.contexts.entry(context.clone()).or_default().last_dimension = Some(dimension);
    }

    /// Tick of the last book-driven return trip out of `dimension`.
    pub fn last_teleport_tick(&self, dimension: &DimensionId) -> Option<SimTick> {
        self.teleport_ticks.get(dimension).copied()
    }

    /// Record the tick of a book-driven return trip out of `dimension`.
    pub fn set_last_teleport_tick(&mut self, dimension: DimensionId, tick: SimTick) {
        self.teleport_ticks.insert(dimension, tick);
    }
}

/// Teleport records for every entity, created lazily on first write.
///
/// All methods take `&self`/`&mut self`; the cache is meant to live on the
/// simulation thread next to the world it describes.
#[derive(Debug, Default)]
pub struct PositionCache {
    records: BTreeMap<EntityId, PlayerTeleportRecord>,
}

impl PositionCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entities with a record.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no entity has a record.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record of `entity`, if one exists.
    pub fn record(&self, entity: EntityId) -> Option<&PlayerTeleportRecord> {
        self.records.get(&entity)
    }

    /// Record of `entity`, created empty if missing.
    pub fn record_mut(&mut self, entity: EntityId) -> &mut PlayerTeleportRecord {
        self.records.entry(entity).or_default()
    }

    /// Install a record loaded from save data, returning the one it replaces.
    pub fn insert_record(
        &mut self,
        entity: EntityId,
        record: PlayerTeleportRecord,
    ) -> Option<PlayerTeleportRecord> {
        self.records.insert(entity, record)
    }

    /// Detach a record, e.g. when the entity is unloaded and saved.
    pub fn remove_record(&mut self, entity: EntityId) -> Option<PlayerTeleportRecord> {
        self.records.remove(&entity)
    }

    /// Whether a position is cached for `dimension`.
    pub fn has_last_position(
        &self,
        entity: EntityId,
        context: &TeleportContext,
        dimension: &DimensionId,
    ) -> bool {
        self.records
            .get(&entity)
            .is_some_and(|record| record.has_last_position(context, dimension))
    }

    /// Cached position for `dimension`.
    pub fn last_position(
        &self,
        entity: EntityId,
        context: &TeleportContext,
        dimension: &DimensionId,
    ) -> Option<BlockPos> {
        self.records
            .get(&entity)?
            .last_position(context, dimension)
    }

    /// Cache a position for `dimension`; `None` clears the entry.
    pub fn set_last_position(
        &mut self,
        entity: EntityId,
        context: &TeleportContext,
        dimension: &DimensionId,
        pos: Option<BlockPos>,
    ) {
        match pos {
            Some(_) => self.record_mut(entity).set_last_position(context, dimension, pos),
            None => {
                if let Some(record) = self.records.get_mut(&entity) {
                    record.set_last_position(context, dimension, None);
                }
            }
        }
    }

    /// Dimension to return to, or `default` when none was recorded.
    pub fn last_dimension(
        &self,
        entity: EntityId,
        context: &TeleportContext,
        default: Option<DimensionId>,
    ) -> Option<DimensionId> {
        match self.records.get(&entity) {
            Some(record) => record.last_dimension(context, default),
            None => default,
        }
    }

    /// Remember the dimension to return to.
    pub fn set_last_dimension(
        &mut self,
        entity: EntityId,
        context: &TeleportContext,
        dimension: DimensionId,
    ) {
        self.record_mut(entity).set_last_dimension(context, dimension);
    }

    /// Tick of the last book-driven return trip out of `dimension`.
    pub fn last_teleport_tick(&self, entity: EntityId, dimension: &DimensionId) -> Option<SimTick> {
        self.records.get(&entity)?.last_teleport_tick(dimension)
    }

    /// Record the tick of a book-driven return trip out of `dimension`.
    pub fn set_last_teleport_tick(
        &mut self,
        entity: EntityId,
        dimension: DimensionId,
        tick: SimTick,
    ) {
        self.record_mut(entity).set_last_teleport_tick(dimension, tick);
    }
}
