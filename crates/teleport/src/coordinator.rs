//! Teleport request handling and destination placement.
//!
//! Placement walks a fixed state machine:
//!
//! ```text
//! Idle -> ResolvingCache -> ResolvingSearch -> ResolvingVoid -> Placed
//!              |                  |
//!              +------------------+-----------------------------> Placed
//! ```
//!
//! Each request runs to `Placed` within the call; nothing is resumed across
//! ticks and nothing can be cancelled halfway.

use crate::cache::PositionCache;
use crate::destinations::DestinationTable;
use crate::error::{InvalidCachedPosition, TeleportError};
use crate::search::{is_safe_landing, SafeSpotSearch, SearchBounds};
use crate::void::VoidFallback;
use mirage_core::{
    BlockId, BlockPos, DimensionClassifier, DimensionId, EntityId, EntityState, RegistryKey,
    SimTick, TeleportContext, TeleportHost, WorldMutation, WorldQuery,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Mossy cobblestone in the reference block table.
pub const DEFAULT_PLATFORM_BLOCK: BlockId = 12;

/// Static configuration of a coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeleportSettings {
    /// Teleport network whose memory this coordinator reads and writes.
    pub context: TeleportContext,
    /// Landing search tuning.
    pub search: SearchBounds,
    /// Block the void platform is built from.
    pub platform_block: BlockId,
}

impl Default for TeleportSettings {
    fn default() -> Self {
        Self {
            context: TeleportContext::mirage_worlds(),
            search: SearchBounds::default(),
            platform_block: DEFAULT_PLATFORM_BLOCK,
        }
    }
}

/// States of the placement state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlacementPhase {
    /// Request accepted, nothing resolved yet.
    Idle,
    /// Checking the cached position for the destination.
    ResolvingCache,
    /// Running the randomized landing search.
    ResolvingSearch,
    /// Building the void platform.
    ResolvingVoid,
    /// Entity committed to its landing position.
    Placed,
}

/// Strategy that produced the landing position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementStrategy {
    /// Cached position from an earlier departure.
    Cache,
    /// Randomized landing search.
    Search,
    /// Void platform.
    Void,
}

/// Outcome of a placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    /// Dimension the entity was placed in.
    pub dimension: DimensionId,
    /// Block the entity stands in.
    pub pos: BlockPos,
    /// Strategy that produced `pos`.
    pub strategy: PlacementStrategy,
    /// Landing search attempts spent (0 when the search did not run).
    pub search_attempts: u32,
    /// Whether a stale cached position was discarded on the way.
    pub cleared_stale_cache: bool,
    /// Whether the landing became the entity's spawn point in `dimension`.
    pub spawn_point_set: bool,
    /// Phases visited, `Idle` through `Placed`.
    pub phases: Vec<PlacementPhase>,
}

/// Resolves teleport requests against a host world.
pub struct TeleportCoordinator<C> {
    settings: TeleportSettings,
    classifier: C,
    destinations: DestinationTable,
}

impl<C: DimensionClassifier> TeleportCoordinator<C> {
    /// Build a coordinator from explicit configuration.
    pub fn new(settings: TeleportSettings, classifier: C, destinations: DestinationTable) -> Self {
        Self {
            settings,
            classifier,
            destinations,
        }
    }

    /// Active settings.
    pub fn settings(&self) -> &TeleportSettings {
        &self.settings
    }

    /// Dimension classifier.
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Book table.
    pub fn destinations(&self) -> &DestinationTable {
        &self.destinations
    }

    /// Move `entity` to `destination`, or back to its remembered origin when
    /// `destination` is `None`.
    ///
    /// Returns whether a dimension change happened. Rejected requests change
    /// nothing; use [`Self::try_request_teleport`] to learn why.
    pub fn request_teleport<H, R>(
        &self,
        host: &mut H,
        cache: &mut PositionCache,
        entity: EntityId,
        destination: Option<&DimensionId>,
        rng: &mut R,
    ) -> bool
    where
        H: TeleportHost + ?Sized,
        R: Rng + ?Sized,
    {
        match self.try_request_teleport(host, cache, entity, destination, rng) {
            Ok(_) => true,
            Err(err) => {
                debug!(%entity, %err, "teleport request ignored");
                false
            }
        }
    }

    /// Fallible form of [`Self::request_teleport`].
    #[instrument(skip_all, fields(%entity))]
    pub fn try_request_teleport<H, R>(
        &self,
        host: &mut H,
        cache: &mut PositionCache,
        entity: EntityId,
        destination: Option<&DimensionId>,
        rng: &mut R,
    ) -> Result<Placement, TeleportError>
    where
        H: TeleportHost + ?Sized,
        R: Rng + ?Sized,
    {
        if !host.is_authoritative() {
            return Err(TeleportError::NotAuthoritative);
        }

        let state = host
            .entity(entity)
            .ok_or(TeleportError::UnknownEntity(entity))?;
        let context = &self.settings.context;

        let destination = match destination {
            Some(dimension) => dimension.clone(),
            None => cache
                .last_dimension(entity, context, None)
                .ok_or_else(|| TeleportError::NoDestinationMapping(context.to_string()))?,
        };
        if destination == state.dimension {
            return Err(TeleportError::SameDimension(destination));
        }

        let mut world = host.change_dimension(entity, &destination).ok_or_else(|| {
            TeleportError::TransferRefused {
                entity,
                dimension: destination.clone(),
            }
        })?;

        if self.classifier.is_member_of_mirage_group(&destination) {
            cache.set_last_dimension(entity, context, state.dimension.clone());
        }
        cache.set_last_position(entity, context, &state.dimension, Some(state.block_pos()));

        let mut placement = self.place_entity(&mut world, cache, &state, &destination, rng);
        drop(world);
        placement.spawn_point_set = host.ensure_spawn_point(entity, &destination, placement.pos);
        info!(
            from = %state.dimension,
            to = %placement.dimension,
            pos = %placement.pos,
            strategy = ?placement.strategy,
            "teleported"
        );
        Ok(placement)
    }

    /// Use a mirage book: only works inside the book's own dimension, and
    /// sends the entity back where it came from.
    pub fn use_mirage_book<H, R>(
        &self,
        host: &mut H,
        cache: &mut PositionCache,
        entity: EntityId,
        book: &RegistryKey,
        tick: SimTick,
        rng: &mut R,
    ) -> bool
    where
        H: TeleportHost + ?Sized,
        R: Rng + ?Sized,
    {
        match self.try_use_mirage_book(host, cache, entity, book, tick, rng) {
            Ok(_) => true,
            Err(err) => {
                debug!(%entity, %book, %err, "mirage book use ignored");
                false
            }
        }
    }

    /// Fallible form of [`Self::use_mirage_book`].
    #[instrument(skip_all, fields(%entity, %book))]
    pub fn try_use_mirage_book<H, R>(
        &self,
        host: &mut H,
        cache: &mut PositionCache,
        entity: EntityId,
        book: &RegistryKey,
        tick: SimTick,
        rng: &mut R,
    ) -> Result<Placement, TeleportError>
    where
        H: TeleportHost + ?Sized,
        R: Rng + ?Sized,
    {
        if !host.is_authoritative() {
            return Err(TeleportError::NotAuthoritative);
        }

        let required = self.destinations.resolve(book)?;
        let state = host
            .entity(entity)
            .ok_or(TeleportError::UnknownEntity(entity))?;
        if state.dimension != *required {
            return Err(TeleportError::WrongDimension {
                required: required.clone(),
                actual: state.dimension,
            });
        }

        cache.set_last_teleport_tick(entity, required.clone(), tick);
        self.try_request_teleport(host, cache, entity, None, rng)
    }

    /// Place an entity that has just arrived in `dimension`.
    ///
    /// Tries the cached position, then the landing search, then the void
    /// platform. Always places the entity.
    #[instrument(skip_all, fields(entity = %entity.id, %dimension))]
    pub fn place_entity<W, R>(
        &self,
        world: &mut W,
        cache: &mut PositionCache,
        entity: &EntityState,
        dimension: &DimensionId,
        rng: &mut R,
    ) -> Placement
    where
        W: WorldMutation + ?Sized,
        R: Rng + ?Sized,
    {
        let mut phases = vec![PlacementPhase::Idle, PlacementPhase::ResolvingCache];
        let mut cleared_stale_cache = false;

        match self.resolve_cached(&*world, cache, entity.id, dimension) {
            Ok(Some(pos)) => {
                world.move_entity(entity.id, pos, entity.yaw, entity.pitch);
                phases.push(PlacementPhase::Placed);
                return Placement {
                    dimension: dimension.clone(),
                    pos,
                    strategy: PlacementStrategy::Cache,
                    search_attempts: 0,
                    cleared_stale_cache,
                    spawn_point_set: false,
                    phases,
                };
            }
            Ok(None) => {}
            Err(stale) => {
                debug!(%stale, "discarded cached position");
                cleared_stale_cache = true;
            }
        }

        phases.push(PlacementPhase::ResolvingSearch);
        let subterranean = self.classifier.is_subterranean_style(dimension);
        let origin = entity.block_pos();
        let search_attempts = match SafeSpotSearch::new(&self.settings.search).find(
            &*world,
            origin.x,
            origin.z,
            subterranean,
            rng,
        ) {
            Ok(found) => {
                world.move_entity(entity.id, found.pos, entity.yaw, entity.pitch);
                phases.push(PlacementPhase::Placed);
                return Placement {
                    dimension: dimension.clone(),
                    pos: found.pos,
                    strategy: PlacementStrategy::Search,
                    search_attempts: found.attempts,
                    cleared_stale_cache,
                    spawn_point_set: false,
                    phases,
                };
            }
            Err(exhausted) => {
                debug!(%exhausted, "falling back to void platform");
                exhausted.attempts
            }
        };

        phases.push(PlacementPhase::ResolvingVoid);
        let pos = VoidFallback::new(self.settings.platform_block).place(world, entity);
        phases.push(PlacementPhase::Placed);
        Placement {
            dimension: dimension.clone(),
            pos,
            strategy: PlacementStrategy::Void,
            search_attempts,
            cleared_stale_cache,
            spawn_point_set: false,
            phases,
        }
    }

    /// Cached position for `dimension` if it is still safe. A stale entry is
    /// cleared and reported as an error.
    fn resolve_cached<W>(
        &self,
        world: &W,
        cache: &mut PositionCache,
        entity: EntityId,
        dimension: &DimensionId,
    ) -> Result<Option<BlockPos>, InvalidCachedPosition>
    where
        W: WorldQuery + ?Sized,
    {
        let context = &self.settings.context;
        let Some(pos) = cache.last_position(entity, context, dimension) else {
            return Ok(None);
        };

        if is_safe_landing(world, pos, self.settings.search.liquid_radius) {
            return Ok(Some(pos));
        }

        cache.set_last_position(entity, context, dimension, None);
        Err(InvalidCachedPosition {
            dimension: dimension.clone(),
            pos,
        })
    }
}
