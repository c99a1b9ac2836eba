#![warn(missing_docs)]
//! Teleport-destination resolution for mirage books.
//!
//! Placement tries three strategies in order and stops at the first that
//! lands the entity:
//!
//! 1. the position cached the last time the entity left the destination,
//! 2. a bounded random search for a safe spot near the entity,
//! 3. a 3×3 platform built at the bottom of the world.
//!
//! [`TeleportCoordinator`] runs that sequence and keeps each entity's
//! [`PlayerTeleportRecord`] up to date so return trips land where the entity
//! left. Everything runs synchronously on the caller's simulation thread.

mod cache;
mod coordinator;
mod destinations;
mod dimensions;
mod error;
mod persist;
mod search;
mod void;

pub use cache::{CachedPosition, ContextRecord, PlayerTeleportRecord, PositionCache};
pub use coordinator::{
    Placement, PlacementPhase, PlacementStrategy, TeleportCoordinator, TeleportSettings,
    DEFAULT_PLATFORM_BLOCK,
};
pub use destinations::{BookEntry, Destination, DestinationTable, TRANSLATION_PREFIX};
pub use dimensions::{DimensionClass, DimensionRegistry};
pub use error::{InvalidCachedPosition, RecordError, SearchExhausted, TeleportError};
pub use persist::{RECORD_MAGIC, RECORD_VERSION};
pub use search::{
    has_liquid_nearby, is_safe_landing, is_standable, SafeSpotSearch, SearchBounds, SpotFound,
    VerticalBand,
};
pub use void::VoidFallback;
