//! Error kinds of the teleport core.
//!
//! None of these are fatal. [`SearchExhausted`] and [`InvalidCachedPosition`]
//! are consumed inside placement to pick the next strategy; [`TeleportError`]
//! explains why a request was ignored without changing any state.

use mirage_core::{BlockPos, DimensionId, EntityId};
use thiserror::Error;

/// Why a teleport request did not start a dimension change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TeleportError {
    /// The request came from a side that does not own the simulation.
    #[error("teleport requested on a non-authoritative side")]
    NotAuthoritative,

    /// The host does not know the entity.
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),

    /// The book or context resolves to no destination dimension.
    #[error("no destination mapped for {0}")]
    NoDestinationMapping(String),

    /// The resolved destination is the dimension the entity is already in.
    #[error("entity is already in {0}")]
    SameDimension(DimensionId),

    /// A book was used outside the dimension it belongs to.
    #[error("book belongs to {required} but entity is in {actual}")]
    WrongDimension {
        /// Dimension the book works in.
        required: DimensionId,
        /// Dimension the entity is in.
        actual: DimensionId,
    },

    /// The host refused to move the entity.
    #[error("host refused to move {entity} into {dimension}")]
    TransferRefused {
        /// Entity that was to be moved.
        entity: EntityId,
        /// Requested destination.
        dimension: DimensionId,
    },
}

/// The randomized landing search used every attempt without success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no safe landing spot after {attempts} attempts")]
pub struct SearchExhausted {
    /// Attempts made before giving up.
    pub attempts: u32,
}

/// A cached landing position failed re-validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cached position {pos} in {dimension} is no longer safe")]
pub struct InvalidCachedPosition {
    /// Dimension the entry was cached for.
    pub dimension: DimensionId,
    /// The rejected position.
    pub pos: BlockPos,
}

/// Failure to encode or decode a persisted [`crate::PlayerTeleportRecord`].
#[derive(Debug, Error)]
pub enum RecordError {
    /// Blob shorter than the fixed header.
    #[error("record blob too short: {len} bytes")]
    TooShort {
        /// Actual blob length.
        len: usize,
    },

    /// Header magic did not match.
    #[error("invalid record magic: expected 0x{expected:08X}, got 0x{found:08X}")]
    BadMagic {
        /// Magic this build writes.
        expected: u32,
        /// Magic found in the blob.
        found: u32,
    },

    /// Blob written by an unknown format version.
    #[error("unsupported record version {found}")]
    UnsupportedVersion {
        /// Version found in the blob.
        found: u16,
    },

    /// Payload length in the header disagrees with the blob.
    #[error("record payload length mismatch: header says {expected}, blob has {found}")]
    LengthMismatch {
        /// Length declared by the header.
        expected: usize,
        /// Bytes actually present after the header.
        found: usize,
    },

    /// CRC32 of the payload did not match the header.
    #[error("record CRC32 mismatch: expected {expected:08X}, got {found:08X}")]
    Checksum {
        /// CRC stored in the header.
        expected: u32,
        /// CRC computed over the payload.
        found: u32,
    },

    /// Payload could not be (de)serialized.
    #[error("record payload codec error")]
    Codec(#[source] bincode::Error),
}
