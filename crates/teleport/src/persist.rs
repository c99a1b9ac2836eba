//! Save-data encoding for [`PlayerTeleportRecord`].
//!
//! A record blob is a fixed 14-byte header followed by a bincode payload.
//! The header carries a CRC32 of the payload so a truncated or corrupted
//! player file is rejected instead of silently resetting the record.

use crate::cache::PlayerTeleportRecord;
use crate::error::RecordError;
use bincode::Options;
use crc32fast::Hasher;

/// Magic number for record identification ("MDTR" = mirage teleport record).
pub const RECORD_MAGIC: u32 = 0x4D445452;

/// Current record format version.
pub const RECORD_VERSION: u16 = 1;

const HEADER_LEN: usize = 14;

/// Upper bound on a decoded payload; records are a few hundred bytes.
const MAX_PAYLOAD_LEN: u64 = 1 << 20;

#[derive(Debug, Clone, PartialEq, Eq)]
struct RecordHeader {
    magic: u32,
    version: u16,
    crc32: u32,
    payload_len: u32,
}

impl RecordHeader {
    fn new(crc32: u32, payload_len: u32) -> Self {
        Self {
            magic: RECORD_MAGIC,
            version: RECORD_VERSION,
            crc32,
            payload_len,
        }
    }

    fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[0..4].copy_from_slice(&self.magic.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
        bytes[6..10].copy_from_slice(&self.crc32.to_le_bytes());
        bytes[10..14].copy_from_slice(&self.payload_len.to_le_bytes());
        bytes
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, RecordError> {
        if bytes.len() < HEADER_LEN {
            return Err(RecordError::TooShort { len: bytes.len() });
        }

        let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if magic != RECORD_MAGIC {
            return Err(RecordError::BadMagic {
                expected: RECORD_MAGIC,
                found: magic,
            });
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != RECORD_VERSION {
            return Err(RecordError::UnsupportedVersion { found: version });
        }

        Ok(Self {
            magic,
            version,
            crc32: u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]),
            payload_len: u32::from_le_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]),
        })
    }
}

fn codec() -> impl Options {
    bincode::DefaultOptions::new().with_limit(MAX_PAYLOAD_LEN)
}

fn checksum(payload: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(payload);
    hasher.finalize()
}

impl PlayerTeleportRecord {
    /// Encode the record for the host's per-entity save data.
    pub fn serialize(&self) -> Result<Vec<u8>, RecordError> {
        let payload = codec().serialize(self).map_err(RecordError::Codec)?;
        let header = RecordHeader::new(checksum(&payload), payload.len() as u32);

        let mut blob = Vec::with_capacity(HEADER_LEN + payload.len());
        blob.extend_from_slice(&header.to_bytes());
        blob.extend_from_slice(&payload);
        Ok(blob)
    }

    /// Decode a record previously produced by [`PlayerTeleportRecord::serialize`].
    pub fn deserialize(blob: &[u8]) -> Result<Self, RecordError> {
        let header = RecordHeader::from_bytes(blob)?;
        let payload = &blob[HEADER_LEN..];

        if payload.len() != header.payload_len as usize {
            return Err(RecordError::LengthMismatch {
                expected: header.payload_len as usize,
                found: payload.len(),
            });
        }

        let computed = checksum(payload);
        if computed != header.crc32 {
            return Err(RecordError::Checksum {
                expected: header.crc32,
                found: computed,
            });
        }

        codec().deserialize(payload).map_err(RecordError::Codec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirage_core::{BlockPos, DimensionId, SimTick, TeleportContext};

    fn sample_record() -> PlayerTeleportRecord {
        let ctx = TeleportContext::mirage_worlds();
        let caveland = DimensionId::parse("caveland").unwrap();
        let mut record = PlayerTeleportRecord::new();
        record.set_last_dimension(&ctx, DimensionId::overworld());
        record.set_last_position(
            &ctx,
            &DimensionId::overworld(),
            Some(BlockPos::new(-120, 71, 35)),
        );
        record.set_last_position(&ctx, &caveland, Some(BlockPos::new(8, 27, 9)));
        record.set_last_teleport_tick(caveland, SimTick(4_800));
        record
    }

    #[test]
    fn record_header_roundtrip() {
        let header = RecordHeader::new(0xDEADBEEF, 1234);
        let decoded = RecordHeader::from_bytes(&header.to_bytes()).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn record_roundtrip() {
        let record = sample_record();
        let blob = record.serialize().unwrap();
        assert_eq!(&blob[0..4], &RECORD_MAGIC.to_le_bytes());
        assert_eq!(PlayerTeleportRecord::deserialize(&blob).unwrap(), record);
    }

    #[test]
    fn empty_record_roundtrip() {
        let blob = PlayerTeleportRecord::new().serialize().unwrap();
        let decoded = PlayerTeleportRecord::deserialize(&blob).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn rejects_short_blob() {
        let err = PlayerTeleportRecord::deserialize(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, RecordError::TooShort { len: 3 }));
    }

    #[test]
    fn rejects_wrong_magic() {
        let mut blob = sample_record().serialize().unwrap();
        blob[0] ^= 0xFF;
        let err = PlayerTeleportRecord::deserialize(&blob).unwrap_err();
        assert!(matches!(err, RecordError::BadMagic { .. }));
    }

    #[test]
    fn rejects_future_version() {
        let mut blob = sample_record().serialize().unwrap();
        blob[4..6].copy_from_slice(&(RECORD_VERSION + 1).to_le_bytes());
        let err = PlayerTeleportRecord::deserialize(&blob).unwrap_err();
        assert!(matches!(err, RecordError::UnsupportedVersion { .. }));
    }

    #[test]
    fn rejects_truncated_payload() {
        let blob = sample_record().serialize().unwrap();
        let err = PlayerTeleportRecord::deserialize(&blob[..blob.len() - 1]).unwrap_err();
        assert!(matches!(err, RecordError::LengthMismatch { .. }));
    }

    #[test]
    fn rejects_corrupted_payload() {
        let mut blob = sample_record().serialize().unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0x01;
        let err = PlayerTeleportRecord::deserialize(&blob).unwrap_err();
        assert!(matches!(err, RecordError::Checksum { .. }));
    }
}
