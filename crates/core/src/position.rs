//! Block coordinates and entity snapshots.

use crate::dimension::DimensionId;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Block identifier referencing the host's block table.
pub type BlockId = u16;

/// Integer world-space block coordinate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct BlockPos {
    /// East-west axis.
    pub x: i32,
    /// Vertical axis.
    pub y: i32,
    /// North-south axis.
    pub z: i32,
}

impl BlockPos {
    /// Construct from components.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Block containing the given world-space point.
    pub fn containing(point: DVec3) -> Self {
        Self::new(
            point.x.floor() as i32,
            point.y.floor() as i32,
            point.z.floor() as i32,
        )
    }

    /// Block directly above.
    #[inline]
    pub const fn up(self) -> Self {
        Self::new(self.x, self.y + 1, self.z)
    }

    /// Block directly below.
    #[inline]
    pub const fn down(self) -> Self {
        Self::new(self.x, self.y - 1, self.z)
    }

    /// Translate by the given deltas, saturating at the coordinate range.
    #[inline]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.z.saturating_add(dz),
        )
    }

    /// Point an entity stands on when placed in this block: bottom center.
    pub fn standing_point(self) -> DVec3 {
        DVec3::new(self.x as f64 + 0.5, self.y as f64, self.z as f64 + 0.5)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Host-assigned entity handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the teleport core needs to know about an entity at request time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    /// Entity handle.
    pub id: EntityId,
    /// Dimension the entity currently occupies.
    pub dimension: DimensionId,
    /// Feet position in world space.
    pub position: DVec3,
    /// Heading in degrees.
    pub yaw: f32,
    /// Pitch in degrees.
    pub pitch: f32,
}

impl EntityState {
    /// Block the entity's feet are in.
    pub fn block_pos(&self) -> BlockPos {
        BlockPos::containing(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containing_floors_negative_coordinates() {
        let pos = BlockPos::containing(DVec3::new(-0.5, 64.9, 3.2));
        assert_eq!(pos, BlockPos::new(-1, 64, 3));
    }

    #[test]
    fn neighbours() {
        let pos = BlockPos::new(1, 10, -4);
        assert_eq!(pos.up(), BlockPos::new(1, 11, -4));
        assert_eq!(pos.down(), BlockPos::new(1, 9, -4));
        assert_eq!(pos.offset(-1, 0, 1), BlockPos::new(0, 10, -3));
    }

    #[test]
    fn offset_saturates_at_the_edge() {
        let edge = BlockPos::new(i32::MAX, 64, i32::MIN);
        assert_eq!(edge.offset(4, 0, -4), edge);
        assert_eq!(edge.offset(-1, 0, 1), BlockPos::new(i32::MAX - 1, 64, i32::MIN + 1));
    }

    #[test]
    fn standing_point_is_block_bottom_center() {
        let p = BlockPos::new(2, 5, -3).standing_point();
        assert_eq!(p, DVec3::new(2.5, 5.0, -2.5));
        assert_eq!(BlockPos::containing(p), BlockPos::new(2, 5, -3));
    }

    #[test]
    fn display_format() {
        assert_eq!(BlockPos::new(5, -3, 7).to_string(), "(5, -3, 7)");
        assert_eq!(EntityId(9).to_string(), "#9");
    }
}
