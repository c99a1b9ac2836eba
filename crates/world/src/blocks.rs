//! Block table: ids and the physical properties the teleport core queries.

use mirage_core::BlockId;

/// Reserved ID for air.
pub const BLOCK_AIR: BlockId = 0;
/// ID for stone.
pub const BLOCK_STONE: BlockId = 1;
/// ID for dirt.
pub const BLOCK_DIRT: BlockId = 2;
/// ID for grass.
pub const BLOCK_GRASS: BlockId = 3;
/// ID for sand.
pub const BLOCK_SAND: BlockId = 4;
/// ID for still water.
pub const BLOCK_WATER: BlockId = 6;
/// ID for bedrock.
pub const BLOCK_BEDROCK: BlockId = 10;
/// ID for still lava.
pub const BLOCK_LAVA: BlockId = 11;
/// ID for mossy cobblestone (void platform default).
pub const BLOCK_MOSSY_COBBLESTONE: BlockId = 12;
/// ID for tall grass: not air, but entities can stand inside it.
pub const BLOCK_TALL_GRASS: BlockId = 20;

/// Properties of a block type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockProperties {
    /// Registry name (`stone`, `water`, ...).
    pub name: &'static str,

    /// Whether this block is solid (can be stood on, blocks movement).
    pub is_solid: bool,

    /// Whether this block is a liquid.
    pub is_liquid: bool,
}

impl BlockProperties {
    const fn solid(name: &'static str) -> Self {
        Self {
            name,
            is_solid: true,
            is_liquid: false,
        }
    }

    const fn passable(name: &'static str) -> Self {
        Self {
            name,
            is_solid: false,
            is_liquid: false,
        }
    }

    const fn liquid(name: &'static str) -> Self {
        Self {
            name,
            is_solid: false,
            is_liquid: true,
        }
    }

    /// Entities may spawn inside this block (neither solid nor liquid).
    pub fn can_spawn_in(&self) -> bool {
        !self.is_solid && !self.is_liquid
    }
}

const KNOWN_BLOCKS: &[(BlockId, BlockProperties)] = &[
    (BLOCK_AIR, BlockProperties::passable("air")),
    (BLOCK_STONE, BlockProperties::solid("stone")),
    (BLOCK_DIRT, BlockProperties::solid("dirt")),
    (BLOCK_GRASS, BlockProperties::solid("grass")),
    (BLOCK_SAND, BlockProperties::solid("sand")),
    (BLOCK_WATER, BlockProperties::liquid("water")),
    (BLOCK_BEDROCK, BlockProperties::solid("bedrock")),
    (BLOCK_LAVA, BlockProperties::liquid("lava")),
    (
        BLOCK_MOSSY_COBBLESTONE,
        BlockProperties::solid("mossy_cobblestone"),
    ),
    (BLOCK_TALL_GRASS, BlockProperties::passable("tall_grass")),
];

/// Look up the properties of a block id.
///
/// Ids outside the table are treated as generic solid blocks.
pub fn block_properties(id: BlockId) -> BlockProperties {
    KNOWN_BLOCKS
        .iter()
        .find(|(known, _)| *known == id)
        .map(|(_, props)| *props)
        .unwrap_or(BlockProperties::solid("unknown"))
}

/// Resolve a block id from its registry name.
pub fn block_id_by_name(name: &str) -> Option<BlockId> {
    KNOWN_BLOCKS
        .iter()
        .find(|(_, props)| props.name == name)
        .map(|(id, _)| *id)
}
