//! Terrain profiles for the reference world.
//!
//! Just enough shape to give landing searches something realistic to chew on:
//! rolling surface land with shallow water, a cavern shell with lava pockets,
//! and an empty void.

use crate::blocks::{
    BLOCK_AIR, BLOCK_BEDROCK, BLOCK_DIRT, BLOCK_GRASS, BLOCK_LAVA, BLOCK_SAND, BLOCK_STONE,
    BLOCK_WATER,
};
use crate::chunk::{Chunk, ChunkPos, LocalPos, CHUNK_SIZE_X, CHUNK_SIZE_Y, CHUNK_SIZE_Z};
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const SURFACE_FREQUENCY: f64 = 0.021;
const LAVA_FREQUENCY: f64 = 0.07;
const LAVA_THRESHOLD: f64 = 0.45;

/// Shape of a dimension's generated terrain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerrainProfile {
    /// Rolling land with grass over dirt over stone, flooded below `sea_level`.
    Surface {
        base_height: i32,
        amplitude: f64,
        sea_level: i32,
    },
    /// Solid stone with an open band `[floor, ceiling)`; some floor cells are lava.
    Cavern { floor: i32, ceiling: i32 },
    /// Nothing at all.
    Void,
}

impl Default for TerrainProfile {
    fn default() -> Self {
        Self::Surface {
            base_height: 64,
            amplitude: 6.0,
            sea_level: 60,
        }
    }
}

/// Per-column noise, sampled once per column.
struct Column {
    surface: i32,
    lava: bool,
}

/// Fills chunks according to a [`TerrainProfile`].
pub struct TerrainGenerator {
    world_seed: u64,
    profile: TerrainProfile,
    height_limit: i32,
    perlin: Perlin,
}

impl TerrainGenerator {
    /// Create a generator; `height_limit` caps every column.
    pub fn new(world_seed: u64, profile: TerrainProfile, height_limit: i32) -> Self {
        Self {
            world_seed,
            profile,
            height_limit: height_limit.clamp(1, CHUNK_SIZE_Y as i32),
            perlin: Perlin::new(world_seed as u32),
        }
    }

    /// Profile this generator was built with.
    pub fn profile(&self) -> &TerrainProfile {
        &self.profile
    }

    /// Generate a chunk. Void profiles yield an all-air chunk.
    #[instrument(skip(self), fields(chunk_pos = %chunk_pos, world_seed = self.world_seed))]
    pub fn generate_chunk(&self, chunk_pos: ChunkPos) -> Chunk {
        let mut chunk = Chunk::new(chunk_pos);
        let (origin_x, origin_z) = chunk_pos.origin();

        for local_z in 0..CHUNK_SIZE_Z {
            for local_x in 0..CHUNK_SIZE_X {
                let world_x = origin_x.saturating_add(local_x as i32);
                let world_z = origin_z.saturating_add(local_z as i32);
                let column = self.column(world_x, world_z);
                for y in 0..self.height_limit {
                    let block = self.block_at(&column, y);
                    if block != BLOCK_AIR {
                        chunk.set_block(
                            LocalPos {
                                x: local_x,
                                y: y as usize,
                                z: local_z,
                            },
                            block,
                        );
                    }
                }
            }
        }

        debug!(filled = chunk.filled_count(), "terrain generation complete");
        chunk
    }

    /// Column height of the surface profile at the given x/z.
    pub fn surface_height(&self, x: i32, z: i32) -> Option<i32> {
        match self.profile {
            TerrainProfile::Surface {
                base_height,
                amplitude,
                ..
            } => {
                let n = self
                    .perlin
                    .get([x as f64 * SURFACE_FREQUENCY, z as f64 * SURFACE_FREQUENCY]);
                let height = base_height.saturating_add((n * amplitude).round() as i32);
                Some(height.clamp(1, (self.height_limit - 1).max(1)))
            }
            _ => None,
        }
    }

    fn column(&self, x: i32, z: i32) -> Column {
        Column {
            surface: self.surface_height(x, z).unwrap_or(0),
            lava: matches!(self.profile, TerrainProfile::Cavern { .. })
                && self.is_lava_pocket(x, z),
        }
    }

    fn block_at(&self, column: &Column, y: i32) -> u16 {
        match self.profile {
            TerrainProfile::Void => BLOCK_AIR,
            TerrainProfile::Surface { sea_level, .. } => {
                let height = column.surface;
                if y == 0 {
                    BLOCK_BEDROCK
                } else if y < height - 3 {
                    BLOCK_STONE
                } else if y < height {
                    BLOCK_DIRT
                } else if y == height {
                    if height < sea_level {
                        BLOCK_SAND
                    } else {
                        BLOCK_GRASS
                    }
                } else if y <= sea_level {
                    BLOCK_WATER
                } else {
                    BLOCK_AIR
                }
            }
            TerrainProfile::Cavern { floor, ceiling } => {
                if y == 0 || y == self.height_limit - 1 {
                    BLOCK_BEDROCK
                } else if y == floor - 1 && column.lava {
                    BLOCK_LAVA
                } else if y >= floor && y < ceiling {
                    BLOCK_AIR
                } else {
                    BLOCK_STONE
                }
            }
        }
    }

    fn is_lava_pocket(&self, x: i32, z: i32) -> bool {
        let n = self
            .perlin
            .get([x as f64 * LAVA_FREQUENCY, 17.5, z as f64 * LAVA_FREQUENCY]);
        n > LAVA_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(chunk: &Chunk, x: usize, y: usize, z: usize) -> u16 {
        chunk.block(LocalPos { x, y, z })
    }

    #[test]
    fn void_profile_is_empty() {
        let generator = TerrainGenerator::new(1, TerrainProfile::Void, 256);
        let chunk = generator.generate_chunk(ChunkPos::new(3, -2));
        assert_eq!(chunk.filled_count(), 0);
    }

    #[test]
    fn surface_column_is_layered() {
        let generator = TerrainGenerator::new(7, TerrainProfile::default(), 256);
        let chunk = generator.generate_chunk(ChunkPos::new(0, 0));
        let height = generator.surface_height(0, 0).unwrap() as usize;
        assert_eq!(block(&chunk, 0, 0, 0), BLOCK_BEDROCK);
        assert!(matches!(block(&chunk, 0, height, 0), BLOCK_GRASS | BLOCK_SAND));
        assert_eq!(block(&chunk, 0, height - 1, 0), BLOCK_DIRT);
        assert_eq!(block(&chunk, 0, 100, 0), BLOCK_AIR);
    }

    #[test]
    fn cavern_has_open_band_and_shell() {
        let profile = TerrainProfile::Cavern {
            floor: 24,
            ceiling: 56,
        };
        let generator = TerrainGenerator::new(3, profile, 128);
        let chunk = generator.generate_chunk(ChunkPos::new(0, 0));
        for y in 24..56 {
            assert_eq!(block(&chunk, 4, y, 4), BLOCK_AIR);
        }
        assert_eq!(block(&chunk, 4, 56, 4), BLOCK_STONE);
        assert_eq!(block(&chunk, 4, 127, 4), BLOCK_BEDROCK);
        assert!(matches!(block(&chunk, 4, 23, 4), BLOCK_STONE | BLOCK_LAVA));
    }

    #[test]
    fn one_block_tall_dimensions_generate() {
        let surface = TerrainGenerator::new(1, TerrainProfile::default(), 1);
        assert_eq!(surface.surface_height(0, 0), Some(1));
        let chunk = surface.generate_chunk(ChunkPos::new(0, 0));
        assert_eq!(block(&chunk, 3, 0, 3), BLOCK_BEDROCK);
        assert_eq!(chunk.filled_count(), CHUNK_SIZE_X * CHUNK_SIZE_Z);

        let low = TerrainGenerator::new(1, TerrainProfile::default(), 2);
        assert_eq!(low.surface_height(5, 5), Some(1));

        let cavern = TerrainGenerator::new(
            1,
            TerrainProfile::Cavern {
                floor: 24,
                ceiling: 56,
            },
            1,
        );
        let chunk = cavern.generate_chunk(ChunkPos::new(-1, 0));
        assert_eq!(block(&chunk, 0, 0, 0), BLOCK_BEDROCK);
    }

    #[test]
    fn generation_is_deterministic() {
        let a = TerrainGenerator::new(99, TerrainProfile::default(), 256);
        let b = TerrainGenerator::new(99, TerrainProfile::default(), 256);
        for x in -20..20 {
            assert_eq!(a.surface_height(x, x * 3), b.surface_height(x, x * 3));
        }
    }

    #[test]
    fn profile_parses_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            terrain: TerrainProfile,
        }
        let parsed: Wrapper =
            toml::from_str("terrain = { kind = \"cavern\", floor = 20, ceiling = 50 }").unwrap();
        assert_eq!(
            parsed.terrain,
            TerrainProfile::Cavern {
                floor: 20,
                ceiling: 50
            }
        );
    }
}
