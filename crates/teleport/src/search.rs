//! Randomized search for a safe landing spot.
//!
//! Each attempt picks a random column near the reference point and a random
//! starting height, drops down through air to the first non-air block, climbs
//! up out of whatever it hit, and then checks the safety predicate. The
//! number of attempts is capped so a hostile region (an ocean, a lava lake,
//! solid rock) can never stall the simulation tick.

use crate::error::SearchExhausted;
use mirage_core::{BlockPos, WorldQuery};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Half-open range `[min, max)` of starting heights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerticalBand {
    /// Lowest starting height.
    pub min: i32,
    /// One above the highest starting height.
    pub max: i32,
}

impl VerticalBand {
    /// Build a band.
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Uniform starting height; a degenerate band always yields `min`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        if self.max > self.min {
            rng.gen_range(self.min..self.max)
        } else {
            self.min
        }
    }
}

/// Tuning for [`SafeSpotSearch`]. Defaults reproduce the mirage book's
/// original behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchBounds {
    /// Horizontal offsets are drawn from `[-radius, radius)` on each axis.
    pub radius: i32,
    /// Starting heights in cave-like dimensions.
    pub subterranean_band: VerticalBand,
    /// Starting heights everywhere else.
    pub surface_band: VerticalBand,
    /// The downward scan stops at this height.
    pub floor_y: i32,
    /// The upward scan stops this far below the dimension's height limit.
    pub ceiling_margin: i32,
    /// Half-width of the square checked for liquids around a candidate.
    pub liquid_radius: i32,
    /// Attempts before the search gives up.
    pub max_attempts: u32,
}

impl Default for SearchBounds {
    fn default() -> Self {
        Self {
            radius: 32,
            subterranean_band: VerticalBand::new(20, 50),
            surface_band: VerticalBand::new(60, 80),
            floor_y: 1,
            ceiling_margin: 3,
            liquid_radius: 4,
            max_attempts: 50,
        }
    }
}

/// A safe spot and the attempt that found it (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpotFound {
    /// Block the entity will stand in.
    pub pos: BlockPos,
    /// Attempts used, including the successful one.
    pub attempts: u32,
}

/// Solid ground below, room for the feet and the head.
pub fn is_standable<W: WorldQuery + ?Sized>(world: &W, pos: BlockPos) -> bool {
    world.is_solid(pos.down()) && world.can_occupy(pos) && world.can_occupy(pos.up())
}

/// Any liquid in the `(2r+1)²` horizontal square around `pos` at its height.
pub fn has_liquid_nearby<W: WorldQuery + ?Sized>(world: &W, pos: BlockPos, radius: i32) -> bool {
    (-radius..=radius)
        .any(|dx| (-radius..=radius).any(|dz| world.is_liquid(pos.offset(dx, 0, dz))))
}

/// Full safety predicate used for both fresh searches and cached positions.
pub fn is_safe_landing<W: WorldQuery + ?Sized>(
    world: &W,
    pos: BlockPos,
    liquid_radius: i32,
) -> bool {
    is_standable(world, pos) && !has_liquid_nearby(world, pos, liquid_radius)
}

/// Bounded random search around a reference column.
pub struct SafeSpotSearch<'a> {
    bounds: &'a SearchBounds,
}

impl<'a> SafeSpotSearch<'a> {
    /// Search with the given bounds.
    pub fn new(bounds: &'a SearchBounds) -> Self {
        Self { bounds }
    }

    /// Look for a safe spot near `(origin_x, origin_z)`.
    ///
    /// `subterranean` selects the starting-height band. Returns
    /// [`SearchExhausted`] after `max_attempts` failed attempts.
    pub fn find<W, R>(
        &self,
        world: &W,
        origin_x: i32,
        origin_z: i32,
        subterranean: bool,
        rng: &mut R,
    ) -> Result<SpotFound, SearchExhausted>
    where
        W: WorldQuery + ?Sized,
        R: Rng + ?Sized,
    {
        let band = if subterranean {
            self.bounds.subterranean_band
        } else {
            self.bounds.surface_band
        };

        for attempt in 1..=self.bounds.max_attempts {
            let x = origin_x.saturating_add(self.horizontal_offset(rng));
            let z = origin_z.saturating_add(self.horizontal_offset(rng));
            let start = BlockPos::new(x, band.sample(rng), z);
            let candidate = self.settle(world, start);

            if is_safe_landing(world, candidate, self.bounds.liquid_radius) {
                trace!(attempt, %candidate, "found safe landing spot");
                return Ok(SpotFound {
                    pos: candidate,
                    attempts: attempt,
                });
            }
        }

        Err(SearchExhausted {
            attempts: self.bounds.max_attempts,
        })
    }

    fn horizontal_offset<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        let radius = self.bounds.radius;
        if radius > 0 {
            rng.gen_range(-radius..radius)
        } else {
            0
        }
    }

    /// Drop through air, then climb out of whatever was hit.
    fn settle<W: WorldQuery + ?Sized>(&self, world: &W, mut pos: BlockPos) -> BlockPos {
        while pos.y > self.bounds.floor_y && world.is_air(pos) {
            pos = pos.down();
        }

        let ceiling = world.height_limit() - self.bounds.ceiling_margin;
        while pos.y < ceiling && !world.is_air(pos) {
            pos = pos.up();
        }
        pos
    }
}
