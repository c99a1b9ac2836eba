#![warn(missing_docs)]
//! Core primitives shared across the mirage workspace.

pub mod access;
pub mod dimension;
pub mod position;
pub mod registry;

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use access::{DimensionClassifier, TeleportHost, WorldMutation, WorldQuery};
pub use dimension::{DimensionId, TeleportContext};
pub use position::{BlockId, BlockPos, EntityId, EntityState};
pub use registry::{RegistryKey, RegistryKeyError, DEFAULT_NAMESPACE};

/// Fixed tick type (20 TPS => 50 ms per tick).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTick(pub u64);

impl SimTick {
    /// First tick in any deterministic timeline.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` ticks.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }
}

/// Reproducible RNG for one teleport resolution, seeded by world, entity and tick.
pub fn teleport_rng(world_seed: u64, entity: EntityId, tick: SimTick) -> StdRng {
    let seed = world_seed ^ entity.0.rotate_left(32) ^ tick.0;
    StdRng::seed_from_u64(seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn teleport_rng_is_reproducible() {
        let mut a = teleport_rng(42, EntityId(7), SimTick(100));
        let mut b = teleport_rng(42, EntityId(7), SimTick(100));
        let xs: Vec<u32> = (0..8).map(|_| a.gen()).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.gen()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn teleport_rng_differs_per_entity() {
        let mut a = teleport_rng(42, EntityId(1), SimTick(100));
        let mut b = teleport_rng(42, EntityId(2), SimTick(100));
        let xs: Vec<u64> = (0..4).map(|_| a.gen()).collect();
        let ys: Vec<u64> = (0..4).map(|_| b.gen()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn sim_tick_advances() {
        assert_eq!(SimTick::ZERO.advance(20), SimTick(20));
    }
}
