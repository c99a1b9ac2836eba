//! Mirage Trips Worldtest
//!
//! Drives a player through a sequence of book trips across generated
//! dimensions and checks the teleport memory end to end:
//! - Leaving a dimension caches the departure block
//! - Returning by book lands on the cached block while it stays safe
//! - Hopping between mirage dimensions re-targets the return trip
//! - Void platforms persist and are reused by the cache
//! - A persisted record restores the same behaviour

use glam::DVec3;
use mirage_core::{
    BlockPos, DimensionId, EntityId, EntityState, RegistryKey, SimTick, TeleportContext,
    TeleportHost,
};
use mirage_teleport::{
    DestinationTable, DimensionClass, DimensionRegistry, PlacementStrategy, PlayerTeleportRecord,
    PositionCache, TeleportCoordinator, TeleportSettings,
};
use mirage_world::{TerrainProfile, VoxelWorld, BLOCK_GRASS, BLOCK_STONE};
use rand::rngs::StdRng;
use rand::SeedableRng;

const WORLD_SEED: u64 = 0x5EED_CAFE;
const PLAYER: EntityId = EntityId(1);

fn dim(path: &str) -> DimensionId {
    DimensionId::parse(path).unwrap()
}

fn book(path: &str) -> RegistryKey {
    RegistryKey::parse(path).unwrap()
}

fn setup() -> (VoxelWorld, TeleportCoordinator<DimensionRegistry>) {
    let mut world = VoxelWorld::new(WORLD_SEED);
    let overworld = world.add_dimension(DimensionId::overworld(), 256, TerrainProfile::Void);
    overworld.fill(BlockPos::new(-40, 58, -40), BlockPos::new(40, 62, 40), BLOCK_STONE);
    overworld.fill(BlockPos::new(-40, 63, -40), BlockPos::new(40, 63, 40), BLOCK_GRASS);
    world.add_dimension(
        dim("caveland"),
        128,
        TerrainProfile::Cavern {
            floor: 24,
            ceiling: 56,
        },
    );
    world.add_dimension(dim("the_void"), 256, TerrainProfile::Void);
    world.spawn_entity(EntityState {
        id: PLAYER,
        dimension: DimensionId::overworld(),
        position: DVec3::new(4.5, 64.0, -3.5),
        yaw: 45.0,
        pitch: 0.0,
    });

    let registry = DimensionRegistry::from_classes([
        DimensionClass {
            id: dim("caveland"),
            mirage: true,
            subterranean: true,
        },
        DimensionClass {
            id: dim("the_void"),
            mirage: true,
            subterranean: false,
        },
    ]);
    let coordinator = TeleportCoordinator::new(
        TeleportSettings::default(),
        registry,
        DestinationTable::mirage_books(),
    );
    (world, coordinator)
}

#[test]
fn mirage_trips_worldtest() {
    let (mut world, coordinator) = setup();
    let mut cache = PositionCache::new();
    let mut rng = StdRng::seed_from_u64(WORLD_SEED);
    let context = TeleportContext::mirage_worlds();
    let home = BlockPos::new(4, 64, -4);

    // Trip 1: overworld -> the_void -> overworld.
    let out = coordinator
        .try_request_teleport(&mut world, &mut cache, PLAYER, Some(&dim("the_void")), &mut rng)
        .unwrap();
    assert_eq!(out.strategy, PlacementStrategy::Void);
    assert_eq!(out.pos, BlockPos::new(4, 1, -4));

    let back = coordinator
        .try_use_mirage_book(
            &mut world,
            &mut cache,
            PLAYER,
            &book("the_void"),
            SimTick(100),
            &mut rng,
        )
        .unwrap();
    assert_eq!(back.strategy, PlacementStrategy::Cache);
    assert_eq!(back.pos, home);

    // Trip 2: the platform from trip 1 is still there and remembered.
    let again = coordinator
        .try_request_teleport(&mut world, &mut cache, PLAYER, Some(&dim("the_void")), &mut rng)
        .unwrap();
    assert_eq!(again.strategy, PlacementStrategy::Cache);
    assert_eq!(again.pos, out.pos);

    // Hop the_void -> caveland: the return target becomes the_void.
    let cave = coordinator
        .try_request_teleport(&mut world, &mut cache, PLAYER, Some(&dim("caveland")), &mut rng)
        .unwrap();
    assert_ne!(cave.strategy, PlacementStrategy::Cache);
    assert_eq!(
        cache.last_dimension(PLAYER, &context, None),
        Some(dim("the_void"))
    );
    if cave.strategy == PlacementStrategy::Search {
        assert!((24..56).contains(&cave.pos.y));
    }

    // The void book does nothing in caveland.
    assert!(!coordinator.use_mirage_book(
        &mut world,
        &mut cache,
        PLAYER,
        &book("the_void"),
        SimTick(200),
        &mut rng
    ));

    let hop_back = coordinator
        .try_use_mirage_book(
            &mut world,
            &mut cache,
            PLAYER,
            &book("caveland"),
            SimTick(300),
            &mut rng,
        )
        .unwrap();
    assert_eq!(hop_back.dimension, dim("the_void"));
    assert_eq!(hop_back.strategy, PlacementStrategy::Cache);
    assert_eq!(hop_back.pos, out.pos);
    assert_eq!(
        cache.last_teleport_tick(PLAYER, &dim("caveland")),
        Some(SimTick(300))
    );

    // Persist, restore into a fresh cache, and keep going.
    let blob = cache.record(PLAYER).unwrap().serialize().unwrap();
    let mut restored = PositionCache::new();
    restored.insert_record(PLAYER, PlayerTeleportRecord::deserialize(&blob).unwrap());
    assert_eq!(restored.record(PLAYER), cache.record(PLAYER));

    let home_again = coordinator
        .try_use_mirage_book(
            &mut world,
            &mut restored,
            PLAYER,
            &book("the_void"),
            SimTick(400),
            &mut rng,
        )
        .unwrap();
    assert_eq!(home_again.dimension, dim("caveland"));
    let state = world.entity(PLAYER).unwrap();
    assert_eq!(state.dimension, dim("caveland"));
    assert_eq!((state.yaw, state.pitch), (45.0, 0.0));
}

#[test]
fn same_seed_same_trips() {
    let run = || {
        let (mut world, coordinator) = setup();
        let mut cache = PositionCache::new();
        let mut rng = StdRng::seed_from_u64(99);
        let mut landings = Vec::new();
        for target in ["caveland", "the_void", "caveland"] {
            let placement = coordinator
                .try_request_teleport(&mut world, &mut cache, PLAYER, Some(&dim(target)), &mut rng)
                .unwrap();
            landings.push((placement.dimension, placement.pos, placement.strategy));
        }
        (landings, cache.record(PLAYER).unwrap().serialize().unwrap())
    };

    assert_eq!(run(), run());
}
