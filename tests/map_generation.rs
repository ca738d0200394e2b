//! Property-based tests for dungeon map growth.
//!
//! Invariants that must hold for every seed and size:
//! - generation succeeds and passes its own validation
//! - every room is reachable from the root through doors
//! - doors agree on both sides of every shared wall
//! - exactly one shop, on a dead end other than the root
//! - the same seed gives the same map

use proptest::prelude::*;
use reverie::generation::utils::create_rng;
use reverie::{Catalog, Direction, GenerationConfig, Generator, GrowthMapGenerator, MapGrid, RoomKind};

fn grow(seed: u64, grid_size: usize, initial_growth: u32) -> MapGrid {
    let catalog = Catalog::builtin();
    let config = GenerationConfig {
        seed,
        grid_size,
        initial_growth,
    };
    let mut rng = create_rng(&config);
    GrowthMapGenerator::new(&catalog)
        .generate(&config, &mut rng)
        .unwrap_or_else(|err| panic!("seed {seed} size {grid_size} growth {initial_growth}: {err}"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_any_seed_grows_connected_map(seed in any::<u64>(), grid_size in 3usize..=24, growth in 2u32..=30) {
        let map = grow(seed, grid_size, growth);
        let rooms: Vec<_> = map.rooms().map(|cell| cell.position).collect();

        prop_assert!(rooms.len() >= 2);
        prop_assert!(rooms.len() as u32 <= growth);
        prop_assert!(map.cells().all(|cell| cell.growth == 0));

        let reachable = map.reachable_from_root();
        prop_assert_eq!(reachable.len(), rooms.len());
        prop_assert!(rooms.iter().all(|position| reachable.contains(position)));
    }

    #[test]
    fn prop_doors_match_on_both_sides(seed in any::<u64>(), grid_size in 3usize..=24, growth in 2u32..=30) {
        let catalog = Catalog::builtin();
        let map = grow(seed, grid_size, growth);

        for cell in map.rooms() {
            let archetype = catalog.archetype(cell.archetype.as_deref().unwrap_or_default()).unwrap();
            prop_assert_eq!(archetype.doors, cell.doors);
            for direction in Direction::all() {
                let neighbor = map.room_beyond(cell.position, direction);
                prop_assert_eq!(cell.doors.has(direction), neighbor.is_some());
                if let Some(neighbor) = neighbor {
                    prop_assert!(neighbor.doors.has(direction.opposite()));
                }
            }
        }
    }

    #[test]
    fn prop_single_shop_on_dead_end(seed in any::<u64>(), growth in 2u32..=30) {
        let catalog = Catalog::builtin();
        let map = grow(seed, 40, growth);
        let shops: Vec<_> = map
            .rooms()
            .filter(|cell| {
                cell.archetype
                    .as_deref()
                    .and_then(|name| catalog.archetype(name).ok())
                    .is_some_and(|archetype| archetype.kind == RoomKind::Shop)
            })
            .collect();

        prop_assert_eq!(shops.len(), 1);
        prop_assert_eq!(Some(shops[0].position), map.shop());
        prop_assert_ne!(shops[0].position, map.root());
        prop_assert!(shops[0].doors.is_dead_end());
    }

    #[test]
    fn prop_generation_is_deterministic(seed in any::<u64>()) {
        prop_assert_eq!(grow(seed, 40, 15), grow(seed, 40, 15));
    }
}

#[test]
fn test_default_map_has_about_growth_rooms() {
    let config = GenerationConfig::default();
    let map = grow(config.seed, config.grid_size, config.initial_growth);
    let rooms = map.rooms().count() as u32;
    assert!((2..=config.initial_growth).contains(&rooms));
    assert_eq!(map.root().row, (config.grid_size - 1) / 2);
}
