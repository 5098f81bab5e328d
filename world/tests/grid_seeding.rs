use std::collections::HashSet;

use macrodata_core::Command;
use macrodata_world::{self as world, query, World};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn seeding_places_floor_one_percent_distinct_roots(size in 1u32..120, seed in any::<u64>()) {
        let mut world = World::new();
        let mut events = Vec::new();
        world::apply(&mut world, Command::InitializeGrid { size, seed }, &mut events)
            .expect("positive size");

        let view = query::grid_view(&world);
        prop_assert_eq!(view.iter().count(), (size * size) as usize);

        let roots: HashSet<_> = view
            .iter()
            .filter(|cell| cell.root)
            .map(|cell| cell.coord)
            .collect();
        prop_assert_eq!(roots.len() as u64, u64::from(size) * u64::from(size) / 100);

        for cell in view.iter() {
            prop_assert_eq!(cell.scary, cell.root);
            prop_assert!(!cell.selected && !cell.revealed && !cell.counted && !cell.animating);
            prop_assert!(cell.group.is_none());
            prop_assert!(cell.value <= 9);
        }
    }

    #[test]
    fn identical_seeds_produce_identical_grids(size in 1u32..60, seed in any::<u64>()) {
        let grid = |seed: u64| {
            let mut world = World::new();
            let mut events = Vec::new();
            world::apply(&mut world, Command::InitializeGrid { size, seed }, &mut events)
                .expect("positive size");
            query::grid_view(&world).iter().copied().collect::<Vec<_>>()
        };
        prop_assert_eq!(grid(seed), grid(seed));
    }
}
