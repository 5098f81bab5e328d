use std::time::Duration;

use macrodata_core::{AnchorLayout, BoxId, CellCoord, Command, Event, GroupId, Point};
use macrodata_system_animation::AnimationDispatch;
use macrodata_world::{self as world, query, World};

struct GridLayout;

impl AnchorLayout for GridLayout {
    fn cell_anchor(&self, cell: CellCoord) -> Point {
        Point::new(cell.column() as f32 * 10.0, cell.row() as f32 * 10.0)
    }

    fn box_anchor(&self, box_id: BoxId) -> Point {
        Point::new(box_id.index() as f32 * 50.0, 1_000.0)
    }
}

fn apply_all(world: &mut World, commands: Vec<Command>, events: &mut Vec<Event>) {
    for command in commands {
        world::apply(world, command, events).expect("command applies");
    }
}

/// Initializes a 10x10 grid and completes its single root as a one-cell group.
fn completed_single_cell_group(world: &mut World) -> (CellCoord, GroupId, Vec<Event>) {
    let mut events = Vec::new();
    world::apply(world, Command::InitializeGrid { size: 10, seed: 77 }, &mut events)
        .expect("grid initializes");
    let root = query::grid_view(world)
        .iter()
        .find(|cell| cell.root)
        .map(|cell| cell.coord)
        .expect("one root");
    world::apply(world, Command::SelectCell { cell: root }, &mut events).expect("in bounds");
    let group = query::cell(world, root)
        .and_then(|cell| cell.group)
        .expect("root grouped");
    world::apply(
        world,
        Command::RevealChain {
            group,
            cells: Vec::new(),
        },
        &mut events,
    )
    .expect("reveal applies");
    (root, group, events)
}

#[test]
fn finished_animation_counts_its_cell() {
    let mut world = World::new();
    let (root, group, events) = completed_single_cell_group(&mut world);

    let mut dispatch = AnimationDispatch::new(Duration::from_millis(50));
    let mut requests = Vec::new();
    let mut commands = Vec::new();
    dispatch.handle(&events, &GridLayout, &mut requests, &mut commands);
    assert_eq!(requests.len(), 1, "one request per member");

    let mut follow_up = Vec::new();
    apply_all(&mut world, commands, &mut follow_up);
    assert!(query::cell(&world, root).is_some_and(|cell| cell.animating));

    let count = dispatch.complete(requests[0].id).expect("pending handle");
    apply_all(&mut world, vec![count], &mut follow_up);
    assert!(follow_up.contains(&Event::CellCounted { cell: root, group }));

    let cell = query::cell(&world, root).expect("in bounds");
    assert!(cell.counted && !cell.animating);
}

#[test]
fn completion_after_reset_leaves_new_grid_untouched() {
    let mut world = World::new();
    let (_, _, events) = completed_single_cell_group(&mut world);

    let mut dispatch = AnimationDispatch::new(Duration::from_millis(50));
    let mut requests = Vec::new();
    let mut commands = Vec::new();
    dispatch.handle(&events, &GridLayout, &mut requests, &mut commands);
    let stale = requests[0].clone();

    let mut reset_events = Vec::new();
    world::apply(&mut world, Command::InitializeGrid { size: 10, seed: 78 }, &mut reset_events)
        .expect("grid initializes");
    dispatch.handle(&reset_events, &GridLayout, &mut requests, &mut commands);
    let before: Vec<_> = query::grid_view(&world).iter().copied().collect();

    assert!(dispatch.complete(stale.id).is_none());

    let mut late = Vec::new();
    world::apply(
        &mut world,
        Command::CountCell {
            cell: stale.cell,
            group: GroupId::new(0),
            generation: stale.generation,
        },
        &mut late,
    )
    .expect("stale count is absorbed");
    assert_eq!(
        late,
        vec![Event::StaleCountIgnored {
            cell: stale.cell,
            generation: stale.generation,
        }]
    );
    let after: Vec<_> = query::grid_view(&world).iter().copied().collect();
    assert_eq!(before, after, "stale completion mutated the new grid");
}
