#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid, group and score state for Macrodata.

mod grid;
mod groups;
mod scoring;

use macrodata_core::{
    CellCoord, Command, CompletedCell, Event, FlagError, FlagUpdate, Generation, GroupId,
    IgnoredSelection,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::{grid::Grid, groups::GroupRegistry, scoring::Scoreboard};

/// Contract violations reported by [`apply`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum WorldError {
    /// Grids must contain at least one cell.
    #[error("grid size must be positive, got {size}")]
    InvalidGridSize {
        /// Requested size.
        size: u32,
    },
    /// A command addressed a cell outside the grid.
    #[error("cell ({}, {}) lies outside the {size}x{size} grid", .cell.row(), .cell.column())]
    OutOfBounds {
        /// Cell named by the command.
        cell: CellCoord,
        /// Current grid size.
        size: u32,
    },
    /// A mutation would have broken a cell invariant.
    #[error(transparent)]
    Flag(#[from] FlagError),
}

/// Represents the authoritative Macrodata world state.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    groups: GroupRegistry,
    scoreboard: Scoreboard,
    generation: Generation,
    full_completion_reported: bool,
    complete: bool,
}

impl World {
    /// Creates a world with an empty grid, awaiting [`Command::InitializeGrid`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            grid: Grid::empty(),
            groups: GroupRegistry::new(),
            scoreboard: Scoreboard::new(),
            generation: Generation::default(),
            full_completion_reported: false,
            complete: false,
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Benign no-ops are reported through events; only contract violations
/// (invalid grid size, out-of-bounds clicks) return an error, and in that case
/// the world is left untouched.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), WorldError> {
    match command {
        Command::InitializeGrid { size, seed } => initialize_grid(world, size, seed, out_events),
        Command::SelectCell { cell } => select_cell(world, cell, out_events),
        Command::RevealChain { group, cells } => reveal_chain(world, group, &cells, out_events),
        Command::MarkAnimating { cell, generation } => {
            if generation != world.generation {
                return Ok(());
            }
            match world.grid.get(cell).copied() {
                Some(current) if current.selected && !current.counted => {
                    world.grid.set_flags(
                        cell,
                        FlagUpdate {
                            animating: Some(true),
                            ..FlagUpdate::default()
                        },
                    )?;
                }
                _ => {}
            }
            Ok(())
        }
        Command::CountCell {
            cell,
            group,
            generation,
        } => count_cell(world, cell, group, generation, out_events),
        Command::EnterCompleteState => {
            if !world.complete && world.scoreboard.has_reached_full_completion() {
                world.complete = true;
                out_events.push(Event::GameCompleted);
            }
            Ok(())
        }
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
            Ok(())
        }
    }
}

fn initialize_grid(
    world: &mut World,
    size: u32,
    seed: u64,
    out_events: &mut Vec<Event>,
) -> Result<(), WorldError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let grid = Grid::initialize(size, &mut rng)?;
    let roots = grid::root_count(size);

    world.grid = grid;
    world.groups.clear();
    world.scoreboard.reset();
    world.generation = world.generation.next();
    world.full_completion_reported = false;
    world.complete = false;

    out_events.push(Event::GridInitialized {
        size,
        generation: world.generation,
        roots: u32::try_from(roots).unwrap_or(u32::MAX),
    });
    Ok(())
}

fn select_cell(
    world: &mut World,
    cell: CellCoord,
    out_events: &mut Vec<Event>,
) -> Result<(), WorldError> {
    let Some(current) = world.grid.get(cell).copied() else {
        return Err(WorldError::OutOfBounds {
            cell,
            size: world.grid.size(),
        });
    };

    let ignored = |reason: IgnoredSelection| Event::SelectionIgnored { cell, reason };

    if !current.is_interactive() {
        let reason = if !current.scary {
            IgnoredSelection::NotScary
        } else if current.counted {
            IgnoredSelection::AlreadyCounted
        } else if current.animating {
            IgnoredSelection::Animating
        } else {
            IgnoredSelection::AlreadySelected
        };
        out_events.push(ignored(reason));
        return Ok(());
    }

    match current.group {
        None if current.root => {
            let group = world.groups.seed(cell);
            world.grid.set_flags(
                cell,
                FlagUpdate {
                    group: Some(group),
                    selected: Some(true),
                    ..FlagUpdate::default()
                },
            )?;
            out_events.push(Event::GroupSeeded {
                group,
                root: cell,
                generation: world.generation,
            });
            out_events.push(Event::CellSelected { cell, group });
        }
        None => out_events.push(ignored(IgnoredSelection::Ungrouped)),
        Some(group) => {
            world.grid.set_flags(
                cell,
                FlagUpdate {
                    selected: Some(true),
                    ..FlagUpdate::default()
                },
            )?;
            out_events.push(Event::CellSelected { cell, group });
            resolve_completion(world, group, out_events);
        }
    }
    Ok(())
}

fn reveal_chain(
    world: &mut World,
    group: GroupId,
    cells: &[CellCoord],
    out_events: &mut Vec<Event>,
) -> Result<(), WorldError> {
    match world.groups.get(group) {
        Some(record) if !record.formed => {}
        _ => return Ok(()),
    }

    for &cell in cells {
        let Some(candidate) = world.grid.get(cell) else {
            continue;
        };
        if candidate.scary || candidate.selected {
            continue;
        }
        let Some(record) = world.groups.get(group) else {
            break;
        };
        let touches_member = world
            .grid
            .neighbors(cell)
            .any(|neighbor| record.members.contains(&neighbor));
        if !touches_member {
            tracing::warn!(
                group = group.get(),
                row = cell.row(),
                column = cell.column(),
                "skipping reveal detached from its group"
            );
            continue;
        }

        world.grid.set_flags(
            cell,
            FlagUpdate {
                scary: Some(true),
                revealed: Some(true),
                root: Some(false),
                group: Some(group),
                ..FlagUpdate::default()
            },
        )?;
        world.groups.push_member(group, cell);
    }

    let assignment = world.groups.form(group, &world.scoreboard);
    let members = world
        .groups
        .get(group)
        .map_or(0, |record| record.members.len());
    out_events.push(Event::GroupFormed {
        group,
        members: u32::try_from(members).unwrap_or(u32::MAX),
        assignment,
    });

    resolve_completion(world, group, out_events);
    Ok(())
}

fn resolve_completion(world: &mut World, group: GroupId, out_events: &mut Vec<Event>) {
    if !world.groups.is_complete(group, &world.grid) {
        return;
    }
    if !world.groups.mark_completed(group) {
        return;
    }
    let Some(record) = world.groups.get(group) else {
        return;
    };

    let cells = record
        .members
        .iter()
        .map(|cell| CompletedCell {
            cell: *cell,
            value: world.grid.cell(*cell).value,
        })
        .collect();
    let assignment = record.assignment;

    out_events.push(Event::GroupCompleted {
        group,
        generation: world.generation,
        cells,
        assignment,
    });

    let Some(assignment) = assignment else {
        return;
    };
    let update = world
        .scoreboard
        .apply_completion(assignment.box_id, assignment.point_value);
    out_events.push(Event::ProgressUpdated {
        box_id: update.box_id,
        box_completion: update.box_completion,
        overall: update.overall,
    });

    if update.overall.is_full() && !world.full_completion_reported {
        world.full_completion_reported = true;
        out_events.push(Event::FullCompletionReached);
    }
}

fn count_cell(
    world: &mut World,
    cell: CellCoord,
    group: GroupId,
    generation: Generation,
    out_events: &mut Vec<Event>,
) -> Result<(), WorldError> {
    if generation != world.generation {
        out_events.push(Event::StaleCountIgnored { cell, generation });
        return Ok(());
    }

    let Some(current) = world.grid.get(cell) else {
        return Ok(());
    };
    if current.counted || current.group != Some(group) || !current.selected {
        return Ok(());
    }

    world.grid.set_flags(
        cell,
        FlagUpdate {
            counted: Some(true),
            animating: Some(false),
            ..FlagUpdate::default()
        },
    )?;
    out_events.push(Event::CellCounted { cell, group });
    Ok(())
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use macrodata_core::{
        Cell, CellCoord, Generation, GridView, GroupAssignment, GroupId, Percentage,
        ProgressBoxSnapshot,
    };

    /// Exposes a read-only view of every cell.
    #[must_use]
    pub fn grid_view(world: &World) -> GridView<'_> {
        world.grid.view()
    }

    /// Returns a copy of the cell at `cell`, if it lies inside the grid.
    #[must_use]
    pub fn cell(world: &World, cell: CellCoord) -> Option<Cell> {
        world.grid.get(cell).copied()
    }

    /// Number of rows and columns in the current grid.
    #[must_use]
    pub fn grid_size(world: &World) -> u32 {
        world.grid.size()
    }

    /// Generation of the current grid.
    #[must_use]
    pub fn generation(world: &World) -> Generation {
        world.generation
    }

    /// Member cells of a group, root first.
    #[must_use]
    pub fn group_members(world: &World, group: GroupId) -> Option<&[CellCoord]> {
        world
            .groups
            .get(group)
            .map(|record| record.members.as_slice())
    }

    /// Box assignment recorded for a group, if it formed with one.
    #[must_use]
    pub fn group_assignment(world: &World, group: GroupId) -> Option<GroupAssignment> {
        world.groups.get(group).and_then(|record| record.assignment)
    }

    /// Reports whether every member of a formed group is selected.
    #[must_use]
    pub fn is_group_complete(world: &World, group: GroupId) -> bool {
        world.groups.is_complete(group, &world.grid)
    }

    /// Display snapshots of the five progress boxes.
    #[must_use]
    pub fn progress_boxes(world: &World) -> Vec<ProgressBoxSnapshot> {
        world.scoreboard.snapshots()
    }

    /// Overall completion, the mean of the five boxes.
    #[must_use]
    pub fn completion_percentage(world: &World) -> Percentage {
        world.scoreboard.overall()
    }

    /// Reports whether overall completion reached 100%.
    #[must_use]
    pub fn has_reached_full_completion(world: &World) -> bool {
        world.scoreboard.has_reached_full_completion()
    }

    /// Reports whether the session entered the victory state.
    #[must_use]
    pub fn is_complete(world: &World) -> bool {
        world.complete
    }
}
