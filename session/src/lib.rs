#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Owned game session wiring the world to its systems.
//!
//! A [`Session`] pumps every command through the authoritative world, hands
//! the resulting events to chain growth, animation dispatch and the victory
//! timer, and feeds the commands they emit back into the world until the
//! queue drains. Adapters interact only through the session surface: clicks,
//! animation completion handles, clock advances and read-only views.

mod config;
mod layout;
mod levels;

use std::{collections::VecDeque, mem};

use macrodata_core::{
    AnchorLayout, AnimationId, AnimationRequest, CellCoord, Command, Event, Generation, GridView,
    Level, Percentage, ProgressBoxSnapshot,
};
use macrodata_system_animation::AnimationDispatch;
use macrodata_system_chain_growth::{self as chain_growth, ChainGrowth};
use macrodata_system_victory::VictoryTimer;
use macrodata_world::{self as world, query, World, WorldError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

pub use config::{ConfigError, SessionConfig};
pub use layout::UniformLayout;
pub use levels::LevelCatalog;

const DEFAULT_CELL_PITCH: f32 = 24.0;

/// Failures surfaced by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The world rejected a command.
    #[error(transparent)]
    World(#[from] WorldError),
    /// The configuration was invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// One playthrough of the grid, owning all mutable game state.
#[derive(Debug)]
pub struct Session<L = UniformLayout> {
    world: World,
    chain_growth: ChainGrowth,
    animation: AnimationDispatch,
    victory: VictoryTimer,
    rng: ChaCha8Rng,
    layout: L,
    config: SessionConfig,
    catalog: LevelCatalog,
    level: Level,
    requests: Vec<AnimationRequest>,
    journal: Vec<Event>,
}

impl Session<UniformLayout> {
    /// Starts a session on the opening level using the default screen layout.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        let layout = UniformLayout::new(config.grid_size, DEFAULT_CELL_PITCH);
        Self::with_layout(config, layout)
    }
}

impl<L> Session<L>
where
    L: AnchorLayout,
{
    /// Starts a session on the opening level, resolving animation anchors through `layout`.
    pub fn with_layout(config: SessionConfig, layout: L) -> Result<Self, SessionError> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let catalog = LevelCatalog::default();
        let level = catalog.opening().clone();

        let mut session = Self {
            world: World::new(),
            chain_growth: ChainGrowth::new(chain_growth::Config::new(
                config.max_chain_length,
                config.max_failed_attempts,
            )),
            animation: AnimationDispatch::new(config.animation_stagger()),
            victory: VictoryTimer::new(config.victory_grace()),
            rng,
            layout,
            config,
            catalog,
            level,
            requests: Vec::new(),
            journal: Vec::new(),
        };
        session.start_level()?;
        Ok(session)
    }

    /// Handles a click on the cell at (`row`, `column`).
    ///
    /// Clicks on plain, counted, animating or already selected cells are
    /// absorbed and only recorded as [`Event::SelectionIgnored`].
    pub fn select_cell(&mut self, row: u32, column: u32) -> Result<(), SessionError> {
        self.execute(Command::SelectCell {
            cell: CellCoord::new(row, column),
        })
    }

    /// Reports that playback of the animation `id` finished.
    ///
    /// Returns `false` when the handle is unknown, was already reported, or
    /// belonged to a grid that has since been reset.
    pub fn complete_animation(&mut self, id: AnimationId) -> Result<bool, SessionError> {
        let Some(command) = self.animation.complete(id) else {
            warn!(animation = id.get(), "ignoring completion for unknown or stale animation");
            return Ok(false);
        };
        self.execute(command)?;
        Ok(true)
    }

    /// Advances the session clock, driving the victory grace delay.
    pub fn advance(&mut self, dt: std::time::Duration) -> Result<(), SessionError> {
        self.execute(Command::Tick { dt })
    }

    /// Moves to a random replay level with a fresh grid and zeroed progress.
    pub fn reset_game(&mut self) -> Result<(), SessionError> {
        self.level = self.catalog.pick_replay(&mut self.rng).clone();
        self.requests.clear();
        self.start_level()
    }

    /// Dismisses the victory dialog, resetting the game. Does nothing before victory.
    pub fn acknowledge_victory(&mut self) -> Result<bool, SessionError> {
        if !self.is_complete() {
            return Ok(false);
        }
        self.reset_game()?;
        Ok(true)
    }

    /// Drains animation requests issued since the last call.
    pub fn take_animation_requests(&mut self) -> Vec<AnimationRequest> {
        mem::take(&mut self.requests)
    }

    /// Drains every event applied since the last call.
    ///
    /// The journal keeps every applied event until it is drained, so adapters
    /// must call this regularly (once per frame for a renderer).
    pub fn take_events(&mut self) -> Vec<Event> {
        mem::take(&mut self.journal)
    }

    /// Read-only view of the grid for rendering.
    #[must_use]
    pub fn grid(&self) -> GridView<'_> {
        query::grid_view(&self.world)
    }

    /// Snapshots of the five progress boxes.
    #[must_use]
    pub fn progress_boxes(&self) -> Vec<ProgressBoxSnapshot> {
        query::progress_boxes(&self.world)
    }

    /// Overall completion across all boxes.
    #[must_use]
    pub fn completion_percentage(&self) -> Percentage {
        query::completion_percentage(&self.world)
    }

    /// Reports whether overall completion reached 100%.
    #[must_use]
    pub fn has_reached_full_completion(&self) -> bool {
        query::has_reached_full_completion(&self.world)
    }

    /// Reports whether the grace delay elapsed and the session is in its victory state.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        query::is_complete(&self.world)
    }

    /// Level currently being played.
    #[must_use]
    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Header line shown above the grid, e.g. `Cold Harbor 42% Complete`.
    #[must_use]
    pub fn header(&self) -> String {
        format!(
            "{} {}% Complete",
            self.level.name,
            self.completion_percentage().rounded()
        )
    }

    /// Generation of the current grid.
    #[must_use]
    pub fn generation(&self) -> Generation {
        query::generation(&self.world)
    }

    /// Number of animation handles awaiting completion.
    #[must_use]
    pub fn pending_animations(&self) -> usize {
        self.animation.pending_count()
    }

    /// Configuration the session was started with.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Authoritative world, for adapters that need the full query surface.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    fn start_level(&mut self) -> Result<(), SessionError> {
        let seed: u64 = self.rng.gen();
        info!(
            level = %self.level.name,
            size = self.config.grid_size,
            seed,
            "starting level"
        );
        self.execute(Command::InitializeGrid {
            size: self.config.grid_size,
            seed,
        })
    }

    fn execute(&mut self, command: Command) -> Result<(), SessionError> {
        let mut queue = VecDeque::from([command]);
        while let Some(command) = queue.pop_front() {
            let mut events = Vec::new();
            world::apply(&mut self.world, command, &mut events)?;
            if events.is_empty() {
                continue;
            }
            log_events(&events);

            let mut commands = Vec::new();
            self.chain_growth.handle(
                &events,
                query::grid_view(&self.world),
                &mut self.rng,
                &mut commands,
            );
            self.animation
                .handle(&events, &self.layout, &mut self.requests, &mut commands);
            self.victory.handle(&events, &mut commands);

            self.journal.extend(events);
            queue.extend(commands);
        }
        Ok(())
    }
}

fn log_events(events: &[Event]) {
    for event in events {
        match event {
            Event::GridInitialized {
                size,
                generation,
                roots,
            } => debug!(size, generation = generation.get(), roots, "grid initialized"),
            Event::SelectionIgnored { cell, reason } => trace!(
                row = cell.row(),
                column = cell.column(),
                ?reason,
                "selection ignored"
            ),
            Event::CellSelected { cell, group } => debug!(
                row = cell.row(),
                column = cell.column(),
                group = group.get(),
                "cell selected"
            ),
            Event::GroupFormed {
                group,
                members,
                assignment,
            } => debug!(
                group = group.get(),
                members,
                box_id = ?assignment.map(|assignment| assignment.box_id.display_number()),
                "group formed"
            ),
            Event::GroupCompleted {
                group, assignment, ..
            } => info!(
                group = group.get(),
                assigned = assignment.is_some(),
                "group completed"
            ),
            Event::ProgressUpdated {
                box_id, overall, ..
            } => debug!(
                box_id = %box_id.display_number(),
                overall = overall.get(),
                "progress updated"
            ),
            Event::FullCompletionReached => info!("full completion reached"),
            Event::StaleCountIgnored { cell, generation } => warn!(
                row = cell.row(),
                column = cell.column(),
                generation = generation.get(),
                "stale count ignored"
            ),
            Event::GameCompleted => info!("victory"),
            Event::GroupSeeded { .. } | Event::CellCounted { .. } | Event::TimeAdvanced { .. } => {}
        }
    }
}
