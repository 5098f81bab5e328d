#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Randomized frontier expansion that grows a scary chain from a clicked root.
//!
//! The system reacts to [`Event::GroupSeeded`] by walking outward from the
//! root through Moore neighbors, claiming plain cells until the drawn target
//! length is reached or growth is boxed in. The chosen cells are returned as a
//! single [`Command::RevealChain`]; the world validates and applies them.

use std::collections::HashSet;

use macrodata_core::{CellCoord, Command, Event, GridView, GroupId};
use rand::Rng;

/// Configuration parameters required to construct the chain growth system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    max_chain_length: u32,
    max_failed_attempts: u32,
}

impl Config {
    /// Creates a configuration bounding chain length and boxed-in retries.
    #[must_use]
    pub const fn new(max_chain_length: u32, max_failed_attempts: u32) -> Self {
        Self {
            max_chain_length,
            max_failed_attempts,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(20, 100)
    }
}

/// Pure system that turns seeded groups into reveal commands.
#[derive(Debug)]
pub struct ChainGrowth {
    config: Config,
}

impl ChainGrowth {
    /// Creates a new chain growth system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Consumes events and the current grid view to emit reveal commands.
    pub fn handle<R>(
        &mut self,
        events: &[Event],
        grid: GridView<'_>,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        R: Rng + ?Sized,
    {
        for event in events {
            if let Event::GroupSeeded { group, root, .. } = event {
                out.push(self.grow(*group, *root, grid, rng));
            }
        }
    }

    /// Draws how many cells a chain should try to reveal.
    ///
    /// Squaring the uniform draw skews lengths toward short chains while
    /// keeping the result in `1..=max_chain_length`.
    pub fn target_length<R>(&self, rng: &mut R) -> u32
    where
        R: Rng + ?Sized,
    {
        let draw: f64 = rng.gen();
        let scaled = (draw * draw * f64::from(self.config.max_chain_length)).floor();
        let length = scaled as u32 + 1;
        length.clamp(1, self.config.max_chain_length.max(1))
    }

    fn grow<R>(&self, group: GroupId, root: CellCoord, grid: GridView<'_>, rng: &mut R) -> Command
    where
        R: Rng + ?Sized,
    {
        let target = self.target_length(rng);
        let mut members = vec![root];
        let mut claimed: HashSet<CellCoord> = HashSet::from([root]);
        let mut cells = Vec::new();
        let mut failed_attempts = 0;

        while cells.len() < target as usize && failed_attempts < self.config.max_failed_attempts {
            let from = members[rng.gen_range(0..members.len())];
            let candidates: Vec<CellCoord> = grid
                .neighbors(from)
                .filter(|neighbor| !claimed.contains(neighbor))
                .filter(|neighbor| {
                    grid.cell(*neighbor)
                        .is_some_and(|cell| !cell.scary && !cell.selected)
                })
                .collect();

            if candidates.is_empty() {
                failed_attempts += 1;
                continue;
            }

            let next = candidates[rng.gen_range(0..candidates.len())];
            let _ = claimed.insert(next);
            members.push(next);
            cells.push(next);
        }

        Command::RevealChain { group, cells }
    }
}
