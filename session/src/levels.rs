//! Named levels a session cycles through.

use macrodata_core::Level;
use rand::Rng;

const OPENING_LEVEL: &str = "Cold Harbor";

const REPLAY_LEVELS: [&str; 11] = [
    "Siena",
    "Nanning",
    "Narva",
    "Ocula",
    "Dranesville",
    "Allentown",
    "Tumwater",
    "Jesup",
    "Kingsport",
    "Labrador",
    "Loveland",
];

/// Fixed catalog of levels: one opening level plus the replay rotation.
#[derive(Clone, Debug)]
pub struct LevelCatalog {
    opening: Level,
    replays: Vec<Level>,
}

impl Default for LevelCatalog {
    fn default() -> Self {
        Self {
            opening: Level::named(OPENING_LEVEL),
            replays: REPLAY_LEVELS.iter().map(|name| Level::named(name)).collect(),
        }
    }
}

impl LevelCatalog {
    /// Level every session starts on.
    #[must_use]
    pub fn opening(&self) -> &Level {
        &self.opening
    }

    /// Draws a replay level uniformly. Never returns the opening level.
    pub fn pick_replay<R>(&self, rng: &mut R) -> &Level
    where
        R: Rng + ?Sized,
    {
        match self.replays.len() {
            0 => &self.opening,
            len => &self.replays[rng.gen_range(0..len)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn opening_level_is_cold_harbor() {
        let catalog = LevelCatalog::default();
        assert_eq!(catalog.opening().name, "Cold Harbor");
        assert_eq!(catalog.opening().id, "cold-harbor");
    }

    #[test]
    fn replays_exclude_the_opening_level() {
        let catalog = LevelCatalog::default();
        let mut rng = ChaCha8Rng::seed_from_u64(31);
        for _ in 0..500 {
            assert_ne!(catalog.pick_replay(&mut rng), catalog.opening());
        }
    }

    #[test]
    fn replays_reach_every_level() {
        let catalog = LevelCatalog::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..2_000 {
            let _ = seen.insert(catalog.pick_replay(&mut rng).id.clone());
        }
        assert_eq!(seen.len(), REPLAY_LEVELS.len());
    }
}
