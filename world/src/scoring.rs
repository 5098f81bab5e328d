//! Progress boxes and overall completion.

use macrodata_core::{BoxId, Percentage, ProgressBoxSnapshot, BOX_COUNT};

/// Result of crediting a completed group to a box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ScoreUpdate {
    pub(crate) box_id: BoxId,
    pub(crate) box_completion: Percentage,
    pub(crate) overall: Percentage,
}

/// The five progress boxes. Values accumulate unrounded.
#[derive(Clone, Debug)]
pub(crate) struct Scoreboard {
    completions: [f64; BOX_COUNT],
}

impl Scoreboard {
    pub(crate) const fn new() -> Self {
        Self {
            completions: [0.0; BOX_COUNT],
        }
    }

    /// Adds `points` percentage points to `box_id`, clamped to 100.
    pub(crate) fn apply_completion(&mut self, box_id: BoxId, points: u32) -> ScoreUpdate {
        let slot = &mut self.completions[box_id.index()];
        *slot = (*slot + f64::from(points)).min(100.0);
        ScoreUpdate {
            box_id,
            box_completion: Percentage::new(*slot),
            overall: self.overall(),
        }
    }

    /// Mean of the five boxes, clamped to 100.
    pub(crate) fn overall(&self) -> Percentage {
        let total: f64 = self.completions.iter().sum();
        Percentage::new(total / BOX_COUNT as f64)
    }

    pub(crate) fn has_reached_full_completion(&self) -> bool {
        self.overall().is_full()
    }

    /// Completion of every box in display order.
    pub(crate) fn boxes(&self) -> impl Iterator<Item = (BoxId, Percentage)> + '_ {
        BoxId::ALL
            .into_iter()
            .map(|box_id| (box_id, Percentage::new(self.completions[box_id.index()])))
    }

    pub(crate) fn snapshots(&self) -> Vec<ProgressBoxSnapshot> {
        self.boxes()
            .map(|(id, completion)| ProgressBoxSnapshot {
                id,
                display_number: id.display_number(),
                completion,
            })
            .collect()
    }

    pub(crate) fn reset(&mut self) {
        self.completions = [0.0; BOX_COUNT];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_of_four_moves_overall_by_four_fifths() {
        let mut scoreboard = Scoreboard::new();
        let update = scoreboard.apply_completion(BoxId::ALL[3], 4);
        assert_eq!(update.box_completion.get(), 4.0);
        assert!((update.overall.get() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn box_credit_is_clamped() {
        let mut scoreboard = Scoreboard::new();
        let _ = scoreboard.apply_completion(BoxId::ALL[0], 95);
        let update = scoreboard.apply_completion(BoxId::ALL[0], 12);
        assert_eq!(update.box_completion, Percentage::FULL);
        assert_eq!(update.overall.get(), 20.0);
    }

    #[test]
    fn overall_is_mean_of_boxes_at_every_step() {
        let mut scoreboard = Scoreboard::new();
        for (step, box_id) in BoxId::ALL.iter().cycle().take(40).enumerate() {
            let points = u32::try_from(step % 7 + 1).expect("small");
            let update = scoreboard.apply_completion(*box_id, points);
            let mean: f64 = scoreboard
                .boxes()
                .map(|(_, completion)| completion.get())
                .sum::<f64>()
                / BOX_COUNT as f64;
            assert!((update.overall.get() - mean.min(100.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn full_completion_requires_every_box() {
        let mut scoreboard = Scoreboard::new();
        for box_id in BoxId::ALL.iter().take(4) {
            let _ = scoreboard.apply_completion(*box_id, 100);
        }
        assert!(!scoreboard.has_reached_full_completion());
        let _ = scoreboard.apply_completion(BoxId::ALL[4], 100);
        assert!(scoreboard.has_reached_full_completion());

        scoreboard.reset();
        assert_eq!(scoreboard.overall(), Percentage::ZERO);
        assert!(scoreboard.snapshots().iter().all(|snapshot| !snapshot.is_complete()));
    }
}
