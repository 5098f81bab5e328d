#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grace-delay timer that moves a fully completed session into its victory state.

use std::time::Duration;

use macrodata_core::{Command, Event};

/// Pure system that emits [`Command::EnterCompleteState`] once the grace delay elapses.
#[derive(Debug)]
pub struct VictoryTimer {
    grace: Duration,
    elapsed: Option<Duration>,
    announced: bool,
}

impl VictoryTimer {
    /// Creates a timer that waits `grace` after full completion before announcing victory.
    #[must_use]
    pub const fn new(grace: Duration) -> Self {
        Self {
            grace,
            elapsed: None,
            announced: false,
        }
    }

    /// Consumes events, advancing the countdown on [`Event::TimeAdvanced`].
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::GridInitialized { .. } => {
                    self.elapsed = None;
                    self.announced = false;
                }
                Event::FullCompletionReached if !self.announced => {
                    self.elapsed = Some(Duration::ZERO);
                }
                Event::TimeAdvanced { dt } => {
                    if let Some(elapsed) = self.elapsed.as_mut() {
                        *elapsed = elapsed.saturating_add(*dt);
                    }
                }
                _ => {}
            }

            if self.elapsed.is_some_and(|elapsed| elapsed >= self.grace) {
                self.elapsed = None;
                self.announced = true;
                out.push(Command::EnterCompleteState);
            }
        }
    }

    /// Reports whether the grace countdown is running.
    #[must_use]
    pub fn is_counting_down(&self) -> bool {
        self.elapsed.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use macrodata_core::Generation;

    fn tick(millis: u64) -> Event {
        Event::TimeAdvanced {
            dt: Duration::from_millis(millis),
        }
    }

    #[test]
    fn waits_for_grace_before_announcing() {
        let mut timer = VictoryTimer::new(Duration::from_millis(1_000));
        let mut out = Vec::new();

        timer.handle(&[tick(5_000)], &mut out);
        assert!(out.is_empty(), "no countdown before full completion");

        timer.handle(&[Event::FullCompletionReached], &mut out);
        assert!(timer.is_counting_down());
        timer.handle(&[tick(600)], &mut out);
        assert!(out.is_empty(), "grace not yet elapsed");

        timer.handle(&[tick(400)], &mut out);
        assert_eq!(out, vec![Command::EnterCompleteState]);
        assert!(!timer.is_counting_down());
    }

    #[test]
    fn announces_exactly_once() {
        let mut timer = VictoryTimer::new(Duration::from_millis(1_000));
        let mut out = Vec::new();
        timer.handle(&[Event::FullCompletionReached, tick(2_000)], &mut out);
        timer.handle(&[Event::FullCompletionReached, tick(2_000)], &mut out);
        assert_eq!(out, vec![Command::EnterCompleteState]);
    }

    #[test]
    fn zero_grace_announces_immediately() {
        let mut timer = VictoryTimer::new(Duration::ZERO);
        let mut out = Vec::new();
        timer.handle(&[Event::FullCompletionReached], &mut out);
        assert_eq!(out, vec![Command::EnterCompleteState]);
    }

    #[test]
    fn grid_reset_cancels_countdown() {
        let mut timer = VictoryTimer::new(Duration::from_millis(1_000));
        let mut out = Vec::new();
        timer.handle(&[Event::FullCompletionReached, tick(500)], &mut out);
        timer.handle(
            &[Event::GridInitialized {
                size: 10,
                generation: Generation::new(2),
                roots: 1,
            }],
            &mut out,
        );
        timer.handle(&[tick(5_000)], &mut out);
        assert!(out.is_empty());
        assert!(!timer.is_counting_down());
    }
}
