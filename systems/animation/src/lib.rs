#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turns completed groups into staggered per-cell animation requests.
//!
//! Each request carries the generation of the grid it was issued for. When the
//! playback collaborator reports a handle finished, [`AnimationDispatch::complete`]
//! yields the [`Command::CountCell`] that credits the cell in the world.

use std::{collections::BTreeMap, time::Duration};

use macrodata_core::{
    AnchorLayout, AnimationId, AnimationRequest, CellCoord, Command, Event, Generation, GroupId,
};

#[derive(Clone, Copy, Debug)]
struct Pending {
    cell: CellCoord,
    group: GroupId,
    generation: Generation,
}

/// Pure system tracking in-flight cell animations.
#[derive(Debug)]
pub struct AnimationDispatch {
    stagger: Duration,
    next_id: u64,
    pending: BTreeMap<AnimationId, Pending>,
}

impl AnimationDispatch {
    /// Creates a dispatcher that delays each member by `stagger` more than the previous one.
    #[must_use]
    pub fn new(stagger: Duration) -> Self {
        Self {
            stagger,
            next_id: 0,
            pending: BTreeMap::new(),
        }
    }

    /// Consumes world events, issuing animation requests and the commands that accompany them.
    ///
    /// Assigned groups produce one request per member plus a
    /// [`Command::MarkAnimating`]. Unassigned groups skip playback and are
    /// counted immediately.
    pub fn handle<L>(
        &mut self,
        events: &[Event],
        layout: &L,
        out_requests: &mut Vec<AnimationRequest>,
        out: &mut Vec<Command>,
    ) where
        L: AnchorLayout + ?Sized,
    {
        for event in events {
            match event {
                Event::GridInitialized { .. } => self.pending.clear(),
                Event::GroupCompleted {
                    group,
                    generation,
                    cells,
                    assignment,
                } => {
                    let Some(assignment) = assignment else {
                        out.extend(cells.iter().map(|completed| Command::CountCell {
                            cell: completed.cell,
                            group: *group,
                            generation: *generation,
                        }));
                        continue;
                    };

                    let end = layout.box_anchor(assignment.box_id);
                    for (index, completed) in cells.iter().enumerate() {
                        let id = self.allocate_id();
                        let _ = self.pending.insert(
                            id,
                            Pending {
                                cell: completed.cell,
                                group: *group,
                                generation: *generation,
                            },
                        );
                        let step = u32::try_from(index).unwrap_or(u32::MAX);
                        out_requests.push(AnimationRequest {
                            id,
                            generation: *generation,
                            cell: completed.cell,
                            box_id: assignment.box_id,
                            start: layout.cell_anchor(completed.cell),
                            end,
                            payload: completed.value.to_string(),
                            delay: self.stagger.saturating_mul(step),
                        });
                        out.push(Command::MarkAnimating {
                            cell: completed.cell,
                            generation: *generation,
                        });
                    }
                }
                _ => {}
            }
        }
    }

    /// Resolves a finished animation into the command that counts its cell.
    ///
    /// Returns `None` for unknown handles, handles already completed, and
    /// handles discarded by a grid reset.
    pub fn complete(&mut self, id: AnimationId) -> Option<Command> {
        let pending = self.pending.remove(&id)?;
        Some(Command::CountCell {
            cell: pending.cell,
            group: pending.group,
            generation: pending.generation,
        })
    }

    /// Number of requests still awaiting completion.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn allocate_id(&mut self) -> AnimationId {
        let id = AnimationId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use macrodata_core::{BoxId, CompletedCell, GroupAssignment, Point};

    struct FixedLayout;

    impl AnchorLayout for FixedLayout {
        fn cell_anchor(&self, cell: CellCoord) -> Point {
            Point::new(cell.column() as f32, cell.row() as f32)
        }

        fn box_anchor(&self, box_id: BoxId) -> Point {
            Point::new(box_id.index() as f32 * 100.0, 500.0)
        }
    }

    fn completed(assignment: Option<GroupAssignment>) -> Event {
        Event::GroupCompleted {
            group: GroupId::new(7),
            generation: Generation::new(1),
            cells: vec![
                CompletedCell {
                    cell: CellCoord::new(0, 0),
                    value: 4,
                },
                CompletedCell {
                    cell: CellCoord::new(0, 1),
                    value: 9,
                },
                CompletedCell {
                    cell: CellCoord::new(1, 1),
                    value: 0,
                },
            ],
            assignment,
        }
    }

    fn assigned() -> Option<GroupAssignment> {
        Some(GroupAssignment {
            box_id: BoxId::ALL[2],
            point_value: 3,
        })
    }

    #[test]
    fn requests_are_staggered_per_member() {
        let mut dispatch = AnimationDispatch::new(Duration::from_millis(50));
        let mut requests = Vec::new();
        let mut commands = Vec::new();
        dispatch.handle(&[completed(assigned())], &FixedLayout, &mut requests, &mut commands);

        assert_eq!(requests.len(), 3);
        let delays: Vec<_> = requests.iter().map(|request| request.delay).collect();
        assert_eq!(
            delays,
            vec![
                Duration::ZERO,
                Duration::from_millis(50),
                Duration::from_millis(100)
            ]
        );
        assert_eq!(requests[1].payload, "9");
        assert_eq!(requests[1].start, Point::new(1.0, 0.0));
        assert!(requests.iter().all(|request| request.end == Point::new(200.0, 500.0)));
        assert_eq!(commands.len(), 3, "each member is marked animating");
        assert_eq!(dispatch.pending_count(), 3);
    }

    #[test]
    fn completion_fires_once_per_handle() {
        let mut dispatch = AnimationDispatch::new(Duration::from_millis(50));
        let mut requests = Vec::new();
        let mut commands = Vec::new();
        dispatch.handle(&[completed(assigned())], &FixedLayout, &mut requests, &mut commands);

        let id = requests[0].id;
        assert_eq!(
            dispatch.complete(id),
            Some(Command::CountCell {
                cell: CellCoord::new(0, 0),
                group: GroupId::new(7),
                generation: Generation::new(1),
            })
        );
        assert_eq!(dispatch.complete(id), None, "duplicate completion must be a no-op");
        assert_eq!(dispatch.pending_count(), 2);
    }

    #[test]
    fn unassigned_group_is_counted_without_playback() {
        let mut dispatch = AnimationDispatch::new(Duration::from_millis(50));
        let mut requests = Vec::new();
        let mut commands = Vec::new();
        dispatch.handle(&[completed(None)], &FixedLayout, &mut requests, &mut commands);

        assert!(requests.is_empty());
        assert_eq!(commands.len(), 3);
        assert!(commands
            .iter()
            .all(|command| matches!(command, Command::CountCell { .. })));
    }

    #[test]
    fn grid_reset_discards_pending_handles() {
        let mut dispatch = AnimationDispatch::new(Duration::from_millis(50));
        let mut requests = Vec::new();
        let mut commands = Vec::new();
        dispatch.handle(&[completed(assigned())], &FixedLayout, &mut requests, &mut commands);
        dispatch.handle(
            &[Event::GridInitialized {
                size: 10,
                generation: Generation::new(2),
                roots: 1,
            }],
            &FixedLayout,
            &mut requests,
            &mut commands,
        );

        assert_eq!(dispatch.pending_count(), 0);
        assert!(requests.iter().all(|request| dispatch.complete(request.id).is_none()));
    }
}
