//! Group membership, box assignment and completion tracking.

use std::collections::BTreeMap;

use macrodata_core::{BoxId, CellCoord, GroupAssignment, GroupId, BOX_COUNT};

use crate::{grid::Grid, scoring::Scoreboard};

/// Bookkeeping stored for one group.
#[derive(Clone, Debug)]
pub(crate) struct GroupRecord {
    /// Member cells in growth order, root first.
    pub(crate) members: Vec<CellCoord>,
    /// Box and credit recorded when the group formed.
    pub(crate) assignment: Option<GroupAssignment>,
    /// Chain growth finished and membership is final.
    pub(crate) formed: bool,
    /// Completion already fired for this group.
    pub(crate) completed: bool,
}

/// Registry that stores groups and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct GroupRegistry {
    entries: BTreeMap<GroupId, GroupRecord>,
    next_group: u64,
}

impl GroupRegistry {
    /// Creates an empty registry with a zeroed identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_group: 0,
        }
    }

    /// Allocates a fresh group rooted at `root`.
    ///
    /// The identifier counter is never rewound, including by [`GroupRegistry::clear`].
    pub(crate) fn seed(&mut self, root: CellCoord) -> GroupId {
        let group = GroupId::new(self.next_group);
        self.next_group = self.next_group.wrapping_add(1);
        let _ = self.entries.insert(
            group,
            GroupRecord {
                members: vec![root],
                assignment: None,
                formed: false,
                completed: false,
            },
        );
        group
    }

    pub(crate) fn get(&self, group: GroupId) -> Option<&GroupRecord> {
        self.entries.get(&group)
    }

    /// Appends a chain-grown member to a group that has not formed yet.
    pub(crate) fn push_member(&mut self, group: GroupId, cell: CellCoord) {
        if let Some(record) = self.entries.get_mut(&group) {
            if !record.formed {
                record.members.push(cell);
            }
        }
    }

    /// Freezes membership and records the group's box assignment.
    ///
    /// The box is the open box with the lowest projected completion, ties
    /// broken by the lowest box id. When every box is full the group stays
    /// unassigned. Reserved points of pending groups count toward the
    /// projection, otherwise every group formed before the first completion
    /// would land in box 01.
    pub(crate) fn form(
        &mut self,
        group: GroupId,
        scoreboard: &Scoreboard,
    ) -> Option<GroupAssignment> {
        let reserved = self.reserved_points();
        let record = self.entries.get_mut(&group)?;
        if record.formed {
            return record.assignment;
        }

        let point_value = u32::try_from(record.members.len()).unwrap_or(u32::MAX);
        record.assignment = select_box(scoreboard, &reserved).map(|box_id| GroupAssignment {
            box_id,
            point_value,
        });
        record.formed = true;
        record.assignment
    }

    /// Points promised to each box by assigned groups that have not completed yet.
    fn reserved_points(&self) -> [f64; BOX_COUNT] {
        let mut reserved = [0.0; BOX_COUNT];
        for record in self.entries.values() {
            if record.completed {
                continue;
            }
            if let Some(assignment) = record.assignment {
                reserved[assignment.box_id.index()] += f64::from(assignment.point_value);
            }
        }
        reserved
    }

    /// Reports whether the group formed, has members, and every member is selected.
    pub(crate) fn is_complete(&self, group: GroupId, grid: &Grid) -> bool {
        let Some(record) = self.entries.get(&group) else {
            return false;
        };
        record.formed
            && !record.members.is_empty()
            && record
                .members
                .iter()
                .all(|cell| grid.get(*cell).is_some_and(|cell| cell.selected))
    }

    /// Latches completion for the group, returning `true` only the first time.
    pub(crate) fn mark_completed(&mut self, group: GroupId) -> bool {
        match self.entries.get_mut(&group) {
            Some(record) if !record.completed => {
                record.completed = true;
                true
            }
            _ => false,
        }
    }

    /// Drops every group while keeping the identifier counter.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Picks the box that is not yet full with the lowest completion plus
/// `reserved` points; ties go to the lowest id.
pub(crate) fn select_box(scoreboard: &Scoreboard, reserved: &[f64; BOX_COUNT]) -> Option<BoxId> {
    scoreboard
        .boxes()
        .filter(|(_, completion)| !completion.is_full())
        .map(|(box_id, completion)| (box_id, completion.get() + reserved[box_id.index()]))
        .min_by(|(left_id, left), (right_id, right)| {
            left.total_cmp(right).then_with(|| left_id.cmp(right_id))
        })
        .map(|(box_id, _)| box_id)
}
