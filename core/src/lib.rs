#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Macrodata engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! views, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of progress boxes that partition overall completion.
pub const BOX_COUNT: usize = 5;

/// Fraction of grid cells seeded as root scary cells, expressed per hundred cells.
pub const ROOT_CELLS_PER_HUNDRED: u64 = 1;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Replaces the grid with a freshly seeded one and clears all session bookkeeping.
    InitializeGrid {
        /// Number of rows and columns in the square grid.
        size: u32,
        /// Seed driving digit values and root placement.
        seed: u64,
    },
    /// Player clicked the provided cell.
    SelectCell {
        /// Cell that received the click.
        cell: CellCoord,
    },
    /// Converts the listed cells into revealed members of a freshly seeded group.
    RevealChain {
        /// Group that the revealed cells join.
        group: GroupId,
        /// Cells to reveal, in growth order.
        cells: Vec<CellCoord>,
    },
    /// Flags a cell as visually in flight toward its progress box.
    MarkAnimating {
        /// Cell whose animation started.
        cell: CellCoord,
        /// Grid generation the animation was requested in.
        generation: Generation,
    },
    /// Marks a cell of a completed group as credited and removed from play.
    CountCell {
        /// Cell whose animation finished.
        cell: CellCoord,
        /// Group the cell belonged to when the animation was requested.
        group: GroupId,
        /// Grid generation the animation was requested in.
        generation: Generation,
    },
    /// Requests the transition into the victory state.
    EnterCompleteState,
    /// Advances the session clock by the provided delta time.
    Tick {
        /// Duration of time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a fresh grid replaced the previous one.
    GridInitialized {
        /// Number of rows and columns in the square grid.
        size: u32,
        /// Generation assigned to the new grid.
        generation: Generation,
        /// Number of root scary cells seeded.
        roots: u32,
    },
    /// Reports that a click was absorbed without changing any state.
    SelectionIgnored {
        /// Cell that received the click.
        cell: CellCoord,
        /// Why the click had no effect.
        reason: IgnoredSelection,
    },
    /// Announces that a root cell was clicked and now anchors a new group.
    GroupSeeded {
        /// Identifier allocated for the group.
        group: GroupId,
        /// Root cell that was clicked.
        root: CellCoord,
        /// Generation of the grid the group lives in.
        generation: Generation,
    },
    /// Confirms that chain growth finished and the group membership is final.
    GroupFormed {
        /// Identifier of the formed group.
        group: GroupId,
        /// Total number of member cells, root included.
        members: u32,
        /// Target box and point value, when a box could be assigned.
        assignment: Option<GroupAssignment>,
    },
    /// Confirms that a scary cell became selected.
    CellSelected {
        /// Cell that became selected.
        cell: CellCoord,
        /// Group the cell belongs to.
        group: GroupId,
    },
    /// Announces that every member of a group is selected.
    GroupCompleted {
        /// Identifier of the completed group.
        group: GroupId,
        /// Generation of the grid the group lives in.
        generation: Generation,
        /// Member cells together with their display digits.
        cells: Vec<CompletedCell>,
        /// Assignment credited by the completion, if any.
        assignment: Option<GroupAssignment>,
    },
    /// Reports the new percentages after a completion credited a box.
    ProgressUpdated {
        /// Box that received credit.
        box_id: BoxId,
        /// Completion of the credited box after the update.
        box_completion: Percentage,
        /// Overall completion after the update.
        overall: Percentage,
    },
    /// Announces that overall completion reached 100% for the first time.
    FullCompletionReached,
    /// Confirms that a cell finished its animation and was credited.
    CellCounted {
        /// Cell that was counted.
        cell: CellCoord,
        /// Group the cell belonged to.
        group: GroupId,
    },
    /// Reports that a completion handle referred to a grid that no longer exists.
    StaleCountIgnored {
        /// Cell named by the stale handle.
        cell: CellCoord,
        /// Generation carried by the stale handle.
        generation: Generation,
    },
    /// Announces that the session entered the victory state.
    GameCompleted,
    /// Indicates that the session clock advanced.
    TimeAdvanced {
        /// Duration of time that elapsed in the tick.
        dt: Duration,
    },
}

/// Reasons a click may be absorbed without effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IgnoredSelection {
    /// The cell is cosmetic only.
    NotScary,
    /// The cell was already selected.
    AlreadySelected,
    /// The cell was already credited to a box.
    AlreadyCounted,
    /// The cell is in flight toward its box.
    Animating,
    /// The cell is scary but belongs to no group and cannot start one.
    Ungrouped,
}

/// Location of a single grid cell expressed as row and column indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Reports whether two distinct cells touch horizontally, vertically or diagonally.
    #[must_use]
    pub fn is_moore_adjacent(self, other: CellCoord) -> bool {
        let row_diff = self.row.abs_diff(other.row);
        let column_diff = self.column.abs_diff(other.column);
        self != other && row_diff <= 1 && column_diff <= 1
    }
}

/// Enumerates the up-to-eight Moore neighbors of `cell` inside a `size`×`size` grid.
pub fn moore_neighbors(cell: CellCoord, size: u32) -> impl Iterator<Item = CellCoord> {
    const OFFSETS: [(i64, i64); 8] = [
        (-1, -1),
        (-1, 0),
        (-1, 1),
        (0, -1),
        (0, 1),
        (1, -1),
        (1, 0),
        (1, 1),
    ];

    let bound = i64::from(size);
    OFFSETS.into_iter().filter_map(move |(row_offset, column_offset)| {
        let row = i64::from(cell.row()) + row_offset;
        let column = i64::from(cell.column()) + column_offset;
        if row < 0 || column < 0 || row >= bound || column >= bound {
            return None;
        }
        Some(CellCoord::new(
            u32::try_from(row).ok()?,
            u32::try_from(column).ok()?,
        ))
    })
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    rows: u32,
    columns: u32,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and its extent.
    #[must_use]
    pub const fn new(origin: CellCoord, rows: u32, columns: u32) -> Self {
        Self {
            origin,
            rows,
            columns,
        }
    }

    /// Upper-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }
}

/// Identifier assigned to a group when its root is first clicked.
///
/// Identifiers are allocated from a counter owned by the world that survives
/// grid resets, so no identifier is ever handed out twice in a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(u64);

impl GroupId {
    /// Creates a new group identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Identifier of one of the five progress boxes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoxId(u8);

impl BoxId {
    /// Every progress box in display order.
    pub const ALL: [BoxId; BOX_COUNT] = [BoxId(0), BoxId(1), BoxId(2), BoxId(3), BoxId(4)];

    /// Zero-based position of the box in display order.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Two-digit label shown on the box, starting at "01".
    #[must_use]
    pub fn display_number(&self) -> String {
        format!("{:02}", u32::from(self.0) + 1)
    }
}

/// Counter bumped each time the grid is re-initialized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Generation(u32);

impl Generation {
    /// Creates a generation with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the generation.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Generation that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Percentage in the closed range `0.0..=100.0`, kept unrounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Percentage(f64);

impl Percentage {
    /// Zero percent.
    pub const ZERO: Percentage = Percentage(0.0);

    /// Full completion.
    pub const FULL: Percentage = Percentage(100.0);

    /// Creates a percentage, clamping the value into `0.0..=100.0`.
    #[must_use]
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 100.0))
    }

    /// Unrounded value.
    #[must_use]
    pub const fn get(&self) -> f64 {
        self.0
    }

    /// Value rounded to the nearest whole percent for presentation.
    #[must_use]
    pub fn rounded(&self) -> u32 {
        self.0.round() as u32
    }

    /// Reports whether the value reached 100%.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.0 >= 100.0
    }
}

/// Target box and credit recorded for a group when it forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupAssignment {
    /// Box that receives the group's credit.
    pub box_id: BoxId,
    /// Percentage points credited to the box once the group completes.
    pub point_value: u32,
}

/// Member of a completed group together with the digit it displays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompletedCell {
    /// Position of the member.
    pub cell: CellCoord,
    /// Digit rendered in the cell.
    pub value: u8,
}

/// Complete state of one grid position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Position of the cell inside the grid.
    pub coord: CellCoord,
    /// Cosmetic digit in `0..=9`.
    pub value: u8,
    /// Cell participates in play.
    pub scary: bool,
    /// Cell was seeded at initialization and starts a group when clicked.
    pub root: bool,
    /// Player clicked the cell after it became scary.
    pub selected: bool,
    /// Cell became scary through chain growth.
    pub revealed: bool,
    /// Group the cell belongs to, once assigned.
    pub group: Option<GroupId>,
    /// Cell was credited to a box; terminal.
    pub counted: bool,
    /// Cell is visually in flight toward its box.
    pub animating: bool,
}

impl Cell {
    /// Creates a plain cosmetic cell displaying `value`.
    #[must_use]
    pub const fn plain(coord: CellCoord, value: u8) -> Self {
        Self {
            coord,
            value,
            scary: false,
            root: false,
            selected: false,
            revealed: false,
            group: None,
            counted: false,
            animating: false,
        }
    }

    /// Reports whether a click on the cell can change any state.
    #[must_use]
    pub const fn is_interactive(&self) -> bool {
        self.scary && !self.counted && !self.animating && !self.selected
    }
}

/// Partial update applied to a single cell; `None` fields are left untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlagUpdate {
    /// New scary flag.
    pub scary: Option<bool>,
    /// New root flag.
    pub root: Option<bool>,
    /// New selected flag.
    pub selected: Option<bool>,
    /// New revealed flag.
    pub revealed: Option<bool>,
    /// Group to attach; a cell's group can be set once and never changed.
    pub group: Option<GroupId>,
    /// New counted flag.
    pub counted: Option<bool>,
    /// New animating flag.
    pub animating: Option<bool>,
}

/// Invariant violations rejected by the grid's single mutator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum FlagError {
    /// The update addressed a cell outside the grid.
    #[error("cell ({}, {}) lies outside the grid", .cell.row(), .cell.column())]
    OutOfBounds {
        /// Cell named by the update.
        cell: CellCoord,
    },
    /// Root cells must be scary.
    #[error("root cell ({}, {}) must be scary", .cell.row(), .cell.column())]
    RootWithoutScary {
        /// Offending cell.
        cell: CellCoord,
    },
    /// Only scary cells may be selected.
    #[error("cannot select non-scary cell ({}, {})", .cell.row(), .cell.column())]
    SelectedWithoutScary {
        /// Offending cell.
        cell: CellCoord,
    },
    /// Only selected cells may be counted.
    #[error("cannot count unselected cell ({}, {})", .cell.row(), .cell.column())]
    CountedWithoutSelection {
        /// Offending cell.
        cell: CellCoord,
    },
    /// A cell's group never changes once set.
    #[error(
        "cell ({}, {}) already belongs to group {}, refusing group {}",
        .cell.row(),
        .cell.column(),
        .current.get(),
        .requested.get()
    )]
    GroupReassigned {
        /// Offending cell.
        cell: CellCoord,
        /// Group the cell already belongs to.
        current: GroupId,
        /// Group the update tried to attach.
        requested: GroupId,
    },
    /// Scary cells stay scary for the lifetime of the grid.
    #[error("scary cell ({}, {}) cannot be made cosmetic", .cell.row(), .cell.column())]
    ScaryRevoked {
        /// Offending cell.
        cell: CellCoord,
    },
    /// Counted cells accept no further changes.
    #[error("counted cell ({}, {}) is terminal", .cell.row(), .cell.column())]
    CountedIsTerminal {
        /// Offending cell.
        cell: CellCoord,
    },
}

/// Read-only view into the dense cell grid.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    cells: &'a [Cell],
    size: u32,
}

impl<'a> GridView<'a> {
    /// Captures a new grid view backed by the provided row-major cell slice.
    #[must_use]
    pub fn new(cells: &'a [Cell], size: u32) -> Self {
        Self { cells, size }
    }

    /// Number of rows and columns in the grid.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Returns the cell at the provided coordinate, if it lies inside the grid.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<&'a Cell> {
        self.index(cell).and_then(|index| self.cells.get(index))
    }

    /// Iterates every cell in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Cell> + 'a {
        self.cells.iter()
    }

    /// Iterates the cells inside `rect`, clipped to the grid, in row-major order.
    pub fn region(&self, rect: CellRect) -> impl Iterator<Item = &'a Cell> + 'a {
        let cells = self.cells;
        let size = self.size;
        let origin = rect.origin();
        let row_end = origin.row().saturating_add(rect.rows()).min(size);
        let column_end = origin.column().saturating_add(rect.columns()).min(size);
        (origin.row()..row_end).flat_map(move |row| {
            (origin.column()..column_end).filter_map(move |column| {
                let index = usize::try_from(u64::from(row) * u64::from(size) + u64::from(column))
                    .ok()?;
                cells.get(index)
            })
        })
    }

    /// Enumerates the in-bounds Moore neighbors of `cell`.
    pub fn neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> {
        moore_neighbors(cell, self.size)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.row() < self.size && cell.column() < self.size {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.size).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Read-only description of one progress box for display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressBoxSnapshot {
    /// Identifier of the box.
    pub id: BoxId,
    /// Two-digit label shown on the box.
    pub display_number: String,
    /// Unrounded completion of the box.
    pub completion: Percentage,
}

impl ProgressBoxSnapshot {
    /// Reports whether the box is full.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completion.is_full()
    }
}

/// Named level drawn from the level catalog.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Level {
    /// Display name shown in the header.
    pub name: String,
    /// Stable slug derived from the name.
    pub id: String,
}

impl Level {
    /// Creates a level whose id is the lowercase, hyphenated form of `name`.
    #[must_use]
    pub fn named(name: &str) -> Self {
        let id = name
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("-");
        Self {
            name: name.to_owned(),
            id,
        }
    }
}

/// Point in screen space used as an animation endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Point {
    /// Creates a point from its coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Handle identifying one in-flight animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnimationId(u64);

impl AnimationId {
    /// Creates an animation handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Request for the playback collaborator to fly one cell into its box.
///
/// The collaborator reports the end of the transition by passing `id` back to
/// the session exactly once.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationRequest {
    /// Handle to report back on completion.
    pub id: AnimationId,
    /// Grid generation the request belongs to.
    pub generation: Generation,
    /// Cell being animated.
    pub cell: CellCoord,
    /// Box the cell flies to.
    pub box_id: BoxId,
    /// On-screen anchor of the cell.
    pub start: Point,
    /// On-screen anchor of the box.
    pub end: Point,
    /// Text carried along the path.
    pub payload: String,
    /// Delay before playback starts, staggering a group's members.
    pub delay: Duration,
}

/// Supplies on-screen anchors for animation endpoints.
pub trait AnchorLayout {
    /// Anchor of the provided grid cell.
    fn cell_anchor(&self, cell: CellCoord) -> Point;

    /// Anchor of the provided progress box.
    fn box_anchor(&self, box_id: BoxId) -> Point;
}
