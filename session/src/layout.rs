//! Fixed-pitch screen geometry used when no renderer supplies its own anchors.

use macrodata_core::{AnchorLayout, BoxId, CellCoord, Point};

/// Lays cells out on a square pitch with the progress boxes in a row beneath the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformLayout {
    cell_pitch: f32,
    grid_size: u32,
    box_width: f32,
    box_gap: f32,
}

impl UniformLayout {
    /// Creates a layout for a `grid_size`×`grid_size` grid drawn at `cell_pitch` pixels per cell.
    #[must_use]
    pub const fn new(grid_size: u32, cell_pitch: f32) -> Self {
        Self {
            cell_pitch,
            grid_size,
            box_width: 120.0,
            box_gap: 16.0,
        }
    }

    fn grid_extent(&self) -> f32 {
        self.grid_size as f32 * self.cell_pitch
    }
}

impl AnchorLayout for UniformLayout {
    fn cell_anchor(&self, cell: CellCoord) -> Point {
        let half = self.cell_pitch / 2.0;
        Point::new(
            cell.column() as f32 * self.cell_pitch + half,
            cell.row() as f32 * self.cell_pitch + half,
        )
    }

    fn box_anchor(&self, box_id: BoxId) -> Point {
        let row_width = self.box_width * 5.0 + self.box_gap * 4.0;
        let left = (self.grid_extent() - row_width) / 2.0;
        let x = left
            + box_id.index() as f32 * (self.box_width + self.box_gap)
            + self.box_width / 2.0;
        Point::new(x, self.grid_extent() + self.box_gap + self.box_width / 4.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_anchor_is_cell_center() {
        let layout = UniformLayout::new(10, 20.0);
        assert_eq!(layout.cell_anchor(CellCoord::new(0, 0)), Point::new(10.0, 10.0));
        assert_eq!(layout.cell_anchor(CellCoord::new(2, 3)), Point::new(70.0, 50.0));
    }

    #[test]
    fn boxes_sit_below_grid_left_to_right() {
        let layout = UniformLayout::new(100, 10.0);
        let anchors: Vec<_> = BoxId::ALL.iter().map(|id| layout.box_anchor(*id)).collect();
        assert!(anchors.iter().all(|anchor| anchor.y > 1_000.0));
        assert!(anchors.windows(2).all(|pair| pair[0].x < pair[1].x));
        let middle = anchors[2].x;
        assert!((middle - 500.0).abs() < 1e-3, "row is centered under the grid");
    }
}
