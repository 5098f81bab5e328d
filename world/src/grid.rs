//! Authoritative cell matrix and its single mutator.

use std::collections::HashSet;

use macrodata_core::{
    moore_neighbors, Cell, CellCoord, FlagError, FlagUpdate, GridView, ROOT_CELLS_PER_HUNDRED,
};
use rand::Rng;

use crate::WorldError;

/// Dense row-major grid of cells.
#[derive(Clone, Debug)]
pub(crate) struct Grid {
    size: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Grid with no cells, used before the first initialization.
    pub(crate) const fn empty() -> Self {
        Self {
            size: 0,
            cells: Vec::new(),
        }
    }

    /// Allocates a `size`×`size` grid of random digits with root cells seeded at
    /// distinct positions.
    pub(crate) fn initialize<R: Rng>(size: u32, rng: &mut R) -> Result<Self, WorldError> {
        if size == 0 {
            return Err(WorldError::InvalidGridSize { size });
        }

        let total = u64::from(size) * u64::from(size);
        let capacity = usize::try_from(total).map_err(|_| WorldError::InvalidGridSize { size })?;

        let mut cells = Vec::with_capacity(capacity);
        for row in 0..size {
            for column in 0..size {
                let value: u8 = rng.gen_range(0..10);
                cells.push(Cell::plain(CellCoord::new(row, column), value));
            }
        }

        let roots = root_count(size);
        let mut seeded: HashSet<usize> = HashSet::with_capacity(roots);
        while seeded.len() < roots {
            let index = rng.gen_range(0..capacity);
            if !seeded.insert(index) {
                continue;
            }
            let cell = &mut cells[index];
            cell.scary = true;
            cell.root = true;
        }

        Ok(Self { size, cells })
    }

    /// Number of rows and columns.
    pub(crate) const fn size(&self) -> u32 {
        self.size
    }

    /// Reads the cell at `coord`.
    ///
    /// # Panics
    ///
    /// Panics when `coord` lies outside the grid. Callers clamp against
    /// [`Grid::size`] first.
    pub(crate) fn cell(&self, coord: CellCoord) -> &Cell {
        match self.index(coord) {
            Some(index) => &self.cells[index],
            None => panic!(
                "cell ({}, {}) read outside {}x{} grid",
                coord.row(),
                coord.column(),
                self.size,
                self.size
            ),
        }
    }

    /// Reads the cell at `coord`, returning `None` outside the grid.
    pub(crate) fn get(&self, coord: CellCoord) -> Option<&Cell> {
        self.index(coord).map(|index| &self.cells[index])
    }

    /// In-bounds Moore neighbors of `coord`.
    pub(crate) fn neighbors(&self, coord: CellCoord) -> impl Iterator<Item = CellCoord> {
        moore_neighbors(coord, self.size)
    }

    /// Applies a partial flag update to one cell after validating every cell invariant.
    pub(crate) fn set_flags(
        &mut self,
        coord: CellCoord,
        update: FlagUpdate,
    ) -> Result<(), FlagError> {
        let index = self
            .index(coord)
            .ok_or(FlagError::OutOfBounds { cell: coord })?;
        let current = self.cells[index];
        let mut next = current;

        if let Some(scary) = update.scary {
            next.scary = scary;
        }
        if let Some(root) = update.root {
            next.root = root;
        }
        if let Some(selected) = update.selected {
            next.selected = selected;
        }
        if let Some(revealed) = update.revealed {
            next.revealed = revealed;
        }
        if let Some(counted) = update.counted {
            next.counted = counted;
        }
        if let Some(animating) = update.animating {
            next.animating = animating;
        }
        if let Some(requested) = update.group {
            match current.group {
                Some(existing) if existing != requested => {
                    return Err(FlagError::GroupReassigned {
                        cell: coord,
                        current: existing,
                        requested,
                    });
                }
                _ => next.group = Some(requested),
            }
        }

        if current.counted && next != current {
            return Err(FlagError::CountedIsTerminal { cell: coord });
        }
        if current.scary && !next.scary {
            return Err(FlagError::ScaryRevoked { cell: coord });
        }
        if next.root && !next.scary {
            return Err(FlagError::RootWithoutScary { cell: coord });
        }
        if next.selected && !next.scary {
            return Err(FlagError::SelectedWithoutScary { cell: coord });
        }
        if next.counted && !next.selected {
            return Err(FlagError::CountedWithoutSelection { cell: coord });
        }

        self.cells[index] = next;
        Ok(())
    }

    /// Read-only view over every cell.
    pub(crate) fn view(&self) -> GridView<'_> {
        GridView::new(&self.cells, self.size)
    }

    fn index(&self, coord: CellCoord) -> Option<usize> {
        if coord.row() < self.size && coord.column() < self.size {
            let row = usize::try_from(coord.row()).ok()?;
            let column = usize::try_from(coord.column()).ok()?;
            let width = usize::try_from(self.size).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Number of root cells seeded into a `size`×`size` grid: `floor(size² · 0.01)`.
pub(crate) fn root_count(size: u32) -> usize {
    let total = u64::from(size) * u64::from(size);
    let roots = total * ROOT_CELLS_PER_HUNDRED / 100;
    usize::try_from(roots).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use macrodata_core::GroupId;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn grid(size: u32) -> Grid {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        Grid::initialize(size, &mut rng).expect("valid size")
    }

    fn first_plain(grid: &Grid) -> CellCoord {
        grid.view()
            .iter()
            .find(|cell| !cell.scary)
            .map(|cell| cell.coord)
            .expect("grid has a plain cell")
    }

    fn first_root(grid: &Grid) -> CellCoord {
        grid.view()
            .iter()
            .find(|cell| cell.root)
            .map(|cell| cell.coord)
            .expect("grid has a root cell")
    }

    #[test]
    fn zero_size_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(matches!(
            Grid::initialize(0, &mut rng),
            Err(WorldError::InvalidGridSize { size: 0 })
        ));
    }

    #[test]
    fn root_count_floors_one_percent() {
        assert_eq!(root_count(1), 0);
        assert_eq!(root_count(9), 0);
        assert_eq!(root_count(10), 1);
        assert_eq!(root_count(15), 2);
        assert_eq!(root_count(100), 100);
    }

    #[test]
    fn initialization_seeds_only_root_flags() {
        let grid = grid(30);
        let roots: Vec<_> = grid.view().iter().filter(|cell| cell.root).collect();
        assert_eq!(roots.len(), 9);
        for cell in grid.view().iter() {
            assert_eq!(cell.scary, cell.root);
            assert!(!cell.selected && !cell.revealed && !cell.counted && !cell.animating);
            assert!(cell.group.is_none());
            assert!(cell.value <= 9);
        }
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn out_of_range_read_fails_fast() {
        let grid = grid(10);
        let _ = grid.cell(CellCoord::new(10, 0));
    }

    #[test]
    fn selecting_plain_cell_is_rejected() {
        let mut grid = grid(10);
        let coord = first_plain(&grid);
        let result = grid.set_flags(
            coord,
            FlagUpdate {
                selected: Some(true),
                ..FlagUpdate::default()
            },
        );
        assert_eq!(result, Err(FlagError::SelectedWithoutScary { cell: coord }));
        assert!(!grid.cell(coord).selected);
    }

    #[test]
    fn partial_update_preserves_other_fields() {
        let mut grid = grid(10);
        let coord = first_root(&grid);
        let before = *grid.cell(coord);
        grid.set_flags(
            coord,
            FlagUpdate {
                selected: Some(true),
                ..FlagUpdate::default()
            },
        )
        .expect("root can be selected");

        let after = *grid.cell(coord);
        assert!(after.selected);
        assert_eq!(after.value, before.value);
        assert!(after.root && after.scary);
    }

    #[test]
    fn group_cannot_be_reassigned() {
        let mut grid = grid(10);
        let coord = first_root(&grid);
        let first = FlagUpdate {
            group: Some(GroupId::new(1)),
            ..FlagUpdate::default()
        };
        grid.set_flags(coord, first).expect("first group");
        grid.set_flags(coord, first).expect("same group is idempotent");

        let result = grid.set_flags(
            coord,
            FlagUpdate {
                group: Some(GroupId::new(2)),
                ..FlagUpdate::default()
            },
        );
        assert_eq!(
            result,
            Err(FlagError::GroupReassigned {
                cell: coord,
                current: GroupId::new(1),
                requested: GroupId::new(2),
            })
        );
    }

    #[test]
    fn counted_cell_is_terminal() {
        let mut grid = grid(10);
        let coord = first_root(&grid);
        grid.set_flags(
            coord,
            FlagUpdate {
                selected: Some(true),
                counted: Some(true),
                ..FlagUpdate::default()
            },
        )
        .expect("selected cell can be counted");

        let result = grid.set_flags(
            coord,
            FlagUpdate {
                animating: Some(true),
                ..FlagUpdate::default()
            },
        );
        assert_eq!(result, Err(FlagError::CountedIsTerminal { cell: coord }));
    }

    #[test]
    fn counting_requires_selection() {
        let mut grid = grid(10);
        let coord = first_root(&grid);
        let result = grid.set_flags(
            coord,
            FlagUpdate {
                counted: Some(true),
                ..FlagUpdate::default()
            },
        );
        assert_eq!(result, Err(FlagError::CountedWithoutSelection { cell: coord }));
    }

    #[test]
    fn root_requires_scary() {
        let mut grid = grid(10);
        let coord = first_plain(&grid);
        let result = grid.set_flags(
            coord,
            FlagUpdate {
                root: Some(true),
                ..FlagUpdate::default()
            },
        );
        assert_eq!(result, Err(FlagError::RootWithoutScary { cell: coord }));
    }

    #[test]
    fn neighbors_are_clipped_at_edges() {
        let grid = grid(10);
        assert_eq!(grid.neighbors(CellCoord::new(0, 0)).count(), 3);
        assert_eq!(grid.neighbors(CellCoord::new(0, 5)).count(), 5);
        assert_eq!(grid.neighbors(CellCoord::new(5, 5)).count(), 8);
    }
}
