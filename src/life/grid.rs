//! Grid representation and neighbor queries

use crate::config::BoundaryCondition;
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relative positions of the Moore neighborhood
const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// State of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellState {
    Dead,
    Alive,
}

impl CellState {
    #[inline]
    pub fn is_alive(self) -> bool {
        self == CellState::Alive
    }
}

impl From<bool> for CellState {
    fn from(alive: bool) -> Self {
        if alive {
            CellState::Alive
        } else {
            CellState::Dead
        }
    }
}

/// One generation of the automaton.
///
/// Dimensions and cells are fixed once built; the next generation is
/// always a fresh `Grid`, never an in-place edit of this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
    boundary_condition: BoundaryCondition,
}

impl Grid {
    /// Create a grid with every cell dead
    pub fn new(width: usize, height: usize, boundary_condition: BoundaryCondition) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            cells: vec![false; width * height],
            boundary_condition,
        })
    }

    /// Build a grid by asking `alive(x, y)` for every cell in row-major order
    pub fn from_fn<F>(
        width: usize,
        height: usize,
        boundary_condition: BoundaryCondition,
        mut alive: F,
    ) -> Result<Self>
    where
        F: FnMut(usize, usize) -> bool,
    {
        check_dimensions(width, height)?;
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                cells.push(alive(x, y));
            }
        }
        Ok(Self {
            width,
            height,
            cells,
            boundary_condition,
        })
    }

    /// Create a grid from rows of booleans (`rows[y][x]`)
    pub fn from_cells(rows: Vec<Vec<bool>>, boundary_condition: BoundaryCondition) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        check_dimensions(width, height)?;

        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(EngineError::invalid(format!(
                    "Row {} has length {}, expected {}",
                    y,
                    row.len(),
                    width
                )));
            }
        }

        Ok(Self {
            width,
            height,
            cells: rows.into_iter().flatten().collect(),
            boundary_condition,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn boundary_condition(&self) -> BoundaryCondition {
        self.boundary_condition
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    fn check_bounds(&self, x: usize, y: usize) -> Result<()> {
        if x < self.width && y < self.height {
            Ok(())
        } else {
            Err(EngineError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// State of the cell at `(x, y)`
    pub fn get(&self, x: usize, y: usize) -> Result<CellState> {
        self.check_bounds(x, y)?;
        Ok(self.cells[self.index(x, y)].into())
    }

    /// Unchecked liveness for in-range coordinates
    #[inline]
    pub(crate) fn is_alive(&self, x: usize, y: usize) -> bool {
        self.cells[self.index(x, y)]
    }

    /// Number of live cells among the 8 Moore neighbors of `(x, y)`
    pub fn neighbor_count(&self, x: usize, y: usize) -> Result<u8> {
        self.check_bounds(x, y)?;
        Ok(self.count_neighbors(x, y))
    }

    /// Neighbor count for coordinates already known to be in range
    pub(crate) fn count_neighbors(&self, x: usize, y: usize) -> u8 {
        NEIGHBOR_OFFSETS
            .iter()
            .filter(|(dx, dy)| self.is_neighbor_alive(x as isize + dx, y as isize + dy))
            .count() as u8
    }

    /// Liveness of a possibly out-of-range position under the boundary policy
    fn is_neighbor_alive(&self, x: isize, y: isize) -> bool {
        let (w, h) = (self.width as isize, self.height as isize);
        match self.boundary_condition {
            BoundaryCondition::Dead => {
                if x >= 0 && x < w && y >= 0 && y < h {
                    self.is_alive(x as usize, y as usize)
                } else {
                    false
                }
            }
            BoundaryCondition::Wrap => {
                self.is_alive(x.rem_euclid(w) as usize, y.rem_euclid(h) as usize)
            }
        }
    }

    /// Build the next generation from each cell's state and live-neighbor count.
    ///
    /// Every count is read from `self`, which is never written; the results go
    /// into a separate buffer visited in row-major order.
    pub(crate) fn successor<F>(&self, mut next: F) -> Grid
    where
        F: FnMut(CellState, u8) -> CellState,
    {
        let mut cells = Vec::with_capacity(self.cells.len());
        for y in 0..self.height {
            for x in 0..self.width {
                let state = CellState::from(self.is_alive(x, y));
                cells.push(next(state, self.count_neighbors(x, y)).is_alive());
            }
        }
        Grid {
            width: self.width,
            height: self.height,
            cells,
            boundary_condition: self.boundary_condition,
        }
    }

    /// All living cell coordinates as `(x, y)`, row-major
    pub fn living_cells(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &alive)| alive)
            .map(|(i, _)| (i % self.width, i / self.width))
            .collect()
    }

    pub fn living_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell).count()
    }

    /// Fraction of cells alive, in `[0, 1]`
    pub fn density(&self) -> f64 {
        self.living_count() as f64 / self.cells.len() as f64
    }

    /// True when no cell is alive
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&cell| !cell)
    }

    /// Rows of the grid, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> + '_ {
        self.cells.chunks(self.width)
    }
}

fn check_dimensions(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(EngineError::invalid(format!(
            "Grid dimensions must be positive, got {}x{}",
            width, height
        )));
    }
    if width.checked_mul(height).is_none() {
        return Err(EngineError::invalid(format!(
            "Grid of {}x{} cells is too large",
            width, height
        )));
    }
    Ok(())
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for &cell in row {
                write!(f, "{}", if cell { "⬛" } else { "⬜" })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&str], boundary: BoundaryCondition) -> Grid {
        let cells = rows
            .iter()
            .map(|row| row.chars().map(|c| c == '1').collect())
            .collect();
        Grid::from_cells(cells, boundary).unwrap()
    }

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(4, 3, BoundaryCondition::Dead).unwrap();
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.rows().count(), 3);
        assert!(grid.is_empty());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            Grid::new(0, 3, BoundaryCondition::Dead),
            Err(EngineError::InvalidParameter(_))
        ));
        assert!(matches!(
            Grid::from_cells(vec![], BoundaryCondition::Wrap),
            Err(EngineError::InvalidParameter(_))
        ));
        assert!(Grid::from_cells(vec![vec![true], vec![true, false]], BoundaryCondition::Dead).is_err());
    }

    #[test]
    fn test_get_out_of_bounds() {
        let grid = Grid::new(3, 2, BoundaryCondition::Wrap).unwrap();
        assert_eq!(grid.get(2, 1).unwrap(), CellState::Dead);
        assert_eq!(
            grid.get(3, 0),
            Err(EngineError::OutOfBounds { x: 3, y: 0, width: 3, height: 2 })
        );
        assert!(grid.neighbor_count(0, 2).is_err());
    }

    #[test]
    fn test_neighbor_counting() {
        let grid = grid(&["111", "101", "111"], BoundaryCondition::Dead);
        assert_eq!(grid.neighbor_count(1, 1).unwrap(), 8);
        // Corner sees two edge cells; the dead center contributes nothing
        assert_eq!(grid.neighbor_count(0, 0).unwrap(), 2);
        assert_eq!(grid.living_count(), 8);
    }

    #[test]
    fn test_corner_under_each_boundary() {
        // Live cells only in the three corners that wrap onto (0, 0)
        let rows = ["00001", "00000", "00000", "10001"];
        let bounded = grid(&rows, BoundaryCondition::Dead);
        let toroidal = grid(&rows, BoundaryCondition::Wrap);

        assert_eq!(bounded.neighbor_count(0, 0).unwrap(), 0);
        // (W-1, H-1), (W-1, 0) and (0, H-1)
        assert_eq!(toroidal.neighbor_count(0, 0).unwrap(), 3);
    }

    #[test]
    fn test_wrap_small_grid() {
        let rows = ["10", "01"];
        assert_eq!(grid(&rows, BoundaryCondition::Dead).neighbor_count(0, 0).unwrap(), 1);
        // Four of the wrapped positions land on (1, 1)
        assert_eq!(grid(&rows, BoundaryCondition::Wrap).neighbor_count(0, 0).unwrap(), 4);
    }

    #[test]
    fn test_living_cells_and_density() {
        let grid = grid(&["0100", "0001"], BoundaryCondition::Dead);
        assert_eq!(grid.living_cells(), vec![(1, 0), (3, 1)]);
        assert!((grid.density() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_fn_row_major() {
        let mut visited = Vec::new();
        let grid = Grid::from_fn(2, 2, BoundaryCondition::Dead, |x, y| {
            visited.push((x, y));
            x == y
        })
        .unwrap();
        assert_eq!(visited, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
        assert_eq!(grid.get(1, 1).unwrap(), CellState::Alive);
        assert_eq!(grid.get(1, 0).unwrap(), CellState::Dead);
    }
}
