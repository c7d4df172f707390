//! Per-player grid state and the opponent-safe projection of it.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Cell address: 0-indexed (row, col), bounded by the owning grid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Coord {
    pub row: u8,
    pub col: u8,
}

impl Coord {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Knowledge about a single cell.
///
/// `Empty` and `Ship` are private to the grid's owner; only `Hit`, `Miss`
/// and `Sunk` (plus ship-free `Empty`) ever cross to the opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    Empty,
    Ship,
    Hit,
    Miss,
    Sunk,
}

impl CellState {
    /// True once the cell has been fired at.
    pub fn is_targeted(self) -> bool {
        matches!(self, CellState::Hit | CellState::Miss | CellState::Sunk)
    }
}

/// One player's width x height cell map, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u8,
    height: u8,
    cells: Vec<CellState>,
}

impl Grid {
    /// Create an all-empty grid of the given dimensions.
    pub fn new(width: u8, height: u8) -> Self {
        Self {
            width,
            height,
            cells: vec![CellState::Empty; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.row < self.height && coord.col < self.width
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        if self.contains(coord) {
            Some(coord.row as usize * self.width as usize + coord.col as usize)
        } else {
            None
        }
    }

    /// State of a single cell; `None` when the coordinate is out of bounds.
    pub fn cell(&self, coord: Coord) -> Option<CellState> {
        self.index(coord).map(|i| self.cells[i])
    }

    pub(crate) fn set(&mut self, coord: Coord, state: CellState) {
        if let Some(i) = self.index(coord) {
            self.cells[i] = state;
        }
    }

    /// Iterate all coordinates of the grid in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        let (w, h) = (self.width, self.height);
        (0..h).flat_map(move |row| (0..w).map(move |col| Coord::new(row, col)))
    }

    /// Opponent-safe projection: unhit ship cells collapse to `Empty`, so
    /// the result carries no placement knowledge beyond recorded shots.
    pub fn reveal_view(&self) -> RevealedGrid {
        RevealedGrid {
            width: self.width,
            height: self.height,
            cells: self
                .cells
                .iter()
                .map(|&c| match c {
                    CellState::Ship => CellState::Empty,
                    other => other,
                })
                .collect(),
        }
    }
}

/// The shareable view of a grid: only `Empty`, `Hit`, `Miss` and `Sunk`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedGrid {
    width: u8,
    height: u8,
    cells: Vec<CellState>,
}

impl RevealedGrid {
    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn cell(&self, coord: Coord) -> Option<CellState> {
        if coord.row < self.height && coord.col < self.width {
            Some(self.cells[coord.row as usize * self.width as usize + coord.col as usize])
        } else {
            None
        }
    }

    /// Number of cells that have been fired at.
    pub fn targeted(&self) -> usize {
        self.cells.iter().filter(|c| c.is_targeted()).count()
    }
}
