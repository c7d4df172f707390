//! Ship classes and placed-ship state.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::grid::Coord;

/// Direction a ship's cells extend from its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// The classic ship classes, each with a fixed length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipType {
    Carrier,
    Battleship,
    Cruiser,
    Submarine,
    Destroyer,
}

impl ShipType {
    /// Full roster in classic order.
    pub const ALL: [ShipType; 5] = [
        ShipType::Carrier,
        ShipType::Battleship,
        ShipType::Cruiser,
        ShipType::Submarine,
        ShipType::Destroyer,
    ];

    /// Number of cells the ship occupies.
    pub const fn length(self) -> usize {
        match self {
            ShipType::Carrier => 5,
            ShipType::Battleship => 4,
            ShipType::Cruiser => 3,
            ShipType::Submarine => 3,
            ShipType::Destroyer => 2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ShipType::Carrier => "Carrier",
            ShipType::Battleship => "Battleship",
            ShipType::Cruiser => "Cruiser",
            ShipType::Submarine => "Submarine",
            ShipType::Destroyer => "Destroyer",
        }
    }
}

impl fmt::Display for ShipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A ship placed on a grid: anchor, orientation, the derived ordered cells
/// it occupies and a per-cell hit record. Created at fleet setup, mutated
/// only by shot resolution, never removed mid-match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ship {
    ship_type: ShipType,
    anchor: Coord,
    orientation: Orientation,
    cells: Vec<Coord>,
    hits: Vec<bool>,
}

impl Ship {
    /// Derive the occupied cells of a placement within a width x height
    /// grid. Fails with `OutOfBounds` naming the first offending cell.
    pub(crate) fn new(
        ship_type: ShipType,
        anchor: Coord,
        orientation: Orientation,
        width: u8,
        height: u8,
    ) -> Result<Self, ValidationError> {
        let len = ship_type.length();
        let mut cells = Vec::with_capacity(len);
        for i in 0..len {
            let (row, col) = match orientation {
                Orientation::Horizontal => (anchor.row as usize, anchor.col as usize + i),
                Orientation::Vertical => (anchor.row as usize + i, anchor.col as usize),
            };
            if row >= height as usize || col >= width as usize {
                // report the cell that leaves the grid, not the anchor
                let clamped =
                    Coord::new(row.min(u8::MAX as usize) as u8, col.min(u8::MAX as usize) as u8);
                return Err(ValidationError::OutOfBounds(clamped));
            }
            cells.push(Coord::new(row as u8, col as u8));
        }
        Ok(Self {
            ship_type,
            anchor,
            orientation,
            cells,
            hits: vec![false; len],
        })
    }

    pub fn ship_type(&self) -> ShipType {
        self.ship_type
    }

    pub fn anchor(&self) -> Coord {
        self.anchor
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Occupied cells, ordered from the anchor.
    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    pub fn covers(&self, coord: Coord) -> bool {
        self.cells.contains(&coord)
    }

    /// Record a hit on the given cell. Returns `false` if the ship does not
    /// occupy the coordinate.
    pub(crate) fn record_hit(&mut self, coord: Coord) -> bool {
        match self.cells.iter().position(|&c| c == coord) {
            Some(i) => {
                self.hits[i] = true;
                true
            }
            None => false,
        }
    }

    /// Sunk once every occupied cell has been hit.
    pub fn is_sunk(&self) -> bool {
        self.hits.iter().all(|&h| h)
    }

    pub fn hit_count(&self) -> usize {
        self.hits.iter().filter(|&&h| h).count()
    }
}
