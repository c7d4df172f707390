//! One player's grid/fleet pair: placement, layout validation and shot
//! resolution. All mutation of a player's state is confined to their own
//! `Board`; nothing here ever touches the opponent's.

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::Rules;
use crate::error::ValidationError;
use crate::grid::{CellState, Coord, Grid, RevealedGrid};
use crate::ship::{Orientation, Ship, ShipType};

/// Attempts at a random position per ship before falling back to a sweep.
const PLACEMENT_ATTEMPTS: usize = 128;

/// Result of resolving one shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotOutcome {
    /// Hit an afloat ship segment.
    Hit,
    /// Hit open water.
    Miss,
    /// Hit the last afloat segment of the named ship.
    Sunk(ShipType),
    /// The cell was fired at before; nothing changed.
    AlreadyTargeted,
}

impl ShotOutcome {
    pub fn is_hit(self) -> bool {
        matches!(self, ShotOutcome::Hit | ShotOutcome::Sunk(_))
    }
}

/// One ship's proposed position inside a fleet layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipPlacement {
    pub ship_type: ShipType,
    pub anchor: Coord,
    pub orientation: Orientation,
}

/// A full proposed fleet: one placement per rostered ship type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetLayout {
    pub placements: Vec<ShipPlacement>,
}

impl FleetLayout {
    pub fn new(placements: Vec<ShipPlacement>) -> Self {
        Self { placements }
    }

    /// Randomized non-overlapping in-bounds layout for the rules' roster.
    ///
    /// Each ship tries random anchors and orientations first, then a
    /// deterministic sweep of every position, so generation cannot fail as
    /// long as the roster physically fits the grid. A ship that fits
    /// nowhere is left out and the layout validator reports the gap.
    pub fn random<R: Rng + ?Sized>(rules: &Rules, rng: &mut R) -> FleetLayout {
        let mut taken: HashSet<Coord> = HashSet::new();
        let mut placements = Vec::with_capacity(rules.roster.len());
        for &ship_type in &rules.roster {
            let found = random_placement(rules, &taken, ship_type, rng)
                .or_else(|| sweep_placement(rules, &taken, ship_type));
            if let Some((placement, cells)) = found {
                taken.extend(cells);
                placements.push(placement);
            }
        }
        FleetLayout { placements }
    }
}

fn placement_cells(
    rules: &Rules,
    ship_type: ShipType,
    anchor: Coord,
    orientation: Orientation,
) -> Option<Vec<Coord>> {
    Ship::new(ship_type, anchor, orientation, rules.width, rules.height)
        .ok()
        .map(|s| s.cells().to_vec())
}

fn random_placement<R: Rng + ?Sized>(
    rules: &Rules,
    taken: &HashSet<Coord>,
    ship_type: ShipType,
    rng: &mut R,
) -> Option<(ShipPlacement, Vec<Coord>)> {
    let len = ship_type.length();
    for _ in 0..PLACEMENT_ATTEMPTS {
        let orientation = if rng.random() {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        };
        let (max_row, max_col) = match orientation {
            Orientation::Horizontal if (rules.width as usize) >= len && rules.height > 0 => {
                (rules.height - 1, rules.width - len as u8)
            }
            Orientation::Vertical if (rules.height as usize) >= len && rules.width > 0 => {
                (rules.height - len as u8, rules.width - 1)
            }
            // ship does not fit in this orientation
            _ => continue,
        };
        let anchor = Coord::new(
            rng.random_range(0..=max_row),
            rng.random_range(0..=max_col),
        );
        let cells = match placement_cells(rules, ship_type, anchor, orientation) {
            Some(cells) => cells,
            None => continue,
        };
        if cells.iter().all(|c| !taken.contains(c)) {
            let placement = ShipPlacement {
                ship_type,
                anchor,
                orientation,
            };
            return Some((placement, cells));
        }
    }
    None
}

fn sweep_placement(
    rules: &Rules,
    taken: &HashSet<Coord>,
    ship_type: ShipType,
) -> Option<(ShipPlacement, Vec<Coord>)> {
    for row in 0..rules.height {
        for col in 0..rules.width {
            for orientation in [Orientation::Horizontal, Orientation::Vertical] {
                let anchor = Coord::new(row, col);
                if let Some(cells) = placement_cells(rules, ship_type, anchor, orientation) {
                    if cells.iter().all(|c| !taken.contains(c)) {
                        let placement = ShipPlacement {
                            ship_type,
                            anchor,
                            orientation,
                        };
                        return Some((placement, cells));
                    }
                }
            }
        }
    }
    None
}

/// The set of one player's ships.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fleet {
    ships: Vec<Ship>,
}

impl Fleet {
    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    pub fn ship(&self, ship_type: ShipType) -> Option<&Ship> {
        self.ships.iter().find(|s| s.ship_type() == ship_type)
    }

    pub fn covers(&self, coord: Coord) -> bool {
        self.ships.iter().any(|s| s.covers(coord))
    }

    /// Every coordinate occupied by any ship of the fleet.
    pub fn occupied(&self) -> impl Iterator<Item = Coord> + '_ {
        self.ships.iter().flat_map(|s| s.cells().iter().copied())
    }

    /// All ships sunk. The sole win condition.
    pub fn is_destroyed(&self) -> bool {
        !self.ships.is_empty() && self.ships.iter().all(Ship::is_sunk)
    }

    fn add(&mut self, ship: Ship) {
        self.ships.push(ship);
    }

    /// Mark a hit on whichever ship covers the coordinate. Returns the
    /// ship's type, whether it just sank, and its cells.
    fn record_hit(&mut self, coord: Coord) -> Option<(ShipType, bool, Vec<Coord>)> {
        let ship = self.ships.iter_mut().find(|s| s.covers(coord))?;
        ship.record_hit(coord);
        Some((ship.ship_type(), ship.is_sunk(), ship.cells().to_vec()))
    }
}

/// One player's grid paired with their fleet. Keeps the invariant that the
/// grid's `Ship` cells equal the union of the fleet's occupied cells.
#[derive(Debug, Clone)]
pub struct Board {
    rules: Rules,
    grid: Grid,
    fleet: Fleet,
}

impl Board {
    /// Empty board for the given rules; no ships placed yet.
    pub fn new(rules: Rules) -> Self {
        let grid = Grid::new(rules.width, rules.height);
        Self {
            rules,
            grid,
            fleet: Fleet::default(),
        }
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    /// True once every rostered ship type has been placed.
    pub fn is_ready(&self) -> bool {
        !self.rules.roster.is_empty()
            && self.rules.roster.iter().all(|&t| self.fleet.ship(t).is_some())
    }

    /// Place a single ship. Rejects cells outside the grid, overlap with an
    /// already placed ship, and a second ship of the same type.
    pub fn place_ship(
        &mut self,
        ship_type: ShipType,
        anchor: Coord,
        orientation: Orientation,
    ) -> Result<(), ValidationError> {
        if self.fleet.ship(ship_type).is_some() {
            return Err(ValidationError::DuplicateType(ship_type));
        }
        let ship = Ship::new(ship_type, anchor, orientation, self.rules.width, self.rules.height)?;
        if let Some(&cell) = ship.cells().iter().find(|&&c| self.fleet.covers(c)) {
            return Err(ValidationError::Overlap(cell));
        }
        for &cell in ship.cells() {
            self.grid.set(cell, CellState::Ship);
        }
        self.fleet.add(ship);
        Ok(())
    }

    /// Validate and install a complete fleet layout. The layout must place
    /// every rostered type exactly once, in bounds and without overlap. On
    /// any rejection the board is left untouched.
    pub fn install_fleet(&mut self, layout: &FleetLayout) -> Result<(), ValidationError> {
        let mut staged = Board::new(self.rules.clone());
        for placement in &layout.placements {
            staged.place_ship(placement.ship_type, placement.anchor, placement.orientation)?;
        }
        for &required in &self.rules.roster {
            if staged.fleet.ship(required).is_none() {
                return Err(ValidationError::IncompleteRoster(required));
            }
        }
        if let Some(extra) = staged
            .fleet
            .ships()
            .iter()
            .find(|s| !self.rules.roster.contains(&s.ship_type()))
        {
            return Err(ValidationError::DuplicateType(extra.ship_type()));
        }
        *self = staged;
        Ok(())
    }

    /// Apply one shot. Already-targeted cells report `AlreadyTargeted` and
    /// mutate nothing; shots are consumed exactly once per coordinate. When
    /// a ship's last segment is hit the whole ship flips to `Sunk`.
    pub fn resolve_shot(&mut self, coord: Coord) -> Result<ShotOutcome, ValidationError> {
        let cell = self
            .grid
            .cell(coord)
            .ok_or(ValidationError::OutOfBounds(coord))?;
        if cell.is_targeted() {
            return Ok(ShotOutcome::AlreadyTargeted);
        }
        match self.fleet.record_hit(coord) {
            Some((ship_type, true, cells)) => {
                for c in cells {
                    self.grid.set(c, CellState::Sunk);
                }
                Ok(ShotOutcome::Sunk(ship_type))
            }
            Some((_, false, _)) => {
                self.grid.set(coord, CellState::Hit);
                Ok(ShotOutcome::Hit)
            }
            None => {
                self.grid.set(coord, CellState::Miss);
                Ok(ShotOutcome::Miss)
            }
        }
    }

    /// What the opponent is allowed to know about a single cell.
    pub fn revealed_cell(&self, coord: Coord) -> Result<CellState, ValidationError> {
        let cell = self
            .grid
            .cell(coord)
            .ok_or(ValidationError::OutOfBounds(coord))?;
        Ok(match cell {
            CellState::Ship => CellState::Empty,
            other => other,
        })
    }

    /// Opponent-safe projection of the whole grid.
    pub fn reveal_view(&self) -> RevealedGrid {
        self.grid.reveal_view()
    }
}
