//! Match rules and lobby tuning, passed explicitly at construction.

use std::time::Duration;

use crate::ship::ShipType;

/// Classic board edge length.
pub const DEFAULT_GRID_SIZE: u8 = 10;

/// Grid dimensions and the ship roster a match is played with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rules {
    pub width: u8,
    pub height: u8,
    /// Ship types each fleet must place exactly once.
    pub roster: Vec<ShipType>,
}

impl Rules {
    pub fn new(width: u8, height: u8, roster: Vec<ShipType>) -> Self {
        Self {
            width,
            height,
            roster,
        }
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Total cells the roster occupies.
    pub fn fleet_cell_count(&self) -> usize {
        self.roster.iter().map(|t| t.length()).sum()
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_SIZE,
            height: DEFAULT_GRID_SIZE,
            roster: ShipType::ALL.to_vec(),
        }
    }
}

/// Tuning for the lobby registry.
#[derive(Debug, Clone)]
pub struct LobbyConfig {
    /// Rules applied to matches created from this registry.
    pub rules: Rules,
    /// How long a lobby may wait for a second player before expiring.
    pub pending_timeout: Duration,
    /// Upper bound applied to `list` page sizes.
    pub max_page_size: usize,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            rules: Rules::default(),
            pending_timeout: Duration::from_secs(300),
            max_page_size: 50,
        }
    }
}
