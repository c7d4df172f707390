//! Wire vocabulary between a seat and its match session.

use serde::{Deserialize, Serialize};

use crate::board::{FleetLayout, ShotOutcome};
use crate::error::SessionError;
use crate::game::{PlayerSlot, TurnState};
use crate::grid::Coord;

/// Player-to-session messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Free-form text relayed to the opponent.
    Chat { player_name: String, message: String },
    /// Fire at a cell of the opponent's grid.
    ShotRequest { coord: Coord },
    /// Confirm receipt of the `GridUpdate` for a cell of the named board.
    GridUpdateAck { board: PlayerSlot, coord: Coord },
    /// Submit a complete fleet layout during setup.
    GameConfig { layout: FleetLayout },
    /// Ask for a fresh `GameStatus` snapshot.
    StatusQuery,
}

/// Session-to-player messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Update {
    /// Chat line from the opponent.
    Chat { player_name: String, message: String },
    /// A cell changed on the named player's grid. Both boards share one
    /// coordinate space, so the board tag disambiguates.
    GridUpdate {
        board: PlayerSlot,
        coord: Coord,
        outcome: ShotOutcome,
    },
    /// Snapshot of the match phase, with the winner once there is one.
    GameStatus {
        state: TurnState,
        winner: Option<PlayerSlot>,
    },
    /// An event was refused; carries the reason.
    Rejected { error: SessionError },
}
