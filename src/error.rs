//! Error taxonomy shared by the match engine, sessions and the lobby.
//!
//! None of these are fatal: validation and protocol rejections go back to
//! the submitting player and leave all state untouched; lobby failures go
//! back to the caller with no session created.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::Coord;
use crate::ship::ShipType;

/// Rejection of a ship placement, fleet layout or shot coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ValidationError {
    /// A cell lies outside the grid.
    #[error("coordinate {0} is outside the grid")]
    OutOfBounds(Coord),
    /// A cell is already claimed by another ship of the same fleet.
    #[error("cell {0} is already occupied by another ship")]
    Overlap(Coord),
    /// The layout never places a required ship type.
    #[error("fleet layout is missing the {0}")]
    IncompleteRoster(ShipType),
    /// The layout places a ship type more often than the roster allows.
    #[error("fleet layout places more than the allowed number of {0}s")]
    DuplicateType(ShipType),
}

/// Rule violation on an established session. Surfaced to the sender only;
/// the session stays alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ProtocolError {
    /// The sender is not the active player.
    #[error("not this player's turn")]
    OutOfTurn,
    /// The coordinate was already fired at; shots are consumed once.
    #[error("coordinate was already targeted")]
    AlreadyTargeted,
    /// The match reached a terminal state before the message arrived.
    #[error("match has already ended")]
    MatchEnded,
}

/// Lobby registry failure. No session is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum LobbyError {
    #[error("no such lobby")]
    NotFound,
    #[error("lobby already has two players")]
    LobbyFull,
    #[error("lobby expired before a second player joined")]
    Expired,
}

/// Any rejection a session can hand back to the submitting player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
