//! Two-board match state machine: fleet submission, strict shot
//! alternation and win detection.

use serde::{Deserialize, Serialize};

use crate::board::{Board, FleetLayout, ShotOutcome};
use crate::config::Rules;
use crate::error::{ProtocolError, SessionError};
use crate::grid::{CellState, Coord};

/// Identifies one of the two seats in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlayerSlot {
    One,
    Two,
}

impl PlayerSlot {
    pub fn opponent(self) -> PlayerSlot {
        match self {
            PlayerSlot::One => PlayerSlot::Two,
            PlayerSlot::Two => PlayerSlot::One,
        }
    }

    pub fn index(self) -> usize {
        match self {
            PlayerSlot::One => 0,
            PlayerSlot::Two => 1,
        }
    }
}

/// Phase of a match. `Resolving` is a transient wire state; transitions
/// complete atomically, so a stored state is never `Resolving`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnState {
    /// Waiting for one or both fleets.
    Setup,
    /// The named player owns the next shot.
    AwaitingShot(PlayerSlot),
    /// A shot is being applied.
    Resolving,
    /// The named player destroyed the opposing fleet.
    GameOver(PlayerSlot),
}

/// A full two-player match. Pure state: no IO, no clocks, no channels.
#[derive(Debug, Clone)]
pub struct Match {
    rules: Rules,
    boards: [Board; 2],
    state: TurnState,
}

impl Match {
    pub fn new(rules: Rules) -> Self {
        let boards = [Board::new(rules.clone()), Board::new(rules.clone())];
        Self {
            rules,
            boards,
            state: TurnState::Setup,
        }
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn board(&self, slot: PlayerSlot) -> &Board {
        &self.boards[slot.index()]
    }

    pub fn winner(&self) -> Option<PlayerSlot> {
        match self.state {
            TurnState::GameOver(winner) => Some(winner),
            _ => None,
        }
    }

    /// Accept a player's fleet during setup. Each seat submits once; when
    /// both boards are ready, player one owns the opening shot.
    pub fn submit_fleet(
        &mut self,
        slot: PlayerSlot,
        layout: &FleetLayout,
    ) -> Result<(), SessionError> {
        match self.state {
            TurnState::Setup => {}
            TurnState::GameOver(_) => return Err(ProtocolError::MatchEnded.into()),
            _ => return Err(ProtocolError::OutOfTurn.into()),
        }
        if self.boards[slot.index()].is_ready() {
            // one submission per seat
            return Err(ProtocolError::OutOfTurn.into());
        }
        self.boards[slot.index()].install_fleet(layout)?;
        if self.boards.iter().all(Board::is_ready) {
            self.state = TurnState::AwaitingShot(PlayerSlot::One);
        }
        Ok(())
    }

    /// Resolve one shot by `shooter` against the opposing board. Rejected
    /// wholesale (state untouched) when it is not the shooter's turn or the
    /// cell was already consumed; otherwise the turn passes, or the match
    /// ends if the shot destroyed the last afloat ship.
    pub fn fire(&mut self, shooter: PlayerSlot, coord: Coord) -> Result<ShotOutcome, SessionError> {
        match self.state {
            TurnState::AwaitingShot(active) if active == shooter => {}
            TurnState::AwaitingShot(_) => return Err(ProtocolError::OutOfTurn.into()),
            TurnState::GameOver(_) => return Err(ProtocolError::MatchEnded.into()),
            _ => return Err(ProtocolError::OutOfTurn.into()),
        }
        let target = &mut self.boards[shooter.opponent().index()];
        let outcome = target.resolve_shot(coord)?;
        if outcome == ShotOutcome::AlreadyTargeted {
            return Err(ProtocolError::AlreadyTargeted.into());
        }
        self.state = if target.fleet().is_destroyed() {
            TurnState::GameOver(shooter)
        } else {
            TurnState::AwaitingShot(shooter.opponent())
        };
        Ok(outcome)
    }

    /// Opponent-safe look at one cell of the enemy board. Read-only; legal
    /// in any phase, including after the match has ended.
    pub fn preview(&self, shooter: PlayerSlot, coord: Coord) -> Result<CellState, SessionError> {
        let cell = self.boards[shooter.opponent().index()].revealed_cell(coord)?;
        Ok(cell)
    }
}
