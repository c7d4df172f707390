//! Match session: binds two named seats to one match, interprets inbound
//! events against the turn machine and fans updates out to per-seat
//! channels an external transport drains.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::board::ShotOutcome;
use crate::config::Rules;
use crate::error::{ProtocolError, SessionError};
use crate::game::{Match, PlayerSlot, TurnState};
use crate::grid::{CellState, Coord, Grid, RevealedGrid};
use crate::opponent::Opponent;
use crate::protocol::{Event, Update};

/// Unique identifier of one running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Called exactly once, when the session is created.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

struct SessionState {
    game: Match,
    /// Seat driven in-process instead of by inbound events.
    local: Option<(PlayerSlot, Box<dyn Opponent>)>,
    /// Delivered but unacknowledged grid updates, per seat, keyed by the
    /// board the shot landed on plus its coordinate. The two boards share
    /// one coordinate space, so the bare coordinate would be ambiguous;
    /// each key is written at most once because a board consumes a
    /// coordinate exactly once.
    pending: [BTreeMap<(PlayerSlot, Coord), ShotOutcome>; 2],
}

/// One running match between two named seats.
///
/// All transitions happen under the session lock, so concurrent events
/// from the two seats serialize and the stored state never shows a
/// half-applied shot.
pub struct MatchSession {
    id: SessionId,
    names: [String; 2],
    state: Mutex<SessionState>,
    senders: [UnboundedSender<Update>; 2],
    receivers: Mutex<[Option<UnboundedReceiver<Update>>; 2]>,
}

impl MatchSession {
    /// Session between two remote seats. Both fleets arrive later as
    /// `GameConfig` events.
    pub fn new(rules: Rules, player_one: String, player_two: String) -> Self {
        let state = SessionState {
            game: Match::new(rules),
            local: None,
            pending: [BTreeMap::new(), BTreeMap::new()],
        };
        Self::assemble([player_one, player_two], state)
    }

    /// Session with one seat filled in-process by an [`Opponent`]. The
    /// opponent lays out its fleet immediately; a layout the validator
    /// refuses fails construction.
    pub fn with_opponent(
        rules: Rules,
        player_one: String,
        player_two: String,
        seat: PlayerSlot,
        mut opponent: Box<dyn Opponent>,
    ) -> Result<Self, SessionError> {
        let layout = opponent.place_ships(&rules);
        let mut game = Match::new(rules);
        game.submit_fleet(seat, &layout)?;
        let state = SessionState {
            game,
            local: Some((seat, opponent)),
            pending: [BTreeMap::new(), BTreeMap::new()],
        };
        Ok(Self::assemble([player_one, player_two], state))
    }

    fn assemble(names: [String; 2], state: SessionState) -> Self {
        let id = SessionId::generate();
        let (tx_one, rx_one) = mpsc::unbounded_channel();
        let (tx_two, rx_two) = mpsc::unbounded_channel();
        info!(
            session_id = %id,
            player_one = %names[0],
            player_two = %names[1],
            "session created"
        );
        Self {
            id,
            names,
            state: Mutex::new(state),
            senders: [tx_one, tx_two],
            receivers: Mutex::new([Some(rx_one), Some(rx_two)]),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn player_name(&self, slot: PlayerSlot) -> &str {
        &self.names[slot.index()]
    }

    /// The seat's update stream. Yields `Some` once; a transport owns the
    /// receiver for the session's life.
    pub async fn take_updates(&self, slot: PlayerSlot) -> Option<UnboundedReceiver<Update>> {
        self.receivers.lock().await[slot.index()].take()
    }

    /// Interpret one inbound event from a seat. A rejection is returned to
    /// the caller and mirrored onto the sender's update stream as
    /// `Rejected`; the other seat never sees it.
    pub async fn handle(&self, sender: PlayerSlot, event: Event) -> Result<(), SessionError> {
        let mut st = self.state.lock().await;
        let result = self.dispatch(&mut st, sender, event);
        if let Err(error) = result {
            debug!(session_id = %self.id, seat = ?sender, %error, "event rejected");
            self.push(sender, Update::Rejected { error });
        }
        self.drive_local(&mut st);
        result
    }

    /// Fire on behalf of a seat. Same path as a `ShotRequest` event, with
    /// the outcome returned for in-process presentation callers.
    pub async fn request_shot(
        &self,
        shooter: PlayerSlot,
        coord: Coord,
    ) -> Result<ShotOutcome, SessionError> {
        let mut st = self.state.lock().await;
        let result = self.apply_shot(&mut st, shooter, coord);
        if let Err(error) = result {
            self.push(shooter, Update::Rejected { error });
        }
        self.drive_local(&mut st);
        result
    }

    /// What the shooter already knows about one cell of the enemy grid.
    /// Pure query; mutates nothing, legal in any phase.
    pub async fn preview_shot(
        &self,
        shooter: PlayerSlot,
        coord: Coord,
    ) -> Result<CellState, SessionError> {
        let st = self.state.lock().await;
        st.game.preview(shooter, coord)
    }

    pub async fn turn_state(&self) -> TurnState {
        self.state.lock().await.game.state()
    }

    pub async fn winner(&self) -> Option<PlayerSlot> {
        self.state.lock().await.game.winner()
    }

    pub async fn rules(&self) -> Rules {
        self.state.lock().await.game.rules().clone()
    }

    /// The seat's own grid, ships included. Only ever handed to its owner.
    pub async fn own_board(&self, slot: PlayerSlot) -> Grid {
        self.state.lock().await.game.board(slot).grid().clone()
    }

    /// The enemy grid as the seat is allowed to see it.
    pub async fn opponent_view(&self, slot: PlayerSlot) -> RevealedGrid {
        self.state
            .lock()
            .await
            .game
            .board(slot.opponent())
            .reveal_view()
    }

    /// Grid updates delivered to the seat but not yet acknowledged, each
    /// naming the board it landed on, ordered by board then coordinate.
    /// A reconnecting transport re-delivers these.
    pub async fn pending_updates(
        &self,
        slot: PlayerSlot,
    ) -> Vec<(PlayerSlot, Coord, ShotOutcome)> {
        self.state.lock().await.pending[slot.index()]
            .iter()
            .map(|(&(board, coord), &outcome)| (board, coord, outcome))
            .collect()
    }

    fn dispatch(
        &self,
        st: &mut SessionState,
        sender: PlayerSlot,
        event: Event,
    ) -> Result<(), SessionError> {
        match event {
            Event::Chat { message, .. } => {
                if let TurnState::GameOver(_) = st.game.state() {
                    return Err(ProtocolError::MatchEnded.into());
                }
                // restamped with the seat's registered name
                let update = Update::Chat {
                    player_name: self.names[sender.index()].clone(),
                    message,
                };
                self.push(sender.opponent(), update);
                Ok(())
            }
            Event::GameConfig { layout } => {
                st.game.submit_fleet(sender, &layout)?;
                info!(session_id = %self.id, seat = ?sender, "fleet installed");
                self.broadcast_status(st);
                Ok(())
            }
            Event::ShotRequest { coord } => self.apply_shot(st, sender, coord).map(|_| ()),
            Event::StatusQuery => {
                // answered in every phase so a reconnecting client can resync
                self.push(sender, self.status_of(st));
                Ok(())
            }
            Event::GridUpdateAck { board, coord } => {
                st.pending[sender.index()].remove(&(board, coord));
                Ok(())
            }
        }
    }

    fn apply_shot(
        &self,
        st: &mut SessionState,
        shooter: PlayerSlot,
        coord: Coord,
    ) -> Result<ShotOutcome, SessionError> {
        let outcome = st.game.fire(shooter, coord)?;
        let board = shooter.opponent();
        info!(
            session_id = %self.id,
            seat = ?shooter,
            %coord,
            ?outcome,
            state = ?st.game.state(),
            "shot resolved"
        );
        for slot in [PlayerSlot::One, PlayerSlot::Two] {
            st.pending[slot.index()].insert((board, coord), outcome);
            self.push(slot, Update::GridUpdate { board, coord, outcome });
        }
        self.broadcast_status(st);
        Ok(outcome)
    }

    /// Let an in-process opponent take its turns. Runs after every event so
    /// the machine never sits waiting on a seat nobody is driving.
    fn drive_local(&self, st: &mut SessionState) {
        loop {
            let active = match st.game.state() {
                TurnState::AwaitingShot(active) => active,
                _ => return,
            };
            let coord = match st.local.as_mut() {
                Some((seat, opponent)) if *seat == active => opponent.calculate_next_shot(),
                _ => return,
            };
            match self.apply_shot(st, active, coord) {
                Ok(outcome) => {
                    if let Some((_, opponent)) = st.local.as_mut() {
                        opponent.process_last_shot_result(outcome.is_hit());
                    }
                }
                Err(error) => {
                    // a misbehaving feed must not spin the session
                    warn!(session_id = %self.id, seat = ?active, %coord, %error, "local shot rejected");
                    return;
                }
            }
        }
    }

    fn status_of(&self, st: &SessionState) -> Update {
        Update::GameStatus {
            state: st.game.state(),
            winner: st.game.winner(),
        }
    }

    fn broadcast_status(&self, st: &SessionState) {
        let status = self.status_of(st);
        for slot in [PlayerSlot::One, PlayerSlot::Two] {
            self.push(slot, status.clone());
        }
    }

    fn push(&self, slot: PlayerSlot, update: Update) {
        // a seat whose transport is gone just stops receiving
        let _ = self.senders[slot.index()].send(update);
    }
}
