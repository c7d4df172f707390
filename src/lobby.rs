//! Lobby registry: create, list and join pending matches, spawning a
//! session once two players are paired. Records for lobbies nobody joins
//! expire and are later reclaimed.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::LobbyConfig;
use crate::error::LobbyError;
use crate::session::{MatchSession, SessionId};

/// Unique identifier of one lobby.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LobbyId(Uuid);

impl LobbyId {
    /// Called exactly once, when the lobby is created.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for LobbyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Public record of one lobby as the service surface exposes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyData {
    pub lobby_id: LobbyId,
    pub name: String,
    pub player_one: String,
    pub player_two: Option<String>,
}

/// One page of open lobbies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyPage {
    /// Open lobbies in total, before pagination.
    pub count: usize,
    pub results: Vec<LobbyData>,
}

struct LobbyRecord {
    data: LobbyData,
    /// Creation order, for stable listing.
    seq: u64,
    created_at: Instant,
    /// Set once the pending timeout elapses without a second player.
    expired_at: Option<Instant>,
    session_id: Option<SessionId>,
}

impl LobbyRecord {
    fn is_open(&self) -> bool {
        self.data.player_two.is_none() && self.expired_at.is_none()
    }
}

/// Registry pairing players into match sessions.
///
/// Safe to share across tasks; create/list/join serialize on the registry
/// lock, so a join observes either a free seat or a taken one, never a
/// half-joined lobby.
pub struct LobbyService {
    config: LobbyConfig,
    lobbies: RwLock<HashMap<LobbyId, LobbyRecord>>,
    sessions: RwLock<HashMap<SessionId, Arc<MatchSession>>>,
    next_seq: AtomicU64,
}

impl LobbyService {
    pub fn new(config: LobbyConfig) -> Self {
        Self {
            config,
            lobbies: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Open a lobby waiting for a second player.
    pub async fn create(&self, name: String, player_one: String) -> LobbyData {
        let now = Instant::now();
        let data = LobbyData {
            lobby_id: LobbyId::generate(),
            name,
            player_one,
            player_two: None,
        };
        let record = LobbyRecord {
            data: data.clone(),
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            created_at: now,
            expired_at: None,
            session_id: None,
        };
        let mut lobbies = self.lobbies.write().await;
        self.reap(&mut lobbies, now);
        info!(
            lobby_id = %data.lobby_id,
            name = %data.name,
            player_one = %data.player_one,
            "lobby created"
        );
        lobbies.insert(data.lobby_id, record);
        data
    }

    /// Open lobbies in creation order. `limit` is clamped to the
    /// configured page-size cap.
    pub async fn list(&self, offset: usize, limit: usize) -> LobbyPage {
        let now = Instant::now();
        let mut lobbies = self.lobbies.write().await;
        self.reap(&mut lobbies, now);
        let mut open: Vec<&LobbyRecord> = lobbies.values().filter(|r| r.is_open()).collect();
        open.sort_by_key(|r| r.seq);
        let count = open.len();
        let limit = limit.min(self.config.max_page_size);
        let results = open
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|r| r.data.clone())
            .collect();
        LobbyPage { count, results }
    }

    /// Claim the second seat. The seat is test-and-set under the registry
    /// write lock: of any number of concurrent joins exactly one wins, the
    /// rest see `LobbyFull`. The winner's session is registered before the
    /// lock drops.
    pub async fn join(
        &self,
        lobby_id: LobbyId,
        player_two: String,
    ) -> Result<LobbyData, LobbyError> {
        let now = Instant::now();
        let mut lobbies = self.lobbies.write().await;
        self.reap(&mut lobbies, now);
        let record = lobbies.get_mut(&lobby_id).ok_or(LobbyError::NotFound)?;
        if record.expired_at.is_some() {
            return Err(LobbyError::Expired);
        }
        if record.data.player_two.is_some() {
            return Err(LobbyError::LobbyFull);
        }
        record.data.player_two = Some(player_two.clone());
        let session = Arc::new(MatchSession::new(
            self.config.rules.clone(),
            record.data.player_one.clone(),
            player_two,
        ));
        let session_id = session.id();
        record.session_id = Some(session_id);
        self.sessions.write().await.insert(session_id, session);
        info!(lobby_id = %lobby_id, session_id = %session_id, "lobby joined");
        Ok(record.data.clone())
    }

    /// Look up a lobby the registry still knows about.
    pub async fn lobby(&self, lobby_id: LobbyId) -> Option<LobbyData> {
        self.lobbies
            .read()
            .await
            .get(&lobby_id)
            .map(|r| r.data.clone())
    }

    /// Session spawned for the lobby, once a second player has joined.
    /// The creator polls this to learn where their match lives.
    pub async fn match_for(&self, lobby_id: LobbyId) -> Option<SessionId> {
        self.lobbies
            .read()
            .await
            .get(&lobby_id)
            .and_then(|r| r.session_id)
    }

    pub async fn session(&self, session_id: SessionId) -> Option<Arc<MatchSession>> {
        self.sessions.read().await.get(&session_id).cloned()
    }

    /// Forget a finished session and reclaim the lobby that spawned it.
    pub async fn drop_session(&self, session_id: SessionId) {
        let mut lobbies = self.lobbies.write().await;
        let mut sessions = self.sessions.write().await;
        lobbies.retain(|_, record| record.session_id != Some(session_id));
        if sessions.remove(&session_id).is_some() {
            info!(%session_id, "session dropped");
        }
    }

    /// Expiry bookkeeping, run inside every write-locked operation: an open
    /// lobby past the pending timeout turns expired; an expired record a
    /// further timeout later is reclaimed.
    fn reap(&self, lobbies: &mut HashMap<LobbyId, LobbyRecord>, now: Instant) {
        let timeout = self.config.pending_timeout;
        for record in lobbies.values_mut() {
            if record.data.player_two.is_none()
                && record.expired_at.is_none()
                && now.duration_since(record.created_at) >= timeout
            {
                info!(lobby_id = %record.data.lobby_id, "lobby expired");
                record.expired_at = Some(now);
            }
        }
        lobbies.retain(|id, record| match record.expired_at {
            Some(at) if now.duration_since(at) >= timeout => {
                debug!(lobby_id = %id, "expired lobby reclaimed");
                false
            }
            _ => true,
        });
    }
}
