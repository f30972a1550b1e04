//! Lobby registry.
//!
//! # Lobby lifecycle
//! 1. A player creates a lobby and becomes its host
//! 2. Others join while it is waiting and has free seats
//! 3. Non-host members mark themselves ready
//! 4. The host starts the game; the roster becomes a room's seats
//! 5. The lobby is deleted when its room ends or its last member leaves
//!
//! The registry is owned by a single task, which serializes every mutation.

use std::collections::HashMap;

use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

use crate::model::PlayerId;
use tracing::debug;

pub const LOBBY_ID_LEN: usize = 8;

/// Unique lobby identifier; doubles as the room id once the game starts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LobbyId(pub String);

impl LobbyId {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let id: String = rng
            .sample_iter(&Alphanumeric)
            .take(LOBBY_ID_LEN)
            .map(|b| (b as char).to_ascii_uppercase())
            .collect();
        LobbyId(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LobbyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LobbyStatus {
    Waiting,
    Playing,
}

/// One seat in a lobby.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyMember {
    pub id: PlayerId,
    pub name: String,
    pub ready: bool,
    pub is_host: bool,
}

/// Full lobby state, sent to its members on every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyView {
    pub id: LobbyId,
    pub host_id: PlayerId,
    pub players: Vec<LobbyMember>,
    pub max_players: usize,
    pub status: LobbyStatus,
}

/// Browser listing entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbySummary {
    pub id: LobbyId,
    pub host_name: String,
    pub player_count: usize,
    pub max_players: usize,
}

/// A game lobby.
pub type Lobby = LobbyView;

impl Lobby {
    fn new(id: LobbyId, host: PlayerId, host_name: &str, max_players: usize) -> Self {
        LobbyView {
            id,
            host_id: host,
            players: vec![LobbyMember {
                id: host,
                name: host_name.to_string(),
                ready: false,
                is_host: true,
            }],
            max_players: max_players.max(1),
            status: LobbyStatus::Waiting,
        }
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players
    }

    pub fn is_member(&self, player: PlayerId) -> bool {
        self.players.iter().any(|m| m.id == player)
    }

    /// Everyone but the host has marked ready.
    pub fn all_ready(&self) -> bool {
        self.players.iter().all(|m| m.is_host || m.ready)
    }

    fn summary(&self) -> LobbySummary {
        LobbySummary {
            id: self.id.clone(),
            host_name: self
                .players
                .iter()
                .find(|m| m.is_host)
                .map(|m| m.name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            player_count: self.players.len(),
            max_players: self.max_players,
        }
    }
}

/// Lobby operation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LobbyError {
    NotFound,
    Full,
    InProgress,
    NotMember,
    NotHost,
    NotAllReady,
}

impl std::fmt::Display for LobbyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            LobbyError::NotFound => "Lobby not found",
            LobbyError::Full => "Lobby is full",
            LobbyError::InProgress => "Game already in progress",
            LobbyError::NotMember => "Not a member of this lobby",
            LobbyError::NotHost => "Only the host can start the game",
            LobbyError::NotAllReady => "Not all players are ready",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for LobbyError {}

/// Lobby manager for tracking multiple lobbies.
pub struct LobbyManager {
    lobbies: HashMap<LobbyId, Lobby>,
    max_players: usize,
}

impl LobbyManager {
    pub fn new(max_players: usize) -> Self {
        LobbyManager {
            lobbies: HashMap::new(),
            max_players,
        }
    }

    pub fn create<R: Rng + ?Sized>(&mut self, rng: &mut R, host: PlayerId, host_name: &str) -> &Lobby {
        let mut id = LobbyId::generate(rng);
        while self.lobbies.contains_key(&id) {
            id = LobbyId::generate(rng);
        }
        let lobby = Lobby::new(id.clone(), host, host_name, self.max_players);
        self.lobbies.entry(id).or_insert(lobby)
    }

    pub fn get(&self, id: &LobbyId) -> Option<&Lobby> {
        self.lobbies.get(id)
    }

    /// Joins a waiting lobby. Rejoining is a no-op success.
    pub fn join(&mut self, id: &LobbyId, player: PlayerId, name: &str) -> Result<&Lobby, LobbyError> {
        let lobby = self.lobbies.get_mut(id).ok_or(LobbyError::NotFound)?;
        if lobby.status != LobbyStatus::Waiting {
            return Err(LobbyError::InProgress);
        }
        if !lobby.is_member(player) {
            if lobby.is_full() {
                return Err(LobbyError::Full);
            }
            lobby.players.push(LobbyMember {
                id: player,
                name: name.to_string(),
                ready: false,
                is_host: false,
            });
        }
        Ok(&*lobby)
    }

    /// Removes a member, transferring host if needed. Returns `None` when the
    /// lobby no longer exists afterwards.
    pub fn leave(&mut self, id: &LobbyId, player: PlayerId) -> Option<&Lobby> {
        let lobby = self.lobbies.get_mut(id)?;
        lobby.players.retain(|m| m.id != player);

        if lobby.players.is_empty() {
            self.lobbies.remove(id);
            debug!(lobby_id = %id, "Empty lobby removed");
            return None;
        }

        if lobby.host_id == player {
            lobby.host_id = lobby.players[0].id;
            lobby.players[0].is_host = true;
            debug!(lobby_id = %id, host = %lobby.host_id, "Host transferred");
        }
        self.lobbies.get(id)
    }

    pub fn set_ready(&mut self, id: &LobbyId, player: PlayerId, ready: bool) -> Result<&Lobby, LobbyError> {
        let lobby = self.lobbies.get_mut(id).ok_or(LobbyError::NotFound)?;
        let member = lobby
            .players
            .iter_mut()
            .find(|m| m.id == player)
            .ok_or(LobbyError::NotMember)?;
        member.ready = ready;
        Ok(&*lobby)
    }

    /// Flips the lobby to playing and hands back its roster.
    pub fn start(&mut self, id: &LobbyId, requester: PlayerId) -> Result<Vec<LobbyMember>, LobbyError> {
        let lobby = self.lobbies.get_mut(id).ok_or(LobbyError::NotFound)?;
        if lobby.host_id != requester {
            return Err(LobbyError::NotHost);
        }
        if lobby.status != LobbyStatus::Waiting {
            return Err(LobbyError::InProgress);
        }
        if !lobby.all_ready() {
            return Err(LobbyError::NotAllReady);
        }
        lobby.status = LobbyStatus::Playing;
        Ok(lobby.players.clone())
    }

    pub fn delete(&mut self, id: &LobbyId) -> bool {
        self.lobbies.remove(id).is_some()
    }

    pub fn find_player_lobby(&self, player: PlayerId) -> Option<LobbyId> {
        self.lobbies
            .values()
            .find(|l| l.is_member(player))
            .map(|l| l.id.clone())
    }

    /// Waiting lobbies with free seats.
    pub fn public_lobbies(&self) -> Vec<LobbySummary> {
        let mut out: Vec<LobbySummary> = self
            .lobbies
            .values()
            .filter(|l| l.status == LobbyStatus::Waiting && !l.is_full())
            .map(Lobby::summary)
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    pub fn len(&self) -> usize {
        self.lobbies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lobbies.is_empty()
    }
}
