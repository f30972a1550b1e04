//! Game host.
//!
//! One host task owns the lobby registry and the room registry. Every
//! connection runs a reader task and a writer task; readers forward decoded
//! messages to the host over a single channel, so lobby mutations are
//! serialized without locks. Running rooms live on their own worker tasks
//! (see `worker`).
//!
//! Determinism notes:
//! - Room simulation is driven by its tick counter, never the wall clock.
//! - Use stable ordering when iterating collections that feed the RNG.

use std::{
    collections::{BTreeMap, HashMap},
    net::{IpAddr, Ipv4Addr, SocketAddr},
};

use anyhow::Context;
use rand::{rngs::StdRng, SeedableRng};
use skidrow_shared::{
    config::ServerConfig,
    lobby::{Lobby, LobbyError, LobbyId, LobbyManager},
    model::PlayerId,
    net::{is_disconnect, read_frame, write_frame, ClientMsg, ReliableConn, ReliableListener, ServerMsg, PROTOCOL_VERSION},
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    registry::RoomRegistry,
    sim::{Room, Seat},
    worker::{Outbound, RoomClosed, RoomCommand},
};

/// Per-client outbound queue depth. A full queue drops messages.
pub const OUTBOUND_QUEUE: usize = 1024;
const HOST_QUEUE: usize = 1024;

/// Connection -> host.
#[derive(Debug)]
pub enum HostEvent {
    Connected {
        id: PlayerId,
        name: String,
        outbound: Outbound,
    },
    Message {
        id: PlayerId,
        msg: ClientMsg,
    },
    Disconnected {
        id: PlayerId,
    },
}

/// Connected client state.
struct ClientState {
    name: String,
    outbound: Outbound,
}

/// Game server.
pub struct GameServer {
    pub cfg: ServerConfig,
    listener: ReliableListener,
    clients: HashMap<PlayerId, ClientState>,
    lobbies: LobbyManager,
    rooms: RoomRegistry,
    events_tx: mpsc::Sender<HostEvent>,
    events_rx: mpsc::Receiver<HostEvent>,
    closed_rx: mpsc::Receiver<RoomClosed>,
    rng: StdRng,
}

impl GameServer {
    /// Binds the listener described by `cfg`.
    pub async fn bind(cfg: ServerConfig) -> anyhow::Result<Self> {
        let addr: SocketAddr = cfg.server_addr.parse().context("parse server_addr")?;
        let listener = ReliableListener::bind(addr).await?;
        Ok(Self::with_listener(cfg, listener))
    }

    fn with_listener(cfg: ServerConfig, listener: ReliableListener) -> Self {
        let (events_tx, events_rx) = mpsc::channel(HOST_QUEUE);
        let (closed_tx, closed_rx) = mpsc::channel(HOST_QUEUE);
        Self {
            lobbies: LobbyManager::new(cfg.max_players_per_lobby),
            rooms: RoomRegistry::new(cfg.tick_hz, cfg.command_queue, closed_tx),
            cfg,
            listener,
            clients: HashMap::new(),
            events_tx,
            events_rx,
            closed_rx,
            rng: StdRng::from_entropy(),
        }
    }

    /// Returns the local address (after binding).
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts clients and services host events until the listener fails.
    pub async fn run(mut self) -> anyhow::Result<()> {
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (conn, peer) = accepted?;
                    let events = self.events_tx.clone();
                    tokio::spawn(async move {
                        if let Err(e) = serve_connection(conn, events).await {
                            debug!(%peer, error = %e, "Connection ended");
                        }
                    });
                }
                Some(event) = self.events_rx.recv() => self.on_event(event),
                Some(closed) = self.closed_rx.recv() => self.on_room_closed(closed),
            }
        }
    }

    fn on_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::Connected { id, name, outbound } => {
                info!(client_id = %id, %name, "Client connected");
                self.clients.insert(id, ClientState { name, outbound });
            }
            HostEvent::Message { id, msg } => self.on_message(id, msg),
            HostEvent::Disconnected { id } => self.on_disconnect(id),
        }
    }

    fn on_message(&mut self, id: PlayerId, msg: ClientMsg) {
        let Some(name) = self.clients.get(&id).map(|c| c.name.clone()) else {
            return;
        };
        match msg {
            ClientMsg::Hello { .. } => debug!(client_id = %id, "Duplicate hello ignored"),
            ClientMsg::ListLobbies => {
                let lobbies = self.lobbies.public_lobbies();
                self.send(id, ServerMsg::Lobbies { lobbies });
            }
            ClientMsg::CreateLobby => {
                if self.lobbies.find_player_lobby(id).is_some() {
                    self.send_error(id, "already in a lobby");
                    return;
                }
                let lobby = self.lobbies.create(&mut self.rng, id, &name).clone();
                info!(client_id = %id, lobby_id = %lobby.id, "Lobby created");
                self.send(id, ServerMsg::LobbyUpdated(lobby));
            }
            ClientMsg::JoinLobby { lobby_id } => {
                let joined = self.lobbies.join(&lobby_id, id, &name).cloned();
                self.publish_lobby(id, joined);
            }
            ClientMsg::LeaveLobby => {
                if let Some(lobby_id) = self.lobbies.find_player_lobby(id) {
                    if let Some(lobby) = self.lobbies.leave(&lobby_id, id).cloned() {
                        self.broadcast_lobby(&lobby);
                    }
                }
            }
            ClientMsg::SetReady { ready } => {
                let Some(lobby_id) = self.lobbies.find_player_lobby(id) else {
                    self.send_error(id, &LobbyError::NotMember.to_string());
                    return;
                };
                let updated = self.lobbies.set_ready(&lobby_id, id, ready).cloned();
                self.publish_lobby(id, updated);
            }
            ClientMsg::StartGame => self.start_game(id),
            gameplay => {
                if !self.rooms.route(id, RoomCommand::Client { player_id: id, msg: gameplay }) {
                    debug!(client_id = %id, "Gameplay message not routed");
                }
            }
        }
    }

    fn start_game(&mut self, requester: PlayerId) {
        let Some(lobby_id) = self.lobbies.find_player_lobby(requester) else {
            self.send_error(requester, &LobbyError::NotMember.to_string());
            return;
        };
        let roster = match self.lobbies.start(&lobby_id, requester) {
            Ok(roster) => roster,
            Err(e) => {
                self.send_error(requester, &e.to_string());
                return;
            }
        };

        let seats: Vec<Seat> = roster
            .iter()
            .map(|m| Seat {
                id: m.id,
                name: m.name.clone(),
            })
            .collect();
        let room = Room::new(lobby_id.clone(), &seats, self.cfg.tick_hz);
        let started = ServerMsg::GameStarted {
            room_id: lobby_id.clone(),
            world_seed: room.world_seed(),
            level: room.level(),
            players: room.players().cloned().collect(),
        };

        let members: BTreeMap<PlayerId, Outbound> = roster
            .iter()
            .filter_map(|m| self.clients.get(&m.id).map(|c| (m.id, c.outbound.clone())))
            .collect();
        for tx in members.values() {
            if tx.try_send(started.clone()).is_err() {
                warn!(room_id = %lobby_id, "Client missed game start");
            }
        }
        self.rooms.launch(room, members);
    }

    fn on_disconnect(&mut self, id: PlayerId) {
        if self.clients.remove(&id).is_none() {
            return;
        }
        info!(client_id = %id, "Client disconnected");

        if let Some(lobby_id) = self.lobbies.find_player_lobby(id) {
            if let Some(lobby) = self.lobbies.leave(&lobby_id, id).cloned() {
                self.broadcast_lobby(&lobby);
            }
        }
        self.rooms.leave(id);
    }

    fn on_room_closed(&mut self, closed: RoomClosed) {
        // A late report for a room that is already gone is a no-op.
        if self.rooms.teardown(&closed.room_id) {
            self.lobbies.delete(&closed.room_id);
            info!(room_id = %closed.room_id, exit = ?closed.exit, rooms = self.rooms.len(), "Room closed");
        }
    }

    fn publish_lobby(&mut self, id: PlayerId, result: Result<Lobby, LobbyError>) {
        match result {
            Ok(lobby) => self.broadcast_lobby(&lobby),
            Err(e) => self.send_error(id, &e.to_string()),
        }
    }

    fn broadcast_lobby(&self, lobby: &Lobby) {
        for member in &lobby.players {
            self.send(member.id, ServerMsg::LobbyUpdated(lobby.clone()));
        }
    }

    fn send_error(&self, id: PlayerId, reason: &str) {
        self.send(
            id,
            ServerMsg::Error {
                reason: reason.to_string(),
            },
        );
    }

    fn send(&self, id: PlayerId, msg: ServerMsg) {
        if let Some(client) = self.clients.get(&id) {
            if client.outbound.try_send(msg).is_err() {
                warn!(client_id = %id, "Outbound queue full");
            }
        }
    }

    /// Number of running rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_room_running(&self, id: &LobbyId) -> bool {
        self.rooms.contains(id)
    }
}

/// Handshake, then pump frames both ways until either side closes.
async fn serve_connection(mut conn: ReliableConn, events: mpsc::Sender<HostEvent>) -> anyhow::Result<()> {
    let name = match conn.recv::<ClientMsg>().await? {
        ClientMsg::Hello { protocol, name } if protocol == PROTOCOL_VERSION => name,
        other => anyhow::bail!("unexpected handshake msg: {other:?}"),
    };

    let id = PlayerId::new_unique();
    conn.send(&ServerMsg::Welcome { client_id: id }).await?;

    let (mut reader, mut writer) = conn.into_split();
    let (outbound, mut outbound_rx) = mpsc::channel::<ServerMsg>(OUTBOUND_QUEUE);
    events
        .send(HostEvent::Connected { id, name, outbound })
        .await
        .context("host gone")?;

    let writer_task = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            if let Err(e) = write_frame(&mut writer, &msg).await {
                debug!(client_id = %id, error = %e, "Write failed");
                break;
            }
        }
    });

    let result = loop {
        match read_frame::<_, ClientMsg>(&mut reader).await {
            Ok(msg) => {
                if events.send(HostEvent::Message { id, msg }).await.is_err() {
                    break Ok(());
                }
            }
            Err(e) => break Err(e),
        }
    };

    match &result {
        Err(e) if is_disconnect(e) => debug!(client_id = %id, "Client closed connection"),
        Err(e) => warn!(client_id = %id, error = %e, "Dropping connection"),
        Ok(()) => {}
    }
    let _ = events.send(HostEvent::Disconnected { id }).await;
    writer_task.abort();
    result
}

/// Helper for tests: bind to an ephemeral port.
pub async fn bind_ephemeral(tick_hz: u32) -> anyhow::Result<(GameServer, ServerConfig)> {
    let mut cfg = ServerConfig {
        server_addr: format!("{}:{}", IpAddr::V4(Ipv4Addr::LOCALHOST), 0),
        tick_hz,
        ..Default::default()
    };
    let listener = ReliableListener::bind(cfg.server_addr.parse()?).await?;
    cfg.server_addr = listener.local_addr()?.to_string();
    Ok((GameServer::with_listener(cfg.clone(), listener), cfg))
}
