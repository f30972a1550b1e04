//! Networking primitives.
//!
//! Goals:
//! - One reliable, ordered channel per client (length-prefixed JSON over TCP).
//! - Client commands and server messages as explicit, versionable enums.
//! - Snapshots are always full replacements; there is no delta encoding.

use anyhow::Context;
use bytes::{BufMut, Bytes, BytesMut};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpListener, TcpStream,
    },
};

use crate::{
    chat::ChatMessage,
    event::{DamageSource, GameEvent, GameStats},
    lobby::{LobbyId, LobbySummary, LobbyView},
    math::{Rotation, Vec3},
    model::{Bullet, EntityId, Enemy, Pickup, Ping, Player, PlayerId, Projectile},
    tables::{Perk, PickupKind, WeaponKind},
};

/// Protocol version for compatibility checks.
pub const PROTOCOL_VERSION: u32 = 1;

/// Frames larger than this are treated as a protocol violation.
pub const MAX_FRAME_LEN: usize = 4 * 1024 * 1024;

/// Optional client-reported vitals (sprinting drains energy client-side).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ReportedStats {
    pub energy: Option<f32>,
    pub warmth: Option<f32>,
}

/// Client movement/look update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct PlayerInput {
    pub position: Option<Vec3>,
    pub rotation: Option<Rotation>,
    pub stats: Option<ReportedStats>,
}

/// Client -> server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMsg {
    // ─── Connection ───
    Hello {
        protocol: u32,
        name: String,
    },

    // ─── Lobby ───
    ListLobbies,
    CreateLobby,
    #[serde(rename_all = "camelCase")]
    JoinLobby {
        lobby_id: LobbyId,
    },
    LeaveLobby,
    SetReady {
        ready: bool,
    },
    StartGame,

    // ─── Gameplay ───
    Input(PlayerInput),
    Shoot {
        position: Vec3,
        direction: Vec3,
        weapon: Option<WeaponKind>,
        damage: Option<f32>,
    },
    Melee {
        position: Vec3,
        direction: Vec3,
        weapon: WeaponKind,
        damage: f32,
        range: f32,
    },
    Hit {
        damage: f32,
        source: DamageSource,
    },
    #[serde(rename_all = "camelCase")]
    Revive {
        target_id: PlayerId,
        reviver_id: PlayerId,
    },
    #[serde(rename_all = "camelCase")]
    CollectPickup {
        pickup_id: EntityId,
        player_id: PlayerId,
    },
    LootContainer {
        loot: PickupKind,
    },
    #[serde(rename_all = "camelCase")]
    SelectPerk {
        player_id: PlayerId,
        perk: Perk,
    },
    #[serde(rename_all = "camelCase")]
    Ping {
        player_id: PlayerId,
        position: Vec3,
    },
    GlassBreak {
        position: Vec3,
    },
    Chat {
        text: String,
    },
    SwitchWeapon {
        slot: usize,
    },
}

/// Full world view, broadcast every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub tick: u64,
    pub players: Vec<Player>,
    pub enemies: Vec<Enemy>,
    pub pickups: Vec<Pickup>,
    pub bullets: Vec<Bullet>,
    pub projectiles: Vec<Projectile>,
    pub pings: Vec<Ping>,
    pub chat_messages: Vec<ChatMessage>,
    pub level: u32,
    pub total_kills: u32,
}

/// Server -> client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMsg {
    #[serde(rename_all = "camelCase")]
    Welcome {
        client_id: PlayerId,
    },
    Lobbies {
        lobbies: Vec<LobbySummary>,
    },
    LobbyUpdated(LobbyView),
    Error {
        reason: String,
    },
    #[serde(rename_all = "camelCase")]
    GameStarted {
        room_id: LobbyId,
        world_seed: u32,
        level: u32,
        players: Vec<Player>,
    },
    Snapshot(Snapshot),
    Event(GameEvent),
    #[serde(rename_all = "camelCase")]
    LevelUp {
        level: u32,
        level_name: String,
    },
    GameOver {
        reason: String,
        stats: GameStats,
    },
}

/// Writes one length-prefixed JSON frame.
pub async fn write_frame<W, T>(w: &mut W, msg: &T) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let payload = serde_json::to_vec(msg).context("serialize msg")?;
    let mut buf = BytesMut::with_capacity(4 + payload.len());
    buf.put_u32(payload.len() as u32);
    buf.extend_from_slice(&payload);
    w.write_all(&buf).await.context("tcp write")?;
    Ok(())
}

/// Reads one length-prefixed JSON frame.
pub async fn read_frame<R, T>(r: &mut R) -> anyhow::Result<T>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut len_buf = [0u8; 4];
    r.read_exact(&mut len_buf).await.context("tcp read len")?;
    let len = u32::from_be_bytes(len_buf) as usize;
    anyhow::ensure!(len <= MAX_FRAME_LEN, "frame of {len} bytes exceeds limit");
    let mut payload = vec![0u8; len];
    r.read_exact(&mut payload)
        .await
        .context("tcp read payload")?;
    let msg = serde_json::from_slice(&payload).context("deserialize msg")?;
    Ok(msg)
}

/// True when `err` from `read_frame` is the peer going away rather than a
/// malformed frame.
pub fn is_disconnect(err: &anyhow::Error) -> bool {
    err.downcast_ref::<std::io::Error>().is_some_and(|e| {
        matches!(
            e.kind(),
            std::io::ErrorKind::UnexpectedEof
                | std::io::ErrorKind::ConnectionReset
                | std::io::ErrorKind::ConnectionAborted
                | std::io::ErrorKind::BrokenPipe
        )
    })
}

/// Reliable connection over TCP with length-prefixed frames.
#[derive(Debug)]
pub struct ReliableConn {
    stream: TcpStream,
}

impl ReliableConn {
    pub fn new(stream: TcpStream) -> Self {
        Self { stream }
    }

    pub async fn connect(addr: SocketAddr) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await.context("tcp connect")?;
        stream.set_nodelay(true).context("set nodelay")?;
        Ok(Self { stream })
    }

    pub async fn send<T: Serialize>(&mut self, msg: &T) -> anyhow::Result<()> {
        write_frame(&mut self.stream, msg).await
    }

    pub async fn recv<T: DeserializeOwned>(&mut self) -> anyhow::Result<T> {
        read_frame(&mut self.stream).await
    }

    pub fn peer_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.stream.peer_addr()?)
    }

    /// Splits into independently owned read and write halves.
    pub fn into_split(self) -> (OwnedReadHalf, OwnedWriteHalf) {
        self.stream.into_split()
    }
}

/// TCP server listener.
pub struct ReliableListener {
    listener: TcpListener,
}

impl ReliableListener {
    pub async fn bind(addr: SocketAddr) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await.context("tcp bind")?;
        Ok(Self { listener })
    }

    pub async fn accept(&self) -> anyhow::Result<(ReliableConn, SocketAddr)> {
        let (stream, addr) = self.listener.accept().await.context("tcp accept")?;
        stream.set_nodelay(true).context("set nodelay")?;
        Ok((ReliableConn::new(stream), addr))
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }
}

/// Convenience codec helpers.
pub fn encode_to_bytes<T: Serialize>(msg: &T) -> anyhow::Result<Bytes> {
    let payload = serde_json::to_vec(msg).context("serialize")?;
    Ok(Bytes::from(payload))
}

pub fn decode_from_bytes<T: DeserializeOwned>(b: &[u8]) -> anyhow::Result<T> {
    serde_json::from_slice(b).context("deserialize")
}
