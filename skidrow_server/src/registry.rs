//! Running rooms, keyed by room id.
//!
//! Owned by the host task. `teardown` is the single gate for ending a room:
//! the first call removes it, every later call is a no-op.

use std::collections::{BTreeMap, HashMap};

use skidrow_shared::{lobby::LobbyId, model::PlayerId};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    sim::Room,
    worker::{Outbound, RoomClosed, RoomCommand, RoomExit, RoomWorker},
};

/// Host-side handle to a room worker.
struct RoomHandle {
    commands: mpsc::Sender<RoomCommand>,
    control: mpsc::UnboundedSender<RoomCommand>,
    task: JoinHandle<RoomExit>,
    members: Vec<PlayerId>,
}

pub struct RoomRegistry {
    rooms: HashMap<LobbyId, RoomHandle>,
    player_rooms: HashMap<PlayerId, LobbyId>,
    tick_hz: u32,
    command_queue: usize,
    closed: mpsc::Sender<RoomClosed>,
}

impl RoomRegistry {
    /// Workers report their own shutdown on `closed`.
    pub fn new(tick_hz: u32, command_queue: usize, closed: mpsc::Sender<RoomClosed>) -> Self {
        Self {
            rooms: HashMap::new(),
            player_rooms: HashMap::new(),
            tick_hz,
            command_queue: command_queue.max(1),
            closed,
        }
    }

    /// Spawns the worker for `room` and starts routing its members' commands.
    pub fn launch(&mut self, room: Room, members: BTreeMap<PlayerId, Outbound>) -> LobbyId {
        let room_id = room.id().clone();
        let (tx, rx) = mpsc::channel(self.command_queue);
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let member_ids: Vec<PlayerId> = members.keys().copied().collect();
        for id in &member_ids {
            self.player_rooms.insert(*id, room_id.clone());
        }

        let worker = RoomWorker::new(room, members, rx, control_rx, self.closed.clone());
        let task = tokio::spawn(worker.run(self.tick_hz));
        info!(room_id = %room_id, players = member_ids.len(), "Room launched");

        self.rooms.insert(
            room_id.clone(),
            RoomHandle {
                commands: tx,
                control: control_tx,
                task,
                members: member_ids,
            },
        );
        room_id
    }

    pub fn room_of(&self, player: PlayerId) -> Option<&LobbyId> {
        self.player_rooms.get(&player)
    }

    /// Queues a gameplay command for the player's room. Returns false if the
    /// player is not in a room or the command was dropped.
    ///
    /// The host task never waits on a room. When a room's queue is full the
    /// command is dropped with a warning; the client converges on the next
    /// snapshot.
    pub fn route(&self, player: PlayerId, cmd: RoomCommand) -> bool {
        let Some((room_id, handle)) = self
            .player_rooms
            .get(&player)
            .and_then(|id| self.rooms.get(id).map(|h| (id, h)))
        else {
            return false;
        };
        match handle.commands.try_send(cmd) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(room_id = %room_id, player = %player, "Room command queue full, dropping command");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!(room_id = %room_id, player = %player, "Room gone before command");
                false
            }
        }
    }

    /// Detaches a player from their room and tells the worker. The leave goes
    /// over the control channel, which has no capacity limit.
    pub fn leave(&mut self, player: PlayerId) -> Option<LobbyId> {
        let room_id = self.player_rooms.remove(&player)?;
        if let Some(handle) = self.rooms.get_mut(&room_id) {
            handle.members.retain(|m| *m != player);
            if handle
                .control
                .send(RoomCommand::Leave { player_id: player })
                .is_err()
            {
                debug!(room_id = %room_id, player = %player, "Room gone before leave");
            }
        }
        Some(room_id)
    }

    /// Ends a room. Only the first call for a given id does anything.
    pub fn teardown(&mut self, room_id: &LobbyId) -> bool {
        let Some(handle) = self.rooms.remove(room_id) else {
            return false;
        };
        for member in &handle.members {
            self.player_rooms.remove(member);
        }
        handle.task.abort();
        info!(room_id = %room_id, "Room torn down");
        true
    }

    pub fn contains(&self, room_id: &LobbyId) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
