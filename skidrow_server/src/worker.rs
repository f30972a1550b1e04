//! Per-room worker task.
//!
//! The worker is the only owner of its `Room`. Gameplay commands from the
//! host arrive on a bounded channel and are applied in arrival order between
//! ticks. Departures ride a separate unbounded control channel that is always
//! drained first, so a flooded room still sees every leave. The fixed-rate
//! ticker advances the simulation and broadcasts the results.

use std::{collections::BTreeMap, time::Duration};

use skidrow_shared::{
    lobby::LobbyId,
    model::PlayerId,
    net::{ClientMsg, ServerMsg},
};
use tokio::{
    sync::mpsc,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::sim::Room;

/// Outbound queue of one connected client.
pub type Outbound = mpsc::Sender<ServerMsg>;

pub const GAME_OVER_REASON: &str = "All players eliminated";

/// Host -> room.
#[derive(Debug)]
pub enum RoomCommand {
    Client { player_id: PlayerId, msg: ClientMsg },
    Leave { player_id: PlayerId },
}

/// Why a room worker stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomExit {
    GameOver,
    Empty,
    HostGone,
}

/// Room -> host, sent once when the worker stops on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomClosed {
    pub room_id: LobbyId,
    pub exit: RoomExit,
}

/// Applies one gameplay message from `player_id`. Lobby and connection
/// messages are the host's business and are ignored here.
pub fn dispatch(room: &mut Room, player_id: PlayerId, msg: ClientMsg) {
    match msg {
        ClientMsg::Input(input) => room.set_input(player_id, input),
        ClientMsg::Shoot {
            position,
            direction,
            weapon,
            damage,
        } => {
            room.create_bullet(player_id, position, direction, weapon, damage);
        }
        ClientMsg::Melee {
            position,
            direction,
            weapon,
            damage,
            range,
        } => {
            room.melee_attack(player_id, position, direction, weapon, damage, range);
        }
        ClientMsg::Hit { damage, source } => {
            if let Some(at) = room.player(player_id).map(|p| p.position) {
                room.apply_player_damage(player_id, damage, at, source);
            }
        }
        ClientMsg::Revive {
            target_id,
            reviver_id,
        } => {
            room.revive(target_id, reviver_id);
        }
        ClientMsg::CollectPickup {
            pickup_id,
            player_id,
        } => {
            room.collect_pickup(pickup_id, player_id);
        }
        ClientMsg::LootContainer { loot } => {
            room.loot_container(player_id, loot);
        }
        ClientMsg::SelectPerk { player_id, perk } => room.select_perk(player_id, perk),
        ClientMsg::Ping {
            player_id,
            position,
        } => {
            room.add_ping(player_id, position);
        }
        ClientMsg::GlassBreak { position } => {
            room.alert_enemies(position);
        }
        ClientMsg::Chat { text } => {
            room.post_chat(player_id, &text);
        }
        ClientMsg::SwitchWeapon { slot } => {
            room.switch_weapon(player_id, slot);
        }
        ClientMsg::Hello { .. }
        | ClientMsg::ListLobbies
        | ClientMsg::CreateLobby
        | ClientMsg::JoinLobby { .. }
        | ClientMsg::LeaveLobby
        | ClientMsg::SetReady { .. }
        | ClientMsg::StartGame => {
            debug!(room_id = %room.id(), player = %player_id, "Ignoring non-gameplay message");
        }
    }
}

/// Owns one running room.
pub struct RoomWorker {
    room: Room,
    members: BTreeMap<PlayerId, Outbound>,
    commands: mpsc::Receiver<RoomCommand>,
    control: mpsc::UnboundedReceiver<RoomCommand>,
    closed: mpsc::Sender<RoomClosed>,
}

impl RoomWorker {
    pub fn new(
        room: Room,
        members: BTreeMap<PlayerId, Outbound>,
        commands: mpsc::Receiver<RoomCommand>,
        control: mpsc::UnboundedReceiver<RoomCommand>,
        closed: mpsc::Sender<RoomClosed>,
    ) -> Self {
        Self {
            room,
            members,
            commands,
            control,
            closed,
        }
    }

    /// Runs until the match ends, the room empties or the host goes away.
    pub async fn run(mut self, tick_hz: u32) -> RoomExit {
        let period = Duration::from_secs_f64(1.0 / f64::from(tick_hz.max(1)));
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let exit = loop {
            tokio::select! {
                biased;
                cmd = self.control.recv() => {
                    let Some(cmd) = cmd else {
                        break RoomExit::HostGone;
                    };
                    if let Some(exit) = self.on_command(cmd) {
                        break exit;
                    }
                }
                cmd = self.commands.recv() => {
                    let Some(cmd) = cmd else {
                        break RoomExit::HostGone;
                    };
                    if let Some(exit) = self.on_command(cmd) {
                        break exit;
                    }
                }
                _ = ticker.tick() => {
                    if let Some(exit) = self.on_tick() {
                        break exit;
                    }
                }
            }
        };

        info!(room_id = %self.room.id(), ?exit, tick = self.room.tick(), "Room worker stopped");
        if exit != RoomExit::HostGone {
            let closed = RoomClosed {
                room_id: self.room.id().clone(),
                exit: exit.clone(),
            };
            if self.closed.send(closed).await.is_err() {
                debug!(room_id = %self.room.id(), "Host gone before room close");
            }
        }
        exit
    }

    fn on_command(&mut self, cmd: RoomCommand) -> Option<RoomExit> {
        match cmd {
            RoomCommand::Client { player_id, msg } => {
                dispatch(&mut self.room, player_id, msg);
                self.flush_events();
                None
            }
            RoomCommand::Leave { player_id } => {
                self.members.remove(&player_id);
                self.room.remove_player(player_id);
                self.flush_events();
                (self.room.player_count() == 0).then_some(RoomExit::Empty)
            }
        }
    }

    fn on_tick(&mut self) -> Option<RoomExit> {
        self.room.advance();
        self.flush_events();

        if self.room.check_level_up() {
            self.flush_events();
            self.broadcast(ServerMsg::LevelUp {
                level: self.room.level(),
                level_name: self.room.level_name().to_string(),
            });
        }

        if self.room.alive_count() == 0 {
            info!(room_id = %self.room.id(), level = self.room.level(), "Game over");
            self.broadcast(ServerMsg::GameOver {
                reason: GAME_OVER_REASON.to_string(),
                stats: self.room.game_stats(),
            });
            return Some(RoomExit::GameOver);
        }

        self.broadcast(ServerMsg::Snapshot(self.room.snapshot()));
        None
    }

    fn flush_events(&mut self) {
        for event in self.room.drain_events() {
            self.broadcast(ServerMsg::Event(event));
        }
    }

    /// Never blocks the tick; a client that cannot keep up loses messages.
    fn broadcast(&self, msg: ServerMsg) {
        for (player_id, tx) in &self.members {
            if let Err(e) = tx.try_send(msg.clone()) {
                warn!(room_id = %self.room.id(), player = %player_id, error = %e, "Dropping outbound message");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Seat;
    use skidrow_shared::{event::GameEvent, math::Vec3, net::PlayerInput};

    fn solo() -> Room {
        let seats = [Seat {
            id: PlayerId(1),
            name: "Solo".into(),
        }];
        Room::with_seed(LobbyId("WORKER01".into()), &seats, 30, 11)
    }

    #[test]
    fn dispatch_routes_chat_and_input() {
        let mut room = solo();
        dispatch(
            &mut room,
            PlayerId(1),
            ClientMsg::Input(PlayerInput {
                position: Some(Vec3::new(4.0, 1.6, 4.0)),
                ..Default::default()
            }),
        );
        assert_eq!(room.player(PlayerId(1)).unwrap().position, Vec3::new(4.0, 1.6, 4.0));

        dispatch(&mut room, PlayerId(1), ClientMsg::Chat { text: "hi".into() });
        let events = room.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::Chat(_))));
    }

    #[tokio::test]
    async fn leaving_last_player_closes_room() {
        let (_cmd_tx, cmd_rx) = mpsc::channel(8);
        let (ctl_tx, ctl_rx) = mpsc::unbounded_channel();
        let (closed_tx, mut closed_rx) = mpsc::channel(1);
        let (out_tx, _out_rx) = mpsc::channel(1024);
        let members = BTreeMap::from([(PlayerId(1), out_tx)]);
        let worker = RoomWorker::new(solo(), members, cmd_rx, ctl_rx, closed_tx);
        let task = tokio::spawn(worker.run(30));

        ctl_tx
            .send(RoomCommand::Leave {
                player_id: PlayerId(1),
            })
            .unwrap();
        assert_eq!(task.await.unwrap(), RoomExit::Empty);
        let closed = closed_rx.recv().await.unwrap();
        assert_eq!(closed.exit, RoomExit::Empty);
        assert_eq!(closed.room_id, LobbyId("WORKER01".into()));
    }

    #[tokio::test]
    async fn ticking_room_sends_snapshots() {
        let (_cmd_tx, cmd_rx) = mpsc::channel(8);
        let (_ctl_tx, ctl_rx) = mpsc::unbounded_channel();
        let (closed_tx, _closed_rx) = mpsc::channel(1);
        let (out_tx, mut out_rx) = mpsc::channel(1024);
        let members = BTreeMap::from([(PlayerId(1), out_tx)]);
        let worker = RoomWorker::new(solo(), members, cmd_rx, ctl_rx, closed_tx);
        let task = tokio::spawn(worker.run(100));

        let mut snapshots = 0;
        while snapshots < 3 {
            if let Some(ServerMsg::Snapshot(snap)) = out_rx.recv().await {
                assert!(snap.tick >= 1);
                snapshots += 1;
            }
        }
        task.abort();
    }
}
