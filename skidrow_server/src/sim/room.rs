//! Room simulation: the composition root for one match.
//!
//! A `Room` owns every entity of a match. It is driven by exactly one task:
//! command handlers and `advance()` both take `&mut self`, so a room never
//! needs internal locking. Collections are `BTreeMap`s so iteration order,
//! and with it every RNG draw, is stable for a given seed.

use std::collections::BTreeMap;
use std::f32::consts::TAU;

use rand::{rngs::StdRng, Rng, SeedableRng};
use skidrow_shared::{
    chat::{self, ChatBody, ChatLog, ChatMessage},
    event::{GameEvent, GameStats, PickupEffect, PickupOutcome, PlayerStats, Stat, StatGain},
    lobby::LobbyId,
    math::Vec3,
    model::{Bullet, Enemy, EntityId, Pickup, Ping, Player, PlayerId, Projectile, PLAYER_MAX_STAT},
    net::{PlayerInput, Snapshot},
    tables::{Consumable, Perk, PickupCategory, PickupKind},
};
use tracing::{debug, info};

use super::{
    perks::{Modifiers, HEALTH_BOOST},
    progression::Progression,
};

pub const WORLD_SEED_RANGE: u32 = 1_000_000;
pub const SPAWN_CIRCLE_RADIUS: f32 = 3.0;
pub const PLAYER_EYE_HEIGHT: f32 = 1.6;
pub const PLAYER_COLORS: [u32; 4] = [0x4a9eff, 0xff4a4a, 0x4aff4a, 0xffff4a];
pub const DIFFICULTY_PER_PLAYER: f32 = 0.3;
pub const INITIAL_ENEMY_LIMIT: usize = 5;
pub const INITIAL_CONSUMABLES: usize = 8;
pub const INITIAL_WEAPONS: usize = 3;
pub const PICKUP_SPIN: f32 = 0.03;
pub const PING_TTL_MS: u64 = 5_000;
pub const PICKUP_SCORE: u32 = 5;

/// A lobby seat that becomes a player when the room starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    pub id: PlayerId,
    pub name: String,
}

/// One running match.
pub struct Room {
    pub(crate) id: LobbyId,
    pub(crate) world_seed: u32,
    pub(crate) tick: u64,
    pub(crate) tick_hz: u32,
    pub(crate) seat_count: usize,
    pub(crate) difficulty_mult: f32,
    pub(crate) progress: Progression,

    pub(crate) players: BTreeMap<PlayerId, Player>,
    pub(crate) enemies: BTreeMap<EntityId, Enemy>,
    pub(crate) pickups: BTreeMap<EntityId, Pickup>,
    pub(crate) bullets: BTreeMap<EntityId, Bullet>,
    pub(crate) projectiles: BTreeMap<EntityId, Projectile>,
    pub(crate) pings: Vec<Ping>,
    pub(crate) chat: ChatLog,

    pub(crate) rng: StdRng,
    next_id: u64,
    events: Vec<GameEvent>,
}

impl Room {
    /// Starts a room seeded from OS entropy.
    pub fn new(id: LobbyId, seats: &[Seat], tick_hz: u32) -> Self {
        Self::from_rng(id, seats, tick_hz, StdRng::from_entropy())
    }

    /// Starts a fully deterministic room.
    pub fn with_seed(id: LobbyId, seats: &[Seat], tick_hz: u32, seed: u64) -> Self {
        Self::from_rng(id, seats, tick_hz, StdRng::seed_from_u64(seed))
    }

    fn from_rng(id: LobbyId, seats: &[Seat], tick_hz: u32, mut rng: StdRng) -> Self {
        let seat_count = seats.len();
        let world_seed = rng.gen_range(0..WORLD_SEED_RANGE);
        let difficulty_mult = 1.0 + seat_count.saturating_sub(1) as f32 * DIFFICULTY_PER_PLAYER;

        let players = seats
            .iter()
            .enumerate()
            .map(|(index, seat)| {
                let angle = index as f32 / seat_count as f32 * TAU;
                let position = Vec3::new(
                    angle.cos() * SPAWN_CIRCLE_RADIUS,
                    PLAYER_EYE_HEIGHT,
                    angle.sin() * SPAWN_CIRCLE_RADIUS,
                );
                let color = PLAYER_COLORS[index % PLAYER_COLORS.len()];
                (seat.id, Player::new(seat.id, seat.name.clone(), color, position))
            })
            .collect();

        let mut room = Room {
            id,
            world_seed,
            tick: 0,
            tick_hz: tick_hz.max(1),
            seat_count,
            difficulty_mult,
            progress: Progression::default(),
            players,
            enemies: BTreeMap::new(),
            pickups: BTreeMap::new(),
            bullets: BTreeMap::new(),
            projectiles: BTreeMap::new(),
            pings: Vec::new(),
            chat: ChatLog::default(),
            rng,
            next_id: 1,
            events: Vec::new(),
        };

        let initial = INITIAL_ENEMY_LIMIT.min((room.enemy_cap() as f32 / 2.0).floor() as usize);
        for _ in 0..initial {
            room.spawn_enemy(None);
        }
        for _ in 0..INITIAL_CONSUMABLES {
            room.spawn_pickup(PickupCategory::Consumable);
        }
        for _ in 0..INITIAL_WEAPONS {
            room.spawn_pickup(PickupCategory::Weapon);
        }

        info!(
            room_id = %room.id,
            players = seat_count,
            world_seed,
            difficulty = room.difficulty_mult,
            "Room started"
        );
        room
    }

    pub(crate) fn alloc_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Simulation clock in milliseconds, derived from the tick counter.
    pub fn now_ms(&self) -> u64 {
        self.tick * 1000 / u64::from(self.tick_hz)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Takes every event queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // ─── Tick ───

    /// Runs one fixed simulation step.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.run_spawners();
        self.update_enemies();
        self.update_bullets();
        self.update_projectiles();
        self.update_player_stats();
        self.update_downed_players();

        for pickup in self.pickups.values_mut() {
            pickup.rotation += PICKUP_SPIN;
        }
        self.prune_pings();

        for player in self.players.values_mut() {
            player.clamp_vitals();
        }
    }

    /// Advances the level if its conditions hold.
    pub fn check_level_up(&mut self) -> bool {
        if !self.progress.try_advance() {
            return false;
        }
        let cfg = self.progress.config();
        info!(room_id = %self.id, level = self.progress.level(), name = cfg.name, "Level up");
        self.add_system_message(format!("Entering level {}: {}", self.progress.level(), cfg.name));
        true
    }

    fn prune_pings(&mut self) {
        let now = self.now_ms();
        self.pings
            .retain(|p| now.saturating_sub(p.created_at) < PING_TTL_MS);
    }

    // ─── Commands ───

    /// Applies a client movement/look update. Dead players are ignored.
    pub fn set_input(&mut self, player_id: PlayerId, input: PlayerInput) {
        let Some(player) = self.players.get_mut(&player_id) else {
            return;
        };
        if !player.alive {
            return;
        }
        if let Some(position) = input.position {
            player.position = position;
        }
        if let Some(rotation) = input.rotation {
            player.rotation = rotation;
        }
        if let Some(stats) = input.stats {
            if let Some(energy) = stats.energy {
                player.energy = energy;
            }
            if let Some(warmth) = stats.warmth {
                player.warmth = warmth;
            }
        }
        player.clamp_vitals();
    }

    /// Picks up a world item. Exactly one caller wins a given pickup.
    pub fn collect_pickup(&mut self, pickup_id: EntityId, player_id: PlayerId) -> Option<PickupOutcome> {
        let player = self.players.get_mut(&player_id)?;
        if !player.alive || !self.pickups.contains_key(&pickup_id) {
            return None;
        }
        let pickup = self.pickups.remove(&pickup_id)?;

        let effect = apply_item(player, pickup.kind);
        player.score += PICKUP_SCORE;
        let outcome = PickupOutcome {
            kind: pickup.kind,
            player_id,
            player_name: player.name.clone(),
            effect,
        };
        debug!(room_id = %self.id, player = %player_id, kind = ?pickup.kind, "Pickup collected");
        self.emit(GameEvent::PickupCollected(outcome.clone()));
        Some(outcome)
    }

    /// Applies loot from a world container straight to the player.
    ///
    /// Container loot goes through the same item table as ground pickups, so
    /// every consumable and the ammo perk apply. No pickup entity is consumed
    /// and no pickup score is awarded.
    pub fn loot_container(&mut self, player_id: PlayerId, loot: PickupKind) -> Option<PickupOutcome> {
        let player = self.players.get_mut(&player_id)?;
        if !player.alive {
            return None;
        }
        let effect = apply_item(player, loot);
        let outcome = PickupOutcome {
            kind: loot,
            player_id,
            player_name: player.name.clone(),
            effect,
        };
        self.emit(GameEvent::PickupCollected(outcome.clone()));
        Some(outcome)
    }

    pub fn select_perk(&mut self, player_id: PlayerId, perk: Perk) {
        let Some(player) = self.players.get_mut(&player_id) else {
            return;
        };
        if perk == Perk::HealthBoost && !player.has_perk(Perk::HealthBoost) {
            player.max_health += HEALTH_BOOST;
            player.health += HEALTH_BOOST;
        }
        player.perks.push(perk);
        debug!(room_id = %self.id, player = %player_id, ?perk, "Perk selected");
    }

    /// Switches the active weapon slot if it holds a weapon.
    pub fn switch_weapon(&mut self, player_id: PlayerId, slot: usize) -> bool {
        let Some(player) = self.players.get_mut(&player_id) else {
            return false;
        };
        if player.weapons.slot(slot).is_none() {
            return false;
        }
        player.active_slot = slot;
        true
    }

    pub fn add_ping(&mut self, player_id: PlayerId, position: Vec3) -> Option<Ping> {
        let player = self.players.get(&player_id)?;
        let (player_name, color) = (player.name.clone(), player.color);
        let ping = Ping {
            id: self.alloc_id(),
            player_id,
            player_name,
            color,
            position,
            created_at: self.now_ms(),
        };
        self.pings.push(ping.clone());
        self.prune_pings();
        self.emit(GameEvent::Ping(ping.clone()));
        Some(ping)
    }

    /// Posts player chat. Unknown senders and blank text are dropped.
    pub fn post_chat(&mut self, player_id: PlayerId, text: &str) -> Option<ChatMessage> {
        let player = self.players.get(&player_id)?;
        let text = chat::sanitize(text)?;
        let body = ChatBody::Chat {
            player_id,
            player_name: player.name.clone(),
            player_color: player.color,
            text,
        };
        Some(self.push_chat(body))
    }

    pub fn add_system_message(&mut self, text: impl Into<String>) -> ChatMessage {
        self.push_chat(ChatBody::System { text: text.into() })
    }

    pub(crate) fn push_chat(&mut self, body: ChatBody) -> ChatMessage {
        let msg = ChatMessage {
            id: self.alloc_id(),
            timestamp: self.now_ms(),
            body,
        };
        self.chat.push(msg.clone());
        self.emit(GameEvent::Chat(msg.clone()));
        msg
    }

    /// Drops a player's seat. Returns false if they were not in the room.
    pub fn remove_player(&mut self, player_id: PlayerId) -> bool {
        let Some(player) = self.players.remove(&player_id) else {
            return false;
        };
        self.emit(GameEvent::PlayerLeft { player_id });
        if !self.players.is_empty() {
            self.add_system_message(format!("{} left the game", player.name));
        }
        true
    }

    // ─── Queries ───

    pub fn id(&self) -> &LobbyId {
        &self.id
    }

    pub fn world_seed(&self) -> u32 {
        self.world_seed
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn level(&self) -> u32 {
        self.progress.level()
    }

    pub fn level_name(&self) -> &'static str {
        self.progress.config().name
    }

    pub fn total_kills(&self) -> u32 {
        self.progress.total_kills()
    }

    pub fn progress(&self) -> &Progression {
        &self.progress
    }

    pub fn difficulty_mult(&self) -> f32 {
        self.difficulty_mult
    }

    /// Live-enemy limit for the current level and party size.
    pub fn enemy_cap(&self) -> usize {
        (self.progress.config().max_enemies as f32 * self.difficulty_mult).floor() as usize
    }

    pub fn has_player(&self, player_id: PlayerId) -> bool {
        self.players.contains_key(&player_id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.get(&player_id)
    }

    pub fn player_mut(&mut self, player_id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&player_id)
    }

    pub fn enemy(&self, enemy_id: EntityId) -> Option<&Enemy> {
        self.enemies.get(&enemy_id)
    }

    pub fn enemy_mut(&mut self, enemy_id: EntityId) -> Option<&mut Enemy> {
        self.enemies.get_mut(&enemy_id)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.values()
    }

    pub fn pickups(&self) -> impl Iterator<Item = &Pickup> {
        self.pickups.values()
    }

    pub fn bullets(&self) -> impl Iterator<Item = &Bullet> {
        self.bullets.values()
    }

    pub fn projectiles(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.values()
    }

    pub fn pings(&self) -> &[Ping] {
        &self.pings
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    pub fn alive_players(&self) -> impl Iterator<Item = &Player> {
        self.players.values().filter(|p| p.alive)
    }

    pub fn alive_count(&self) -> usize {
        self.alive_players().count()
    }

    /// Full world view for broadcast.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick,
            players: self.players.values().cloned().collect(),
            enemies: self.enemies.values().cloned().collect(),
            pickups: self.pickups.values().cloned().collect(),
            bullets: self.bullets.values().cloned().collect(),
            projectiles: self.projectiles.values().cloned().collect(),
            pings: self.pings.clone(),
            chat_messages: self.chat.to_vec(),
            level: self.progress.level(),
            total_kills: self.progress.total_kills(),
        }
    }

    /// End-of-match summary.
    pub fn game_stats(&self) -> GameStats {
        GameStats {
            level: self.progress.level(),
            level_name: self.level_name().to_string(),
            total_kills: self.progress.total_kills(),
            players: self
                .players
                .values()
                .map(|p| PlayerStats {
                    id: p.id,
                    name: p.name.clone(),
                    score: p.score,
                    kills: p.kills,
                    headshots: p.headshots,
                    damage_dealt: p.damage_dealt.floor() as u32,
                    revives: p.revives,
                    alive: p.alive,
                })
                .collect(),
        }
    }
}

/// Applies a pickup's effect to a player.
pub fn apply_item(player: &mut Player, kind: PickupKind) -> PickupEffect {
    let gain = |stat, amount| PickupEffect::Stat {
        stat,
        amount,
        bonus: None,
    };
    match kind {
        PickupKind::Weapon(weapon) => {
            player.weapons.1 = Some(weapon);
            PickupEffect::Weapon { weapon }
        }
        PickupKind::Consumable(Consumable::Food) => {
            player.hunger = (player.hunger + 25.0).min(PLAYER_MAX_STAT);
            gain(Stat::Hunger, 25.0)
        }
        PickupKind::Consumable(Consumable::Medicine) => {
            player.health = (player.health + 20.0).min(player.max_health);
            gain(Stat::Health, 20.0)
        }
        PickupKind::Consumable(Consumable::Ammo) => {
            let mods = Modifiers::from_perks(&player.perks);
            let amount = (15.0 * mods.ammo_mult).floor() as u32;
            player.ammo += amount;
            gain(Stat::Ammo, amount as f32)
        }
        PickupKind::Consumable(Consumable::Blanket) => {
            player.warmth = (player.warmth + 30.0).min(PLAYER_MAX_STAT);
            gain(Stat::Warmth, 30.0)
        }
        PickupKind::Consumable(Consumable::Water) => {
            player.hunger = (player.hunger + 15.0).min(PLAYER_MAX_STAT);
            player.energy = (player.energy + 20.0).min(PLAYER_MAX_STAT);
            PickupEffect::Stat {
                stat: Stat::Hunger,
                amount: 15.0,
                bonus: Some(StatGain {
                    stat: Stat::Energy,
                    amount: 20.0,
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skidrow_shared::{
        net::ReportedStats,
        tables::{EnemyKind, WeaponKind},
    };

    fn room(players: u32) -> Room {
        let seats: Vec<Seat> = (1..=players)
            .map(|i| Seat {
                id: PlayerId(i),
                name: format!("P{i}"),
            })
            .collect();
        Room::with_seed(LobbyId("ROOMTEST".into()), &seats, 30, 7)
    }

    fn count(room: &Room, category: PickupCategory) -> usize {
        room.pickups()
            .filter(|p| match category {
                PickupCategory::Weapon => matches!(p.kind, PickupKind::Weapon(_)),
                PickupCategory::Consumable => matches!(p.kind, PickupKind::Consumable(_)),
            })
            .count()
    }

    #[test]
    fn solo_room_seeds_half_the_enemy_cap() {
        let room = room(1);
        assert_eq!(room.enemy_cap(), 8);
        assert_eq!(room.enemies().count(), 4);
        assert_eq!(count(&room, PickupCategory::Consumable), INITIAL_CONSUMABLES);
        assert_eq!(count(&room, PickupCategory::Weapon), INITIAL_WEAPONS);
    }

    #[test]
    fn full_room_seeds_at_most_five_enemies() {
        let room = room(4);
        assert_eq!(room.enemy_cap(), 15);
        assert_eq!(room.enemies().count(), INITIAL_ENEMY_LIMIT);
        assert_eq!(room.pickups().count(), 11);
    }

    #[test]
    fn players_start_on_a_circle() {
        let room = room(4);
        for p in room.players() {
            assert!((p.position.planar_distance(Vec3::ZERO) - SPAWN_CIRCLE_RADIUS).abs() < 1e-4);
            assert_eq!(p.position.y, PLAYER_EYE_HEIGHT);
        }
    }

    #[test]
    fn enemy_spawner_follows_cadence_and_cap() {
        let mut room = room(2);
        room.enemies.clear();
        assert_eq!(room.enemy_cap(), 10);

        room.tick = 179;
        room.run_spawners();
        assert_eq!(room.enemies().count(), 0);

        room.tick = 180;
        room.run_spawners();
        assert_eq!(room.enemies().count(), 1);

        while room.enemies().count() < room.enemy_cap() {
            room.spawn_enemy(None);
        }
        room.tick = 360;
        room.run_spawners();
        assert_eq!(room.enemies().count(), 10);
    }

    #[test]
    fn pickup_spawner_follows_cadence_and_cap() {
        let mut room = room(3);
        room.pickups.clear();
        assert_eq!(room.pickup_rate(), 190);
        assert_eq!(room.pickup_cap(), 21);

        room.tick = 189;
        room.run_spawners();
        assert_eq!(room.pickups().count(), 0);

        room.tick = 190;
        room.run_spawners();
        assert_eq!(room.pickups().count(), 1);

        while room.pickups().count() < room.pickup_cap() {
            room.spawn_pickup(PickupCategory::Consumable);
        }
        room.tick = 380;
        room.run_spawners();
        assert_eq!(room.pickups().count(), 21);
    }

    #[test]
    fn pickup_rate_speeds_up_with_level() {
        let mut room = room(1);
        while room.progress.level() < 3 {
            for _ in 0..room.progress.config().kills_to_advance {
                room.progress.record_kill(true);
            }
            room.progress.try_advance();
        }
        assert_eq!(room.pickup_rate(), 170);
    }

    #[test]
    fn boss_never_doubles_up() {
        let mut room = room(1);
        room.spawn_enemy(Some(EnemyKind::Boss));
        assert!(room.boss_alive());
        assert!(room.spawn_boss().is_none());
        assert!(!room.progress.boss_spawned());

        room.enemies.retain(|_, e| !e.is_boss());
        let boss = room.spawn_boss();
        assert!(boss.is_some());
        assert!(room.progress.boss_spawned());

        room.enemies.clear();
        assert!(room.spawn_boss().is_none());
    }

    #[test]
    fn pings_expire_after_five_seconds() {
        let mut room = room(1);
        room.add_ping(PlayerId(1), Vec3::new(1.0, 0.0, 1.0)).unwrap();
        assert!(room.add_ping(PlayerId(9), Vec3::ZERO).is_none());

        room.tick = 149;
        room.prune_pings();
        assert_eq!(room.pings().len(), 1);

        room.tick = 150;
        room.prune_pings();
        assert!(room.pings().is_empty());
    }

    #[test]
    fn food_and_water_fill_their_stats() {
        let mut p = Player::new(PlayerId(1), "a", 0, Vec3::ZERO);
        p.hunger = 50.0;
        p.energy = 50.0;
        apply_item(&mut p, PickupKind::Consumable(Consumable::Food));
        assert_eq!(p.hunger, 75.0);

        let effect = apply_item(&mut p, PickupKind::Consumable(Consumable::Water));
        assert_eq!((p.hunger, p.energy), (90.0, 70.0));
        assert_eq!(
            effect,
            PickupEffect::Stat {
                stat: Stat::Hunger,
                amount: 15.0,
                bonus: Some(StatGain {
                    stat: Stat::Energy,
                    amount: 20.0,
                }),
            }
        );

        apply_item(&mut p, PickupKind::Consumable(Consumable::Food));
        assert_eq!(p.hunger, PLAYER_MAX_STAT);
    }

    #[test]
    fn ammo_boost_rounds_down() {
        let mut p = Player::new(PlayerId(1), "a", 0, Vec3::ZERO);
        p.ammo = 0;
        apply_item(&mut p, PickupKind::Consumable(Consumable::Ammo));
        assert_eq!(p.ammo, 15);

        p.perks.push(Perk::AmmoBoost);
        let effect = apply_item(&mut p, PickupKind::Consumable(Consumable::Ammo));
        assert_eq!(p.ammo, 33);
        assert!(matches!(effect, PickupEffect::Stat { stat: Stat::Ammo, amount, .. } if amount == 18.0));
    }

    #[test]
    fn medicine_stops_at_max_health() {
        let mut p = Player::new(PlayerId(1), "a", 0, Vec3::ZERO);
        p.health = 90.0;
        apply_item(&mut p, PickupKind::Consumable(Consumable::Medicine));
        assert_eq!(p.health, p.max_health);
    }

    #[test]
    fn health_boost_applies_once() {
        let mut room = room(1);
        room.select_perk(PlayerId(1), Perk::HealthBoost);
        room.select_perk(PlayerId(1), Perk::HealthBoost);
        let p = room.player(PlayerId(1)).unwrap();
        assert_eq!(p.max_health, 120.0);
        assert_eq!(p.health, 120.0);
        assert_eq!(p.perks, vec![Perk::HealthBoost, Perk::HealthBoost]);
    }

    #[test]
    fn empty_slot_cannot_be_selected() {
        let mut room = room(1);
        assert!(!room.switch_weapon(PlayerId(1), 1));
        assert!(!room.switch_weapon(PlayerId(1), 5));
        assert_eq!(room.player(PlayerId(1)).unwrap().active_slot, 0);

        let gun = room.insert_pickup(PickupKind::Weapon(WeaponKind::Pistol), Vec3::ZERO);
        room.collect_pickup(gun, PlayerId(1)).unwrap();
        assert!(room.switch_weapon(PlayerId(1), 1));
        assert_eq!(room.player(PlayerId(1)).unwrap().active_slot, 1);
    }

    #[test]
    fn reported_vitals_are_clamped() {
        let mut room = room(1);
        room.set_input(
            PlayerId(1),
            PlayerInput {
                position: Some(Vec3::new(2.0, 1.6, 3.0)),
                stats: Some(ReportedStats {
                    energy: Some(150.0),
                    warmth: Some(-5.0),
                }),
                ..Default::default()
            },
        );
        let p = room.player(PlayerId(1)).unwrap();
        assert_eq!((p.energy, p.warmth), (PLAYER_MAX_STAT, 0.0));
        assert_eq!(p.position, Vec3::new(2.0, 1.6, 3.0));
    }

    #[test]
    fn dead_players_ignore_input() {
        let mut room = room(1);
        room.player_mut(PlayerId(1)).unwrap().alive = false;
        room.set_input(
            PlayerId(1),
            PlayerInput {
                position: Some(Vec3::new(9.0, 1.6, 9.0)),
                ..Default::default()
            },
        );
        assert_ne!(room.player(PlayerId(1)).unwrap().position, Vec3::new(9.0, 1.6, 9.0));
    }

    #[test]
    fn container_loot_uses_the_full_item_table() {
        let mut room = room(1);
        let pickups_before = room.pickups().count();
        {
            let p = room.player_mut(PlayerId(1)).unwrap();
            p.warmth = 40.0;
            p.ammo = 0;
            p.perks.push(Perk::AmmoBoost);
        }

        let outcome = room
            .loot_container(PlayerId(1), PickupKind::Consumable(Consumable::Blanket))
            .unwrap();
        assert_eq!(outcome.player_id, PlayerId(1));
        room.loot_container(PlayerId(1), PickupKind::Consumable(Consumable::Ammo));

        let p = room.player(PlayerId(1)).unwrap();
        assert_eq!(p.warmth, 70.0);
        assert_eq!(p.ammo, 18);
        assert_eq!(p.score, 0);
        assert_eq!(room.pickups().count(), pickups_before);

        let collected = room
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::PickupCollected(_)))
            .count();
        assert_eq!(collected, 2);
    }
}
