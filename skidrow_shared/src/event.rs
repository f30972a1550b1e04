//! Gameplay events and command outcomes.
//!
//! Command handlers return these descriptors to their caller; the same values
//! are queued as `GameEvent`s and broadcast to everyone in the room.

use serde::{Deserialize, Serialize};

use crate::{
    chat::ChatMessage,
    math::Vec3,
    model::{Bullet, EntityId, Identity, Ping, PlayerId},
    tables::{EnemyKind, PickupKind, WeaponKind},
};

/// What the simulation did to an enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitReport {
    pub enemy_id: EntityId,
    pub damage: f32,
    pub is_headshot: bool,
    pub killed: bool,
    pub position: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KillReport {
    pub enemy_id: EntityId,
    pub killer_id: PlayerId,
    pub killer_name: String,
    pub victim_name: String,
    pub victim_identity: Identity,
    pub weapon: WeaponKind,
    pub is_headshot: bool,
    pub score: u32,
}

/// Result of damage aimed at a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DamageOutcome {
    #[serde(rename_all = "camelCase")]
    Damaged {
        player_id: PlayerId,
        damage: f32,
        source_position: Vec3,
        current_health: f32,
    },
    #[serde(rename_all = "camelCase")]
    Downed {
        player_id: PlayerId,
        player_name: String,
    },
    #[serde(rename_all = "camelCase")]
    Died {
        player_id: PlayerId,
        player_name: String,
    },
}

/// Where damage to a player came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageSource {
    Enemy,
    Projectile,
    Starvation,
    Cold,
    /// Client-reported damage (falls, environmental hazards).
    Reported,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviveOutcome {
    pub player_id: PlayerId,
    pub player_name: String,
    pub reviver_id: PlayerId,
    pub reviver_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Health,
    Hunger,
    Warmth,
    Energy,
    Ammo,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatGain {
    pub stat: Stat,
    pub amount: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PickupEffect {
    Weapon {
        weapon: WeaponKind,
    },
    Stat {
        stat: Stat,
        amount: f32,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        bonus: Option<StatGain>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupOutcome {
    #[serde(rename = "type")]
    pub kind: PickupKind,
    pub player_id: PlayerId,
    pub player_name: String,
    pub effect: PickupEffect,
}

/// Per-player line of the end-of-match summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
    pub kills: u32,
    pub headshots: u32,
    pub damage_dealt: u32,
    pub revives: u32,
    pub alive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    pub level: u32,
    pub level_name: String,
    pub total_kills: u32,
    pub players: Vec<PlayerStats>,
}

/// Everything a room announces besides its per-tick snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum GameEvent {
    BulletCreated(Bullet),
    EnemyHit(HitReport),
    EnemyKilled(KillReport),
    #[serde(rename_all = "camelCase")]
    EnemyAggro {
        enemy_id: EntityId,
        kind: EnemyKind,
        position: Vec3,
    },
    PlayerDamage(DamageOutcome),
    PlayerRevived(ReviveOutcome),
    PickupCollected(PickupOutcome),
    Ping(Ping),
    Chat(ChatMessage),
    #[serde(rename_all = "camelCase")]
    PlayerLeft {
        player_id: PlayerId,
    },
}
