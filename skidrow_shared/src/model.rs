//! Game entity records.
//!
//! These are the authoritative per-room records. They serialize directly into
//! snapshots, so field names follow the camelCase shape clients consume.

use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

use crate::{
    math::{Rotation, Vec3},
    tables::{EnemyKind, Perk, PickupKind, WeaponKind},
};

static NEXT_PLAYER_ID: AtomicU32 = AtomicU32::new(1);

/// Identifies a connected player. Also used as the connection id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

impl PlayerId {
    pub fn new_unique() -> Self {
        PlayerId(NEXT_PLAYER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Room-scoped id for every non-player entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

pub const PLAYER_MAX_STAT: f32 = 100.0;
pub const PLAYER_START_AMMO: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

/// Cosmetic identity rolled for each hostile. Immutable once spawned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub gender: Gender,
    pub age: u32,
    /// Dollars, rounded to cents.
    pub net_worth: f32,
}

/// Two weapon slots. Slot 0 always holds a weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loadout(pub WeaponKind, pub Option<WeaponKind>);

impl Loadout {
    pub fn slot(&self, index: usize) -> Option<WeaponKind> {
        match index {
            0 => Some(self.0),
            1 => self.1,
            _ => None,
        }
    }
}

impl Default for Loadout {
    fn default() -> Self {
        Loadout(WeaponKind::Knife, None)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: u32,
    pub position: Vec3,
    pub rotation: Rotation,

    pub health: f32,
    pub max_health: f32,
    pub hunger: f32,
    pub warmth: f32,
    pub energy: f32,
    pub ammo: u32,

    pub weapons: Loadout,
    pub active_slot: usize,
    /// Acquisition order, duplicates allowed.
    pub perks: Vec<Perk>,

    pub alive: bool,
    pub is_downed: bool,
    /// Ticks left before a downed player bleeds out.
    pub downed_timer: u32,

    pub score: u32,
    pub kills: u32,
    pub headshots: u32,
    pub damage_dealt: f32,
    pub revives: u32,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, color: u32, position: Vec3) -> Self {
        Self {
            id,
            name: name.into(),
            color,
            position,
            rotation: Rotation::default(),
            health: PLAYER_MAX_STAT,
            max_health: PLAYER_MAX_STAT,
            hunger: PLAYER_MAX_STAT,
            warmth: PLAYER_MAX_STAT,
            energy: PLAYER_MAX_STAT,
            ammo: PLAYER_START_AMMO,
            weapons: Loadout::default(),
            active_slot: 0,
            perks: Vec::new(),
            alive: true,
            is_downed: false,
            downed_timer: 0,
            score: 0,
            kills: 0,
            headshots: 0,
            damage_dealt: 0.0,
            revives: 0,
        }
    }

    /// Alive and on their feet.
    pub fn is_standing(&self) -> bool {
        self.alive && !self.is_downed
    }

    pub fn has_perk(&self, perk: Perk) -> bool {
        self.perks.contains(&perk)
    }

    /// Forces every vital back into its valid range.
    pub fn clamp_vitals(&mut self) {
        self.health = self.health.clamp(0.0, self.max_health);
        self.hunger = self.hunger.clamp(0.0, PLAYER_MAX_STAT);
        self.warmth = self.warmth.clamp(0.0, PLAYER_MAX_STAT);
        self.energy = self.energy.clamp(0.0, PLAYER_MAX_STAT);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enemy {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub kind: EnemyKind,
    pub identity: Identity,
    pub position: Vec3,
    /// Facing angle around Y.
    pub rotation: f32,
    pub health: f32,
    pub max_health: f32,
    pub speed: f32,
    pub damage: f32,
    pub head_multiplier: f32,
    pub attack_cooldown: u32,
    pub throw_cooldown: u32,
    pub aggroed: bool,
    /// Set once on aggro; steering still re-targets the nearest player.
    pub target_player_id: Option<PlayerId>,
}

impl Enemy {
    pub fn is_boss(&self) -> bool {
        self.kind.is_boss()
    }

    pub fn height(&self) -> f32 {
        self.kind.stats().height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pickup {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub kind: PickupKind,
    pub position: Vec3,
    /// Decorative spin.
    pub rotation: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bullet {
    pub id: EntityId,
    pub owner_id: PlayerId,
    pub weapon: WeaponKind,
    pub damage: f32,
    pub position: Vec3,
    /// Units per tick.
    pub velocity: Vec3,
    /// Simulation milliseconds.
    pub created_at: u64,
}

/// Enemy-thrown ballistic object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Projectile {
    pub id: EntityId,
    pub owner_id: EntityId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub damage: f32,
    pub created_at: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ping {
    pub id: EntityId,
    pub player_id: PlayerId,
    pub player_name: String,
    pub color: u32,
    pub position: Vec3,
    pub created_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loadout_serializes_as_pair() {
        let json = serde_json::to_string(&Loadout::default()).unwrap();
        assert_eq!(json, r#"["knife",null]"#);
    }

    #[test]
    fn clamp_vitals_bounds_every_stat() {
        let mut p = Player::new(PlayerId(1), "a", 0, Vec3::ZERO);
        p.health = -12.0;
        p.hunger = 130.0;
        p.warmth = -1.0;
        p.energy = 100.5;
        p.clamp_vitals();
        assert_eq!((p.health, p.hunger, p.warmth, p.energy), (0.0, 100.0, 0.0, 100.0));
    }
}
