//! Fixed stat tables.
//!
//! Every enemy, weapon, consumable, perk and level is a closed enum with its
//! attributes resolved by an exhaustive `match`, so adding a variant forces
//! every table to be filled in.

use serde::{Deserialize, Serialize};

/// Hostile archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Normal,
    Runner,
    Brute,
    Thrower,
    Boss,
}

/// Extra attributes for enemies that lob projectiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangedStats {
    /// Ticks between throws.
    pub throw_cooldown: u32,
    /// Planar distance under which the enemy holds position and throws.
    pub throw_range: f32,
}

/// Base (level 1) attributes of an enemy archetype.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub health: f32,
    /// Units per tick.
    pub speed: f32,
    pub damage: f32,
    pub spawn_weight: u32,
    pub head_multiplier: f32,
    /// Standing height; the head band sits just above it.
    pub height: f32,
    pub ranged: Option<RangedStats>,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 5] = [
        EnemyKind::Normal,
        EnemyKind::Runner,
        EnemyKind::Brute,
        EnemyKind::Thrower,
        EnemyKind::Boss,
    ];

    pub const fn stats(self) -> EnemyStats {
        match self {
            EnemyKind::Normal => EnemyStats {
                health: 30.0,
                speed: 0.035,
                damage: 8.0,
                spawn_weight: 50,
                head_multiplier: 2.0,
                height: 1.2,
                ranged: None,
            },
            EnemyKind::Runner => EnemyStats {
                health: 15.0,
                speed: 0.07,
                damage: 6.0,
                spawn_weight: 25,
                head_multiplier: 2.5,
                height: 1.2,
                ranged: None,
            },
            EnemyKind::Brute => EnemyStats {
                health: 90.0,
                speed: 0.02,
                damage: 16.0,
                spawn_weight: 15,
                head_multiplier: 1.5,
                height: 1.2,
                ranged: None,
            },
            EnemyKind::Thrower => EnemyStats {
                health: 22.0,
                speed: 0.03,
                damage: 15.0,
                spawn_weight: 10,
                head_multiplier: 2.0,
                height: 1.2,
                ranged: Some(RangedStats {
                    throw_cooldown: 180,
                    throw_range: 20.0,
                }),
            },
            EnemyKind::Boss => EnemyStats {
                health: 300.0,
                speed: 0.025,
                damage: 25.0,
                spawn_weight: 0,
                head_multiplier: 1.2,
                height: 2.2,
                ranged: None,
            },
        }
    }

    /// Spawn weight adjusted for the current level tier.
    ///
    /// Level 1 only fields normals; level 2 introduces runners plus a trickle
    /// of brutes and throwers; from level 3 the base table applies.
    pub fn spawn_weight(self, level: u32) -> u32 {
        match (self, level) {
            (EnemyKind::Runner | EnemyKind::Brute | EnemyKind::Thrower, l) if l < 2 => 0,
            (EnemyKind::Brute | EnemyKind::Thrower, 2) => 5,
            (kind, _) => kind.stats().spawn_weight,
        }
    }

    pub fn is_boss(self) -> bool {
        matches!(self, EnemyKind::Boss)
    }
}

/// Melee weapons resolve as cone attacks, ranged ones spawn bullets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponClass {
    Melee,
    Ranged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    Knife,
    Bat,
    Pipe,
    Pistol,
    Shotgun,
    Smg,
    Rifle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponStats {
    pub damage: f32,
    pub class: WeaponClass,
    /// Bullets per trigger pull, spread client-side.
    pub pellets: u8,
}

impl WeaponKind {
    /// Weapons that can appear as world pickups (the knife is the starter).
    pub const PICKUPS: [WeaponKind; 6] = [
        WeaponKind::Pistol,
        WeaponKind::Shotgun,
        WeaponKind::Smg,
        WeaponKind::Rifle,
        WeaponKind::Bat,
        WeaponKind::Pipe,
    ];

    pub const fn stats(self) -> WeaponStats {
        use WeaponClass::*;
        let (damage, class, pellets) = match self {
            WeaponKind::Knife => (35.0, Melee, 1),
            WeaponKind::Bat => (50.0, Melee, 1),
            WeaponKind::Pipe => (45.0, Melee, 1),
            WeaponKind::Pistol => (25.0, Ranged, 1),
            WeaponKind::Shotgun => (15.0, Ranged, 6),
            WeaponKind::Smg => (12.0, Ranged, 1),
            WeaponKind::Rifle => (45.0, Ranged, 1),
        };
        WeaponStats {
            damage,
            class,
            pellets,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Consumable {
    Food,
    Medicine,
    Ammo,
    Blanket,
    Water,
}

impl Consumable {
    pub const ALL: [Consumable; 5] = [
        Consumable::Food,
        Consumable::Medicine,
        Consumable::Ammo,
        Consumable::Blanket,
        Consumable::Water,
    ];
}

/// Anything lying on the ground. Serializes as the bare item name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PickupKind {
    Consumable(Consumable),
    Weapon(WeaponKind),
}

/// Which pool a pickup spawn draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupCategory {
    Consumable,
    Weapon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Perk {
    HealthBoost,
    SpeedBoost,
    DamageBoost,
    RadarBoost,
    AmmoBoost,
    WarmthBoost,
    HungerBoost,
    ReviveBoost,
    MeleeBoost,
    HeadshotBoost,
}

/// One stage of the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelConfig {
    pub name: &'static str,
    pub max_enemies: u32,
    /// Ticks between enemy spawn attempts.
    pub spawn_rate: u64,
    /// Cumulative kills required to leave this level.
    pub kills_to_advance: u32,
    /// Milestone levels also require the level boss to be dead.
    pub milestone: bool,
}

pub const LEVELS: [LevelConfig; 6] = [
    LevelConfig {
        name: "Skid Row",
        max_enemies: 8,
        spawn_rate: 180,
        kills_to_advance: 10,
        milestone: false,
    },
    LevelConfig {
        name: "The Tunnels",
        max_enemies: 12,
        spawn_rate: 150,
        kills_to_advance: 25,
        milestone: false,
    },
    LevelConfig {
        name: "Industrial Wasteland",
        max_enemies: 15,
        spawn_rate: 120,
        kills_to_advance: 45,
        milestone: true,
    },
    LevelConfig {
        name: "The Camps",
        max_enemies: 18,
        spawn_rate: 100,
        kills_to_advance: 70,
        milestone: false,
    },
    LevelConfig {
        name: "Downtown Ruins",
        max_enemies: 22,
        spawn_rate: 80,
        kills_to_advance: 100,
        milestone: false,
    },
    // Sentinel threshold: the last level is an endless plateau.
    LevelConfig {
        name: "The Depths",
        max_enemies: 25,
        spawn_rate: 60,
        kills_to_advance: 999,
        milestone: true,
    },
];

/// Looks up a 1-based level, clamping past the end of the table.
pub fn level_config(level: u32) -> &'static LevelConfig {
    let idx = (level.max(1) as usize - 1).min(LEVELS.len() - 1);
    &LEVELS[idx]
}
