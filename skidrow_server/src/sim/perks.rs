//! Perk effects, folded into a single modifier record.
//!
//! Gameplay code asks for a player's `Modifiers` instead of probing the perk
//! list, so every server-side perk interaction lives here.

use skidrow_shared::tables::Perk;

pub const HUNGER_DECAY_INTERVAL: u64 = 120;
pub const WARMTH_DECAY_INTERVAL: u64 = 100;

/// Effective server-side modifiers for one player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Modifiers {
    /// Extra multiplier on top of an enemy's head multiplier.
    pub headshot_mult: f32,
    /// Multiplier on ammo gained from pickups.
    pub ammo_mult: f32,
    /// Ticks between hunger decrements.
    pub hunger_interval: u64,
    /// Ticks between warmth decrements.
    pub warmth_interval: u64,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            headshot_mult: 1.0,
            ammo_mult: 1.0,
            hunger_interval: HUNGER_DECAY_INTERVAL,
            warmth_interval: WARMTH_DECAY_INTERVAL,
        }
    }
}

impl Modifiers {
    /// Duplicated perks do not stack.
    pub fn from_perks(perks: &[Perk]) -> Self {
        let mut m = Modifiers::default();
        for perk in perks {
            match perk {
                Perk::HeadshotBoost => m.headshot_mult = 1.25,
                Perk::AmmoBoost => m.ammo_mult = 1.25,
                Perk::HungerBoost => m.hunger_interval = 150,
                Perk::WarmthBoost => m.warmth_interval = 140,
                // Applied once on acquisition.
                Perk::HealthBoost => {}
                // Client-side only.
                Perk::SpeedBoost
                | Perk::DamageBoost
                | Perk::RadarBoost
                | Perk::ReviveBoost
                | Perk::MeleeBoost => {}
            }
        }
        m
    }
}

/// One-time max-health bonus granted when `health_boost` is first acquired.
pub const HEALTH_BOOST: f32 = 20.0;
