//! Hunger, warmth and energy cycles, plus the bleed-out clock.

use skidrow_shared::{
    event::{DamageOutcome, DamageSource, GameEvent},
    model::{PlayerId, PLAYER_MAX_STAT},
};
use tracing::debug;

use super::{perks::Modifiers, room::Room};

pub const STARVATION_DAMAGE: f32 = 2.0;
pub const COLD_DAMAGE: f32 = 1.0;
/// Warmth at or below this hurts.
pub const COLD_THRESHOLD: f32 = 20.0;
pub const ENERGY_REGEN_INTERVAL: u64 = 60;
pub const ENERGY_REGEN: f32 = 0.5;

impl Room {
    pub(crate) fn update_player_stats(&mut self) {
        let tick = self.tick;
        let mut harm: Vec<(PlayerId, f32, DamageSource)> = Vec::new();

        for player in self.players.values_mut().filter(|p| p.alive) {
            let mods = Modifiers::from_perks(&player.perks);

            if tick % mods.hunger_interval == 0 {
                player.hunger = (player.hunger - 1.0).max(0.0);
                if player.hunger <= 0.0 && !player.is_downed {
                    harm.push((player.id, STARVATION_DAMAGE, DamageSource::Starvation));
                }
            }

            if tick % mods.warmth_interval == 0 {
                player.warmth = (player.warmth - 1.0).max(0.0);
                if player.warmth <= COLD_THRESHOLD && !player.is_downed {
                    harm.push((player.id, COLD_DAMAGE, DamageSource::Cold));
                }
            }

            if tick % ENERGY_REGEN_INTERVAL == 0 {
                player.energy = (player.energy + ENERGY_REGEN).min(PLAYER_MAX_STAT);
            }
        }

        for (player_id, damage, source) in harm {
            let Some(at) = self.players.get(&player_id).map(|p| p.position) else {
                continue;
            };
            self.apply_player_damage(player_id, damage, at, source);
        }
    }

    /// Counts down downed players; an expired timer is a death.
    pub(crate) fn update_downed_players(&mut self) {
        let mut bled_out = Vec::new();
        for player in self.players.values_mut().filter(|p| p.is_downed) {
            player.downed_timer = player.downed_timer.saturating_sub(1);
            if player.downed_timer == 0 {
                player.alive = false;
                player.is_downed = false;
                bled_out.push(DamageOutcome::Died {
                    player_id: player.id,
                    player_name: player.name.clone(),
                });
            }
        }
        for outcome in bled_out {
            debug!(room_id = %self.id, ?outcome, "Bled out");
            self.emit(GameEvent::PlayerDamage(outcome));
        }
    }
}
