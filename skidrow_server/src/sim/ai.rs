//! Enemy steering, aggro and attacks.

use std::collections::BTreeMap;

use skidrow_shared::{
    event::{DamageSource, GameEvent},
    math::Vec3,
    model::{Enemy, EntityId, Player, PlayerId, Projectile},
};

use super::room::Room;

pub const AGGRO_RADIUS: f32 = 15.0;
pub const APPROACH_STOP: f32 = 1.5;
pub const MELEE_REACH: f32 = 1.8;
pub const MELEE_COOLDOWN_TICKS: u32 = 60;
/// Throwers close in rather than throw below this distance.
pub const THROW_MIN_DIST: f32 = 5.0;
/// Throwers back off when a player gets inside this distance.
pub const STANDOFF_DIST: f32 = 10.0;
pub const RETREAT_FACTOR: f32 = 0.5;

pub const THROW_HEIGHT: f32 = 1.5;
pub const THROW_SPEED: f32 = 0.3;
pub const THROW_LIFT: f32 = 0.15;
/// Aim height above release height, folded into the upward velocity.
pub const THROW_AIM_RISE: f32 = 1.0;
pub const THROW_RISE_GAIN: f32 = 0.02;

/// Nearest standing player by planar distance. Ties keep the first found.
fn nearest_target(players: &BTreeMap<PlayerId, Player>, from: Vec3) -> Option<(PlayerId, Vec3, f32)> {
    let mut best: Option<(PlayerId, Vec3, f32)> = None;
    for player in players.values().filter(|p| p.is_standing()) {
        let dist = from.planar_distance(player.position);
        if best.map_or(true, |(_, _, d)| dist < d) {
            best = Some((player.id, player.position, dist));
        }
    }
    best
}

/// Launch state for a lobbed projectile aimed at `target`.
pub fn projectile_launch(from: Vec3, target: Vec3) -> (Vec3, Vec3) {
    let dx = target.x - from.x;
    let dz = target.z - from.z;
    let dist = (dx * dx + dz * dz).sqrt().max(f32::EPSILON);
    let position = Vec3::new(from.x, THROW_HEIGHT, from.z);
    let velocity = Vec3::new(
        dx / dist * THROW_SPEED,
        THROW_LIFT + THROW_AIM_RISE * THROW_RISE_GAIN,
        dz / dist * THROW_SPEED,
    );
    (position, velocity)
}

enum Intent {
    Throw(Vec3),
    Strike(PlayerId, f32, Vec3),
}

impl Room {
    /// Runs one AI step for every enemy. Targets are re-evaluated each tick,
    /// so damage dealt by earlier enemies is visible to later ones.
    pub(crate) fn update_enemies(&mut self) {
        let ids: Vec<EntityId> = self.enemies.keys().copied().collect();
        for enemy_id in ids {
            let Some(position) = self.enemies.get(&enemy_id).map(|e| e.position) else {
                continue;
            };
            let Some((target_id, target_pos, _)) = nearest_target(&self.players, position) else {
                continue;
            };
            let Some(enemy) = self.enemies.get_mut(&enemy_id) else {
                continue;
            };

            let (aggro, intents) = step_enemy(enemy, target_id, target_pos);
            let (kind, enemy_pos) = (enemy.kind, enemy.position);

            if aggro {
                self.emit(GameEvent::EnemyAggro {
                    enemy_id,
                    kind,
                    position: enemy_pos,
                });
            }
            for intent in intents {
                match intent {
                    Intent::Throw(target) => {
                        self.create_projectile(enemy_id, target);
                    }
                    Intent::Strike(player_id, damage, from) => {
                        self.apply_player_damage(player_id, damage, from, DamageSource::Enemy);
                    }
                }
            }
        }
    }

    /// Spawns a projectile from `enemy_id` toward `target`.
    pub fn create_projectile(&mut self, enemy_id: EntityId, target: Vec3) -> Option<EntityId> {
        let enemy = self.enemies.get(&enemy_id)?;
        let (position, velocity) = projectile_launch(enemy.position, target);
        let damage = enemy.damage;
        let id = self.alloc_id();
        self.projectiles.insert(
            id,
            Projectile {
                id,
                owner_id: enemy_id,
                position,
                velocity,
                damage,
                created_at: self.now_ms(),
            },
        );
        Some(id)
    }

    /// Wakes every idle enemy within earshot of `position`.
    pub fn alert_enemies(&mut self, position: Vec3) -> Vec<EntityId> {
        let mut woken = Vec::new();
        for enemy in self.enemies.values_mut() {
            if enemy.aggroed || enemy.position.planar_distance(position) >= AGGRO_RADIUS {
                continue;
            }
            enemy.aggroed = true;
            woken.push((enemy.id, enemy.kind, enemy.position));
        }
        woken
            .into_iter()
            .map(|(enemy_id, kind, position)| {
                self.emit(GameEvent::EnemyAggro {
                    enemy_id,
                    kind,
                    position,
                });
                enemy_id
            })
            .collect()
    }
}

/// Moves and arms a single enemy against its current target. Returns whether
/// it aggroed this tick plus the attacks it wants to make.
fn step_enemy(enemy: &mut Enemy, target_id: PlayerId, target_pos: Vec3) -> (bool, Vec<Intent>) {
    let mut intents = Vec::new();
    let dx = target_pos.x - enemy.position.x;
    let dz = target_pos.z - enemy.position.z;
    let dist = (dx * dx + dz * dz).sqrt();

    let aggro = !enemy.aggroed && dist < AGGRO_RADIUS;
    if aggro {
        enemy.aggroed = true;
        enemy.target_player_id = Some(target_id);
    }

    let ranged = enemy
        .kind
        .stats()
        .ranged
        .filter(|r| dist < r.throw_range && dist > THROW_MIN_DIST);
    if let Some(ranged) = ranged {
        if dist < STANDOFF_DIST {
            let step = enemy.speed * RETREAT_FACTOR;
            enemy.position.x -= dx / dist * step;
            enemy.position.z -= dz / dist * step;
        }
        if enemy.throw_cooldown == 0 {
            intents.push(Intent::Throw(target_pos));
            enemy.throw_cooldown = ranged.throw_cooldown;
        }
    } else if dist > APPROACH_STOP {
        enemy.position.x += dx / dist * enemy.speed;
        enemy.position.z += dz / dist * enemy.speed;
    }

    enemy.rotation = dx.atan2(dz);

    if enemy.attack_cooldown > 0 {
        enemy.attack_cooldown -= 1;
    } else if dist < MELEE_REACH {
        intents.push(Intent::Strike(target_id, enemy.damage, enemy.position));
        enemy.attack_cooldown = MELEE_COOLDOWN_TICKS;
    }

    enemy.throw_cooldown = enemy.throw_cooldown.saturating_sub(1);
    (aggro, intents)
}
