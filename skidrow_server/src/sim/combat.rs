//! Combat resolution: melee cones, bullet flight and hits, enemy deaths,
//! damage to players and revives.

use skidrow_shared::{
    chat::{self, ChatBody},
    event::{DamageOutcome, DamageSource, GameEvent, HitReport, KillReport, ReviveOutcome},
    math::Vec3,
    model::{Bullet, Enemy, EntityId, PlayerId},
    tables::WeaponKind,
};
use rand::Rng;
use tracing::debug;

use super::{perks::Modifiers, room::Room, spawn};

/// Cosine threshold of the melee cone (exclusive), roughly 70 degrees.
pub const MELEE_CONE_DOT: f32 = 0.3;
pub const BULLET_SPEED: f32 = 1.5;
pub const BULLET_TTL_MS: u64 = 3_000;
pub const PROJECTILE_TTL_MS: u64 = 5_000;
pub const BULLET_HIT_RADIUS: f32 = 1.0;
pub const HEAD_OFFSET: f32 = 0.15;
pub const HEAD_BAND: f32 = 0.3;
pub const BODY_TOP_OFFSET: f32 = 0.5;
pub const PROJECTILE_HIT_RADIUS: f32 = 1.0;
/// Per-tick downward acceleration of thrown projectiles.
pub const GRAVITY: f32 = 0.01;

pub const KILL_SCORE_BASE: u32 = 15;
pub const KILL_SCORE_PER_LEVEL: u32 = 5;
pub const HEADSHOT_BONUS: u32 = 10;
pub const BOSS_BONUS: u32 = 100;
pub const LOOT_DROP_CHANCE: f64 = 0.3;

pub const BLEED_OUT_SECS: u32 = 30;
pub const REVIVE_HEALTH_FRACTION: f32 = 0.3;
pub const REVIVE_SCORE: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitZone {
    Head,
    Body,
}

/// Whether `target` sits inside the melee cone. The boundary is exclusive.
pub fn in_melee_cone(origin: Vec3, direction: Vec3, target: Vec3, range: f32) -> bool {
    let dist = origin.planar_distance(target);
    if dist > range || dist <= 0.0 {
        return false;
    }
    let to_target = Vec3::new((target.x - origin.x) / dist, 0.0, (target.z - origin.z) / dist);
    direction.dot_xz(to_target) > MELEE_CONE_DOT
}

/// Cylinder test of a bullet against an enemy. The head band wins when both
/// bands match.
pub fn classify_hit(bullet: Vec3, enemy: &Enemy) -> Option<HitZone> {
    if bullet.planar_distance(enemy.position) > BULLET_HIT_RADIUS {
        return None;
    }
    let height = enemy.height();
    if (bullet.y - (height + HEAD_OFFSET)).abs() < HEAD_BAND {
        Some(HitZone::Head)
    } else if bullet.y > 0.0 && bullet.y < height + BODY_TOP_OFFSET {
        Some(HitZone::Body)
    } else {
        None
    }
}

/// Base score for a kill at `level`.
pub fn kill_score(level: u32, headshot: bool, boss: bool) -> u32 {
    let mut score = KILL_SCORE_BASE + level * KILL_SCORE_PER_LEVEL;
    if headshot {
        score += HEADSHOT_BONUS;
    }
    if boss {
        score += BOSS_BONUS;
    }
    score
}

impl Room {
    /// Area melee swing: every enemy in the cone takes full damage.
    pub fn melee_attack(
        &mut self,
        player_id: PlayerId,
        position: Vec3,
        direction: Vec3,
        weapon: WeaponKind,
        damage: f32,
        range: f32,
    ) -> Vec<HitReport> {
        if !self.players.contains_key(&player_id) {
            return Vec::new();
        }

        let targets: Vec<EntityId> = self
            .enemies
            .values()
            .filter(|e| in_melee_cone(position, direction, e.position, range))
            .map(|e| e.id)
            .collect();

        let mut hits = Vec::with_capacity(targets.len());
        for enemy_id in targets {
            let Some(enemy) = self.enemies.get_mut(&enemy_id) else {
                continue;
            };
            enemy.health -= damage;
            let killed = enemy.health <= 0.0;
            let report = HitReport {
                enemy_id,
                damage,
                is_headshot: false,
                killed,
                position: enemy.position,
            };
            if let Some(player) = self.players.get_mut(&player_id) {
                player.damage_dealt += damage;
            }
            if killed {
                self.handle_enemy_death(enemy_id, player_id, weapon, false);
            }
            self.emit(GameEvent::EnemyHit(report.clone()));
            hits.push(report);
        }
        hits
    }

    /// Fires a bullet along `direction`. Falls back to the weapon's table
    /// damage when none is supplied.
    pub fn create_bullet(
        &mut self,
        player_id: PlayerId,
        position: Vec3,
        direction: Vec3,
        weapon: Option<WeaponKind>,
        damage: Option<f32>,
    ) -> Option<Bullet> {
        if !self.players.contains_key(&player_id) {
            return None;
        }
        let weapon = weapon.unwrap_or(WeaponKind::Pistol);
        let damage = damage
            .filter(|d| *d > 0.0)
            .unwrap_or_else(|| weapon.stats().damage);

        let bullet = Bullet {
            id: self.alloc_id(),
            owner_id: player_id,
            weapon,
            damage,
            position,
            velocity: direction * BULLET_SPEED,
            created_at: self.now_ms(),
        };
        self.bullets.insert(bullet.id, bullet.clone());
        self.emit(GameEvent::BulletCreated(bullet.clone()));
        Some(bullet)
    }

    /// Resolves a bullet against an enemy. The bullet is consumed.
    pub fn handle_bullet_hit(
        &mut self,
        bullet_id: EntityId,
        enemy_id: EntityId,
        headshot: bool,
    ) -> Option<HitReport> {
        if !self.enemies.contains_key(&enemy_id) {
            return None;
        }
        let bullet = self.bullets.remove(&bullet_id)?;

        let mut damage = bullet.damage;
        let shooter = self.players.get_mut(&bullet.owner_id);
        let mods = shooter
            .as_ref()
            .map(|p| Modifiers::from_perks(&p.perks))
            .unwrap_or_default();

        let enemy = self.enemies.get_mut(&enemy_id)?;
        if headshot {
            damage *= enemy.head_multiplier * mods.headshot_mult;
        }
        enemy.health -= damage;
        let killed = enemy.health <= 0.0;
        let position = enemy.position;

        if let Some(shooter) = shooter {
            if headshot {
                shooter.headshots += 1;
            }
            shooter.damage_dealt += damage;
        }

        if killed {
            self.handle_enemy_death(enemy_id, bullet.owner_id, bullet.weapon, headshot);
        }

        let report = HitReport {
            enemy_id,
            damage,
            is_headshot: headshot,
            killed,
            position,
        };
        self.emit(GameEvent::EnemyHit(report.clone()));
        Some(report)
    }

    /// Removes a dead enemy, pays out, logs the kill and rolls for loot.
    pub fn handle_enemy_death(
        &mut self,
        enemy_id: EntityId,
        killer_id: PlayerId,
        weapon: WeaponKind,
        headshot: bool,
    ) -> Option<KillReport> {
        let enemy = self.enemies.remove(&enemy_id)?;
        let boss = enemy.is_boss();
        let score = kill_score(self.progress.level(), headshot, boss);

        let killer_name = match self.players.get_mut(&killer_id) {
            Some(killer) => {
                killer.kills += 1;
                killer.score += score;
                killer.name.clone()
            }
            None => "Unknown".to_string(),
        };
        self.progress.record_kill(boss);

        self.push_chat(ChatBody::Kill {
            text: chat::kill_line(&enemy.identity, &killer_name, headshot),
            killer: killer_name.clone(),
            victim: enemy.identity.clone(),
            weapon,
            is_headshot: headshot,
        });

        if self.rng.gen_bool(LOOT_DROP_CHANCE) {
            let category = spawn::roll_pickup_category(&mut self.rng);
            let kind = spawn::select_pickup_kind(&mut self.rng, category, self.progress.level());
            let drop_at = Vec3::new(enemy.position.x, spawn::PICKUP_HEIGHT, enemy.position.z);
            self.insert_pickup(kind, drop_at);
        }

        debug!(
            room_id = %self.id,
            enemy = enemy_id.0,
            killer = %killer_id,
            headshot,
            total_kills = self.progress.total_kills(),
            "Enemy killed"
        );

        let report = KillReport {
            enemy_id,
            killer_id,
            killer_name,
            victim_name: if boss {
                "BOSS".to_string()
            } else {
                enemy.identity.full_name.clone()
            },
            victim_identity: enemy.identity,
            weapon,
            is_headshot: headshot,
            score,
        };
        self.emit(GameEvent::EnemyKilled(report.clone()));
        Some(report)
    }

    /// Damages a standing player. Lethal damage downs them while a teammate
    /// is still standing, and kills them outright otherwise.
    pub fn apply_player_damage(
        &mut self,
        player_id: PlayerId,
        damage: f32,
        source_position: Vec3,
        source: DamageSource,
    ) -> Option<DamageOutcome> {
        let teammate_standing = self
            .players
            .values()
            .any(|p| p.id != player_id && p.is_standing());
        let bleed_out = BLEED_OUT_SECS * self.tick_hz;

        let player = self.players.get_mut(&player_id)?;
        if !player.is_standing() {
            return None;
        }

        player.health -= damage;
        let outcome = if player.health <= 0.0 {
            player.health = 0.0;
            if teammate_standing {
                player.is_downed = true;
                player.downed_timer = bleed_out;
                DamageOutcome::Downed {
                    player_id,
                    player_name: player.name.clone(),
                }
            } else {
                player.alive = false;
                DamageOutcome::Died {
                    player_id,
                    player_name: player.name.clone(),
                }
            }
        } else {
            DamageOutcome::Damaged {
                player_id,
                damage,
                source_position,
                current_health: player.health,
            }
        };

        if !matches!(outcome, DamageOutcome::Damaged { .. }) {
            debug!(room_id = %self.id, player = %player_id, ?source, ?outcome, "Player down");
        }
        self.emit(GameEvent::PlayerDamage(outcome.clone()));
        Some(outcome)
    }

    /// Picks a downed player back up at 30% of their max health.
    pub fn revive(&mut self, target_id: PlayerId, reviver_id: PlayerId) -> Option<ReviveOutcome> {
        if target_id == reviver_id {
            return None;
        }
        let reviver = self.players.get(&reviver_id)?;
        if !reviver.is_standing() {
            return None;
        }
        let reviver_name = reviver.name.clone();

        let target = self.players.get_mut(&target_id)?;
        if !target.is_downed {
            return None;
        }
        target.is_downed = false;
        target.health = target.max_health * REVIVE_HEALTH_FRACTION;
        target.downed_timer = 0;
        let player_name = target.name.clone();

        if let Some(reviver) = self.players.get_mut(&reviver_id) {
            reviver.revives += 1;
            reviver.score += REVIVE_SCORE;
        }

        let outcome = ReviveOutcome {
            player_id: target_id,
            player_name,
            reviver_id,
            reviver_name,
        };
        self.emit(GameEvent::PlayerRevived(outcome.clone()));
        Some(outcome)
    }

    /// Moves bullets, resolves at most one hit each and expires stale ones.
    pub(crate) fn update_bullets(&mut self) {
        let now = self.now_ms();
        let ids: Vec<EntityId> = self.bullets.keys().copied().collect();
        for bullet_id in ids {
            let Some(bullet) = self.bullets.get_mut(&bullet_id) else {
                continue;
            };
            bullet.position += bullet.velocity;
            let (position, created_at) = (bullet.position, bullet.created_at);

            let hit = self
                .enemies
                .values()
                .find_map(|e| classify_hit(position, e).map(|zone| (e.id, zone)));
            if let Some((enemy_id, zone)) = hit {
                self.handle_bullet_hit(bullet_id, enemy_id, zone == HitZone::Head);
                continue;
            }

            if now.saturating_sub(created_at) > BULLET_TTL_MS {
                self.bullets.remove(&bullet_id);
            }
        }
    }

    /// Integrates thrown projectiles under gravity and resolves ground
    /// contact, player hits and timeouts.
    pub(crate) fn update_projectiles(&mut self) {
        let now = self.now_ms();
        let ids: Vec<EntityId> = self.projectiles.keys().copied().collect();
        for proj_id in ids {
            let Some(proj) = self.projectiles.get_mut(&proj_id) else {
                continue;
            };
            proj.velocity.y -= GRAVITY;
            proj.position += proj.velocity;
            let (position, damage, created_at) = (proj.position, proj.damage, proj.created_at);

            if position.y <= 0.0 {
                self.projectiles.remove(&proj_id);
                continue;
            }

            let victim = self
                .players
                .values()
                .find(|p| p.is_standing() && p.position.distance(position) < PROJECTILE_HIT_RADIUS)
                .map(|p| p.id);
            if let Some(player_id) = victim {
                self.projectiles.remove(&proj_id);
                self.apply_player_damage(player_id, damage, position, DamageSource::Projectile);
                continue;
            }

            if now.saturating_sub(created_at) > PROJECTILE_TTL_MS {
                self.projectiles.remove(&proj_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::room::Seat;
    use skidrow_shared::{lobby::LobbyId, model::Projectile, tables::EnemyKind};

    fn room(players: u32) -> Room {
        let seats: Vec<Seat> = (1..=players)
            .map(|i| Seat {
                id: PlayerId(i),
                name: format!("P{i}"),
            })
            .collect();
        let mut room = Room::with_seed(LobbyId("TEST0001".into()), &seats, 30, 42);
        room.enemies.clear();
        room.pickups.clear();
        room
    }

    fn place(room: &mut Room, kind: EnemyKind, pos: Vec3) -> EntityId {
        let id = room.spawn_enemy(Some(kind));
        room.enemies.get_mut(&id).unwrap().position = pos;
        id
    }

    #[test]
    fn cone_boundary_is_exclusive() {
        let dir = Vec3::new(0.3, 0.0, (1.0f32 - 0.09).sqrt());
        let target = Vec3::new(2.0, 0.0, 0.0);
        assert!(!in_melee_cone(Vec3::ZERO, dir, target, 3.0));

        let inside = Vec3::new(0.31, 0.0, (1.0f32 - 0.31 * 0.31).sqrt());
        assert!(in_melee_cone(Vec3::ZERO, inside, target, 3.0));
    }

    #[test]
    fn cone_respects_range() {
        let dir = Vec3::new(1.0, 0.0, 0.0);
        assert!(in_melee_cone(Vec3::ZERO, dir, Vec3::new(2.0, 0.0, 0.0), 2.0));
        assert!(!in_melee_cone(Vec3::ZERO, dir, Vec3::new(2.01, 0.0, 0.0), 2.0));
    }

    #[test]
    fn melee_hits_everything_in_the_cone() {
        let mut room = room(1);
        let a = place(&mut room, EnemyKind::Brute, Vec3::new(1.5, 0.0, 0.3));
        let b = place(&mut room, EnemyKind::Brute, Vec3::new(1.5, 0.0, -0.3));
        let behind = place(&mut room, EnemyKind::Brute, Vec3::new(-1.5, 0.0, 0.0));

        let hits = room.melee_attack(
            PlayerId(1),
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            WeaponKind::Bat,
            50.0,
            2.5,
        );
        assert_eq!(hits.len(), 2);
        assert_eq!(room.enemy(a).unwrap().health, 40.0);
        assert_eq!(room.enemy(b).unwrap().health, 40.0);
        assert_eq!(room.enemy(behind).unwrap().health, 90.0);
        assert_eq!(room.player(PlayerId(1)).unwrap().damage_dealt, 100.0);
    }

    #[test]
    fn head_band_takes_priority() {
        let enemy = {
            let mut room = room(1);
            let id = place(&mut room, EnemyKind::Normal, Vec3::ZERO);
            room.enemies.remove(&id).unwrap()
        };
        // 1.3 is inside both the head band (1.35 +/- 0.3) and the body band (0..1.7).
        assert_eq!(classify_hit(Vec3::new(0.5, 1.3, 0.0), &enemy), Some(HitZone::Head));
        assert_eq!(classify_hit(Vec3::new(0.0, 0.5, 0.0), &enemy), Some(HitZone::Body));
        assert_eq!(classify_hit(Vec3::new(0.0, 2.0, 0.0), &enemy), None);
        assert_eq!(classify_hit(Vec3::new(1.1, 1.0, 0.0), &enemy), None);
    }

    #[test]
    fn bullet_hit_subtracts_scaled_damage() {
        let mut room = room(1);
        let brute = place(&mut room, EnemyKind::Brute, Vec3::new(0.0, 0.0, 40.0));
        let bullet = room
            .create_bullet(PlayerId(1), Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), Some(WeaponKind::Smg), None)
            .unwrap();

        let report = room.handle_bullet_hit(bullet.id, brute, true).unwrap();
        assert_eq!(report.damage, 12.0 * 1.5);
        assert_eq!(room.enemy(brute).unwrap().health, 90.0 - 18.0);
        assert!(room.bullets.is_empty());
        let shooter = room.player(PlayerId(1)).unwrap();
        assert_eq!(shooter.headshots, 1);
        assert_eq!(shooter.damage_dealt, 18.0);
    }

    #[test]
    fn headshot_perk_stacks_on_head_multiplier() {
        let mut room = room(1);
        room.select_perk(PlayerId(1), skidrow_shared::tables::Perk::HeadshotBoost);
        let brute = place(&mut room, EnemyKind::Brute, Vec3::new(0.0, 0.0, 40.0));
        let bullet = room
            .create_bullet(PlayerId(1), Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), None, Some(20.0))
            .unwrap();
        room.handle_bullet_hit(bullet.id, brute, true).unwrap();
        assert_eq!(room.enemy(brute).unwrap().health, 90.0 - 20.0 * 1.5 * 1.25);
    }

    #[test]
    fn stale_bullet_hit_is_ignored() {
        let mut room = room(1);
        let brute = place(&mut room, EnemyKind::Brute, Vec3::new(0.0, 0.0, 40.0));
        assert!(room.handle_bullet_hit(EntityId(9_999), brute, false).is_none());
        assert_eq!(room.enemy(brute).unwrap().health, 90.0);
    }

    #[test]
    fn bullets_expire_after_three_seconds() {
        let mut room = room(1);
        room.create_bullet(PlayerId(1), Vec3::new(0.0, 50.0, 0.0), Vec3::new(0.0, 1.0, 0.0), None, None);
        // Tick 90 at 30 Hz is exactly 3000 ms, which is not yet expired.
        for _ in 0..=90 {
            room.update_bullets();
            room.tick += 1;
        }
        assert_eq!(room.bullets.len(), 1);
        room.tick += 1;
        room.update_bullets();
        assert!(room.bullets.is_empty());
    }

    #[test]
    fn kill_pays_out_and_logs() {
        let mut room = room(1);
        let normal = place(&mut room, EnemyKind::Normal, Vec3::new(0.0, 0.0, 40.0));
        let name = room.enemy(normal).unwrap().identity.full_name.clone();
        let report = room
            .handle_enemy_death(normal, PlayerId(1), WeaponKind::Knife, false)
            .unwrap();
        assert_eq!(report.score, 20);
        assert_eq!(room.total_kills(), 1);
        let last = room.chat().iter().last().unwrap();
        assert!(last.text().starts_with(&name));
        assert!(last.text().ends_with("Killed by P1"));
        assert!(room.handle_enemy_death(normal, PlayerId(1), WeaponKind::Knife, false).is_none());
        assert_eq!(room.total_kills(), 1);
    }

    #[test]
    fn lethal_damage_downs_when_a_teammate_stands() {
        let mut room = room(2);
        let out = room
            .apply_player_damage(PlayerId(1), 150.0, Vec3::ZERO, DamageSource::Enemy)
            .unwrap();
        assert!(matches!(out, DamageOutcome::Downed { .. }));
        let p = room.player(PlayerId(1)).unwrap();
        assert!(p.alive && p.is_downed);
        assert_eq!(p.health, 0.0);
        assert_eq!(p.downed_timer, 30 * 30);

        // Downed players take no further damage.
        assert!(room
            .apply_player_damage(PlayerId(1), 10.0, Vec3::ZERO, DamageSource::Enemy)
            .is_none());

        // Last one standing dies outright.
        let out = room
            .apply_player_damage(PlayerId(2), 150.0, Vec3::ZERO, DamageSource::Enemy)
            .unwrap();
        assert!(matches!(out, DamageOutcome::Died { .. }));
        let p2 = room.player(PlayerId(2)).unwrap();
        assert!(!p2.alive && !p2.is_downed);
    }

    #[test]
    fn revive_restores_thirty_percent() {
        let mut room = room(2);
        room.select_perk(PlayerId(1), skidrow_shared::tables::Perk::HealthBoost);
        room.apply_player_damage(PlayerId(1), 500.0, Vec3::ZERO, DamageSource::Enemy);
        room.players.get_mut(&PlayerId(1)).unwrap().downed_timer = 17;

        assert!(room.revive(PlayerId(1), PlayerId(1)).is_none());
        let out = room.revive(PlayerId(1), PlayerId(2)).unwrap();
        assert_eq!(out.reviver_name, "P2");

        let p = room.player(PlayerId(1)).unwrap();
        assert_eq!(p.health, 120.0 * 0.3);
        assert_eq!(p.downed_timer, 0);
        assert!(!p.is_downed);
        let r = room.player(PlayerId(2)).unwrap();
        assert_eq!((r.revives, r.score), (1, 25));

        assert!(room.revive(PlayerId(1), PlayerId(2)).is_none());
    }

    #[test]
    fn projectile_hits_standing_player() {
        let mut room = room(1);
        let player_pos = room.player(PlayerId(1)).unwrap().position;
        let id = room.alloc_id();
        room.projectiles.insert(
            id,
            Projectile {
                id,
                owner_id: EntityId(0),
                position: player_pos + Vec3::new(0.0, 0.0, -0.5),
                velocity: Vec3::new(0.0, GRAVITY, 0.1),
                damage: 15.0,
                created_at: 0,
            },
        );
        room.update_projectiles();
        assert!(room.projectiles.is_empty());
        assert_eq!(room.player(PlayerId(1)).unwrap().health, 85.0);
    }

    #[test]
    fn projectile_resolves_on_ground_contact() {
        let mut room = room(1);
        let id = room.alloc_id();
        room.projectiles.insert(
            id,
            Projectile {
                id,
                owner_id: EntityId(0),
                position: Vec3::new(30.0, 0.005, 30.0),
                velocity: Vec3::ZERO,
                damage: 15.0,
                created_at: 0,
            },
        );
        room.update_projectiles();
        assert!(room.projectiles.is_empty());
        assert_eq!(room.player(PlayerId(1)).unwrap().health, 100.0);
    }
}
