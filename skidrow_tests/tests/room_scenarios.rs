//! End-to-end room scenarios driven through the public `Room` API.

use skidrow_server::sim::{
    combat::in_melee_cone,
    progression::Progression,
    Room, Seat,
};
use skidrow_shared::{
    event::{DamageOutcome, DamageSource, GameEvent},
    lobby::LobbyId,
    math::Vec3,
    model::{EntityId, PlayerId},
    tables::{EnemyKind, WeaponKind},
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

fn room_with(players: u32, seed: u64) -> Room {
    let seats: Vec<Seat> = (1..=players)
        .map(|i| Seat {
            id: PlayerId(i),
            name: format!("Player{i}"),
        })
        .collect();
    Room::with_seed(LobbyId("SCENARIO".into()), &seats, 30, seed)
}

/// Parks every pre-spawned enemy far away so a scenario controls who fights.
fn park_enemies(room: &mut Room) {
    let ids: Vec<EntityId> = room.enemies().map(|e| e.id).collect();
    for (i, id) in ids.into_iter().enumerate() {
        if let Some(e) = room.enemy_mut(id) {
            e.position = Vec3::new(400.0 + i as f32 * 10.0, 0.0, 400.0);
        }
    }
}

fn put_player(room: &mut Room, id: u32, at: Vec3) {
    room.player_mut(PlayerId(id)).unwrap().position = at;
}

fn place_enemy(room: &mut Room, kind: EnemyKind, at: Vec3) -> EntityId {
    let id = room.spawn_enemy(Some(kind));
    room.enemy_mut(id).unwrap().position = at;
    id
}

#[test]
fn pistol_headshot_kill_scores_thirty() {
    init_tracing();
    let mut room = room_with(1, 101);
    park_enemies(&mut room);
    put_player(&mut room, 1, Vec3::new(0.0, 1.6, 0.0));
    let target = place_enemy(&mut room, EnemyKind::Normal, Vec3::new(0.0, 0.0, 10.0));
    room.drain_events();

    room.create_bullet(
        PlayerId(1),
        Vec3::new(0.0, 1.35, 0.0),
        Vec3::new(0.0, 0.0, 1.0),
        Some(WeaponKind::Pistol),
        None,
    )
    .unwrap();

    let mut kill = None;
    for _ in 0..20 {
        room.advance();
        kill = room.drain_events().into_iter().find_map(|e| match e {
            GameEvent::EnemyKilled(k) if k.enemy_id == target => Some(k),
            _ => None,
        });
        if kill.is_some() {
            break;
        }
    }

    let kill = kill.expect("bullet should have killed the walker");
    assert!(kill.is_headshot);
    assert_eq!(kill.score, 30);
    let shooter = room.player(PlayerId(1)).unwrap();
    assert_eq!(shooter.score, 30);
    assert_eq!((shooter.kills, shooter.headshots), (1, 1));
    assert_eq!(room.total_kills(), 1);
    assert!(room.enemy(target).is_none());
    assert_eq!(room.bullets().count(), 0);
}

#[test]
fn thrower_at_twelve_holds_and_throws_once() {
    init_tracing();
    let mut room = room_with(1, 202);
    park_enemies(&mut room);
    put_player(&mut room, 1, Vec3::new(0.0, 1.6, 0.0));
    let thrower = place_enemy(&mut room, EnemyKind::Thrower, Vec3::new(0.0, 0.0, 12.0));
    room.enemy_mut(thrower).unwrap().throw_cooldown = 0;

    room.advance();
    let owned = |room: &Room| room.projectiles().filter(|p| p.owner_id == thrower).count();
    assert_eq!(owned(&room), 1);
    let pos = room.enemy(thrower).unwrap().position;
    assert_eq!((pos.x, pos.z), (0.0, 12.0));

    room.advance();
    assert_eq!(owned(&room), 1);
}

#[test]
fn starving_alone_ends_the_run() {
    init_tracing();
    let mut room = room_with(1, 303);
    park_enemies(&mut room);
    {
        let p = room.player_mut(PlayerId(1)).unwrap();
        p.hunger = 0.0;
        p.health = 2.0;
    }

    for _ in 0..120 {
        room.advance();
    }

    let p = room.player(PlayerId(1)).unwrap();
    assert!(!p.alive);
    assert!(!p.is_downed);
    assert_eq!(room.alive_count(), 0);
    assert!(room.game_stats().players.iter().all(|s| !s.alive));
}

#[test]
fn downed_with_teammate_died_without() {
    init_tracing();
    let mut room = room_with(2, 404);

    let first = room
        .apply_player_damage(PlayerId(1), 250.0, Vec3::ZERO, DamageSource::Enemy)
        .unwrap();
    assert!(matches!(first, DamageOutcome::Downed { .. }));
    assert_eq!(room.alive_count(), 1);

    let second = room
        .apply_player_damage(PlayerId(2), 250.0, Vec3::ZERO, DamageSource::Enemy)
        .unwrap();
    assert!(matches!(second, DamageOutcome::Died { .. }));

    // Downed still counts as alive until the bleed-out expires.
    assert_eq!(room.alive_count(), 1);
    room.player_mut(PlayerId(1)).unwrap().downed_timer = 1;
    room.advance();
    assert_eq!(room.alive_count(), 0);
}

#[test]
fn revive_restores_thirty_percent_of_max() {
    init_tracing();
    let mut room = room_with(2, 505);
    room.apply_player_damage(PlayerId(2), 100.0, Vec3::ZERO, DamageSource::Projectile);
    assert!(room.player(PlayerId(2)).unwrap().is_downed);

    let out = room.revive(PlayerId(2), PlayerId(1)).unwrap();
    assert_eq!(out.player_id, PlayerId(2));
    let revived = room.player(PlayerId(2)).unwrap();
    assert!((revived.health - 30.0).abs() < 1e-4);
    assert!(!revived.is_downed);
    assert_eq!(room.player(PlayerId(1)).unwrap().revives, 1);
}

#[test]
fn chat_history_keeps_last_fifty() {
    init_tracing();
    let mut room = room_with(1, 606);
    for i in 0..60 {
        room.post_chat(PlayerId(1), &format!("message {i}"));
    }
    assert_eq!(room.chat().len(), 50);
    assert_eq!(room.chat().iter().next().unwrap().text(), "message 10");
    assert_eq!(room.snapshot().chat_messages.len(), 50);
}

#[test]
fn pickup_is_collected_exactly_once() {
    init_tracing();
    let mut room = room_with(2, 707);
    let pickup = room.pickups().next().map(|p| p.id).unwrap();

    assert!(room.collect_pickup(pickup, PlayerId(1)).is_some());
    assert!(room.collect_pickup(pickup, PlayerId(2)).is_none());
    assert_eq!(room.player(PlayerId(1)).unwrap().score, 5);
    assert_eq!(room.player(PlayerId(2)).unwrap().score, 0);
    assert!(room.pickups().all(|p| p.id != pickup));
}

#[test]
fn milestone_needs_the_boss() {
    let mut progress = Progression::default();
    for _ in 0..25 {
        progress.record_kill(false);
    }
    assert!(progress.try_advance());
    assert!(progress.try_advance());
    assert_eq!(progress.level(), 3);
    assert!(progress.config().milestone);

    for _ in 0..30 {
        progress.record_kill(false);
    }
    assert!(progress.total_kills() >= progress.config().kills_to_advance);
    assert!(!progress.can_advance());
    assert!(!progress.try_advance());

    progress.record_kill(true);
    assert!(progress.try_advance());
    assert_eq!(progress.level(), 4);
}

#[test]
fn melee_cone_edge_is_a_miss() {
    init_tracing();
    let mut room = room_with(1, 808);
    park_enemies(&mut room);
    let victim = place_enemy(&mut room, EnemyKind::Brute, Vec3::new(2.0, 0.0, 0.0));
    let edge = Vec3::new(0.3, 0.0, (1.0f32 - 0.09).sqrt());
    assert!(!in_melee_cone(Vec3::ZERO, edge, Vec3::new(2.0, 0.0, 0.0), 3.0));

    let hits = room.melee_attack(PlayerId(1), Vec3::ZERO, edge, WeaponKind::Pipe, 45.0, 3.0);
    assert!(hits.is_empty());
    assert_eq!(room.enemy(victim).unwrap().health, 90.0);

    let square = room.melee_attack(
        PlayerId(1),
        Vec3::ZERO,
        Vec3::new(1.0, 0.0, 0.0),
        WeaponKind::Pipe,
        45.0,
        3.0,
    );
    assert_eq!(square.len(), 1);
}

#[test]
fn same_seed_same_world() {
    let mut a = room_with(3, 909);
    let mut b = room_with(3, 909);
    for _ in 0..300 {
        a.advance();
        b.advance();
    }
    assert_eq!(a.world_seed(), b.world_seed());
    assert_eq!(a.snapshot(), b.snapshot());
}
