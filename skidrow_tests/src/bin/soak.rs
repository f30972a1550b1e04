//! Headless soak runner.
//!
//! Drives rooms with scripted bots, as fast as possible, through the same
//! message dispatch the network host uses. Useful for shaking out panics and
//! for eyeballing balance.
//!
//! Usage:
//!   cargo run -p skidrow_tests --bin soak -- [--rooms 4] [--players 2] [--ticks 18000] [--seed 1]

use std::time::Instant;

use anyhow::Context;
use rand::{rngs::StdRng, Rng, SeedableRng};
use skidrow_server::{sim::Room, worker::dispatch, Seat};
use skidrow_shared::{
    lobby::LobbyId,
    math::Vec3,
    model::{Player, PlayerId},
    net::{ClientMsg, PlayerInput},
    tables::WeaponKind,
};
use tracing::info;

const TICK_HZ: u32 = 30;
const BOT_SPEED: f32 = 0.08;
const SHOOT_RANGE: f32 = 20.0;
const MELEE_RANGE: f32 = 2.0;
const LOOT_RANGE: f32 = 1.5;

struct Args {
    rooms: usize,
    players: u32,
    ticks: u64,
    seed: u64,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        rooms: 4,
        players: 2,
        ticks: 18_000,
        seed: 1,
    };
    let argv: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i + 1 < argv.len() {
        let value = &argv[i + 1];
        match argv[i].as_str() {
            "--rooms" => args.rooms = value.parse().context("--rooms")?,
            "--players" => args.players = value.parse().context("--players")?,
            "--ticks" => args.ticks = value.parse().context("--ticks")?,
            "--seed" => args.seed = value.parse().context("--seed")?,
            _ => {
                i += 1;
                continue;
            }
        }
        i += 2;
    }
    Ok(args)
}

/// One bot decision for `me`, expressed as client messages.
fn plan(room: &Room, me: &Player, rng: &mut StdRng) -> Vec<ClientMsg> {
    let mut out = Vec::new();
    if !me.is_standing() {
        return out;
    }

    if let Some(downed) = room
        .players()
        .find(|p| p.is_downed && p.position.planar_distance(me.position) < 3.0)
    {
        out.push(ClientMsg::Revive {
            target_id: downed.id,
            reviver_id: me.id,
        });
    }

    if let Some(pickup) = room
        .pickups()
        .find(|p| p.position.planar_distance(me.position) < LOOT_RANGE)
    {
        out.push(ClientMsg::CollectPickup {
            pickup_id: pickup.id,
            player_id: me.id,
        });
    }

    let target = room.enemies().min_by(|a, b| {
        let da = a.position.planar_distance(me.position);
        let db = b.position.planar_distance(me.position);
        da.total_cmp(&db)
    });
    let Some(target) = target else {
        return out;
    };

    let delta = target.position - me.position;
    let dist = me.position.planar_distance(target.position).max(f32::EPSILON);
    let dir = Vec3::new(delta.x / dist, 0.0, delta.z / dist);

    if dist < MELEE_RANGE {
        out.push(ClientMsg::Melee {
            position: me.position,
            direction: dir,
            weapon: WeaponKind::Knife,
            damage: WeaponKind::Knife.stats().damage,
            range: MELEE_RANGE,
        });
    } else if dist < SHOOT_RANGE && me.ammo > 0 && rng.gen_bool(0.2) {
        // Aim somewhere between body and head.
        let aim_y = rng.gen_range(0.6..1.4);
        let muzzle = Vec3::new(me.position.x, aim_y, me.position.z);
        out.push(ClientMsg::Shoot {
            position: muzzle,
            direction: dir,
            weapon: Some(WeaponKind::Pistol),
            damage: None,
        });
    }

    // Kite: keep some distance from melee enemies.
    let step = if dist < 6.0 { -BOT_SPEED } else { BOT_SPEED * 0.5 };
    out.push(ClientMsg::Input(PlayerInput {
        position: Some(me.position + dir * step),
        ..Default::default()
    }));
    out
}

fn run_room(index: usize, args: &Args) -> (u64, Room) {
    let seats: Vec<Seat> = (1..=args.players)
        .map(|i| Seat {
            id: PlayerId(i),
            name: format!("Bot{i}"),
        })
        .collect();
    let room_seed = args.seed.wrapping_add(index as u64);
    let mut room = Room::with_seed(LobbyId(format!("SOAK{index:04}")), &seats, TICK_HZ, room_seed);
    let mut rng = StdRng::seed_from_u64(room_seed ^ 0x5eed);

    for tick in 0..args.ticks {
        let bots: Vec<Player> = room.players().cloned().collect();
        for bot in &bots {
            for msg in plan(&room, bot, &mut rng) {
                dispatch(&mut room, bot.id, msg);
            }
        }
        room.advance();
        if room.check_level_up() {
            info!(room = index, tick, level = room.level(), name = room.level_name(), "Level up");
        }
        room.drain_events();
        if room.alive_count() == 0 {
            return (tick, room);
        }
    }
    (args.ticks, room)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = parse_args()?;
    info!(rooms = args.rooms, players = args.players, ticks = args.ticks, seed = args.seed, "Soak starting");

    let started = Instant::now();
    let mut total_ticks = 0u64;
    for index in 0..args.rooms {
        let (ticks, room) = run_room(index, &args);
        total_ticks += ticks;
        let stats = room.game_stats();
        info!(
            room = index,
            ticks,
            level = stats.level,
            level_name = %stats.level_name,
            kills = stats.total_kills,
            survivors = room.alive_count(),
            "Room finished"
        );
        for p in &stats.players {
            info!(room = index, player = %p.name, score = p.score, kills = p.kills, headshots = p.headshots, revives = p.revives, "Player");
        }
    }

    let secs = started.elapsed().as_secs_f64().max(f64::EPSILON);
    info!(total_ticks, ticks_per_sec = total_ticks as f64 / secs, "Soak done");
    Ok(())
}
