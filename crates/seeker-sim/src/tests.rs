//! Tests for the simulation engine: round lifecycle, spawn sequencing,
//! target reservation under guidance and determinism.

use hecs::Entity;

use seeker_core::commands::PlayerCommand;
use seeker_core::config::MissileConfig;
use seeker_core::constants::DT;
use seeker_core::enums::{BlockKind, ButtonState, MissilePhase, TerminationCause};
use seeker_core::events::SimEvent;
use seeker_core::state::RoundSnapshot;
use seeker_core::types::Position;

use crate::engine::{SimConfig, SimulationEngine};
use crate::targets::{is_valid_target, neutralize, target_id};
use crate::world_setup::{move_launcher, spawn_block};

fn engine_with(missile: MissileConfig) -> SimulationEngine {
    let mut engine = SimulationEngine::new(SimConfig {
        missile,
        ..Default::default()
    });
    engine.spawn_launcher(Position::new(0.0, 0.0));
    engine
}

/// Blocks far enough away that no missile reaches them within its lifetime.
fn spawn_far_blocks(engine: &mut SimulationEngine, kinds: &[BlockKind]) -> Vec<Entity> {
    let blocks = kinds
        .iter()
        .enumerate()
        .map(|(i, &kind)| {
            spawn_block(
                engine.world_mut(),
                Position::new(500.0 + i as f64 * 3.0, 500.0),
                kind,
            )
        })
        .collect();
    engine.reset_round();
    engine.drain_events();
    blocks
}

fn count_events(snapshots: &[RoundSnapshot], pred: impl Fn(&SimEvent) -> bool) -> usize {
    snapshots
        .iter()
        .flat_map(|s| s.events.iter())
        .filter(|e| pred(e))
        .count()
}

fn run_ticks(engine: &mut SimulationEngine, ticks: usize) -> Vec<RoundSnapshot> {
    (0..ticks).map(|_| engine.tick()).collect()
}

// ---- Determinism ----

fn random_round(seed: u64) -> SimulationEngine {
    let mut engine = SimulationEngine::new(SimConfig {
        seed,
        ..Default::default()
    });
    engine.spawn_launcher(Position::new(0.0, 0.0));
    engine.spawn_random_level(24, 0.3, Position::new(0.0, 4.0), 16.0);
    engine.queue_command(PlayerCommand::PressFireButton);
    engine
}

#[test]
fn test_determinism_same_seed() {
    let mut engine_a = random_round(12345);
    let mut engine_b = random_round(12345);

    for _ in 0..600 {
        let json_a = serde_json::to_string(&engine_a.tick()).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick()).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
}

#[test]
fn test_determinism_different_seeds() {
    let mut engine_a = random_round(111);
    let mut engine_b = random_round(222);

    let mut diverged = false;
    for _ in 0..120 {
        let json_a = serde_json::to_string(&engine_a.tick()).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick()).unwrap();
        if json_a != json_b {
            diverged = true;
            break;
        }
    }
    assert!(diverged, "Different seeds should produce divergent output");
}

#[test]
fn test_sim_config_partial_json() {
    let config: SimConfig =
        serde_json::from_str(r#"{ "seed": 9, "missile": { "missileCount": 6 } }"#).unwrap();
    assert_eq!(config.seed, 9);
    assert_eq!(config.missile.missile_count, 6);
    assert_eq!(config.arena_capacity, SimConfig::default().arena_capacity);
    assert_eq!(config.time_scale, 1.0);
}

// ---- Target selection ----

#[test]
fn test_prioritize_regular_targets_first() {
    let mut engine = engine_with(MissileConfig {
        missile_count: 3,
        spawn_delay_sec: 0.1,
        ..MissileConfig::default()
    });
    let blocks = spawn_far_blocks(
        &mut engine,
        &[
            BlockKind::Exploding,
            BlockKind::Regular,
            BlockKind::Moving,
            BlockKind::Regular,
            BlockKind::Regular,
        ],
    );

    assert!(engine.fire());
    while engine.is_spawning() {
        engine.tick();
    }

    let held: Vec<Entity> = engine
        .active_missiles()
        .iter()
        .filter_map(|&id| engine.unit(id)?.target())
        .collect();
    assert_eq!(held.len(), 3);
    for target in &held {
        assert!(
            [blocks[1], blocks[3], blocks[4]].contains(target),
            "special block reserved while regular blocks were available"
        );
    }
    assert!(engine.pool().is_available(blocks[0]));
    assert!(engine.pool().is_available(blocks[2]));
}

#[test]
fn test_special_targets_used_when_no_regular_left() {
    let mut engine = engine_with(MissileConfig {
        missile_count: 2,
        spawn_delay_sec: 0.1,
        ..MissileConfig::default()
    });
    spawn_far_blocks(&mut engine, &[BlockKind::Regular, BlockKind::Exploding]);

    engine.fire();
    while engine.is_spawning() {
        engine.tick();
    }
    for &id in engine.active_missiles() {
        assert_eq!(engine.unit(id).unwrap().phase(), MissilePhase::Pursuing);
    }
    assert_eq!(engine.pool().available_count(), 0);
}

#[test]
fn test_reservations_stay_exclusive() {
    let mut engine = engine_with(MissileConfig {
        missile_count: 10,
        spawn_delay_sec: 0.1,
        ..MissileConfig::default()
    });
    spawn_far_blocks(&mut engine, &[BlockKind::Regular; 6]);
    engine.fire();

    for _ in 0..120 {
        engine.tick();
        let mut held: Vec<Entity> = engine
            .active_missiles()
            .iter()
            .filter_map(|&id| engine.unit(id)?.target())
            .collect();
        let total = held.len();
        held.sort();
        held.dedup();
        assert_eq!(held.len(), total, "two missiles hold the same target");
        assert!(engine.pool().is_disjoint());
        assert_eq!(engine.pool().reserved_count(), total);
    }
}

// ---- Empty level ----

#[test]
fn test_empty_level_missile_expires_at_lifetime() {
    let mut engine = engine_with(MissileConfig {
        missile_count: 1,
        max_lifetime_sec: 5.0,
        ..MissileConfig::default()
    });
    assert!(engine.fire());

    let mut expired_at = None;
    for _ in 0..400 {
        let snap = engine.tick();
        for missile in &snap.missiles {
            assert_ne!(missile.phase, MissilePhase::Pursuing);
        }
        let expired = snap.events.iter().any(|e| {
            matches!(
                e,
                SimEvent::MissileDestroyed {
                    cause: TerminationCause::Expired,
                    ..
                }
            )
        });
        if expired {
            expired_at = Some(snap.time.elapsed_secs);
            assert!(snap.events.contains(&SimEvent::RoundCompleted));
            break;
        }
    }

    let t = expired_at.expect("missile never expired");
    assert!((t - 5.0).abs() < 1e-6, "expired at {t}");
    assert_eq!(engine.active_count(), 0);
}

// ---- Spawn sequence ----

#[test]
fn test_spawn_sequence_timing() {
    let mut engine = engine_with(MissileConfig {
        missile_count: 3,
        spawn_delay_sec: 0.2,
        ..MissileConfig::default()
    });
    spawn_far_blocks(&mut engine, &[BlockKind::Regular; 5]);

    let first = engine.tick();
    assert!(!first.is_spawning);

    engine.queue_command(PlayerCommand::Fire);
    let mut spawn_times = Vec::new();
    for _ in 0..60 {
        let snap = engine.tick();
        for event in &snap.events {
            if let SimEvent::MissileLaunched { at_secs, .. } = event {
                spawn_times.push(*at_secs);
            }
        }
        let in_window = !spawn_times.is_empty() && spawn_times.len() < 3;
        assert_eq!(snap.is_spawning, in_window, "at t={}", snap.time.elapsed_secs);
    }

    assert_eq!(spawn_times.len(), 3);
    for pair in spawn_times.windows(2) {
        assert!(pair[1] - pair[0] >= 0.2 - 1e-9, "gap {:?}", pair);
    }
    assert_eq!(engine.active_count(), 3);
}

#[test]
fn test_spawned_event_reports_count() {
    let mut engine = engine_with(MissileConfig {
        missile_count: 4,
        spawn_delay_sec: 0.1,
        ..MissileConfig::default()
    });
    spawn_far_blocks(&mut engine, &[BlockKind::Regular; 2]);
    engine.queue_command(PlayerCommand::Fire);
    let snaps = run_ticks(&mut engine, 60);

    assert_eq!(
        count_events(&snaps, |e| *e == SimEvent::MissilesSpawned { count: 4 }),
        1
    );
    assert_eq!(
        count_events(&snaps, |e| matches!(e, SimEvent::CameraTrackRequested { .. })),
        4
    );
}

#[test]
fn test_arena_exhaustion_skips_spawns() {
    let mut engine = SimulationEngine::new(SimConfig {
        missile: MissileConfig {
            missile_count: 3,
            spawn_delay_sec: 0.1,
            ..MissileConfig::default()
        },
        arena_capacity: 2,
        ..Default::default()
    });
    engine.spawn_launcher(Position::new(0.0, 0.0));
    spawn_far_blocks(&mut engine, &[BlockKind::Regular; 3]);

    engine.fire();
    let snaps = run_ticks(&mut engine, 30);

    assert_eq!(engine.active_count(), 2);
    assert!(!engine.is_spawning());
    assert_eq!(
        count_events(&snaps, |e| *e == SimEvent::MissilesSpawned { count: 2 }),
        1
    );
}

#[test]
fn test_clear_mid_sequence_cancels_remaining_spawns() {
    let mut engine = engine_with(MissileConfig {
        missile_count: 5,
        spawn_delay_sec: 0.5,
        ..MissileConfig::default()
    });
    spawn_far_blocks(&mut engine, &[BlockKind::Regular; 5]);
    engine.fire();
    run_ticks(&mut engine, 40);
    assert_eq!(engine.active_count(), 2);
    assert!(engine.is_spawning());

    engine.clear_active();
    assert!(!engine.is_spawning());
    let snaps = run_ticks(&mut engine, 120);

    assert_eq!(engine.active_count(), 0);
    assert_eq!(
        count_events(&snaps, |e| matches!(e, SimEvent::MissileLaunched { .. })),
        0
    );
    assert_eq!(count_events(&snaps, |e| *e == SimEvent::RoundCompleted), 0);
}

#[test]
fn test_spawn_origin_follows_launcher() {
    let mut engine = engine_with(MissileConfig {
        missile_count: 2,
        spawn_delay_sec: 0.5,
        ..MissileConfig::default()
    });
    spawn_far_blocks(&mut engine, &[BlockKind::Regular; 2]);
    engine.queue_command(PlayerCommand::Fire);
    let mut snaps = run_ticks(&mut engine, 1);

    move_launcher(engine.world_mut(), Position::new(-40.0, 0.0));
    snaps.extend(run_ticks(&mut engine, 40));

    let origins: Vec<Position> = snaps
        .iter()
        .flat_map(|s| s.events.iter())
        .filter_map(|e| match e {
            SimEvent::MissileLaunched { position, .. } => Some(*position),
            _ => None,
        })
        .collect();
    assert_eq!(origins.len(), 2);
    assert!(origins[0].distance_to(&Position::new(0.0, 0.0)) < 0.5);
    assert!(origins[1].distance_to(&Position::new(-40.0, 0.0)) < 0.5);
}

// ---- Stale targets ----

#[test]
fn test_neutralized_target_is_dropped_same_tick() {
    let mut engine = engine_with(MissileConfig {
        missile_count: 1,
        ..MissileConfig::default()
    });
    let blocks = spawn_far_blocks(&mut engine, &[BlockKind::Regular]);
    let x = blocks[0];

    engine.fire();
    engine.tick();
    let id = engine.active_missiles()[0];
    assert_eq!(engine.unit(id).unwrap().target(), Some(x));

    neutralize(engine.world_mut(), x);
    let snap = engine.tick();

    let unit = engine.unit(id).unwrap();
    assert_eq!(unit.phase(), MissilePhase::Seeking);
    assert_eq!(unit.target(), None);
    assert!(snap.events.contains(&SimEvent::TargetLost {
        missile: id,
        target: target_id(x),
    }));

    for _ in 0..60 {
        engine.tick();
        assert!(!engine.pool().is_available(x));
        assert!(!engine.pool().is_reserved(x));
    }
}

#[test]
fn test_neutralized_target_replaced_same_tick() {
    let mut engine = engine_with(MissileConfig {
        missile_count: 1,
        ..MissileConfig::default()
    });
    let blocks = spawn_far_blocks(&mut engine, &[BlockKind::Regular, BlockKind::Regular]);

    engine.fire();
    engine.tick();
    let id = engine.active_missiles()[0];
    let x = engine.unit(id).unwrap().target().unwrap();
    let other = if x == blocks[0] { blocks[1] } else { blocks[0] };

    neutralize(engine.world_mut(), x);
    engine.tick();

    let unit = engine.unit(id).unwrap();
    assert_eq!(unit.phase(), MissilePhase::Pursuing);
    assert_eq!(unit.target(), Some(other));
    assert!(!engine.pool().is_available(x));
}

#[test]
fn test_despawned_target_is_dropped() {
    let mut engine = engine_with(MissileConfig {
        missile_count: 1,
        ..MissileConfig::default()
    });
    let blocks = spawn_far_blocks(&mut engine, &[BlockKind::Regular]);

    engine.fire();
    engine.world_mut().despawn(blocks[0]).unwrap();
    engine.tick();

    let id = engine.active_missiles()[0];
    assert_eq!(engine.unit(id).unwrap().phase(), MissilePhase::Seeking);
    assert_eq!(engine.pool().available_count(), 0);
    assert_eq!(engine.pool().reserved_count(), 0);
}

#[test]
fn test_hit_on_reserved_block_makes_holder_reacquire() {
    let mut engine = engine_with(MissileConfig {
        missile_count: 2,
        spawn_delay_sec: 0.1,
        ..MissileConfig::default()
    });
    spawn_far_blocks(&mut engine, &[BlockKind::Regular; 3]);
    engine.fire();
    while engine.is_spawning() {
        engine.tick();
    }
    let (a, b) = (engine.active_missiles()[0], engine.active_missiles()[1]);
    let x = engine.unit(a).unwrap().target().unwrap();

    assert!(engine.resolve_contact(b, x));
    assert!(!engine.pool().is_available(x));
    assert!(!engine.pool().is_reserved(x));

    let snap = engine.tick();
    let unit = engine.unit(a).unwrap();
    assert_ne!(unit.target(), Some(x));
    assert_eq!(unit.phase(), MissilePhase::Pursuing);
    assert!(snap.events.contains(&SimEvent::TargetLost {
        missile: a,
        target: target_id(x),
    }));
    assert!(!engine.pool().is_available(x));
    assert!(!engine.pool().is_reserved(x));
    assert!(engine.pool().is_disjoint());
    assert_eq!(engine.pool().reserved_count(), 1);
    assert_eq!(engine.pool().available_count(), 1);
}

#[test]
fn test_hit_on_last_reserved_block_leaves_holder_seeking() {
    let mut engine = engine_with(MissileConfig {
        missile_count: 2,
        spawn_delay_sec: 0.1,
        ..MissileConfig::default()
    });
    spawn_far_blocks(&mut engine, &[BlockKind::Regular]);
    engine.fire();
    while engine.is_spawning() {
        engine.tick();
    }
    let (a, b) = (engine.active_missiles()[0], engine.active_missiles()[1]);
    let x = engine.unit(a).unwrap().target().unwrap();
    assert_eq!(engine.unit(b).unwrap().target(), None);

    assert!(engine.resolve_contact(b, x));
    engine.tick();

    let unit = engine.unit(a).unwrap();
    assert_eq!(unit.phase(), MissilePhase::Seeking);
    assert_eq!(unit.target(), None);
    assert_eq!(engine.pool().available_count(), 0);
    assert_eq!(engine.pool().reserved_count(), 0);
}

#[test]
fn test_grid_level_seeds_pool() {
    let mut engine = engine_with(MissileConfig::default());
    let blocks = engine.spawn_grid_level(Position::new(-4.0, 6.0), 2, 4, 3);
    assert_eq!(blocks.len(), 8);
    assert_eq!(engine.pool().available_count(), 8);
}

// ---- Clearing ----

#[test]
fn test_clear_returns_targets_without_completion() {
    let mut engine = engine_with(MissileConfig {
        missile_count: 2,
        spawn_delay_sec: 0.1,
        ..MissileConfig::default()
    });
    let blocks = spawn_far_blocks(&mut engine, &[BlockKind::Regular, BlockKind::Regular]);

    engine.fire();
    while engine.is_spawning() {
        engine.tick();
    }
    assert_eq!(engine.pool().available_count(), 0);

    engine.clear_active();
    let snap = engine.tick();

    assert_eq!(engine.active_count(), 0);
    assert!(engine.pool().is_available(blocks[0]));
    assert!(engine.pool().is_available(blocks[1]));
    assert_eq!(engine.pool().reserved_count(), 0);
    assert_eq!(
        count_events(std::slice::from_ref(&snap), |e| matches!(
            e,
            SimEvent::MissileDestroyed {
                cause: TerminationCause::Cleared,
                ..
            }
        )),
        2
    );
    assert!(!snap.events.contains(&SimEvent::RoundCompleted));
}

#[test]
fn test_clear_twice_destroys_each_missile_once() {
    let mut engine = engine_with(MissileConfig {
        missile_count: 2,
        spawn_delay_sec: 0.1,
        ..MissileConfig::default()
    });
    spawn_far_blocks(&mut engine, &[BlockKind::Regular; 3]);
    engine.fire();
    run_ticks(&mut engine, 10);

    engine.clear_active();
    engine.clear_active();
    let events = engine.drain_events();
    let destroyed = events
        .iter()
        .filter(|e| matches!(e, SimEvent::MissileDestroyed { .. }))
        .count();
    assert_eq!(destroyed, 2);
    assert_eq!(engine.pool().available_count(), 3);
}

// ---- Round gate ----

#[test]
fn test_fire_is_once_per_round() {
    let mut engine = engine_with(MissileConfig {
        missile_count: 1,
        max_lifetime_sec: 5.0,
        ..MissileConfig::default()
    });
    spawn_far_blocks(&mut engine, &[BlockKind::Regular; 2]);

    assert!(engine.fire());
    let mut completed = false;
    for _ in 0..400 {
        let snap = engine.tick();
        assert!(!snap.can_fire);
        assert!(!engine.fire());
        assert!(!engine.press_fire_button());
        completed |= snap.events.contains(&SimEvent::RoundCompleted);
    }
    assert!(completed);
    assert_eq!(engine.active_count(), 0);
    assert!(!engine.can_fire());

    engine.reset_round();
    assert!(engine.can_fire());
    assert!(engine.fire());
}

#[test]
fn test_button_state_follows_round() {
    let mut engine = engine_with(MissileConfig::default());
    spawn_far_blocks(&mut engine, &[BlockKind::Regular; 3]);
    assert_eq!(engine.button_state(), ButtonState::Ready);

    engine.queue_command(PlayerCommand::PressFireButton);
    let snap = engine.tick();
    assert_eq!(snap.button, ButtonState::Used);
    assert!(snap.events.contains(&SimEvent::ButtonStateChanged {
        state: ButtonState::Used
    }));
    assert!(snap.has_fired_this_round);

    engine.queue_command(PlayerCommand::ResetRound);
    let snap = engine.tick();
    assert_eq!(snap.button, ButtonState::Ready);
    assert!(snap.can_fire);
}

#[test]
fn test_disabled_config_disables_button() {
    let mut engine = engine_with(MissileConfig {
        enabled: false,
        ..MissileConfig::default()
    });
    spawn_far_blocks(&mut engine, &[BlockKind::Regular]);
    assert_eq!(engine.button_state(), ButtonState::Disabled);
    assert!(!engine.press_fire_button());
    assert_eq!(engine.active_count(), 0);

    engine.queue_command(PlayerCommand::SetConfig {
        config: MissileConfig::default(),
    });
    let snap = engine.tick();
    assert_eq!(snap.button, ButtonState::Ready);
}

#[test]
fn test_press_without_launcher_is_noop() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    spawn_block(engine.world_mut(), Position::new(5.0, 5.0), BlockKind::Regular);

    assert!(!engine.press_fire_button());
    let snap = engine.tick();
    assert_eq!(snap.button, ButtonState::Ready);
    assert!(!snap.has_fired_this_round);
    assert!(snap.missiles.is_empty());
}

#[test]
fn test_set_config_is_clamped() {
    let mut engine = engine_with(MissileConfig::default());
    engine.set_config(MissileConfig {
        missile_count: 50,
        spawn_delay_sec: 0.0,
        ..MissileConfig::default()
    });
    assert_eq!(engine.config().missile_count, 10);
    assert!((engine.config().spawn_delay_sec - 0.1).abs() < 1e-12);
}

// ---- Full round ----

#[test]
fn test_full_round_lights_blocks() {
    let mut engine = engine_with(MissileConfig {
        missile_count: 3,
        spawn_delay_sec: 0.2,
        ..MissileConfig::default()
    });
    let blocks: Vec<Entity> = (0..4)
        .map(|i| {
            spawn_block(
                engine.world_mut(),
                Position::new(-6.0 + i as f64 * 4.0, 8.0),
                BlockKind::Regular,
            )
        })
        .collect();
    engine.reset_round();

    engine.queue_command(PlayerCommand::PressFireButton);
    let snaps = run_ticks(&mut engine, 900);

    let hits = count_events(&snaps, |e| *e == SimEvent::AnyHit);
    let lit = blocks
        .iter()
        .filter(|&&b| !is_valid_target(engine.world(), b))
        .count();
    assert_eq!(hits, 3);
    assert_eq!(lit, 3);
    assert_eq!(
        count_events(&snaps, |e| matches!(
            e,
            SimEvent::MissileDestroyed {
                cause: TerminationCause::Hit,
                ..
            }
        )),
        3
    );
    assert_eq!(count_events(&snaps, |e| *e == SimEvent::RoundCompleted), 1);
    assert_eq!(engine.active_count(), 0);
    assert_eq!(engine.pool().available_count(), 1);

    let last = snaps.last().unwrap();
    assert_eq!(last.level.blocks_total, 4);
    assert_eq!(last.level.blocks_lit, 3);
    assert_eq!(last.button, ButtonState::Used);
}

#[test]
fn test_external_contact_resolution() {
    let mut engine = engine_with(MissileConfig {
        missile_count: 1,
        ..MissileConfig::default()
    });
    let blocks = spawn_far_blocks(&mut engine, &[BlockKind::Regular]);
    engine.fire();
    let id = engine.active_missiles()[0];

    assert!(engine.resolve_contact(id, blocks[0]));
    assert!(!engine.resolve_contact(id, blocks[0]));
    assert_eq!(engine.active_count(), 0);
    assert!(engine.unit(id).is_none());

    let events = engine.drain_events();
    assert!(events.contains(&SimEvent::MissileHitTarget {
        missile: id,
        target: target_id(blocks[0]),
    }));
    assert!(events.contains(&SimEvent::RoundCompleted));
}

#[test]
fn test_time_scale_zero_pauses() {
    let mut engine = engine_with(MissileConfig::default());
    spawn_far_blocks(&mut engine, &[BlockKind::Regular]);
    engine.queue_commands([
        PlayerCommand::SetTimeScale { scale: 0.0 },
        PlayerCommand::Fire,
    ]);
    // The new scale already applies to the tick that processes it.
    let snap = engine.tick();
    assert_eq!(snap.time.tick, 0);
    assert_eq!(snap.missiles.len(), 1);
    assert_eq!(snap.missiles[0].lifetime_secs, 0.0);

    let snap = engine.tick();
    assert_eq!(snap.time.tick, 0);
    assert_eq!(snap.missiles[0].lifetime_secs, 0.0);

    engine.queue_command(PlayerCommand::SetTimeScale { scale: 2.0 });
    let snap = engine.tick();
    assert_eq!(snap.time.tick, 1);
    assert!((snap.time.elapsed_secs - 2.0 * DT).abs() < 1e-12);
}
