//! Simulation tick
//!
//! One call advances every pool in a fixed order. Damage found by the
//! collision pass at the end of a tick is applied by the move steps of the
//! next tick.

use glam::Vec2;

use super::clock::GameFlags;
use super::state::GameState;
use crate::content::Content;

/// Input for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Seconds since the previous tick
    pub time_delta: f32,
    /// Cursor in world units; the hero follows it
    pub world_mouse_position: Vec2,
    /// Hero's horizontal grid column, used by per-column paths
    pub player_grid_x: u8,
    pub flags: GameFlags,
}

/// Advance the game state by one tick.
///
/// Returns the flags to carry into the next tick: `RESET` is consumed here.
/// Nothing runs while `PLAY_ENABLED` is clear.
pub fn tick(state: &mut GameState, content: &Content, input: &TickInput) -> GameFlags {
    let mut flags = input.flags;
    if !flags.contains(GameFlags::PLAY_ENABLED) {
        return flags;
    }

    let dt = if input.time_delta.is_finite() {
        input.time_delta.max(0.0)
    } else {
        0.0
    };
    let reset = flags.contains(GameFlags::RESET);
    if reset {
        log::info!("Game reset");
        state.clear_damage();
    }

    // Clocks observe last tick's enemy state
    state.level.update(
        flags,
        dt,
        state.enemies.all_waves_complete,
        |next| content.has_level(next as usize),
    );
    state.wave.update(
        flags,
        dt,
        state.level.reset_edge,
        state.enemies.spawned_all,
        state.enemies.any_live(),
    );

    state.enemies.update(
        content,
        &state.level,
        &state.wave,
        dt,
        input.player_grid_x,
        &state.enemies_vs_hero_bullets.a.damage,
    );
    state.hero.update(
        content,
        reset,
        input.world_mouse_position,
        &state.hero_vs_enemy_bullets.a.damage,
    );

    // Enemy bullets run on the wave clock, hero bullets on the level clock
    let wave_key = state.wave_key();
    state.enemy_bullets.update(
        content,
        wave_key.0,
        reset || state.wave.reset_edge,
        state.wave.time,
        dt,
        state.enemies.bullet_sources(),
        &state.hero_vs_enemy_bullets.b.damage,
    );
    state.hero_bullets.update(
        content,
        state.level.index,
        reset || state.level.reset_edge,
        state.level.time,
        dt,
        state.hero.bullet_sources(),
        &state.enemies_vs_hero_bullets.b.damage,
    );

    state.rebuild_grids();
    state.resolve_damage();

    state.tick_count += 1;
    state.play_time += dt as f64;
    flags.remove(GameFlags::RESET);
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::content::{
        BulletType, ContentBuilder, EnemyInstanceDef, EnemyType, HeroType, SourceBulletEntry,
    };
    use crate::sim::fixed::{to_q4_u8, to_q8_u8};
    use proptest::prelude::*;

    const DT: f32 = 0.1;

    fn play() -> GameFlags {
        GameFlags::PLAY_ENABLED
    }

    fn input(flags: GameFlags, cursor: Vec2) -> TickInput {
        TickInput {
            time_delta: DT,
            world_mouse_position: cursor,
            player_grid_x: 0,
            flags,
        }
    }

    /// Stationary enemy sitting on a stationary hero bullet
    fn overlap_content() -> Content {
        ContentBuilder::new()
            .hero_type(HeroType {
                health: 1000,
                damage: 0,
                radius_q4: to_q4_u8(0.5),
                ..HeroType::default()
            })
            .hero_bullet_type(BulletType {
                health: 1000,
                damage: 30,
                radius_q8: to_q8_u8(0.5),
                movement_speed_q4: 0,
            })
            .hero_bullet(
                0,
                SourceBulletEntry::new(Vec2::ZERO, Vec2::ZERO, 0).timing(0.0, 15.0, 0.0, 1),
            )
            .enemy_type(EnemyType {
                health: 100,
                damage: 1,
                movement_speed_q4: 0,
                radius_q4: to_q4_u8(0.5),
                ..EnemyType::default()
            })
            .spawn_point(Vec2::new(0.0, 2.0))
            .path(&[Vec2::new(0.0, 2.0)], 15.0)
            .wave(0, 0, vec![EnemyInstanceDef::new(0.0, 0, 0, 0)])
            .build()
            .unwrap()
    }

    /// Two waves of enemies that leave as soon as they reach their only way-point
    fn two_wave_content() -> Content {
        ContentBuilder::new()
            .hero_type(HeroType::default())
            .enemy_type(EnemyType {
                health: 10,
                movement_speed_q4: to_q4_u8(1.0),
                radius_q4: to_q4_u8(0.25),
                ..EnemyType::default()
            })
            .enemy_type(EnemyType {
                health: 20,
                movement_speed_q4: to_q4_u8(1.0),
                radius_q4: to_q4_u8(0.25),
                ..EnemyType::default()
            })
            .spawn_point(Vec2::new(-2.0, 6.0))
            .path(&[Vec2::new(-2.0, 6.0)], 0.0)
            .wave(0, 0, vec![EnemyInstanceDef::new(0.0, 0, 0, 0)])
            .wave(
                0,
                1,
                vec![
                    EnemyInstanceDef::new(0.0, 1, 0, 0),
                    EnemyInstanceDef::new(1.0, 1, 0, 0),
                ],
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_paused_tick_is_a_no_op() {
        let content = Content::demo();
        let mut state = GameState::new(&content);
        let flags = tick(&mut state, &content, &input(GameFlags::RESET, Vec2::ZERO));
        assert_eq!(flags, GameFlags::RESET);
        assert_eq!(state.tick_count, 0);
        assert!(!state.hero.is_alive());
    }

    #[test]
    fn test_reset_is_consumed() {
        let content = Content::demo();
        let mut state = GameState::new(&content);
        let flags = tick(
            &mut state,
            &content,
            &input(GameFlags::RESET | play(), Vec2::ZERO),
        );
        assert_eq!(flags, play());
        assert!(state.hero.is_alive());
        assert!(state.level.reset_edge);
        assert!(state.wave.reset_edge);
        assert_eq!(state.level.time, 0.0);
    }

    #[test]
    fn test_enemy_dies_on_fifth_tick() {
        let content = overlap_content();
        let mut state = GameState::new(&content);
        let cursor = Vec2::new(0.0, 2.0);

        let mut flags = tick(&mut state, &content, &input(GameFlags::RESET | play(), cursor));
        assert_eq!(state.enemies_vs_hero_bullets.a.damage[0], 30);
        for _ in 0..3 {
            flags = tick(&mut state, &content, &input(flags, cursor));
            assert!(state.enemies.slots.is_live(0));
        }
        assert_eq!(state.enemies_vs_hero_bullets.a.damage[0], 120);
        assert_eq!(state.enemies_vs_hero_bullets.events_last_tick, 1);

        tick(&mut state, &content, &input(flags, cursor));
        assert!(!state.enemies.slots.is_live(0));
        assert_eq!(state.enemies.kills, 1);
        // One bullet, four contacts, fired only once
        assert_eq!(state.hero_bullets.spawned, 1);
    }

    #[test]
    fn test_four_spawns_after_three_and_a_half_seconds() {
        let content = ContentBuilder::new()
            .hero_type(HeroType {
                health: 1000,
                radius_q4: to_q4_u8(0.5),
                ..HeroType::default()
            })
            .hero_bullet_type(BulletType {
                health: 1000,
                damage: 0,
                radius_q8: to_q8_u8(0.25),
                movement_speed_q4: 0,
            })
            .hero_bullet(
                0,
                SourceBulletEntry::new(Vec2::ZERO, Vec2::ZERO, 0).timing(0.0, 1.0, 0.0, 1),
            )
            .enemy_type(EnemyType {
                health: 100,
                movement_speed_q4: 0,
                radius_q4: to_q4_u8(0.5),
                ..EnemyType::default()
            })
            .spawn_point(Vec2::new(0.0, 6.0))
            .path(&[Vec2::new(0.0, 6.0)], 15.0)
            .wave(0, 0, vec![EnemyInstanceDef::new(0.0, 0, 0, 0)])
            .build()
            .unwrap();
        let mut state = GameState::new(&content);
        let cursor = Vec2::new(0.0, -6.0);

        // Reset tick at level time 0, then 35 ticks to reach 3.5 s
        let mut flags = tick(&mut state, &content, &input(GameFlags::RESET | play(), cursor));
        for _ in 0..35 {
            flags = tick(&mut state, &content, &input(flags, cursor));
        }
        assert!((state.level.time - 3.5).abs() < 1e-3);
        assert_eq!(state.level.index, 0);
        // Shots at 0, 1, 2 and 3 seconds
        assert_eq!(state.hero_bullets.spawned, 4);
        assert_eq!(state.hero_bullets.counters.get(0, 0), 4);
    }

    #[test]
    fn test_reset_pulse_lasts_one_tick() {
        let content = overlap_content();
        let mut state = GameState::new(&content);
        let mut flags = tick(
            &mut state,
            &content,
            &input(GameFlags::RESET | play(), Vec2::ZERO),
        );
        assert!(state.enemies.slots.reset.test(0));
        assert!(state.hero.slots.reset.test(0));
        assert!(state.hero_bullets.slots.reset.test(0));

        for _ in 0..3 {
            flags = tick(&mut state, &content, &input(flags, Vec2::ZERO));
            assert!(!state.enemies.slots.reset.test(0));
            assert!(!state.hero.slots.reset.test(0));
            assert!(!state.hero_bullets.slots.reset.test(0));
        }
    }

    #[test]
    fn test_damage_zeroed_on_respawn() {
        let content = overlap_content();
        let mut state = GameState::new(&content);
        let cursor = Vec2::new(0.0, 2.0);
        let mut flags = tick(&mut state, &content, &input(GameFlags::RESET | play(), cursor));
        flags = tick(&mut state, &content, &input(flags, cursor));
        assert_eq!(state.enemies_vs_hero_bullets.a.damage[0], 60);

        // Restart with the hero away from the enemy: no hero bullet overlaps it
        flags.insert(GameFlags::RESET);
        tick(&mut state, &content, &input(flags, Vec2::new(3.0, -6.0)));
        assert!(state.enemies.slots.reset.test(0));
        assert_eq!(state.enemies_vs_hero_bullets.a.damage[0], 0);
    }

    #[test]
    fn test_wave_transition() {
        let content = two_wave_content();
        let mut state = GameState::new(&content);
        let mut flags = tick(
            &mut state,
            &content,
            &input(GameFlags::RESET | play(), Vec2::ZERO),
        );
        assert_eq!(state.enemies.slots.count(), 1);
        assert!(state.enemies.spawned_all);

        // Reaches its only way-point past the zero time-out and leaves
        flags = tick(&mut state, &content, &input(flags, Vec2::ZERO));
        assert!(!state.enemies.any_live());
        assert_eq!(state.wave.index, 0);

        tick(&mut state, &content, &input(flags, Vec2::ZERO));
        assert_eq!(state.wave.index, 1);
        assert_eq!(state.wave.time, 0.0);
        assert_eq!(state.enemies.slots.count(), 1);
        assert_eq!(state.enemies.types[0], 1);
        assert!(state.enemies.slots.is_live(0));
        assert!(!state.enemies.spawned_all);
    }

    #[test]
    fn test_campaign_completes_without_runaway() {
        let content = two_wave_content();
        let mut state = GameState::new(&content);
        let mut flags = tick(
            &mut state,
            &content,
            &input(GameFlags::RESET | play(), Vec2::ZERO),
        );
        for _ in 0..100 {
            flags = tick(&mut state, &content, &input(flags, Vec2::ZERO));
        }
        assert!(state.level.campaign_complete);
        assert_eq!(state.level.index, 0);
        assert_eq!(state.enemies.escapes, 3);
    }

    #[test]
    fn test_enemy_bullets_reset_with_wave() {
        let content = Content::demo();
        let mut state = GameState::new(&content);
        let mut flags = tick(
            &mut state,
            &content,
            &input(GameFlags::RESET | play(), Vec2::new(0.0, -6.0)),
        );
        for _ in 0..30 {
            flags = tick(&mut state, &content, &input(flags, Vec2::new(0.0, -6.0)));
        }
        assert_eq!(state.enemy_bullets.key, Some(state.wave_key().0));
        assert!(state.hero_bullets.spawned > 0);
    }

    #[test]
    fn test_hero_death_and_restart() {
        let content = ContentBuilder::new()
            .hero_type(HeroType {
                health: 20,
                radius_q4: to_q4_u8(0.5),
                ..HeroType::default()
            })
            .enemy_bullet_type(BulletType {
                health: 100,
                damage: 25,
                radius_q8: to_q8_u8(0.5),
                movement_speed_q4: 0,
            })
            .enemy_type(EnemyType {
                health: 100,
                radius_q4: to_q4_u8(0.25),
                ..EnemyType::default()
            })
            .enemy_bullet(
                0,
                SourceBulletEntry::new(Vec2::new(0.0, -1.0), Vec2::new(0.0, -1.0), 0)
                    .timing(0.0, 15.0, 0.0, 1),
            )
            .spawn_point(Vec2::new(0.0, 1.0))
            .path(&[Vec2::new(0.0, 1.0)], 15.0)
            .wave(0, 0, vec![EnemyInstanceDef::new(0.0, 0, 0, 0)])
            .build()
            .unwrap();

        let mut state = GameState::new(&content);
        // The enemy drops a stationary bullet right on the hero
        let mut flags = tick(&mut state, &content, &input(GameFlags::RESET | play(), Vec2::ZERO));
        assert_eq!(state.hero_vs_enemy_bullets.a.damage[0], 25);
        flags = tick(&mut state, &content, &input(flags, Vec2::ZERO));
        assert!(!state.hero.is_alive());
        assert_eq!(state.hero.deaths, 1);

        flags.toggle_play(state.hero.is_alive());
        assert!(flags.contains(GameFlags::RESET));
        tick(&mut state, &content, &input(flags, Vec2::ZERO));
        assert!(state.hero.is_alive());
    }

    proptest! {
        #[test]
        fn prop_liveness_stays_in_range(
            steps in proptest::collection::vec((0.0f32..0.25, -6.0f32..6.0, -10.0f32..10.0, 0u8..4), 1..200)
        ) {
            let content = Content::demo();
            let mut state = GameState::new(&content);
            let mut flags = GameFlags::RESET | GameFlags::PLAY_ENABLED;
            for (dt, x, y, column) in steps {
                let input = TickInput {
                    time_delta: dt,
                    world_mouse_position: Vec2::new(x, y),
                    player_grid_x: column,
                    flags,
                };
                flags = tick(&mut state, &content, &input);
                prop_assert!(state.liveness_in_range());
                prop_assert!(state.enemies.slots.count() <= ENEMY_CAPACITY);
                prop_assert!(state.enemy_bullets.slots.count() <= ENEMY_BULLET_CAPACITY);
                if !state.hero.is_alive() {
                    flags.toggle_play(false);
                }
            }
        }

        #[test]
        fn prop_spawn_counts_never_decrease(
            dts in proptest::collection::vec(0.0f32..0.2, 1..150)
        ) {
            let content = Content::demo();
            let mut state = GameState::new(&content);
            let mut flags = GameFlags::RESET | GameFlags::PLAY_ENABLED;
            let mut last = 0u32;
            for dt in dts {
                let level = state.level.index;
                let input = TickInput {
                    time_delta: dt,
                    world_mouse_position: Vec2::new(0.0, -7.0),
                    player_grid_x: 0,
                    flags,
                };
                flags = tick(&mut state, &content, &input);
                let fired = state.hero_bullets.counters.get(0, 0);
                if state.level.index == level && !state.level.reset_edge {
                    prop_assert!(fired >= last);
                }
                last = fired;
            }
        }
    }
}
