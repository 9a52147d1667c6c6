//! Waveshot headless runner
//!
//! Runs the simulation at a fixed rate with a scripted cursor and logs a
//! summary. Usage: `waveshot [settings.json]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::error::Error;

    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use waveshot::consts::*;
    use waveshot::frame::{FrameObjects, build_frame};
    use waveshot::settings::CursorPattern;
    use waveshot::sim::{GameFlags, GameState, TickInput, tick};
    use waveshot::{Content, Settings, clamp_to_play_area, player_grid_column};

    /// Scripted stand-in for the mouse
    struct Cursor {
        pattern: CursorPattern,
        position: Vec2,
        velocity: f32,
        max_speed: f32,
        rng: Pcg32,
    }

    impl Cursor {
        fn new(settings: &Settings) -> Self {
            Self {
                pattern: settings.cursor,
                position: Vec2::new(0.0, settings.cursor_y),
                velocity: settings.cursor_wander,
                max_speed: settings.cursor_wander.abs(),
                rng: Pcg32::seed_from_u64(settings.seed),
            }
        }

        fn step(&mut self, dt: f32) -> Vec2 {
            match self.pattern {
                CursorPattern::Fixed => {}
                CursorPattern::Wander => {
                    let nudge = self.rng.random_range(-1.0..=1.0f32) * self.max_speed;
                    self.velocity = (self.velocity + nudge).clamp(-self.max_speed, self.max_speed);
                    self.advance(dt);
                }
                CursorPattern::Sweep => self.advance(dt),
            }
            self.position
        }

        /// Move horizontally, bouncing off the play area sides
        fn advance(&mut self, dt: f32) {
            self.position.x += self.velocity * dt;
            if self.position.x.abs() > PLAY_AREA_HALF_WIDTH {
                self.velocity = -self.velocity;
            }
            self.position = clamp_to_play_area(self.position);
        }
    }

    /// Totals gathered while running
    #[derive(Debug, Default)]
    struct RunStats {
        restarts: u32,
        waves_cleared: u32,
        levels_cleared: u32,
        damage_events: u64,
        dropped_frame_objects: u64,
        peak_frame_objects: usize,
    }

    fn load_settings() -> Result<Settings, Box<dyn Error>> {
        match std::env::args().nth(1) {
            Some(path) => Ok(Settings::load_from(path)?),
            None => Ok(Settings::default()),
        }
    }

    fn load_content(settings: &Settings) -> Result<Content, Box<dyn Error>> {
        match &settings.content_path {
            Some(path) => {
                let content = Content::load(path)?;
                log::info!("Loaded content from {path}");
                Ok(content)
            }
            None => {
                log::info!("Using built-in demo content");
                Ok(Content::demo())
            }
        }
    }

    pub fn run() -> Result<(), Box<dyn Error>> {
        let settings = load_settings()?;
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(settings.log_filter.as_str()),
        )
        .init();
        log::info!("Waveshot (headless) starting...");

        let content = load_content(&settings)?;
        log::info!(
            "Content: {} levels, {} enemy types, {} paths",
            content.level_count(),
            content.enemy_types.len(),
            content.way_point_paths.len()
        );

        let mut state = GameState::new(&content);
        let mut frame = FrameObjects::new();
        let mut cursor = Cursor::new(&settings);
        let mut stats = RunStats::default();
        let dt = settings.tick_dt();
        let total_ticks = settings.total_ticks();
        log::info!(
            "Running {} ticks at {} Hz (cursor: {})",
            total_ticks,
            settings.sim_hz,
            cursor.pattern.as_str()
        );

        let mut flags = GameFlags::RESET | GameFlags::PLAY_ENABLED;
        for _ in 0..total_ticks {
            if !state.hero.is_alive() && !flags.contains(GameFlags::RESET) {
                flags.toggle_play(false);
                stats.restarts += 1;
            }

            let position = cursor.step(dt);
            let input = TickInput {
                time_delta: dt,
                world_mouse_position: position,
                player_grid_x: player_grid_column(position.x),
                flags,
            };
            let restarting = flags.contains(GameFlags::RESET);
            flags = tick(&mut state, &content, &input);

            if !restarting {
                if state.wave.reset_edge && !state.level.reset_edge {
                    stats.waves_cleared += 1;
                }
                if state.level.reset_edge {
                    stats.levels_cleared += 1;
                }
            }
            stats.damage_events += (state.enemies_vs_hero_bullets.events_last_tick
                + state.hero_vs_enemy_bullets.events_last_tick) as u64;

            build_frame(&state, &content, &mut frame);
            stats.dropped_frame_objects += frame.dropped as u64;
            stats.peak_frame_objects = stats.peak_frame_objects.max(frame.len());

            if state.level.campaign_complete {
                stats.levels_cleared += 1;
                log::info!("Campaign complete after {:.1}s", state.play_time);
                break;
            }
        }

        let grids = &state.grids;
        let grid_overflow = grids.enemies.total_overflow
            + grids.heroes.total_overflow
            + grids.enemy_bullets.total_overflow
            + grids.hero_bullets.total_overflow;

        log::info!("=== Summary ===");
        log::info!(
            "Ticks: {} ({:.1}s simulated)",
            state.tick_count,
            state.play_time
        );
        log::info!(
            "Reached level {} wave {}; cleared {} waves, {} levels",
            state.level.index,
            state.wave.index,
            stats.waves_cleared,
            stats.levels_cleared
        );
        log::info!(
            "Enemies destroyed: {}, escaped: {}",
            state.enemies.kills,
            state.enemies.escapes
        );
        log::info!(
            "Hero deaths: {}, restarts: {}",
            state.hero.deaths,
            stats.restarts
        );
        log::info!(
            "Bullets fired in current scope: enemy {}, hero {}",
            state.enemy_bullets.spawned,
            state.hero_bullets.spawned
        );
        log::info!("Damage events: {}", stats.damage_events);
        log::info!(
            "Frame objects: peak {}, dropped {}",
            stats.peak_frame_objects,
            stats.dropped_frame_objects
        );
        if grid_overflow > 0 {
            log::warn!("Collision grid dropped {} inserts in total", grid_overflow);
        } else {
            log::info!("Collision grid overflow: none");
        }

        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The runner is native only; the library builds for any target
}
