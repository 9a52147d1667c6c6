//! Enemy instance manager
//!
//! Enemy slots are wave-relative: slot `i` is the `i`-th instance definition
//! of the current wave. Slots fill strictly in order as their start times
//! pass and are never reused until the wave changes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::clock::{LevelClock, WaveClock, WaveKey};
use super::fixed::{move_toward, q4, q4_vec};
use super::pool::PoolSlots;
use crate::consts::*;
use crate::content::{Content, EnemyInstanceDef};

/// Way-point path choice for an enemy instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathSelector {
    Fixed(u8),
    /// One path per hero grid column, starting at `base`
    PerPlayerColumn(u8),
}

impl PathSelector {
    pub fn decode(raw: i8) -> Self {
        if raw < 0 {
            PathSelector::PerPlayerColumn(raw.unsigned_abs())
        } else {
            PathSelector::Fixed(raw as u8)
        }
    }

    pub fn resolve(self, player_grid_x: u8) -> usize {
        match self {
            PathSelector::Fixed(id) => id as usize,
            PathSelector::PerPlayerColumn(base) => base as usize + player_grid_x as usize,
        }
    }

    /// Largest path index any hero column can select
    pub fn highest(self) -> usize {
        self.resolve(PLAYER_GRID_COLUMNS - 1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyInstances {
    pub slots: PoolSlots,
    pub positions: Vec<Vec2>,
    pub way_point_index: Vec<u8>,
    /// Enemy type per slot
    pub types: Vec<u8>,
    /// Wave-relative start time per slot (seconds)
    pub start_times: Vec<f32>,
    /// Scope the slots currently belong to
    pub key: Option<WaveKey>,
    pub spawned_all: bool,
    pub all_waves_complete: bool,
    pub kills: u32,
    pub escapes: u32,
}

impl EnemyInstances {
    pub fn new() -> Self {
        Self {
            slots: PoolSlots::new(ENEMY_CAPACITY),
            positions: vec![Vec2::ZERO; ENEMY_CAPACITY],
            way_point_index: vec![0; ENEMY_CAPACITY],
            types: vec![0; ENEMY_CAPACITY],
            start_times: vec![0.0; ENEMY_CAPACITY],
            key: None,
            spawned_all: false,
            all_waves_complete: false,
            kills: 0,
            escapes: 0,
        }
    }

    pub fn any_live(&self) -> bool {
        self.slots.live_count() > 0
    }

    /// Run one tick: restart on a new wave scope, then move, then spawn.
    ///
    /// `damage` is the per-slot damage accumulated by the previous tick's
    /// collision pass.
    pub fn update(
        &mut self,
        content: &Content,
        level: &LevelClock,
        wave: &WaveClock,
        dt: f32,
        player_grid_x: u8,
        damage: &[u16],
    ) {
        let key = WaveKey::new(level.index, wave.index);
        if wave.reset_edge || self.key != Some(key) {
            self.begin_wave(key);
        }

        if wave.index >= MAX_WAVES_PER_LEVEL {
            self.all_waves_complete = true;
            return;
        }
        let Some(level_wave) = content
            .level_wave(key.index())
            .filter(|w| w.enemy_count > 0)
        else {
            self.all_waves_complete = true;
            return;
        };

        let defs = content.wave_instances(level_wave);
        let total = defs.len().min(self.slots.capacity());
        let defs = &defs[..total];

        self.move_instances(content, defs, wave.time, dt, player_grid_x, damage);
        self.spawn(content, defs, wave.time);

        if self.slots.count() == total {
            self.spawned_all = true;
        }
    }

    fn begin_wave(&mut self, key: WaveKey) {
        log::debug!("Enemy slots reset for wave key {}", key.0);
        self.key = Some(key);
        self.slots.clear();
        self.spawned_all = false;
        self.all_waves_complete = false;
    }

    /// Materialize every instance whose start time has passed, in order.
    /// Stops at the first instance that is not due yet.
    pub fn spawn(&mut self, content: &Content, defs: &[EnemyInstanceDef], wave_time: f32) {
        while self.slots.count() < defs.len() {
            let index = self.slots.count();
            let def = &defs[index];
            let start_time = q4(def.start_time_q4);
            if wave_time < start_time {
                break;
            }

            self.positions[index] = self.spawn_position(content, def.spawn_point, index);
            self.way_point_index[index] = 0;
            self.types[index] = def.enemy_type;
            self.start_times[index] = start_time;
            self.slots.set_count(index + 1);
            self.slots.spawn(index);
            log::debug!("Enemy {} spawned at {:?}", index, self.positions[index]);
        }
    }

    fn spawn_position(&self, content: &Content, spawn_point: u8, index: usize) -> Vec2 {
        if spawn_point >= SELF_REFERENTIAL_SPAWN_BASE {
            let leader = (spawn_point - SELF_REFERENTIAL_SPAWN_BASE) as usize;
            if leader < index {
                return self.positions[leader];
            }
            log::warn!(
                "Enemy {} spawns on slot {} which has not spawned yet",
                index,
                leader
            );
            return Vec2::ZERO;
        }

        match content.spawn_points.get(spawn_point as usize) {
            Some(p) => q4_vec(p.x_q4, p.y_q4),
            None => {
                log::warn!("Enemy {} references missing spawn point {}", index, spawn_point);
                Vec2::ZERO
            }
        }
    }

    /// Apply last tick's damage and walk each live instance along its path
    pub fn move_instances(
        &mut self,
        content: &Content,
        defs: &[EnemyInstanceDef],
        wave_time: f32,
        dt: f32,
        player_grid_x: u8,
        damage: &[u16],
    ) {
        let count = self.slots.count().min(defs.len());
        for index in 0..count {
            if !self.slots.live.test(index) {
                continue;
            }
            self.slots.reset.clear(index);

            let def = &defs[index];
            let Some(enemy) = content.enemy_types.get(def.enemy_type as usize) else {
                continue;
            };

            let taken = damage.get(index).copied().unwrap_or(0);
            if taken > enemy.health {
                log::debug!("Enemy {} destroyed ({} > {})", index, taken, enemy.health);
                self.slots.kill(index);
                self.kills += 1;
                continue;
            }

            let path_index = PathSelector::decode(def.path).resolve(player_grid_x);
            let Some(path) = content.way_point_paths.get(path_index) else {
                log::warn!("Enemy {} selects missing way-point path {}", index, path_index);
                continue;
            };
            if path.count == 0 {
                continue;
            }

            let instance_time = wave_time - q4(def.start_time_q4);
            let time_out = q4(path.time_out_q4);
            let mut budget = q4(enemy.movement_speed_q4) * dt;

            for _ in 0..MAX_WAY_POINT_STEPS {
                let step = self.way_point_index[index].min(path.count - 1);
                let Some(way_point) = content.way_points.get(path.start as usize + step as usize)
                else {
                    break;
                };
                let target = q4_vec(way_point.x_q4, way_point.y_q4);
                let distance = (target - self.positions[index]).length();
                let (next, _) = move_toward(self.positions[index], target, budget);
                self.positions[index] = next;

                if distance > budget {
                    break;
                }
                budget -= distance;

                let end_of_path = step + 1 >= path.count;
                if end_of_path {
                    if instance_time > time_out {
                        log::debug!("Enemy {} timed out at end of path", index);
                        self.slots.kill(index);
                        self.escapes += 1;
                    }
                    break;
                }
                self.way_point_index[index] = step + 1;
            }
        }
    }
}

impl Default for EnemyInstances {
    fn default() -> Self {
        Self::new()
    }
}
