//! Bullet pools
//!
//! Each pool is a ring buffer: the write cursor counts every bullet spawned
//! in the current scope and the slot is `cursor % capacity`, so once the
//! pool is full the oldest slot is overwritten. Liveness is tracked per slot
//! so culled bullets leave holes instead of compacting.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bullet_source::{SourceView, SpawnCounters, Trajectory, fire};
use super::fixed::{move_toward, q4, q8};
use super::pool::PoolSlots;
use crate::circle_outside_play_area;
use crate::content::{BulletType, Content, SourceBulletEntry};

/// Which side fired the pool's bullets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletKind {
    Enemy,
    Hero,
}

impl BulletKind {
    pub fn bullet_types(self, content: &Content) -> &[BulletType] {
        match self {
            BulletKind::Enemy => &content.enemy_bullet_types,
            BulletKind::Hero => &content.hero_bullet_types,
        }
    }

    pub fn entries(self, content: &Content, source_type: u8) -> &[SourceBulletEntry] {
        match self {
            BulletKind::Enemy => content.enemy_bullets(source_type as usize),
            BulletKind::Hero => content.hero_bullets(source_type as usize),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletPool {
    pub kind: BulletKind,
    pub slots: PoolSlots,
    /// Bullets spawned since the last scope reset; the ring write cursor
    pub spawned: u32,
    pub positions: Vec<Vec2>,
    pub end_positions: Vec<Vec2>,
    pub types: Vec<u8>,
    pub counters: SpawnCounters,
    /// Scope key the pool was last reset for
    pub key: Option<u8>,
    pub culled: u32,
    pub destroyed: u32,
}

impl BulletPool {
    pub fn new(kind: BulletKind, capacity: usize, source_capacity: usize) -> Self {
        Self {
            kind,
            slots: PoolSlots::new(capacity),
            spawned: 0,
            positions: vec![Vec2::ZERO; capacity],
            end_positions: vec![Vec2::ZERO; capacity],
            types: vec![0; capacity],
            counters: SpawnCounters::new(source_capacity),
            key: None,
            culled: 0,
            destroyed: 0,
        }
    }

    /// Run one tick: reset on a new scope, move, then fire.
    ///
    /// `clock_time` is the clock the sources' start times are measured on;
    /// `damage` is per-slot damage from the previous collision pass.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        content: &Content,
        scope_key: u8,
        reset: bool,
        clock_time: f32,
        dt: f32,
        sources: SourceView<'_>,
        damage: &[u16],
    ) {
        if reset || self.key != Some(scope_key) {
            self.reset_scope();
            self.key = Some(scope_key);
        }
        self.move_bullets(content, dt, damage);
        self.spawn(content, sources, clock_time);
    }

    /// Discard every in-flight bullet and spawn counter
    pub fn reset_scope(&mut self) {
        self.slots.clear();
        self.counters.clear();
        self.spawned = 0;
    }

    /// Ring slot the next spawned bullet will occupy
    #[inline]
    pub fn next_index(&self) -> usize {
        match self.slots.capacity() {
            0 => 0,
            capacity => self.spawned as usize % capacity,
        }
    }

    /// Write a bullet at the cursor, overwriting the oldest slot when full
    pub fn push(&mut self, trajectory: Trajectory, bullet_type: u8) -> Option<usize> {
        let capacity = self.slots.capacity();
        if capacity == 0 {
            return None;
        }
        let index = self.next_index();
        // Dead while its attributes are rewritten, live again afterwards
        self.slots.kill(index);
        self.positions[index] = trajectory.spawn;
        self.end_positions[index] = trajectory.end;
        self.types[index] = bullet_type;
        self.spawned = self.spawned.wrapping_add(1);
        self.slots.set_count((self.spawned as usize).min(capacity));
        self.slots.spawn(index);
        Some(index)
    }

    pub fn spawn(&mut self, content: &Content, sources: SourceView<'_>, clock_time: f32) {
        let kind = self.kind;
        let mut counters = std::mem::take(&mut self.counters);
        fire(
            sources,
            |source_type| kind.entries(content, source_type),
            clock_time,
            &mut counters,
            |trajectory, bullet_type| {
                self.push(trajectory, bullet_type);
            },
        );
        self.counters = counters;
    }

    /// Cull off-screen and destroyed bullets, advance the rest toward their end
    pub fn move_bullets(&mut self, content: &Content, dt: f32, damage: &[u16]) {
        let types = self.kind.bullet_types(content);
        for index in 0..self.slots.count() {
            if !self.slots.live.test(index) {
                continue;
            }
            self.slots.reset.clear(index);

            let Some(bullet) = types.get(self.types[index] as usize) else {
                self.slots.kill(index);
                continue;
            };
            let radius = q8(bullet.radius_q8);

            if circle_outside_play_area(self.positions[index], radius) {
                self.slots.kill(index);
                self.culled += 1;
                continue;
            }

            if damage.get(index).copied().unwrap_or(0) > bullet.health {
                self.slots.kill(index);
                self.destroyed += 1;
                continue;
            }

            let (next, _) = move_toward(
                self.positions[index],
                self.end_positions[index],
                q4(bullet.movement_speed_q4) * dt,
            );
            self.positions[index] = next;

            if circle_outside_play_area(next, radius) {
                self.slots.kill(index);
                self.culled += 1;
            }
        }
    }
}
