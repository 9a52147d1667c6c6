//! Bullet spawn pattern engine
//!
//! Bullets are fired by source instances (enemies, the hero). Each source
//! type owns up to [`MAX_BULLET_ENTRIES_PER_SOURCE`] entries; every entry is
//! a cast/loop/burst schedule. The number of shots that should exist is a
//! pure function of the source's age, and a persisted counter per
//! (source slot, entry) records how many were actually fired.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::fixed::{q4, q7_vec};
use super::pool::PoolSlots;
use crate::bullet_end_distance;
use crate::consts::MAX_BULLET_ENTRIES_PER_SOURCE;
use crate::content::SourceBulletEntry;

/// Decoded firing schedule of one entry (seconds)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPattern {
    pub cast: f32,
    pub loop_time: f32,
    pub delay: f32,
    pub quantity: u8,
}

impl SpawnPattern {
    pub fn from_entry(entry: &SourceBulletEntry) -> Self {
        Self {
            cast: q4(entry.cast_q4),
            loop_time: q4(entry.loop_q4),
            delay: q4(entry.delay_q4),
            quantity: entry.quantity,
        }
    }

    /// Shots due for a source that has existed for `instance_time` seconds.
    ///
    /// The first shot of every loop fires at the loop start; later shots of
    /// a burst follow every `delay`. A zero loop interval or quantity never
    /// fires; a zero delay releases the whole burst at once.
    pub fn expected_spawn_count(&self, instance_time: f32) -> u32 {
        let since_cast = instance_time - self.cast;
        if since_cast < 0.0 || self.loop_time <= 0.0 || self.quantity == 0 {
            return 0;
        }

        let quantity = self.quantity as u32;
        // Derive the loop count from the remainder so both agree at boundaries
        let within = since_cast % self.loop_time;
        let loops = ((since_cast - within) / self.loop_time).round() as u32;
        let burst = if quantity > 1 {
            let due = if self.delay > 0.0 {
                (within / self.delay).floor() as u32
            } else {
                quantity - 1
            };
            due.min(quantity - 1)
        } else {
            0
        };

        loops.saturating_mul(quantity).saturating_add(burst).saturating_add(1)
    }
}

/// Straight-line flight encoded as a start and a far-away end point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trajectory {
    pub spawn: Vec2,
    pub end: Vec2,
}

impl Trajectory {
    /// Bullet leaves at `source + spawn` heading along `spawn - base`.
    /// A zero-length direction yields a bullet that stays where it spawns.
    pub fn from_entry(entry: &SourceBulletEntry, source: Vec2) -> Self {
        let spawn = q7_vec(entry.spawn_x_q7, entry.spawn_y_q7);
        let base = q7_vec(entry.base_x_q7, entry.base_y_q7);
        let local = spawn - base;
        let length = local.length();

        let spawn_position = source + spawn;
        let end = if length > 0.0 {
            source + local * (bullet_end_distance() / length)
        } else {
            spawn_position
        };

        Self {
            spawn: spawn_position,
            end,
        }
    }
}

/// Read-only view of a pool that fires bullets
#[derive(Debug, Clone, Copy)]
pub struct SourceView<'a> {
    pub slots: &'a PoolSlots,
    pub positions: &'a [Vec2],
    pub types: &'a [u8],
    /// Clock time at which each slot came alive
    pub start_times: &'a [f32],
}

/// Shots fired per (source slot, entry)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpawnCounters {
    counts: Vec<[u32; MAX_BULLET_ENTRIES_PER_SOURCE]>,
}

impl SpawnCounters {
    pub fn new(source_capacity: usize) -> Self {
        Self {
            counts: vec![[0; MAX_BULLET_ENTRIES_PER_SOURCE]; source_capacity],
        }
    }

    pub fn get(&self, source: usize, entry: usize) -> u32 {
        self.counts
            .get(source)
            .and_then(|c| c.get(entry))
            .copied()
            .unwrap_or(0)
    }

    pub fn clear(&mut self) {
        for counts in &mut self.counts {
            *counts = [0; MAX_BULLET_ENTRIES_PER_SOURCE];
        }
    }
}

/// Fire at most one due shot per (live source, entry).
///
/// `entries` maps a source type to its bullet entries; `emit` receives each
/// new shot's trajectory and bullet type.
pub fn fire<'c>(
    sources: SourceView<'_>,
    entries: impl Fn(u8) -> &'c [SourceBulletEntry],
    clock_time: f32,
    counters: &mut SpawnCounters,
    mut emit: impl FnMut(Trajectory, u8),
) {
    for source in sources.slots.live_indices() {
        let Some(counts) = counters.counts.get_mut(source) else {
            continue;
        };
        let instance_time = clock_time - sources.start_times[source];
        let position = sources.positions[source];

        for (entry_index, entry) in entries(sources.types[source])
            .iter()
            .take(MAX_BULLET_ENTRIES_PER_SOURCE)
            .enumerate()
        {
            let expected = SpawnPattern::from_entry(entry).expected_spawn_count(instance_time);
            let actual = &mut counts[entry_index];
            // Shares the domain of `expected`, so a fired shot always counts
            if expected <= *actual {
                continue;
            }
            *actual += 1;
            emit(Trajectory::from_entry(entry, position), entry.bullet_type);
        }
    }
}
