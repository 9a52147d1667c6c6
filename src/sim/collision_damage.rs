//! Narrow phase: turns overlapping pairs into damage
//!
//! Pairs are only tested when they share a grid row. An instance sits in
//! every row its extent covers, so two instances may meet in several
//! consecutive rows. Each side keeps a processed set for the current and the
//! previous row.
//!
//! Tie-break: a pair is tested, and emitted if it overlaps, in the first
//! (lowest) row the two share. In any later row where both were also present
//! in the row before, the pair is skipped. Emission therefore happens on the
//! first shared row, not on the second encounter, and every overlapping pair
//! yields exactly one event per tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bitset::Bitset;
use super::collision::circle_contact;
use super::collision_grid::{CollisionGrid, CollisionSource};
use crate::consts::{COLLISION_GRID_ROW_COUNT, DAMAGE_EVENT_CAPACITY};

/// One detected contact between an A and a B instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageEvent {
    pub a_position: Vec2,
    pub b_position: Vec2,
    /// Damage dealt to A (B's contact damage)
    pub a_value: u16,
    /// Damage dealt to B (A's contact damage)
    pub b_value: u16,
    /// Level time of the contact
    pub time: f32,
    pub a_index: u16,
    pub b_index: u16,
}

/// Damage accumulated by one side of a pairing, indexed by slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamageSide {
    pub damage: Vec<u16>,
    processed: [Bitset; 2],
}

impl DamageSide {
    fn new(capacity: usize) -> Self {
        Self {
            damage: vec![0; capacity],
            processed: [Bitset::new(capacity), Bitset::new(capacity)],
        }
    }

    /// Zero the accumulator of every slot that respawned this tick
    fn zero_respawned(&mut self, source: &CollisionSource<'_>) {
        for index in source.slots.reset.iter_ones() {
            if let Some(damage) = self.damage.get_mut(index) {
                *damage = 0;
            }
        }
    }

    fn begin_row(&mut self, row: &[u16]) {
        self.processed.swap(0, 1);
        let current = &mut self.processed[1];
        current.clear_all();
        for &index in row {
            current.set(index as usize);
        }
    }

    #[inline]
    fn in_previous_row(&self, index: usize) -> bool {
        self.processed[0].test(index)
    }

    fn clear(&mut self) {
        self.damage.fill(0);
        self.processed[0].clear_all();
        self.processed[1].clear_all();
    }
}

/// Damage exchange between two opposing pools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionDamage {
    pub a: DamageSide,
    pub b: DamageSide,
    events: Vec<DamageEvent>,
    /// Events written since the last clear; ring write cursor
    pub event_count: u32,
    pub events_last_tick: u32,
}

impl CollisionDamage {
    pub fn new(a_capacity: usize, b_capacity: usize) -> Self {
        Self {
            a: DamageSide::new(a_capacity),
            b: DamageSide::new(b_capacity),
            events: vec![DamageEvent::default(); DAMAGE_EVENT_CAPACITY],
            event_count: 0,
            events_last_tick: 0,
        }
    }

    /// Forget all accumulated damage and events
    pub fn clear(&mut self) {
        self.a.clear();
        self.b.clear();
        self.event_count = 0;
        self.events_last_tick = 0;
    }

    /// Events still held by the ring, oldest first
    pub fn events(&self) -> impl Iterator<Item = &DamageEvent> {
        let held = (self.event_count as usize).min(DAMAGE_EVENT_CAPACITY);
        let start = self.event_count as usize - held;
        (start..self.event_count as usize).map(move |i| &self.events[i % DAMAGE_EVENT_CAPACITY])
    }

    pub fn resolve(
        &mut self,
        a_grid: &CollisionGrid,
        a: &CollisionSource<'_>,
        b_grid: &CollisionGrid,
        b: &CollisionSource<'_>,
        time: f32,
    ) {
        self.a.zero_respawned(a);
        self.b.zero_respawned(b);
        self.a.processed[1].clear_all();
        self.b.processed[1].clear_all();
        self.events_last_tick = 0;

        for row in 0..COLLISION_GRID_ROW_COUNT {
            let a_row = a_grid.row(row);
            let b_row = b_grid.row(row);
            self.a.begin_row(a_row);
            self.b.begin_row(b_row);
            if a_row.is_empty() || b_row.is_empty() {
                continue;
            }

            for &a_index in a_row {
                let a_index = a_index as usize;
                let a_pos = a.position(a_index);
                let a_radius = a.radius(a_index);

                for &b_index in b_row {
                    let b_index = b_index as usize;
                    if self.a.in_previous_row(a_index) && self.b.in_previous_row(b_index) {
                        continue;
                    }
                    let Some(contact) =
                        circle_contact(a_pos, a_radius, b.position(b_index), b.radius(b_index))
                    else {
                        continue;
                    };

                    let a_value = b.damage(b_index);
                    let b_value = a.damage(a_index);
                    self.push_event(DamageEvent {
                        a_position: contact.a_point,
                        b_position: contact.b_point,
                        a_value,
                        b_value,
                        time,
                        a_index: a_index as u16,
                        b_index: b_index as u16,
                    });
                    if let Some(d) = self.a.damage.get_mut(a_index) {
                        *d = d.saturating_add(a_value);
                    }
                    if let Some(d) = self.b.damage.get_mut(b_index) {
                        *d = d.saturating_add(b_value);
                    }
                }
            }
        }
    }

    fn push_event(&mut self, event: DamageEvent) {
        self.events[self.event_count as usize % DAMAGE_EVENT_CAPACITY] = event;
        self.event_count = self.event_count.wrapping_add(1);
        self.events_last_tick += 1;
    }
}
