//! Slot bookkeeping shared by every instance pool
//!
//! Pools are struct-of-arrays: a [`PoolSlots`] carries the populated count,
//! the fixed capacity and the liveness/reset bitsets, while the owning pool
//! keeps its per-slot attribute arrays alongside it.

use serde::{Deserialize, Serialize};

use super::bitset::Bitset;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSlots {
    count: u16,
    capacity: u16,
    pub live: Bitset,
    /// Set on (re)spawn, cleared by the owner's move step the next time it runs
    pub reset: Bitset,
}

impl PoolSlots {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.min(u16::MAX as usize);
        Self {
            count: 0,
            capacity: capacity as u16,
            live: Bitset::new(capacity),
            reset: Bitset::new(capacity),
        }
    }

    /// Populated slot count, always clamped to capacity
    #[inline]
    pub fn count(&self) -> usize {
        self.count.min(self.capacity) as usize
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity as usize
    }

    pub fn set_count(&mut self, count: usize) {
        self.count = count.min(self.capacity as usize) as u16;
    }

    #[inline]
    pub fn is_live(&self, index: usize) -> bool {
        index < self.count() && self.live.test(index)
    }

    /// Mark a slot freshly spawned
    pub fn spawn(&mut self, index: usize) {
        self.live.set(index);
        self.reset.set(index);
    }

    pub fn kill(&mut self, index: usize) {
        self.live.clear(index);
    }

    /// Live slot indices within the populated range
    pub fn live_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.live.iter_ones_below(self.count())
    }

    pub fn live_count(&self) -> usize {
        self.live_indices().count()
    }

    /// Forget every slot; used on wave/level transitions and explicit reset
    pub fn clear(&mut self) {
        self.count = 0;
        self.live.clear_all();
        self.reset.clear_all();
    }

    /// `live[i] => i < min(count, capacity)`
    pub fn liveness_in_range(&self) -> bool {
        self.live.iter_ones().all(|i| i < self.count())
    }
}
