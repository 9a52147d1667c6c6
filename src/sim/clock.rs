//! Level and wave clocks plus the global game flags
//!
//! Both clocks are edge-triggered: the tick that restarts a clock raises its
//! `reset_edge`, which downstream pools observe to clear wave-scoped state.
//! The edge drops on the following tick.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_WAVES_PER_LEVEL;

/// Global state bits carried between ticks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameFlags(u32);

impl GameFlags {
    pub const NONE: Self = Self(0);
    /// Discard all progress and restart from level 0
    pub const RESET: Self = Self(1 << 0);
    /// Simulation runs only while set
    pub const PLAY_ENABLED: Self = Self(1 << 1);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Pause key: restart after death, otherwise toggle play
    pub fn toggle_play(&mut self, hero_alive: bool) {
        if hero_alive {
            self.0 ^= Self::PLAY_ENABLED.0;
        } else {
            self.insert(Self::RESET | Self::PLAY_ENABLED);
        }
    }
}

impl std::ops::BitOr for GameFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Flattened content scope: `(level << 2) + wave`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WaveKey(pub u8);

impl WaveKey {
    pub fn new(level: u8, wave: u8) -> Self {
        Self(level.wrapping_shl(2).wrapping_add(wave))
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelClock {
    pub index: u8,
    pub time: f32,
    pub reset_edge: bool,
    /// No further level exists; the clock keeps running but stops advancing
    pub campaign_complete: bool,
}

impl LevelClock {
    /// Advance level time; move to the next level once every wave of the
    /// current one has been cleared. `next_level_exists` is consulted only then.
    pub fn update(
        &mut self,
        flags: GameFlags,
        dt: f32,
        all_waves_complete: bool,
        next_level_exists: impl FnOnce(u8) -> bool,
    ) {
        if flags.contains(GameFlags::RESET) {
            self.index = 0;
            self.time = 0.0;
            self.reset_edge = true;
            self.campaign_complete = false;
            return;
        }

        self.time += dt;
        self.reset_edge = false;

        if !all_waves_complete || self.campaign_complete {
            return;
        }

        let next = self.index.saturating_add(1);
        if !next_level_exists(next) {
            log::info!("Campaign complete after level {}", self.index);
            self.campaign_complete = true;
            return;
        }

        log::info!("Level {} complete, starting level {}", self.index, next);
        self.index = next;
        self.time = 0.0;
        self.reset_edge = true;
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaveClock {
    pub index: u8,
    pub time: f32,
    pub reset_edge: bool,
}

impl WaveClock {
    /// Advance wave time; move to the next wave once the current one has
    /// spawned everything and nothing is left alive. A level edge restarts
    /// at wave 0.
    pub fn update(
        &mut self,
        flags: GameFlags,
        dt: f32,
        level_edge: bool,
        spawned_all: bool,
        any_live: bool,
    ) {
        if flags.contains(GameFlags::RESET) || level_edge {
            self.index = 0;
            self.time = 0.0;
            self.reset_edge = true;
            return;
        }

        self.time += dt;
        self.reset_edge = false;

        if !spawned_all || any_live || self.index >= MAX_WAVES_PER_LEVEL {
            return;
        }

        log::info!("Wave {} cleared", self.index);
        self.index += 1;
        self.time = 0.0;
        self.reset_edge = true;
    }
}
