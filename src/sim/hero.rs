//! Hero instance manager
//!
//! A single slot that follows the cursor, clamped to the play area. It
//! spawns on reset and dies once its accumulated damage exceeds its health.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::pool::PoolSlots;
use crate::clamp_to_play_area;
use crate::consts::HERO_CAPACITY;
use crate::content::Content;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroInstances {
    pub slots: PoolSlots,
    pub positions: Vec<Vec2>,
    pub types: Vec<u8>,
    /// Level-clock start times; the hero always fires from level time 0
    pub start_times: Vec<f32>,
    pub deaths: u32,
}

impl HeroInstances {
    pub fn new() -> Self {
        Self {
            slots: PoolSlots::new(HERO_CAPACITY),
            positions: vec![Vec2::ZERO; HERO_CAPACITY],
            types: vec![0; HERO_CAPACITY],
            start_times: vec![0.0; HERO_CAPACITY],
            deaths: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.slots.is_live(0)
    }

    pub fn update(&mut self, content: &Content, reset: bool, cursor: Vec2, damage: &[u16]) {
        if reset {
            self.slots.clear();
            self.slots.set_count(1);
            self.positions[0] = clamp_to_play_area(cursor);
            self.slots.spawn(0);
            return;
        }

        if !self.slots.live.test(0) {
            return;
        }
        self.slots.reset.clear(0);

        let health = content
            .hero_types
            .get(self.types[0] as usize)
            .map_or(0, |hero| hero.health);
        let taken = damage.first().copied().unwrap_or(0);
        if taken > health {
            log::info!("Hero destroyed ({} > {})", taken, health);
            self.slots.kill(0);
            self.deaths += 1;
            return;
        }

        self.positions[0] = clamp_to_play_area(cursor);
    }
}

impl Default for HeroInstances {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::content::{ContentBuilder, HeroType};

    fn content() -> Content {
        ContentBuilder::new()
            .hero_type(HeroType {
                health: 50,
                ..HeroType::default()
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_spawns_on_reset_with_pulse() {
        let content = content();
        let mut hero = HeroInstances::new();
        assert!(!hero.is_alive());

        hero.update(&content, true, Vec2::new(1.0, 2.0), &[]);
        assert!(hero.is_alive());
        assert!(hero.slots.reset.test(0));
        assert_eq!(hero.positions[0], Vec2::new(1.0, 2.0));

        hero.update(&content, false, Vec2::new(1.5, 2.0), &[0]);
        assert!(!hero.slots.reset.test(0));
        assert_eq!(hero.positions[0], Vec2::new(1.5, 2.0));
    }

    #[test]
    fn test_follows_cursor_clamped() {
        let content = content();
        let mut hero = HeroInstances::new();
        hero.update(&content, true, Vec2::ZERO, &[]);
        hero.update(&content, false, Vec2::new(100.0, -100.0), &[]);
        assert_eq!(
            hero.positions[0],
            Vec2::new(PLAY_AREA_HALF_WIDTH, -PLAY_AREA_HALF_HEIGHT)
        );
    }

    #[test]
    fn test_dies_when_damage_exceeds_health() {
        let content = content();
        let mut hero = HeroInstances::new();
        hero.update(&content, true, Vec2::ZERO, &[]);
        hero.update(&content, false, Vec2::ONE, &[50]);
        assert!(hero.is_alive());
        hero.update(&content, false, Vec2::ONE, &[51]);
        assert!(!hero.is_alive());
        assert_eq!(hero.deaths, 1);

        // Stays dead until the next reset
        hero.update(&content, false, Vec2::ZERO, &[0]);
        assert!(!hero.is_alive());
        hero.update(&content, true, Vec2::ZERO, &[]);
        assert!(hero.is_alive());
    }
}
