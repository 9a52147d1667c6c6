//! Simulation context
//!
//! Every pool, grid and clock the tick mutates lives in [`GameState`], which
//! is passed explicitly to each step. Pools are sized once from `consts` and
//! only their contents change afterwards.

use serde::{Deserialize, Serialize};

use super::bullet_source::SourceView;
use super::bullets::{BulletKind, BulletPool};
use super::clock::{LevelClock, WaveClock, WaveKey};
use super::collision_damage::CollisionDamage;
use super::collision_grid::{CollisionGrid, CollisionSource, CollisionTypes};
use super::enemies::EnemyInstances;
use super::hero::HeroInstances;
use crate::consts::*;
use crate::content::Content;

impl EnemyInstances {
    pub fn bullet_sources(&self) -> SourceView<'_> {
        SourceView {
            slots: &self.slots,
            positions: &self.positions,
            types: &self.types,
            start_times: &self.start_times,
        }
    }

    pub fn collision_source<'a>(&'a self, table: &'a CollisionTypes) -> CollisionSource<'a> {
        CollisionSource {
            slots: &self.slots,
            positions: &self.positions,
            types: &self.types,
            table,
        }
    }
}

impl HeroInstances {
    pub fn bullet_sources(&self) -> SourceView<'_> {
        SourceView {
            slots: &self.slots,
            positions: &self.positions,
            types: &self.types,
            start_times: &self.start_times,
        }
    }

    pub fn collision_source<'a>(&'a self, table: &'a CollisionTypes) -> CollisionSource<'a> {
        CollisionSource {
            slots: &self.slots,
            positions: &self.positions,
            types: &self.types,
            table,
        }
    }
}

impl BulletPool {
    pub fn collision_source<'a>(&'a self, table: &'a CollisionTypes) -> CollisionSource<'a> {
        CollisionSource {
            slots: &self.slots,
            positions: &self.positions,
            types: &self.types,
            table,
        }
    }
}

/// Radius and contact damage per type for each collidable pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionTables {
    pub enemies: CollisionTypes,
    pub heroes: CollisionTypes,
    pub enemy_bullets: CollisionTypes,
    pub hero_bullets: CollisionTypes,
}

impl CollisionTables {
    pub fn new(content: &Content) -> Self {
        Self {
            enemies: CollisionTypes::enemies(content),
            heroes: CollisionTypes::heroes(content),
            enemy_bullets: CollisionTypes::bullets(&content.enemy_bullet_types),
            hero_bullets: CollisionTypes::bullets(&content.hero_bullet_types),
        }
    }
}

/// One broad-phase grid per collidable pool
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollisionGrids {
    pub hero_bullets: CollisionGrid,
    pub enemy_bullets: CollisionGrid,
    pub heroes: CollisionGrid,
    pub enemies: CollisionGrid,
}

/// Complete simulation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub level: LevelClock,
    pub wave: WaveClock,
    pub enemies: EnemyInstances,
    pub hero: HeroInstances,
    pub enemy_bullets: BulletPool,
    pub hero_bullets: BulletPool,
    pub tables: CollisionTables,
    pub grids: CollisionGrids,
    /// A = enemies, B = hero bullets
    pub enemies_vs_hero_bullets: CollisionDamage,
    /// A = hero, B = enemy bullets
    pub hero_vs_enemy_bullets: CollisionDamage,
    /// Ticks run while play was enabled
    pub tick_count: u64,
    pub play_time: f64,
}

impl GameState {
    pub fn new(content: &Content) -> Self {
        Self {
            level: LevelClock::default(),
            wave: WaveClock::default(),
            enemies: EnemyInstances::new(),
            hero: HeroInstances::new(),
            enemy_bullets: BulletPool::new(BulletKind::Enemy, ENEMY_BULLET_CAPACITY, ENEMY_CAPACITY),
            hero_bullets: BulletPool::new(BulletKind::Hero, HERO_BULLET_CAPACITY, HERO_CAPACITY),
            tables: CollisionTables::new(content),
            grids: CollisionGrids::default(),
            enemies_vs_hero_bullets: CollisionDamage::new(ENEMY_CAPACITY, HERO_BULLET_CAPACITY),
            hero_vs_enemy_bullets: CollisionDamage::new(HERO_CAPACITY, ENEMY_BULLET_CAPACITY),
            tick_count: 0,
            play_time: 0.0,
        }
    }

    /// Content scope of the current wave
    pub fn wave_key(&self) -> WaveKey {
        WaveKey::new(self.level.index, self.wave.index)
    }

    /// Drop all accumulated damage and contact history
    pub fn clear_damage(&mut self) {
        self.enemies_vs_hero_bullets.clear();
        self.hero_vs_enemy_bullets.clear();
    }

    /// Every pool keeps `live[i] => i < min(count, capacity)`
    pub fn liveness_in_range(&self) -> bool {
        self.enemies.slots.liveness_in_range()
            && self.hero.slots.liveness_in_range()
            && self.enemy_bullets.slots.liveness_in_range()
            && self.hero_bullets.slots.liveness_in_range()
    }

    /// Rebuild the four broad-phase grids from the settled pools
    pub fn rebuild_grids(&mut self) {
        let tables = &self.tables;
        self.grids
            .hero_bullets
            .rebuild(&self.hero_bullets.collision_source(&tables.hero_bullets));
        self.grids
            .enemy_bullets
            .rebuild(&self.enemy_bullets.collision_source(&tables.enemy_bullets));
        self.grids
            .heroes
            .rebuild(&self.hero.collision_source(&tables.heroes));
        self.grids
            .enemies
            .rebuild(&self.enemies.collision_source(&tables.enemies));
    }

    /// Exchange damage for both opposing pairings, stamped with level time
    pub fn resolve_damage(&mut self) {
        let time = self.level.time;
        let tables = &self.tables;
        let grids = &self.grids;

        self.enemies_vs_hero_bullets.resolve(
            &grids.enemies,
            &self.enemies.collision_source(&tables.enemies),
            &grids.hero_bullets,
            &self.hero_bullets.collision_source(&tables.hero_bullets),
            time,
        );
        self.hero_vs_enemy_bullets.resolve(
            &grids.heroes,
            &self.hero.collision_source(&tables.heroes),
            &grids.enemy_bullets,
            &self.enemy_bullets.collision_source(&tables.enemy_bullets),
            time,
        );
    }
}
