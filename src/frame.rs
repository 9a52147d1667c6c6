//! Draw-facing frame objects
//!
//! The simulation never renders. After a tick, [`build_frame`] flattens the
//! visible state into a list of `(position, scale, material)` records that a
//! renderer can upload as-is.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::circle_outside_play_area;
use crate::consts::{DAMAGE_FLASH_SECONDS, FRAME_OBJECT_CAPACITY};
use crate::content::Content;
use crate::sim::bullets::BulletPool;
use crate::sim::collision_damage::CollisionDamage;
use crate::sim::fixed::{q4, q8};
use crate::sim::state::GameState;

/// Scale of a damage contact flash
pub const DAMAGE_FLASH_SCALE: f32 = 0.1;

/// What a frame object depicts
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Material {
    Enemy = 0,
    Hero = 1,
    EnemyBullet = 2,
    HeroBullet = 3,
    /// Contact point on the A side of a pairing
    DamageA = 4,
    /// Contact point on the B side of a pairing
    DamageB = 5,
}

impl Material {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Material::Enemy),
            1 => Some(Material::Hero),
            2 => Some(Material::EnemyBullet),
            3 => Some(Material::HeroBullet),
            4 => Some(Material::DamageA),
            5 => Some(Material::DamageB),
            _ => None,
        }
    }
}

/// One drawable: a circle centered at `position`
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct FrameObject {
    pub position: [f32; 2],
    pub scale: f32,
    pub material: u32,
}

impl FrameObject {
    pub const fn new(x: f32, y: f32, scale: f32, material: Material) -> Self {
        Self {
            position: [x, y],
            scale,
            material: material as u32,
        }
    }

    pub fn material(&self) -> Option<Material> {
        Material::from_u32(self.material)
    }
}

/// Frame objects for one tick, capped at `FRAME_OBJECT_CAPACITY`
#[derive(Debug, Clone)]
pub struct FrameObjects {
    objects: Vec<FrameObject>,
    /// Objects rejected because the frame was full
    pub dropped: u32,
}

impl FrameObjects {
    pub fn new() -> Self {
        Self {
            objects: Vec::with_capacity(FRAME_OBJECT_CAPACITY),
            dropped: 0,
        }
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.dropped = 0;
    }

    pub fn push(&mut self, position: Vec2, scale: f32, material: Material) {
        if self.objects.len() >= FRAME_OBJECT_CAPACITY {
            self.dropped += 1;
            return;
        }
        self.objects
            .push(FrameObject::new(position.x, position.y, scale, material));
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn as_slice(&self) -> &[FrameObject] {
        &self.objects
    }

    /// Raw bytes for a GPU upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.objects)
    }

    pub fn count_of(&self, material: Material) -> usize {
        self.objects
            .iter()
            .filter(|o| o.material == material as u32)
            .count()
    }
}

impl Default for FrameObjects {
    fn default() -> Self {
        Self::new()
    }
}

/// Rebuild `frame` from the current state
pub fn build_frame(state: &GameState, content: &Content, frame: &mut FrameObjects) {
    frame.clear();

    let enemies = &state.enemies;
    for index in enemies.slots.live_indices() {
        let radius = content
            .enemy_types
            .get(enemies.types[index] as usize)
            .map_or(0.0, |t| q4(t.radius_q4));
        frame.push(enemies.positions[index], radius * 2.0, Material::Enemy);
    }

    let hero = &state.hero;
    for index in hero.slots.live_indices() {
        let radius = content
            .hero_types
            .get(hero.types[index] as usize)
            .map_or(0.0, |t| q4(t.radius_q4));
        frame.push(hero.positions[index], radius, Material::Hero);
    }

    push_bullets(frame, content, &state.enemy_bullets, Material::EnemyBullet);
    push_bullets(frame, content, &state.hero_bullets, Material::HeroBullet);

    let now = state.level.time;
    push_flashes(frame, &state.enemies_vs_hero_bullets, now);
    push_flashes(frame, &state.hero_vs_enemy_bullets, now);
}

fn push_bullets(frame: &mut FrameObjects, content: &Content, pool: &BulletPool, material: Material) {
    let types = pool.kind.bullet_types(content);
    for index in pool.slots.live_indices() {
        let position = pool.positions[index];
        let radius = types
            .get(pool.types[index] as usize)
            .map_or(0.0, |t| q8(t.radius_q8));
        if circle_outside_play_area(position, radius) {
            continue;
        }
        frame.push(position, radius, material);
    }
}

fn push_flashes(frame: &mut FrameObjects, damage: &CollisionDamage, now: f32) {
    for event in damage.events() {
        let age = now - event.time;
        if !(0.0..DAMAGE_FLASH_SECONDS).contains(&age) {
            continue;
        }
        frame.push(event.a_position, DAMAGE_FLASH_SCALE, Material::DamageA);
        frame.push(event.b_position, DAMAGE_FLASH_SCALE, Material::DamageB);
    }
}
