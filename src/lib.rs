//! Waveshot - A wave-based arcade shooter simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (pools, spawning, movement, collisions)
//! - `content`: Fixed-layout static content tables
//! - `frame`: Draw-facing frame object list
//! - `settings`: Headless runner configuration

pub mod content;
pub mod error;
pub mod frame;
pub mod settings;
pub mod sim;

pub use content::{Content, ContentBuilder};
pub use error::{ContentError, SettingsError};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Play area dimensions (world units, centered on the origin)
    pub const PLAY_AREA_WIDTH: f32 = 9.0;
    pub const PLAY_AREA_HEIGHT: f32 = 16.0;
    pub const PLAY_AREA_HALF_WIDTH: f32 = PLAY_AREA_WIDTH * 0.5;
    pub const PLAY_AREA_HALF_HEIGHT: f32 = PLAY_AREA_HEIGHT * 0.5;

    /// Broad-phase grid: horizontal bands over the play area
    pub const COLLISION_GRID_ROW_COUNT: usize = 16;
    /// Slots per grid row; inserts past this are dropped and counted
    pub const COLLISION_GRID_COL_COUNT: usize = 32;

    /// Enemy slots per wave (wave-relative indexing)
    pub const ENEMY_CAPACITY: usize = 64;
    pub const HERO_CAPACITY: usize = 1;
    pub const ENEMY_BULLET_CAPACITY: usize = 256;
    pub const HERO_BULLET_CAPACITY: usize = 128;
    /// Bullet entries a single source type may own
    pub const MAX_BULLET_ENTRIES_PER_SOURCE: usize = 8;

    /// Damage event ring size per collision pairing
    pub const DAMAGE_EVENT_CAPACITY: usize = 64;
    /// Objects a single frame may hold
    pub const FRAME_OBJECT_CAPACITY: usize = 1024;
    /// Damage contact flashes stay visible this long (level seconds)
    pub const DAMAGE_FLASH_SECONDS: f32 = 0.25;

    /// Way-points an enemy may pass in a single tick
    pub const MAX_WAY_POINT_STEPS: usize = 4;
    pub const MAX_WAVES_PER_LEVEL: u8 = 4;
    /// Spawn point indices at or above this reference another enemy slot
    pub const SELF_REFERENTIAL_SPAWN_BASE: u8 = 64;

    /// Horizontal columns used to pick per-player paths
    pub const PLAYER_GRID_COLUMNS: u8 = 3;

    /// Bullet end positions sit this many play-area extents away
    pub const BULLET_END_DISTANCE_FACTOR: f32 = 5.0;
}

/// Distance used to place a bullet's far-away end position
#[inline]
pub fn bullet_end_distance() -> f32 {
    consts::BULLET_END_DISTANCE_FACTOR * consts::PLAY_AREA_WIDTH.max(consts::PLAY_AREA_HEIGHT)
}

/// True when a circle lies entirely outside the play area rectangle
#[inline]
pub fn circle_outside_play_area(center: Vec2, radius: f32) -> bool {
    use consts::{PLAY_AREA_HALF_HEIGHT, PLAY_AREA_HALF_WIDTH};

    center.x + radius < -PLAY_AREA_HALF_WIDTH
        || center.x - radius > PLAY_AREA_HALF_WIDTH
        || center.y + radius < -PLAY_AREA_HALF_HEIGHT
        || center.y - radius > PLAY_AREA_HALF_HEIGHT
}

/// Clamp a point into the play area
#[inline]
pub fn clamp_to_play_area(p: Vec2) -> Vec2 {
    use consts::{PLAY_AREA_HALF_HEIGHT, PLAY_AREA_HALF_WIDTH};

    Vec2::new(
        p.x.clamp(-PLAY_AREA_HALF_WIDTH, PLAY_AREA_HALF_WIDTH),
        p.y.clamp(-PLAY_AREA_HALF_HEIGHT, PLAY_AREA_HALF_HEIGHT),
    )
}

/// Column of the play area an x coordinate falls in, left column 0
#[inline]
pub fn player_grid_column(x: f32) -> u8 {
    use consts::{PLAY_AREA_HALF_WIDTH, PLAY_AREA_WIDTH, PLAYER_GRID_COLUMNS};

    let t = ((x + PLAY_AREA_HALF_WIDTH) / PLAY_AREA_WIDTH).clamp(0.0, 1.0);
    ((t * PLAYER_GRID_COLUMNS as f32) as u8).min(PLAYER_GRID_COLUMNS - 1)
}
