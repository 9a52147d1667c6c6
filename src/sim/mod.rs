//! Deterministic simulation module
//!
//! All gameplay logic lives here. Given the same content and the same
//! sequence of tick inputs, the state evolves identically:
//! - Caller-supplied time step only
//! - Fixed-capacity pools, sized once
//! - Stable iteration order (by slot index)
//! - No rendering or platform dependencies

pub mod bitset;
pub mod bullet_source;
pub mod bullets;
pub mod clock;
pub mod collision;
pub mod collision_damage;
pub mod collision_grid;
pub mod enemies;
pub mod fixed;
pub mod hero;
pub mod pool;
pub mod state;
pub mod tick;

pub use bitset::Bitset;
pub use bullet_source::{SpawnPattern, Trajectory};
pub use bullets::{BulletKind, BulletPool};
pub use clock::{GameFlags, LevelClock, WaveClock, WaveKey};
pub use collision::{CircleContact, circle_contact};
pub use collision_damage::{CollisionDamage, DamageEvent};
pub use collision_grid::{CollisionGrid, CollisionTypes, row_bucket};
pub use enemies::{EnemyInstances, PathSelector};
pub use hero::HeroInstances;
pub use pool::PoolSlots;
pub use state::GameState;
pub use tick::{TickInput, tick};
