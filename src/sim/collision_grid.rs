//! Broad phase: horizontal row buckets over the play area
//!
//! Every live instance is inserted into each row its vertical extent
//! overlaps, so the narrow phase only needs to pair instances that share a
//! row. Row 0 is the top of the play area. The grid is rebuilt from scratch
//! every tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::fixed::{Q4_TO_FLOAT, Q8_TO_FLOAT};
use super::pool::PoolSlots;
use crate::circle_outside_play_area;
use crate::consts::*;
use crate::content::{BulletType, Content};

/// Fixed-point scale of a radius table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RadiusScale {
    Q4,
    Q8,
}

impl RadiusScale {
    pub fn factor(self) -> f32 {
        match self {
            RadiusScale::Q4 => Q4_TO_FLOAT,
            RadiusScale::Q8 => Q8_TO_FLOAT,
        }
    }
}

/// Per-type radius and contact damage of one collidable pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionTypes {
    pub radius_q: Vec<u8>,
    pub scale: RadiusScale,
    pub damage: Vec<u16>,
}

impl CollisionTypes {
    pub fn enemies(content: &Content) -> Self {
        Self {
            radius_q: content.enemy_types.iter().map(|t| t.radius_q4).collect(),
            scale: RadiusScale::Q4,
            damage: content.enemy_types.iter().map(|t| t.damage).collect(),
        }
    }

    pub fn heroes(content: &Content) -> Self {
        Self {
            radius_q: content.hero_types.iter().map(|t| t.radius_q4).collect(),
            scale: RadiusScale::Q4,
            damage: content.hero_types.iter().map(|t| t.damage).collect(),
        }
    }

    pub fn bullets(types: &[BulletType]) -> Self {
        Self {
            radius_q: types.iter().map(|t| t.radius_q8).collect(),
            scale: RadiusScale::Q8,
            damage: types.iter().map(|t| t.damage).collect(),
        }
    }

    #[inline]
    pub fn radius(&self, type_index: u8) -> f32 {
        self.radius_q
            .get(type_index as usize)
            .map_or(0.0, |&r| r as f32 * self.scale.factor())
    }

    #[inline]
    pub fn damage(&self, type_index: u8) -> u16 {
        self.damage.get(type_index as usize).copied().unwrap_or(0)
    }
}

/// Read-only view of a collidable pool
#[derive(Debug, Clone, Copy)]
pub struct CollisionSource<'a> {
    pub slots: &'a PoolSlots,
    pub positions: &'a [Vec2],
    pub types: &'a [u8],
    pub table: &'a CollisionTypes,
}

impl CollisionSource<'_> {
    #[inline]
    pub fn position(&self, index: usize) -> Vec2 {
        self.positions[index]
    }

    #[inline]
    pub fn radius(&self, index: usize) -> f32 {
        self.table.radius(self.types[index])
    }

    #[inline]
    pub fn damage(&self, index: usize) -> u16 {
        self.table.damage(self.types[index])
    }
}

/// Vertical bucket of a y coordinate, bottom bucket 0
#[inline]
pub fn row_bucket(y: f32) -> usize {
    let bucket = ((0.5 + y / PLAY_AREA_HEIGHT) * COLLISION_GRID_ROW_COUNT as f32).floor();
    bucket.clamp(0.0, (COLLISION_GRID_ROW_COUNT - 1) as f32) as usize
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionGrid {
    row_counts: [u8; COLLISION_GRID_ROW_COUNT],
    rows: Vec<u16>,
    /// Inserts dropped by the last rebuild because a row was full
    pub overflow_count: u32,
    pub total_overflow: u64,
}

impl CollisionGrid {
    pub fn new() -> Self {
        Self {
            row_counts: [0; COLLISION_GRID_ROW_COUNT],
            rows: vec![0; COLLISION_GRID_ROW_COUNT * COLLISION_GRID_COL_COUNT],
            overflow_count: 0,
            total_overflow: 0,
        }
    }

    /// Slot indices bucketed into a row, in insertion order
    pub fn row(&self, row: usize) -> &[u16] {
        let count = self.row_counts[row] as usize;
        let start = row * COLLISION_GRID_COL_COUNT;
        &self.rows[start..start + count]
    }

    pub fn clear(&mut self) {
        self.row_counts = [0; COLLISION_GRID_ROW_COUNT];
        self.overflow_count = 0;
    }

    pub fn rebuild(&mut self, source: &CollisionSource<'_>) {
        self.clear();

        for index in source.slots.live_indices() {
            let position = source.position(index);
            let radius = source.radius(index);
            if circle_outside_play_area(position, radius) {
                continue;
            }

            let top = row_bucket(position.y + radius);
            let bottom = row_bucket(position.y - radius);
            for bucket in (bottom..=top).rev() {
                self.insert(COLLISION_GRID_ROW_COUNT - 1 - bucket, index as u16);
            }
        }

        if self.overflow_count > 0 {
            self.total_overflow += self.overflow_count as u64;
            log::warn!(
                "Collision grid dropped {} row inserts (row capacity {})",
                self.overflow_count,
                COLLISION_GRID_COL_COUNT
            );
        }
    }

    fn insert(&mut self, row: usize, index: u16) {
        let count = self.row_counts[row] as usize;
        if count >= COLLISION_GRID_COL_COUNT {
            self.overflow_count += 1;
            return;
        }
        self.rows[row * COLLISION_GRID_COL_COUNT + count] = index;
        self.row_counts[row] += 1;
    }
}

impl Default for CollisionGrid {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::fixed::to_q8_u8;

    fn table(radius: f32) -> CollisionTypes {
        CollisionTypes {
            radius_q: vec![to_q8_u8(radius)],
            scale: RadiusScale::Q8,
            damage: vec![1],
        }
    }

    fn rows_containing(grid: &CollisionGrid, index: u16) -> Vec<usize> {
        (0..COLLISION_GRID_ROW_COUNT)
            .filter(|&r| grid.row(r).contains(&index))
            .collect()
    }

    #[test]
    fn test_row_bucket_mapping() {
        assert_eq!(row_bucket(-PLAY_AREA_HALF_HEIGHT), 0);
        assert_eq!(row_bucket(PLAY_AREA_HALF_HEIGHT), COLLISION_GRID_ROW_COUNT - 1);
        assert_eq!(row_bucket(0.1), 8);
        assert_eq!(row_bucket(-0.1), 7);
        assert_eq!(row_bucket(-100.0), 0);
    }

    #[test]
    fn test_instance_spans_rows_top_down() {
        let mut slots = PoolSlots::new(2);
        slots.set_count(2);
        slots.spawn(0);
        slots.spawn(1);
        // Each row is one unit tall; straddle the y = 0 boundary
        let positions = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 7.5)];
        let types = [0u8; 2];
        let table = table(0.25);
        let source = CollisionSource {
            slots: &slots,
            positions: &positions,
            types: &types,
            table: &table,
        };

        let mut grid = CollisionGrid::new();
        grid.rebuild(&source);
        assert_eq!(rows_containing(&grid, 0), vec![7, 8]);
        assert_eq!(rows_containing(&grid, 1), vec![0]);
        assert_eq!(grid.overflow_count, 0);
    }

    #[test]
    fn test_skips_dead_and_offscreen() {
        let mut slots = PoolSlots::new(3);
        slots.set_count(3);
        slots.spawn(0);
        slots.spawn(2);
        let positions = [
            Vec2::new(0.0, 20.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(-PLAY_AREA_HALF_WIDTH - 1.0, 0.0),
        ];
        let types = [0u8; 3];
        let table = table(0.25);
        let source = CollisionSource {
            slots: &slots,
            positions: &positions,
            types: &types,
            table: &table,
        };

        let mut grid = CollisionGrid::new();
        grid.rebuild(&source);
        assert!((0..COLLISION_GRID_ROW_COUNT).all(|r| grid.row(r).is_empty()));
    }

    #[test]
    fn test_row_overflow_is_counted_not_written() {
        let n = COLLISION_GRID_COL_COUNT + 3;
        let mut slots = PoolSlots::new(n);
        slots.set_count(n);
        for i in 0..n {
            slots.spawn(i);
        }
        let positions = vec![Vec2::new(0.0, 0.5); n];
        let types = vec![0u8; n];
        let table = table(0.1);
        let source = CollisionSource {
            slots: &slots,
            positions: &positions,
            types: &types,
            table: &table,
        };

        let mut grid = CollisionGrid::new();
        grid.rebuild(&source);
        assert_eq!(grid.row(7).len(), COLLISION_GRID_COL_COUNT);
        assert_eq!(grid.overflow_count, 3);
        assert_eq!(grid.total_overflow, 3);
        // Neighbouring rows untouched
        assert!(grid.row(6).is_empty());
        assert!(grid.row(8).is_empty());

        grid.rebuild(&source);
        assert_eq!(grid.overflow_count, 3);
        assert_eq!(grid.total_overflow, 6);
    }
}
