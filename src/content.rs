//! Static content tables
//!
//! Enemy, hero and bullet types, bullet spawn patterns, spawn points,
//! way-point paths and the level/wave index. Tables are immutable once
//! loaded; the simulation only ever reads them.
//!
//! Every record is a `#[repr(C)]` [`Pod`] struct so the binary form is a
//! straight byte copy of each table. Quantized fields carry their scale in
//! the field name (`_q4`, `_q7`, `_q8`).

use std::path::Path;

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ContentError;
use crate::sim::enemies::PathSelector;
use crate::sim::fixed::{to_q4_i16, to_q4_u8, to_q4_u16, to_q7_i8, to_q8_u8};

pub const CONTENT_MAGIC: [u8; 4] = *b"WSHT";
pub const CONTENT_VERSION: u16 = 1;
const TABLE_COUNT: u16 = 11;
const HEADER_LEN: usize = 8;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable, Serialize, Deserialize)]
pub struct EnemyType {
    pub health: u16,
    pub damage: u16,
    pub movement_speed_q4: u8,
    pub radius_q4: u8,
    /// First entry in the enemy bullet entry table
    pub bullet_start: u8,
    pub bullet_count: u8,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable, Serialize, Deserialize)]
pub struct HeroType {
    pub health: u16,
    pub damage: u16,
    pub radius_q4: u8,
    /// First entry in the hero bullet entry table
    pub bullet_start: u8,
    pub bullet_count: u8,
    #[serde(skip)]
    pub pad: u8,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable, Serialize, Deserialize)]
pub struct BulletType {
    pub health: u16,
    pub damage: u16,
    pub radius_q8: u8,
    pub movement_speed_q4: u8,
}

/// One firing schedule owned by a source type.
///
/// The bullet leaves at `source + spawn` and travels along `spawn - base`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable, Serialize, Deserialize)]
pub struct SourceBulletEntry {
    pub spawn_x_q7: i8,
    pub spawn_y_q7: i8,
    pub base_x_q7: i8,
    pub base_y_q7: i8,
    pub cast_q4: u8,
    pub loop_q4: u8,
    pub delay_q4: u8,
    pub quantity: u8,
    pub bullet_type: u8,
}

impl SourceBulletEntry {
    pub fn new(spawn: Vec2, base: Vec2, bullet_type: u8) -> Self {
        Self {
            spawn_x_q7: to_q7_i8(spawn.x),
            spawn_y_q7: to_q7_i8(spawn.y),
            base_x_q7: to_q7_i8(base.x),
            base_y_q7: to_q7_i8(base.y),
            cast_q4: 0,
            loop_q4: to_q4_u8(1.0),
            delay_q4: 0,
            quantity: 1,
            bullet_type,
        }
    }

    /// Set cast, loop and burst delay (seconds) plus shots per burst
    pub fn timing(mut self, cast: f32, loop_time: f32, delay: f32, quantity: u8) -> Self {
        self.cast_q4 = to_q4_u8(cast);
        self.loop_q4 = to_q4_u8(loop_time);
        self.delay_q4 = to_q4_u8(delay);
        self.quantity = quantity;
        self
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable, Serialize, Deserialize)]
pub struct EnemyInstanceDef {
    pub start_time_q4: u16,
    pub enemy_type: u8,
    /// Index into spawn points; `64..` names an earlier slot of the same wave
    pub spawn_point: u8,
    /// Non-negative: fixed path. Negative: `|path|` plus the hero's grid column.
    pub path: i8,
    #[serde(skip)]
    pub pad: u8,
}

impl EnemyInstanceDef {
    pub fn new(start_time: f32, enemy_type: u8, spawn_point: u8, path: i8) -> Self {
        Self {
            start_time_q4: to_q4_u16(start_time),
            enemy_type,
            spawn_point,
            path,
            pad: 0,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub x_q4: i16,
    pub y_q4: i16,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable, Serialize, Deserialize)]
pub struct WayPoint {
    pub x_q4: i16,
    pub y_q4: i16,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable, Serialize, Deserialize)]
pub struct WayPointPath {
    pub start: u16,
    pub count: u8,
    /// Instances still on the last way-point after this long are removed
    pub time_out_q4: u8,
}

/// Enemy instance sub-range for one `(level << 2) + wave` key
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable, Serialize, Deserialize)]
pub struct LevelWave {
    pub enemy_start: u16,
    pub enemy_count: u16,
}

/// Immutable content tables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub enemy_types: Vec<EnemyType>,
    pub hero_types: Vec<HeroType>,
    pub enemy_bullet_types: Vec<BulletType>,
    pub enemy_bullet_entries: Vec<SourceBulletEntry>,
    pub hero_bullet_types: Vec<BulletType>,
    pub hero_bullet_entries: Vec<SourceBulletEntry>,
    pub enemy_instances: Vec<EnemyInstanceDef>,
    pub spawn_points: Vec<SpawnPoint>,
    pub way_points: Vec<WayPoint>,
    pub way_point_paths: Vec<WayPointPath>,
    /// Indexed by the flattened wave key; four entries per level
    pub level_waves: Vec<LevelWave>,
}

impl Content {
    /// Wave descriptor for a flattened key, `None` past the end of the table
    pub fn level_wave(&self, flat: usize) -> Option<LevelWave> {
        self.level_waves.get(flat).copied()
    }

    /// Enemy instance definitions of a wave
    pub fn wave_instances(&self, wave: LevelWave) -> &[EnemyInstanceDef] {
        let start = wave.enemy_start as usize;
        let end = (start + wave.enemy_count as usize).min(self.enemy_instances.len());
        self.enemy_instances.get(start..end).unwrap_or(&[])
    }

    pub fn level_count(&self) -> usize {
        self.level_waves.len().div_ceil(MAX_WAVES_PER_LEVEL as usize)
    }

    /// True when the level has at least one non-empty first wave
    pub fn has_level(&self, level: usize) -> bool {
        self.level_wave(level << 2)
            .is_some_and(|wave| wave.enemy_count > 0)
    }

    /// Bullet entries owned by an enemy type
    pub fn enemy_bullets(&self, enemy_type: usize) -> &[SourceBulletEntry] {
        self.enemy_types
            .get(enemy_type)
            .map(|t| entry_range(&self.enemy_bullet_entries, t.bullet_start, t.bullet_count))
            .unwrap_or(&[])
    }

    /// Bullet entries owned by a hero type
    pub fn hero_bullets(&self, hero_type: usize) -> &[SourceBulletEntry] {
        self.hero_types
            .get(hero_type)
            .map(|t| entry_range(&self.hero_bullet_entries, t.bullet_start, t.bullet_count))
            .unwrap_or(&[])
    }

    /// Check every cross-table reference and per-wave capacity
    pub fn validate(&self) -> Result<(), ContentError> {
        check_len("enemy_types", self.enemy_types.len(), u8::MAX as usize + 1)?;
        check_len("hero_types", self.hero_types.len(), u8::MAX as usize + 1)?;
        check_len("enemy_bullet_types", self.enemy_bullet_types.len(), u8::MAX as usize + 1)?;
        check_len("hero_bullet_types", self.hero_bullet_types.len(), u8::MAX as usize + 1)?;
        check_len("spawn_points", self.spawn_points.len(), SELF_REFERENTIAL_SPAWN_BASE as usize)?;
        check_len("way_point_paths", self.way_point_paths.len(), u8::MAX as usize + 1)?;

        if self.hero_types.is_empty() {
            return Err(ContentError::InvalidReference {
                table: "hero_types",
                index: 0,
                target: "hero type",
            });
        }

        for (index, t) in self.enemy_types.iter().enumerate() {
            check_entries(
                "enemy_types",
                index,
                t.bullet_start,
                t.bullet_count,
                &self.enemy_bullet_entries,
            )?;
        }
        for (index, t) in self.hero_types.iter().enumerate() {
            check_entries(
                "hero_types",
                index,
                t.bullet_start,
                t.bullet_count,
                &self.hero_bullet_entries,
            )?;
        }
        check_bullet_types(
            "enemy_bullet_entries",
            &self.enemy_bullet_entries,
            self.enemy_bullet_types.len(),
        )?;
        check_bullet_types(
            "hero_bullet_entries",
            &self.hero_bullet_entries,
            self.hero_bullet_types.len(),
        )?;

        for (index, def) in self.enemy_instances.iter().enumerate() {
            let invalid = |target| ContentError::InvalidReference {
                table: "enemy_instances",
                index,
                target,
            };
            if def.enemy_type as usize >= self.enemy_types.len() {
                return Err(invalid("enemy type"));
            }
            if def.spawn_point < SELF_REFERENTIAL_SPAWN_BASE
                && def.spawn_point as usize >= self.spawn_points.len()
            {
                return Err(invalid("spawn point"));
            }
            if PathSelector::decode(def.path).highest() >= self.way_point_paths.len() {
                return Err(invalid("way-point path"));
            }
        }

        for (index, path) in self.way_point_paths.iter().enumerate() {
            if path.count == 0
                || path.start as usize + path.count as usize > self.way_points.len()
            {
                return Err(ContentError::InvalidReference {
                    table: "way_point_paths",
                    index,
                    target: "way points",
                });
            }
        }

        for (index, wave) in self.level_waves.iter().enumerate() {
            if wave.enemy_count as usize > ENEMY_CAPACITY {
                return Err(ContentError::CapacityExceeded {
                    table: "level_waves",
                    count: wave.enemy_count as usize,
                    capacity: ENEMY_CAPACITY,
                });
            }
            if wave.enemy_start as usize + wave.enemy_count as usize > self.enemy_instances.len() {
                return Err(ContentError::InvalidReference {
                    table: "level_waves",
                    index,
                    target: "enemy instances",
                });
            }
        }

        Ok(())
    }

    /// Decode the binary table blob
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ContentError> {
        let mut reader = BlobReader { bytes, offset: 0 };
        let header = reader.take(HEADER_LEN)?;
        let magic = [header[0], header[1], header[2], header[3]];
        if magic != CONTENT_MAGIC {
            return Err(ContentError::BadMagic { found: magic });
        }
        let version = u16::from_le_bytes([header[4], header[5]]);
        if version != CONTENT_VERSION {
            return Err(ContentError::UnsupportedVersion {
                found: version,
                expected: CONTENT_VERSION,
            });
        }
        let tables = u16::from_le_bytes([header[6], header[7]]);
        if tables != TABLE_COUNT {
            return Err(ContentError::TableCount {
                found: tables,
                expected: TABLE_COUNT,
            });
        }

        let content = Self {
            enemy_types: reader.table()?,
            hero_types: reader.table()?,
            enemy_bullet_types: reader.table()?,
            enemy_bullet_entries: reader.table()?,
            hero_bullet_types: reader.table()?,
            hero_bullet_entries: reader.table()?,
            enemy_instances: reader.table()?,
            spawn_points: reader.table()?,
            way_points: reader.table()?,
            way_point_paths: reader.table()?,
            level_waves: reader.table()?,
        };
        content.validate()?;
        Ok(content)
    }

    /// Encode as the binary table blob
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&CONTENT_MAGIC);
        out.extend_from_slice(&CONTENT_VERSION.to_le_bytes());
        out.extend_from_slice(&TABLE_COUNT.to_le_bytes());
        write_table(&mut out, &self.enemy_types);
        write_table(&mut out, &self.hero_types);
        write_table(&mut out, &self.enemy_bullet_types);
        write_table(&mut out, &self.enemy_bullet_entries);
        write_table(&mut out, &self.hero_bullet_types);
        write_table(&mut out, &self.hero_bullet_entries);
        write_table(&mut out, &self.enemy_instances);
        write_table(&mut out, &self.spawn_points);
        write_table(&mut out, &self.way_points);
        write_table(&mut out, &self.way_point_paths);
        write_table(&mut out, &self.level_waves);
        out
    }

    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        let content: Self = serde_json::from_str(json)?;
        content.validate()?;
        Ok(content)
    }

    pub fn to_json(&self) -> Result<String, ContentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a `.json` authoring file or a binary blob
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&std::fs::read_to_string(path)?)
        } else {
            Self::from_bytes(&std::fs::read(path)?)
        }
    }

    /// Small two-level campaign
    pub fn demo() -> Self {
        let mut builder = ContentBuilder::new()
            .hero_type(HeroType {
                health: 300,
                damage: 40,
                radius_q4: to_q4_u8(0.4),
                ..HeroType::default()
            })
            .hero_bullet_type(BulletType {
                health: 0,
                damage: 20,
                radius_q8: to_q8_u8(0.15),
                movement_speed_q4: to_q4_u8(12.0),
            })
            .enemy_bullet_type(BulletType {
                health: 10,
                damage: 25,
                radius_q8: to_q8_u8(0.2),
                movement_speed_q4: to_q4_u8(5.0),
            })
            .enemy_type(EnemyType {
                health: 60,
                damage: 50,
                movement_speed_q4: to_q4_u8(2.0),
                radius_q4: to_q4_u8(0.5),
                ..EnemyType::default()
            })
            .enemy_type(EnemyType {
                health: 200,
                damage: 80,
                movement_speed_q4: to_q4_u8(1.0),
                radius_q4: to_q4_u8(0.8),
                ..EnemyType::default()
            });

        let up = Vec2::new(0.0, 0.5);
        builder = builder
            .hero_bullet(0, SourceBulletEntry::new(up, Vec2::ZERO, 0).timing(0.0, 0.25, 0.0, 1))
            .enemy_bullet(
                0,
                SourceBulletEntry::new(Vec2::new(0.0, -0.6), Vec2::ZERO, 0)
                    .timing(0.5, 1.5, 0.0, 1),
            )
            .enemy_bullet(
                1,
                SourceBulletEntry::new(Vec2::new(-0.4, -0.8), Vec2::new(0.0, 0.0), 0)
                    .timing(1.0, 2.0, 0.25, 3),
            )
            .enemy_bullet(
                1,
                SourceBulletEntry::new(Vec2::new(0.4, -0.8), Vec2::new(0.0, 0.0), 0)
                    .timing(1.0, 2.0, 0.25, 3),
            );

        for x in [-3.0, 0.0, 3.0] {
            builder = builder.spawn_point(Vec2::new(x, 9.0));
        }
        // Paths 0..=2 sweep down the left, middle and right lanes; 3 zig-zags
        for x in [-3.0, 0.0, 3.0] {
            builder = builder.path(&[Vec2::new(x, 4.0), Vec2::new(x, -10.0)], 12.0);
        }
        builder = builder.path(
            &[
                Vec2::new(-3.0, 5.0),
                Vec2::new(3.0, 2.0),
                Vec2::new(-3.0, -1.0),
                Vec2::new(3.0, -4.0),
                Vec2::new(0.0, -10.0),
            ],
            20.0,
        );

        let line = |spawn: u8, path: i8| {
            (0..4)
                .map(|i| EnemyInstanceDef::new(i as f32 * 0.75, 0, spawn, path))
                .collect::<Vec<_>>()
        };
        let mut escort = vec![EnemyInstanceDef::new(0.0, 1, 1, 3)];
        escort.extend((0..2).map(|_| EnemyInstanceDef::new(0.5, 0, SELF_REFERENTIAL_SPAWN_BASE, 3)));

        builder
            .wave(0, 0, line(0, 0))
            .wave(0, 1, line(2, 2))
            .wave(0, 2, escort.clone())
            .wave(1, 0, line(1, 1))
            .wave(1, 1, escort)
            .build()
            .unwrap_or_else(|err| {
                log::error!("Demo content failed validation: {err}");
                Content::default()
            })
    }
}

fn entry_range(entries: &[SourceBulletEntry], start: u8, count: u8) -> &[SourceBulletEntry] {
    let start = start as usize;
    let end = (start + count as usize).min(entries.len());
    entries.get(start..end).unwrap_or(&[])
}

fn check_len(table: &'static str, count: usize, capacity: usize) -> Result<(), ContentError> {
    if count > capacity {
        return Err(ContentError::CapacityExceeded {
            table,
            count,
            capacity,
        });
    }
    Ok(())
}

fn check_entries(
    table: &'static str,
    index: usize,
    start: u8,
    count: u8,
    entries: &[SourceBulletEntry],
) -> Result<(), ContentError> {
    check_len(table, count as usize, MAX_BULLET_ENTRIES_PER_SOURCE)?;
    if start as usize + count as usize > entries.len() {
        return Err(ContentError::InvalidReference {
            table,
            index,
            target: "bullet entries",
        });
    }
    Ok(())
}

fn check_bullet_types(
    table: &'static str,
    entries: &[SourceBulletEntry],
    type_count: usize,
) -> Result<(), ContentError> {
    match entries
        .iter()
        .position(|e| e.bullet_type as usize >= type_count)
    {
        Some(index) => Err(ContentError::InvalidReference {
            table,
            index,
            target: "bullet type",
        }),
        None => Ok(()),
    }
}

fn write_table<T: Pod>(out: &mut Vec<u8>, records: &[T]) {
    out.extend_from_slice(&(records.len() as u32).to_le_bytes());
    out.extend_from_slice(bytemuck::cast_slice(records));
    while out.len() % 4 != 0 {
        out.push(0);
    }
}

struct BlobReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> BlobReader<'a> {
    fn take(&mut self, needed: usize) -> Result<&'a [u8], ContentError> {
        let end = self.offset.checked_add(needed).filter(|&end| end <= self.bytes.len());
        let Some(end) = end else {
            return Err(ContentError::Truncated {
                offset: self.offset,
                needed,
                len: self.bytes.len(),
            });
        };
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn table<T: Pod>(&mut self) -> Result<Vec<T>, ContentError> {
        let count = self.take(4)?;
        let count = u32::from_le_bytes([count[0], count[1], count[2], count[3]]) as usize;
        let needed = count.saturating_mul(std::mem::size_of::<T>());
        // The blob carries no alignment guarantee, so records are copied out
        let records = self
            .take(needed)?
            .chunks_exact(std::mem::size_of::<T>())
            .map(bytemuck::pod_read_unaligned)
            .collect();
        let padding = (4 - self.offset % 4) % 4;
        self.take(padding)?;
        Ok(records)
    }
}

/// Assembles [`Content`] from typed pieces, resolving table offsets.
#[derive(Debug, Default)]
pub struct ContentBuilder {
    content: Content,
    enemy_bullets: Vec<Vec<SourceBulletEntry>>,
    hero_bullets: Vec<Vec<SourceBulletEntry>>,
    waves: Vec<(usize, Vec<EnemyInstanceDef>)>,
}

impl ContentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enemy_type(mut self, enemy: EnemyType) -> Self {
        self.content.enemy_types.push(enemy);
        self.enemy_bullets.push(Vec::new());
        self
    }

    pub fn hero_type(mut self, hero: HeroType) -> Self {
        self.content.hero_types.push(hero);
        self.hero_bullets.push(Vec::new());
        self
    }

    pub fn enemy_bullet_type(mut self, bullet: BulletType) -> Self {
        self.content.enemy_bullet_types.push(bullet);
        self
    }

    pub fn hero_bullet_type(mut self, bullet: BulletType) -> Self {
        self.content.hero_bullet_types.push(bullet);
        self
    }

    /// Attach a firing schedule to an already added enemy type
    pub fn enemy_bullet(mut self, enemy_type: usize, entry: SourceBulletEntry) -> Self {
        if let Some(entries) = self.enemy_bullets.get_mut(enemy_type) {
            entries.push(entry);
        }
        self
    }

    pub fn hero_bullet(mut self, hero_type: usize, entry: SourceBulletEntry) -> Self {
        if let Some(entries) = self.hero_bullets.get_mut(hero_type) {
            entries.push(entry);
        }
        self
    }

    pub fn spawn_point(mut self, position: Vec2) -> Self {
        self.content.spawn_points.push(SpawnPoint {
            x_q4: to_q4_i16(position.x),
            y_q4: to_q4_i16(position.y),
        });
        self
    }

    pub fn path(mut self, points: &[Vec2], time_out: f32) -> Self {
        self.content.way_point_paths.push(WayPointPath {
            start: self.content.way_points.len() as u16,
            count: points.len() as u8,
            time_out_q4: to_q4_u8(time_out),
        });
        self.content
            .way_points
            .extend(points.iter().map(|p| WayPoint {
                x_q4: to_q4_i16(p.x),
                y_q4: to_q4_i16(p.y),
            }));
        self
    }

    /// Define the enemy instances of one wave; instances should be sorted by start time
    pub fn wave(mut self, level: usize, wave: usize, instances: Vec<EnemyInstanceDef>) -> Self {
        let flat = (level << 2) + wave.min(MAX_WAVES_PER_LEVEL as usize - 1);
        self.waves.retain(|(key, _)| *key != flat);
        self.waves.push((flat, instances));
        self
    }

    pub fn build(mut self) -> Result<Content, ContentError> {
        fn flatten(
            owners: &mut [impl BulletOwner],
            lists: Vec<Vec<SourceBulletEntry>>,
            table: &mut Vec<SourceBulletEntry>,
        ) {
            for (owner, list) in owners.iter_mut().zip(lists) {
                owner.set_entries(table.len() as u8, list.len() as u8);
                table.extend(list);
            }
        }

        flatten(
            &mut self.content.enemy_types,
            std::mem::take(&mut self.enemy_bullets),
            &mut self.content.enemy_bullet_entries,
        );
        flatten(
            &mut self.content.hero_types,
            std::mem::take(&mut self.hero_bullets),
            &mut self.content.hero_bullet_entries,
        );

        self.waves.sort_by_key(|(flat, _)| *flat);
        let slots = self.waves.last().map_or(0, |(flat, _)| flat + 1);
        let slots = slots.div_ceil(MAX_WAVES_PER_LEVEL as usize) * MAX_WAVES_PER_LEVEL as usize;
        self.content.level_waves = vec![LevelWave::default(); slots];
        for (flat, instances) in self.waves {
            self.content.level_waves[flat] = LevelWave {
                enemy_start: self.content.enemy_instances.len() as u16,
                enemy_count: instances.len() as u16,
            };
            self.content.enemy_instances.extend(instances);
        }

        self.content.validate()?;
        Ok(self.content)
    }
}

trait BulletOwner {
    fn set_entries(&mut self, start: u8, count: u8);
}

impl BulletOwner for EnemyType {
    fn set_entries(&mut self, start: u8, count: u8) {
        self.bullet_start = start;
        self.bullet_count = count;
    }
}

impl BulletOwner for HeroType {
    fn set_entries(&mut self, start: u8, count: u8) {
        self.bullet_start = start;
        self.bullet_count = count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_layouts() {
        assert_eq!(std::mem::size_of::<EnemyType>(), 8);
        assert_eq!(std::mem::size_of::<HeroType>(), 8);
        assert_eq!(std::mem::size_of::<BulletType>(), 6);
        assert_eq!(std::mem::size_of::<SourceBulletEntry>(), 9);
        assert_eq!(std::mem::size_of::<EnemyInstanceDef>(), 6);
        assert_eq!(std::mem::size_of::<LevelWave>(), 4);
    }

    #[test]
    fn test_demo_is_valid() {
        let content = Content::demo();
        assert!(content.validate().is_ok());
        assert_eq!(content.level_count(), 2);
        assert!(content.has_level(0));
        assert!(content.has_level(1));
        assert!(!content.has_level(2));
        assert_eq!(content.hero_bullets(0).len(), 1);
        assert_eq!(content.enemy_bullets(1).len(), 2);
    }

    #[test]
    fn test_binary_round_trip() {
        let content = Content::demo();
        let bytes = content.to_bytes();
        assert_eq!(&bytes[..4], b"WSHT");
        assert_eq!(bytes.len() % 4, 0);
        let decoded = Content::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, content);
    }

    #[test]
    fn test_json_round_trip() {
        let content = Content::demo();
        let json = content.to_json().unwrap();
        assert_eq!(Content::from_json(&json).unwrap(), content);
    }

    #[test]
    fn test_rejects_bad_header() {
        let mut bytes = Content::demo().to_bytes();
        bytes[0] = b'X';
        assert!(matches!(
            Content::from_bytes(&bytes),
            Err(ContentError::BadMagic { .. })
        ));

        let mut bytes = Content::demo().to_bytes();
        bytes[4] = 9;
        assert!(matches!(
            Content::from_bytes(&bytes),
            Err(ContentError::UnsupportedVersion { found: 9, .. })
        ));
    }

    #[test]
    fn test_rejects_truncated_blob() {
        let bytes = Content::demo().to_bytes();
        let result = Content::from_bytes(&bytes[..bytes.len() - 3]);
        assert!(matches!(result, Err(ContentError::Truncated { .. })));
        assert!(matches!(
            Content::from_bytes(&bytes[..5]),
            Err(ContentError::Truncated { offset: 0, .. })
        ));
    }

    #[test]
    fn test_builder_lays_out_waves_by_key() {
        let content = ContentBuilder::new()
            .hero_type(HeroType::default())
            .enemy_type(EnemyType::default())
            .spawn_point(Vec2::ZERO)
            .path(&[Vec2::ZERO], 1.0)
            .wave(1, 0, vec![EnemyInstanceDef::new(0.0, 0, 0, 0); 2])
            .wave(0, 0, vec![EnemyInstanceDef::new(0.0, 0, 0, 0); 3])
            .build()
            .unwrap();

        assert_eq!(content.level_waves.len(), 8);
        assert_eq!(content.level_waves[0].enemy_count, 3);
        assert_eq!(content.level_waves[4].enemy_start, 3);
        assert_eq!(content.level_waves[4].enemy_count, 2);
        assert_eq!(content.level_wave(1).map(|w| w.enemy_count), Some(0));
        assert_eq!(content.level_wave(99), None);
    }

    #[test]
    fn test_validate_catches_dangling_references() {
        let mut content = Content::demo();
        content.enemy_instances[0].enemy_type = 42;
        assert!(matches!(
            content.validate(),
            Err(ContentError::InvalidReference {
                table: "enemy_instances",
                index: 0,
                target: "enemy type"
            })
        ));

        let mut content = Content::demo();
        content.enemy_bullet_entries[0].bullet_type = 7;
        assert!(matches!(
            content.validate(),
            Err(ContentError::InvalidReference {
                target: "bullet type",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_per_column_path_past_table() {
        let builder = || {
            ContentBuilder::new()
                .hero_type(HeroType::default())
                .enemy_type(EnemyType::default())
                .spawn_point(Vec2::ZERO)
                .path(&[Vec2::new(0.0, 1.0)], 0.0)
                .path(&[Vec2::new(0.0, 2.0)], 0.0)
        };

        // Column 2 would select path 3
        let err = builder()
            .wave(0, 0, vec![EnemyInstanceDef::new(0.0, 0, 0, -1)])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ContentError::InvalidReference {
                table: "enemy_instances",
                index: 0,
                target: "way-point path"
            }
        ));

        // Every column stays inside the table
        assert!(
            builder()
                .path(&[Vec2::new(0.0, 3.0)], 0.0)
                .path(&[Vec2::new(0.0, 4.0)], 0.0)
                .wave(0, 0, vec![EnemyInstanceDef::new(0.0, 0, 0, -1)])
                .build()
                .is_ok()
        );
    }

    #[test]
    fn test_validate_wave_capacity() {
        let mut content = Content::demo();
        content.level_waves[0].enemy_count = (ENEMY_CAPACITY + 1) as u16;
        assert!(matches!(
            content.validate(),
            Err(ContentError::CapacityExceeded { table: "level_waves", .. })
        ));
    }
}
