//! Fixed-point decoding and small vector helpers
//!
//! Content tables store times, speeds, offsets and radii as quantized
//! integers. Q4 = 1/16, Q7 = 1/128, Q8 = 1/256.

use glam::Vec2;

pub const Q4_TO_FLOAT: f32 = 0.0625;
pub const Q7_TO_FLOAT: f32 = 0.0078125;
pub const Q8_TO_FLOAT: f32 = 0.00390625;

/// Decode an unsigned or signed Q4 value
#[inline]
pub fn q4(value: impl Into<i32>) -> f32 {
    value.into() as f32 * Q4_TO_FLOAT
}

#[inline]
pub fn q7(value: impl Into<i32>) -> f32 {
    value.into() as f32 * Q7_TO_FLOAT
}

#[inline]
pub fn q8(value: impl Into<i32>) -> f32 {
    value.into() as f32 * Q8_TO_FLOAT
}

#[inline]
pub fn q4_vec(x: i16, y: i16) -> Vec2 {
    Vec2::new(q4(x), q4(y))
}

#[inline]
pub fn q7_vec(x: i8, y: i8) -> Vec2 {
    Vec2::new(q7(x), q7(y))
}

/// Encode seconds/units as Q4, rounding to nearest and saturating
pub fn to_q4_u16(value: f32) -> u16 {
    (value / Q4_TO_FLOAT).round().clamp(0.0, u16::MAX as f32) as u16
}

pub fn to_q4_u8(value: f32) -> u8 {
    (value / Q4_TO_FLOAT).round().clamp(0.0, u8::MAX as f32) as u8
}

pub fn to_q4_i16(value: f32) -> i16 {
    (value / Q4_TO_FLOAT)
        .round()
        .clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

pub fn to_q7_i8(value: f32) -> i8 {
    (value / Q7_TO_FLOAT)
        .round()
        .clamp(i8::MIN as f32, i8::MAX as f32) as i8
}

pub fn to_q8_u8(value: f32) -> u8 {
    (value / Q8_TO_FLOAT).round().clamp(0.0, u8::MAX as f32) as u8
}

/// Step from `current` toward `target` by at most `max_dist`.
///
/// Returns the new position and the distance actually covered. A zero-length
/// segment yields no movement instead of a NaN direction.
#[inline]
pub fn move_toward(current: Vec2, target: Vec2, max_dist: f32) -> (Vec2, f32) {
    let delta = target - current;
    let dist = delta.length();
    if dist <= 0.0 {
        return (current, 0.0);
    }
    let step = dist.min(max_dist.max(0.0));
    (current + delta * (step / dist), step)
}
