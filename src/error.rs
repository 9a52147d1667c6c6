//! Errors raised at the content and settings boundary
//!
//! The simulation tick itself never fails; everything here happens before
//! the first tick, while tables and settings are being loaded.

use thiserror::Error;

/// Errors raised while decoding or validating content tables.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content blob truncated: needed {needed} bytes at offset {offset}, have {len}")]
    Truncated {
        offset: usize,
        needed: usize,
        len: usize,
    },
    #[error("content blob has bad magic {found:?}")]
    BadMagic { found: [u8; 4] },
    #[error("content blob version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u16, expected: u16 },
    #[error("content blob declares {found} tables, expected {expected}")]
    TableCount { found: u16, expected: u16 },
    #[error("table {table} has {count} records but capacity is {capacity}")]
    CapacityExceeded {
        table: &'static str,
        count: usize,
        capacity: usize,
    },
    #[error("{table}[{index}] references missing {target}")]
    InvalidReference {
        table: &'static str,
        index: usize,
        target: &'static str,
    },
    #[error("invalid content json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("content io: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading runner settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings io: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("sim_hz must be positive, got {0}")]
    InvalidRate(u32),
}
