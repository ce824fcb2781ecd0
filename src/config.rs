//! CLI configuration parsed from environment variables.

use std::path::PathBuf;
use std::str::FromStr;

use layout::consts::{DROP_CELL_PX, GRID_COLUMNS};
use layout::palette::GridConfig;
use tracing::Level;

pub const DEFAULT_FILE: &str = "layout.json";
pub const DEFAULT_LOG_LEVEL: Level = Level::INFO;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid BLOCKGRID_LOG level: {0} (expected trace, debug, info, warn or error)")]
    LogLevel(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub file: PathBuf,
    pub grid: GridConfig,
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Self { file: PathBuf::from(DEFAULT_FILE), grid: GridConfig::default(), log_level: DEFAULT_LOG_LEVEL }
    }
}

impl Config {
    /// Build typed CLI config from environment variables.
    ///
    /// Optional:
    /// - `BLOCKGRID_FILE`: layout document path, default `layout.json`
    /// - `BLOCKGRID_COLUMNS`: grid columns, default 12
    /// - `BLOCKGRID_CELL_PX`: pixel size of one drop cell, default 100
    /// - `BLOCKGRID_LOG`: log level, default `info`
    ///
    /// Unparsable or non-positive numbers fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::LogLevel`] for an unknown log level.
    pub fn from_env() -> Result<Self, ConfigError> {
        let file = std::env::var("BLOCKGRID_FILE").map_or_else(|_| PathBuf::from(DEFAULT_FILE), PathBuf::from);
        let columns = env_parse("BLOCKGRID_COLUMNS", GRID_COLUMNS, |c: &u32| *c > 0);
        let cell_px = env_parse("BLOCKGRID_CELL_PX", DROP_CELL_PX, |p: &f64| p.is_finite() && *p > 0.0);
        let log_level = parse_level(std::env::var("BLOCKGRID_LOG").ok().as_deref())?;

        Ok(Self { file, grid: GridConfig { columns, cell_px }, log_level })
    }
}

fn env_parse<T: FromStr>(key: &str, default: T, valid: impl Fn(&T) -> bool) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .filter(valid)
        .unwrap_or(default)
}

fn parse_level(raw: Option<&str>) -> Result<Level, ConfigError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(DEFAULT_LOG_LEVEL),
        Some(other) => Level::from_str(other).map_err(|_| ConfigError::LogLevel(other.to_string())),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
