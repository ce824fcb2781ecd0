#![allow(clippy::float_cmp)]

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::*;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Serializes env access and starts from a clean slate.
fn clean_env() -> MutexGuard<'static, ()> {
    let guard = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    // SAFETY: every test touching these vars holds ENV_LOCK.
    unsafe {
        std::env::remove_var("BLOCKGRID_FILE");
        std::env::remove_var("BLOCKGRID_COLUMNS");
        std::env::remove_var("BLOCKGRID_CELL_PX");
        std::env::remove_var("BLOCKGRID_LOG");
    }
    guard
}

#[test]
fn from_env_defaults() {
    let _guard = clean_env();
    let cfg = Config::from_env().unwrap();
    assert_eq!(cfg, Config::default());
    assert_eq!(cfg.file, PathBuf::from("layout.json"));
    assert_eq!(cfg.grid.columns, 12);
    assert_eq!(cfg.grid.cell_px, 100.0);
    assert_eq!(cfg.log_level, Level::INFO);
}

#[test]
fn from_env_reads_overrides() {
    let _guard = clean_env();
    unsafe {
        std::env::set_var("BLOCKGRID_FILE", "pages/home.json");
        std::env::set_var("BLOCKGRID_COLUMNS", "24");
        std::env::set_var("BLOCKGRID_CELL_PX", " 50.5 ");
        std::env::set_var("BLOCKGRID_LOG", "debug");
    }
    let cfg = Config::from_env().unwrap();
    assert_eq!(cfg.file, PathBuf::from("pages/home.json"));
    assert_eq!(cfg.grid, GridConfig { columns: 24, cell_px: 50.5 });
    assert_eq!(cfg.log_level, Level::DEBUG);
}

#[test]
fn from_env_bad_numbers_fall_back() {
    let _guard = clean_env();
    unsafe {
        std::env::set_var("BLOCKGRID_COLUMNS", "zero");
        std::env::set_var("BLOCKGRID_CELL_PX", "-3");
    }
    let cfg = Config::from_env().unwrap();
    assert_eq!(cfg.grid, GridConfig::default());
}

#[test]
fn from_env_zero_columns_falls_back() {
    let _guard = clean_env();
    unsafe {
        std::env::set_var("BLOCKGRID_COLUMNS", "0");
        std::env::set_var("BLOCKGRID_CELL_PX", "NaN");
    }
    let cfg = Config::from_env().unwrap();
    assert_eq!(cfg.grid.columns, GRID_COLUMNS);
    assert_eq!(cfg.grid.cell_px, DROP_CELL_PX);
}

#[test]
fn from_env_rejects_unknown_log_level() {
    let _guard = clean_env();
    unsafe { std::env::set_var("BLOCKGRID_LOG", "loud") };
    let err = Config::from_env().unwrap_err();
    assert_eq!(err, ConfigError::LogLevel("loud".into()));
    assert!(err.to_string().contains("loud"));
}

#[test]
fn parse_level_accepts_any_case() {
    assert_eq!(parse_level(Some("WARN")).unwrap(), Level::WARN);
    assert_eq!(parse_level(Some("trace")).unwrap(), Level::TRACE);
    assert_eq!(parse_level(Some("  ")).unwrap(), DEFAULT_LOG_LEVEL);
    assert_eq!(parse_level(None).unwrap(), DEFAULT_LOG_LEVEL);
}
