// src/config/mod.rs

//! Configuration loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file (`loader.rs`).
//! - Validate basic invariants like the polling cadence (`validate.rs`).
//!
//! The file only supplies defaults; command-line flags override it. It is
//! never written back.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_optional};
pub use model::{ConfigFile, DownloadSection, RawConfigFile, RuntimeSection};
