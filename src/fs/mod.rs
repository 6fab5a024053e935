// src/fs/mod.rs

//! Filesystem access used when preparing a run.
//!
//! The command builder needs to check and create the output directory, and
//! the config loader reads its TOML file. Both go through [`FileSystem`] so
//! tests can use [`mock::MockFileSystem`] instead of touching the disk.

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod mock;

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;

    /// Create `path` and any missing parents. Succeeds if it already exists
    /// as a directory.
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Directory relative paths are resolved against.
    fn current_dir(&self) -> Result<PathBuf>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("reading file {:?}", path))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).with_context(|| format!("creating dir {:?}", path))
    }

    fn current_dir(&self) -> Result<PathBuf> {
        std::env::current_dir().context("resolving current directory")
    }
}

/// Make `path` absolute against `fs.current_dir()`. Does not touch the disk
/// beyond asking for the current directory, and does not resolve symlinks.
pub fn absolutize(fs: &dyn FileSystem, path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(fs.current_dir()?.join(path))
}
