// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir,
}

/// In-memory filesystem for tests.
///
/// Parent directories are created implicitly when a file or directory is
/// added. Paths can be marked read-only to make `create_dir_all` fail below
/// them.
#[derive(Debug, Clone)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
    read_only: Arc<Mutex<HashSet<PathBuf>>>,
    cwd: PathBuf,
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(PathBuf::from("/"), MockEntry::Dir);

        Self {
            entries: Arc::new(Mutex::new(entries)),
            read_only: Arc::new(Mutex::new(HashSet::new())),
            cwd: PathBuf::from("/"),
        }
    }

    pub fn with_current_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self.add_dir(self.cwd.clone());
        self
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref();
        let mut entries = self.entries.lock().unwrap();
        if let Some(parent) = path.parent() {
            Self::ensure_dirs(&mut entries, parent);
        }
        entries.insert(path.to_path_buf(), MockEntry::File(content.into()));
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut entries = self.entries.lock().unwrap();
        Self::ensure_dirs(&mut entries, path.as_ref());
    }

    /// Refuse to create anything at or below `path`.
    pub fn set_read_only(&self, path: impl AsRef<Path>) {
        self.read_only
            .lock()
            .unwrap()
            .insert(path.as_ref().to_path_buf());
    }

    fn ensure_dirs(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            entries
                .entry(ancestor.to_path_buf())
                .or_insert(MockEntry::Dir);
        }
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let entries = self.entries.lock().unwrap();
        match entries.get(path) {
            Some(MockEntry::File(content)) => {
                String::from_utf8(content.clone()).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
            }
            Some(MockEntry::Dir) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.entries.lock().unwrap().contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.entries.lock().unwrap().get(path), Some(MockEntry::Dir))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        if let Some(MockEntry::File(_)) = entries.get(path) {
            return Err(anyhow!("File exists: {:?}", path));
        }
        if entries.contains_key(path) {
            return Ok(());
        }

        let read_only = self.read_only.lock().unwrap();
        if path.ancestors().any(|a| read_only.contains(a)) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }

        Self::ensure_dirs(&mut entries, path);
        Ok(())
    }

    fn current_dir(&self) -> Result<PathBuf> {
        Ok(self.cwd.clone())
    }
}
