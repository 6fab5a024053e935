// src/command/resolve.rs

use std::fmt::Debug;
use std::path::PathBuf;

use tracing::debug;

/// Locates an executable by name.
pub trait ExecutableResolver: Send + Sync + Debug {
    /// Runnable path for `name`, or `None` if it cannot be found.
    fn resolve(&self, name: &str) -> Option<PathBuf>;
}

/// Resolves names the way a shell would: through `PATH` (and `PATHEXT` on
/// Windows). Names containing a path separator are checked directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathResolver;

impl ExecutableResolver for PathResolver {
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        match which::which(name) {
            Ok(path) => {
                debug!(name, path = %path.display(), "resolved executable");
                Some(path)
            }
            Err(e) => {
                debug!(name, error = %e, "executable not found");
                None
            }
        }
    }
}
