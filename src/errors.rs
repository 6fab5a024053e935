// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Run-lifecycle failures (spawn errors, read errors, non-zero exits) are not
//! errors at this level: they travel through the output channel as
//! [`CompletionStatus`](crate::engine::CompletionStatus). Everything here is
//! reported synchronously to whoever asked for the run.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Executable not found: {0}")]
    ExecutableNotFound(String),

    #[error("A download is already running")]
    AlreadyRunning,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SupervisorError {
    /// True for failures that are the requester's fault (bad input, missing
    /// executable) rather than an environment problem.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SupervisorError::Validation(_) | SupervisorError::ExecutableNotFound(_)
        )
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SupervisorError>;
