// src/command/mod.rs

//! Turning the user's download choices into a [`RunRequest`](crate::exec::RunRequest).
//!
//! Everything here runs before a process exists, so every failure is a
//! synchronous validation error and never reaches the output channel.

pub mod builder;
pub mod options;
pub mod resolve;

pub use builder::{build_request, DEFAULT_OUTPUT_DIR};
pub use options::{DownloadOptions, DEFAULT_DOWNLOADER};
pub use resolve::{ExecutableResolver, PathResolver};
