// src/exec/request.rs

//! The command-line of one run.

use std::fmt;

use crate::errors::{Result, SupervisorError};

/// An ordered, non-empty sequence of strings: the program followed by its
/// arguments. No shell is involved when it is executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    parts: Vec<String>,
}

impl RunRequest {
    /// Build a request, rejecting an empty sequence or an empty program.
    pub fn new<I, S>(parts: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parts: Vec<String> = parts.into_iter().map(Into::into).collect();
        match parts.first() {
            None => Err(SupervisorError::Validation(
                "command must contain at least the program to run".to_string(),
            )),
            Some(program) if program.trim().is_empty() => Err(SupervisorError::Validation(
                "program name must not be empty".to_string(),
            )),
            Some(_) => Ok(Self { parts }),
        }
    }

    pub fn program(&self) -> &str {
        &self.parts[0]
    }

    pub fn args(&self) -> &[String] {
        &self.parts[1..]
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Render the request as a copy-pasteable POSIX shell command.
    pub fn display_command(&self) -> String {
        self.parts
            .iter()
            .map(|p| shell_quote(p))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for RunRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_command())
    }
}

/// Quote a single word for a POSIX shell.
///
/// Words made only of safe characters are returned unchanged; everything else
/// is wrapped in single quotes, with embedded single quotes written as `'"'"'`.
pub fn shell_quote(word: &str) -> String {
    if word.is_empty() {
        return "''".to_string();
    }

    let safe = word
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c));
    if safe {
        return word.to_string();
    }

    format!("'{}'", word.replace('\'', "'\"'\"'"))
}
