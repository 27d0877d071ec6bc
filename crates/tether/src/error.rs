//! # Physics Error Types
//!
//! All errors that can occur while attaching, creating or stepping physics.
//!
//! Not every failure mode is an error value:
//!
//! - A scope with no attachment is `None`, callers branch on it.
//! - Re-entrant locking of a cell is a defect and panics.
//! - A [`StepFailure`] is recovered by the tick coordinator, which logs it,
//!   reports it and keeps stepping the other scopes.

use std::path::PathBuf;

use tether_core::CoreError;
use thiserror::Error;

use crate::scope::ScopeLabel;

/// An error raised by the physics engine collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct EngineError {
    message: String,
}

impl EngineError {
    /// Creates an engine error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The engine's description of what went wrong.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// One scope's advance failed during a tick.
///
/// That scope's step for this tick is abandoned; every other scope still steps.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("physics step failed for {scope}: {source}")]
pub struct StepFailure {
    /// The scope whose step failed.
    pub scope: ScopeLabel,
    /// The engine error behind the failure.
    pub source: EngineError,
}

/// Errors loading or validating settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("failed to read settings from {}: {source}", .path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The settings file is not valid TOML for [`Settings`](crate::config::Settings).
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// A setting has a value outside its allowed range.
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Errors from physics lifecycle operations.
#[derive(Error, Debug)]
pub enum PhysicsError {
    /// Attachment failed (handle already present).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The engine could not create a simulation.
    #[error("physics engine error: {0}")]
    Engine(#[from] EngineError),

    /// Settings were rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for physics lifecycle operations.
pub type PhysicsResult<T> = Result<T, PhysicsError>;
