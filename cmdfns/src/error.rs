//! Error types.
//!
//! Errors are split by who can fix them:
//!
//! - [`ConfigError`]: a malformed command or an unloadable discovery file. Raised
//!   while marking or discovering, before anything is dispatched.
//! - [`BindingError`]: the user typed something that does not fit the command.
//!   Reported on the output stream, never returned from dispatch.
//! - [`CommandError`] / [`DispatchError`]: the command's own logic failed. Passed
//!   back to the caller untouched.

use std::path::PathBuf;
use thiserror::Error;

use crate::command::DeclaredType;

/// Fatal errors raised while registering or discovering commands.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("'{0}' is reserved and cannot be registered as a command")]
    ReservedName(String),

    #[error("Invalid command name: {0:?}")]
    InvalidName(String),

    #[error("Parameter '{parameter}' is declared more than once in command '{command}'")]
    DuplicateParameter { command: String, parameter: String },

    #[error("Variadic parameter '{parameter}' must be the last parameter of command '{command}'")]
    MisplacedVariadic { command: String, parameter: String },

    #[error("Invalid default for parameter '{parameter}' of command '{command}': {reason}")]
    InvalidDefault {
        command: String,
        parameter: String,
        reason: String,
    },

    #[error("Search path not found: {0}")]
    RootNotFound(PathBuf),

    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to load commands from {path}: {source}")]
    LoadModule {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to write command index {path}: {source}")]
    Index {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A command line that could not be turned into call arguments.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} (command '{command}')")]
pub struct BindingError {
    /// Name of the command being bound.
    pub command: String,

    /// What went wrong.
    pub kind: BindingErrorKind,
}

impl BindingError {
    pub fn new(command: impl Into<String>, kind: BindingErrorKind) -> Self {
        Self {
            command: command.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindingErrorKind {
    #[error("Missing argument(s): {}", .missing.join(", "))]
    TooFewArguments { missing: Vec<String> },

    #[error("Unexpected argument(s): {}", .extra.join(" "))]
    TooManyArguments { extra: Vec<String> },

    #[error("Unknown keyword argument '{keyword}'")]
    UnknownKeyword { keyword: String },

    #[error("Argument '{parameter}' was given more than once")]
    DuplicateArgument { parameter: String },

    #[error("Cannot convert '{value}' to {expected} for parameter '{parameter}'")]
    InvalidType {
        parameter: String,
        value: String,
        expected: DeclaredType,
    },
}

/// Failure returned by a command callable.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A resolved argument did not fit the function's parameter type.
    #[error(transparent)]
    Binding(#[from] BindingError),

    /// The command body itself failed.
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

/// Errors that cross back out of the dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Writing help or diagnostics to the output sink failed.
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    /// The invoked command failed; the original error is preserved.
    #[error(transparent)]
    Command(anyhow::Error),
}

impl DispatchError {
    /// The command's own error, if this is a command failure.
    pub fn command_error(&self) -> Option<&anyhow::Error> {
        match self {
            DispatchError::Command(e) => Some(e),
            DispatchError::Io(_) => None,
        }
    }
}

/// Top-level error for the `main`-style entry points.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
