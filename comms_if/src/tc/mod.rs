//! # Telecommand module
//!
//! This module provides the discrete commands which can be injected into a run of the automaton.
//! Only two codes are recognised, anything else is rejected here before it reaches the automaton.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An external command for the automaton.
///
/// On the wire a command is its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Command {
    /// Resume when the automaton is waiting for an explicit continuation (code 55).
    Continue,

    /// Abort the current phase and proceed towards a terminal state (code 66).
    Abort,
}

/// Possible command parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("{0} is not a recognised command code, expected 55 or 66")]
    Unrecognised(i64),

    #[error("Cannot parse \"{0}\" as a command")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Command {
    /// Code of the continue command
    pub const CONTINUE_CODE: i64 = 55;

    /// Code of the abort command
    pub const ABORT_CODE: i64 = 66;

    /// Get the integer code of the command.
    pub fn code(&self) -> i64 {
        match self {
            Command::Continue => Self::CONTINUE_CODE,
            Command::Abort => Self::ABORT_CODE,
        }
    }
}

impl TryFrom<i64> for Command {
    type Error = CommandError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            Self::CONTINUE_CODE => Ok(Command::Continue),
            Self::ABORT_CODE => Ok(Command::Abort),
            c => Err(CommandError::Unrecognised(c)),
        }
    }
}

impl From<Command> for i64 {
    fn from(cmd: Command) -> Self {
        cmd.code()
    }
}

impl FromStr for Command {
    type Err = CommandError;

    /// Parse either the integer code or the command name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "continue" => Ok(Command::Continue),
            "abort" => Ok(Command::Abort),
            other => match other.parse::<i64>() {
                Ok(code) => Command::try_from(code),
                Err(_) => Err(CommandError::Invalid(s.to_string())),
            },
        }
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Continue => write!(f, "Continue({})", self.code()),
            Command::Abort => write!(f, "Abort({})", self.code()),
        }
    }
}
