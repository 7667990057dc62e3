//! # Command script module
//!
//! Command scripts schedule automaton commands against the control tick index, allowing an
//! abort or continue to be injected at a known point of a run. A script is a series of
//! `<tick>: <code>;` entries, for example:
//!
//! ```text
//! 12: 66;
//! 14: 55;
//! ```
//!
//! Anything outside of an entry is ignored and can be used for comments.
//!
//! Scripts are kept sparse, only the scheduled ticks are stored, so any tick index is valid. On the
//! wire a script is a JSON object of tick to command code, e.g. `{"12": 66}`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::iter::FromIterator;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

// Internal
use comms_if::tc::{Command, CommandError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A parsed command script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandScript {
    cmds: BTreeMap<u64, Command>,
}

/// Per-tick view of a script, yields `None` for unscheduled ticks and forever after the end.
pub struct ScriptCommands<'a> {
    script: &'a CommandScript,

    /// Next tick to yield, `None` once past the last representable tick.
    tick: Option<u64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error("Script contains an invalid tick index: {0}")]
    InvalidTick(String),

    #[error("Script contains an invalid command at tick {0}: {1}")]
    InvalidCommand(u64, CommandError),

    #[error("Script schedules more than one command at tick {0}")]
    DuplicateTick(u64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CommandScript {
    /// Load a script from the given path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        let path = script_path.as_ref();

        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path.display().to_string()));
        }

        let script = fs::read_to_string(path).map_err(ScriptError::ScriptLoadError)?;

        script.parse()
    }

    /// The command scheduled for the given tick, if any.
    pub fn get(&self, tick: u64) -> Option<Command> {
        self.cmds.get(&tick).copied()
    }

    /// Returns true if no commands are scheduled.
    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Get the number of commands in the script
    pub fn get_num_cmds(&self) -> usize {
        self.cmds.len()
    }

    /// Index of the last scheduled tick.
    pub fn get_last_tick(&self) -> u64 {
        self.cmds.keys().next_back().copied().unwrap_or(0)
    }

    /// Iterate over the command of every tick, starting at tick 0.
    pub fn commands(&self) -> ScriptCommands<'_> {
        ScriptCommands {
            script: self,
            tick: Some(0),
        }
    }
}

impl FromStr for CommandScript {
    type Err = ScriptError;

    fn from_str(script: &str) -> Result<Self, Self::Err> {
        let re = RegexBuilder::new(r"^\s*(\d+)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .expect("Command script regex is invalid");

        let mut cmds = BTreeMap::new();

        for cap in re.captures_iter(script) {
            let tick_str = &cap[1];
            let tick: u64 = tick_str
                .parse()
                .map_err(|_| ScriptError::InvalidTick(tick_str.to_string()))?;

            let cmd: Command = cap[2]
                .trim()
                .parse()
                .map_err(|e| ScriptError::InvalidCommand(tick, e))?;

            if cmds.insert(tick, cmd).is_some() {
                return Err(ScriptError::DuplicateTick(tick));
            }
        }

        if cmds.is_empty() {
            return Err(ScriptError::ScriptEmpty);
        }

        Ok(Self { cmds })
    }
}

impl FromIterator<(u64, Command)> for CommandScript {
    /// Build a script from `(tick, command)` pairs, a later pair for the same tick replaces an
    /// earlier one.
    fn from_iter<I: IntoIterator<Item = (u64, Command)>>(iter: I) -> Self {
        Self {
            cmds: iter.into_iter().collect(),
        }
    }
}

impl<'a> Iterator for ScriptCommands<'a> {
    type Item = Option<Command>;

    fn next(&mut self) -> Option<Self::Item> {
        let cmd = self.tick.and_then(|t| self.script.get(t));
        self.tick = self.tick.and_then(|t| t.checked_add(1));
        Some(cmd)
    }
}
