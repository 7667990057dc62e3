//! # Hybrid Automaton Executable Parameters
//!
//! This module provides parameters for the hybrid automaton executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::{attack::MagnetSpec, auto::AutomatonParams, sim::SimParams};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecParams {
    /// Frequency of the control loop, one automaton tick per cycle
    pub frequency_hz: f64,

    /// Speed the motion intent is scaled by when a run does not give a speed controller
    pub default_speed: f64,

    /// Maximum number of ticks in a run, unlimited if not given
    #[serde(default)]
    pub max_ticks: Option<u64>,

    /// Run in real time rather than as fast as possible
    #[serde(default)]
    pub realtime: bool,

    /// Compass perturbation used for standalone runs
    #[serde(default)]
    pub magnet: Option<MagnetSpec>,

    #[serde(default)]
    pub automaton: AutomatonParams,

    #[serde(default)]
    pub sim: SimParams,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ExecParams {
    /// Time between two ticks.
    pub fn step_size_s(&self) -> f64 {
        1.0 / self.frequency_hz
    }
}

impl Default for ExecParams {
    fn default() -> Self {
        Self {
            frequency_hz: 1.0,
            default_speed: 1.0,
            max_ticks: None,
            realtime: false,
            magnet: None,
            automaton: AutomatonParams::default(),
            sim: SimParams::default(),
        }
    }
}
