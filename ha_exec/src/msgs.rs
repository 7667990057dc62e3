//! # Run messages
//!
//! Messages exchanged between the control server and its clients, and the records produced by a
//! run. All messages are serialized as JSON.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::tc::Command;
use serde::{Deserialize, Serialize};
use util::script::CommandScript;

use crate::{
    attack::{MagnetSpec, SpeedSpec},
    auto::automaton::{AutomatonState, MotionIntent, StateId},
    loc::{Pose, Position},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Request to start a run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Start {
    /// Commands scheduled by tick index, ticks which are not listed get no command.
    pub commands: CommandScript,

    /// Compass perturbation, none if not given.
    pub magnet: Option<MagnetSpec>,

    /// Speed controller, the server's default speed if not given.
    pub speed: Option<SpeedSpec>,

    /// Maximum number of ticks, overrides the server's limit if given.
    pub max_ticks: Option<u64>,
}

/// One entry of a run's history.
///
/// Recorded before the automaton is ticked, so `state` and `intent` are those the vehicle was
/// commanded with during this step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Time of the pose sample.
    pub time_s: f64,

    pub position_m: Position,

    /// Heading perceived by the automaton, including any magnet offset.
    pub heading_deg: f64,

    /// Heading of the vehicle as sampled.
    pub true_heading_deg: f64,

    pub roll_deg: f64,

    pub state: AutomatonState,

    pub intent: MotionIntent,

    /// Velocity demand sent to the vehicle.
    pub velocity: f64,

    /// Angular demand sent to the vehicle.
    pub omega: f64,

    /// Command fed to the automaton at the end of this step.
    pub cmd: Option<Command>,
}

/// The result of a complete run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Every step of the run. All steps but the last were followed by a tick of the automaton.
    pub history: Vec<Step>,

    pub outcome: RunOutcome,
}

/// Flat form of a [`Step`] written to the CSV archives.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub time: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub heading: f64,
    pub roll: f64,
    pub state: StateId,
    pub action: MotionIntent,
    pub linear: f64,
    pub angular: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// The automaton reached the given terminal state.
    Terminal(StateId),

    /// The tick limit was reached first.
    TickLimit,
}

/// Response of the control server to a [`Start`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CtrlResponse {
    Result(RunResult),
    Error(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Step {
    /// The pose the automaton perceived during this step.
    pub fn perceived_pose(&self) -> Pose {
        Pose::new(self.position_m, self.heading_deg)
    }

    pub fn to_record(&self) -> StepRecord {
        StepRecord {
            time: self.time_s,
            x: self.position_m[0],
            y: self.position_m[1],
            z: self.position_m[2],
            heading: self.heading_deg,
            roll: self.roll_deg,
            state: self.state.id(),
            action: self.intent,
            linear: self.velocity,
            angular: self.omega,
        }
    }
}

impl RunResult {
    /// The final state of the run.
    pub fn final_state(&self) -> Option<&AutomatonState> {
        self.history.last().map(|s| &s.state)
    }

    /// The (pose, command) inputs the automaton was ticked with, in order.
    ///
    /// Feeding these to [`crate::auto::automaton::replay`] rebuilds the run's state history.
    pub fn tick_inputs(&self) -> Vec<(Pose, Option<Command>)> {
        let num_ticks = self.history.len().saturating_sub(1);

        self.history[..num_ticks]
            .iter()
            .map(|s| (s.perceived_pose(), s.cmd))
            .collect()
    }
}
