//! # Simulation parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::loc::Pose;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the [`super::SimRover`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Integration sub-step, a control period is split into steps no longer than this.
    pub sub_step_s: f64,

    /// Heading rate in degrees per second for a unit angular demand.
    pub turn_rate_deg_s: f64,

    /// Pose of the rover at the start of a run.
    pub initial_pose: Pose,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SimParams {
    fn default() -> Self {
        Self {
            sub_step_s: 0.01,
            turn_rate_deg_s: 20.0,
            initial_pose: Pose::default(),
        }
    }
}
