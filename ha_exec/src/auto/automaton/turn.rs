//! # S3 - turn between the legs

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::tc::Command;
use log::debug;
use serde::{Deserialize, Serialize};

use super::{AutomatonParams, AutomatonState, Flags, Transition};
use crate::loc::Pose;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Turn on the spot until the heading has changed by the turn angle.
///
/// Possible transitions:
/// - S8 on an abort command,
/// - S4 once the turn angle is reached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Heading of the rover when the turn started, in degrees.
    pub start_heading_deg: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Turn {
    pub fn new(start_heading_deg: f64) -> Self {
        Self { start_heading_deg }
    }

    /// Heading change since the start of the turn, measured as set in the parameters.
    pub fn delta_deg(&self, params: &AutomatonParams, pose: &Pose) -> f64 {
        params
            .heading_delta
            .measure(pose.heading_deg, self.start_heading_deg)
    }

    pub(super) fn step(
        &self,
        flags: Flags,
        params: &AutomatonParams,
        pose: &Pose,
        cmd: Option<Command>,
    ) -> Transition {
        if let Some(Command::Abort) = cmd {
            return Transition {
                next: AutomatonState::S8,
                flags: Flags {
                    autodrive: false,
                    check_position: false,
                    ..flags
                },
            };
        }

        let delta_deg = self.delta_deg(params, pose);

        if delta_deg >= params.turn_angle_deg {
            return Transition {
                next: AutomatonState::S4,
                flags: Flags {
                    update_compass: false,
                    update_gps: true,
                    ..flags
                },
            };
        }

        debug!("Degrees to heading: {:.3}", params.turn_angle_deg - delta_deg);

        Transition {
            next: AutomatonState::S3(*self),
            flags,
        }
    }
}
