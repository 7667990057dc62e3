//! # S2 and S5 - straight drive legs
//!
//! Both legs measure the straight-line distance from the position captured when the leg was
//! entered. The distance is never accumulated tick by tick.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::tc::Command;
use log::debug;
use serde::{Deserialize, Serialize};

use super::{turn::Turn, AutomatonParams, AutomatonState, Flags, Transition};
use crate::loc::{Pose, Position};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A drive leg.
///
/// Possible transitions from the first leg (S2):
/// - S6 on an abort command,
/// - S3 once the leg distance is reached.
///
/// Possible transitions from the second leg (S5):
/// - S7 on an abort command,
/// - S6 once the leg distance is reached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Drive {
    /// Position of the rover when the leg started.
    pub start_position_m: Position,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Drive {
    pub fn new(start_position_m: Position) -> Self {
        Self { start_position_m }
    }

    /// Straight line distance between the leg's start and the given pose.
    pub fn distance_m(&self, pose: &Pose) -> f64 {
        util::maths::euclidean_distance(&self.start_position_m, &pose.position_m)
    }

    /// Step the first leg (S2).
    pub(super) fn step_first_leg(
        &self,
        flags: Flags,
        params: &AutomatonParams,
        pose: &Pose,
        cmd: Option<Command>,
    ) -> Transition {
        if let Some(Command::Abort) = cmd {
            return Transition {
                next: AutomatonState::S6,
                flags: Flags {
                    autodrive: false,
                    check_position: false,
                    ..flags
                },
            };
        }

        let distance_m = self.distance_m(pose);

        if distance_m >= params.leg_distance_m {
            return Transition {
                next: AutomatonState::S3(Turn::new(pose.heading_deg)),
                flags: Flags {
                    check_position: false,
                    update_compass: true,
                    ..flags
                },
            };
        }

        debug!("Remaining distance: {:.3} m", params.leg_distance_m - distance_m);

        Transition {
            next: AutomatonState::S2(*self),
            flags,
        }
    }

    /// Step the second leg (S5).
    pub(super) fn step_second_leg(
        &self,
        flags: Flags,
        params: &AutomatonParams,
        pose: &Pose,
        cmd: Option<Command>,
    ) -> Transition {
        if let Some(Command::Abort) = cmd {
            return Transition {
                next: AutomatonState::S7,
                flags: Flags {
                    autodrive: false,
                    check_position: false,
                    ..flags
                },
            };
        }

        let distance_m = self.distance_m(pose);

        if distance_m >= params.leg_distance_m {
            return Transition {
                next: AutomatonState::S6,
                flags: Flags {
                    autodrive: false,
                    r#move: false,
                    ..flags
                },
            };
        }

        debug!("Remaining distance: {:.3} m", params.leg_distance_m - distance_m);

        Transition {
            next: AutomatonState::S5(*self),
            flags,
        }
    }
}
