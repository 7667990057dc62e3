//! # Data-free states
//!
//! S4 and S8 last a single tick, S7 waits one tick for a continue command, S6 and S9 are
//! terminal.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::tc::Command;

use super::{drive::Drive, AutomatonState, Flags, Transition};
use crate::loc::Pose;

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// S4: refresh the GPS fix and start the second leg from the current position.
pub(super) fn step_gps_refresh(flags: Flags, pose: &Pose) -> Transition {
    Transition {
        next: AutomatonState::S5(Drive::new(pose.position_m)),
        flags: Flags {
            update_gps: false,
            r#move: true,
            ..flags
        },
    }
}

/// S8: let an aborted turn settle before moving off.
pub(super) fn step_abort_settle(flags: Flags) -> Transition {
    Transition {
        next: AutomatonState::S7,
        flags: Flags {
            r#move: true,
            update_compass: false,
            ..flags
        },
    }
}

/// S7: aborted but still movable, a continue command ends in S9, anything else in S6.
pub(super) fn step_aborted(flags: Flags, cmd: Option<Command>) -> Transition {
    match cmd {
        Some(Command::Continue) => Transition {
            next: AutomatonState::S9,
            flags: Flags {
                r#move: false,
                ..flags
            },
        },
        _ => Transition {
            next: AutomatonState::S6,
            flags: Flags {
                r#move: false,
                ..flags
            },
        },
    }
}
