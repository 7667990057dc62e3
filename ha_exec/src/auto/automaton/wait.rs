//! # S1 - wait before driving

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use serde::{Deserialize, Serialize};

use super::{drive::Drive, AutomatonParams, AutomatonState, Flags, Transition};
use crate::loc::Pose;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Waiting state, the rover is stationary until the wait time has elapsed.
///
/// Possible transitions:
/// - S2, once the elapsed time reaches the wait time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Wait {
    /// Number of ticks spent waiting so far.
    pub ticks: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Wait {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time spent waiting, in seconds.
    ///
    /// Computed from the tick count rather than accumulated so that steps such as 0.1 s do not
    /// drift below the wait time.
    pub fn elapsed_s(&self, step_size_s: f64) -> f64 {
        self.ticks as f64 * step_size_s
    }

    pub(super) fn step(
        &self,
        flags: Flags,
        params: &AutomatonParams,
        step_size_s: f64,
        pose: &Pose,
    ) -> Transition {
        let elapsed_s = self.elapsed_s(step_size_s);

        if elapsed_s >= params.wait_time_s {
            return Transition {
                next: AutomatonState::S2(Drive::new(pose.position_m)),
                flags: Flags {
                    autodrive: true,
                    ..flags
                },
            };
        }

        trace!("Waited {:.3} s of {:.3} s", elapsed_s, params.wait_time_s);

        Transition {
            next: AutomatonState::S1(Wait {
                ticks: self.ticks + 1,
            }),
            flags,
        }
    }
}
