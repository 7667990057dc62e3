//! # Localisation module
//!
//! Provides the pose of the rover to the control loop. A pose is only ever handled as a complete
//! snapshot: position, heading, roll and timestamp are read together so a reader can never see a
//! half-updated pose while a transport thread is writing a new one.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// A position in the world frame, (x, y, z) in meters.
pub type Position = [f64; 3];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The part of the rover's pose read by the automaton guards.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    /// The position in the world frame
    pub position_m: Position,

    /// The heading of the rover in degrees, 0 along the world X axis
    pub heading_deg: f64,
}

/// A timestamped pose snapshot as produced by a pose source.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PoseSample {
    /// Time the sample was taken, in seconds from the start of the run
    pub time_s: f64,

    pub pose: Pose,

    /// Roll of the rover in degrees. Recorded but never used by a guard.
    pub roll_deg: f64,
}

/// Shared holder for the latest pose sample.
///
/// One side (for example a transport thread) calls [`PoseHolder::set`], the control loop calls
/// [`PoseSource::sample`]. Clones share the same sample.
#[derive(Debug, Clone, Default)]
pub struct PoseHolder {
    sample: Arc<Mutex<Option<PoseSample>>>,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A provider of pose snapshots.
pub trait PoseSource {
    /// Get the latest pose snapshot, or `None` if no pose has been received yet.
    fn sample(&self) -> Option<PoseSample>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    pub fn new(position_m: Position, heading_deg: f64) -> Self {
        Self {
            position_m,
            heading_deg,
        }
    }

    /// True if every coordinate and the heading are finite.
    pub fn is_finite(&self) -> bool {
        util::maths::is_finite_point(&self.position_m) && self.heading_deg.is_finite()
    }
}

impl PoseHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held sample.
    pub fn set(&self, sample: PoseSample) {
        let mut s = self
            .sample
            .lock()
            .expect("PoseHolder: sample mutex poisoned");

        *s = Some(sample);
    }
}

impl PoseSource for PoseHolder {
    fn sample(&self) -> Option<PoseSample> {
        *self
            .sample
            .lock()
            .expect("PoseHolder: sample mutex poisoned")
    }
}
