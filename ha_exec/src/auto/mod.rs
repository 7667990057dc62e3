//! # Autonomy Module
//!
//! This module provides the autonomy of the rover, the hybrid automaton which decides when to
//! drive, turn and stop during a survey run.

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use automaton::{Automaton, AutomatonError, AutomatonParams, AutomatonState, MotionIntent};

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Automaton module - the survey state machine
pub mod automaton;
