//! # Hybrid automaton library.
//!
//! This library allows other crates in the workspace (and the benches) to access items defined
//! inside the hybrid automaton crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Attack models - heading perturbations and speed controllers applied by the driver
pub mod attack;

/// Autonomy module - the survey automaton
pub mod auto;

/// Control server - runs surveys on request from a client
pub mod ctrl_server;

/// Run driver - ticks the automaton against a vehicle
pub mod driver;

/// Localisation module - provides the rover with an idea of where it is in the world
pub mod loc;

/// Messages exchanged with the control server and written to the archives
pub mod msgs;

/// Executable parameters
pub mod params;

/// Simulation - a kinematic model of the rover
pub mod sim;
