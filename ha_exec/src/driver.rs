//! # Run driver
//!
//! The driver ticks the automaton against a vehicle at a fixed period. On each tick it:
//!
//! 1. samples the vehicle's pose and applies the magnet offset to the heading,
//! 2. records a [`Step`],
//! 3. commands the vehicle with the current motion intent scaled by the speed controller,
//! 4. stops if the automaton is terminal or the tick limit is reached,
//! 5. otherwise ticks the automaton with the next command and lets one period elapse.
//!
//! The recorded history is the only output of a run.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::tc::Command;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::{
    attack::{Magnet, SpeedController, StationaryMagnet},
    auto::automaton::{Automaton, AutomatonError},
    loc::{Pose, PoseSample, PoseSource},
    msgs::{RunOutcome, RunResult, Step},
};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A vehicle the driver can command.
pub trait Vehicle: PoseSource {
    /// Demand a linear velocity and an angular rate.
    fn command(&mut self, velocity: f64, omega: f64);

    /// Let one control period elapse.
    ///
    /// A simulated vehicle integrates its model over the period, a real one returns immediately.
    fn wait(&mut self, period_s: f64);
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the [`Driver`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverParams {
    /// Stop the run after this many ticks of the automaton.
    pub max_ticks: Option<u64>,

    /// Pad each period with a sleep so that the run proceeds at wall-clock speed.
    pub realtime: bool,

    /// Number of times a non-finite pose is re-sampled before the run is failed.
    pub max_pose_retries: u32,
}

/// Drives an [`Automaton`] against a [`Vehicle`].
pub struct Driver {
    automaton: Automaton,

    params: DriverParams,

    magnet: Box<dyn Magnet>,

    speed: Box<dyn SpeedController>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur during a run.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("No pose is available from the vehicle")]
    PoseUnavailable,

    #[error("The perceived pose was not finite after {0} retries")]
    NonFinitePose(u32),

    #[error("Automaton error: {0}")]
    AutomatonError(AutomatonError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for DriverParams {
    fn default() -> Self {
        Self {
            max_ticks: None,
            realtime: false,
            max_pose_retries: 3,
        }
    }
}

impl Driver {
    /// Create a new driver with no magnet.
    pub fn new(automaton: Automaton, params: DriverParams, speed: Box<dyn SpeedController>) -> Self {
        Self {
            automaton,
            params,
            magnet: Box::new(StationaryMagnet { offset_deg: 0.0 }),
            speed,
        }
    }

    /// Use the given magnet for this driver.
    pub fn with_magnet(mut self, magnet: Box<dyn Magnet>) -> Self {
        self.magnet = magnet;
        self
    }

    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    /// Run until the automaton reaches a terminal state or the tick limit is hit.
    ///
    /// `commands` gives the command for each tick. Once exhausted no more commands are fed.
    pub fn run<V, I>(&mut self, vehicle: &mut V, commands: I) -> Result<RunResult, DriverError>
    where
        V: Vehicle,
        I: IntoIterator<Item = Option<Command>>,
    {
        let period_s = self.automaton.step_size_s();
        let mut commands = commands.into_iter();
        let mut history = Vec::new();

        info!(
            "Starting run, period {:.3} s, limit {:?} ticks",
            period_s, self.params.max_ticks
        );

        let outcome = loop {
            let cycle_start = Instant::now();

            let (sample, perceived) = self.perceive(vehicle)?;

            let intent = self.automaton.intent();
            let (velocity, omega) = intent.scaled(self.speed.speed(sample.time_s));
            vehicle.command(velocity, omega);

            let mut step = Step {
                time_s: sample.time_s,
                position_m: perceived.position_m,
                heading_deg: perceived.heading_deg,
                true_heading_deg: sample.pose.heading_deg,
                roll_deg: sample.roll_deg,
                state: self.automaton.current_state().clone(),
                intent,
                velocity,
                omega,
                cmd: None,
            };

            if self.automaton.is_terminal() {
                history.push(step);
                break RunOutcome::Terminal(self.automaton.current_state().id());
            }

            if let Some(max) = self.params.max_ticks {
                if self.automaton.tick_index() as u64 >= max {
                    warn!("Tick limit of {} reached before a terminal state", max);
                    history.push(step);
                    break RunOutcome::TickLimit;
                }
            }

            step.cmd = commands.next().flatten();

            debug!(
                "t = {:.3} s: {} ({}), cmd {:?}",
                step.time_s, step.state, intent, step.cmd
            );

            self.automaton
                .tick(&perceived, step.cmd)
                .map_err(DriverError::AutomatonError)?;
            history.push(step);

            vehicle.wait(period_s);

            if self.params.realtime {
                let period = util::time::seconds_to_std(period_s);
                if let Some(remaining) = period.checked_sub(cycle_start.elapsed()) {
                    std::thread::sleep(remaining);
                }
            }
        };

        info!(
            "Run ended after {} ticks: {:?}",
            self.automaton.tick_index(),
            outcome
        );

        Ok(RunResult { history, outcome })
    }

    /// Sample the vehicle and apply the magnet offset, re-sampling non-finite poses.
    fn perceive<V: Vehicle>(&self, vehicle: &mut V) -> Result<(PoseSample, Pose), DriverError> {
        let mut retries = 0;

        loop {
            let sample = vehicle.sample().ok_or(DriverError::PoseUnavailable)?;

            let perceived = Pose {
                heading_deg: sample.pose.heading_deg
                    + self.magnet.offset_deg(sample.time_s, &sample.pose),
                ..sample.pose
            };

            if perceived.is_finite() {
                return Ok((sample, perceived));
            }

            if retries >= self.params.max_pose_retries {
                return Err(DriverError::NonFinitePose(retries));
            }

            retries += 1;
            warn!(
                "Non-finite pose {:?}, re-sampling ({}/{})",
                perceived, retries, self.params.max_pose_retries
            );
            vehicle.wait(self.automaton.step_size_s());
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        attack::{FixedSpeed, MagnetSpec},
        auto::automaton::{replay, AutomatonParams, AutomatonState, MotionIntent, StateId},
        loc::PoseHolder,
        sim::{SimParams, SimRover},
    };
    use std::iter;

    /// At 1.5 m/s and 30 deg/s every guard is passed well clear of its threshold: the legs take
    /// 6 steps and the turn 4.
    const SPEED: f64 = 1.5;

    fn driver(max_ticks: Option<u64>) -> Driver {
        Driver::new(
            Automaton::new(AutomatonParams::default(), 1.0).unwrap(),
            DriverParams {
                max_ticks,
                ..Default::default()
            },
            Box::new(FixedSpeed { speed: SPEED }),
        )
    }

    fn sim() -> SimRover {
        SimRover::new(SimParams::default())
    }

    fn ids(result: &RunResult) -> Vec<StateId> {
        result.history.iter().map(|s| s.state.id()).collect()
    }

    /// Offset of zero until `at_s`, then `offset_deg`.
    struct StepMagnet {
        at_s: f64,
        offset_deg: f64,
    }

    impl Magnet for StepMagnet {
        fn offset_deg(&self, time_s: f64, _pose: &Pose) -> f64 {
            if time_s >= self.at_s {
                self.offset_deg
            } else {
                0.0
            }
        }
    }

    #[test]
    fn test_survey_completes() {
        let mut d = driver(Some(200));
        let mut rov = sim();

        let result = d.run(&mut rov, iter::repeat(None)).unwrap();

        assert_eq!(result.outcome, RunOutcome::Terminal(StateId::S6));
        assert_eq!(result.final_state(), Some(&AutomatonState::S6));

        // Waited at the origin for 6 steps
        for s in &result.history[..6] {
            assert_eq!(s.state.id(), StateId::S1);
            assert_eq!(s.intent, MotionIntent::Stop);
            assert_eq!(s.position_m, [0.0, 0.0, 0.0]);
        }

        let mut visited = ids(&result);
        assert_eq!(visited.len(), 24);
        visited.dedup();
        assert_eq!(
            visited,
            vec![
                StateId::S1,
                StateId::S2,
                StateId::S3,
                StateId::S4,
                StateId::S5,
                StateId::S6
            ]
        );

        // The second leg covered the leg distance from where it started
        let n = result.history.len();
        match &result.history[n - 2].state {
            AutomatonState::S5(leg) => {
                let end = Pose::new(result.history[n - 1].position_m, 0.0);
                assert!(leg.distance_m(&end) >= 7.0);
            }
            s => panic!("Expected S5 before the end, found {}", s),
        }
        assert!(rov.pose().heading_deg >= 70.0);

        // Every step but the last was a tick
        assert_eq!(d.automaton().tick_index(), n - 1);

        // The recorded demands follow the intents
        for s in &result.history {
            assert_eq!((s.velocity, s.omega), s.intent.scaled(SPEED));
        }
    }

    #[test]
    fn test_abort_first_leg() {
        let mut d = driver(Some(200));
        let mut rov = sim();

        let mut cmds = vec![None; 8];
        cmds.push(Some(Command::Abort));

        let result = d.run(&mut rov, cmds).unwrap();

        assert_eq!(result.outcome, RunOutcome::Terminal(StateId::S6));
        assert_eq!(result.history.len(), 10);
        assert_eq!(result.history[8].state.id(), StateId::S2);
        assert_eq!(result.history[8].cmd, Some(Command::Abort));
        assert!(rov.pose().position_m[0] < 7.0);
    }

    #[test]
    fn test_abort_turn_then_continue() {
        let mut d = driver(Some(200));
        let mut rov = sim();

        // Abort on the first turn step
        let mut cmds = vec![None; 12];
        cmds.push(Some(Command::Abort));
        cmds.push(None);
        cmds.push(Some(Command::Continue));

        let result = d.run(&mut rov, cmds).unwrap();

        let ids = ids(&result);
        assert_eq!(ids.len(), 16);
        assert_eq!(ids[11], StateId::S2);
        assert_eq!(ids[12], StateId::S3);
        assert_eq!(ids[13], StateId::S8);
        assert_eq!(ids[14], StateId::S7);
        assert_eq!(result.outcome, RunOutcome::Terminal(StateId::S9));
    }

    #[test]
    fn test_aborted_without_continue_stops() {
        let mut d = driver(Some(200));
        let mut rov = sim();

        let mut cmds = vec![None; 12];
        cmds.push(Some(Command::Abort));

        let result = d.run(&mut rov, cmds).unwrap();

        assert_eq!(result.outcome, RunOutcome::Terminal(StateId::S6));
        assert_eq!(ids(&result)[14], StateId::S7);
    }

    #[test]
    fn test_tick_limit() {
        let mut d = driver(Some(4));
        let mut rov = sim();

        let result = d.run(&mut rov, iter::repeat(None)).unwrap();

        assert_eq!(result.outcome, RunOutcome::TickLimit);
        assert_eq!(result.history.len(), 5);
        assert_eq!(d.automaton().tick_index(), 4);
    }

    #[test]
    fn test_magnet_offsets_perceived_heading() {
        let mut d =
            driver(Some(10)).with_magnet(MagnetSpec::Stationary { offset_deg: 15.0 }.build());
        let mut rov = sim();

        let result = d.run(&mut rov, iter::repeat(None)).unwrap();

        for s in &result.history {
            assert_eq!(s.heading_deg, s.true_heading_deg + 15.0);
        }
    }

    /// A compass offset appearing during the turn makes the automaton believe the turn is done
    /// while the rover has physically turned less than the turn angle.
    #[test]
    fn test_magnet_cuts_turn_short() {
        let nominal = driver(Some(200))
            .run(&mut sim(), iter::repeat(None))
            .unwrap();

        let mut d = driver(Some(200)).with_magnet(Box::new(StepMagnet {
            at_s: 13.0,
            offset_deg: 80.0,
        }));
        let attacked = d.run(&mut sim(), iter::repeat(None)).unwrap();

        let turn_steps = |r: &RunResult| ids(r).iter().filter(|i| **i == StateId::S3).count();
        assert_eq!(turn_steps(&nominal), 4);
        assert_eq!(turn_steps(&attacked), 2);

        let turned_deg = |r: &RunResult| {
            r.history
                .iter()
                .find(|s| s.state.id() == StateId::S4)
                .map(|s| s.true_heading_deg)
                .unwrap()
        };
        assert!(turned_deg(&nominal) >= 70.0);
        assert!(turned_deg(&attacked) < 70.0);
    }

    #[test]
    fn test_pose_unavailable() {
        struct Parked(PoseHolder);

        impl PoseSource for Parked {
            fn sample(&self) -> Option<PoseSample> {
                self.0.sample()
            }
        }

        impl Vehicle for Parked {
            fn command(&mut self, _velocity: f64, _omega: f64) {}
            fn wait(&mut self, _period_s: f64) {}
        }

        let mut d = driver(Some(10));
        let mut parked = Parked(PoseHolder::new());

        assert!(matches!(
            d.run(&mut parked, iter::repeat(None)),
            Err(DriverError::PoseUnavailable)
        ));

        // Non-finite poses are re-sampled then reported
        parked.0.set(PoseSample {
            time_s: 0.0,
            pose: Pose::new([f64::NAN, 0.0, 0.0], 0.0),
            roll_deg: 0.0,
        });
        assert!(matches!(
            d.run(&mut parked, iter::repeat(None)),
            Err(DriverError::NonFinitePose(3))
        ));
        assert!(d.automaton().history().is_empty());
    }

    #[test]
    fn test_replay_recorded_run() {
        let mut d = driver(Some(200));
        let mut rov = sim();

        let mut cmds = vec![None; 19];
        cmds.push(Some(Command::Abort));
        cmds.push(Some(Command::Continue));

        let result = d.run(&mut rov, cmds).unwrap();
        assert_eq!(result.outcome, RunOutcome::Terminal(StateId::S9));

        let replayed = replay(AutomatonParams::default(), 1.0, result.tick_inputs()).unwrap();

        assert_eq!(replayed.history(), d.automaton().history());
        assert_eq!(replayed.current_state(), d.automaton().current_state());

        let states: Vec<&AutomatonState> = result.history.iter().map(|s| &s.state).collect();
        let replayed_states: Vec<&AutomatonState> = replayed
            .history()
            .iter()
            .chain(iter::once(replayed.current_state()))
            .collect();
        assert_eq!(states, replayed_states);
    }
}
