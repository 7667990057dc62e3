//! # Automaton module
//!
//! This module implements the [`Automaton`], the hybrid state machine that drives the rover around
//! the survey pattern: wait, drive a leg, turn, drive a second leg, stop. External commands can cut
//! the pattern short.
//!
//! | State | Intent | Leaves on                                   |
//! |-------|--------|---------------------------------------------|
//! | S1    | stop   | elapsed >= wait time -> S2                  |
//! | S2    | drive  | abort -> S6, distance >= leg -> S3          |
//! | S3    | turn   | abort -> S8, heading delta >= angle -> S4   |
//! | S4    | turn   | next tick -> S5                             |
//! | S5    | drive  | abort -> S7, distance >= leg -> S6          |
//! | S6    | stop   | terminal                                    |
//! | S7    | drive  | continue -> S9, otherwise -> S6             |
//! | S8    | turn   | next tick -> S7                             |
//! | S9    | stop   | terminal                                    |
//!
//! The automaton is purely reactive, each call to [`Automaton::tick`] is a function of the current
//! state, the pose sample and the command. States are values: a tick builds the next state and the
//! previous one is moved into the history.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod drive;
mod flags;
mod intent;
mod params;
mod transit;
mod turn;
mod wait;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use self::{
    drive::Drive,
    flags::{Flags, StateId},
    intent::{Direction, MotionIntent},
    params::{AutomatonParams, HeadingDelta},
    turn::Turn,
    wait::Wait,
};

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::tc::Command;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use util::raise_error;

use crate::loc::{Pose, Position};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The survey automaton.
///
/// Owns the current state and the append-only history of every state it has left.
#[derive(Debug, Clone)]
pub struct Automaton {
    params: AutomatonParams,

    /// Fixed time between two ticks.
    step_size_s: f64,

    state: AutomatonState,

    history: Vec<AutomatonState>,
}

/// Result of stepping a state, the next state along with the flags the transition produced.
///
/// The flags are built by changing only the flags named by the transition, starting from the
/// current state's flags, and must land exactly on the next state's own combination.
#[derive(Debug)]
pub(crate) struct Transition {
    pub next: AutomatonState,
    pub flags: Flags,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors that can occur in the automaton.
#[derive(Debug, thiserror::Error)]
pub enum AutomatonError {
    #[error("Step size must be finite and greater than zero, found {0}")]
    InvalidStepSize(f64),

    #[error("Pose sample is not finite (position {0:?}, heading {1}), state not advanced")]
    NonFinitePose(Position, f64),
}

/// The states of the automaton.
///
/// See the module documentation for the transition table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "id")]
pub enum AutomatonState {
    /// Waiting before the first leg.
    S1(Wait),

    /// First drive leg.
    S2(Drive),

    /// Turn between the legs.
    S3(Turn),

    /// GPS refresh, single tick.
    S4,

    /// Second drive leg.
    S5(Drive),

    /// Stopped, terminal.
    S6,

    /// Aborted, still movable.
    S7,

    /// Aborted turn settling, single tick.
    S8,

    /// Stopped after an abort and continue, terminal.
    S9,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Automaton {
    /// Create a new automaton in S1 with the default flags.
    pub fn new(params: AutomatonParams, step_size_s: f64) -> Result<Self, AutomatonError> {
        if !step_size_s.is_finite() || step_size_s <= 0.0 {
            return Err(AutomatonError::InvalidStepSize(step_size_s));
        }

        Ok(Self {
            params,
            step_size_s,
            state: AutomatonState::S1(Wait::new()),
            history: Vec::new(),
        })
    }

    /// Advance the automaton by one tick.
    ///
    /// Returns the motion intent of the new current state. If the pose is not finite an error is
    /// returned and neither the state nor the history change.
    pub fn tick(
        &mut self,
        pose: &Pose,
        cmd: Option<Command>,
    ) -> Result<MotionIntent, AutomatonError> {
        if !pose.is_finite() {
            return Err(AutomatonError::NonFinitePose(
                pose.position_m,
                pose.heading_deg,
            ));
        }

        let from = self.state.id();

        if let Some(c) = cmd {
            if !self.state.accepts(c) {
                warn!("Command {} has no effect in {}", c, from);
            }
        }

        let transition = self
            .state
            .step(&self.params, self.step_size_s, pose, cmd);

        let to = check_transition(from, &transition);

        if from != to {
            info!("{} -> {} (flags {})", from, to, transition.flags);
        }

        let prev = std::mem::replace(&mut self.state, transition.next);
        self.history.push(prev);

        Ok(self.state.intent())
    }

    /// The current state.
    pub fn current_state(&self) -> &AutomatonState {
        &self.state
    }

    /// Every state the automaton has left, oldest first.
    pub fn history(&self) -> &[AutomatonState] {
        &self.history
    }

    /// Motion intent of the current state.
    pub fn intent(&self) -> MotionIntent {
        self.state.intent()
    }

    /// Flags asserted by the current state.
    pub fn flags(&self) -> Flags {
        self.state.flags()
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Number of ticks performed so far.
    pub fn tick_index(&self) -> usize {
        self.history.len()
    }

    pub fn step_size_s(&self) -> f64 {
        self.step_size_s
    }

    pub fn params(&self) -> &AutomatonParams {
        &self.params
    }
}

impl AutomatonState {
    pub fn id(&self) -> StateId {
        match self {
            AutomatonState::S1(_) => StateId::S1,
            AutomatonState::S2(_) => StateId::S2,
            AutomatonState::S3(_) => StateId::S3,
            AutomatonState::S4 => StateId::S4,
            AutomatonState::S5(_) => StateId::S5,
            AutomatonState::S6 => StateId::S6,
            AutomatonState::S7 => StateId::S7,
            AutomatonState::S8 => StateId::S8,
            AutomatonState::S9 => StateId::S9,
        }
    }

    pub fn flags(&self) -> Flags {
        self.id().flags()
    }

    pub fn is_terminal(&self) -> bool {
        self.id().is_terminal()
    }

    pub fn intent(&self) -> MotionIntent {
        match self {
            AutomatonState::S2(_) | AutomatonState::S5(_) | AutomatonState::S7 => {
                MotionIntent::Drive
            }
            AutomatonState::S3(_) | AutomatonState::S4 | AutomatonState::S8 => MotionIntent::Turn,
            AutomatonState::S1(_) | AutomatonState::S6 | AutomatonState::S9 => MotionIntent::Stop,
        }
    }

    /// Returns true if the command changes the outcome of a step from this state.
    pub fn accepts(&self, cmd: Command) -> bool {
        match (self, cmd) {
            (AutomatonState::S2(_), Command::Abort)
            | (AutomatonState::S3(_), Command::Abort)
            | (AutomatonState::S5(_), Command::Abort)
            | (AutomatonState::S7, Command::Continue) => true,
            _ => false,
        }
    }

    fn step(
        &self,
        params: &AutomatonParams,
        step_size_s: f64,
        pose: &Pose,
        cmd: Option<Command>,
    ) -> Transition {
        let flags = self.flags();

        match self {
            AutomatonState::S1(wait) => wait.step(flags, params, step_size_s, pose),
            AutomatonState::S2(drive) => drive.step_first_leg(flags, params, pose, cmd),
            AutomatonState::S3(turn) => turn.step(flags, params, pose, cmd),
            AutomatonState::S4 => transit::step_gps_refresh(flags, pose),
            AutomatonState::S5(drive) => drive.step_second_leg(flags, params, pose, cmd),
            AutomatonState::S7 => transit::step_aborted(flags, cmd),
            AutomatonState::S8 => transit::step_abort_settle(flags),
            AutomatonState::S6 | AutomatonState::S9 => Transition {
                next: self.clone(),
                flags,
            },
        }
    }
}

impl Display for AutomatonState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AutomatonState::S1(w) => write!(f, "S1 (waited {} ticks)", w.ticks),
            AutomatonState::S2(d) | AutomatonState::S5(d) => {
                write!(f, "{} (from {:?})", self.id(), d.start_position_m)
            }
            AutomatonState::S3(t) => write!(f, "S3 (from {} deg)", t.start_heading_deg),
            _ => write!(f, "{}", self.id()),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Check that the flags produced by a transition are exactly those of the state it enters.
///
/// Returns the id of the entered state. A mismatch is a logic error and is fatal.
pub(crate) fn check_transition(from: StateId, transition: &Transition) -> StateId {
    let to = transition.next.id();

    if transition.flags != to.flags() {
        raise_error!(
            "Flag invariant violated on {} -> {}: transition produced {}, {} asserts {}",
            from,
            to,
            transition.flags,
            to,
            to.flags()
        );
    }

    to
}

/// Feed a tick-indexed sequence of inputs to a fresh automaton.
///
/// Equal inputs always give an equal history, so a recorded run can be checked by replaying it.
pub fn replay<I>(
    params: AutomatonParams,
    step_size_s: f64,
    inputs: I,
) -> Result<Automaton, AutomatonError>
where
    I: IntoIterator<Item = (Pose, Option<Command>)>,
{
    let mut automaton = Automaton::new(params, step_size_s)?;

    for (pose, cmd) in inputs {
        automaton.tick(&pose, cmd)?;
    }

    Ok(automaton)
}

#[cfg(test)]
mod test {
    use super::*;

    const ORIGIN: Pose = Pose {
        position_m: [0.0, 0.0, 0.0],
        heading_deg: 0.0,
    };

    fn automaton() -> Automaton {
        Automaton::new(AutomatonParams::default(), 1.0).unwrap()
    }

    /// Tick a fresh automaton at the origin until it enters S2.
    fn automaton_in_s2() -> Automaton {
        let mut a = automaton();
        for _ in 0..6 {
            a.tick(&ORIGIN, None).unwrap();
        }
        assert_eq!(a.current_state().id(), StateId::S2);
        a
    }

    fn automaton_in_s3(start_heading_deg: f64) -> Automaton {
        let mut a = automaton_in_s2();
        a.tick(&Pose::new([7.0, 0.0, 0.0], start_heading_deg), None)
            .unwrap();
        assert_eq!(
            a.current_state(),
            &AutomatonState::S3(Turn::new(start_heading_deg))
        );
        a
    }

    fn automaton_in_s5() -> Automaton {
        let mut a = automaton_in_s3(0.0);
        a.tick(&Pose::new([7.0, 0.0, 0.0], 70.0), None).unwrap();
        assert_eq!(a.current_state().id(), StateId::S4);
        a.tick(&Pose::new([7.0, 0.0, 0.0], 70.0), None).unwrap();
        assert_eq!(
            a.current_state(),
            &AutomatonState::S5(Drive::new([7.0, 0.0, 0.0]))
        );
        a
    }

    #[test]
    fn test_check_transition_accepts_table_flags() {
        let transition = Transition {
            next: AutomatonState::S3(Turn::new(0.0)),
            flags: Flags {
                check_position: false,
                update_compass: true,
                ..StateId::S2.flags()
            },
        };

        assert_eq!(check_transition(StateId::S2, &transition), StateId::S3);
    }

    #[test]
    #[should_panic(expected = "Flag invariant violated")]
    fn test_check_transition_mismatch_is_fatal() {
        let transition = Transition {
            next: AutomatonState::S3(Turn::new(0.0)),
            flags: Flags {
                check_position: true,
                ..StateId::S3.flags()
            },
        };

        check_transition(StateId::S2, &transition);
    }

    #[test]
    fn test_new() {
        let a = automaton();
        assert_eq!(a.current_state(), &AutomatonState::S1(Wait { ticks: 0 }));
        assert_eq!(a.flags(), Flags::default());
        assert_eq!(a.intent(), MotionIntent::Stop);
        assert!(a.history().is_empty());
        assert!(!a.is_terminal());

        assert!(matches!(
            Automaton::new(AutomatonParams::default(), 0.0),
            Err(AutomatonError::InvalidStepSize(_))
        ));
        assert!(matches!(
            Automaton::new(AutomatonParams::default(), f64::NAN),
            Err(AutomatonError::InvalidStepSize(_))
        ));
    }

    #[test]
    fn test_wait_time() {
        let mut a = automaton();

        // Five ticks accumulate 5 s of waiting but the guard is checked before counting
        for i in 0..5 {
            assert_eq!(a.tick(&ORIGIN, None).unwrap(), MotionIntent::Stop);
            assert_eq!(a.current_state(), &AutomatonState::S1(Wait { ticks: i + 1 }));
        }

        // Tick index 5, elapsed 5 s >= 5 s
        assert_eq!(a.tick(&ORIGIN, None).unwrap(), MotionIntent::Drive);
        assert_eq!(
            a.current_state(),
            &AutomatonState::S2(Drive::new([0.0, 0.0, 0.0]))
        );
        assert_eq!(a.history().len(), 6);
        assert!(a.flags().autodrive && a.flags().check_position);
    }

    #[test]
    fn test_wait_time_small_step() {
        let mut a = Automaton::new(AutomatonParams::default(), 0.1).unwrap();

        for _ in 0..50 {
            a.tick(&ORIGIN, None).unwrap();
        }
        assert_eq!(a.current_state().id(), StateId::S1);

        a.tick(&ORIGIN, None).unwrap();
        assert_eq!(a.current_state().id(), StateId::S2);
    }

    #[test]
    fn test_s1_ignores_commands() {
        let mut a = automaton();
        a.tick(&ORIGIN, Some(Command::Abort)).unwrap();
        assert_eq!(a.current_state(), &AutomatonState::S1(Wait { ticks: 1 }));
    }

    #[test]
    fn test_drive_threshold() {
        let mut a = automaton_in_s2();

        a.tick(&Pose::new([6.999, 0.0, 0.0], 0.0), None).unwrap();
        assert_eq!(a.current_state().id(), StateId::S2);

        assert_eq!(
            a.tick(&Pose::new([7.0, 0.0, 0.0], 5.0), None).unwrap(),
            MotionIntent::Turn
        );
        assert_eq!(a.current_state(), &AutomatonState::S3(Turn::new(5.0)));
        assert!(a.flags().update_compass && !a.flags().check_position);
    }

    #[test]
    fn test_drive_distance_from_entry_point() {
        let mut a = automaton();
        let start = Pose::new([2.0, 3.0, 0.0], 0.0);
        for _ in 0..6 {
            a.tick(&start, None).unwrap();
        }
        assert_eq!(
            a.current_state(),
            &AutomatonState::S2(Drive::new([2.0, 3.0, 0.0]))
        );

        // Going back and forth never adds up, only the distance from the entry point counts
        for x in [5.0, 2.0, 6.0, 2.0, 8.9].iter() {
            a.tick(&Pose::new([*x, 3.0, 0.0], 0.0), None).unwrap();
            assert_eq!(a.current_state().id(), StateId::S2);
        }

        // 3D norm, z counts too
        a.tick(&Pose::new([2.0, 3.0, 7.0], 0.0), None).unwrap();
        assert_eq!(a.current_state().id(), StateId::S3);
    }

    #[test]
    fn test_turn_threshold() {
        let mut a = automaton_in_s3(0.0);

        a.tick(&Pose::new([7.0, 0.0, 0.0], 69.999), None).unwrap();
        assert_eq!(a.current_state().id(), StateId::S3);

        assert_eq!(
            a.tick(&Pose::new([7.0, 0.0, 0.0], 70.0), None).unwrap(),
            MotionIntent::Turn
        );
        assert_eq!(a.current_state(), &AutomatonState::S4);
        assert!(a.flags().update_gps && !a.flags().update_compass);
    }

    #[test]
    fn test_turn_uses_absolute_delta() {
        let mut a = automaton_in_s3(10.0);

        // Turning the other way counts the same
        a.tick(&Pose::new([7.0, 0.0, 0.0], -60.0), None).unwrap();
        assert_eq!(a.current_state().id(), StateId::S4);
    }

    /// Headings are not wrapped by default. A rover starting at 170 deg that turns 20 deg
    /// through the boundary reads -170 deg, a 340 deg delta, and leaves the turn early.
    #[test]
    fn test_turn_wraparound_unnormalised() {
        let mut a = automaton_in_s3(170.0);

        a.tick(&Pose::new([7.0, 0.0, 0.0], -170.0), None).unwrap();
        assert_eq!(a.current_state().id(), StateId::S4);
    }

    #[test]
    fn test_turn_wraparound_wrapped() {
        let params = AutomatonParams {
            heading_delta: HeadingDelta::Wrapped,
            ..Default::default()
        };
        let inputs = vec![(ORIGIN, None); 6]
            .into_iter()
            .chain(vec![(Pose::new([7.0, 0.0, 0.0], 170.0), None)]);
        let mut a = replay(params, 1.0, inputs).unwrap();
        assert_eq!(a.current_state(), &AutomatonState::S3(Turn::new(170.0)));

        // 20 deg through the boundary is not enough
        a.tick(&Pose::new([7.0, 0.0, 0.0], -170.0), None).unwrap();
        assert_eq!(a.current_state().id(), StateId::S3);

        // 70 deg through the boundary is
        a.tick(&Pose::new([7.0, 0.0, 0.0], -120.0), None).unwrap();
        assert_eq!(a.current_state().id(), StateId::S4);
    }

    #[test]
    fn test_gps_refresh_captures_position() {
        let mut a = automaton_in_s3(0.0);
        a.tick(&Pose::new([7.0, 0.0, 0.0], 75.0), None).unwrap();

        // Unconditional, even with an abort command
        assert_eq!(
            a.tick(&Pose::new([7.1, 0.2, 0.0], 80.0), Some(Command::Abort))
                .unwrap(),
            MotionIntent::Drive
        );
        assert_eq!(
            a.current_state(),
            &AutomatonState::S5(Drive::new([7.1, 0.2, 0.0]))
        );
        assert!(a.flags().r#move && a.flags().autodrive);
    }

    #[test]
    fn test_second_leg_completes() {
        let mut a = automaton_in_s5();

        a.tick(&Pose::new([7.0, 6.999, 0.0], 90.0), None).unwrap();
        assert_eq!(a.current_state().id(), StateId::S5);

        assert_eq!(
            a.tick(&Pose::new([7.0, 7.0, 0.0], 90.0), None).unwrap(),
            MotionIntent::Stop
        );
        assert_eq!(a.current_state(), &AutomatonState::S6);
        assert!(a.is_terminal());
        assert_eq!(a.flags(), Flags::CLEAR);
    }

    #[test]
    fn test_abort_first_leg() {
        let mut a = automaton_in_s2();

        // Abort wins even when the distance guard would also fire
        assert_eq!(
            a.tick(&Pose::new([9.0, 0.0, 0.0], 0.0), Some(Command::Abort))
                .unwrap(),
            MotionIntent::Stop
        );
        assert_eq!(a.current_state(), &AutomatonState::S6);
    }

    #[test]
    fn test_abort_second_leg() {
        let mut a = automaton_in_s5();

        assert_eq!(
            a.tick(&Pose::new([7.0, 9.0, 0.0], 90.0), Some(Command::Abort))
                .unwrap(),
            MotionIntent::Drive
        );
        assert_eq!(a.current_state(), &AutomatonState::S7);
        assert_eq!(
            a.flags(),
            Flags {
                r#move: true,
                ..Flags::CLEAR
            }
        );
    }

    #[test]
    fn test_continue_in_drive_has_no_effect() {
        let mut a = automaton_in_s2();
        a.tick(&ORIGIN, Some(Command::Continue)).unwrap();
        assert_eq!(a.current_state().id(), StateId::S2);
    }

    #[test]
    fn test_abort_turn() {
        let mut a = automaton_in_s3(0.0);

        assert_eq!(
            a.tick(&Pose::new([7.0, 0.0, 0.0], 10.0), Some(Command::Abort))
                .unwrap(),
            MotionIntent::Turn
        );
        assert_eq!(a.current_state(), &AutomatonState::S8);

        // Settle is unconditional
        assert_eq!(
            a.tick(&Pose::new([7.0, 0.0, 0.0], 12.0), None).unwrap(),
            MotionIntent::Drive
        );
        assert_eq!(a.current_state(), &AutomatonState::S7);
    }

    #[test]
    fn test_aborted_continue() {
        let mut a = automaton_in_s5();
        a.tick(&ORIGIN, Some(Command::Abort)).unwrap();

        assert_eq!(
            a.tick(&ORIGIN, Some(Command::Continue)).unwrap(),
            MotionIntent::Stop
        );
        assert_eq!(a.current_state(), &AutomatonState::S9);
        assert_eq!(a.flags(), Flags::CLEAR);
        assert!(a.is_terminal());
    }

    #[test]
    fn test_aborted_without_continue() {
        for cmd in [None, Some(Command::Abort)].iter() {
            let mut a = automaton_in_s5();
            a.tick(&ORIGIN, Some(Command::Abort)).unwrap();

            a.tick(&ORIGIN, *cmd).unwrap();
            assert_eq!(a.current_state(), &AutomatonState::S6);
        }
    }

    #[test]
    fn test_terminal_self_loop() {
        let mut a = automaton_in_s2();
        a.tick(&ORIGIN, Some(Command::Abort)).unwrap();
        let len = a.history().len();

        for cmd in [None, Some(Command::Abort), Some(Command::Continue)].iter() {
            assert_eq!(a.tick(&ORIGIN, *cmd).unwrap(), MotionIntent::Stop);
            assert_eq!(a.current_state(), &AutomatonState::S6);
        }

        assert_eq!(a.history().len(), len + 3);
        assert!(a.history()[len..].iter().all(|s| s == &AutomatonState::S6));
    }

    #[test]
    fn test_non_finite_pose() {
        let mut a = automaton_in_s2();
        let state = a.current_state().clone();
        let len = a.history().len();

        let bad = Pose::new([f64::NAN, 0.0, 0.0], 0.0);
        assert!(matches!(
            a.tick(&bad, None),
            Err(AutomatonError::NonFinitePose(_, _))
        ));
        assert!(a
            .tick(&Pose::new([0.0, 0.0, 0.0], f64::INFINITY), None)
            .is_err());

        assert_eq!(a.current_state(), &state);
        assert_eq!(a.history().len(), len);
    }

    #[test]
    fn test_stationary_rover_never_leaves_s2() {
        let mut a = automaton_in_s2();
        for _ in 0..1000 {
            assert_eq!(a.tick(&ORIGIN, None).unwrap(), MotionIntent::Drive);
        }
        assert_eq!(a.current_state().id(), StateId::S2);
    }

    /// Every transition of the table lands on the target state's own flags, otherwise tick would
    /// have panicked.
    #[test]
    fn test_flags_follow_every_path() {
        let paths: Vec<Vec<(Pose, Option<Command>)>> = vec![
            // Full pattern
            vec![
                (Pose::new([7.0, 0.0, 0.0], 0.0), None),
                (Pose::new([7.0, 0.0, 0.0], 70.0), None),
                (Pose::new([7.0, 0.0, 0.0], 70.0), None),
                (Pose::new([7.0, 7.0, 0.0], 70.0), None),
            ],
            // Abort in the turn then continue
            vec![
                (Pose::new([7.0, 0.0, 0.0], 0.0), None),
                (ORIGIN, Some(Command::Abort)),
                (ORIGIN, None),
                (ORIGIN, Some(Command::Continue)),
            ],
        ];

        let expected_ends = [StateId::S6, StateId::S9];

        for (path, end) in paths.into_iter().zip(expected_ends.iter()) {
            let inputs = vec![(ORIGIN, None); 6].into_iter().chain(path);
            let a = replay(AutomatonParams::default(), 1.0, inputs).unwrap();

            assert_eq!(a.current_state().id(), *end);
            for s in a.history() {
                assert_eq!(s.flags(), s.id().flags());
            }
        }
    }

    #[test]
    fn test_end_to_end_pattern() {
        let mut a = automaton();
        let mut intents = Vec::new();

        // Stationary at the origin, the sixth tick starts the first leg
        for _ in 0..6 {
            intents.push(a.tick(&ORIGIN, None).unwrap());
        }
        assert_eq!(a.current_state().id(), StateId::S2);

        // Drive along X
        for x in 1..=7 {
            intents.push(a.tick(&Pose::new([x as f64, 0.0, 0.0], 0.0), None).unwrap());
        }
        assert_eq!(a.current_state().id(), StateId::S3);

        // Turn
        for h in [20.0, 40.0, 60.0, 80.0].iter() {
            intents.push(a.tick(&Pose::new([7.0, 0.0, 0.0], *h), None).unwrap());
        }
        assert_eq!(a.current_state().id(), StateId::S4);
        intents.push(a.tick(&Pose::new([7.0, 0.0, 0.0], 80.0), None).unwrap());
        assert_eq!(a.current_state().id(), StateId::S5);

        // Second leg along Y
        for y in 1..=7 {
            intents.push(a.tick(&Pose::new([7.0, y as f64, 0.0], 80.0), None).unwrap());
        }
        assert_eq!(a.current_state(), &AutomatonState::S6);

        let mut expected = vec![MotionIntent::Stop; 5];
        expected.push(MotionIntent::Drive);
        expected.extend(vec![MotionIntent::Drive; 6]);
        expected.push(MotionIntent::Turn);
        expected.extend(vec![MotionIntent::Turn; 4]);
        expected.push(MotionIntent::Drive);
        expected.extend(vec![MotionIntent::Drive; 6]);
        expected.push(MotionIntent::Stop);
        assert_eq!(intents, expected);

        let ids: Vec<StateId> = a.history().iter().map(AutomatonState::id).collect();
        assert_eq!(ids[..6], [StateId::S1; 6]);
        assert_eq!(ids[6..13], [StateId::S2; 7]);
        assert_eq!(ids[13..17], [StateId::S3; 4]);
        assert_eq!(ids[17], StateId::S4);
        assert_eq!(ids[18..], [StateId::S5; 7]);
    }

    #[test]
    fn test_replay_deterministic() {
        let mut inputs = vec![(ORIGIN, None); 6];
        for i in 0..30 {
            let t = i as f64;
            let cmd = if i == 20 { Some(Command::Abort) } else { None };
            inputs.push((Pose::new([t * 0.5, t * 0.1, 0.0], t * 7.0), cmd));
        }

        let a = replay(AutomatonParams::default(), 1.0, inputs.clone()).unwrap();
        let b = replay(AutomatonParams::default(), 1.0, inputs).unwrap();

        assert_eq!(a.history(), b.history());
        assert_eq!(a.current_state(), b.current_state());
    }

    #[test]
    fn test_state_serde() {
        let states = vec![
            AutomatonState::S1(Wait { ticks: 3 }),
            AutomatonState::S2(Drive::new([1.0, 2.0, 0.0])),
            AutomatonState::S3(Turn::new(45.0)),
            AutomatonState::S7,
        ];

        let json = serde_json::to_string(&states).unwrap();
        let back: Vec<AutomatonState> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, states);

        let s2: serde_json::Value = serde_json::to_value(&states[1]).unwrap();
        assert_eq!(s2["id"], "S2");
    }
}
