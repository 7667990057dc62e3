//! # Motion intent
//!
//! The observable output of a state. It can be read either as a discrete action (drive, turn,
//! stop) or as a pair of signed unit directions for the linear and angular velocity. Both views
//! come from the same value so they can never disagree.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt::Display;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The motion demanded by a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotionIntent {
    /// Drive forwards in a straight line.
    Drive,

    /// Turn on the spot, positive angular direction.
    Turn,

    /// Stay stationary.
    Stop,
}

/// A signed unit direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Negative,
    Zero,
    Positive,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MotionIntent {
    /// Direction of the linear velocity.
    pub fn linear(&self) -> Direction {
        match self {
            MotionIntent::Drive => Direction::Positive,
            MotionIntent::Turn | MotionIntent::Stop => Direction::Zero,
        }
    }

    /// Direction of the angular velocity.
    pub fn angular(&self) -> Direction {
        match self {
            MotionIntent::Turn => Direction::Positive,
            MotionIntent::Drive | MotionIntent::Stop => Direction::Zero,
        }
    }

    /// Rebuild the intent from a pair of directions.
    ///
    /// Returns `None` for pairs no state emits, i.e. reversing or driving while turning.
    pub fn from_directions(linear: Direction, angular: Direction) -> Option<Self> {
        match (linear, angular) {
            (Direction::Positive, Direction::Zero) => Some(MotionIntent::Drive),
            (Direction::Zero, Direction::Positive) => Some(MotionIntent::Turn),
            (Direction::Zero, Direction::Zero) => Some(MotionIntent::Stop),
            _ => None,
        }
    }

    /// Scale the directions by a speed magnitude, giving `(velocity, omega)`.
    pub fn scaled(&self, speed: f64) -> (f64, f64) {
        (
            self.linear().signum() * speed,
            self.angular().signum() * speed,
        )
    }
}

impl Direction {
    /// The direction as -1, 0 or 1.
    pub fn signum(&self) -> f64 {
        match self {
            Direction::Negative => -1.0,
            Direction::Zero => 0.0,
            Direction::Positive => 1.0,
        }
    }
}

impl Display for MotionIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MotionIntent::Drive => write!(f, "drive"),
            MotionIntent::Turn => write!(f, "turn"),
            MotionIntent::Stop => write!(f, "stop"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_directions() {
        for intent in [MotionIntent::Drive, MotionIntent::Turn, MotionIntent::Stop].iter() {
            assert_eq!(
                MotionIntent::from_directions(intent.linear(), intent.angular()),
                Some(*intent)
            );
        }

        assert_eq!(
            MotionIntent::from_directions(Direction::Negative, Direction::Zero),
            None
        );
        assert_eq!(
            MotionIntent::from_directions(Direction::Positive, Direction::Positive),
            None
        );
    }

    #[test]
    fn test_scaled() {
        assert_eq!(MotionIntent::Drive.scaled(2.5), (2.5, 0.0));
        assert_eq!(MotionIntent::Turn.scaled(2.5), (0.0, 2.5));
        assert_eq!(MotionIntent::Stop.scaled(2.5), (0.0, 0.0));
    }
}
