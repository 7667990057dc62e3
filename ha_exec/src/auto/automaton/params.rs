//! # Automaton Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Guard thresholds of the automaton.
///
/// Every guard compares with `>=`, so a value exactly at the threshold fires the transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomatonParams {
    /// Time to wait in S1 before starting the first drive leg.
    pub wait_time_s: f64,

    /// Distance from the leg's start position after which a drive leg is complete.
    pub leg_distance_m: f64,

    /// Heading change from the turn's start heading after which the turn is complete.
    pub turn_angle_deg: f64,

    /// How the heading change of the turn is measured.
    pub heading_delta: HeadingDelta,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Method of measuring the change in heading during the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingDelta {
    /// Plain absolute difference of the two headings. A turn through the +/-180 degree boundary
    /// sees a jump of nearly 360 degrees.
    Absolute,

    /// Smallest angle between the two headings, in [0, 180].
    Wrapped,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for AutomatonParams {
    fn default() -> Self {
        Self {
            wait_time_s: 5.0,
            leg_distance_m: 7.0,
            turn_angle_deg: 70.0,
            heading_delta: HeadingDelta::Absolute,
        }
    }
}

impl HeadingDelta {
    /// Measure the heading change between two headings in degrees.
    pub fn measure(&self, heading_deg: f64, start_heading_deg: f64) -> f64 {
        match self {
            HeadingDelta::Absolute => util::maths::angle_delta(heading_deg, start_heading_deg),
            HeadingDelta::Wrapped => {
                util::maths::wrapped_angle_delta_deg(heading_deg, start_heading_deg)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_params() {
        let p: AutomatonParams = util::params::parse(
            r#"
            leg_distance_m = 3.5
            heading_delta = "wrapped"
            "#,
        )
        .unwrap();

        assert_eq!(p.leg_distance_m, 3.5);
        assert_eq!(p.heading_delta, HeadingDelta::Wrapped);

        // Unset values keep the defaults
        assert_eq!(p.wait_time_s, 5.0);
        assert_eq!(p.turn_angle_deg, 70.0);
    }

    #[test]
    fn test_measure() {
        assert_eq!(HeadingDelta::Absolute.measure(-175.0, 175.0), 350.0);
        assert!((HeadingDelta::Wrapped.measure(-175.0, 175.0) - 10.0).abs() < 1e-9);
    }
}
