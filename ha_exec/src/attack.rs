//! # Attack models
//!
//! Attacks perturb what the automaton perceives or how hard the vehicle is driven, without the
//! automaton knowing about them. The driver applies them around every tick:
//!
//! - a [`Magnet`] adds an offset to the compass heading seen by the automaton,
//! - a [`SpeedController`] gives the magnitude the motion intent is scaled by.
//!
//! Models are usually built from their serializable specs, [`MagnetSpec`] and [`SpeedSpec`], so
//! that they can be sent to the control server.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::loc::{Pose, Position};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Ambient magnetic field in the world frame.
pub const WORLD_FIELD: [f64; 3] = [0.224902, 0.0, 0.428];

/// Below this distance to the dipole the field is undefined and no offset is applied.
const MIN_DIPOLE_DISTANCE_M: f64 = 1e-9;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A perturbation of the compass heading.
pub trait Magnet: Send {
    /// Offset in degrees added to the true heading at the given time and pose.
    fn offset_deg(&self, time_s: f64, pose: &Pose) -> f64;
}

/// Source of the speed magnitude the motion intent is scaled by.
pub trait SpeedController: Send {
    fn speed(&self, time_s: f64) -> f64;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A constant compass offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationaryMagnet {
    pub offset_deg: f64,
}

/// A magnetic dipole placed in the world, pointing along the world Z axis.
///
/// The compass reads the direction of the sum of the dipole's field and [`WORLD_FIELD`] in the
/// rover's body frame. Far from the dipole the compass therefore reads the true heading. A dipole
/// level with the rover only adds a vertical field, so it is usually placed above or below the
/// ground plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DipoleMagnet {
    /// Dipole moment, the scale of the field.
    pub moment: f64,

    /// Position of the dipole in the world frame.
    pub position_m: Position,
}

/// A constant speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedSpeed {
    pub speed: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Serializable description of a [`Magnet`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MagnetSpec {
    Stationary { offset_deg: f64 },
    Dipole { moment: f64, position_m: Position },
}

/// Serializable description of a [`SpeedController`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpeedSpec {
    Fixed { speed: f64 },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MagnetSpec {
    pub fn build(&self) -> Box<dyn Magnet> {
        match *self {
            MagnetSpec::Stationary { offset_deg } => Box::new(StationaryMagnet { offset_deg }),
            MagnetSpec::Dipole { moment, position_m } => Box::new(DipoleMagnet {
                moment,
                position_m,
            }),
        }
    }
}

impl SpeedSpec {
    pub fn build(&self) -> Box<dyn SpeedController> {
        match *self {
            SpeedSpec::Fixed { speed } => Box::new(FixedSpeed { speed }),
        }
    }
}

impl Magnet for StationaryMagnet {
    fn offset_deg(&self, _time_s: f64, _pose: &Pose) -> f64 {
        self.offset_deg
    }
}

impl DipoleMagnet {
    /// Field at the given position in the world frame, including the ambient field.
    ///
    /// Returns `None` at the dipole itself.
    pub fn field_at(&self, position_m: &Position) -> Option<Vector3<f64>> {
        let r = Vector3::from(*position_m) - Vector3::from(self.position_m);
        let dist_m = r.norm();

        if dist_m < MIN_DIPOLE_DISTANCE_M {
            return None;
        }

        let unit_r = r / dist_m;
        let z = Vector3::z();

        let b_scalar = self.moment / (4.0 * std::f64::consts::PI * dist_m.powi(3));
        let b_dipole = (unit_r * (3.0 * z.dot(&unit_r)) - z) * b_scalar;

        Some(b_dipole + Vector3::from(WORLD_FIELD))
    }
}

impl Magnet for DipoleMagnet {
    fn offset_deg(&self, _time_s: f64, pose: &Pose) -> f64 {
        let b_world = match self.field_at(&pose.position_m) {
            Some(b) => b,
            None => return 0.0,
        };

        // Into the body frame, yaw only
        let yaw = Rotation3::from_euler_angles(0.0, 0.0, pose.heading_deg.to_radians());
        let b_body = yaw.inverse() * b_world;

        let compass_deg = -b_body.y.atan2(b_body.x).to_degrees();

        util::maths::normalise_heading_deg(compass_deg - pose.heading_deg)
    }
}

impl SpeedController for FixedSpeed {
    fn speed(&self, _time_s: f64) -> f64 {
        self.speed
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const EPS: f64 = 1e-6;

    #[test]
    fn test_stationary() {
        let m = MagnetSpec::Stationary { offset_deg: 12.5 }.build();
        assert_eq!(m.offset_deg(0.0, &Pose::default()), 12.5);
        assert_eq!(m.offset_deg(100.0, &Pose::new([3.0, 4.0, 0.0], 90.0)), 12.5);
    }

    #[test]
    fn test_dipole_without_moment_reads_true_heading() {
        let m = DipoleMagnet {
            moment: 0.0,
            position_m: [1.0, 1.0, 0.0],
        };

        for h in [-179.0, -90.0, 0.0, 45.0, 135.0, 179.5, 180.0].iter() {
            let offset = m.offset_deg(0.0, &Pose::new([0.0, 0.0, 0.0], *h));
            assert!(offset.abs() < EPS, "heading {} gave offset {}", h, offset);
        }
    }

    #[test]
    fn test_dipole_decays_with_distance() {
        let m = DipoleMagnet {
            moment: 5.0,
            position_m: [0.0, 0.5, -0.5],
        };

        let near = m.offset_deg(0.0, &Pose::new([0.0, 0.0, 0.0], 0.0));
        let far = m.offset_deg(0.0, &Pose::new([200.0, 0.5, 0.0], 0.0));
        let level = DipoleMagnet {
            position_m: [0.0, 0.5, 0.0],
            ..m
        };

        assert!(near.is_finite());
        assert!(near.abs() > 1.0);
        assert!(far.abs() < 1e-3);
        assert!(level.offset_deg(0.0, &Pose::default()).abs() < EPS);
    }

    #[test]
    fn test_dipole_at_magnet() {
        let m = DipoleMagnet {
            moment: 5.0,
            position_m: [2.0, 3.0, 0.0],
        };
        assert_eq!(m.offset_deg(0.0, &Pose::new([2.0, 3.0, 0.0], 30.0)), 0.0);
        assert!(m.field_at(&[2.0, 3.0, 0.0]).is_none());
    }

    #[test]
    fn test_fixed_speed() {
        let s = SpeedSpec::Fixed { speed: 1.5 }.build();
        assert_eq!(s.speed(0.0), 1.5);
        assert_eq!(s.speed(42.0), 1.5);
    }

    #[test]
    fn test_spec_serde() {
        let spec: MagnetSpec =
            serde_json::from_str(r#"{"type": "dipole", "moment": 2.0, "position_m": [1, 2, 0]}"#)
                .unwrap();
        assert_eq!(
            spec,
            MagnetSpec::Dipole {
                moment: 2.0,
                position_m: [1.0, 2.0, 0.0]
            }
        );

        let speed: SpeedSpec = serde_json::from_str(r#"{"type": "fixed", "speed": 0.5}"#).unwrap();
        assert_eq!(speed, SpeedSpec::Fixed { speed: 0.5 });
    }
}
