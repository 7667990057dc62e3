//! # Simulation module
//!
//! A kinematic model of the rover, used in place of the real vehicle for standalone runs, the
//! control server and the tests. The rover is modelled as a unicycle: it moves along its heading
//! at the commanded velocity and turns on the spot at the commanded angular rate.
//!
//! The two motors are demanded the same way as on the real rover, a velocity `v` gives wheel
//! demands `[-v, v]` and an angular rate `w` gives `[w, w]`. Since both are carried by the same
//! pair of demands, setting one clears the other.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use params::SimParams;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{info, trace};

use crate::{
    attack::{FixedSpeed, SpeedController},
    auto::Automaton,
    driver::{Driver, DriverError, DriverParams, Vehicle},
    loc::{Pose, PoseSample, PoseSource},
    msgs::{RunResult, Start},
    params::ExecParams,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Simulated rover.
#[derive(Debug, Clone)]
pub struct SimRover {
    params: SimParams,

    time_s: f64,
    pose: Pose,
    roll_deg: f64,

    velocity: f64,
    omega: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimRover {
    pub fn new(params: SimParams) -> Self {
        let mut pose = params.initial_pose;
        pose.heading_deg = util::maths::normalise_heading_deg(pose.heading_deg);

        Self {
            params,
            time_s: 0.0,
            pose,
            roll_deg: 0.0,
            velocity: 0.0,
            omega: 0.0,
        }
    }

    /// Demand a linear velocity, clearing any angular demand.
    pub fn set_velocity(&mut self, velocity: f64) {
        self.velocity = velocity;
        self.omega = 0.0;
    }

    /// Demand an angular rate, clearing any linear demand.
    pub fn set_omega(&mut self, omega: f64) {
        self.omega = omega;
        self.velocity = 0.0;
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn omega(&self) -> f64 {
        self.omega
    }

    /// The demands sent to the two motors.
    pub fn wheel_demands(&self) -> [f64; 2] {
        if self.omega != 0.0 {
            [self.omega, self.omega]
        } else {
            [-self.velocity, self.velocity]
        }
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn time_s(&self) -> f64 {
        self.time_s
    }

    /// Integrate the model over `period_s`.
    fn integrate(&mut self, period_s: f64) {
        if !period_s.is_finite() || period_s <= 0.0 {
            return;
        }

        let num_steps = (period_s / self.params.sub_step_s).ceil().max(1.0) as u64;
        let dt = period_s / num_steps as f64;

        for _ in 0..num_steps {
            let heading_rad = self.pose.heading_deg.to_radians();

            self.pose.position_m[0] += self.velocity * heading_rad.cos() * dt;
            self.pose.position_m[1] += self.velocity * heading_rad.sin() * dt;
            self.pose.heading_deg = util::maths::normalise_heading_deg(
                self.pose.heading_deg + self.omega * self.params.turn_rate_deg_s * dt,
            );
        }

        self.time_s += period_s;

        trace!(
            "SimRover at {:.3} s: {:?}, {:.3} deg",
            self.time_s,
            self.pose.position_m,
            self.pose.heading_deg
        );
    }
}

impl PoseSource for SimRover {
    fn sample(&self) -> Option<PoseSample> {
        Some(PoseSample {
            time_s: self.time_s,
            pose: self.pose,
            roll_deg: self.roll_deg,
        })
    }
}

impl Vehicle for SimRover {
    fn command(&mut self, velocity: f64, omega: f64) {
        if omega != 0.0 {
            self.set_omega(omega)
        } else {
            self.set_velocity(velocity)
        }
    }

    fn wait(&mut self, period_s: f64) {
        self.integrate(period_s)
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Run a complete survey of a fresh [`SimRover`] with a fresh automaton.
///
/// Options given in `start` take precedence over those in `params`.
pub fn run_survey(params: &ExecParams, start: &Start) -> Result<RunResult, DriverError> {
    let automaton = Automaton::new(params.automaton, params.step_size_s())
        .map_err(DriverError::AutomatonError)?;

    let speed: Box<dyn SpeedController> = match start.speed {
        Some(spec) => spec.build(),
        None => Box::new(FixedSpeed {
            speed: params.default_speed,
        }),
    };

    let driver_params = DriverParams {
        max_ticks: start.max_ticks.or(params.max_ticks),
        realtime: params.realtime,
        ..Default::default()
    };

    let mut driver = Driver::new(automaton, driver_params, speed);
    if let Some(spec) = start.magnet.or(params.magnet) {
        info!("Magnet: {:?}", spec);
        driver = driver.with_magnet(spec.build());
    }

    let mut rover = SimRover::new(params.sim);

    driver.run(&mut rover, start.commands.commands())
}
