//! Drive schedules: pure functions from step index to joint targets.

use serde::{Deserialize, Serialize};

/// Targets commanded for one joint at one step. Either component may be
/// absent; absent components leave the actuator's previous target alone.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DriveTarget {
    /// Position target (radians for revolute, meters for prismatic).
    pub position: Option<f64>,
    /// Velocity target (rad/s or m/s).
    pub velocity: Option<f64>,
}

impl DriveTarget {
    /// A position-only target.
    pub fn position(value: f64) -> Self {
        Self {
            position: Some(value),
            velocity: None,
        }
    }

    /// A velocity-only target.
    pub fn velocity(value: f64) -> Self {
        Self {
            position: None,
            velocity: Some(value),
        }
    }
}

/// One joint's command within a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveCommand {
    /// Target joint name.
    pub joint: String,
    /// Targets to apply.
    pub target: DriveTarget,
}

/// A deterministic drive policy.
///
/// Implementations must be pure functions of the step index: no hidden
/// state, same index in means same commands out.
pub trait DriveSchedule {
    /// Commands for the given step index.
    fn commands(&self, step: u64) -> Vec<DriveCommand>;
}

/// Piecewise-linear ramp-up, ramp-down, hold-and-reset policy.
///
/// Over the first `ramp_steps` steps the gear joint's velocity target
/// climbs by `velocity_step` per step saturating at `max_velocity`, and
/// the steering joint's position target climbs by `position_step_deg`
/// degrees per step saturating at `max_position_deg`. Over the next
/// `ramp_steps` steps the position target ramps back down to zero. At
/// `reset_step` both targets are set to zero; afterwards the schedule is
/// silent and the actuators hold.
///
/// Targets are computed in closed form from the step index and clamped,
/// so the saturation values are hit exactly with no overshoot. Position
/// commands are emitted in radians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RampSchedule {
    /// Joint receiving the velocity ramp (the wheel gear).
    pub gear_joint: String,
    /// Joint receiving the position ramp (the steering shaft).
    pub steer_joint: String,
    /// Velocity increment per step.
    pub velocity_step: f64,
    /// Velocity saturation value.
    pub max_velocity: f64,
    /// Position increment per step, in degrees.
    pub position_step_deg: f64,
    /// Position saturation value, in degrees.
    pub max_position_deg: f64,
    /// Length of the ramp-up window (and of the ramp-down window).
    pub ramp_steps: u64,
    /// Step at which both targets reset to zero.
    pub reset_step: u64,
}

impl RampSchedule {
    /// The documented demo policy: +0.25 velocity per step to 25.0,
    /// +0.15 deg position per step to 15.0 over 100 steps, ramp back
    /// down over the next 100, reset at step 200.
    pub fn new(gear_joint: impl Into<String>, steer_joint: impl Into<String>) -> Self {
        Self {
            gear_joint: gear_joint.into(),
            steer_joint: steer_joint.into(),
            velocity_step: 0.25,
            max_velocity: 25.0,
            position_step_deg: 0.15,
            max_position_deg: 15.0,
            ramp_steps: 100,
            reset_step: 200,
        }
    }

    /// Velocity target in effect at `step` during the ramp-up window.
    fn ramp_velocity(&self, step: u64) -> f64 {
        (self.velocity_step * (step + 1) as f64).min(self.max_velocity)
    }

    /// Position target (degrees) in effect at `step` during ramp-up.
    fn ramp_position_deg(&self, step: u64) -> f64 {
        (self.position_step_deg * (step + 1) as f64).min(self.max_position_deg)
    }

    /// Position target (degrees) during ramp-down.
    fn decay_position_deg(&self, step: u64) -> f64 {
        let k = (step - self.ramp_steps + 1) as f64;
        (self.max_position_deg - self.position_step_deg * k).max(0.0)
    }
}

impl DriveSchedule for RampSchedule {
    fn commands(&self, step: u64) -> Vec<DriveCommand> {
        if step < self.ramp_steps {
            vec![
                DriveCommand {
                    joint: self.gear_joint.clone(),
                    target: DriveTarget::velocity(self.ramp_velocity(step)),
                },
                DriveCommand {
                    joint: self.steer_joint.clone(),
                    target: DriveTarget::position(self.ramp_position_deg(step).to_radians()),
                },
            ]
        } else if step < self.reset_step {
            vec![DriveCommand {
                joint: self.steer_joint.clone(),
                target: DriveTarget::position(self.decay_position_deg(step).to_radians()),
            }]
        } else if step == self.reset_step {
            vec![
                DriveCommand {
                    joint: self.steer_joint.clone(),
                    target: DriveTarget::position(0.0),
                },
                DriveCommand {
                    joint: self.gear_joint.clone(),
                    target: DriveTarget::velocity(0.0),
                },
            ]
        } else {
            Vec::new()
        }
    }
}
