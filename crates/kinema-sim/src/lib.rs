#![warn(missing_docs)]

//! Joint-drive simulation loop driver.
//!
//! This crate owns the discrete-time control loop that sits between a
//! drive schedule and a physics backend: each step it computes drive
//! targets from the step index, pushes them to named joint actuators,
//! advances the backend by one fixed timestep, and optionally samples a
//! frame at a configured interval.
//!
//! The backend is abstract ([`ArticulatedScene`]), so the loop and the
//! schedules are testable against scripted scenes; `kinema-physics`
//! provides the rapier-backed implementation.
//!
//! Error policy, in line with how the loop is meant to degrade:
//! applying a target to an unknown joint is reported per joint and never
//! blocks the other actuators; a capture failure skips the frame; a
//! physics step failure is fatal and ends the run.

mod driver;
mod error;
mod schedule;

pub use driver::{
    ArticulatedScene, CancelToken, Driver, DriveTargetState, Phase, RunReport, SimConfig,
};
pub use error::{CaptureError, DriveError, StepError};
pub use schedule::{DriveCommand, DriveSchedule, DriveTarget, RampSchedule};
