//! Error types for the simulation loop.

use thiserror::Error;

/// A per-joint drive application failure. Reported and skipped; the
/// remaining actuators of the same step are unaffected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriveError {
    /// No joint with this name exists in the articulation.
    #[error("unknown joint '{0}'")]
    UnknownJoint(String),
}

/// A fatal physics-step failure. The backend's state is not assumed
/// salvageable afterwards, so the loop terminates without retrying.
#[derive(Error, Debug)]
pub enum StepError {
    /// Simulation state left finite space.
    #[error("physics step diverged: {0}")]
    Diverged(String),

    /// Backend-internal failure.
    #[error("physics backend failed: {0}")]
    Backend(String),
}

/// A frame/sensor capture failure. Logged, the frame is skipped, and the
/// loop continues — stepping physics is the primary invariant.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The capture backend is unavailable or rejected the request.
    #[error("capture failed: {0}")]
    Unavailable(String),
}
