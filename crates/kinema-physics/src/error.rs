//! Scene-level error type.
//!
//! Joint-drive and stepping failures use the shared taxonomy in
//! `kinema-sim` ([`kinema_sim::DriveError`], [`kinema_sim::StepError`]);
//! this enum covers the scene's own bookkeeping.

use thiserror::Error;

/// Errors raised by scene management operations.
#[derive(Error, Debug)]
pub enum SceneError {
    /// The scene already hosts an articulation.
    #[error("scene already has an articulation ('{0}')")]
    AlreadySpawned(String),

    /// The operation needs a spawned articulation.
    #[error("no articulation spawned in this scene")]
    NoArticulation,

    /// A generalized-coordinate vector has the wrong length.
    #[error("generalized force vector has length {got}, articulation has {expected} DoF")]
    DofMismatch {
        /// DoF count of the spawned articulation.
        expected: usize,
        /// Length supplied by the caller.
        got: usize,
    },
}
