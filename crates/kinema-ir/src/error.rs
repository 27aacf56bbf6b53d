//! Error types for articulation construction.

use thiserror::Error;

/// Errors raised while describing or finalizing an articulation.
#[derive(Error, Debug)]
pub enum BuildError {
    /// A link reference did not resolve, or the link tree is malformed.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// A joint specification is inconsistent with its kind, or its name
    /// collides with a joint already set on this articulation.
    #[error("invalid joint spec for '{joint}': {reason}")]
    InvalidJointSpec {
        /// Name of the offending joint.
        joint: String,
        /// Reason for rejection.
        reason: String,
    },

    /// The accumulated description does not form a complete link tree.
    #[error("incomplete topology: {0}")]
    IncompleteTopology(String),
}

/// Result type for builder operations.
pub type Result<T> = std::result::Result<T, BuildError>;
