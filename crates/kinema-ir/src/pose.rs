//! Rigid transforms for link frames, joint frames and shape placement.

use nalgebra::{Isometry3, Quaternion, Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};

/// A rigid transform: translation plus a unit quaternion.
///
/// Stored as plain arrays so the description layer serializes without any
/// engine types. The quaternion is `[w, x, y, z]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Translation component.
    pub p: [f64; 3],
    /// Rotation component as `[w, x, y, z]`.
    pub q: [f64; 4],
}

impl Pose {
    /// The identity transform.
    pub const IDENTITY: Pose = Pose {
        p: [0.0, 0.0, 0.0],
        q: [1.0, 0.0, 0.0, 0.0],
    };

    /// Create a pose from a translation and a `[w, x, y, z]` quaternion.
    pub fn new(p: [f64; 3], q: [f64; 4]) -> Self {
        Self { p, q }
    }

    /// Create a pure translation.
    pub fn from_translation(p: [f64; 3]) -> Self {
        Self {
            p,
            q: [1.0, 0.0, 0.0, 0.0],
        }
    }

    /// Create a pose from a translation and extrinsic XYZ Euler angles
    /// (roll about x, then pitch about y, then yaw about z) in radians.
    pub fn from_euler(p: [f64; 3], roll: f64, pitch: f64, yaw: f64) -> Self {
        let q = UnitQuaternion::from_euler_angles(roll, pitch, yaw);
        Self {
            p,
            q: [q.w, q.i, q.j, q.k],
        }
    }

    /// Convert to a nalgebra isometry. The quaternion is renormalized, so
    /// poses deserialized from slightly lossy sources stay usable.
    pub fn isometry(&self) -> Isometry3<f64> {
        let rotation = UnitQuaternion::from_quaternion(Quaternion::new(
            self.q[0], self.q[1], self.q[2], self.q[3],
        ));
        Isometry3::from_parts(
            Translation3::new(self.p[0], self.p[1], self.p[2]),
            rotation,
        )
    }

    /// Build a pose from a nalgebra isometry.
    pub fn from_isometry(iso: &Isometry3<f64>) -> Self {
        let t = iso.translation;
        let r = iso.rotation;
        Self {
            p: [t.x, t.y, t.z],
            q: [r.w, r.i, r.j, r.k],
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}
