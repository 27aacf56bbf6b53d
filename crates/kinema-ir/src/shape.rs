//! Collision and visual shape descriptions.

use serde::{Deserialize, Serialize};

use crate::pose::Pose;

/// Geometric primitive used for both collision and visual shapes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShapeGeometry {
    /// Axis-aligned box, given by half extents along each axis.
    Box {
        /// Half size along each local axis.
        half_extents: [f64; 3],
    },
    /// Sphere centered at the shape frame origin.
    Sphere {
        /// Sphere radius.
        radius: f64,
    },
    /// Capsule along the local z axis.
    Capsule {
        /// Cap radius.
        radius: f64,
        /// Half length of the cylindrical segment.
        half_length: f64,
    },
}

/// A collision shape attached to a link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionShape {
    /// Shape geometry.
    pub geometry: ShapeGeometry,
    /// Shape pose relative to the link frame.
    pub pose: Pose,
    /// Material density used by the backend to derive mass (kg/m^3).
    pub density: f64,
}

impl CollisionShape {
    /// Create a collision shape at the link origin.
    pub fn new(geometry: ShapeGeometry, density: f64) -> Self {
        Self {
            geometry,
            pose: Pose::IDENTITY,
            density,
        }
    }

    /// Place the shape at a pose relative to the link frame.
    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }
}

/// A visual shape attached to a link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualShape {
    /// Shape geometry.
    pub geometry: ShapeGeometry,
    /// Shape pose relative to the link frame.
    pub pose: Pose,
    /// Base color as RGBA in 0.0..1.0.
    pub color: [f64; 4],
}

impl VisualShape {
    /// Create a visual shape at the link origin with an opaque color.
    pub fn new(geometry: ShapeGeometry, color: [f64; 3]) -> Self {
        Self {
            geometry,
            pose: Pose::IDENTITY,
            color: [color[0], color[1], color[2], 1.0],
        }
    }

    /// Place the shape at a pose relative to the link frame.
    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }
}
