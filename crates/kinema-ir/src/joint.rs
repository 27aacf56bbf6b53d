//! Joint kinds, limits and specifications.
//!
//! By convention the motion axis of a joint is the x axis of its own
//! frame: a revolute joint rotates about it, a prismatic joint slides
//! along it. `pose_in_parent` places the joint frame in the parent link
//! frame, `pose_in_child` places it in the child link frame.

use serde::{Deserialize, Serialize};

use crate::pose::Pose;

/// Kind of relative motion a joint permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JointKind {
    /// No relative motion; the child is welded to the parent.
    Fixed,
    /// One rotational degree of freedom about the joint x axis.
    Revolute,
    /// One translational degree of freedom along the joint x axis.
    Prismatic,
}

impl JointKind {
    /// Degrees of freedom for this kind.
    pub fn dof(&self) -> usize {
        match self {
            JointKind::Fixed => 0,
            JointKind::Revolute | JointKind::Prismatic => 1,
        }
    }

    /// Number of `[lower, upper]` limit pairs a spec of this kind must
    /// supply — one per degree of freedom.
    pub fn required_limit_pairs(&self) -> usize {
        self.dof()
    }
}

/// Per-DoF motion limits. Radians for revolute joints, meters for
/// prismatic joints. Either bound may be infinite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointLimits {
    /// Lower bound.
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
}

impl JointLimits {
    /// Unbounded motion.
    pub const FREE: JointLimits = JointLimits {
        lower: f64::NEG_INFINITY,
        upper: f64::INFINITY,
    };

    /// Create a limit pair.
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Create a limit pair from bounds in degrees (revolute joints).
    pub fn from_degrees(lower: f64, upper: f64) -> Self {
        Self {
            lower: lower.to_radians(),
            upper: upper.to_radians(),
        }
    }

    /// Whether both bounds are finite.
    pub fn is_bounded(&self) -> bool {
        self.lower.is_finite() && self.upper.is_finite()
    }
}

/// Full parameterization of a joint, as supplied to
/// [`ArticulationBuilder::set_joint`](crate::ArticulationBuilder::set_joint).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointSpec {
    /// Joint name, unique within an articulation.
    pub name: String,
    /// Kind of motion.
    pub kind: JointKind,
    /// One limit pair per degree of freedom.
    pub limits: Vec<JointLimits>,
    /// Joint frame pose relative to the parent link frame.
    pub pose_in_parent: Pose,
    /// Joint frame pose relative to the child link frame.
    pub pose_in_child: Pose,
    /// Passive friction torque/force resisting motion.
    pub friction: f64,
    /// Passive damping proportional to joint velocity.
    pub damping: f64,
}

impl JointSpec {
    /// A fixed joint. Supplies no limits, as required for zero DoF.
    pub fn fixed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: JointKind::Fixed,
            limits: Vec::new(),
            pose_in_parent: Pose::IDENTITY,
            pose_in_child: Pose::IDENTITY,
            friction: 0.0,
            damping: 0.0,
        }
    }

    /// A revolute joint with a single limit pair.
    pub fn revolute(name: impl Into<String>, limits: JointLimits) -> Self {
        Self {
            name: name.into(),
            kind: JointKind::Revolute,
            limits: vec![limits],
            pose_in_parent: Pose::IDENTITY,
            pose_in_child: Pose::IDENTITY,
            friction: 0.0,
            damping: 0.0,
        }
    }

    /// A prismatic joint with a single limit pair.
    pub fn prismatic(name: impl Into<String>, limits: JointLimits) -> Self {
        Self {
            name: name.into(),
            kind: JointKind::Prismatic,
            limits: vec![limits],
            pose_in_parent: Pose::IDENTITY,
            pose_in_child: Pose::IDENTITY,
            friction: 0.0,
            damping: 0.0,
        }
    }

    /// Set the joint frame pose in the parent link frame.
    pub fn with_pose_in_parent(mut self, pose: Pose) -> Self {
        self.pose_in_parent = pose;
        self
    }

    /// Set the joint frame pose in the child link frame.
    pub fn with_pose_in_child(mut self, pose: Pose) -> Self {
        self.pose_in_child = pose;
        self
    }

    /// Set the passive friction coefficient.
    pub fn with_friction(mut self, friction: f64) -> Self {
        self.friction = friction;
        self
    }

    /// Set the passive damping coefficient.
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }
}
