//! Joint conversion from the articulation description to Rapier.
//!
//! The joint frame convention follows the description layer: the motion
//! axis is the x axis of the joint frame, `pose_in_parent` becomes the
//! joint's local frame on the parent body and `pose_in_child` the local
//! frame on the child body.

use kinema_ir::{Joint, JointKind};
use nalgebra::Isometry3;
use rapier3d::dynamics::{
    GenericJoint, GenericJointBuilder, JointAxesMask, JointAxis, MotorModel,
};

/// Force cap for driven joint motors.
pub const DEFAULT_MAX_FORCE: f32 = 1000.0;

/// Principal motion axis for a joint kind.
pub fn drive_axis(kind: JointKind) -> JointAxis {
    match kind {
        // Unused: fixed joints have no motor.
        JointKind::Fixed => JointAxis::LinX,
        JointKind::Revolute => JointAxis::AngX,
        JointKind::Prismatic => JointAxis::LinX,
    }
}

/// Create a Rapier joint matching a finalized articulation joint.
pub fn build_joint(joint: &Joint) -> GenericJoint {
    let frame1 = joint.pose_in_parent.isometry().cast::<f32>();
    let frame2 = joint.pose_in_child.isometry().cast::<f32>();

    match joint.kind {
        JointKind::Fixed => GenericJointBuilder::new(JointAxesMask::LOCKED_FIXED_AXES)
            .local_frame1(frame1)
            .local_frame2(frame2)
            .contacts_enabled(false)
            .build(),
        JointKind::Revolute => {
            let mut builder = GenericJointBuilder::new(JointAxesMask::LOCKED_REVOLUTE_AXES)
                .local_frame1(frame1)
                .local_frame2(frame2)
                // Adjacent links overlap at the joint; they must not
                // collide with each other.
                .contacts_enabled(false)
                .motor_model(JointAxis::AngX, MotorModel::AccelerationBased)
                .motor_max_force(JointAxis::AngX, DEFAULT_MAX_FORCE);
            if let Some(limits) = joint.limits.first().filter(|l| l.is_bounded()) {
                builder = builder.limits(
                    JointAxis::AngX,
                    [limits.lower as f32, limits.upper as f32],
                );
            }
            builder.build()
        }
        JointKind::Prismatic => {
            let mut builder = GenericJointBuilder::new(JointAxesMask::LOCKED_PRISMATIC_AXES)
                .local_frame1(frame1)
                .local_frame2(frame2)
                .contacts_enabled(false)
                .motor_model(JointAxis::LinX, MotorModel::AccelerationBased)
                .motor_max_force(JointAxis::LinX, DEFAULT_MAX_FORCE);
            if let Some(limits) = joint.limits.first().filter(|l| l.is_bounded()) {
                builder = builder.limits(
                    JointAxis::LinX,
                    [limits.lower as f32, limits.upper as f32],
                );
            }
            builder.build()
        }
    }
}

/// Measure the joint coordinate from the relative transform between the
/// two joint frames (parent frame to child frame, both in world space).
///
/// For a revolute joint this is the twist angle about the frame x axis;
/// for a prismatic joint the displacement along it.
pub fn measure_position(kind: JointKind, relative: &Isometry3<f32>) -> f64 {
    match kind {
        JointKind::Fixed => 0.0,
        JointKind::Revolute => {
            let q = relative.rotation;
            2.0 * f64::from(q.i).atan2(f64::from(q.w))
        }
        JointKind::Prismatic => f64::from(relative.translation.x),
    }
}
