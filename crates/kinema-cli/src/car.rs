//! The toy-car demo articulation.
//!
//! A box body with a steerable front shaft (revolute, ±15°), a welded
//! back shaft, and two wheel assemblies (rack plus two sphere tires)
//! spinning on unbounded revolute gears. The steering axis and the gear
//! axes are realized by rotating each joint frame so its x axis points
//! the right way.

use std::f64::consts::FRAC_PI_2;

use kinema_ir::{
    Articulation, ArticulationBuilder, BuildError, CollisionShape, JointLimits, JointSpec,
    LinkSpec, Pose, ShapeGeometry, VisualShape,
};

/// Geometric parameters of the car.
#[derive(Debug, Clone, Copy)]
pub struct CarDimensions {
    /// Full body size along x/y/z.
    pub body_size: [f64; 3],
    /// Tire sphere radius.
    pub tire_radius: f64,
}

impl Default for CarDimensions {
    fn default() -> Self {
        Self {
            body_size: [1.0, 0.5, 0.25],
            tire_radius: 0.15,
        }
    }
}

/// Build the toy car.
pub fn build_car(
    dims: CarDimensions,
    joint_friction: f64,
    joint_damping: f64,
    density: f64,
) -> Result<Articulation, BuildError> {
    let body_half = [
        dims.body_size[0] / 2.0,
        dims.body_size[1] / 2.0,
        dims.body_size[2] / 2.0,
    ];
    let shaft_half = [
        dims.tire_radius * 0.1,
        dims.tire_radius * 0.1,
        dims.body_size[2] * 0.1,
    ];
    let rack_half = [dims.tire_radius * 0.1, body_half[1] * 2.0, dims.tire_radius * 0.1];

    let mut builder = ArticulationBuilder::new("car");

    let body = builder.add_link(
        None,
        LinkSpec::named("body")
            .with_collision(CollisionShape::new(
                ShapeGeometry::Box {
                    half_extents: body_half,
                },
                density,
            ))
            .with_visual(VisualShape::new(
                ShapeGeometry::Box {
                    half_extents: body_half,
                },
                [0.8, 0.6, 0.4],
            )),
    )?;

    let shaft_spec = |name: &str| {
        LinkSpec::named(name)
            .with_collision(CollisionShape::new(
                ShapeGeometry::Box {
                    half_extents: shaft_half,
                },
                density,
            ))
            .with_visual(VisualShape::new(
                ShapeGeometry::Box {
                    half_extents: shaft_half,
                },
                [0.6, 0.4, 0.8],
            ))
    };

    // Steering shafts hang under the body; the joint frame is pitched
    // -90° so its x axis points up (the steering axis).
    let shaft_joint_in_parent = |x: f64| {
        Pose::from_euler([x, 0.0, -body_half[2]], 0.0, -FRAC_PI_2, 0.0)
    };
    let shaft_joint_in_child = Pose::from_euler([0.0, 0.0, shaft_half[2]], 0.0, -FRAC_PI_2, 0.0);

    let front_shaft = builder.add_link(Some(body), shaft_spec("front_shaft"))?;
    builder.set_joint(
        front_shaft,
        JointSpec::revolute("front_shaft_joint", JointLimits::from_degrees(-15.0, 15.0))
            .with_pose_in_parent(shaft_joint_in_parent(body_half[0] - dims.tire_radius))
            .with_pose_in_child(shaft_joint_in_child)
            .with_friction(joint_friction)
            .with_damping(joint_damping),
    )?;

    let back_shaft = builder.add_link(Some(body), shaft_spec("back_shaft"))?;
    builder.set_joint(
        back_shaft,
        JointSpec::fixed("back_shaft_joint")
            .with_pose_in_parent(shaft_joint_in_parent(-(body_half[0] - dims.tire_radius)))
            .with_pose_in_child(shaft_joint_in_child)
            .with_friction(joint_friction)
            .with_damping(joint_damping),
    )?;

    // A wheel assembly: the rack plus a sphere tire on each end, spinning
    // together on one gear joint whose x axis runs along the rack.
    let wheel_spec = |name: &str| {
        let mut spec = LinkSpec::named(name)
            .with_collision(CollisionShape::new(
                ShapeGeometry::Box {
                    half_extents: rack_half,
                },
                density,
            ))
            .with_visual(VisualShape::new(
                ShapeGeometry::Box {
                    half_extents: rack_half,
                },
                [0.8, 0.4, 0.6],
            ));
        for side in [1.0, -1.0] {
            let offset = Pose::from_translation([
                0.0,
                side * (rack_half[1] + dims.tire_radius),
                0.0,
            ]);
            spec = spec
                .with_collision(
                    CollisionShape::new(
                        ShapeGeometry::Sphere {
                            radius: dims.tire_radius,
                        },
                        density,
                    )
                    .with_pose(offset),
                )
                .with_visual(
                    VisualShape::new(
                        ShapeGeometry::Sphere {
                            radius: dims.tire_radius,
                        },
                        [0.4, 0.6, 0.8],
                    )
                    .with_pose(offset),
                );
        }
        spec
    };

    let gear_joint_in_parent = Pose::from_euler(
        [0.0, 0.0, -(shaft_half[2] + rack_half[2])],
        0.0,
        0.0,
        FRAC_PI_2,
    );
    let gear_joint_in_child = Pose::from_euler([0.0, 0.0, 0.0], 0.0, 0.0, FRAC_PI_2);

    let front_wheels = builder.add_link(Some(front_shaft), wheel_spec("front_wheels"))?;
    builder.set_joint(
        front_wheels,
        JointSpec::revolute("front_gear", JointLimits::FREE)
            .with_pose_in_parent(gear_joint_in_parent)
            .with_pose_in_child(gear_joint_in_child)
            .with_friction(joint_friction)
            .with_damping(joint_damping),
    )?;

    let back_wheels = builder.add_link(Some(back_shaft), wheel_spec("back_wheels"))?;
    builder.set_joint(
        back_wheels,
        JointSpec::revolute("back_gear", JointLimits::FREE)
            .with_pose_in_parent(gear_joint_in_parent)
            .with_pose_in_child(gear_joint_in_child)
            .with_friction(joint_friction)
            .with_damping(joint_damping),
    )?;

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use kinema_ir::JointKind;

    #[test]
    fn test_car_has_three_dof() {
        let car = build_car(CarDimensions::default(), 0.0, 0.0, 1.0).unwrap();
        // Steering + two gears; the back shaft weld contributes nothing.
        assert_eq!(car.dof(), 3);
        assert_eq!(car.links().len(), 5);
        assert_eq!(car.root().name, "body");
    }

    #[test]
    fn test_joint_names_and_kinds() {
        let car = build_car(CarDimensions::default(), 0.0, 0.0, 1.0).unwrap();
        assert_eq!(
            car.joint("front_shaft_joint").unwrap().kind,
            JointKind::Revolute
        );
        assert_eq!(car.joint("back_shaft_joint").unwrap().kind, JointKind::Fixed);
        assert!(car.joint("front_gear").is_some());
        assert!(car.joint("back_gear").is_some());
        assert!(car.joint("steering_wheel").is_none());
    }

    #[test]
    fn test_steering_limits_round_trip_degrees() {
        let car = build_car(CarDimensions::default(), 0.0, 0.0, 1.0).unwrap();
        let limits = car.joint("front_shaft_joint").unwrap().limits[0];
        assert_relative_eq!(limits.lower.to_degrees(), -15.0, epsilon = 1e-10);
        assert_relative_eq!(limits.upper.to_degrees(), 15.0, epsilon = 1e-10);

        let gear = car.joint("front_gear").unwrap().limits[0];
        assert!(!gear.is_bounded());
    }

    #[test]
    fn test_coefficients_reach_the_joints() {
        let car = build_car(CarDimensions::default(), 0.25, 0.5, 1.0).unwrap();
        let joint = car.joint("front_gear").unwrap();
        assert_eq!(joint.friction, 0.25);
        assert_eq!(joint.damping, 0.5);
    }

    #[test]
    fn test_car_serializes() {
        let car = build_car(CarDimensions::default(), 0.0, 0.0, 1.0).unwrap();
        let json = car.to_json().unwrap();
        let back = Articulation::from_json(&json).unwrap();
        assert_eq!(back.dof(), 3);
        assert_eq!(back.joint_index("front_gear"), car.joint_index("front_gear"));
    }
}
