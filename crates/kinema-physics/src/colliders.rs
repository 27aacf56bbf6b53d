//! Collision shape generation from the articulation description.

use kinema_ir::{CollisionShape, ShapeGeometry};
use parry3d::shape::SharedShape;
use rapier3d::geometry::{Collider, ColliderBuilder};

use crate::scene::SceneConfig;

/// Build a collider for one collision shape, with the scene's default
/// contact material.
pub fn build_collider(shape: &CollisionShape, config: &SceneConfig) -> Collider {
    let geometry = match shape.geometry {
        ShapeGeometry::Box { half_extents } => SharedShape::cuboid(
            half_extents[0] as f32,
            half_extents[1] as f32,
            half_extents[2] as f32,
        ),
        ShapeGeometry::Sphere { radius } => SharedShape::ball(radius as f32),
        ShapeGeometry::Capsule {
            radius,
            half_length,
        } => SharedShape::capsule_z(half_length as f32, radius as f32),
    };

    ColliderBuilder::new(geometry)
        .position(shape.pose.isometry().cast::<f32>())
        .density(shape.density as f32)
        .friction(config.contact_friction())
        .restitution(config.restitution as f32)
        .build()
}
