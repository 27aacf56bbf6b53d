#![warn(missing_docs)]

//! Rapier3d-backed physics scene for kinema articulations.
//!
//! This crate turns an immutable [`kinema_ir::Articulation`] into live
//! physics state: one rigid body per link, colliders from the collision
//! shapes, and one motored impulse joint per non-root link. Joints stay
//! addressable by name for drive control, and the scene implements
//! [`kinema_sim::ArticulatedScene`] so the loop driver can step it.
//!
//! # Example
//!
//! ```ignore
//! use kinema_ir::Pose;
//! use kinema_physics::{PhysicsScene, SceneConfig};
//!
//! let mut scene = PhysicsScene::new(SceneConfig::default());
//! scene.add_ground(0.0);
//! scene.spawn(&articulation, Pose::from_translation([0.0, 0.0, 0.34]))?;
//!
//! scene.set_drive_property("front_gear", 0.0, 1000.0)?;
//! scene.set_drive_velocity_target("front_gear", 5.0)?;
//! scene.step(1.0 / 100.0)?;
//! ```

mod colliders;
mod error;
mod joints;
mod scene;

pub use error::SceneError;
pub use scene::{PhysicsScene, SceneConfig};
