#![warn(missing_docs)]

//! CPU raycast camera for kinema scenes.
//!
//! Renders an articulation's primitive visual shapes (plus a ground
//! plane) by direct ray/primitive intersection — no GPU, no meshing.
//! The output is a [`Frame`] with `Color` and `Depth` float channels;
//! depth uses the OpenGL-normalized convention so downstream consumers
//! can linearize it with the camera's near/far planes.
//!
//! The camera is a mounted pinhole: a chase camera updates the mount
//! pose every frame while the local offset stays fixed.

mod camera;
mod frame;
mod intersect;
mod scene;

pub use camera::MountedCamera;
pub use frame::{Frame, RenderError};
pub use intersect::{intersect_ground, intersect_shape, Hit, Ray};
pub use scene::{DirectionalLight, RenderScene, RenderShape};
