//! The shape set a camera renders: articulation visuals at their live
//! link poses, plus ground and lights.

use kinema_ir::{Articulation, Pose, ShapeGeometry};
use nalgebra::{Isometry3, Unit, Vector3};

use crate::intersect::{intersect_ground, intersect_shape, Hit, Ray};

/// One shape instance placed in the world.
#[derive(Debug, Clone)]
pub struct RenderShape {
    /// Primitive geometry.
    pub geometry: ShapeGeometry,
    /// World pose of the shape.
    pub pose: Isometry3<f64>,
    /// RGBA base color.
    pub color: [f64; 4],
}

/// A directional light.
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    /// Direction the light travels (not towards the light).
    pub direction: Unit<Vector3<f64>>,
    /// Light color/intensity.
    pub color: [f64; 3],
    /// Whether shapes cast hard shadows for this light.
    pub shadow: bool,
}

/// Everything a [`MountedCamera`](crate::MountedCamera) needs to render
/// one frame.
#[derive(Debug, Clone, Default)]
pub struct RenderScene {
    shapes: Vec<RenderShape>,
    ground: Option<f64>,
    ambient: [f64; 3],
    lights: Vec<DirectionalLight>,
}

impl RenderScene {
    /// An empty, unlit scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ambient light color.
    pub fn set_ambient_light(&mut self, color: [f64; 3]) {
        self.ambient = color;
    }

    /// Add a directional light.
    pub fn add_directional_light(
        &mut self,
        direction: [f64; 3],
        color: [f64; 3],
        shadow: bool,
    ) {
        self.lights.push(DirectionalLight {
            direction: Unit::new_normalize(Vector3::new(
                direction[0],
                direction[1],
                direction[2],
            )),
            color,
            shadow,
        });
    }

    /// Add a ground plane at the given altitude.
    pub fn add_ground(&mut self, altitude: f64) {
        self.ground = Some(altitude);
    }

    /// Ambient light color.
    pub fn ambient(&self) -> [f64; 3] {
        self.ambient
    }

    /// Directional lights.
    pub fn lights(&self) -> &[DirectionalLight] {
        &self.lights
    }

    /// Current shape instances.
    pub fn shapes(&self) -> &[RenderShape] {
        &self.shapes
    }

    /// Replace the shape set with an articulation's visual shapes placed
    /// at the given world link poses (one pose per link, in link order).
    /// Called once per frame to track the moving assembly.
    pub fn sync_articulation(&mut self, articulation: &Articulation, link_poses: &[Pose]) {
        self.shapes.clear();
        for (link, pose) in articulation.links().iter().zip(link_poses) {
            let link_iso = pose.isometry();
            for visual in &link.visuals {
                self.shapes.push(RenderShape {
                    geometry: visual.geometry,
                    pose: link_iso * visual.pose.isometry(),
                    color: visual.color,
                });
            }
        }
    }

    /// Nearest forward intersection over all shapes and the ground.
    ///
    /// Returns the hit and the base color of whatever was struck; the
    /// ground renders as neutral grey.
    pub fn cast(&self, ray: &Ray) -> Option<(Hit, [f64; 4])> {
        let mut best: Option<(Hit, [f64; 4])> = None;
        for shape in &self.shapes {
            if let Some(hit) = intersect_shape(ray, &shape.geometry, &shape.pose) {
                if best.as_ref().map_or(true, |(b, _)| hit.t < b.t) {
                    best = Some((hit, shape.color));
                }
            }
        }
        if let Some(altitude) = self.ground {
            if let Some(hit) = intersect_ground(ray, altitude) {
                if best.as_ref().map_or(true, |(b, _)| hit.t < b.t) {
                    best = Some((hit, [0.5, 0.5, 0.5, 1.0]));
                }
            }
        }
        best
    }

    /// Whether anything blocks the ray before `max_t` (shadow test).
    pub fn occluded(&self, ray: &Ray, max_t: f64) -> bool {
        self.shapes
            .iter()
            .filter_map(|s| intersect_shape(ray, &s.geometry, &s.pose))
            .any(|hit| hit.t < max_t)
    }
}
