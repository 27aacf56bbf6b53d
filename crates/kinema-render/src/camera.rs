//! Mounted pinhole camera.

use kinema_ir::Pose;
use nalgebra::{Isometry3, Matrix3, Point3, Rotation3, Translation3, UnitQuaternion, Vector3};

use crate::frame::Frame;
use crate::intersect::Ray;
use crate::scene::RenderScene;

/// Rotation from the internal camera axes (x right, y down, z forward)
/// to the mount convention (x forward, y left, z up).
fn cv_to_mount() -> Rotation3<f64> {
    Rotation3::from_matrix_unchecked(Matrix3::new(
        0.0, 0.0, 1.0, //
        -1.0, 0.0, 0.0, //
        0.0, -1.0, 0.0,
    ))
}

/// A pinhole camera attached to a mount.
///
/// The mount pose can be updated every frame (chase camera); the local
/// offset from mount to camera stays fixed. Camera poses use the
/// forward/left/up convention; intrinsics follow the usual pinhole
/// model with `f = height / (2 tan(fovy / 2))`.
#[derive(Debug, Clone)]
pub struct MountedCamera {
    width: u32,
    height: u32,
    fovy: f64,
    near: f64,
    far: f64,
    mount: Isometry3<f64>,
    local: Isometry3<f64>,
}

impl MountedCamera {
    /// Create a camera with an identity mount and local pose.
    pub fn new(width: u32, height: u32, fovy: f64, near: f64, far: f64) -> Self {
        Self {
            width,
            height,
            fovy,
            near,
            far,
            mount: Isometry3::identity(),
            local: Isometry3::identity(),
        }
    }

    /// Fix the camera pose relative to its mount.
    pub fn with_local_pose(mut self, pose: Pose) -> Self {
        self.local = pose.isometry();
        self
    }

    /// Move the mount. Called once per frame for a chase camera.
    pub fn set_mount_pose(&mut self, pose: Pose) {
        self.mount = pose.isometry();
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Near clipping distance.
    pub fn near(&self) -> f64 {
        self.near
    }

    /// Far clipping distance.
    pub fn far(&self) -> f64 {
        self.far
    }

    /// Focal length in pixels.
    pub fn focal_length(&self) -> f64 {
        self.height as f64 / (2.0 * (self.fovy / 2.0).tan())
    }

    /// The 3x3 intrinsics matrix (pixel units, principal point at the
    /// image center).
    pub fn intrinsics(&self) -> Matrix3<f64> {
        let f = self.focal_length();
        Matrix3::new(
            f,
            0.0,
            self.width as f64 / 2.0,
            0.0,
            f,
            self.height as f64 / 2.0,
            0.0,
            0.0,
            1.0,
        )
    }

    /// Transform from internal camera axes to world space.
    pub fn camera_to_world(&self) -> Isometry3<f64> {
        self.mount
            * self.local
            * Isometry3::from_parts(
                Translation3::identity(),
                UnitQuaternion::from_rotation_matrix(&cv_to_mount()),
            )
    }

    /// View depth → OpenGL-normalized depth (0 at near, 1 at far).
    pub fn normalize_depth(&self, z: f64) -> f64 {
        ((self.far - self.near * self.far / z) / (self.far - self.near)).clamp(0.0, 1.0)
    }

    /// OpenGL-normalized depth → view depth.
    pub fn linearize_depth(&self, d: f64) -> f64 {
        self.near * self.far / (self.far + d * (self.near - self.far))
    }

    /// Render the scene into a frame.
    pub fn capture(&self, scene: &RenderScene) -> Frame {
        let mut frame = Frame::new(self.width, self.height);
        let cam = self.camera_to_world();
        let origin = Point3::from(cam.translation.vector);
        let forward = cam.rotation * Vector3::z();
        let f = self.focal_length();
        let cx = self.width as f64 / 2.0;
        let cy = self.height as f64 / 2.0;

        for y in 0..self.height {
            for x in 0..self.width {
                let dir_cv = Vector3::new((x as f64 - cx) / f, (y as f64 - cy) / f, 1.0);
                let ray = Ray::new(origin, cam.rotation * dir_cv);

                let Some((hit, base)) = scene.cast(&ray) else {
                    continue;
                };
                let z = hit.t * ray.direction.dot(&forward);
                if z < self.near || z > self.far {
                    continue;
                }

                let point = ray.at(hit.t);
                let mut intensity = scene.ambient();
                for light in scene.lights() {
                    let lambert = hit.normal.dot(&-light.direction.into_inner());
                    if lambert <= 0.0 {
                        continue;
                    }
                    if light.shadow {
                        let shadow_ray = Ray::new(
                            point + hit.normal.into_inner() * 1e-6,
                            -light.direction.into_inner(),
                        );
                        if scene.occluded(&shadow_ray, f64::INFINITY) {
                            continue;
                        }
                    }
                    for i in 0..3 {
                        intensity[i] += light.color[i] * lambert;
                    }
                }

                let rgba = [
                    (base[0] * intensity[0]).clamp(0.0, 1.0) as f32,
                    (base[1] * intensity[1]).clamp(0.0, 1.0) as f32,
                    (base[2] * intensity[2]).clamp(0.0, 1.0) as f32,
                    base[3].clamp(0.0, 1.0) as f32,
                ];
                frame.put(x, y, rgba, self.normalize_depth(z) as f32);
            }
        }
        frame
    }
}
