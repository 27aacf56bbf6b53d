//! Depth-frame unprojection and PCD serialization.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use kinema_render::{Frame, MountedCamera};
use nalgebra::Point3;

use crate::error::ExportError;

/// A colored 3D point set in world coordinates.
#[derive(Debug, Clone, Default)]
pub struct PointCloud {
    /// Point positions.
    pub points: Vec<[f64; 3]>,
    /// Per-point RGB colors in 0.0..1.0, parallel to `points`.
    pub colors: Vec<[f64; 3]>,
}

impl PointCloud {
    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the cloud is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Unproject a captured frame into world space.
    ///
    /// Background pixels (normalized depth of 1.0) are skipped. For the
    /// rest, the normalized depth linearizes to view depth through the
    /// camera's near/far planes, the pixel unprojects through the
    /// intrinsics, and the camera-to-world transform (which already maps
    /// the internal right/down/forward axes onto the world) places the
    /// point. Colors come from the frame's color channel.
    pub fn from_depth_frame(frame: &Frame, camera: &MountedCamera) -> Self {
        let f = camera.focal_length();
        let cx = f64::from(frame.width()) / 2.0;
        let cy = f64::from(frame.height()) / 2.0;
        let cam_to_world = camera.camera_to_world();

        let mut cloud = PointCloud::default();
        let depth = frame.depth();
        let color = frame.color();

        for py in 0..frame.height() {
            for px in 0..frame.width() {
                let i = (py * frame.width() + px) as usize;
                let d = f64::from(depth[i]);
                if d >= 1.0 {
                    continue;
                }
                let z = camera.linearize_depth(d);
                let local = Point3::new(
                    (f64::from(px) - cx) / f * z,
                    (f64::from(py) - cy) / f * z,
                    z,
                );
                let world = cam_to_world * local;
                cloud.points.push([world.x, world.y, world.z]);
                cloud.colors.push([
                    f64::from(color[i * 4]),
                    f64::from(color[i * 4 + 1]),
                    f64::from(color[i * 4 + 2]),
                ]);
            }
        }
        cloud
    }

    /// Write the cloud as an ASCII PCD v0.7 file with packed RGB.
    pub fn write_pcd<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        let file = File::create(path)?;
        let mut out = BufWriter::new(file);

        writeln!(out, "# .PCD v0.7 - Point Cloud Data file format")?;
        writeln!(out, "VERSION 0.7")?;
        writeln!(out, "FIELDS x y z rgb")?;
        writeln!(out, "SIZE 4 4 4 4")?;
        writeln!(out, "TYPE F F F U")?;
        writeln!(out, "COUNT 1 1 1 1")?;
        writeln!(out, "WIDTH {}", self.len())?;
        writeln!(out, "HEIGHT 1")?;
        writeln!(out, "VIEWPOINT 0 0 0 1 0 0 0")?;
        writeln!(out, "POINTS {}", self.len())?;
        writeln!(out, "DATA ascii")?;

        for (point, color) in self.points.iter().zip(&self.colors) {
            let rgb = pack_rgb(color);
            writeln!(out, "{} {} {} {}", point[0], point[1], point[2], rgb)?;
        }
        Ok(())
    }
}

/// Pack an RGB triple into the PCL convention: `0x00RRGGBB`.
fn pack_rgb(color: &[f64; 3]) -> u32 {
    let quantize = |v: f64| (v * 255.0).clamp(0.0, 255.0) as u32;
    (quantize(color[0]) << 16) | (quantize(color[1]) << 8) | quantize(color[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use kinema_ir::{ArticulationBuilder, LinkSpec, Pose, ShapeGeometry, VisualShape};
    use kinema_render::RenderScene;

    fn sphere_capture() -> (Frame, MountedCamera) {
        let mut builder = ArticulationBuilder::new("ball");
        builder
            .add_link(
                None,
                LinkSpec::named("ball").with_visual(VisualShape::new(
                    ShapeGeometry::Sphere { radius: 1.0 },
                    [0.0, 0.0, 0.5],
                )),
            )
            .unwrap();
        let articulation = builder.build().unwrap();

        let mut scene = RenderScene::new();
        scene.set_ambient_light([1.0, 1.0, 1.0]);
        scene.sync_articulation(&articulation, &[Pose::from_translation([5.0, 0.0, 0.0])]);

        let camera = MountedCamera::new(64, 64, 1.0, 0.1, 100.0);
        (camera.capture(&scene), camera)
    }

    #[test]
    fn test_unprojected_points_lie_on_the_sphere() {
        let (frame, camera) = sphere_capture();
        let cloud = PointCloud::from_depth_frame(&frame, &camera);
        assert!(!cloud.is_empty());
        assert_eq!(cloud.points.len(), cloud.colors.len());

        for point in &cloud.points {
            let to_center = [point[0] - 5.0, point[1], point[2]];
            let r = (to_center[0] * to_center[0]
                + to_center[1] * to_center[1]
                + to_center[2] * to_center[2])
                .sqrt();
            assert_relative_eq!(r, 1.0, epsilon = 2e-2);
        }
    }

    #[test]
    fn test_center_pixel_unprojects_straight_ahead() {
        let (frame, camera) = sphere_capture();
        let cloud = PointCloud::from_depth_frame(&frame, &camera);

        // The nearest point to the camera sits on the view axis.
        let nearest = cloud
            .points
            .iter()
            .min_by(|a, b| a[0].partial_cmp(&b[0]).unwrap())
            .unwrap();
        assert_relative_eq!(nearest[0], 4.0, epsilon = 2e-2);
        assert!(nearest[1].abs() < 0.1);
        assert!(nearest[2].abs() < 0.1);
    }

    #[test]
    fn test_pcd_header_and_rows() {
        let cloud = PointCloud {
            points: vec![[0.0, 1.0, 2.0], [3.0, 4.0, 5.0]],
            colors: vec![[0.0, 0.0, 0.5], [1.0, 1.0, 1.0]],
        };
        let path = std::env::temp_dir().join("kinema-capture-cloud.pcd");
        cloud.write_pcd(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# .PCD v0.7"));
        assert!(text.contains("POINTS 2"));
        assert!(text.contains("DATA ascii"));
        assert_eq!(text.lines().count(), 11 + 2);

        let last = text.lines().last().unwrap();
        assert!(last.ends_with(&format!("{}", 0x00ff_ffffu32)));
    }

    #[test]
    fn test_pack_rgb() {
        assert_eq!(pack_rgb(&[1.0, 0.0, 0.0]), 0x00ff_0000);
        assert_eq!(pack_rgb(&[0.0, 1.0, 0.0]), 0x0000_ff00);
        assert_eq!(pack_rgb(&[0.0, 0.0, 1.0]), 0x0000_00ff);
    }
}
