//! kinema CLI — build demo articulations and drive them.
//!
//! `kinema car` runs the toy-car drive loop and records an animated GIF
//! from a chase camera; `kinema cloud` captures a single frame and
//! exports it as a colored point cloud.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use kinema_capture::{encode_gif, optimize_gif, save_png, GifSettings, PointCloud};
use kinema_ir::Pose;
use kinema_physics::{PhysicsScene, SceneConfig};
use kinema_render::{MountedCamera, RenderScene};
use kinema_sim::{CaptureError, Driver, RampSchedule, SimConfig};

mod car;

use car::{build_car, CarDimensions};

#[derive(Parser)]
#[command(name = "kinema")]
#[command(about = "Articulated-body simulation demos", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Contact and joint coefficients shared by the demos. Unset flags fall
/// back to the config file (if given), then to the scene defaults.
#[derive(Args)]
struct MaterialArgs {
    /// Static friction
    #[arg(long)]
    static_friction: Option<f64>,

    /// Dynamic friction
    #[arg(long)]
    dynamic_friction: Option<f64>,

    /// Restitution (elasticity of collision)
    #[arg(long)]
    restitution: Option<f64>,

    /// Joint friction
    #[arg(long)]
    joint_friction: Option<f64>,

    /// Joint damping (resistance proportional to joint velocity)
    #[arg(long)]
    joint_damping: Option<f64>,

    /// TOML file with scene parameters
    #[arg(long)]
    config: Option<PathBuf>,
}

impl MaterialArgs {
    fn scene_config(&self) -> Result<SceneConfig> {
        let mut config = match &self.config {
            Some(path) => toml::from_str(&std::fs::read_to_string(path)?)?,
            None => SceneConfig::default(),
        };
        if let Some(v) = self.static_friction {
            config.static_friction = v;
        }
        if let Some(v) = self.dynamic_friction {
            config.dynamic_friction = v;
        }
        if let Some(v) = self.restitution {
            config.restitution = v;
        }
        Ok(config)
    }

    fn joint_friction(&self) -> f64 {
        self.joint_friction.unwrap_or(0.0)
    }

    fn joint_damping(&self) -> f64 {
        self.joint_damping.unwrap_or(0.0)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Drive the toy car and record an animated GIF
    Car {
        #[command(flatten)]
        material: MaterialArgs,

        /// Number of simulation steps
        #[arg(long, default_value_t = 400)]
        steps: u64,

        /// Capture every Nth step
        #[arg(long, default_value_t = 4)]
        sample_interval: u64,

        /// Output GIF path
        #[arg(short, long, default_value = "car.gif")]
        output: PathBuf,

        /// Playback frame rate
        #[arg(long, default_value_t = 25)]
        fps: u32,

        /// Re-encode the GIF for size after writing it
        #[arg(long)]
        optimize: bool,
    },
    /// Capture a single frame of the car scene as a point cloud
    Cloud {
        #[command(flatten)]
        material: MaterialArgs,

        /// Output PCD path
        #[arg(short, long, default_value = "cloud.pcd")]
        output: PathBuf,

        /// Also write the color frame as a PNG
        #[arg(long)]
        png: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Car {
            material,
            steps,
            sample_interval,
            output,
            fps,
            optimize,
        } => run_car(&material, steps, sample_interval, &output, fps, optimize),
        Commands::Cloud {
            material,
            output,
            png,
        } => run_cloud(&material, &output, png.as_deref()),
    }
}

fn run_car(
    material: &MaterialArgs,
    steps: u64,
    sample_interval: u64,
    output: &std::path::Path,
    fps: u32,
    optimize: bool,
) -> Result<()> {
    let config = material.scene_config()?;
    let car = build_car(
        CarDimensions::default(),
        material.joint_friction(),
        material.joint_damping(),
        1.0,
    )?;
    println!("The articulation has {} degrees of freedom", car.dof());

    let mut scene = PhysicsScene::new(config);
    scene.add_ground(0.0);
    scene.spawn(&car, Pose::from_translation([0.0, 0.0, 0.34]))?;

    let mut render_scene = RenderScene::new();
    render_scene.add_ground(0.0);
    render_scene.set_ambient_light([0.5, 0.5, 0.5]);
    render_scene.add_directional_light([0.0, 1.0, -1.0], [0.5, 0.5, 0.5], true);

    // Chase camera: mounted at the car body, offset behind and above,
    // pitched down towards it.
    let mut camera = MountedCamera::new(1280, 720, 1.0, 0.001, 100.0).with_local_pose(
        Pose::from_euler([-12.0, 0.0, 14.0], 0.0, 2.0_f64.atan2(2.0), 0.0),
    );

    let sim = SimConfig {
        dt: 1.0 / 100.0,
        steps,
        sample_interval: (sample_interval > 0).then_some(sample_interval),
        compensate_passive_forces: true,
    };
    let mut driver = Driver::new(&mut scene, sim);
    driver.set_drive_property("front_shaft_joint", 1000.0, 0.0)?;
    driver.set_drive_property("front_gear", 0.0, 1000.0)?;
    driver.set_drive_property("back_gear", 0.0, 0.0)?;

    let schedule = RampSchedule::new("front_gear", "front_shaft_joint");
    let report = driver.run(&schedule, |_, scene| {
        let body = scene
            .root_pose()
            .ok_or_else(|| CaptureError::Unavailable("car body missing".to_string()))?;
        camera.set_mount_pose(Pose::from_translation(body.p));
        render_scene.sync_articulation(&car, &scene.link_poses());
        Ok(camera.capture(&render_scene))
    })?;

    println!(
        "Completed {} steps, captured {} frames ({} capture failures, {} drive failures)",
        report.steps_completed,
        report.samples.len(),
        report.capture_failures,
        report.drive_failures
    );

    encode_gif(output, &report.samples, &GifSettings { fps, speed: 10 })?;
    if optimize {
        optimize_gif(output)?;
    }
    println!("Wrote {}", output.display());
    Ok(())
}

fn run_cloud(
    material: &MaterialArgs,
    output: &std::path::Path,
    png: Option<&std::path::Path>,
) -> Result<()> {
    let config = material.scene_config()?;
    let car = build_car(
        CarDimensions::default(),
        material.joint_friction(),
        material.joint_damping(),
        1.0,
    )?;

    let mut scene = PhysicsScene::new(config);
    scene.add_ground(0.0);
    scene.spawn(&car, Pose::from_translation([0.0, 0.0, 0.34]))?;
    scene.step(1.0 / 100.0)?;

    let mut render_scene = RenderScene::new();
    render_scene.add_ground(0.0);
    render_scene.set_ambient_light([0.5, 0.5, 0.5]);
    render_scene.add_directional_light([0.0, 1.0, -1.0], [0.5, 0.5, 0.5], true);
    render_scene.sync_articulation(&car, &scene.link_poses());

    let camera = MountedCamera::new(640, 480, 35.0_f64.to_radians(), 0.1, 100.0)
        .with_local_pose(look_at_pose([3.0, -2.0, 3.0], [0.0, 0.0, 0.0]));
    let frame = camera.capture(&render_scene);

    if let Some(path) = png {
        save_png(path, &frame)?;
        println!("Wrote {}", path.display());
    }

    let cloud = PointCloud::from_depth_frame(&frame, &camera);
    cloud.write_pcd(output)?;
    println!("Wrote {} points to {}", cloud.len(), output.display());
    Ok(())
}

/// A camera pose at `eye` looking towards `target` (forward/left/up
/// convention, world z up).
fn look_at_pose(eye: [f64; 3], target: [f64; 3]) -> Pose {
    use nalgebra::{Matrix3, Rotation3, UnitQuaternion, Vector3};

    let forward = (Vector3::from(target) - Vector3::from(eye)).normalize();
    let left = Vector3::z().cross(&forward).normalize();
    let up = forward.cross(&left);

    let rotation = Rotation3::from_matrix_unchecked(Matrix3::from_columns(&[forward, left, up]));
    let q = UnitQuaternion::from_rotation_matrix(&rotation);
    Pose::new(eye, [q.w, q.i, q.j, q.k])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn test_look_at_points_forward_at_target() {
        let pose = look_at_pose([3.0, -2.0, 3.0], [0.0, 0.0, 0.0]);
        let iso = pose.isometry();
        let forward = iso.rotation * Vector3::x();
        let expected = (Vector3::new(0.0, 0.0, 0.0) - Vector3::new(3.0, -2.0, 3.0)).normalize();
        assert_relative_eq!(forward.dot(&expected), 1.0, epsilon = 1e-9);

        // Left stays horizontal, up has no downward component.
        let up = iso.rotation * Vector3::z();
        assert!(up.z > 0.0);
    }

    #[test]
    fn test_unset_flags_fall_back_to_defaults() {
        let material = MaterialArgs {
            static_friction: None,
            dynamic_friction: None,
            restitution: Some(0.4),
            joint_friction: None,
            joint_damping: None,
            config: None,
        };
        let config = material.scene_config().unwrap();
        assert_eq!(config.static_friction, 10.0);
        assert_eq!(config.restitution, 0.4);
        assert_eq!(material.joint_friction(), 0.0);
    }

    #[test]
    fn test_toml_config_under_flags() {
        let dir = std::env::temp_dir().join("kinema-cli-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("scene.toml");
        std::fs::write(&path, "static_friction = 2.0\nrestitution = 0.9\n").unwrap();

        let material = MaterialArgs {
            static_friction: None,
            dynamic_friction: None,
            restitution: Some(0.2),
            joint_friction: None,
            joint_damping: None,
            config: Some(path),
        };
        let config = material.scene_config().unwrap();
        assert_eq!(config.static_friction, 2.0);
        // The explicit flag wins over the file.
        assert_eq!(config.restitution, 0.2);
        // Unspecified fields keep their defaults.
        assert_eq!(config.dynamic_friction, 10.0);
    }
}
