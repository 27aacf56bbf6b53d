//! Physics scene management using Rapier3d.

use std::collections::HashMap;

use kinema_ir::{Articulation, JointKind, Pose};
use kinema_sim::{ArticulatedScene, DriveError, DriveTarget, StepError};
use nalgebra::{Isometry3, Vector3};
use rapier3d::dynamics::{
    CCDSolver, ImpulseJointHandle, ImpulseJointSet, IntegrationParameters, IslandManager,
    MultibodyJointSet, RigidBodyBuilder, RigidBodyHandle, RigidBodySet,
};
use rapier3d::geometry::{BroadPhaseMultiSap, ColliderBuilder, ColliderSet, NarrowPhase};
use rapier3d::pipeline::{PhysicsPipeline, QueryPipeline};
use serde::{Deserialize, Serialize};

use crate::colliders::build_collider;
use crate::error::SceneError;
use crate::joints::{build_joint, drive_axis, measure_position};

/// Scene-wide physical parameters.
///
/// The friction/restitution coefficients become the default contact
/// material of every collider created in the scene.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Gravity vector (the world is z-up).
    pub gravity: [f64; 3],
    /// Default static friction coefficient.
    pub static_friction: f64,
    /// Default dynamic friction coefficient.
    pub dynamic_friction: f64,
    /// Default restitution (elasticity of collision).
    pub restitution: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, 0.0, -9.81],
            static_friction: 10.0,
            dynamic_friction: 10.0,
            restitution: 0.1,
        }
    }
}

impl SceneConfig {
    /// The single Coulomb coefficient handed to Rapier. Rapier does not
    /// split static from dynamic friction, so the pair maps to its
    /// average.
    pub fn contact_friction(&self) -> f32 {
        ((self.static_friction + self.dynamic_friction) * 0.5) as f32
    }
}

/// Live state of one joint inside a spawned articulation.
struct SpawnedJoint {
    handle: ImpulseJointHandle,
    kind: JointKind,
    parent_link: usize,
    child_link: usize,
    frame_in_parent: Isometry3<f32>,
    frame_in_child: Isometry3<f32>,
    friction: f32,
    damping: f32,
    drive_stiffness: f32,
    drive_damping: f32,
    target_position: f32,
    target_velocity: f32,
}

/// Bookkeeping for the articulation hosted by a scene.
struct SpawnedArticulation {
    name: String,
    bodies: Vec<RigidBodyHandle>,
    link_names: Vec<String>,
    link_index: HashMap<String, usize>,
    link_joint: Vec<Option<usize>>,
    joints: Vec<SpawnedJoint>,
    joint_index: HashMap<String, usize>,
    /// Non-fixed joints, in joint order; defines the generalized
    /// coordinate layout of qpos/qvel/qf.
    dof_joints: Vec<usize>,
    qf: Vec<f64>,
}

/// A physics scene hosting one articulation over Rapier3d.
///
/// Topology comes in frozen (an [`Articulation`]); at runtime only joint
/// drive targets, applied generalized forces and body state change.
pub struct PhysicsScene {
    pipeline: PhysicsPipeline,
    gravity: Vector3<f32>,
    integration_params: IntegrationParameters,
    islands: IslandManager,
    broad_phase: BroadPhaseMultiSap,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,

    config: SceneConfig,
    articulation: Option<SpawnedArticulation>,
}

impl PhysicsScene {
    /// Create an empty scene.
    pub fn new(config: SceneConfig) -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: Vector3::new(
                config.gravity[0] as f32,
                config.gravity[1] as f32,
                config.gravity[2] as f32,
            ),
            integration_params: IntegrationParameters::default(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseMultiSap::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            config,
            articulation: None,
        }
    }

    /// Scene parameters.
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Add an infinite ground plane at the given altitude.
    pub fn add_ground(&mut self, altitude: f64) {
        let body = RigidBodyBuilder::fixed()
            .translation(Vector3::new(0.0, 0.0, altitude as f32))
            .build();
        let handle = self.bodies.insert(body);
        let collider = ColliderBuilder::halfspace(Vector3::z_axis())
            .friction(self.config.contact_friction())
            .restitution(self.config.restitution as f32)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
    }

    /// Spawn an articulation with its root link at `root_pose`.
    ///
    /// Every link starts at its zero joint coordinate: the world pose of
    /// a child is `parent * pose_in_parent * pose_in_child⁻¹`.
    pub fn spawn(&mut self, articulation: &Articulation, root_pose: Pose) -> Result<(), SceneError> {
        if let Some(existing) = &self.articulation {
            return Err(SceneError::AlreadySpawned(existing.name.clone()));
        }

        let links = articulation.links();
        let joints = articulation.joints();

        // Initial world placement, parents before children.
        let mut world = vec![Isometry3::<f64>::identity(); links.len()];
        for (i, link) in links.iter().enumerate() {
            world[i] = match (link.parent, link.joint) {
                (Some(p), Some(j)) => {
                    let joint = &joints[j];
                    world[p]
                        * joint.pose_in_parent.isometry()
                        * joint.pose_in_child.isometry().inverse()
                }
                _ => root_pose.isometry(),
            };
        }

        let mut body_handles = Vec::with_capacity(links.len());
        for (i, link) in links.iter().enumerate() {
            let body = RigidBodyBuilder::dynamic()
                .position(world[i].cast::<f32>())
                .build();
            let handle = self.bodies.insert(body);
            for shape in &link.collisions {
                let collider = build_collider(shape, &self.config);
                self.colliders
                    .insert_with_parent(collider, handle, &mut self.bodies);
            }
            body_handles.push(handle);
        }

        let mut spawned_joints = Vec::with_capacity(joints.len());
        for joint in joints {
            let Some(parent_link) = links[joint.child_link].parent else {
                continue;
            };
            let generic = build_joint(joint);
            let handle = self.impulse_joints.insert(
                body_handles[parent_link],
                body_handles[joint.child_link],
                generic,
                true,
            );
            spawned_joints.push(SpawnedJoint {
                handle,
                kind: joint.kind,
                parent_link,
                child_link: joint.child_link,
                frame_in_parent: joint.pose_in_parent.isometry().cast::<f32>(),
                frame_in_child: joint.pose_in_child.isometry().cast::<f32>(),
                friction: joint.friction as f32,
                damping: joint.damping as f32,
                drive_stiffness: 0.0,
                drive_damping: 0.0,
                target_position: 0.0,
                target_velocity: 0.0,
            });
        }

        let dof_joints: Vec<usize> = joints
            .iter()
            .enumerate()
            .filter(|(_, j)| j.kind != JointKind::Fixed)
            .map(|(i, _)| i)
            .collect();
        let qf = vec![0.0; dof_joints.len()];

        self.articulation = Some(SpawnedArticulation {
            name: articulation.name().to_string(),
            bodies: body_handles,
            link_names: links.iter().map(|l| l.name.clone()).collect(),
            link_index: links
                .iter()
                .enumerate()
                .map(|(i, l)| (l.name.clone(), i))
                .collect(),
            link_joint: links.iter().map(|l| l.joint).collect(),
            joints: spawned_joints,
            joint_index: joints
                .iter()
                .enumerate()
                .map(|(i, j)| (j.name.clone(), i))
                .collect(),
            dof_joints,
            qf,
        });
        Ok(())
    }

    /// Degrees of freedom of the spawned articulation.
    pub fn dof(&self) -> usize {
        self.articulation
            .as_ref()
            .map_or(0, |a| a.dof_joints.len())
    }

    fn resolve_joint(&self, name: &str) -> Result<usize, DriveError> {
        let art = self
            .articulation
            .as_ref()
            .ok_or_else(|| DriveError::UnknownJoint(name.to_string()))?;
        art.joint_index
            .get(name)
            .copied()
            .ok_or_else(|| DriveError::UnknownJoint(name.to_string()))
    }

    fn push_motor(impulse_joints: &mut ImpulseJointSet, joint: &SpawnedJoint) {
        if joint.kind == JointKind::Fixed {
            return;
        }
        if let Some(live) = impulse_joints.get_mut(joint.handle, true) {
            live.data.set_motor(
                drive_axis(joint.kind),
                joint.target_position,
                joint.target_velocity,
                joint.drive_stiffness,
                joint.drive_damping,
            );
        }
    }

    /// Configure a joint drive's stiffness and damping.
    pub fn set_drive_property(
        &mut self,
        name: &str,
        stiffness: f64,
        damping: f64,
    ) -> Result<(), DriveError> {
        let idx = self.resolve_joint(name)?;
        if let Some(art) = self.articulation.as_mut() {
            let joint = &mut art.joints[idx];
            joint.drive_stiffness = stiffness as f32;
            joint.drive_damping = damping as f32;
            Self::push_motor(&mut self.impulse_joints, &art.joints[idx]);
        }
        Ok(())
    }

    /// Set a joint's position drive target (radians or meters).
    pub fn set_drive_target(&mut self, name: &str, target: f64) -> Result<(), DriveError> {
        let idx = self.resolve_joint(name)?;
        if let Some(art) = self.articulation.as_mut() {
            art.joints[idx].target_position = target as f32;
            Self::push_motor(&mut self.impulse_joints, &art.joints[idx]);
        }
        Ok(())
    }

    /// Set a joint's velocity drive target (rad/s or m/s).
    pub fn set_drive_velocity_target(&mut self, name: &str, target: f64) -> Result<(), DriveError> {
        let idx = self.resolve_joint(name)?;
        if let Some(art) = self.articulation.as_mut() {
            art.joints[idx].target_velocity = target as f32;
            Self::push_motor(&mut self.impulse_joints, &art.joints[idx]);
        }
        Ok(())
    }

    /// World pose of a named link.
    pub fn link_pose(&self, name: &str) -> Option<Pose> {
        let art = self.articulation.as_ref()?;
        let body = self.bodies.get(art.bodies[*art.link_index.get(name)?])?;
        Some(Pose::from_isometry(&body.position().cast::<f64>()))
    }

    /// World pose of the root link.
    pub fn root_pose(&self) -> Option<Pose> {
        let art = self.articulation.as_ref()?;
        let body = self.bodies.get(*art.bodies.first()?)?;
        Some(Pose::from_isometry(&body.position().cast::<f64>()))
    }

    /// Linear and angular velocity of a named link.
    pub fn link_velocity(&self, name: &str) -> Option<([f64; 3], [f64; 3])> {
        let art = self.articulation.as_ref()?;
        let body = self.bodies.get(art.bodies[*art.link_index.get(name)?])?;
        let lin = body.linvel();
        let ang = body.angvel();
        Some((
            [lin.x as f64, lin.y as f64, lin.z as f64],
            [ang.x as f64, ang.y as f64, ang.z as f64],
        ))
    }

    /// World poses of all links, in link order.
    pub fn link_poses(&self) -> Vec<Pose> {
        let Some(art) = &self.articulation else {
            return Vec::new();
        };
        art.bodies
            .iter()
            .filter_map(|&h| self.bodies.get(h))
            .map(|b| Pose::from_isometry(&b.position().cast::<f64>()))
            .collect()
    }

    fn joint_position(&self, art: &SpawnedArticulation, joint: &SpawnedJoint) -> f64 {
        let (Some(parent), Some(child)) = (
            self.bodies.get(art.bodies[joint.parent_link]),
            self.bodies.get(art.bodies[joint.child_link]),
        ) else {
            return 0.0;
        };
        let frame_parent = parent.position() * joint.frame_in_parent;
        let frame_child = child.position() * joint.frame_in_child;
        measure_position(joint.kind, &frame_parent.inv_mul(&frame_child))
    }

    fn joint_axis_world(&self, art: &SpawnedArticulation, joint: &SpawnedJoint) -> Vector3<f32> {
        self.bodies
            .get(art.bodies[joint.parent_link])
            .map(|parent| (parent.position() * joint.frame_in_parent).rotation * Vector3::x())
            .unwrap_or_else(Vector3::x)
    }

    fn joint_velocity(&self, art: &SpawnedArticulation, joint: &SpawnedJoint) -> f64 {
        let (Some(parent), Some(child)) = (
            self.bodies.get(art.bodies[joint.parent_link]),
            self.bodies.get(art.bodies[joint.child_link]),
        ) else {
            return 0.0;
        };
        let axis = self.joint_axis_world(art, joint);
        match joint.kind {
            JointKind::Fixed => 0.0,
            JointKind::Revolute => f64::from((child.angvel() - parent.angvel()).dot(&axis)),
            JointKind::Prismatic => f64::from((child.linvel() - parent.linvel()).dot(&axis)),
        }
    }

    /// Measured generalized positions, one per DoF in joint order.
    pub fn qpos(&self) -> Vec<f64> {
        let Some(art) = &self.articulation else {
            return Vec::new();
        };
        art.dof_joints
            .iter()
            .map(|&i| self.joint_position(art, &art.joints[i]))
            .collect()
    }

    /// Measured generalized velocities, one per DoF in joint order.
    pub fn qvel(&self) -> Vec<f64> {
        let Some(art) = &self.articulation else {
            return Vec::new();
        };
        art.dof_joints
            .iter()
            .map(|&i| self.joint_velocity(art, &art.joints[i]))
            .collect()
    }

    /// Generalized forces that balance gravity on every joint: minus the
    /// torque (or force, for prismatic joints) gravity exerts about each
    /// joint axis through the subtree hanging off it. Setting the result
    /// with [`set_qf`](Self::set_qf) keeps drives from fighting gravity.
    pub fn compute_passive_forces(&self) -> Vec<f64> {
        let Some(art) = &self.articulation else {
            return Vec::new();
        };
        let slot: HashMap<usize, usize> = art
            .dof_joints
            .iter()
            .enumerate()
            .map(|(s, &j)| (j, s))
            .collect();
        let mut forces = vec![0.0f64; art.dof_joints.len()];

        for (link, &handle) in art.bodies.iter().enumerate() {
            let Some(body) = self.bodies.get(handle) else {
                continue;
            };
            let weight = self.gravity * body.mass();
            let com = *body.center_of_mass();

            // Every joint on the path to the root sees this link's weight.
            let mut at = link;
            while let Some(joint_idx) = art.link_joint[at] {
                let joint = &art.joints[joint_idx];
                if let Some(&s) = slot.get(&joint_idx) {
                    let Some(parent) = self.bodies.get(art.bodies[joint.parent_link]) else {
                        break;
                    };
                    let frame = parent.position() * joint.frame_in_parent;
                    let axis = frame.rotation * Vector3::x();
                    let generalized = match joint.kind {
                        JointKind::Revolute => {
                            let arm = com.coords - frame.translation.vector;
                            arm.cross(&weight).dot(&axis)
                        }
                        JointKind::Prismatic => weight.dot(&axis),
                        JointKind::Fixed => 0.0,
                    };
                    forces[s] -= f64::from(generalized);
                }
                at = joint.parent_link;
            }
        }
        forces
    }

    /// Set the generalized forces applied on every subsequent step, one
    /// entry per DoF in joint order.
    pub fn set_qf(&mut self, qf: &[f64]) -> Result<(), SceneError> {
        let art = self.articulation.as_mut().ok_or(SceneError::NoArticulation)?;
        if qf.len() != art.dof_joints.len() {
            return Err(SceneError::DofMismatch {
                expected: art.dof_joints.len(),
                got: qf.len(),
            });
        }
        art.qf.copy_from_slice(qf);
        Ok(())
    }

    /// Turn the stored generalized forces plus each joint's passive
    /// friction/damping into equal-and-opposite wrenches on the
    /// connected bodies.
    fn apply_joint_forces(&mut self) {
        let Some(art) = &self.articulation else {
            return;
        };

        let mut wrenches: Vec<(RigidBodyHandle, Vector3<f32>, bool)> = Vec::new();
        for (s, &joint_idx) in art.dof_joints.iter().enumerate() {
            let joint = &art.joints[joint_idx];
            let qvel = self.joint_velocity(art, joint) as f32;
            let mut generalized = art.qf[s] as f32 - joint.damping * qvel;
            if qvel.abs() > 1e-6 {
                generalized -= joint.friction * qvel.signum();
            }
            if generalized == 0.0 {
                continue;
            }
            let axis = self.joint_axis_world(art, joint);
            let wrench = axis * generalized;
            let is_torque = joint.kind == JointKind::Revolute;
            wrenches.push((art.bodies[joint.child_link], wrench, is_torque));
            wrenches.push((art.bodies[joint.parent_link], -wrench, is_torque));
        }

        let handles: Vec<RigidBodyHandle> = art.bodies.clone();
        for handle in handles {
            if let Some(body) = self.bodies.get_mut(handle) {
                body.reset_forces(true);
                body.reset_torques(true);
            }
        }
        for (handle, wrench, is_torque) in wrenches {
            if let Some(body) = self.bodies.get_mut(handle) {
                if is_torque {
                    body.add_torque(wrench, true);
                } else {
                    body.add_force(wrench, true);
                }
            }
        }
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// Fails with [`StepError::Diverged`] if any articulation body left
    /// finite space; the state is not salvageable afterwards.
    pub fn step(&mut self, dt: f64) -> Result<(), StepError> {
        self.integration_params.dt = dt as f32;
        self.apply_joint_forces();

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );

        if let Some(art) = &self.articulation {
            for (link, &handle) in art.bodies.iter().enumerate() {
                let finite = self
                    .bodies
                    .get(handle)
                    .is_some_and(|b| b.position().translation.vector.iter().all(|v| v.is_finite()));
                if !finite {
                    return Err(StepError::Diverged(format!(
                        "link '{}' left finite space",
                        art.link_names[link]
                    )));
                }
            }
        }
        Ok(())
    }
}

impl ArticulatedScene for PhysicsScene {
    fn set_drive_property(
        &mut self,
        joint: &str,
        stiffness: f64,
        damping: f64,
    ) -> Result<(), DriveError> {
        PhysicsScene::set_drive_property(self, joint, stiffness, damping)
    }

    fn apply_drive(&mut self, joint: &str, target: DriveTarget) -> Result<(), DriveError> {
        if let Some(position) = target.position {
            self.set_drive_target(joint, position)?;
        }
        if let Some(velocity) = target.velocity {
            self.set_drive_velocity_target(joint, velocity)?;
        }
        Ok(())
    }

    fn compensate_passive_forces(&mut self) {
        let forces = self.compute_passive_forces();
        // Length always matches the spawned articulation's DoF.
        let _ = self.set_qf(&forces);
    }

    fn step(&mut self, dt: f64) -> Result<(), StepError> {
        PhysicsScene::step(self, dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinema_ir::{
        ArticulationBuilder, CollisionShape, JointLimits, JointSpec, LinkSpec, ShapeGeometry,
    };

    /// Base box with a limited steering joint and a free wheel joint.
    fn small_rig() -> Articulation {
        let mut builder = ArticulationBuilder::new("rig");
        let base = builder
            .add_link(
                None,
                LinkSpec::named("base").with_collision(CollisionShape::new(
                    ShapeGeometry::Box {
                        half_extents: [0.5, 0.25, 0.125],
                    },
                    1.0,
                )),
            )
            .unwrap();
        let shaft = builder
            .add_link(
                Some(base),
                LinkSpec::named("shaft").with_collision(CollisionShape::new(
                    ShapeGeometry::Box {
                        half_extents: [0.05, 0.05, 0.05],
                    },
                    1.0,
                )),
            )
            .unwrap();
        builder
            .set_joint(
                shaft,
                JointSpec::revolute("steer", JointLimits::from_degrees(-15.0, 15.0))
                    .with_pose_in_parent(Pose::from_translation([0.35, 0.0, -0.125])),
            )
            .unwrap();
        let wheel = builder
            .add_link(
                Some(shaft),
                LinkSpec::named("wheel").with_collision(CollisionShape::new(
                    ShapeGeometry::Sphere { radius: 0.15 },
                    1.0,
                )),
            )
            .unwrap();
        builder
            .set_joint(
                wheel,
                JointSpec::revolute("gear", JointLimits::FREE)
                    .with_pose_in_parent(Pose::from_translation([0.0, 0.0, -0.1])),
            )
            .unwrap();
        builder.build().unwrap()
    }

    fn spawned_scene() -> PhysicsScene {
        let mut scene = PhysicsScene::new(SceneConfig::default());
        scene.add_ground(0.0);
        scene
            .spawn(&small_rig(), Pose::from_translation([0.0, 0.0, 1.0]))
            .unwrap();
        scene
    }

    #[test]
    fn test_spawn_creates_joint_addressing() {
        let mut scene = spawned_scene();
        assert_eq!(scene.dof(), 2);
        assert!(scene.set_drive_property("steer", 1000.0, 0.0).is_ok());
        assert!(matches!(
            scene.set_drive_target("ghost", 1.0),
            Err(DriveError::UnknownJoint(_))
        ));
        assert!(scene.link_pose("wheel").is_some());
        assert!(scene.link_pose("ghost").is_none());
    }

    #[test]
    fn test_spawn_twice_fails() {
        let mut scene = spawned_scene();
        let err = scene
            .spawn(&small_rig(), Pose::from_translation([0.0, 0.0, 3.0]))
            .unwrap_err();
        assert!(matches!(err, SceneError::AlreadySpawned(_)));
    }

    #[test]
    fn test_stepping_stays_finite() {
        let mut scene = spawned_scene();
        for _ in 0..50 {
            scene.step(1.0 / 100.0).unwrap();
        }
        let root = scene.root_pose().unwrap();
        assert!(root.p.iter().all(|v| v.is_finite()));
        assert_eq!(scene.qpos().len(), 2);
        assert_eq!(scene.qvel().len(), 2);
    }

    #[test]
    fn test_velocity_drive_spins_the_wheel() {
        let mut scene = spawned_scene();
        scene.set_drive_property("gear", 0.0, 1000.0).unwrap();
        scene.set_drive_velocity_target("gear", 5.0).unwrap();
        for _ in 0..100 {
            scene.step(1.0 / 100.0).unwrap();
        }
        let gear_vel = scene.qvel()[1];
        assert!(
            gear_vel > 0.5,
            "expected the gear to spin, measured {gear_vel}"
        );
    }

    #[test]
    fn test_passive_forces_compensate_hanging_weight() {
        // A single arm whose center of mass sits 0.3 m along +y from a
        // revolute joint about +x: gravity pulls it down with torque
        // -m·g·r about x, so the compensation must be positive.
        let mut builder = ArticulationBuilder::new("pendulum");
        let base = builder
            .add_link(
                None,
                LinkSpec::named("base").with_collision(CollisionShape::new(
                    ShapeGeometry::Box {
                        half_extents: [0.2, 0.2, 0.2],
                    },
                    10.0,
                )),
            )
            .unwrap();
        let arm = builder
            .add_link(
                Some(base),
                LinkSpec::named("arm").with_collision(CollisionShape::new(
                    ShapeGeometry::Sphere { radius: 0.1 },
                    1.0,
                )),
            )
            .unwrap();
        builder
            .set_joint(
                arm,
                JointSpec::revolute("hinge", JointLimits::FREE)
                    .with_pose_in_child(Pose::from_translation([0.0, -0.3, 0.0])),
            )
            .unwrap();

        let mut scene = PhysicsScene::new(SceneConfig::default());
        scene
            .spawn(&builder.build().unwrap(), Pose::from_translation([0.0, 0.0, 2.0]))
            .unwrap();

        let forces = scene.compute_passive_forces();
        assert_eq!(forces.len(), 1);
        assert!(
            forces[0] > 0.0,
            "compensation should oppose gravity, got {}",
            forces[0]
        );
        assert!(scene.set_qf(&forces).is_ok());
    }

    #[test]
    fn test_set_qf_length_mismatch() {
        let mut scene = spawned_scene();
        let err = scene.set_qf(&[0.0]).unwrap_err();
        assert!(matches!(
            err,
            SceneError::DofMismatch {
                expected: 2,
                got: 1
            }
        ));
    }
}
