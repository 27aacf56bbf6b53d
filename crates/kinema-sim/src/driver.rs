//! The discrete-time simulation loop.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{CaptureError, DriveError, StepError};
use crate::schedule::{DriveSchedule, DriveTarget};

/// The backend contract the driver steps against.
///
/// Implementations wrap one articulation inside a physics scene. All
/// joint addressing is by name; an unknown name fails with
/// [`DriveError::UnknownJoint`] and must leave every other joint's state
/// unchanged.
pub trait ArticulatedScene {
    /// Configure a joint actuator's stiffness and damping.
    fn set_drive_property(
        &mut self,
        joint: &str,
        stiffness: f64,
        damping: f64,
    ) -> Result<(), DriveError>;

    /// Push position/velocity targets to one named joint actuator.
    fn apply_drive(&mut self, joint: &str, target: DriveTarget) -> Result<(), DriveError>;

    /// Apply generalized forces compensating passive effects (gravity)
    /// so drives do not have to fight them. Called once per step before
    /// [`step`](Self::step) when enabled in [`SimConfig`].
    fn compensate_passive_forces(&mut self) {}

    /// Advance the physics state by one fixed timestep.
    fn step(&mut self, dt: f64) -> Result<(), StepError>;
}

/// Lifecycle of a [`Driver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, not yet run.
    Idle,
    /// Inside [`Driver::run`].
    Stepping,
    /// Run ended — completed, cancelled, or failed.
    Finished,
}

/// Loop parameters.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// Fixed timestep advanced per physics step, in seconds.
    pub dt: f64,
    /// Number of steps to run.
    pub steps: u64,
    /// Capture a sample every N steps (step indices 0, N, 2N, ...).
    /// `None` disables sampling.
    pub sample_interval: Option<u64>,
    /// Whether to apply passive-force compensation before each step.
    pub compensate_passive_forces: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 1.0 / 100.0,
            steps: 400,
            sample_interval: Some(4),
            compensate_passive_forces: true,
        }
    }
}

/// Cooperative cancellation handle, checked between steps, never
/// mid-step.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The driver finishes the step in flight and
    /// stops before the next one.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Last state pushed to one joint actuator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DriveTargetState {
    /// Last position target.
    pub position: f64,
    /// Last velocity target.
    pub velocity: f64,
    /// Drive stiffness.
    pub stiffness: f64,
    /// Drive damping.
    pub damping: f64,
}

/// Outcome of a completed (or cancelled) run.
#[derive(Debug)]
pub struct RunReport<Sample> {
    /// Captured samples, in step order.
    pub samples: Vec<Sample>,
    /// Physics steps successfully advanced.
    pub steps_completed: u64,
    /// Per-joint drive applications that failed (and were skipped).
    pub drive_failures: u64,
    /// Captures that failed (and were skipped).
    pub capture_failures: u64,
    /// Whether the run was cut short by cancellation.
    pub cancelled: bool,
}

/// Steps an [`ArticulatedScene`] under a [`DriveSchedule`].
///
/// Owns the loop state the procedural scripts kept in globals: the step
/// counter, the lifecycle phase, and the mirror of every joint's last
/// applied drive target.
pub struct Driver<'s, S: ArticulatedScene> {
    scene: &'s mut S,
    config: SimConfig,
    phase: Phase,
    step: u64,
    targets: HashMap<String, DriveTargetState>,
    cancel: CancelToken,
}

impl<'s, S: ArticulatedScene> Driver<'s, S> {
    /// Create a driver over a scene.
    pub fn new(scene: &'s mut S, config: SimConfig) -> Self {
        Self {
            scene,
            config,
            phase: Phase::Idle,
            step: 0,
            targets: HashMap::new(),
            cancel: CancelToken::new(),
        }
    }

    /// Install a cancellation token.
    pub fn set_cancel_token(&mut self, token: CancelToken) {
        self.cancel = token;
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Index of the next step to execute.
    pub fn current_step(&self) -> u64 {
        self.step
    }

    /// Last applied drive target per joint.
    pub fn targets(&self) -> &HashMap<String, DriveTargetState> {
        &self.targets
    }

    /// Configure a joint drive and record it in the target mirror.
    pub fn set_drive_property(
        &mut self,
        joint: &str,
        stiffness: f64,
        damping: f64,
    ) -> Result<(), DriveError> {
        self.scene.set_drive_property(joint, stiffness, damping)?;
        let state = self.targets.entry(joint.to_string()).or_default();
        state.stiffness = stiffness;
        state.damping = damping;
        Ok(())
    }

    /// Run the loop to completion.
    ///
    /// Each step: compute schedule commands, apply them per joint
    /// (failures are logged and skipped, the other joints still get
    /// their targets), compensate passive forces, advance physics, and
    /// — when the step index is a multiple of the sample interval —
    /// invoke `sampler`. A sampler failure skips the frame; a physics
    /// failure ends the run with the error.
    pub fn run<Sched, Samp, Sample>(
        &mut self,
        schedule: &Sched,
        mut sampler: Samp,
    ) -> Result<RunReport<Sample>, StepError>
    where
        Sched: DriveSchedule + ?Sized,
        Samp: FnMut(u64, &mut S) -> Result<Sample, CaptureError>,
    {
        self.phase = Phase::Stepping;
        let mut report = RunReport {
            samples: Vec::new(),
            steps_completed: 0,
            drive_failures: 0,
            capture_failures: 0,
            cancelled: false,
        };

        while self.step < self.config.steps {
            if self.cancel.is_cancelled() {
                debug!(step = self.step, "run cancelled");
                report.cancelled = true;
                break;
            }

            for command in schedule.commands(self.step) {
                match self.scene.apply_drive(&command.joint, command.target) {
                    Ok(()) => {
                        let state = self.targets.entry(command.joint).or_default();
                        if let Some(p) = command.target.position {
                            state.position = p;
                        }
                        if let Some(v) = command.target.velocity {
                            state.velocity = v;
                        }
                    }
                    Err(err) => {
                        warn!(step = self.step, %err, "drive target skipped");
                        report.drive_failures += 1;
                    }
                }
            }

            if self.config.compensate_passive_forces {
                self.scene.compensate_passive_forces();
            }

            if let Err(err) = self.scene.step(self.config.dt) {
                self.phase = Phase::Finished;
                return Err(err);
            }
            report.steps_completed += 1;

            if let Some(interval) = self.config.sample_interval {
                if interval > 0 && self.step % interval == 0 {
                    match sampler(self.step, self.scene) {
                        Ok(sample) => report.samples.push(sample),
                        Err(err) => {
                            warn!(step = self.step, %err, "frame capture skipped");
                            report.capture_failures += 1;
                        }
                    }
                }
            }

            self.step += 1;
        }

        self.phase = Phase::Finished;
        Ok(report)
    }

    /// Run without sampling, regardless of the configured interval.
    pub fn run_without_sampling<Sched>(
        &mut self,
        schedule: &Sched,
    ) -> Result<RunReport<()>, StepError>
    where
        Sched: DriveSchedule + ?Sized,
    {
        let interval = self.config.sample_interval.take();
        let result = self.run(schedule, |_, _| Ok(()));
        self.config.sample_interval = interval;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{DriveCommand, RampSchedule};
    use std::collections::HashSet;

    /// Scripted backend: a fixed joint set, optional failure step.
    struct ScriptedScene {
        joints: HashSet<String>,
        applied: Vec<(u64, String, DriveTarget)>,
        steps: u64,
        fail_at: Option<u64>,
        compensations: u64,
    }

    impl ScriptedScene {
        fn with_joints(names: &[&str]) -> Self {
            Self {
                joints: names.iter().map(|s| s.to_string()).collect(),
                applied: Vec::new(),
                steps: 0,
                fail_at: None,
                compensations: 0,
            }
        }
    }

    impl ArticulatedScene for ScriptedScene {
        fn set_drive_property(
            &mut self,
            joint: &str,
            _stiffness: f64,
            _damping: f64,
        ) -> Result<(), DriveError> {
            if self.joints.contains(joint) {
                Ok(())
            } else {
                Err(DriveError::UnknownJoint(joint.to_string()))
            }
        }

        fn apply_drive(&mut self, joint: &str, target: DriveTarget) -> Result<(), DriveError> {
            if !self.joints.contains(joint) {
                return Err(DriveError::UnknownJoint(joint.to_string()));
            }
            self.applied.push((self.steps, joint.to_string(), target));
            Ok(())
        }

        fn compensate_passive_forces(&mut self) {
            self.compensations += 1;
        }

        fn step(&mut self, _dt: f64) -> Result<(), StepError> {
            if self.fail_at == Some(self.steps) {
                return Err(StepError::Backend("scripted failure".to_string()));
            }
            self.steps += 1;
            Ok(())
        }
    }

    fn demo_schedule() -> RampSchedule {
        RampSchedule::new("front_gear", "front_shaft_joint")
    }

    #[test]
    fn test_sampling_interval_four_yields_100_frames() {
        let mut scene = ScriptedScene::with_joints(&["front_gear", "front_shaft_joint"]);
        let mut driver = Driver::new(&mut scene, SimConfig::default());

        let report = driver
            .run(&demo_schedule(), |step, _| Ok(step))
            .unwrap();

        assert_eq!(report.samples.len(), 100);
        assert_eq!(report.samples.first(), Some(&0));
        assert_eq!(report.samples.last(), Some(&396));
        assert!(report
            .samples
            .iter()
            .enumerate()
            .all(|(i, &s)| s == 4 * i as u64));
        assert_eq!(report.steps_completed, 400);
        assert_eq!(driver.phase(), Phase::Finished);
    }

    #[test]
    fn test_unknown_joint_does_not_block_other_targets() {
        struct TwoJointSchedule;
        impl DriveSchedule for TwoJointSchedule {
            fn commands(&self, _step: u64) -> Vec<DriveCommand> {
                vec![
                    DriveCommand {
                        joint: "ghost".to_string(),
                        target: DriveTarget::velocity(1.0),
                    },
                    DriveCommand {
                        joint: "real".to_string(),
                        target: DriveTarget::velocity(2.0),
                    },
                ]
            }
        }

        let mut scene = ScriptedScene::with_joints(&["real"]);
        let config = SimConfig {
            steps: 10,
            sample_interval: None,
            ..SimConfig::default()
        };
        let report = Driver::new(&mut scene, config)
            .run(&TwoJointSchedule, |_, _| Ok(()))
            .unwrap();

        // Loop completed; the ghost joint failed every step, the real
        // one was applied every step.
        assert_eq!(report.steps_completed, 10);
        assert_eq!(report.drive_failures, 10);
        assert_eq!(scene.applied.len(), 10);
        assert!(scene.applied.iter().all(|(_, joint, _)| joint == "real"));
    }

    #[test]
    fn test_targets_mirror_last_applied_values() {
        let mut scene = ScriptedScene::with_joints(&["front_gear", "front_shaft_joint"]);
        let config = SimConfig {
            steps: 100,
            sample_interval: None,
            ..SimConfig::default()
        };
        let mut driver = Driver::new(&mut scene, config);
        driver
            .set_drive_property("front_gear", 0.0, 1000.0)
            .unwrap();
        driver.run_without_sampling(&demo_schedule()).unwrap();

        let gear = &driver.targets()["front_gear"];
        assert_eq!(gear.velocity, 25.0);
        assert_eq!(gear.damping, 1000.0);
        let steer = &driver.targets()["front_shaft_joint"];
        assert_eq!(steer.position, 15.0_f64.to_radians());
    }

    #[test]
    fn test_step_failure_is_fatal() {
        let mut scene = ScriptedScene::with_joints(&["front_gear", "front_shaft_joint"]);
        scene.fail_at = Some(5);
        let mut driver = Driver::new(&mut scene, SimConfig::default());

        let err = driver
            .run(&demo_schedule(), |step, _| Ok(step))
            .unwrap_err();
        assert!(matches!(err, StepError::Backend(_)));
        assert_eq!(driver.phase(), Phase::Finished);
        assert_eq!(scene.steps, 5);
    }

    #[test]
    fn test_capture_failure_skips_frame_only() {
        let mut scene = ScriptedScene::with_joints(&["front_gear", "front_shaft_joint"]);
        let config = SimConfig {
            steps: 40,
            ..SimConfig::default()
        };
        let report = Driver::new(&mut scene, config)
            .run(&demo_schedule(), |step, _| {
                if step == 8 {
                    Err(CaptureError::Unavailable("renderer offline".to_string()))
                } else {
                    Ok(step)
                }
            })
            .unwrap();

        assert_eq!(report.steps_completed, 40);
        assert_eq!(report.capture_failures, 1);
        assert_eq!(report.samples.len(), 9);
        assert!(!report.samples.contains(&8));
    }

    #[test]
    fn test_cancellation_between_steps() {
        let mut scene = ScriptedScene::with_joints(&["front_gear", "front_shaft_joint"]);
        let config = SimConfig {
            steps: 400,
            sample_interval: Some(1),
            ..SimConfig::default()
        };
        let mut driver = Driver::new(&mut scene, config);
        let token = CancelToken::new();
        driver.set_cancel_token(token.clone());

        let cancel_at = 10;
        let report = driver
            .run(&demo_schedule(), |step, _| {
                if step == cancel_at {
                    token.cancel();
                }
                Ok(step)
            })
            .unwrap();

        assert!(report.cancelled);
        // The step in flight completed; nothing ran after it.
        assert_eq!(report.steps_completed, cancel_at + 1);
        assert_eq!(driver.phase(), Phase::Finished);
    }

    #[test]
    fn test_passive_force_compensation_toggle() {
        let mut scene = ScriptedScene::with_joints(&["front_gear", "front_shaft_joint"]);
        let config = SimConfig {
            steps: 7,
            sample_interval: None,
            compensate_passive_forces: false,
            ..SimConfig::default()
        };
        Driver::new(&mut scene, config)
            .run_without_sampling(&demo_schedule())
            .unwrap();
        assert_eq!(scene.compensations, 0);

        let config = SimConfig {
            steps: 7,
            sample_interval: None,
            compensate_passive_forces: true,
            ..SimConfig::default()
        };
        Driver::new(&mut scene, config)
            .run_without_sampling(&demo_schedule())
            .unwrap();
        assert_eq!(scene.compensations, 7);
    }
}
