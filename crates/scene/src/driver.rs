use crate::config::SceneConfig;
use crate::error::SceneError;
use crate::registry::BodyRenderPair;
use crate::setup::Scene;
use crate::sync::TransformSynchronizer;
use glam::Vec3;
use knockabout_common::{Pose, Viewport};
use knockabout_input::{InputReceiver, InputState, KeyBindings};
use knockabout_kernel::{KinematicController, PhysicsWorld, SimulationStepper};
use knockabout_render::{CameraController, Renderer};
use std::time::Duration;

/// Lifecycle of a [`FrameDriver`]. There is no transition back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
}

/// Runs the per-frame pipeline: input, control, physics, sync, camera, render.
pub struct FrameDriver<W, C> {
    scene: Scene<W>,
    controlled: BodyRenderPair,
    controller: KinematicController,
    stepper: SimulationStepper,
    synchronizer: TransformSynchronizer,
    bindings: KeyBindings,
    input: InputState,
    receiver: InputReceiver,
    camera: C,
    state: DriverState,
    frame: u64,
}

impl<W: PhysicsWorld, C: CameraController> FrameDriver<W, C> {
    pub fn new(
        scene: Scene<W>,
        config: &SceneConfig,
        camera: C,
        receiver: InputReceiver,
    ) -> Result<Self, SceneError> {
        let controlled = scene
            .registry
            .controlled()
            .filter(|pair| scene.world.linear_velocity(pair.body).is_some())
            .ok_or(SceneError::NoControlledBody)?;
        let controller = KinematicController::new(config.control.settings())?;
        config.control.bindings.validate()?;

        Ok(Self {
            scene,
            controlled,
            controller,
            stepper: SimulationStepper::new(config.tick_rate_hz, config.step_mode),
            synchronizer: TransformSynchronizer::new(),
            bindings: config.control.bindings.clone(),
            input: InputState::new(),
            receiver,
            camera,
            state: DriverState::Idle,
            frame: 0,
        })
    }

    pub fn start(&mut self) {
        if self.state == DriverState::Idle {
            tracing::info!(
                tick_rate_hz = self.stepper.tick_rate_hz(),
                mode = ?self.stepper.mode(),
                "frame driver running"
            );
            self.state = DriverState::Running;
        }
    }

    /// Run one frame that took `frame_dt` of wall time. Returns the renderer's
    /// output, or `None` while idle.
    pub fn tick<R: Renderer>(&mut self, frame_dt: Duration, renderer: &mut R) -> Option<R::Output> {
        if self.state == DriverState::Idle {
            return None;
        }
        self.frame += 1;
        let _span = tracing::trace_span!("frame", frame = self.frame).entered();

        let frame_input = self.receiver.drain_into(&self.bindings, &mut self.input);

        let body = self.controlled.body;
        if let Err(e) = self
            .controller
            .apply_movement(&mut self.scene.world, body, &self.input)
        {
            tracing::error!("movement failed: {e}");
        }
        if frame_input.jump {
            if let Err(e) = self.controller.apply_jump(&mut self.scene.world, body) {
                tracing::error!("jump failed: {e}");
            }
        }

        let steps = self.stepper.advance(&mut self.scene.world, frame_dt);
        let synced = self.synchronizer.sync(
            &self.scene.world,
            &self.scene.registry,
            &mut self.scene.render,
        );
        tracing::trace!(events = frame_input.events, steps, synced, "frame stepped");

        self.camera.update();
        Some(renderer.render(&self.scene.render, self.camera.camera()))
    }

    /// Apply a new output size. Takes effect on the next render; no physics
    /// state is touched.
    pub fn resize<R: Renderer>(&mut self, viewport: Viewport, renderer: &mut R) {
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            "viewport resized"
        );
        self.camera.set_aspect(viewport.aspect());
        renderer.resize(viewport);
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Frames run since `start`.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn stepper(&self) -> &SimulationStepper {
        &self.stepper
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn scene(&self) -> &Scene<W> {
        &self.scene
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut C {
        &mut self.camera
    }

    pub fn controlled(&self) -> BodyRenderPair {
        self.controlled
    }

    pub fn controlled_pose(&self) -> Option<Pose> {
        self.scene.world.pose(self.controlled.body)
    }

    pub fn controlled_velocity(&self) -> Option<Vec3> {
        self.scene.world.linear_velocity(self.controlled.body)
    }
}
