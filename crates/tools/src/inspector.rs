use glam::Vec3;
use knockabout_input::Direction;
use knockabout_kernel::{BodyHandle, PhysicsWorld};
use knockabout_render::{CameraController, RenderId};
use knockabout_scene::{DriverState, FrameDriver, PairIndex};
use std::fmt;

/// Scene inspector for developer tooling.
///
/// Provides read-only queries against a frame driver for logging, the
/// desktop HUD, and CLI output.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the driver's current state.
    pub fn summary<W: PhysicsWorld, C: CameraController>(
        driver: &FrameDriver<W, C>,
    ) -> FrameSummary {
        let scene = driver.scene();
        FrameSummary {
            state: driver.state(),
            frame: driver.frame(),
            steps: driver.stepper().steps(),
            sim_time: driver.stepper().sim_time(),
            bodies: scene.world.body_count(),
            pairs: scene.registry.len(),
            controlled_position: driver.controlled_pose().map(|p| p.position),
            controlled_velocity: driver.controlled_velocity(),
            held: driver.input().held().collect(),
            camera_eye: driver.camera().camera().eye,
        }
    }

    /// Body and renderable state of one registered pair.
    pub fn inspect_pair<W: PhysicsWorld, C: CameraController>(
        driver: &FrameDriver<W, C>,
        index: PairIndex,
    ) -> Option<PairInfo> {
        let scene = driver.scene();
        let pair = scene.registry.get(index)?;
        let pose = scene.world.pose(pair.body)?;
        let renderable = scene.render.get(pair.renderable)?;
        Some(PairInfo {
            index,
            body: pair.body,
            renderable: pair.renderable,
            position: pose.position,
            velocity: scene.world.linear_velocity(pair.body).unwrap_or(Vec3::ZERO),
            scale: renderable.transform.scale,
        })
    }
}

/// Snapshot of the frame loop.
#[derive(Debug, Clone)]
pub struct FrameSummary {
    pub state: DriverState,
    pub frame: u64,
    pub steps: u64,
    pub sim_time: f64,
    pub bodies: usize,
    pub pairs: usize,
    pub controlled_position: Option<Vec3>,
    pub controlled_velocity: Option<Vec3>,
    pub held: Vec<Direction>,
    pub camera_eye: Vec3,
}

impl fmt::Display for FrameSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frame={} steps={} t={:.3}s bodies={} synced={}",
            self.frame, self.steps, self.sim_time, self.bodies, self.pairs
        )?;
        if let Some(p) = self.controlled_position {
            write!(f, " player=({:.2}, {:.2}, {:.2})", p.x, p.y, p.z)?;
        }
        if let Some(v) = self.controlled_velocity {
            write!(f, " vel=({:.2}, {:.2}, {:.2})", v.x, v.y, v.z)?;
        }
        if !self.held.is_empty() {
            write!(f, " held={:?}", self.held)?;
        }
        Ok(())
    }
}

/// Detailed info about a single body/renderable pair.
#[derive(Debug, Clone)]
pub struct PairInfo {
    pub index: PairIndex,
    pub body: BodyHandle,
    pub renderable: RenderId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub scale: Vec3,
}

impl fmt::Display for PairInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pair [{}] body={} pos=({:.2}, {:.2}, {:.2}) vel=({:.2}, {:.2}, {:.2}) scale=({:.2}, {:.2}, {:.2})",
            self.index.0,
            self.body.0,
            self.position.x,
            self.position.y,
            self.position.z,
            self.velocity.x,
            self.velocity.y,
            self.velocity.z,
            self.scale.x,
            self.scale.y,
            self.scale.z,
        )
    }
}
