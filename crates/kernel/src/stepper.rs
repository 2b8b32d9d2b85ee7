use crate::physics::PhysicsWorld;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How wall-clock frames map onto fixed simulation steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepMode {
    /// Exactly one step per rendered frame. Simulated time tracks frame count,
    /// not wall time, so it drifts on displays that are not at the tick rate.
    #[default]
    PerFrame,
    /// Accumulate wall time and take as many whole steps as fit, at most
    /// `max_steps_per_frame`; the remainder carries to the next frame.
    Accumulated { max_steps_per_frame: u32 },
}

/// Advances a `PhysicsWorld` in fixed increments and keeps simulated time.
#[derive(Debug, Clone)]
pub struct SimulationStepper {
    tick_rate_hz: u32,
    fixed_dt: f32,
    mode: StepMode,
    steps: u64,
    /// Wall time not yet consumed by a step (accumulated mode only).
    accumulator: Duration,
}

impl SimulationStepper {
    /// `tick_rate_hz` of zero is clamped to 1.
    pub fn new(tick_rate_hz: u32, mode: StepMode) -> Self {
        let tick_rate_hz = tick_rate_hz.max(1);
        Self {
            tick_rate_hz,
            fixed_dt: 1.0 / tick_rate_hz as f32,
            mode,
            steps: 0,
            accumulator: Duration::ZERO,
        }
    }

    pub fn tick_rate_hz(&self) -> u32 {
        self.tick_rate_hz
    }

    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    pub fn mode(&self) -> StepMode {
        self.mode
    }

    /// Total fixed steps taken.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Simulated seconds: `steps / tick_rate`, computed without accumulating
    /// per-step rounding.
    pub fn sim_time(&self) -> f64 {
        self.steps as f64 / self.tick_rate_hz as f64
    }

    /// Advance `world` by exactly one fixed timestep.
    pub fn step<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) {
        world.step(self.fixed_dt);
        self.steps += 1;
    }

    /// Advance for one rendered frame that took `frame_dt` of wall time.
    /// Returns the number of steps taken.
    pub fn advance<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W, frame_dt: Duration) -> u32 {
        match self.mode {
            StepMode::PerFrame => {
                self.step(world);
                1
            }
            StepMode::Accumulated {
                max_steps_per_frame,
            } => {
                let step = Duration::from_secs_f64(1.0 / self.tick_rate_hz as f64);
                self.accumulator += frame_dt;
                let mut taken = 0;
                while self.accumulator >= step && taken < max_steps_per_frame.max(1) {
                    self.accumulator -= step;
                    self.step(world);
                    taken += 1;
                }
                if taken == max_steps_per_frame.max(1) && self.accumulator >= step {
                    tracing::warn!(
                        dropped_ms = self.accumulator.as_secs_f64() * 1000.0,
                        "step budget exhausted, dropping backlog"
                    );
                    self.accumulator = Duration::ZERO;
                }
                taken
            }
        }
    }
}

impl Default for SimulationStepper {
    fn default() -> Self {
        Self::new(60, StepMode::PerFrame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{BodyDesc, BodyHandle, PhysicsError};
    use glam::Vec3;
    use knockabout_common::Pose;

    /// Records the `dt` of every step it is given.
    #[derive(Default)]
    struct StepLog {
        dts: Vec<f32>,
    }

    impl PhysicsWorld for StepLog {
        fn add_body(&mut self, _desc: &BodyDesc) -> Result<BodyHandle, PhysicsError> {
            Ok(BodyHandle(0))
        }
        fn step(&mut self, dt: f32) {
            self.dts.push(dt);
        }
        fn pose(&self, _body: BodyHandle) -> Option<Pose> {
            None
        }
        fn linear_velocity(&self, _body: BodyHandle) -> Option<Vec3> {
            None
        }
        fn set_linear_velocity(
            &mut self,
            body: BodyHandle,
            _velocity: Vec3,
        ) -> Result<(), PhysicsError> {
            Err(PhysicsError::UnknownBody(body))
        }
        fn is_grounded(&self, _body: BodyHandle) -> bool {
            false
        }
        fn body_count(&self) -> usize {
            0
        }
    }

    #[test]
    fn ten_steps_are_ten_sixtieths() {
        let mut world = StepLog::default();
        let mut stepper = SimulationStepper::default();
        for _ in 0..10 {
            stepper.step(&mut world);
        }
        assert_eq!(stepper.steps(), 10);
        assert_eq!(stepper.sim_time(), 10.0 / 60.0);
        assert!(world.dts.iter().all(|dt| *dt == 1.0 / 60.0));
    }

    #[test]
    fn per_frame_ignores_wall_clock() {
        let mut world = StepLog::default();
        let mut stepper = SimulationStepper::default();
        // A slow frame and a fast frame each take exactly one step
        assert_eq!(stepper.advance(&mut world, Duration::from_millis(100)), 1);
        assert_eq!(stepper.advance(&mut world, Duration::from_millis(1)), 1);
        assert_eq!(stepper.steps(), 2);
        assert_eq!(world.dts.len(), 2);
    }

    #[test]
    fn accumulated_mode_tracks_wall_time() {
        let mut world = StepLog::default();
        // 50 Hz keeps the step an exact number of milliseconds
        let mut stepper = SimulationStepper::new(
            50,
            StepMode::Accumulated {
                max_steps_per_frame: 5,
            },
        );
        // Display at twice the tick rate: a step every other frame
        let taken: u32 = (0..4)
            .map(|_| stepper.advance(&mut world, Duration::from_millis(10)))
            .sum();
        assert_eq!(taken, 2);

        // Display at half the tick rate: two steps per frame
        assert_eq!(stepper.advance(&mut world, Duration::from_millis(40)), 2);
        assert_eq!(world.dts.len(), 4);
    }

    #[test]
    fn accumulated_mode_caps_steps_and_drops_backlog() {
        let mut world = StepLog::default();
        let mut stepper = SimulationStepper::new(
            60,
            StepMode::Accumulated {
                max_steps_per_frame: 3,
            },
        );
        assert_eq!(stepper.advance(&mut world, Duration::from_secs(1)), 3);
        // Backlog was discarded, so a tiny frame takes nothing
        assert_eq!(stepper.advance(&mut world, Duration::from_millis(1)), 0);
    }

    #[test]
    fn zero_tick_rate_is_clamped() {
        let s = SimulationStepper::new(0, StepMode::PerFrame);
        assert_eq!(s.tick_rate_hz(), 1);
        assert_eq!(s.fixed_dt(), 1.0);
    }
}
