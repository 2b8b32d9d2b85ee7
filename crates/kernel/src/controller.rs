use crate::physics::{BodyHandle, PhysicsError, PhysicsWorld};
use glam::{Vec2, Vec3};
use knockabout_input::{Direction, InputState};
use serde::{Deserialize, Serialize};

/// Per-axis priority: the first held direction in the list sets the axis,
/// with the given sign. Back beats forward and right beats left; opposite keys
/// never cancel to zero.
const X_PRIORITY: [(Direction, f32); 2] = [(Direction::Right, 1.0), (Direction::Left, -1.0)];
const Z_PRIORITY: [(Direction, f32); 2] = [(Direction::Back, 1.0), (Direction::Forward, -1.0)];

/// When a jump request is honored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JumpPolicy {
    /// Always jump, airborne or not. Re-triggering mid-air resets vertical velocity.
    #[default]
    AllowAirborne,
    /// Only jump while the body is in contact with the ground.
    RequireGround,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSettings {
    /// Horizontal speed in units per second while a direction is held.
    pub speed: f32,
    /// Vertical velocity set by a jump.
    pub jump_velocity: f32,
    pub jump_policy: JumpPolicy,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            speed: 10.0,
            jump_velocity: 5.0,
            jump_policy: JumpPolicy::AllowAirborne,
        }
    }
}

/// Turns held directions into a velocity override on one body.
#[derive(Debug, Clone)]
pub struct KinematicController {
    settings: ControlSettings,
}

impl KinematicController {
    pub fn new(settings: ControlSettings) -> Result<Self, PhysicsError> {
        if !settings.speed.is_finite() || settings.speed < 0.0 {
            return Err(PhysicsError::InvalidParameter(format!(
                "speed must be finite and >= 0, got {}",
                settings.speed
            )));
        }
        if !settings.jump_velocity.is_finite() {
            return Err(PhysicsError::InvalidParameter(format!(
                "jump_velocity must be finite, got {}",
                settings.jump_velocity
            )));
        }
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &ControlSettings {
        &self.settings
    }

    /// Horizontal velocity `(x, z)` for the given input.
    pub fn horizontal_velocity(&self, input: &InputState) -> Vec2 {
        Vec2::new(
            axis_value(input, &X_PRIORITY) * self.settings.speed,
            axis_value(input, &Z_PRIORITY) * self.settings.speed,
        )
    }

    /// Overwrite the body's X and Z velocity from `input`; Y is left to gravity.
    pub fn apply_movement<W: PhysicsWorld + ?Sized>(
        &self,
        world: &mut W,
        body: BodyHandle,
        input: &InputState,
    ) -> Result<Vec3, PhysicsError> {
        let current = world
            .linear_velocity(body)
            .ok_or(PhysicsError::UnknownBody(body))?;
        let h = self.horizontal_velocity(input);
        let velocity = Vec3::new(h.x, current.y, h.y);
        world.set_linear_velocity(body, velocity)?;
        Ok(velocity)
    }

    /// Set the body's vertical velocity to the jump value, subject to the jump
    /// policy. Returns whether the jump happened.
    pub fn apply_jump<W: PhysicsWorld + ?Sized>(
        &self,
        world: &mut W,
        body: BodyHandle,
    ) -> Result<bool, PhysicsError> {
        if self.settings.jump_policy == JumpPolicy::RequireGround && !world.is_grounded(body) {
            tracing::debug!(?body, "jump refused: airborne");
            return Ok(false);
        }
        let current = world
            .linear_velocity(body)
            .ok_or(PhysicsError::UnknownBody(body))?;
        world.set_linear_velocity(
            body,
            Vec3::new(current.x, self.settings.jump_velocity, current.z),
        )?;
        tracing::debug!(?body, vy = self.settings.jump_velocity, "jump");
        Ok(true)
    }
}

fn axis_value(input: &InputState, priority: &[(Direction, f32)]) -> f32 {
    priority
        .iter()
        .find(|(direction, _)| input.is_held(*direction))
        .map_or(0.0, |(_, sign)| *sign)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{BodyDesc, Shape};
    use crate::rapier::RapierWorld;

    const SPEED: f32 = 10.0;

    fn controller(policy: JumpPolicy) -> KinematicController {
        KinematicController::new(ControlSettings {
            speed: SPEED,
            jump_velocity: 5.0,
            jump_policy: policy,
        })
        .unwrap()
    }

    fn held(directions: &[Direction]) -> InputState {
        let mut s = InputState::new();
        for d in directions {
            s.set_held(*d, true);
        }
        s
    }

    fn floating_body() -> (RapierWorld, BodyHandle) {
        let mut w = RapierWorld::default();
        let b = w
            .add_body(&BodyDesc::dynamic(Shape::Ball { radius: 0.5 }, 1.0).at(Vec3::new(0.0, 5.0, 0.0)))
            .unwrap();
        (w, b)
    }

    #[test]
    fn forward_is_negative_z() {
        let c = controller(JumpPolicy::AllowAirborne);
        assert_eq!(
            c.horizontal_velocity(&held(&[Direction::Forward])),
            Vec2::new(0.0, -SPEED)
        );
    }

    #[test]
    fn single_directions() {
        let c = controller(JumpPolicy::AllowAirborne);
        assert_eq!(c.horizontal_velocity(&held(&[Direction::Back])), Vec2::new(0.0, SPEED));
        assert_eq!(c.horizontal_velocity(&held(&[Direction::Left])), Vec2::new(-SPEED, 0.0));
        assert_eq!(c.horizontal_velocity(&held(&[Direction::Right])), Vec2::new(SPEED, 0.0));
    }

    #[test]
    fn opposite_keys_follow_priority() {
        let c = controller(JumpPolicy::AllowAirborne);
        let v = c.horizontal_velocity(&held(&[Direction::Forward, Direction::Back]));
        assert_eq!(v.y, SPEED);
        let v = c.horizontal_velocity(&held(&[Direction::Left, Direction::Right]));
        assert_eq!(v.x, SPEED);
    }

    #[test]
    fn diagonal_is_not_normalized() {
        let c = controller(JumpPolicy::AllowAirborne);
        let v = c.horizontal_velocity(&held(&[Direction::Forward, Direction::Left]));
        assert_eq!(v, Vec2::new(-SPEED, -SPEED));
    }

    #[test]
    fn movement_keeps_vertical_velocity() {
        let (mut w, b) = floating_body();
        w.set_linear_velocity(b, Vec3::new(0.0, -3.0, 0.0)).unwrap();
        let c = controller(JumpPolicy::AllowAirborne);
        let v = c.apply_movement(&mut w, b, &held(&[Direction::Forward])).unwrap();
        assert_eq!(v, Vec3::new(0.0, -3.0, -SPEED));
        assert_eq!(w.linear_velocity(b), Some(v));
    }

    #[test]
    fn releasing_all_keys_zeroes_horizontal() {
        let (mut w, b) = floating_body();
        w.set_linear_velocity(b, Vec3::new(7.0, 1.0, -4.0)).unwrap();
        let c = controller(JumpPolicy::AllowAirborne);
        let v = c.apply_movement(&mut w, b, &InputState::new()).unwrap();
        assert_eq!(v.x, 0.0);
        assert_eq!(v.z, 0.0);
        assert_eq!(v.y, 1.0);
    }

    #[test]
    fn jump_overrides_vertical_velocity_every_time() {
        let (mut w, b) = floating_body();
        let c = controller(JumpPolicy::AllowAirborne);

        w.set_linear_velocity(b, Vec3::new(2.0, -8.0, 1.0)).unwrap();
        assert!(c.apply_jump(&mut w, b).unwrap());
        assert_eq!(w.linear_velocity(b), Some(Vec3::new(2.0, 5.0, 1.0)));

        // Already rising: a second jump still resets to the fixed value
        w.set_linear_velocity(b, Vec3::new(2.0, 3.5, 1.0)).unwrap();
        assert!(c.apply_jump(&mut w, b).unwrap());
        assert_eq!(w.linear_velocity(b).unwrap().y, 5.0);
    }

    #[test]
    fn ground_policy_refuses_airborne_jump() {
        let (mut w, b) = floating_body();
        let c = controller(JumpPolicy::RequireGround);
        assert!(!c.apply_jump(&mut w, b).unwrap());
        assert_eq!(w.linear_velocity(b).unwrap().y, 0.0);
    }

    #[test]
    fn ground_policy_allows_jump_when_resting() {
        let mut w = RapierWorld::default();
        w.add_body(&BodyDesc::fixed(Shape::Plane)).unwrap();
        let cube = w
            .add_body(
                &BodyDesc::dynamic(
                    Shape::Cuboid {
                        half_extents: Vec3::splat(0.5),
                    },
                    10.0,
                )
                .at(Vec3::new(0.0, 0.5, 0.0)),
            )
            .unwrap();
        for _ in 0..60 {
            w.step(1.0 / 60.0);
        }
        assert!(w.is_grounded(cube));

        let c = controller(JumpPolicy::RequireGround);
        assert!(c.apply_jump(&mut w, cube).unwrap());
        assert_eq!(w.linear_velocity(cube).unwrap().y, 5.0);
    }

    #[test]
    fn unknown_body_is_an_error() {
        let mut w = RapierWorld::default();
        let c = controller(JumpPolicy::AllowAirborne);
        assert!(c.apply_movement(&mut w, BodyHandle(3), &InputState::new()).is_err());
        assert!(c.apply_jump(&mut w, BodyHandle(3)).is_err());
    }

    #[test]
    fn rejects_bad_settings() {
        let bad_speed = ControlSettings {
            speed: -1.0,
            ..ControlSettings::default()
        };
        assert!(KinematicController::new(bad_speed).is_err());
        let bad_jump = ControlSettings {
            jump_velocity: f32::INFINITY,
            ..ControlSettings::default()
        };
        assert!(KinematicController::new(bad_jump).is_err());
    }
}
