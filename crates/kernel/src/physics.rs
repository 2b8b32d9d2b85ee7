use glam::{Quat, Vec3};
use knockabout_common::Pose;
use serde::{Deserialize, Serialize};

/// Opaque reference to a body owned by a `PhysicsWorld`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u32);

/// Collision shape of a body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// Infinite plane through the body origin, normal along the body's local +Y.
    Plane,
    Cuboid { half_extents: Vec3 },
    Ball { radius: f32 },
}

impl Shape {
    pub fn validate(&self) -> Result<(), PhysicsError> {
        match *self {
            Shape::Plane => Ok(()),
            Shape::Cuboid { half_extents } => {
                if half_extents.is_finite() && half_extents.min_element() > 0.0 {
                    Ok(())
                } else {
                    Err(PhysicsError::InvalidShape(format!(
                        "cuboid half extents must be positive, got {half_extents}"
                    )))
                }
            }
            Shape::Ball { radius } => {
                if radius.is_finite() && radius > 0.0 {
                    Ok(())
                } else {
                    Err(PhysicsError::InvalidShape(format!(
                        "ball radius must be positive, got {radius}"
                    )))
                }
            }
        }
    }
}

/// Contact response parameters of a body's surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceMaterial {
    pub restitution: f32,
    pub friction: f32,
}

impl Default for SurfaceMaterial {
    fn default() -> Self {
        Self {
            restitution: 0.3,
            friction: 0.3,
        }
    }
}

/// Everything needed to create a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub shape: Shape,
    /// Zero makes the body fixed (immovable).
    pub mass: f32,
    pub position: Vec3,
    pub rotation: Quat,
    pub material: SurfaceMaterial,
}

impl BodyDesc {
    pub fn fixed(shape: Shape) -> Self {
        Self {
            shape,
            mass: 0.0,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            material: SurfaceMaterial::default(),
        }
    }

    pub fn dynamic(shape: Shape, mass: f32) -> Self {
        Self {
            mass,
            ..Self::fixed(shape)
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_material(mut self, material: SurfaceMaterial) -> Self {
        self.material = material;
        self
    }

    pub fn is_fixed(&self) -> bool {
        self.mass == 0.0
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.rotation)
    }

    pub fn validate(&self) -> Result<(), PhysicsError> {
        self.shape.validate()?;
        if !self.mass.is_finite() || self.mass < 0.0 {
            return Err(PhysicsError::InvalidMass(self.mass));
        }
        if self.shape == Shape::Plane && !self.is_fixed() {
            return Err(PhysicsError::InvalidShape(
                "plane bodies must be fixed (mass 0)".into(),
            ));
        }
        if !self.position.is_finite() || !self.rotation.is_finite() {
            return Err(PhysicsError::InvalidParameter(
                "body position and rotation must be finite".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PhysicsError {
    #[error("invalid shape: {0}")]
    InvalidShape(String),
    #[error("invalid mass {0}: must be finite and >= 0")]
    InvalidMass(f32),
    #[error("body {0:?} is not in this world")]
    UnknownBody(BodyHandle),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// The rigid-body engine as seen by the frame loop.
///
/// Implementations own every body. Callers read and write poses and
/// velocities between steps only.
pub trait PhysicsWorld {
    fn add_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, PhysicsError>;

    /// Advance all bodies by `dt` seconds: gravity, contacts, constraints.
    fn step(&mut self, dt: f32);

    fn pose(&self, body: BodyHandle) -> Option<Pose>;

    fn linear_velocity(&self, body: BodyHandle) -> Option<Vec3>;

    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec3)
    -> Result<(), PhysicsError>;

    /// Whether the body rests on something below it.
    fn is_grounded(&self, body: BodyHandle) -> bool;

    fn body_count(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_and_dynamic_descs() {
        let ground = BodyDesc::fixed(Shape::Plane);
        assert!(ground.is_fixed());
        assert!(ground.validate().is_ok());

        let ball = BodyDesc::dynamic(Shape::Ball { radius: 0.3 }, 1.0).at(Vec3::Y);
        assert!(!ball.is_fixed());
        assert_eq!(ball.pose().position, Vec3::Y);
        assert!(ball.validate().is_ok());
    }

    #[test]
    fn rejects_degenerate_shapes() {
        assert!(Shape::Ball { radius: 0.0 }.validate().is_err());
        assert!(Shape::Ball { radius: f32::NAN }.validate().is_err());
        assert!(
            Shape::Cuboid {
                half_extents: Vec3::new(0.5, -0.5, 0.5)
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn rejects_negative_mass_and_dynamic_planes() {
        let negative = BodyDesc::dynamic(Shape::Ball { radius: 1.0 }, -1.0);
        assert!(matches!(negative.validate(), Err(PhysicsError::InvalidMass(_))));

        let moving_plane = BodyDesc::dynamic(Shape::Plane, 1.0);
        assert!(matches!(
            moving_plane.validate(),
            Err(PhysicsError::InvalidShape(_))
        ));
    }

    #[test]
    fn shape_yaml_form() {
        let s: Shape = serde_yaml::from_str("ball:\n  radius: 0.5\n").unwrap();
        assert_eq!(s, Shape::Ball { radius: 0.5 });
        let c: Shape = serde_yaml::from_str("cuboid:\n  half_extents: [0.5, 0.5, 0.5]\n").unwrap();
        assert_eq!(
            c,
            Shape::Cuboid {
                half_extents: Vec3::splat(0.5)
            }
        );
    }
}
