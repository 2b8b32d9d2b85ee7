//! `rapier3d` implementation of [`PhysicsWorld`].
//!
//! nalgebra types never leave this module; the rest of the workspace talks glam.

use crate::physics::{BodyDesc, BodyHandle, PhysicsError, PhysicsWorld, Shape};
use glam::{Quat, Vec3};
use knockabout_common::Pose;
use rapier3d::na::Vector3;
use rapier3d::prelude::{
    CCDSolver, ColliderBuilder, ColliderHandle, ColliderSet, DefaultBroadPhase, ImpulseJointSet,
    IntegrationParameters, IslandManager, MultibodyJointSet, NarrowPhase, PhysicsPipeline,
    QueryPipeline, RigidBodyBuilder, RigidBodyHandle, RigidBodySet,
};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Minimum Y of a contact's support normal for the body to count as standing on it.
const GROUND_NORMAL_MIN_Y: f32 = 0.7;

/// World-wide simulation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    pub gravity: Vec3,
    pub solver_iterations: u32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.82, 0.0),
            solver_iterations: 10,
        }
    }
}

impl PhysicsSettings {
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if !self.gravity.is_finite() {
            return Err(PhysicsError::InvalidParameter(format!(
                "gravity must be finite, got {}",
                self.gravity
            )));
        }
        if self.solver_iterations == 0 {
            return Err(PhysicsError::InvalidParameter(
                "solver_iterations must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct BodyEntry {
    body: RigidBodyHandle,
    collider: ColliderHandle,
}

/// All rapier state for one scene.
pub struct RapierWorld {
    gravity: Vector3<f32>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    /// Indexed by `BodyHandle.0`.
    entries: Vec<BodyEntry>,
}

impl RapierWorld {
    pub fn new(settings: PhysicsSettings) -> Result<Self, PhysicsError> {
        settings.validate()?;
        let iterations = NonZeroUsize::new(settings.solver_iterations as usize).ok_or_else(|| {
            PhysicsError::InvalidParameter("solver_iterations must be at least 1".into())
        })?;
        Ok(Self::build(settings.gravity, iterations))
    }

    fn build(gravity: Vec3, solver_iterations: NonZeroUsize) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.num_solver_iterations = solver_iterations;
        Self {
            gravity: to_na(gravity),
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            entries: Vec::new(),
        }
    }

    pub fn gravity(&self) -> Vec3 {
        to_glam(&self.gravity)
    }

    fn entry(&self, body: BodyHandle) -> Option<BodyEntry> {
        self.entries.get(body.0 as usize).copied()
    }
}

impl Default for RapierWorld {
    fn default() -> Self {
        let settings = PhysicsSettings::default();
        let iterations =
            NonZeroUsize::new(settings.solver_iterations as usize).unwrap_or(NonZeroUsize::MIN);
        Self::build(settings.gravity, iterations)
    }
}

impl PhysicsWorld for RapierWorld {
    fn add_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, PhysicsError> {
        desc.validate()?;

        let builder = if desc.is_fixed() {
            RigidBodyBuilder::fixed()
        } else {
            RigidBodyBuilder::dynamic()
        };
        let rigid_body = builder
            .translation(to_na(desc.position))
            .rotation(to_na(desc.rotation.to_scaled_axis()))
            .build();
        let body = self.bodies.insert(rigid_body);

        let collider = match desc.shape {
            Shape::Plane => ColliderBuilder::halfspace(Vector3::y_axis()),
            Shape::Cuboid { half_extents: h } => ColliderBuilder::cuboid(h.x, h.y, h.z),
            Shape::Ball { radius } => ColliderBuilder::ball(radius),
        }
        .restitution(desc.material.restitution)
        .friction(desc.material.friction);
        let collider = if desc.is_fixed() {
            collider
        } else {
            collider.mass(desc.mass)
        };
        let collider =
            self.colliders
                .insert_with_parent(collider.build(), body, &mut self.bodies);

        let handle = BodyHandle(self.entries.len() as u32);
        self.entries.push(BodyEntry { body, collider });
        tracing::trace!(?handle, shape = ?desc.shape, mass = desc.mass, "body added");
        Ok(handle)
    }

    fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
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
    }

    fn pose(&self, body: BodyHandle) -> Option<Pose> {
        let rb = self.bodies.get(self.entry(body)?.body)?;
        let r = rb.rotation();
        Some(Pose::new(
            to_glam(rb.translation()),
            Quat::from_xyzw(r.i, r.j, r.k, r.w),
        ))
    }

    fn linear_velocity(&self, body: BodyHandle) -> Option<Vec3> {
        let rb = self.bodies.get(self.entry(body)?.body)?;
        Some(to_glam(rb.linvel()))
    }

    fn set_linear_velocity(
        &mut self,
        body: BodyHandle,
        velocity: Vec3,
    ) -> Result<(), PhysicsError> {
        let entry = self.entry(body).ok_or(PhysicsError::UnknownBody(body))?;
        let rb = self
            .bodies
            .get_mut(entry.body)
            .ok_or(PhysicsError::UnknownBody(body))?;
        rb.set_linvel(to_na(velocity), true);
        Ok(())
    }

    fn is_grounded(&self, body: BodyHandle) -> bool {
        let Some(entry) = self.entry(body) else {
            return false;
        };
        self.narrow_phase
            .contact_pairs_with(entry.collider)
            .filter(|pair| pair.has_any_active_contact)
            .any(|pair| {
                pair.manifolds.iter().any(|manifold| {
                    // Manifold normals point away from collider1.
                    let support = if pair.collider1 == entry.collider {
                        -manifold.data.normal
                    } else {
                        manifold.data.normal
                    };
                    !manifold.points.is_empty() && support.y >= GROUND_NORMAL_MIN_Y
                })
            })
    }

    fn body_count(&self) -> usize {
        self.entries.len()
    }
}

fn to_na(v: Vec3) -> Vector3<f32> {
    Vector3::new(v.x, v.y, v.z)
}

fn to_glam(v: &Vector3<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::SurfaceMaterial;

    const DT: f32 = 1.0 / 60.0;

    fn world_with_ground() -> RapierWorld {
        let mut w = RapierWorld::default();
        w.add_body(&BodyDesc::fixed(Shape::Plane).with_material(SurfaceMaterial {
            restitution: 0.8,
            friction: 0.3,
        }))
        .unwrap();
        w
    }

    #[test]
    fn default_settings_match_demo() {
        let w = RapierWorld::default();
        assert_eq!(w.gravity(), Vec3::new(0.0, -9.82, 0.0));
        assert_eq!(w.body_count(), 0);
    }

    #[test]
    fn zero_solver_iterations_rejected() {
        let settings = PhysicsSettings {
            solver_iterations: 0,
            ..PhysicsSettings::default()
        };
        assert!(RapierWorld::new(settings).is_err());
    }

    #[test]
    fn invalid_body_rejected() {
        let mut w = RapierWorld::default();
        let r = w.add_body(&BodyDesc::dynamic(Shape::Ball { radius: -1.0 }, 1.0));
        assert!(matches!(r, Err(PhysicsError::InvalidShape(_))));
        assert_eq!(w.body_count(), 0);
    }

    #[test]
    fn ball_falls_under_gravity() {
        let mut w = RapierWorld::default();
        let ball = w
            .add_body(&BodyDesc::dynamic(Shape::Ball { radius: 0.5 }, 1.0).at(Vec3::new(0.0, 10.0, 0.0)))
            .unwrap();
        for _ in 0..30 {
            w.step(DT);
        }
        let pose = w.pose(ball).unwrap();
        assert!(pose.position.y < 10.0);
        assert!(w.linear_velocity(ball).unwrap().y < 0.0);
    }

    #[test]
    fn box_comes_to_rest_on_ground() {
        let mut w = world_with_ground();
        let cube = w
            .add_body(
                &BodyDesc::dynamic(
                    Shape::Cuboid {
                        half_extents: Vec3::splat(0.5),
                    },
                    10.0,
                )
                .at(Vec3::new(0.0, 2.0, 0.0)),
            )
            .unwrap();
        assert!(!w.is_grounded(cube));
        for _ in 0..180 {
            w.step(DT);
        }
        let y = w.pose(cube).unwrap().position.y;
        assert!((0.4..0.6).contains(&y), "box settled at y={y}");
        assert!(w.is_grounded(cube));
    }

    #[test]
    fn velocity_round_trips() {
        let mut w = RapierWorld::default();
        let ball = w
            .add_body(&BodyDesc::dynamic(Shape::Ball { radius: 0.3 }, 1.0))
            .unwrap();
        let v = Vec3::new(10.0, 5.0, -10.0);
        w.set_linear_velocity(ball, v).unwrap();
        assert_eq!(w.linear_velocity(ball), Some(v));
    }

    #[test]
    fn unknown_body_is_reported() {
        let mut w = RapierWorld::default();
        let ghost = BodyHandle(7);
        assert!(w.pose(ghost).is_none());
        assert!(w.linear_velocity(ghost).is_none());
        assert!(!w.is_grounded(ghost));
        assert!(matches!(
            w.set_linear_velocity(ghost, Vec3::ZERO),
            Err(PhysicsError::UnknownBody(_))
        ));
    }

    #[test]
    fn initial_rotation_is_kept() {
        let mut w = RapierWorld::default();
        let rot = Quat::from_rotation_y(0.75);
        let body = w
            .add_body(&BodyDesc::fixed(Shape::Ball { radius: 1.0 }).rotated(rot))
            .unwrap();
        let pose = w.pose(body).unwrap();
        assert!(pose.rotation.abs_diff_eq(rot, 1e-5));
    }
}
