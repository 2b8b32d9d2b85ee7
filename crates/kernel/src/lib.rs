//! Simulation kernel: the physics collaborator seam, fixed-step stepping, and
//! input-driven kinematic control of one body.
//!
//! # Invariants
//! - Rigid-body dynamics live behind `PhysicsWorld`; nothing here integrates motion.
//! - One call to `SimulationStepper::step` advances simulated time by exactly one
//!   fixed timestep.
//! - The controller owns the horizontal velocity of the controlled body; gravity
//!   keeps owning the vertical component except on jump.

pub mod controller;
pub mod physics;
pub mod rapier;
pub mod stepper;

pub use controller::{ControlSettings, JumpPolicy, KinematicController};
pub use physics::{BodyDesc, BodyHandle, PhysicsError, PhysicsWorld, Shape, SurfaceMaterial};
pub use rapier::{PhysicsSettings, RapierWorld};
pub use stepper::{SimulationStepper, StepMode};
