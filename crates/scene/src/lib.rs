//! Scene assembly and the frame loop.
//!
//! A `SceneConfig` is turned into a physics world, a render scene, and the
//! registry pairing them. `FrameDriver` then runs input, control, physics,
//! transform sync, camera, and render once per displayed frame.
//!
//! # Invariants
//! - The registry is fixed after setup; nothing spawns or despawns.
//! - After the sync phase and before render, every registered renderable has
//!   its body's exact position and orientation.
//! - Resizing never touches physics state.

pub mod config;
pub mod driver;
pub mod error;
pub mod registry;
pub mod setup;
pub mod sync;

pub use config::{
    ControlConfig, GroundConfig, PRESETS, PlayerConfig, PyramidConfig, SceneConfig,
};
pub use driver::{DriverState, FrameDriver};
pub use error::SceneError;
pub use registry::{BodyRegistry, BodyRegistryBuilder, BodyRenderPair, PairIndex};
pub use setup::{Scene, build_scene, populate_scene};
pub use sync::TransformSynchronizer;
