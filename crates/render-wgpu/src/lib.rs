//! wgpu render backend for knockabout scenes.
//!
//! Draws planes, cubes and spheres as instanced meshes under ambient plus one
//! directional light, cleared to the scene's background color.
//!
//! # Invariants
//! - The renderer never writes to the scene; poses come from physics.
//! - Shadow flags on renderables are carried but not drawn.

mod batch;
mod gpu;
mod mesh;
mod shaders;

pub use gpu::{GpuError, GpuFrame, GpuSurface, WgpuRenderer};
