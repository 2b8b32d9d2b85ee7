//! Rendering Adapter: renderer-agnostic scene, cameras, and renderer interface.
//!
//! # Invariants
//! - Renderers read the scene and camera; they never mutate either.
//! - Renderable poses change only through `RenderScene::set_pose`.
//!
//! `DebugTextRenderer` is the headless implementation; GPU backends live in
//! their own crates behind the same trait.

mod camera;
mod renderer;
mod scene;

pub use camera::{CameraController, OrbitCamera, OrbitSettings, PerspectiveCamera};
pub use renderer::{DebugTextRenderer, Renderer};
pub use scene::{Lighting, MeshKind, RenderId, RenderScene, Renderable, VisualMaterial};
