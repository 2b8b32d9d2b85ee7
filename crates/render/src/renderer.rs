use crate::camera::PerspectiveCamera;
use crate::scene::RenderScene;
use knockabout_common::Viewport;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer reads the scene and camera and produces output. It never writes
/// back into the scene; poses are owned by physics.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&mut self, scene: &RenderScene, camera: &PerspectiveCamera) -> Self::Output;

    /// Adapt the drawing surface to a new size.
    fn resize(&mut self, viewport: Viewport);
}

/// Debug text renderer.
///
/// Produces a human-readable listing of the scene. Used by the CLI and for
/// testing the frame loop without a GPU.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    viewport: Viewport,
    frames: u64,
}

impl DebugTextRenderer {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            frames: 0,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&mut self, scene: &RenderScene, camera: &PerspectiveCamera) -> String {
        self.frames += 1;
        let mut out = String::new();
        out.push_str(&format!(
            "=== Frame {} ({}x{}, clear={}) ===\n",
            self.frames, self.viewport.width, self.viewport.height, scene.clear_color
        ));
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) aspect={:.3}\n",
            camera.eye.x,
            camera.eye.y,
            camera.eye.z,
            camera.target.x,
            camera.target.y,
            camera.target.z,
            camera.aspect
        ));
        out.push_str(&format!("Renderables: {}\n", scene.len()));

        for (id, r) in scene.iter() {
            let p = r.transform.position;
            out.push_str(&format!(
                "  [{:>3}] {:?} pos=({:.2}, {:.2}, {:.2}) color={}\n",
                id.0, r.mesh, p.x, p.y, p.z, r.material.color
            ));
        }

        out
    }

    fn resize(&mut self, viewport: Viewport) {
        tracing::debug!(width = viewport.width, height = viewport.height, "debug renderer resized");
        self.viewport = viewport;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{MeshKind, Renderable, VisualMaterial};
    use glam::Vec3;
    use knockabout_common::{Color, Transform};

    #[test]
    fn debug_renderer_empty_scene() {
        let scene = RenderScene::default();
        let mut renderer = DebugTextRenderer::new(Viewport::new(800, 600));
        let output = renderer.render(&scene, &PerspectiveCamera::default());

        assert!(output.contains("Frame 1"));
        assert!(output.contains("800x600"));
        assert!(output.contains("clear=#a2c4c9"));
        assert!(output.contains("Renderables: 0"));
    }

    #[test]
    fn debug_renderer_with_renderables() {
        let mut scene = RenderScene::default();
        scene.add(Renderable::new(
            MeshKind::Cube,
            VisualMaterial::matte(Color::from_hex(0xa64d79)),
            Transform::default(),
        ));
        scene.add(Renderable::new(
            MeshKind::Sphere,
            VisualMaterial::matte(Color::WHITE),
            Transform {
                position: Vec3::new(1.0, 2.0, 3.0),
                ..Transform::default()
            },
        ));

        let mut renderer = DebugTextRenderer::default();
        let output = renderer.render(&scene, &PerspectiveCamera::default());

        assert!(output.contains("Renderables: 2"));
        assert!(output.contains("Sphere pos=(1.00, 2.00, 3.00)"));
        assert!(output.contains("#a64d79"));

        // Header, camera, count, then one line per renderable
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("=== Frame 1"));
        assert!(lines[1].starts_with("Camera: eye=(0.0, 5.0, 8.0)"));
        assert!(lines[3].starts_with("  [  0] Cube"));
        assert!(output.ends_with('\n'));
    }

    #[test]
    fn resize_and_frame_count() {
        let scene = RenderScene::default();
        let mut renderer = DebugTextRenderer::default();
        renderer.resize(Viewport::new(1024, 768));
        renderer.render(&scene, &PerspectiveCamera::default());
        let output = renderer.render(&scene, &PerspectiveCamera::default());
        assert_eq!(renderer.frames(), 2);
        assert_eq!(renderer.viewport(), Viewport::new(1024, 768));
        assert!(output.contains("Frame 2 (1024x768"));
    }
}
