use glam::Vec3;
use knockabout_common::{Color, Pose, Transform};
use serde::{Deserialize, Serialize};

/// Index of a renderable inside its `RenderScene`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderId(pub u32);

/// Unit meshes every backend knows how to draw.
///
/// Cube and sphere are one unit across, the plane is a 1x1 quad in XZ facing +Y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKind {
    Cube,
    Sphere,
    Plane,
}

/// Surface appearance, in the standard metal/rough model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualMaterial {
    pub color: Color,
    #[serde(default = "default_roughness")]
    pub roughness: f32,
    #[serde(default)]
    pub metalness: f32,
}

fn default_roughness() -> f32 {
    1.0
}

impl VisualMaterial {
    pub fn matte(color: Color) -> Self {
        Self {
            color,
            roughness: 1.0,
            metalness: 0.0,
        }
    }
}

/// A visual object in the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Renderable {
    pub transform: Transform,
    pub mesh: MeshKind,
    pub material: VisualMaterial,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Renderable {
    pub fn new(mesh: MeshKind, material: VisualMaterial, transform: Transform) -> Self {
        Self {
            transform,
            mesh,
            material,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    pub fn casting_shadow(mut self) -> Self {
        self.cast_shadow = true;
        self
    }

    pub fn receiving_shadow(mut self) -> Self {
        self.receive_shadow = true;
        self
    }
}

/// Ambient plus one directional light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lighting {
    pub ambient: f32,
    /// Direction from the scene towards the light.
    pub light_direction: Vec3,
    pub light_intensity: f32,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: 0.5,
            light_direction: Vec3::ONE,
            light_intensity: 1.0,
        }
    }
}

/// Everything a renderer needs besides the camera.
#[derive(Debug, Clone)]
pub struct RenderScene {
    renderables: Vec<Renderable>,
    pub clear_color: Color,
    pub lighting: Lighting,
}

impl RenderScene {
    pub fn new(clear_color: Color, lighting: Lighting) -> Self {
        Self {
            renderables: Vec::new(),
            clear_color,
            lighting,
        }
    }

    pub fn add(&mut self, renderable: Renderable) -> RenderId {
        let id = RenderId(self.renderables.len() as u32);
        self.renderables.push(renderable);
        id
    }

    pub fn get(&self, id: RenderId) -> Option<&Renderable> {
        self.renderables.get(id.0 as usize)
    }

    /// Overwrite position and orientation. Returns false for an unknown id.
    pub fn set_pose(&mut self, id: RenderId, pose: Pose) -> bool {
        match self.renderables.get_mut(id.0 as usize) {
            Some(r) => {
                r.transform.set_pose(pose);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (RenderId, &Renderable)> {
        self.renderables
            .iter()
            .enumerate()
            .map(|(i, r)| (RenderId(i as u32), r))
    }

    pub fn len(&self) -> usize {
        self.renderables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderables.is_empty()
    }
}

impl Default for RenderScene {
    fn default() -> Self {
        Self::new(Color::from_hex(0xa2c4c9), Lighting::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn cube() -> Renderable {
        Renderable::new(
            MeshKind::Cube,
            VisualMaterial::matte(Color::WHITE),
            Transform::default(),
        )
    }

    #[test]
    fn ids_follow_insertion_order() {
        let mut scene = RenderScene::default();
        let a = scene.add(cube());
        let b = scene.add(cube().casting_shadow());
        assert_eq!(a, RenderId(0));
        assert_eq!(b, RenderId(1));
        assert_eq!(scene.len(), 2);
        assert!(scene.get(b).unwrap().cast_shadow);
        let ids: Vec<RenderId> = scene.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn set_pose_overwrites_position_and_rotation_only() {
        let mut scene = RenderScene::default();
        let mut r = cube();
        r.transform.scale = Vec3::splat(0.6);
        let id = scene.add(r);

        let pose = Pose::new(Vec3::new(3.0, 0.3, -1.0), Quat::from_rotation_x(0.2));
        assert!(scene.set_pose(id, pose));
        let t = scene.get(id).unwrap().transform;
        assert_eq!(t.pose(), pose);
        assert_eq!(t.scale, Vec3::splat(0.6));
    }

    #[test]
    fn set_pose_on_unknown_id() {
        let mut scene = RenderScene::default();
        assert!(!scene.set_pose(RenderId(4), Pose::default()));
    }
}
