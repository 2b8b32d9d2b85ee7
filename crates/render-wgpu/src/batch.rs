use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use knockabout_render::{MeshKind, RenderScene, Renderable};
use std::ops::Range;

/// Draw order of the mesh kinds inside the instance buffer.
pub(crate) const MESH_ORDER: [MeshKind; 3] = [MeshKind::Plane, MeshKind::Cube, MeshKind::Sphere];

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
}

impl InstanceData {
    fn from_renderable(r: &Renderable) -> Self {
        let t = &r.transform;
        let cols = Mat4::from_scale_rotation_translation(t.scale, t.rotation, t.position)
            .to_cols_array_2d();
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color: r.material.color.to_linear_rgba(),
        }
    }
}

/// Per-frame instance data, grouped so that each mesh kind occupies one
/// contiguous range of the instance buffer.
#[derive(Debug, Default)]
pub(crate) struct InstanceBatch {
    pub instances: Vec<InstanceData>,
    /// Indexed like `MESH_ORDER`.
    pub ranges: [Range<u32>; 3],
    /// Renderables left out because the buffer was full.
    pub dropped: usize,
}

impl InstanceBatch {
    pub fn build(scene: &RenderScene, max_instances: usize) -> Self {
        let mut batch = Self {
            instances: Vec::with_capacity(scene.len().min(max_instances)),
            ..Self::default()
        };
        for (slot, kind) in MESH_ORDER.iter().enumerate() {
            let start = batch.instances.len() as u32;
            for (_, r) in scene.iter().filter(|(_, r)| r.mesh == *kind) {
                if batch.instances.len() >= max_instances {
                    batch.dropped += 1;
                    continue;
                }
                batch.instances.push(InstanceData::from_renderable(r));
            }
            batch.ranges[slot] = start..batch.instances.len() as u32;
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use knockabout_common::{Color, Transform};
    use knockabout_render::VisualMaterial;

    fn renderable(mesh: MeshKind, x: f32) -> Renderable {
        Renderable::new(
            mesh,
            VisualMaterial::matte(Color::WHITE),
            Transform {
                position: Vec3::new(x, 0.0, 0.0),
                ..Transform::default()
            },
        )
    }

    #[test]
    fn groups_by_mesh_kind() {
        let mut scene = RenderScene::default();
        scene.add(renderable(MeshKind::Sphere, 1.0));
        scene.add(renderable(MeshKind::Cube, 2.0));
        scene.add(renderable(MeshKind::Sphere, 3.0));
        scene.add(renderable(MeshKind::Plane, 4.0));

        let batch = InstanceBatch::build(&scene, 100);
        assert_eq!(batch.instances.len(), 4);
        assert_eq!(batch.ranges, [0..1, 1..2, 2..4]);
        assert_eq!(batch.dropped, 0);
        // Translation lives in the last column
        assert_eq!(batch.instances[0].model_3, [4.0, 0.0, 0.0, 1.0]);
        assert_eq!(batch.instances[3].model_3[0], 3.0);
    }

    #[test]
    fn truncates_at_capacity() {
        let mut scene = RenderScene::default();
        for i in 0..5 {
            scene.add(renderable(MeshKind::Sphere, i as f32));
        }
        let batch = InstanceBatch::build(&scene, 3);
        assert_eq!(batch.instances.len(), 3);
        assert_eq!(batch.ranges[2], 0..3);
        assert_eq!(batch.dropped, 2);
    }

    #[test]
    fn white_is_linear_one() {
        let batch = InstanceBatch::build(&{
            let mut s = RenderScene::default();
            s.add(renderable(MeshKind::Cube, 0.0));
            s
        }, 1);
        assert_eq!(batch.instances[0].color, [1.0, 1.0, 1.0, 1.0]);
    }
}
