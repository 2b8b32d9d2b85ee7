use crate::registry::BodyRegistry;
use knockabout_common::Pose;
use knockabout_kernel::PhysicsWorld;
use knockabout_render::{RenderId, RenderScene};

/// Copies body poses onto their renderables.
#[derive(Debug, Default)]
pub struct TransformSynchronizer {
    staged: Vec<(RenderId, Pose)>,
}

impl TransformSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite position and orientation of every registered renderable with
    /// its body's current pose. All poses are read before any is written.
    /// Returns the number of renderables updated.
    pub fn sync<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &W,
        registry: &BodyRegistry,
        scene: &mut RenderScene,
    ) -> usize {
        self.staged.clear();
        for pair in registry.pairs() {
            match world.pose(pair.body) {
                Some(pose) => self.staged.push((pair.renderable, pose)),
                None => tracing::error!(body = ?pair.body, "registered body missing from world"),
            }
        }

        let mut updated = 0;
        for (id, pose) in self.staged.drain(..) {
            if scene.set_pose(id, pose) {
                updated += 1;
            } else {
                tracing::error!(renderable = ?id, "registered renderable missing from scene");
            }
        }
        tracing::trace!(updated, "transforms synced");
        updated
    }
}
