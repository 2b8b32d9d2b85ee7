use crate::config::SceneConfig;
use crate::error::SceneError;
use crate::registry::{BodyRegistry, BodyRegistryBuilder, PairIndex};
use glam::Vec3;
use knockabout_common::{Pose, Transform};
use knockabout_kernel::{BodyDesc, BodyHandle, PhysicsWorld, RapierWorld, Shape};
use knockabout_render::{MeshKind, RenderScene, Renderable, VisualMaterial};

/// A populated world, its visual mirror, and the pairing between them.
pub struct Scene<W> {
    pub world: W,
    pub render: RenderScene,
    pub registry: BodyRegistry,
    /// Fixed, so it is not registered for syncing.
    pub ground: BodyHandle,
}

/// Validate `config` and build it on a rapier world.
pub fn build_scene(config: &SceneConfig) -> Result<Scene<RapierWorld>, SceneError> {
    config.validate()?;
    let world = RapierWorld::new(config.physics)?;
    tracing::debug!(
        gravity = %world.gravity(),
        solver_iterations = config.physics.solver_iterations,
        "physics world created"
    );
    populate_scene(world, config)
}

/// Add the ground, the player, and the optional pyramid to `world`.
pub fn populate_scene<W: PhysicsWorld>(
    mut world: W,
    config: &SceneConfig,
) -> Result<Scene<W>, SceneError> {
    let mut render = RenderScene::new(config.clear_color, config.lighting);
    let mut registry = BodyRegistryBuilder::new();

    let ground = world.add_body(&BodyDesc::fixed(Shape::Plane).with_material(config.ground.material))?;
    render.add(
        Renderable::new(
            MeshKind::Plane,
            config.ground.visual,
            Transform::from_pose(
                Pose::default(),
                Vec3::new(config.ground.size, 1.0, config.ground.size),
            ),
        )
        .receiving_shadow(),
    );

    let player_desc = config.player.body_desc();
    let player = add_pair(&mut world, &mut render, &mut registry, &player_desc, config.player.visual)?;
    registry.control(player)?;

    let mut balls = 0;
    if let Some(pyramid) = &config.pyramid {
        for position in pyramid.positions() {
            add_pair(
                &mut world,
                &mut render,
                &mut registry,
                &pyramid.body_desc(position),
                pyramid.visual,
            )?;
            balls += 1;
        }
    }

    let registry = registry.build();
    tracing::info!(
        scene = %config.name,
        bodies = world.body_count(),
        synced = registry.len(),
        balls,
        "scene ready"
    );
    Ok(Scene {
        world,
        render,
        registry,
        ground,
    })
}

fn add_pair<W: PhysicsWorld>(
    world: &mut W,
    render: &mut RenderScene,
    registry: &mut BodyRegistryBuilder,
    desc: &BodyDesc,
    visual: VisualMaterial,
) -> Result<PairIndex, SceneError> {
    let (mesh, scale) = mesh_for(desc.shape).ok_or_else(|| {
        SceneError::InvalidConfig(format!("shape {:?} cannot be a dynamic body", desc.shape))
    })?;
    let body = world.add_body(desc)?;
    let id = render.add(
        Renderable::new(mesh, visual, Transform::from_pose(desc.pose(), scale)).casting_shadow(),
    );
    Ok(registry.register(body, id))
}

/// Unit mesh and scale that draw `shape` at its physical size.
fn mesh_for(shape: Shape) -> Option<(MeshKind, Vec3)> {
    match shape {
        Shape::Cuboid { half_extents } => Some((MeshKind::Cube, half_extents * 2.0)),
        Shape::Ball { radius } => Some((MeshKind::Sphere, Vec3::splat(radius * 2.0))),
        Shape::Plane => None,
    }
}
