//! Declarative scene description.
//!
//! One `SceneConfig` covers every demo variant; the built-in presets differ
//! only in data.

use crate::error::SceneError;
use glam::Vec3;
use knockabout_common::Color;
use knockabout_input::KeyBindings;
use knockabout_kernel::{
    BodyDesc, ControlSettings, JumpPolicy, KinematicController, PhysicsSettings, Shape, StepMode,
    SurfaceMaterial,
};
use knockabout_render::{Lighting, OrbitSettings, VisualMaterial};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Names accepted by [`SceneConfig::preset`].
pub const PRESETS: &[&str] = &["pyramid", "solo"];

/// The static ground plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    /// Edge length of the visible square; the collider is infinite.
    pub size: f32,
    pub material: SurfaceMaterial,
    pub visual: VisualMaterial,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            size: 20.0,
            material: SurfaceMaterial {
                restitution: 0.8,
                friction: 0.3,
            },
            visual: VisualMaterial::matte(Color::from_hex(0x38761d)),
        }
    }
}

/// The controlled body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub shape: Shape,
    pub mass: f32,
    pub position: Vec3,
    pub material: SurfaceMaterial,
    pub visual: VisualMaterial,
}

impl PlayerConfig {
    pub fn body_desc(&self) -> BodyDesc {
        BodyDesc::dynamic(self.shape, self.mass)
            .at(self.position)
            .with_material(self.material)
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            shape: Shape::Cuboid {
                half_extents: Vec3::splat(0.5),
            },
            mass: 10_000.0,
            position: Vec3::new(0.0, 0.5, 0.0),
            material: SurfaceMaterial {
                restitution: 0.3,
                friction: 0.3,
            },
            visual: VisualMaterial {
                color: Color::from_hex(0xa64d79),
                roughness: 0.5,
                metalness: 0.5,
            },
        }
    }
}

/// Movement tuning plus the keys that drive it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub speed: f32,
    pub jump_velocity: f32,
    pub jump_policy: JumpPolicy,
    pub bindings: KeyBindings,
}

impl ControlConfig {
    pub fn settings(&self) -> ControlSettings {
        ControlSettings {
            speed: self.speed,
            jump_velocity: self.jump_velocity,
            jump_policy: self.jump_policy,
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        let settings = ControlSettings::default();
        Self {
            speed: settings.speed,
            jump_velocity: settings.jump_velocity,
            jump_policy: settings.jump_policy,
            bindings: KeyBindings::default(),
        }
    }
}

/// A square-based pyramid of dynamic balls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PyramidConfig {
    /// Balls per side on the bottom level.
    pub base: u32,
    pub levels: u32,
    pub ball_radius: f32,
    /// Center distance between neighbours as a fraction of the diameter.
    pub spacing: f32,
    /// Shift of the whole pyramid along X.
    pub offset_x: f32,
    pub mass: f32,
    pub material: SurfaceMaterial,
    pub visual: VisualMaterial,
}

impl PyramidConfig {
    /// Ball centers, bottom level first. Level `l` is a square of
    /// `base - l` balls per side centered on the pyramid axis.
    pub fn positions(&self) -> Vec<Vec3> {
        let step = self.ball_radius * 2.0 * self.spacing;
        let mut out = Vec::with_capacity(self.ball_count());
        for level in 0..self.levels.min(self.base) {
            let n = (self.base - level) as f32;
            let y = self.ball_radius + level as f32 * step;
            for i in 0..self.base - level {
                for j in 0..self.base - level {
                    let x = (i as f32 - n / 2.0 + 0.5) * step + self.offset_x;
                    let z = (j as f32 - n / 2.0 + 0.5) * step;
                    out.push(Vec3::new(x, y, z));
                }
            }
        }
        out
    }

    pub fn ball_count(&self) -> usize {
        (0..self.levels.min(self.base))
            .map(|level| ((self.base - level) as usize).pow(2))
            .sum()
    }

    pub fn body_desc(&self, position: Vec3) -> BodyDesc {
        BodyDesc::dynamic(
            Shape::Ball {
                radius: self.ball_radius,
            },
            self.mass,
        )
        .at(position)
        .with_material(self.material)
    }
}

impl Default for PyramidConfig {
    fn default() -> Self {
        Self {
            base: 5,
            levels: 4,
            ball_radius: 0.3,
            spacing: 0.9,
            offset_x: 3.0,
            mass: 1.0,
            material: SurfaceMaterial {
                restitution: 0.4,
                friction: 0.3,
            },
            visual: VisualMaterial {
                color: Color::from_hex(0x3d85c6),
                roughness: 0.5,
                metalness: 0.5,
            },
        }
    }
}

/// Everything needed to build and run one scene.
///
/// Missing fields fall back to the `pyramid` preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub name: String,
    pub tick_rate_hz: u32,
    pub step_mode: StepMode,
    pub physics: PhysicsSettings,
    pub ground: GroundConfig,
    pub player: PlayerConfig,
    pub control: ControlConfig,
    pub pyramid: Option<PyramidConfig>,
    pub camera: OrbitSettings,
    pub lighting: Lighting,
    pub clear_color: Color,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::pyramid()
    }
}

impl SceneConfig {
    /// A box player next to a pyramid of balls.
    pub fn pyramid() -> Self {
        Self {
            name: "pyramid".into(),
            tick_rate_hz: 60,
            step_mode: StepMode::PerFrame,
            physics: PhysicsSettings::default(),
            ground: GroundConfig::default(),
            player: PlayerConfig::default(),
            control: ControlConfig::default(),
            pyramid: Some(PyramidConfig::default()),
            camera: OrbitSettings::default(),
            lighting: Lighting::default(),
            clear_color: Color::from_hex(0xa2c4c9),
        }
    }

    /// A single sphere on an empty ground.
    pub fn solo() -> Self {
        Self {
            name: "solo".into(),
            player: PlayerConfig {
                shape: Shape::Ball { radius: 0.5 },
                mass: 5.0,
                ..PlayerConfig::default()
            },
            pyramid: None,
            ..Self::pyramid()
        }
    }

    pub fn preset(name: &str) -> Result<Self, SceneError> {
        match name {
            "pyramid" => Ok(Self::pyramid()),
            "solo" => Ok(Self::solo()),
            other => Err(SceneError::UnknownPreset(other.to_string())),
        }
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, SceneError> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_yaml_string(&self) -> Result<String, SceneError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Load a `.yaml`/`.yml` or `.json` file. The result is not validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let config = match ext.as_deref() {
            Some("yaml" | "yml") => Self::from_yaml_str(&text)?,
            Some("json") => Self::from_json_str(&text)?,
            _ => {
                return Err(SceneError::InvalidConfig(format!(
                    "{}: expected a .yaml, .yml or .json file",
                    path.display()
                )));
            }
        };
        tracing::debug!(path = %path.display(), name = %config.name, "scene config loaded");
        Ok(config)
    }

    /// Check everything that setup would otherwise trip over.
    pub fn validate(&self) -> Result<(), SceneError> {
        if self.tick_rate_hz == 0 {
            return invalid("tick_rate_hz must be at least 1");
        }
        if let StepMode::Accumulated {
            max_steps_per_frame: 0,
        } = self.step_mode
        {
            return invalid("max_steps_per_frame must be at least 1");
        }
        self.physics.validate()?;

        if !(self.ground.size.is_finite() && self.ground.size > 0.0) {
            return invalid(format!("ground size must be positive, got {}", self.ground.size));
        }
        if self.player.shape == Shape::Plane {
            return invalid("player cannot be a plane");
        }
        if !(self.player.mass.is_finite() && self.player.mass > 0.0) {
            return invalid(format!(
                "player mass must be positive, got {}",
                self.player.mass
            ));
        }
        self.player.body_desc().validate()?;

        KinematicController::new(self.control.settings())?;
        self.control.bindings.validate()?;

        if let Some(p) = &self.pyramid {
            if p.levels == 0 {
                return invalid("pyramid needs at least one level");
            }
            if p.base < p.levels {
                return invalid(format!(
                    "pyramid base {} is smaller than its {} levels",
                    p.base, p.levels
                ));
            }
            if !(p.spacing.is_finite() && p.spacing > 0.0) {
                return invalid(format!("pyramid spacing must be positive, got {}", p.spacing));
            }
            if !(p.mass.is_finite() && p.mass > 0.0) {
                return invalid(format!("pyramid ball mass must be positive, got {}", p.mass));
            }
            p.body_desc(Vec3::ZERO).validate()?;
        }

        let cam = &self.camera;
        if !(cam.fov_degrees > 0.0 && cam.fov_degrees < 180.0) {
            return invalid(format!("camera fov must be in (0, 180), got {}", cam.fov_degrees));
        }
        if !(cam.near > 0.0 && cam.far > cam.near) {
            return invalid(format!(
                "camera needs 0 < near < far, got near={} far={}",
                cam.near, cam.far
            ));
        }
        if !(cam.damping_factor > 0.0 && cam.damping_factor <= 1.0) {
            return invalid(format!(
                "camera damping_factor must be in (0, 1], got {}",
                cam.damping_factor
            ));
        }
        if !(cam.min_distance > 0.0 && cam.max_distance >= cam.min_distance) {
            return invalid("camera needs 0 < min_distance <= max_distance");
        }
        let light = &self.lighting;
        if !(light.ambient.is_finite() && light.ambient >= 0.0)
            || !(light.light_intensity.is_finite() && light.light_intensity >= 0.0)
        {
            return invalid(format!(
                "lighting values must be finite and >= 0, got ambient={} intensity={}",
                light.ambient, light.light_intensity
            ));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> Result<(), SceneError> {
    Err(SceneError::InvalidConfig(msg.into()))
}
