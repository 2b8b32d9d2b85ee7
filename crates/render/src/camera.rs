use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

/// Keeps the orbit away from the poles, where the up vector degenerates.
const POLAR_EPSILON: f32 = 1e-3;

/// Dolly factor per wheel step.
const ZOOM_STEP: f32 = 0.95;

/// Perspective projection looking from `eye` at `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 5.0, 8.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 75.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// A camera driver the frame loop updates once per frame, after physics sync
/// and before rendering.
pub trait CameraController {
    fn update(&mut self);

    fn camera(&self) -> &PerspectiveCamera;

    fn set_aspect(&mut self, aspect: f32);
}

/// Configuration of an orbit camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitSettings {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub eye: Vec3,
    pub target: Vec3,
    /// Fraction of the pending rotation applied per update; 1 disables damping.
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            eye: Vec3::new(0.0, 5.0, 8.0),
            target: Vec3::ZERO,
            damping_factor: 0.05,
            min_distance: 1.0,
            max_distance: 200.0,
        }
    }
}

/// Orbits a target point. Rotation input is smoothed by exponential damping:
/// each update applies `damping_factor` of the pending delta and decays the rest.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    camera: PerspectiveCamera,
    settings: OrbitSettings,
    /// Angle around +Y, zero looking down -Z from +Z.
    azimuth: f32,
    /// Angle from +Y.
    polar: f32,
    distance: f32,
    pending_azimuth: f32,
    pending_polar: f32,
}

impl OrbitCamera {
    pub fn new(settings: OrbitSettings, aspect: f32) -> Self {
        let offset = settings.eye - settings.target;
        let distance = offset.length().max(f32::EPSILON);
        let azimuth = offset.x.atan2(offset.z);
        let polar = (offset.y / distance).clamp(-1.0, 1.0).acos();
        let mut orbit = Self {
            camera: PerspectiveCamera {
                eye: settings.eye,
                target: settings.target,
                up: Vec3::Y,
                fov_y: settings.fov_degrees.to_radians(),
                aspect,
                near: settings.near,
                far: settings.far,
            },
            settings,
            azimuth,
            polar: polar.clamp(POLAR_EPSILON, PI - POLAR_EPSILON),
            distance: distance.clamp(settings.min_distance, settings.max_distance),
            pending_azimuth: 0.0,
            pending_polar: 0.0,
        };
        orbit.place_eye();
        orbit
    }

    pub fn settings(&self) -> &OrbitSettings {
        &self.settings
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Queue a rotation, in radians. Positive azimuth swings the eye to the
    /// left around the target, positive polar lifts it.
    pub fn rotate(&mut self, azimuth: f32, polar: f32) {
        self.pending_azimuth -= azimuth;
        self.pending_polar -= polar;
    }

    /// Queue a rotation from a pointer drag. A drag across the full viewport
    /// height is one full turn.
    pub fn rotate_pixels(&mut self, dx: f32, dy: f32, viewport_height: u32) {
        let h = viewport_height.max(1) as f32;
        self.rotate(TAU * dx / h, TAU * dy / h);
    }

    /// Dolly towards the target for positive steps, away for negative.
    pub fn zoom(&mut self, steps: f32) {
        self.distance = (self.distance * ZOOM_STEP.powf(steps))
            .clamp(self.settings.min_distance, self.settings.max_distance);
        self.place_eye();
    }

    fn place_eye(&mut self) {
        let (sin_p, cos_p) = self.polar.sin_cos();
        let (sin_a, cos_a) = self.azimuth.sin_cos();
        let offset = Vec3::new(sin_p * sin_a, cos_p, sin_p * cos_a) * self.distance;
        self.camera.target = self.settings.target;
        self.camera.eye = self.settings.target + offset;
    }
}

impl CameraController for OrbitCamera {
    fn update(&mut self) {
        let damping = self.settings.damping_factor.clamp(0.0, 1.0);
        self.azimuth += self.pending_azimuth * damping;
        self.polar = (self.polar + self.pending_polar * damping)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        self.pending_azimuth *= 1.0 - damping;
        self.pending_polar *= 1.0 - damping;
        self.place_eye();
    }

    fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    fn set_aspect(&mut self, aspect: f32) {
        self.camera.set_aspect(aspect);
    }
}
