use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_4;

/// Free-flight camera parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraSettings {
    /// Units per action per frame.
    pub speed: f32,
    pub position: Vec3,
    pub direction: Vec3,
    pub up: Vec3,
    /// Base rotation step in radians, scaled by `speed`.
    pub angular_step: f32,
    pub near: f32,
    pub far: f32,
    pub fov_degrees: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            speed: 1.0,
            position: Vec3::new(400.0, 90.0, 80.0),
            direction: Vec3::new(-1.0, -0.9, -0.9),
            up: Vec3::Y,
            angular_step: FRAC_PI_4 / 150.0 * 5.0,
            near: 1.0,
            far: 1200.0,
            fov_degrees: 60.0,
        }
    }
}

/// Linear distance fog toward white.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FogSettings {
    pub enabled: bool,
    pub start: f32,
    pub end: f32,
}

impl Default for FogSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            start: 100.0,
            end: 1000.0,
        }
    }
}
