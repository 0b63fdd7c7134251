use crate::settings::{CameraSettings, FogSettings};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use station_common::Color;

/// Yaw/pitch/roll in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RotationDegrees {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

/// Values for one (name, info) object. Missing fields are left unregistered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectEntry {
    pub name: String,
    pub info: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationDegrees>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture_resolution: Option<f32>,
}

impl ObjectEntry {
    pub fn new(name: &str, info: &str) -> Self {
        Self {
            name: name.to_string(),
            info: info.to_string(),
            ..Self::default()
        }
    }
}

/// On-disk configuration layered over the built-in station table.
///
/// ```yaml
/// camera:
///   speed: 2.0
/// fog:
///   enabled: true
/// objects:
///   - name: Platform
///     info: Cube
///     translation: [0.0, -62.0, 59.0]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub camera: Option<CameraSettings>,
    pub fog: Option<FogSettings>,
    pub objects: Vec<ObjectEntry>,
}
