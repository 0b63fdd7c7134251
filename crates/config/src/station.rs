use crate::file::{ObjectEntry, RotationDegrees};
use glam::Vec3;
use station_common::Color;

/// Every (name, info) pair the station scene builds.
pub const STATION_OBJECTS: &[(&str, &str)] = &[
    ("Station", "Cube"),
    ("Platform", "Cube"),
    ("Ground", "Floor"),
    ("Screen", "Floor"),
    ("Panther", "Model"),
    ("Panther", "Model2"),
    ("Locomotive", "Model"),
];

fn yaw_pitch_roll(yaw: f32, pitch: f32, roll: f32) -> Option<RotationDegrees> {
    Some(RotationDegrees { yaw, pitch, roll })
}

/// Built-in scene values.
pub(crate) fn station_entries() -> Vec<ObjectEntry> {
    vec![
        ObjectEntry {
            size: Some(1000.0),
            color: Some(Color::DARK_RED),
            scale: Some(Vec3::new(1.0, 0.25, 0.25)),
            ..ObjectEntry::new("Station", "Cube")
        },
        ObjectEntry {
            size: Some(1000.0),
            color: Some(Color::DARK_SEA_GREEN),
            scale: Some(Vec3::new(1.0, 0.025, 0.13)),
            translation: Some(Vec3::new(0.0, -62.0, 59.0)),
            texture_resolution: Some(20.0),
            ..ObjectEntry::new("Platform", "Cube")
        },
        ObjectEntry {
            size: Some(1000.0),
            color: Some(Color::DIM_GRAY),
            scale: Some(Vec3::new(1.0, 0.25, 0.25)),
            translation: Some(Vec3::new(0.0, -1000.0 / 5.0, 0.0)),
            texture_resolution: Some(50.0),
            ..ObjectEntry::new("Ground", "Floor")
        },
        ObjectEntry {
            size: Some(100.0),
            scale: Some(Vec3::new(1.6, 1.0, 0.9)),
            rotation: yaw_pitch_roll(0.0, 90.0, 0.0),
            translation: Some(Vec3::new(0.0, 0.0, -170.0)),
            ..ObjectEntry::new("Screen", "Floor")
        },
        ObjectEntry {
            scale: Some(Vec3::ONE),
            translation: Some(Vec3::new(-140.0, -49.0, 3.0)),
            rotation: yaw_pitch_roll(180.0, 0.0, 0.0),
            ..ObjectEntry::new("Panther", "Model")
        },
        ObjectEntry {
            scale: Some(Vec3::ONE),
            translation: Some(Vec3::new(-110.0, -48.0, 15.0)),
            rotation: yaw_pitch_roll(210.0, 0.0, 0.0),
            ..ObjectEntry::new("Panther", "Model2")
        },
        ObjectEntry {
            scale: Some(Vec3::splat(0.5)),
            translation: Some(Vec3::new(0.0, -26.0, -50.0)),
            rotation: yaw_pitch_roll(90.0, 0.0, 270.0),
            ..ObjectEntry::new("Locomotive", "Model")
        },
    ]
}
