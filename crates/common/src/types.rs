use glam::{EulerRot, Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

fn opaque() -> u8 {
    255
}

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const ORANGE: Color = Color::rgb(255, 165, 0);
    pub const ALICE_BLUE: Color = Color::rgb(240, 248, 255);
    pub const AZURE: Color = Color::rgb(240, 255, 255);
    pub const DARK_RED: Color = Color::rgb(139, 0, 0);
    pub const DARK_SEA_GREEN: Color = Color::rgb(143, 188, 139);
    pub const DIM_GRAY: Color = Color::rgb(105, 105, 105);
    pub const LIGHT_SEA_GREEN: Color = Color::rgb(32, 178, 170);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Normalized RGBA.
    pub fn to_vec4(self) -> Vec4 {
        Vec4::new(
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        )
    }

    pub fn to_vec3(self) -> Vec3 {
        self.to_vec4().truncate()
    }
}

/// Rotation from yaw (about Y), pitch (about X) and roll (about Z) in degrees.
/// Roll is applied first, then pitch, then yaw.
pub fn rotation_from_degrees(yaw: f32, pitch: f32, roll: f32) -> Mat4 {
    Mat4::from_euler(
        EulerRot::YXZ,
        yaw.to_radians(),
        pitch.to_radians(),
        roll.to_radians(),
    )
}

/// Per-object transform kept as its three factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub scale: Mat4,
    pub rotation: Mat4,
    pub translation: Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: Mat4::IDENTITY,
            rotation: Mat4::IDENTITY,
            translation: Mat4::IDENTITY,
        }
    }
}

impl Transform {
    /// World matrix: rotate, scale, translate, then apply `camera_world`.
    pub fn world(&self, camera_world: Mat4) -> Mat4 {
        camera_world * self.translation * self.scale * self.rotation
    }

    /// Diagonal of the scale matrix.
    pub fn scale_factors(&self) -> Vec3 {
        Vec3::new(self.scale.x_axis.x, self.scale.y_axis.y, self.scale.z_axis.z)
    }

    /// The same transform with the scale factor dropped.
    pub fn without_scale(&self) -> Self {
        Self {
            scale: Mat4::IDENTITY,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.world(Mat4::IDENTITY), Mat4::IDENTITY);
        assert_eq!(t.scale_factors(), Vec3::ONE);
    }

    #[test]
    fn world_rotates_then_scales_then_translates() {
        let t = Transform {
            scale: Mat4::from_scale(Vec3::splat(2.0)),
            rotation: rotation_from_degrees(90.0, 0.0, 0.0),
            translation: Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)),
        };
        let p = t.world(Mat4::IDENTITY).transform_point3(Vec3::X);
        assert!((p - Vec3::new(10.0, 0.0, -2.0)).length() < 1e-5);
    }

    #[test]
    fn without_scale_keeps_placement() {
        let t = Transform {
            scale: Mat4::from_scale(Vec3::new(1.0, 0.25, 0.25)),
            rotation: Mat4::IDENTITY,
            translation: Mat4::from_translation(Vec3::new(0.0, -62.0, 59.0)),
        };
        let p = t.without_scale().world(Mat4::IDENTITY).transform_point3(Vec3::ZERO);
        assert_eq!(p, Vec3::new(0.0, -62.0, 59.0));
        assert_eq!(t.scale_factors(), Vec3::new(1.0, 0.25, 0.25));
    }

    #[test]
    fn color_normalizes() {
        let c = Color::rgb(255, 0, 51).to_vec4();
        assert_eq!(c, Vec4::new(1.0, 0.0, 0.2, 1.0));
        assert_eq!(Color::DARK_RED.to_array(), [139, 0, 0, 255]);
    }

    #[test]
    fn color_alpha_defaults_when_missing() {
        let c: Color = serde_json::from_str(r#"{"r":1,"g":2,"b":3}"#).unwrap();
        assert_eq!(c, Color::rgb(1, 2, 3));
    }
}
