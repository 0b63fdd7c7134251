use crate::error::RenderError;
use crate::host::{MAX_LIGHTS, Param, ParamValue, ShaderHost};
use glam::{Vec3, Vec4};
use station_common::Color;
use tracing::debug;

/// Light type tag as the shaders read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightKind {
    Point = 0,
    Directional = 1,
    Spot = 2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub enabled: bool,
    pub position: Vec3,
    pub direction: Vec3,
    pub diffuse_color: Color,
    pub diffuse_intensity: f32,
    pub specular_color: Color,
    pub specular_intensity: f32,
    pub specular_power: f32,
    /// Cone half-angle in radians; spot lights only.
    pub spot_angle: f32,
}

impl Light {
    /// A disabled black point light at the origin, used to pad the rig.
    pub const OFF: Light = Light {
        kind: LightKind::Point,
        enabled: false,
        position: Vec3::ZERO,
        direction: Vec3::ZERO,
        diffuse_color: Color::BLACK,
        diffuse_intensity: 0.0,
        specular_color: Color::BLACK,
        specular_intensity: 0.0,
        specular_power: 1.0,
        spot_angle: 0.0,
    };
}

/// Fixed-size set of lights plus the ambient term.
#[derive(Debug, Clone, PartialEq)]
pub struct LightRig {
    pub lights: [Light; MAX_LIGHTS],
    pub ambient_color: Color,
    pub ambient_intensity: f32,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            lights: [Light::OFF; MAX_LIGHTS],
            ambient_color: Color::WHITE,
            ambient_intensity: 0.2,
        }
    }
}

impl LightRig {
    /// Two point lights above the platform, a directional fill along +X and a
    /// narrow red spot; only the spot starts enabled.
    pub fn station() -> Self {
        let point = |position: Vec3, specular_color: Color| Light {
            kind: LightKind::Point,
            enabled: false,
            position,
            direction: Vec3::ZERO,
            diffuse_color: Color::WHITE,
            diffuse_intensity: 0.3,
            specular_color,
            specular_intensity: 0.2,
            specular_power: 32.0,
            spot_angle: 0.0,
        };
        Self {
            lights: [
                point(Vec3::new(-200.0, 250.0, 0.0), Color::RED),
                point(Vec3::new(300.0, 250.0, 0.0), Color::WHITE),
                Light {
                    kind: LightKind::Directional,
                    enabled: false,
                    position: Vec3::ZERO,
                    direction: Vec3::X,
                    diffuse_color: Color::ALICE_BLUE,
                    diffuse_intensity: 0.5,
                    specular_color: Color::ORANGE,
                    specular_intensity: 0.1,
                    specular_power: 32.0,
                    spot_angle: 0.0,
                },
                Light {
                    kind: LightKind::Spot,
                    enabled: true,
                    position: Vec3::new(500.0, 100.0, -50.0),
                    direction: Vec3::Z,
                    diffuse_color: Color::RED,
                    diffuse_intensity: 0.6,
                    specular_color: Color::YELLOW,
                    specular_intensity: 0.3,
                    specular_power: 32.0,
                    spot_angle: 1f32.to_radians(),
                },
            ],
            ambient_color: Color::LIGHT_SEA_GREEN,
            ambient_intensity: 0.2,
        }
    }

    /// Flips light `index`. Out-of-range indices are ignored.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let light = self.lights.get_mut(index)?;
        light.enabled = !light.enabled;
        debug!(index, enabled = light.enabled, "light toggled");
        Some(light.enabled)
    }

    pub fn enabled_count(&self) -> usize {
        self.lights.iter().filter(|l| l.enabled).count()
    }

    fn floats(&self, f: impl Fn(&Light) -> f32) -> [f32; MAX_LIGHTS] {
        self.lights.map(|l| f(&l))
    }

    /// Writes the per-light arrays and the ambient term.
    pub fn upload<H: ShaderHost>(&self, host: &mut H) -> Result<(), RenderError> {
        let kinds = self.floats(|l| l.kind as u8 as f32);
        let enabled = self.floats(|l| if l.enabled { 1.0 } else { 0.0 });
        host.set_parameter(Param::LightType, ParamValue::Floats(kinds))?;
        host.set_parameter(Param::LightEnabled, ParamValue::Floats(enabled))?;
        host.set_parameter(
            Param::LightPosition,
            ParamValue::Vec3s(self.lights.map(|l| l.position)),
        )?;
        host.set_parameter(
            Param::LightDirection,
            ParamValue::Vec3s(self.lights.map(|l| l.direction)),
        )?;
        host.set_parameter(Param::SpotAngle, ParamValue::Floats(self.floats(|l| l.spot_angle)))?;

        let diffuse: [Vec4; MAX_LIGHTS] = self.lights.map(|l| l.diffuse_color.to_vec4());
        let specular: [Vec4; MAX_LIGHTS] = self.lights.map(|l| l.specular_color.to_vec4());
        host.set_parameter(Param::DiffuseColors, ParamValue::Vec4s(diffuse))?;
        host.set_parameter(
            Param::DiffuseIntensities,
            ParamValue::Floats(self.floats(|l| l.diffuse_intensity)),
        )?;
        host.set_parameter(Param::SpecularColors, ParamValue::Vec4s(specular))?;
        host.set_parameter(
            Param::SpecularIntensities,
            ParamValue::Floats(self.floats(|l| l.specular_intensity)),
        )?;
        host.set_parameter(
            Param::SpecularPower,
            ParamValue::Floats(self.floats(|l| l.specular_power)),
        )?;

        host.set_parameter(
            Param::AmbientIntensity,
            ParamValue::Float(self.ambient_intensity),
        )?;
        host.set_parameter(
            Param::AmbientColor,
            ParamValue::Vec4(self.ambient_color.to_vec4()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::TraceHost;

    #[test]
    fn station_rig_starts_with_the_spot_only() {
        let rig = LightRig::station();
        assert_eq!(rig.enabled_count(), 1);
        assert_eq!(rig.lights[3].kind, LightKind::Spot);
        assert!(rig.lights[3].enabled);
        assert!((rig.lights[3].spot_angle - 0.017_453_292).abs() < 1e-7);
    }

    #[test]
    fn toggle_flips_and_ignores_out_of_range() {
        let mut rig = LightRig::station();
        assert_eq!(rig.toggle(0), Some(true));
        assert_eq!(rig.toggle(0), Some(false));
        assert_eq!(rig.toggle(MAX_LIGHTS), None);
    }

    #[test]
    fn upload_writes_type_tags_and_ambient() {
        let mut host = TraceHost::new();
        LightRig::station().upload(&mut host).unwrap();
        assert_eq!(
            host.parameter(Param::LightType),
            Some(&ParamValue::Floats([0.0, 0.0, 1.0, 2.0]))
        );
        assert_eq!(
            host.parameter(Param::LightEnabled),
            Some(&ParamValue::Floats([0.0, 0.0, 0.0, 1.0]))
        );
        assert_eq!(
            host.parameter(Param::AmbientIntensity),
            Some(&ParamValue::Float(0.2))
        );
    }
}
