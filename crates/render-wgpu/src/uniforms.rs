use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use station_render::{MAX_LIGHTS, Param, ParamValue, RenderError};

/// Texture handle: an index into the host's texture table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WgpuTexture(pub(crate) u32);

impl WgpuTexture {
    /// 1×1 white, bound wherever a slot is empty.
    pub const WHITE: WgpuTexture = WgpuTexture(0);
    pub const OFFSCREEN: WgpuTexture = WgpuTexture(1);
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct LightUniform {
    /// xyz, w = light type
    position: [f32; 4],
    /// xyz, w = spot angle
    direction: [f32; 4],
    diffuse: [f32; 4],
    specular: [f32; 4],
    /// enabled, diffuse intensity, specular intensity, specular power
    params: [f32; 4],
}

/// Per-draw uniform block, laid out to match `Draw` in the shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct DrawUniforms {
    world: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    texture_matrix: [[f32; 4]; 4],
    /// xyz, w = side
    camera: [f32; 4],
    /// enabled, start, end, unused
    fog: [f32; 4],
    /// rgb, w = intensity
    ambient: [f32; 4],
    /// clipping plane, mip bias, unused, unused
    clip: [f32; 4],
    lights: [LightUniform; MAX_LIGHTS],
}

const _: () = assert!(std::mem::size_of::<DrawUniforms>() == 640);

/// Distance between per-draw blocks in the uniform buffer; a multiple of the
/// 256-byte dynamic offset alignment.
pub(crate) const UNIFORM_STRIDE: u64 = 768;

/// Last written value of every shader parameter.
#[derive(Debug, Clone)]
pub(crate) struct ShadingState {
    camera_position: Vec3,
    view: Mat4,
    projection: Mat4,
    world: Mat4,
    texture_matrix: Mat4,
    fog: Vec3,
    side: f32,
    light_type: [f32; MAX_LIGHTS],
    light_enabled: [f32; MAX_LIGHTS],
    light_position: [Vec3; MAX_LIGHTS],
    light_direction: [Vec3; MAX_LIGHTS],
    spot_angle: [f32; MAX_LIGHTS],
    diffuse_colors: [Vec4; MAX_LIGHTS],
    diffuse_intensities: [f32; MAX_LIGHTS],
    specular_colors: [Vec4; MAX_LIGHTS],
    specular_intensities: [f32; MAX_LIGHTS],
    specular_power: [f32; MAX_LIGHTS],
    ambient_intensity: f32,
    ambient_color: Vec4,
    clip_plane: f32,
    lod_bias: f32,
    pub texture: Option<WgpuTexture>,
    pub texture1: Option<WgpuTexture>,
}

impl Default for ShadingState {
    fn default() -> Self {
        Self {
            camera_position: Vec3::ZERO,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            world: Mat4::IDENTITY,
            texture_matrix: Mat4::IDENTITY,
            fog: Vec3::ZERO,
            side: 0.0,
            light_type: [0.0; MAX_LIGHTS],
            light_enabled: [0.0; MAX_LIGHTS],
            light_position: [Vec3::ZERO; MAX_LIGHTS],
            light_direction: [Vec3::ZERO; MAX_LIGHTS],
            spot_angle: [0.0; MAX_LIGHTS],
            diffuse_colors: [Vec4::ZERO; MAX_LIGHTS],
            diffuse_intensities: [0.0; MAX_LIGHTS],
            specular_colors: [Vec4::ZERO; MAX_LIGHTS],
            specular_intensities: [0.0; MAX_LIGHTS],
            specular_power: [1.0; MAX_LIGHTS],
            ambient_intensity: 0.0,
            ambient_color: Vec4::ONE,
            clip_plane: 0.0,
            lod_bias: 0.0,
            texture: None,
            texture1: None,
        }
    }
}

impl ShadingState {
    pub fn set(&mut self, param: Param, value: ParamValue<WgpuTexture>) -> Result<(), RenderError> {
        use ParamValue as V;
        match (param, value) {
            (Param::CameraPosition, V::Vec3(v)) => self.camera_position = v,
            (Param::View, V::Matrix(m)) => self.view = m,
            (Param::Projection, V::Matrix(m)) => self.projection = m,
            (Param::World, V::Matrix(m)) => self.world = m,
            (Param::TextureMatrix, V::Matrix(m)) => self.texture_matrix = m,
            (Param::Texture, V::Texture(t)) => self.texture = Some(t),
            (Param::Texture1, V::Texture(t)) => self.texture1 = Some(t),
            (Param::FogEnabled, V::Float(f)) => self.fog.x = f,
            (Param::FogStart, V::Float(f)) => self.fog.y = f,
            (Param::FogEnd, V::Float(f)) => self.fog.z = f,
            (Param::Side, V::Float(f)) => self.side = f,
            (Param::LightType, V::Floats(f)) => self.light_type = f,
            (Param::LightEnabled, V::Floats(f)) => self.light_enabled = f,
            (Param::LightPosition, V::Vec3s(v)) => self.light_position = v,
            (Param::LightDirection, V::Vec3s(v)) => self.light_direction = v,
            (Param::SpotAngle, V::Floats(f)) => self.spot_angle = f,
            (Param::DiffuseColors, V::Vec4s(v)) => self.diffuse_colors = v,
            (Param::DiffuseIntensities, V::Floats(f)) => self.diffuse_intensities = f,
            (Param::SpecularColors, V::Vec4s(v)) => self.specular_colors = v,
            (Param::SpecularIntensities, V::Floats(f)) => self.specular_intensities = f,
            (Param::SpecularPower, V::Floats(f)) => self.specular_power = f,
            (Param::AmbientIntensity, V::Float(f)) => self.ambient_intensity = f,
            (Param::AmbientColor, V::Vec4(v)) => self.ambient_color = v,
            (Param::ClippingPlane, V::Float(f)) => self.clip_plane = f,
            (Param::MipLodBias, V::Float(f)) => self.lod_bias = f,
            (param, value) => {
                return Err(RenderError::Backend(format!(
                    "parameter {param} cannot take {value:?}"
                )));
            }
        }
        Ok(())
    }

    pub fn uniforms(&self) -> DrawUniforms {
        let lights = std::array::from_fn(|i| LightUniform {
            position: self.light_position[i].extend(self.light_type[i]).to_array(),
            direction: self.light_direction[i].extend(self.spot_angle[i]).to_array(),
            diffuse: self.diffuse_colors[i].to_array(),
            specular: self.specular_colors[i].to_array(),
            params: [
                self.light_enabled[i],
                self.diffuse_intensities[i],
                self.specular_intensities[i],
                self.specular_power[i],
            ],
        });
        DrawUniforms {
            world: self.world.to_cols_array_2d(),
            view: self.view.to_cols_array_2d(),
            projection: self.projection.to_cols_array_2d(),
            texture_matrix: self.texture_matrix.to_cols_array_2d(),
            camera: self.camera_position.extend(self.side).to_array(),
            fog: self.fog.extend(0.0).to_array(),
            ambient: self
                .ambient_color
                .truncate()
                .extend(self.ambient_intensity)
                .to_array(),
            clip: [self.clip_plane, self.lod_bias, 0.0, 0.0],
            lights,
        }
    }
}

/// Packs blocks at [`UNIFORM_STRIDE`] intervals.
pub(crate) fn pack_uniforms(blocks: &[DrawUniforms]) -> Vec<u8> {
    let stride = UNIFORM_STRIDE as usize;
    let mut bytes = vec![0u8; blocks.len() * stride];
    for (slot, block) in blocks.iter().enumerate() {
        let start = slot * stride;
        let raw = bytemuck::bytes_of(block);
        bytes[start..start + raw.len()].copy_from_slice(raw);
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_and_fog_travel_in_spare_lanes() {
        let mut state = ShadingState::default();
        state.set(Param::CameraPosition, ParamValue::Vec3(Vec3::new(1.0, 2.0, 3.0))).unwrap();
        state.set(Param::Side, ParamValue::Float(-1.0)).unwrap();
        state.set(Param::FogEnabled, ParamValue::Float(1.0)).unwrap();
        state.set(Param::FogEnd, ParamValue::Float(900.0)).unwrap();
        let u = state.uniforms();
        assert_eq!(u.camera, [1.0, 2.0, 3.0, -1.0]);
        assert_eq!(u.fog, [1.0, 0.0, 900.0, 0.0]);
    }

    #[test]
    fn clip_plane_and_bias_share_a_lane() {
        let mut state = ShadingState::default();
        state.set(Param::ClippingPlane, ParamValue::Float(12.0)).unwrap();
        state.set(Param::MipLodBias, ParamValue::Float(-10.0)).unwrap();
        assert_eq!(state.uniforms().clip, [12.0, -10.0, 0.0, 0.0]);
    }

    #[test]
    fn light_arrays_are_interleaved_per_light() {
        let mut state = ShadingState::default();
        state
            .set(Param::LightType, ParamValue::Floats([0.0, 0.0, 1.0, 2.0]))
            .unwrap();
        state
            .set(Param::SpotAngle, ParamValue::Floats([0.0, 0.0, 0.0, 0.5]))
            .unwrap();
        state
            .set(Param::LightEnabled, ParamValue::Floats([0.0, 0.0, 0.0, 1.0]))
            .unwrap();
        let u = state.uniforms();
        assert_eq!(u.lights[3].position[3], 2.0);
        assert_eq!(u.lights[3].direction[3], 0.5);
        assert_eq!(u.lights[3].params[0], 1.0);
        assert_eq!(u.lights[2].position[3], 1.0);
    }

    #[test]
    fn mismatched_value_is_rejected() {
        let mut state = ShadingState::default();
        let err = state.set(Param::World, ParamValue::Float(1.0)).unwrap_err();
        assert!(err.to_string().contains("World"));
    }

    #[test]
    fn packing_respects_stride() {
        let mut state = ShadingState::default();
        state.set(Param::AmbientIntensity, ParamValue::Float(0.2)).unwrap();
        let blocks = [ShadingState::default().uniforms(), state.uniforms()];
        let bytes = pack_uniforms(&blocks);
        assert_eq!(bytes.len(), 2 * UNIFORM_STRIDE as usize);
        let start = UNIFORM_STRIDE as usize;
        let second: DrawUniforms = bytemuck::pod_read_unaligned(&bytes[start..start + 640]);
        assert_eq!(second.ambient[3], 0.2);
    }
}
