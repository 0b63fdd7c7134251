//! The shader/technique host contract.
//!
//! Core code selects techniques and writes named parameters; the host owns GPU
//! resources and turns those writes into uploads and draws.

use crate::camera::Camera;
use crate::error::RenderError;
use crate::mesh::VertexFormat;
use glam::{Mat4, Vec3, Vec4};
use station_common::Color;
use station_config::FogSettings;
use std::fmt;

/// Size of every per-light parameter array.
pub const MAX_LIGHTS: usize = 4;

/// Named shading configuration selected per draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Technique {
    BasicPhongLightning,
    Textured,
    MultiTextured,
}

impl Technique {
    pub const ALL: [Technique; 3] = [
        Technique::BasicPhongLightning,
        Technique::Textured,
        Technique::MultiTextured,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Technique::BasicPhongLightning => "BasicPhongLightning",
            Technique::Textured => "Textured",
            Technique::MultiTextured => "MultiTextured",
        }
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named shader parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Param {
    CameraPosition,
    View,
    Projection,
    World,
    Texture,
    Texture1,
    TextureMatrix,
    FogEnabled,
    FogStart,
    FogEnd,
    LightType,
    LightEnabled,
    LightPosition,
    LightDirection,
    SpotAngle,
    DiffuseColors,
    DiffuseIntensities,
    SpecularColors,
    SpecularIntensities,
    SpecularPower,
    AmbientIntensity,
    AmbientColor,
    Side,
    /// View-space depth below which fragments are discarded.
    ClippingPlane,
    MipLodBias,
}

impl Param {
    pub fn name(&self) -> &'static str {
        match self {
            Param::CameraPosition => "CameraPosition",
            Param::View => "View",
            Param::Projection => "Projection",
            Param::World => "World",
            Param::Texture => "Texture",
            Param::Texture1 => "Texture1",
            Param::TextureMatrix => "TextureMatrix",
            Param::FogEnabled => "FogEnabled",
            Param::FogStart => "FogStart",
            Param::FogEnd => "FogEnd",
            Param::LightType => "LightType",
            Param::LightEnabled => "LightEnabled",
            Param::LightPosition => "LightPosition",
            Param::LightDirection => "LightDirection",
            Param::SpotAngle => "SpotAngle",
            Param::DiffuseColors => "DiffuseColors",
            Param::DiffuseIntensities => "DiffuseIntensities",
            Param::SpecularColors => "SpecularColors",
            Param::SpecularIntensities => "SpecularIntensities",
            Param::SpecularPower => "SpecularPower",
            Param::AmbientIntensity => "AmbientIntensity",
            Param::AmbientColor => "AmbientColor",
            Param::Side => "Side",
            Param::ClippingPlane => "ClippingPlane",
            Param::MipLodBias => "MipLodBias",
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value written to a [`Param`]. `T` is the host's texture handle.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue<T> {
    Float(f32),
    Vec3(Vec3),
    Vec4(Vec4),
    Matrix(Mat4),
    Floats([f32; MAX_LIGHTS]),
    Vec3s([Vec3; MAX_LIGHTS]),
    Vec4s([Vec4; MAX_LIGHTS]),
    Texture(T),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullMode {
    None,
    /// Cull back faces; front faces wind clockwise.
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FillMode {
    Solid,
    Wireframe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RasterizerState {
    pub cull: CullMode,
    pub fill: FillMode,
    pub multisample: bool,
}

impl RasterizerState {
    /// Solid with back-face culling.
    pub const NORMAL: RasterizerState = RasterizerState {
        cull: CullMode::Back,
        fill: FillMode::Solid,
        multisample: false,
    };
    /// Solid, both sides visible. Used for the enclosing station box.
    pub const STATION: RasterizerState = RasterizerState {
        cull: CullMode::None,
        fill: FillMode::Solid,
        multisample: false,
    };
    pub const WIREFRAME: RasterizerState = RasterizerState {
        cull: CullMode::None,
        fill: FillMode::Wireframe,
        multisample: false,
    };

    /// The same culling, drawn as wireframe.
    pub fn as_wireframe(self) -> Self {
        Self {
            fill: FillMode::Wireframe,
            ..self
        }
    }

    pub fn with_multisample(self, multisample: bool) -> Self {
        Self {
            multisample,
            ..self
        }
    }
}

impl Default for RasterizerState {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Texture filter quality for one stage (min, mag or mip).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterLevel {
    Point,
    Linear,
    Anisotropic,
}

impl FilterLevel {
    /// Point, Linear, Anisotropic, then back to Point.
    pub fn next(self) -> Self {
        match self {
            FilterLevel::Point => FilterLevel::Linear,
            FilterLevel::Linear => FilterLevel::Anisotropic,
            FilterLevel::Anisotropic => FilterLevel::Point,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterSet {
    pub min: FilterLevel,
    pub mag: FilterLevel,
    pub mip: FilterLevel,
}

impl FilterSet {
    pub fn uniform(level: FilterLevel) -> Self {
        Self {
            min: level,
            mag: level,
            mip: level,
        }
    }
}

impl Default for FilterSet {
    fn default() -> Self {
        Self::uniform(FilterLevel::Anisotropic)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressMode {
    Wrap,
    Clamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerState {
    pub filters: FilterSet,
    pub address_u: AddressMode,
    pub address_v: AddressMode,
}

impl SamplerState {
    pub fn wrap(filters: FilterSet) -> Self {
        Self {
            filters,
            address_u: AddressMode::Wrap,
            address_v: AddressMode::Wrap,
        }
    }

    /// Repeats along `u`, clamps along `v`.
    pub fn wrap_u(filters: FilterSet) -> Self {
        Self {
            filters,
            address_u: AddressMode::Wrap,
            address_v: AddressMode::Clamp,
        }
    }

    pub fn clamped(filters: FilterSet) -> Self {
        Self {
            filters,
            address_u: AddressMode::Clamp,
            address_v: AddressMode::Clamp,
        }
    }
}

impl Default for SamplerState {
    fn default() -> Self {
        Self::wrap(FilterSet::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderTarget {
    Screen,
    Offscreen,
}

/// Tightly packed RGBA8 pixels, row-major from the top-left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureImage {
    pub fn solid(width: u32, height: u32, color: Color) -> Self {
        let rgba = color
            .to_array()
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            rgba,
        }
    }
}

/// Backend the renderer core draws through.
///
/// Buffers are owned by whoever created them and must be handed back through
/// [`ShaderHost::release_buffer`]; a host frees anything left over when dropped.
pub trait ShaderHost {
    type Buffer;
    type Texture: Clone;

    /// Resets per-frame state. The off-screen texture becomes unavailable until
    /// the off-screen target has been bound and unbound again.
    fn begin_frame(&mut self);

    fn create_vertex_buffer(
        &mut self,
        label: &str,
        format: VertexFormat,
        contents: &[u8],
    ) -> Result<Self::Buffer, RenderError>;

    fn create_index_buffer(&mut self, label: &str, indices: &[u16])
    -> Result<Self::Buffer, RenderError>;

    fn release_buffer(&mut self, buffer: Self::Buffer);

    fn create_texture(
        &mut self,
        label: &str,
        image: &TextureImage,
    ) -> Result<Self::Texture, RenderError>;

    fn technique(&self) -> Technique;

    fn set_technique(&mut self, technique: Technique) -> Result<(), RenderError>;

    fn set_parameter(
        &mut self,
        param: Param,
        value: ParamValue<Self::Texture>,
    ) -> Result<(), RenderError>;

    fn rasterizer(&self) -> RasterizerState;

    fn set_rasterizer(&mut self, state: RasterizerState);

    fn sampler(&self, slot: usize) -> SamplerState;

    fn set_sampler(&mut self, slot: usize, state: SamplerState);

    fn set_render_target(&mut self, target: RenderTarget) -> Result<(), RenderError>;

    /// Color of the off-screen target, readable once its pass has been unbound.
    fn offscreen_texture(&self) -> Result<Self::Texture, RenderError>;

    /// Clears color and depth of the current target.
    fn clear(&mut self, color: Color);

    fn draw_indexed(
        &mut self,
        vertices: &Self::Buffer,
        indices: &Self::Buffer,
        index_count: u32,
    ) -> Result<(), RenderError>;
}

/// Writes camera position, view, projection and `world`.
pub fn bind_camera<H: ShaderHost>(
    host: &mut H,
    camera: &Camera,
    world: Mat4,
) -> Result<(), RenderError> {
    host.set_parameter(Param::CameraPosition, ParamValue::Vec3(camera.position))?;
    host.set_parameter(Param::View, ParamValue::Matrix(camera.view()))?;
    host.set_parameter(Param::Projection, ParamValue::Matrix(camera.projection()))?;
    host.set_parameter(Param::World, ParamValue::Matrix(world))
}

pub fn bind_fog<H: ShaderHost>(host: &mut H, fog: &FogSettings) -> Result<(), RenderError> {
    let enabled = if fog.enabled { 1.0 } else { 0.0 };
    host.set_parameter(Param::FogEnabled, ParamValue::Float(enabled))?;
    host.set_parameter(Param::FogStart, ParamValue::Float(fog.start))?;
    host.set_parameter(Param::FogEnd, ParamValue::Float(fog.end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_levels_cycle_through_three() {
        let start = FilterLevel::Point;
        assert_eq!(start.next(), FilterLevel::Linear);
        assert_eq!(start.next().next(), FilterLevel::Anisotropic);
        assert_eq!(start.next().next().next(), start);
    }

    #[test]
    fn wireframe_keeps_culling() {
        let state = RasterizerState::NORMAL.as_wireframe();
        assert_eq!(state.cull, CullMode::Back);
        assert_eq!(state.fill, FillMode::Wireframe);
    }

    #[test]
    fn multisample_survives_wireframe() {
        let state = RasterizerState::STATION.with_multisample(true).as_wireframe();
        assert!(state.multisample);
        assert_eq!(state.cull, CullMode::None);
        assert!(!RasterizerState::default().multisample);
    }

    #[test]
    fn solid_image_fills_every_pixel() {
        let image = TextureImage::solid(2, 3, Color::ORANGE);
        assert_eq!(image.rgba.len(), 24);
        assert_eq!(&image.rgba[20..24], &[255, 165, 0, 255]);
    }
}
