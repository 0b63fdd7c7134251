use crate::error::RenderError;
use crate::host::{
    Param, ParamValue, RasterizerState, RenderTarget, SamplerState, ShaderHost, Technique,
    TextureImage,
};
use crate::mesh::VertexFormat;
use glam::Mat4;
use station_common::Color;
use std::collections::BTreeMap;

/// Texture handle of the recording host: just the texture's name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraceTexture(pub String);

impl TraceTexture {
    pub const OFFSCREEN: &'static str = "offscreen";

    pub fn name(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct TraceBuffer {
    pub id: u32,
}

/// A draw call as the host saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceDraw {
    pub target: RenderTarget,
    pub technique: Technique,
    pub rasterizer: RasterizerState,
    pub format: Option<VertexFormat>,
    pub index_count: u32,
    pub side: f32,
    pub world: Mat4,
    pub texture: Option<TraceTexture>,
    pub texture1: Option<TraceTexture>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    BeginFrame,
    CreateBuffer { id: u32, label: String, bytes: usize },
    ReleaseBuffer { id: u32 },
    CreateTexture { name: String, width: u32, height: u32 },
    SetTechnique(Technique),
    SetParameter(Param, ParamValue<TraceTexture>),
    SetRasterizer(RasterizerState),
    SetSampler { slot: usize, state: SamplerState },
    SetRenderTarget(RenderTarget),
    Clear { target: RenderTarget, color: Color },
    Draw(TraceDraw),
}

/// [`ShaderHost`] that records every call instead of rendering.
///
/// Techniques and parameters can be marked missing to exercise the
/// resource-unavailable paths.
#[derive(Debug)]
pub struct TraceHost {
    events: Vec<TraceEvent>,
    technique: Technique,
    rasterizer: RasterizerState,
    samplers: [SamplerState; 2],
    target: RenderTarget,
    offscreen_ready: bool,
    missing_techniques: Vec<Technique>,
    missing_parameters: Vec<Param>,
    next_id: u32,
    buffers: BTreeMap<u32, Option<VertexFormat>>,
    parameters: BTreeMap<Param, ParamValue<TraceTexture>>,
}

impl Default for TraceHost {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceHost {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            technique: Technique::BasicPhongLightning,
            rasterizer: RasterizerState::default(),
            samplers: [SamplerState::default(); 2],
            target: RenderTarget::Screen,
            offscreen_ready: false,
            missing_techniques: Vec::new(),
            missing_parameters: Vec::new(),
            next_id: 0,
            buffers: BTreeMap::new(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn without_technique(mut self, technique: Technique) -> Self {
        self.missing_techniques.push(technique);
        self
    }

    pub fn without_parameter(mut self, param: Param) -> Self {
        self.missing_parameters.push(param);
        self
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<TraceEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn draws(&self) -> Vec<&TraceDraw> {
        self.events
            .iter()
            .filter_map(|event| match event {
                TraceEvent::Draw(draw) => Some(draw),
                _ => None,
            })
            .collect()
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn parameter(&self, param: Param) -> Option<&ParamValue<TraceTexture>> {
        self.parameters.get(&param)
    }

    pub fn render_target(&self) -> RenderTarget {
        self.target
    }

    fn bound_texture(&self, param: Param) -> Option<TraceTexture> {
        match self.parameters.get(&param) {
            Some(ParamValue::Texture(texture)) => Some(texture.clone()),
            _ => None,
        }
    }

    fn float(&self, param: Param) -> f32 {
        match self.parameters.get(&param) {
            Some(ParamValue::Float(v)) => *v,
            _ => 0.0,
        }
    }

    fn matrix(&self, param: Param) -> Mat4 {
        match self.parameters.get(&param) {
            Some(ParamValue::Matrix(m)) => *m,
            _ => Mat4::IDENTITY,
        }
    }

    fn allocate(&mut self, label: &str, format: Option<VertexFormat>, bytes: usize) -> TraceBuffer {
        let id = self.next_id;
        self.next_id += 1;
        self.buffers.insert(id, format);
        self.events.push(TraceEvent::CreateBuffer {
            id,
            label: label.to_string(),
            bytes,
        });
        TraceBuffer { id }
    }
}

impl ShaderHost for TraceHost {
    type Buffer = TraceBuffer;
    type Texture = TraceTexture;

    fn begin_frame(&mut self) {
        self.offscreen_ready = false;
        self.events.push(TraceEvent::BeginFrame);
    }

    fn create_vertex_buffer(
        &mut self,
        label: &str,
        format: VertexFormat,
        contents: &[u8],
    ) -> Result<TraceBuffer, RenderError> {
        Ok(self.allocate(label, Some(format), contents.len()))
    }

    fn create_index_buffer(
        &mut self,
        label: &str,
        indices: &[u16],
    ) -> Result<TraceBuffer, RenderError> {
        Ok(self.allocate(label, None, std::mem::size_of_val(indices)))
    }

    fn release_buffer(&mut self, buffer: TraceBuffer) {
        self.buffers.remove(&buffer.id);
        self.events.push(TraceEvent::ReleaseBuffer { id: buffer.id });
    }

    fn create_texture(
        &mut self,
        label: &str,
        image: &TextureImage,
    ) -> Result<TraceTexture, RenderError> {
        self.events.push(TraceEvent::CreateTexture {
            name: label.to_string(),
            width: image.width,
            height: image.height,
        });
        Ok(TraceTexture(label.to_string()))
    }

    fn technique(&self) -> Technique {
        self.technique
    }

    fn set_technique(&mut self, technique: Technique) -> Result<(), RenderError> {
        if self.missing_techniques.contains(&technique) {
            return Err(RenderError::TechniqueNotFound(technique));
        }
        self.technique = technique;
        self.events.push(TraceEvent::SetTechnique(technique));
        Ok(())
    }

    fn set_parameter(
        &mut self,
        param: Param,
        value: ParamValue<TraceTexture>,
    ) -> Result<(), RenderError> {
        if self.missing_parameters.contains(&param) {
            return Err(RenderError::ParameterNotFound(param));
        }
        self.events.push(TraceEvent::SetParameter(param, value.clone()));
        self.parameters.insert(param, value);
        Ok(())
    }

    fn rasterizer(&self) -> RasterizerState {
        self.rasterizer
    }

    fn set_rasterizer(&mut self, state: RasterizerState) {
        self.rasterizer = state;
        self.events.push(TraceEvent::SetRasterizer(state));
    }

    fn sampler(&self, slot: usize) -> SamplerState {
        self.samplers.get(slot).copied().unwrap_or_default()
    }

    fn set_sampler(&mut self, slot: usize, state: SamplerState) {
        if let Some(sampler) = self.samplers.get_mut(slot) {
            *sampler = state;
        }
        self.events.push(TraceEvent::SetSampler { slot, state });
    }

    fn set_render_target(&mut self, target: RenderTarget) -> Result<(), RenderError> {
        match (self.target, target) {
            (RenderTarget::Offscreen, RenderTarget::Offscreen) => {
                return Err(RenderError::RenderTargetBusy);
            }
            (RenderTarget::Offscreen, RenderTarget::Screen) => self.offscreen_ready = true,
            _ => {}
        }
        self.target = target;
        self.events.push(TraceEvent::SetRenderTarget(target));
        Ok(())
    }

    fn offscreen_texture(&self) -> Result<TraceTexture, RenderError> {
        if self.target == RenderTarget::Offscreen {
            return Err(RenderError::RenderTargetBusy);
        }
        if !self.offscreen_ready {
            return Err(RenderError::RenderTargetUnavailable);
        }
        Ok(TraceTexture(TraceTexture::OFFSCREEN.to_string()))
    }

    fn clear(&mut self, color: Color) {
        self.events.push(TraceEvent::Clear {
            target: self.target,
            color,
        });
    }

    fn draw_indexed(
        &mut self,
        vertices: &TraceBuffer,
        indices: &TraceBuffer,
        index_count: u32,
    ) -> Result<(), RenderError> {
        let Some(format) = self.buffers.get(&vertices.id).copied() else {
            return Err(RenderError::Backend(format!("vertex buffer {} released", vertices.id)));
        };
        if !self.buffers.contains_key(&indices.id) {
            return Err(RenderError::Backend(format!("index buffer {} released", indices.id)));
        }

        let texture = self.bound_texture(Param::Texture);
        let samples_offscreen = self.technique != Technique::BasicPhongLightning
            && texture
                .as_ref()
                .is_some_and(|t| t.name() == TraceTexture::OFFSCREEN);
        if self.target == RenderTarget::Offscreen && samples_offscreen {
            return Err(RenderError::RenderTargetBusy);
        }

        let draw = TraceDraw {
            target: self.target,
            technique: self.technique,
            rasterizer: self.rasterizer,
            format,
            index_count,
            side: self.float(Param::Side),
            world: self.matrix(Param::World),
            texture,
            texture1: self.bound_texture(Param::Texture1),
        };
        self.events.push(TraceEvent::Draw(draw));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offscreen_texture_needs_a_finished_pass() {
        let mut host = TraceHost::new();
        host.begin_frame();
        assert!(matches!(
            host.offscreen_texture(),
            Err(RenderError::RenderTargetUnavailable)
        ));
        host.set_render_target(RenderTarget::Offscreen).unwrap();
        assert!(matches!(
            host.offscreen_texture(),
            Err(RenderError::RenderTargetBusy)
        ));
        assert!(matches!(
            host.set_render_target(RenderTarget::Offscreen),
            Err(RenderError::RenderTargetBusy)
        ));
        host.set_render_target(RenderTarget::Screen).unwrap();
        assert_eq!(host.offscreen_texture().unwrap().name(), "offscreen");

        host.begin_frame();
        assert!(host.offscreen_texture().is_err());
    }

    #[test]
    fn missing_resources_error() {
        let mut host = TraceHost::new()
            .without_technique(Technique::MultiTextured)
            .without_parameter(Param::FogEnd);
        assert!(matches!(
            host.set_technique(Technique::MultiTextured),
            Err(RenderError::TechniqueNotFound(Technique::MultiTextured))
        ));
        assert!(matches!(
            host.set_parameter(Param::FogEnd, ParamValue::Float(1.0)),
            Err(RenderError::ParameterNotFound(Param::FogEnd))
        ));
        assert!(host.set_technique(Technique::Textured).is_ok());
    }

    #[test]
    fn released_buffers_cannot_be_drawn() {
        let mut host = TraceHost::new();
        let vb = host
            .create_vertex_buffer("v", VertexFormat::Flat, &[0; 28])
            .unwrap();
        let ib = host.create_index_buffer("i", &[0, 1, 2]).unwrap();
        assert_eq!(host.live_buffers(), 2);
        assert!(host.draw_indexed(&vb, &ib, 3).is_ok());
        let id = vb.id;
        host.release_buffer(vb);
        let stale = TraceBuffer { id };
        assert!(host.draw_indexed(&stale, &ib, 3).is_err());
        assert_eq!(host.live_buffers(), 1);
    }

    #[test]
    fn textured_draw_into_offscreen_cannot_sample_it() {
        let mut host = TraceHost::new();
        let vb = host
            .create_vertex_buffer("v", VertexFormat::Textured, &[0; 32])
            .unwrap();
        let ib = host.create_index_buffer("i", &[0, 1, 2]).unwrap();
        host.begin_frame();
        host.set_render_target(RenderTarget::Offscreen).unwrap();
        host.set_render_target(RenderTarget::Screen).unwrap();
        let offscreen = host.offscreen_texture().unwrap();
        host.set_parameter(Param::Texture, ParamValue::Texture(offscreen))
            .unwrap();

        host.set_render_target(RenderTarget::Offscreen).unwrap();
        assert!(host.draw_indexed(&vb, &ib, 3).is_ok());
        host.set_technique(Technique::Textured).unwrap();
        assert!(matches!(
            host.draw_indexed(&vb, &ib, 3),
            Err(RenderError::RenderTargetBusy)
        ));
    }
}
