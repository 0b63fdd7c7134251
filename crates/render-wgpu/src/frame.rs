use crate::uniforms::{DrawUniforms, ShadingState, WgpuTexture};
use station_common::Color;
use station_render::{
    RasterizerState, RenderError, RenderTarget, SamplerState, Technique, VertexFormat,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct PipelineKey {
    pub technique: Technique,
    pub format: VertexFormat,
    pub rasterizer: RasterizerState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TextureGroupKey {
    pub texture: WgpuTexture,
    pub sampler: SamplerState,
    pub texture1: WgpuTexture,
    pub sampler1: SamplerState,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DrawRecord {
    pub pipeline: PipelineKey,
    pub textures: TextureGroupKey,
    pub vertices: u32,
    pub indices: u32,
    pub index_count: u32,
    pub uniform_slot: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PassRecord {
    pub target: RenderTarget,
    pub clear: Option<Color>,
    /// Fixed by the first draw; every pipeline in the pass shares it.
    pub multisample: bool,
    pub draws: Vec<DrawRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PassLoad {
    Clear(Color),
    Load,
}

/// Immediate-mode host state turned into a list of render passes.
#[derive(Debug)]
pub(crate) struct FrameRecorder {
    pub shading: ShadingState,
    pub technique: Technique,
    pub rasterizer: RasterizerState,
    pub samplers: [SamplerState; 2],
    target: RenderTarget,
    offscreen_ready: bool,
    passes: Vec<PassRecord>,
    uniforms: Vec<DrawUniforms>,
}

impl Default for FrameRecorder {
    fn default() -> Self {
        Self {
            shading: ShadingState::default(),
            technique: Technique::BasicPhongLightning,
            rasterizer: RasterizerState::default(),
            samplers: [SamplerState::default(); 2],
            target: RenderTarget::Screen,
            offscreen_ready: false,
            passes: Vec::new(),
            uniforms: Vec::new(),
        }
    }
}

impl FrameRecorder {
    pub fn begin_frame(&mut self) {
        self.passes.clear();
        self.uniforms.clear();
        self.offscreen_ready = false;
        self.target = RenderTarget::Screen;
        self.start_pass(None);
    }

    fn start_pass(&mut self, clear: Option<Color>) {
        self.passes.push(PassRecord {
            target: self.target,
            clear,
            multisample: self.rasterizer.multisample,
            draws: Vec::new(),
        });
    }

    pub fn target(&self) -> RenderTarget {
        self.target
    }

    pub fn set_render_target(&mut self, target: RenderTarget) -> Result<(), RenderError> {
        match (self.target, target) {
            (RenderTarget::Offscreen, RenderTarget::Offscreen) => {
                return Err(RenderError::RenderTargetBusy);
            }
            (RenderTarget::Offscreen, RenderTarget::Screen) => self.offscreen_ready = true,
            _ => {}
        }
        self.target = target;
        self.start_pass(None);
        Ok(())
    }

    pub fn offscreen_texture(&self) -> Result<WgpuTexture, RenderError> {
        if self.target == RenderTarget::Offscreen {
            return Err(RenderError::RenderTargetBusy);
        }
        if !self.offscreen_ready {
            return Err(RenderError::RenderTargetUnavailable);
        }
        Ok(WgpuTexture::OFFSCREEN)
    }

    /// Clears the current pass if nothing was drawn into it yet, else opens a
    /// new cleared pass on the same target.
    pub fn clear(&mut self, color: Color) {
        match self.passes.last_mut() {
            Some(pass) if pass.draws.is_empty() && pass.target == self.target => {
                pass.clear = Some(color);
                pass.multisample = self.rasterizer.multisample;
            }
            _ => self.start_pass(Some(color)),
        }
    }

    pub fn record_draw(
        &mut self,
        format: VertexFormat,
        vertices: u32,
        indices: u32,
        index_count: u32,
    ) -> Result<(), RenderError> {
        // Slots the technique does not sample stay white.
        let base = self.shading.texture.unwrap_or(WgpuTexture::WHITE);
        let (texture, texture1) = match self.technique {
            Technique::BasicPhongLightning => (WgpuTexture::WHITE, WgpuTexture::WHITE),
            Technique::Textured => (base, WgpuTexture::WHITE),
            Technique::MultiTextured => (
                base,
                self.shading.texture1.unwrap_or(WgpuTexture::WHITE),
            ),
        };
        if self.target == RenderTarget::Offscreen
            && (texture == WgpuTexture::OFFSCREEN || texture1 == WgpuTexture::OFFSCREEN)
        {
            return Err(RenderError::RenderTargetBusy);
        }
        if self.passes.is_empty() {
            self.start_pass(None);
        }
        let rasterizer = self.rasterizer;
        let Some(pass) = self.passes.last_mut() else {
            return Err(RenderError::Backend("no pass to record into".into()));
        };
        if pass.draws.is_empty() {
            pass.multisample = rasterizer.multisample;
        }
        let multisample = pass.multisample;

        let uniform_slot = self.uniforms.len() as u32;
        let draw = DrawRecord {
            pipeline: PipelineKey {
                technique: self.technique,
                format,
                rasterizer: rasterizer.with_multisample(multisample),
            },
            textures: TextureGroupKey {
                texture,
                sampler: self.samplers[0],
                texture1,
                sampler1: self.samplers[1],
            },
            vertices,
            indices,
            index_count,
            uniform_slot,
        };
        pass.draws.push(draw);
        self.uniforms.push(self.shading.uniforms());
        Ok(())
    }

    pub fn take(&mut self) -> (Vec<PassRecord>, Vec<DrawUniforms>) {
        (
            std::mem::take(&mut self.passes),
            std::mem::take(&mut self.uniforms),
        )
    }
}

/// Load operation per pass: its explicit clear, white for the first pass on a
/// target this frame, otherwise load what earlier passes drew.
pub(crate) fn pass_loads(passes: &[PassRecord]) -> Vec<PassLoad> {
    let mut screen_written = false;
    let mut offscreen_written = false;
    passes
        .iter()
        .map(|pass| {
            let written = match pass.target {
                RenderTarget::Screen => &mut screen_written,
                RenderTarget::Offscreen => &mut offscreen_written,
            };
            let load = match pass.clear {
                Some(color) => PassLoad::Clear(color),
                None if !*written => PassLoad::Clear(Color::WHITE),
                None => PassLoad::Load,
            };
            *written = true;
            load
        })
        .collect()
}
