//! Station renderer core: free-flight camera, procedural primitives, model
//! wrappers and the per-frame draw sequence, written against the [`ShaderHost`]
//! seam so any backend (or the recording [`TraceHost`]) can execute it.
//!
//! # Invariants
//! - The off-screen target is fully drawn and unbound before anything samples it.
//! - Every draw path leaves the base technique current when it returns.
//! - Index buffers are 16-bit; overflow is a build-time error, never a draw-time one.
//!
//! # Workaround
//! [`TraceHost`] records every host call instead of touching a GPU. The CLI and
//! the tests run whole frames through it; the wgpu backend implements the same
//! trait.

mod camera;
mod error;
mod host;
mod lighting;
mod mesh;
mod model;
mod orchestrator;
mod primitive;
mod scene;
mod state;
mod trace;

pub use camera::{Camera, Viewport, rotate_about};
pub use error::{MeshError, RenderError};
pub use host::{
    AddressMode, CullMode, FillMode, FilterLevel, FilterSet, MAX_LIGHTS, Param, ParamValue,
    RasterizerState, RenderTarget, SamplerState, ShaderHost, Technique, TextureImage,
    bind_camera, bind_fog,
};
pub use lighting::{Light, LightKind, LightRig};
pub use mesh::{
    Face, FlatVertex, MAX_PATCH_VERTICES, MeshData, MeshStats, Patch, Shape, TexturedVertex,
    VertexFormat, build_box, build_flat, build_textured,
};
pub use model::{Model, ModelPart, SceneObject};
pub use orchestrator::{draw_scene, render_frame};
pub use primitive::{Geometry, PatchBuffers, Primitive, TextureSet};
pub use scene::{AssetSource, StationScene};
pub use state::{CLIP_STEP, DEFAULT_LOD_BIAS, FOG_STEP, LOD_BIAS_STEP, SceneState};
pub use trace::{TraceBuffer, TraceDraw, TraceEvent, TraceHost, TraceTexture};

pub fn crate_info() -> &'static str {
    "station-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
