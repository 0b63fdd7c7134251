//! wgpu backend for the station renderer.
//!
//! [`WgpuHost`] implements [`station_render::ShaderHost`]: one WGSL module
//! provides every technique, pipelines are created lazily per technique,
//! vertex format and rasterizer state, and samplers per filter/address state.
//!
//! # Invariants
//! - Host calls only record; [`WgpuHost::finish_frame`] encodes the frame's
//!   passes in call order, so the off-screen pass ends before it is sampled.
//! - A pass that never received an explicit clear starts white the first time
//!   its target is used in a frame, and loads afterwards.
//! - Front faces wind clockwise; culling removes back faces.

mod frame;
mod gpu;
mod sampling;
mod shaders;
mod uniforms;

pub use gpu::{WgpuBuffer, WgpuHost};
pub use shaders::STATION_SHADER;
pub use uniforms::WgpuTexture;

pub fn crate_info() -> &'static str {
    "station-render-wgpu v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("wgpu"));
    }

    #[test]
    fn shader_exposes_every_entry_point() {
        for entry in ["vs_flat", "vs_textured", "fs_basic", "fs_textured", "fs_multi"] {
            assert!(STATION_SHADER.contains(&format!("fn {entry}(")), "{entry}");
        }
    }

    #[test]
    fn textured_fragments_honor_bias_and_clipping() {
        assert_eq!(STATION_SHADER.matches("textureSampleBias(").count(), 3);
        assert_eq!(STATION_SHADER.matches("discard;").count(), 3);
    }
}
