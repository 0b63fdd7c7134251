//! Per-frame draw sequence.

use crate::camera::Camera;
use crate::error::RenderError;
use crate::host::{
    Param, ParamValue, RasterizerState, RenderTarget, SamplerState, ShaderHost, Technique,
    bind_camera,
};
use crate::scene::StationScene;
use crate::state::SceneState;
use station_common::Color;
use tracing::trace;

/// Renders one frame: the screen camera's view into the off-screen target, then
/// the screen surface showing it, then the scene from the main camera.
pub fn render_frame<H: ShaderHost>(
    host: &mut H,
    scene: &mut StationScene<H>,
) -> Result<(), RenderError> {
    host.begin_frame();
    configure(host, scene)?;
    setup(host, &scene.state);

    host.set_render_target(RenderTarget::Offscreen)?;
    draw_scene(host, scene, &scene.screen_camera)?;
    host.set_render_target(RenderTarget::Screen)?;

    setup(host, &scene.state);
    let previous = host.sampler(0);
    host.set_sampler(0, SamplerState::clamped(scene.state.filters));
    let offscreen = host.offscreen_texture()?;
    scene.screen.set_base_texture(Some(offscreen));
    scene.screen.draw(host, &scene.camera, &scene.state.fog)?;
    host.set_sampler(0, previous);

    draw_scene(host, scene, &scene.camera)?;
    trace!("frame recorded");
    Ok(())
}

fn configure<H: ShaderHost>(host: &mut H, scene: &StationScene<H>) -> Result<(), RenderError> {
    host.set_technique(Technique::BasicPhongLightning)?;
    bind_camera(host, &scene.camera, scene.camera.world())?;
    scene.state.lights.upload(host)?;
    host.set_parameter(Param::ClippingPlane, ParamValue::Float(scene.state.clip_plane))?;
    host.set_parameter(Param::MipLodBias, ParamValue::Float(scene.state.lod_bias))
}

fn setup<H: ShaderHost>(host: &mut H, state: &SceneState) {
    host.set_rasterizer(host.rasterizer().with_multisample(state.multisample));
    host.clear(Color::WHITE);
    host.set_sampler(0, SamplerState::wrap(state.filters));
    host.set_sampler(1, SamplerState::wrap_u(state.filters));
}

/// Draws every scene drawable except the screen with `camera`.
///
/// Textured primitives and objects are drawn twice: front faces with `Side = 1`,
/// then a wireframe pass with `Side = -1`. The enclosing flat primitives follow
/// with culling off. The rasterizer is restored and `Side` reset to 0.
pub fn draw_scene<H: ShaderHost>(
    host: &mut H,
    scene: &StationScene<H>,
    camera: &Camera,
) -> Result<(), RenderError> {
    let original = host.rasterizer();
    let wireframe = scene.state.wireframe;
    let multisample = scene.state.multisample;
    let fog = &scene.state.fog;

    let front = if wireframe {
        RasterizerState::NORMAL.as_wireframe()
    } else {
        RasterizerState::NORMAL
    };
    let back = RasterizerState::WIREFRAME;
    for (side, rasterizer) in [(1.0, front), (-1.0, back)] {
        let rasterizer = rasterizer.with_multisample(multisample);
        host.set_parameter(Param::Side, ParamValue::Float(side))?;
        host.set_rasterizer(rasterizer);
        for primitive in &scene.textured {
            primitive.draw(host, camera, fog)?;
        }
        for object in &scene.objects {
            object.draw(host, camera, fog)?;
        }
    }

    let station = if wireframe {
        RasterizerState::STATION.as_wireframe()
    } else {
        RasterizerState::STATION
    };
    host.set_rasterizer(station.with_multisample(multisample));
    for primitive in &scene.primitives {
        primitive.draw(host, camera, fog)?;
    }

    host.set_rasterizer(original);
    host.set_parameter(Param::Side, ParamValue::Float(0.0))
}
