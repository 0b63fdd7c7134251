use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use station_assets::{AssetCatalog, ProceduralAssets};
use station_config::{CameraSettings, ConfigStore, FogSettings, ObjectConfig, STATION_OBJECTS};
use station_input::{Action, InputState};
use station_render::{
    MeshStats, RenderTarget, StationScene, TraceEvent, TraceHost, TraceTexture, Viewport,
    render_frame,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "station-cli", about = "Inspect and trace the station diorama without a GPU")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML overrides layered over the built-in station config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the resolved configuration of every scene object
    Config {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Build the scene and print per-drawable geometry counts
    Mesh,
    /// Render frames through the recording host and summarize them
    Trace {
        /// Number of frames to render
        #[arg(short, long, default_value = "1")]
        frames: u32,
        /// Actions held during every frame, e.g. `toggle-fog,yaw-left`
        #[arg(short, long, value_delimiter = ',')]
        press: Vec<Action>,
        /// Print every recorded host call of the last frame
        #[arg(long)]
        events: bool,
    },
    /// Describe the procedural asset catalog
    Assets {
        /// Emit the catalog as JSON
        #[arg(long)]
        json: bool,
        /// Write the catalog to this file
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct ConfigReport {
    camera: CameraSettings,
    fog: FogSettings,
    objects: Vec<ObjectConfig>,
}

impl ConfigReport {
    fn new(store: &ConfigStore) -> Self {
        Self {
            camera: *store.camera(),
            fog: *store.fog(),
            objects: STATION_OBJECTS
                .iter()
                .map(|(name, info)| ObjectConfig::resolve(store, name, info))
                .collect(),
        }
    }
}

/// Per-frame counts pulled from a trace.
#[derive(Debug, Default, PartialEq)]
struct FrameSummary {
    offscreen_draws: usize,
    screen_draws: usize,
    front_draws: usize,
    back_draws: usize,
    clears: usize,
    parameter_writes: usize,
    /// The off-screen target was unbound before anything sampled it.
    offscreen_ordered: bool,
}

fn summarize(events: &[TraceEvent]) -> FrameSummary {
    let mut summary = FrameSummary::default();
    let mut last_offscreen_draw = None;
    let mut unbound_at = None;
    let mut first_sample = None;
    let mut target = RenderTarget::Screen;

    for (i, event) in events.iter().enumerate() {
        match event {
            TraceEvent::SetRenderTarget(next) => {
                if target == RenderTarget::Offscreen && *next == RenderTarget::Screen {
                    unbound_at = Some(i);
                }
                target = *next;
            }
            TraceEvent::Clear { .. } => summary.clears += 1,
            TraceEvent::SetParameter(..) => summary.parameter_writes += 1,
            TraceEvent::Draw(draw) => {
                match draw.target {
                    RenderTarget::Offscreen => {
                        summary.offscreen_draws += 1;
                        last_offscreen_draw = Some(i);
                    }
                    RenderTarget::Screen => summary.screen_draws += 1,
                }
                if draw.side > 0.0 {
                    summary.front_draws += 1;
                } else if draw.side < 0.0 {
                    summary.back_draws += 1;
                }
                let samples_offscreen = draw
                    .texture
                    .as_ref()
                    .is_some_and(|t| t.name() == TraceTexture::OFFSCREEN);
                if samples_offscreen && first_sample.is_none() {
                    first_sample = Some(i);
                }
            }
            _ => {}
        }
    }

    summary.offscreen_ordered = match (last_offscreen_draw, unbound_at, first_sample) {
        (Some(drawn), Some(unbound), Some(sampled)) => drawn < unbound && unbound < sampled,
        _ => false,
    };
    summary
}

fn load_store(path: Option<&Path>) -> anyhow::Result<ConfigStore> {
    match path {
        Some(path) => ConfigStore::load(path).with_context(|| format!("loading {}", path.display())),
        None => Ok(ConfigStore::station()),
    }
}

/// Builds the station scene on a recording host, dropping the asset cache so
/// the scene holds the only model references.
fn build_scene(store: &ConfigStore) -> anyhow::Result<(TraceHost, StationScene<TraceHost>)> {
    let mut host = TraceHost::new();
    let mut assets = ProceduralAssets::new(AssetCatalog::station());
    let scene = StationScene::build(&mut host, &mut assets, store, Viewport::new(1280, 720))?;
    tracing::debug!(
        "generated {} textures and {} models",
        assets.cached_textures(),
        assets.cached_models()
    );
    drop(assets);
    Ok((host, scene))
}

fn print_stats(stats: &[(String, MeshStats)]) {
    println!("{:<20} {:>9} {:>9} {:>8}", "drawable", "vertices", "indices", "patches");
    let mut total = MeshStats::default();
    for (name, s) in stats {
        println!(
            "{name:<20} {:>9} {:>9} {:>8}",
            s.vertices, s.indices, s.patches
        );
        total.vertices += s.vertices;
        total.indices += s.indices;
        total.patches += s.patches;
    }
    println!(
        "{:<20} {:>9} {:>9} {:>8}",
        "total", total.vertices, total.indices, total.patches
    );
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("station-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", station_common::crate_info());
            println!("config: {}", station_config::crate_info());
            println!("input: {}", station_input::crate_info());
            println!("render: {}", station_render::crate_info());
            println!("assets: {}", station_assets::crate_info());
            println!("render-wgpu: {}", station_render_wgpu::crate_info());
        }
        Commands::Config { json } => {
            let store = load_store(cli.config.as_deref())?;
            let report = ConfigReport::new(&store);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }
            let camera = &report.camera;
            println!(
                "camera: position {} direction {} speed {} fov {} near {} far {}",
                camera.position,
                camera.direction,
                camera.speed,
                camera.fov_degrees,
                camera.near,
                camera.far
            );
            println!(
                "fog: enabled {} start {} end {}",
                report.fog.enabled, report.fog.start, report.fog.end
            );
            println!("{} stored values", store.len());
            for object in &report.objects {
                let t = &object.transform;
                println!("{}/{}", object.name, object.info);
                println!("  translation {}", t.translation.w_axis.truncate());
                println!("  scale       {}", t.scale_factors());
                println!(
                    "  color       ({}, {}, {}, {})",
                    object.color.r, object.color.g, object.color.b, object.color.a
                );
                println!(
                    "  size {}  texture resolution {}",
                    object.size, object.texture_resolution
                );
            }
        }
        Commands::Mesh => {
            let store = load_store(cli.config.as_deref())?;
            let (mut host, scene) = build_scene(&store)?;
            print_stats(&scene.stats());
            println!("buffers: {}", host.live_buffers());
            scene.release(&mut host);
            println!("buffers after release: {}", host.live_buffers());
        }
        Commands::Trace {
            frames,
            press,
            events,
        } => {
            let store = load_store(cli.config.as_deref())?;
            let (mut host, mut scene) = build_scene(&store)?;
            host.take_events();

            let mut input = InputState::new();
            for action in &press {
                input.press(*action);
            }
            let mut last = Vec::new();
            for frame_index in 0..frames.max(1) {
                let frame = input.next_frame();
                scene.update(&frame);
                render_frame(&mut host, &mut scene)?;
                last = host.take_events();
                let summary = summarize(&last);
                println!(
                    "frame {frame_index}: {} off-screen draws, {} screen draws ({} front, {} back), {} clears, {} parameter writes, ordered {}",
                    summary.offscreen_draws,
                    summary.screen_draws,
                    summary.front_draws,
                    summary.back_draws,
                    summary.clears,
                    summary.parameter_writes,
                    if summary.offscreen_ordered { "yes" } else { "NO" }
                );
            }

            if events {
                for event in &last {
                    println!("  {event:?}");
                }
            }

            let state = &scene.state;
            let p = scene.camera.position;
            println!("camera: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z);
            println!(
                "fog: {} ({} to {}), wireframe: {}, filters: {:?}/{:?}/{:?}",
                state.fog.enabled,
                state.fog.start,
                state.fog.end,
                state.wireframe,
                state.filters.min,
                state.filters.mag,
                state.filters.mip
            );
            println!(
                "clipping plane: {}, mip bias: {:.1}, multisampling: {}",
                state.clip_plane, state.lod_bias, state.multisample
            );
            println!(
                "lights on: {}, alternate platform texture: {}, quit requested: {}",
                state.lights.enabled_count(),
                state.platform_alternate,
                state.quit_requested
            );
            scene.release(&mut host);
        }
        Commands::Assets { json, save } => {
            let catalog = AssetCatalog::station();
            if json {
                println!("{}", serde_json::to_string_pretty(&catalog)?);
            } else {
                println!("textures:");
                for (name, recipe) in &catalog.textures {
                    let image = recipe.render();
                    println!(
                        "  {name:<10} {:<8} {}x{}",
                        recipe.kind(),
                        image.width,
                        image.height
                    );
                }
                println!("models:");
                for (name, recipe) in &catalog.models {
                    let names: Vec<&str> = recipe.parts.iter().map(|p| p.name.as_str()).collect();
                    println!("  {name:<10} {}", names.join(", "));
                }
                println!("fingerprint: {}", catalog.fingerprint()?);
            }
            if let Some(path) = save {
                catalog.save(&path)?;
                println!("saved catalog to {}", path.display());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station_trace(press: &[Action]) -> (Vec<TraceEvent>, StationScene<TraceHost>) {
        let (mut host, mut scene) = build_scene(&ConfigStore::station()).unwrap();
        let mut input = InputState::new();
        for action in press {
            input.press(*action);
        }
        scene.update(&input.next_frame());
        host.take_events();
        render_frame(&mut host, &mut scene).unwrap();
        (host.take_events(), scene)
    }

    #[test]
    fn station_frame_is_ordered() {
        let (events, _) = station_trace(&[]);
        let summary = summarize(&events);
        assert!(summary.offscreen_ordered);
        assert!(summary.offscreen_draws > 0);
        assert_eq!(summary.clears, 2);
        assert!(summary.screen_draws > summary.offscreen_draws);
    }

    #[test]
    fn front_and_back_passes_match() {
        let (events, _) = station_trace(&[]);
        let summary = summarize(&events);
        assert!(summary.front_draws > 0);
        assert!(summary.back_draws >= summary.front_draws);
    }

    #[test]
    fn empty_trace_is_not_ordered() {
        assert_eq!(summarize(&[]), FrameSummary::default());
    }

    #[test]
    fn pressed_actions_reach_the_scene() {
        let (_, scene) = station_trace(&[Action::ToggleFog, Action::ToggleWireframe]);
        assert!(scene.state.fog.enabled);
        assert!(scene.state.wireframe);
    }

    #[test]
    fn config_report_lists_every_station_object() {
        let report = ConfigReport::new(&ConfigStore::station());
        assert_eq!(report.objects.len(), STATION_OBJECTS.len());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["objects"][0]["name"], "Station");
    }

    #[test]
    fn action_lists_parse_from_the_command_line() {
        let cli = Cli::try_parse_from(["station-cli", "trace", "--press", "yaw-left,toggle-light-2"])
            .unwrap();
        match cli.command {
            Commands::Trace { press, frames, .. } => {
                assert_eq!(press, vec![Action::YawLeft, Action::ToggleLight(1)]);
                assert_eq!(frames, 1);
            }
            _ => panic!("expected trace"),
        }
    }
}
