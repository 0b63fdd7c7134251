mod keymap;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use egui::Context as EguiContext;
use station_assets::{AssetCatalog, ProceduralAssets};
use station_config::ConfigStore;
use station_input::InputState;
use station_render::{StationScene, Viewport, render_frame};
use station_render_wgpu::WgpuHost;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "station-desktop", about = "Station diorama viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML overrides layered over the built-in station config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Asset catalog JSON; the built-in procedural catalog when omitted
    #[arg(long)]
    assets: Option<PathBuf>,
}

/// Window-independent application state.
struct AppState {
    store: ConfigStore,
    catalog: AssetCatalog,
    input: InputState,
    show_hud: bool,
    last_frame: Instant,
    frame_ms: f32,
}

impl AppState {
    fn new(store: ConfigStore, catalog: AssetCatalog) -> Self {
        Self {
            store,
            catalog,
            input: InputState::new(),
            show_hud: true,
            last_frame: Instant::now(),
            frame_ms: 0.0,
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if key == KeyCode::F1 {
            if pressed {
                self.show_hud = !self.show_hud;
            }
            return;
        }
        let Some(action) = keymap::action_for(key) else {
            return;
        };
        if pressed {
            self.input.press(action);
        } else {
            self.input.release(action);
        }
    }

    fn tick(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        // Smoothed for display.
        self.frame_ms += (dt * 1000.0 - self.frame_ms) * 0.1;
    }
}

fn draw_hud(ctx: &EguiContext, state: &AppState, scene: &StationScene<WgpuHost>) {
    if !state.show_hud {
        return;
    }
    let live = &scene.state;
    egui::SidePanel::left("hud")
        .default_width(260.0)
        .show(ctx, |ui| {
            ui.heading("Station");
            ui.separator();
            ui.label(format!("Frame: {:.2} ms", state.frame_ms));
            let p = scene.camera.position;
            let d = scene.camera.direction;
            ui.label(format!("Camera: ({:.1}, {:.1}, {:.1})", p.x, p.y, p.z));
            ui.label(format!("Looking: ({:.2}, {:.2}, {:.2})", d.x, d.y, d.z));
            ui.separator();

            ui.heading("Lights");
            for (i, light) in live.lights.lights.iter().enumerate() {
                let status = if light.enabled { "on" } else { "off" };
                ui.label(format!("{}: {:?} {status}", i + 1, light.kind));
            }
            ui.separator();

            ui.heading("Render");
            ui.label(format!(
                "Fog: {} ({:.0} to {:.0})",
                if live.fog.enabled { "on" } else { "off" },
                live.fog.start,
                live.fog.end
            ));
            ui.label(format!("Wireframe: {}", if live.wireframe { "on" } else { "off" }));
            ui.label(format!("Multisampling: {}", if live.multisample { "on" } else { "off" }));
            ui.label(format!("Clipping plane: {:.0}", live.clip_plane));
            ui.label(format!(
                "Filters: min {:?}, mag {:?}, mip {:?}",
                live.filters.min, live.filters.mag, live.filters.mip
            ));
            ui.label(format!("Mip bias: {:.1}", live.lod_bias));
            ui.label(format!(
                "Platform texture: {}",
                if live.platform_alternate { "rock2" } else { "rock1" }
            ));
            ui.separator();

            ui.heading("Drawables");
            for (name, stats) in scene.stats() {
                ui.label(format!(
                    "{name}: {} verts, {} patches",
                    stats.vertices, stats.patches
                ));
            }
            ui.separator();

            ui.heading("Keys");
            egui::Grid::new("keys").striped(true).show(ui, |ui| {
                for (key, action) in keymap::BINDINGS {
                    ui.small(format!("{key:?}"));
                    ui.small(action.to_string());
                    ui.end_row();
                }
            });
            ui.small("F1: toggle this panel");
        });
}

/// Everything that exists only while a window is open.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    host: WgpuHost,
    scene: Option<StationScene<WgpuHost>>,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn init_gpu(&self, event_loop: &ActiveEventLoop) -> Result<Gpu> {
        let attrs = Window::default_attributes()
            .with_title("Station")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no suitable GPU adapter"))?;

        // Wireframe needs line polygon mode; without it wireframe draws fill.
        let required_features = adapter.features() & wgpu::Features::POLYGON_MODE_LINE;
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("station_device"),
                required_features,
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        let mut host = WgpuHost::new(device, queue, surface_format, config.width, config.height);
        let viewport = Viewport::new(config.width, config.height);
        let scene = {
            let mut assets = ProceduralAssets::new(self.state.catalog.clone());
            let scene = StationScene::build(&mut host, &mut assets, &self.state.store, viewport)
                .context("build station scene")?;
            tracing::debug!(
                "generated {} textures and {} models",
                assets.cached_textures(),
                assets.cached_models()
            );
            scene
        };

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Gpu {
            window,
            surface,
            config,
            host,
            scene: Some(scene),
            egui_winit,
            egui_renderer,
        })
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let Some(scene) = gpu.scene.as_mut() else {
            return;
        };
        self.state.tick();

        let frame = self.state.input.next_frame();
        scene.update(&frame);
        if scene.state.quit_requested {
            event_loop.exit();
            return;
        }

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(gpu.host.device(), &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let rendered = render_frame(&mut gpu.host, scene).and_then(|()| gpu.host.finish_frame(&view));
        if let Err(e) = rendered {
            tracing::error!("frame failed: {e}");
            event_loop.exit();
            return;
        }

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let state = &self.state;
        let full_output = self.egui_ctx.run(raw_input, |ctx| draw_hud(ctx, state, scene));
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);
        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let device = gpu.host.device();
        let queue = gpu.host.queue();
        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        gpu.egui_renderer.update_buffers(
            device,
            queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match self.init_gpu(event_loop) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                tracing::error!("startup failed: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = self.gpu.as_mut() {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.config.width = new_size.width.max(1);
                    gpu.config.height = new_size.height.max(1);
                    gpu.surface.configure(gpu.host.device(), &gpu.config);
                    gpu.host.resize(gpu.config.width, gpu.config.height);
                    if let Some(scene) = gpu.scene.as_mut() {
                        scene.resize(Viewport::new(gpu.config.width, gpu.config.height));
                    }
                }
            }
            WindowEvent::Focused(false) => {
                self.state.input.release_all();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = self.gpu.as_mut() {
            if let Some(scene) = gpu.scene.take() {
                scene.release(&mut gpu.host);
            }
            tracing::info!("released scene, {} buffers left", gpu.host.live_buffers());
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("station-desktop starting");

    let store = match &cli.config {
        Some(path) => ConfigStore::load(path)?,
        None => ConfigStore::station(),
    };
    let catalog = match &cli.assets {
        Some(path) => AssetCatalog::load(path)?,
        None => AssetCatalog::station(),
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = GpuApp::new(AppState::new(store, catalog));
    event_loop.run_app(&mut app)?;
    Ok(())
}
