mod hud;

use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use meshview_common::{ShaderVariant, ViewerConfig};
use meshview_input::MovementFlags;
use meshview_render::SystemClock;
use meshview_render_wgpu::{GpuContext, ShadersLoaded, Startup, Viewer};
use meshview_scene::SceneState;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "meshview-desktop", about = "Interactive OBJ viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML viewer config; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// OBJ file to display
    #[arg(long)]
    mesh: Option<PathBuf>,

    /// Shader variant: green-shift, wavy, cross or noisy
    #[arg(long)]
    shader: Option<ShaderVariant>,

    /// Read WGSL from this directory instead of the built-in sources
    #[arg(long)]
    shader_dir: Option<PathBuf>,
}

/// Map the six movement keys to the characters the input crate expects.
fn movement_key(code: KeyCode) -> Option<char> {
    match code {
        KeyCode::KeyR => Some('r'),
        KeyCode::KeyF => Some('f'),
        KeyCode::KeyA => Some('a'),
        KeyCode::KeyD => Some('d'),
        KeyCode::KeyW => Some('w'),
        KeyCode::KeyS => Some('s'),
        _ => None,
    }
}

/// Everything that exists only once a window and device do.
struct Graphics {
    window: Arc<Window>,
    gpu: GpuContext,
    viewer: Viewer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct ViewerApp {
    config: ViewerConfig,
    pending: Option<ShadersLoaded>,
    scene: SceneState,
    flags: MovementFlags,
    clock: SystemClock,
    hud: hud::HudState,
    egui_ctx: EguiContext,
    gfx: Option<Graphics>,
    error: Option<anyhow::Error>,
}

impl ViewerApp {
    fn new(config: ViewerConfig, loaded: ShadersLoaded) -> Self {
        let scene = SceneState::new(config.shader, config.initial_effect);
        Self {
            hud: hud::HudState::new(&scene),
            config,
            pending: Some(loaded),
            scene,
            flags: MovementFlags::new(),
            clock: SystemClock,
            egui_ctx: EguiContext::default(),
            gfx: None,
            error: None,
        }
    }

    /// Window, device, pipelines, then the render loop. Any failure is fatal.
    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let loaded = self
            .pending
            .take()
            .context("viewer was already started")?;

        let attrs = Window::default_attributes()
            .with_title(format!("Mesh Viewer - {}", self.config.shader))
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let size = window.inner_size();
        let gpu = GpuContext::new(window.clone(), size.width, size.height)?;
        let (width, height) = gpu.size();
        self.scene.set_aspect(width as f32 / height as f32);

        let viewer = loaded.start(
            &gpu,
            self.config.grid_row_spacing,
            self.config.grid_col_spacing,
            &self.clock,
        )?;

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&gpu.device, gpu.format(), None, 1, false);

        self.hud.backend = gpu.backend().to_str().to_string();
        window.request_redraw();
        self.gfx = Some(Graphics {
            window,
            gpu,
            viewer,
            egui_winit,
            egui_renderer,
        });
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        tracing::error!("{err:#}");
        self.error = Some(err);
        event_loop.exit();
    }

    fn redraw(&mut self) -> Result<()> {
        let Some(gfx) = &mut self.gfx else {
            return Ok(());
        };

        let frame = gfx
            .viewer
            .render_loop
            .tick(&self.clock, &mut self.scene, &self.flags)?;

        let output = match gfx.gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gfx.gpu.reconfigure();
                return Ok(());
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return Ok(());
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gfx.viewer
            .renderer
            .render(&gfx.gpu.device, &gfx.gpu.queue, &view, &frame);

        let raw_input = gfx.egui_winit.take_egui_input(&gfx.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.hud.draw(ctx, &mut self.scene);
        });
        gfx.egui_winit
            .handle_platform_output(&gfx.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let (width, height) = gfx.gpu.size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let device = &gfx.gpu.device;
        let queue = &gfx.gpu.queue;
        for (id, image_delta) in &full_output.textures_delta.set {
            gfx.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        gfx.egui_renderer.update_buffers(
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
            gfx.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gfx.egui_renderer.free_texture(id);
        }

        output.present();
        gfx.window.request_redraw();
        Ok(())
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gfx.is_some() || self.error.is_some() {
            return;
        }
        if let Err(e) = self.init_graphics(event_loop) {
            self.fail(event_loop, e.context("startup failed"));
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let consumed = match &mut self.gfx {
            Some(gfx) => gfx.egui_winit.on_window_event(&gfx.window, &event).consumed,
            None => false,
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gfx) = &mut self.gfx {
                    gfx.gpu.resize(new_size.width, new_size.height);
                    let (width, height) = gfx.gpu.size();
                    gfx.viewer.renderer.resize(&gfx.gpu.device, width, height);
                    self.scene.set_aspect(width as f32 / height as f32);
                    tracing::debug!(width, height, "resized");
                }
            }
            WindowEvent::Focused(false) => {
                self.flags.clear();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                let pressed = state == ElementState::Pressed;
                // releases always land so a key held while typing cannot stick
                if pressed && consumed {
                    return;
                }
                if let Some(key) = movement_key(code) {
                    self.flags.handle_key(key, pressed);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    self.fail(event_loop, e);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gfx) = &self.gfx {
            gfx.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("meshview-desktop starting");

    let mut config = ViewerConfig::load_or_default(cli.config.as_deref())
        .context("failed to load viewer config")?;
    config.apply_overrides(cli.mesh, cli.shader, cli.shader_dir);

    let loaded = Startup::load_mesh(&config.mesh)
        .and_then(|mesh| mesh.load_shaders(config.shader, config.shader_dir.as_deref()))
        .inspect_err(|e| tracing::error!("startup failed: {e}"))?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::new(config, loaded);
    event_loop.run_app(&mut app)?;

    match app.error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
