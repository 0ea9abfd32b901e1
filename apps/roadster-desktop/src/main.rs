use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use roadster_input::{Control, InputState, KeyBindings};
use roadster_kernel::{FrameClock, SimConfig, Simulation};
use roadster_render::{FrameView, Scene};
use roadster_render_wgpu::{PerspectiveCamera, WgpuRenderer};
use std::collections::HashSet;
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
#[command(name = "roadster-desktop", about = "Drive a box around a field")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON file overriding vehicle and camera-follow parameters
    #[arg(long)]
    params: Option<PathBuf>,

    /// Step the simulation at a fixed rate (Hz, at most 1000) instead of once per frame
    #[arg(long)]
    fixed_rate: Option<f64>,

    /// Start with the HUD hidden
    #[arg(long)]
    no_hud: bool,
}

/// Arrow keys and WASD both drive.
fn default_bindings() -> KeyBindings<KeyCode> {
    [
        (KeyCode::ArrowUp, Control::Forward),
        (KeyCode::KeyW, Control::Forward),
        (KeyCode::ArrowDown, Control::Back),
        (KeyCode::KeyS, Control::Back),
        (KeyCode::ArrowLeft, Control::Left),
        (KeyCode::KeyA, Control::Left),
        (KeyCode::ArrowRight, Control::Right),
        (KeyCode::KeyD, Control::Right),
    ]
    .into_iter()
    .collect()
}

/// Application state.
struct AppState {
    sim: Simulation,
    clock: FrameClock,
    camera: PerspectiveCamera,
    bindings: KeyBindings<KeyCode>,
    keys_held: HashSet<KeyCode>,
    input: InputState,
    show_hud: bool,
    last_frame: Instant,
}

impl AppState {
    fn new(config: SimConfig, clock: FrameClock, scene: &Scene, show_hud: bool) -> Self {
        Self {
            sim: Simulation::new(config),
            clock,
            camera: PerspectiveCamera::from_lens(&scene.lens, 1280, 720),
            bindings: default_bindings(),
            keys_held: HashSet::new(),
            input: InputState::NONE,
            show_hud,
            last_frame: Instant::now(),
        }
    }

    fn update(&mut self, dt: f64) {
        self.input = self.bindings.resolve(&self.keys_held);
        let ticks = self.clock.advance(dt);
        for _ in 0..ticks {
            self.sim.tick(&self.input);
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.keys_held.insert(key);
        } else {
            self.keys_held.remove(&key);
        }

        if pressed && key == KeyCode::F1 {
            self.show_hud = !self.show_hud;
        }
    }

    fn draw_ui(&self, ctx: &EguiContext) {
        if !self.show_hud {
            return;
        }

        let v = self.sim.vehicle();
        let max_speed = self.sim.params().max_speed;

        egui::Window::new("Roadster")
            .default_pos([12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("Tick: {}", self.sim.tick_count()));
                ui.label(format!("Speed: {:.3} / {:.3}", v.speed, max_speed));
                ui.add(egui::ProgressBar::new(v.speed.abs() / max_speed).show_percentage());
                ui.label(format!("Heading: {:.1}°", v.heading.to_degrees()));
                ui.label(format!(
                    "Position: ({:.1}, {:.1})",
                    v.position.x, v.position.z
                ));
                ui.label(format!("Input: {}", self.input));
                ui.label(format!("Stepping: {}", self.clock.mode()));
                ui.separator();
                ui.small("Arrows/WASD: drive | F1: HUD | Esc: quit");
            });
    }
}

/// Window, surface and everything created against the GPU device.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, scene: Scene, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Roadster")
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
        .context("no suitable GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("roadster_device"),
                required_features: wgpu::Features::empty(),
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
            .or(surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, surface_format, size.width, size.height, scene);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    /// Draw the egui output on top of the already rendered scene.
    fn paint_ui(
        &mut self,
        egui_ctx: &EguiContext,
        view: &wgpu::TextureView,
        full_output: egui::FullOutput,
    ) {
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
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
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

struct GpuApp {
    state: AppState,
    scene: Scene,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(state: AppState, scene: Scene) -> Self {
        Self {
            state,
            scene,
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = (now - self.state.last_frame).as_secs_f64();
        self.state.last_frame = now;
        self.state.update(dt);

        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
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

        let frame = FrameView::from_simulation(&self.state.sim);
        gpu.renderer
            .render(&gpu.device, &gpu.queue, &view, &self.state.camera, &frame);

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let state = &self.state;
        let full_output = self.egui_ctx.run(raw_input, |ctx| state.draw_ui(ctx));
        gpu.paint_ui(&self.egui_ctx, &view, full_output);

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        match Gpu::new(event_loop, self.scene.clone(), &self.egui_ctx) {
            Ok(gpu) => {
                let size = gpu.window.inner_size();
                self.state.camera.resize(size.width, size.height);
                self.state.last_frame = Instant::now();
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialize graphics: {e:#}");
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
        if let Some(gpu) = &mut self.gpu {
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
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                    self.state
                        .camera
                        .resize(gpu.config.width, gpu.config.height);
                }
            }
            WindowEvent::Focused(false) => {
                // Key-up events are not delivered while unfocused.
                self.state.keys_held.clear();
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
                if key == KeyCode::Escape {
                    event_loop.exit();
                    return;
                }
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("roadster-desktop starting");

    let config = SimConfig::load_or_default(cli.params.as_deref())?;
    let clock = match cli.fixed_rate {
        Some(hz) => FrameClock::fixed(hz),
        None => FrameClock::per_frame(),
    };
    tracing::info!("stepping mode: {}", clock.mode());

    let scene = Scene::default();
    if (config.vehicle.ride_height - scene.car_ride_height()).abs() > f32::EPSILON {
        tracing::warn!(
            ride_height = config.vehicle.ride_height,
            "ride height does not rest the car on the ground"
        );
    }
    let state = AppState::new(config, clock, &scene, !cli.no_hud);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(state, scene);
    event_loop.run_app(&mut app)?;

    Ok(())
}
