use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use knockabout_common::Viewport;
use knockabout_input::{Action, InputEvent, InputSender, Key, input_channel};
use knockabout_kernel::{RapierWorld, StepMode};
use knockabout_render::OrbitCamera;
use knockabout_render_wgpu::{GpuFrame, GpuSurface};
use knockabout_scene::{FrameDriver, SceneConfig, build_scene};
use knockabout_tools::SceneInspector;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "knockabout-desktop", about = "Knockabout desktop application")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Built-in scene preset
    #[arg(long, default_value = "pyramid", conflicts_with = "config")]
    preset: String,

    /// Scene config file (.yaml, .yml, or .json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Step physics from accumulated frame time instead of once per frame
    #[arg(long)]
    accumulate: bool,
}

type Driver = FrameDriver<RapierWorld, OrbitCamera>;

/// Everything that exists only once the window is up.
struct Running {
    window: Arc<Window>,
    surface: GpuSurface,
    driver: Driver,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct App {
    config: SceneConfig,
    input: Option<InputSender>,
    running: Option<Running>,
    egui_ctx: EguiContext,
    show_hud: bool,
    dragging: bool,
    cursor: Option<(f64, f64)>,
    last_frame: Instant,
}

impl App {
    fn new(config: SceneConfig) -> Self {
        Self {
            config,
            input: None,
            running: None,
            egui_ctx: EguiContext::default(),
            show_hud: true,
            dragging: false,
            cursor: None,
            last_frame: Instant::now(),
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(format!("Knockabout - {}", self.config.name))
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let size = window.inner_size();
        let viewport = Viewport::new(size.width.max(1), size.height.max(1));
        let surface = GpuSurface::new(window.clone(), viewport)?;

        let scene = build_scene(&self.config)?;
        let camera = OrbitCamera::new(self.config.camera, viewport.aspect());
        let (input, receiver) = input_channel();
        let mut driver = FrameDriver::new(scene, &self.config, camera, receiver)?;
        driver.start();

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(surface.device(), surface.format(), None, 1, false);

        self.input = Some(input);
        self.last_frame = Instant::now();
        self.running = Some(Running {
            window,
            surface,
            driver,
            egui_winit,
            egui_renderer,
        });
        Ok(())
    }

    /// Returns true when the key was consumed by the app itself.
    fn handle_app_key(&mut self, event_loop: &ActiveEventLoop, code: KeyCode) -> bool {
        match code {
            KeyCode::F1 => {
                self.show_hud = !self.show_hud;
                true
            }
            KeyCode::Escape => {
                event_loop.exit();
                true
            }
            _ => false,
        }
    }

    fn send_key(&self, code: KeyCode, pressed: bool, repeat: bool) {
        let Some(input) = &self.input else {
            return;
        };
        let key = Key::new(format!("{code:?}"));
        let event = if pressed {
            InputEvent::KeyDown { key, repeat }
        } else {
            InputEvent::KeyUp { key }
        };
        if !input.send(event) {
            tracing::warn!("input channel closed");
        }
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = now - self.last_frame;
        self.last_frame = now;

        let show_hud = self.show_hud;
        let Some(running) = &mut self.running else {
            return;
        };
        let Some(Some(frame)) = running.driver.tick(dt, &mut running.surface) else {
            running.window.request_redraw();
            return;
        };

        if show_hud {
            draw_hud(&self.egui_ctx, running, &frame);
        }
        frame.present();
        running.window.request_redraw();
    }
}

fn draw_hud(ctx: &EguiContext, running: &mut Running, frame: &GpuFrame) {
    let raw_input = running.egui_winit.take_egui_input(&running.window);
    let summary = SceneInspector::summary(&running.driver);
    let full_output = ctx.run(raw_input, |ctx| {
        egui::Window::new("Scene")
            .default_pos([12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("State: {:?}", summary.state));
                ui.label(format!(
                    "Frame: {}  Steps: {}  t={:.2}s",
                    summary.frame, summary.steps, summary.sim_time
                ));
                ui.label(format!(
                    "Bodies: {}  Synced: {}",
                    summary.bodies, summary.pairs
                ));
                if let Some(p) = summary.controlled_position {
                    ui.label(format!("Player: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));
                }
                if let Some(v) = summary.controlled_velocity {
                    ui.label(format!("Velocity: ({:.2}, {:.2}, {:.2})", v.x, v.y, v.z));
                }
                ui.label(format!("Held: {:?}", summary.held));
                ui.label(format!(
                    "Camera: ({:.1}, {:.1}, {:.1})",
                    summary.camera_eye.x, summary.camera_eye.y, summary.camera_eye.z
                ));
                ui.separator();
                ui.small("WASD: Move | Space: Jump | LMB drag: Orbit | Wheel: Zoom | F1: HUD");
            });
    });

    running
        .egui_winit
        .handle_platform_output(&running.window, full_output.platform_output);
    let paint_jobs = ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
    let viewport = running.surface.viewport();
    let screen_descriptor = egui_wgpu::ScreenDescriptor {
        size_in_pixels: [viewport.width, viewport.height],
        pixels_per_point: full_output.pixels_per_point,
    };

    let device = running.surface.device();
    let queue = running.surface.queue();
    let egui_renderer = &mut running.egui_renderer;
    for (id, image_delta) in &full_output.textures_delta.set {
        egui_renderer.update_texture(device, queue, *id, image_delta);
    }
    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("egui_encoder"),
    });
    egui_renderer.update_buffers(device, queue, &mut encoder, &paint_jobs, &screen_descriptor);
    {
        let mut pass = encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
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
        egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
    }
    queue.submit(std::iter::once(encoder.finish()));
    for id in &full_output.textures_delta.free {
        egui_renderer.free_texture(id);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            tracing::error!("failed to start: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(running) = &mut self.running {
            if self.show_hud {
                let response = running.egui_winit.on_window_event(&running.window, &event);
                if response.consumed {
                    return;
                }
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(running) = &mut self.running {
                    let viewport = Viewport::new(new_size.width.max(1), new_size.height.max(1));
                    running.driver.resize(viewport, &mut running.surface);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => {
                let pressed = state == ElementState::Pressed;
                if pressed && !repeat && self.handle_app_key(event_loop, code) {
                    return;
                }
                self.send_key(code, pressed, repeat);
            }
            WindowEvent::Focused(false) => {
                // Key-up events are lost while unfocused
                if let Some(input) = &self.input {
                    let bindings = &self.config.control.bindings;
                    for action in Action::ALL {
                        for key in bindings.keys_for(action) {
                            input.send(InputEvent::up(key.clone()));
                        }
                    }
                }
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                self.dragging = state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let (Some((x, y)), Some(running)) = (self.cursor, &mut self.running) {
                    if self.dragging {
                        let height = running.surface.viewport().height;
                        running.driver.camera_mut().rotate_pixels(
                            (position.x - x) as f32,
                            (position.y - y) as f32,
                            height,
                        );
                    }
                }
                self.cursor = Some((position.x, position.y));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / 50.0) as f32,
                };
                if let Some(running) = &mut self.running {
                    running.driver.camera_mut().zoom(steps);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(running) = &self.running {
            running.window.request_redraw();
        }
    }
}

fn load_config(cli: &Cli) -> Result<SceneConfig> {
    let mut config = match &cli.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => SceneConfig::preset(&cli.preset)?,
    };
    if cli.accumulate {
        config.step_mode = StepMode::Accumulated {
            max_steps_per_frame: 5,
        };
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    let config = load_config(&cli)?;
    tracing::info!(scene = %config.name, "knockabout-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
