//! Colliding gravitating bodies in 2D
//!
//! A real-time simulation of a handful of bodies under Newtonian gravity,
//! bouncing elastically off each other, rendered with wgpu. Features:
//! - Pairwise gravity with semi-implicit Euler steps
//! - Elastic collisions rewound to the moment of contact
//! - Fading trails drawn as discs or polylines
//!
//! Controls:
//! - Space: Pause/resume simulation
//! - T: Cycle trace mode (off, circles, lines)
//! - W/A/S/D: Steer the designated body
//! - Arrow keys: Pan camera
//! - Scroll: Zoom in/out
//! - R: Reset
//! - Escape: Quit

mod equations_ui;
mod renderer;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use common::{Camera2D, GraphicsContext};
use equations_ui::{draw_equations_sidebar, draw_status_bar, SPACE_EQUATIONS, SPACE_VARIABLES};
use glam::Vec2;
use renderer::Renderer;
use space_sim::input::{Direction, FrameInput, KeyState};
use space_sim::{FrameOutcome, SimConfig, Simulation};
use winit::{
    event::{ElementState, Event, KeyEvent, MouseScrollDelta, WindowEvent},
    event_loop::ControlFlow,
    keyboard::{KeyCode, PhysicalKey},
};

const MAX_INSTANCES: usize = 20_000;
const MAX_LINE_VERTICES: usize = 20_000;

#[derive(Parser, Debug)]
#[command(about = "Colliding gravitating bodies in 2D")]
struct Args {
    /// TOML file overriding the built-in configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for procedural body placement
    #[arg(short, long)]
    seed: Option<u64>,
}

struct EguiState {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

struct App {
    ctx: GraphicsContext,
    renderer: Renderer,
    simulation: Simulation,
    camera: Camera2D,
    keys: KeyState,
    pending: FrameInput,
    egui: EguiState,
}

impl App {
    fn new(ctx: GraphicsContext, simulation: Simulation) -> Self {
        let renderer = Renderer::new(&ctx, MAX_INSTANCES, MAX_LINE_VERTICES);
        let mut camera = Camera2D::new(ctx.aspect_ratio());
        camera.zoom = simulation.config().display.zoom;

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &ctx.window,
            Some(ctx.window.scale_factor() as f32),
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&ctx.device, ctx.config.format, None, 1);

        Self {
            ctx,
            renderer,
            simulation,
            camera,
            keys: KeyState::default(),
            pending: FrameInput::default(),
            egui: EguiState {
                ctx: egui_ctx,
                state: egui_state,
                renderer: egui_renderer,
            },
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.ctx.resize(new_size);
        self.camera.update_aspect_ratio(self.ctx.aspect_ratio());
    }

    /// Hand the input gathered since the last frame to the simulation
    fn update(&mut self) -> FrameOutcome {
        let mut input = std::mem::take(&mut self.pending);
        input.direction = self.keys.direction();
        self.simulation.frame(&input)
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.update_camera(&self.ctx.queue, &self.camera);
        let scene = self
            .renderer
            .update_scene(&self.ctx.queue, &self.simulation, self.simulation.trace_mode());

        // Build egui UI
        let raw_input = self.egui.state.take_egui_input(&self.ctx.window);
        let stats = self.simulation.stats();
        let paused = self.simulation.is_paused();
        let trace_mode = self.simulation.trace_mode();
        let body_count = self.simulation.bodies().len();
        let full_output = self.egui.ctx.run(raw_input, |ctx| {
            draw_status_bar(ctx, &stats, paused, trace_mode, body_count);
            draw_equations_sidebar(ctx, "Gravity & Collisions", SPACE_EQUATIONS, SPACE_VARIABLES);
        });

        self.egui
            .state
            .handle_platform_output(&self.ctx.window, full_output.platform_output);
        let tris = self
            .egui
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui
                .renderer
                .update_texture(&self.ctx.device, &self.ctx.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.ctx.size.width, self.ctx.size.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.renderer.render(&mut encoder, &view, &scene);

        self.egui.renderer.update_buffers(
            &self.ctx.device,
            &self.ctx.queue,
            &mut encoder,
            &tris,
            &screen_descriptor,
        );
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.egui
                .renderer
                .render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui.renderer.free_texture(id);
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, state: ElementState) {
        let held = state == ElementState::Pressed;

        match key {
            KeyCode::KeyW => self.keys.set(Direction::Up, held),
            KeyCode::KeyS => self.keys.set(Direction::Down, held),
            KeyCode::KeyA => self.keys.set(Direction::Left, held),
            KeyCode::KeyD => self.keys.set(Direction::Right, held),
            // toggles fire on release
            KeyCode::Space if !held => self.pending.toggle_pause = true,
            KeyCode::KeyT if !held => self.pending.cycle_trace = true,
            KeyCode::KeyR if !held => self.pending.reset = true,
            KeyCode::Escape if !held => self.pending.quit = true,
            KeyCode::ArrowUp if held => self.camera.pan(Vec2::Y, 0.1),
            KeyCode::ArrowDown if held => self.camera.pan(Vec2::NEG_Y, 0.1),
            KeyCode::ArrowLeft if held => self.camera.pan(Vec2::NEG_X, 0.1),
            KeyCode::ArrowRight if held => self.camera.pan(Vec2::X, 0.1),
            _ => {}
        }
    }

    fn handle_scroll(&mut self, delta: f32) {
        self.camera.zoom_by(delta, 10.0, 10_000.0);
    }

    fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        self.egui.state.on_window_event(&self.ctx.window, event).consumed
    }
}

fn load_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("loading config from {}", path.display());
            SimConfig::load(path).with_context(|| format!("failed to load {}", path.display()))?
        }
        None => {
            log::info!("using built-in config");
            SimConfig::default()
        }
    };

    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    config.validate().context("invalid configuration")?;

    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let display = config.display.clone();
    let frame_time = Duration::from_secs_f64(1.0 / f64::from(display.frame_rate.max(1)));

    let (ctx, event_loop) = pollster::block_on(GraphicsContext::new(
        &display.title,
        display.width,
        display.height,
    ))
    .map_err(|e| anyhow!("failed to initialise graphics: {}", e))?;

    let mut app = App::new(ctx, Simulation::new(config));
    let mut next_frame = Instant::now();

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { ref event, .. } => {
                if app.handle_window_event(event) {
                    return;
                }

                match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::Resized(size) => app.resize(*size),
                    WindowEvent::Focused(false) => app.keys.release_all(),
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                physical_key: PhysicalKey::Code(key),
                                state,
                                ..
                            },
                        ..
                    } => app.handle_key(*key, *state),
                    WindowEvent::MouseWheel { delta, .. } => {
                        let scroll = match delta {
                            MouseScrollDelta::LineDelta(_, y) => *y,
                            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                        };
                        app.handle_scroll(scroll);
                    }
                    WindowEvent::RedrawRequested => {
                        if app.update() == FrameOutcome::Quit {
                            elwt.exit();
                            return;
                        }

                        match app.render() {
                            Ok(_) => {}
                            Err(wgpu::SurfaceError::Lost) => app.resize(app.ctx.size),
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                log::error!("out of GPU memory");
                                elwt.exit();
                            }
                            Err(e) => log::warn!("render error: {:?}", e),
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                let now = Instant::now();
                if now >= next_frame {
                    app.ctx.window.request_redraw();
                    next_frame = now + frame_time;
                }
                elwt.set_control_flow(ControlFlow::WaitUntil(next_frame));
            }
            _ => {}
        })
        .map_err(|e| anyhow!("event loop error: {}", e))?;

    Ok(())
}
