//! Multi-Slit Interference Viewer
//!
//! Heatmap of the superposed wave packet density with the detector profile
//! drawn above it. The bottom panel moves the slits, the drift velocity and
//! the time; Play advances time continuously.
//!
//! Controls:
//! - Space: Play/pause
//! - Left/Right: Step time
//! - R: Reset to the preset
//! - Scroll: Zoom

use clap::Parser;
use common::{Camera2D, GraphicsContext};
use double_slit::equations_ui::{
    draw_controls, draw_equations_sidebar, ControlState, DOUBLE_SLIT_EQUATIONS, DOUBLE_SLIT_VARIABLES,
};
use double_slit::render::Colormap;
use double_slit::renderer::{
    cell_stride, field_to_cells, frame_segments, marker_segments, profile_to_segments, FieldRenderer, Segment,
};
use double_slit::{superpose, DensityField, Motion, Preset, SampleGrid, SceneConfig, SlitLayout};
use glam::Vec2;
use winit::{
    event::{ElementState, Event, KeyEvent, MouseScrollDelta, WindowEvent},
    event_loop::ControlFlow,
    keyboard::{KeyCode, PhysicalKey},
};

const MAX_CELLS: usize = 40_000;

/// Line budget beyond the profile polyline: two frames plus slit markers
const EXTRA_LINES: usize = 256;

/// Gap between the heatmap and the profile panel, in world units
const PROFILE_GAP: f32 = 0.4;

const PROFILE_COLOR: [f32; 4] = [1.0, 0.5, 0.05, 1.0];
const FRAME_COLOR: [f32; 4] = [0.5, 0.5, 0.5, 0.6];
const MARKER_COLOR: [f32; 4] = [0.3, 0.8, 1.0, 1.0];

#[derive(Parser, Debug)]
#[command(name = "double_slit")]
#[command(about = "Interactive multi-slit wave packet interference")]
struct Args {
    /// Preset scene (web, interactive, pixels, diverging)
    #[arg(long, short = 'p', default_value = "interactive")]
    preset: String,

    /// Scene JSON file, overrides the preset
    #[arg(long, short = 'c')]
    config: Option<std::path::PathBuf>,

    #[arg(long, default_value = "heat")]
    colormap: String,
}

struct EguiState {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

struct App {
    ctx: GraphicsContext,
    renderer: FieldRenderer,
    camera: Camera2D,
    scene: SceneConfig,
    preset: SceneConfig,
    grid: SampleGrid,
    controls: ControlState,
    colormap: Colormap,
    stride: usize,
    field: Option<DensityField>,
    dirty: bool,
    egui: EguiState,
}

impl App {
    fn new(ctx: GraphicsContext, scene: SceneConfig, grid: SampleGrid, colormap: Colormap) -> Self {
        let stride = cell_stride(grid.nx(), grid.ny(), MAX_CELLS);
        let max_lines = grid.nx() + 2 * scene.layout.len() + EXTRA_LINES;
        log::info!("drawing every {stride} sample(s), {max_lines} line segments");

        let renderer = FieldRenderer::new(&ctx, MAX_CELLS, max_lines);
        let camera = Camera2D::new(ctx.aspect_ratio());

        let controls = ControlState::from_scene(&scene);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &ctx.window,
            Some(ctx.window.scale_factor() as f32),
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&ctx.device, ctx.config.format, None, 1);

        let mut app = Self {
            ctx,
            renderer,
            camera,
            preset: scene.clone(),
            scene,
            grid,
            controls,
            colormap,
            stride,
            field: None,
            dirty: true,
            egui: EguiState {
                ctx: egui_ctx,
                state: egui_state,
                renderer: egui_renderer,
            },
        };
        app.fit_camera();
        app
    }

    /// World rectangle holding the heatmap and the profile panel above it
    fn view_bounds(&self) -> (Vec2, Vec2) {
        let (x_min, x_max, y_min, y_max) = self.grid.extent();
        let top = y_max as f32 + PROFILE_GAP + self.profile_height();
        (Vec2::new(x_min as f32, y_min as f32), Vec2::new(x_max as f32, top))
    }

    fn profile_height(&self) -> f32 {
        let (_, _, y_min, y_max) = self.grid.extent();
        ((y_max - y_min) * 0.5) as f32
    }

    fn fit_camera(&mut self) {
        let (min, max) = self.view_bounds();
        self.camera.update_aspect_ratio(self.ctx.aspect_ratio());
        self.camera.fit(min, max, 0.08);
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.ctx.resize(new_size);
        self.fit_camera();
    }

    fn sync_scene(&mut self) {
        self.scene.layout = SlitLayout::Explicit {
            positions: self.controls.slits.clone(),
        };
        self.scene.motion = Motion {
            vy: self.controls.velocity,
            ..self.scene.motion
        };
        self.scene.time = self.controls.time;
        self.dirty = true;
    }

    fn update(&mut self, dt: f32) {
        if self.controls.advance(dt as f64) {
            self.sync_scene();
        }
        if !self.dirty {
            return;
        }
        self.dirty = false;

        let result = self
            .scene
            .request_on(&self.grid, self.scene.time)
            .and_then(|request| superpose(&request));
        match result {
            Ok(field) => self.field = Some(field),
            Err(e) => log::error!("field evaluation failed: {e}"),
        }
    }

    fn overlay_segments(&self, field: &DensityField) -> Vec<Segment> {
        let (x_min, x_max, y_min, y_max) = self.grid.extent();
        let (x_min, x_max) = (x_min as f32, x_max as f32);
        let base = y_max as f32 + PROFILE_GAP;
        let height = self.profile_height();

        let mut lines = frame_segments((x_min, y_min as f32), (x_max, y_max as f32), FRAME_COLOR);
        lines.extend(frame_segments((x_min, base), (x_max, base + height), FRAME_COLOR));

        let profile = field.detector(self.scene.display.detector);
        lines.extend(profile_to_segments(
            self.grid.xs(),
            &profile,
            base,
            height,
            self.scene.display.profile_max,
            PROFILE_COLOR,
        ));

        if let Ok(emitters) = self.scene.emitters() {
            let points: Vec<(f64, f64)> = emitters
                .iter()
                .map(|e| e.position_at(self.scene.time))
                .collect();
            lines.extend(marker_segments(&points, 0.15, MARKER_COLOR));
        }
        lines
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.update_camera(&self.ctx.queue, &self.camera);

        let (num_cells, num_lines) = match &self.field {
            Some(field) => {
                let cells = field_to_cells(field, self.scene.display.clim, self.colormap, self.stride);
                let lines = self.overlay_segments(field);
                (
                    self.renderer.update_cells(&self.ctx.queue, &cells),
                    self.renderer.update_lines(&self.ctx.queue, &lines),
                )
            }
            None => (0, 0),
        };

        let peak = self.field.as_ref().map(|f| (f.max().0, f.argmax_position()));
        let n_slits = self.controls.slits.len();

        // Build egui UI
        let raw_input = self.egui.state.take_egui_input(&self.ctx.window);
        let controls = &mut self.controls;
        let mut changed = false;
        let full_output = self.egui.ctx.run(raw_input, |ctx| {
            draw_equations_sidebar(
                ctx,
                "Multi-Slit Interference",
                DOUBLE_SLIT_EQUATIONS,
                DOUBLE_SLIT_VARIABLES,
            );

            egui::TopBottomPanel::top("status").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(format!("t = {:.2}", controls.time));
                    ui.separator();
                    ui.label(format!("slits = {n_slits}"));
                    ui.separator();
                    ui.label(format!("v = {:.2}", controls.velocity));
                    if let Some((max, (x, y))) = peak {
                        ui.separator();
                        ui.label(format!("max ρ = {max:.4} at ({x:.2}, {y:.2})"));
                    }
                    if controls.playing {
                        ui.label(egui::RichText::new("PLAYING").color(egui::Color32::YELLOW));
                    }
                });
            });

            changed = draw_controls(ctx, controls);
        });
        if changed {
            self.sync_scene();
        }

        self.egui.state.handle_platform_output(&self.ctx.window, full_output.platform_output);
        let tris = self.egui.ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui.renderer.update_texture(&self.ctx.device, &self.ctx.queue, *id, image_delta);
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

        self.renderer.render(&mut encoder, &view, num_cells, num_lines);

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
            self.egui.renderer.render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui.renderer.free_texture(id);
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, state: ElementState) {
        if state != ElementState::Pressed {
            return;
        }

        match key {
            KeyCode::Space => self.controls.playing = !self.controls.playing,
            KeyCode::ArrowRight => {
                self.controls.step_time(0.05);
                self.sync_scene();
            }
            KeyCode::ArrowLeft => {
                self.controls.step_time(-0.05);
                self.sync_scene();
            }
            KeyCode::KeyR => {
                self.scene = self.preset.clone();
                self.controls = ControlState::from_scene(&self.scene);
                self.dirty = true;
                self.fit_camera();
            }
            _ => {}
        }
    }

    fn handle_scroll(&mut self, delta: f32) {
        self.camera.zoom *= 1.0 - delta * 0.1;
        self.camera.zoom = self.camera.zoom.clamp(0.5, 50.0);
    }

    fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        self.egui.state.on_window_event(&self.ctx.window, event).consumed
    }
}

fn load_scene(args: &Args) -> double_slit::Result<SceneConfig> {
    match &args.config {
        Some(path) => SceneConfig::from_json_file(path),
        None => Ok(Preset::from_name(&args.preset)?.config()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let scene = load_scene(&args)?;
    let grid = scene.build_grid()?;
    let colormap = Colormap::from_name(&args.colormap).unwrap_or_default();

    let (ctx, event_loop) = pollster::block_on(GraphicsContext::new(
        "Multi-Slit Interference - Gaussian Wave Packets",
        1280,
        720,
    ))?;
    log::info!(
        "scene: {} slits on a {}x{} grid",
        scene.layout.len(),
        grid.nx(),
        grid.ny()
    );

    let mut app = App::new(ctx, scene, grid, colormap);
    let mut last_time = std::time::Instant::now();

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { ref event, .. } => {
                let consumed = app.handle_window_event(event);

                if !consumed {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::Resized(size) => app.resize(*size),
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
                            let now = std::time::Instant::now();
                            let dt = (now - last_time).as_secs_f32().min(0.1);
                            last_time = now;

                            app.update(dt);
                            match app.render() {
                                Ok(_) => {}
                                Err(wgpu::SurfaceError::Lost) => app.resize(app.ctx.size),
                                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                                Err(e) => log::warn!("render error: {e:?}"),
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::AboutToWait => {
                app.ctx.window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}
