use anyhow::Result;
use clap::Parser;
use egui::Context as EguiContext;
use realm_config::GameConfig;
use realm_input::{InputEvent, Key};
use realm_render::SceneBackend;
use realm_render_wgpu::{GpuContext, WgpuBackend};
use realm_runtime::Game;
use realm_tools::FrameInspector;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

#[derive(Parser)]
#[command(name = "realm-desktop", about = "Walk the silent realm")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML config file; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the ground textures
    #[arg(long)]
    assets: Option<PathBuf>,
}

fn map_key(code: KeyCode) -> Option<Key> {
    let key = match code {
        KeyCode::KeyA => Key::A,
        KeyCode::KeyB => Key::B,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyF => Key::F,
        KeyCode::KeyG => Key::G,
        KeyCode::KeyH => Key::H,
        KeyCode::KeyI => Key::I,
        KeyCode::KeyJ => Key::J,
        KeyCode::KeyK => Key::K,
        KeyCode::KeyL => Key::L,
        KeyCode::KeyM => Key::M,
        KeyCode::KeyN => Key::N,
        KeyCode::KeyO => Key::O,
        KeyCode::KeyP => Key::P,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyT => Key::T,
        KeyCode::KeyU => Key::U,
        KeyCode::KeyV => Key::V,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyX => Key::X,
        KeyCode::KeyY => Key::Y,
        KeyCode::KeyZ => Key::Z,
        KeyCode::Space => Key::Space,
        KeyCode::ShiftLeft => Key::ShiftLeft,
        KeyCode::ShiftRight => Key::ShiftRight,
        KeyCode::ControlLeft => Key::ControlLeft,
        KeyCode::ControlRight => Key::ControlRight,
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,
        KeyCode::Escape => Key::Escape,
        KeyCode::F1 => Key::F1,
        _ => return None,
    };
    Some(key)
}

/// Everything that exists once the window and GPU are up.
struct Running {
    window: Arc<Window>,
    backend: WgpuBackend,
    game: Game,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct GpuApp {
    config: GameConfig,
    running: Option<Running>,
    startup_error: Option<anyhow::Error>,
    egui_ctx: EguiContext,
    pointer_locked: bool,
    show_hud: bool,
    last_frame: Instant,
    frame_ms: f32,
}

impl GpuApp {
    fn new(config: GameConfig) -> Self {
        Self {
            config,
            running: None,
            startup_error: None,
            egui_ctx: EguiContext::default(),
            pointer_locked: false,
            show_hud: true,
            last_frame: Instant::now(),
            frame_ms: 0.0,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<Running> {
        let window_config = &self.config.window;
        let attrs = Window::default_attributes()
            .with_title(window_config.title.clone())
            .with_inner_size(PhysicalSize::new(window_config.width, window_config.height));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let size = window.inner_size();
        let gpu = pollster::block_on(GpuContext::new(window.clone(), size.width, size.height))?;
        let surface_format = gpu.surface_format();
        let mut backend = WgpuBackend::new(gpu);

        let mut game = Game::start(&mut backend, self.config.clone())?;
        game.driver_mut().push(InputEvent::Resize {
            width: size.width,
            height: size.height,
        });

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(&backend.gpu().device, surface_format, None, 1, false);

        Ok(Running {
            window,
            backend,
            game,
            egui_winit,
            egui_renderer,
        })
    }

    fn lock_pointer(&mut self) {
        let Some(running) = &mut self.running else {
            return;
        };
        let window = &running.window;
        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
        if let Err(e) = grabbed {
            tracing::warn!("pointer lock unavailable: {e}");
            return;
        }
        window.set_cursor_visible(false);
        self.pointer_locked = true;
        running.game.driver_mut().push(InputEvent::PointerLock(true));
        tracing::info!("pointer locked");
    }

    fn unlock_pointer(&mut self) {
        let Some(running) = &mut self.running else {
            return;
        };
        if !self.pointer_locked {
            return;
        }
        if let Err(e) = running.window.set_cursor_grab(CursorGrabMode::None) {
            tracing::debug!("cursor release failed: {e}");
        }
        running.window.set_cursor_visible(true);
        self.pointer_locked = false;
        running.game.driver_mut().push(InputEvent::PointerLock(false));
        tracing::info!("pointer released");
    }

    fn draw_hud(ctx: &EguiContext, running: &Running, frame_ms: f32, pointer_locked: bool) {
        let driver = running.game.driver();
        let summary = FrameInspector::summary(driver.simulation(), driver.orientation());
        let p = summary.position;
        egui::Window::new("Realm")
            .default_pos([10.0, 10.0])
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("Frame: {frame_ms:.1} ms"));
                ui.label(format!("Tick: {}", summary.tick));
                ui.label(format!("Position: ({:.2}, {:.2}, {:.2})", p[0], p[1], p[2]));
                ui.label(format!("Vertical velocity: {:.3}", summary.vertical_velocity));
                ui.label(if summary.on_ground { "Grounded" } else { "Airborne" });
                ui.label(format!(
                    "Yaw: {:.3}  Pitch: {:.3}",
                    summary.yaw, summary.pitch
                ));
                ui.label(format!(
                    "Landings: {}  Jumps: {}",
                    summary.landings, summary.jumps
                ));
                if running.game.textures_pending() {
                    ui.label("Loading textures...");
                }
                ui.separator();
                ui.label(format!("Adapter: {}", running.backend.gpu().adapter_info().name));
                ui.small(if pointer_locked {
                    "Esc: release mouse"
                } else {
                    "Click: capture mouse"
                });
                ui.small("F1: HUD | WASD: Move | Arrows: Turn | Space: Jump | Shift: Sprint");
            });
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        self.frame_ms = (now - self.last_frame).as_secs_f32() * 1000.0;
        self.last_frame = now;

        let Some(running) = &mut self.running else {
            return;
        };
        running.game.update(&mut running.backend);

        let raw_input = running.egui_winit.take_egui_input(&running.window);
        let (show_hud, frame_ms, locked) = (self.show_hud, self.frame_ms, self.pointer_locked);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            if show_hud {
                Self::draw_hud(ctx, running, frame_ms, locked);
            }
        });
        running
            .egui_winit
            .handle_platform_output(&running.window, full_output.platform_output);
        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let (width, height) = running.backend.gpu().size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let camera = running.game.handles().rig.camera;
        let egui_renderer = &mut running.egui_renderer;
        let textures_delta = &full_output.textures_delta;
        running
            .backend
            .draw_frame_with(camera, |device, queue, encoder, view| {
                for (id, image_delta) in &textures_delta.set {
                    egui_renderer.update_texture(device, queue, *id, image_delta);
                }
                egui_renderer.update_buffers(device, queue, encoder, &paint_jobs, &screen_descriptor);
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
                egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
            });
        for id in &full_output.textures_delta.free {
            running.egui_renderer.free_texture(id);
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(running) => self.running = Some(running),
            Err(e) => {
                tracing::error!("startup failed: {e:#}");
                self.startup_error = Some(e);
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
        let Some(running) = &mut self.running else {
            return;
        };
        // While the pointer is captured the HUD gets no input.
        if !self.pointer_locked {
            let response = running.egui_winit.on_window_event(&running.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                running.game.driver_mut().push(InputEvent::Resize {
                    width: new_size.width,
                    height: new_size.height,
                });
            }
            WindowEvent::Focused(false) => {
                running.game.driver_mut().push(InputEvent::FocusLost);
                self.unlock_pointer();
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
                match code {
                    KeyCode::Escape if pressed => self.unlock_pointer(),
                    KeyCode::F1 if pressed && !repeat => self.show_hud = !self.show_hud,
                    _ => {
                        if let Some(key) = map_key(code) {
                            let event = if pressed {
                                InputEvent::KeyDown(key)
                            } else {
                                InputEvent::KeyUp(key)
                            };
                            running.game.driver_mut().push(event);
                        }
                    }
                }
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Pressed,
                ..
            } => {
                if !self.pointer_locked {
                    self.lock_pointer();
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
                if let Some(running) = &self.running {
                    running.window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let (DeviceEvent::MouseMotion { delta }, Some(running)) = (event, &mut self.running) {
            running.game.driver_mut().push(InputEvent::MouseMotion {
                dx: delta.0 as f32,
                dy: delta.1 as f32,
            });
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(running) = &self.running {
            running.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut config = GameConfig::load_or_default(cli.config.as_deref())?;
    if let Some(assets) = cli.assets {
        config.textures.files.root = assets;
    }
    tracing::info!(
        backend = realm_render_wgpu::crate_info(),
        textures = %config.textures.files.root.display(),
        "realm-desktop starting"
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(config);
    event_loop.run_app(&mut app)?;

    match app.startup_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
