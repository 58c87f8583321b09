mod keymap;
mod state;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use egui::Context as EguiContext;
use roomfly_config::AppConfig;
use roomfly_render::{DeviceState, GraphicsContext};
use roomfly_render_wgpu::{GpuDevice, WgpuRenderer};
use state::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{CursorGrabMode, Window, WindowId};

#[derive(Parser)]
#[command(name = "roomfly-desktop", about = "Fly around a room with a bloom post-process")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML config file; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Device-level objects, dropped and rebuilt together on device loss.
struct Gpu {
    surface: wgpu::Surface<'static>,
    gpu: GpuDevice,
    config: wgpu::SurfaceConfiguration,
    egui_renderer: egui_wgpu::Renderer,
    lost: Arc<AtomicBool>,
}

impl Gpu {
    fn new(instance: &wgpu::Instance, window: Arc<Window>, vsync: bool) -> Result<Self> {
        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no suitable GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("roomfly_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let lost = Arc::new(AtomicBool::new(false));
        let flag = lost.clone();
        device.set_device_lost_callback(move |reason, message| {
            tracing::warn!(?reason, %message, "device lost");
            flag.store(true, Ordering::SeqCst);
        });

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
            present_mode: if vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            surface,
            gpu: GpuDevice {
                device,
                queue,
                surface_format,
            },
            config,
            egui_renderer,
            lost,
        })
    }

    fn configure(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.gpu.device, &self.config);
    }
}

struct GpuApp {
    config: AppConfig,
    state: AppState,
    window: Option<Arc<Window>>,
    instance: wgpu::Instance,
    gpu: Option<Gpu>,
    graphics: GraphicsContext<WgpuRenderer>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
}

impl GpuApp {
    fn new(config: AppConfig) -> Result<Self> {
        let state = AppState::new(&config)?;
        let graphics = GraphicsContext::new(config.window.width, config.window.height);
        Ok(Self {
            config,
            state,
            window: None,
            instance: wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            }),
            gpu: None,
            graphics,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
        })
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let gpu = Gpu::new(&self.instance, window.clone(), self.config.window.vsync)?;
        let size = window.inner_size();
        self.state.resize(size.width, size.height);
        self.graphics.resize(&gpu.gpu, size.width, size.height)?;
        self.graphics.create(&gpu.gpu)?;

        self.egui_winit = Some(egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        ));
        self.gpu = Some(gpu);
        self.window = Some(window);
        Ok(())
    }

    /// Drop every device object and build them again on a new device.
    fn recover_device(&mut self) -> Result<()> {
        let Some(window) = self.window.clone() else {
            return Ok(());
        };
        self.graphics.on_device_lost();
        self.gpu = None;

        let gpu = Gpu::new(&self.instance, window, self.config.window.vsync)?;
        self.graphics.on_device_restored(&gpu.gpu)?;
        self.gpu = Some(gpu);
        Ok(())
    }

    /// Hide and hold the cursor while steering.
    fn capture_pointer(&self, captured: bool) {
        let Some(window) = &self.window else {
            return;
        };
        window.set_cursor_visible(!captured);
        let grab = if captured {
            window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
        } else {
            window.set_cursor_grab(CursorGrabMode::None)
        };
        if let Err(e) = grab {
            tracing::debug!("cursor grab unavailable: {e}");
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.state.resize(width, height);
        if width == 0 || height == 0 {
            return;
        }
        if let Some(gpu) = &mut self.gpu {
            gpu.configure(width, height);
            if let Err(e) = self.graphics.resize(&gpu.gpu, width, height) {
                tracing::error!("resize failed: {e}");
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        self.state.frame();
        if self.state.exit_requested() {
            event_loop.exit();
            return Ok(());
        }

        let device_lost = self
            .gpu
            .as_ref()
            .is_some_and(|g| g.lost.load(Ordering::SeqCst));
        if device_lost || self.graphics.state() == DeviceState::Lost {
            self.recover_device()?;
        }

        let Some(gpu) = &mut self.gpu else {
            return Ok(());
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Outdated) => {
                let (w, h) = (gpu.config.width, gpu.config.height);
                gpu.configure(w, h);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Lost) => {
                tracing::warn!("surface lost, recreating device resources");
                self.graphics.on_device_lost();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::debug!("surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(anyhow!("surface error: {e}")),
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let frame = self.state.render_frame();
        self.graphics.resources_mut()?.render(&gpu.gpu, &view, &frame);

        let (Some(window), Some(egui_winit)) = (&self.window, &mut self.egui_winit) else {
            output.present();
            return Ok(());
        };
        let raw_input = egui_winit.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx);
        });
        egui_winit.handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let GpuDevice { device, queue, .. } = &gpu.gpu;
        let egui_renderer = &mut gpu.egui_renderer;
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
            egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }

        output.present();
        Ok(())
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            self.state.resume();
            return;
        }
        if let Err(e) = self.init(event_loop) {
            tracing::error!("startup failed: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let ui_consumed = match (&mut self.egui_winit, &self.window) {
            (Some(egui_winit), Some(window)) => egui_winit.on_window_event(window, &event).consumed,
            _ => false,
        };
        // Key and button releases must reach the app even over the overlay.
        let is_input = matches!(
            event,
            WindowEvent::KeyboardInput { .. } | WindowEvent::MouseInput { .. }
        );
        if ui_consumed && !is_input {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.resize(new_size.width, new_size.height);
            }
            WindowEvent::Focused(focused) => {
                if focused {
                    self.state.resume();
                } else {
                    self.state.input.clear();
                }
                self.capture_pointer(false);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                if let Some(key) = keymap::map_key(code) {
                    let pressed = key_state == ElementState::Pressed;
                    self.state.key(key, pressed, ui_consumed);
                }
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: btn_state,
                ..
            } => {
                let pressed = btn_state == ElementState::Pressed;
                let captured = self.state.pointer_button(pressed, ui_consumed);
                self.capture_pointer(captured);
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw(event_loop) {
                    tracing::error!("frame failed: {e:#}");
                    event_loop.exit();
                    return;
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
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
        if let DeviceEvent::MouseMotion { delta } = event {
            self.state.input.pointer_motion(delta.0 as f32, delta.1 as f32);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("roomfly-desktop starting");

    let config = roomfly_config::load(cli.config.as_deref())?;
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(config)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
