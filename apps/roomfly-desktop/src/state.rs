use egui::Context as EguiContext;
use roomfly_bloom::{BloomError, BloomPreset, BloomState};
use roomfly_camera::FlyCamera;
use roomfly_config::AppConfig;
use roomfly_input::{Action, InputState, Key, PointerMode};
use roomfly_render::{FrameContext, RenderView};
use roomfly_scene::{Scene, StepTimer};
use std::time::Duration;

/// Everything the frame loop advances, independent of the window and GPU.
pub struct AppState {
    pub camera: FlyCamera,
    pub scene: Scene,
    pub bloom: BloomState,
    pub input: InputState,
    pub timer: StepTimer,
    pub show_overlay: bool,
    exit_requested: bool,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Result<Self, BloomError> {
        let mut camera = FlyCamera::new(config.camera, config.room.camera_bounds());
        camera.set_viewport(config.window.width, config.window.height);
        let bloom = BloomState::new(
            config.bloom,
            config.window.width,
            config.window.height,
        )?;
        Ok(Self {
            camera,
            scene: Scene::new(config.room.bounds()),
            bloom,
            input: InputState::new(),
            timer: StepTimer::new(config.timer),
            show_overlay: true,
            exit_requested: false,
        })
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Key transition from the window. Presses the overlay already used are
    /// dropped; releases always land so no direction stays held.
    pub fn key(&mut self, key: Key, pressed: bool, ui_consumed: bool) {
        if pressed && ui_consumed {
            return;
        }
        self.input.key(key, pressed);
    }

    /// Steering button transition, filtered like [`AppState::key`]. Returns
    /// whether the pointer is now captured for steering.
    pub fn pointer_button(&mut self, pressed: bool, ui_consumed: bool) -> bool {
        if !(pressed && ui_consumed) {
            self.input.pointer_button(pressed);
        }
        self.pointer_captured()
    }

    pub fn pointer_captured(&self) -> bool {
        self.input.pointer_mode() == PointerMode::Relative
    }

    /// New output size. Zero sizes (minimised) leave everything as is.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
        if let Err(e) = self.bloom.resize(width, height) {
            tracing::error!("bloom resize failed: {e}");
        }
    }

    /// Window regained focus: drop held keys and the long gap since the
    /// last frame.
    pub fn resume(&mut self) {
        self.input.clear();
        self.timer.reset_elapsed();
    }

    /// Run one frame using wall-clock time.
    pub fn frame(&mut self) {
        self.begin_frame();
        let Self {
            camera,
            scene,
            input,
            timer,
            ..
        } = self;
        timer.tick(|time| {
            camera.step(input.move_intent().vector(), time.elapsed);
            scene.step(time);
        });
    }

    /// Run one frame with an explicit delta. Returns how many updates ran.
    pub fn frame_with(&mut self, delta: Duration) -> u32 {
        self.begin_frame();
        let Self {
            camera,
            scene,
            input,
            timer,
            ..
        } = self;
        timer.tick_with(delta, |time| {
            camera.step(input.move_intent().vector(), time.elapsed);
            scene.step(time);
        })
    }

    fn begin_frame(&mut self) {
        for action in self.input.drain_actions() {
            self.handle_action(action);
        }
        let delta = self.input.take_pointer_delta();
        if delta != glam::Vec2::ZERO {
            self.camera.rotate(delta.x, delta.y);
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::ResetCamera => {
                self.camera.reset();
                tracing::info!("camera reset");
            }
            Action::Exit => {
                tracing::info!("exit requested");
                self.exit_requested = true;
            }
            Action::CycleBloomPreset => match self.bloom.cycle_preset() {
                Ok(preset) => tracing::info!(%preset, "bloom preset"),
                Err(e) => tracing::error!("bloom preset change failed: {e}"),
            },
            Action::ToggleOverlay => self.show_overlay = !self.show_overlay,
            Action::Move(_) => {}
        }
    }

    pub fn render_frame(&self) -> FrameContext<'_> {
        FrameContext {
            scene: &self.scene,
            view: RenderView::from_camera(&self.camera),
            bloom: &self.bloom,
            frame: self.timer.frame_count(),
        }
    }

    pub fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_overlay {
            return;
        }

        let mut selected = self.bloom.settings().preset;
        let mut enabled = self.bloom.settings().enabled;

        egui::Window::new("roomfly")
            .default_width(240.0)
            .resizable(false)
            .show(ctx, |ui| {
                let p = self.camera.position();
                ui.label(format!("FPS: {}", self.timer.frames_per_second()));
                ui.label(format!("Position: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));
                ui.label(format!(
                    "Yaw: {:.1}°  Pitch: {:.1}°",
                    self.camera.yaw().to_degrees(),
                    self.camera.pitch().to_degrees()
                ));
                ui.separator();

                ui.heading("Bloom");
                ui.checkbox(&mut enabled, "Enabled");
                egui::ComboBox::from_label("Preset")
                    .selected_text(selected.name())
                    .show_ui(ui, |ui| {
                        for preset in BloomPreset::ALL {
                            ui.selectable_value(&mut selected, preset, preset.name());
                        }
                    });
                if let Some(kernels) = self.bloom.kernels() {
                    ui.label(format!(
                        "{} taps, center weight {:.4}",
                        kernels.horizontal.len(),
                        kernels.horizontal.weights()[0]
                    ));
                }
                let (w, h) = self.bloom.target_size();
                ui.label(format!("Blur target: {w}x{h}"));

                ui.separator();
                ui.small("LMB: look | WASD/arrows: move | Home: reset | B: preset | F1: panel");
            });

        if selected != self.bloom.settings().preset {
            if let Err(e) = self.bloom.set_preset(selected) {
                tracing::error!("bloom preset change failed: {e}");
            }
        }
        if enabled != self.bloom.settings().enabled {
            if let Err(e) = self.bloom.set_enabled(enabled) {
                tracing::error!("bloom toggle failed: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn state() -> AppState {
        AppState::new(&AppConfig::default()).unwrap()
    }

    #[test]
    fn starts_at_configured_position() {
        let s = state();
        assert_eq!(s.camera.position(), Vec3::new(0.0, -1.5, 0.0));
        assert_eq!(s.bloom.settings().preset, BloomPreset::Default);
        assert!(!s.exit_requested());
    }

    #[test]
    fn held_key_moves_every_update() {
        let mut s = state();
        s.key(Key::W, true, false);
        let ran = s.frame_with(Duration::from_millis(16));
        assert_eq!(ran, 1);
        let z = s.camera.position().z;
        assert!((z - 0.07).abs() < 1e-5, "z = {z}");

        s.key(Key::W, false, false);
        s.frame_with(Duration::from_millis(16));
        assert_eq!(s.camera.position().z, z);
    }

    #[test]
    fn reset_and_exit_actions() {
        let mut s = state();
        s.key(Key::D, true, false);
        s.frame_with(Duration::from_millis(16));
        assert_ne!(s.camera.position(), Vec3::new(0.0, -1.5, 0.0));
        s.key(Key::D, false, false);

        s.key(Key::Home, true, false);
        s.frame_with(Duration::from_millis(16));
        assert_eq!(s.camera.position(), Vec3::new(0.0, -1.5, 0.0));
        assert_eq!(s.camera.yaw(), 0.0);

        s.key(Key::Escape, true, false);
        s.frame_with(Duration::from_millis(16));
        assert!(s.exit_requested());
    }

    #[test]
    fn preset_cycles_on_b() {
        let mut s = state();
        let before = s.bloom.generation();
        s.key(Key::B, true, false);
        s.frame_with(Duration::from_millis(16));
        assert_eq!(s.bloom.settings().preset, BloomPreset::Soft);
        assert!(s.bloom.generation() > before);
    }

    #[test]
    fn pointer_only_steers_while_held() {
        let mut s = state();
        s.input.pointer_motion(100.0, 0.0);
        s.frame_with(Duration::from_millis(16));
        assert_eq!(s.camera.yaw(), 0.0);

        assert!(s.pointer_button(true, false));
        s.input.pointer_motion(100.0, 0.0);
        s.frame_with(Duration::from_millis(16));
        assert!(s.camera.yaw() != 0.0);
    }

    #[test]
    fn overlay_cannot_swallow_releases() {
        let mut s = state();
        assert!(s.pointer_button(true, false));
        s.key(Key::W, true, false);

        // The cursor drifted over the overlay before the release.
        assert!(!s.pointer_button(false, true));
        s.key(Key::W, false, true);
        assert!(s.input.move_intent().is_idle());

        s.input.pointer_motion(50.0, 0.0);
        s.frame_with(Duration::from_millis(16));
        assert_eq!(s.camera.yaw(), 0.0);
    }

    #[test]
    fn overlay_presses_are_ignored() {
        let mut s = state();
        assert!(!s.pointer_button(true, true));
        s.key(Key::W, true, true);
        assert!(s.input.move_intent().is_idle());
    }

    #[test]
    fn resize_updates_aspect_and_bloom() {
        let mut s = state();
        s.resize(800, 800);
        assert_eq!(s.camera.aspect(), 1.0);
        assert_eq!(s.bloom.frame_size(), (800, 800));

        s.resize(0, 0);
        assert_eq!(s.bloom.frame_size(), (800, 800));
    }
}
