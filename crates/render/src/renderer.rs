use glam::{Mat4, Vec3};
use roomfly_bloom::BloomState;
use roomfly_camera::FlyCamera;
use roomfly_scene::{Motion, Scene};

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    pub up: Vec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self::from_camera(&FlyCamera::default())
    }
}

impl RenderView {
    pub fn from_camera(camera: &FlyCamera) -> Self {
        let s = camera.settings();
        Self {
            eye: camera.position(),
            target: camera.look_target(),
            up: Vec3::Y,
            fov_degrees: s.fov_degrees,
            aspect: camera.aspect(),
            near: s.near,
            far: s.far,
        }
    }

    /// Right-handed look-at view.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Everything a renderer reads for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    pub scene: &'a Scene,
    pub view: RenderView,
    pub bloom: &'a BloomState,
    pub frame: u64,
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer reads the scene, view and bloom state, then produces output.
/// It never mutates them.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&self, frame: &FrameContext<'_>) -> Self::Output;
}

/// Text renderer for headless runs.
///
/// Produces a human-readable description of what a frame would draw.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, frame: &FrameContext<'_>) -> String {
        let mut out = String::new();
        let view = &frame.view;
        out.push_str(&format!("=== Frame {} ===\n", frame.frame));
        out.push_str(&format!(
            "Camera: eye=({:.2}, {:.2}, {:.2}) target=({:.2}, {:.2}, {:.2}) fov={:.0}\n",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        ));

        for (i, (object, world)) in frame.scene.instances().enumerate() {
            let p = world.w_axis;
            out.push_str(&format!(
                "  {:<9} {:?} pos=({:.2}, {:.2}, {:.2})",
                object.name, object.shape, p.x, p.y, p.z
            ));
            if let (Motion::SpinY { .. }, Some(spin)) = (object.motion, frame.scene.spin(i)) {
                out.push_str(&format!(" spin={spin:.3}"));
            }
            out.push('\n');
        }

        let anim = frame.scene.animation();
        out.push_str(&format!(
            "Animation: swing={:.3} reticle={:.2}px\n",
            anim.swing_angle, anim.reticle_displacement
        ));

        let bloom = frame.bloom;
        match bloom.kernels() {
            Some(k) => out.push_str(&format!(
                "Bloom: preset={} taps={} center={:.4}\n",
                bloom.settings().preset,
                k.horizontal.len(),
                k.horizontal.weights()[0]
            )),
            None => out.push_str("Bloom: bypass\n"),
        }

        out
    }
}
