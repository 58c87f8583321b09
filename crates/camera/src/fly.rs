use crate::motion::{self, MovementMode};
use crate::orientation::OrientationState;
use glam::Vec3;
use roomfly_common::RoomBounds;
use serde::{Deserialize, Serialize};

/// How far the camera moves per step for a unit intent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum MovementSpeed {
    /// Units per second, scaled by the step's elapsed time.
    PerSecond(f32),
    /// Fixed units per step regardless of elapsed time.
    PerStep(f32),
}

impl MovementSpeed {
    pub fn distance(&self, dt: f32) -> f32 {
        match *self {
            MovementSpeed::PerSecond(speed) => speed * dt,
            MovementSpeed::PerStep(gain) => gain,
        }
    }
}

impl Default for MovementSpeed {
    fn default() -> Self {
        MovementSpeed::PerStep(0.07)
    }
}

/// Tuning for a [`FlyCamera`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub start_position: Vec3,
    /// Radians of rotation per pixel of pointer motion.
    pub rotation_gain: f32,
    pub movement: MovementSpeed,
    pub mode: MovementMode,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            start_position: Vec3::new(0.0, -1.5, 0.0),
            rotation_gain: 0.01,
            movement: MovementSpeed::default(),
            mode: MovementMode::Free,
            fov_degrees: 70.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// Fly camera: orientation, movement limits, and projection parameters.
/// Camera motion lives outside the scene; the renderer only reads it.
#[derive(Debug, Clone)]
pub struct FlyCamera {
    orientation: OrientationState,
    settings: CameraSettings,
    bounds: Option<RoomBounds>,
    aspect: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::new(CameraSettings::default(), Some(RoomBounds::default()))
    }
}

impl FlyCamera {
    pub fn new(settings: CameraSettings, bounds: Option<RoomBounds>) -> Self {
        Self {
            orientation: OrientationState::new(settings.start_position),
            settings,
            bounds,
            aspect: 16.0 / 9.0,
        }
    }

    pub fn orientation(&self) -> &OrientationState {
        &self.orientation
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn position(&self) -> Vec3 {
        self.orientation.position
    }

    pub fn yaw(&self) -> f32 {
        self.orientation.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.orientation.pitch
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Update the aspect ratio from a surface size. Zero sizes are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    /// Apply relative pointer motion. Returns `false` if the sample was dropped.
    pub fn rotate(&mut self, dx: f32, dy: f32) -> bool {
        self.orientation
            .apply_pointer_delta(dx, dy, self.settings.rotation_gain)
    }

    /// Move along a camera-local intent vector for one step of `dt` seconds,
    /// then keep the position inside the room.
    pub fn step(&mut self, intent: Vec3, dt: f32) {
        if !intent.is_finite() || !dt.is_finite() {
            tracing::warn!(?intent, dt, "ignoring non-finite movement");
            return;
        }
        let direction = motion::compute_move_direction(
            intent,
            self.orientation.yaw,
            self.orientation.pitch,
            self.settings.mode,
        );
        let distance = self.settings.movement.distance(dt);
        let mut position = self.orientation.position + direction * distance;
        if let Some(bounds) = &self.bounds {
            position = bounds.clamp(position);
        }
        self.orientation.position = position;
    }

    /// Back to the start position with zero rotation.
    pub fn reset(&mut self) {
        tracing::debug!("camera reset");
        self.orientation = OrientationState::new(self.settings.start_position);
        if let Some(bounds) = &self.bounds {
            self.orientation.position = bounds.clamp(self.orientation.position);
        }
    }

    pub fn look_target(&self) -> Vec3 {
        motion::compute_look_target(
            self.orientation.position,
            self.orientation.yaw,
            self.orientation.pitch,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera() {
        let cam = FlyCamera::default();
        assert_eq!(cam.position(), Vec3::new(0.0, -1.5, 0.0));
        assert_eq!(cam.look_target(), Vec3::new(0.0, -1.5, 1.0));
        assert!((cam.aspect() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn camera_movement() {
        let mut cam = FlyCamera::default();
        let start = cam.position();
        cam.step(Vec3::Z, 1.0 / 60.0);
        assert!((cam.position() - (start + Vec3::Z * 0.07)).length() < 1e-5);
    }

    #[test]
    fn per_second_speed_scales_with_dt() {
        let settings = CameraSettings {
            movement: MovementSpeed::PerSecond(3.0),
            start_position: Vec3::ZERO,
            ..Default::default()
        };
        let mut cam = FlyCamera::new(settings, None);
        cam.step(Vec3::Z, 0.5);
        assert!((cam.position().z - 1.5).abs() < 1e-5);
    }

    #[test]
    fn movement_is_bounded_by_room() {
        let mut cam = FlyCamera::default();
        for _ in 0..10_000 {
            cam.step(Vec3::new(1.0, 1.0, 1.0), 1.0 / 60.0);
        }
        let p = cam.position();
        assert!((p.x - 7.9).abs() < 1e-4);
        assert!((p.y - 5.9).abs() < 1e-4);
        assert!((p.z - 11.9).abs() < 1e-4);
    }

    #[test]
    fn unbounded_camera_keeps_moving() {
        let mut cam = FlyCamera::new(CameraSettings::default(), None);
        for _ in 0..1000 {
            cam.step(Vec3::Z, 1.0 / 60.0);
        }
        assert!(cam.position().z > 50.0);
    }

    #[test]
    fn reset_restores_start() {
        let mut cam = FlyCamera::default();
        cam.rotate(40.0, -25.0);
        cam.step(Vec3::new(1.0, 0.0, 1.0), 0.016);
        cam.reset();
        assert_eq!(cam.position(), Vec3::new(0.0, -1.5, 0.0));
        assert_eq!(cam.yaw(), 0.0);
        assert_eq!(cam.pitch(), 0.0);
    }

    #[test]
    fn non_finite_movement_is_ignored() {
        let mut cam = FlyCamera::default();
        let start = cam.position();
        cam.step(Vec3::new(f32::NAN, 0.0, 0.0), 0.016);
        cam.step(Vec3::Z, f32::INFINITY);
        assert_eq!(cam.position(), start);
    }

    #[test]
    fn pointer_right_turns_right() {
        let mut cam = FlyCamera::default();
        let forward = cam.look_target() - cam.position();
        // Right-handed view with +Y up.
        let right = forward.cross(Vec3::Y);
        assert!(cam.rotate(10.0, 0.0));
        assert!(cam.yaw() < 0.0);
        let turned = cam.look_target() - cam.position();
        assert!(turned.dot(right) > 0.0);
    }

    #[test]
    fn viewport_updates_aspect() {
        let mut cam = FlyCamera::default();
        cam.set_viewport(1600, 900);
        assert!((cam.aspect() - 16.0 / 9.0).abs() < 1e-6);
        cam.set_viewport(800, 0);
        assert!((cam.aspect() - 16.0 / 9.0).abs() < 1e-6);
    }
}
