use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// How movement intent is rotated into world space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementMode {
    /// Forward follows the full look direction, including pitch.
    #[default]
    Free,
    /// Forward stays level with the floor; only yaw is applied.
    Level,
}

/// Rotation applied to local movement intent: yaw about Y, then `-pitch`
/// about X, zero roll.
///
/// Negating pitch makes the rotated `+Z` axis equal to the look direction
/// returned by [`look_direction`], so walking forward moves toward the look
/// target.
pub fn move_rotation(yaw: f32, pitch: f32) -> Quat {
    Quat::from_rotation_y(yaw) * Quat::from_rotation_x(-pitch)
}

/// Rotate a camera-local intent vector into a world-space movement delta.
///
/// `intent` is not normalised: two held directions move faster than one.
pub fn compute_move_direction(intent: Vec3, yaw: f32, pitch: f32, mode: MovementMode) -> Vec3 {
    let pitch = match mode {
        MovementMode::Free => pitch,
        MovementMode::Level => 0.0,
    };
    move_rotation(yaw, pitch) * intent
}

/// Unit look direction for the given yaw/pitch.
pub fn look_direction(yaw: f32, pitch: f32) -> Vec3 {
    let y = pitch.sin();
    let r = pitch.cos();
    Vec3::new(r * yaw.sin(), y, r * yaw.cos())
}

/// Point one unit ahead of `position` along the look direction.
pub fn compute_look_target(position: Vec3, yaw: f32, pitch: f32) -> Vec3 {
    position + look_direction(yaw, pitch)
}
