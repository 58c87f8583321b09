use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// World matrix (scale, then rotate, then translate).
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// Axis-aligned room volume centred on the origin.
///
/// Positions are kept `margin` units inside each wall. This is a box
/// constraint, not collision detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomBounds {
    /// Full extents of the room along each axis.
    pub extents: Vec3,
    /// Distance kept from each wall.
    pub margin: f32,
}

impl Default for RoomBounds {
    fn default() -> Self {
        Self {
            extents: Vec3::new(16.0, 12.0, 24.0),
            margin: 0.1,
        }
    }
}

impl RoomBounds {
    pub fn new(extents: Vec3, margin: f32) -> Self {
        Self { extents, margin }
    }

    /// Largest absolute coordinate allowed on each axis.
    pub fn inner_half_extents(&self) -> Vec3 {
        (self.extents * 0.5 - Vec3::splat(self.margin)).max(Vec3::ZERO)
    }

    /// Clamp every axis of `position` into the inner box.
    pub fn clamp(&self, position: Vec3) -> Vec3 {
        let half = self.inner_half_extents();
        position.clamp(-half, half)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn transform_matrix_translates() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let p = t.matrix().transform_point3(Vec3::ZERO);
        assert_eq!(p, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn room_inner_half_extents() {
        let room = RoomBounds::default();
        let half = room.inner_half_extents();
        assert!((half.x - 7.9).abs() < 1e-5);
        assert!((half.y - 5.9).abs() < 1e-5);
        assert!((half.z - 11.9).abs() < 1e-5);
    }

    #[test]
    fn room_clamps_outside_points() {
        let room = RoomBounds::default();
        let p = room.clamp(Vec3::new(100.0, -100.0, 3.0));
        assert!((p.x - 7.9).abs() < 1e-5);
        assert!((p.y + 5.9).abs() < 1e-5);
        assert_eq!(p.z, 3.0);
        assert_eq!(room.clamp(p), p);
    }

    #[test]
    fn room_leaves_inside_points_alone() {
        let room = RoomBounds::default();
        let p = Vec3::new(1.0, -1.5, 2.0);
        assert_eq!(room.clamp(p), p);
    }

    #[test]
    fn degenerate_room_collapses_to_origin() {
        let room = RoomBounds::new(Vec3::splat(0.1), 0.1);
        assert_eq!(room.clamp(Vec3::new(5.0, 5.0, 5.0)), Vec3::ZERO);
    }
}
