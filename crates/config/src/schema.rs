use glam::Vec3;
use roomfly_bloom::BloomSettings;
use roomfly_camera::CameraSettings;
use roomfly_common::RoomBounds;
use roomfly_scene::TimerSettings;
use serde::{Deserialize, Serialize};

/// Top-level configuration. Every section falls back to defaults when
/// missing from the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub camera: CameraSettings,
    pub room: RoomConfig,
    pub bloom: BloomSettings,
    pub timer: TimerSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "roomfly".into(),
            width: 1600,
            height: 900,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    pub extents: Vec3,
    /// Distance the camera keeps from each wall.
    pub margin: f32,
    /// Keep the camera inside the room.
    pub confine_camera: bool,
}

impl Default for RoomConfig {
    fn default() -> Self {
        let room = RoomBounds::default();
        Self {
            extents: room.extents,
            margin: room.margin,
            confine_camera: true,
        }
    }
}

impl RoomConfig {
    pub fn bounds(&self) -> RoomBounds {
        RoomBounds::new(self.extents, self.margin)
    }

    /// Bounds applied to the camera, if confinement is on.
    pub fn camera_bounds(&self) -> Option<RoomBounds> {
        self.confine_camera.then(|| self.bounds())
    }
}
