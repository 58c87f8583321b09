use glam::{Mat4, Vec2, Vec3};

/// A screen-space vertex in pixels with RGBA color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReticleVertex {
    pub position: Vec2,
    pub color: [f32; 4],
}

/// Aim reticle: four arrowheads pointing at the screen center, opaque at
/// the tip and fading out at the base.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reticle {
    /// Pixels from the center to each tip.
    pub inner: f32,
    /// Pixels from the center to each base.
    pub outer: f32,
    /// Half the width of each base, in pixels.
    pub half_width: f32,
    pub color: [f32; 4],
}

impl Default for Reticle {
    fn default() -> Self {
        Self {
            inner: 20.0,
            outer: 80.0,
            half_width: 30.0,
            color: [0.0, 0.5, 0.0, 1.0],
        }
    }
}

pub const RETICLE_VERTEX_COUNT: usize = 12;

impl Reticle {
    /// Triangle list (tip, base, base) for the up, right, down and left arms.
    ///
    /// `displacement` pushes every arm outward by that many pixels. Screen
    /// `+Y` points down.
    pub fn triangles(
        &self,
        center: Vec2,
        displacement: f32,
    ) -> [ReticleVertex; RETICLE_VERTEX_COUNT] {
        let tip_color = self.color;
        let base_color = [self.color[0], self.color[1], self.color[2], 0.0];
        let inner = self.inner + displacement;
        let outer = self.outer + displacement;
        let w = self.half_width;

        // Each arm: direction toward its tip's side, and the perpendicular
        // the base spreads along, in winding order.
        let arms = [
            (Vec2::new(0.0, -1.0), Vec2::new(-1.0, 0.0)),
            (Vec2::new(1.0, 0.0), Vec2::new(0.0, -1.0)),
            (Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0)),
            (Vec2::new(-1.0, 0.0), Vec2::new(0.0, 1.0)),
        ];

        let mut out = [ReticleVertex {
            position: Vec2::ZERO,
            color: tip_color,
        }; RETICLE_VERTEX_COUNT];
        for (i, (dir, side)) in arms.iter().enumerate() {
            out[i * 3] = ReticleVertex {
                position: center + *dir * inner,
                color: tip_color,
            };
            out[i * 3 + 1] = ReticleVertex {
                position: center + *dir * outer + *side * w,
                color: base_color,
            };
            out[i * 3 + 2] = ReticleVertex {
                position: center + *dir * outer - *side * w,
                color: base_color,
            };
        }
        out
    }
}

/// Maps pixel coordinates (origin top-left, `+Y` down) to clip space.
pub fn screen_projection(width: f32, height: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(-1.0, 1.0, 0.0))
        * Mat4::from_scale(Vec3::new(2.0 / width.max(1.0), -2.0 / height.max(1.0), 1.0))
}
