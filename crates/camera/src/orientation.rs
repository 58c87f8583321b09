use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// Pitch stops this far short of straight up/down to avoid gimbal lock.
pub const PITCH_EPSILON: f32 = 0.01;

/// Largest absolute pitch the controller will reach.
pub const PITCH_LIMIT: f32 = FRAC_PI_2 - PITCH_EPSILON;

/// Yaw/pitch orientation plus world position of the viewer.
///
/// `pitch` is always within `[-PITCH_LIMIT, PITCH_LIMIT]` and `yaw` within
/// `(-π, π]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationState {
    pub yaw: f32,
    pub pitch: f32,
    pub position: Vec3,
}

impl Default for OrientationState {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl OrientationState {
    /// Zero rotation at `position`.
    pub fn new(position: Vec3) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            position,
        }
    }

    /// Apply relative pointer motion scaled by `gain`.
    ///
    /// Moving the pointer right turns right (yaw decreases) and moving it down
    /// looks down. Pitch saturates at the limit; yaw always lands in `(-π, π]`.
    ///
    /// Returns `false` and leaves the state untouched when the sample is not
    /// finite.
    pub fn apply_pointer_delta(&mut self, dx: f32, dy: f32, gain: f32) -> bool {
        if !(dx.is_finite() && dy.is_finite() && gain.is_finite()) {
            tracing::warn!(dx, dy, gain, "dropping non-finite pointer sample");
            return false;
        }

        let pitch = clamp_pitch(self.pitch - dy * gain);
        let yaw = wrap_yaw(self.yaw - dx * gain);
        if !(pitch.is_finite() && yaw.is_finite()) {
            tracing::warn!(dx, dy, gain, "pointer sample overflowed orientation");
            return false;
        }

        self.pitch = pitch;
        self.yaw = yaw;
        true
    }
}

/// Saturate pitch at `±PITCH_LIMIT`.
pub fn clamp_pitch(pitch: f32) -> f32 {
    pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT)
}

/// Wrap yaw into `(-π, π]` with a single correction.
///
/// A single step is enough for any per-sample change under a full turn. Larger
/// jumps fall back to a euclidean remainder.
pub fn wrap_yaw(yaw: f32) -> f32 {
    let mut wrapped = if yaw > PI {
        yaw - TAU
    } else if yaw <= -PI {
        yaw + TAU
    } else {
        yaw
    };

    if wrapped > PI || wrapped <= -PI {
        wrapped = (wrapped + PI).rem_euclid(TAU) - PI;
    }

    // Rounding can land one ulp outside the half-open interval.
    if wrapped <= -PI || wrapped > PI { PI } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAIN: f32 = 0.01;

    #[test]
    fn new_state_has_zero_rotation() {
        let s = OrientationState::new(Vec3::new(0.0, -1.5, 0.0));
        assert_eq!(s.yaw, 0.0);
        assert_eq!(s.pitch, 0.0);
        assert_eq!(s.position.y, -1.5);
    }

    #[test]
    fn pointer_delta_signs() {
        let mut s = OrientationState::default();
        s.apply_pointer_delta(10.0, 20.0, GAIN);
        assert!((s.yaw + 0.1).abs() < 1e-6);
        assert!((s.pitch + 0.2).abs() < 1e-6);
    }

    #[test]
    fn zero_motion_is_noop() {
        let mut s = OrientationState {
            yaw: 1.25,
            pitch: -0.4,
            position: Vec3::new(1.0, 2.0, 3.0),
        };
        let before = s;
        for _ in 0..100 {
            assert!(s.apply_pointer_delta(0.0, 0.0, GAIN));
        }
        assert_eq!(s, before);
    }

    #[test]
    fn pitch_saturates_at_limit() {
        let mut s = OrientationState::default();
        for _ in 0..50 {
            s.apply_pointer_delta(0.0, -500.0, GAIN);
        }
        assert_eq!(s.pitch, PITCH_LIMIT);

        // Further upward motion does nothing, downward motion moves away.
        s.apply_pointer_delta(0.0, -1.0, GAIN);
        assert_eq!(s.pitch, PITCH_LIMIT);
        s.apply_pointer_delta(0.0, 1.0, GAIN);
        assert!(s.pitch < PITCH_LIMIT);
    }

    #[test]
    fn pitch_stays_bounded_for_any_sequence() {
        let mut s = OrientationState::default();
        // Deterministic pseudo-random walk within ±500 px.
        let mut x: u32 = 0x1234_5678;
        for _ in 0..10_000 {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            let dx = (x % 1001) as f32 - 500.0;
            let dy = ((x >> 10) % 1001) as f32 - 500.0;
            s.apply_pointer_delta(dx, dy, GAIN);
            assert!(s.pitch >= -PITCH_LIMIT && s.pitch <= PITCH_LIMIT);
            assert!(s.yaw > -PI && s.yaw <= PI, "yaw {} out of range", s.yaw);
        }
    }

    #[test]
    fn yaw_wraps_past_pi() {
        let mut s = OrientationState {
            yaw: 3.0,
            ..Default::default()
        };
        // yaw -= dx * gain, so a negative dx pushes yaw up to 3.3.
        s.apply_pointer_delta(-30.0, 0.0, GAIN);
        let expected = 3.3 - TAU;
        assert!((s.yaw - expected).abs() < 1e-5, "yaw = {}", s.yaw);
        assert!((s.yaw + 2.983).abs() < 1e-3);
    }

    #[test]
    fn yaw_wraps_past_negative_pi() {
        let mut s = OrientationState {
            yaw: -3.0,
            ..Default::default()
        };
        s.apply_pointer_delta(30.0, 0.0, GAIN);
        assert!((s.yaw - (-3.3 + TAU)).abs() < 1e-5);
    }

    #[test]
    fn non_finite_samples_are_dropped() {
        let mut s = OrientationState {
            yaw: 0.5,
            pitch: 0.25,
            position: Vec3::ZERO,
        };
        let before = s;
        assert!(!s.apply_pointer_delta(f32::NAN, 0.0, GAIN));
        assert!(!s.apply_pointer_delta(0.0, f32::INFINITY, GAIN));
        assert!(!s.apply_pointer_delta(1.0, 1.0, f32::NAN));
        assert_eq!(s, before);

        // A good sample afterwards still applies.
        assert!(s.apply_pointer_delta(1.0, 0.0, GAIN));
        assert!((s.yaw - 0.49).abs() < 1e-6);
    }

    #[test]
    fn overflowing_samples_are_dropped() {
        let mut s = OrientationState::default();
        assert!(!s.apply_pointer_delta(f32::MAX, 0.0, f32::MAX));
        assert_eq!(s, OrientationState::default());
    }

    #[test]
    fn wrap_handles_exact_bounds() {
        assert_eq!(wrap_yaw(PI), PI);
        assert!((wrap_yaw(-PI) - PI).abs() < 1e-6);
        assert_eq!(wrap_yaw(0.0), 0.0);
    }

    #[test]
    fn wrap_falls_back_for_large_jumps() {
        let y = wrap_yaw(20.0);
        assert!(y > -PI && y <= PI);
        assert!((y - (20.0 - 3.0 * TAU)).abs() < 1e-4);
    }
}
