//! Configuration validation.
//!
//! Collects every problem so one load reports all of them.

use crate::schema::AppConfig;
use roomfly_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    // Window
    if config.window.width == 0 || config.window.height == 0 {
        errors.push(format!(
            "window size must be non-zero, got {}x{}",
            config.window.width, config.window.height
        ));
    }

    // Camera
    let cam = &config.camera;
    if !cam.start_position.is_finite() {
        errors.push("camera.start_position must be finite".into());
    }
    validate_positive(&mut errors, "camera.rotation_gain", cam.rotation_gain);
    validate_positive(&mut errors, "camera.movement", cam.movement.distance(1.0));
    validate_range(&mut errors, "camera.fov_degrees", cam.fov_degrees, 1.0, 179.0);
    validate_positive(&mut errors, "camera.near", cam.near);
    if !(cam.far.is_finite() && cam.far > cam.near) {
        errors.push(format!(
            "camera.far must be greater than camera.near ({}), got {}",
            cam.near, cam.far
        ));
    }

    // Room
    let room = &config.room;
    if !room.extents.is_finite() || room.extents.min_element() <= 0.0 {
        errors.push(format!("room.extents must be positive, got {:?}", room.extents));
    }
    if !(room.margin.is_finite() && room.margin >= 0.0) {
        errors.push(format!("room.margin must be non-negative, got {}", room.margin));
    } else if room.extents.min_element() <= room.margin * 2.0 {
        errors.push(format!(
            "room.margin ({}) leaves no space inside {:?}",
            room.margin, room.extents
        ));
    }

    // Bloom
    if let Err(e) = config.bloom.validate() {
        errors.push(format!("bloom: {e}"));
    }

    // Timer
    if config.timer.fixed_step {
        validate_range_f64(&mut errors, "timer.target_rate", config.timer.target_rate, 1.0, 1000.0);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(errors.join("; ")))
    }
}

fn validate_positive(errors: &mut Vec<String>, name: &str, value: f32) {
    if !(value.is_finite() && value > 0.0) {
        errors.push(format!("{name} must be positive, got {value}"));
    }
}

fn validate_range(errors: &mut Vec<String>, name: &str, value: f32, min: f32, max: f32) {
    if !(min..=max).contains(&value) {
        errors.push(format!("{name} must be within {min}..={max}, got {value}"));
    }
}

fn validate_range_f64(errors: &mut Vec<String>, name: &str, value: f64, min: f64, max: f64) {
    if !(min..=max).contains(&value) {
        errors.push(format!("{name} must be within {min}..={max}, got {value}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use roomfly_bloom::BloomParameters;

    #[test]
    fn default_config_is_valid() {
        validate(&AppConfig::default()).unwrap();
    }

    #[test]
    fn collects_every_error() {
        let mut config = AppConfig::default();
        config.window.width = 0;
        config.camera.rotation_gain = -1.0;
        config.bloom.taps = 8;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("window size"));
        assert!(err.contains("camera.rotation_gain"));
        assert!(err.contains("bloom"));
    }

    #[test]
    fn rejects_zero_blur_amount() {
        let mut config = AppConfig::default();
        config.bloom.custom = Some(BloomParameters::new(0.25, 0.0, 1.0, 1.0, 1.0, 1.0));
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("blur amount"));
    }

    #[test]
    fn rejects_far_before_near() {
        let mut config = AppConfig::default();
        config.camera.far = 0.05;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_margin_larger_than_room() {
        let mut config = AppConfig::default();
        config.room.extents = Vec3::new(1.0, 1.0, 1.0);
        config.room.margin = 0.6;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("room.margin"));
    }

    #[test]
    fn timer_rate_only_checked_in_fixed_mode() {
        let mut config = AppConfig::default();
        config.timer.target_rate = 0.0;
        validate(&config).unwrap();
        config.timer.fixed_step = true;
        assert!(validate(&config).is_err());
    }
}
