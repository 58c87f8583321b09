use crate::BloomError;
use crate::kernel::BlurKernels;
use crate::preset::{BloomParameters, BloomPreset, BloomSettings};
use std::sync::Arc;

/// Current bloom configuration plus the kernels derived from it.
///
/// Kernels are rebuilt on resize or settings change and published as a new
/// `Arc`; a published kernel set is never mutated. While bloom is bypassed no
/// kernels exist.
#[derive(Debug, Clone)]
pub struct BloomState {
    settings: BloomSettings,
    width: u32,
    height: u32,
    kernels: Option<Arc<BlurKernels>>,
    generation: u64,
}

impl BloomState {
    /// Validate `settings` and build kernels for a `width` x `height` frame.
    pub fn new(settings: BloomSettings, width: u32, height: u32) -> Result<Self, BloomError> {
        settings.validate()?;
        let mut state = Self {
            settings,
            width,
            height,
            kernels: None,
            generation: 0,
        };
        state.rebuild()?;
        Ok(state)
    }

    pub fn settings(&self) -> &BloomSettings {
        &self.settings
    }

    pub fn parameters(&self) -> BloomParameters {
        self.settings.parameters()
    }

    pub fn is_bypass(&self) -> bool {
        self.settings.is_bypass()
    }

    /// Shared handle to the current kernels, `None` while bypassed.
    pub fn kernels(&self) -> Option<Arc<BlurKernels>> {
        self.kernels.clone()
    }

    /// Bumped every time a new kernel set is published.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn frame_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Bloom targets are half the frame resolution.
    pub fn target_size(&self) -> (u32, u32) {
        half_resolution(self.width, self.height)
    }

    /// New frame size. Zero-sized frames (minimised windows) keep the old
    /// kernels.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), BloomError> {
        if width == 0 || height == 0 {
            tracing::debug!(width, height, "ignoring empty bloom resize");
            return Ok(());
        }
        if (width, height) == (self.width, self.height) {
            return Ok(());
        }
        self.width = width;
        self.height = height;
        self.rebuild()
    }

    /// Replace the settings. Invalid settings are rejected and the previous
    /// configuration stays in effect.
    pub fn set_settings(&mut self, settings: BloomSettings) -> Result<(), BloomError> {
        settings.validate()?;
        let previous = std::mem::replace(&mut self.settings, settings);
        if let Err(e) = self.rebuild() {
            self.settings = previous;
            return Err(e);
        }
        Ok(())
    }

    pub fn set_preset(&mut self, preset: BloomPreset) -> Result<(), BloomError> {
        self.set_settings(BloomSettings {
            preset,
            custom: None,
            ..self.settings
        })
    }

    pub fn set_enabled(&mut self, enabled: bool) -> Result<(), BloomError> {
        self.set_settings(BloomSettings {
            enabled,
            ..self.settings
        })
    }

    /// Advance to the next preset in the table.
    pub fn cycle_preset(&mut self) -> Result<BloomPreset, BloomError> {
        let next = self.settings.preset.next();
        self.set_preset(next)?;
        Ok(next)
    }

    fn rebuild(&mut self) -> Result<(), BloomError> {
        let _span = tracing::info_span!("bloom_rebuild").entered();

        if self.settings.is_bypass() {
            self.kernels = None;
            self.generation += 1;
            tracing::debug!(preset = %self.settings.preset, "bloom bypassed");
            return Ok(());
        }

        let (tw, th) = self.target_size();
        let theta = self.settings.parameters().blur_amount;
        let kernels = BlurKernels::for_target(theta, self.settings.taps, tw, th)?;
        self.kernels = Some(Arc::new(kernels));
        self.generation += 1;

        tracing::debug!(
            preset = %self.settings.preset,
            theta,
            taps = self.settings.taps,
            target_width = tw,
            target_height = th,
            generation = self.generation,
            "bloom kernels rebuilt"
        );
        Ok(())
    }
}

/// Half of each dimension, never below one texel.
pub fn half_resolution(width: u32, height: u32) -> (u32, u32) {
    ((width / 2).max(1), (height / 2).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_kernels_for_half_resolution() {
        let state = BloomState::new(BloomSettings::default(), 1600, 900).unwrap();
        assert_eq!(state.target_size(), (800, 450));
        let k = state.kernels().unwrap();
        assert!((k.horizontal.offsets()[1][0] - 1.5 / 800.0).abs() < 1e-7);
        assert!((k.vertical.offsets()[1][1] - 1.5 / 450.0).abs() < 1e-7);
    }

    #[test]
    fn resize_publishes_new_kernels() {
        let mut state = BloomState::new(BloomSettings::default(), 1600, 900).unwrap();
        let before = state.kernels().unwrap();
        let generation = state.generation();

        state.resize(800, 600).unwrap();
        let after = state.kernels().unwrap();

        assert!(state.generation() > generation);
        assert!(!Arc::ptr_eq(&before, &after));
        // The old handle is untouched.
        assert!((before.horizontal.offsets()[1][0] - 1.5 / 800.0).abs() < 1e-7);
        assert!((after.horizontal.offsets()[1][0] - 1.5 / 400.0).abs() < 1e-7);
    }

    #[test]
    fn same_size_resize_keeps_kernels() {
        let mut state = BloomState::new(BloomSettings::default(), 1600, 900).unwrap();
        let generation = state.generation();
        state.resize(1600, 900).unwrap();
        assert_eq!(state.generation(), generation);
    }

    #[test]
    fn empty_resize_is_ignored() {
        let mut state = BloomState::new(BloomSettings::default(), 1600, 900).unwrap();
        state.resize(0, 0).unwrap();
        assert_eq!(state.frame_size(), (1600, 900));
        assert!(state.kernels().is_some());
    }

    #[test]
    fn none_preset_drops_kernels() {
        let mut state = BloomState::new(BloomSettings::default(), 1280, 720).unwrap();
        state.set_preset(BloomPreset::None).unwrap();
        assert!(state.is_bypass());
        assert!(state.kernels().is_none());

        state.set_preset(BloomPreset::Blurry).unwrap();
        let k = state.kernels().unwrap();
        assert_eq!(k.horizontal.len(), 15);
    }

    #[test]
    fn invalid_settings_leave_state_unchanged() {
        let mut state = BloomState::new(BloomSettings::default(), 1280, 720).unwrap();
        let generation = state.generation();
        let bad = BloomSettings {
            taps: 4,
            ..BloomSettings::default()
        };
        assert!(state.set_settings(bad).is_err());
        assert_eq!(state.settings().taps, 15);
        assert_eq!(state.generation(), generation);
    }

    #[test]
    fn new_rejects_invalid_settings() {
        let bad = BloomSettings {
            taps: 1,
            ..BloomSettings::default()
        };
        assert!(BloomState::new(bad, 1280, 720).is_err());
    }

    #[test]
    fn cycle_walks_the_table() {
        let mut state = BloomState::new(BloomSettings::default(), 1280, 720).unwrap();
        assert_eq!(state.cycle_preset().unwrap(), BloomPreset::Soft);
        assert_eq!(state.settings().preset, BloomPreset::Soft);
    }

    #[test]
    fn disable_and_enable() {
        let mut state = BloomState::new(BloomSettings::default(), 1280, 720).unwrap();
        state.set_enabled(false).unwrap();
        assert!(state.kernels().is_none());
        state.set_enabled(true).unwrap();
        assert!(state.kernels().is_some());
    }

    #[test]
    fn tiny_frames_get_one_texel_targets() {
        assert_eq!(half_resolution(1, 1), (1, 1));
        assert_eq!(half_resolution(3, 5), (1, 2));
    }
}
