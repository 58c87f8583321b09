use crate::BloomError;
use crate::kernel::{DEFAULT_TAPS, validate_taps};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tunable values for the extract, blur and combine stages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BloomParameters {
    /// Luminance below which pixels do not bloom (0..1).
    pub threshold: f32,
    /// Gaussian spread of the blur, in texels.
    pub blur_amount: f32,
    pub bloom_intensity: f32,
    pub base_intensity: f32,
    pub bloom_saturation: f32,
    pub base_saturation: f32,
}

impl BloomParameters {
    pub const fn new(
        threshold: f32,
        blur_amount: f32,
        bloom_intensity: f32,
        base_intensity: f32,
        bloom_saturation: f32,
        base_saturation: f32,
    ) -> Self {
        Self {
            threshold,
            blur_amount,
            bloom_intensity,
            base_intensity,
            bloom_saturation,
            base_saturation,
        }
    }

    /// Reject values the shaders cannot use.
    pub fn validate(&self) -> Result<(), BloomError> {
        let checks = [
            ("threshold", self.threshold, 0.0..=1.0),
            ("bloom_intensity", self.bloom_intensity, 0.0..=f32::MAX),
            ("base_intensity", self.base_intensity, 0.0..=f32::MAX),
            ("bloom_saturation", self.bloom_saturation, 0.0..=f32::MAX),
            ("base_saturation", self.base_saturation, 0.0..=f32::MAX),
        ];
        for (name, value, range) in checks {
            if !range.contains(&value) {
                return Err(BloomError::InvalidParameter { name, value });
            }
        }
        if !(self.blur_amount.is_finite() && self.blur_amount > 0.0) {
            return Err(BloomError::InvalidTheta(self.blur_amount));
        }
        Ok(())
    }
}

/// Named rows of the bloom preset table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BloomPreset {
    #[default]
    Default,
    Soft,
    Desaturated,
    Saturated,
    Blurry,
    Subtle,
    /// Bloom disabled; the frame is copied through unchanged.
    None,
}

impl BloomPreset {
    pub const ALL: [BloomPreset; 7] = [
        BloomPreset::Default,
        BloomPreset::Soft,
        BloomPreset::Desaturated,
        BloomPreset::Saturated,
        BloomPreset::Blurry,
        BloomPreset::Subtle,
        BloomPreset::None,
    ];

    #[rustfmt::skip]
    pub fn parameters(self) -> BloomParameters {
        //                                        thresh blur  bloom base  bloomSat baseSat
        match self {
            BloomPreset::Default     => BloomParameters::new(0.25, 4.0, 1.25, 1.0, 1.0, 1.0),
            BloomPreset::Soft        => BloomParameters::new(0.0,  3.0, 1.0,  1.0, 1.0, 1.0),
            BloomPreset::Desaturated => BloomParameters::new(0.5,  8.0, 2.0,  1.0, 0.0, 1.0),
            BloomPreset::Saturated   => BloomParameters::new(0.25, 4.0, 2.0,  1.0, 2.0, 0.0),
            BloomPreset::Blurry      => BloomParameters::new(0.0,  2.0, 1.0,  0.1, 1.0, 1.0),
            BloomPreset::Subtle      => BloomParameters::new(0.5,  2.0, 1.0,  1.0, 1.0, 1.0),
            BloomPreset::None        => BloomParameters::new(0.25, 4.0, 1.25, 1.0, 1.0, 1.0),
        }
    }

    pub fn is_bypass(self) -> bool {
        self == BloomPreset::None
    }

    pub fn name(self) -> &'static str {
        match self {
            BloomPreset::Default => "default",
            BloomPreset::Soft => "soft",
            BloomPreset::Desaturated => "desaturated",
            BloomPreset::Saturated => "saturated",
            BloomPreset::Blurry => "blurry",
            BloomPreset::Subtle => "subtle",
            BloomPreset::None => "none",
        }
    }

    /// Next row of the table, wrapping after the last.
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for BloomPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BloomPreset {
    type Err = BloomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| BloomError::UnknownPreset(s.to_string()))
    }
}

/// Explicit bloom configuration handed to kernel generation and the
/// post-process pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomSettings {
    pub enabled: bool,
    pub preset: BloomPreset,
    /// Overrides the preset's row when set.
    pub custom: Option<BloomParameters>,
    /// Taps per blur kernel; odd, 3..=31.
    pub taps: usize,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            preset: BloomPreset::Default,
            custom: None,
            taps: DEFAULT_TAPS,
        }
    }
}

impl BloomSettings {
    pub fn with_preset(preset: BloomPreset) -> Self {
        Self {
            preset,
            ..Self::default()
        }
    }

    pub fn parameters(&self) -> BloomParameters {
        self.custom.unwrap_or_else(|| self.preset.parameters())
    }

    /// True when the post-process should be skipped and the frame copied.
    pub fn is_bypass(&self) -> bool {
        !self.enabled || (self.custom.is_none() && self.preset.is_bypass())
    }

    pub fn validate(&self) -> Result<(), BloomError> {
        validate_taps(self.taps)?;
        self.parameters().validate()
    }
}
