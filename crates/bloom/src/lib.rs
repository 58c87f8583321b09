//! Bloom post-process parameters: separable Gaussian blur kernels and the
//! named preset table.
//!
//! # Invariants
//! - Kernel weights sum to one and mirror around the center tap.
//! - Invalid settings are rejected before any kernel is built.
//! - Published kernels are immutable; a rebuild swaps in a new `Arc`.

pub mod kernel;
pub mod preset;
mod state;

pub use kernel::{BloomKernel, BlurKernels, DEFAULT_TAPS, MAX_TAPS, gaussian};
pub use preset::{BloomParameters, BloomPreset, BloomSettings};
pub use state::{BloomState, half_resolution};

/// Errors from bloom configuration and kernel generation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BloomError {
    #[error("kernel tap count must be odd and within 3..={max}, got {0}", max = MAX_TAPS)]
    InvalidTaps(usize),
    #[error("blur amount must be positive and finite, got {0}")]
    InvalidTheta(f32),
    #[error("texel step must be finite, got {0:?}")]
    InvalidStep([f32; 2]),
    #[error("bloom parameter `{name}` out of range: {value}")]
    InvalidParameter { name: &'static str, value: f32 },
    #[error("kernel weights degenerate for theta={theta}, taps={taps}")]
    DegenerateKernel { theta: f32, taps: usize },
    #[error("blur target must be non-empty, got {width}x{height}")]
    EmptyTarget { width: u32, height: u32 },
    #[error("unknown bloom preset: {0}")]
    UnknownPreset(String),
}
