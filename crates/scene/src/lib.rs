//! Frame stepping and the fixed demo scene.
//!
//! # Invariants
//! - Animation variables are a pure function of the step timing fed in.
//! - The scene never reads input or touches device state.

mod scene;
pub mod timer;

pub use scene::{
    Animation, Motion, RETICLE_PULSE_PIXELS, RETICLE_PULSE_RATE, Scene, SceneObject, Shape,
};
pub use timer::{FrameTime, StepTimer, TimerSettings};
