//! Rendering interface shared by the GPU backend and headless tools.
//!
//! # Invariants
//! - Renderers read the scene, camera and bloom state; they never mutate them.
//! - Device-dependent resources live in a [`GraphicsContext`] and are
//!   released together when the device is lost.

mod lifecycle;
mod renderer;
pub mod reticle;

pub use lifecycle::{DeviceResources, DeviceState, GraphicsContext, RenderError};
pub use renderer::{DebugTextRenderer, FrameContext, RenderView, Renderer};
pub use reticle::{RETICLE_VERTEX_COUNT, Reticle, ReticleVertex, screen_projection};
