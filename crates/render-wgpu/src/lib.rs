//! wgpu render backend for roomfly.
//!
//! Draws the room scene with instanced procedural meshes into an HDR
//! target, runs the bloom post-process into the surface, then draws the
//! HUD reticle on top.
//!
//! # Invariants
//! - The renderer never mutates the scene, camera or bloom state.
//! - Bloom kernels are uploaded only when a new set has been published.
//! - Every GPU object is owned by [`WgpuRenderer`] and dies with it.

mod gpu;
pub mod mesh;
mod post;
mod shaders;

pub use gpu::{GpuDevice, WgpuRenderer};
pub use post::{HDR_FORMAT, KernelUniform, PostParams};
