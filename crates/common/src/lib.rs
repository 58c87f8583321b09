//! Shared types for the roomfly demo.
//!
//! # Invariants
//! - Types here carry no device or window state.

mod error;
mod types;

pub use error::ConfigError;
pub use types::{RoomBounds, Transform};
