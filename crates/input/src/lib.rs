//! Desktop input mapped to camera intent and demo actions.
//!
//! # Invariants
//! - Consumers see actions and intent, never backend key codes.
//! - Pointer motion only counts in relative mode.

pub mod action;
mod state;

pub use action::{Action, Direction, Key, default_binding};
pub use state::{InputState, MoveIntent, PointerMode};
