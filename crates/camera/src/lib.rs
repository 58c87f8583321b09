//! Free-fly camera: orientation control from pointer deltas, movement from
//! direction intent, look target and view/projection matrices.
//!
//! # Invariants
//! - Pitch never reaches ±π/2; yaw stays in `(-π, π]`.
//! - A non-finite input sample never changes orientation or position.
//! - Forward movement follows the look direction (see [`motion::move_rotation`]).

mod fly;
pub mod motion;
pub mod orientation;

pub use fly::{CameraSettings, FlyCamera, MovementSpeed};
pub use motion::{MovementMode, compute_look_target, compute_move_direction, look_direction};
pub use orientation::{OrientationState, PITCH_LIMIT};
