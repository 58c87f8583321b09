//! Configuration for the roomfly demo.
//!
//! A YAML file overrides any subset of the defaults. Values are validated
//! at load time so bad settings never reach the frame loop.

mod loader;
mod schema;
pub mod validation;

pub use loader::{from_yaml, load, load_from_path, to_yaml, write_to_path};
pub use roomfly_common::ConfigError;
pub use schema::{AppConfig, RoomConfig, WindowConfig};
