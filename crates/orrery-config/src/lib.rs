//! Configuration system for the orrery.
//!
//! Provides startup settings that persist to disk as RON files, with CLI
//! overrides via clap and hot-reload detection.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{CameraConfig, Config, ControlConfig, DebugConfig, SceneConfig, WindowConfig};
pub use error::SettingsError;
