//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Orrery command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "orrery", about = "Animated star-system orrery")]
pub struct CliArgs {
    /// Output width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Output height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Path to the body catalog JSON document.
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Initial global speed multiplier.
    #[arg(long)]
    pub speed: Option<f32>,

    /// Initial uniform body scale.
    #[arg(long)]
    pub scale: Option<f32>,

    /// Start paused.
    #[arg(long)]
    pub paused: bool,

    /// Start in cinematic camera sweep.
    #[arg(long)]
    pub cinematic: bool,

    /// Number of frames to run headless (0 runs until interrupted).
    #[arg(long)]
    pub frames: Option<u64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(ref path) = args.catalog {
            self.scene.catalog_path = path.clone();
        }
        if let Some(speed) = args.speed {
            self.control.speed = speed;
        }
        if let Some(scale) = args.scale {
            self.control.scale = scale;
        }
        if args.paused {
            self.control.playing = false;
        }
        if args.cinematic {
            self.control.cinematic = true;
        }
        if let Some(frames) = args.frames {
            self.debug.headless_frames = frames;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
