use orrery_catalog::DataError;
use orrery_config::SettingsError;
use orrery_scene::{BuildError, RenderError};
use thiserror::Error;

use crate::platform::PlatformError;

/// Anything that stops the orrery.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("catalog: {0}")]
    Data(#[from] DataError),

    #[error("scene: {0}")]
    Build(#[from] BuildError),

    #[error("renderer: {0}")]
    Render(#[from] RenderError),

    #[error("{pending} textures still pending after {polls} polls")]
    TexturesStalled { pending: usize, polls: u32 },
}
