//! Configuration structs with defaults matching the classic orrery look, persisted as RON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Top-level orrery configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Output surface settings.
    pub window: WindowConfig,
    /// Initial control-panel values and their allowed ranges.
    pub control: ControlConfig,
    /// Camera home pose, projection, and cinematic sweep.
    pub camera: CameraConfig,
    /// Scene construction constants.
    pub scene: SceneConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Output surface configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Width in logical pixels.
    pub width: u32,
    /// Height in logical pixels.
    pub height: u32,
    /// Window title.
    pub title: String,
}

/// Initial control-panel state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlConfig {
    /// Star light only, no ambient fill.
    pub realistic: bool,
    /// Draw orbit paths.
    pub show_orbits: bool,
    /// Uniform body scale.
    pub scale: f32,
    /// Global time multiplier.
    pub speed: f32,
    /// Start with the animation running.
    pub playing: bool,
    /// Start in cinematic sweep.
    pub cinematic: bool,
    /// Inclusive `(min, max)` for `scale`.
    pub scale_range: (f32, f32),
    /// Inclusive `(min, max)` for `speed`.
    pub speed_range: (f32, f32),
    /// Keybinding overrides (action name -> key name).
    pub keybindings: Vec<(String, String)>,
}

/// Camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Default camera position.
    pub home_position: [f32; 3],
    /// Default point the camera looks at.
    pub home_focus: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
    /// Camera offset from a locked body, in multiples of the body radius.
    pub lock_offset: [f32; 3],
    /// Cinematic sweep circle radius.
    pub sweep_radius: f32,
    /// Cinematic sweep vertical amplitude.
    pub sweep_height: f32,
    /// Cinematic sweep angular speed in radians per second.
    pub sweep_rate: f32,
}

/// Scene construction constants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Path to the body catalog JSON document.
    pub catalog_path: PathBuf,
    /// Directory texture paths in the catalog are relative to.
    pub texture_dir: PathBuf,
    /// Catalog body whose diameter normalizes size ratios (overrides the document when set).
    pub reference_body: Option<String>,
    /// Orbital velocity (km/s) divisor yielding radians per reference frame.
    pub velocity_normalization: f64,
    /// Rendered radius of a body with size ratio 1.
    pub size_unit: f32,
    /// Rendered radius of the star.
    pub star_radius: f32,
    /// Star self-rotation in radians per reference frame.
    pub star_spin_rate: f32,
    /// Host rendered radius multiplier giving the minimum satellite offset.
    pub proximity_factor: f32,
    /// Orbit path samples per loop.
    pub orbit_segments: u32,
    /// Sphere tessellation.
    pub sphere_segments: u32,
    /// Ring tessellation.
    pub ring_segments: u32,
    /// Frame rate the per-frame rates are calibrated against.
    pub reference_fps: f32,
    /// Ambient fill intensity when not in realistic mode.
    pub ambient_intensity: f32,
    /// Star point light intensity.
    pub star_light_intensity: f32,
    /// Star point light range.
    pub star_light_range: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Frames to run in headless mode (0 = run until interrupted).
    pub headless_frames: u64,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Orrery".to_string(),
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            realistic: false,
            show_orbits: true,
            scale: 1.0,
            speed: 1.0,
            playing: true,
            cinematic: false,
            scale_range: (1.0, 10.0),
            speed_range: (0.0, 20.0),
            keybindings: Vec::new(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            home_position: [0.0, 30.0, 150.0],
            home_focus: [0.0, 0.0, 0.0],
            fov_degrees: 75.0,
            near: 0.1,
            far: 100_000.0,
            lock_offset: [0.0, 1.5, 6.0],
            sweep_radius: 250.0,
            sweep_height: 60.0,
            sweep_rate: 0.1,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("assets/planetary_data.json"),
            texture_dir: PathBuf::from("assets"),
            reference_body: None,
            velocity_normalization: 10_000.0,
            size_unit: 10.0,
            star_radius: 15.0,
            star_spin_rate: 0.004,
            proximity_factor: 2.5,
            orbit_segments: 100,
            sphere_segments: 50,
            ring_segments: 32,
            reference_fps: 60.0,
            ambient_intensity: 0.2,
            star_light_intensity: 4.0,
            star_light_range: 800.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            headless_frames: 600,
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, SettingsError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents =
                std::fs::read_to_string(&config_path).map_err(SettingsError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(SettingsError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), SettingsError> {
        std::fs::create_dir_all(config_dir).map_err(SettingsError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(SettingsError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(SettingsError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, SettingsError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(SettingsError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(SettingsError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("width: 1280"));
        assert!(ron_str.contains("proximity_factor: 2.5"));
    }

    #[test]
    fn test_defaults_match_classic_scene() {
        let config = Config::default();
        assert_eq!(config.camera.home_position, [0.0, 30.0, 150.0]);
        assert_eq!(config.camera.fov_degrees, 75.0);
        assert_eq!(config.scene.orbit_segments, 100);
        assert_eq!(config.scene.size_unit, 10.0);
        assert_eq!(config.scene.velocity_normalization, 10_000.0);
        assert!(config.control.playing);
        assert!(config.control.show_orbits);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(window: (), control: (speed: 3.0))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.scene, SceneConfig::default());
        assert_eq!(config.control.speed, 3.0);
        assert_eq!(config.control.scale, 1.0);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.control.scale = 4.0;
        config.scene.catalog_path = PathBuf::from("/tmp/bodies.json");
        config.control.keybindings = vec![("reset_camera".to_string(), "KeyH".to_string())];

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.control.speed = 7.0;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.map(|c| c.control.speed), Some(7.0));
        assert!(modified.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ron"), "{{not valid}}").unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(result, Err(SettingsError::ParseError(_))));
    }
}
