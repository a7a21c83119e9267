//! Translation from the persisted [`Config`] into the runtime types each
//! crate consumes.

use glam::Vec3;
use orrery_catalog::CatalogUnits;
use orrery_config::Config;
use orrery_scene::BuildSettings;
use orrery_sim::{
    CameraSettings, ControlField, ControlLimits, ControlState, ControlValue, InputEvent, KeyBindings,
};

pub fn catalog_units(config: &Config) -> CatalogUnits {
    CatalogUnits {
        reference_body: config.scene.reference_body.clone(),
        velocity_normalization: config.scene.velocity_normalization,
    }
}

pub fn build_settings(config: &Config) -> BuildSettings {
    let scene = &config.scene;
    BuildSettings {
        size_unit: scene.size_unit,
        star_radius: scene.star_radius,
        star_spin_rate: scene.star_spin_rate,
        proximity_factor: scene.proximity_factor,
        orbit_segments: scene.orbit_segments,
        sphere_segments: scene.sphere_segments,
        ring_segments: scene.ring_segments,
        star_light_intensity: scene.star_light_intensity,
        star_light_range: scene.star_light_range,
        ..BuildSettings::default()
    }
}

pub fn control_state(config: &Config) -> ControlState {
    let control = &config.control;
    ControlState {
        realistic: control.realistic,
        show_orbits: control.show_orbits,
        scale: control.scale,
        speed: control.speed,
        playing: control.playing,
        cinematic: control.cinematic,
    }
}

pub fn control_limits(config: &Config) -> ControlLimits {
    ControlLimits {
        scale: config.control.scale_range,
        speed: config.control.speed_range,
        ambient_intensity: config.scene.ambient_intensity,
    }
}

pub fn camera_settings(config: &Config) -> CameraSettings {
    let camera = &config.camera;
    CameraSettings {
        home_position: Vec3::from_array(camera.home_position),
        home_focus: Vec3::from_array(camera.home_focus),
        fov_degrees: camera.fov_degrees,
        near: camera.near,
        far: camera.far,
        lock_offset: Vec3::from_array(camera.lock_offset),
        sweep_radius: camera.sweep_radius,
        sweep_height: camera.sweep_height,
        sweep_rate: camera.sweep_rate,
    }
}

/// Default bindings with the config's `(action, key)` overrides applied.
pub fn key_bindings(config: &Config) -> KeyBindings {
    let mut bindings = KeyBindings::default();
    bindings.apply_overrides(
        config
            .control
            .keybindings
            .iter()
            .map(|(action, key)| (action.as_str(), key.as_str())),
    );
    bindings
}

/// Frames the headless loop runs; `None` runs until interrupted.
pub fn frame_budget(config: &Config) -> Option<u64> {
    match config.debug.headless_frames {
        0 => None,
        frames => Some(frames),
    }
}

/// Control writes for every control field that differs between two config
/// snapshots, in the order the control surface lists them.
pub fn control_changes(old: &Config, new: &Config) -> Vec<InputEvent> {
    let (old, new) = (control_state(old), control_state(new));
    let changes = [
        (
            ControlField::Realistic,
            old.realistic != new.realistic,
            ControlValue::Bool(new.realistic),
        ),
        (
            ControlField::ShowOrbits,
            old.show_orbits != new.show_orbits,
            ControlValue::Bool(new.show_orbits),
        ),
        (
            ControlField::Scale,
            old.scale != new.scale,
            ControlValue::Number(new.scale),
        ),
        (
            ControlField::Speed,
            old.speed != new.speed,
            ControlValue::Number(new.speed),
        ),
        (
            ControlField::Playing,
            old.playing != new.playing,
            ControlValue::Bool(new.playing),
        ),
        (
            ControlField::Cinematic,
            old.cinematic != new.cinematic,
            ControlValue::Bool(new.cinematic),
        ),
    ];
    changes
        .into_iter()
        .filter(|(_, changed, _)| *changed)
        .map(|(field, _, value)| InputEvent::Control {
            field: field.name().to_string(),
            value,
        })
        .collect()
}
