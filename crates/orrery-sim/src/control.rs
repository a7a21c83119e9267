//! The user-tunable parameter set and its setters.
//!
//! Every write goes through [`ControlSurface`], which clamps numeric fields,
//! reports whether anything changed, and pushes the side effect a field owns
//! (path visibility, ambient light, body scale) exactly once per change.

use std::fmt;
use std::str::FromStr;

use orrery_scene::{RenderError, Renderer, SolarSystem};

use crate::input::{EventError, InputIgnored};

/// Current control values.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlState {
    /// Star light only, no ambient fill.
    pub realistic: bool,
    pub show_orbits: bool,
    /// Uniform scale applied to every body; rings keep their catalog size.
    pub scale: f32,
    /// Global animation speed multiplier.
    pub speed: f32,
    pub playing: bool,
    /// Camera follows the cinematic sweep.
    pub cinematic: bool,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            realistic: false,
            show_orbits: true,
            scale: 1.0,
            speed: 1.0,
            playing: true,
            cinematic: false,
        }
    }
}

/// Names a control field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlField {
    Realistic,
    ShowOrbits,
    Scale,
    Speed,
    Playing,
    Cinematic,
}

impl ControlField {
    pub fn name(self) -> &'static str {
        match self {
            Self::Realistic => "realistic",
            Self::ShowOrbits => "showOrbits",
            Self::Scale => "scale",
            Self::Speed => "speed",
            Self::Playing => "playing",
            Self::Cinematic => "cinematic",
        }
    }

    fn is_numeric(self) -> bool {
        matches!(self, Self::Scale | Self::Speed)
    }
}

impl fmt::Display for ControlField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ControlField {
    type Err = InputIgnored;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "realistic" => Self::Realistic,
            "showOrbits" | "show_orbits" => Self::ShowOrbits,
            "scale" => Self::Scale,
            "speed" => Self::Speed,
            "playing" => Self::Playing,
            "cinematic" => Self::Cinematic,
            _ => return Err(InputIgnored::UnknownField(s.to_string())),
        })
    }
}

/// A value written to a control field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlValue {
    Bool(bool),
    Number(f32),
}

/// Bounds and light levels the surface enforces.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlLimits {
    pub scale: (f32, f32),
    pub speed: (f32, f32),
    /// Ambient intensity while not in realistic mode.
    pub ambient_intensity: f32,
}

impl Default for ControlLimits {
    fn default() -> Self {
        Self {
            scale: (1.0, 10.0),
            speed: (0.0, 20.0),
            ambient_intensity: 0.2,
        }
    }
}

/// Owner of [`ControlState`]; the only writer.
#[derive(Clone, Debug)]
pub struct ControlSurface {
    state: ControlState,
    limits: ControlLimits,
}

impl ControlSurface {
    /// Wrap an initial state, clamping numeric fields into range.
    pub fn new(initial: ControlState, limits: ControlLimits) -> Self {
        let mut state = initial;
        state.scale = clamp(state.scale, limits.scale);
        state.speed = clamp(state.speed, limits.speed);
        Self { state, limits }
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    pub fn limits(&self) -> &ControlLimits {
        &self.limits
    }

    fn ambient(&self) -> f32 {
        if self.state.realistic {
            0.0
        } else {
            self.limits.ambient_intensity
        }
    }

    /// Push every side effect of the current state once, after the build.
    pub fn apply_initial<R: Renderer + ?Sized>(
        &self,
        system: &mut SolarSystem,
        renderer: &mut R,
    ) -> Result<(), RenderError> {
        renderer.set_ambient_intensity(self.ambient())?;
        system.set_paths_visible(self.state.show_orbits, renderer)?;
        system.set_body_scale(self.state.scale);
        Ok(())
    }

    pub fn set_realistic<R: Renderer + ?Sized>(
        &mut self,
        realistic: bool,
        renderer: &mut R,
    ) -> Result<bool, RenderError> {
        if self.state.realistic == realistic {
            return Ok(false);
        }
        self.state.realistic = realistic;
        renderer.set_ambient_intensity(self.ambient())?;
        Ok(true)
    }

    pub fn set_show_orbits<R: Renderer + ?Sized>(
        &mut self,
        show: bool,
        system: &mut SolarSystem,
        renderer: &mut R,
    ) -> Result<bool, RenderError> {
        if self.state.show_orbits == show {
            return Ok(false);
        }
        self.state.show_orbits = show;
        system.set_paths_visible(show, renderer)?;
        Ok(true)
    }

    /// Rescale bodies only. Ring geometry and orbits are untouched; the
    /// new transforms reach the renderer on the next sync.
    pub fn set_scale(&mut self, scale: f32, system: &mut SolarSystem) -> bool {
        let scale = clamp(scale, self.limits.scale);
        if self.state.scale == scale {
            return false;
        }
        self.state.scale = scale;
        system.set_body_scale(scale);
        true
    }

    pub fn set_speed(&mut self, speed: f32) -> bool {
        let speed = clamp(speed, self.limits.speed);
        if self.state.speed == speed {
            return false;
        }
        self.state.speed = speed;
        true
    }

    pub fn set_playing(&mut self, playing: bool) -> bool {
        if self.state.playing == playing {
            return false;
        }
        self.state.playing = playing;
        true
    }

    pub fn set_cinematic(&mut self, cinematic: bool) -> bool {
        if self.state.cinematic == cinematic {
            return false;
        }
        self.state.cinematic = cinematic;
        true
    }

    /// Write `value` to `field`. Returns whether the state changed.
    pub fn apply<R: Renderer + ?Sized>(
        &mut self,
        field: ControlField,
        value: ControlValue,
        system: &mut SolarSystem,
        renderer: &mut R,
    ) -> Result<bool, EventError> {
        match (field.is_numeric(), value) {
            (true, ControlValue::Number(n)) => {
                if !n.is_finite() {
                    return Err(InputIgnored::NonFinite {
                        field: field.name(),
                        value: n,
                    }
                    .into());
                }
                Ok(match field {
                    ControlField::Scale => self.set_scale(n, system),
                    _ => self.set_speed(n),
                })
            }
            (false, ControlValue::Bool(b)) => Ok(match field {
                ControlField::Realistic => self.set_realistic(b, renderer)?,
                ControlField::ShowOrbits => self.set_show_orbits(b, system, renderer)?,
                ControlField::Playing => self.set_playing(b),
                _ => self.set_cinematic(b),
            }),
            (numeric, _) => Err(InputIgnored::WrongKind {
                field: field.name(),
                expected: if numeric { "number" } else { "boolean" },
            }
            .into()),
        }
    }
}

fn clamp(value: f32, (min, max): (f32, f32)) -> f32 {
    value.max(min).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::build_system;
    use orrery_scene::{RecordingRenderer, RenderCall};

    fn system(renderer: &mut RecordingRenderer) -> SolarSystem {
        build_system(crate::testing::EARTH_AND_MOON, renderer)
    }

    #[test]
    fn test_defaults() {
        let surface = ControlSurface::new(ControlState::default(), ControlLimits::default());
        let state = surface.state();
        assert!(!state.realistic);
        assert!(state.show_orbits);
        assert_eq!(state.scale, 1.0);
        assert_eq!(state.speed, 1.0);
        assert!(state.playing);
        assert!(!state.cinematic);
    }

    #[test]
    fn test_field_names() {
        assert_eq!("showOrbits".parse(), Ok(ControlField::ShowOrbits));
        assert_eq!("show_orbits".parse(), Ok(ControlField::ShowOrbits));
        assert_eq!(
            "gravity".parse::<ControlField>(),
            Err(InputIgnored::UnknownField("gravity".to_string()))
        );
    }

    #[test]
    fn test_numeric_fields_clamp() {
        let mut surface = ControlSurface::new(ControlState::default(), ControlLimits::default());
        assert!(surface.set_speed(50.0));
        assert_eq!(surface.state().speed, 20.0);
        assert!(surface.set_speed(-1.0));
        assert_eq!(surface.state().speed, 0.0);
        let initial = ControlState {
            scale: 0.5,
            ..ControlState::default()
        };
        assert_eq!(ControlSurface::new(initial, ControlLimits::default()).state().scale, 1.0);
    }

    #[test]
    fn test_realistic_sets_ambient() {
        let mut renderer = RecordingRenderer::new();
        let mut surface = ControlSurface::new(ControlState::default(), ControlLimits::default());
        assert!(surface.set_realistic(true, &mut renderer).unwrap());
        assert_eq!(renderer.ambient(), Some(0.0));
        assert!(!surface.set_realistic(true, &mut renderer).unwrap());
        assert!(surface.set_realistic(false, &mut renderer).unwrap());
        assert_eq!(renderer.ambient(), Some(0.2));
    }

    #[test]
    fn test_repeated_scale_is_idempotent() {
        let mut renderer = RecordingRenderer::new();
        let mut system = system(&mut renderer);
        let mut surface = ControlSurface::new(ControlState::default(), ControlLimits::default());

        assert!(surface.set_scale(4.0, &mut system));
        let once = system.graph.clone();
        assert!(!surface.set_scale(4.0, &mut system));
        let body = system.entity("Earth").unwrap().body;
        assert_eq!(system.graph.node(body).local(), once.node(body).local());
        assert_eq!(system.graph.dirty_count(), once.dirty_count());
    }

    #[test]
    fn test_orbit_toggle_is_idempotent() {
        let mut renderer = RecordingRenderer::new();
        let mut system = system(&mut renderer);
        let mut surface = ControlSurface::new(ControlState::default(), ControlLimits::default());
        renderer.clear_calls();

        assert!(!surface.set_show_orbits(true, &mut system, &mut renderer).unwrap());
        assert!(renderer.calls().is_empty());
        assert!(surface.set_show_orbits(false, &mut system, &mut renderer).unwrap());
        assert!(
            renderer
                .calls()
                .iter()
                .all(|c| matches!(c, RenderCall::SetVisibility { visible: false, .. }))
        );
    }

    #[test]
    fn test_apply_rejects_wrong_kind_and_nan() {
        let mut renderer = RecordingRenderer::new();
        let mut system = system(&mut renderer);
        let mut surface = ControlSurface::new(ControlState::default(), ControlLimits::default());

        let err = surface
            .apply(ControlField::Speed, ControlValue::Bool(true), &mut system, &mut renderer)
            .unwrap_err();
        assert!(matches!(
            err,
            EventError::Ignored(InputIgnored::WrongKind { expected: "number", .. })
        ));
        let err = surface
            .apply(ControlField::Scale, ControlValue::Number(f32::NAN), &mut system, &mut renderer)
            .unwrap_err();
        assert!(matches!(err, EventError::Ignored(InputIgnored::NonFinite { .. })));
        assert_eq!(surface.state(), &ControlState::default());

        assert!(
            surface
                .apply(ControlField::Playing, ControlValue::Bool(false), &mut system, &mut renderer)
                .unwrap()
        );
        assert!(!surface.state().playing);
    }
}
