//! Per-frame orchestration.
//!
//! One [`FrameDriver::frame`] call consumes queued input, spins the star,
//! advances the animation when playing, updates the camera, pushes changed
//! transforms, and draws. Renderer failures propagate to the caller.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use orrery_scene::{RenderError, Renderer, SolarSystem};
use tracing::{debug, warn};

use crate::animation::AnimationScheduler;
use crate::camera::CameraRig;
use crate::control::{ControlField, ControlSurface};
use crate::input::{EventError, InputEvent, InputIgnored, KeyAction, KeyBindings};

/// Frame times above this are clamped, accepting slowdown after a stall
/// rather than one huge jump.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Variable-rate frame clock.
#[derive(Debug)]
pub struct FrameClock {
    previous_time: Instant,
    total_time: f64,
    frame_count: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            previous_time: Instant::now(),
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Measure the wall-clock time since the previous frame.
    pub fn advance(&mut self) -> Duration {
        let now = Instant::now();
        let frame_time = now.duration_since(self.previous_time).as_secs_f64();
        self.previous_time = now;
        self.advance_by(frame_time)
    }

    /// Advance by an explicit frame time in seconds.
    pub fn advance_by(&mut self, frame_time: f64) -> Duration {
        let mut frame_time = frame_time.max(0.0);
        if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            frame_time = MAX_FRAME_TIME;
        }
        self.total_time += frame_time;
        self.frame_count += 1;
        Duration::from_secs_f64(frame_time)
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Sum of clamped frame times, in seconds.
    pub fn total_time(&self) -> f64 {
        self.total_time
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// What one frame did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameStats {
    pub frame: u64,
    /// Whether the animation scheduler ran.
    pub animated: bool,
    pub transforms_pushed: usize,
}

/// Owns the runtime state and drives it one frame at a time.
#[derive(Debug)]
pub struct FrameDriver {
    system: SolarSystem,
    control: ControlSurface,
    scheduler: AnimationScheduler,
    camera: CameraRig,
    bindings: KeyBindings,
    clock: FrameClock,
    queue: VecDeque<InputEvent>,
    ignored: u64,
}

impl FrameDriver {
    pub fn new(
        system: SolarSystem,
        control: ControlSurface,
        scheduler: AnimationScheduler,
        camera: CameraRig,
        bindings: KeyBindings,
    ) -> Self {
        Self {
            system,
            control,
            scheduler,
            camera,
            bindings,
            clock: FrameClock::new(),
            queue: VecDeque::new(),
            ignored: 0,
        }
    }

    /// Push the initial control state to the renderer before the first frame.
    pub fn start<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> Result<(), RenderError> {
        self.control.apply_initial(&mut self.system, renderer)?;
        self.camera.update(&self.system, self.control.state().cinematic, 0.0);
        self.system.graph.sync(renderer)?;
        Ok(())
    }

    pub fn system(&self) -> &SolarSystem {
        &self.system
    }

    pub fn control(&self) -> &ControlSurface {
        &self.control
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Events dropped as [`InputIgnored`] so far.
    pub fn ignored_events(&self) -> u64 {
        self.ignored
    }

    /// Queue an event for the start of the next frame.
    pub fn queue(&mut self, event: InputEvent) {
        self.queue.push_back(event);
    }

    /// Apply one event now. Ignored input is logged and dropped.
    pub fn handle_event<R: Renderer + ?Sized>(
        &mut self,
        event: InputEvent,
        renderer: &mut R,
    ) -> Result<(), RenderError> {
        match self.dispatch(event, renderer) {
            Ok(()) => Ok(()),
            Err(EventError::Ignored(reason)) => {
                warn!("Ignoring input: {reason}");
                self.ignored += 1;
                Ok(())
            }
            Err(EventError::Render(err)) => Err(err),
        }
    }

    fn dispatch<R: Renderer + ?Sized>(
        &mut self,
        event: InputEvent,
        renderer: &mut R,
    ) -> Result<(), EventError> {
        match event {
            InputEvent::SelectBody(name) => self.camera.select(&name, &self.system)?,
            InputEvent::Pick(handle) => {
                let name = self
                    .system
                    .selectables()
                    .resolve(handle)
                    .ok_or(InputIgnored::NotSelectable(handle))?
                    .to_string();
                self.camera.select(&name, &self.system)?;
            }
            InputEvent::ResetCamera => self.camera.reset(),
            InputEvent::Resize { width, height } => {
                if !self.camera.resize(width, height) {
                    return Err(InputIgnored::ZeroSize { width, height }.into());
                }
                renderer.resize(width, height)?;
            }
            InputEvent::Control { field, value } => {
                let field: ControlField = field.parse()?;
                if self
                    .control
                    .apply(field, value, &mut self.system, renderer)?
                {
                    debug!("Control {field} set to {value:?}");
                }
            }
            InputEvent::Key(key) => {
                let action = self
                    .bindings
                    .action(&key)
                    .ok_or(InputIgnored::UnboundKey(key))?;
                self.key_action(action, renderer)?;
            }
        }
        Ok(())
    }

    fn key_action<R: Renderer + ?Sized>(
        &mut self,
        action: KeyAction,
        renderer: &mut R,
    ) -> Result<(), RenderError> {
        let state = self.control.state().clone();
        match action {
            KeyAction::TogglePlaying => {
                self.control.set_playing(!state.playing);
            }
            KeyAction::ResetCamera => self.camera.reset(),
            KeyAction::ToggleCinematic => {
                self.control.set_cinematic(!state.cinematic);
            }
            KeyAction::ToggleOrbits => {
                self.control
                    .set_show_orbits(!state.show_orbits, &mut self.system, renderer)?;
            }
            KeyAction::ToggleRealistic => {
                self.control.set_realistic(!state.realistic, renderer)?;
            }
            KeyAction::SpeedUp => {
                self.control.set_speed(state.speed + 1.0);
            }
            KeyAction::SlowDown => {
                self.control.set_speed(state.speed - 1.0);
            }
            KeyAction::ScaleUp => {
                self.control.set_scale(state.scale + 1.0, &mut self.system);
            }
            KeyAction::ScaleDown => {
                self.control.set_scale(state.scale - 1.0, &mut self.system);
            }
        }
        Ok(())
    }

    /// Run one frame timed by the wall clock.
    pub fn frame<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> Result<FrameStats, RenderError> {
        let elapsed = self.clock.advance();
        self.step(elapsed, renderer)
    }

    /// Run one frame with an explicit frame time.
    pub fn frame_with<R: Renderer + ?Sized>(
        &mut self,
        frame_time: Duration,
        renderer: &mut R,
    ) -> Result<FrameStats, RenderError> {
        let elapsed = self.clock.advance_by(frame_time.as_secs_f64());
        self.step(elapsed, renderer)
    }

    fn step<R: Renderer + ?Sized>(
        &mut self,
        elapsed: Duration,
        renderer: &mut R,
    ) -> Result<FrameStats, RenderError> {
        while let Some(event) = self.queue.pop_front() {
            self.handle_event(event, renderer)?;
        }

        self.scheduler.spin_star(&mut self.system, elapsed);
        let animated = self.control.state().playing;
        if animated {
            self.scheduler
                .tick(&mut self.system, self.control.state(), elapsed);
        }

        self.camera.update(
            &self.system,
            self.control.state().cinematic,
            self.clock.total_time(),
        );

        let transforms_pushed = self.system.graph.sync(renderer)?;
        renderer.draw(self.system.scene_handle(), self.camera.camera())?;

        Ok(FrameStats {
            frame: self.clock.frame_count(),
            animated,
            transforms_pushed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{CameraSettings, CameraTarget};
    use crate::control::{ControlLimits, ControlState, ControlValue};
    use crate::testing::{EARTH_AND_MOON, build_system};
    use orrery_scene::RecordingRenderer;

    const FRAME: Duration = Duration::from_nanos(16_666_667);

    fn driver(renderer: &mut RecordingRenderer) -> FrameDriver {
        let system = build_system(EARTH_AND_MOON, renderer);
        let mut driver = FrameDriver::new(
            system,
            ControlSurface::new(ControlState::default(), ControlLimits::default()),
            AnimationScheduler::default(),
            CameraRig::new(CameraSettings::default(), 1280, 720),
            KeyBindings::default(),
        );
        driver.start(renderer).unwrap();
        driver
    }

    #[test]
    fn test_clock_clamps_long_frames() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance_by(1.0), Duration::from_secs_f64(MAX_FRAME_TIME));
        assert_eq!(clock.advance_by(-0.5), Duration::ZERO);
        clock.advance_by(0.1);
        assert_eq!(clock.frame_count(), 3);
        assert!((clock.total_time() - 0.35).abs() < 1e-9);
    }

    #[test]
    fn test_frame_draws_once() {
        let mut renderer = RecordingRenderer::new();
        let mut driver = driver(&mut renderer);
        let stats = driver.frame_with(FRAME, &mut renderer).unwrap();
        assert_eq!(stats.frame, 1);
        assert!(stats.animated);
        assert!(stats.transforms_pushed > 0);
        assert_eq!(renderer.draw_count(), 1);
    }

    #[test]
    fn test_render_failure_propagates() {
        let mut renderer = RecordingRenderer::new();
        let mut driver = driver(&mut renderer);
        renderer.fail_draws();
        assert!(driver.frame_with(FRAME, &mut renderer).is_err());
    }

    #[test]
    fn test_ignored_events_do_not_abort() {
        let mut renderer = RecordingRenderer::new();
        let mut driver = driver(&mut renderer);
        driver.queue(InputEvent::SelectBody("Pluto".to_string()));
        driver.queue(InputEvent::Key("KeyQ".to_string()));
        driver.queue(InputEvent::Control {
            field: "gravity".to_string(),
            value: ControlValue::Number(1.0),
        });
        driver.queue(InputEvent::Resize { width: 640, height: 0 });
        driver.frame_with(FRAME, &mut renderer).unwrap();
        assert_eq!(driver.ignored_events(), 4);
        assert_eq!(driver.camera().target(), &CameraTarget::Free);
        assert_eq!(renderer.draw_count(), 1);
    }

    #[test]
    fn test_pick_resolves_selectable() {
        let mut renderer = RecordingRenderer::new();
        let mut driver = driver(&mut renderer);
        let moon = driver.system().entity("Moon").unwrap().body;
        let handle = driver.system().graph.node(moon).handle().unwrap();
        driver.handle_event(InputEvent::Pick(handle), &mut renderer).unwrap();
        assert_eq!(driver.camera().target(), &CameraTarget::Locked("Moon".to_string()));
    }

    #[test]
    fn test_keys_toggle_controls() {
        let mut renderer = RecordingRenderer::new();
        let mut driver = driver(&mut renderer);
        for key in ["Space", "KeyC", "KeyO", "KeyL", "Equal", "BracketRight"] {
            driver
                .handle_event(InputEvent::Key(key.to_string()), &mut renderer)
                .unwrap();
        }
        let state = driver.control().state();
        assert!(!state.playing);
        assert!(state.cinematic);
        assert!(!state.show_orbits);
        assert!(state.realistic);
        assert_eq!(state.speed, 2.0);
        assert_eq!(state.scale, 2.0);
        assert_eq!(renderer.ambient(), Some(0.0));
    }

    #[test]
    fn test_resize_updates_renderer_and_aspect() {
        let mut renderer = RecordingRenderer::new();
        let mut driver = driver(&mut renderer);
        driver
            .handle_event(InputEvent::Resize { width: 1000, height: 500 }, &mut renderer)
            .unwrap();
        assert_eq!(renderer.size(), Some((1000, 500)));
        assert!((driver.camera().camera().aspect_ratio - 2.0).abs() < 1e-6);
    }
}
