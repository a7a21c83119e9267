//! Per-frame angular advancement of pivots, bodies, belts, and the star.

use std::time::Duration;

use orrery_scene::{OrbitalEntity, SceneGraph, SolarSystem};

use crate::control::ControlState;

/// Frame rate the catalog's per-frame rates are expressed against.
pub const REFERENCE_FPS: f32 = 60.0;

/// Converts elapsed wall-clock time into reference frames and rotates nodes.
///
/// Every rate is in radians per reference frame, so one frame at
/// [`REFERENCE_FPS`] advances a node by exactly its rate times `speed`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationScheduler {
    reference_fps: f32,
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new(REFERENCE_FPS)
    }
}

impl AnimationScheduler {
    pub fn new(reference_fps: f32) -> Self {
        Self { reference_fps }
    }

    /// Reference frames covered by `elapsed`.
    pub fn frames(&self, elapsed: Duration) -> f32 {
        elapsed.as_secs_f32() * self.reference_fps
    }

    /// Spin the star body. Independent of speed and play state.
    pub fn spin_star(&self, system: &mut SolarSystem, elapsed: Duration) {
        let angle = system.star.spin_rate * self.frames(elapsed);
        system.graph.rotate_local_y(system.star.body, angle);
    }

    /// Advance every orbit, body spin, and belt by `speed * frames(elapsed)`.
    ///
    /// Callers skip this while paused. Returns the number of nodes rotated.
    pub fn tick(&self, system: &mut SolarSystem, control: &ControlState, elapsed: Duration) -> usize {
        let step = control.speed * self.frames(elapsed);
        if step == 0.0 {
            return 0;
        }
        let graph = &mut system.graph;
        let mut rotated = 0;
        for entity in &system.entities {
            rotated += advance(graph, entity, step);
        }
        for belt in &system.belts {
            graph.rotate_local_z(belt.node, belt.spin_rate * step);
            rotated += 1;
        }
        rotated
    }
}

/// Orbit the pivot and spin the body, then recurse. Satellites ride on the
/// host carrier, so their rotation composes on top of the host's orbit.
fn advance(graph: &mut SceneGraph, entity: &OrbitalEntity, step: f32) -> usize {
    graph.rotate_local_y(entity.pivot, entity.orbital_rate * step);
    graph.rotate_local_y(entity.body, entity.spin_rate * step);
    2 + entity
        .satellites
        .iter()
        .map(|satellite| advance(graph, satellite, step))
        .sum::<usize>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{EARTH_AND_MOON, build_system};
    use orrery_scene::RecordingRenderer;

    const FRAME: Duration = Duration::from_nanos(16_666_667);

    fn angle_about_y(system: &SolarSystem, node: orrery_scene::NodeId) -> f32 {
        let (axis, angle) = system.graph.node(node).local().rotation.to_axis_angle();
        if axis.y < 0.0 { -angle } else { angle }
    }

    /// Orbital phase of a planar top-level entity, read off its carrier.
    fn orbit_phase(system: &SolarSystem, name: &str) -> f32 {
        let carrier = system.graph.world_position(system.entity(name).unwrap().carrier);
        (-carrier.z).atan2(carrier.x)
    }

    #[test]
    fn test_one_reference_frame_advances_by_rate() {
        let mut renderer = RecordingRenderer::new();
        let mut system = build_system(EARTH_AND_MOON, &mut renderer);
        let scheduler = AnimationScheduler::default();

        scheduler.tick(&mut system, &ControlState::default(), FRAME);
        let rate = system.entity("Earth").unwrap().orbital_rate;
        let phase = orbit_phase(&system, "Earth");
        assert!((phase - rate).abs() < 1e-5, "{phase}");
    }

    #[test]
    fn test_speed_multiplies_step() {
        let mut renderer = RecordingRenderer::new();
        let mut system = build_system(EARTH_AND_MOON, &mut renderer);
        let scheduler = AnimationScheduler::default();
        let control = ControlState {
            speed: 3.0,
            ..ControlState::default()
        };

        scheduler.tick(&mut system, &control, FRAME);
        let rate = system.entity("Earth").unwrap().orbital_rate;
        let phase = orbit_phase(&system, "Earth");
        assert!((phase - 3.0 * rate).abs() < 1e-5, "{phase}");
    }

    #[test]
    fn test_elapsed_time_not_frame_count_drives_motion() {
        let mut renderer = RecordingRenderer::new();
        let mut at_60 = build_system(EARTH_AND_MOON, &mut renderer);
        let mut at_30 = build_system(EARTH_AND_MOON, &mut renderer);
        let scheduler = AnimationScheduler::default();
        let control = ControlState::default();

        for _ in 0..60 {
            scheduler.tick(&mut at_60, &control, Duration::from_secs_f64(1.0 / 60.0));
        }
        for _ in 0..30 {
            scheduler.tick(&mut at_30, &control, Duration::from_secs_f64(1.0 / 30.0));
        }
        let a = at_60.body_world_position("Moon").unwrap();
        let b = at_30.body_world_position("Moon").unwrap();
        assert!((a - b).length() < 1e-2, "{a} vs {b}");
    }

    #[test]
    fn test_zero_speed_rotates_nothing() {
        let mut renderer = RecordingRenderer::new();
        let mut system = build_system(EARTH_AND_MOON, &mut renderer);
        let before = system.body_world_position("Moon").unwrap();
        let control = ControlState {
            speed: 0.0,
            ..ControlState::default()
        };
        assert_eq!(AnimationScheduler::default().tick(&mut system, &control, FRAME), 0);
        assert_eq!(system.body_world_position("Moon").unwrap(), before);
    }

    #[test]
    fn test_star_spin_leaves_planets_in_place() {
        let mut renderer = RecordingRenderer::new();
        let mut system = build_system(EARTH_AND_MOON, &mut renderer);
        let before = system.body_world_position("Earth").unwrap();
        AnimationScheduler::default().spin_star(&mut system, FRAME * 100);
        assert_eq!(system.body_world_position("Earth").unwrap(), before);
        assert!(angle_about_y(&system, system.star.body) > 0.0);
    }
}
