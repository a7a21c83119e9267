//! Camera targeting: free orbit around the star, locked follow of a body, and
//! the cinematic sweep that can override either.
//!
//! Targeting and the cinematic flag are independent. The rig keeps a
//! targeting pose that is always updated, and derives the drawn camera from
//! either that pose or the sweep each frame.

use glam::Vec3;
use orrery_scene::{Camera, SolarSystem};

use crate::input::InputIgnored;

/// What the camera is following.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum CameraTarget {
    #[default]
    Free,
    Locked(String),
}

/// Pose defaults and sweep parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraSettings {
    pub home_position: Vec3,
    pub home_focus: Vec3,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Offset from a locked body, in units of the body's rendered radius.
    pub lock_offset: Vec3,
    pub sweep_radius: f32,
    /// Peak height of the sweep above the orbital plane.
    pub sweep_height: f32,
    /// Angular speed of the sweep in radians per second.
    pub sweep_rate: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            home_position: Vec3::new(0.0, 30.0, 150.0),
            home_focus: Vec3::ZERO,
            fov_degrees: 75.0,
            near: 0.1,
            far: 100_000.0,
            lock_offset: Vec3::new(0.0, 1.5, 6.0),
            sweep_radius: 250.0,
            sweep_height: 60.0,
            sweep_rate: 0.1,
        }
    }
}

/// The camera state machine.
#[derive(Clone, Debug)]
pub struct CameraRig {
    settings: CameraSettings,
    target: CameraTarget,
    /// Point the targeting pose looks at.
    focus: Vec3,
    /// Pose driven by targeting alone.
    pose: Camera,
    /// Camera handed to the renderer this frame.
    view: Camera,
}

impl CameraRig {
    pub fn new(settings: CameraSettings, width: u32, height: u32) -> Self {
        let mut pose = Camera {
            fov_y: settings.fov_degrees.to_radians(),
            near: settings.near,
            far: settings.far,
            ..Camera::default()
        };
        pose.set_aspect_ratio(width as f32, height as f32);
        pose.look_at(settings.home_position, settings.home_focus);
        Self {
            focus: settings.home_focus,
            target: CameraTarget::Free,
            view: pose.clone(),
            pose,
            settings,
        }
    }

    pub fn target(&self) -> &CameraTarget {
        &self.target
    }

    /// The camera to draw with.
    pub fn camera(&self) -> &Camera {
        &self.view
    }

    /// The targeting pose underneath any cinematic override.
    pub fn pose(&self) -> &Camera {
        &self.pose
    }

    pub fn focus(&self) -> Vec3 {
        self.focus
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// Lock onto `name` and jump to the lock offset around it.
    pub fn select(&mut self, name: &str, system: &SolarSystem) -> Result<(), InputIgnored> {
        let entity = system
            .entity(name)
            .ok_or_else(|| InputIgnored::UnknownBody(name.to_string()))?;
        let center = system.graph.world_position(entity.body);
        let eye = center + self.settings.lock_offset * entity.radius;
        self.pose.look_at(eye, center);
        self.focus = center;
        self.target = CameraTarget::Locked(entity.name.clone());
        tracing::info!("Camera locked on {}", entity.name);
        Ok(())
    }

    /// Return to the free state and the home pose.
    pub fn reset(&mut self) {
        self.target = CameraTarget::Free;
        self.focus = self.settings.home_focus;
        self.pose
            .look_at(self.settings.home_position, self.settings.home_focus);
        self.view = self.pose.clone();
        tracing::info!("Camera reset");
    }

    /// Follow the locked body, then pick the drawn camera.
    ///
    /// `time` is elapsed wall-clock seconds and only drives the sweep.
    pub fn update(&mut self, system: &SolarSystem, cinematic: bool, time: f64) {
        if let CameraTarget::Locked(name) = &self.target
            && let Some(center) = system.body_world_position(name)
        {
            self.pose.position += center - self.focus;
            self.focus = center;
            self.pose.rotation = Camera::look_rotation(self.pose.position, center, Vec3::Y);
        }

        self.view.clone_from(&self.pose);
        if cinematic {
            self.view.look_at(self.sweep_position(time), Vec3::ZERO);
        }
    }

    /// Eye position of the cinematic sweep at `time` seconds.
    pub fn sweep_position(&self, time: f64) -> Vec3 {
        let angle = (f64::from(self.settings.sweep_rate) * time) as f32;
        Vec3::new(
            self.settings.sweep_radius * angle.cos(),
            self.settings.sweep_height * (0.5 * angle).sin(),
            self.settings.sweep_radius * angle.sin(),
        )
    }

    /// Recompute the projection aspect. Zero-area sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let (w, h) = (width as f32, height as f32);
        self.pose.set_aspect_ratio(w, h) && self.view.set_aspect_ratio(w, h)
    }
}
