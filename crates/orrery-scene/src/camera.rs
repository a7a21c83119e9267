//! Camera pose and projection handed to the renderer.

use glam::{Mat3, Mat4, Quat, Vec3};

/// A perspective camera.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// World-space position.
    pub position: Vec3,
    /// Rotation as a unit quaternion; the camera looks down its local -Z.
    pub rotation: Quat,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    /// Near clip plane distance (always positive).
    pub near: f32,
    /// Far clip plane distance (always positive, > near).
    pub far: f32,
}

impl Camera {
    /// Rotation that points local -Z from `eye` toward `target` with +Y kept up.
    ///
    /// Falls back to the shortest arc when the view direction is parallel to
    /// `up`, and to identity when `eye == target`.
    pub fn look_rotation(eye: Vec3, target: Vec3, up: Vec3) -> Quat {
        let forward = (target - eye).normalize_or_zero();
        if forward == Vec3::ZERO {
            return Quat::IDENTITY;
        }
        let right = forward.cross(up);
        if right.length_squared() < 1e-12 {
            return Quat::from_rotation_arc(Vec3::NEG_Z, forward);
        }
        let right = right.normalize();
        let true_up = right.cross(forward);
        Quat::from_mat3(&Mat3::from_cols(right, true_up, -forward)).normalize()
    }

    /// Move to `eye` and face `target`.
    pub fn look_at(&mut self, eye: Vec3, target: Vec3) {
        self.position = eye;
        self.rotation = Self::look_rotation(eye, target, Vec3::Y);
    }

    /// View matrix (inverse of the camera transform).
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// The forward direction vector (-Z in camera space).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Update the aspect ratio. Zero-height surfaces are ignored.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) -> bool {
        if height <= 0.0 || width <= 0.0 {
            return false;
        }
        self.aspect_ratio = width / height;
        true
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            fov_y: 75f32.to_radians(),
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
            far: 100_000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_camera_looks_down_neg_z() {
        let forward = Camera::default().forward();
        assert!((forward - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_look_at_faces_target() {
        let mut camera = Camera::default();
        camera.look_at(Vec3::new(0.0, 30.0, 150.0), Vec3::ZERO);
        let expected = (Vec3::ZERO - camera.position).normalize();
        assert!((camera.forward() - expected).length() < 1e-5);
        // Up stays on the +Y side.
        assert!((camera.rotation * Vec3::Y).y > 0.0);
    }

    #[test]
    fn test_look_straight_down_does_not_nan() {
        let rotation = Camera::look_rotation(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO, Vec3::Y);
        assert!(rotation.is_finite());
        assert!(((rotation * Vec3::NEG_Z) - Vec3::NEG_Y).length() < 1e-5);
    }

    #[test]
    fn test_aspect_ratio_update() {
        let mut camera = Camera::default();
        assert!(camera.set_aspect_ratio(1920.0, 1080.0));
        assert!((camera.aspect_ratio - 16.0 / 9.0).abs() < 1e-6);
        assert!(!camera.set_aspect_ratio(800.0, 0.0));
        assert!((camera.aspect_ratio - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_view_matrix_inverse_is_camera_transform() {
        let mut camera = Camera::default();
        camera.look_at(Vec3::new(10.0, 20.0, 30.0), Vec3::ZERO);
        let reconstructed = camera.view_matrix().inverse().col(3).truncate();
        assert!((reconstructed - camera.position).length() < 1e-4);
    }
}
