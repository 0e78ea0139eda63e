//! First-person camera.

use engine_core::Transform;
use glam::{Mat4, Quat, Vec3};

const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// FPS camera with configurable FOV and clipping planes.
///
/// Orientation is yaw about +Y followed by pitch about the local X axis;
/// at zero yaw and pitch the camera looks down -Z.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera transform (position and rotation).
    pub transform: Transform,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Aspect ratio (width / height).
    pub aspect: f32,
    /// Radians of rotation per pixel of mouse motion.
    pub sensitivity: f32,
    pitch: f32,
    yaw: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            transform: Transform::default(),
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            aspect: 4.0 / 3.0,
            sensitivity: 0.002,
            pitch: 0.0,
            yaw: 0.0,
        }
    }
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        Self {
            transform: Transform::from_position(position),
            ..Default::default()
        }
    }

    /// Update aspect ratio (call on window resize).
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Mouse look. Moving the mouse right turns right, moving it up looks up.
    pub fn process_mouse(&mut self, delta_x: f32, delta_y: f32) {
        self.set_yaw_pitch(
            self.yaw - delta_x * self.sensitivity,
            self.pitch - delta_y * self.sensitivity,
        );
    }

    /// Set yaw and pitch directly (in radians) and rebuild rotation. Pitch is clamped.
    pub fn set_yaw_pitch(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-MAX_PITCH, MAX_PITCH);
        self.transform.rotation = Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch);
    }

    /// Rotate a vector given in the camera's horizontal frame (x = right, z = back)
    /// into world space, ignoring pitch.
    pub fn horizontal_to_world(&self, local: Vec3) -> Vec3 {
        Quat::from_rotation_y(self.yaw) * local
    }

    pub fn view_matrix(&self) -> Mat4 {
        let eye = self.transform.position;
        Mat4::look_at_rh(eye, eye + self.transform.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
    }

    pub fn forward(&self) -> Vec3 {
        self.transform.forward()
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_looks_down_negative_z() {
        let camera = Camera::default();
        assert!((camera.forward() - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = Camera::default();
        camera.set_yaw_pitch(0.0, 10.0);
        assert!(camera.pitch() < std::f32::consts::FRAC_PI_2);
        assert!(camera.forward().y > 0.99);
    }

    #[test]
    fn mouse_right_turns_right() {
        let mut camera = Camera::default();
        camera.process_mouse(100.0, 0.0);
        // Looking down -Z, right is +X.
        assert!(camera.forward().x > 0.0);
    }

    #[test]
    fn horizontal_frame_follows_yaw_only() {
        let mut camera = Camera::default();
        camera.set_yaw_pitch(std::f32::consts::FRAC_PI_2, 0.5);
        let world = camera.horizontal_to_world(Vec3::NEG_Z);
        assert!((world - Vec3::NEG_X).length() < 1e-5);
        assert!(world.y.abs() < 1e-6);
    }
}
