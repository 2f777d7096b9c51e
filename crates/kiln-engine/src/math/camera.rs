use glam::{Mat4, Vec3};

use super::transforms::perspective;

/// Camera orbiting a target point on a sphere.
///
/// `yaw` rotates around the world Y axis (0 looks down -Z toward the
/// target from +Z); `pitch` tilts toward the poles and is clamped short of
/// them so the up vector never degenerates.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    yaw: f32,
    pitch: f32,
    radius: f32,

    pub fov_y_radians: f32,
    aspect: f32,
    pub near: f32,
    pub far: f32,
}

/// Keep pitch off the poles and radius strictly positive.
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;
const MIN_RADIUS: f32 = 0.01;

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            radius: 3.0,
            fov_y_radians: 60f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl OrbitCamera {
    pub fn new(target: Vec3, radius: f32) -> Self {
        Self {
            target,
            radius: radius.max(MIN_RADIUS),
            ..Default::default()
        }
    }

    /// Camera position in world space.
    pub fn eye(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        let offset = Vec3::new(sy * cp, sp, cy * cp) * self.radius;
        self.target + offset
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        perspective(self.fov_y_radians, self.aspect, self.near, self.far)
    }

    /// Rotates the camera around the target.
    pub fn orbit(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw += yaw_delta;
        self.pitch = (self.pitch + pitch_delta).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Moves the camera toward (negative delta) or away from the target.
    pub fn zoom(&mut self, radius_delta: f32) {
        self.radius = (self.radius + radius_delta).max(MIN_RADIUS);
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Updates the projection aspect ratio. Call on resize.
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3Swizzles;

    #[test]
    fn eye_starts_on_positive_z() {
        let cam = OrbitCamera::new(Vec3::ZERO, 5.0);
        let eye = cam.eye();
        assert!((eye - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);
    }

    #[test]
    fn eye_keeps_radius_while_orbiting() {
        let mut cam = OrbitCamera::new(Vec3::new(1.0, 2.0, 3.0), 4.0);
        cam.orbit(1.3, 0.7);
        assert!(((cam.eye() - cam.target).length() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn pitch_is_clamped_short_of_the_poles() {
        let mut cam = OrbitCamera::default();
        cam.orbit(0.0, 100.0);
        let eye = cam.eye() - cam.target;
        // Still some horizontal component at the clamp.
        assert!(eye.xz().length() > 0.0);
    }

    #[test]
    fn zoom_never_reaches_zero_radius() {
        let mut cam = OrbitCamera::new(Vec3::ZERO, 1.0);
        cam.zoom(-10.0);
        assert!(cam.radius() > 0.0);
    }

    #[test]
    fn view_matrix_moves_eye_to_origin() {
        let mut cam = OrbitCamera::new(Vec3::new(0.5, -1.0, 2.0), 3.0);
        cam.orbit(0.4, -0.2);
        let v = cam.view_matrix();
        let eye_in_view = v.transform_point3(cam.eye());
        assert!(eye_in_view.length() < 1e-4);
    }

    #[test]
    fn target_sits_on_negative_view_z() {
        let cam = OrbitCamera::new(Vec3::ZERO, 2.0);
        let t = cam.view_matrix().transform_point3(cam.target);
        assert!((t.z + 2.0).abs() < 1e-4);
        assert!(t.x.abs() < 1e-4 && t.y.abs() < 1e-4);
    }

    #[test]
    fn invalid_aspect_is_ignored() {
        let mut cam = OrbitCamera::default();
        let before = cam.projection_matrix();
        cam.set_aspect(0.0);
        cam.set_aspect(f32::NAN);
        assert_eq!(before, cam.projection_matrix());
    }
}
