use glam::{Mat4, Vec3};

use crate::render::shader_types::Uniforms;
use crate::time::FrameTime;

use super::OrbitCamera;

/// Translation matrix.
#[inline]
pub fn translation(offset: Vec3) -> Mat4 {
    Mat4::from_translation(offset)
}

/// Uniform scale matrix.
///
/// Only uniform scale is offered on purpose: the shaders transform normals
/// with the model matrix directly, which is wrong under non-uniform scale.
#[inline]
pub fn scaling(scale: f32) -> Mat4 {
    Mat4::from_scale(Vec3::splat(scale))
}

/// Rotation of `angle` radians around `axis` (normalized here).
#[inline]
pub fn rotation(angle: f32, axis: Vec3) -> Mat4 {
    Mat4::from_axis_angle(axis.normalize_or(Vec3::Y), angle)
}

/// Right-handed perspective projection with 0..1 clip-space depth.
#[inline]
pub fn perspective(fov_y_radians: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh(fov_y_radians, aspect, near, far)
}

/// Assembles the per-draw uniform block.
///
/// `texture_size` is left at its default; `MeshRenderer` overwrites it with
/// the actually-bound texture's size.
pub fn build_uniforms(
    camera: &OrbitCamera,
    model: Mat4,
    light_direction: Vec3,
    light_color: [f32; 4],
    time: FrameTime,
) -> Uniforms {
    let dir = light_direction.normalize_or(Vec3::NEG_Y);
    Uniforms {
        model: model.to_cols_array_2d(),
        view: camera.view_matrix().to_cols_array_2d(),
        projection: camera.projection_matrix().to_cols_array_2d(),
        light_direction: [dir.x, dir.y, dir.z, 0.0],
        light_color,
        time: [time.elapsed, time.dt, 0.0, 0.0],
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};

    fn close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-5, "{a:?} != {b:?}");
    }

    #[test]
    fn translation_moves_points() {
        let m = translation(Vec3::new(1.0, 2.0, 3.0));
        close(m.transform_point3(Vec3::ZERO), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn scaling_is_uniform() {
        let m = scaling(2.0);
        close(m.transform_point3(Vec3::ONE), Vec3::splat(2.0));
    }

    #[test]
    fn rotation_quarter_turn_about_z() {
        let m = rotation(std::f32::consts::FRAC_PI_2, Vec3::Z);
        close(m.transform_vector3(Vec3::X), Vec3::Y);
    }

    #[test]
    fn rotation_normalizes_axis() {
        let a = rotation(1.0, Vec3::new(0.0, 10.0, 0.0));
        let b = rotation(1.0, Vec3::Y);
        assert!((a.to_cols_array()
            .iter()
            .zip(b.to_cols_array())
            .map(|(x, y)| (x - y).abs())
            .fold(0.0f32, f32::max))
            < 1e-6);
    }

    #[test]
    fn perspective_maps_near_and_far_to_unit_depth() {
        let near = 0.1;
        let far = 100.0;
        let m = perspective(60f32.to_radians(), 16.0 / 9.0, near, far);

        // A point on the -Z axis at the near plane lands at depth 0 after
        // the perspective divide; at the far plane, depth 1.
        let at_near = m * Vec4::new(0.0, 0.0, -near, 1.0);
        let at_far = m * Vec4::new(0.0, 0.0, -far, 1.0);
        assert!((at_near.z / at_near.w).abs() < 1e-5);
        assert!((at_far.z / at_far.w - 1.0).abs() < 1e-5);
    }

    #[test]
    fn perspective_w_is_negated_view_z() {
        let m = perspective(60f32.to_radians(), 1.0, 0.1, 100.0);
        let clip = m * Vec4::new(0.0, 0.0, -5.0, 1.0);
        assert!((clip.w - 5.0).abs() < 1e-5);
    }
}
