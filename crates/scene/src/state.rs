use crate::camera::OrbitCamera;
use crate::effect::EffectParameter;
use crate::grid::GRID_Y_OFFSET;
use glam::{Mat4, Vec3};
use meshview_common::ShaderVariant;
use meshview_input::MovementFlags;

/// Mesh spin in degrees per millisecond about +Y.
pub const ROTATION_SPEED: f32 = 0.05;

/// Shrinks the mesh to viewer scale; the negative Z flips its handedness.
const MODEL_SCALE: Vec3 = Vec3::new(0.01, 0.01, -0.01);
const FOV_DEGREES: f32 = 90.0;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 500.0;

/// Model, world and normal matrices for one draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectTransforms {
    pub model: Mat4,
    pub world: Mat4,
    /// `(camera * world * model)^-1^T`, for transforming normals.
    pub inverse_transpose: Mat4,
}

/// Every matrix a frame needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMatrices {
    pub camera: Mat4,
    pub projection: Mat4,
    pub mesh: ObjectTransforms,
    pub grid: ObjectTransforms,
}

/// All mutable viewer state, threaded through `advance` and `matrices`.
#[derive(Debug, Clone)]
pub struct SceneState {
    pub camera: OrbitCamera,
    pub effect: EffectParameter,
    model: Mat4,
    world: Mat4,
    grid_world: Mat4,
    aspect: f32,
}

impl SceneState {
    pub fn new(variant: ShaderVariant, initial_effect: f32) -> Self {
        Self {
            camera: OrbitCamera::default(),
            effect: EffectParameter::new(variant, initial_effect),
            model: Mat4::from_scale(MODEL_SCALE),
            world: Mat4::IDENTITY,
            grid_world: Mat4::from_translation(Vec3::new(0.0, GRID_Y_OFFSET, 0.0)),
            aspect: 1.0,
        }
    }

    /// Step the scene forward by `delta_ms`: spin the mesh and move the camera.
    pub fn advance(&mut self, delta_ms: f32, flags: &MovementFlags) {
        let degrees = ROTATION_SPEED * delta_ms;
        self.world = Mat4::from_rotation_y(degrees.to_radians()) * self.world;
        self.camera.advance(delta_ms, flags);
        tracing::trace!(
            delta_ms,
            angle = self.camera.angle,
            height = self.camera.height,
            distance = self.camera.distance,
            "scene advanced"
        );
    }

    /// Width over height of the render target. Non-positive or non-finite
    /// values are ignored.
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn model(&self) -> Mat4 {
        self.model
    }

    /// Accumulated mesh rotation.
    pub fn world(&self) -> Mat4 {
        self.world
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(FOV_DEGREES.to_radians(), self.aspect, Z_NEAR, Z_FAR)
    }

    pub fn camera_matrix(&self) -> Mat4 {
        self.camera.view_matrix()
    }

    pub fn matrices(&self) -> FrameMatrices {
        let camera = self.camera_matrix();
        FrameMatrices {
            camera,
            projection: self.projection(),
            mesh: ObjectTransforms {
                model: self.model,
                world: self.world,
                inverse_transpose: inverse_transpose(camera, self.world, self.model),
            },
            grid: ObjectTransforms {
                model: Mat4::IDENTITY,
                world: self.grid_world,
                inverse_transpose: inverse_transpose(camera, self.grid_world, Mat4::IDENTITY),
            },
        }
    }
}

/// Normal matrix for `camera * world * model`. A singular product yields
/// identity instead of a matrix full of infinities.
pub fn inverse_transpose(camera: Mat4, world: Mat4, model: Mat4) -> Mat4 {
    let m = camera * world * model;
    let det = m.determinant();
    if det == 0.0 || !det.is_finite() {
        tracing::warn!(det, "singular model-view matrix, using identity normal matrix");
        return Mat4::IDENTITY;
    }
    m.inverse().transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn still() -> MovementFlags {
        MovementFlags::default()
    }

    #[test]
    fn initial_state() {
        let scene = SceneState::new(ShaderVariant::Noisy, 0.0);
        assert_eq!(scene.world(), Mat4::IDENTITY);
        assert_eq!(scene.model(), Mat4::from_scale(Vec3::new(0.01, 0.01, -0.01)));
        assert!(scene.model().determinant() < 0.0);
        assert_eq!(scene.effect.label(), "Tile Size: 0.00");
    }

    #[test]
    fn rotation_accumulates() {
        let mut a = SceneState::new(ShaderVariant::Noisy, 0.0);
        let mut b = a.clone();
        a.advance(16.0, &still());
        a.advance(16.0, &still());
        b.advance(32.0, &still());
        assert!(a.world().abs_diff_eq(b.world(), 1e-5));

        let expected = Mat4::from_rotation_y((ROTATION_SPEED * 32.0).to_radians());
        assert!(b.world().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn rotation_is_relative_not_absolute() {
        let mut scene = SceneState::new(ShaderVariant::Noisy, 0.0);
        // 3600ms at 0.05 deg/ms is a half turn
        scene.advance(3600.0, &still());
        scene.advance(3600.0, &still());
        assert!(scene.world().abs_diff_eq(Mat4::IDENTITY, 1e-4));
    }

    #[test]
    fn grid_draw_uses_offset_world() {
        let scene = SceneState::new(ShaderVariant::Noisy, 0.0);
        let m = scene.matrices();
        assert_eq!(m.grid.model, Mat4::IDENTITY);
        let p = m.grid.world.transform_point3(Vec3::ZERO);
        assert_eq!(p, Vec3::new(0.0, GRID_Y_OFFSET, 0.0));
    }

    #[test]
    fn inverse_transpose_matches_definition() {
        let mut scene = SceneState::new(ShaderVariant::Noisy, 0.0);
        scene.advance(123.0, &still());
        let m = scene.matrices();
        let mv = m.camera * m.mesh.world * m.mesh.model;
        // (M^-1)^T * M^T == I
        let product = m.mesh.inverse_transpose * mv.transpose();
        assert!(product.abs_diff_eq(Mat4::IDENTITY, 1e-3));
    }

    #[test]
    fn singular_matrix_falls_back_to_identity() {
        let flat = Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(
            inverse_transpose(Mat4::IDENTITY, Mat4::IDENTITY, flat),
            Mat4::IDENTITY
        );
    }

    #[test]
    fn aspect_rejects_garbage() {
        let mut scene = SceneState::new(ShaderVariant::Noisy, 0.0);
        scene.set_aspect(0.0);
        scene.set_aspect(f32::NAN);
        assert_eq!(scene.aspect(), 1.0);
        scene.set_aspect(16.0 / 9.0);
        assert!((scene.aspect() - 16.0 / 9.0).abs() < 1e-6);
        assert!(!scene.projection().col(0).x.is_nan());
    }

    #[test]
    fn camera_moves_with_flags() {
        let mut scene = SceneState::new(ShaderVariant::Noisy, 0.0);
        let flags = MovementFlags {
            backward: true,
            ..Default::default()
        };
        scene.advance(100.0, &flags);
        assert!(scene.camera.distance > 1.5);
    }
}
