use glam::{Mat4, Vec3};
use meshview_input::MovementFlags;

/// Height and distance change per millisecond while a key is held.
pub const CAMERA_SPEED: f32 = 0.003;
/// Orbit angle change in degrees per millisecond while a key is held.
pub const CAMERA_ROT_SPEED: f32 = 0.1;
/// Closest the camera may get to the origin.
pub const MIN_DISTANCE: f32 = 1.0;

/// Camera orbiting the origin on a circle, always looking at the origin.
///
/// `height` is mixed into the direction before normalization, so raising
/// the camera also pulls it in horizontally. `distance` is the length of the
/// final eye vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    /// Degrees, unbounded.
    pub angle: f32,
    pub height: f32,
    pub distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            angle: 90.0,
            height: 0.2,
            distance: 1.5,
        }
    }
}

impl OrbitCamera {
    pub fn new(angle: f32, height: f32, distance: f32) -> Self {
        Self {
            angle,
            height,
            distance: distance.max(MIN_DISTANCE),
        }
    }

    /// Move according to held keys over `delta_ms` milliseconds.
    pub fn advance(&mut self, delta_ms: f32, flags: &MovementFlags) {
        let step = CAMERA_SPEED * delta_ms;
        let turn = CAMERA_ROT_SPEED * delta_ms;

        if flags.up {
            self.height += step;
        }
        if flags.down {
            self.height -= step;
        }
        if flags.left {
            self.angle += turn;
        }
        if flags.right {
            self.angle -= turn;
        }
        if flags.forward {
            // forward is toward the origin
            self.distance -= step;
            self.distance = self.distance.max(MIN_DISTANCE);
        }
        if flags.backward {
            self.distance += step;
        }
    }

    /// Unit vector from the origin toward the eye. Falls back to `+Z` when
    /// the raw direction cannot be normalized.
    pub fn direction(&self) -> Vec3 {
        let radians = self.angle.to_radians();
        Vec3::new(radians.cos(), self.height, radians.sin())
            .try_normalize()
            .unwrap_or(Vec3::Z)
    }

    pub fn eye(&self) -> Vec3 {
        self.direction() * self.distance
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), Vec3::ZERO, Vec3::Y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(f: impl FnOnce(&mut MovementFlags)) -> MovementFlags {
        let mut flags = MovementFlags::new();
        f(&mut flags);
        flags
    }

    #[test]
    fn default_camera() {
        let cam = OrbitCamera::default();
        assert_eq!(cam.angle, 90.0);
        assert_eq!(cam.distance, 1.5);
        let view = cam.view_matrix();
        assert!(!view.col(0).x.is_nan());
        assert!((cam.eye().length() - 1.5).abs() < 1e-5);
    }

    #[test]
    fn eye_at_ninety_degrees() {
        let cam = OrbitCamera::new(90.0, 0.0, 1.0);
        assert!(cam.eye().abs_diff_eq(Vec3::new(0.0, 0.0, 1.0), 1e-6));

        let expected = Mat4::from_translation(Vec3::new(0.0, 0.0, -1.0));
        assert!(cam.view_matrix().abs_diff_eq(expected, 1e-5));
        // origin ends up straight ahead of the camera
        let origin_in_view = cam.view_matrix().transform_point3(Vec3::ZERO);
        assert!(origin_in_view.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5));
    }

    #[test]
    fn height_shrinks_horizontal_radius() {
        let low = OrbitCamera::new(0.0, 0.0, 2.0);
        let high = OrbitCamera::new(0.0, 1.0, 2.0);
        assert!((low.eye().length() - high.eye().length()).abs() < 1e-5);
        assert!(high.eye().x < low.eye().x);
        assert!(high.eye().y > 0.0);
    }

    #[test]
    fn forward_clamps_to_min_distance() {
        let mut cam = OrbitCamera::default();
        let flags = held(|f| f.forward = true);
        for _ in 0..100 {
            cam.advance(50.0, &flags);
            assert!(cam.distance >= MIN_DISTANCE);
        }
        assert_eq!(cam.distance, MIN_DISTANCE);
    }

    #[test]
    fn backward_moves_away() {
        let mut cam = OrbitCamera::default();
        cam.advance(100.0, &held(|f| f.backward = true));
        assert!((cam.distance - (1.5 + CAMERA_SPEED * 100.0)).abs() < 1e-6);
    }

    #[test]
    fn opposing_keys_cancel() {
        let mut cam = OrbitCamera::default();
        let start = cam;
        cam.advance(
            16.0,
            &held(|f| {
                f.up = true;
                f.down = true;
                f.left = true;
                f.right = true;
            }),
        );
        assert!((cam.height - start.height).abs() < 1e-6);
        assert!((cam.angle - start.angle).abs() < 1e-4);
    }

    #[test]
    fn left_increases_angle() {
        let mut cam = OrbitCamera::default();
        cam.advance(10.0, &held(|f| f.left = true));
        assert!((cam.angle - 91.0).abs() < 1e-4);
        cam.advance(20.0, &held(|f| f.right = true));
        assert!((cam.angle - 89.0).abs() < 1e-4);
    }

    #[test]
    fn no_keys_no_motion() {
        let mut cam = OrbitCamera::default();
        cam.advance(1000.0, &MovementFlags::default());
        assert_eq!(cam, OrbitCamera::default());
    }

    #[test]
    fn degenerate_direction_falls_back_to_z() {
        let cam = OrbitCamera::new(0.0, f32::INFINITY, 1.0);
        assert_eq!(cam.direction(), Vec3::Z);
        let cam = OrbitCamera::new(f32::NAN, 0.0, 1.0);
        assert_eq!(cam.direction(), Vec3::Z);
    }
}
