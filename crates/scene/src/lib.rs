//! Scene state for the mesh viewer: camera, transforms, grid, effect value.
//!
//! # Invariants
//! - All mutable state lives in `SceneState`; there are no globals.
//! - World rotation is cumulative: each advance pre-multiplies a new rotation.
//! - Camera distance never drops below `MIN_DISTANCE`.

pub mod camera;
pub mod effect;
pub mod grid;
pub mod state;

pub use camera::{CAMERA_ROT_SPEED, CAMERA_SPEED, MIN_DISTANCE, OrbitCamera};
pub use effect::EffectParameter;
pub use grid::{
    GRID_X_RANGE, GRID_Y_OFFSET, GRID_Z_RANGE, GridError, MAX_GRID_VERTICES, build_grid,
    build_grid_with_extent,
};
pub use state::{FrameMatrices, ObjectTransforms, ROTATION_SPEED, SceneState, inverse_transpose};
