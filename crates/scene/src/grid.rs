/// Half-extent of the grid along X.
pub const GRID_X_RANGE: f32 = 100.0;
/// Half-extent of the grid along Z.
pub const GRID_Z_RANGE: f32 = 100.0;
/// Vertical offset applied to the grid through its world matrix.
pub const GRID_Y_OFFSET: f32 = -2.0;
/// Upper bound on grid vertices. The default grid has 800.
pub const MAX_GRID_VERTICES: u64 = 1 << 22;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GridError {
    #[error("grid spacing must be positive and finite, got {0}")]
    InvalidSpacing(f32),
    #[error("grid extent must be non-negative and finite, got {0}")]
    InvalidExtent(f32),
    #[error("grid spacing is too fine: {vertices} vertices exceeds the limit of {max}")]
    TooDense { vertices: u64, max: u64 },
}

/// Build the default ground grid as a flat line list.
pub fn build_grid(row_spacing: f32, col_spacing: f32) -> Result<Vec<f32>, GridError> {
    build_grid_with_extent(GRID_X_RANGE, GRID_Z_RANGE, row_spacing, col_spacing)
}

/// Build a grid spanning `[-x_range, x_range] × [-z_range, z_range]` on y = 0.
///
/// Lines along Z come first (one per `row_spacing` step in X), then lines
/// along X (one per `col_spacing` step in Z). Each line is two 3-float
/// vertices. Steps start at the negative edge and stop before the positive
/// edge, so the far edge line itself is not emitted.
pub fn build_grid_with_extent(
    x_range: f32,
    z_range: f32,
    row_spacing: f32,
    col_spacing: f32,
) -> Result<Vec<f32>, GridError> {
    for spacing in [row_spacing, col_spacing] {
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(GridError::InvalidSpacing(spacing));
        }
    }
    for range in [x_range, z_range] {
        if !(range.is_finite() && range >= 0.0) {
            return Err(GridError::InvalidExtent(range));
        }
    }

    let rows = line_bound(x_range, row_spacing);
    let cols = line_bound(z_range, col_spacing);
    let vertices = rows.saturating_add(cols).saturating_mul(2);
    if vertices > MAX_GRID_VERTICES {
        return Err(GridError::TooDense {
            vertices,
            max: MAX_GRID_VERTICES,
        });
    }

    let mut mesh = Vec::with_capacity(vertices as usize * 3);

    for x in steps(x_range, row_spacing, rows) {
        mesh.extend_from_slice(&[x, 0.0, -z_range]);
        mesh.extend_from_slice(&[x, 0.0, z_range]);
    }
    for z in steps(z_range, col_spacing, cols) {
        mesh.extend_from_slice(&[-x_range, 0.0, z]);
        mesh.extend_from_slice(&[x_range, 0.0, z]);
    }

    tracing::debug!(
        x_range,
        z_range,
        row_spacing,
        col_spacing,
        vertices = mesh.len() / 3,
        "built grid"
    );
    Ok(mesh)
}

/// Lines emitted across `[-range, range)`, rounded up by one so float
/// rounding in `steps` never hits the bound first.
fn line_bound(range: f32, spacing: f32) -> u64 {
    // the float-to-int cast saturates, so huge ratios land above the cap
    ((2.0 * f64::from(range) / f64::from(spacing)).ceil() as u64).saturating_add(1)
}

/// `-range, -range + spacing, ...` while below `range`, at most `bound`
/// steps. Positions are `start + i * spacing` so error does not accumulate.
fn steps(range: f32, spacing: f32, bound: u64) -> impl Iterator<Item = f32> {
    (0..bound)
        .map(move |i| -range + i as f32 * spacing)
        .take_while(move |v| *v < range)
}
