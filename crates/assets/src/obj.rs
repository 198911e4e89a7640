use crate::AssetError;
use meshview_common::MeshData;
use std::path::Path;

/// Normal used when a face without `vn` references is degenerate.
const FALLBACK_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];

#[derive(Debug, Clone, Copy)]
struct Corner {
    position: usize,
    normal: Option<usize>,
}

/// Read and parse an OBJ file.
pub fn load_obj(path: impl AsRef<Path>) -> Result<MeshData, AssetError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let mesh = parse_obj(&text)?;
    tracing::info!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "loaded mesh"
    );
    Ok(mesh)
}

/// Parse OBJ text into a triangle soup with one normal per vertex.
///
/// Supports `v`, `vn` and `f` (with `v`, `v/vt`, `v//vn` and `v/vt/vn`
/// corners, negative indices allowed). Polygons are fan-triangulated.
/// Corners without a normal reference get the flat face normal.
pub fn parse_obj(text: &str) -> Result<MeshData, AssetError> {
    let mut pos: Vec<[f32; 3]> = Vec::new();
    let mut nor: Vec<[f32; 3]> = Vec::new();
    let mut mesh = MeshData::default();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let s = line.trim();
        if s.is_empty() || s.starts_with('#') {
            continue;
        }
        let mut it = s.split_whitespace();
        let tag = it.next().unwrap_or("");
        match tag {
            "v" => pos.push(parse_vec3(&mut it, line_no)?),
            "vn" => nor.push(parse_vec3(&mut it, line_no)?),
            "f" => {
                let corners = it
                    .map(|tok| parse_corner(tok, pos.len(), nor.len(), line_no))
                    .collect::<Result<Vec<_>, _>>()?;
                if corners.len() < 3 {
                    return Err(AssetError::parse(
                        line_no,
                        "face has fewer than 3 vertices",
                    ));
                }
                for t in 1..corners.len() - 1 {
                    let tri = [corners[0], corners[t], corners[t + 1]];
                    let face_normal = face_normal(
                        pos[tri[0].position],
                        pos[tri[1].position],
                        pos[tri[2].position],
                    );
                    for corner in tri {
                        mesh.positions.extend_from_slice(&pos[corner.position]);
                        let n = corner.normal.map_or(face_normal, |i| nor[i]);
                        mesh.normals.extend_from_slice(&n);
                    }
                }
            }
            // vt, g, o, s, usemtl, mtllib: not needed for rendering
            _ => {}
        }
    }

    if mesh.is_empty() {
        return Err(AssetError::Empty);
    }
    Ok(mesh)
}

fn parse_vec3<'a>(
    it: &mut impl Iterator<Item = &'a str>,
    line_no: usize,
) -> Result<[f32; 3], AssetError> {
    let mut out = [0.0f32; 3];
    for slot in &mut out {
        let tok = it
            .next()
            .ok_or_else(|| AssetError::parse(line_no, "expected 3 coordinates"))?;
        *slot = tok
            .parse()
            .map_err(|_| AssetError::parse(line_no, format!("invalid number `{tok}`")))?;
    }
    Ok(out)
}

fn parse_corner(
    tok: &str,
    pos_len: usize,
    nor_len: usize,
    line_no: usize,
) -> Result<Corner, AssetError> {
    let mut parts = tok.split('/');
    let vi = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AssetError::parse(line_no, "face vertex missing position index"))?;
    let _texcoord = parts.next();
    let vni = parts.next().filter(|s| !s.is_empty());

    let position = resolve_index(vi, pos_len, line_no, "position")?;
    let normal = vni
        .map(|s| resolve_index(s, nor_len, line_no, "normal"))
        .transpose()?;
    Ok(Corner { position, normal })
}

/// OBJ indices are 1-based; negative values count back from the end.
fn resolve_index(
    tok: &str,
    len: usize,
    line_no: usize,
    kind: &str,
) -> Result<usize, AssetError> {
    let raw: i64 = tok
        .parse()
        .map_err(|_| AssetError::parse(line_no, format!("invalid {kind} index `{tok}`")))?;
    let resolved = if raw > 0 {
        raw - 1
    } else {
        len as i64 + raw
    };
    if raw == 0 || resolved < 0 || resolved >= len as i64 {
        return Err(AssetError::parse(
            line_no,
            format!("{kind} index {raw} out of bounds (1..={len})"),
        ));
    }
    Ok(resolved as usize)
}

fn face_normal(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> [f32; 3] {
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let n = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len > f32::EPSILON && len.is_finite() {
        [n[0] / len, n[1] / len, n[2] / len]
    } else {
        FALLBACK_NORMAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TRIANGLE: &str = "\
# one triangle
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
f 1//1 2//1 3//1
";

    #[test]
    fn single_triangle_with_normals() {
        let mesh = parse_obj(TRIANGLE).unwrap();
        assert_eq!(mesh.positions, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(mesh.normals, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn quad_is_fan_triangulated() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        // second triangle is (1, 3, 4)
        assert_eq!(&mesh.positions[9..12], &[0.0, 0.0, 0.0]);
        assert_eq!(&mesh.positions[12..15], &[1.0, 1.0, 0.0]);
        assert_eq!(&mesh.positions[15..18], &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn missing_normals_use_face_normal() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let mesh = parse_obj(text).unwrap();
        for n in mesh.normals.chunks_exact(3) {
            assert_eq!(n, &[0.0, 0.0, 1.0]);
        }
        assert_eq!(mesh.normals.len(), mesh.positions.len());
    }

    #[test]
    fn negative_indices_and_texcoords() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 0 -1\nvt 0 0\nvn 0 1 0\nf -3/1/-1 -2/1/-1 -1/1/-1\n";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(&mesh.normals[0..3], &[0.0, 1.0, 0.0]);
        assert_eq!(&mesh.positions[6..9], &[0.0, 0.0, -1.0]);
    }

    #[test]
    fn out_of_bounds_index_is_an_error() {
        let text = "v 0 0 0\nv 1 0 0\nf 1 2 3\n";
        let err = parse_obj(text).unwrap_err();
        assert!(matches!(err, AssetError::Parse { line: 3, .. }));
    }

    #[test]
    fn zero_index_is_an_error() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n";
        assert!(matches!(parse_obj(text), Err(AssetError::Parse { .. })));
    }

    #[test]
    fn bad_coordinate_is_an_error() {
        let err = parse_obj("v 0 zero 0\n").unwrap_err();
        assert!(err.to_string().contains("invalid number"));
    }

    #[test]
    fn short_face_is_an_error() {
        let text = "v 0 0 0\nv 1 0 0\nf 1 2\n";
        assert!(matches!(parse_obj(text), Err(AssetError::Parse { line: 3, .. })));
    }

    #[test]
    fn no_faces_is_empty() {
        assert!(matches!(parse_obj("v 0 0 0\n"), Err(AssetError::Empty)));
        assert!(matches!(parse_obj(""), Err(AssetError::Empty)));
    }

    #[test]
    fn load_from_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(TRIANGLE.as_bytes()).unwrap();
        let mesh = load_obj(tmp.path()).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn load_missing_file() {
        assert!(matches!(
            load_obj("/nonexistent/teapot.obj"),
            Err(AssetError::Io(_))
        ));
    }

    #[test]
    fn bundled_cube() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../resources/cube.obj");
        let mesh = load_obj(path).unwrap();
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.bounds(), Some(([-50.0; 3], [50.0; 3])));
    }
}
