//! Wavefront OBJ reader
//!
//! Only geometry is read: `v` positions and `f` faces. Texture coordinates,
//! normals, groups and materials are skipped. Polygons are fan-triangulated.

use cgmath::Point3;
use std::path::Path;

use super::TriangleMesh;
use crate::error::{GalleryError, Result};

/// Parse OBJ text. `path` is only used in error messages.
pub fn parse(contents: &str, path: &Path) -> Result<TriangleMesh> {
    let mut vertices: Vec<Point3<f32>> = Vec::new();
    let mut faces: Vec<[usize; 3]> = Vec::new();

    for (line_num, line) in contents.lines().enumerate() {
        let line_num = line_num + 1;
        let error = |message: String| GalleryError::MeshParse {
            path: path.to_path_buf(),
            line: line_num,
            message,
        };

        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => {
                let coords: Vec<f32> = parts
                    .take(3)
                    .map(|p| p.parse::<f32>())
                    .collect::<std::result::Result<_, _>>()
                    .map_err(|e| error(format!("invalid vertex coordinate: {}", e)))?;
                if coords.len() < 3 {
                    return Err(error("vertex needs 3 coordinates".to_string()));
                }
                vertices.push(Point3::new(coords[0], coords[1], coords[2]));
            }
            Some("f") => {
                let corners: Vec<usize> = parts
                    .map(|token| resolve_index(token, vertices.len()).map_err(&error))
                    .collect::<Result<_>>()?;
                if corners.len() < 3 {
                    return Err(error("face needs at least 3 vertices".to_string()));
                }
                for i in 1..corners.len() - 1 {
                    faces.push([corners[0], corners[i], corners[i + 1]]);
                }
            }
            _ => {}
        }
    }

    Ok(TriangleMesh::new(vertices, faces))
}

/// Turn a face corner like `7`, `7/2`, `7//3` or `-1` into a zero-based vertex index
fn resolve_index(token: &str, vertex_count: usize) -> std::result::Result<usize, String> {
    let raw = token.split('/').next().unwrap_or_default();
    let index: i64 = raw
        .parse()
        .map_err(|_| format!("invalid face index '{}'", token))?;

    let resolved = match index {
        0 => None,
        i if i > 0 => Some(i as usize - 1),
        // Negative indices count back from the most recent vertex
        i => vertex_count.checked_sub(i.unsigned_abs() as usize),
    };

    match resolved {
        Some(i) if i < vertex_count => Ok(i),
        _ => Err(format!(
            "face index {} out of range ({} vertices so far)",
            index, vertex_count
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(text: &str) -> Result<TriangleMesh> {
        parse(text, Path::new("test.obj"))
    }

    #[test]
    fn test_triangle_with_attributes() {
        let mesh = parse_str(
            "# tri\no tri\nv 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\nusemtl x\nf 1/1/1 2/1/1 3//1\n",
        )
        .unwrap();

        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
    }

    #[test]
    fn test_quad_is_fan_triangulated() {
        let mesh = parse_str("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n").unwrap();
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_negative_indices() {
        let mesh = parse_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n").unwrap();
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let err = parse_str("v 0 0 0\nv 1 0 0\nf 1 2 5\n").unwrap_err();
        match err {
            GalleryError::MeshParse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }

        assert!(parse_str("v 0 zero 0\n").is_err());
        assert!(parse_str("v 0 0\n").is_err());
        assert!(parse_str("v 0 0 0\nv 1 1 1\nf 1 2\n").is_err());
    }
}
