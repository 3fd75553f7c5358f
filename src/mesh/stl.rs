//! STL reader (binary and ASCII)
//!
//! Binary files are recognised by their size covering the triangle count in the
//! header; everything else is parsed as ASCII `facet`/`vertex` text. Each STL
//! triangle gets its own three vertices.

use cgmath::Point3;
use std::path::Path;

use super::TriangleMesh;
use crate::error::{GalleryError, Result};

const HEADER_LEN: usize = 80;
const TRIANGLE_LEN: usize = 50;

pub fn parse(bytes: &[u8], path: &Path) -> Result<TriangleMesh> {
    if let Some(count) = binary_triangle_count(bytes) {
        Ok(parse_binary(bytes, count))
    } else {
        parse_ascii(&String::from_utf8_lossy(bytes), path)
    }
}

/// Triangle count if `bytes` reads as a binary STL.
///
/// An exact size match is always binary, even when the header starts with
/// `solid`. Longer files (trailing padding) count as binary unless they look
/// like ASCII `solid ... facet` text.
fn binary_triangle_count(bytes: &[u8]) -> Option<usize> {
    let count_bytes: [u8; 4] = bytes.get(HEADER_LEN..HEADER_LEN + 4)?.try_into().ok()?;
    let count = u32::from_le_bytes(count_bytes) as usize;
    let expected = count
        .checked_mul(TRIANGLE_LEN)?
        .checked_add(HEADER_LEN + 4)?;

    if bytes.len() == expected || (bytes.len() > expected && !looks_ascii(bytes)) {
        Some(count)
    } else {
        None
    }
}

fn looks_ascii(bytes: &[u8]) -> bool {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    bytes[start..].starts_with(b"solid") && bytes.windows(5).any(|w| w == b"facet")
}

fn parse_binary(bytes: &[u8], count: usize) -> TriangleMesh {
    let mut vertices = Vec::with_capacity(count * 3);
    let mut faces = Vec::with_capacity(count);

    let read_f32 = |offset: usize| {
        f32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ])
    };

    for t in 0..count {
        // Skip the 12-byte facet normal; it is recomputed from the corners
        let base = HEADER_LEN + 4 + t * TRIANGLE_LEN + 12;
        let first = vertices.len();
        for corner in 0..3 {
            let offset = base + corner * 12;
            vertices.push(Point3::new(
                read_f32(offset),
                read_f32(offset + 4),
                read_f32(offset + 8),
            ));
        }
        faces.push([first, first + 1, first + 2]);
    }

    TriangleMesh::new(vertices, faces)
}

fn parse_ascii(contents: &str, path: &Path) -> Result<TriangleMesh> {
    let mut vertices: Vec<Point3<f32>> = Vec::new();

    for (line_num, line) in contents.lines().enumerate() {
        let mut parts = line.split_whitespace();
        if parts.next() != Some("vertex") {
            continue;
        }

        let coords: Vec<f32> = parts
            .take(3)
            .map(|p| p.parse::<f32>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| GalleryError::MeshParse {
                path: path.to_path_buf(),
                line: line_num + 1,
                message: format!("invalid vertex coordinate: {}", e),
            })?;
        if coords.len() < 3 {
            return Err(GalleryError::MeshParse {
                path: path.to_path_buf(),
                line: line_num + 1,
                message: "vertex needs 3 coordinates".to_string(),
            });
        }
        vertices.push(Point3::new(coords[0], coords[1], coords[2]));
    }

    if vertices.len() % 3 != 0 {
        return Err(GalleryError::MeshParse {
            path: path.to_path_buf(),
            line: contents.lines().count(),
            message: format!("{} vertices do not form whole triangles", vertices.len()),
        });
    }

    let faces = (0..vertices.len() / 3)
        .map(|t| [t * 3, t * 3 + 1, t * 3 + 2])
        .collect();
    Ok(TriangleMesh::new(vertices, faces))
}
