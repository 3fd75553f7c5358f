/// Mesh loading module
///
/// This module handles:
/// - Picking a reader from the file extension (`MeshFormat`)
/// - Parsing Wavefront OBJ text (obj.rs)
/// - Parsing ASCII and binary STL (stl.rs)
/// - The triangle soup both readers produce and its bounding box
use cgmath::{EuclideanSpace, InnerSpace, Point3, Vector3};
use std::fs;
use std::path::Path;

use crate::error::{GalleryError, Result};

pub mod obj;
pub mod stl;

/// Indexed triangle mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3<f32>>,
    pub faces: Vec<[usize; 3]>,
}

impl TriangleMesh {
    pub fn new(vertices: Vec<Point3<f32>>, faces: Vec<[usize; 3]>) -> Self {
        Self { vertices, faces }
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Corner positions of one face
    pub fn triangle(&self, face: &[usize; 3]) -> [Point3<f32>; 3] {
        [
            self.vertices[face[0]],
            self.vertices[face[1]],
            self.vertices[face[2]],
        ]
    }

    /// Axis-aligned bounds of the vertices actually referenced by faces
    pub fn bounds(&self) -> Option<Bounds> {
        let mut points = self.faces.iter().flatten().map(|&i| self.vertices[i]);
        let first = points.next()?;
        Some(points.fold(Bounds::point(first), |b, p| b.including(p)))
    }
}

/// Unit normal of a counter-clockwise triangle, or zero for degenerate ones
pub fn face_normal(tri: &[Point3<f32>; 3]) -> Vector3<f32> {
    let n = (tri[1] - tri[0]).cross(tri[2] - tri[0]);
    let len = n.magnitude();
    if len > f32::EPSILON {
        n / len
    } else {
        Vector3::new(0.0, 0.0, 0.0)
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Bounds {
    fn point(p: Point3<f32>) -> Self {
        Self { min: p, max: p }
    }

    fn including(self, p: Point3<f32>) -> Self {
        Self {
            min: Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z)),
            max: Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z)),
        }
    }

    pub fn center(&self) -> Point3<f32> {
        self.min.midpoint(self.max)
    }

    /// Radius of the sphere through the box corners
    pub fn radius(&self) -> f32 {
        (self.max - self.min).magnitude() * 0.5
    }
}

/// Reader strategy chosen once per file from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Obj,
    Stl,
    Unsupported,
}

impl MeshFormat {
    /// Extensions offered in the file picker
    pub const EXTENSIONS: [&'static str; 2] = ["obj", "stl"];

    /// Case-insensitive extension lookup
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "obj" => MeshFormat::Obj,
            "stl" => MeshFormat::Stl,
            _ => MeshFormat::Unsupported,
        }
    }
}

/// Load a mesh, picking the reader from the file extension.
///
/// Unsupported extensions are reported as `UnsupportedFormat` rather than
/// producing an empty mesh, so callers can show why no preview appeared.
pub fn load_mesh(path: &Path) -> Result<TriangleMesh> {
    let format = MeshFormat::from_path(path);
    if format == MeshFormat::Unsupported {
        return Err(GalleryError::UnsupportedFormat {
            path: path.to_path_buf(),
        });
    }

    let bytes = fs::read(path)
        .map_err(|e| GalleryError::io(format!("failed to read {}", path.display()), e))?;

    let mesh = match format {
        MeshFormat::Obj => obj::parse(&String::from_utf8_lossy(&bytes), path)?,
        MeshFormat::Stl => stl::parse(&bytes, path)?,
        MeshFormat::Unsupported => unreachable!("rejected above"),
    };

    if mesh.is_empty() {
        return Err(GalleryError::EmptyMesh {
            path: path.to_path_buf(),
        });
    }

    log::debug!("Loaded {} ({} triangles)", path.display(), mesh.face_count());
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(MeshFormat::from_path(Path::new("a/cube.OBJ")), MeshFormat::Obj);
        assert_eq!(MeshFormat::from_path(Path::new("part.Stl")), MeshFormat::Stl);
        assert_eq!(MeshFormat::from_path(Path::new("scene.ply")), MeshFormat::Unsupported);
        assert_eq!(MeshFormat::from_path(Path::new("noext")), MeshFormat::Unsupported);
    }

    #[test]
    fn test_unsupported_is_explicit_error() {
        let err = load_mesh(&PathBuf::from("whatever.fbx")).unwrap_err();
        assert!(matches!(err, GalleryError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_empty_obj_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.obj");
        fs::write(&path, "# nothing here\nv 1 2 3\n").unwrap();

        let err = load_mesh(&path).unwrap_err();
        assert!(matches!(err, GalleryError::EmptyMesh { .. }));
    }

    #[test]
    fn test_bounds_ignore_unreferenced_vertices() {
        let mesh = TriangleMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(0.0, 2.0, 0.0),
                Point3::new(100.0, 100.0, 100.0),
            ],
            vec![[0, 1, 2]],
        );

        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.max, Point3::new(2.0, 2.0, 0.0));
        assert_eq!(bounds.center(), Point3::new(1.0, 1.0, 0.0));
        assert!((bounds.radius() - 2.0f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_face_normal_ccw() {
        let tri = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        assert_eq!(face_normal(&tri), Vector3::new(0.0, 0.0, 1.0));
    }
}
