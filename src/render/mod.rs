/// Software mesh rendering module
///
/// Architecture:
/// - `camera.rs` - perspective camera with framing and orbit operations
/// - `rasterizer.rs` - depth-buffered triangle fill with flat Phong shading
/// - `preview.rs` - fixed-pose offscreen thumbnails for gallery cards
/// - `viewer.rs` - camera-navigable session behind the interactive viewer
///
/// The preview and the viewer share the same material, light and framing, so a
/// model looks the same on its card and when opened.
use cgmath::{Deg, Point3};

pub mod camera;
pub mod preview;
pub mod rasterizer;
pub mod viewer;

pub use rasterizer::{Light, Material};

/// Everything that decides how a mesh looks
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    /// Edge length of the square card thumbnail
    pub preview_size: u32,
    pub material: Material,
    pub light: Light,
    pub background: [u8; 3],
    /// Vertical field of view
    pub view_angle: Deg<f32>,
    /// Orbit applied after framing, for a consistent three-quarter view
    pub elevation: Deg<f32>,
    pub azimuth: Deg<f32>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            preview_size: 256,
            material: Material::default(),
            light: Light {
                position: Point3::new(1.0, 1.0, 1.0),
                intensity: 0.8,
            },
            background: [0, 0, 0],
            view_angle: Deg(30.0),
            elevation: Deg(30.0),
            azimuth: Deg(30.0),
        }
    }
}
