/// Offscreen thumbnail generation for gallery cards
///
/// Every call builds the whole pipeline (reader, camera, framebuffer) from
/// scratch and drops it before returning; nothing is cached between calls.
use image::{DynamicImage, RgbaImage};
use std::path::Path;

use super::camera::Camera;
use super::rasterizer::Framebuffer;
use super::RenderSettings;
use crate::error::{GalleryError, Result};
use crate::mesh::{self, TriangleMesh};

/// Load the mesh at `path` and render its thumbnail.
///
/// Files that are not `.obj`/`.stl` fail with `UnsupportedFormat` instead of
/// producing a blank image.
pub fn render_preview(path: &Path, settings: &RenderSettings) -> Result<RgbaImage> {
    let mesh = mesh::load_mesh(path)?;
    Ok(render_mesh_preview(&mesh, settings))
}

/// Render an already loaded mesh with the fixed three-quarter camera
pub fn render_mesh_preview(mesh: &TriangleMesh, settings: &RenderSettings) -> RgbaImage {
    let mut fb = Framebuffer::new(settings.preview_size, settings.preview_size, settings.background);

    if let Some(bounds) = mesh.bounds() {
        let mut camera = Camera::new(settings.view_angle);
        camera.reset(&bounds);
        camera.elevation(settings.elevation);
        camera.azimuth(settings.azimuth);
        camera.reset(&bounds);

        fb.draw_mesh(mesh, &camera, &settings.material, &settings.light);
    }

    DynamicImage::ImageRgb8(fb.read_back()).to_rgba8()
}

/// Write a rendered thumbnail as PNG
pub fn save_preview(image: &RgbaImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            GalleryError::io(format!("failed to create {}", parent.display()), e)
        })?;
    }
    image.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}
