/// Interactive viewer session
///
/// Holds the loaded mesh and a user-controlled camera for one "view" action.
/// The camera is framed once when the session opens; afterwards only pointer
/// interactions move it. Dropping the session releases everything.
use cgmath::Deg;
use image::{DynamicImage, RgbaImage};
use std::path::Path;

use super::camera::Camera;
use super::rasterizer::Framebuffer;
use super::RenderSettings;
use crate::error::{GalleryError, Result};
use crate::mesh::{self, Bounds, TriangleMesh};

/// Degrees of orbit for a drag across the full viewport
const ROTATE_DEGREES_PER_VIEWPORT: f32 = 200.0;
/// Dolly speed for right-drag and wheel
const DOLLY_BASE: f32 = 1.1;
const DOLLY_DRAG_FACTOR: f32 = 10.0;

/// Pointer gestures in screen pixels (x right, y down)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    Rotate { dx: f32, dy: f32 },
    Pan { dx: f32, dy: f32 },
    /// Vertical drag: dragging up moves closer
    Dolly { dy: f32 },
    /// Wheel steps: positive moves closer
    Zoom { steps: f32 },
    Resize { width: u32, height: u32 },
}

pub struct ViewerSession {
    name: String,
    mesh: TriangleMesh,
    bounds: Bounds,
    camera: Camera,
    settings: RenderSettings,
    width: u32,
    height: u32,
}

impl ViewerSession {
    /// Load the mesh and frame the camera around it
    pub fn open(path: &Path, settings: RenderSettings, width: u32, height: u32) -> Result<Self> {
        let mesh = mesh::load_mesh(path)?;
        let bounds = mesh.bounds().ok_or_else(|| GalleryError::EmptyMesh {
            path: path.to_path_buf(),
        })?;

        let mut camera = Camera::new(settings.view_angle);
        camera.reset(&bounds);

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Self {
            name,
            mesh,
            bounds,
            camera,
            settings,
            width: width.max(1),
            height: height.max(1),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[cfg(test)]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[cfg(test)]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Apply one gesture. Returns false when nothing changed and no redraw is needed.
    pub fn apply(&mut self, interaction: Interaction) -> bool {
        match interaction {
            Interaction::Rotate { dx, dy } => {
                self.camera
                    .azimuth(Deg(-dx * ROTATE_DEGREES_PER_VIEWPORT / self.width as f32));
                self.camera
                    .elevation(Deg(dy * ROTATE_DEGREES_PER_VIEWPORT / self.height as f32));
                self.camera.orthogonalize_view_up();
            }
            Interaction::Pan { dx, dy } => {
                let scale = self.camera.world_per_pixel(self.height);
                self.camera.pan(-dx * scale, dy * scale);
            }
            Interaction::Dolly { dy } => {
                let exponent = -DOLLY_DRAG_FACTOR * dy / (self.height as f32 * 0.5);
                self.camera.dolly(DOLLY_BASE.powf(exponent));
            }
            Interaction::Zoom { steps } => {
                self.camera.dolly(DOLLY_BASE.powf(steps));
            }
            Interaction::Resize { width, height } => {
                let size = (width.max(1), height.max(1));
                if size == (self.width, self.height) {
                    return false;
                }
                (self.width, self.height) = size;
                return true;
            }
        }

        self.camera.reset_clipping_range(&self.bounds);
        true
    }

    /// Render the current view at the viewport size
    pub fn render(&self) -> RgbaImage {
        let mut fb = Framebuffer::new(self.width, self.height, self.settings.background);
        fb.draw_mesh(
            &self.mesh,
            &self.camera,
            &self.settings.material,
            &self.settings.light,
        );
        DynamicImage::ImageRgb8(fb.read_back()).to_rgba8()
    }
}

impl std::fmt::Debug for ViewerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewerSession")
            .field("name", &self.name)
            .field("faces", &self.mesh.face_count())
            .field("size", &(self.width, self.height))
            .finish_non_exhaustive()
    }
}
