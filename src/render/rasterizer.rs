//! Offscreen software rasterizer
//!
//! Draws a triangle mesh into an RGB color buffer with a depth buffer, using
//! flat per-face Phong shading from a single directional light. Rows are stored
//! bottom-up (row 0 is the bottom of the image), like a GL framebuffer; callers
//! flip when reading back into a top-down image.

use cgmath::{EuclideanSpace, InnerSpace, Point3, Vector3, Vector4};
use image::{imageops, RgbImage};

use super::camera::Camera;
use crate::mesh::{face_normal, TriangleMesh};

/// Surface response of the mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Base RGB in 0..1
    pub color: [f32; 3],
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub specular_power: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: [0.3, 0.5, 0.7],
            ambient: 0.3,
            diffuse: 0.7,
            specular: 0.2,
            specular_power: 1.0,
        }
    }
}

/// Directional light shining from `position` toward the world origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Point3<f32>,
    pub intensity: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Point3::new(1.0, 1.0, 1.0),
            intensity: 0.8,
        }
    }
}

impl Light {
    /// Unit vector from a surface toward the light
    fn to_light(&self) -> Vector3<f32> {
        self.position.to_vec().normalize()
    }
}

/// Color + depth render target
pub struct Framebuffer {
    width: u32,
    height: u32,
    color: Vec<u8>,
    depth: Vec<f32>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32, background: [u8; 3]) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            color: background.repeat(len),
            depth: vec![f32::INFINITY; len],
        }
    }

    /// Color at column `x` of row `y`, counting rows from the bottom
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = self.index(x, y) * 3;
        [self.color[i], self.color[i + 1], self.color[i + 2]]
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Draw every face of `mesh` as seen through `camera`
    pub fn draw_mesh(
        &mut self,
        mesh: &TriangleMesh,
        camera: &Camera,
        material: &Material,
        light: &Light,
    ) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let aspect = self.width as f32 / self.height as f32;
        let view_projection = camera.view_projection(aspect);
        let to_light = light.to_light();

        for face in &mesh.faces {
            let world = mesh.triangle(face);

            let clip = world.map(|p| view_projection * p.to_homogeneous());
            if clip.iter().any(|c| c.w <= f32::EPSILON) {
                continue;
            }
            let screen = clip.map(|c| self.to_screen(c));

            let centroid = Point3::centroid(&world);
            let rgb = shade(
                &world,
                camera.position - centroid,
                to_light,
                material,
                light.intensity,
            );
            self.fill_triangle(&screen, rgb);
        }
    }

    /// Clip space to pixel coordinates (x right, y up) with NDC depth in z
    fn to_screen(&self, clip: Vector4<f32>) -> Vector3<f32> {
        let ndc = clip.truncate() / clip.w;
        Vector3::new(
            (ndc.x + 1.0) * 0.5 * self.width as f32,
            (ndc.y + 1.0) * 0.5 * self.height as f32,
            ndc.z,
        )
    }

    fn fill_triangle(&mut self, v: &[Vector3<f32>; 3], rgb: [u8; 3]) {
        let area = edge(v[0], v[1], v[2]);
        if area.abs() < 1e-8 {
            return;
        }

        let min_x = v.iter().map(|p| p.x).fold(f32::INFINITY, f32::min).floor().max(0.0) as u32;
        let min_y = v.iter().map(|p| p.y).fold(f32::INFINITY, f32::min).floor().max(0.0) as u32;
        let max_x = v.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max).ceil();
        let max_y = v.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max).ceil();
        let max_x = (max_x.max(0.0) as u32).min(self.width);
        let max_y = (max_y.max(0.0) as u32).min(self.height);

        for y in min_y..max_y {
            for x in min_x..max_x {
                let p = Vector3::new(x as f32 + 0.5, y as f32 + 0.5, 0.0);
                let w0 = edge(v[1], v[2], p) / area;
                let w1 = edge(v[2], v[0], p) / area;
                let w2 = edge(v[0], v[1], p) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                // NDC depth is affine in screen space, so plain barycentric interpolation is exact
                let z = w0 * v[0].z + w1 * v[1].z + w2 * v[2].z;
                if !(-1.0..=1.0).contains(&z) {
                    continue;
                }

                let i = self.index(x, y);
                if z < self.depth[i] {
                    self.depth[i] = z;
                    self.color[i * 3..i * 3 + 3].copy_from_slice(&rgb);
                }
            }
        }
    }

    /// Read the color buffer back into a top-down image
    pub fn read_back(&self) -> RgbImage {
        let bottom_up = RgbImage::from_fn(self.width, self.height, |x, y| image::Rgb(self.pixel(x, y)));
        imageops::flip_vertical(&bottom_up)
    }
}

/// Twice the signed area of (a, b, c) in the xy plane
fn edge(a: Vector3<f32>, b: Vector3<f32>, c: Vector3<f32>) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Flat Phong shading of one face. Both sides are lit: the normal is flipped to face the viewer.
fn shade(
    tri: &[Point3<f32>; 3],
    to_eye: Vector3<f32>,
    to_light: Vector3<f32>,
    material: &Material,
    intensity: f32,
) -> [u8; 3] {
    let to_eye = to_eye.normalize();
    let mut normal = face_normal(tri);
    if normal.dot(to_eye) < 0.0 {
        normal = -normal;
    }

    let diffuse = normal.dot(to_light).max(0.0);
    let reflected = normal * (2.0 * normal.dot(to_light)) - to_light;
    let specular = if diffuse > 0.0 {
        reflected.dot(to_eye).max(0.0).powf(material.specular_power)
    } else {
        0.0
    };

    let lit = material.ambient + material.diffuse * intensity * diffuse;
    let highlight = material.specular * intensity * specular;
    material
        .color
        .map(|c| ((c * lit + highlight).clamp(0.0, 1.0) * 255.0).round() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Deg;

    fn quad() -> TriangleMesh {
        TriangleMesh::new(
            vec![
                Point3::new(-1.0, -1.0, 0.0),
                Point3::new(1.0, -1.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(-1.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    fn framed_camera(mesh: &TriangleMesh) -> Camera {
        let mut camera = Camera::new(Deg(30.0));
        camera.reset(&mesh.bounds().unwrap());
        camera
    }

    #[test]
    fn test_center_is_covered_and_corners_are_background() {
        let mesh = quad();
        let camera = framed_camera(&mesh);
        let mut fb = Framebuffer::new(64, 64, [0, 0, 0]);

        fb.draw_mesh(&mesh, &camera, &Material::default(), &Light::default());

        assert_ne!(fb.pixel(32, 32), [0, 0, 0]);
        assert_eq!(fb.pixel(0, 0), [0, 0, 0]);
        assert_eq!(fb.pixel(63, 63), [0, 0, 0]);
    }

    #[test]
    fn test_back_face_is_lit_too() {
        let mesh = quad();
        let mut camera = framed_camera(&mesh);
        camera.azimuth(Deg(180.0));
        let mut fb = Framebuffer::new(32, 32, [0, 0, 0]);

        fb.draw_mesh(&mesh, &camera, &Material::default(), &Light::default());

        assert_ne!(fb.pixel(16, 16), [0, 0, 0]);
    }

    #[test]
    fn test_nearer_face_wins_depth_test() {
        let mut mesh = quad();
        let base = mesh.vertices.len();
        // a smaller triangle floating in front of the quad
        mesh.vertices.extend([
            Point3::new(-0.5, -0.5, 0.5),
            Point3::new(0.5, -0.5, 0.5),
            Point3::new(0.0, 0.5, 0.9),
        ]);
        mesh.faces.push([base, base + 1, base + 2]);

        let camera = framed_camera(&mesh);
        let mut front_only = Framebuffer::new(64, 64, [0, 0, 0]);
        let mut with_quad = Framebuffer::new(64, 64, [0, 0, 0]);
        let front = TriangleMesh::new(mesh.vertices.clone(), vec![[base, base + 1, base + 2]]);

        front_only.draw_mesh(&front, &camera, &Material::default(), &Light::default());
        with_quad.draw_mesh(&mesh, &camera, &Material::default(), &Light::default());

        assert_eq!(front_only.pixel(32, 30), with_quad.pixel(32, 30));
    }

    #[test]
    fn test_read_back_flips_rows() {
        let mut fb = Framebuffer::new(2, 2, [0, 0, 0]);
        // paint the bottom row
        fb.color[0..6].copy_from_slice(&[255, 0, 0, 255, 0, 0]);

        let image = fb.read_back();

        assert_eq!(image.get_pixel(0, 1).0, [255, 0, 0]);
        assert_eq!(image.get_pixel(1, 0).0, [0, 0, 0]);
    }

    #[test]
    fn test_shading_brightest_facing_light() {
        let material = Material::default();
        let facing = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let toward = shade(&facing, Vector3::unit_z(), Vector3::unit_z(), &material, 0.8);
        let grazing = shade(&facing, Vector3::unit_z(), Vector3::unit_x(), &material, 0.8);

        assert!(toward[2] > grazing[2]);
        // ambient only: 0.7 * 0.3 * 255
        assert_eq!(grazing[2], 54);
    }
}
