/// Perspective camera with the orbit operations the gallery needs
///
/// The camera is described by a position, the focal point it looks at and a
/// view-up vector. `reset` frames a bounding box while keeping the current
/// viewing direction, so "frame, orbit by a fixed offset, frame again" yields
/// the same three-quarter view for every mesh.
use cgmath::{Deg, InnerSpace, Matrix3, Matrix4, Point3, Vector3};

use crate::mesh::Bounds;

/// Smallest radius used when framing, so single points and flat meshes still get a sane distance
const MIN_RADIUS: f32 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub focal_point: Point3<f32>,
    pub view_up: Vector3<f32>,
    /// Vertical field of view
    pub view_angle: Deg<f32>,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    /// Looking down -Z from (0, 0, 1) with +Y up
    fn default() -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 1.0),
            focal_point: Point3::new(0.0, 0.0, 0.0),
            view_up: Vector3::new(0.0, 1.0, 0.0),
            view_angle: Deg(30.0),
            near: 0.01,
            far: 1000.0,
        }
    }
}

impl Camera {
    pub fn new(view_angle: Deg<f32>) -> Self {
        Self {
            view_angle,
            ..Self::default()
        }
    }

    pub fn distance(&self) -> f32 {
        (self.position - self.focal_point).magnitude()
    }

    /// Unit vector from the camera toward the focal point
    pub fn direction_of_projection(&self) -> Vector3<f32> {
        (self.focal_point - self.position).normalize()
    }

    /// Unit vector pointing to the right of the view
    fn right(&self) -> Vector3<f32> {
        self.direction_of_projection().cross(self.view_up).normalize()
    }

    /// Center on `bounds` and back off until its bounding sphere fits the view angle.
    /// The viewing direction is preserved.
    pub fn reset(&mut self, bounds: &Bounds) {
        let radius = bounds.radius().max(MIN_RADIUS);
        let half_angle = cgmath::Rad::from(self.view_angle * 0.5).0;
        let distance = radius / half_angle.sin();

        let back = -self.direction_of_projection();
        self.focal_point = bounds.center();
        self.position = self.focal_point + back * distance;
        self.reset_clipping_range(bounds);
    }

    /// Fit the near/far planes tightly around `bounds`
    pub fn reset_clipping_range(&mut self, bounds: &Bounds) {
        let radius = bounds.radius().max(MIN_RADIUS) * 1.01;
        let depth = (bounds.center() - self.position).dot(self.direction_of_projection());

        self.far = (depth + radius).max(1e-3);
        self.near = (depth - radius).max(self.far * 1e-3);
    }

    /// Orbit around the view-up axis through the focal point
    pub fn azimuth(&mut self, angle: Deg<f32>) {
        let rotation = Matrix3::from_axis_angle(self.view_up.normalize(), angle);
        self.orbit(rotation);
    }

    /// Orbit around the right axis through the focal point; positive angles move the camera up
    pub fn elevation(&mut self, angle: Deg<f32>) {
        let rotation = Matrix3::from_axis_angle(self.right(), -angle);
        self.orbit(rotation);
    }

    fn orbit(&mut self, rotation: Matrix3<f32>) {
        let offset = self.position - self.focal_point;
        self.position = self.focal_point + rotation * offset;
    }

    /// Re-derive view-up so it is perpendicular to the viewing direction
    pub fn orthogonalize_view_up(&mut self) {
        let dop = self.direction_of_projection();
        let right = dop.cross(self.view_up);
        if right.magnitude2() > f32::EPSILON {
            self.view_up = right.cross(dop).normalize();
        }
    }

    /// Move toward (`factor > 1`) or away from (`factor < 1`) the focal point
    pub fn dolly(&mut self, factor: f32) {
        if factor <= 0.0 {
            return;
        }
        let distance = self.distance() / factor;
        self.position = self.focal_point - self.direction_of_projection() * distance;
    }

    /// Slide camera and focal point together within the view plane
    pub fn pan(&mut self, right: f32, up: f32) {
        let up_axis = self.right().cross(self.direction_of_projection()).normalize();
        let shift = self.right() * right + up_axis * up;
        self.position += shift;
        self.focal_point += shift;
    }

    /// World units covered by one pixel at the focal distance
    pub fn world_per_pixel(&self, viewport_height: u32) -> f32 {
        let half_angle = cgmath::Rad::from(self.view_angle * 0.5).0;
        2.0 * self.distance() * half_angle.tan() / viewport_height.max(1) as f32
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.focal_point, self.view_up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Matrix4<f32> {
        cgmath::perspective(self.view_angle, aspect, self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Matrix4<f32> {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}
