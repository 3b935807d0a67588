//! Scene definitions: SDF primitives, materials and the nearest-wins union

use nalgebra::{Point3, Vector3};

use crate::march::Ray;
use crate::AMBIENT;

/// Phong reflectance coefficients for one primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    /// Specular lobe sharpness; larger means a tighter highlight.
    pub highlight: f32,
}

impl Material {
    pub fn new(
        ambient: Vector3<f32>,
        diffuse: Vector3<f32>,
        specular: Vector3<f32>,
        highlight: f32,
    ) -> Self {
        Self { ambient, diffuse, specular, highlight }
    }

    /// Fallback used when a hit carries an id no primitive answers to.
    /// Ambient only, so the pixel degrades to the background tint instead
    /// of failing.
    pub fn neutral() -> Self {
        Self {
            ambient: Vector3::repeat(AMBIENT),
            diffuse: Vector3::zeros(),
            specular: Vector3::zeros(),
            highlight: 2.0,
        }
    }
}

/// The single point light illuminating the scene
#[derive(Debug, Clone, Copy)]
pub struct Light {
    pub position: Point3<f32>,
    /// Multiplies the diffuse and specular terms; white leaves them as-is.
    pub color: Vector3<f32>,
}

impl Light {
    pub fn white(position: Point3<f32>) -> Self {
        Self { position, color: Vector3::repeat(1.0) }
    }
}

/// Shape-specific geometry of a primitive
#[derive(Debug, Clone, Copy)]
pub enum Shape {
    Sphere {
        center: Point3<f32>,
        radius: f32,
    },
    RoundedBox {
        center: Point3<f32>,
        half_extents: Vector3<f32>,
        corner_radius: f32,
    },
    /// Horizontal floor plane at a fixed height.
    Plane { y_offset: f32 },
}

impl Shape {
    /// Signed distance from `p` to this shape's surface.
    ///
    /// Exact for spheres and planes, a tight bound for rounded boxes; every
    /// value is a true lower bound on the distance to the surface, which is
    /// what makes sphere tracing safe.
    pub fn distance(&self, p: Point3<f32>) -> f32 {
        match *self {
            Shape::Sphere { center, radius } => (p - center).norm() - radius,
            Shape::RoundedBox { center, half_extents, corner_radius } => {
                let q = (p - center).abs() - half_extents;
                q.sup(&Vector3::zeros()).norm() + q.x.max(q.y.max(q.z)).min(0.0) - corner_radius
            }
            Shape::Plane { y_offset } => p.y - y_offset,
        }
    }
}

/// One scene object: a shape plus its appearance
#[derive(Debug, Clone, Copy)]
pub struct Primitive {
    pub shape: Shape,
    /// Base surface color. Ignored by `Plane`, which is procedural.
    pub color: Vector3<f32>,
    pub material: Material,
}

impl Primitive {
    pub fn new(shape: Shape, color: Vector3<f32>, material: Material) -> Self {
        Self { shape, color, material }
    }

    pub fn distance(&self, p: Point3<f32>) -> f32 {
        self.shape.distance(p)
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Base color at a surface point. Planes produce the checkerboard
    /// pattern; everything else is a flat color.
    pub fn base_color_at(&self, p: Point3<f32>) -> Vector3<f32> {
        match self.shape {
            Shape::Plane { .. } => Vector3::repeat(checker_weight(p)),
            _ => self.color,
        }
    }
}

/// Checkerboard brightness at `p`, keyed on unit tiles in the xz plane.
/// Alternates between 1.0 and 1.7 from tile to tile.
pub fn checker_weight(p: Point3<f32>) -> f32 {
    1.0 + 0.7 * (p.x.floor() + p.z.floor()).rem_euclid(2.0)
}

/// Field evaluation result: the signed distance to the nearest surface and
/// which primitive owns it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub distance: f32,
    /// Index into the scene's primitive list. `usize::MAX` when the scene
    /// is empty.
    pub id: usize,
}

/// The complete scene: an ordered, immutable set of primitives and a light
#[derive(Debug, Clone)]
pub struct Scene {
    pub primitives: Vec<Primitive>,
    pub light: Light,
}

impl Default for Scene {
    fn default() -> Self {
        Self::demo()
    }
}

impl Scene {
    /// Demo scene: two rounded boxes, an orange sphere and a checkerboard
    /// floor, lit from the upper right.
    pub fn demo() -> Self {
        let bg = Vector3::repeat(AMBIENT);
        let mat_box = Material::new(bg, Vector3::repeat(0.6), Vector3::repeat(0.15), 32.0);
        let mat_sphere = Material::new(bg, Vector3::repeat(0.3), Vector3::repeat(0.85), 16.0);
        let mat_floor = Material::new(
            Vector3::zeros(),
            Vector3::repeat(0.5),
            Vector3::repeat(0.5),
            64.0,
        );

        let primitives = vec![
            Primitive::new(
                Shape::RoundedBox {
                    center: Point3::new(-2.0, 0.0, 0.5),
                    half_extents: Vector3::new(0.5, 0.3, 0.3),
                    corner_radius: 0.2,
                },
                Vector3::new(1.0, 0.0, 0.0),
                mat_box,
            ),
            Primitive::new(
                Shape::RoundedBox {
                    center: Point3::new(2.0, 0.0, -0.5),
                    half_extents: Vector3::new(0.5, 0.3, 0.3),
                    corner_radius: 0.2,
                },
                Vector3::new(0.0, 1.0, 0.0),
                mat_box,
            ),
            Primitive::new(
                Shape::Sphere { center: Point3::origin(), radius: 0.55 },
                Vector3::new(1.0, 0.58, 0.29),
                mat_sphere,
            ),
            Primitive::new(
                Shape::Plane { y_offset: -1.0 },
                Vector3::repeat(1.0),
                mat_floor,
            ),
        ];

        Self {
            primitives,
            light: Light::white(Point3::new(2.0, 2.0, 4.0)),
        }
    }

    /// Evaluate the composed field at `p`: nearest-wins union over all
    /// primitives. Ties go to the earlier primitive in the list.
    pub fn sample(&self, p: Point3<f32>) -> SurfaceSample {
        let mut nearest = SurfaceSample { distance: f32::INFINITY, id: usize::MAX };
        for (id, primitive) in self.primitives.iter().enumerate() {
            let distance = primitive.distance(p);
            if distance < nearest.distance {
                nearest = SurfaceSample { distance, id };
            }
        }
        nearest
    }

    /// Adjust light height, clamped to stay above the floor.
    pub fn adjust_light_height(&mut self, delta: f32) {
        self.light.position.y = (self.light.position.y + delta).clamp(-0.9, 6.0);
    }
}

/// Camera for viewing the scene; maps pixel coordinates to world rays
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub origin: Point3<f32>,
    pub look_at: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect_ratio: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            origin: Point3::new(0.0, 0.0, 5.0),
            look_at: Point3::origin(),
            up: Vector3::new(0.0, 1.0, 0.0),
            // Matches a half-height of 0.5 on the image plane.
            fov: 53.13,
            aspect_ratio: 1.0,
        }
    }
}

impl Camera {
    pub fn set_aspect_ratio(&mut self, ratio: f32) {
        self.aspect_ratio = ratio;
    }

    /// Generate the ray through the center of pixel (x, y).
    pub fn ray_at(&self, x: usize, y: usize, width: usize, height: usize) -> Ray {
        let half_height = (self.fov.to_radians() / 2.0).tan();
        let half_width = self.aspect_ratio * half_height;

        // Orthonormal camera basis
        let w = (self.origin - self.look_at).normalize();
        let u = self.up.cross(&w).normalize();
        let v = w.cross(&u);

        let px = (2.0 * ((x as f32 + 0.5) / width as f32) - 1.0) * half_width;
        let py = (1.0 - 2.0 * ((y as f32 + 0.5) / height as f32)) * half_height;

        Ray::new(self.origin, (u * px + v * py - w).normalize())
    }

    /// Move the camera along its view direction, keeping it a sane distance
    /// from the look-at point.
    pub fn adjust_distance(&mut self, delta: f32) {
        let view_dir = (self.look_at - self.origin).normalize();
        self.origin += view_dir * delta;

        let distance = (self.look_at - self.origin).magnitude();
        if !(1.0..=20.0).contains(&distance) {
            self.origin = self.look_at - view_dir * distance.clamp(1.0, 20.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    fn unit_sphere() -> Shape {
        Shape::Sphere { center: Point3::origin(), radius: 1.0 }
    }

    #[test]
    fn test_sphere_sdf_zero_on_surface() {
        let sphere = Shape::Sphere { center: Point3::new(1.0, 2.0, 3.0), radius: 0.55 };
        let on_surface = Point3::new(1.0, 2.0 + 0.55, 3.0);
        assert!(approx_eq!(f32, sphere.distance(on_surface), 0.0, epsilon = 1e-6));
    }

    #[test]
    fn test_sphere_sdf_sign_and_lower_bound() {
        let sphere = unit_sphere();
        // Strictly inside: negative, but never below -radius
        let inside = Point3::new(0.2, 0.1, -0.3);
        let d = sphere.distance(inside);
        assert!(d < 0.0);
        assert!(d >= -1.0);
        // Center is the deepest point
        assert!(approx_eq!(f32, sphere.distance(Point3::origin()), -1.0, epsilon = 1e-6));
        // Outside: positive
        assert!(sphere.distance(Point3::new(2.0, 0.0, 0.0)) > 0.0);
    }

    #[test]
    fn test_plane_sdf_is_height_offset() {
        let plane = Shape::Plane { y_offset: -1.0 };
        assert!(approx_eq!(f32, plane.distance(Point3::new(5.0, -1.0, -7.0)), 0.0, epsilon = 1e-6));
        assert!(approx_eq!(f32, plane.distance(Point3::new(0.0, 0.5, 0.0)), 1.5, epsilon = 1e-6));
        assert!(plane.distance(Point3::new(0.0, -2.0, 0.0)) < 0.0);
    }

    #[test]
    fn test_rounded_box_sdf_face_point() {
        let shape = Shape::RoundedBox {
            center: Point3::origin(),
            half_extents: Vector3::new(0.5, 0.3, 0.3),
            corner_radius: 0.2,
        };
        // Straight out along +x the surface sits at half_extent + corner_radius
        assert!(approx_eq!(f32, shape.distance(Point3::new(0.7, 0.0, 0.0)), 0.0, epsilon = 1e-6));
        assert!(approx_eq!(f32, shape.distance(Point3::new(1.7, 0.0, 0.0)), 1.0, epsilon = 1e-6));
        // Center is inside
        assert!(shape.distance(Point3::origin()) < 0.0);
    }

    #[test]
    fn test_union_matches_brute_force_min() {
        let scene = Scene::demo();
        let points = [
            Point3::origin(),
            Point3::new(-2.0, 0.0, 0.5),
            Point3::new(3.0, 1.0, -4.0),
            Point3::new(0.0, -0.99, 0.0),
            Point3::new(1.3, 0.7, 2.2),
        ];
        for p in points {
            let sample = scene.sample(p);
            let brute = scene
                .primitives
                .iter()
                .map(|prim| prim.distance(p))
                .fold(f32::INFINITY, f32::min);
            assert!(approx_eq!(f32, sample.distance, brute, epsilon = 1e-6));
            assert!(approx_eq!(
                f32,
                scene.primitives[sample.id].distance(p),
                brute,
                epsilon = 1e-6
            ));
        }
    }

    #[test]
    fn test_union_tie_break_keeps_first() {
        let mat = Material::neutral();
        let scene = Scene {
            primitives: vec![
                Primitive::new(unit_sphere(), Vector3::repeat(1.0), mat),
                Primitive::new(unit_sphere(), Vector3::repeat(0.5), mat),
            ],
            light: Light::white(Point3::new(2.0, 2.0, 4.0)),
        };
        assert_eq!(scene.sample(Point3::new(3.0, 0.0, 0.0)).id, 0);
    }

    #[test]
    fn test_empty_scene_sample() {
        let scene = Scene { primitives: vec![], light: Light::white(Point3::origin()) };
        let sample = scene.sample(Point3::origin());
        assert!(sample.distance.is_infinite());
        assert_eq!(sample.id, usize::MAX);
    }

    #[test]
    fn test_checker_weight_alternates_along_x() {
        let a = checker_weight(Point3::new(0.5, -1.0, 0.5));
        let b = checker_weight(Point3::new(1.5, -1.0, 0.5));
        assert!(approx_eq!(f32, a, 1.0, epsilon = 1e-6));
        assert!(approx_eq!(f32, b, 1.7, epsilon = 1e-6));
        // Same parity one tile over in both axes
        let c = checker_weight(Point3::new(1.5, -1.0, 1.5));
        assert!(approx_eq!(f32, c, 1.0, epsilon = 1e-6));
    }

    #[test]
    fn test_checker_weight_negative_coords() {
        let a = checker_weight(Point3::new(-0.5, -1.0, 0.5));
        assert!(approx_eq!(f32, a, 1.7, epsilon = 1e-6));
    }

    #[test]
    fn test_camera_center_ray_points_at_target() {
        let camera = Camera::default();
        let ray = camera.ray_at(50, 50, 101, 101);
        assert!(ray.direction.z < -0.999);
        assert!(approx_eq!(f32, ray.direction.norm(), 1.0, epsilon = 1e-5));
    }

    #[test]
    fn test_light_adjustment_clamped() {
        let mut scene = Scene::demo();
        scene.adjust_light_height(100.0);
        assert!(scene.light.position.y <= 6.0);
        scene.adjust_light_height(-100.0);
        assert!(scene.light.position.y >= -0.9);
    }
}
