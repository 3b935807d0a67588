//! Phong shading: turn a march result into a pixel color

use nalgebra::{Point3, Vector3};

use crate::march::{estimate_normal, HitResult, MarchConfig, Ray};
use crate::scene::{Material, Scene};
use crate::AMBIENT;

/// Color rendered wherever a ray misses the scene.
pub fn background_color() -> Vector3<f32> {
    Vector3::repeat(AMBIENT)
}

/// Reflect `v` around the unit normal `n`.
fn reflect(v: &Vector3<f32>, n: &Vector3<f32>) -> Vector3<f32> {
    *v - 2.0 * v.dot(n) * *n
}

/// Shade one march outcome into an RGB color with components in [0, 1].
///
/// A hit id that matches no primitive shades with [`Material::neutral`] and a
/// white base color, so the kernel stays total even under a buggy composer.
pub fn shade(ray: &Ray, hit: HitResult, scene: &Scene, config: &MarchConfig) -> Vector3<f32> {
    let HitResult::Hit { depth, id } = hit else {
        return background_color();
    };

    let point = ray.at(depth);
    let normal = estimate_normal(point, scene, config);

    let neutral = Material::neutral();
    let primitive = scene.primitives.get(id);
    let material = primitive.map_or(&neutral, |prim| prim.material());
    let base_color = primitive.map_or_else(|| Vector3::repeat(1.0), |prim| prim.base_color_at(point));

    let illumination = illuminate(point, normal, scene.light.position, scene.light.color, material);
    illumination.component_mul(&base_color)
}

/// Ambient + diffuse + specular illumination at a surface point, clamped
/// component-wise to [0, 1].
fn illuminate(
    point: Point3<f32>,
    normal: Vector3<f32>,
    light_position: Point3<f32>,
    light_color: Vector3<f32>,
    material: &Material,
) -> Vector3<f32> {
    let light_dir = (light_position - point).normalize();

    // Diffuse never darkens below the ambient floor.
    let lambert = normal.dot(&light_dir).clamp(0.0, 1.0);
    let diffuse = (material.diffuse * lambert).zip_map(&material.ambient, |d, a| d.clamp(a, 1.0));

    let highlight = normal.dot(&reflect(&-light_dir, &normal)).clamp(0.0, 1.0);
    let specular = material.specular * highlight.powf(material.highlight);

    let total = material.ambient + (diffuse + specular).component_mul(&light_color);
    total.map(|c| c.clamp(0.0, 1.0))
}
