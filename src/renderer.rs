//! Framebuffer renderer: fans the per-pixel sphere-tracing kernel out over
//! all pixels with rayon and converts the result to terminal or image output

use nalgebra::Vector3;
use rayon::prelude::*;

use crate::march::{march, MarchConfig};
use crate::scene::{Camera, Scene};
use crate::shade::shade;

/// Renders a scene into an RGB framebuffer
pub struct Renderer {
    width: usize,
    height: usize,
    framebuffer: Vec<Vector3<f32>>,
    camera: Camera,
    config: MarchConfig,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        let mut camera = Camera::default();
        camera.set_aspect_ratio(width as f32 / height as f32);
        Self {
            width,
            height,
            framebuffer: vec![Vector3::zeros(); width * height],
            camera,
            config: MarchConfig::default(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.framebuffer = vec![Vector3::zeros(); width * height];
        self.camera.set_aspect_ratio(width as f32 / height as f32);
    }

    /// Stretch the image plane horizontally, e.g. 0.5 to compensate for
    /// terminal cells being twice as tall as they are wide.
    pub fn set_pixel_aspect(&mut self, pixel_aspect: f32) {
        self.camera
            .set_aspect_ratio((self.width as f32 / self.height as f32) * pixel_aspect);
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn config(&self) -> &MarchConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut MarchConfig {
        &mut self.config
    }

    pub fn pixel(&self, x: usize, y: usize) -> Vector3<f32> {
        self.framebuffer[y * self.width + x]
    }

    /// Render the scene to the framebuffer, one independent kernel per
    /// pixel. The scene and config are read-only, so rows fill in parallel
    /// without synchronization.
    pub fn render(&mut self, scene: &Scene) {
        let width = self.width;
        let height = self.height;
        let camera = self.camera;
        let config = self.config;

        let colors: Vec<Vector3<f32>> = (0..height)
            .into_par_iter()
            .flat_map(|y| {
                let scene = &scene;
                (0..width).into_par_iter().map(move |x| {
                    let ray = camera.ray_at(x, y, width, height);
                    let hit = march(&ray, scene, &config);
                    shade(&ray, hit, scene, &config)
                })
            })
            .collect();

        self.framebuffer = colors;
    }

    /// Convert the framebuffer to a grayscale ASCII string.
    pub fn to_ascii(&self) -> String {
        let gradient: Vec<char> = crate::ASCII_GRADIENT.chars().collect();
        let mut out = String::with_capacity(self.width * self.height + self.height);

        for y in 0..self.height {
            for x in 0..self.width {
                out.push(gradient[self.luminance_index(x, y, gradient.len())]);
            }
            out.push('\n');
        }
        out
    }

    /// Convert the framebuffer to ASCII with ANSI 24-bit color codes.
    pub fn to_ascii_colored(&self) -> String {
        let gradient: Vec<char> = crate::ASCII_GRADIENT.chars().collect();
        let mut out = String::with_capacity(self.width * self.height * 20 + self.height * 10);

        for y in 0..self.height {
            for x in 0..self.width {
                let color = self.pixel(x, y);
                let r = (color.x.clamp(0.0, 1.0) * 255.0) as u8;
                let g = (color.y.clamp(0.0, 1.0) * 255.0) as u8;
                let b = (color.z.clamp(0.0, 1.0) * 255.0) as u8;
                let ch = gradient[self.luminance_index(x, y, gradient.len())];
                out.push_str(&format!("\x1b[38;2;{};{};{}m{}", r, g, b, ch));
            }
            out.push_str("\x1b[0m\n");
        }
        out
    }

    /// Flatten the framebuffer to tightly packed RGBA8, alpha fixed at 255.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width * self.height * 4);
        for color in &self.framebuffer {
            out.push((color.x.clamp(0.0, 1.0) * 255.0) as u8);
            out.push((color.y.clamp(0.0, 1.0) * 255.0) as u8);
            out.push((color.z.clamp(0.0, 1.0) * 255.0) as u8);
            out.push(255);
        }
        out
    }

    fn luminance_index(&self, x: usize, y: usize, levels: usize) -> usize {
        let color = self.pixel(x, y);
        let luminance = (0.299 * color.x + 0.587 * color.y + 0.114 * color.z).clamp(0.0, 1.0);
        ((luminance * (levels - 1) as f32).round() as usize).min(levels - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shade::background_color;

    #[test]
    fn test_renderer_dimensions() {
        let renderer = Renderer::new(40, 20);
        assert_eq!(renderer.to_ascii().lines().count(), 20);
        assert!(renderer.to_ascii().lines().all(|l| l.chars().count() == 40));
    }

    #[test]
    fn test_renderer_resize() {
        let mut renderer = Renderer::new(40, 20);
        renderer.resize(60, 30);
        assert_eq!(renderer.width(), 60);
        assert_eq!(renderer.height(), 30);
        assert_eq!(renderer.to_rgba8().len(), 60 * 30 * 4);
    }

    #[test]
    fn test_end_to_end_single_sphere() {
        use crate::scene::{Light, Material, Primitive, Scene, Shape};
        use nalgebra::Point3;

        // The reference configuration: camera at (0,0,5) looking down -z at
        // an orange sphere of radius 0.55 at the origin, lit from (2,2,4).
        let scene = Scene {
            primitives: vec![Primitive::new(
                Shape::Sphere { center: Point3::origin(), radius: 0.55 },
                Vector3::new(1.0, 0.58, 0.29),
                Material::new(
                    Vector3::repeat(crate::AMBIENT),
                    Vector3::repeat(0.3),
                    Vector3::repeat(0.85),
                    16.0,
                ),
            )],
            light: Light::white(Point3::new(2.0, 2.0, 4.0)),
        };

        let mut renderer = Renderer::new(41, 41);
        renderer.render(&scene);

        // Center pixel hits the sphere
        let center = renderer.pixel(20, 20);
        assert_ne!(center, background_color());
        for c in center.iter() {
            assert!((0.0..=1.0).contains(c));
        }

        // Corner pixel misses everything and is exactly the background
        assert_eq!(renderer.pixel(0, 0), background_color());

        // The upper-right of the sphere faces the light and carries the
        // specular highlight, so it outshines the lower-left.
        let mut upper_right = Vector3::zeros();
        let mut lower_left = Vector3::zeros();
        for d in 1..6 {
            upper_right += renderer.pixel(20 + d, 20 - d);
            lower_left += renderer.pixel(20 - d, 20 + d);
        }
        assert!(upper_right.sum() > lower_left.sum());
    }

    #[test]
    fn test_demo_scene_renders_floor_and_background() {
        let scene = Scene::demo();
        let mut renderer = Renderer::new(32, 32);
        renderer.render(&scene);

        // Top rows look over the scene into empty space
        assert_eq!(renderer.pixel(16, 0), background_color());
        // Bottom rows look at the checkerboard floor
        assert_ne!(renderer.pixel(16, 31), background_color());
    }

    #[test]
    fn test_ascii_colored_has_reset_codes() {
        let mut renderer = Renderer::new(8, 4);
        renderer.render(&Scene::demo());
        let out = renderer.to_ascii_colored();
        assert_eq!(out.matches("\x1b[0m").count(), 4);
    }
}
