//! Sphere-tracing renderer for implicit (signed-distance) scenes
//!
//! Every pixel is a pure function of the scene: generate a ray, sphere-trace
//! it through the composed distance field, estimate a normal at the hit point
//! and shade it with a Phong model. There is no shared mutable state, so the
//! framebuffer fills in parallel.

pub mod march;
pub mod renderer;
pub mod scene;
pub mod shade;
pub mod terminal;

pub use march::{HitResult, MarchConfig, NormalMode, Ray};
pub use renderer::Renderer;
pub use scene::Scene;

/// Step budget for one ray march.
pub const MAX_MARCHING_STEPS: u32 = 255;

/// Near bound: marching starts this far along the ray.
pub const MIN_DIST: f32 = 0.0;

/// Far bound: a ray that travels past this is a miss.
pub const MAX_DIST: f32 = 100.0;

/// A sample closer than this to a surface counts as a hit.
pub const PRECISION: f32 = 0.001;

/// Offset used by the finite-difference normal estimators.
pub const NORMAL_EPS: f32 = 0.0005;

/// Ambient floor shared by the background and the default materials.
pub const AMBIENT: f32 = 0.05;

/// UTF-8 character gradient from dark to light for terminal output.
pub const ASCII_GRADIENT: &str = " ·∙:;░▒▓█";
