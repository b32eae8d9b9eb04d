//! Recursive radiance estimation.
//!
//! The integrator follows one ray through the scene, bouncing off surfaces
//! and multiplying attenuations until the ray is absorbed, escapes to the
//! sky, or exhausts its bounce budget.

use crate::{Camera, Color, Hittable, Ray};
use lumen_math::Interval;
use rand::RngCore;

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Base seed; each worker derives its own generator from it
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 100,
            max_depth: 50,
            seed: 0,
        }
    }
}

/// Minimum ray parameter for intersection tests. Keeps a scattered ray from
/// re-hitting the surface it just left ("shadow acne").
const T_MIN: f32 = 1e-3;

/// Compute the color seen along a ray.
///
/// This is the core path tracing function: on a hit the surface material
/// decides whether the ray continues, and the recursive estimate of the
/// scattered ray is weighted by the material's attenuation. Absorption and
/// an exhausted bounce budget both contribute black.
pub fn ray_color(ray: &Ray, world: &dyn Hittable, depth: u32, rng: &mut dyn RngCore) -> Color {
    // Bounce budget exhausted: no more light is gathered
    if depth == 0 {
        return Color::ZERO;
    }

    match world.hit(ray, Interval::new(T_MIN, f32::INFINITY)) {
        Some(rec) => match rec.material.scatter(ray, &rec, rng) {
            Some(scatter) => {
                scatter.attenuation * ray_color(&scatter.scattered, world, depth - 1, rng)
            }
            // Absorbed
            None => Color::ZERO,
        },
        // Escaped into the sky
        None => sky_gradient(ray),
    }
}

/// Background gradient: white at the horizon blending to light blue overhead.
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction.normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Render a single pixel with multi-sampling.
///
/// Returns the un-averaged sum of the sample estimates; the framebuffer
/// stores sums and the encoder divides by the sample count when resolving
/// display values.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let mut pixel_color = Color::ZERO;

    for _ in 0..config.samples_per_pixel {
        // Camera.get_ray jitters the ray inside the pixel footprint
        let ray = camera.get_ray(x, y, rng);
        pixel_color += ray_color(&ray, world, config.max_depth, rng);
    }

    pixel_color
}
