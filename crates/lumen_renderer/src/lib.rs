//! Lumen - CPU path tracing
//!
//! A Monte Carlo path tracer for simple geometric scenes. Pixel radiance is
//! estimated by averaging stochastically sampled light paths; the image is
//! rendered in parallel row bands merged into a shared framebuffer.

mod hittable;
mod material;
mod sampling;
mod sphere;
mod camera;
mod integrator;
mod framebuffer;
mod scheduler;
pub mod encoder;

pub use hittable::{HitRecord, Hittable, Scene};
pub use material::{Color, Dielectric, Lambertian, Material, Metal, ScatterResult};
pub use sampling::{gen_f32, random_in_unit_disk, random_in_unit_sphere, random_unit_vector};
pub use sphere::Sphere;
pub use camera::Camera;
pub use integrator::{ray_color, render_pixel, RenderConfig};
pub use framebuffer::FrameBuffer;
pub use scheduler::{partition_rows, render, RowBand};
pub use encoder::EncodeError;

/// Re-export common math types from lumen_math
pub use lumen_math::{Interval, Ray, Vec3};
