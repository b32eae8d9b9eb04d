//! Material trait for surface scattering.

use crate::hittable::HitRecord;
use crate::sampling::{gen_f32, random_in_unit_sphere, random_unit_vector};
use lumen_math::{Ray, Vec3};
use rand::RngCore;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Result of a successful scattering event.
pub struct ScatterResult {
    /// Color multiplier applied to the scattered ray's contribution
    pub attenuation: Color,
    /// The continuation ray leaving the surface
    pub scattered: Ray,
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray.
    ///
    /// Returns the attenuation and scattered ray if the ray continues,
    /// or `None` if it is absorbed.
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult>;
}

/// Lambertian (diffuse) material.
#[derive(Clone)]
pub struct Lambertian {
    albedo: Color,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }
}

impl Material for Lambertian {
    fn scatter(
        &self,
        _ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let mut scatter_direction = rec.normal + random_unit_vector(rng);

        // Catch degenerate scatter direction
        if scatter_direction.length_squared() < 1e-8 {
            scatter_direction = rec.normal;
        }

        Some(ScatterResult {
            attenuation: self.albedo,
            scattered: Ray::new(rec.p, scatter_direction),
        })
    }
}

/// Metal (specular) material.
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }
}

impl Material for Metal {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let reflected = reflect(ray_in.direction, rec.normal);
        let scattered_dir = reflected + self.fuzz * random_in_unit_sphere(rng);

        // Only scatter if the perturbed ray leaves the surface; a fuzzed
        // reflection that dips below the horizon is absorbed.
        if scattered_dir.dot(rec.normal) > 0.0 {
            Some(ScatterResult {
                attenuation: self.albedo,
                scattered: Ray::new(rec.p, scattered_dir),
            })
        } else {
            None
        }
    }
}

/// Dielectric (glass) material.
pub struct Dielectric {
    /// Index of refraction
    refraction_index: f32,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `refraction_index`: 1.0 = air, 1.5 = glass, 2.4 = diamond
    pub fn new(refraction_index: f32) -> Self {
        Self { refraction_index }
    }

    /// Schlick's approximation for reflectance
    fn reflectance(cosine: f32, refraction_index: f32) -> f32 {
        let r0 = ((1.0 - refraction_index) / (1.0 + refraction_index)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        // Glass absorbs nothing
        let attenuation = Color::ONE;
        let refraction_ratio = if rec.front_face {
            1.0 / self.refraction_index
        } else {
            self.refraction_index
        };

        let unit_direction = ray_in.direction.normalize();
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        // Check for total internal reflection
        let cannot_refract = refraction_ratio * sin_theta > 1.0;

        let direction = if cannot_refract
            || Self::reflectance(cos_theta, refraction_ratio) > gen_f32(rng)
        {
            reflect(unit_direction, rec.normal)
        } else {
            refract(unit_direction, rec.normal, refraction_ratio)
        };

        Some(ScatterResult {
            attenuation,
            scattered: Ray::new(rec.p, direction),
        })
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Reflect a vector about a normal.
#[inline]
fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a vector through a surface.
#[inline]
fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn hit_on<'a>(material: &'a dyn Material, normal: Vec3, front_face: bool) -> HitRecord<'a> {
        HitRecord {
            p: Vec3::ZERO,
            normal,
            material,
            t: 1.0,
            front_face,
        }
    }

    #[test]
    fn test_lambertian_attenuation_is_albedo() {
        let albedo = Color::new(0.8, 0.3, 0.1);
        let mat = Lambertian::new(albedo);
        let rec = hit_on(&mat, Vec3::Z, true);
        let ray = Ray::new(Vec3::Z, Vec3::NEG_Z);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..32 {
            let result = mat.scatter(&ray, &rec, &mut rng).expect("always scatters");
            assert_eq!(result.attenuation, albedo);
            // Scattered direction is normal + unit vector: never zero, and
            // never more than 90 degrees past the tangent plane.
            assert!(result.scattered.direction.length_squared() > 0.0);
        }
    }

    #[test]
    fn test_metal_zero_fuzz_is_perfect_mirror() {
        let mat = Metal::new(Color::new(0.7, 0.6, 0.5), 0.0);
        let rec = hit_on(&mat, Vec3::Z, true);
        // Unnormalized incoming direction on purpose: the mirror reflection
        // must be exact for any scale.
        let incoming = Vec3::new(2.0, 0.0, -2.0);
        let ray = Ray::new(Vec3::new(-2.0, 0.0, 2.0), incoming);
        let mut rng = StdRng::seed_from_u64(42);

        let result = mat.scatter(&ray, &rec, &mut rng).expect("mirror scatters");
        let expected = incoming - 2.0 * incoming.dot(Vec3::Z) * Vec3::Z;
        assert_eq!(result.scattered.direction, expected);
        assert_eq!(result.attenuation, Color::new(0.7, 0.6, 0.5));
    }

    #[test]
    fn test_metal_fuzz_clamped_at_construction() {
        let mat = Metal::new(Color::ONE, 7.0);
        assert_eq!(mat.fuzz, 1.0);

        let mat = Metal::new(Color::ONE, -1.0);
        assert_eq!(mat.fuzz, 0.0);
    }

    #[test]
    fn test_metal_absorbs_below_horizon() {
        // Grazing incidence with heavy fuzz: some perturbed rays dip below
        // the surface and must be absorbed rather than scattered.
        let mat = Metal::new(Color::ONE, 1.0);
        let rec = hit_on(&mat, Vec3::Z, true);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, -1e-3).normalize());
        let mut rng = StdRng::seed_from_u64(42);

        let mut absorbed = 0;
        for _ in 0..256 {
            if mat.scatter(&ray, &rec, &mut rng).is_none() {
                absorbed += 1;
            }
        }
        assert!(absorbed > 0, "grazing fuzzy metal should absorb some rays");
    }

    #[test]
    fn test_dielectric_attenuation_is_white() {
        let mat = Dielectric::new(1.5);
        let rec = hit_on(&mat, Vec3::Z, true);
        let ray = Ray::new(Vec3::Z, Vec3::NEG_Z);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..32 {
            let result = mat.scatter(&ray, &rec, &mut rng).expect("glass always scatters");
            assert_eq!(result.attenuation, Color::ONE);
        }
    }

    #[test]
    fn test_dielectric_total_internal_reflection() {
        // Exiting glass at grazing incidence: ratio * sin_theta > 1 forces a
        // reflection regardless of what the generator produces.
        let mat = Dielectric::new(1.5);
        let rec = hit_on(&mat, Vec3::Z, false);
        let incoming = Vec3::new(1.0, 0.0, -0.1).normalize();
        let ray = Ray::new(Vec3::ZERO, incoming);

        let expected = reflect(incoming, Vec3::Z);
        for seed in 0..8 {
            let mut rng = StdRng::seed_from_u64(seed);
            let result = mat.scatter(&ray, &rec, &mut rng).expect("TIR still scatters");
            assert!((result.scattered.direction - expected).length() < 1e-6);
        }
    }

    #[test]
    fn test_dielectric_normal_incidence_reflects_or_refracts() {
        // Head-on entry: the scattered ray is either the straight-through
        // refraction or the mirror reflection, chosen stochastically.
        let mat = Dielectric::new(1.5);
        let rec = hit_on(&mat, Vec3::Z, true);
        let ray = Ray::new(Vec3::Z, Vec3::NEG_Z);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..64 {
            let result = mat.scatter(&ray, &rec, &mut rng).expect("glass always scatters");
            let d = result.scattered.direction;
            let is_refracted = (d - Vec3::NEG_Z).length() < 1e-6;
            let is_reflected = (d - Vec3::Z).length() < 1e-6;
            assert!(is_refracted || is_reflected);
        }
    }

    #[test]
    fn test_reflect_formula() {
        let v = Vec3::new(1.0, -1.0, 0.0);
        let n = Vec3::Y;
        assert_eq!(reflect(v, n), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_refract_straight_through_matched_media() {
        // Equal refraction indices bend nothing
        let uv = Vec3::new(0.6, -0.8, 0.0);
        let refracted = refract(uv, Vec3::Y, 1.0);
        assert!((refracted - uv).length() < 1e-6);
    }
}
