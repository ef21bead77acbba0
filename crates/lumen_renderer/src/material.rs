//! Materials describing how light interacts with surfaces.

use crate::sampling::{gen_f32, random_unit_vector};
use crate::{HitRecord, Sample, Texture};
use lumen_math::{Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Outcome of a successful scatter.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    /// Color the scattered path is multiplied by
    pub attenuation: Color,
    /// Continuation ray
    pub scattered: Ray,
}

/// Surface response to an incoming ray.
pub trait Scatter: Send + Sync {
    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed.
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult>;

    /// Light emitted at the hit point. Most materials return black.
    fn emitted(&self, _rec: &HitRecord) -> Color {
        Color::ZERO
    }
}

/// Any material the renderer can shade.
#[derive(Clone)]
pub enum Material {
    Lambertian(Lambertian),
    Metal(Metal),
    Dielectric(Dielectric),
    DiffuseLight(DiffuseLight),
}

impl Material {
    pub fn lambertian(albedo: Color) -> Self {
        Material::Lambertian(Lambertian::new(albedo))
    }

    pub fn lambertian_textured(texture: impl Into<Arc<Texture>>) -> Self {
        Material::Lambertian(Lambertian::with_texture(texture))
    }

    pub fn metal(albedo: Color, fuzz: f32) -> Self {
        Material::Metal(Metal::new(albedo, fuzz))
    }

    pub fn metal_textured(texture: impl Into<Arc<Texture>>, fuzz: f32) -> Self {
        Material::Metal(Metal::with_texture(texture, fuzz))
    }

    pub fn dielectric(ior: f32) -> Self {
        Material::Dielectric(Dielectric::new(ior))
    }

    pub fn dielectric_textured(texture: impl Into<Arc<Texture>>, ior: f32) -> Self {
        Material::Dielectric(Dielectric::with_texture(texture, ior))
    }

    pub fn diffuse_light(emit: Color) -> Self {
        Material::DiffuseLight(DiffuseLight::new(emit))
    }

    pub fn diffuse_light_textured(texture: impl Into<Arc<Texture>>) -> Self {
        Material::DiffuseLight(DiffuseLight::with_texture(texture))
    }

    /// True if the material emits light.
    pub fn is_emissive(&self) -> bool {
        matches!(self, Material::DiffuseLight(_))
    }
}

impl Scatter for Material {
    #[inline]
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        match self {
            Material::Lambertian(m) => m.scatter(ray_in, rec, rng),
            Material::Metal(m) => m.scatter(ray_in, rec, rng),
            Material::Dielectric(m) => m.scatter(ray_in, rec, rng),
            Material::DiffuseLight(m) => m.scatter(ray_in, rec, rng),
        }
    }

    #[inline]
    fn emitted(&self, rec: &HitRecord) -> Color {
        match self {
            Material::Lambertian(m) => m.emitted(rec),
            Material::Metal(m) => m.emitted(rec),
            Material::Dielectric(m) => m.emitted(rec),
            Material::DiffuseLight(m) => m.emitted(rec),
        }
    }
}

/// Lambertian (diffuse) material.
#[derive(Clone)]
pub struct Lambertian {
    albedo: Arc<Texture>,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Color) -> Self {
        Self::with_texture(Texture::solid(albedo))
    }

    pub fn with_texture(albedo: impl Into<Arc<Texture>>) -> Self {
        Self {
            albedo: albedo.into(),
        }
    }
}

impl Scatter for Lambertian {
    fn scatter(&self, _ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let mut scatter_direction = rec.normal + random_unit_vector(rng);

        // Catch degenerate scatter direction
        if scatter_direction.length_squared() < 1e-8 {
            scatter_direction = rec.normal;
        }

        Some(ScatterResult {
            attenuation: self.albedo.value(rec.u, rec.v, rec.p),
            scattered: Ray::new(rec.p, scatter_direction),
        })
    }
}

/// Metal (specular) material.
#[derive(Clone)]
pub struct Metal {
    albedo: Arc<Texture>,
    fuzz: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror; negative values clamp to 0
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self::with_texture(Texture::solid(albedo), fuzz)
    }

    pub fn with_texture(albedo: impl Into<Arc<Texture>>, fuzz: f32) -> Self {
        Self {
            albedo: albedo.into(),
            fuzz: fuzz.max(0.0),
        }
    }

    pub fn fuzz(&self) -> f32 {
        self.fuzz
    }
}

impl Scatter for Metal {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let reflected = reflect(ray_in.direction().normalize(), rec.normal);
        let scattered_dir = if self.fuzz > 0.0 {
            reflected + self.fuzz * random_unit_vector(rng)
        } else {
            reflected
        };

        // Fuzz pushed the ray below the surface: absorbed
        if scattered_dir.dot(rec.normal) <= 0.0 {
            return None;
        }

        Some(ScatterResult {
            attenuation: self.albedo.value(rec.u, rec.v, rec.p),
            scattered: Ray::new(rec.p, scattered_dir),
        })
    }
}

/// Dielectric (glass) material.
#[derive(Clone)]
pub struct Dielectric {
    tint: Arc<Texture>,
    /// Index of refraction
    ior: f32,
}

impl Dielectric {
    /// Create a new clear Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f32) -> Self {
        Self::with_texture(Texture::solid(Color::ONE), ior)
    }

    /// Create a tinted dielectric.
    pub fn with_texture(tint: impl Into<Arc<Texture>>, ior: f32) -> Self {
        debug_assert!(ior > 0.0, "index of refraction must be positive");
        Self {
            tint: tint.into(),
            ior,
        }
    }

    pub fn ior(&self) -> f32 {
        self.ior
    }

    /// Schlick's approximation for reflectance
    fn reflectance(cosine: f32, ior: f32) -> f32 {
        let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Scatter for Dielectric {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let refraction_ratio = if rec.front_face { 1.0 / self.ior } else { self.ior };

        let unit_direction = ray_in.direction().normalize();
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        // Check for total internal reflection
        let cannot_refract = refraction_ratio * sin_theta > 1.0;

        // Matched indices form no interface, so nothing is reflected
        let reflects = cannot_refract
            || (refraction_ratio != 1.0
                && Self::reflectance(cos_theta, refraction_ratio) > gen_f32(rng));

        let direction = if reflects {
            reflect(unit_direction, rec.normal)
        } else {
            refract(unit_direction, rec.normal, refraction_ratio)
        };

        Some(ScatterResult {
            attenuation: self.tint.value(rec.u, rec.v, rec.p),
            scattered: Ray::new(rec.p, direction),
        })
    }
}

/// Diffuse light emitter. Emits from its front face only.
#[derive(Clone)]
pub struct DiffuseLight {
    emit: Arc<Texture>,
}

impl DiffuseLight {
    /// Create a new diffuse light with the given emission color.
    pub fn new(emit: Color) -> Self {
        Self::with_texture(Texture::solid(emit))
    }

    pub fn with_texture(emit: impl Into<Arc<Texture>>) -> Self {
        Self { emit: emit.into() }
    }
}

impl Scatter for DiffuseLight {
    fn scatter(&self, _ray_in: &Ray, _rec: &HitRecord, _rng: &mut dyn RngCore) -> Option<ScatterResult> {
        // Lights don't scatter rays
        None
    }

    fn emitted(&self, rec: &HitRecord) -> Color {
        if rec.front_face {
            self.emit.value(rec.u, rec.v, rec.p)
        } else {
            Color::ZERO
        }
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

/// Refract a unit vector through a surface.
#[inline]
fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}
