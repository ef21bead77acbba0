//! Lumen renderer - progressive CPU path tracing.
//!
//! A Monte Carlo path tracer that refines its estimate frame by frame:
//!
//! - **Geometry**: spheres, infinite planes and triangles behind the
//!   [`Hittable`] capability, aggregated by a linear [`Scene`] or a [`BvhNode`].
//! - **Shading**: [`Texture`] and [`Material`] families that turn a hit into
//!   an attenuation and a scattered ray.
//! - **Integration**: [`Renderer`] traces one sample per pixel per frame in
//!   parallel and averages the running sum into a display buffer.
//!
//! # Example
//!
//! ```ignore
//! use lumen_renderer::*;
//!
//! let mut scene = Scene::new();
//! scene.add(Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, Material::lambertian(Color::splat(0.5))));
//!
//! let mut camera = Camera::new(45.0, 0.1, 100.0);
//! camera.on_resize(320, 180);
//!
//! let mut renderer = Renderer::new(RenderSettings::default());
//! renderer.on_resize(320, 180);
//! let pixels = renderer.render(&scene, &camera)?;
//! ```

mod bvh;
mod camera;
mod error;
mod hittable;
mod material;
mod plane;
mod primitive;
mod renderer;
mod sampling;
mod scene;
mod sphere;
mod texture;
mod triangle;

pub use bvh::{BvhChild, BvhNode};
pub use camera::{Camera, CameraView};
pub use error::{BuildError, RenderError, TextureError, TextureResult};
pub use hittable::{HitRecord, Hittable};
pub use material::{
    Color, Dielectric, DiffuseLight, Lambertian, Material, Metal, Scatter, ScatterResult,
};
pub use plane::{Plane, PlaneOrientation};
pub use primitive::Primitive;
pub use renderer::{
    color_to_rgba, trace, RenderSettings, RenderStatus, Renderer, Rgba8, T_MIN,
};
pub use sampling::{gen_f32, random_in_unit_sphere, random_unit_vector};
pub use scene::Scene;
pub use sphere::Sphere;
pub use texture::{
    CheckerTexture, ImageData, ImageTexture, NoiseTexture, Sample, SolidColor, Texture,
    MISSING_TEXTURE_COLOR,
};
pub use triangle::Triangle;

/// Re-export Vec3 and common math types from lumen_math
pub use lumen_math::{Aabb, Interval, Ray, Vec3, Vec4};
