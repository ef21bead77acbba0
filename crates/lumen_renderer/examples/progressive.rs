//! Progressive path tracer example.
//!
//! Renders a scene for a number of accumulated frames and saves the result
//! in PPM format.
//!
//! ```text
//! cargo run --release --example progressive -- [width] [height] [frames] [settings.json]
//! ```
//!
//! Set `RUST_LOG=debug` to see per-frame timings.

use anyhow::{Context, Result};
use lumen_renderer::{
    Aabb, BvhNode, Camera, Color, HitRecord, Hittable, Interval, Material, Plane, Ray,
    RenderSettings, Renderer, Scene, Sphere, Texture, Triangle, Vec3,
};
use rand::Rng;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Bounded objects behind a BVH plus unbounded planes scanned linearly.
struct World {
    bvh: BvhNode,
    planes: Scene,
}

impl Hittable for World {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let nearest = self.bvh.hit(ray, ray_t);
        let t_max = nearest.as_ref().map_or(ray_t.max, |rec| rec.t);
        self.planes.hit(ray, ray_t.with_max(t_max)).or(nearest)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        None
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let width: u32 = parse_arg(&args, 0, 640)?;
    let height: u32 = parse_arg(&args, 1, 360)?;
    let frames: u32 = parse_arg(&args, 2, 64)?;
    let settings = match args.get(3) {
        Some(path) => load_settings(Path::new(path))?,
        None => RenderSettings::default(),
    };

    println!("Lumen - Progressive Example");
    println!("===========================");

    let start = Instant::now();
    let world = build_world()?;
    println!("Scene built in {:?}", start.elapsed());

    let mut camera = Camera::new(45.0, 0.1, 100.0);
    camera.on_resize(width, height);
    camera.set_view(Vec3::new(0.0, 2.0, 9.0), Vec3::new(0.0, -0.15, -1.0));

    let mut renderer = Renderer::new(settings);
    renderer.on_resize(width, height);

    println!(
        "Rendering {}x{} for {} frames ({} bounces)...",
        width,
        height,
        frames,
        settings.max_bounces
    );

    let start = Instant::now();
    for _ in 0..frames {
        if renderer.status().is_converged() {
            break;
        }
        renderer.render(&world, &camera)?;
    }
    println!(
        "Accumulated {} frames in {:?}",
        renderer.status().frames_accumulated(),
        start.elapsed()
    );

    let filename = "progressive.ppm";
    save_ppm(&renderer, filename).with_context(|| format!("failed to write {}", filename))?;
    println!("Saved to {}", filename);

    Ok(())
}

fn parse_arg(args: &[String], index: usize, default: u32) -> Result<u32> {
    match args.get(index) {
        Some(value) => value
            .parse()
            .with_context(|| format!("argument {} must be an integer, got {:?}", index + 1, value)),
        None => Ok(default),
    }
}

fn load_settings(path: &Path) -> Result<RenderSettings> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let settings = serde_json::from_reader(file)
        .with_context(|| format!("invalid render settings in {}", path.display()))?;
    Ok(settings)
}

fn build_world() -> Result<World> {
    let mut planes = Scene::new();
    planes.add(Plane::new(
        Vec3::ZERO,
        Vec3::Y,
        Material::lambertian_textured(Texture::checker_colors(
            Color::new(0.2, 0.3, 0.1),
            Color::new(0.9, 0.9, 0.9),
        )),
    ));

    let mut objects = Scene::new();

    // Three main spheres
    objects.add(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, Material::dielectric(1.5)));
    objects.add(Sphere::new(
        Vec3::new(-2.2, 1.0, 0.0),
        1.0,
        Material::lambertian_textured(Texture::noise(
            Texture::solid(Color::new(0.8, 0.5, 0.3)),
            4.0,
        )),
    ));
    objects.add(Sphere::new(
        Vec3::new(2.2, 1.0, 0.0),
        1.0,
        Material::metal(Color::new(0.7, 0.6, 0.5), 0.05),
    ));

    // Emissive panel behind the spheres
    let light = Arc::new(Material::diffuse_light(Color::splat(4.0)));
    let (a, b, c, d) = (
        Vec3::new(-2.0, 3.5, -3.0),
        Vec3::new(2.0, 3.5, -3.0),
        Vec3::new(2.0, 5.5, -3.0),
        Vec3::new(-2.0, 5.5, -3.0),
    );
    objects.add(Triangle::new(a, b, c, Arc::clone(&light)));
    objects.add(Triangle::new(a, c, d, light));

    // Small random spheres
    let mut rng = rand::thread_rng();
    for x in -4..4 {
        for z in -3..2 {
            let center = Vec3::new(
                x as f32 + 0.9 * rng.gen::<f32>(),
                0.2,
                z as f32 + 0.9 * rng.gen::<f32>(),
            );
            if center.x.abs() < 3.3 && center.z.abs() < 1.3 {
                continue;
            }

            let albedo = Color::new(rng.gen(), rng.gen(), rng.gen());
            let material = match rng.gen::<f32>() {
                m if m < 0.7 => Material::lambertian(albedo * albedo),
                m if m < 0.9 => Material::metal(0.5 + 0.5 * albedo, 0.5 * rng.gen::<f32>()),
                _ => Material::dielectric(1.5),
            };
            objects.add(Sphere::new(center, 0.2, material));
        }
    }

    println!("Created {} objects", objects.len() + planes.len());
    let bvh = BvhNode::from_scene(&objects, &mut rng)?;

    Ok(World { bvh, planes })
}

fn save_ppm(renderer: &Renderer, filename: &str) -> std::io::Result<()> {
    let file = File::create(filename)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "P6")?;
    writeln!(writer, "{} {}", renderer.width(), renderer.height())?;
    writeln!(writer, "255")?;

    for pixel in renderer.display_bytes().chunks_exact(4) {
        writer.write_all(&pixel[..3])?;
    }
    writer.flush()
}
