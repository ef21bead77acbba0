//! Texture model: position/UV dependent colors fed to materials.
//!
//! Textures are a closed enum dispatched through [`Sample`]. Composite
//! textures (checker, noise) hold their children behind `Arc` so the same
//! texture can be shared by several materials.

use crate::{Color, TextureError, TextureResult};
use lumen_math::Vec3;
use noise::{NoiseFn, Perlin};
use std::path::Path;
use std::sync::Arc;

/// Color returned by an image texture with nothing loaded.
pub const MISSING_TEXTURE_COLOR: Color = Color::new(1.0, 0.0, 1.0);

/// Number of octaves summed by [`NoiseTexture::turbulence`].
const TURBULENCE_DEPTH: u32 = 7;

/// Something that yields a color for a surface point.
pub trait Sample: Send + Sync {
    /// Color at surface coordinates `(u, v)` and world position `p`.
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color;
}

/// Any texture the renderer can sample.
#[derive(Clone)]
pub enum Texture {
    Solid(SolidColor),
    Checker(CheckerTexture),
    Image(ImageTexture),
    Noise(NoiseTexture),
}

impl Texture {
    pub fn solid(color: Color) -> Self {
        Texture::Solid(SolidColor::new(color))
    }

    pub fn checker(odd: impl Into<Arc<Texture>>, even: impl Into<Arc<Texture>>) -> Self {
        Texture::Checker(CheckerTexture::new(odd, even))
    }

    pub fn checker_colors(odd: Color, even: Color) -> Self {
        Self::checker(Texture::solid(odd), Texture::solid(even))
    }

    pub fn image(image: ImageTexture) -> Self {
        Texture::Image(image)
    }

    pub fn noise(base: impl Into<Arc<Texture>>, scale: f32) -> Self {
        Texture::Noise(NoiseTexture::new(base, scale))
    }
}

impl Sample for Texture {
    #[inline]
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        match self {
            Texture::Solid(t) => t.value(u, v, p),
            Texture::Checker(t) => t.value(u, v, p),
            Texture::Image(t) => t.value(u, v, p),
            Texture::Noise(t) => t.value(u, v, p),
        }
    }
}

impl From<Color> for Texture {
    fn from(color: Color) -> Self {
        Texture::solid(color)
    }
}

// =============================================================================
// Solid color
// =============================================================================

/// A constant color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolidColor {
    color: Color,
}

impl SolidColor {
    pub fn new(color: Color) -> Self {
        Self { color }
    }

    pub fn color(&self) -> Color {
        self.color
    }
}

impl Sample for SolidColor {
    fn value(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
        self.color
    }
}

// =============================================================================
// Checker
// =============================================================================

/// 3D checker pattern alternating between two textures.
///
/// Cells are selected by the sign of `sin(10x)·sin(10y)·sin(10z)`, so the
/// pattern is solid in space rather than painted on the surface.
#[derive(Clone)]
pub struct CheckerTexture {
    odd: Arc<Texture>,
    even: Arc<Texture>,
}

impl CheckerTexture {
    pub fn new(odd: impl Into<Arc<Texture>>, even: impl Into<Arc<Texture>>) -> Self {
        Self {
            odd: odd.into(),
            even: even.into(),
        }
    }
}

impl Sample for CheckerTexture {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        let sines = (10.0 * p.x).sin() * (10.0 * p.y).sin() * (10.0 * p.z).sin();
        if sines < 0.0 {
            self.odd.value(u, v, p)
        } else {
            self.even.value(u, v, p)
        }
    }
}

// =============================================================================
// Image
// =============================================================================

/// Decoded 8-bit image, row-major with row 0 at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    /// Bytes per pixel
    pub channels: u32,
    pub pixels: Vec<u8>,
}

impl ImageData {
    /// Bytes per row.
    pub fn stride(&self) -> usize {
        (self.channels * self.width) as usize
    }

    /// Color of the pixel at integer coordinates, scaled to [0, 1].
    fn texel(&self, i: u32, j: u32) -> Color {
        const COLOR_SCALE: f32 = 1.0 / 255.0;

        let offset = j as usize * self.stride() + (i * self.channels) as usize;
        let px = &self.pixels[offset..offset + self.channels as usize];
        match px {
            [r, g, b, ..] => Color::new(*r as f32, *g as f32, *b as f32) * COLOR_SCALE,
            [l, ..] => Color::splat(*l as f32 * COLOR_SCALE),
            [] => MISSING_TEXTURE_COLOR,
        }
    }
}

/// Texture sampled from a decoded image with nearest-neighbor lookup.
///
/// An image texture with no pixels loaded returns [`MISSING_TEXTURE_COLOR`].
#[derive(Debug, Clone, Default)]
pub struct ImageTexture {
    image: Option<Arc<ImageData>>,
}

impl ImageTexture {
    /// An image texture with nothing loaded.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap raw decoded bytes.
    pub fn from_raw(width: u32, height: u32, channels: u32, pixels: Vec<u8>) -> TextureResult<Self> {
        let expected = width as usize * height as usize * channels as usize;
        if channels == 0 || pixels.len() != expected {
            return Err(TextureError::InvalidBuffer {
                width,
                height,
                channels,
                expected,
                actual: pixels.len(),
            });
        }

        let image = (width > 0 && height > 0).then(|| {
            Arc::new(ImageData {
                width,
                height,
                channels,
                pixels,
            })
        });
        Ok(Self { image })
    }

    /// Decode an image file as 8-bit RGB.
    pub fn open(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let rgb = image::load_from_memory(&bytes)?.to_rgb8();
        let (width, height) = rgb.dimensions();
        log::debug!("Loaded texture {} ({}x{})", path.display(), width, height);
        Self::from_raw(width, height, 3, rgb.into_raw())
    }

    /// Decode an image file, falling back to an empty texture on failure.
    pub fn load_or_fallback(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::open(path) {
            Ok(texture) => texture,
            Err(e) => {
                log::warn!("Failed to load texture {}: {}", path.display(), e);
                Self::empty()
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.image.is_some()
    }

    pub fn data(&self) -> Option<&ImageData> {
        self.image.as_deref()
    }
}

impl Sample for ImageTexture {
    fn value(&self, u: f32, v: f32, _p: Vec3) -> Color {
        let Some(image) = self.image.as_deref() else {
            return MISSING_TEXTURE_COLOR;
        };

        // Clamp input texture coordinates to [0,1] x [1,0]
        let u = u.clamp(0.0, 1.0);
        let v = 1.0 - v.clamp(0.0, 1.0);

        let i = ((u * image.width as f32) as u32).min(image.width - 1);
        let j = ((v * image.height as f32) as u32).min(image.height - 1);

        image.texel(i, j)
    }
}

// =============================================================================
// Noise
// =============================================================================

/// Marble-like procedural texture modulating a base texture with
/// Perlin turbulence.
#[derive(Clone)]
pub struct NoiseTexture {
    base: Arc<Texture>,
    scale: f32,
    perlin: Perlin,
}

impl NoiseTexture {
    pub const DEFAULT_SEED: u32 = 0;

    pub fn new(base: impl Into<Arc<Texture>>, scale: f32) -> Self {
        Self::with_seed(base, scale, Self::DEFAULT_SEED)
    }

    pub fn with_seed(base: impl Into<Arc<Texture>>, scale: f32, seed: u32) -> Self {
        Self {
            base: base.into(),
            scale,
            perlin: Perlin::new(seed),
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Sum of `depth` octaves of Perlin noise, each at double the frequency
    /// and half the amplitude of the previous one.
    pub fn turbulence(&self, p: Vec3, depth: u32) -> f32 {
        let mut accum = 0.0;
        let mut weight = 1.0;
        let mut temp = p.as_dvec3();

        for _ in 0..depth {
            accum += weight * self.perlin.get([temp.x, temp.y, temp.z]);
            weight *= 0.5;
            temp *= 2.0;
        }

        accum as f32
    }
}

impl Sample for NoiseTexture {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        let s = self.scale;
        let modulation = 0.5 * (1.0 + (s * p.z).sin() + 10.0 * self.turbulence(s * p, TURBULENCE_DEPTH));
        self.base.value(u, v, p) * modulation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::new(1.0, 0.0, 0.0);
    const BLUE: Color = Color::new(0.0, 0.0, 1.0);

    #[test]
    fn test_solid_ignores_inputs() {
        let t = Texture::solid(RED);
        assert_eq!(t.value(0.0, 0.0, Vec3::ZERO), RED);
        assert_eq!(t.value(0.7, 0.2, Vec3::new(5.0, -3.0, 1.0)), RED);
    }

    #[test]
    fn test_checker_is_three_dimensional() {
        let t = Texture::checker_colors(RED, BLUE);

        // All three sines positive: even
        let p = Vec3::splat(0.1);
        assert_eq!(t.value(0.0, 0.0, p), BLUE);

        // Flip one axis into a negative lobe: odd
        let p = Vec3::new(-0.1, 0.1, 0.1);
        assert_eq!(t.value(0.0, 0.0, p), RED);

        // Flip two axes: even again
        let p = Vec3::new(-0.1, -0.1, 0.1);
        assert_eq!(t.value(0.0, 0.0, p), BLUE);

        // UV plays no part
        assert_eq!(t.value(0.9, 0.9, Vec3::splat(0.1)), BLUE);
    }

    #[test]
    fn test_checker_nested_textures() {
        let inner = Arc::new(Texture::checker_colors(RED, BLUE));
        let outer = Texture::checker(Arc::clone(&inner), Texture::solid(Color::ONE));

        assert_eq!(outer.value(0.0, 0.0, Vec3::splat(0.1)), Color::ONE);
        // Odd cell of outer delegates to inner, which is also odd at this point
        assert_eq!(outer.value(0.0, 0.0, Vec3::new(-0.1, 0.1, 0.1)), RED);
    }

    fn assert_close(a: Color, b: Color) {
        assert!((a - b).abs().max_element() < 1e-6, "{a} != {b}");
    }

    fn two_by_two() -> ImageTexture {
        // Row 0 (top): red, green. Row 1 (bottom): blue, white.
        #[rustfmt::skip]
        let pixels = vec![
            255, 0, 0,     0, 255, 0,
            0, 0, 255,     255, 255, 255,
        ];
        ImageTexture::from_raw(2, 2, 3, pixels).unwrap()
    }

    #[test]
    fn test_image_flips_v() {
        let t = two_by_two();

        // v = 1 is the top row
        assert_close(t.value(0.1, 0.9, Vec3::ZERO), RED);
        assert_close(t.value(0.9, 0.9, Vec3::ZERO), Color::new(0.0, 1.0, 0.0));
        // v = 0 is the bottom row
        assert_close(t.value(0.1, 0.1, Vec3::ZERO), BLUE);
        assert_close(t.value(0.9, 0.1, Vec3::ZERO), Color::ONE);
    }

    #[test]
    fn test_image_clamps_uv() {
        let t = two_by_two();

        assert_close(t.value(-3.0, 7.0, Vec3::ZERO), RED);
        assert_close(t.value(1.0, 0.0, Vec3::ZERO), Color::ONE);
        assert_close(t.value(5.0, -5.0, Vec3::ZERO), Color::ONE);
    }

    #[test]
    fn test_image_grayscale_replicates_channel() {
        let t = ImageTexture::from_raw(1, 1, 1, vec![51]).unwrap();
        assert_close(t.value(0.5, 0.5, Vec3::ZERO), Color::splat(0.2));
    }

    #[test]
    fn test_image_missing_returns_fallback() {
        let t = ImageTexture::empty();
        assert!(!t.is_loaded());
        assert_eq!(t.value(0.5, 0.5, Vec3::ZERO), MISSING_TEXTURE_COLOR);
    }

    #[test]
    fn test_image_rejects_short_buffer() {
        let err = ImageTexture::from_raw(2, 2, 3, vec![0; 5]).unwrap_err();
        assert!(matches!(err, TextureError::InvalidBuffer { expected: 12, actual: 5, .. }));
    }

    #[test]
    fn test_image_open_reports_io_and_decode_errors() {
        let missing = ImageTexture::open("definitely/not/a/texture.png");
        assert!(matches!(missing, Err(TextureError::Io(_))));

        let path = std::env::temp_dir().join(format!("lumen-not-an-image-{}.png", std::process::id()));
        std::fs::write(&path, b"plain text, not pixels").unwrap();
        let garbage = ImageTexture::open(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(garbage, Err(TextureError::Image(_))));
    }

    #[test]
    fn test_image_load_failure_falls_back() {
        let t = ImageTexture::load_or_fallback("definitely/not/a/texture.png");
        assert!(!t.is_loaded());
        assert_eq!(Texture::image(t).value(0.3, 0.3, Vec3::ZERO), MISSING_TEXTURE_COLOR);
    }

    #[test]
    fn test_noise_is_deterministic_and_finite() {
        let a = Texture::noise(Texture::solid(Color::ONE), 4.0);
        let b = Texture::noise(Texture::solid(Color::ONE), 4.0);

        for i in 0..50 {
            let p = Vec3::new(i as f32 * 0.37, i as f32 * -0.11, i as f32 * 0.05);
            let ca = a.value(0.0, 0.0, p);
            assert!(ca.is_finite());
            assert_eq!(ca, b.value(0.0, 0.0, p));
            // Grey base keeps the channels equal
            assert_eq!(ca.x, ca.y);
            assert_eq!(ca.y, ca.z);
        }
    }

    #[test]
    fn test_noise_modulates_base_color() {
        let noise = NoiseTexture::new(Texture::solid(RED), 1.0);
        // At the origin sin(0) = 0 and Perlin noise vanishes on lattice points
        let c = noise.value(0.0, 0.0, Vec3::ZERO);
        assert!((c - RED * 0.5).length() < 1e-5);
    }

    #[test]
    fn test_turbulence_is_signed_octave_sum() {
        let noise = NoiseTexture::new(Texture::solid(Color::ONE), 1.0);
        let perlin = Perlin::new(NoiseTexture::DEFAULT_SEED);

        for i in 0..100 {
            let p = Vec3::new(i as f32 * 0.173, 1.3, -(i as f32) * 0.07);
            let expected: f64 = (0..TURBULENCE_DEPTH)
                .map(|octave| {
                    let f = f64::from(1u32 << octave);
                    let q = p.as_dvec3() * f;
                    perlin.get([q.x, q.y, q.z]) / f
                })
                .sum();
            assert!((noise.turbulence(p, TURBULENCE_DEPTH) - expected as f32).abs() < 1e-5);
        }

        // Lattice points vanish at every octave
        assert_eq!(noise.turbulence(Vec3::new(1.0, 2.0, 3.0), TURBULENCE_DEPTH), 0.0);
    }
}
