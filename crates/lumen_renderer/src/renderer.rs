//! Progressive path tracing renderer.
//!
//! Each call to [`Renderer::render`] traces one path per pixel, adds it to a
//! running sum and writes the average to an 8-bit display buffer. Frames keep
//! accumulating until the settings cap is reached or something resets the
//! frame index.

use crate::{CameraView, Color, Hittable, RenderError, Scatter};
use lumen_math::{Interval, Ray, Vec4};
use rand::RngCore;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// One display pixel, RGBA with 8 bits per channel.
pub type Rgba8 = [u8; 4];

/// Minimum hit distance, keeps bounced rays from re-hitting their origin.
pub const T_MIN: f32 = 0.001;

/// Render configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Keep summing frames; when false every frame starts over
    pub accumulate: bool,
    /// Frames to accumulate before the image is considered converged
    pub max_frames: u32,
    /// Radiance returned by rays that escape the scene
    pub background: Color,
    /// Maximum path segments traced per sample
    pub max_bounces: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            accumulate: true,
            max_frames: 1000,
            background: Color::new(0.6, 0.7, 0.9),
            max_bounces: 10,
        }
    }
}

impl RenderSettings {
    pub fn with_accumulate(mut self, accumulate: bool) -> Self {
        self.accumulate = accumulate;
        self
    }

    pub fn with_max_frames(mut self, max_frames: u32) -> Self {
        self.max_frames = max_frames;
        self
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_max_bounces(mut self, max_bounces: u32) -> Self {
        self.max_bounces = max_bounces;
        self
    }
}

/// Snapshot of accumulation progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStatus {
    /// Index of the next frame to be rendered (1-based)
    pub frame_index: u32,
    pub max_frames: u32,
}

impl RenderStatus {
    /// Frames already folded into the display buffer.
    pub fn frames_accumulated(&self) -> u32 {
        self.frame_index.saturating_sub(1).min(self.max_frames)
    }

    /// True once the frame cap is reached and render passes are skipped.
    pub fn is_converged(&self) -> bool {
        self.frame_index > self.max_frames
    }
}

/// Progressive renderer owning the accumulation and display buffers.
pub struct Renderer {
    settings: RenderSettings,
    width: u32,
    height: u32,
    accumulation: Vec<Vec4>,
    display: Vec<Rgba8>,
    frame_index: u32,
}

impl Renderer {
    /// Create a renderer with an empty viewport.
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            width: 0,
            height: 0,
            accumulation: Vec::new(),
            display: Vec::new(),
            frame_index: 1,
        }
    }

    /// Resize the viewport, discarding accumulated frames.
    ///
    /// Calling this with the current size does nothing, so a windowed shell
    /// can call it every frame.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        if width == self.width && height == self.height {
            return;
        }

        log::info!(
            "Resizing render target {}x{} -> {}x{}",
            self.width,
            self.height,
            width,
            height
        );

        let pixel_count = width as usize * height as usize;
        self.width = width;
        self.height = height;
        self.accumulation = vec![Vec4::ZERO; pixel_count];
        self.display = vec![[0, 0, 0, 255]; pixel_count];
        self.reset_frame_index();
    }

    /// Render one progressive frame and return the display buffer.
    ///
    /// Once more than `max_frames` frames are accumulated the pass is skipped
    /// and the previous image is returned until the frame index is reset.
    pub fn render(
        &mut self,
        scene: &dyn Hittable,
        camera: &dyn CameraView,
    ) -> Result<&[Rgba8], RenderError> {
        let width = self.width as usize;
        let expected = width * self.height as usize;
        let directions = camera.ray_directions();
        if directions.len() != expected {
            return Err(RenderError::ViewportMismatch {
                expected,
                actual: directions.len(),
            });
        }

        if self.frame_index == 1 {
            self.accumulation.fill(Vec4::ZERO);
        }

        let max_frames = self.settings.max_frames.max(1);
        if self.frame_index > max_frames {
            return Ok(&self.display);
        }

        let start = Instant::now();
        let settings = self.settings;
        let origin = camera.position();
        let inv_frame = 1.0 / self.frame_index as f32;

        if width > 0 {
            self.accumulation
                .par_chunks_mut(width)
                .zip(self.display.par_chunks_mut(width))
                .enumerate()
                .for_each(|(y, (accumulation_row, display_row))| {
                    let mut rng = rand::thread_rng();
                    let row_directions = &directions[y * width..(y + 1) * width];

                    for ((sum, pixel), &direction) in accumulation_row
                        .iter_mut()
                        .zip(display_row.iter_mut())
                        .zip(row_directions)
                    {
                        let ray = Ray::new(origin, direction);
                        let color = trace(&ray, scene, &settings, &mut rng);

                        *sum += color.extend(1.0);
                        *pixel = color_to_rgba(*sum * inv_frame);
                    }
                });
        }

        log::debug!(
            "Frame {} ({}x{}) rendered in {:.2?}",
            self.frame_index,
            self.width,
            self.height,
            start.elapsed()
        );

        if settings.accumulate {
            self.frame_index += 1;
        } else {
            self.frame_index = 1;
        }

        Ok(&self.display)
    }

    /// Restart accumulation on the next frame.
    pub fn reset_frame_index(&mut self) {
        self.frame_index = 1;
    }

    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    pub fn status(&self) -> RenderStatus {
        RenderStatus {
            frame_index: self.frame_index,
            max_frames: self.settings.max_frames.max(1),
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Mutable settings. Changes apply from the next frame without
    /// resetting accumulation.
    pub fn settings_mut(&mut self) -> &mut RenderSettings {
        &mut self.settings
    }

    /// Replace the settings and restart accumulation.
    pub fn set_settings(&mut self, settings: RenderSettings) {
        self.settings = settings;
        self.reset_frame_index();
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Display buffer, row-major with row 0 at the top.
    pub fn display(&self) -> &[Rgba8] {
        &self.display
    }

    /// Display buffer as tightly packed RGBA bytes.
    pub fn display_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.display)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RenderSettings::default())
    }
}

/// Trace a single path and return the radiance it carries.
///
/// Runs at most `max_bounces` segments; escaping rays pick up the
/// background.
pub fn trace(
    ray: &Ray,
    scene: &dyn Hittable,
    settings: &RenderSettings,
    rng: &mut dyn RngCore,
) -> Color {
    let mut ray = *ray;
    let mut color = Color::ZERO;
    let mut attenuation = Color::ONE;

    for _ in 0..settings.max_bounces {
        let Some(rec) = scene.hit(&ray, Interval::new(T_MIN, f32::MAX)) else {
            color += attenuation * settings.background;
            break;
        };

        color += attenuation * rec.material.emitted(&rec);

        match rec.material.scatter(&ray, &rec, rng) {
            Some(result) => {
                attenuation *= result.attenuation;
                ray = result.scattered;
            }
            None => break,
        }
    }

    color
}

/// Convert an averaged color to 8-bit RGBA, clamping to [0, 1].
#[inline]
pub fn color_to_rgba(color: Vec4) -> Rgba8 {
    let c = color.truncate().clamp(Color::ZERO, Color::ONE) * 255.0;
    [c.x as u8, c.y as u8, c.z as u8, 255]
}
