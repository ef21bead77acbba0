//! Error types for the renderer.
//!
//! Intersection misses are never errors; these cover construction-time and
//! setup-time failures only.

use thiserror::Error;

/// Errors raised while building a BVH.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("cannot build a BVH from an empty object list")]
    Empty,

    #[error("object {index} has no bounding box and cannot be placed in a BVH")]
    MissingBoundingBox { index: usize },
}

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid pixel buffer: expected {expected} bytes for {width}x{height}x{channels}, got {actual}")]
    InvalidBuffer {
        width: u32,
        height: u32,
        channels: u32,
        expected: usize,
        actual: usize,
    },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// Errors raised by a render pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("camera provides {actual} ray directions but the viewport has {expected} pixels")]
    ViewportMismatch { expected: usize, actual: usize },
}
