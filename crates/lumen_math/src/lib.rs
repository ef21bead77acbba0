//! Lumen math - shared geometric types for the path tracer.
//!
//! Re-exports `glam` and adds the ray, interval and bounding box types
//! used by every intersection routine.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
