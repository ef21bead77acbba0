//! Infinite plane primitive.
//!
//! Planes are unbounded, so they report no bounding box and must be
//! intersected through a [`crate::Scene`] rather than a BVH.

use crate::{HitRecord, Hittable, Material};
use lumen_math::{Aabb, Interval, Ray, Vec3};
use std::sync::Arc;

/// Rays closer than this to parallel with the plane are treated as misses.
const PARALLEL_EPSILON: f32 = 1e-6;

/// Axis-aligned facing presets for planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneOrientation {
    Left,
    Right,
    Up,
    Down,
    Front,
    Back,
}

impl PlaneOrientation {
    /// Preset facing directions, in declaration order.
    pub const ALL: [(PlaneOrientation, Vec3); 6] = [
        (PlaneOrientation::Left, Vec3::NEG_X),
        (PlaneOrientation::Right, Vec3::X),
        (PlaneOrientation::Up, Vec3::Y),
        (PlaneOrientation::Down, Vec3::NEG_Y),
        (PlaneOrientation::Front, Vec3::NEG_Z),
        (PlaneOrientation::Back, Vec3::Z),
    ];

    pub fn normal(self) -> Vec3 {
        match self {
            PlaneOrientation::Left => Vec3::NEG_X,
            PlaneOrientation::Right => Vec3::X,
            PlaneOrientation::Up => Vec3::Y,
            PlaneOrientation::Down => Vec3::NEG_Y,
            PlaneOrientation::Front => Vec3::NEG_Z,
            PlaneOrientation::Back => Vec3::Z,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PlaneOrientation::Left => "LEFT",
            PlaneOrientation::Right => "RIGHT",
            PlaneOrientation::Up => "UP",
            PlaneOrientation::Down => "DOWN",
            PlaneOrientation::Front => "FRONT",
            PlaneOrientation::Back => "BACK",
        }
    }

    /// Classify an arbitrary normal as the last preset it points towards.
    pub fn classify(normal: Vec3) -> Option<PlaneOrientation> {
        Self::ALL
            .iter()
            .rev()
            .find(|(_, n)| normal.dot(*n) > 0.0)
            .map(|(kind, _)| *kind)
    }
}

/// An infinite plane through `point`.
///
/// The normal handed to the constructor is stored negated; the stored
/// normal is the outward normal used for front/back face classification.
#[derive(Clone)]
pub struct Plane {
    point: Vec3,
    normal: Vec3,
    orientation: Option<PlaneOrientation>,
    material: Arc<Material>,
}

impl Plane {
    /// Create a plane through `point` facing `normal`.
    pub fn new(point: Vec3, normal: Vec3, material: impl Into<Arc<Material>>) -> Self {
        Self {
            point,
            normal: -normal,
            orientation: PlaneOrientation::classify(normal),
            material: material.into(),
        }
    }

    /// Create a plane facing one of the axis presets.
    pub fn with_orientation(
        point: Vec3,
        orientation: PlaneOrientation,
        material: impl Into<Arc<Material>>,
    ) -> Self {
        let mut plane = Self::new(point, orientation.normal(), material);
        plane.orientation = Some(orientation);
        plane
    }

    pub fn point(&self) -> Vec3 {
        self.point
    }

    /// The stored (negated) normal.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Preset the constructor normal was classified as, if any.
    pub fn orientation(&self) -> Option<PlaneOrientation> {
        self.orientation
    }

    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    /// Tangent frame spanning the plane.
    ///
    /// Picks the longest of the cross products with the world axes so the
    /// tangent never degenerates, whatever the normal.
    fn tangent_frame(&self) -> (Vec3, Vec3) {
        let n = self.normal;
        let a = n.cross(Vec3::X);
        let b = n.cross(Vec3::Y);
        let max_ab = if a.length_squared() < b.length_squared() { b } else { a };
        let c = n.cross(Vec3::Z);

        let u_axis = if max_ab.length_squared() < c.length_squared() {
            c
        } else {
            max_ab
        }
        .normalize();
        let v_axis = n.cross(u_axis);
        (u_axis, v_axis)
    }
}

impl Hittable for Plane {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let denominator = self.normal.dot(ray.direction());
        if denominator.abs() <= PARALLEL_EPSILON {
            return None;
        }

        let t = (self.point - ray.origin()).dot(self.normal) / denominator;
        if t < 0.0 || !ray_t.contains(t) {
            return None;
        }

        let (u_axis, v_axis) = self.tangent_frame();
        let local = ray.at(t) - self.point;
        let uv = (local.dot(u_axis), local.dot(v_axis));

        Some(HitRecord::new(ray, t, self.normal, uv, &self.material))
    }

    fn bounding_box(&self) -> Option<Aabb> {
        None
    }
}
