//! Brute-force scene aggregate.

use crate::{HitRecord, Hittable, Primitive};
use lumen_math::{Aabb, Interval, Ray};
use std::sync::Arc;

/// An unordered list of primitives, intersected by linear scan.
///
/// This is the only aggregate that accepts unbounded primitives such as
/// planes.
#[derive(Clone, Default)]
pub struct Scene {
    objects: Vec<Arc<Primitive>>,
}

impl Scene {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a primitive and return its shared handle.
    pub fn add(&mut self, object: impl Into<Primitive>) -> Arc<Primitive> {
        let object = Arc::new(object.into());
        self.objects.push(Arc::clone(&object));
        object
    }

    /// Add an already shared primitive.
    pub fn add_shared(&mut self, object: Arc<Primitive>) {
        self.objects.push(object);
    }

    /// Remove all objects from the scene.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    pub fn objects(&self) -> &[Arc<Primitive>] {
        &self.objects
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl From<Vec<Primitive>> for Scene {
    fn from(objects: Vec<Primitive>) -> Self {
        Self {
            objects: objects.into_iter().map(Arc::new).collect(),
        }
    }
}

impl Hittable for Scene {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let mut closest: Option<HitRecord<'_>> = None;

        for object in &self.objects {
            let t_max = closest.as_ref().map_or(ray_t.max, |rec| rec.t);
            if let Some(rec) = object.hit(ray, ray_t.with_max(t_max)) {
                closest = Some(rec);
            }
        }

        closest
    }

    fn bounding_box(&self) -> Option<Aabb> {
        let mut boxes = self.objects.iter().map(|o| o.bounding_box());
        let first = boxes.next()??;
        boxes.try_fold(first, |acc, b| Some(Aabb::surrounding(&acc, &b?)))
    }
}
