//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Binary tree over shared primitives. Each node splits its objects on a
//! randomly chosen axis, sorted by the minimum corner of their boxes.

use crate::{BuildError, HitRecord, Hittable, Primitive, Scene};
use lumen_math::{Aabb, Interval, Ray};
use rand::{Rng, RngCore};
use std::cmp::Ordering;
use std::sync::Arc;

/// One side of a BVH node.
#[derive(Clone)]
pub enum BvhChild {
    /// A single primitive.
    Leaf(Arc<Primitive>),
    /// A nested subtree.
    Node(Box<BvhNode>),
}

impl BvhChild {
    fn depth(&self) -> usize {
        match self {
            BvhChild::Leaf(_) => 0,
            BvhChild::Node(node) => node.depth(),
        }
    }

    fn leaf_count(&self) -> usize {
        match self {
            BvhChild::Leaf(_) => 1,
            BvhChild::Node(node) => node.leaf_count(),
        }
    }

    #[inline]
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        match self {
            BvhChild::Leaf(object) => object.hit(ray, ray_t),
            BvhChild::Node(node) => node.hit(ray, ray_t),
        }
    }
}

/// Internal BVH node with two children and the box enclosing both.
///
/// A node built from a single object holds that object on both sides.
#[derive(Clone)]
pub struct BvhNode {
    left: BvhChild,
    right: BvhChild,
    bbox: Aabb,
}

/// Object paired with its box, computed once up front.
type Entry = (Arc<Primitive>, Aabb);

impl BvhNode {
    /// Build a BVH over `objects`.
    ///
    /// Every object must have a bounding box; unbounded primitives such as
    /// planes belong in a [`Scene`] instead.
    pub fn build(objects: &[Arc<Primitive>], rng: &mut dyn RngCore) -> Result<Self, BuildError> {
        let mut entries = Self::collect_entries(objects).map_err(|err| {
            match &err {
                BuildError::MissingBoundingBox { index } => log::error!(
                    "BVH construction failed: {} ({})",
                    err,
                    objects[*index].kind()
                ),
                BuildError::Empty => log::error!("BVH construction failed: {}", err),
            }
            err
        })?;

        let root = Self::build_node(&mut entries, rng);
        log::debug!(
            "Built BVH over {} objects (depth {}, {} leaves)",
            objects.len(),
            root.depth(),
            root.leaf_count()
        );
        Ok(root)
    }

    /// Build a BVH over every object in a scene, sharing its primitives.
    pub fn from_scene(scene: &Scene, rng: &mut dyn RngCore) -> Result<Self, BuildError> {
        Self::build(scene.objects(), rng)
    }

    fn collect_entries(objects: &[Arc<Primitive>]) -> Result<Vec<Entry>, BuildError> {
        if objects.is_empty() {
            return Err(BuildError::Empty);
        }

        objects
            .iter()
            .enumerate()
            .map(|(index, object)| {
                object
                    .bounding_box()
                    .map(|bbox| (Arc::clone(object), bbox))
                    .ok_or(BuildError::MissingBoundingBox { index })
            })
            .collect()
    }

    fn build_node(entries: &mut [Entry], rng: &mut dyn RngCore) -> Self {
        let axis = rng.gen_range(0..3);

        if let [(object, bbox)] = &entries[..] {
            return Self {
                left: BvhChild::Leaf(Arc::clone(object)),
                right: BvhChild::Leaf(Arc::clone(object)),
                bbox: *bbox,
            };
        }

        entries.sort_by(|a, b| {
            a.1.minimum[axis]
                .partial_cmp(&b.1.minimum[axis])
                .unwrap_or(Ordering::Equal)
        });

        let mid = entries.len() / 2;
        let (left_entries, right_entries) = entries.split_at_mut(mid);
        let (left, left_box) = Self::build_child(left_entries, rng);
        let (right, right_box) = Self::build_child(right_entries, rng);

        Self {
            left,
            right,
            bbox: Aabb::surrounding(&left_box, &right_box),
        }
    }

    fn build_child(entries: &mut [Entry], rng: &mut dyn RngCore) -> (BvhChild, Aabb) {
        if let [(object, bbox)] = &entries[..] {
            return (BvhChild::Leaf(Arc::clone(object)), *bbox);
        }

        let node = Self::build_node(entries, rng);
        let bbox = node.bbox;
        (BvhChild::Node(Box::new(node)), bbox)
    }

    /// Number of node levels below and including this one.
    pub fn depth(&self) -> usize {
        1 + self.left.depth().max(self.right.depth())
    }

    /// Number of distinct leaf primitives.
    pub fn leaf_count(&self) -> usize {
        if self.is_aliased_leaf() {
            return 1;
        }
        self.left.leaf_count() + self.right.leaf_count()
    }

    pub fn left(&self) -> &BvhChild {
        &self.left
    }

    pub fn right(&self) -> &BvhChild {
        &self.right
    }

    fn is_aliased_leaf(&self) -> bool {
        matches!((&self.left, &self.right), (BvhChild::Leaf(a), BvhChild::Leaf(b)) if Arc::ptr_eq(a, b))
    }
}

impl Hittable for BvhNode {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        if !self.bbox.hit(ray, ray_t) {
            return None;
        }

        if self.is_aliased_leaf() {
            return self.left.hit(ray, ray_t);
        }

        let hit_left = self.left.hit(ray, ray_t);
        let hit_right = self.right.hit(ray, ray_t);

        match (hit_left, hit_right) {
            (Some(l), Some(r)) => Some(if r.t < l.t { r } else { l }),
            (l, r) => l.or(r),
        }
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Material, Plane, Sphere, Triangle};
    use lumen_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn grey() -> Material {
        Material::lambertian(Vec3::splat(0.5))
    }

    fn forward() -> Interval {
        Interval::new(0.001, f32::INFINITY)
    }

    fn random_scene(rng: &mut StdRng, count: usize) -> Scene {
        let mut scene = Scene::new();
        for i in 0..count {
            let center = Vec3::new(
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-30.0..-5.0),
            );
            if i % 3 == 0 {
                let mut corner = || {
                    center
                        + Vec3::new(
                            rng.gen_range(-1.5..1.5),
                            rng.gen_range(-1.5..1.5),
                            rng.gen_range(-1.5..1.5),
                        )
                };
                scene.add(Triangle::new(corner(), corner(), corner(), grey()));
            } else {
                scene.add(Sphere::new(center, rng.gen_range(0.2..1.5), grey()));
            }
        }
        // Axis-aligned triangles exercise the padded flat boxes
        scene.add(Triangle::new(
            Vec3::new(-2.0, -2.0, -4.0),
            Vec3::new(2.0, -2.0, -4.0),
            Vec3::new(0.0, 2.0, -4.0),
            grey(),
        ));
        scene
    }

    #[test]
    fn test_bvh_empty() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(BvhNode::build(&[], &mut rng), Err(BuildError::Empty)));
        assert!(matches!(
            BvhNode::from_scene(&Scene::new(), &mut rng),
            Err(BuildError::Empty)
        ));
    }

    #[test]
    fn test_bvh_rejects_unbounded_objects() {
        let mut scene = Scene::new();
        scene.add(Sphere::new(Vec3::ZERO, 1.0, grey()));
        scene.add(Plane::new(Vec3::ZERO, Vec3::Y, grey()));

        let mut rng = StdRng::seed_from_u64(1);
        let err = BvhNode::from_scene(&scene, &mut rng).err();
        assert_eq!(err, Some(BuildError::MissingBoundingBox { index: 1 }));
    }

    #[test]
    fn test_bvh_single_object_aliases_both_children() {
        let mut scene = Scene::new();
        let sphere = scene.add(Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, grey()));

        let mut rng = StdRng::seed_from_u64(2);
        let bvh = BvhNode::from_scene(&scene, &mut rng).unwrap();

        match (bvh.left(), bvh.right()) {
            (BvhChild::Leaf(a), BvhChild::Leaf(b)) => {
                assert!(Arc::ptr_eq(a, &sphere));
                assert!(Arc::ptr_eq(b, &sphere));
            }
            _ => panic!("single object should produce two leaves"),
        }
        assert_eq!(bvh.leaf_count(), 1);
        assert_eq!(bvh.depth(), 1);

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let rec = bvh.hit(&ray, forward()).unwrap();
        assert!((rec.t - 0.5).abs() < 1e-5);
        assert_eq!(bvh.bounding_box(), sphere.bounding_box());
    }

    #[test]
    fn test_bvh_multiple_spheres() {
        let spheres: Vec<Primitive> = (0..10)
            .map(|i| Sphere::new(Vec3::new(i as f32, 0.0, -5.0), 0.5, grey()).into())
            .collect();
        let scene = Scene::from(spheres);

        let mut rng = StdRng::seed_from_u64(3);
        let bvh = BvhNode::from_scene(&scene, &mut rng).unwrap();
        assert_eq!(bvh.leaf_count(), 10);

        // Ray that hits sphere at x=5
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::NEG_Z);
        let rec = bvh.hit(&ray, forward()).unwrap();
        assert!((rec.p.z - (-4.5)).abs() < 0.01);

        let root = bvh.bounding_box().unwrap();
        for object in scene.objects() {
            assert!(root.contains_box(&object.bounding_box().unwrap()));
        }
    }

    #[test]
    fn test_bvh_matches_linear_scan() {
        let mut rng = StdRng::seed_from_u64(42);
        let scene = random_scene(&mut rng, 60);
        let bvh = BvhNode::from_scene(&scene, &mut rng).unwrap();
        assert_eq!(bvh.leaf_count(), scene.len());

        let mut hits = 0;
        for _ in 0..2000 {
            let origin = Vec3::new(
                rng.gen_range(-2.0..2.0),
                rng.gen_range(-2.0..2.0),
                rng.gen_range(-1.0..1.0),
            );
            let target = Vec3::new(
                rng.gen_range(-12.0..12.0),
                rng.gen_range(-12.0..12.0),
                rng.gen_range(-32.0..-3.0),
            );
            let ray = Ray::new(origin, target - origin);

            let expected = scene.hit(&ray, forward());
            let actual = bvh.hit(&ray, forward());

            match (expected, actual) {
                (None, None) => {}
                (Some(e), Some(a)) => {
                    hits += 1;
                    assert!((e.t - a.t).abs() < 1e-5, "t mismatch: {} vs {}", e.t, a.t);
                    assert!((e.p - a.p).length() < 1e-4);
                    assert_eq!(e.front_face, a.front_face);
                }
                (e, a) => panic!(
                    "hit mismatch for {:?}: scan {:?}, bvh {:?}",
                    ray,
                    e.map(|r| r.t),
                    a.map(|r| r.t)
                ),
            }
        }
        assert!(hits > 0);
    }

    #[test]
    fn test_bvh_respects_interval() {
        let scene = Scene::from(vec![
            Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0, grey()).into(),
            Sphere::new(Vec3::new(0.0, 0.0, -8.0), 1.0, grey()).into(),
        ]);
        let mut rng = StdRng::seed_from_u64(5);
        let bvh = BvhNode::from_scene(&scene, &mut rng).unwrap();

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!((bvh.hit(&ray, forward()).unwrap().t - 2.0).abs() < 1e-5);
        assert!((bvh.hit(&ray, Interval::new(5.0, 100.0)).unwrap().t - 7.0).abs() < 1e-5);
        assert!(bvh.hit(&ray, Interval::new(0.001, 1.5)).is_none());
    }
}
