use crate::{Interval, Ray, Vec3};

/// Axis-Aligned Bounding Box for the BVH.
///
/// Stored as its two extreme corners. `minimum <= maximum` holds
/// componentwise for every box built through the constructors below.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub minimum: Vec3,
    pub maximum: Vec3,
}

impl Aabb {
    /// Create a box from its minimum and maximum corners.
    ///
    /// The corners are taken as given; use [`Aabb::from_points`] when the
    /// ordering is unknown.
    pub fn new(minimum: Vec3, maximum: Vec3) -> Self {
        debug_assert!(minimum.cmple(maximum).all(), "inverted AABB corners");
        Self { minimum, maximum }
    }

    /// Create an AABB from any two opposite corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            minimum: a.min(b),
            maximum: a.max(b),
        }
    }

    /// Create the smallest AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            minimum: box0.minimum.min(box1.minimum),
            maximum: box0.maximum.max(box1.maximum),
        }
    }

    /// Get the extent along a specific axis (0=X, 1=Y, 2=Z) as an interval.
    pub fn axis_interval(&self, axis: usize) -> Interval {
        Interval::new(self.minimum[axis], self.maximum[axis])
    }

    /// Test if a ray intersects this AABB within the given interval.
    ///
    /// Slab method. A zero direction component produces an infinite inverse,
    /// and a `0 * inf` NaN is discarded by `f32::max`/`f32::min`, so axis
    /// parallel rays resolve without special casing.
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        for axis in 0..3 {
            let adinv = 1.0 / r.direction[axis];
            let origin = r.origin[axis];

            let mut t0 = (self.minimum[axis] - origin) * adinv;
            let mut t1 = (self.maximum[axis] - origin) * adinv;
            if adinv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }

            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max <= ray_t.min {
                return false;
            }
        }

        true
    }

    /// Grow axes thinner than `delta` so they are exactly `delta` wide.
    ///
    /// Flat geometry lying in an axis plane otherwise yields a slab whose
    /// entry and exit distances coincide, which the slab test rejects.
    pub fn padded(&self, delta: f32) -> Aabb {
        let mut minimum = self.minimum;
        let mut maximum = self.maximum;
        for axis in 0..3 {
            if maximum[axis] - minimum[axis] < delta {
                let half = delta / 2.0;
                minimum[axis] -= half;
                maximum[axis] += half;
            }
        }
        Aabb { minimum, maximum }
    }

    /// Returns true if `other` lies completely inside this box.
    pub fn contains_box(&self, other: &Aabb) -> bool {
        self.minimum.cmple(other.minimum).all() && other.maximum.cmple(self.maximum).all()
    }

    /// Returns true if the point lies inside or on the box.
    pub fn contains_point(&self, p: Vec3) -> bool {
        self.minimum.cmple(p).all() && p.cmple(self.maximum).all()
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.minimum + self.maximum) * 0.5
    }

    /// The eight corners of the box.
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.minimum, self.maximum);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::from_points(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_aabb_from_points_orders_corners() {
        let aabb = Aabb::from_points(Vec3::new(10.0, 0.0, 5.0), Vec3::new(0.0, 10.0, -5.0));

        assert_eq!(aabb.minimum, Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(aabb.maximum, Vec3::new(10.0, 10.0, 5.0));
    }

    #[test]
    fn test_aabb_hit() {
        let aabb = unit_box();

        // Ray pointing at center
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Ray pointing away
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Ray missing the box
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Interval ends before the box
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!aabb.hit(&ray, Interval::new(0.0, 3.0)));
    }

    #[test]
    fn test_aabb_hit_rejects_empty_interval() {
        let aabb = unit_box();
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));

        assert!(!aabb.hit(&ray, Interval::new(5.0, 5.0)));
        assert!(!aabb.hit(&ray, Interval::new(6.0, 4.0)));
        assert!(!aabb.hit(&ray, Interval::EMPTY));
    }

    #[test]
    fn test_aabb_hit_independent_of_slab_direction() {
        let aabb = unit_box();
        let forward = Ray::new(Vec3::new(-3.0, 0.2, 0.1), Vec3::new(1.0, 0.1, 0.0));
        let backward = Ray::new(Vec3::new(3.0, 0.8, 0.1), Vec3::new(-1.0, -0.1, 0.0));
        let t = Interval::new(0.0, f32::INFINITY);

        assert!(aabb.hit(&forward, t));
        assert!(aabb.hit(&backward, t));

        // Box corners given in either order describe the same slabs
        let swapped = Aabb::from_points(aabb.maximum, aabb.minimum);
        assert_eq!(aabb.hit(&forward, t), swapped.hit(&forward, t));
    }

    #[test]
    fn test_aabb_hit_zero_direction_component() {
        let aabb = unit_box();

        // Parallel to the X slabs, inside them
        let inside = Ray::new(Vec3::new(0.5, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(aabb.hit(&inside, Interval::new(0.0, 100.0)));

        // Parallel to the X slabs, outside them
        let outside = Ray::new(Vec3::new(2.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!aabb.hit(&outside, Interval::new(0.0, 100.0)));

        // Origin exactly on a slab plane produces 0 * inf
        let on_plane = Ray::new(Vec3::new(1.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(aabb.hit(&on_plane, Interval::new(0.0, 100.0)));

        // Negative zero flips the inverse sign
        let neg_zero = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(-0.0, -0.0, 1.0));
        assert!(aabb.hit(&neg_zero, Interval::new(0.0, 100.0)));
    }

    #[test]
    fn test_aabb_surrounding_contains_both() {
        let box1 = Aabb::from_points(Vec3::ZERO, Vec3::new(5.0, 5.0, 5.0));
        let box2 = Aabb::from_points(Vec3::new(3.0, -3.0, 3.0), Vec3::new(10.0, 1.0, 10.0));
        let surrounding = Aabb::surrounding(&box1, &box2);

        for corner in box1.corners().iter().chain(box2.corners().iter()) {
            assert!(surrounding.contains_point(*corner));
        }
        assert!(surrounding.contains_box(&box1));
        assert!(surrounding.contains_box(&box2));

        // Smallest such box: every face touches one of the inputs
        assert_eq!(surrounding.minimum, Vec3::new(0.0, -3.0, 0.0));
        assert_eq!(surrounding.maximum, Vec3::new(10.0, 5.0, 10.0));
    }

    #[test]
    fn test_aabb_surrounding_commutative_and_associative() {
        let a = Aabb::from_points(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::from_points(Vec3::splat(-2.0), Vec3::splat(0.5));
        let c = Aabb::from_points(Vec3::new(4.0, 0.0, 0.0), Vec3::new(5.0, 1.0, 9.0));

        assert_eq!(Aabb::surrounding(&a, &b), Aabb::surrounding(&b, &a));
        assert_eq!(
            Aabb::surrounding(&Aabb::surrounding(&a, &b), &c),
            Aabb::surrounding(&a, &Aabb::surrounding(&b, &c))
        );
    }

    #[test]
    fn test_aabb_padded_only_thin_axes() {
        let flat = Aabb::from_points(Vec3::new(-1.0, -1.0, 2.0), Vec3::new(1.0, 1.0, 2.0));
        let padded = flat.padded(0.0001);

        assert_eq!(padded.minimum.x, -1.0);
        assert_eq!(padded.maximum.y, 1.0);
        assert!(padded.minimum.z < 2.0 && padded.maximum.z > 2.0);

        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(!flat.hit(&ray, Interval::new(0.0, 10.0)));
        assert!(padded.hit(&ray, Interval::new(0.0, 10.0)));
    }

    #[test]
    fn test_aabb_centroid() {
        let aabb = Aabb::from_points(Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 10.0, 10.0));
        assert_eq!(aabb.centroid(), Vec3::new(5.0, 5.0, 5.0));
    }

    #[test]
    fn test_aabb_axis_interval() {
        let aabb = Aabb::from_points(Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(aabb.axis_interval(1), Interval::new(2.0, 5.0));
    }
}
