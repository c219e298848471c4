use crate::Vec3;

/// Axis-aligned bounding box stored as min/max corners plus the cached
/// center used by the overlap test and the octree subdivision.
///
/// The all-zero box is the reset state and acts as the identity for
/// encapsulation, so unions can start from `Aabb::ZERO` without dragging
/// the origin into every bound.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
    pub center: Vec3,
}

impl Aabb {
    /// The reset/degenerate box.
    pub const ZERO: Aabb = Aabb {
        min: Vec3::ZERO,
        max: Vec3::ZERO,
        center: Vec3::ZERO,
    };

    /// Create a box from its center and full dimensions.
    pub fn new(center: Vec3, dimensions: Vec3) -> Self {
        let half = dimensions / 2.0;
        Self {
            min: center - half,
            max: center + half,
            center,
        }
    }

    /// Create a box from two opposite corners.
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self {
            min,
            max,
            center: (min + max) / 2.0,
        }
    }

    /// True for the all-zero reset box.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        *self == Self::ZERO
    }

    /// Full extent on each axis.
    #[inline]
    pub fn dimensions(&self) -> Vec3 {
        self.max - self.min
    }

    /// Test whether a point lies inside the box (inclusive).
    #[inline]
    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Separating-axis overlap test on centers and half-extents.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let half = self.max - self.center;
        let other_half = other.max - other.center;

        (self.center.x - other.center.x).abs() <= half.x + other_half.x
            && (self.center.y - other.center.y).abs() <= half.y + other_half.y
            && (self.center.z - other.center.z).abs() <= half.z + other_half.z
    }

    /// Grow the box to include a point.
    pub fn encapsulate_point(&mut self, point: Vec3) {
        if self.is_degenerate() {
            self.min = point;
            self.max = point;
        } else {
            self.min = self.min.min(point);
            self.max = self.max.max(point);
        }
        self.center = (self.min + self.max) / 2.0;
    }

    /// Grow the box to include another box. Degenerate operands are
    /// identity on either side.
    pub fn encapsulate(&mut self, other: &Aabb) {
        if other.is_degenerate() {
            return;
        }
        if self.is_degenerate() {
            *self = *other;
            return;
        }
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.center = (self.min + self.max) / 2.0;
    }

    /// Slab-method ray test. Returns the entry distance on a hit
    /// (negative when the origin is inside the box).
    ///
    /// Axes with a zero direction component are skipped; a grazing ray
    /// with `tmax == tmin` counts as a hit.
    pub fn intersect_ray(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let mut tmin = f32::NEG_INFINITY;
        let mut tmax = f32::INFINITY;

        for axis in 0..3 {
            let d = direction[axis];
            if d == 0.0 {
                continue;
            }
            let t1 = (self.min[axis] - origin[axis]) / d;
            let t2 = (self.max[axis] - origin[axis]) / d;

            tmin = tmin.max(t1.min(t2));
            tmax = tmax.min(t1.max(t2));
        }

        if tmax >= tmin && tmax >= 0.0 {
            Some(tmin)
        } else {
            None
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::ZERO
    }
}
