//! Octree over scene objects.
//!
//! Objects are inserted by AABB overlap, so an object spanning several
//! octants is referenced from every overlapping leaf. The traversal
//! therefore carries the best hit found so far and keeps only the global
//! nearest.

use crate::object::{HitRecord, ObjectId, SceneObject};
use ember_math::{Aabb, Ray, Vec3};

/// Children per subdivision.
const CHILD_COUNT: usize = 8;

/// Maximum subdivision depth. The all-children-overlap fallback already
/// stops most degenerate scenes; the cap bounds chains of half-overlapping
/// bounds that keep splitting without separating anything useful.
const MAX_DEPTH: u32 = 8;

#[derive(Debug)]
struct Node {
    aabb: Aabb,
    objects: Vec<ObjectId>,
    children: Option<Box<[Node; CHILD_COUNT]>>,
    depth: u32,
}

/// Spatial accelerator for ray-vs-scene queries.
#[derive(Debug)]
pub struct Octree {
    root: Node,
    max_count: usize,
}

impl Octree {
    /// Default object count above which a node subdivides.
    pub const DEFAULT_MAX_COUNT: usize = 1;

    /// Build the tree over every object. The root bounds are the union of
    /// all object bounds.
    pub fn build(objects: &[SceneObject], max_count: usize) -> Self {
        let mut aabb = Aabb::ZERO;
        for object in objects {
            aabb.encapsulate(&object.aabb);
        }

        let mut root = Node {
            aabb,
            objects: (0..objects.len()).collect(),
            children: None,
            depth: 0,
        };
        if root.objects.len() > max_count {
            root.subdivide(objects, max_count);
        }

        Self { root, max_count }
    }

    /// Nearest hit along the ray, or a miss record.
    pub fn intersect(&self, objects: &[SceneObject], ray: &Ray) -> HitRecord {
        let mut best = HitRecord::miss();
        self.root.intersect(objects, ray, &mut best);
        best
    }

    /// Count of nodes, for diagnostics.
    pub fn node_count(&self) -> usize {
        self.root.count_nodes()
    }

    pub fn max_count(&self) -> usize {
        self.max_count
    }
}

impl Node {
    fn insert(&mut self, id: ObjectId, objects: &[SceneObject], max_count: usize) {
        if !self.aabb.overlaps(&objects[id].aabb) {
            return;
        }
        if !self.objects.contains(&id) {
            self.objects.push(id);
        }

        if let Some(children) = self.children.as_mut() {
            for child in children.iter_mut() {
                child.insert(id, objects, max_count);
            }
        } else if self.objects.len() > max_count && self.depth < MAX_DEPTH {
            self.subdivide(objects, max_count);
        }
    }

    /// Split into eight octants about the box midpoint, unless splitting
    /// cannot separate the current objects.
    fn subdivide(&mut self, objects: &[SceneObject], max_count: usize) {
        let min = self.aabb.min;
        let mid = (self.aabb.min + self.aabb.max) / 2.0;
        let max = self.aabb.max;

        let octant = |x: usize, y: usize, z: usize| {
            let low = Vec3::new(
                if x == 0 { min.x } else { mid.x },
                if y == 0 { min.y } else { mid.y },
                if z == 0 { min.z } else { mid.z },
            );
            let high = Vec3::new(
                if x == 0 { mid.x } else { max.x },
                if y == 0 { mid.y } else { max.y },
                if z == 0 { mid.z } else { max.z },
            );
            Node {
                aabb: Aabb::from_min_max(low, high),
                objects: Vec::new(),
                children: None,
                depth: self.depth + 1,
            }
        };

        let mut children = Box::new([
            octant(0, 0, 0),
            octant(1, 0, 0),
            octant(0, 1, 0),
            octant(1, 1, 0),
            octant(0, 0, 1),
            octant(1, 0, 1),
            octant(0, 1, 1),
            octant(1, 1, 1),
        ]);

        // If every child would receive every object, subdividing only
        // duplicates work forever; stay a leaf.
        let separates = self.objects.iter().any(|&id| {
            children
                .iter()
                .any(|child| !child.aabb.overlaps(&objects[id].aabb))
        });
        if !separates {
            return;
        }

        for child in children.iter_mut() {
            for &id in &self.objects {
                child.insert(id, objects, max_count);
            }
        }
        self.children = Some(children);
    }

    fn intersect(&self, objects: &[SceneObject], ray: &Ray, best: &mut HitRecord) {
        if self
            .aabb
            .intersect_ray(ray.origin, ray.direction)
            .is_none()
        {
            return;
        }

        match self.children.as_ref() {
            None => {
                for &id in &self.objects {
                    if let Some((element, distance)) =
                        objects[id].intersect(ray.origin, ray.direction)
                    {
                        if distance < best.distance {
                            *best = HitRecord {
                                object: Some(id),
                                element_index: element,
                                distance,
                            };
                        }
                    }
                }
            }
            Some(children) => {
                // Visit children nearest-first; once the best hit is
                // closer than a child's entry distance the rest of the
                // ordering cannot improve on it.
                let mut order: [(f32, usize); CHILD_COUNT] = [(f32::INFINITY, 0); CHILD_COUNT];
                for (index, child) in children.iter().enumerate() {
                    let entry = child
                        .aabb
                        .intersect_ray(ray.origin, ray.direction)
                        .unwrap_or(f32::INFINITY);
                    order[index] = (entry, index);
                }
                order.sort_by(|a, b| a.0.total_cmp(&b.0));

                for (entry, index) in order {
                    if entry == f32::INFINITY {
                        break;
                    }
                    if best.is_hit() && best.distance < entry {
                        break;
                    }
                    children[index].intersect(objects, ray, best);
                }
            }
        }
    }

    fn count_nodes(&self) -> usize {
        1 + self
            .children
            .as_ref()
            .map_or(0, |children| children.iter().map(Node::count_nodes).sum())
    }
}
