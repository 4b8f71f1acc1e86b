// Copyright @yucwang 2026

// Every level that changes coordinate space works on its own copy of the
// ray and hands only the shrunk `max_t` back to its caller. Hit normals and
// tangents are recorded in the space of the primitive that produced them
// and mapped outwards as the recursion unwinds.

use crate::core::bvh::{ BVHAccel, NodeContent };
use crate::core::interaction::IntersectionResult;
use crate::core::primitive::Primitive;
use crate::core::scene::{ NodeId, Scene };
use crate::core::shape::Shape;
use crate::math::ray::Ray3f;

pub(crate) fn intersect_scene(scene: &Scene, ray: &Ray3f) -> IntersectionResult {
    let mut result = IntersectionResult::default();
    let mut query = *ray;
    visit_node(scene, scene.root(), &mut query, &mut result);
    finish(ray, result)
}

pub(crate) fn intersect_accel(accel: &BVHAccel, ray: &Ray3f) -> IntersectionResult {
    let mut result = IntersectionResult::default();
    let mut query = *ray;
    visit_accel(accel, &mut query, &mut result);
    finish(ray, result)
}

pub(crate) fn occluded_scene(scene: &Scene, ray: &Ray3f) -> bool {
    occluded_node(scene, scene.root(), ray)
}

pub(crate) fn occluded_accel(accel: &BVHAccel, ray: &Ray3f) -> bool {
    let nodes = accel.nodes();
    if nodes.is_empty() {
        return false;
    }

    let shapes = accel.shapes();
    let mut stack = vec![0usize];
    while let Some(idx) = stack.pop() {
        let node = &nodes[idx];
        if !node.bounds().ray_intersect(ray) {
            continue;
        }

        match node.content() {
            NodeContent::Leaf { start, count } => {
                let hit = shapes[start..start + count].iter().any(|shape| {
                    occluded_primitive(shape.primitive(), &shape.world_to_local().apply_ray(ray))
                });
                if hit {
                    return true;
                }
            }
            NodeContent::Interior { second_child, .. } => {
                stack.push(second_child);
                stack.push(idx + 1);
            }
        }
    }

    false
}

fn finish(ray: &Ray3f, mut result: IntersectionResult) -> IntersectionResult {
    if let Some(owner) = result.closest_node() {
        result.set_p(ray.at(result.t()));
        log::trace!("Closest hit: node {:?}, t = {}.", owner, result.t());
    }
    result
}

fn visit_node(scene: &Scene, id: NodeId, ray: &mut Ray3f, result: &mut IntersectionResult) {
    let node = match scene.node(id) {
        Some(node) => node,
        None => return,
    };
    if node.primitive().is_none() && node.children().is_empty() {
        return;
    }

    let hits_before = result.hit_count();
    let mut local_ray = match node.transform() {
        Some(transform) => transform.inv_apply_ray(ray),
        None => *ray,
    };

    if let Some(primitive) = node.primitive() {
        visit_primitive(primitive, id, &mut local_ray, result);
    }
    for &child in node.children() {
        visit_node(scene, child, &mut local_ray, result);
    }

    ray.max_t = local_ray.max_t;

    if let Some(transform) = node.transform() {
        if result.hit_count() != hits_before {
            result.set_frame(transform.apply_normal(result.normal()),
                             transform.apply_vector(result.tangent()));
        }
    }
}

/// Returns whether `primitive` produced a hit nearer than `ray.max_t`.
fn visit_primitive(primitive: &Primitive, owner: NodeId, ray: &mut Ray3f, result: &mut IntersectionResult) -> bool {
    let hit = match primitive {
        Primitive::Sphere(s) => s.ray_intersection(ray),
        Primitive::Plane(s) => s.ray_intersection(ray),
        Primitive::Disk(s) => s.ray_intersection(ray),
        Primitive::Capsule(s) => s.ray_intersection(ray),
        Primitive::Triangle(s) => s.ray_intersection(ray),
        Primitive::TriMesh(s) => s.ray_intersection(ray),
        // Shapes inside an aggregate carry their own owners.
        Primitive::Aggregate(accel) => return visit_accel(accel, ray, result),
    };

    match hit {
        Some(hit) => {
            ray.update(hit.t());
            result.record(owner, &hit);
            true
        }
        None => false,
    }
}

fn visit_accel(accel: &BVHAccel, ray: &mut Ray3f, result: &mut IntersectionResult) -> bool {
    let nodes = accel.nodes();
    if nodes.is_empty() {
        return false;
    }

    let shapes = accel.shapes();
    let inv_dir = ray.inv_dir();
    let dir_is_neg = [inv_dir.x < 0.0, inv_dir.y < 0.0, inv_dir.z < 0.0];

    let mut closest_shape: Option<usize> = None;
    let mut stack = vec![0usize];
    while let Some(idx) = stack.pop() {
        let node = &nodes[idx];
        if !node.bounds().ray_intersect(ray) {
            continue;
        }

        match node.content() {
            NodeContent::Leaf { start, count } => {
                for (i, shape) in shapes.iter().enumerate().skip(start).take(count) {
                    let mut local_ray = shape.world_to_local().apply_ray(ray);
                    if visit_primitive(shape.primitive(), shape.owner(), &mut local_ray, result) {
                        ray.max_t = local_ray.max_t;
                        closest_shape = Some(i);
                    }
                }
            }
            NodeContent::Interior { axis, second_child } => {
                // The child on the near side of the split is popped first.
                if dir_is_neg[axis] {
                    stack.push(idx + 1);
                    stack.push(second_child);
                } else {
                    stack.push(second_child);
                    stack.push(idx + 1);
                }
            }
        }
    }

    match closest_shape {
        Some(i) => {
            let world_to_local = shapes[i].world_to_local();
            result.set_frame(world_to_local.inv_apply_normal(result.normal()),
                             world_to_local.inv_apply_vector(result.tangent()));
            true
        }
        None => false,
    }
}

fn occluded_node(scene: &Scene, id: NodeId, ray: &Ray3f) -> bool {
    let node = match scene.node(id) {
        Some(node) => node,
        None => return false,
    };

    let local_ray = match node.transform() {
        Some(transform) => transform.inv_apply_ray(ray),
        None => *ray,
    };

    node.primitive().map_or(false, |primitive| occluded_primitive(primitive, &local_ray))
        || node.children().iter().any(|&child| occluded_node(scene, child, &local_ray))
}

fn occluded_primitive(primitive: &Primitive, ray: &Ray3f) -> bool {
    match primitive {
        Primitive::Sphere(s) => s.ray_intersection_t(ray),
        Primitive::Plane(s) => s.ray_intersection_t(ray),
        Primitive::Disk(s) => s.ray_intersection_t(ray),
        Primitive::Capsule(s) => s.ray_intersection_t(ray),
        Primitive::Triangle(s) => s.ray_intersection_t(ray),
        Primitive::TriMesh(s) => s.ray_intersection_t(ray),
        Primitive::Aggregate(accel) => occluded_accel(accel, ray),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bvh::{ BVHShape, LinearBVHNode };
    use crate::core::scene::SceneNode;
    use crate::math::aabb::AABB;
    use crate::math::constants::{ Float, Vector3f };
    use crate::math::transform::Transform;
    use crate::shapes::sphere::Sphere;

    fn row_of_spheres(count: usize, owner: NodeId) -> BVHAccel {
        // Balanced split along x: node 0 interior, 1 and 2 leaves.
        let shapes: Vec<BVHShape> = (0..count)
            .map(|i| BVHShape::new(Primitive::from(Sphere), owner,
                                   Transform::translate(Vector3f::new(3.0 * i as Float, 0.0, 0.0)).inverse()))
            .collect();
        let half = count / 2;
        let bounds_of = |range: std::ops::Range<usize>| {
            let mut b = AABB::default();
            for s in &shapes[range] {
                b.expand_by_aabb(&s.bounding_box());
            }
            b
        };
        let nodes = vec![LinearBVHNode::interior(bounds_of(0..count), 0, 2),
                         LinearBVHNode::leaf(bounds_of(0..half), 0, half),
                         LinearBVHNode::leaf(bounds_of(half..count), half, count - half)];
        BVHAccel::new(nodes, shapes).expect("valid hierarchy")
    }

    #[test]
    fn test_traversal_order_independent_of_direction() {
        let accel = row_of_spheres(4, NodeId(0));

        let forward = Ray3f::new(Vector3f::new(-5.0, 0.0, 0.0), Vector3f::new(1.0, 0.0, 0.0), None, None);
        let result = intersect_accel(&accel, &forward);
        assert!((result.t() - 4.0).abs() < 1e-5);
        assert!((result.p() - Vector3f::new(-1.0, 0.0, 0.0)).norm() < 1e-5);

        let backward = Ray3f::new(Vector3f::new(14.0, 0.0, 0.0), Vector3f::new(-1.0, 0.0, 0.0), None, None);
        let result = intersect_accel(&accel, &backward);
        assert!((result.t() - 4.0).abs() < 1e-5);
        assert!((result.normal() - Vector3f::new(1.0, 0.0, 0.0)).norm() < 1e-5);
        assert!(occluded_accel(&accel, &backward));
    }

    #[test]
    fn test_zero_direction_components() {
        let accel = row_of_spheres(4, NodeId(0));

        // Zero x and y direction components give infinite reciprocals.
        let ray = Ray3f::new(Vector3f::new(3.0, 0.0, -4.0), Vector3f::new(0.0, 0.0, 1.0), None, None);
        let result = intersect_accel(&accel, &ray);
        assert!(result.is_hit());
        assert!((result.t() - 3.0).abs() < 1e-5);

        let outside = Ray3f::new(Vector3f::new(3.0, 5.0, -4.0), Vector3f::new(0.0, 0.0, 1.0), None, None);
        assert!(!intersect_accel(&accel, &outside).is_hit());
        assert!(!occluded_accel(&accel, &outside));
    }

    #[test]
    fn test_transformed_node_keeps_parent_ray() {
        let mut scene = Scene::new();
        let root = scene.root();
        scene.add_node(root, SceneNode::new()
                       .with_primitive(Sphere)
                       .with_transform(Transform::scale(Vector3f::new(3.0, 3.0, 3.0))))
            .expect("root exists");

        let mut ray = Ray3f::new(Vector3f::new(0.0, 0.0, -10.0), Vector3f::new(0.0, 0.0, 1.0), None, None);
        let mut result = IntersectionResult::default();
        visit_node(&scene, root, &mut ray, &mut result);

        // Only the extent changes in the caller's space.
        assert_eq!(ray.origin(), Vector3f::new(0.0, 0.0, -10.0));
        assert_eq!(ray.dir(), Vector3f::new(0.0, 0.0, 1.0));
        assert!((ray.max_t - 7.0).abs() < 1e-5);
        assert_eq!(result.hit_count(), 1);
    }

    #[test]
    fn test_miss_leaves_result_untouched() {
        let scene = Scene::new();
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 1.0, 0.0), None, None);
        let result = intersect_scene(&scene, &ray);
        assert_eq!(result, IntersectionResult::default());
    }
}
