// Copyright @yucwang 2023

use crate::core::interaction::SurfaceHit;
use crate::math::aabb::AABB;
use crate::math::ray::Ray3f;

/// Closed-form intersection for a primitive in its canonical local space.
///
/// A hit is only reported for `t` inside `[ray.min_t, ray.max_t]`; the ray
/// itself is left alone, shrinking `max_t` is the caller's job.
pub trait Shape: Send + Sync {
    fn bounding_box(&self) -> AABB;
    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceHit>;

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.ray_intersection(ray).is_some()
    }
}
