// Copyright @yucwang 2026

use crate::core::interaction::SurfaceHit;
use crate::core::shape::Shape;
use crate::math::aabb::AABB;
use crate::math::constants::{ Vector2f, Vector3f };
use crate::math::ray::Ray3f;

/// Unit-radius disk in the local y = 0 plane.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Disk;

impl Shape for Disk {
    fn bounding_box(&self) -> AABB {
        AABB::new(Vector3f::new(-1.0, 0.0, -1.0), Vector3f::new(1.0, 0.0, 1.0))
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceHit> {
        let t = -ray.origin().y / ray.dir().y;
        if !ray.test_segment(t) {
            return None;
        }

        let pos = ray.at(t);
        if pos.x * pos.x + pos.z * pos.z >= 1.0 {
            return None;
        }

        Some(SurfaceHit::new(t,
                             Vector3f::new(0.0, 1.0, 0.0),
                             Vector3f::new(1.0, 0.0, 0.0),
                             Vector2f::new(0.5 * (1.0 + pos.x), 0.5 * (1.0 + pos.z))))
    }
}
