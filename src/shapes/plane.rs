// Copyright @yucwang 2026

use crate::core::interaction::SurfaceHit;
use crate::core::shape::Shape;
use crate::math::aabb::AABB;
use crate::math::constants::{ Vector2f, Vector3f };
use crate::math::ray::Ray3f;

/// Unit square in the local y = 0 plane, x and z in [-0.5, 0.5].
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Plane;

impl Shape for Plane {
    fn bounding_box(&self) -> AABB {
        AABB::new(Vector3f::new(-0.5, 0.0, -0.5), Vector3f::new(0.5, 0.0, 0.5))
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceHit> {
        // A ray parallel to the plane gives an infinite or NaN t, both rejected.
        let t = -ray.origin().y / ray.dir().y;
        if !ray.test_segment(t) {
            return None;
        }

        let pos = ray.at(t);
        if pos.x < -0.5 || pos.x > 0.5 || pos.z < -0.5 || pos.z > 0.5 {
            return None;
        }

        Some(SurfaceHit::new(t,
                             Vector3f::new(0.0, 1.0, 0.0),
                             Vector3f::new(1.0, 0.0, 0.0),
                             Vector2f::new(pos.x + 0.5, pos.z + 0.5)))
    }
}
