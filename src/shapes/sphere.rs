// Copyright @yucwang 2026

use crate::core::interaction::SurfaceHit;
use crate::core::shape::Shape;
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector2f, Vector3f, INV_2_PI, INV_PI, PI };
use crate::math::ray::Ray3f;

/// Unit sphere centered at the origin.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Sphere;

fn azimuth(n: &Vector3f) -> Float {
    (-n.x).atan2(-n.z) + PI
}

/// Spherical texture coordinate of a unit direction: u follows the azimuth
/// around +y, v runs from the north pole (0) to the south pole (1).
pub fn texcoord_of(n: &Vector3f) -> Vector2f {
    let theta = n.y.max(-1.0).min(1.0).acos();
    Vector2f::new(azimuth(n) * INV_2_PI, theta * INV_PI)
}

/// Direction of increasing u at a unit direction; always unit length.
pub fn tangent_of(n: &Vector3f) -> Vector3f {
    let phi = azimuth(n);
    Vector3f::new(phi.cos(), 0.0, -phi.sin())
}

impl Shape for Sphere {
    fn bounding_box(&self) -> AABB {
        AABB::new(Vector3f::new(-1.0, -1.0, -1.0), Vector3f::new(1.0, 1.0, 1.0))
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceHit> {
        let o = ray.origin();
        let d = ray.dir();

        let a = d.dot(&d);
        let b = o.dot(&d);
        let c = o.dot(&o) - 1.0;
        let discriminant = b * b - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrt_discriminant = discriminant.sqrt();
        let inv_a = 1.0 / a;

        let mut t = -(b + sqrt_discriminant) * inv_a;
        if !ray.test_segment(t) {
            t = (sqrt_discriminant - b) * inv_a;
            if !ray.test_segment(t) {
                return None;
            }
        }

        let n = ray.at(t).normalize();
        Some(SurfaceHit::new(t, n, tangent_of(&n), texcoord_of(&n)))
    }
}
