// Copyright @yucwang 2026

use super::sphere::{ tangent_of, texcoord_of };

use crate::core::interaction::SurfaceHit;
use crate::core::shape::Shape;
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector3f };
use crate::math::ray::Ray3f;

/// Radius-1 cylinder of `height` along local y, closed by two unit
/// hemispheres centered at y = +height/2 and y = -height/2.
///
/// Regions are tried in a fixed order: side, top cap, bottom cap. The first
/// region with a valid root wins even when a later region has a nearer one.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Capsule {
    height: Float,
}

impl Default for Capsule {
    fn default() -> Self {
        Self { height: 2.0 }
    }
}

impl Capsule {
    pub fn new(height: Float) -> Self {
        Self { height }
    }

    pub fn height(&self) -> Float {
        self.height
    }

    fn half_height(&self) -> Float {
        0.5 * self.height
    }

    fn surface_hit(t: Float, pos: Vector3f, normal: Vector3f) -> SurfaceHit {
        let dir = pos.normalize();
        SurfaceHit::new(t, normal.normalize(), tangent_of(&dir), texcoord_of(&dir))
    }

    fn intersect_side(&self, ray: &Ray3f) -> Option<SurfaceHit> {
        let o = ray.origin();
        let d = ray.dir();
        let half_h = self.half_height();

        let a = d.x * d.x + d.z * d.z;
        let b = d.x * o.x + d.z * o.z;
        let c = o.x * o.x + o.z * o.z - 1.0;
        let discriminant = b * b - a * c;
        // Also covers a == 0: rays along the axis can only reach the caps.
        if discriminant <= 0.0 {
            return None;
        }

        let sqrt_discriminant = discriminant.sqrt();
        let mut t = -(b + sqrt_discriminant) / a;
        if !ray.test_segment(t) {
            t = (sqrt_discriminant - b) / a;
            if !ray.test_segment(t) {
                return None;
            }
        }

        let pos = ray.at(t);
        if pos.y <= -half_h || pos.y >= half_h {
            return None;
        }

        Some(Self::surface_hit(t, pos, Vector3f::new(pos.x, 0.0, pos.z)))
    }

    /// `side` is +1 for the top cap and -1 for the bottom cap.
    fn intersect_cap(&self, ray: &Ray3f, side: Float) -> Option<SurfaceHit> {
        let o = ray.origin();
        let d = ray.dir();
        let center = Vector3f::new(0.0, side * self.half_height(), 0.0);

        let oc = o - center;
        let a = d.dot(&d);
        let b = d.dot(&oc);
        let c = oc.dot(&oc) - 1.0;
        let discriminant = b * b - a * c;
        if discriminant <= 0.0 {
            return None;
        }

        let sqrt_discriminant = discriminant.sqrt();
        let on_cap = |t: Float| ray.test_segment(t) && side * (ray.at(t).y - center.y) > 0.0;

        let mut t = -(b + sqrt_discriminant) / a;
        if !on_cap(t) {
            t = (sqrt_discriminant - b) / a;
            if !on_cap(t) {
                return None;
            }
        }

        let pos = ray.at(t);
        Some(Self::surface_hit(t, pos, pos - center))
    }
}

impl Shape for Capsule {
    fn bounding_box(&self) -> AABB {
        let extent = self.half_height() + 1.0;
        AABB::new(Vector3f::new(-1.0, -extent, -1.0), Vector3f::new(1.0, extent, 1.0))
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceHit> {
        self.intersect_side(ray)
            .or_else(|| self.intersect_cap(ray, 1.0))
            .or_else(|| self.intersect_cap(ray, -1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_unit_frame(hit: &SurfaceHit) {
        assert!((hit.normal().norm() - 1.0).abs() < 1e-5);
        assert!((hit.tangent().norm() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_capsule_side_hit() {
        let capsule = Capsule::new(2.0);
        let ray = Ray3f::new(Vector3f::new(-5.0, 0.0, 0.0), Vector3f::new(1.0, 0.0, 0.0), None, None);
        let hit = capsule.ray_intersection(&ray).expect("ray should hit the side");
        assert!((hit.t() - 4.0).abs() < 1e-5);
        assert!((hit.normal() - Vector3f::new(-1.0, 0.0, 0.0)).norm() < 1e-5);
        assert_unit_frame(&hit);
    }

    #[test]
    fn test_capsule_axis_ray_hits_top_cap() {
        let capsule = Capsule::new(2.0);
        let ray = Ray3f::new(Vector3f::new(0.0, 5.0, 0.0), Vector3f::new(0.0, -1.0, 0.0), None, None);
        let hit = capsule.ray_intersection(&ray).expect("ray should hit the top cap");
        assert!((hit.t() - 3.0).abs() < 1e-5);
        assert!((hit.normal() - Vector3f::new(0.0, 1.0, 0.0)).norm() < 1e-5);
        assert_unit_frame(&hit);
    }

    #[test]
    fn test_capsule_bottom_cap_hit() {
        let capsule = Capsule::new(1.0);
        let d = Vector3f::new(0.0, 1.0, 0.2);
        let ray = Ray3f::new(Vector3f::new(0.0, -4.0, 0.0), d, None, Some(3.5));
        // The top cap is out of reach, so the bottom cap entry is reported.
        let hit = capsule.ray_intersection(&ray).expect("ray should hit the bottom cap");
        let pos = ray.at(hit.t());
        assert!(pos.y < -0.5);
        assert!(((pos - Vector3f::new(0.0, -0.5, 0.0)).norm() - 1.0).abs() < 1e-4);
        assert!(hit.normal().y < 0.0);
        assert_unit_frame(&hit);
    }

    #[test]
    fn test_capsule_side_wins_over_nearer_cap() {
        let capsule = Capsule::new(2.0);
        let ray = Ray3f::new(Vector3f::new(0.0, 3.0, 0.0), Vector3f::new(0.4, -1.0, 0.0), None, None);

        let cap = capsule.intersect_cap(&ray, 1.0).expect("ray enters through the top cap");
        let hit = capsule.ray_intersection(&ray).expect("ray should hit the capsule");

        assert!(cap.t() < hit.t());
        assert!((hit.t() - 2.5).abs() < 1e-4);
        assert!((hit.normal() - Vector3f::new(1.0, 0.0, 0.0)).norm() < 1e-4);
    }

    #[test]
    fn test_capsule_top_cap_wins_over_nearer_bottom_cap() {
        let capsule = Capsule::new(2.0);
        let ray = Ray3f::new(Vector3f::new(0.0, -5.0, 0.0), Vector3f::new(0.0, 1.0, 0.0), None, None);
        let hit = capsule.ray_intersection(&ray).expect("ray should hit the capsule");
        // Exit point of the top cap, not the bottom cap entry at t = 3.
        assert!((hit.t() - 7.0).abs() < 1e-5);
        assert!((hit.normal() - Vector3f::new(0.0, 1.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_capsule_miss() {
        let capsule = Capsule::new(2.0);
        let ray = Ray3f::new(Vector3f::new(-5.0, 0.0, 1.5), Vector3f::new(1.0, 0.0, 0.0), None, None);
        assert!(capsule.ray_intersection(&ray).is_none());
        assert!(!capsule.ray_intersection_t(&ray));
    }

    #[test]
    fn test_tall_capsule_texcoord_is_finite() {
        let capsule = Capsule::new(6.0);
        let ray = Ray3f::new(Vector3f::new(-5.0, 2.5, 0.0), Vector3f::new(1.0, 0.0, 0.0), None, None);
        let hit = capsule.ray_intersection(&ray).expect("ray should hit the side");
        assert!(hit.texcoord().x.is_finite() && hit.texcoord().y.is_finite());
        assert_unit_frame(&hit);
    }
}
