// Copyright @yucwang 2026

use crate::math::constants::{ EPSILON, Vector3f };

/// Any unit vector perpendicular to `n`.
pub fn build_tangent(n: &Vector3f) -> Vector3f {
    let up = if n.z.abs() < 0.999 {
        Vector3f::new(0.0, 0.0, 1.0)
    } else {
        Vector3f::new(1.0, 0.0, 0.0)
    };
    n.cross(&up).normalize()
}

/// Gram-Schmidt `t` against the unit normal `n`. Falls back to
/// `build_tangent` when `t` is (nearly) parallel to `n` or zero.
pub fn orthogonalize_tangent(t: &Vector3f, n: &Vector3f) -> Vector3f {
    let projected = t - n * n.dot(t);
    let length = projected.norm();
    if length < EPSILON {
        build_tangent(n)
    } else {
        projected / length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_tangent_is_perpendicular() {
        for n in [Vector3f::new(0.0, 0.0, 1.0),
                  Vector3f::new(0.0, 1.0, 0.0),
                  Vector3f::new(1.0, 2.0, -3.0).normalize()].iter() {
            let t = build_tangent(n);
            assert!((t.norm() - 1.0).abs() < 1e-5);
            assert!(t.dot(n).abs() < 1e-5);
        }
    }

    #[test]
    fn test_orthogonalize_tangent() {
        let n = Vector3f::new(0.0, 1.0, 0.0);
        let t = orthogonalize_tangent(&Vector3f::new(2.0, 1.0, 0.0), &n);
        assert!((t - Vector3f::new(1.0, 0.0, 0.0)).norm() < 1e-5);

        let fallback = orthogonalize_tangent(&Vector3f::new(0.0, 3.0, 0.0), &n);
        assert!((fallback.norm() - 1.0).abs() < 1e-5);
        assert!(fallback.dot(&n).abs() < 1e-5);
    }
}
