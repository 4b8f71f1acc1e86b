// Copyright 2020 @TwoCookingMice

use super::aabb::AABB;
use super::constants::{ Float, Vector3f, Matrix4f };
use super::ray::Ray3f;
use crate::na;

use std::ops::Mul;

/// An affine transform together with its inverse.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    matrix: Matrix4f,
    inv_matrix: Matrix4f
}

impl Default for Transform {
    fn default() -> Self {
        Self { matrix: Matrix4f::identity(),
               inv_matrix: Matrix4f::identity() }
    }
}

fn mul_point(m: &Matrix4f, p: &Vector3f) -> Vector3f {
    let h = m * p.push(1.0);
    Vector3f::new(h[0] / h[3], h[1] / h[3], h[2] / h[3])
}

fn mul_vector(m: &Matrix4f, v: &Vector3f) -> Vector3f {
    let h = m * v.push(0.0);
    Vector3f::new(h[0], h[1], h[2])
}

impl Transform {
    /// Singular matrices fall back to the identity.
    pub fn new(matrix: Matrix4f) -> Self {
        Self::try_new(matrix).unwrap_or_else(|| {
            log::warn!("Singular transform matrix, falling back to identity.");
            Self::default()
        })
    }

    pub fn try_new(matrix: Matrix4f) -> Option<Self> {
        matrix.try_inverse().map(|inv_matrix| Self { matrix, inv_matrix })
    }

    pub fn translate(offset: Vector3f) -> Self {
        Self { matrix: Matrix4f::new_translation(&offset),
               inv_matrix: Matrix4f::new_translation(&(-offset)) }
    }

    pub fn scale(factors: Vector3f) -> Self {
        Self::new(Matrix4f::new_nonuniform_scaling(&factors))
    }

    /// Rotation of `angle` radians around `axis`.
    pub fn rotate(axis: Vector3f, angle: Float) -> Self {
        let rotation = Matrix4f::from_axis_angle(&na::Unit::new_normalize(axis), angle);
        Self { matrix: rotation, inv_matrix: rotation.transpose() }
    }

    pub fn matrix(&self) -> &Matrix4f {
        &self.matrix
    }

    pub fn inverse(&self) -> Self {
        Self { matrix: self.inv_matrix, inv_matrix: self.matrix }
    }

    pub fn apply_point(&self, p: Vector3f) -> Vector3f {
        mul_point(&self.matrix, &p)
    }

    pub fn apply_vector(&self, v: Vector3f) -> Vector3f {
        mul_vector(&self.matrix, &v)
    }

    // Normal transformation is different from point transformation.
    // Before transformation, we have n^Tx = 0
    // After transformation, we have (Sn)^T(Mx) = 0
    // Then, we will get: S = (M^{-1})^T
    pub fn apply_normal(&self, n: Vector3f) -> Vector3f {
        mul_vector(&self.inv_matrix.transpose(), &n)
    }

    pub fn apply_ray(&self, ray: &Ray3f) -> Ray3f {
        let new_p = self.apply_point(ray.origin());
        let new_d = self.apply_vector(ray.dir());

        Ray3f::new(new_p, new_d, Some(ray.min_t), Some(ray.max_t))
    }

    pub fn inv_apply_point(&self, p: Vector3f) -> Vector3f {
        mul_point(&self.inv_matrix, &p)
    }

    pub fn inv_apply_vector(&self, v: Vector3f) -> Vector3f {
        mul_vector(&self.inv_matrix, &v)
    }

    pub fn inv_apply_normal(&self, n: Vector3f) -> Vector3f {
        mul_vector(&self.matrix.transpose(), &n)
    }

    pub fn inv_apply_ray(&self, ray: &Ray3f) -> Ray3f {
        let new_p = self.inv_apply_point(ray.origin());
        let new_d = self.inv_apply_vector(ray.dir());

        Ray3f::new(new_p, new_d, Some(ray.min_t), Some(ray.max_t))
    }

    /// Bounds of the transformed box corners.
    pub fn apply_aabb(&self, bounds: &AABB) -> AABB {
        let mut result = AABB::default();
        for corner in bounds.corners().iter() {
            result.expand_by_point(&self.apply_point(*corner));
        }
        result
    }
}

impl Mul for Transform {
    type Output = Transform;

    /// `a * b` applies `b` first, then `a`.
    fn mul(self, rhs: Transform) -> Transform {
        Transform { matrix: self.matrix * rhs.matrix,
                    inv_matrix: rhs.inv_matrix * self.inv_matrix }
    }
}
