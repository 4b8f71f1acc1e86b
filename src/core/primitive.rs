// Copyright @yucwang 2026

use crate::core::bvh::BVHAccel;
use crate::core::shape::Shape;
use crate::math::aabb::AABB;
use crate::shapes::capsule::Capsule;
use crate::shapes::disk::Disk;
use crate::shapes::plane::Plane;
use crate::shapes::sphere::Sphere;
use crate::shapes::triangle::Triangle;
use crate::shapes::triangle_mesh::TriangleMesh;

use std::sync::Arc;

/// Every kind of geometry a scene node or BVH leaf can hold, in its
/// canonical local space.
#[derive(Debug, Clone)]
pub enum Primitive {
    Sphere(Sphere),
    Plane(Plane),
    Disk(Disk),
    Capsule(Capsule),
    Triangle(Triangle),
    TriMesh(Arc<TriangleMesh>),
    Aggregate(Arc<BVHAccel>),
}

impl Primitive {
    pub fn bounding_box(&self) -> AABB {
        match self {
            Primitive::Sphere(s) => s.bounding_box(),
            Primitive::Plane(s) => s.bounding_box(),
            Primitive::Disk(s) => s.bounding_box(),
            Primitive::Capsule(s) => s.bounding_box(),
            Primitive::Triangle(s) => s.bounding_box(),
            Primitive::TriMesh(s) => s.bounding_box(),
            Primitive::Aggregate(accel) => accel.bounding_box(),
        }
    }
}

impl From<Sphere> for Primitive {
    fn from(s: Sphere) -> Self {
        Primitive::Sphere(s)
    }
}

impl From<Plane> for Primitive {
    fn from(s: Plane) -> Self {
        Primitive::Plane(s)
    }
}

impl From<Disk> for Primitive {
    fn from(s: Disk) -> Self {
        Primitive::Disk(s)
    }
}

impl From<Capsule> for Primitive {
    fn from(s: Capsule) -> Self {
        Primitive::Capsule(s)
    }
}

impl From<Triangle> for Primitive {
    fn from(s: Triangle) -> Self {
        Primitive::Triangle(s)
    }
}

impl From<Arc<TriangleMesh>> for Primitive {
    fn from(mesh: Arc<TriangleMesh>) -> Self {
        Primitive::TriMesh(mesh)
    }
}

impl From<Arc<BVHAccel>> for Primitive {
    fn from(accel: Arc<BVHAccel>) -> Self {
        Primitive::Aggregate(accel)
    }
}
