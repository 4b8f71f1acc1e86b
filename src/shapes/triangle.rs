// Copyright @yucwang 2023

use super::triangle_mesh::TriangleMesh;

use crate::core::interaction::SurfaceHit;
use crate::core::shape::Shape;
use crate::math::aabb::AABB;
use crate::math::ray::Ray3f;

use std::sync::Arc;

/// One face of a shared `TriangleMesh`, addressed by its three vertex indices.
#[derive(Debug, Clone)]
pub struct Triangle {
    mesh: Arc<TriangleMesh>,
    idx: [usize; 3],
}

impl Triangle {
    /// `None` when `face` is past the end of the mesh's index buffer.
    pub fn new(mesh: Arc<TriangleMesh>, face: usize) -> Option<Self> {
        let idx = mesh.face(face)?;
        Some(Triangle { mesh, idx })
    }

    pub fn mesh(&self) -> &Arc<TriangleMesh> {
        &self.mesh
    }

    pub fn indices(&self) -> [usize; 3] {
        self.idx
    }
}

/// Möller-Trumbore test of the face `idx` of `mesh`.
///
/// Hit attributes are the barycentric blend of the per-vertex normals,
/// tangents and texture coordinates.
pub(crate) fn intersect_face(mesh: &TriangleMesh, idx: [usize; 3], ray: &Ray3f) -> Option<SurfaceHit> {
    let positions = mesh.positions();
    let p1 = positions[idx[0]];
    let p2 = positions[idx[1]];
    let p3 = positions[idx[2]];

    let dir = ray.dir();
    let e1 = p2 - p1;
    let e2 = p3 - p1;

    let e1_x_d = e1.cross(&dir);
    let denominator = e1_x_d.dot(&e2);
    // Parallel ray or degenerate face.
    if denominator == 0.0 {
        return None;
    }
    let inv_denominator = 1.0 / denominator;

    let s = ray.origin() - p1;
    let e2_x_s = e2.cross(&s);
    let u = e2_x_s.dot(&dir) * inv_denominator;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let v = e1_x_d.dot(&s) * inv_denominator;
    if !(0.0..=1.0).contains(&v) {
        return None;
    }

    let u_plus_v = u + v;
    if u_plus_v > 1.0 {
        return None;
    }

    let t = e2_x_s.dot(&e1) * inv_denominator;
    if !ray.test_segment(t) {
        return None;
    }

    let w = 1.0 - u_plus_v;

    let normals = mesh.normals();
    let normal = (normals[idx[0]] * w + normals[idx[1]] * u + normals[idx[2]] * v).normalize();

    let tangents = mesh.tangents();
    let tangent = (tangents[idx[0]] * w + tangents[idx[1]] * u + tangents[idx[2]] * v).normalize();

    let texcoords = mesh.texcoords();
    let texcoord = texcoords[idx[0]] * w + texcoords[idx[1]] * u + texcoords[idx[2]] * v;

    Some(SurfaceHit::new(t, normal, tangent, texcoord))
}

impl Shape for Triangle {
    fn bounding_box(&self) -> AABB {
        let positions = self.mesh.positions();
        let mut bound = AABB::new(positions[self.idx[0]], positions[self.idx[1]]);
        bound.expand_by_point(&positions[self.idx[2]]);

        bound
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceHit> {
        intersect_face(&self.mesh, self.idx, ray)
    }
}
