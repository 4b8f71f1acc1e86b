// Copyright @yucwang 2023

use super::triangle::{ intersect_face, Triangle };

use crate::core::interaction::SurfaceHit;
use crate::core::shape::Shape;
use crate::core::tangent_frame::orthogonalize_tangent;
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector2f, Vector3f, PI };
use crate::math::ray::Ray3f;

use std::sync::Arc;
use std::vec::Vec;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MeshError {
    #[error("index buffer length {0} is not a multiple of 3")]
    IndexCount(usize),
    #[error("{attribute} has {found} entries, expected {expected}")]
    AttributeCount { attribute: &'static str, expected: usize, found: usize },
    #[error("vertex index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
}

/// Indexed triangle mesh with per-vertex normals, texture coordinates and
/// tangents. Every attribute array has one entry per position.
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    indices:   Vec<u32>,
    positions: Vec<Vector3f>,
    normals:   Vec<Vector3f>,
    texcoords: Vec<Vector2f>,
    tangents:  Vec<Vector3f>,
    bounds:    AABB,
}

impl TriangleMesh {
    /// Validates the buffers. Tangents are derived from the texture
    /// coordinates when `tangents` is `None`.
    pub fn new(indices: Vec<u32>,
               positions: Vec<Vector3f>,
               normals: Vec<Vector3f>,
               texcoords: Vec<Vector2f>,
               tangents: Option<Vec<Vector3f>>) -> Result<Self, MeshError> {
        if indices.len() % 3 != 0 {
            return Err(MeshError::IndexCount(indices.len()));
        }

        let vertex_count = positions.len();
        let check_count = |attribute: &'static str, found: usize| {
            if found == vertex_count {
                Ok(())
            } else {
                Err(MeshError::AttributeCount { attribute, expected: vertex_count, found })
            }
        };
        check_count("normals", normals.len())?;
        check_count("texcoords", texcoords.len())?;
        if let Some(tangents) = &tangents {
            check_count("tangents", tangents.len())?;
        }

        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(MeshError::IndexOutOfRange { index, vertex_count });
        }

        let tangents = match tangents {
            Some(tangents) => tangents,
            None => generate_tangents(&indices, &positions, &normals, &texcoords),
        };

        let mesh = Self::assemble(indices, positions, normals, texcoords, tangents);
        log::info!("Triangle mesh created: {} vertices, {} triangles.",
                   mesh.positions.len(), mesh.triangle_count());
        Ok(mesh)
    }

    fn assemble(indices: Vec<u32>,
                positions: Vec<Vector3f>,
                normals: Vec<Vector3f>,
                texcoords: Vec<Vector2f>,
                tangents: Vec<Vector3f>) -> Self {
        let mut bounds = AABB::default();
        for p in &positions {
            bounds.expand_by_point(p);
        }
        Self { indices, positions, normals, texcoords, tangents, bounds }
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn positions(&self) -> &[Vector3f] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vector3f] {
        &self.normals
    }

    pub fn texcoords(&self) -> &[Vector2f] {
        &self.texcoords
    }

    pub fn tangents(&self) -> &[Vector3f] {
        &self.tangents
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex indices of face `face`.
    pub fn face(&self, face: usize) -> Option<[usize; 3]> {
        let tri = self.indices.get(3 * face..3 * face + 3)?;
        Some([tri[0] as usize, tri[1] as usize, tri[2] as usize])
    }

    /// One `Triangle` per face, in storage order.
    pub fn triangles(self: &Arc<Self>) -> Vec<Triangle> {
        (0..self.triangle_count())
            .filter_map(|face| Triangle::new(Arc::clone(self), face))
            .collect()
    }

    /// Axis-aligned unit cube centered at the origin, 4 vertices per face.
    pub fn cube() -> Self {
        let mut indices = Vec::with_capacity(36);
        let mut positions = Vec::with_capacity(24);
        let mut normals = Vec::with_capacity(24);
        let mut texcoords = Vec::with_capacity(24);
        let mut tangents = Vec::with_capacity(24);

        let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
        for axis in 0..3 {
            for &sign in [1.0, -1.0].iter() {
                let mut n = Vector3f::zeros();
                n[axis] = sign;
                let mut u = Vector3f::zeros();
                u[(axis + 1) % 3] = 1.0;
                let mut v = Vector3f::zeros();
                v[(axis + 2) % 3] = 1.0;

                let base = positions.len() as u32;
                for &(su, sv) in corners.iter() {
                    positions.push(0.5 * (n + u * su + v * sv));
                    normals.push(n);
                    texcoords.push(Vector2f::new(0.5 * (1.0 + su), 0.5 * (1.0 + sv)));
                    tangents.push(u);
                }
                indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
            }
        }

        Self::assemble(indices, positions, normals, texcoords, tangents)
    }

    /// Tessellation of the canonical `Plane`: unit square at y = 0.
    pub fn plane() -> Self {
        let positions = vec![Vector3f::new(-0.5, 0.0, -0.5),
                             Vector3f::new( 0.5, 0.0, -0.5),
                             Vector3f::new( 0.5, 0.0,  0.5),
                             Vector3f::new(-0.5, 0.0,  0.5)];
        let texcoords = positions.iter().map(|p| Vector2f::new(p.x + 0.5, p.z + 0.5)).collect();
        let normals = vec![Vector3f::new(0.0, 1.0, 0.0); 4];
        let tangents = vec![Vector3f::new(1.0, 0.0, 0.0); 4];

        Self::assemble(vec![0, 1, 2, 0, 2, 3], positions, normals, texcoords, tangents)
    }

    /// Tessellation of the canonical `Disk` as a fan of `segments` triangles.
    pub fn disk(segments: usize) -> Self {
        let segments = segments.max(3);
        let mut positions = vec![Vector3f::zeros()];
        for i in 0..segments {
            let angle = 2.0 * PI * i as Float / segments as Float;
            positions.push(Vector3f::new(angle.cos(), 0.0, angle.sin()));
        }

        let mut indices = Vec::with_capacity(3 * segments);
        for i in 0..segments {
            indices.extend_from_slice(&[0, 1 + i as u32, 1 + ((i + 1) % segments) as u32]);
        }

        let texcoords = positions.iter().map(|p| Vector2f::new(0.5 * (1.0 + p.x), 0.5 * (1.0 + p.z))).collect();
        let normals = vec![Vector3f::new(0.0, 1.0, 0.0); positions.len()];
        let tangents = vec![Vector3f::new(1.0, 0.0, 0.0); positions.len()];

        Self::assemble(indices, positions, normals, texcoords, tangents)
    }

    /// Latitude/longitude tessellation of the unit sphere, using the same
    /// texture parametrization as the analytic `Sphere`.
    pub fn sphere(rings: usize, segments: usize) -> Self {
        let rings = rings.max(2);
        let segments = segments.max(3);

        let mut positions = Vec::with_capacity((rings + 1) * (segments + 1));
        let mut texcoords = Vec::with_capacity(positions.capacity());
        let mut tangents = Vec::with_capacity(positions.capacity());
        for i in 0..=rings {
            let theta = PI * i as Float / rings as Float;
            for j in 0..=segments {
                let phi = 2.0 * PI * j as Float / segments as Float;
                let p = Vector3f::new(theta.sin() * phi.sin(), theta.cos(), theta.sin() * phi.cos());
                positions.push(p);
                texcoords.push(Vector2f::new(j as Float / segments as Float, i as Float / rings as Float));
                tangents.push(Vector3f::new(phi.cos(), 0.0, -phi.sin()));
            }
        }

        let stride = (segments + 1) as u32;
        let mut indices = Vec::with_capacity(6 * rings * segments);
        for i in 0..rings as u32 {
            for j in 0..segments as u32 {
                let a = i * stride + j;
                let b = a + stride;
                indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }

        let normals = positions.clone();
        Self::assemble(indices, positions, normals, texcoords, tangents)
    }
}

/// Per-vertex tangents from texture-coordinate derivatives, accumulated over
/// the faces sharing a vertex and made orthogonal to its normal.
fn generate_tangents(indices: &[u32],
                     positions: &[Vector3f],
                     normals: &[Vector3f],
                     texcoords: &[Vector2f]) -> Vec<Vector3f> {
    let mut accum = vec![Vector3f::zeros(); positions.len()];
    let mut degenerate = 0usize;

    for tri in indices.chunks(3) {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let e1 = positions[i1] - positions[i0];
        let e2 = positions[i2] - positions[i0];
        let duv1 = texcoords[i1] - texcoords[i0];
        let duv2 = texcoords[i2] - texcoords[i0];

        let det = duv1.x * duv2.y - duv2.x * duv1.y;
        if det.abs() < 1e-12 {
            degenerate += 1;
            continue;
        }

        let tangent = (e1 * duv2.y - e2 * duv1.y) / det;
        for &i in [i0, i1, i2].iter() {
            accum[i] += tangent;
        }
    }

    if degenerate > 0 {
        log::warn!("{} triangles have degenerate texture coordinates, their tangents are arbitrary.", degenerate);
    }

    accum.iter()
        .zip(normals.iter())
        .map(|(t, n)| orthogonalize_tangent(t, &n.normalize()))
        .collect()
}

impl Shape for TriangleMesh {
    fn bounding_box(&self) -> AABB {
        self.bounds
    }

    /// Faces are tested in storage order and the first valid hit is returned.
    /// A later face may be nearer; meshes needing the nearest face go through
    /// an aggregate of per-face `Triangle`s.
    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceHit> {
        (0..self.triangle_count())
            .filter_map(|face| self.face(face))
            .find_map(|idx| intersect_face(self, idx, ray))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::sphere::{ tangent_of, texcoord_of };

    fn quad_at_z(z: Float) -> [Vector3f; 4] {
        [Vector3f::new(-1.0, -1.0, z), Vector3f::new(1.0, -1.0, z),
         Vector3f::new(1.0, 1.0, z), Vector3f::new(-1.0, 1.0, z)]
    }

    #[test]
    fn test_validation_errors() {
        let p = vec![Vector3f::zeros(); 3];
        let n = vec![Vector3f::new(0.0, 0.0, 1.0); 3];
        let uv = vec![Vector2f::zeros(); 3];

        assert_eq!(TriangleMesh::new(vec![0, 1], p.clone(), n.clone(), uv.clone(), None).err(),
                   Some(MeshError::IndexCount(2)));
        assert_eq!(TriangleMesh::new(vec![0, 1, 2], p.clone(), vec![], uv.clone(), None).err(),
                   Some(MeshError::AttributeCount { attribute: "normals", expected: 3, found: 0 }));
        assert_eq!(TriangleMesh::new(vec![0, 1, 2], p.clone(), n.clone(), uv.clone(), Some(vec![])).err(),
                   Some(MeshError::AttributeCount { attribute: "tangents", expected: 3, found: 0 }));
        assert_eq!(TriangleMesh::new(vec![0, 1, 3], p, n, uv, None).err(),
                   Some(MeshError::IndexOutOfRange { index: 3, vertex_count: 3 }));
    }

    #[test]
    fn test_generated_tangents_follow_u() {
        let positions = quad_at_z(0.0).to_vec();
        let normals = vec![Vector3f::new(0.0, 0.0, 1.0); 4];
        let texcoords = positions.iter().map(|p| Vector2f::new(0.5 * (p.x + 1.0), 0.5 * (p.y + 1.0))).collect();
        let mesh = TriangleMesh::new(vec![0, 1, 2, 0, 2, 3], positions, normals, texcoords, None)
            .expect("valid mesh");

        for t in mesh.tangents() {
            assert!((t - Vector3f::new(1.0, 0.0, 0.0)).norm() < 1e-5);
        }
    }

    #[test]
    fn test_generated_tangents_degenerate_uv() {
        let positions = quad_at_z(0.0)[..3].to_vec();
        let normals = vec![Vector3f::new(0.0, 0.0, 1.0); 3];
        let mesh = TriangleMesh::new(vec![0, 1, 2], positions, normals, vec![Vector2f::zeros(); 3], None)
            .expect("valid mesh");
        for t in mesh.tangents() {
            assert!((t.norm() - 1.0).abs() < 1e-5);
            assert!(t.z.abs() < 1e-5);
        }
    }

    #[test]
    fn test_linear_scan_returns_first_stored_hit() {
        // The far quad (z = 5) is stored before the near quad (z = 2).
        let mut positions = quad_at_z(5.0).to_vec();
        positions.extend_from_slice(&quad_at_z(2.0));
        let normals = vec![Vector3f::new(0.0, 0.0, -1.0); 8];
        let texcoords = vec![Vector2f::zeros(); 8];
        let tangents = vec![Vector3f::new(1.0, 0.0, 0.0); 8];
        let mesh = TriangleMesh::new(vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7],
                                     positions, normals, texcoords, Some(tangents))
            .expect("valid mesh");

        let ray = Ray3f::new(Vector3f::new(0.1, 0.2, 0.0), Vector3f::new(0.0, 0.0, 1.0), None, None);
        let hit = mesh.ray_intersection(&ray).expect("ray should hit the mesh");
        assert!((hit.t() - 5.0).abs() < 1e-5);

        // Each face on its own still finds the near quad.
        let nearest = Arc::new(mesh).triangles().iter()
            .filter_map(|tri| tri.ray_intersection(&ray))
            .map(|h| h.t())
            .fold(Float::MAX, Float::min);
        assert!((nearest - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_cube_hits() {
        let cube = TriangleMesh::cube();
        assert_eq!(cube.triangle_count(), 12);
        assert_eq!(cube.bounding_box(), AABB::new(Vector3f::new(-0.5, -0.5, -0.5), Vector3f::new(0.5, 0.5, 0.5)));

        let ray = Ray3f::new(Vector3f::new(0.1, 0.2, -3.0), Vector3f::new(0.0, 0.0, 1.0), None, None);
        let first = cube.ray_intersection(&ray).expect("ray should hit the cube");
        // Storage order puts the +z face first, so the scan reports the exit face.
        assert!((first.t() - 3.5).abs() < 1e-5);
        assert!((first.normal() - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-5);
    }

    #[test]
    fn test_plane_and_disk_meshes_match_analytic_uv() {
        let ray = Ray3f::new(Vector3f::new(0.2, 4.0, -0.3), Vector3f::new(0.0, -1.0, 0.0), None, None);

        let plane_hit = TriangleMesh::plane().ray_intersection(&ray).expect("plane mesh hit");
        assert!((plane_hit.t() - 4.0).abs() < 1e-5);
        assert!((plane_hit.texcoord() - Vector2f::new(0.7, 0.2)).norm() < 1e-5);

        let disk_hit = TriangleMesh::disk(32).ray_intersection(&ray).expect("disk mesh hit");
        assert!((disk_hit.texcoord() - Vector2f::new(0.6, 0.35)).norm() < 1e-5);
        assert_eq!(disk_hit.normal(), Vector3f::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_sphere_mesh_attributes() {
        let sphere = TriangleMesh::sphere(16, 32);
        for (p, uv) in sphere.positions().iter().zip(sphere.texcoords()) {
            assert!((p.norm() - 1.0).abs() < 1e-5);
            if p.x.abs() > 1e-3 || p.z.abs() > 1e-3 {
                let expected = texcoord_of(p);
                assert!((uv.y - expected.y).abs() < 1e-4);
                let du = (uv.x - expected.x).abs();
                assert!(du < 1e-4 || (du - 1.0).abs() < 1e-4);
            }
        }
        for (p, t) in sphere.positions().iter().zip(sphere.tangents()) {
            if p.x.abs() > 1e-3 || p.z.abs() > 1e-3 {
                assert!((t - tangent_of(p)).norm() < 1e-4);
            }
        }

        let ray = Ray3f::new(Vector3f::new(0.05, 0.13, -5.0), Vector3f::new(0.0, 0.0, 1.0), None, None);
        let hit = sphere.ray_intersection(&ray).expect("ray should hit the sphere mesh");
        assert!(hit.t() > 3.9 && hit.t() < 6.1);
    }
}
