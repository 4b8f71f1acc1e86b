// Copyright @yucwang 2023

use crate::core::scene::NodeId;
use crate::math::constants::{ Float, Vector2f, Vector3f, FLOAT_MAX };

/// A primitive hit in the primitive's own local space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SurfaceHit {
    t: Float,
    normal: Vector3f,
    tangent: Vector3f,
    texcoord: Vector2f,
}

impl SurfaceHit {
    pub fn new(t: Float, normal: Vector3f, tangent: Vector3f, texcoord: Vector2f) -> Self {
        Self { t, normal, tangent, texcoord }
    }

    pub fn t(&self) -> Float {
        self.t
    }

    pub fn normal(&self) -> Vector3f {
        self.normal
    }

    pub fn tangent(&self) -> Vector3f {
        self.tangent
    }

    pub fn texcoord(&self) -> Vector2f {
        self.texcoord
    }
}

/// Output of a closest-hit query.
///
/// While the query runs, `normal` and `tangent` live in the space of the
/// innermost level that has not been unwound yet. Once returned they are in
/// world space.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionResult {
    closest: Option<NodeId>,
    normal: Vector3f,
    tangent: Vector3f,
    texcoord: Vector2f,
    t: Float,
    p: Vector3f,
    hit_count: usize,
}

impl Default for IntersectionResult {
    fn default() -> Self {
        Self {
            closest: None,
            normal: Vector3f::zeros(),
            tangent: Vector3f::zeros(),
            texcoord: Vector2f::zeros(),
            t: FLOAT_MAX,
            p: Vector3f::zeros(),
            hit_count: 0,
        }
    }
}

impl IntersectionResult {
    pub fn is_hit(&self) -> bool {
        self.closest.is_some()
    }

    /// Scene node owning the closest primitive hit.
    pub fn closest_node(&self) -> Option<NodeId> {
        self.closest
    }

    pub fn normal(&self) -> Vector3f {
        self.normal
    }

    pub fn tangent(&self) -> Vector3f {
        self.tangent
    }

    pub fn texcoord(&self) -> Vector2f {
        self.texcoord
    }

    /// Ray parameter of the hit. Meaningless when `is_hit()` is false.
    pub fn t(&self) -> Float {
        self.t
    }

    /// World-space hit point.
    pub fn p(&self) -> Vector3f {
        self.p
    }

    pub(crate) fn record(&mut self, owner: NodeId, hit: &SurfaceHit) {
        self.closest = Some(owner);
        self.normal = hit.normal;
        self.tangent = hit.tangent;
        self.texcoord = hit.texcoord;
        self.t = hit.t;
        self.hit_count += 1;
    }

    /// Number of `record` calls so far. Lets a traversal level tell whether
    /// anything below it produced a hit.
    pub(crate) fn hit_count(&self) -> usize {
        self.hit_count
    }

    pub(crate) fn set_frame(&mut self, normal: Vector3f, tangent: Vector3f) {
        self.normal = normal.normalize();
        self.tangent = tangent.normalize();
    }

    pub(crate) fn set_p(&mut self, p: Vector3f) {
        self.p = p;
    }
}
