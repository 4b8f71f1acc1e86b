// Copyright @yucwang 2026

use crate::core::interaction::IntersectionResult;
use crate::core::intersector;
use crate::core::primitive::Primitive;
use crate::core::scene::NodeId;
use crate::math::aabb::AABB;
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AccelError {
    #[error("node {node}: leaf range {start}..{end} exceeds {shape_count} shapes")]
    LeafOutOfRange { node: usize, start: usize, end: usize, shape_count: usize },
    #[error("node {node}: split axis {axis} is not 0, 1 or 2")]
    InvalidAxis { node: usize, axis: usize },
    #[error("node {node}: interior node has no first child")]
    MissingFirstChild { node: usize },
    #[error("node {node}: second child {second_child} must lie after the first child and inside {node_count} nodes")]
    InvalidSecondChild { node: usize, second_child: usize, node_count: usize },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum NodeContent {
    /// Shapes `start..start + count` of the accelerator's shape list.
    Leaf { start: usize, count: usize },
    /// The first child is the next slot in the node array.
    Interior { axis: usize, second_child: usize },
}

/// Node of a depth-first flattened BVH.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LinearBVHNode {
    bounds: AABB,
    content: NodeContent,
}

impl LinearBVHNode {
    pub fn leaf(bounds: AABB, start: usize, count: usize) -> Self {
        Self { bounds, content: NodeContent::Leaf { start, count } }
    }

    pub fn interior(bounds: AABB, axis: usize, second_child: usize) -> Self {
        Self { bounds, content: NodeContent::Interior { axis, second_child } }
    }

    pub fn bounds(&self) -> &AABB {
        &self.bounds
    }

    pub fn content(&self) -> NodeContent {
        self.content
    }
}

/// A primitive placed in the accelerator's space.
#[derive(Debug, Clone)]
pub struct BVHShape {
    primitive: Primitive,
    owner: NodeId,
    world_to_local: Transform,
}

impl BVHShape {
    /// `world_to_local` maps accelerator space into the primitive's
    /// canonical space. `owner` is reported by queries that hit this shape.
    pub fn new(primitive: Primitive, owner: NodeId, world_to_local: Transform) -> Self {
        Self { primitive, owner, world_to_local }
    }

    pub fn primitive(&self) -> &Primitive {
        &self.primitive
    }

    pub fn owner(&self) -> NodeId {
        self.owner
    }

    pub fn world_to_local(&self) -> &Transform {
        &self.world_to_local
    }

    /// Bounds of the primitive in accelerator space.
    pub fn bounding_box(&self) -> AABB {
        self.world_to_local.inverse().apply_aabb(&self.primitive.bounding_box())
    }
}

/// Immutable, pre-built bounding volume hierarchy over `BVHShape`s.
#[derive(Debug, Clone, Default)]
pub struct BVHAccel {
    nodes: Vec<LinearBVHNode>,
    shapes: Vec<BVHShape>,
}

impl BVHAccel {
    /// Checks that every node index and shape range is in bounds, so that
    /// traversal can index without further checks.
    pub fn new(nodes: Vec<LinearBVHNode>, shapes: Vec<BVHShape>) -> Result<Self, AccelError> {
        let node_count = nodes.len();
        let shape_count = shapes.len();

        for (i, node) in nodes.iter().enumerate() {
            match node.content {
                NodeContent::Leaf { start, count } => {
                    let end = start.checked_add(count).unwrap_or(usize::MAX);
                    if end > shape_count {
                        return Err(AccelError::LeafOutOfRange { node: i, start, end, shape_count });
                    }
                }
                NodeContent::Interior { axis, second_child } => {
                    if axis > 2 {
                        return Err(AccelError::InvalidAxis { node: i, axis });
                    }
                    if i + 1 >= node_count {
                        return Err(AccelError::MissingFirstChild { node: i });
                    }
                    if second_child <= i + 1 || second_child >= node_count {
                        return Err(AccelError::InvalidSecondChild { node: i, second_child, node_count });
                    }
                }
            }
        }

        log::info!("BVH accelerator created: {} nodes, {} shapes.", node_count, shape_count);
        Ok(Self { nodes, shapes })
    }

    pub fn nodes(&self) -> &[LinearBVHNode] {
        &self.nodes
    }

    pub fn shapes(&self) -> &[BVHShape] {
        &self.shapes
    }

    /// Bounds of the root node, or an empty box for an empty hierarchy.
    pub fn bounding_box(&self) -> AABB {
        self.nodes.first().map(|node| node.bounds).unwrap_or_default()
    }

    /// Closest hit with the accelerator as the query root.
    pub fn ray_intersection(&self, ray: &Ray3f) -> IntersectionResult {
        intersector::intersect_accel(self, ray)
    }

    /// Whether anything is hit within the ray's extent.
    pub fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        intersector::occluded_accel(self, ray)
    }
}
