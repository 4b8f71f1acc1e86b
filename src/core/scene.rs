// Copyright @yucwang 2026

use crate::core::interaction::IntersectionResult;
use crate::core::intersector;
use crate::core::primitive::Primitive;
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;

use std::vec::Vec;
use thiserror::Error;

/// Handle of a node in a `Scene`. Only meaningful for the scene that
/// issued it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    #[error("unknown scene node {0:?}")]
    UnknownNode(NodeId),
}

#[derive(Debug, Clone, Default)]
pub struct SceneNode {
    name: Option<String>,
    primitive: Option<Primitive>,
    transform: Option<Transform>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_primitive<P: Into<Primitive>>(mut self, primitive: P) -> Self {
        self.primitive = Some(primitive.into());
        self
    }

    /// `transform` maps this node's local space into its parent's space.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn primitive(&self) -> Option<&Primitive> {
        self.primitive.as_ref()
    }

    pub fn transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Node arena rooted at an empty node. Nodes are never removed, so a
/// `NodeId` stays valid for the lifetime of the scene.
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: Vec<SceneNode>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self { nodes: vec![SceneNode::new()] }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root node exists from construction.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut SceneNode, SceneError> {
        self.nodes.get_mut(id.0).ok_or(SceneError::UnknownNode(id))
    }

    /// Appends `node` as the last child of `parent`.
    pub fn add_node(&mut self, parent: NodeId, mut node: SceneNode) -> Result<NodeId, SceneError> {
        let id = NodeId(self.nodes.len());
        self.node_mut(parent)?.children.push(id);

        node.parent = Some(parent);
        node.children.clear();
        log::debug!("Scene node {:?} ({}) added under {:?}.", id, node.name().unwrap_or("unnamed"), parent);
        self.nodes.push(node);

        Ok(id)
    }

    /// Replaces the node's primitive.
    pub fn attach_primitive<P: Into<Primitive>>(&mut self, id: NodeId, primitive: P) -> Result<(), SceneError> {
        self.node_mut(id)?.primitive = Some(primitive.into());
        log::debug!("Primitive attached to scene node {:?}.", id);
        Ok(())
    }

    /// Replaces the node's local-to-parent transform.
    pub fn attach_transform(&mut self, id: NodeId, transform: Transform) -> Result<(), SceneError> {
        self.node_mut(id)?.transform = Some(transform);
        log::debug!("Transform attached to scene node {:?}.", id);
        Ok(())
    }

    /// First node in insertion order carrying `name`.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter()
            .position(|node| node.name() == Some(name))
            .map(NodeId)
    }

    /// Composition of the transforms from `id` up to the root.
    pub fn local_to_world(&self, id: NodeId) -> Result<Transform, SceneError> {
        let mut result = Transform::default();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id).ok_or(SceneError::UnknownNode(node_id))?;
            if let Some(transform) = node.transform() {
                result = *transform * result;
            }
            current = node.parent();
        }

        Ok(result)
    }

    pub fn world_to_local(&self, id: NodeId) -> Result<Transform, SceneError> {
        self.local_to_world(id).map(|t| t.inverse())
    }

    /// Closest hit over the whole graph. Normal, tangent and hit point of
    /// the result are in world space.
    pub fn ray_intersection(&self, ray: &Ray3f) -> IntersectionResult {
        intersector::intersect_scene(self, ray)
    }

    /// Whether anything is hit within the ray's extent.
    pub fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        intersector::occluded_scene(self, ray)
    }
}
