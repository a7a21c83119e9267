//! Arena-backed transform hierarchy.
//!
//! Nodes live in a flat `Vec` and refer to each other by [`NodeId`]. Each node
//! has exactly one parent except the root, and a node's world transform is the
//! product of its ancestors' local transforms, so rotating a node carries its
//! whole subtree rigidly.

use glam::{Mat4, Quat, Vec3};

use crate::render::{PrimitiveHandle, RenderError, Renderer};

/// Index of a node in its [`SceneGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Local translation, rotation, and scale, composed as `T * R * S`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A node in the hierarchy.
#[derive(Clone, Debug)]
pub struct TransformNode {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    local: Transform,
    visible: bool,
    /// Renderer primitive mirroring this node. Referenced, not owned.
    handle: Option<PrimitiveHandle>,
}

impl TransformNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn local(&self) -> &Transform {
        &self.local
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn handle(&self) -> Option<PrimitiveHandle> {
        self.handle
    }
}

/// The transform tree plus the set of nodes changed since the last sync.
#[derive(Clone, Debug)]
pub struct SceneGraph {
    nodes: Vec<TransformNode>,
    dirty: Vec<bool>,
    dirty_list: Vec<NodeId>,
}

impl SceneGraph {
    /// Create a graph holding only a root node.
    pub fn new(root_name: &str) -> Self {
        let mut graph = Self {
            nodes: Vec::new(),
            dirty: Vec::new(),
            dirty_list: Vec::new(),
        };
        graph.push(root_name, None);
        graph
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a child with an identity transform.
    ///
    /// Panics if `parent` belongs to another graph and is out of range.
    pub fn add_child(&mut self, parent: NodeId, name: &str) -> NodeId {
        let id = self.push(name, Some(parent));
        self.nodes[parent.0].children.push(id);
        id
    }

    fn push(&mut self, name: &str, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(TransformNode {
            name: name.to_string(),
            parent,
            children: Vec::new(),
            local: Transform::IDENTITY,
            visible: true,
            handle: None,
        });
        self.dirty.push(false);
        self.mark_dirty(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &TransformNode {
        &self.nodes[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &TransformNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// First node with the given name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.name == name).map(NodeId)
    }

    pub fn set_handle(&mut self, id: NodeId, handle: PrimitiveHandle) {
        self.nodes[id.0].handle = Some(handle);
    }

    pub fn set_translation(&mut self, id: NodeId, translation: Vec3) {
        if self.nodes[id.0].local.translation != translation {
            self.nodes[id.0].local.translation = translation;
            self.mark_dirty(id);
        }
    }

    pub fn set_rotation(&mut self, id: NodeId, rotation: Quat) {
        if self.nodes[id.0].local.rotation != rotation {
            self.nodes[id.0].local.rotation = rotation;
            self.mark_dirty(id);
        }
    }

    /// Set the local scale. Returns whether it changed.
    pub fn set_scale(&mut self, id: NodeId, scale: Vec3) -> bool {
        if self.nodes[id.0].local.scale == scale {
            return false;
        }
        self.nodes[id.0].local.scale = scale;
        self.mark_dirty(id);
        true
    }

    /// Set the visibility flag. Returns whether it changed.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> bool {
        let node = &mut self.nodes[id.0];
        if node.visible == visible {
            return false;
        }
        node.visible = visible;
        true
    }

    /// Rotate about the node's own local X axis (post-multiplied).
    pub fn rotate_local_x(&mut self, id: NodeId, angle: f32) {
        self.rotate_local(id, Quat::from_rotation_x(angle));
    }

    /// Rotate about the node's own local Y axis (post-multiplied).
    pub fn rotate_local_y(&mut self, id: NodeId, angle: f32) {
        self.rotate_local(id, Quat::from_rotation_y(angle));
    }

    /// Rotate about the node's own local Z axis (post-multiplied).
    pub fn rotate_local_z(&mut self, id: NodeId, angle: f32) {
        self.rotate_local(id, Quat::from_rotation_z(angle));
    }

    fn rotate_local(&mut self, id: NodeId, delta: Quat) {
        if delta == Quat::IDENTITY {
            return;
        }
        let local = &mut self.nodes[id.0].local;
        local.rotation = (local.rotation * delta).normalize();
        self.mark_dirty(id);
    }

    pub fn local_matrix(&self, id: NodeId) -> Mat4 {
        self.nodes[id.0].local.matrix()
    }

    /// Composed transform from the root down to `id`.
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = self.local_matrix(id);
        let mut current = self.nodes[id.0].parent;
        while let Some(parent) = current {
            matrix = self.local_matrix(parent) * matrix;
            current = self.nodes[parent.0].parent;
        }
        matrix
    }

    pub fn world_position(&self, id: NodeId) -> Vec3 {
        self.world_matrix(id).w_axis.truncate()
    }

    /// Whether `ancestor` lies on the path from `id` to the root (inclusive).
    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.nodes[node.0].parent;
        }
        false
    }

    fn mark_dirty(&mut self, id: NodeId) {
        if !self.dirty[id.0] {
            self.dirty[id.0] = true;
            self.dirty_list.push(id);
        }
    }

    pub fn dirty_count(&self) -> usize {
        self.dirty_list.len()
    }

    /// Push every changed local transform to the renderer and clear the dirty set.
    ///
    /// Nodes without a primitive are skipped. Returns the number pushed.
    pub fn sync<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> Result<usize, RenderError> {
        let mut pushed = 0;
        for id in std::mem::take(&mut self.dirty_list) {
            self.dirty[id.0] = false;
            let node = &self.nodes[id.0];
            if let Some(handle) = node.handle {
                renderer.set_local_transform(handle, &node.local)?;
                pushed += 1;
            }
        }
        Ok(pushed)
    }
}
