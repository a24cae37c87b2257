//! Scene nodes.

use auriga_core::math::Transform;

use super::camera::Camera;
use super::mesh::Mesh;
use super::registry::Handle;

/// Index of a node in the scene's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(pub(crate) usize);

impl NodeHandle {
    /// Slot index in the node arena.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A node in the scene tree.
///
/// Each node has a local [`Transform`], at most one parent, an ordered list
/// of children, and one attachment slot per attachable component type.
/// Attachments are bidirectional: the referenced mesh or camera tracks the
/// nodes it is attached to.
#[derive(Debug, Default)]
pub struct Node {
    /// Node name.
    pub name: String,
    /// Local transform relative to the parent.
    pub transform: Transform,
    /// Attached mesh, if any.
    pub mesh: Option<Handle<Mesh>>,
    /// Attached camera, if any.
    pub camera: Option<Handle<Camera>>,
    /// Parent node, if any. At most one.
    pub parent: Option<NodeHandle>,
    /// Ordered child nodes.
    pub children: Vec<NodeHandle>,
}

impl Node {
    /// Creates a named node with identity transform and no attachments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}
