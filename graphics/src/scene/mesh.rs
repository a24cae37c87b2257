//! Mesh and submesh entities.

use std::collections::HashMap;
use std::sync::Arc;

use crate::resources::Buffer;
use crate::types::{IndexFormat, VertexFormat};

use super::material::PbrMaterial;
use super::node::NodeHandle;
use super::registry::Handle;

/// Format and stride of one vertex attribute as stored in its buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Hardware format of the attribute elements.
    pub format: VertexFormat,
    /// Byte stride between consecutive elements.
    pub stride: u32,
}

/// One drawable primitive group: vertex/index buffers plus one material.
#[derive(Debug, Default)]
pub struct SubMesh {
    /// Attribute name → GPU vertex buffer.
    pub vertex_buffers: HashMap<String, Arc<Buffer>>,
    /// Attribute name → format/stride metadata.
    pub attributes: HashMap<String, VertexAttribute>,
    /// Number of vertices.
    pub vertex_count: u32,
    /// GPU index buffer, if the primitive is indexed.
    pub index_buffer: Option<Arc<Buffer>>,
    /// Element width of the index buffer.
    pub index_type: IndexFormat,
    /// Number of indices.
    pub index_count: u32,
    /// The material this submesh draws with.
    pub material: Option<Handle<PbrMaterial>>,
}

impl SubMesh {
    /// Creates an empty submesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the metadata of a named attribute.
    pub fn attribute(&self, name: &str) -> Option<&VertexAttribute> {
        self.attributes.get(name)
    }
}

/// A named mesh: a group of submeshes, plus the nodes it is attached to.
#[derive(Debug, Default)]
pub struct Mesh {
    /// Mesh name from the source document, possibly empty.
    pub name: String,
    /// Submeshes belonging to this mesh.
    pub submeshes: Vec<Handle<SubMesh>>,
    /// Nodes this mesh is attached to.
    pub nodes: Vec<NodeHandle>,
}

impl Mesh {
    /// Creates a named mesh with no submeshes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Record a submesh as belonging to this mesh.
    pub fn add_submesh(&mut self, submesh: Handle<SubMesh>) {
        self.submeshes.push(submesh);
    }

    /// Record a node this mesh is attached to.
    pub fn add_node(&mut self, node: NodeHandle) {
        self.nodes.push(node);
    }
}
