//! Renderer-ready scene graph.
//!
//! A [`Scene`] owns every loaded entity through a type-keyed
//! [`ComponentRegistry`] and a node arena. Entities reference each other
//! with typed [`Handle`]s and [`NodeHandle`]s resolved against the scene,
//! never with back-pointers, so ownership stays in one place.
//!
//! Entity kinds are appended in dependency order during loading: by the time
//! an entity references another by its source-document index, the referenced
//! entity already occupies that index in its registry vector.

mod camera;
mod image;
mod material;
mod mesh;
mod node;
mod registry;
mod sampler;
mod texture;

pub use camera::{Camera, PerspectiveCamera};
pub use image::{mip_level_count, CompressedImageCodec, Image, Mipmap};
pub use material::{AlphaMode, PbrMaterial};
pub use mesh::{Mesh, SubMesh, VertexAttribute};
pub use node::{Node, NodeHandle};
pub use registry::{ComponentRegistry, Handle};
pub use sampler::Sampler;
pub use texture::Texture;

/// A scene: typed entity collections, a node arena, and a root node list.
#[derive(Default)]
pub struct Scene {
    name: String,
    components: ComponentRegistry,
    nodes: Vec<Node>,
    roots: Vec<NodeHandle>,
}

impl Scene {
    /// Creates an empty, unnamed scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scene name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the scene name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Replace the whole collection of entities of one type.
    pub fn set_components<T: Send + Sync + 'static>(&mut self, components: Vec<T>) {
        self.components.set(components);
    }

    /// All entities of one type, in insertion (document) order.
    pub fn components<T: Send + Sync + 'static>(&self) -> &[T] {
        self.components.all::<T>()
    }

    /// Append one entity, returning its handle.
    pub fn add_component<T: Send + Sync + 'static>(&mut self, component: T) -> Handle<T> {
        self.components.push(component)
    }

    /// Resolve an entity handle.
    pub fn component<T: Send + Sync + 'static>(&self, handle: Handle<T>) -> Option<&T> {
        self.components.get(handle)
    }

    /// Resolve an entity handle mutably.
    pub fn component_mut<T: Send + Sync + 'static>(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.components.get_mut(handle)
    }

    /// Append a node to the arena, returning its handle.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        self.nodes.push(node);
        NodeHandle(self.nodes.len() - 1)
    }

    /// All nodes in the arena.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Resolve a node handle.
    pub fn node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle.0)
    }

    /// Resolve a node handle mutably.
    pub fn node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle.0)
    }

    /// Attach a node as a top-level child of the scene.
    pub fn add_child(&mut self, node: NodeHandle) {
        self.roots.push(node);
    }

    /// Top-level children of the scene.
    pub fn children(&self) -> &[NodeHandle] {
        &self.roots
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("nodes", &self.nodes.len())
            .field("roots", &self.roots.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_arena_handles_are_stable() {
        let mut scene = Scene::new();
        let a = scene.add_node(Node::new("a"));
        let b = scene.add_node(Node::new("b"));
        assert_eq!(scene.node(a).unwrap().name, "a");
        assert_eq!(scene.node(b).unwrap().name, "b");
        assert_eq!(scene.nodes().len(), 2);
    }

    #[test]
    fn components_keep_document_order() {
        let mut scene = Scene::new();
        scene.set_components(vec![PbrMaterial::new("m0"), PbrMaterial::new("m1")]);
        let h = scene.add_component(PbrMaterial::new("m2"));
        assert_eq!(h.index(), 2);
        let names: Vec<&str> = scene
            .components::<PbrMaterial>()
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["m0", "m1", "m2"]);
    }

    #[test]
    fn top_level_children() {
        let mut scene = Scene::new();
        let root = scene.add_node(Node::new("root"));
        scene.add_child(root);
        assert_eq!(scene.children(), &[root]);
    }

    #[test]
    fn bidirectional_mesh_attachment() {
        let mut scene = Scene::new();
        let mesh_handle = scene.add_component(Mesh::new("m"));
        let node_handle = scene.add_node(Node::new("n"));

        scene.node_mut(node_handle).unwrap().mesh = Some(mesh_handle);
        scene
            .component_mut(mesh_handle)
            .unwrap()
            .add_node(node_handle);

        let node = scene.node(node_handle).unwrap();
        let mesh = scene.component(mesh_handle).unwrap();
        assert_eq!(node.mesh, Some(mesh_handle));
        assert!(mesh.nodes.contains(&node_handle));
    }
}
