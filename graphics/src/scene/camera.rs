//! Camera entities.

use super::node::NodeHandle;

/// A scene camera over the closed set of supported projection kinds.
///
/// Variants are added deliberately; source documents declaring other kinds
/// produce no camera entity.
#[derive(Debug)]
pub enum Camera {
    /// Perspective projection camera.
    Perspective(PerspectiveCamera),
}

impl Camera {
    /// Camera name.
    pub fn name(&self) -> &str {
        match self {
            Self::Perspective(cam) => &cam.name,
        }
    }

    /// The node this camera is attached to, if any.
    pub fn node(&self) -> Option<NodeHandle> {
        match self {
            Self::Perspective(cam) => cam.node,
        }
    }

    /// Attach the camera to a node.
    pub fn set_node(&mut self, node: NodeHandle) {
        match self {
            Self::Perspective(cam) => cam.node = Some(node),
        }
    }
}

/// Perspective projection parameters.
#[derive(Debug)]
pub struct PerspectiveCamera {
    /// Camera name from the source document, possibly empty.
    pub name: String,
    /// Aspect ratio (width / height).
    pub aspect_ratio: f32,
    /// Vertical field of view in radians.
    pub field_of_view: f32,
    /// Near clipping plane distance.
    pub near_plane: f32,
    /// Far clipping plane distance.
    pub far_plane: f32,
    /// Node this camera is attached to.
    pub node: Option<NodeHandle>,
}

impl PerspectiveCamera {
    /// Creates a perspective camera with the given projection parameters.
    pub fn new(
        name: impl Into<String>,
        aspect_ratio: f32,
        field_of_view: f32,
        near_plane: f32,
        far_plane: f32,
    ) -> Self {
        Self {
            name: name.into(),
            aspect_ratio,
            field_of_view,
            near_plane,
            far_plane,
            node: None,
        }
    }
}
