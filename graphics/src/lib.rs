//! # Auriga Graphics
//!
//! Graphics layer for the Auriga engine:
//!
//! - [`GraphicsInstance`] / [`GraphicsDevice`] - device abstraction with
//!   buffers, textures, samplers, and command submission
//! - [`scene`] - renderer-ready scene graph with typed entity registries
//! - [`gltf`] - glTF 2.0 import into a [`scene::Scene`]
//!
//! ## Example
//!
//! ```ignore
//! use auriga_graphics::{gltf::GltfLoader, scene::Scene, GraphicsInstance};
//!
//! let instance = GraphicsInstance::new()?;
//! let device = instance.create_device()?;
//!
//! let mut scene = Scene::new();
//! GltfLoader::new(device).read_scene_from_file("model.gltf".as_ref(), &mut scene)?;
//! ```

pub mod command;
pub mod device;
pub mod error;
pub mod gltf;
pub mod instance;
pub mod resources;
pub mod scene;
pub mod types;

// Re-export main types for convenience
pub use command::{CommandBuffer, CommandBufferUsage, QueueFlags};
pub use device::{DeviceCapabilities, GraphicsDevice};
pub use error::GraphicsError;
pub use instance::GraphicsInstance;
pub use types::{
    BufferDescriptor, BufferUsage, Extent3d, IndexFormat, SamplerDescriptor, TextureDescriptor,
    TextureFormat, TextureLayout, TextureUsage, VertexFormat,
};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the graphics subsystem.
pub fn init() {
    log::info!("Auriga Graphics v{} initialized", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_instance_and_device() {
        let instance = GraphicsInstance::new().unwrap();
        let device = instance.create_device().unwrap();
        assert_eq!(device.texture_count(), 0);
    }
}
