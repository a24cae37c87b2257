//! glTF 2.0 scene import.
//!
//! Loads `.gltf`/`.glb` documents into a renderer-ready [`Scene`]: GPU
//! vertex/index buffers per primitive, uploaded textures, typed PBR
//! materials, cameras, and the full node hierarchy.
//!
//! Parsing is delegated to the `gltf` crate; this module owns the
//! translation and upload pipeline. Images decode in parallel on a worker
//! pool and upload through one batched command submission with explicit
//! layout transitions. Loading is synchronous and all-or-nothing: either the
//! output scene is fully populated, or the destination is left untouched
//! and an error is returned.
//!
//! # Defaults
//!
//! Missing optional references degrade instead of failing: a texture
//! without a sampler uses one shared default sampler, a primitive without a
//! material uses one shared default material, and a synthetic perspective
//! camera is always attached so the scene has a viewpoint. All three are
//! created fresh per load call.
//!
//! # Example
//!
//! ```ignore
//! use auriga_graphics::gltf::GltfLoader;
//! use auriga_graphics::scene::Scene;
//! use auriga_graphics::GraphicsInstance;
//! use std::path::Path;
//!
//! let instance = GraphicsInstance::new()?;
//! let device = instance.create_device()?;
//!
//! let loader = GltfLoader::new(device);
//! let mut scene = Scene::new();
//! loader.read_scene_from_file(Path::new("assets/helmet.gltf"), &mut scene)?;
//!
//! println!("meshes: {}", scene.components::<auriga_graphics::scene::Mesh>().len());
//! ```

mod error;
mod format;
mod images;
mod loader;
#[cfg(test)]
mod tests;

pub use error::GltfError;
pub use format::{
    map_attribute_format, map_mag_filter, map_min_filter, map_mipmap_filter, map_wrap,
    widen_elements,
};

use std::path::Path;
use std::sync::Arc;

use crate::device::GraphicsDevice;
use crate::scene::{CompressedImageCodec, Scene};

/// Loader for glTF 2.0 scene documents.
///
/// Holds the device resources are created against and an optional codec for
/// block-compressed image formats the device cannot sample. One loader can
/// serve multiple load calls; no state carries over between them.
pub struct GltfLoader {
    device: Arc<GraphicsDevice>,
    codec: Option<Box<dyn CompressedImageCodec>>,
}

impl GltfLoader {
    /// Create a loader for the given device.
    pub fn new(device: Arc<GraphicsDevice>) -> Self {
        Self {
            device,
            codec: None,
        }
    }

    /// Register a codec for block-compressed image formats.
    #[must_use]
    pub fn with_codec(mut self, codec: Box<dyn CompressedImageCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Load a scene from a `.gltf` or `.glb` file.
    ///
    /// Side files (buffers, images) resolve relative to the file's parent
    /// directory. On success `scene` is replaced with the loaded scene; on
    /// failure it is left untouched.
    pub fn read_scene_from_file(&self, path: &Path, scene: &mut Scene) -> Result<(), GltfError> {
        let data = std::fs::read(path).map_err(|source| {
            log::error!("Failed to read glTF file {}", path.display());
            GltfError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        self.read_scene_from_slice(&data, base_dir, scene)
    }

    /// Load a scene from in-memory document bytes.
    ///
    /// `base_dir` is the directory side files resolve against.
    pub fn read_scene_from_slice(
        &self,
        data: &[u8],
        base_dir: &Path,
        scene: &mut Scene,
    ) -> Result<(), GltfError> {
        let gltf = gltf_dep::Gltf::from_slice(data).map_err(|e| {
            log::error!("Error loading glTF document: {e}");
            GltfError::Parse(e)
        })?;

        let buffers = loader::resolve_buffers(&gltf.document, gltf.blob.clone(), base_dir)?;
        let ctx = loader::LoadContext::new(
            self.device.as_ref(),
            self.codec.as_deref(),
            gltf.document,
            buffers,
            base_dir,
        );

        *scene = ctx.load_scene()?;
        Ok(())
    }
}
