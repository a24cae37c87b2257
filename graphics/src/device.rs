//! Graphics device.
//!
//! The [`GraphicsDevice`] is the main interface for creating GPU resources
//! and submitting work. It is created by [`GraphicsInstance::create_device`].
//!
//! [`GraphicsInstance::create_device`]: crate::instance::GraphicsInstance::create_device

use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::command::{CommandBuffer, CommandPool, FencePool, Queue, QueueFlags};
use crate::error::GraphicsError;
use crate::resources::{Buffer, Sampler, Texture};
use crate::types::{BufferDescriptor, SamplerDescriptor, TextureDescriptor, TextureFormat};

/// Capabilities of a graphics device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceCapabilities {
    /// Maximum texture dimension.
    pub max_texture_dimension: u32,
    /// Maximum buffer size.
    pub max_buffer_size: u64,
    /// Whether ASTC LDR compressed textures can be sampled natively.
    pub texture_compression_astc: bool,
    /// Whether BC compressed textures can be sampled natively.
    pub texture_compression_bc: bool,
    /// Whether ETC2 compressed textures can be sampled natively.
    pub texture_compression_etc2: bool,
}

impl DeviceCapabilities {
    /// Whether the device can sample the given format natively.
    ///
    /// Uncompressed formats are always samplable; compressed formats depend
    /// on the corresponding compression capability.
    pub fn supports_format(&self, format: TextureFormat) -> bool {
        match format {
            TextureFormat::Astc4x4Unorm | TextureFormat::Astc4x4UnormSrgb => {
                self.texture_compression_astc
            }
            TextureFormat::Bc7Unorm => self.texture_compression_bc,
            TextureFormat::Etc2Rgba8Unorm => self.texture_compression_etc2,
            _ => true,
        }
    }
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            max_texture_dimension: 16384,
            max_buffer_size: 1 << 30, // 1 GB
            texture_compression_astc: false,
            texture_compression_bc: false,
            texture_compression_etc2: false,
        }
    }
}

/// A graphics device for creating GPU resources and submitting work.
///
/// The software device backs resources with host memory and executes
/// submissions synchronously, which keeps the whole upload pipeline
/// observable in tests.
///
/// # Thread Safety
///
/// `GraphicsDevice` is `Send + Sync`; resource creation uses interior
/// mutability where needed.
pub struct GraphicsDevice {
    name: String,
    capabilities: DeviceCapabilities,
    queue: Queue,
    fence_pool: FencePool,
    command_pool: CommandPool,
    // Track allocated resources (weak references for leak diagnostics)
    buffers: RwLock<Vec<Weak<Buffer>>>,
    textures: RwLock<Vec<Weak<Texture>>>,
    samplers: RwLock<Vec<Weak<Sampler>>>,
}

impl GraphicsDevice {
    /// Create a new graphics device (called by GraphicsInstance).
    pub(crate) fn new(name: String, capabilities: DeviceCapabilities) -> Self {
        Self {
            name,
            capabilities,
            queue: Queue::new(QueueFlags::GRAPHICS | QueueFlags::COMPUTE | QueueFlags::TRANSFER),
            fence_pool: FencePool::new(),
            command_pool: CommandPool::new(),
            buffers: RwLock::new(Vec::new()),
            textures: RwLock::new(Vec::new()),
            samplers: RwLock::new(Vec::new()),
        }
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the device capabilities.
    pub fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    /// Create a GPU buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer size is zero or exceeds device limits.
    pub fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<Arc<Buffer>, GraphicsError> {
        if descriptor.size > self.capabilities.max_buffer_size {
            return Err(GraphicsError::InvalidParameter(format!(
                "buffer size {} exceeds maximum {}",
                descriptor.size, self.capabilities.max_buffer_size
            )));
        }
        if descriptor.size == 0 {
            return Err(GraphicsError::InvalidParameter(
                "buffer size cannot be zero".to_string(),
            ));
        }

        let buffer = Arc::new(Buffer::new(descriptor.clone()));
        self.buffers.write().push(Arc::downgrade(&buffer));

        log::trace!(
            "GraphicsDevice: created buffer {:?}, size={}",
            descriptor.label,
            descriptor.size
        );

        Ok(buffer)
    }

    /// Create a GPU texture.
    ///
    /// # Errors
    ///
    /// Returns an error if the texture dimensions are zero or exceed device
    /// limits.
    pub fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
    ) -> Result<Arc<Texture>, GraphicsError> {
        let max_dim = self.capabilities.max_texture_dimension;
        if descriptor.size.width > max_dim
            || descriptor.size.height > max_dim
            || descriptor.size.depth > max_dim
        {
            return Err(GraphicsError::InvalidParameter(format!(
                "texture dimension exceeds maximum {max_dim}"
            )));
        }
        if descriptor.size.width == 0 || descriptor.size.height == 0 {
            return Err(GraphicsError::InvalidParameter(
                "texture dimensions cannot be zero".to_string(),
            ));
        }

        let texture = Arc::new(Texture::new(descriptor.clone()));
        self.textures.write().push(Arc::downgrade(&texture));

        log::trace!(
            "GraphicsDevice: created texture {:?}, size={}x{}",
            descriptor.label,
            descriptor.size.width,
            descriptor.size.height
        );

        Ok(texture)
    }

    /// Create a texture sampler.
    pub fn create_sampler(
        &self,
        descriptor: &SamplerDescriptor,
    ) -> Result<Arc<Sampler>, GraphicsError> {
        let sampler = Arc::new(Sampler::new(descriptor.clone()));
        self.samplers.write().push(Arc::downgrade(&sampler));

        log::trace!("GraphicsDevice: created sampler {:?}", descriptor.label);

        Ok(sampler)
    }

    /// Request a command buffer from the device's command pool.
    pub fn request_command_buffer(&self) -> CommandBuffer {
        self.command_pool.allocate()
    }

    /// Get a queue matching the requested capability flags.
    ///
    /// # Errors
    ///
    /// Returns an error if no queue supports the requested capabilities.
    pub fn queue_by_flags(&self, flags: QueueFlags) -> Result<&Queue, GraphicsError> {
        if self.queue.flags().contains(flags) {
            Ok(&self.queue)
        } else {
            Err(GraphicsError::FeatureNotSupported(format!(
                "no queue with flags {flags:?}"
            )))
        }
    }

    /// Get the fence pool.
    pub fn fence_pool(&self) -> &FencePool {
        &self.fence_pool
    }

    /// Get the command pool.
    pub fn command_pool(&self) -> &CommandPool {
        &self.command_pool
    }

    /// Get the number of live buffers created by this device.
    pub fn buffer_count(&self) -> usize {
        self.buffers
            .read()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Get the number of live textures created by this device.
    pub fn texture_count(&self) -> usize {
        self.textures
            .read()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Get the number of live samplers created by this device.
    pub fn sampler_count(&self) -> usize {
        self.samplers
            .read()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }
}

impl std::fmt::Debug for GraphicsDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphicsDevice")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

static_assertions::assert_impl_all!(GraphicsDevice: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::GraphicsInstance;
    use crate::types::{BufferUsage, TextureUsage};

    fn create_test_device() -> Arc<GraphicsDevice> {
        let instance = GraphicsInstance::new().unwrap();
        instance.create_device().unwrap()
    }

    #[test]
    fn test_create_buffer() {
        let device = create_test_device();
        let buffer = device
            .create_buffer(&BufferDescriptor::new(1024, BufferUsage::VERTEX))
            .unwrap();
        assert_eq!(buffer.size(), 1024);
        assert_eq!(device.buffer_count(), 1);
    }

    #[test]
    fn test_create_buffer_zero_size() {
        let device = create_test_device();
        let result = device.create_buffer(&BufferDescriptor::new(0, BufferUsage::VERTEX));
        assert!(result.is_err());
    }

    #[test]
    fn test_create_texture_zero_size() {
        let device = create_test_device();
        let result = device.create_texture(&TextureDescriptor::new_2d(
            0,
            512,
            TextureFormat::Rgba8Unorm,
            TextureUsage::SAMPLED,
        ));
        assert!(result.is_err());
    }

    #[test]
    fn test_buffer_released_when_dropped() {
        let device = create_test_device();
        {
            let _buffer = device
                .create_buffer(&BufferDescriptor::new(16, BufferUsage::TRANSFER_SRC))
                .unwrap();
            assert_eq!(device.buffer_count(), 1);
        }
        assert_eq!(device.buffer_count(), 0);
    }

    #[test]
    fn test_queue_selection() {
        let device = create_test_device();
        assert!(device.queue_by_flags(QueueFlags::GRAPHICS).is_ok());
        assert!(device
            .queue_by_flags(QueueFlags::GRAPHICS | QueueFlags::TRANSFER)
            .is_ok());
    }

    #[test]
    fn test_format_support_follows_capabilities() {
        let caps = DeviceCapabilities::default();
        assert!(caps.supports_format(TextureFormat::Rgba8Unorm));
        assert!(!caps.supports_format(TextureFormat::Astc4x4Unorm));

        let caps = DeviceCapabilities {
            texture_compression_astc: true,
            ..Default::default()
        };
        assert!(caps.supports_format(TextureFormat::Astc4x4Unorm));
    }
}
