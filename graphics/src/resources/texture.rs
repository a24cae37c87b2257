//! GPU texture resource.

use parking_lot::Mutex;

use crate::error::GraphicsError;
use crate::types::{Extent3d, TextureDescriptor, TextureFormat, TextureLayout};

/// A GPU texture resource.
///
/// Textures are created by [`GraphicsDevice::create_texture`]. The current
/// [`TextureLayout`] is tracked through recorded barrier transitions so the
/// upload protocol (undefined → transfer-dst → shader-read-only) is
/// observable and validated at submission time.
///
/// [`GraphicsDevice::create_texture`]: crate::device::GraphicsDevice::create_texture
pub struct Texture {
    descriptor: TextureDescriptor,
    layout: Mutex<TextureLayout>,
    data: Mutex<Vec<u8>>,
}

impl Texture {
    pub(crate) fn new(descriptor: TextureDescriptor) -> Self {
        // Host backing sized for all mips, using the same per-level byte
        // math copy commands use so offsets line up.
        let mut bytes = 0u64;
        for level in 0..descriptor.mip_level_count {
            let extent = descriptor.size.mip_level(level);
            bytes += descriptor.format.bytes_for_extent(extent);
        }
        Self {
            descriptor,
            layout: Mutex::new(TextureLayout::Undefined),
            data: Mutex::new(vec![0u8; bytes as usize]),
        }
    }

    /// Get the texture descriptor.
    pub fn descriptor(&self) -> &TextureDescriptor {
        &self.descriptor
    }

    /// Get the texture size.
    pub fn size(&self) -> Extent3d {
        self.descriptor.size
    }

    /// Get the texture format.
    pub fn format(&self) -> TextureFormat {
        self.descriptor.format
    }

    /// Get the mip level count.
    pub fn mip_level_count(&self) -> u32 {
        self.descriptor.mip_level_count
    }

    /// Get the texture label, if set.
    pub fn label(&self) -> Option<&str> {
        self.descriptor.label.as_deref()
    }

    /// Current layout as of the last executed barrier.
    pub fn layout(&self) -> TextureLayout {
        *self.layout.lock()
    }

    /// Transition the layout, verifying the expected old layout.
    pub(crate) fn transition(
        &self,
        old: TextureLayout,
        new: TextureLayout,
    ) -> Result<(), GraphicsError> {
        let mut layout = self.layout.lock();
        if *layout != old {
            return Err(GraphicsError::InvalidCommand(format!(
                "layout transition expected {:?} but texture {:?} is in {:?}",
                old,
                self.descriptor.label,
                *layout
            )));
        }
        *layout = new;
        Ok(())
    }

    /// Write pixel bytes at a byte offset, used by executed copy commands.
    pub(crate) fn write_bytes(&self, offset: u64, bytes: &[u8]) -> Result<(), GraphicsError> {
        let mut data = self.data.lock();
        let start = offset as usize;
        let end = start + bytes.len();
        if end > data.len() {
            return Err(GraphicsError::InvalidCommand(format!(
                "copy of {} bytes at offset {} exceeds texture storage {}",
                bytes.len(),
                offset,
                data.len()
            )));
        }
        data[start..end].copy_from_slice(bytes);
        Ok(())
    }

    /// Read the full host backing, for tests.
    pub fn read(&self) -> Vec<u8> {
        self.data.lock().clone()
    }
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("size", &self.descriptor.size)
            .field("format", &self.descriptor.format)
            .field("mips", &self.descriptor.mip_level_count)
            .field("label", &self.descriptor.label)
            .finish()
    }
}

static_assertions::assert_impl_all!(Texture: Send, Sync);
