//! Texture types and descriptors.

use super::Extent3d;
use bitflags::bitflags;

/// Texture format enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum TextureFormat {
    /// 8-bit red channel, unsigned normalized.
    R8Unorm,
    /// 8-bit RG channels, unsigned normalized.
    Rg8Unorm,
    /// 8-bit RGBA channels, unsigned normalized.
    #[default]
    Rgba8Unorm,
    /// 8-bit RGBA channels, sRGB.
    Rgba8UnormSrgb,
    /// 16-bit RGBA channels, float.
    Rgba16Float,
    /// 32-bit RGBA channels, float.
    Rgba32Float,

    // Block-compressed formats
    /// ASTC 4x4 block compression, unsigned normalized.
    Astc4x4Unorm,
    /// ASTC 4x4 block compression, sRGB.
    Astc4x4UnormSrgb,
    /// BC7 block compression, unsigned normalized.
    Bc7Unorm,
    /// ETC2 RGBA block compression, unsigned normalized.
    Etc2Rgba8Unorm,
}

impl TextureFormat {
    /// Returns true if this is a block-compressed format.
    pub fn is_compressed(&self) -> bool {
        matches!(
            self,
            Self::Astc4x4Unorm | Self::Astc4x4UnormSrgb | Self::Bc7Unorm | Self::Etc2Rgba8Unorm
        )
    }

    /// Returns the size in bytes per pixel for uncompressed formats,
    /// or per block for compressed ones.
    pub fn block_size(&self) -> u32 {
        match self {
            Self::R8Unorm => 1,
            Self::Rg8Unorm => 2,
            Self::Rgba8Unorm | Self::Rgba8UnormSrgb => 4,
            Self::Rgba16Float => 8,
            Self::Rgba32Float => 16,
            Self::Astc4x4Unorm | Self::Astc4x4UnormSrgb | Self::Bc7Unorm | Self::Etc2Rgba8Unorm => {
                16
            }
        }
    }

    /// Bytes needed to store one mip level of the given extent.
    ///
    /// Compressed formats count 4x4 blocks rather than pixels.
    pub fn bytes_for_extent(&self, extent: Extent3d) -> u64 {
        let block_size = u64::from(self.block_size());
        if self.is_compressed() {
            let blocks_x = u64::from(extent.width.div_ceil(4));
            let blocks_y = u64::from(extent.height.div_ceil(4));
            blocks_x * blocks_y * u64::from(extent.depth) * block_size
        } else {
            extent.pixel_count() * block_size
        }
    }
}

/// Layout of a texture's memory, tracked through barrier transitions.
///
/// Mirrors the upload protocol: textures start undefined, become transfer
/// destinations while pixel data is copied in, and end up shader-readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureLayout {
    /// Contents and layout are undefined.
    #[default]
    Undefined,
    /// Optimal as the destination of transfer commands.
    TransferDst,
    /// Optimal for sampling from shaders.
    ShaderReadOnly,
}

bitflags! {
    /// Usage flags for textures.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        /// Texture can be the destination of a transfer command.
        const TRANSFER_DST = 1 << 0;
        /// Texture can be sampled in a shader.
        const SAMPLED = 1 << 1;
    }
}

impl Default for TextureUsage {
    fn default() -> Self {
        Self::empty()
    }
}

/// Descriptor for creating a texture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureDescriptor {
    /// Debug label for the texture.
    pub label: Option<String>,
    /// Size of the texture.
    pub size: Extent3d,
    /// Mip level count.
    pub mip_level_count: u32,
    /// Texture format.
    pub format: TextureFormat,
    /// Usage flags.
    pub usage: TextureUsage,
}

impl TextureDescriptor {
    /// Create a new 2D texture descriptor with a single mip level.
    pub fn new_2d(width: u32, height: u32, format: TextureFormat, usage: TextureUsage) -> Self {
        Self {
            label: None,
            size: Extent3d::new_2d(width, height),
            mip_level_count: 1,
            format,
            usage,
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the mip level count.
    pub fn with_mip_level_count(mut self, count: u32) -> Self {
        self.mip_level_count = count.max(1);
        self
    }
}
