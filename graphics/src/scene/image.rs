//! Image entity: decoded pixel payload plus its GPU texture.

use std::path::Path;
use std::sync::Arc;

use crate::device::GraphicsDevice;
use crate::error::GraphicsError;
use crate::resources;
use crate::types::{Extent3d, TextureDescriptor, TextureFormat, TextureUsage};

/// Descriptor of one mipmap level within an image payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mipmap {
    /// Mip level index.
    pub level: u32,
    /// Byte offset of the level within the payload.
    pub offset: u32,
    /// 3D extent of the level.
    pub extent: Extent3d,
}

/// Pluggable decoder for block-compressed image formats.
///
/// When the device cannot sample a compressed format natively, the pipeline
/// asks a codec for an uncompressed replacement of the level-0 data and
/// regenerates the mip chain from it.
pub trait CompressedImageCodec: Send + Sync {
    /// Whether this codec can decode the given format.
    fn supports(&self, format: TextureFormat) -> bool;

    /// Decode `image` into an uncompressed (RGBA8) single-level image.
    fn decode(&self, image: &Image) -> Result<Image, GraphicsError>;
}

/// A scene image: name, decoded byte payload, mip descriptors, and (after
/// upload) the GPU texture holding the pixels.
#[derive(Debug)]
pub struct Image {
    name: String,
    format: TextureFormat,
    data: Vec<u8>,
    mipmaps: Vec<Mipmap>,
    texture: Option<Arc<resources::Texture>>,
}

impl Image {
    /// Create an image from raw payload bytes and explicit mip descriptors.
    pub fn new(
        name: impl Into<String>,
        format: TextureFormat,
        data: Vec<u8>,
        mipmaps: Vec<Mipmap>,
    ) -> Self {
        Self {
            name: name.into(),
            format,
            data,
            mipmaps,
            texture: None,
        }
    }

    /// Create a single-level RGBA8 image from decoded pixels.
    pub fn from_rgba8(name: impl Into<String>, width: u32, height: u32, data: Vec<u8>) -> Self {
        let mipmap = Mipmap {
            level: 0,
            offset: 0,
            extent: Extent3d::new_2d(width, height),
        };
        Self::new(name, TextureFormat::Rgba8Unorm, data, vec![mipmap])
    }

    /// Decode an image file into a single-level RGBA8 image.
    pub fn load(name: impl Into<String>, path: &Path) -> Result<Self, image::ImageError> {
        let decoded = image::open(path)?.to_rgba8();
        let (width, height) = decoded.dimensions();
        Ok(Self::from_rgba8(name, width, height, decoded.into_raw()))
    }

    /// Decode in-memory encoded bytes (PNG, JPEG, …) into a single-level
    /// RGBA8 image.
    pub fn from_encoded_bytes(
        name: impl Into<String>,
        bytes: &[u8],
    ) -> Result<Self, image::ImageError> {
        let decoded = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = decoded.dimensions();
        Ok(Self::from_rgba8(name, width, height, decoded.into_raw()))
    }

    /// Image name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pixel format of the payload.
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// Full payload bytes, all mip levels concatenated.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mip level descriptors, ordered by level.
    pub fn mipmaps(&self) -> &[Mipmap] {
        &self.mipmaps
    }

    /// Extent of the base level.
    pub fn extent(&self) -> Extent3d {
        self.mipmaps
            .first()
            .map(|m| m.extent)
            .unwrap_or_default()
    }

    /// The GPU texture, once created.
    pub fn texture(&self) -> Option<&Arc<resources::Texture>> {
        self.texture.as_ref()
    }

    /// Regenerate the full mip chain from the level-0 RGBA8 payload.
    ///
    /// Levels are box-filtered halvings of the previous level, down to 1x1.
    /// Only valid for [`TextureFormat::Rgba8Unorm`] payloads.
    pub fn generate_mipmaps(&mut self) -> Result<(), GraphicsError> {
        if self.format != TextureFormat::Rgba8Unorm {
            return Err(GraphicsError::InvalidParameter(format!(
                "mipmap generation requires RGBA8, got {:?}",
                self.format
            )));
        }
        let base = self.extent();
        let level0_len = (base.pixel_count() * 4) as usize;
        let base_pixels = self.data.get(..level0_len).ok_or_else(|| {
            GraphicsError::InvalidParameter("image payload shorter than level 0".to_string())
        })?;
        let base_image =
            image::RgbaImage::from_raw(base.width, base.height, base_pixels.to_vec()).ok_or_else(
                || GraphicsError::InvalidParameter("image payload shorter than level 0".to_string()),
            )?;

        let levels = mip_level_count(base.width, base.height);
        let mut data = Vec::with_capacity(level0_len * 2);
        let mut mipmaps = Vec::with_capacity(levels as usize);

        for level in 0..levels {
            let extent = base.mip_level(level);
            let offset = data.len() as u32;
            if level == 0 {
                data.extend_from_slice(base_pixels);
            } else {
                let resized = image::imageops::resize(
                    &base_image,
                    extent.width,
                    extent.height,
                    image::imageops::FilterType::Triangle,
                );
                data.extend_from_slice(resized.as_raw());
            }
            mipmaps.push(Mipmap {
                level,
                offset,
                extent,
            });
        }

        self.data = data;
        self.mipmaps = mipmaps;
        Ok(())
    }

    /// Allocate the GPU texture backing this image.
    ///
    /// The texture is sized for the full mip chain described by
    /// [`mipmaps`](Self::mipmaps) and tagged as a sampled transfer
    /// destination. Pixel upload happens separately through the command
    /// recording.
    pub fn create_texture(
        &mut self,
        device: &GraphicsDevice,
    ) -> Result<Arc<resources::Texture>, GraphicsError> {
        let extent = self.extent();
        let descriptor = TextureDescriptor {
            label: Some(self.name.clone()),
            size: extent,
            mip_level_count: self.mipmaps.len().max(1) as u32,
            format: self.format,
            usage: TextureUsage::TRANSFER_DST | TextureUsage::SAMPLED,
        };
        let texture = device.create_texture(&descriptor)?;
        self.texture = Some(Arc::clone(&texture));
        Ok(texture)
    }
}

/// Number of mip levels for a full chain over the given dimensions.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}
