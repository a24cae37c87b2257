//! Image decode and upload pipeline.
//!
//! Runs in three steps: decode every document image in parallel on a worker
//! pool (each task writes its own pre-sized slot, one join barrier), replace
//! compressed images the device cannot sample with codec-decoded copies, and
//! finally upload all payloads in one batched command submission.
//!
//! The single submission trades peak transient memory (the sum of all image
//! payloads lives in staging buffers at once) for minimal synchronization
//! overhead, which dominates for a one-shot scene load.

use std::path::Path;

use auriga_core::pool::WorkerPool;

use crate::command::{BufferImageCopy, CommandBufferUsage, ImageMemoryBarrier, QueueFlags};
use crate::device::GraphicsDevice;
use crate::scene::{CompressedImageCodec, Image};
use crate::types::{BufferDescriptor, BufferUsage, TextureLayout};

use super::error::GltfError;
use super::loader::parse_data_uri;

pub(crate) struct ImagePipeline<'a> {
    device: &'a GraphicsDevice,
    codec: Option<&'a dyn CompressedImageCodec>,
}

impl<'a> ImagePipeline<'a> {
    pub fn new(device: &'a GraphicsDevice, codec: Option<&'a dyn CompressedImageCodec>) -> Self {
        Self { device, codec }
    }

    /// Decode, substitute, and upload every image of the document.
    ///
    /// Returned images are `Ready`: their GPU textures exist, hold all mip
    /// levels, and are in [`TextureLayout::ShaderReadOnly`].
    pub fn run(
        &self,
        document: &gltf_dep::Document,
        buffers: &[Vec<u8>],
        base_dir: &Path,
    ) -> Result<Vec<Image>, GltfError> {
        let mut images = self.decode_all(document, buffers, base_dir)?;
        self.substitute_unsupported(&mut images)?;
        self.upload_all(&mut images)?;
        Ok(images)
    }

    /// Parallel decode of all document images.
    ///
    /// One slot per image, pre-sized; workers get disjoint slot chunks so no
    /// locking is needed, and the pool scope is the join barrier.
    fn decode_all(
        &self,
        document: &gltf_dep::Document,
        buffers: &[Vec<u8>],
        base_dir: &Path,
    ) -> Result<Vec<Image>, GltfError> {
        let records: Vec<gltf_dep::Image<'_>> = document.images().collect();
        let mut slots: Vec<Option<Result<Image, GltfError>>> =
            (0..records.len()).map(|_| None).collect();

        let pool = WorkerPool::with_hardware_concurrency();
        let chunk = pool.chunk_size(records.len());
        pool.scope(|s| {
            for (slot_chunk, record_chunk) in slots.chunks_mut(chunk).zip(records.chunks(chunk)) {
                s.spawn(move || {
                    for (slot, record) in slot_chunk.iter_mut().zip(record_chunk) {
                        *slot = Some(decode_image(record, buffers, base_dir));
                    }
                });
            }
        });

        let mut images = Vec::with_capacity(slots.len());
        for (index, slot) in slots.into_iter().enumerate() {
            let image = slot.ok_or_else(|| {
                GltfError::ImageDecode(format!("decode task for image {index} never ran"))
            })??;
            log::info!("Loaded glTF image #{} ({})", index, image.name());
            images.push(image);
        }
        Ok(images)
    }

    /// Replace compressed images the device cannot sample.
    ///
    /// Runs synchronously after the decode barrier. The codec produces an
    /// uncompressed level-0 copy; the mip chain is regenerated from it.
    fn substitute_unsupported(&self, images: &mut [Image]) -> Result<(), GltfError> {
        for image in images.iter_mut() {
            let format = image.format();
            if !format.is_compressed() || self.device.capabilities().supports_format(format) {
                continue;
            }

            let codec = self
                .codec
                .filter(|c| c.supports(format))
                .ok_or_else(|| {
                    GltfError::ImageDecode(format!(
                        "device cannot sample {:?} and no codec decodes it ({})",
                        format,
                        image.name()
                    ))
                })?;

            log::warn!(
                "{:?} not supported by device: decoding {}",
                format,
                image.name()
            );
            let mut decoded = codec.decode(image)?;
            decoded.generate_mipmaps()?;
            *image = decoded;
        }
        Ok(())
    }

    /// Upload all image payloads in one batched submission.
    ///
    /// Per image: a transient staging buffer sized to the full payload, a
    /// layout transition to transfer-dst, one copy region per mip level, and
    /// a transition to shader-read-only. One submit, one blocking fence
    /// wait, then staging memory is released and the fence and command pools
    /// are reset.
    fn upload_all(&self, images: &mut [Image]) -> Result<(), GltfError> {
        let mut command_buffer = self.device.request_command_buffer();
        command_buffer.begin(CommandBufferUsage::OneTimeSubmit)?;

        let mut transient_buffers = Vec::with_capacity(images.len());

        for image in images.iter_mut() {
            let texture = image.create_texture(self.device)?;

            let staging = self.device.create_buffer(
                &BufferDescriptor::new(image.data().len() as u64, BufferUsage::TRANSFER_SRC)
                    .with_label(format!("{}_staging", image.name())),
            )?;
            staging.write(0, image.data())?;

            command_buffer.image_memory_barrier(
                &texture,
                ImageMemoryBarrier {
                    old_layout: TextureLayout::Undefined,
                    new_layout: TextureLayout::TransferDst,
                },
            )?;

            let regions = image
                .mipmaps()
                .iter()
                .map(|mipmap| BufferImageCopy {
                    buffer_offset: u64::from(mipmap.offset),
                    mip_level: mipmap.level,
                    extent: mipmap.extent,
                })
                .collect();
            command_buffer.copy_buffer_to_image(&staging, &texture, regions)?;

            command_buffer.image_memory_barrier(
                &texture,
                ImageMemoryBarrier {
                    old_layout: TextureLayout::TransferDst,
                    new_layout: TextureLayout::ShaderReadOnly,
                },
            )?;

            transient_buffers.push(staging);
        }

        command_buffer.end()?;

        let queue = self.device.queue_by_flags(QueueFlags::GRAPHICS)?;
        let fence = self.device.fence_pool().request_fence();
        queue.submit(&command_buffer, &fence)?;

        self.device.fence_pool().wait();
        self.device.fence_pool().reset();
        self.device.command_pool().reset();

        transient_buffers.clear();

        Ok(())
    }
}

/// Decode one document image record.
///
/// Embedded images (buffer view or base64 data URI) decode from memory;
/// everything else is a side file resolved against the document's base
/// directory.
fn decode_image(
    record: &gltf_dep::Image<'_>,
    buffers: &[Vec<u8>],
    base_dir: &Path,
) -> Result<Image, GltfError> {
    let name = record
        .name()
        .map(String::from)
        .unwrap_or_else(|| format!("image_{}", record.index()));

    match record.source() {
        gltf_dep::image::Source::View { view, .. } => {
            let buffer_index = view.buffer().index();
            let buffer = buffers.get(buffer_index).ok_or(GltfError::Lookup {
                what: "buffer",
                index: buffer_index,
            })?;
            let start = view.offset();
            let end = start + view.length();
            let bytes = buffer.get(start..end).ok_or_else(|| {
                GltfError::Buffer(format!(
                    "image view spans {start}..{end} but buffer {buffer_index} has {} bytes",
                    buffer.len()
                ))
            })?;
            Image::from_encoded_bytes(name, bytes)
                .map_err(|e| GltfError::ImageDecode(e.to_string()))
        }
        gltf_dep::image::Source::Uri { uri, .. } => {
            if let Some(bytes) = parse_data_uri(uri) {
                Image::from_encoded_bytes(name, &bytes)
                    .map_err(|e| GltfError::ImageDecode(e.to_string()))
            } else {
                let path = base_dir.join(uri);
                Image::load(name, &path).map_err(|e| GltfError::ImageDecode(e.to_string()))
            }
        }
    }
}
