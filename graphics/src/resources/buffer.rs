//! GPU buffer resource.

use parking_lot::Mutex;

use crate::error::GraphicsError;
use crate::types::BufferDescriptor;

/// A GPU buffer resource.
///
/// Buffers are created by [`GraphicsDevice::create_buffer`] and are
/// reference-counted via `Arc`. The software device backs every buffer with
/// host memory, so contents written with [`write`](Self::write) can be read
/// back in tests and copied by transfer commands at submission time.
///
/// [`GraphicsDevice::create_buffer`]: crate::device::GraphicsDevice::create_buffer
pub struct Buffer {
    descriptor: BufferDescriptor,
    data: Mutex<Vec<u8>>,
}

impl Buffer {
    pub(crate) fn new(descriptor: BufferDescriptor) -> Self {
        let size = descriptor.size as usize;
        Self {
            descriptor,
            data: Mutex::new(vec![0u8; size]),
        }
    }

    /// Get the buffer descriptor.
    pub fn descriptor(&self) -> &BufferDescriptor {
        &self.descriptor
    }

    /// Get the buffer size in bytes.
    pub fn size(&self) -> u64 {
        self.descriptor.size
    }

    /// Get the buffer label, if set.
    pub fn label(&self) -> Option<&str> {
        self.descriptor.label.as_deref()
    }

    /// Write bytes into the buffer at the given offset.
    ///
    /// # Errors
    ///
    /// Returns an error if the write would run past the end of the buffer.
    pub fn write(&self, offset: u64, bytes: &[u8]) -> Result<(), GraphicsError> {
        let end = offset as usize + bytes.len();
        let mut data = self.data.lock();
        if end > data.len() {
            return Err(GraphicsError::InvalidParameter(format!(
                "write of {} bytes at offset {} exceeds buffer size {}",
                bytes.len(),
                offset,
                data.len()
            )));
        }
        data[offset as usize..end].copy_from_slice(bytes);
        Ok(())
    }

    /// Read the full buffer contents.
    pub fn read(&self) -> Vec<u8> {
        self.data.lock().clone()
    }

    /// Read a byte range from the buffer.
    pub(crate) fn read_range(&self, offset: u64, len: usize) -> Result<Vec<u8>, GraphicsError> {
        let data = self.data.lock();
        let start = offset as usize;
        let end = start + len;
        if end > data.len() {
            return Err(GraphicsError::InvalidCommand(format!(
                "read of {len} bytes at offset {offset} exceeds buffer size {}",
                data.len()
            )));
        }
        Ok(data[start..end].to_vec())
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("size", &self.descriptor.size)
            .field("usage", &self.descriptor.usage)
            .field("label", &self.descriptor.label)
            .finish()
    }
}

static_assertions::assert_impl_all!(Buffer: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BufferUsage;

    #[test]
    fn write_and_read_back() {
        let buffer = Buffer::new(BufferDescriptor::new(8, BufferUsage::VERTEX));
        buffer.write(2, &[1, 2, 3]).unwrap();
        assert_eq!(buffer.read(), vec![0, 0, 1, 2, 3, 0, 0, 0]);
    }

    #[test]
    fn write_past_end_fails() {
        let buffer = Buffer::new(BufferDescriptor::new(4, BufferUsage::TRANSFER_SRC));
        assert!(buffer.write(2, &[0; 4]).is_err());
    }

    #[test]
    fn debug_contains_size() {
        let buffer = Buffer::new(BufferDescriptor::new(1024, BufferUsage::INDEX));
        let debug = format!("{:?}", buffer);
        assert!(debug.contains("1024"));
    }
}
