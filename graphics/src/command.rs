//! Command recording and submission.
//!
//! A [`CommandBuffer`] records barrier and copy commands; a [`Queue`]
//! executes them at submission time against the software device's host
//! backing, validating the layout-transition protocol as it goes. A
//! [`Fence`] is signaled when the submission completes, and the
//! [`FencePool`] / [`CommandPool`] pair gives load-time code a place to
//! wait on and then reset all transient submission state.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bitflags::bitflags;
use parking_lot::{Condvar, Mutex};

use crate::error::GraphicsError;
use crate::resources::{Buffer, Texture};
use crate::types::{Extent3d, TextureLayout};

bitflags! {
    /// Capability flags used to select a queue.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct QueueFlags: u32 {
        /// Queue supports graphics operations.
        const GRAPHICS = 1 << 0;
        /// Queue supports compute operations.
        const COMPUTE = 1 << 1;
        /// Queue supports transfer operations.
        const TRANSFER = 1 << 2;
    }
}

/// How a command buffer will be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandBufferUsage {
    /// Recorded once, submitted once, then reset.
    OneTimeSubmit,
}

/// An image layout transition scoped to a whole texture.
#[derive(Debug, Clone, Copy)]
pub struct ImageMemoryBarrier {
    /// Layout the texture is expected to be in.
    pub old_layout: TextureLayout,
    /// Layout the texture transitions to.
    pub new_layout: TextureLayout,
}

/// One buffer-to-image copy region.
#[derive(Debug, Clone, Copy)]
pub struct BufferImageCopy {
    /// Byte offset into the source buffer.
    pub buffer_offset: u64,
    /// Destination mip level.
    pub mip_level: u32,
    /// Extent of the destination mip level.
    pub extent: Extent3d,
}

enum Command {
    ImageBarrier {
        texture: Arc<Texture>,
        barrier: ImageMemoryBarrier,
    },
    CopyBufferToImage {
        src: Arc<Buffer>,
        dst: Arc<Texture>,
        regions: Vec<BufferImageCopy>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordingState {
    Initial,
    Recording,
    Executable,
}

/// A command buffer recording barriers and copies.
///
/// Commands are validated and executed when the buffer is submitted to a
/// [`Queue`]; recording itself never fails.
pub struct CommandBuffer {
    state: RecordingState,
    commands: Vec<Command>,
}

impl CommandBuffer {
    pub(crate) fn new() -> Self {
        Self {
            state: RecordingState::Initial,
            commands: Vec::new(),
        }
    }

    /// Begin recording.
    pub fn begin(&mut self, _usage: CommandBufferUsage) -> Result<(), GraphicsError> {
        if self.state != RecordingState::Initial {
            return Err(GraphicsError::InvalidCommand(
                "begin on a command buffer that is not in the initial state".to_string(),
            ));
        }
        self.state = RecordingState::Recording;
        Ok(())
    }

    /// End recording; the buffer becomes submittable.
    pub fn end(&mut self) -> Result<(), GraphicsError> {
        if self.state != RecordingState::Recording {
            return Err(GraphicsError::InvalidCommand(
                "end on a command buffer that is not recording".to_string(),
            ));
        }
        self.state = RecordingState::Executable;
        Ok(())
    }

    /// Record a layout transition covering the whole texture.
    pub fn image_memory_barrier(
        &mut self,
        texture: &Arc<Texture>,
        barrier: ImageMemoryBarrier,
    ) -> Result<(), GraphicsError> {
        self.require_recording()?;
        self.commands.push(Command::ImageBarrier {
            texture: Arc::clone(texture),
            barrier,
        });
        Ok(())
    }

    /// Record a buffer-to-image copy, one region per mip level.
    pub fn copy_buffer_to_image(
        &mut self,
        src: &Arc<Buffer>,
        dst: &Arc<Texture>,
        regions: Vec<BufferImageCopy>,
    ) -> Result<(), GraphicsError> {
        self.require_recording()?;
        self.commands.push(Command::CopyBufferToImage {
            src: Arc::clone(src),
            dst: Arc::clone(dst),
            regions,
        });
        Ok(())
    }

    /// Number of recorded commands.
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    fn require_recording(&self) -> Result<(), GraphicsError> {
        if self.state != RecordingState::Recording {
            return Err(GraphicsError::InvalidCommand(
                "command recorded outside begin/end".to_string(),
            ));
        }
        Ok(())
    }
}

/// A device queue that executes submitted command buffers.
pub struct Queue {
    flags: QueueFlags,
}

impl Queue {
    pub(crate) fn new(flags: QueueFlags) -> Self {
        Self { flags }
    }

    /// Capability flags of this queue.
    pub fn flags(&self) -> QueueFlags {
        self.flags
    }

    /// Submit a command buffer, signaling `fence` on completion.
    ///
    /// The software device executes the recording synchronously: barriers
    /// transition texture layouts (verifying the expected old layout) and
    /// copies move bytes from host-visible buffers into texture storage.
    /// Copies into a texture that is not in
    /// [`TextureLayout::TransferDst`] fail the submission.
    pub fn submit(&self, command_buffer: &CommandBuffer, fence: &Fence) -> Result<(), GraphicsError> {
        if command_buffer.state != RecordingState::Executable {
            return Err(GraphicsError::InvalidCommand(
                "submit of a command buffer that was not ended".to_string(),
            ));
        }

        for command in &command_buffer.commands {
            match command {
                Command::ImageBarrier { texture, barrier } => {
                    texture.transition(barrier.old_layout, barrier.new_layout)?;
                }
                Command::CopyBufferToImage { src, dst, regions } => {
                    if dst.layout() != TextureLayout::TransferDst {
                        return Err(GraphicsError::InvalidCommand(format!(
                            "copy into texture {:?} in layout {:?}",
                            dst.label(),
                            dst.layout()
                        )));
                    }
                    execute_copy(src, dst, regions)?;
                }
            }
        }

        fence.signal();
        Ok(())
    }
}

fn execute_copy(
    src: &Arc<Buffer>,
    dst: &Arc<Texture>,
    regions: &[BufferImageCopy],
) -> Result<(), GraphicsError> {
    let format = dst.format();
    for region in regions {
        if region.mip_level >= dst.mip_level_count() {
            return Err(GraphicsError::InvalidCommand(format!(
                "copy region targets mip {} of a texture with {} mips",
                region.mip_level,
                dst.mip_level_count()
            )));
        }
        // Byte offset of the target mip within the texture's storage.
        let mut dst_offset = 0u64;
        for level in 0..region.mip_level {
            dst_offset += format.bytes_for_extent(dst.size().mip_level(level));
        }
        let len = format.bytes_for_extent(region.extent) as usize;
        let bytes = src.read_range(region.buffer_offset, len)?;
        dst.write_bytes(dst_offset, &bytes)?;
    }
    Ok(())
}

/// A fence signaled when a submission completes.
pub struct Fence {
    signaled: Mutex<bool>,
    condvar: Condvar,
}

impl Fence {
    fn new() -> Self {
        Self {
            signaled: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    fn signal(&self) {
        let mut signaled = self.signaled.lock();
        *signaled = true;
        self.condvar.notify_all();
    }

    /// Block until the fence is signaled. Unbounded wait.
    pub fn wait(&self) {
        let mut signaled = self.signaled.lock();
        while !*signaled {
            self.condvar.wait(&mut signaled);
        }
    }

    /// Whether the fence has been signaled.
    pub fn is_signaled(&self) -> bool {
        *self.signaled.lock()
    }

    fn reset(&self) {
        *self.signaled.lock() = false;
    }
}

/// Pool of fences handed out for submissions.
///
/// [`wait`](Self::wait) blocks on every outstanding fence;
/// [`reset`](Self::reset) un-signals them and returns them to the pool.
pub struct FencePool {
    outstanding: Mutex<Vec<Arc<Fence>>>,
}

impl FencePool {
    pub(crate) fn new() -> Self {
        Self {
            outstanding: Mutex::new(Vec::new()),
        }
    }

    /// Request a fence for a submission.
    pub fn request_fence(&self) -> Arc<Fence> {
        let fence = Arc::new(Fence::new());
        self.outstanding.lock().push(Arc::clone(&fence));
        fence
    }

    /// Block until every outstanding fence is signaled.
    pub fn wait(&self) {
        let fences: Vec<Arc<Fence>> = self.outstanding.lock().clone();
        for fence in fences {
            fence.wait();
        }
    }

    /// Reset all outstanding fences and return them to the pool.
    pub fn reset(&self) {
        let mut outstanding = self.outstanding.lock();
        for fence in outstanding.iter() {
            fence.reset();
        }
        outstanding.clear();
    }

    /// Number of fences currently handed out.
    pub fn outstanding_count(&self) -> usize {
        self.outstanding.lock().len()
    }
}

/// Pool command buffers are allocated from.
pub struct CommandPool {
    allocated: AtomicUsize,
}

impl CommandPool {
    pub(crate) fn new() -> Self {
        Self {
            allocated: AtomicUsize::new(0),
        }
    }

    pub(crate) fn allocate(&self) -> CommandBuffer {
        self.allocated.fetch_add(1, Ordering::Relaxed);
        CommandBuffer::new()
    }

    /// Number of command buffers allocated since the last reset.
    pub fn allocated_count(&self) -> usize {
        self.allocated.load(Ordering::Relaxed)
    }

    /// Reset the pool, invalidating all previously allocated recordings.
    pub fn reset(&self) {
        self.allocated.store(0, Ordering::Relaxed);
    }
}
