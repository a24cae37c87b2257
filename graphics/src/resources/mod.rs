//! GPU resources created by the device.

mod buffer;
mod sampler;
mod texture;

pub use buffer::Buffer;
pub use sampler::Sampler;
pub use texture::Texture;
