//! Typed descriptors and enums shared across the graphics system.

mod buffer;
mod common;
mod sampler;
mod texture;
mod vertex;

pub use buffer::{BufferDescriptor, BufferUsage};
pub use common::Extent3d;
pub use sampler::SamplerDescriptor;
pub use texture::{TextureDescriptor, TextureFormat, TextureLayout, TextureUsage};
pub use vertex::{IndexFormat, VertexFormat};

// Re-export CPU-side sampler enums from core.
pub use auriga_core::sampler::{AddressMode, CompareFunction, FilterMode};
