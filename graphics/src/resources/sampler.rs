//! GPU sampler resource.

use crate::types::SamplerDescriptor;

/// A GPU sampler resource.
///
/// Samplers are created by [`GraphicsDevice::create_sampler`] and are
/// immutable once created.
///
/// [`GraphicsDevice::create_sampler`]: crate::device::GraphicsDevice::create_sampler
pub struct Sampler {
    descriptor: SamplerDescriptor,
}

impl Sampler {
    pub(crate) fn new(descriptor: SamplerDescriptor) -> Self {
        Self { descriptor }
    }

    /// Get the sampler descriptor.
    pub fn descriptor(&self) -> &SamplerDescriptor {
        &self.descriptor
    }

    /// Get the sampler label, if set.
    pub fn label(&self) -> Option<&str> {
        self.descriptor.label.as_deref()
    }
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler")
            .field("mag_filter", &self.descriptor.mag_filter)
            .field("min_filter", &self.descriptor.min_filter)
            .field("label", &self.descriptor.label)
            .finish()
    }
}

static_assertions::assert_impl_all!(Sampler: Send, Sync);
