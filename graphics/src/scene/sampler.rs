//! Sampler entity.

use std::sync::Arc;

use crate::resources;

/// A scene sampler: a name plus the device sampler it wraps.
#[derive(Debug)]
pub struct Sampler {
    /// Sampler name from the source document, possibly empty.
    pub name: String,
    /// The device sampler.
    pub gpu: Arc<resources::Sampler>,
}

impl Sampler {
    /// Create a sampler entity.
    pub fn new(name: impl Into<String>, gpu: Arc<resources::Sampler>) -> Self {
        Self {
            name: name.into(),
            gpu,
        }
    }
}
