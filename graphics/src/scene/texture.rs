//! Texture entity: binds an image to a sampler.

use super::image::Image;
use super::registry::Handle;
use super::sampler::Sampler;

/// A scene texture, pairing a source [`Image`] with a [`Sampler`].
#[derive(Debug)]
pub struct Texture {
    /// Texture name from the source document, possibly empty.
    pub name: String,
    /// The image sampled by this texture.
    pub image: Handle<Image>,
    /// The sampler used to sample it.
    pub sampler: Handle<Sampler>,
}

impl Texture {
    /// Create a texture entity.
    pub fn new(name: impl Into<String>, image: Handle<Image>, sampler: Handle<Sampler>) -> Self {
        Self {
            name: name.into(),
            image,
            sampler,
        }
    }
}
