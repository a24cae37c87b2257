//! PBR material entity.

use std::collections::HashMap;

use super::registry::Handle;
use super::texture::Texture;

/// Alpha rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaMode {
    /// Fully opaque (alpha ignored).
    #[default]
    Opaque,
    /// Alpha masking with cutoff threshold.
    Mask,
    /// Full alpha blending.
    Blend,
}

/// A PBR metallic-roughness material.
///
/// Scalar and vector factors are typed fields; texture bindings live in a
/// slot-name → texture map. Slot names are snake_case; recognized source
/// keys come from a fixed table, and vendor extension keys containing
/// `Texture` are admitted under their normalized names.
#[derive(Debug)]
pub struct PbrMaterial {
    /// Material name from the source document, possibly empty.
    pub name: String,
    /// Base color factor (linear RGBA).
    pub base_color_factor: [f32; 4],
    /// Metallic factor.
    pub metallic_factor: f32,
    /// Roughness factor.
    pub roughness_factor: f32,
    /// Emissive factor (linear RGB).
    pub emissive: [f32; 3],
    /// Alpha rendering mode.
    pub alpha_mode: AlphaMode,
    /// Alpha cutoff threshold (meaningful for [`AlphaMode::Mask`]).
    pub alpha_cutoff: f32,
    /// Whether the material is double-sided.
    pub double_sided: bool,
    /// Texture slot name → texture.
    pub textures: HashMap<String, Handle<Texture>>,
}

impl PbrMaterial {
    /// Creates a material with glTF default factors.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_color_factor: [1.0, 1.0, 1.0, 1.0],
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            emissive: [0.0, 0.0, 0.0],
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            double_sided: false,
            textures: HashMap::new(),
        }
    }
}

impl Default for PbrMaterial {
    fn default() -> Self {
        Self::new(String::new())
    }
}
