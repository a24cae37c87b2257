//! Integration-style tests for the glTF import pipeline.
//!
//! Documents are synthesized in-test: structure-only tests feed plain JSON,
//! geometry and image tests build a binary glTF container around a
//! hand-assembled BIN chunk.

use std::path::Path;
use std::sync::Arc;

use crate::device::GraphicsDevice;
use crate::gltf::GltfLoader;
use crate::instance::GraphicsInstance;
use crate::scene::Scene;

mod assemble_test;
mod texture_test;

/// Create a software device for tests.
fn test_device() -> Arc<GraphicsDevice> {
    let instance = GraphicsInstance::new().unwrap();
    instance.create_device().unwrap()
}

/// Load a scene from document bytes, panicking on failure.
fn load(device: &Arc<GraphicsDevice>, data: &[u8]) -> Scene {
    let loader = GltfLoader::new(Arc::clone(device));
    let mut scene = Scene::new();
    loader
        .read_scene_from_slice(data, Path::new(""), &mut scene)
        .expect("failed to load test document");
    scene
}

/// Assemble a binary glTF (`.glb`) container from a JSON chunk and a BIN
/// chunk.
fn build_glb(json: &str, bin: &[u8]) -> Vec<u8> {
    let mut json_chunk = json.as_bytes().to_vec();
    while json_chunk.len() % 4 != 0 {
        json_chunk.push(b' ');
    }
    let mut bin_chunk = bin.to_vec();
    while bin_chunk.len() % 4 != 0 {
        bin_chunk.push(0);
    }

    let total = 12 + 8 + json_chunk.len() + 8 + bin_chunk.len();

    let mut glb = Vec::with_capacity(total);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total as u32).to_le_bytes());

    glb.extend_from_slice(&(json_chunk.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"JSON");
    glb.extend_from_slice(&json_chunk);

    glb.extend_from_slice(&(bin_chunk.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"BIN\0");
    glb.extend_from_slice(&bin_chunk);

    glb
}

/// Encode a solid-color RGBA PNG in memory.
fn encode_png(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(pixel));
    let mut bytes = std::io::Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png)
        .expect("PNG encoding failed");
    bytes.into_inner()
}
