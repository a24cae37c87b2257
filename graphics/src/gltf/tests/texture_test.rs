//! Texture, sampler, material, and image upload tests.

use std::path::Path;
use std::sync::Arc;

use auriga_core::sampler::{AddressMode, FilterMode};

use super::{build_glb, encode_png, load, test_device};
use crate::gltf::GltfLoader;
use crate::scene::{Image, PbrMaterial, Sampler, Scene, Texture};
use crate::types::TextureLayout;

/// A document with one embedded 2x2 PNG, one explicit sampler, and three
/// textures: one bound to the sampler, two without a sampler reference.
fn textured_glb() -> Vec<u8> {
    let png = encode_png(2, 2, [255, 0, 0, 255]);
    let png_len = png.len();

    let json = format!(
        r#"{{
        "asset": {{"version": "2.0"}},
        "buffers": [{{"byteLength": {png_len}}}],
        "bufferViews": [{{"buffer": 0, "byteOffset": 0, "byteLength": {png_len}}}],
        "images": [{{"name": "albedo", "bufferView": 0, "mimeType": "image/png"}}],
        "samplers": [{{"magFilter": 9728, "minFilter": 9987, "wrapS": 33071, "wrapT": 10497}}],
        "textures": [
            {{"name": "with_sampler", "source": 0, "sampler": 0}},
            {{"name": "no_sampler_a", "source": 0}},
            {{"name": "no_sampler_b", "source": 0}}
        ],
        "materials": [
            {{"name": "painted",
              "pbrMetallicRoughness": {{
                  "baseColorFactor": [0.5, 0.5, 0.5, 1.0],
                  "baseColorTexture": {{"index": 0}},
                  "metallicFactor": 0.25,
                  "roughnessFactor": 0.75
              }},
              "emissiveFactor": [0.1, 0.2, 0.3],
              "alphaMode": "MASK",
              "alphaCutoff": 0.4,
              "doubleSided": true,
              "extras": {{"glossinessTexture": {{"index": 1}}, "note": "vendor"}}
            }}
        ]
    }}"#
    );

    build_glb(&json, &png)
}

#[test]
fn images_are_uploaded_and_shader_readable() {
    let device = test_device();
    let scene = load(&device, &textured_glb());

    let images = scene.components::<Image>();
    assert_eq!(images.len(), 1);
    let image = &images[0];
    assert_eq!(image.name(), "albedo");

    let texture = image.texture().expect("GPU texture created");
    assert_eq!(texture.layout(), TextureLayout::ShaderReadOnly);

    // 2x2 solid red RGBA8 payload landed in texture storage.
    let expected: Vec<u8> = [255u8, 0, 0, 255].repeat(4);
    assert_eq!(image.data(), &expected[..]);
    assert_eq!(texture.read(), expected);
}

#[test]
fn transient_upload_state_is_released() {
    let device = test_device();
    let scene = load(&device, &textured_glb());

    // No mesh buffers in this document, so every buffer was staging and
    // every staging buffer is gone.
    assert_eq!(device.buffer_count(), 0);
    assert_eq!(device.fence_pool().outstanding_count(), 0);
    assert_eq!(device.command_pool().allocated_count(), 0);

    // The uploaded texture is still alive through the scene.
    assert_eq!(device.texture_count(), 1);
    drop(scene);
    assert_eq!(device.texture_count(), 0);
}

#[test]
fn sampler_enums_map_onto_device_descriptor() {
    let device = test_device();
    let scene = load(&device, &textured_glb());

    let samplers = scene.components::<Sampler>();
    // Document sampler plus the shared default.
    assert_eq!(samplers.len(), 2);

    let descriptor = samplers[0].gpu.descriptor();
    assert_eq!(descriptor.mag_filter, FilterMode::Nearest);
    // 9987 = LINEAR_MIPMAP_LINEAR
    assert_eq!(descriptor.min_filter, FilterMode::Linear);
    assert_eq!(descriptor.mipmap_filter, FilterMode::Linear);
    assert_eq!(descriptor.address_mode_u, AddressMode::ClampToEdge);
    assert_eq!(descriptor.address_mode_v, AddressMode::Repeat);

    let default = &samplers[1];
    assert_eq!(default.name, "default_sampler");
    assert_eq!(default.gpu.descriptor().min_filter, FilterMode::Linear);
    assert_eq!(default.gpu.descriptor().address_mode_u, AddressMode::Repeat);
}

#[test]
fn absent_sampler_resolves_to_the_shared_default() {
    let device = test_device();
    let scene = load(&device, &textured_glb());

    let textures = scene.components::<Texture>();
    assert_eq!(textures.len(), 3);

    assert_eq!(textures[0].sampler.index(), 0);

    // Both sampler-less textures share the single default instance.
    let default_handle = textures[1].sampler;
    assert_eq!(textures[2].sampler, default_handle);
    assert_eq!(
        scene.component(default_handle).unwrap().name,
        "default_sampler"
    );

    // All three sample the same image.
    for texture in textures {
        assert_eq!(texture.image.index(), 0);
    }
}

#[test]
fn material_factors_and_texture_slots() {
    let device = test_device();
    let scene = load(&device, &textured_glb());

    let materials = scene.components::<PbrMaterial>();
    // Document material plus the shared default.
    assert_eq!(materials.len(), 2);

    let material = &materials[0];
    assert_eq!(material.name, "painted");
    assert_eq!(material.base_color_factor, [0.5, 0.5, 0.5, 1.0]);
    assert_eq!(material.metallic_factor, 0.25);
    assert_eq!(material.roughness_factor, 0.75);
    assert_eq!(material.emissive, [0.1, 0.2, 0.3]);
    assert_eq!(material.alpha_cutoff, 0.4);
    assert!(material.double_sided);
    assert!(matches!(
        material.alpha_mode,
        crate::scene::AlphaMode::Mask
    ));

    // Recognized slot from the typed accessor.
    assert_eq!(material.textures["base_color_texture"].index(), 0);
    // Vendor extras key containing "Texture", under its normalized name.
    assert_eq!(material.textures["glossiness_texture"].index(), 1);
    // Non-texture extras keys are ignored.
    assert_eq!(material.textures.len(), 2);
}

#[test]
fn side_file_image_resolves_against_base_dir() {
    let dir = std::env::temp_dir().join(format!("auriga_gltf_test_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("side.png"), encode_png(1, 1, [0, 255, 0, 255])).unwrap();

    let json = r#"{
        "asset": {"version": "2.0"},
        "images": [{"uri": "side.png"}],
        "textures": [{"source": 0}]
    }"#;
    let gltf_path = dir.join("scene.gltf");
    std::fs::write(&gltf_path, json).unwrap();

    let device = test_device();
    let loader = GltfLoader::new(Arc::clone(&device));
    let mut scene = Scene::new();
    loader
        .read_scene_from_file(&gltf_path, &mut scene)
        .expect("side-file load");

    let image = &scene.components::<Image>()[0];
    assert_eq!(image.data(), &[0, 255, 0, 255]);
    assert_eq!(
        image.texture().unwrap().layout(),
        TextureLayout::ShaderReadOnly
    );

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_side_file_fails_the_load() {
    let json = r#"{
        "asset": {"version": "2.0"},
        "images": [{"uri": "nowhere/missing.png"}]
    }"#;
    let device = test_device();
    let loader = GltfLoader::new(device);
    let mut scene = Scene::new();
    let result = loader.read_scene_from_slice(json.as_bytes(), Path::new("/definitely/absent"), &mut scene);
    assert!(result.is_err());
}
