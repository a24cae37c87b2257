//! Scene assembly from a parsed glTF document.
//!
//! The [`LoadContext`] owns everything one load call needs: the parsed
//! document, resolved buffer payloads, the base directory for side files,
//! and the device resources are created against. Nothing survives past the
//! call.
//!
//! Assembly runs in dependency order — samplers, images, textures,
//! materials, meshes, cameras, nodes, scene trees — so that every entity an
//! index refers to already sits at that index in its registry vector.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Instant;

use auriga_core::math::{quat_from_array, Mat4, Vec3};

use crate::device::GraphicsDevice;
use crate::scene::{
    AlphaMode, Camera, CompressedImageCodec, Handle, Image, Mesh, Node, NodeHandle,
    PbrMaterial, PerspectiveCamera, Sampler, Scene, SubMesh, Texture, VertexAttribute,
};
use crate::types::{BufferDescriptor, BufferUsage, IndexFormat, SamplerDescriptor, VertexFormat};

use super::error::GltfError;
use super::format;
use super::images::ImagePipeline;

/// Recognized material texture keys and their snake_case slot names.
///
/// Any other key containing `Texture` in a material's extras is admitted
/// under the snake_case form of the key, since producers may emit vendor
/// extension texture slots outside this set.
const TEXTURE_SLOT_TABLE: &[(&str, &str)] = &[
    ("baseColorTexture", "base_color_texture"),
    ("metallicRoughnessTexture", "metallic_roughness_texture"),
    ("normalTexture", "normal_texture"),
    ("occlusionTexture", "occlusion_texture"),
    ("emissiveTexture", "emissive_texture"),
];

/// State for one load call.
pub(crate) struct LoadContext<'a> {
    device: &'a GraphicsDevice,
    codec: Option<&'a dyn CompressedImageCodec>,
    document: gltf_dep::Document,
    buffers: Vec<Vec<u8>>,
    base_dir: PathBuf,
}

impl<'a> LoadContext<'a> {
    pub fn new(
        device: &'a GraphicsDevice,
        codec: Option<&'a dyn CompressedImageCodec>,
        document: gltf_dep::Document,
        buffers: Vec<Vec<u8>>,
        base_dir: &Path,
    ) -> Self {
        Self {
            device,
            codec,
            document,
            buffers,
            base_dir: base_dir.to_path_buf(),
        }
    }

    /// Assemble the full scene.
    pub fn load_scene(&self) -> Result<Scene, GltfError> {
        let mut scene = Scene::new();
        scene.set_name("gltf_scene");

        // Samplers, in document order.
        let mut samplers = Vec::new();
        for gltf_sampler in self.document.samplers() {
            samplers.push(self.parse_sampler(&gltf_sampler)?);
        }
        scene.set_components(samplers);

        // Images: parallel decode, then one batched GPU upload.
        let timer = Instant::now();
        let pipeline = ImagePipeline::new(self.device, self.codec);
        let images = pipeline.run(&self.document, &self.buffers, &self.base_dir)?;
        scene.set_components(images);
        log::info!(
            "Time spent loading images: {:.3} seconds",
            timer.elapsed().as_secs_f64()
        );

        self.load_textures(&mut scene)?;
        let default_material = self.load_materials(&mut scene)?;
        self.load_meshes(&mut scene, default_material)?;
        let camera_map = self.load_cameras(&mut scene);
        let node_handles = self.load_nodes(&mut scene, &camera_map)?;
        self.load_scene_trees(&mut scene, &node_handles)?;
        self.attach_default_camera(&mut scene);

        Ok(scene)
    }

    /// Textures bind an image to a sampler; a missing or out-of-range
    /// sampler index degrades to the shared default sampler.
    fn load_textures(&self, scene: &mut Scene) -> Result<(), GltfError> {
        let sampler_count = scene.components::<Sampler>().len();
        let image_count = scene.components::<Image>().len();
        let default_sampler = scene.add_component(self.create_default_sampler()?);

        for gltf_texture in self.document.textures() {
            let name = gltf_texture.name().unwrap_or("").to_string();

            let image_index = gltf_texture.source().index();
            if image_index >= image_count {
                return Err(GltfError::Lookup {
                    what: "image",
                    index: image_index,
                });
            }

            let sampler = match gltf_texture.sampler().index() {
                Some(index) if index < sampler_count => Handle::new(index),
                Some(index) => {
                    log::warn!(
                        "Sampler {index} not found for texture {name:?}, possible glTF error"
                    );
                    default_sampler
                }
                None => default_sampler,
            };

            scene.add_component(Texture::new(name, Handle::new(image_index), sampler));
        }
        Ok(())
    }

    /// Materials, followed by the shared default material.
    fn load_materials(&self, scene: &mut Scene) -> Result<Handle<PbrMaterial>, GltfError> {
        let texture_count = scene.components::<Texture>().len();

        for gltf_material in self.document.materials() {
            // `materials()` skips the implicit default material, so every
            // yielded record carries a document index.
            let material = self.parse_material(&gltf_material, texture_count)?;
            scene.add_component(material);
        }

        Ok(scene.add_component(PbrMaterial::new("default_material")))
    }

    /// Meshes and their submeshes. A primitive without a material reference
    /// draws with the shared default material.
    fn load_meshes(
        &self,
        scene: &mut Scene,
        default_material: Handle<PbrMaterial>,
    ) -> Result<(), GltfError> {
        // The default material occupies the slot after all document
        // materials.
        let material_count = default_material.index();

        for gltf_mesh in self.document.meshes() {
            let mut mesh = Mesh::new(gltf_mesh.name().unwrap_or(""));

            for gltf_primitive in gltf_mesh.primitives() {
                let mut submesh = self.parse_primitive(&gltf_primitive)?;

                submesh.material = Some(match gltf_primitive.material().index() {
                    Some(index) if index < material_count => Handle::new(index),
                    Some(index) => {
                        return Err(GltfError::Lookup {
                            what: "material",
                            index,
                        })
                    }
                    None => default_material,
                });

                let handle = scene.add_component(submesh);
                mesh.add_submesh(handle);
            }

            scene.add_component(mesh);
        }
        Ok(())
    }

    /// Cameras. Only perspective cameras produce entities; other kinds are
    /// skipped, leaving a hole in the document-index map.
    fn load_cameras(&self, scene: &mut Scene) -> Vec<Option<Handle<Camera>>> {
        let mut camera_map = Vec::new();
        for gltf_camera in self.document.cameras() {
            match self.parse_camera(&gltf_camera) {
                Some(camera) => camera_map.push(Some(scene.add_component(camera))),
                None => camera_map.push(None),
            }
        }
        camera_map
    }

    /// Nodes, with bidirectional mesh and camera attachments.
    fn load_nodes(
        &self,
        scene: &mut Scene,
        camera_map: &[Option<Handle<Camera>>],
    ) -> Result<Vec<NodeHandle>, GltfError> {
        let mesh_count = scene.components::<Mesh>().len();
        let mut node_handles = Vec::new();

        for gltf_node in self.document.nodes() {
            let mut node = parse_node(&gltf_node);

            let mesh = match gltf_node.mesh() {
                Some(gltf_mesh) => {
                    let index = gltf_mesh.index();
                    if index >= mesh_count {
                        return Err(GltfError::Lookup {
                            what: "mesh",
                            index,
                        });
                    }
                    Some(Handle::<Mesh>::new(index))
                }
                None => None,
            };

            let camera = match gltf_node.camera() {
                Some(gltf_camera) => {
                    let index = gltf_camera.index();
                    *camera_map.get(index).ok_or(GltfError::Lookup {
                        what: "camera",
                        index,
                    })?
                    // None entries are unsupported camera kinds; the node
                    // simply gets no camera attachment.
                }
                None => None,
            };

            node.mesh = mesh;
            node.camera = camera;
            let handle = scene.add_node(node);

            if let Some(mesh_handle) = mesh {
                if let Some(mesh) = scene.component_mut(mesh_handle) {
                    mesh.add_node(handle);
                }
            }
            if let Some(camera_handle) = camera {
                if let Some(camera) = scene.component_mut(camera_handle) {
                    camera.set_node(handle);
                }
            }

            node_handles.push(handle);
        }
        Ok(node_handles)
    }

    /// Attach every document scene under one synthetic root each.
    ///
    /// Breadth-first: the queue pairs a parent handle with a document node
    /// index; linking a node enqueues its document children paired with the
    /// node itself, preserving the hierarchy.
    fn load_scene_trees(
        &self,
        scene: &mut Scene,
        node_handles: &[NodeHandle],
    ) -> Result<(), GltfError> {
        let doc_nodes: Vec<gltf_dep::Node<'_>> = self.document.nodes().collect();
        let mut traverse: VecDeque<(NodeHandle, usize)> = VecDeque::new();

        for (scene_index, gltf_scene) in self.document.scenes().enumerate() {
            let name = gltf_scene
                .name()
                .map(String::from)
                .unwrap_or_else(|| format!("scene_{scene_index}"));
            let root = scene.add_node(Node::new(name));

            for gltf_node in gltf_scene.nodes() {
                traverse.push_back((root, gltf_node.index()));
            }

            while let Some((parent, index)) = traverse.pop_front() {
                let current = *node_handles.get(index).ok_or(GltfError::Lookup {
                    what: "node",
                    index,
                })?;

                link_child(scene, parent, current)?;

                let doc_node = doc_nodes.get(index).ok_or(GltfError::Lookup {
                    what: "node",
                    index,
                })?;
                for child in doc_node.children() {
                    traverse.push_back((current, child.index()));
                }
            }

            scene.add_child(root);
        }
        Ok(())
    }

    /// A synthetic perspective camera under its own node, always attached as
    /// a top-level scene child so the scene has a viewpoint regardless of
    /// document content.
    fn attach_default_camera(&self, scene: &mut Scene) {
        let camera = scene.add_component(Camera::Perspective(PerspectiveCamera::new(
            "default_camera",
            1.77,
            1.0,
            0.1,
            1000.0,
        )));

        let mut node = Node::new("default_camera");
        node.camera = Some(camera);
        let handle = scene.add_node(node);

        if let Some(camera) = scene.component_mut(camera) {
            camera.set_node(handle);
        }
        scene.add_child(handle);
    }

    // -- Per-entity parsers --

    fn parse_sampler(
        &self,
        gltf_sampler: &gltf_dep::texture::Sampler<'_>,
    ) -> Result<Sampler, GltfError> {
        let name = gltf_sampler.name().unwrap_or("").to_string();

        let descriptor = SamplerDescriptor {
            label: (!name.is_empty()).then(|| name.clone()),
            mag_filter: format::map_mag_filter(gltf_sampler.mag_filter()),
            min_filter: format::map_min_filter(gltf_sampler.min_filter()),
            mipmap_filter: format::map_mipmap_filter(gltf_sampler.min_filter()),
            address_mode_u: format::map_wrap(gltf_sampler.wrap_s()),
            address_mode_v: format::map_wrap(gltf_sampler.wrap_t()),
            ..SamplerDescriptor::default()
        };

        let gpu = self.device.create_sampler(&descriptor)?;
        Ok(Sampler::new(name, gpu))
    }

    fn create_default_sampler(&self) -> Result<Sampler, GltfError> {
        let descriptor = SamplerDescriptor::linear().with_label("default_sampler");
        let gpu = self.device.create_sampler(&descriptor)?;
        Ok(Sampler::new("default_sampler", gpu))
    }

    fn parse_material(
        &self,
        gltf_material: &gltf_dep::Material<'_>,
        texture_count: usize,
    ) -> Result<PbrMaterial, GltfError> {
        let mut material = PbrMaterial::new(gltf_material.name().unwrap_or(""));

        let pbr = gltf_material.pbr_metallic_roughness();
        material.base_color_factor = pbr.base_color_factor();
        material.metallic_factor = pbr.metallic_factor();
        material.roughness_factor = pbr.roughness_factor();
        material.emissive = gltf_material.emissive_factor();
        material.alpha_mode = match gltf_material.alpha_mode() {
            gltf_dep::material::AlphaMode::Opaque => AlphaMode::Opaque,
            gltf_dep::material::AlphaMode::Mask => AlphaMode::Mask,
            gltf_dep::material::AlphaMode::Blend => AlphaMode::Blend,
        };
        material.alpha_cutoff = gltf_material.alpha_cutoff().unwrap_or(0.5);
        material.double_sided = gltf_material.double_sided();

        // Recognized texture slots.
        let recognized = [
            ("base_color_texture", pbr.base_color_texture().map(|t| t.texture().index())),
            (
                "metallic_roughness_texture",
                pbr.metallic_roughness_texture().map(|t| t.texture().index()),
            ),
            (
                "normal_texture",
                gltf_material.normal_texture().map(|t| t.texture().index()),
            ),
            (
                "occlusion_texture",
                gltf_material.occlusion_texture().map(|t| t.texture().index()),
            ),
            (
                "emissive_texture",
                gltf_material.emissive_texture().map(|t| t.texture().index()),
            ),
        ];
        for (slot, index) in recognized {
            if let Some(index) = index {
                if index >= texture_count {
                    return Err(GltfError::Lookup {
                        what: "texture",
                        index,
                    });
                }
                material.textures.insert(slot.to_string(), Handle::new(index));
            }
        }

        // Vendor extension rule: any extras key containing "Texture" with a
        // texture index payload becomes a slot under its normalized name.
        if let Some(raw) = gltf_material.extras().as_deref() {
            match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(raw.get()) {
                Ok(extras) => {
                    for (key, value) in &extras {
                        if !key.contains("Texture") {
                            continue;
                        }
                        if TEXTURE_SLOT_TABLE.iter().any(|(doc_key, _)| doc_key == key) {
                            continue;
                        }
                        let Some(index) =
                            value.get("index").and_then(serde_json::Value::as_u64)
                        else {
                            log::warn!(
                                "material {:?}: extras key {key:?} has no texture index",
                                material.name
                            );
                            continue;
                        };
                        let index = index as usize;
                        if index >= texture_count {
                            return Err(GltfError::Lookup {
                                what: "texture",
                                index,
                            });
                        }
                        material
                            .textures
                            .insert(to_snake_case(key), Handle::new(index));
                    }
                }
                Err(e) => {
                    log::warn!("material {:?}: unreadable extras: {e}", material.name);
                }
            }
        }

        Ok(material)
    }

    fn parse_primitive(
        &self,
        gltf_primitive: &gltf_dep::mesh::Primitive<'_>,
    ) -> Result<SubMesh, GltfError> {
        let mut submesh = SubMesh::new();

        for (semantic, accessor) in gltf_primitive.attributes() {
            let name = format::attribute_name(&semantic);
            let data = format::read_accessor_bytes(&accessor, &self.buffers)?;

            if name == "position" {
                submesh.vertex_count = accessor.count() as u32;
            }

            if data.is_empty() {
                log::warn!("attribute {name} has no data, skipping");
                continue;
            }

            let buffer = self.device.create_buffer(
                &BufferDescriptor::new(data.len() as u64, BufferUsage::VERTEX)
                    .with_label(name.clone()),
            )?;
            buffer.write(0, &data)?;
            submesh.vertex_buffers.insert(name.clone(), buffer);

            let attribute = VertexAttribute {
                format: format::map_attribute_format(
                    accessor.data_type(),
                    accessor.dimensions(),
                    accessor.normalized(),
                ),
                stride: format::accessor_stride(&accessor)? as u32,
            };
            submesh.attributes.insert(name, attribute);
        }

        if let Some(indices) = gltf_primitive.indices() {
            submesh.index_count = indices.count() as u32;

            let index_format = format::map_attribute_format(
                indices.data_type(),
                indices.dimensions(),
                indices.normalized(),
            );
            let mut data = format::read_accessor_bytes(&indices, &self.buffers)?;

            match index_format {
                VertexFormat::R8Uint => {
                    // The hardware index type set has no 8-bit member.
                    data = format::widen_elements(&data, 1, 2);
                    submesh.index_type = IndexFormat::Uint16;
                }
                VertexFormat::R16Uint => {
                    submesh.index_type = IndexFormat::Uint16;
                }
                VertexFormat::R32Uint => {
                    submesh.index_type = IndexFormat::Uint32;
                }
                other => {
                    log::error!("glTF primitive has invalid index format {other:?}");
                }
            }

            if !data.is_empty() {
                let buffer = self.device.create_buffer(
                    &BufferDescriptor::new(data.len() as u64, BufferUsage::INDEX)
                        .with_label("indices"),
                )?;
                buffer.write(0, &data)?;
                submesh.index_buffer = Some(buffer);
            }
        }

        Ok(submesh)
    }

    fn parse_camera(&self, gltf_camera: &gltf_dep::Camera<'_>) -> Option<Camera> {
        let name = gltf_camera.name().unwrap_or("").to_string();
        match gltf_camera.projection() {
            gltf_dep::camera::Projection::Perspective(perspective) => {
                Some(Camera::Perspective(PerspectiveCamera::new(
                    name,
                    perspective.aspect_ratio().unwrap_or(1.0),
                    perspective.yfov(),
                    perspective.znear(),
                    perspective.zfar().unwrap_or(1000.0),
                )))
            }
            _ => {
                log::warn!("Camera type not supported: {name:?}");
                None
            }
        }
    }
}

/// Build a node from a document record: name plus transform fields.
///
/// Whichever transform representation the document carries is applied; a raw
/// matrix is applied after the decomposed fields and so overrides them.
fn parse_node(gltf_node: &gltf_dep::Node<'_>) -> Node {
    let mut node = Node::new(gltf_node.name().unwrap_or(""));

    match gltf_node.transform() {
        gltf_dep::scene::Transform::Decomposed {
            translation,
            rotation,
            scale,
        } => {
            node.transform
                .set_translation(Vec3::new(translation[0], translation[1], translation[2]));
            node.transform.set_rotation(quat_from_array(rotation));
            node.transform
                .set_scale(Vec3::new(scale[0], scale[1], scale[2]));
        }
        gltf_dep::scene::Transform::Matrix { matrix } => {
            // Column-major in the document, column-major in nalgebra.
            let flat: Vec<f32> = matrix.iter().flatten().copied().collect();
            node.transform.set_matrix(Mat4::from_column_slice(&flat));
        }
    }

    node
}

/// Link `child` under `parent` in the node arena.
fn link_child(scene: &mut Scene, parent: NodeHandle, child: NodeHandle) -> Result<(), GltfError> {
    let child_node = scene.node_mut(child).ok_or(GltfError::Lookup {
        what: "node",
        index: child.index(),
    })?;
    child_node.parent = Some(parent);

    let parent_node = scene.node_mut(parent).ok_or(GltfError::Lookup {
        what: "node",
        index: parent.index(),
    })?;
    parent_node.children.push(child);
    Ok(())
}

/// Convert a camelCase document key to snake_case.
fn to_snake_case(key: &str) -> String {
    let mut result = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

/// Resolve all buffer payloads of a document.
///
/// Binary glTF blobs, base64 data URIs, and side files relative to the base
/// directory are supported.
pub(crate) fn resolve_buffers(
    document: &gltf_dep::Document,
    blob: Option<Vec<u8>>,
    base_dir: &Path,
) -> Result<Vec<Vec<u8>>, GltfError> {
    let mut buffers = Vec::new();

    for buffer in document.buffers() {
        match buffer.source() {
            gltf_dep::buffer::Source::Bin => {
                let data = blob.as_ref().ok_or_else(|| {
                    GltfError::Buffer("binary buffer referenced but no blob present".into())
                })?;
                buffers.push(data.clone());
            }
            gltf_dep::buffer::Source::Uri(uri) => {
                if let Some(data) = parse_data_uri(uri) {
                    buffers.push(data);
                } else {
                    let path = base_dir.join(uri);
                    let data = std::fs::read(&path)
                        .map_err(|source| GltfError::Io { path, source })?;
                    buffers.push(data);
                }
            }
        }
    }

    Ok(buffers)
}

/// Parse a base64 data URI (`data:...;base64,...`) into its decoded bytes.
pub(crate) fn parse_data_uri(uri: &str) -> Option<Vec<u8>> {
    let rest = uri.strip_prefix("data:")?;
    let (_, encoded) = rest.split_once(";base64,")?;
    base64_decode(encoded)
}

/// Minimal base64 decoder, enough for data URIs.
fn base64_decode(input: &str) -> Option<Vec<u8>> {
    fn value(c: u8) -> Option<u32> {
        match c {
            b'A'..=b'Z' => Some(u32::from(c - b'A')),
            b'a'..=b'z' => Some(u32::from(c - b'a') + 26),
            b'0'..=b'9' => Some(u32::from(c - b'0') + 52),
            b'+' => Some(62),
            b'/' => Some(63),
            _ => None,
        }
    }

    let input: Vec<u8> = input
        .bytes()
        .filter(|b| !b" \t\r\n".contains(b))
        .collect();
    let mut result = Vec::with_capacity(input.len() / 4 * 3);

    for chunk in input.chunks(4) {
        let mut acc = 0u32;
        let mut chars = 0;
        for &byte in chunk {
            if byte == b'=' {
                break;
            }
            acc = (acc << 6) | value(byte)?;
            chars += 1;
        }
        match chars {
            4 => {
                result.push((acc >> 16) as u8);
                result.push((acc >> 8) as u8);
                result.push(acc as u8);
            }
            3 => {
                acc <<= 6;
                result.push((acc >> 16) as u8);
                result.push((acc >> 8) as u8);
            }
            2 => {
                acc <<= 12;
                result.push((acc >> 16) as u8);
            }
            _ => return None,
        }
    }

    Some(result)
}
