//! Scene assembly tests: tree construction, defaults, failure policy.

use std::path::Path;

use super::{load, test_device};
use crate::gltf::GltfLoader;
use crate::scene::{Camera, Node, NodeHandle, PbrMaterial, Sampler, Scene};

#[test]
fn two_scenes_attach_under_synthetic_roots() {
    let json = r#"{
        "asset": {"version": "2.0"},
        "scenes": [
            {"name": "A", "nodes": [0]},
            {"name": "B", "nodes": [3]}
        ],
        "nodes": [
            {"name": "n0", "children": [1, 2]},
            {"name": "n1"},
            {"name": "n2"},
            {"name": "n3"}
        ]
    }"#;
    let device = test_device();
    let scene = load(&device, json.as_bytes());

    // Two synthetic scene roots plus the default camera node.
    let children = scene.children();
    assert_eq!(children.len(), 3);

    let root_a = scene.node(children[0]).unwrap();
    let root_b = scene.node(children[1]).unwrap();
    assert_eq!(root_a.name, "A");
    assert_eq!(root_b.name, "B");

    // A's root carries the document root n0, which keeps its own children.
    assert_eq!(root_a.children.len(), 1);
    let n0 = scene.node(root_a.children[0]).unwrap();
    assert_eq!(n0.name, "n0");
    assert_eq!(n0.parent, Some(children[0]));
    assert_eq!(n0.children.len(), 2);

    let n1 = scene.node(n0.children[0]).unwrap();
    let n2 = scene.node(n0.children[1]).unwrap();
    assert_eq!(n1.name, "n1");
    assert_eq!(n2.name, "n2");
    assert_eq!(n1.parent, Some(root_a.children[0]));
    assert_eq!(n2.parent, Some(root_a.children[0]));

    // B's root has its single childless document root.
    assert_eq!(root_b.children.len(), 1);
    let n3 = scene.node(root_b.children[0]).unwrap();
    assert_eq!(n3.name, "n3");
    assert!(n3.children.is_empty());
}

#[test]
fn empty_document_yields_defaults_only() {
    let json = r#"{"asset": {"version": "2.0"}}"#;
    let device = test_device();
    let scene = load(&device, json.as_bytes());

    assert_eq!(scene.name(), "gltf_scene");
    assert_eq!(scene.components::<Sampler>().len(), 1);
    assert_eq!(scene.components::<PbrMaterial>().len(), 1);
    assert_eq!(scene.components::<Camera>().len(), 1);

    // The default camera hangs under its own top-level node.
    assert_eq!(scene.children().len(), 1);
    let camera_node = scene.node(scene.children()[0]).unwrap();
    assert_eq!(camera_node.name, "default_camera");
    let camera_handle = camera_node.camera.expect("camera attached");

    let Camera::Perspective(camera) = scene.component(camera_handle).unwrap();
    assert_eq!(camera.aspect_ratio, 1.77);
    assert_eq!(camera.field_of_view, 1.0);
    assert_eq!(camera.near_plane, 0.1);
    assert_eq!(camera.far_plane, 1000.0);
    assert_eq!(camera.node, Some(scene.children()[0]));
}

#[test]
fn parse_failure_leaves_destination_untouched() {
    let device = test_device();
    let loader = GltfLoader::new(device);

    let mut scene = Scene::new();
    scene.set_name("untouched");
    let marker = scene.add_node(Node::new("marker"));
    scene.add_child(marker);

    let result = loader.read_scene_from_slice(b"this is not a gltf document", Path::new(""), &mut scene);
    assert!(result.is_err());

    assert_eq!(scene.name(), "untouched");
    assert_eq!(scene.children(), &[NodeHandle(0)]);
    assert_eq!(scene.node(marker).unwrap().name, "marker");
}

#[test]
fn unsupported_camera_kind_is_omitted() {
    let json = r#"{
        "asset": {"version": "2.0"},
        "cameras": [
            {"type": "orthographic",
             "orthographic": {"xmag": 1.0, "ymag": 1.0, "znear": 0.1, "zfar": 100.0}}
        ],
        "nodes": [{"name": "viewer", "camera": 0}],
        "scenes": [{"nodes": [0]}]
    }"#;
    let device = test_device();
    let scene = load(&device, json.as_bytes());

    // Only the synthetic default camera exists.
    assert_eq!(scene.components::<Camera>().len(), 1);

    let viewer = scene
        .nodes()
        .iter()
        .find(|n| n.name == "viewer")
        .expect("viewer node");
    assert!(viewer.camera.is_none());
}

#[test]
fn perspective_camera_attaches_bidirectionally() {
    let json = r#"{
        "asset": {"version": "2.0"},
        "cameras": [
            {"name": "main", "type": "perspective",
             "perspective": {"yfov": 0.8, "znear": 0.01, "zfar": 500.0, "aspectRatio": 1.5}}
        ],
        "nodes": [{"name": "viewer", "camera": 0}],
        "scenes": [{"nodes": [0]}]
    }"#;
    let device = test_device();
    let scene = load(&device, json.as_bytes());

    // Document camera plus the default camera.
    assert_eq!(scene.components::<Camera>().len(), 2);

    let (index, viewer) = scene
        .nodes()
        .iter()
        .enumerate()
        .find(|(_, n)| n.name == "viewer")
        .expect("viewer node");
    let camera_handle = viewer.camera.expect("camera attached");
    let Camera::Perspective(camera) = scene.component(camera_handle).unwrap();

    assert_eq!(camera.name, "main");
    assert_eq!(camera.field_of_view, 0.8);
    assert_eq!(camera.aspect_ratio, 1.5);
    assert_eq!(camera.far_plane, 500.0);
    assert_eq!(camera.node.map(|n| n.index()), Some(index));
}

#[test]
fn node_transform_fields_are_applied() {
    let json = r#"{
        "asset": {"version": "2.0"},
        "nodes": [
            {"name": "trs",
             "translation": [1.0, 2.0, 3.0],
             "rotation": [0.0, 0.0, 0.0, 1.0],
             "scale": [2.0, 2.0, 2.0]},
            {"name": "raw",
             "matrix": [1,0,0,0, 0,1,0,0, 0,0,1,0, 5.0,6.0,7.0,1]}
        ],
        "scenes": [{"nodes": [0, 1]}]
    }"#;
    let device = test_device();
    let scene = load(&device, json.as_bytes());

    let trs = scene.nodes().iter().find(|n| n.name == "trs").unwrap();
    assert_eq!(trs.transform.translation().x, 1.0);
    assert_eq!(trs.transform.translation().z, 3.0);
    assert_eq!(trs.transform.scale().x, 2.0);
    assert!(trs.transform.matrix_override().is_none());

    let raw = scene.nodes().iter().find(|n| n.name == "raw").unwrap();
    let matrix = raw.transform.local_matrix();
    assert_eq!(matrix[(0, 3)], 5.0);
    assert_eq!(matrix[(1, 3)], 6.0);
    assert_eq!(matrix[(2, 3)], 7.0);
}
