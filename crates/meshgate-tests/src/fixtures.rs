//! In-code glTF fixtures for the end-to-end scenarios.
//!
//! Every fixture is a single textured triangle: accessor 0 holds three VEC3
//! float positions in bufferView 0, accessor 1 holds three VEC2 float UVs in
//! bufferView 1, and both views sit in buffer 0 (`mesh.bin`).

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};

/// Name of the external binary payload written next to the document.
pub const BIN_NAME: &str = "mesh.bin";

/// Byte size of three VEC3 float positions.
pub const POSITION_BYTES: u64 = 3 * 12;

/// Byte size of three VEC2 float UVs.
pub const UV_BYTES: u64 = 3 * 8;

/// A glTF document plus the external payloads it references.
#[derive(Debug, Clone)]
pub struct GltfFixture {
    pub document: Value,
    /// `(uri, bytes)` pairs written beside the document.
    pub payloads: Vec<(String, Vec<u8>)>,
}

impl GltfFixture {
    /// A document every pass accepts.
    pub fn clean() -> Self {
        Self::triangle(POSITION_BYTES, POSITION_BYTES + UV_BYTES, POSITION_BYTES + UV_BYTES)
    }

    /// The clean document with the UV attribute and its accessor removed.
    pub fn without_texcoord() -> Self {
        let mut fixture = Self::clean();
        fixture.document["meshes"][0]["primitives"][0]["attributes"]
            .as_object_mut()
            .expect("attributes object")
            .remove("TEXCOORD_0");
        fixture
    }

    /// Positions claim 100 vertices (1200 bytes) but bufferView 0 only
    /// spans 800. The buffer itself is large enough.
    pub fn short_position_view() -> Self {
        let buffer_len = 800 + UV_BYTES;
        let mut fixture = Self::triangle(800, buffer_len, buffer_len);
        fixture.document["accessors"][0]["count"] = json!(100);
        fixture
    }

    /// The buffer declares 500 bytes but `mesh.bin` holds 512.
    pub fn stale_buffer_length() -> Self {
        Self::triangle(POSITION_BYTES, 500, 512)
    }

    /// Builds the triangle with the given bufferView 0 length, declared
    /// buffer length and actual payload length.
    fn triangle(position_view_len: u64, declared_len: u64, payload_len: u64) -> Self {
        let document = json!({
            "asset": { "version": "2.0", "generator": "meshgate-tests" },
            "scene": 0,
            "scenes": [{ "nodes": [0] }],
            "nodes": [{ "mesh": 0 }],
            "meshes": [{
                "primitives": [{
                    "attributes": { "POSITION": 0, "TEXCOORD_0": 1 },
                    "material": 0,
                    "mode": 4
                }]
            }],
            "materials": [{
                "pbrMetallicRoughness": { "baseColorTexture": { "index": 0 } }
            }],
            "textures": [{ "source": 0, "sampler": 0 }],
            "samplers": [{}],
            "images": [{ "uri": "albedo.png" }],
            "accessors": [
                {
                    "bufferView": 0,
                    "componentType": 5126,
                    "count": 3,
                    "type": "VEC3",
                    "min": [0.0, 0.0, 0.0],
                    "max": [1.0, 1.0, 0.0]
                },
                {
                    "bufferView": 1,
                    "componentType": 5126,
                    "count": 3,
                    "type": "VEC2"
                }
            ],
            "bufferViews": [
                { "buffer": 0, "byteOffset": 0, "byteLength": position_view_len },
                { "buffer": 0, "byteOffset": position_view_len, "byteLength": UV_BYTES }
            ],
            "buffers": [{ "uri": BIN_NAME, "byteLength": declared_len }]
        });

        Self {
            document,
            payloads: vec![(BIN_NAME.to_string(), vec![0u8; payload_len as usize])],
        }
    }

    /// Serialized document JSON.
    pub fn json_bytes(&self) -> Vec<u8> {
        serde_json::to_vec_pretty(&self.document).expect("fixture serializes")
    }

    /// Writes the document as `name` plus its payloads into `dir`.
    pub fn write_gltf(&self, dir: &Path, name: &str) -> PathBuf {
        for (uri, bytes) in &self.payloads {
            fs::write(dir.join(uri), bytes).expect("write payload");
        }
        let path = dir.join(name);
        fs::write(&path, self.json_bytes()).expect("write document");
        path
    }

    /// Packs the document into a GLB, moving buffer 0's payload into the
    /// BIN chunk. Other payloads stay external.
    pub fn to_glb(&self) -> Vec<u8> {
        let mut document = self.document.clone();
        let bin = self
            .payload(BIN_NAME)
            .expect("fixture has a mesh.bin payload")
            .to_vec();
        let buffer = document["buffers"][0]
            .as_object_mut()
            .expect("buffer 0 object");
        buffer.remove("uri");
        buffer.insert("byteLength".to_string(), json!(bin.len()));

        let json = serde_json::to_vec(&document).expect("fixture serializes");
        meshgate_lint::build_glb(&json, Some(&bin))
    }

    /// Writes the GLB form as `name` plus any remaining external payloads.
    pub fn write_glb(&self, dir: &Path, name: &str) -> PathBuf {
        for (uri, bytes) in &self.payloads {
            if uri != BIN_NAME {
                fs::write(dir.join(uri), bytes).expect("write payload");
            }
        }
        let path = dir.join(name);
        fs::write(&path, self.to_glb()).expect("write glb");
        path
    }

    /// Adds a second, external buffer.
    pub fn with_extra_buffer(mut self, uri: &str, declared_len: u64, payload_len: usize) -> Self {
        self.document["buffers"]
            .as_array_mut()
            .expect("buffers array")
            .push(json!({ "uri": uri, "byteLength": declared_len }));
        self.payloads.push((uri.to_string(), vec![0u8; payload_len]));
        self
    }

    pub fn payload(&self, uri: &str) -> Option<&[u8]> {
        self.payloads
            .iter()
            .find(|(u, _)| u == uri)
            .map(|(_, bytes)| bytes.as_slice())
    }
}
