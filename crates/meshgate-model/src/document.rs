//! The root asset graph.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::accessor::Accessor;
use crate::buffer::{Buffer, BufferView};
use crate::collection::Collection;
use crate::error::DocumentError;
use crate::field::{json_kind, Field};
use crate::material::{Image, Material, Sampler, Texture};
use crate::mesh::Mesh;

/// The `asset` block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Asset {
    pub version: Field<String>,
    pub generator: Field<String>,
    pub min_version: Field<String>,
}

/// A parsed glTF document.
///
/// Holds a typed view for validation next to the raw tree it was read from.
/// The raw tree is what gets written back, so fields the typed view does not
/// model (extensions, extras, nodes) survive a fix unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Document {
    #[serde(skip)]
    raw: Value,
    pub asset: Field<Asset>,
    pub scenes: Field<Vec<Value>>,
    pub nodes: Field<Vec<Value>>,
    pub accessors: Collection<Accessor>,
    pub buffer_views: Collection<BufferView>,
    pub buffers: Collection<Buffer>,
    pub meshes: Collection<Mesh>,
    pub materials: Collection<Material>,
    pub textures: Collection<Texture>,
    pub images: Collection<Image>,
    pub samplers: Collection<Sampler>,
}

/// Entry counts per collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub accessors: usize,
    pub buffer_views: usize,
    pub buffers: usize,
    pub meshes: usize,
    pub materials: usize,
    pub textures: usize,
    pub images: usize,
}

impl Document {
    /// Parses a document from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }

    /// Builds a document from an already-parsed tree.
    ///
    /// Fails only when the root is not an object. Every other shape problem
    /// is kept in the typed view for the validators to report.
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        if !value.is_object() {
            return Err(DocumentError::MalformedRoot(json_kind(&value)));
        }
        let mut document = Document::deserialize(&value)?;
        document.raw = value;
        Ok(document)
    }

    /// The tree as read, including any fixes applied since.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn into_raw(self) -> Value {
        self.raw
    }

    /// Serializes the raw tree as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(&self.raw)?)
    }

    /// Serializes the raw tree as compact JSON bytes.
    pub fn to_json_vec(&self) -> Result<Vec<u8>, DocumentError> {
        Ok(serde_json::to_vec(&self.raw)?)
    }

    pub fn stats(&self) -> DocumentStats {
        DocumentStats {
            accessors: self.accessors.len(),
            buffer_views: self.buffer_views.len(),
            buffers: self.buffers.len(),
            meshes: self.meshes.len(),
            materials: self.materials.len(),
            textures: self.textures.len(),
            images: self.images.len(),
        }
    }

    /// Overwrites a buffer's declared `byteLength` in both views.
    ///
    /// Returns the previous declaration.
    pub fn set_buffer_byte_length(
        &mut self,
        index: usize,
        byte_length: u64,
    ) -> Result<Field<i64>, DocumentError> {
        let raw_buffer = self
            .raw
            .get_mut("buffers")
            .and_then(|buffers| buffers.get_mut(index))
            .and_then(Value::as_object_mut)
            .ok_or(DocumentError::MissingBuffer(index))?;
        raw_buffer.insert("byteLength".to_string(), Value::from(byte_length));

        let buffer = self
            .buffers
            .get_mut(index)
            .ok_or(DocumentError::MissingBuffer(index))?;
        let declared = i64::try_from(byte_length).map_or_else(
            |_| Field::Invalid(Value::from(byte_length)),
            Field::Present,
        );
        Ok(std::mem::replace(&mut buffer.byte_length, declared))
    }
}
