//! Buffers and buffer views.

use serde::Deserialize;

use crate::field::Field;

/// Smallest legal `byteStride`.
pub const MIN_BYTE_STRIDE: i64 = 4;

/// Largest legal `byteStride`.
pub const MAX_BYTE_STRIDE: i64 = 252;

/// Raw byte payload, either external (`uri`) or embedded.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Buffer {
    pub uri: Field<String>,
    /// Declared payload size. The only field the fixer rewrites.
    pub byte_length: Field<i64>,
    pub name: Field<String>,
}

impl Buffer {
    /// External URI when the buffer is backed by one.
    pub fn external_uri(&self) -> Option<&str> {
        self.uri.present().map(String::as_str)
    }
}

/// Byte window into a buffer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BufferView {
    /// Index of the backing buffer (required).
    pub buffer: Field<i64>,
    pub byte_offset: Field<i64>,
    pub byte_length: Field<i64>,
    /// Distance between elements. Absent or null means tightly packed.
    pub byte_stride: Field<i64>,
    pub target: Field<i64>,
    pub name: Field<String>,
}

impl BufferView {
    /// Declared offset, defaulting to 0 when absent.
    pub fn offset_or_default(&self) -> Option<i64> {
        match &self.byte_offset {
            Field::Absent | Field::Null => Some(0),
            Field::Present(offset) => Some(*offset),
            Field::Invalid(_) => None,
        }
    }
}

/// True when `stride` satisfies the range and alignment rules.
pub fn is_valid_stride(stride: i64) -> bool {
    (MIN_BYTE_STRIDE..=MAX_BYTE_STRIDE).contains(&stride) && stride % 4 == 0
}
