//! Meshes and their primitives.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::field::Field;

/// Attribute semantic that carries vertex positions.
pub const POSITION: &str = "POSITION";

/// Attribute semantic of the first UV channel.
pub const TEXCOORD_0: &str = "TEXCOORD_0";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Mesh {
    pub primitives: Field<Vec<Field<Primitive>>>,
    pub name: Field<String>,
}

/// One drawable unit of a mesh.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Primitive {
    /// Semantic name to accessor index.
    pub attributes: Field<BTreeMap<String, Field<i64>>>,
    pub indices: Field<i64>,
    pub material: Field<i64>,
    /// Raw topology code; absent means triangles.
    pub mode: Field<i64>,
}

impl Primitive {
    /// Looks up an attribute binding by semantic.
    pub fn attribute(&self, semantic: &str) -> Option<&Field<i64>> {
        self.attributes.present().and_then(|map| map.get(semantic))
    }

    /// True when the primitive declares the points topology.
    pub fn is_points(&self) -> bool {
        matches!(self.mode, Field::Present(MODE_POINTS))
    }
}

/// Topology code that exempts a primitive from the `POSITION` requirement.
///
/// This follows the ingest pipeline's numbering, which treats code 1 as
/// points.
pub const MODE_POINTS: i64 = 1;

/// Topology codes range over 0 through 6.
pub fn is_valid_mode(code: i64) -> bool {
    (0..=6).contains(&code)
}
