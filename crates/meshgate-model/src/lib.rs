//! meshgate document model
//!
//! A lenient, typed view over a glTF 2.0 JSON document. Every field records
//! whether it was absent, `null`, malformed or present, so validators can
//! report exactly what an exporter wrote instead of failing at parse time.
//!
//! # Example
//!
//! ```
//! use meshgate_model::{Document, Field};
//! use serde_json::json;
//!
//! let document = Document::from_value(json!({
//!     "asset": { "version": "2.0" },
//!     "accessors": [{ "bufferView": 0, "count": "many" }]
//! }))
//! .unwrap();
//!
//! let accessor = document.accessors.resolve(0).unwrap();
//! assert_eq!(accessor.buffer_view, Field::Present(0));
//! assert!(accessor.count.is_invalid());
//! ```
//!
//! # Modules
//!
//! - [`field`]: presence-tracking field wrapper
//! - [`collection`]: index-addressed top-level arrays
//! - [`document`]: the root graph and statistics
//! - [`accessor`], [`buffer`], [`mesh`], [`material`]: entry types

pub mod accessor;
pub mod buffer;
pub mod collection;
pub mod document;
pub mod error;
pub mod field;
pub mod material;
pub mod mesh;

pub use accessor::{Accessor, AccessorType, ComponentType};
pub use buffer::{is_valid_stride, Buffer, BufferView, MAX_BYTE_STRIDE, MIN_BYTE_STRIDE};
pub use collection::Collection;
pub use document::{Asset, Document, DocumentStats};
pub use error::DocumentError;
pub use field::{json_kind, Field};
pub use material::{Image, Material, PbrMetallicRoughness, Sampler, Texture, TextureInfo, TextureSlot};
pub use mesh::{is_valid_mode, Mesh, Primitive, MODE_POINTS, POSITION, TEXCOORD_0};
