//! Accessor types and the component arithmetic they imply.

use serde::Deserialize;

use crate::field::Field;

/// Typed view into a buffer view.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Accessor {
    /// Index of the backing buffer view (required).
    pub buffer_view: Field<i64>,
    /// Offset into the buffer view, in bytes (default 0).
    pub byte_offset: Field<i64>,
    /// Raw component type code (5120..=5126).
    pub component_type: Field<i64>,
    /// Number of elements.
    pub count: Field<i64>,
    /// Element type name (`SCALAR`, `VEC2`, ...).
    #[serde(rename = "type")]
    pub element_type: Field<String>,
    /// Per-component lower bounds.
    pub min: Field<Vec<f64>>,
    /// Per-component upper bounds.
    pub max: Field<Vec<f64>>,
    pub name: Field<String>,
}

impl Accessor {
    /// Decoded component type, if the code is one of the six valid values.
    pub fn component(&self) -> Option<ComponentType> {
        self.component_type
            .present()
            .and_then(|code| ComponentType::from_code(*code))
    }

    /// Decoded element type, if the name is one of the seven valid names.
    pub fn element(&self) -> Option<AccessorType> {
        self.element_type
            .present()
            .and_then(|name| AccessorType::from_name(name))
    }

    /// Bytes occupied by one element, when both type fields are valid.
    pub fn element_size(&self) -> Option<u64> {
        let component = self.component()?;
        let element = self.element()?;
        Some(element.component_count() * component.byte_width())
    }
}

/// Numeric component type of an accessor.
///
/// The integer codes are fixed by the glTF 2.0 format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    UnsignedInt,
    Float,
}

impl ComponentType {
    /// All component types in code order.
    pub const ALL: [ComponentType; 6] = [
        ComponentType::Byte,
        ComponentType::UnsignedByte,
        ComponentType::Short,
        ComponentType::UnsignedShort,
        ComponentType::UnsignedInt,
        ComponentType::Float,
    ];

    /// Decodes a component type code.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            5120 => Some(ComponentType::Byte),
            5121 => Some(ComponentType::UnsignedByte),
            5122 => Some(ComponentType::Short),
            5123 => Some(ComponentType::UnsignedShort),
            5125 => Some(ComponentType::UnsignedInt),
            5126 => Some(ComponentType::Float),
            _ => None,
        }
    }

    /// The format's integer code.
    pub fn code(&self) -> i64 {
        match self {
            ComponentType::Byte => 5120,
            ComponentType::UnsignedByte => 5121,
            ComponentType::Short => 5122,
            ComponentType::UnsignedShort => 5123,
            ComponentType::UnsignedInt => 5125,
            ComponentType::Float => 5126,
        }
    }

    /// Size of one component in bytes.
    pub fn byte_width(&self) -> u64 {
        match self {
            ComponentType::Byte | ComponentType::UnsignedByte => 1,
            ComponentType::Short | ComponentType::UnsignedShort => 2,
            ComponentType::UnsignedInt | ComponentType::Float => 4,
        }
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ComponentType::Byte => "BYTE",
            ComponentType::UnsignedByte => "UNSIGNED_BYTE",
            ComponentType::Short => "SHORT",
            ComponentType::UnsignedShort => "UNSIGNED_SHORT",
            ComponentType::UnsignedInt => "UNSIGNED_INT",
            ComponentType::Float => "FLOAT",
        };
        write!(f, "{}", name)
    }
}

/// Element shape of an accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl AccessorType {
    /// All accessor types.
    pub const ALL: [AccessorType; 7] = [
        AccessorType::Scalar,
        AccessorType::Vec2,
        AccessorType::Vec3,
        AccessorType::Vec4,
        AccessorType::Mat2,
        AccessorType::Mat3,
        AccessorType::Mat4,
    ];

    /// Decodes a type name. Names are case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "SCALAR" => Some(AccessorType::Scalar),
            "VEC2" => Some(AccessorType::Vec2),
            "VEC3" => Some(AccessorType::Vec3),
            "VEC4" => Some(AccessorType::Vec4),
            "MAT2" => Some(AccessorType::Mat2),
            "MAT3" => Some(AccessorType::Mat3),
            "MAT4" => Some(AccessorType::Mat4),
            _ => None,
        }
    }

    /// The format's type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessorType::Scalar => "SCALAR",
            AccessorType::Vec2 => "VEC2",
            AccessorType::Vec3 => "VEC3",
            AccessorType::Vec4 => "VEC4",
            AccessorType::Mat2 => "MAT2",
            AccessorType::Mat3 => "MAT3",
            AccessorType::Mat4 => "MAT4",
        }
    }

    /// Number of components per element.
    pub fn component_count(&self) -> u64 {
        match self {
            AccessorType::Scalar => 1,
            AccessorType::Vec2 => 2,
            AccessorType::Vec3 => 3,
            AccessorType::Vec4 | AccessorType::Mat2 => 4,
            AccessorType::Mat3 => 9,
            AccessorType::Mat4 => 16,
        }
    }
}

impl std::fmt::Display for AccessorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
