//! Type registry: canonical descriptors for every field type used by the command tables.
//!
//! A [TypeDef] gives a name, a natural bit width (0 for variable-length types), the
//! signedness, and the [Transform] that turns argument values into raw wire values.
//! Descriptors are immutable; the built-in ones are `const` items shared by every
//! field that uses them.

use std::borrow::Cow;

use crate::transform::Transform;

/// Descriptor of a field type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    /// Registry name, also used in listings and JSON definitions.
    pub name: Cow<'static, str>,
    /// Natural width in bits. 0 marks a variable-length type.
    pub bits: u32,
    /// Whether raw values are two's-complement signed.
    pub signed: bool,
    /// How argument values map to raw values.
    pub transform: Transform,
}

impl TypeDef {
    /// Plain integer type.
    pub const fn int(name: &'static str, bits: u32, signed: bool) -> Self {
        TypeDef {
            name: Cow::Borrowed(name),
            bits,
            signed,
            transform: Transform::Int,
        }
    }

    /// Signed fixed-point type; raw value is `real * scale`.
    pub const fn fixed(name: &'static str, bits: u32, scale: u32) -> Self {
        TypeDef {
            name: Cow::Borrowed(name),
            bits,
            signed: true,
            transform: Transform::Fixed { scale },
        }
    }

    /// Variable-length byte block whose length is given by the named sibling field,
    /// or which runs to the end of the input when `length_field` is `None`.
    pub fn block(length_field: Option<&str>) -> Self {
        TypeDef {
            name: Cow::Borrowed("DataBlock"),
            bits: 0,
            signed: false,
            transform: Transform::Block {
                length_field: length_field.map(|name| Cow::Owned(name.to_string())),
            },
        }
    }

    /// True for types with no fixed width (strings and blocks).
    pub fn is_variable(&self) -> bool {
        self.bits == 0
    }
}

// Display-list types
pub const ADDRESS: TypeDef = TypeDef::int("Address", 22, false);
pub const COLOR_CHANNEL: TypeDef = TypeDef::int("ColorChannel", 8, false);
pub const TAG: TypeDef = TypeDef::int("Tag", 8, false);
pub const HANDLE: TypeDef = TypeDef::int("Handle", 5, false);
pub const CELL: TypeDef = TypeDef::int("Cell", 7, false);
pub const BOOL: TypeDef = TypeDef::int("bool", 1, false);
pub const TEST_FUNCTION: TypeDef = TypeDef::int("TestFunction", 4, false);
pub const STENCIL_OP: TypeDef = TypeDef::int("StencilOp", 3, false);
pub const FIXED8_8: TypeDef = TypeDef::fixed("Fixed8_8", 17, 256);
pub const FIXED15_8: TypeDef = TypeDef::fixed("Fixed15_8", 24, 65536);
pub const DL_OFFSET: TypeDef = TypeDef::int("DisplayListOffset", 16, false);
pub const BITMAP_FORMAT: TypeDef = TypeDef::int("BitmapFormat", 5, false);
pub const BITMAP_WRAP: TypeDef = TypeDef::int("BitmapWrap", 1, false);
pub const BITMAP_FILTER: TypeDef = TypeDef::int("BitmapFilter", 1, false);
pub const BLEND_FUNCTION: TypeDef = TypeDef::int("BlendFunction", 3, false);
pub const GRAPHICS_PRIMITIVE: TypeDef = TypeDef::int("GraphicsPrimitive", 4, false);

// Coprocessor types
pub const RGB: TypeDef = TypeDef::int("RGB", 24, false);
pub const ARGB: TypeDef = TypeDef::int("ARGB", 32, false);
pub const UINT8: TypeDef = TypeDef::int("uint8_t", 8, false);
pub const INT16: TypeDef = TypeDef::int("int16_t", 16, true);
pub const UINT16: TypeDef = TypeDef::int("uint16_t", 16, false);
pub const INT32: TypeDef = TypeDef::int("int32_t", 32, true);
pub const UINT32: TypeDef = TypeDef::int("uint32_t", 32, false);
pub const FIXED16_16: TypeDef = TypeDef::fixed("Fixed16_16", 32, 65536);
/// Units of 1/65536 of a circle.
pub const ANGLE: TypeDef = TypeDef::int("Angle", 32, false);
pub const OPTIONS: TypeDef = TypeDef::int("Options", 16, false);
/// Variable length, NUL terminated.
pub const CSTRING: TypeDef = TypeDef {
    name: Cow::Borrowed("CString"),
    bits: 0,
    signed: false,
    transform: Transform::CString,
};

static REGISTRY: [TypeDef; 27] = [
    ADDRESS,
    COLOR_CHANNEL,
    TAG,
    HANDLE,
    CELL,
    BOOL,
    TEST_FUNCTION,
    STENCIL_OP,
    FIXED8_8,
    FIXED15_8,
    DL_OFFSET,
    BITMAP_FORMAT,
    BITMAP_WRAP,
    BITMAP_FILTER,
    BLEND_FUNCTION,
    GRAPHICS_PRIMITIVE,
    RGB,
    ARGB,
    UINT8,
    INT16,
    UINT16,
    INT32,
    UINT32,
    FIXED16_16,
    ANGLE,
    OPTIONS,
    CSTRING,
];

/// Every named type of the registry. Blocks are parameterised and built with [TypeDef::block].
pub fn registry() -> &'static [TypeDef] {
    &REGISTRY
}

/// Finds a registry type by name.
pub fn lookup(name: &str) -> Option<&'static TypeDef> {
    REGISTRY.iter().find(|ty| ty.name == name)
}
