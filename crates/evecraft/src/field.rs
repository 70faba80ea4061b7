//! Definition of the named, typed fields that make up a command.

use std::borrow::Cow;

use crate::{bits::align, types::TypeDef};

/// A single named argument of a command.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Argument name, unique within its command.
    pub name: Cow<'static, str>,
    /// Field type.
    pub ty: TypeDef,
    /// Stored width in bits. Takes precedence over the type's natural width.
    pub stored_bits: Option<u32>,
    /// Optional human-readable description.
    pub description: Option<Cow<'static, str>>,
    /// Byte offset within a coprocessor command, set by the layout resolver.
    pub offset: Option<usize>,
}

/// Base storage category of a fixed-width coprocessor field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    U16,
    I16,
    U32,
    I32,
}

impl Storage {
    /// Rust type name of the storage.
    pub fn rust_type(self) -> &'static str {
        match self {
            Storage::U16 => "u16",
            Storage::I16 => "i16",
            Storage::U32 => "u32",
            Storage::I32 => "i32",
        }
    }

    pub fn size(self) -> usize {
        match self {
            Storage::U16 | Storage::I16 => 2,
            Storage::U32 | Storage::I32 => 4,
        }
    }
}

impl Field {
    pub fn new(name: impl Into<Cow<'static, str>>, ty: TypeDef) -> Self {
        Field {
            name: name.into(),
            ty,
            stored_bits: None,
            description: None,
            offset: None,
        }
    }

    /// Overrides the stored width for this field.
    pub fn stored_bits(mut self, bits: u32) -> Self {
        self.stored_bits = Some(bits);
        self
    }

    /// Attaches a description.
    pub fn describe(mut self, description: impl Into<Cow<'static, str>>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Width in bits: the stored override, or the type's natural width.
    pub fn bitcount(&self) -> u32 {
        self.stored_bits.unwrap_or(self.ty.bits)
    }

    /// Bytes occupied in a coprocessor command: the bit count rounded up to 16 bits,
    /// so always 2 or 4 for fixed-width fields, and 0 for variable-length ones.
    pub fn byte_size(&self) -> usize {
        align(self.bitcount() as usize, 16) / 8
    }

    pub fn is_variable(&self) -> bool {
        self.bitcount() == 0
    }

    /// Storage category used by generated record types. `None` for variable-length fields.
    pub fn storage(&self) -> Option<Storage> {
        match (self.byte_size(), self.ty.signed) {
            (2, false) => Some(Storage::U16),
            (2, true) => Some(Storage::I16),
            (4, false) => Some(Storage::U32),
            (4, true) => Some(Storage::I32),
            _ => None,
        }
    }
}
