//! # evecraft
//!
//! Command schema and binary codec for EVE-series graphics controllers.
//!
//! Commands come in two families. Display-list commands pack an opcode and their
//! bit-fields into a single little-endian 32-bit word. Coprocessor commands start with
//! the word `0xffffffxx` and lay their fields out at byte offsets aligned to each
//! field's size, optionally ending with a NUL-terminated string or a byte block, and are
//! always padded to a multiple of 4 bytes.
//!
//! A [schema::Schema] is compiled once from command definitions and then shared
//! read-only. It packs arguments with [codec::Codec], decodes wire bytes, and drives
//! [codegen], which emits equivalent statically-typed Rust.
//!
//! ## Example
//!
//! ```
//! use evecraft::schema::builtin;
//! use evecraft::value::Value;
//!
//! let schema = builtin();
//! let bytes = schema.encode("TAG", &[Value::Int(200)]).unwrap();
//! assert_eq!(bytes, [0xc8, 0x00, 0x00, 0x03]);
//!
//! let decoded = schema.decode(&bytes).unwrap();
//! assert_eq!(decoded.command.name(), "TAG");
//! assert_eq!(decoded.args, vec![Value::Int(200)]);
//! ```

pub mod bits;
pub mod codec;
pub mod codegen;
pub mod command;
pub mod dispatch;
pub mod errors;
pub mod field;
pub mod layout;
pub mod memory;
pub mod options;
pub mod schema;
#[cfg(feature = "serde")]
pub mod serde;
pub mod stream;
pub mod tables;
pub mod transform;
pub mod types;
pub mod value;
