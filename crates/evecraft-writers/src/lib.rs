//! # evecraft-writers
//!
//! Statically-typed command writers generated at build time from the built-in
//! `evecraft` schema.
//!
//! Every display-list command has a word type (`ColorRgb`, `Vertex2f`, ...) and every
//! coprocessor command a fixed-layout record (`CmdText`, `CmdMemwrite`, ...). The
//! writer methods on [CommandBuffer] append them; display-list writers take their
//! arguments most significant field first, coprocessor writers in wire order with a
//! trailing string or block last.
//!
//! ```
//! use evecraft_writers::CommandBuffer;
//!
//! let mut buf = CommandBuffer::new();
//! buf.cmd_dlstart();
//! buf.clear(true, true, true);
//! buf.cmd_text(10, 20, 31, 0, "Hi");
//! buf.display();
//! buf.cmd_swap();
//! assert_eq!(buf.len(), 4 + 4 + 16 + 4 + 4);
//! ```

mod generated {
    use crate::CommandBuffer;

    include!(concat!(env!("OUT_DIR"), "/commands.rs"));
}

pub use generated::*;

/// Growable byte buffer the generated writers append to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandBuffer {
    bytes: Vec<u8>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        CommandBuffer {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Appends raw bytes.
    pub fn write(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Appends a string, its NUL terminator, and zero padding to a 4-byte boundary.
    pub fn write_str(&mut self, s: &str) {
        debug_assert!(!s.as_bytes().contains(&0), "string contains a NUL byte");
        self.bytes.extend_from_slice(s.as_bytes());
        self.bytes.push(0);
        self.align();
    }

    /// Appends a byte block and zero padding to a 4-byte boundary.
    pub fn write_block(&mut self, data: &[u8]) {
        self.bytes.extend_from_slice(data);
        self.align();
    }

    /// Pads with zeros to a 4-byte boundary.
    pub fn align(&mut self) {
        let len = self.bytes.len().next_multiple_of(4);
        self.bytes.resize(len, 0);
    }

    /// Drops everything written so far.
    pub fn reset(&mut self) {
        self.bytes.clear();
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
