//! Error types for schema compilation, packing and unpacking.

use thiserror::Error;

use crate::command::Family;

/// Errors produced while compiling command definitions into a [crate::schema::Schema].
///
/// These are fatal: a schema that fails to compile is never used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Command has no description.
    #[error("command {command} has no description")]
    MissingDescription { command: String },
    /// A variable-length field is followed by another field.
    #[error("command {command}: variable-length field `{field}` must be the last field")]
    MisplacedVariableField { command: String, field: String },
    /// Display-list commands cannot carry variable-length fields.
    #[error("command {command}: variable-length field `{field}` in a display-list command")]
    VariableFieldInWord { command: String, field: String },
    /// Field width is zero or wider than a command word.
    #[error("command {command}: field `{field}` has invalid width of {bits} bits")]
    InvalidFieldWidth {
        command: String,
        field: String,
        bits: u32,
    },
    /// Display-list fields do not fit next to the opcode.
    #[error("command {command}: fields use {bits} bits but only {available} are available")]
    WordOverflow {
        command: String,
        bits: u32,
        available: u32,
    },
    /// Opcode uses the reserved top bits but is not one of the short opcodes.
    #[error("command {command}: opcode {code:#04x} is not a valid display-list opcode")]
    InvalidOpcode { command: String, code: u8 },
    /// Field offset breaks the alignment rules.
    #[error("command {command}: field `{field}` at offset {offset} is not aligned to {size} bytes")]
    Misaligned {
        command: String,
        field: String,
        offset: usize,
        size: usize,
    },
    /// Block refers to a length field that does not exist, is not an integer,
    /// or does not precede it.
    #[error("command {command}: block `{field}` has invalid length field `{length_field}`")]
    InvalidLengthField {
        command: String,
        field: String,
        length_field: String,
    },
    /// Two fields of one command share a name.
    #[error("command {command}: duplicate field `{field}`")]
    DuplicateField { command: String, field: String },
    /// Two commands of one family share an opcode.
    #[error("duplicate {family} opcode {code:#04x} ({first} and {second})")]
    DuplicateOpcode {
        family: Family,
        code: u8,
        first: String,
        second: String,
    },
    /// Two commands of one family share a name.
    #[error("duplicate {family} command name {name}")]
    DuplicateName { family: Family, name: String },
    /// Type name not present in the type registry.
    #[error("unknown type `{0}`")]
    UnknownType(String),
}

/// Errors produced when packing arguments into wire bytes.
///
/// The schema is never affected; the caller may retry with corrected values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WriteError {
    /// Number of arguments differs from the number of fields.
    #[error("command {command} takes {expected} arguments, got {found}")]
    ArgumentCount {
        command: String,
        expected: usize,
        found: usize,
    },
    /// Argument kind does not suit the field type (e.g. a string for an integer field).
    #[error("command {command}: field `{field}` expects {expected}")]
    TypeMismatch {
        command: String,
        field: String,
        expected: &'static str,
    },
    /// Value does not fit the field's bit width.
    #[error("command {command}: value {value} does not fit {bits}-bit field `{field}`")]
    OutOfRange {
        command: String,
        field: String,
        value: i64,
        bits: u32,
    },
    /// Fixed-point value is NaN or infinite.
    #[error("command {command}: field `{field}` got non-finite value {value}")]
    NonFinite {
        command: String,
        field: String,
        value: f64,
    },
    /// Block length disagrees with its governing field.
    #[error("command {command}: block `{field}` is {found} bytes but `{length_field}` says {expected}")]
    BlockLengthMismatch {
        command: String,
        field: String,
        length_field: String,
        expected: i64,
        found: usize,
    },
    /// String argument contains a NUL byte and could not be decoded back.
    #[error("command {command}: string field `{field}` contains a NUL byte")]
    EmbeddedNul { command: String, field: String },
    /// No command with this name.
    #[error("unknown command {0}")]
    UnknownCommand(String),
}

/// Errors produced when unpacking wire bytes or dispatching on an opcode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    /// No command descriptor matches the opcode.
    #[error("unknown {family} opcode {code:#04x}")]
    UnknownOpcode { family: Family, code: u8 },
    /// The command word belongs to a different command.
    #[error("{command}: command word {word:#010x} has a different opcode")]
    OpcodeMismatch { command: String, word: u32 },
    /// Buffer ends before the fixed part of a command (or its padding).
    #[error("{command}: need {needed} bytes, only {available} available")]
    Truncated {
        command: String,
        needed: usize,
        available: usize,
    },
    /// String field has no terminating NUL inside the buffer.
    #[error("command {command}: string field `{field}` is not NUL-terminated")]
    UnterminatedString { command: String, field: String },
    /// Block declares more bytes than the buffer holds.
    #[error("command {command}: block `{field}` declares {length} bytes, only {available} available")]
    BlockOverrun {
        command: String,
        field: String,
        length: usize,
        available: usize,
    },
    /// String field is not valid UTF-8.
    #[error("command {command}: string field `{field}` is not valid UTF-8")]
    InvalidUtf8 { command: String, field: String },
}

impl ReadError {
    /// True for errors caused by a corrupt or truncated variable-length tail.
    pub fn is_malformed_tail(&self) -> bool {
        matches!(
            self,
            ReadError::UnterminatedString { .. }
                | ReadError::BlockOverrun { .. }
                | ReadError::InvalidUtf8 { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_command_and_field() {
        let err = WriteError::OutOfRange {
            command: "TAG".to_string(),
            field: "tag".to_string(),
            value: 256,
            bits: 8,
        };
        assert_eq!(
            err.to_string(),
            "command TAG: value 256 does not fit 8-bit field `tag`"
        );

        let err = ReadError::UnknownOpcode {
            family: Family::Coprocessor,
            code: 0x7f,
        };
        assert_eq!(err.to_string(), "unknown coprocessor opcode 0x7f");
    }

    #[test]
    fn test_malformed_tail_classification() {
        let unterminated = ReadError::UnterminatedString {
            command: "TEXT".to_string(),
            field: "s".to_string(),
        };
        let truncated = ReadError::Truncated {
            command: "TEXT".to_string(),
            needed: 16,
            available: 8,
        };
        assert!(unterminated.is_malformed_tail());
        assert!(!truncated.is_malformed_tail());
    }
}
