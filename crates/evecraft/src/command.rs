//! Command descriptors: unresolved definitions ([CommandDef]) as authored in the tables,
//! and resolved commands ([Command]) produced by the layout resolver.

use std::{borrow::Cow, fmt};

use crate::field::Field;

/// Opcode family. Opcodes are unique within a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    /// Word-packed display-list commands.
    DisplayList,
    /// Byte-laid-out coprocessor commands.
    Coprocessor,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::DisplayList => f.write_str("display-list"),
            Family::Coprocessor => f.write_str("coprocessor"),
        }
    }
}

/// Classification of a command definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Word-packed display-list command.
    DisplayList,
    /// Byte-laid-out coprocessor command.
    Coprocessor,
    /// Coprocessor command drawing a widget. Same layout rules as [CommandKind::Coprocessor].
    Widget,
}

impl CommandKind {
    pub fn family(self) -> Family {
        match self {
            CommandKind::DisplayList => Family::DisplayList,
            CommandKind::Coprocessor | CommandKind::Widget => Family::Coprocessor,
        }
    }
}

/// A command as authored: opcode, name, description and ordered fields.
///
/// Compile a list of these with [crate::schema::Schema::compile].
#[derive(Debug, Clone, PartialEq)]
pub struct CommandDef {
    pub code: u8,
    pub name: Cow<'static, str>,
    pub description: Option<Cow<'static, str>>,
    pub kind: CommandKind,
    pub fields: Vec<Field>,
}

impl CommandDef {
    pub fn new(
        kind: CommandKind,
        code: u8,
        name: impl Into<Cow<'static, str>>,
        description: impl Into<Cow<'static, str>>,
    ) -> Self {
        CommandDef {
            code,
            name: name.into(),
            description: Some(description.into()),
            kind,
            fields: Vec::new(),
        }
    }

    /// Display-list command.
    pub fn display_list(
        code: u8,
        name: impl Into<Cow<'static, str>>,
        description: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::new(CommandKind::DisplayList, code, name, description)
    }

    /// Coprocessor command.
    pub fn coprocessor(
        code: u8,
        name: impl Into<Cow<'static, str>>,
        description: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::new(CommandKind::Coprocessor, code, name, description)
    }

    /// Coprocessor widget command.
    pub fn widget(
        code: u8,
        name: impl Into<Cow<'static, str>>,
        description: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::new(CommandKind::Widget, code, name, description)
    }

    /// Appends a field.
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn family(&self) -> Family {
        self.kind.family()
    }
}

/// Placement of a display-list opcode in the command word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    /// Opcode as listed in the tables (e.g. `0x40`).
    pub code: u8,
    /// Value actually stored in the top bits (e.g. `1` for `0x40`).
    pub stored: u8,
    /// Number of top bits taken by the opcode: 8, or 2 for the short opcodes.
    pub bits: u32,
}

impl Opcode {
    /// Opcode already shifted into its position in the command word.
    pub fn word_bits(&self) -> u32 {
        u32::from(self.stored) << (32 - self.bits)
    }

    /// True when the top bits of `word` hold this opcode.
    pub fn matches(&self, word: u32) -> bool {
        word >> (32 - self.bits) == u32::from(self.stored)
    }

    /// Bits left for fields.
    pub fn available_bits(&self) -> u32 {
        32 - self.bits
    }
}

/// Resolved display-list command: every field and the opcode share one 32-bit word.
#[derive(Debug, Clone, PartialEq)]
pub struct WordCommand {
    pub name: Cow<'static, str>,
    pub description: Cow<'static, str>,
    pub opcode: Opcode,
    /// Fields in declaration order; the first occupies the lowest bits.
    pub fields: Vec<Field>,
}

impl WordCommand {
    /// Fields paired with their bit shift within the word.
    pub fn bit_layout(&self) -> impl Iterator<Item = (&Field, u32)> {
        self.fields.iter().scan(0u32, |shift, field| {
            let at = *shift;
            *shift += field.bitcount();
            Some((field, at))
        })
    }

    /// Total width of all fields.
    pub fn field_bits(&self) -> u32 {
        self.fields.iter().map(Field::bitcount).sum()
    }
}

/// How the length of a variable-length tail is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailLength {
    /// String running up to a NUL byte.
    NulTerminated,
    /// Block whose byte count is the value of the head field at `index`.
    Governed { index: usize },
    /// Block running to the end of the input.
    ToEnd,
}

/// Trailing variable-length field of a coprocessor command.
#[derive(Debug, Clone, PartialEq)]
pub struct Tail {
    /// The field, with its resolved offset.
    pub field: Field,
    pub length: TailLength,
}

impl Tail {
    pub fn offset(&self) -> usize {
        self.field.offset.unwrap_or_default()
    }
}

/// Resolved coprocessor command: a 4-byte opcode word, fixed-width fields at resolved
/// offsets and an optional variable-length tail.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockCommand {
    pub code: u8,
    pub name: Cow<'static, str>,
    pub description: Cow<'static, str>,
    pub widget: bool,
    /// Fixed-width fields, each with a resolved offset.
    pub head: Vec<Field>,
    pub tail: Option<Tail>,
    /// Size in bytes of the opcode word and head, padded to a multiple of 4.
    pub size: usize,
}

impl BlockCommand {
    /// The opcode word as it appears on the wire (before little-endian encoding).
    pub fn command_word(&self) -> u32 {
        0xffff_ff00 | u32::from(self.code)
    }

    /// All fields in declaration order, tail last.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.head.iter().chain(self.tail.as_ref().map(|tail| &tail.field))
    }
}

/// A resolved command of either family.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Word(WordCommand),
    Block(BlockCommand),
}

impl Command {
    pub fn name(&self) -> &str {
        match self {
            Command::Word(cmd) => &cmd.name,
            Command::Block(cmd) => &cmd.name,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Command::Word(cmd) => &cmd.description,
            Command::Block(cmd) => &cmd.description,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Command::Word(cmd) => cmd.opcode.code,
            Command::Block(cmd) => cmd.code,
        }
    }

    pub fn family(&self) -> Family {
        match self {
            Command::Word(_) => Family::DisplayList,
            Command::Block(_) => Family::Coprocessor,
        }
    }

    pub fn is_widget(&self) -> bool {
        matches!(self, Command::Block(cmd) if cmd.widget)
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> Box<dyn Iterator<Item = &Field> + '_> {
        match self {
            Command::Word(cmd) => Box::new(cmd.fields.iter()),
            Command::Block(cmd) => Box::new(cmd.fields()),
        }
    }

    pub fn field_count(&self) -> usize {
        match self {
            Command::Word(cmd) => cmd.fields.len(),
            Command::Block(cmd) => cmd.head.len() + usize::from(cmd.tail.is_some()),
        }
    }

    /// Fixed packed size: always 4 for display-list commands, the head size for coprocessor commands.
    pub fn size(&self) -> usize {
        match self {
            Command::Word(_) => 4,
            Command::Block(cmd) => cmd.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CSTRING, INT16, UINT32};

    #[test]
    fn test_short_opcode_word_bits() {
        let opcode = Opcode {
            code: 0x40,
            stored: 1,
            bits: 2,
        };
        assert_eq!(opcode.word_bits(), 0x4000_0000);
        assert_eq!(opcode.available_bits(), 30);

        let opcode = Opcode {
            code: 0x03,
            stored: 0x03,
            bits: 8,
        };
        assert_eq!(opcode.word_bits(), 0x0300_0000);
    }

    #[test]
    fn test_bit_layout() {
        let cmd = WordCommand {
            name: "VERTEX2F".into(),
            description: "".into(),
            opcode: Opcode {
                code: 0x40,
                stored: 1,
                bits: 2,
            },
            fields: vec![
                Field::new("y", UINT32).stored_bits(15),
                Field::new("x", UINT32).stored_bits(15),
            ],
        };
        let layout: Vec<_> = cmd
            .bit_layout()
            .map(|(field, shift)| (field.name.as_ref(), shift))
            .collect();
        assert_eq!(layout, vec![("y", 0), ("x", 15)]);
        assert_eq!(cmd.field_bits(), 30);
    }

    #[test]
    fn test_command_def_builder() {
        let def = CommandDef::widget(0x0c, "TEXT", "Draw text")
            .field(Field::new("x", INT16))
            .field(Field::new("s", CSTRING));
        assert_eq!(def.family(), Family::Coprocessor);
        assert_eq!(def.fields.len(), 2);
        assert_eq!(def.description.as_deref(), Some("Draw text"));
    }

    #[test]
    fn test_family_display() {
        assert_eq!(Family::DisplayList.to_string(), "display-list");
        assert_eq!(Family::Coprocessor.to_string(), "coprocessor");
    }
}
