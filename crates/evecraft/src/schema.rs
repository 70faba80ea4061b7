//! Schema: the compiled, immutable command set.
//!
//! Use [Schema::compile] to resolve a list of [CommandDef]s, then [Schema::decode] or
//! [Schema::decode_stream] to turn wire bytes back into commands and
//! [Schema::encode] to pack a command by name. [builtin] holds the process-wide
//! instance built from the tables in [crate::tables].

use std::{collections::HashMap, sync::OnceLock};

use log::debug;

use crate::{
    bits::read_u32_le,
    codec::Codec,
    command::{Command, CommandDef, Family},
    dispatch::classify,
    errors::{ReadError, SchemaError, WriteError},
    layout::resolve,
    tables,
    value::Value,
};

/// A compiled command set indexed by `(family, opcode)` and by name.
#[derive(Debug, Clone)]
pub struct Schema {
    /// Resolved commands in definition order.
    commands: Vec<Command>,
    by_code: HashMap<(Family, u8), usize>,
    by_name: HashMap<(Family, String), usize>,
}

/// One command decoded from the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<'s> {
    pub command: &'s Command,
    /// Field values in declaration order.
    pub args: Vec<Value>,
    /// Bytes consumed, padding included.
    pub consumed: usize,
}

impl Schema {
    /// Resolves every definition and builds the lookup indexes.
    ///
    /// Fails on the first layout error, or when an opcode or name repeats within a family.
    pub fn compile(defs: &[CommandDef]) -> Result<Self, SchemaError> {
        let mut commands: Vec<Command> = Vec::with_capacity(defs.len());
        let mut by_code: HashMap<(Family, u8), usize> = HashMap::with_capacity(defs.len());
        let mut by_name: HashMap<(Family, String), usize> = HashMap::with_capacity(defs.len());

        for def in defs {
            let command = resolve(def)?;
            let family = command.family();
            let index = commands.len();

            if let Some(&first) = by_code.get(&(family, command.code())) {
                let first = &commands[first];
                return Err(SchemaError::DuplicateOpcode {
                    family,
                    code: command.code(),
                    first: first.name().to_string(),
                    second: command.name().to_string(),
                });
            }
            if by_name.contains_key(&(family, command.name().to_string())) {
                return Err(SchemaError::DuplicateName {
                    family,
                    name: command.name().to_string(),
                });
            }

            by_code.insert((family, command.code()), index);
            by_name.insert((family, command.name().to_string()), index);
            commands.push(command);
        }

        let schema = Schema {
            commands,
            by_code,
            by_name,
        };
        debug!(
            "compiled schema: {} display-list, {} coprocessor commands",
            schema.display_list().count(),
            schema.coprocessor().count()
        );
        Ok(schema)
    }

    /// Compiles the built-in tables.
    pub fn standard() -> Result<Self, SchemaError> {
        Self::compile(&tables::all_commands())
    }

    /// Every command, in definition order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn display_list(&self) -> impl Iterator<Item = &Command> {
        self.commands
            .iter()
            .filter(|cmd| cmd.family() == Family::DisplayList)
    }

    pub fn coprocessor(&self) -> impl Iterator<Item = &Command> {
        self.commands
            .iter()
            .filter(|cmd| cmd.family() == Family::Coprocessor)
    }

    /// Looks up a command by family and table opcode.
    pub fn get(&self, family: Family, code: u8) -> Option<&Command> {
        self.by_code
            .get(&(family, code))
            .map(|&index| &self.commands[index])
    }

    /// Looks up a command by family and name.
    pub fn by_name(&self, family: Family, name: &str) -> Option<&Command> {
        self.by_name
            .get(&(family, name.to_string()))
            .map(|&index| &self.commands[index])
    }

    /// Looks up a command by name in either family.
    ///
    /// A `CMD_` prefix selects the coprocessor family; otherwise display-list commands
    /// are searched first.
    pub fn find(&self, name: &str) -> Option<&Command> {
        if let Some(name) = name.strip_prefix("CMD_") {
            return self.by_name(Family::Coprocessor, name);
        }

        self.by_name(Family::DisplayList, name)
            .or_else(|| self.by_name(Family::Coprocessor, name))
    }

    /// Finds the command a raw command word belongs to.
    pub fn dispatch(&self, word: u32) -> Result<&Command, ReadError> {
        let (family, code) = classify(word);
        self.get(family, code)
            .ok_or(ReadError::UnknownOpcode { family, code })
    }

    /// Decodes the command at the start of `data`.
    pub fn decode<'s>(&'s self, data: &[u8]) -> Result<Decoded<'s>, ReadError> {
        let word = read_u32_le(data, 0).ok_or_else(|| ReadError::Truncated {
            command: "command word".to_string(),
            needed: 4,
            available: data.len(),
        })?;

        let command = self.dispatch(word)?;
        let (args, consumed) = command.unpack(data)?;
        Ok(Decoded {
            command,
            args,
            consumed,
        })
    }

    /// Decodes back-to-back commands until `data` is exhausted.
    ///
    /// The iterator yields the first error it meets and then stops.
    pub fn decode_stream<'s, 'd>(&'s self, data: &'d [u8]) -> DecodeStream<'s, 'd> {
        DecodeStream {
            schema: self,
            data,
            offset: 0,
            failed: false,
        }
    }

    /// Packs the named command (see [Schema::find]) into its wire bytes.
    pub fn encode(&self, name: &str, args: &[Value]) -> Result<Vec<u8>, WriteError> {
        self.find(name)
            .ok_or_else(|| WriteError::UnknownCommand(name.to_string()))?
            .pack(args)
    }
}

/// Iterator returned by [Schema::decode_stream].
#[derive(Debug)]
pub struct DecodeStream<'s, 'd> {
    schema: &'s Schema,
    data: &'d [u8],
    offset: usize,
    failed: bool,
}

impl DecodeStream<'_, '_> {
    /// Byte offset of the next command.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<'s> Iterator for DecodeStream<'s, '_> {
    type Item = Result<Decoded<'s>, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.data.len() {
            return None;
        }

        match self.schema.decode(&self.data[self.offset..]) {
            Ok(decoded) => {
                self.offset += decoded.consumed;
                Some(Ok(decoded))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

impl std::iter::FusedIterator for DecodeStream<'_, '_> {}

static BUILTIN: OnceLock<Schema> = OnceLock::new();

/// The process-wide schema compiled from the built-in tables.
///
/// # Panics
///
/// If the built-in tables fail to compile.
pub fn builtin() -> &'static Schema {
    BUILTIN.get_or_init(|| match Schema::standard() {
        Ok(schema) => schema,
        Err(err) => panic!("built-in command tables are invalid: {err}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{field::Field, types::UINT32};

    #[test]
    fn test_builtin_compiles() {
        let schema = builtin();
        assert_eq!(schema.display_list().count(), 48);
        assert_eq!(schema.coprocessor().count(), 57);
        assert_eq!(schema.len(), 105);
    }

    #[test]
    fn test_schema_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Schema>();
        assert_send_sync::<Command>();
    }

    #[test]
    fn test_lookup() {
        let schema = builtin();
        assert_eq!(schema.get(Family::DisplayList, 0x03).unwrap().name(), "TAG");
        assert_eq!(schema.get(Family::Coprocessor, 0x0c).unwrap().name(), "TEXT");
        assert!(schema.get(Family::Coprocessor, 0x03).is_none());
        assert_eq!(schema.find("CMD_TEXT").unwrap().code(), 0x0c);
        assert_eq!(schema.find("VERTEX2II").unwrap().code(), 0x80);
        assert!(schema.find("NOPE").is_none());
    }

    #[test]
    fn test_dispatch() {
        let schema = builtin();
        assert_eq!(schema.dispatch(0x4002_8007).unwrap().name(), "VERTEX2F");
        assert_eq!(schema.dispatch(0x8000_0000).unwrap().name(), "VERTEX2II");
        assert_eq!(schema.dispatch(0xffff_ff09).unwrap().name(), "BGCOLOR");
        assert_eq!(
            schema.dispatch(0xc000_0000),
            Err(ReadError::UnknownOpcode {
                family: Family::DisplayList,
                code: 0xc0
            })
        );
        assert_eq!(
            schema.dispatch(0xffff_ff35),
            Err(ReadError::UnknownOpcode {
                family: Family::Coprocessor,
                code: 0x35
            })
        );
    }

    #[test]
    fn test_encode_decode() {
        let schema = builtin();
        let bytes = schema
            .encode(
                "TEXT",
                &[
                    Value::from(10),
                    Value::from(20),
                    Value::from(31),
                    Value::from(0),
                    Value::from("Hi"),
                ],
            )
            .unwrap();
        let decoded = schema.decode(&bytes).unwrap();
        assert_eq!(decoded.command.name(), "TEXT");
        assert_eq!(decoded.consumed, 16);
        assert_eq!(decoded.args[4], Value::from("Hi"));

        assert_eq!(
            schema.encode("FOO", &[]),
            Err(WriteError::UnknownCommand("FOO".to_string()))
        );
    }

    #[test]
    fn test_decode_stream() {
        let schema = builtin();
        let mut data = Vec::new();
        data.extend(schema.encode("CMD_DLSTART", &[]).unwrap());
        data.extend(schema.encode("CLEAR", &[1.into(), 1.into(), 1.into()]).unwrap());
        data.extend(
            schema
                .encode("BUTTON", &[
                    0.into(),
                    0.into(),
                    100.into(),
                    40.into(),
                    28.into(),
                    0.into(),
                    "Press".into(),
                ])
                .unwrap(),
        );
        data.extend(schema.encode("DISPLAY", &[]).unwrap());
        data.extend(schema.encode("SWAP", &[]).unwrap());

        let decoded: Vec<_> = schema.decode_stream(&data).collect::<Result<_, _>>().unwrap();
        let names: Vec<_> = decoded.iter().map(|d| d.command.name()).collect();
        assert_eq!(names, vec!["DLSTART", "CLEAR", "BUTTON", "DISPLAY", "SWAP"]);
        assert_eq!(decoded.iter().map(|d| d.consumed).sum::<usize>(), data.len());
    }

    #[test]
    fn test_decode_stream_stops_on_error() {
        let schema = builtin();
        let mut data = schema.encode("CMD_SWAP", &[]).unwrap();
        data.extend(0xffff_ff35u32.to_le_bytes());
        data.extend(schema.encode("CMD_SWAP", &[]).unwrap());

        let mut stream = schema.decode_stream(&data);
        assert!(stream.next().unwrap().is_ok());
        assert!(matches!(
            stream.next(),
            Some(Err(ReadError::UnknownOpcode { code: 0x35, .. }))
        ));
        assert!(stream.next().is_none());
        assert_eq!(stream.offset(), 4);
    }

    #[test]
    fn test_decode_short_input() {
        assert!(matches!(
            builtin().decode(&[0x00, 0x00]),
            Err(ReadError::Truncated { needed: 4, .. })
        ));
    }

    #[test]
    fn test_duplicate_opcode() {
        let defs = [
            CommandDef::coprocessor(0x02, "INTERRUPT", "Interrupt").field(Field::new("ms", UINT32)),
            CommandDef::coprocessor(0x02, "OTHER", "Other"),
        ];
        assert_eq!(
            Schema::compile(&defs).unwrap_err(),
            SchemaError::DuplicateOpcode {
                family: Family::Coprocessor,
                code: 0x02,
                first: "INTERRUPT".to_string(),
                second: "OTHER".to_string(),
            }
        );
    }

    #[test]
    fn test_same_opcode_in_both_families() {
        let defs = [
            CommandDef::display_list(0x09, "ALPHA_FUNC", "Alpha"),
            CommandDef::coprocessor(0x09, "BGCOLOR", "Background"),
        ];
        let schema = Schema::compile(&defs).unwrap();
        assert_eq!(schema.get(Family::DisplayList, 0x09).unwrap().name(), "ALPHA_FUNC");
        assert_eq!(schema.get(Family::Coprocessor, 0x09).unwrap().name(), "BGCOLOR");
    }

    #[test]
    fn test_duplicate_name() {
        let defs = [
            CommandDef::display_list(0x22, "SAVE", "Save"),
            CommandDef::display_list(0x23, "SAVE", "Save again"),
        ];
        assert!(matches!(
            Schema::compile(&defs),
            Err(SchemaError::DuplicateName { .. })
        ));
    }

    #[test]
    fn test_concurrent_use() {
        let schema = builtin();
        std::thread::scope(|scope| {
            for tag in 0..8i64 {
                scope.spawn(move || {
                    let bytes = schema.encode("TAG", &[Value::Int(tag)]).unwrap();
                    assert_eq!(schema.decode(&bytes).unwrap().args, vec![Value::Int(tag)]);
                });
            }
        });
    }
}
