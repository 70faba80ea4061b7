//! Pack and unpack for both command families.
//!
//! [Codec] is the shared contract of [WordCommand](crate::command::WordCommand),
//! [BlockCommand](crate::command::BlockCommand) and [Command]. Arguments are always given
//! and returned in field declaration order.

mod block;
mod word;

use crate::{
    command::Command,
    errors::{ReadError, WriteError},
    value::Value,
};

pub trait Codec {
    /// Appends the wire bytes for `args` to `out`.
    ///
    /// On error `out` is left as it was.
    fn pack_into(&self, args: &[Value], out: &mut Vec<u8>) -> Result<(), WriteError>;

    /// Decodes one command from the start of `data`.
    ///
    /// Returns the field values and the number of bytes consumed, padding included.
    fn unpack(&self, data: &[u8]) -> Result<(Vec<Value>, usize), ReadError>;

    /// Returns the wire bytes for `args`.
    fn pack(&self, args: &[Value]) -> Result<Vec<u8>, WriteError> {
        let mut out = Vec::new();
        self.pack_into(args, &mut out)?;
        Ok(out)
    }
}

impl Codec for Command {
    fn pack_into(&self, args: &[Value], out: &mut Vec<u8>) -> Result<(), WriteError> {
        match self {
            Command::Word(cmd) => cmd.pack_into(args, out),
            Command::Block(cmd) => cmd.pack_into(args, out),
        }
    }

    fn unpack(&self, data: &[u8]) -> Result<(Vec<Value>, usize), ReadError> {
        match self {
            Command::Word(cmd) => cmd.unpack(data),
            Command::Block(cmd) => cmd.unpack(data),
        }
    }
}

fn check_arg_count(command: &str, expected: usize, args: &[Value]) -> Result<(), WriteError> {
    if args.len() != expected {
        return Err(WriteError::ArgumentCount {
            command: command.to_string(),
            expected,
            found: args.len(),
        });
    }

    Ok(())
}
