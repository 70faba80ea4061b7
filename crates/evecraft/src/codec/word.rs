//! Display-list codec: all fields and the opcode share one little-endian 32-bit word.
//!
//! The first declared field sits in the lowest bits, each following field directly above
//! it. Unused bits lie between the last field and the opcode, which takes the top 8 bits
//! (or the top 2 for the short opcodes).

use log::trace;

use super::{Codec, check_arg_count};
use crate::{
    bits::{mask, read_u32_le, sign_extend},
    command::WordCommand,
    errors::{ReadError, WriteError},
    transform::{from_raw, to_raw},
    value::Value,
};

impl Codec for WordCommand {
    fn pack_into(&self, args: &[Value], out: &mut Vec<u8>) -> Result<(), WriteError> {
        check_arg_count(&self.name, self.fields.len(), args)?;

        let mut word = 0u32;
        for (field, arg) in self.fields.iter().zip(args).rev() {
            let raw = to_raw(&self.name, field, arg)?;
            let bits = field.bitcount();
            word = word.checked_shl(bits).unwrap_or(0) | (raw as u32 & mask(bits));
        }
        word |= self.opcode.word_bits();

        out.extend_from_slice(&word.to_le_bytes());
        Ok(())
    }

    fn unpack(&self, data: &[u8]) -> Result<(Vec<Value>, usize), ReadError> {
        let word = read_u32_le(data, 0).ok_or_else(|| ReadError::Truncated {
            command: self.name.to_string(),
            needed: 4,
            available: data.len(),
        })?;
        if !self.opcode.matches(word) {
            return Err(ReadError::OpcodeMismatch {
                command: self.name.to_string(),
                word,
            });
        }

        let mut args = Vec::with_capacity(self.fields.len());
        for (field, shift) in self.bit_layout() {
            let bits = field.bitcount();
            let raw = u64::from((word >> shift) & mask(bits));
            let raw = if field.ty.signed {
                sign_extend(raw, bits)
            } else {
                raw as i64
            };
            args.push(from_raw(field, raw));
        }

        trace!("unpacked {} from {word:#010x}", self.name);
        Ok((args, 4))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        codec::Codec,
        command::{Command, CommandDef},
        errors::{ReadError, WriteError},
        field::Field,
        layout::resolve,
        types::{CELL, COLOR_CHANNEL, FIXED8_8, HANDLE, TAG, UINT32},
        value::Value,
    };

    fn word(def: CommandDef) -> Command {
        resolve(&def).unwrap()
    }

    #[test]
    fn test_tag() {
        let cmd = word(CommandDef::display_list(0x03, "TAG", "Tag").field(Field::new("tag", TAG)));
        let bytes = cmd.pack(&[Value::Int(200)]).unwrap();
        assert_eq!(bytes, vec![0xc8, 0x00, 0x00, 0x03]);
        assert_eq!(cmd.unpack(&bytes).unwrap(), (vec![Value::Int(200)], 4));
    }

    #[test]
    fn test_first_field_lowest() {
        let cmd = word(
            CommandDef::display_list(0x04, "COLOR_RGB", "Color")
                .field(Field::new("blue", COLOR_CHANNEL))
                .field(Field::new("green", COLOR_CHANNEL))
                .field(Field::new("red", COLOR_CHANNEL)),
        );
        let bytes = cmd
            .pack(&[Value::Int(0x33), Value::Int(0x22), Value::Int(0x11)])
            .unwrap();
        assert_eq!(bytes, vec![0x33, 0x22, 0x11, 0x04]);
    }

    #[test]
    fn test_short_opcode() {
        let cmd = word(
            CommandDef::display_list(0x40, "VERTEX", "Vertex")
                .field(Field::new("x", UINT32).stored_bits(15))
                .field(Field::new("y", UINT32).stored_bits(15)),
        );
        let bytes = cmd.pack(&[Value::Int(5), Value::Int(7)]).unwrap();
        assert_eq!(bytes, vec![0x05, 0x80, 0x03, 0x40]);
        assert_eq!(
            cmd.unpack(&bytes).unwrap(),
            (vec![Value::Int(5), Value::Int(7)], 4)
        );
    }

    #[test]
    fn test_vertex2ii() {
        let cmd = word(
            CommandDef::display_list(0x80, "VERTEX2II", "Vertex")
                .field(Field::new("cell", CELL))
                .field(Field::new("handle", HANDLE))
                .field(Field::new("y", UINT32).stored_bits(9))
                .field(Field::new("x", UINT32).stored_bits(9)),
        );
        let args = [Value::Int(3), Value::Int(31), Value::Int(511), Value::Int(1)];
        let bytes = cmd.pack(&args).unwrap();
        let expected: u32 = 0x8000_0000 | (1 << 21) | (511 << 12) | (31 << 7) | 3;
        assert_eq!(bytes, expected.to_le_bytes().to_vec());
        assert_eq!(cmd.unpack(&bytes).unwrap(), (args.to_vec(), 4));
    }

    #[test]
    fn test_range_boundary() {
        let cmd = word(
            CommandDef::display_list(0x0d, "POINT_SIZE", "Point size")
                .field(Field::new("size", UINT32).stored_bits(13)),
        );
        assert!(cmd.pack(&[Value::Int((1 << 13) - 1)]).is_ok());
        assert!(matches!(
            cmd.pack(&[Value::Int(1 << 13)]),
            Err(WriteError::OutOfRange { bits: 13, .. })
        ));
    }

    #[test]
    fn test_signed_fixed_field() {
        let cmd = word(
            CommandDef::display_list(0x15, "BITMAP_TRANSFORM_A", "A")
                .field(Field::new("a", FIXED8_8)),
        );
        let bytes = cmd.pack(&[Value::Fixed(-1.0)]).unwrap();
        // -256 in 17 bits
        assert_eq!(bytes, vec![0x00, 0xff, 0x01, 0x15]);
        assert_eq!(cmd.unpack(&bytes).unwrap(), (vec![Value::Fixed(-1.0)], 4));
    }

    #[test]
    fn test_argument_count() {
        let cmd = word(CommandDef::display_list(0x03, "TAG", "Tag").field(Field::new("tag", TAG)));
        assert!(matches!(
            cmd.pack(&[]),
            Err(WriteError::ArgumentCount {
                expected: 1,
                found: 0,
                ..
            })
        ));
    }

    #[test]
    fn test_failed_pack_leaves_buffer() {
        let cmd = word(CommandDef::display_list(0x03, "TAG", "Tag").field(Field::new("tag", TAG)));
        let mut out = vec![1, 2, 3, 4];
        assert!(cmd.pack_into(&[Value::Int(999)], &mut out).is_err());
        assert_eq!(out, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_unpack_short_buffer() {
        let cmd = word(CommandDef::display_list(0x03, "TAG", "Tag").field(Field::new("tag", TAG)));
        assert_eq!(
            cmd.unpack(&[0xc8, 0x00]),
            Err(ReadError::Truncated {
                command: "TAG".to_string(),
                needed: 4,
                available: 2,
            })
        );
    }

    #[test]
    fn test_unpack_rejects_other_opcode() {
        let tag = word(CommandDef::display_list(0x03, "TAG", "Tag").field(Field::new("tag", TAG)));
        assert_eq!(
            tag.unpack(&[0x33, 0x22, 0x11, 0x04]),
            Err(ReadError::OpcodeMismatch {
                command: "TAG".to_string(),
                word: 0x0411_2233,
            })
        );

        let vertex = word(
            CommandDef::display_list(0x40, "VERTEX", "Vertex")
                .field(Field::new("x", UINT32).stored_bits(15))
                .field(Field::new("y", UINT32).stored_bits(15)),
        );
        assert!(vertex.unpack(&0x4000_0000u32.to_le_bytes()).is_ok());
        assert!(matches!(
            vertex.unpack(&0x8000_0000u32.to_le_bytes()),
            Err(ReadError::OpcodeMismatch { .. })
        ));
    }
}
