//! Coprocessor codec: a 4-byte opcode word `0xffffffxx`, little-endian fields at their
//! resolved offsets, an optional variable-length tail, zero padding to a multiple of 4.

use log::trace;

use super::{Codec, check_arg_count};
use crate::{
    bits::{align4, pad_to, read_u16_le, read_u32_le},
    command::{BlockCommand, TailLength},
    errors::{ReadError, WriteError},
    field::{Field, Storage},
    transform::{encode_string, expected_kind, from_raw, to_raw},
    value::Value,
};

impl Codec for BlockCommand {
    fn pack_into(&self, args: &[Value], out: &mut Vec<u8>) -> Result<(), WriteError> {
        let start = out.len();
        let result = self.write(args, out, start);

        if result.is_err() {
            out.truncate(start);
        }
        result
    }

    fn unpack(&self, data: &[u8]) -> Result<(Vec<Value>, usize), ReadError> {
        if data.len() < self.size {
            return Err(self.truncated(self.size, data.len()));
        }
        let word = read_u32_le(data, 0).unwrap_or_default();
        if word != self.command_word() {
            return Err(ReadError::OpcodeMismatch {
                command: self.name.to_string(),
                word,
            });
        }

        let mut args = Vec::with_capacity(self.head.len() + 1);
        let mut raws = Vec::with_capacity(self.head.len());
        for field in &self.head {
            let raw = read_raw(data, field).ok_or_else(|| self.truncated(self.size, data.len()))?;
            args.push(from_raw(field, raw));
            raws.push(raw);
        }

        let Some(tail) = &self.tail else {
            trace!("unpacked {} ({} bytes)", self.name, self.size);
            return Ok((args, self.size));
        };

        let offset = tail.offset();
        let rest = data.get(offset..).unwrap_or_default();
        let (value, len) = match tail.length {
            TailLength::NulTerminated => {
                let len = rest.iter().position(|b| *b == 0).ok_or_else(|| {
                    ReadError::UnterminatedString {
                        command: self.name.to_string(),
                        field: tail.field.name.to_string(),
                    }
                })?;
                let text = std::str::from_utf8(&rest[..len]).map_err(|_| ReadError::InvalidUtf8 {
                    command: self.name.to_string(),
                    field: tail.field.name.to_string(),
                })?;
                (Value::Str(text.to_string()), len + 1)
            }
            TailLength::Governed { index } => {
                let length = usize::try_from(raws[index]).unwrap_or(usize::MAX);
                if length > rest.len() {
                    return Err(ReadError::BlockOverrun {
                        command: self.name.to_string(),
                        field: tail.field.name.to_string(),
                        length,
                        available: rest.len(),
                    });
                }
                (Value::Bytes(rest[..length].to_vec()), length)
            }
            TailLength::ToEnd => {
                args.push(Value::Bytes(rest.to_vec()));
                trace!("unpacked {} ({} bytes)", self.name, data.len());
                return Ok((args, data.len()));
            }
        };

        let consumed = align4(offset + len);
        if consumed > data.len() {
            return Err(self.truncated(consumed, data.len()));
        }

        args.push(value);
        trace!("unpacked {} ({consumed} bytes)", self.name);
        Ok((args, consumed))
    }
}

impl BlockCommand {
    fn write(&self, args: &[Value], out: &mut Vec<u8>, start: usize) -> Result<(), WriteError> {
        let expected = self.head.len() + usize::from(self.tail.is_some());
        check_arg_count(&self.name, expected, args)?;

        out.extend_from_slice(&self.command_word().to_le_bytes());

        let (head_args, tail_args) = args.split_at(self.head.len());
        let mut raws = Vec::with_capacity(self.head.len());
        for (field, arg) in self.head.iter().zip(head_args) {
            let raw = to_raw(&self.name, field, arg)?;
            pad_to(out, start + field.offset.unwrap_or_default());
            write_raw(out, field, raw);
            raws.push(raw);
        }

        if let (Some(tail), Some(arg)) = (&self.tail, tail_args.first()) {
            pad_to(out, start + tail.offset());

            match tail.length {
                TailLength::NulTerminated => {
                    out.extend_from_slice(&encode_string(&self.name, &tail.field, arg)?);
                }
                TailLength::Governed { index } => {
                    let data = self.block_arg(&tail.field, arg)?;
                    if raws[index] != data.len() as i64 {
                        return Err(WriteError::BlockLengthMismatch {
                            command: self.name.to_string(),
                            field: tail.field.name.to_string(),
                            length_field: self.head[index].name.to_string(),
                            expected: raws[index],
                            found: data.len(),
                        });
                    }
                    out.extend_from_slice(data);
                }
                TailLength::ToEnd => {
                    out.extend_from_slice(self.block_arg(&tail.field, arg)?);
                }
            }
        }

        pad_to(out, start + align4(out.len() - start));
        Ok(())
    }

    fn block_arg<'a>(&self, field: &Field, arg: &'a Value) -> Result<&'a [u8], WriteError> {
        arg.as_bytes().ok_or_else(|| WriteError::TypeMismatch {
            command: self.name.to_string(),
            field: field.name.to_string(),
            expected: expected_kind(&field.ty.transform),
        })
    }

    fn truncated(&self, needed: usize, available: usize) -> ReadError {
        ReadError::Truncated {
            command: self.name.to_string(),
            needed,
            available,
        }
    }
}

fn write_raw(out: &mut Vec<u8>, field: &Field, raw: i64) {
    match field.storage() {
        Some(Storage::U16 | Storage::I16) => out.extend_from_slice(&(raw as u16).to_le_bytes()),
        Some(Storage::U32 | Storage::I32) => out.extend_from_slice(&(raw as u32).to_le_bytes()),
        None => {}
    }
}

fn read_raw(data: &[u8], field: &Field) -> Option<i64> {
    let offset = field.offset?;
    match field.storage()? {
        Storage::U16 => read_u16_le(data, offset).map(i64::from),
        Storage::I16 => read_u16_le(data, offset).map(|v| i64::from(v as i16)),
        Storage::U32 => read_u32_le(data, offset).map(i64::from),
        Storage::I32 => read_u32_le(data, offset).map(|v| i64::from(v as i32)),
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
        types::{
            ADDRESS, CSTRING, FIXED16_16, HANDLE, INT16, OPTIONS, RGB, TypeDef, UINT8, UINT16,
            UINT32,
        },
        value::Value,
    };

    fn text() -> Command {
        resolve(
            &CommandDef::widget(0x0c, "TEXT", "Draw text")
                .field(Field::new("x", INT16))
                .field(Field::new("y", INT16))
                .field(Field::new("font", HANDLE).stored_bits(16))
                .field(Field::new("options", OPTIONS))
                .field(Field::new("s", CSTRING)),
        )
        .unwrap()
    }

    fn memwrite() -> Command {
        resolve(
            &CommandDef::coprocessor(0x1a, "MEMWRITE", "Write data")
                .field(Field::new("ptr", ADDRESS))
                .field(Field::new("num", UINT32))
                .field(Field::new("data", TypeDef::block(Some("num")))),
        )
        .unwrap()
    }

    #[test]
    fn test_bgcolor() {
        let cmd = resolve(
            &CommandDef::coprocessor(0x09, "BGCOLOR", "Set the background color")
                .field(Field::new("color", RGB)),
        )
        .unwrap();
        let bytes = cmd.pack(&[Value::Int(0x112233)]).unwrap();
        assert_eq!(bytes, vec![0x09, 0xff, 0xff, 0xff, 0x33, 0x22, 0x11, 0x00]);
        assert_eq!(cmd.unpack(&bytes).unwrap(), (vec![Value::Int(0x112233)], 8));
    }

    #[test]
    fn test_text() {
        let args = vec![
            Value::Int(10),
            Value::Int(20),
            Value::Int(31),
            Value::Int(0),
            Value::from("Hi"),
        ];
        let bytes = text().pack(&args).unwrap();
        assert_eq!(
            bytes,
            vec![
                0x0c, 0xff, 0xff, 0xff, // opcode
                0x0a, 0x00, 0x14, 0x00, // x, y
                0x1f, 0x00, 0x00, 0x00, // font, options
                0x48, 0x69, 0x00, 0x00, // "Hi", NUL, pad
            ]
        );
        assert_eq!(text().unpack(&bytes).unwrap(), (args, 16));
    }

    #[test]
    fn test_negative_coordinates() {
        let args = vec![
            Value::Int(-1),
            Value::Int(-32768),
            Value::Int(1),
            Value::Int(0),
            Value::from("abc"),
        ];
        let bytes = text().pack(&args).unwrap();
        assert_eq!(&bytes[4..8], &[0xff, 0xff, 0x00, 0x80]);
        assert_eq!(bytes.len(), 16);
        assert_eq!(text().unpack(&bytes).unwrap(), (args, 16));
    }

    #[test]
    fn test_truncated_string() {
        let bytes = text()
            .pack(&[
                Value::Int(10),
                Value::Int(20),
                Value::Int(31),
                Value::Int(0),
                Value::from("Hello"),
            ])
            .unwrap();
        let result = text().unpack(&bytes[..15]);
        assert_eq!(
            result,
            Err(ReadError::UnterminatedString {
                command: "TEXT".to_string(),
                field: "s".to_string(),
            })
        );
        assert!(result.unwrap_err().is_malformed_tail());
    }

    #[test]
    fn test_missing_padding() {
        let bytes = text()
            .pack(&[
                Value::Int(0),
                Value::Int(0),
                Value::Int(0),
                Value::Int(0),
                Value::from("Hi"),
            ])
            .unwrap();
        assert!(matches!(
            text().unpack(&bytes[..15]),
            Err(ReadError::Truncated { needed: 16, .. })
        ));
    }

    #[test]
    fn test_head_truncated() {
        assert!(matches!(
            text().unpack(&[0x0c, 0xff, 0xff, 0xff, 0x00]),
            Err(ReadError::Truncated {
                needed: 12,
                available: 5,
                ..
            })
        ));
    }

    #[test]
    fn test_governed_block() {
        let args = vec![
            Value::Int(0x1000),
            Value::Int(5),
            Value::Bytes(vec![1, 2, 3, 4, 5]),
        ];
        let bytes = memwrite().pack(&args).unwrap();
        assert_eq!(bytes.len(), 20);
        assert_eq!(&bytes[12..], &[1, 2, 3, 4, 5, 0, 0, 0]);
        assert_eq!(memwrite().unpack(&bytes).unwrap(), (args, 20));
    }

    #[test]
    fn test_block_length_mismatch() {
        let result = memwrite().pack(&[
            Value::Int(0x1000),
            Value::Int(4),
            Value::Bytes(vec![1, 2, 3, 4, 5]),
        ]);
        assert_eq!(
            result,
            Err(WriteError::BlockLengthMismatch {
                command: "MEMWRITE".to_string(),
                field: "data".to_string(),
                length_field: "num".to_string(),
                expected: 4,
                found: 5,
            })
        );
    }

    #[test]
    fn test_block_overrun() {
        let mut bytes = memwrite()
            .pack(&[Value::Int(0), Value::Int(4), Value::Bytes(vec![9; 4])])
            .unwrap();
        // claim 64 bytes
        bytes[8] = 64;
        assert_eq!(
            memwrite().unpack(&bytes),
            Err(ReadError::BlockOverrun {
                command: "MEMWRITE".to_string(),
                field: "data".to_string(),
                length: 64,
                available: 4,
            })
        );
    }

    #[test]
    fn test_block_to_end() {
        let cmd = resolve(
            &CommandDef::coprocessor(0x22, "INFLATE", "Decompress")
                .field(Field::new("ptr", ADDRESS))
                .field(Field::new("data", TypeDef::block(None))),
        )
        .unwrap();
        let args = vec![Value::Int(0x2000), Value::Bytes(vec![7; 8])];
        let bytes = cmd.pack(&args).unwrap();
        assert_eq!(bytes.len(), 16);
        assert_eq!(cmd.unpack(&bytes).unwrap(), (args, 16));

        // odd lengths are padded, and the padding reads back as data
        let bytes = cmd
            .pack(&[Value::Int(0), Value::Bytes(vec![7; 5])])
            .unwrap();
        assert_eq!(bytes.len(), 16);
    }

    #[test]
    fn test_alignment_gap_is_zero() {
        let cmd = resolve(
            &CommandDef::coprocessor(0x3b, "SETFONT2", "Setup a custom font")
                .field(Field::new("font", HANDLE))
                .field(Field::new("ptr", ADDRESS))
                .field(Field::new("firstchar", UINT8)),
        )
        .unwrap();
        let bytes = cmd
            .pack(&[Value::Int(1), Value::Int(0x3f_ffff), Value::Int(32)])
            .unwrap();
        assert_eq!(
            bytes,
            vec![
                0x3b, 0xff, 0xff, 0xff, 0x01, 0x00, 0x00, 0x00, 0xff, 0xff, 0x3f, 0x00, 0x20,
                0x00, 0x00, 0x00,
            ]
        );
    }

    #[test]
    fn test_fixed_point_field() {
        let cmd = resolve(
            &CommandDef::coprocessor(0x28, "SCALE", "Apply scale")
                .field(Field::new("sx", FIXED16_16))
                .field(Field::new("sy", FIXED16_16)),
        )
        .unwrap();
        let args = vec![Value::Fixed(2.0), Value::Fixed(-0.5)];
        let bytes = cmd.pack(&args).unwrap();
        assert_eq!(&bytes[4..8], &0x0002_0000u32.to_le_bytes());
        assert_eq!(&bytes[8..12], &(-32768i32).to_le_bytes());
        assert_eq!(cmd.unpack(&bytes).unwrap(), (args, 12));
    }

    #[test]
    fn test_pack_error_leaves_buffer() {
        let mut out = vec![0xaa];
        let result = text().pack_into(
            &[
                Value::Int(0),
                Value::Int(0),
                Value::Int(0),
                Value::Int(0),
                Value::Int(5),
            ],
            &mut out,
        );
        assert!(matches!(result, Err(WriteError::TypeMismatch { .. })));
        assert_eq!(out, vec![0xaa]);
    }

    #[test]
    fn test_pack_appends_at_offset() {
        let mut out = vec![0xaa, 0xbb];
        let cmd = resolve(
            &CommandDef::coprocessor(0x02, "INTERRUPT", "Interrupt")
                .field(Field::new("ms", UINT32)),
        )
        .unwrap();
        cmd.pack_into(&[Value::Int(1)], &mut out).unwrap();
        assert_eq!(
            out,
            vec![0xaa, 0xbb, 0x02, 0xff, 0xff, 0xff, 0x01, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_unpack_rejects_other_opcode() {
        let bytes = memwrite()
            .pack(&[Value::Int(0), Value::Int(4), Value::Bytes(vec![0; 4])])
            .unwrap();
        assert_eq!(
            text().unpack(&bytes),
            Err(ReadError::OpcodeMismatch {
                command: "TEXT".to_string(),
                word: 0xffff_ff1a,
            })
        );
    }

    #[test]
    fn test_tail_after_odd_head() {
        let cmd = resolve(
            &CommandDef::coprocessor(0x70, "ODD", "Odd head")
                .field(Field::new("a", UINT16))
                .field(Field::new("s", CSTRING)),
        )
        .unwrap();
        let args = vec![Value::Int(1), Value::from("Hi")];
        let bytes = cmd.pack(&args).unwrap();
        assert_eq!(
            bytes,
            vec![0x70, 0xff, 0xff, 0xff, 0x01, 0x00, 0x48, 0x69, 0x00, 0x00, 0x00, 0x00]
        );
        assert_eq!(cmd.unpack(&bytes).unwrap(), (args, 12));

        let empty = cmd.pack(&[Value::Int(1), Value::from("")]).unwrap();
        assert_eq!(empty.len(), 8);
        assert_eq!(cmd.unpack(&empty).unwrap().1, 8);
    }
}
