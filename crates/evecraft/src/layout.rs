//! Layout resolver: turns a [CommandDef] into a resolved [Command].
//!
//! Coprocessor fields are placed after the 4-byte opcode word, each aligned to its own
//! byte size (2 or 4). The variable-length tail, if any, starts at the head's end rounded
//! up to 4 bytes. Display-list fields are checked to fit next to the opcode.

use std::collections::HashSet;

use log::trace;

use crate::{
    bits::{align, align4},
    command::{
        BlockCommand, Command, CommandDef, CommandKind, Family, Opcode, Tail, TailLength,
        WordCommand,
    },
    dispatch::SHORT_OPCODES,
    errors::SchemaError,
    field::Field,
    transform::Transform,
};

/// Resolves one command definition, validating every layout invariant.
pub fn resolve(def: &CommandDef) -> Result<Command, SchemaError> {
    if def.description.is_none() {
        return Err(SchemaError::MissingDescription {
            command: def.name.to_string(),
        });
    }

    let mut names = HashSet::with_capacity(def.fields.len());
    for field in &def.fields {
        if !names.insert(field.name.as_ref()) {
            return Err(SchemaError::DuplicateField {
                command: def.name.to_string(),
                field: field.name.to_string(),
            });
        }
        check_width(def, field)?;
    }

    match def.family() {
        Family::DisplayList => resolve_word(def).map(Command::Word),
        Family::Coprocessor => resolve_block(def).map(Command::Block),
    }
}

/// Fixed-width fields need 1..=32 bits; strings and blocks must have none.
fn check_width(def: &CommandDef, field: &Field) -> Result<(), SchemaError> {
    let bits = field.bitcount();
    let variable_type = matches!(
        field.ty.transform,
        Transform::CString | Transform::Block { .. }
    );

    if bits > 32 || (bits == 0) != variable_type {
        return Err(SchemaError::InvalidFieldWidth {
            command: def.name.to_string(),
            field: field.name.to_string(),
            bits,
        });
    }

    Ok(())
}

/// Opcode placement for a display-list command.
pub fn word_opcode(def: &CommandDef) -> Result<Opcode, SchemaError> {
    if def.code & 0xc0 == 0 {
        Ok(Opcode {
            code: def.code,
            stored: def.code,
            bits: 8,
        })
    } else if SHORT_OPCODES.contains(&def.code) {
        Ok(Opcode {
            code: def.code,
            stored: def.code >> 6,
            bits: 2,
        })
    } else {
        Err(SchemaError::InvalidOpcode {
            command: def.name.to_string(),
            code: def.code,
        })
    }
}

fn resolve_word(def: &CommandDef) -> Result<WordCommand, SchemaError> {
    let opcode = word_opcode(def)?;

    if let Some(field) = def.fields.iter().find(|field| field.is_variable()) {
        return Err(SchemaError::VariableFieldInWord {
            command: def.name.to_string(),
            field: field.name.to_string(),
        });
    }

    let bits: u32 = def.fields.iter().map(Field::bitcount).sum();
    if bits > opcode.available_bits() {
        return Err(SchemaError::WordOverflow {
            command: def.name.to_string(),
            bits,
            available: opcode.available_bits(),
        });
    }

    Ok(WordCommand {
        name: def.name.clone(),
        description: def.description.clone().unwrap_or_default(),
        opcode,
        fields: def.fields.clone(),
    })
}

fn resolve_block(def: &CommandDef) -> Result<BlockCommand, SchemaError> {
    let mut offset = 4;
    let mut head: Vec<Field> = Vec::with_capacity(def.fields.len());
    let mut tail = None;

    for (i, field) in def.fields.iter().enumerate() {
        let mut field = field.clone();

        if field.is_variable() {
            if i + 1 != def.fields.len() {
                return Err(SchemaError::MisplacedVariableField {
                    command: def.name.to_string(),
                    field: field.name.to_string(),
                });
            }

            let length = tail_length(def, &head, &field)?;
            field.offset = Some(offset);
            trace!("{}.{} tail at +{}", def.name, field.name, offset);
            tail = Some(Tail { field, length });
            continue;
        }

        let size = field.byte_size();
        offset = align(offset, size);
        field.offset = Some(offset);
        trace!("{}.{} at +{} ({} bytes)", def.name, field.name, offset, size);
        head.push(field);
        offset += size;
    }

    let command = BlockCommand {
        code: def.code,
        name: def.name.clone(),
        description: def.description.clone().unwrap_or_default(),
        widget: def.kind == CommandKind::Widget,
        head,
        tail,
        size: align4(offset),
    };

    verify_block(&command)?;
    Ok(command)
}

fn tail_length(def: &CommandDef, head: &[Field], field: &Field) -> Result<TailLength, SchemaError> {
    match &field.ty.transform {
        Transform::Block {
            length_field: Some(length_field),
        } => head
            .iter()
            .position(|f| f.name == *length_field && f.ty.transform == Transform::Int)
            .map(|index| TailLength::Governed { index })
            .ok_or_else(|| SchemaError::InvalidLengthField {
                command: def.name.to_string(),
                field: field.name.to_string(),
                length_field: length_field.to_string(),
            }),
        Transform::Block { length_field: None } => Ok(TailLength::ToEnd),
        _ => Ok(TailLength::NulTerminated),
    }
}

/// Checks the resolved offsets: non-decreasing, fixed fields naturally aligned, size a
/// multiple of 4. A tail follows the head directly.
pub fn verify_block(command: &BlockCommand) -> Result<(), SchemaError> {
    let mut end = 4;

    for field in command.fields() {
        let offset = field.offset.unwrap_or_default();
        let size = if field.is_variable() { 1 } else { field.byte_size() };

        if offset < end || offset % size != 0 {
            return Err(SchemaError::Misaligned {
                command: command.name.to_string(),
                field: field.name.to_string(),
                offset,
                size,
            });
        }

        end = offset + field.byte_size();
    }

    if command.size % 4 != 0 || command.size < end {
        return Err(SchemaError::Misaligned {
            command: command.name.to_string(),
            field: String::new(),
            offset: command.size,
            size: 4,
        });
    }

    Ok(())
}
