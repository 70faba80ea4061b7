//! A [`Transform`] describes how an argument [Value] maps to the raw value stored on the wire:
//! - **Int**: the value is stored as is.
//! - **Fixed**: a real number multiplied by `scale` and truncated toward zero.
//! - **CString**: text followed by a NUL byte, zero-padded to a 4-byte boundary.
//! - **Block**: raw bytes, their length governed by a sibling field or the end of input.
//!
//! Scalar conversions check that the raw value fits the field's bit width, honouring the
//! type's signedness.

use std::borrow::Cow;

use crate::{
    bits::{align4, value_range},
    errors::WriteError,
    field::Field,
    value::Value,
};

/// Value transform kind carried by a [crate::types::TypeDef].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transform {
    /// Plain integer.
    Int,
    /// Fixed-point number with the given scale factor.
    Fixed { scale: u32 },
    /// NUL-terminated string.
    CString,
    /// Byte block, its length taken from the named sibling field, or the rest of the input.
    Block {
        length_field: Option<Cow<'static, str>>,
    },
}

impl Transform {
    /// Scale factor of fixed-point transforms.
    pub fn scale(&self) -> Option<u32> {
        match self {
            Transform::Fixed { scale } => Some(*scale),
            _ => None,
        }
    }
}

/// Converts a scalar argument into the raw integer stored in `field`.
///
/// Fails if the argument has the wrong kind or does not fit the field's bit width.
pub fn to_raw(command: &str, field: &Field, value: &Value) -> Result<i64, WriteError> {
    let raw = match (&field.ty.transform, value) {
        (Transform::Int, Value::Int(v)) => *v,
        (Transform::Fixed { scale }, Value::Fixed(v)) => {
            if !v.is_finite() {
                return Err(WriteError::NonFinite {
                    command: command.to_string(),
                    field: field.name.to_string(),
                    value: *v,
                });
            }
            // `as` saturates, the range check below rejects anything that clipped.
            (v * f64::from(*scale)).trunc() as i64
        }
        (Transform::Fixed { scale }, Value::Int(v)) => v.saturating_mul(i64::from(*scale)),
        (transform, _) => {
            return Err(WriteError::TypeMismatch {
                command: command.to_string(),
                field: field.name.to_string(),
                expected: expected_kind(transform),
            });
        }
    };

    check_range(command, field, raw)?;
    Ok(raw)
}

/// Converts a raw integer read from `field` back into an argument value.
pub fn from_raw(field: &Field, raw: i64) -> Value {
    match field.ty.transform {
        Transform::Fixed { scale } => Value::Fixed(raw as f64 / f64::from(scale)),
        _ => Value::Int(raw),
    }
}

/// Fails with [WriteError::OutOfRange] if `raw` does not fit `field`.
pub fn check_range(command: &str, field: &Field, raw: i64) -> Result<(), WriteError> {
    let bits = field.bitcount();
    let (min, max) = value_range(bits, field.ty.signed);

    if raw < min || raw > max {
        return Err(WriteError::OutOfRange {
            command: command.to_string(),
            field: field.name.to_string(),
            value: raw,
            bits,
        });
    }

    Ok(())
}

/// Encodes a string argument: bytes, NUL, then zero padding to a 4-byte boundary.
pub fn encode_string(command: &str, field: &Field, value: &Value) -> Result<Vec<u8>, WriteError> {
    let text = value.as_str().ok_or_else(|| WriteError::TypeMismatch {
        command: command.to_string(),
        field: field.name.to_string(),
        expected: expected_kind(&field.ty.transform),
    })?;

    if text.as_bytes().contains(&0) {
        return Err(WriteError::EmbeddedNul {
            command: command.to_string(),
            field: field.name.to_string(),
        });
    }

    let mut out = Vec::with_capacity(align4(text.len() + 1));
    out.extend_from_slice(text.as_bytes());
    out.push(0);
    out.resize(align4(out.len()), 0);
    Ok(out)
}

/// Human-readable kind expected by a transform, used in error messages.
pub fn expected_kind(transform: &Transform) -> &'static str {
    match transform {
        Transform::Int => "an integer",
        Transform::Fixed { .. } => "a number",
        Transform::CString => "a string",
        Transform::Block { .. } => "bytes",
    }
}
