//! Argument values passed to and produced by the codec.

use std::fmt;

/// A typed argument value for one field of a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Plain integer (signed or unsigned fields alike).
    Int(i64),
    /// Real number for fixed-point fields.
    Fixed(f64),
    /// Text for NUL-terminated string fields.
    Str(String),
    /// Raw bytes for block fields.
    Bytes(Vec<u8>),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_fixed(&self) -> Option<f64> {
        match self {
            Value::Fixed(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Fixed(v) => write!(f, "{v}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => {
                write!(f, "[{} bytes:", b.len())?;
                for byte in b.iter().take(16) {
                    write!(f, " {byte:02x}")?;
                }
                if b.len() > 16 {
                    write!(f, " ..")?;
                }
                write!(f, "]")
            }
        }
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, u8, i16, u16, i32, u32, i64, bool);

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Fixed(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Fixed(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}
