use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};

/// The active interpretation of a slot's 4 bytes, statically enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Float32(f32),
    Uint32(u32),
    Boolean(bool),
}

/// The type tag of a [`Value`], without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Float32,
    Uint32,
    Boolean,
}

impl ValueKind {
    /// Encoded width on the wire: 4 bytes for float32/uint32, 1 for boolean.
    pub const fn wire_size(self) -> usize {
        match self {
            ValueKind::Float32 | ValueKind::Uint32 => 4,
            ValueKind::Boolean => 1,
        }
    }

    /// The zero value of this kind.
    pub fn zero(self) -> Value {
        match self {
            ValueKind::Float32 => Value::Float32(0.0),
            ValueKind::Uint32 => Value::Uint32(0),
            ValueKind::Boolean => Value::Boolean(false),
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::Float32 => write!(f, "float32"),
            ValueKind::Uint32 => write!(f, "uint32"),
            ValueKind::Boolean => write!(f, "boolean"),
        }
    }
}

impl Value {
    /// The type tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Float32(_) => ValueKind::Float32,
            Value::Uint32(_) => ValueKind::Uint32,
            Value::Boolean(_) => ValueKind::Boolean,
        }
    }

    /// Encoded width on the wire.
    pub fn wire_size(&self) -> usize {
        self.kind().wire_size()
    }

    /// Append the little-endian encoding to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) {
        match self {
            Value::Float32(v) => dst.put_f32_le(*v),
            Value::Uint32(v) => dst.put_u32_le(*v),
            Value::Boolean(v) => dst.put_u8(u8::from(*v)),
        }
    }

    /// Decode a value of `kind` from `bytes`.
    ///
    /// `bytes` must be exactly `kind.wire_size()` long; the caller (the
    /// unpack cursor) guarantees this.
    pub fn decode(kind: ValueKind, bytes: &[u8]) -> Option<Value> {
        if bytes.len() != kind.wire_size() {
            return None;
        }
        Some(match kind {
            ValueKind::Float32 => {
                Value::Float32(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            ValueKind::Uint32 => {
                Value::Uint32(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            ValueKind::Boolean => Value::Boolean(bytes[0] != 0),
        })
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Float32(v) => write!(f, "{v}"),
            Value::Uint32(v) => write!(f, "{v}"),
            Value::Boolean(v) => write!(f, "{v}"),
        }
    }
}
