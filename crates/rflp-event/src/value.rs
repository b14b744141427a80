//! Typed interpretation of event payloads.
//!
//! Decoding is dispatched through a [`Registry`], a table from event kind to
//! [`ValueType`]. Kinds without an explicit entry fall back to a type derived
//! from their width class, and length-prefixed kinds fall back to raw bytes,
//! so every event decodes to something.

use serde::{Deserialize, Serialize};

use crate::event::{Event, Payload};
use crate::kind::{EventKind, Width, DATA, TEXT};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    U16Pair,
    Color,
    /// NUL-terminated ASCII, regardless of the file's text encoding.
    Ascii,
    /// NUL-terminated text in the file's text encoding.
    Text,
    Raw,
}

impl ValueType {
    pub fn fixed_len(self) -> Option<usize> {
        match self {
            ValueType::Bool | ValueType::U8 | ValueType::I8 => Some(1),
            ValueType::U16 | ValueType::I16 => Some(2),
            ValueType::U32
            | ValueType::I32
            | ValueType::F32
            | ValueType::U16Pair
            | ValueType::Color => Some(4),
            ValueType::Ascii | ValueType::Text | ValueType::Raw => None,
        }
    }

    fn fits(self, kind: EventKind) -> bool {
        self.fixed_len() == kind.fixed_len()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8) -> Rgba {
        Rgba { r, g, b, a: 0 }
    }

    pub const fn from_bytes(bytes: [u8; 4]) -> Rgba {
        Rgba {
            r: bytes[0],
            g: bytes[1],
            b: bytes[2],
            a: bytes[3],
        }
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Encoding used for strings, decided by the version of the program that
/// saved the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextEncoding {
    Ascii,
    #[default]
    Utf16Le,
}

impl TextEncoding {
    pub fn decode(self, bytes: &[u8]) -> Result<String> {
        match self {
            TextEncoding::Ascii => {
                if !bytes.is_ascii() {
                    return Err(Error::InvalidText {
                        message: "non-ASCII byte in ASCII string".into(),
                    });
                }
                let text = std::str::from_utf8(bytes).map_err(|e| Error::InvalidText {
                    message: e.to_string(),
                })?;
                Ok(text.trim_end_matches('\0').to_owned())
            }
            TextEncoding::Utf16Le => {
                if bytes.len() % 2 != 0 {
                    return Err(Error::InvalidText {
                        message: format!("odd UTF-16 length {}", bytes.len()),
                    });
                }
                let units = bytes
                    .chunks_exact(2)
                    .map(|c| u16::from_le_bytes([c[0], c[1]]))
                    .collect::<Vec<_>>();
                let text = String::from_utf16(&units).map_err(|e| Error::InvalidText {
                    message: e.to_string(),
                })?;
                Ok(text.trim_end_matches('\0').to_owned())
            }
        }
    }

    pub fn encode(self, text: &str) -> Result<Vec<u8>> {
        match self {
            TextEncoding::Ascii => {
                if !text.is_ascii() {
                    return Err(Error::InvalidText {
                        message: format!("{text:?} is not ASCII"),
                    });
                }
                let mut bytes = Vec::with_capacity(text.len() + 1);
                bytes.extend_from_slice(text.as_bytes());
                bytes.push(0);
                Ok(bytes)
            }
            TextEncoding::Utf16Le => {
                let mut bytes = Vec::with_capacity(text.len() * 2 + 2);
                for unit in text.encode_utf16().chain([0]) {
                    bytes.extend_from_slice(&unit.to_le_bytes());
                }
                Ok(bytes)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    F32(f32),
    U16Pair(u16, u16),
    Color(Rgba),
    Str(String),
    Raw(Vec<u8>),
}

impl Value {
    /// Decodes `payload` as `ty`. The payload length must match the type.
    pub fn decode(
        kind: EventKind,
        ty: ValueType,
        payload: &[u8],
        encoding: TextEncoding,
    ) -> Result<Value> {
        let mismatch = || Error::TypeMismatch { kind, expected: ty };

        if let Some(len) = ty.fixed_len() {
            if payload.len() != len {
                return Err(mismatch());
            }
        }

        let value = match ty {
            ValueType::Bool => Value::Bool(payload[0] != 0),
            ValueType::U8 => Value::U8(payload[0]),
            ValueType::I8 => Value::I8(payload[0] as i8),
            ValueType::U16 => Value::U16(u16::from_le_bytes([payload[0], payload[1]])),
            ValueType::I16 => Value::I16(i16::from_le_bytes([payload[0], payload[1]])),
            ValueType::U32 => Value::U32(u32::from_le_bytes(array4(payload))),
            ValueType::I32 => Value::I32(i32::from_le_bytes(array4(payload))),
            ValueType::F32 => Value::F32(f32::from_le_bytes(array4(payload))),
            ValueType::U16Pair => Value::U16Pair(
                u16::from_le_bytes([payload[0], payload[1]]),
                u16::from_le_bytes([payload[2], payload[3]]),
            ),
            ValueType::Color => Value::Color(Rgba::from_bytes(array4(payload))),
            ValueType::Ascii => Value::Str(TextEncoding::Ascii.decode(payload)?),
            ValueType::Text => Value::Str(encoding.decode(payload)?),
            ValueType::Raw => Value::Raw(payload.to_vec()),
        };

        Ok(value)
    }

    pub fn encode(&self, encoding: TextEncoding) -> Result<Payload> {
        let payload = match self {
            Value::Bool(v) => Payload::from_slice(&[u8::from(*v)]),
            Value::U8(v) => Payload::from_slice(&[*v]),
            Value::I8(v) => Payload::from_slice(&v.to_le_bytes()),
            Value::U16(v) => Payload::from_slice(&v.to_le_bytes()),
            Value::I16(v) => Payload::from_slice(&v.to_le_bytes()),
            Value::U32(v) => Payload::from_slice(&v.to_le_bytes()),
            Value::I32(v) => Payload::from_slice(&v.to_le_bytes()),
            Value::F32(v) => Payload::from_slice(&v.to_le_bytes()),
            Value::U16Pair(a, b) => {
                let mut payload = Payload::from_slice(&a.to_le_bytes());
                payload.extend_from_slice(&b.to_le_bytes());
                payload
            }
            Value::Color(c) => Payload::from_slice(&c.to_bytes()),
            Value::Str(s) => Payload::from_vec(encoding.encode(s)?),
            Value::Raw(v) => Payload::from_slice(v),
        };

        Ok(payload)
    }

    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::Bool(v) => Some(u64::from(v)),
            Value::U8(v) => Some(u64::from(v)),
            Value::U16(v) => Some(u64::from(v)),
            Value::U32(v) => Some(u64::from(v)),
            Value::I8(v) => u64::try_from(v).ok(),
            Value::I16(v) => u64::try_from(v).ok(),
            Value::I32(v) => u64::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

fn array4(payload: &[u8]) -> [u8; 4] {
    [payload[0], payload[1], payload[2], payload[3]]
}

/// Dispatch table from event kind to value type.
#[derive(Debug, Clone)]
pub struct Registry {
    types: [ValueType; 256],
}

impl Registry {
    /// Table with width-derived defaults only.
    pub fn new() -> Registry {
        Registry {
            types: std::array::from_fn(|id| default_type(EventKind(id as u8))),
        }
    }

    /// Registers `ty` for `kind`. Types whose width does not match the kind's
    /// width class are ignored with a warning.
    pub fn with(mut self, kind: EventKind, ty: ValueType) -> Registry {
        self.set(kind, ty);
        self
    }

    pub fn set(&mut self, kind: EventKind, ty: ValueType) {
        if !ty.fits(kind) {
            tracing::warn!(%kind, ?ty, "value type does not match event width");
            return;
        }
        self.types[kind.0 as usize] = ty;
    }

    pub fn get(&self, kind: EventKind) -> ValueType {
        self.types[kind.0 as usize]
    }

    pub fn decode(&self, event: &Event, encoding: TextEncoding) -> Result<Value> {
        Value::decode(event.kind(), self.get(event.kind()), event.payload(), encoding)
    }
}

impl Default for Registry {
    fn default() -> Registry {
        Registry::new()
    }
}

/// Kinds in the data range that carry strings.
pub const DATA_TEXT_KINDS: [EventKind; 3] = [
    EventKind(TEXT + 39),
    EventKind(TEXT + 47),
    EventKind(TEXT + 49),
];

fn default_type(kind: EventKind) -> ValueType {
    match kind.width() {
        Width::Byte => ValueType::U8,
        Width::Word => ValueType::U16,
        Width::DWord => ValueType::U32,
        Width::Prefixed if kind.0 < DATA || DATA_TEXT_KINDS.contains(&kind) => ValueType::Text,
        Width::Prefixed => ValueType::Raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_width() {
        let registry = Registry::new();
        assert_eq!(registry.get(EventKind(10)), ValueType::U8);
        assert_eq!(registry.get(EventKind(70)), ValueType::U16);
        assert_eq!(registry.get(EventKind(150)), ValueType::U32);
        assert_eq!(registry.get(EventKind(193)), ValueType::Text);
        assert_eq!(registry.get(EventKind(231)), ValueType::Text);
        assert_eq!(registry.get(EventKind(220)), ValueType::Raw);
    }

    #[test]
    fn mismatched_registration_is_ignored() {
        let registry = Registry::new()
            .with(EventKind(10), ValueType::U32)
            .with(EventKind(11), ValueType::Bool);
        assert_eq!(registry.get(EventKind(10)), ValueType::U8);
        assert_eq!(registry.get(EventKind(11)), ValueType::Bool);
    }

    #[test]
    fn odd_utf16_is_invalid() {
        assert!(matches!(
            TextEncoding::Utf16Le.decode(&[b'a', 0, b'b']),
            Err(Error::InvalidText { .. })
        ));
        assert_eq!(TextEncoding::Utf16Le.decode(&[b'a', 0, 0, 0]).as_deref(), Ok("a"));
    }

    #[test]
    fn decode_dispatch() -> Result<()> {
        let registry = Registry::new()
            .with(EventKind(0), ValueType::Bool)
            .with(EventKind(64 + 16), ValueType::I16)
            .with(EventKind(128), ValueType::Color)
            .with(EventKind(199), ValueType::Ascii);

        let enabled = Event::new(EventKind(0), &[2])?;
        assert_eq!(registry.decode(&enabled, TextEncoding::Utf16Le)?, Value::Bool(true));

        let pitch = Event::new(EventKind(80), &(-1200i16).to_le_bytes())?;
        assert_eq!(registry.decode(&pitch, TextEncoding::Utf16Le)?, Value::I16(-1200));

        let color = Event::new(EventKind(128), &[255, 128, 0, 0])?;
        assert_eq!(
            registry.decode(&color, TextEncoding::Utf16Le)?,
            Value::Color(Rgba::new(255, 128, 0))
        );

        let version = Event::new(EventKind(199), b"20.8.4.2576\0")?;
        assert_eq!(
            registry.decode(&version, TextEncoding::Utf16Le)?,
            Value::Str("20.8.4.2576".into())
        );

        let unknown = Event::new(EventKind(250), &[1, 2, 3])?;
        assert_eq!(
            registry.decode(&unknown, TextEncoding::Utf16Le)?,
            Value::Raw(vec![1, 2, 3])
        );

        Ok(())
    }

    #[test]
    fn text_encodings() -> Result<()> {
        let utf16 = TextEncoding::Utf16Le.encode("Hé")?;
        assert_eq!(utf16, vec![b'H', 0, 0xE9, 0, 0, 0]);
        assert_eq!(TextEncoding::Utf16Le.decode(&utf16)?, "Hé");

        let ascii = TextEncoding::Ascii.encode("abc")?;
        assert_eq!(ascii, b"abc\0");
        assert_eq!(TextEncoding::Ascii.decode(&ascii)?, "abc");

        assert!(TextEncoding::Ascii.encode("é").is_err());
        assert!(TextEncoding::Ascii.decode(&[0xFF]).is_err());

        Ok(())
    }

    #[test]
    fn encode_matches_decode() -> Result<()> {
        let cases = [
            (ValueType::I8, Value::I8(-5)),
            (ValueType::U16Pair, Value::U16Pair(7, 9)),
            (ValueType::F32, Value::F32(0.5)),
            (ValueType::Text, Value::Str("x".into())),
        ];

        for (ty, value) in cases {
            let payload = value.encode(TextEncoding::Ascii)?;
            let decoded = Value::decode(EventKind(255), ty, &payload, TextEncoding::Ascii)?;
            assert_eq!(decoded, value);
        }

        Ok(())
    }
}
