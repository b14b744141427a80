//! Fixed-offset records inside data event payloads.
//!
//! Newer program versions append fields to the end of a record, so a field
//! whose bytes lie beyond the end of a payload is reported as absent rather
//! than as an error. Fields never depend on each other: reading or writing
//! one does not require any other to be present.

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
    Bytes(usize),
}

impl FieldType {
    pub const fn len(self) -> usize {
        match self {
            FieldType::Bool | FieldType::U8 | FieldType::I8 => 1,
            FieldType::U16 | FieldType::I16 => 2,
            FieldType::U32 | FieldType::I32 | FieldType::F32 => 4,
            FieldType::F64 => 8,
            FieldType::Bytes(len) => len,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    F32(f32),
    F64(f64),
    Bytes(Vec<u8>),
}

impl FieldValue {
    fn decode(ty: FieldType, bytes: &[u8]) -> FieldValue {
        let mut buf = [0u8; 8];
        buf[..bytes.len().min(8)].copy_from_slice(&bytes[..bytes.len().min(8)]);

        match ty {
            FieldType::Bool => FieldValue::Bool(bytes[0] != 0),
            FieldType::U8 => FieldValue::U8(bytes[0]),
            FieldType::I8 => FieldValue::I8(bytes[0] as i8),
            FieldType::U16 => FieldValue::U16(u16::from_le_bytes([buf[0], buf[1]])),
            FieldType::I16 => FieldValue::I16(i16::from_le_bytes([buf[0], buf[1]])),
            FieldType::U32 => FieldValue::U32(u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]])),
            FieldType::I32 => FieldValue::I32(i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]])),
            FieldType::F32 => FieldValue::F32(f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]])),
            FieldType::F64 => FieldValue::F64(f64::from_le_bytes(buf)),
            FieldType::Bytes(_) => FieldValue::Bytes(bytes.to_vec()),
        }
    }

    fn encode_into(&self, ty: FieldType, out: &mut [u8]) -> bool {
        match (ty, self) {
            (FieldType::Bool, FieldValue::Bool(v)) => out[0] = u8::from(*v),
            (FieldType::U8, FieldValue::U8(v)) => out[0] = *v,
            (FieldType::I8, FieldValue::I8(v)) => out.copy_from_slice(&v.to_le_bytes()),
            (FieldType::U16, FieldValue::U16(v)) => out.copy_from_slice(&v.to_le_bytes()),
            (FieldType::I16, FieldValue::I16(v)) => out.copy_from_slice(&v.to_le_bytes()),
            (FieldType::U32, FieldValue::U32(v)) => out.copy_from_slice(&v.to_le_bytes()),
            (FieldType::I32, FieldValue::I32(v)) => out.copy_from_slice(&v.to_le_bytes()),
            (FieldType::F32, FieldValue::F32(v)) => out.copy_from_slice(&v.to_le_bytes()),
            (FieldType::F64, FieldValue::F64(v)) => out.copy_from_slice(&v.to_le_bytes()),
            (FieldType::Bytes(len), FieldValue::Bytes(v)) if v.len() == len => {
                out.copy_from_slice(v)
            }
            _ => return false,
        }
        true
    }

    /// Two's complement bits of an integer value.
    pub fn to_bits(&self) -> Option<u64> {
        match *self {
            FieldValue::Bool(v) => Some(u64::from(v)),
            FieldValue::U8(v) => Some(u64::from(v)),
            FieldValue::I8(v) => Some(u64::from(v as u8)),
            FieldValue::U16(v) => Some(u64::from(v)),
            FieldValue::I16(v) => Some(u64::from(v as u16)),
            FieldValue::U32(v) => Some(u64::from(v)),
            FieldValue::I32(v) => Some(u64::from(v as u32)),
            _ => None,
        }
    }

    /// Builds a value of integer type `ty` from `raw`, truncating to the
    /// field width.
    pub fn from_bits(ty: FieldType, raw: u64) -> Option<FieldValue> {
        let value = match ty {
            FieldType::Bool => FieldValue::Bool(raw != 0),
            FieldType::U8 => FieldValue::U8(raw as u8),
            FieldType::I8 => FieldValue::I8(raw as i8),
            FieldType::U16 => FieldValue::U16(raw as u16),
            FieldType::I16 => FieldValue::I16(raw as i16),
            FieldType::U32 => FieldValue::U32(raw as u32),
            FieldType::I32 => FieldValue::I32(raw as i32),
            _ => return None,
        };
        Some(value)
    }
}

macro_rules! field_value_conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl From<$ty> for FieldValue {
            fn from(value: $ty) -> FieldValue {
                FieldValue::$variant(value)
            }
        }

        impl TryFrom<FieldValue> for $ty {
            type Error = FieldValue;

            fn try_from(value: FieldValue) -> Result<$ty, FieldValue> {
                match value {
                    FieldValue::$variant(value) => Ok(value),
                    other => Err(other),
                }
            }
        }
    )*};
}

field_value_conversions! {
    bool => Bool,
    u8 => U8,
    i8 => I8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    f32 => F32,
    f64 => F64,
    Vec<u8> => Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub offset: usize,
    pub ty: FieldType,
}

impl Field {
    pub const fn new(name: &'static str, offset: usize, ty: FieldType) -> Field {
        Field { name, offset, ty }
    }

    pub const fn end(&self) -> usize {
        self.offset + self.ty.len()
    }
}

#[derive(Debug)]
pub struct RecordLayout {
    pub name: &'static str,
    pub fields: &'static [Field],
}

impl RecordLayout {
    pub const fn new(name: &'static str, fields: &'static [Field]) -> RecordLayout {
        RecordLayout { name, fields }
    }

    /// Length of a payload holding every known field.
    pub fn len(&self) -> usize {
        self.fields.iter().map(Field::end).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &'static str) -> Result<&Field> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or(Error::UnknownField {
                layout: self.name,
                field: name,
            })
    }

    pub fn get(&self, payload: &[u8], name: &'static str) -> Result<Option<FieldValue>> {
        let field = self.field(name)?;
        Ok(payload
            .get(field.offset..field.end())
            .map(|bytes| FieldValue::decode(field.ty, bytes)))
    }

    /// Overwrites the bytes of one field in place. The payload length never
    /// changes; a field that is absent from the payload cannot be written.
    pub fn set(&self, payload: &mut [u8], name: &'static str, value: &FieldValue) -> Result<()> {
        let field = self.field(name)?;
        let Some(out) = payload.get_mut(field.offset..field.end()) else {
            return Err(Error::FieldAbsent {
                layout: self.name,
                field: name,
            });
        };

        let mut scratch = vec![0; field.ty.len()];
        if !value.encode_into(field.ty, &mut scratch) {
            return Err(self.type_error(field));
        }

        out.copy_from_slice(&scratch);
        Ok(())
    }

    #[cold]
    fn type_error(&self, field: &Field) -> Error {
        Error::InvalidFieldValue {
            layout: self.name,
            field: field.name,
            expected: field.ty,
        }
    }
}
