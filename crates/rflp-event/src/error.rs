use rflp_core::cursor;

use crate::compound::FieldType;
use crate::kind::EventKind;
use crate::value::ValueType;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("corrupt event stream at offset {offset}: needed {needed} bytes, {available} available")]
    CorruptStream {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("malformed length prefix at offset {offset}")]
    MalformedVarint { offset: usize },

    #[error("event {kind} holds {expected} bytes, got {actual}")]
    WidthMismatch {
        kind: EventKind,
        expected: usize,
        actual: usize,
    },
    #[error("event {kind} cannot be read as {expected:?}")]
    TypeMismatch {
        kind: EventKind,
        expected: ValueType,
    },
    #[error("invalid text: {message}")]
    InvalidText { message: String },

    #[error("unknown field {field:?} in {layout}")]
    UnknownField {
        layout: &'static str,
        field: &'static str,
    },
    #[error("field {field:?} is not present in this {layout} payload")]
    FieldAbsent {
        layout: &'static str,
        field: &'static str,
    },
    #[error("field {field:?} of {layout} holds {expected:?}")]
    InvalidFieldValue {
        layout: &'static str,
        field: &'static str,
        expected: FieldType,
    },

    #[error("nested payload of {layout} needs a {expected}-byte prefix, got {actual}")]
    MissingPrefix {
        layout: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("index {index} out of bounds for view of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("event {kind} is not visible through this view")]
    KindNotInView { kind: EventKind },
    #[error("event no longer exists")]
    UnknownEvent,
    #[error("view refers to events that were removed through another handle")]
    DanglingView,
    #[error("view covers no part of the collection")]
    EmptyView,
}

impl From<cursor::Error> for Error {
    #[cold]
    fn from(error: cursor::Error) -> Error {
        match error {
            cursor::Error::UnexpectedEof {
                offset,
                needed,
                available,
            } => Error::CorruptStream {
                offset,
                needed,
                available,
            },
            cursor::Error::VarintOverflow { offset } => Error::MalformedVarint { offset },
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
