//! Event layer of the FL Studio project format.
//!
//! A project file body is a flat stream of type-length-value events. This
//! crate decodes that stream into an [`EventCollection`], lets callers view
//! and edit it through [`View`]s, and encodes it back byte for byte.

pub mod collection;
pub mod compound;
mod error;
pub mod event;
pub mod kind;
pub mod stream;
pub mod value;

pub use self::collection::{EventCollection, EventId, View};
pub use self::compound::{
    Field, FieldType, FieldValue, NestedLayout, NestedPayload, RecordLayout, SubEvent, SubField,
};
pub use self::error::{Error, Result};
pub use self::event::{Event, Payload};
pub use self::kind::{EventKind, KindSet, Width};
pub use self::stream::{decode_events, encode_events};
pub use self::value::{Registry, Rgba, TextEncoding, Value, ValueType, DATA_TEXT_KINDS};
