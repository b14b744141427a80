//! Structured payloads of data events.

mod nested;
mod record;

pub use self::nested::{NestedLayout, NestedPayload, SubEvent, SubField};
pub use self::record::{Field, FieldType, FieldValue, RecordLayout};
