//! Stateless accessors binding typed attributes to event bytes.
//!
//! A descriptor never caches what it reads. Every `get` decodes the current
//! payload and every `set` validates first, then writes, so a rejected value
//! leaves the events untouched. When the governing event is missing, `get`
//! falls back to the descriptor's default and `set` hands a new event to
//! [`Model::materialize`].

mod codec;
mod field;
mod flag;
mod prop;

pub use self::codec::{
    Ascii, BareAscii, Bool, Codec, Color, Enum, EventEnum, Raw, Text, F32, I16, I32, I8, U16, U32, U8,
};
pub use self::field::{FieldProp, SubEventProp};
pub use self::flag::{FlagProp, RecordFlagProp};
pub use self::prop::{Check, EventProp};

use rflp_event::{Event, EventId, View};

use crate::{Context, Result};

/// An object projected over a view of the event collection.
pub trait Model {
    fn events(&self) -> &View;

    fn events_mut(&mut self) -> &mut View;

    fn context(&self) -> &Context;

    /// Adds an event the model does not have yet, at the end of its view by
    /// default.
    fn materialize(&mut self, event: Event) -> Result<EventId> {
        Ok(self.events_mut().push(event)?)
    }
}
