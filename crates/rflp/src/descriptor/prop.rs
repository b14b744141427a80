use std::fmt;
use std::ops::RangeInclusive;

use rflp_event::{Event, EventKind, KindSet};
use tracing::trace;

use super::{Codec, Model};
use crate::{Context, Error, Result};

/// Domain a value must belong to before it is written.
pub enum Check<V> {
    Any,
    Range(RangeInclusive<V>),
    OneOf(Vec<V>),
    With(fn(&V, &Context) -> Result<(), String>),
}

impl<V: PartialOrd + fmt::Debug> Check<V> {
    pub fn validate(&self, name: &'static str, value: &V, ctx: &Context) -> Result<()> {
        match self {
            Check::Any => Ok(()),
            Check::Range(range) if range.contains(value) => Ok(()),
            Check::Range(range) => Err(Error::validation(
                name,
                format!("{value:?} is outside {range:?}"),
            )),
            Check::OneOf(values) if values.contains(value) => Ok(()),
            Check::OneOf(values) => Err(Error::validation(
                name,
                format!("{value:?} is not one of {values:?}"),
            )),
            Check::With(check) => check(value, ctx).map_err(|reason| Error::validation(name, reason)),
        }
    }
}

/// Attribute stored as the whole payload of one event.
///
/// Reads take the first event of the governing kind (or of an alias kind)
/// in the model's view.
pub struct EventProp<C: Codec> {
    name: &'static str,
    kind: EventKind,
    aliases: KindSet,
    codec: C,
    default: Option<C::Value>,
    check: Check<C::Value>,
}

impl<C: Codec> EventProp<C> {
    pub fn new(name: &'static str, kind: EventKind, codec: C) -> EventProp<C> {
        EventProp {
            name,
            kind,
            aliases: KindSet::EMPTY,
            codec,
            default: None,
            check: Check::Any,
        }
    }

    /// Also read from events of `kind`. New events are always created with
    /// the primary kind.
    pub fn alias(mut self, kind: EventKind) -> EventProp<C> {
        self.aliases.insert(kind);
        self
    }

    pub fn default_value(mut self, value: C::Value) -> EventProp<C> {
        self.default = Some(value);
        self
    }

    pub fn check(mut self, check: Check<C::Value>) -> EventProp<C> {
        self.check = check;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kinds(&self) -> KindSet {
        self.aliases.with(self.kind)
    }

    pub fn get<M: Model + ?Sized>(&self, model: &M) -> Result<Option<C::Value>> {
        let events = model.events();
        match events.first_of_kind(self.kinds())? {
            Some(id) => {
                let value = events.with_id(id, |e| self.codec.decode(e.payload(), model.context()))??;
                Ok(Some(value))
            }
            None => Ok(self.default.clone()),
        }
    }

    pub fn set<M: Model + ?Sized>(&self, model: &mut M, value: C::Value) -> Result<()> {
        let ctx = *model.context();
        self.check.validate(self.name, &value, &ctx)?;
        let payload = self.codec.encode(&value, &ctx)?;

        match model.events().first_of_kind(self.kinds())? {
            Some(id) => model.events().set_payload(id, &payload)?,
            None => {
                let event = Event::new(self.kind, &payload)?;
                model.materialize(event)?;
                trace!(prop = self.name, kind = %self.kind, "materialized event");
            }
        }

        Ok(())
    }
}
