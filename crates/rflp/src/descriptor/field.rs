use std::fmt;

use rflp_event::{Event, EventKind, FieldValue, KindSet, NestedLayout, NestedPayload, RecordLayout};
use tracing::trace;

use super::{Check, Codec, Model};
use crate::Result;

/// Attribute stored in one field of a fixed-offset record event.
///
/// A record written by an older program may end before the field; reads
/// then return the default and writes fail with `FieldAbsent`, since
/// growing the record would invent values for the fields in between.
pub struct FieldProp<V> {
    name: &'static str,
    kind: EventKind,
    layout: &'static RecordLayout,
    field: &'static str,
    default: Option<V>,
    check: Check<V>,
}

impl<V> FieldProp<V>
where
    V: TryFrom<FieldValue> + Into<FieldValue> + Clone + PartialOrd + fmt::Debug,
{
    pub fn new(
        name: &'static str,
        kind: EventKind,
        layout: &'static RecordLayout,
        field: &'static str,
    ) -> FieldProp<V> {
        FieldProp {
            name,
            kind,
            layout,
            field,
            default: None,
            check: Check::Any,
        }
    }

    pub fn default_value(mut self, value: V) -> FieldProp<V> {
        self.default = Some(value);
        self
    }

    pub fn check(mut self, check: Check<V>) -> FieldProp<V> {
        self.check = check;
        self
    }

    pub fn get<M: Model + ?Sized>(&self, model: &M) -> Result<Option<V>> {
        let events = model.events();
        let Some(id) = events.first_of_kind(KindSet::new().with(self.kind))? else {
            return Ok(self.default.clone());
        };

        let value = events.with_id(id, |e| self.layout.get(e.payload(), self.field))??;
        match value {
            Some(value) => V::try_from(value).map(Some).map_err(|_| self.mismatch()),
            None => Ok(self.default.clone()),
        }
    }

    /// Fails the way [`set`](FieldProp::set) would, without writing.
    /// Lets a caller check every field of a multi-field write first.
    pub fn validate<M: Model + ?Sized>(&self, model: &M, value: &V) -> Result<()> {
        self.check.validate(self.name, value, model.context())?;

        let events = model.events();
        if let Some(id) = events.first_of_kind(KindSet::new().with(self.kind))? {
            let mut scratch = events.with_id(id, |e| e.payload().to_vec())?;
            self.layout.set(&mut scratch, self.field, &value.clone().into())?;
        }

        Ok(())
    }

    pub fn set<M: Model + ?Sized>(&self, model: &mut M, value: V) -> Result<()> {
        self.check.validate(self.name, &value, model.context())?;
        let value = value.into();

        match model.events().first_of_kind(KindSet::new().with(self.kind))? {
            Some(id) => model
                .events()
                .with_id_mut(id, |e| self.layout.set(e.payload_mut(), self.field, &value))??,
            None => {
                let mut payload = vec![0; self.layout.len()];
                self.layout.set(&mut payload, self.field, &value)?;
                model.materialize(Event::new(self.kind, &payload)?)?;
                trace!(prop = self.name, kind = %self.kind, "materialized event");
            }
        }

        Ok(())
    }

    #[cold]
    fn mismatch(&self) -> crate::Error {
        match self.layout.field(self.field) {
            Ok(field) => rflp_event::Error::InvalidFieldValue {
                layout: self.layout.name,
                field: self.field,
                expected: field.ty,
            }
            .into(),
            Err(error) => error.into(),
        }
    }
}

/// Attribute stored in a named sub-event of a nested payload.
pub struct SubEventProp<C: Codec> {
    name: &'static str,
    kind: EventKind,
    layout: &'static NestedLayout,
    field: &'static str,
    prefix: &'static [u8],
    codec: C,
    default: Option<C::Value>,
    check: Check<C::Value>,
}

impl<C: Codec> SubEventProp<C> {
    /// `prefix` is written before the first sub-event when the data event
    /// has to be created.
    pub fn new(
        name: &'static str,
        kind: EventKind,
        layout: &'static NestedLayout,
        field: &'static str,
        prefix: &'static [u8],
        codec: C,
    ) -> SubEventProp<C> {
        SubEventProp {
            name,
            kind,
            layout,
            field,
            prefix,
            codec,
            default: None,
            check: Check::Any,
        }
    }

    pub fn default_value(mut self, value: C::Value) -> SubEventProp<C> {
        self.default = Some(value);
        self
    }

    pub fn check(mut self, check: Check<C::Value>) -> SubEventProp<C> {
        self.check = check;
        self
    }

    pub fn get<M: Model + ?Sized>(&self, model: &M) -> Result<Option<C::Value>> {
        let events = model.events();
        let Some(id) = events.first_of_kind(KindSet::new().with(self.kind))? else {
            return Ok(self.default.clone());
        };

        let data = events.with_id(id, |e| self.layout.get(e.payload(), self.field))??;
        match data {
            Some(data) => Ok(Some(self.codec.decode(&data, model.context())?)),
            None => Ok(self.default.clone()),
        }
    }

    pub fn set<M: Model + ?Sized>(&self, model: &mut M, value: C::Value) -> Result<()> {
        let ctx = *model.context();
        self.check.validate(self.name, &value, &ctx)?;
        let data = self.codec.encode(&value, &ctx)?;

        match model.events().first_of_kind(KindSet::new().with(self.kind))? {
            Some(id) => {
                let events = model.events();
                let payload = events.with_id(id, |e| self.layout.set(e.payload(), self.field, &data))??;
                events.set_payload(id, &payload)?;
            }
            None => {
                let sub_kind = self.layout.field(self.field)?.kind;
                let mut nested = NestedPayload::new(self.prefix);
                nested.set(sub_kind, &data);
                model.materialize(Event::new(self.kind, &nested.encode())?)?;
                trace!(prop = self.name, kind = %self.kind, "materialized event");
            }
        }

        Ok(())
    }
}
