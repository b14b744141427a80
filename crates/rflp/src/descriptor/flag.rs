use rflp_event::{Event, EventKind, FieldValue, KindSet, RecordLayout};
use tracing::trace;

use super::Model;
use crate::Result;

fn read_bits(payload: &[u8]) -> u64 {
    let mut buf = [0; 8];
    let len = payload.len().min(8);
    buf[..len].copy_from_slice(&payload[..len]);
    u64::from_le_bytes(buf)
}

fn write_bits(payload: &mut [u8], bits: u64) {
    let len = payload.len().min(8);
    payload[..len].copy_from_slice(&bits.to_le_bytes()[..len]);
}

fn apply(bits: u64, mask: u64, on: bool) -> u64 {
    if on {
        bits | mask
    } else {
        bits & !mask
    }
}

/// Boolean backed by bits of a fixed-width integer event shared with other
/// flags. Writes read, modify and write back the whole event.
pub struct FlagProp {
    name: &'static str,
    kind: EventKind,
    mask: u64,
    default: bool,
}

impl FlagProp {
    pub const fn new(name: &'static str, kind: EventKind, mask: u64) -> FlagProp {
        FlagProp {
            name,
            kind,
            mask,
            default: false,
        }
    }

    pub const fn default_value(mut self, default: bool) -> FlagProp {
        self.default = default;
        self
    }

    pub fn get<M: Model + ?Sized>(&self, model: &M) -> Result<bool> {
        let events = model.events();
        match events.first_of_kind(KindSet::new().with(self.kind))? {
            Some(id) => Ok(events.with_id(id, |e| read_bits(e.payload()) & self.mask != 0)?),
            None => Ok(self.default),
        }
    }

    pub fn set<M: Model + ?Sized>(&self, model: &mut M, on: bool) -> Result<()> {
        match model.events().first_of_kind(KindSet::new().with(self.kind))? {
            Some(id) => model.events().with_id_mut(id, |e| {
                let bits = apply(read_bits(e.payload()), self.mask, on);
                write_bits(e.payload_mut(), bits);
            })?,
            None => {
                let mut event = Event::zeroed(self.kind);
                write_bits(event.payload_mut(), apply(0, self.mask, on));
                model.materialize(event)?;
                trace!(prop = self.name, kind = %self.kind, "materialized event");
            }
        }

        Ok(())
    }
}

/// Boolean backed by bits of an integer field inside a record event.
pub struct RecordFlagProp {
    name: &'static str,
    kind: EventKind,
    layout: &'static RecordLayout,
    field: &'static str,
    mask: u64,
    default: bool,
}

impl RecordFlagProp {
    pub const fn new(
        name: &'static str,
        kind: EventKind,
        layout: &'static RecordLayout,
        field: &'static str,
        mask: u64,
    ) -> RecordFlagProp {
        RecordFlagProp {
            name,
            kind,
            layout,
            field,
            mask,
            default: false,
        }
    }

    pub const fn default_value(mut self, default: bool) -> RecordFlagProp {
        self.default = default;
        self
    }

    pub fn get<M: Model + ?Sized>(&self, model: &M) -> Result<bool> {
        let events = model.events();
        let Some(id) = events.first_of_kind(KindSet::new().with(self.kind))? else {
            return Ok(self.default);
        };

        let value = events.with_id(id, |e| self.layout.get(e.payload(), self.field))??;
        Ok(match value.and_then(|v| v.to_bits()) {
            Some(bits) => bits & self.mask != 0,
            None => self.default,
        })
    }

    pub fn set<M: Model + ?Sized>(&self, model: &mut M, on: bool) -> Result<()> {
        let ty = self.layout.field(self.field)?.ty;

        let update = |payload: &mut [u8]| -> rflp_event::Result<()> {
            let current = self.layout.get(payload, self.field)?;
            let bits = current.and_then(|v| v.to_bits()).unwrap_or(0);
            let value = FieldValue::from_bits(ty, apply(bits, self.mask, on)).ok_or(
                rflp_event::Error::InvalidFieldValue {
                    layout: self.layout.name,
                    field: self.field,
                    expected: ty,
                },
            )?;
            self.layout.set(payload, self.field, &value)
        };

        match model.events().first_of_kind(KindSet::new().with(self.kind))? {
            Some(id) => model.events().with_id_mut(id, |e| update(e.payload_mut()))??,
            None => {
                let mut payload = vec![0; self.layout.len()];
                update(&mut payload)?;
                model.materialize(Event::new(self.kind, &payload)?)?;
                trace!(prop = self.name, kind = %self.kind, "materialized event");
            }
        }

        Ok(())
    }
}
