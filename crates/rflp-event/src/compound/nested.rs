//! Payloads made of nested sub-events.
//!
//! A nested payload is an optional fixed prefix followed by
//! `kind:u8, size:u64 LE, data` triples. Every triple is kept as an entry in
//! stream order whether or not its kind is known, and an incomplete triple at
//! the end is kept verbatim as the tail.
//!
//! A sub-event kind may occur more than once. Reads see the last occurrence
//! and writes replace it, leaving earlier occurrences in place. The format
//! itself defines no precedence; last-write-wins is a fixed rule of this
//! codec.

use rflp_core::{Reader, Writer};
use tracing::warn;

use crate::{Error, Result};

const SUB_HEADER_LEN: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubField {
    pub name: &'static str,
    pub kind: u8,
}

impl SubField {
    pub const fn new(name: &'static str, kind: u8) -> SubField {
        SubField { name, kind }
    }
}

/// Named sub-event kinds of a nested payload. Kinds not listed here are
/// still decoded and preserved.
#[derive(Debug)]
pub struct NestedLayout {
    pub name: &'static str,
    pub prefix_len: usize,
    pub fields: &'static [SubField],
}

impl NestedLayout {
    pub const fn new(
        name: &'static str,
        prefix_len: usize,
        fields: &'static [SubField],
    ) -> NestedLayout {
        NestedLayout {
            name,
            prefix_len,
            fields,
        }
    }

    pub fn field(&self, name: &'static str) -> Result<&SubField> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or(Error::UnknownField {
                layout: self.name,
                field: name,
            })
    }

    pub fn decode(&self, payload: &[u8]) -> Result<NestedPayload> {
        NestedPayload::decode(self, payload)
    }

    /// Data of the last sub-event named `name`.
    pub fn get(&self, payload: &[u8], name: &'static str) -> Result<Option<Vec<u8>>> {
        let field = self.field(name)?;
        let nested = self.decode(payload)?;
        Ok(nested.get(field.kind).map(<[u8]>::to_vec))
    }

    /// Re-encodes `payload` with the sub-event named `name` replaced by
    /// `data`. The result may differ in length from the input.
    pub fn set(&self, payload: &[u8], name: &'static str, data: &[u8]) -> Result<Vec<u8>> {
        let field = self.field(name)?;
        let mut nested = self.decode(payload)?;
        nested.set(field.kind, data);
        Ok(nested.encode())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubEvent {
    pub kind: u8,
    pub data: Vec<u8>,
}

impl SubEvent {
    pub fn new(kind: u8, data: impl Into<Vec<u8>>) -> SubEvent {
        SubEvent {
            kind,
            data: data.into(),
        }
    }

    pub fn encoded_size(&self) -> usize {
        SUB_HEADER_LEN + self.data.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NestedPayload {
    prefix: Vec<u8>,
    entries: Vec<SubEvent>,
    tail: Vec<u8>,
}

impl NestedPayload {
    pub fn new(prefix: impl Into<Vec<u8>>) -> NestedPayload {
        NestedPayload {
            prefix: prefix.into(),
            ..NestedPayload::default()
        }
    }

    pub fn decode(layout: &NestedLayout, payload: &[u8]) -> Result<NestedPayload> {
        if payload.len() < layout.prefix_len {
            return Err(Error::MissingPrefix {
                layout: layout.name,
                expected: layout.prefix_len,
                actual: payload.len(),
            });
        }

        let (prefix, body) = payload.split_at(layout.prefix_len);
        let mut reader = Reader::new(body);
        let mut entries = Vec::new();

        while !reader.is_empty() {
            let start = reader.rest();
            match read_sub_event(&mut reader) {
                Some(entry) => entries.push(entry),
                None => {
                    warn!(
                        layout = layout.name,
                        len = start.len(),
                        "incomplete trailing sub-event kept verbatim"
                    );
                    return Ok(NestedPayload {
                        prefix: prefix.to_vec(),
                        entries,
                        tail: start.to_vec(),
                    });
                }
            }
        }

        Ok(NestedPayload {
            prefix: prefix.to_vec(),
            entries,
            tail: Vec::new(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut writer = Writer::with_capacity(self.encoded_size());
        writer.write_bytes(&self.prefix);
        for entry in &self.entries {
            writer.write_u8(entry.kind);
            writer.write_u64(entry.data.len() as u64);
            writer.write_bytes(&entry.data);
        }
        writer.write_bytes(&self.tail);
        writer.into_inner()
    }

    pub fn encoded_size(&self) -> usize {
        let entries = self.entries.iter().map(SubEvent::encoded_size).sum::<usize>();
        self.prefix.len() + entries + self.tail.len()
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    pub fn prefix_mut(&mut self) -> &mut [u8] {
        &mut self.prefix
    }

    pub fn entries(&self) -> &[SubEvent] {
        &self.entries
    }

    pub fn tail(&self) -> &[u8] {
        &self.tail
    }

    pub fn get(&self, kind: u8) -> Option<&[u8]> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.kind == kind)
            .map(|e| e.data.as_slice())
    }

    pub fn get_all(&self, kind: u8) -> impl Iterator<Item = &[u8]> + '_ {
        self.entries
            .iter()
            .filter(move |e| e.kind == kind)
            .map(|e| e.data.as_slice())
    }

    pub fn contains(&self, kind: u8) -> bool {
        self.entries.iter().any(|e| e.kind == kind)
    }

    /// Replaces the data of the last sub-event of `kind`, or appends a new
    /// sub-event after every complete entry if there is none.
    pub fn set(&mut self, kind: u8, data: &[u8]) {
        match self.entries.iter_mut().rev().find(|e| e.kind == kind) {
            Some(entry) => {
                entry.data.clear();
                entry.data.extend_from_slice(data);
            }
            None => self.entries.push(SubEvent::new(kind, data)),
        }
    }

    pub fn push(&mut self, entry: SubEvent) {
        self.entries.push(entry);
    }

    /// Removes every sub-event of `kind`, returning how many were removed.
    pub fn remove(&mut self, kind: u8) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.kind != kind);
        before - self.entries.len()
    }

    /// Drops all but the last occurrence of `kind`.
    pub fn collapse(&mut self, kind: u8) {
        let Some(last) = self.entries.iter().rposition(|e| e.kind == kind) else {
            return;
        };

        let mut index = 0;
        self.entries.retain(|e| {
            let keep = e.kind != kind || index == last;
            index += 1;
            keep
        });
    }
}

fn read_sub_event(reader: &mut Reader<'_>) -> Option<SubEvent> {
    if reader.remaining() < SUB_HEADER_LEN {
        return None;
    }

    let kind = reader.read_u8().ok()?;
    let len = reader.read_u64().ok()?;
    let len = usize::try_from(len).ok()?;
    let data = reader.read_bytes(len).ok()?;

    Some(SubEvent::new(kind, data))
}
