use rflp_core::{varint_len, Reader, Writer};
use smallvec::SmallVec;

use crate::kind::EventKind;
use crate::{Error, Result};

/// Payload storage. Fixed-width payloads always fit inline.
pub type Payload = SmallVec<[u8; 4]>;

/// One TLV unit of the event stream.
///
/// The kind is fixed for the lifetime of the event. The payload of a
/// fixed-width kind can be rewritten but never resized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    kind: EventKind,
    payload: Payload,
}

impl Event {
    pub fn new(kind: EventKind, payload: &[u8]) -> Result<Event> {
        check_width(kind, payload.len())?;
        Ok(Event {
            kind,
            payload: Payload::from_slice(payload),
        })
    }

    /// Event with an all-zero payload of the width implied by `kind`, or an
    /// empty payload for length-prefixed kinds.
    pub fn zeroed(kind: EventKind) -> Event {
        Event {
            kind,
            payload: SmallVec::from_elem(0, kind.fixed_len().unwrap_or(0)),
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Mutable access that cannot change the payload length.
    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.payload
    }

    pub fn set_payload(&mut self, payload: &[u8]) -> Result<()> {
        check_width(self.kind, payload.len())?;
        self.payload.clear();
        self.payload.extend_from_slice(payload);
        Ok(())
    }

    pub fn encoded_size(&self) -> usize {
        let len = self.payload.len();
        match self.kind.fixed_len() {
            Some(_) => 1 + len,
            None => 1 + varint_len(len as u64) + len,
        }
    }

    /// Decodes the next event, or returns `None` at the end of the stream.
    pub fn decode(reader: &mut Reader<'_>) -> Result<Option<Event>> {
        if reader.is_empty() {
            return Ok(None);
        }

        let kind = EventKind(reader.read_u8()?);
        let len = match kind.fixed_len() {
            Some(len) => len,
            None => {
                let offset = reader.offset();
                let len = reader.read_varint()?;
                // Padded prefixes would not survive a round trip.
                if reader.offset() - offset != varint_len(len) {
                    return Err(Error::MalformedVarint { offset });
                }
                usize::try_from(len).map_err(|_| Error::CorruptStream {
                    offset,
                    needed: usize::MAX,
                    available: reader.remaining(),
                })?
            }
        };

        let payload = reader.read_bytes(len)?;

        Ok(Some(Event {
            kind,
            payload: Payload::from_slice(payload),
        }))
    }

    pub fn encode(&self, writer: &mut Writer) {
        writer.write_u8(self.kind.0);
        if self.kind.is_prefixed() {
            writer.write_varint(self.payload.len() as u64);
        }
        writer.write_bytes(&self.payload);
    }
}

fn check_width(kind: EventKind, len: usize) -> Result<()> {
    match kind.fixed_len() {
        Some(expected) if expected != len => Err(Error::WidthMismatch {
            kind,
            expected,
            actual: len,
        }),
        _ => Ok(()),
    }
}
