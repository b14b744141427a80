//! Whole event streams.

use rflp_core::{Reader, Writer};
use tracing::debug;

use crate::collection::{EventCollection, View};
use crate::event::Event;
use crate::Result;

/// Decodes events until `data` is exhausted.
///
/// Truncation anywhere in the stream is fatal: offsets after a short event
/// cannot be recovered.
pub fn decode_events(data: &[u8]) -> Result<EventCollection> {
    let mut reader = Reader::new(data);
    decode_from(&mut reader)
}

pub fn decode_from(reader: &mut Reader<'_>) -> Result<EventCollection> {
    let mut events = Vec::new();
    while let Some(event) = Event::decode(reader)? {
        events.push(event);
    }

    debug!(events = events.len(), "decoded event stream");
    Ok(EventCollection::from_events(events))
}

/// Encodes every visible event of `view` in order. Length prefixes are
/// recomputed from the current payloads.
pub fn encode_events(view: &View) -> Result<Vec<u8>> {
    let mut writer = Writer::new();
    encode_into(view, &mut writer)?;
    Ok(writer.into_inner())
}

pub fn encode_into(view: &View, writer: &mut Writer) -> Result<()> {
    let mut count = 0;
    view.visit(|_, event| {
        event.encode(writer);
        count += 1;
    })?;

    debug!(events = count, bytes = writer.len(), "encoded event stream");
    Ok(())
}

pub fn encoded_size(view: &View) -> Result<usize> {
    let mut size = 0;
    view.visit(|_, event| size += event.encoded_size())?;
    Ok(size)
}
