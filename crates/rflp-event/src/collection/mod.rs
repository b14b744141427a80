//! Ordered event storage shared between a collection and its views.
//!
//! Events live in a slot map and keep their [`EventId`] for as long as they
//! exist, so views can anchor themselves to events instead of to indices that
//! shift on every insert. Positions and the per-kind index are derived data,
//! rebuilt on demand after the order changes.
//!
//! The storage is reference counted and not thread safe. A collection and all
//! views derived from it must stay on one thread and be mutated by one caller
//! at a time.

mod view;


use std::cell::RefCell;
use std::ops::{Deref, DerefMut};
use std::rc::{Rc, Weak};

use rflp_core::collections::HashMap;
use slotmap::{SecondaryMap, SlotMap};
use tracing::trace;

use self::view::{Span, SpanCell};
pub use self::view::View;
use crate::event::Event;
use crate::kind::{EventKind, KindSet};

slotmap::new_key_type! {
    /// Stable identity of an event within its collection.
    pub struct EventId;
}

#[derive(Debug, Default)]
pub(crate) struct Store {
    events: SlotMap<EventId, Event>,
    order: Vec<EventId>,
    positions: SecondaryMap<EventId, usize>,
    positions_valid: bool,
    kind_index: HashMap<EventKind, Vec<EventId>>,
    stale_kinds: KindSet,
    spans: Vec<Weak<SpanCell>>,
}

impl Store {
    fn from_events(events: impl IntoIterator<Item = Event>) -> Store {
        let mut store = Store::default();
        for event in events {
            let id = store.events.insert(event);
            store.order.push(id);
        }
        store.stale_kinds = KindSet::ALL;
        store
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn get(&self, id: EventId) -> Option<&Event> {
        self.events.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: EventId) -> Option<&mut Event> {
        self.events.get_mut(id)
    }

    pub(crate) fn id_at(&self, position: usize) -> Option<EventId> {
        self.order.get(position).copied()
    }

    pub(crate) fn position(&mut self, id: EventId) -> Option<usize> {
        self.reindex();
        self.positions.get(id).copied()
    }

    fn reindex(&mut self) {
        if self.positions_valid {
            return;
        }

        self.positions.clear();
        for (position, &id) in self.order.iter().enumerate() {
            self.positions.insert(id, position);
        }
        self.positions_valid = true;
    }

    fn rebuild_kind_index(&mut self) {
        let stale = self.stale_kinds;
        trace!(kinds = ?stale, "rebuilding kind index");

        for kind in stale.iter() {
            if let Some(ids) = self.kind_index.get_mut(&kind) {
                ids.clear();
            }
        }

        for &id in &self.order {
            let kind = self.events[id].kind();
            if stale.contains(kind) {
                self.kind_index.entry(kind).or_default().push(id);
            }
        }

        self.kind_index.retain(|_, ids| !ids.is_empty());
        self.stale_kinds = KindSet::EMPTY;
    }

    /// Positions of all events of `kind`, ascending.
    pub(crate) fn positions_of_kind(&mut self, kind: EventKind) -> Vec<usize> {
        self.reindex();
        if self.stale_kinds.contains(kind) {
            self.rebuild_kind_index();
        }

        let ids = self.kind_index.get(&kind).map_or(&[][..], Vec::as_slice);
        ids.iter().map(|&id| self.positions[id]).collect()
    }

    pub(crate) fn insert(&mut self, position: usize, event: Event) -> EventId {
        let kind = event.kind();
        let id = self.events.insert(event);

        if position == self.order.len() && self.positions_valid {
            self.positions.insert(id, position);
        } else {
            self.positions_valid = false;
        }

        self.order.insert(position, id);
        self.stale_kinds.insert(kind);
        id
    }

    /// Registers a span record. Records are dropped with the last view
    /// holding them.
    fn track(&mut self, span: Span) -> Rc<SpanCell> {
        if self.spans.len() == self.spans.capacity() {
            self.spans.retain(|cell| cell.strong_count() > 0);
        }

        let cell = Rc::new(SpanCell::new(Some(span)));
        self.spans.push(Rc::downgrade(&cell));
        cell
    }

    /// Rewrites every live span record. Returning `None` empties the span.
    fn retarget(&mut self, mut f: impl FnMut(Span) -> Option<Span>) {
        self.spans.retain(|cell| match cell.upgrade() {
            Some(cell) => {
                if let Some(span) = cell.get() {
                    cell.set(f(span));
                }
                true
            }
            None => false,
        });
    }

    pub(crate) fn remove(&mut self, id: EventId) -> Option<Event> {
        let position = self.position(id)?;
        self.order.remove(position);
        self.positions.remove(id);
        if position != self.order.len() {
            self.positions_valid = false;
        }

        let event = self.events.remove(id)?;
        self.stale_kinds.insert(event.kind());
        Some(event)
    }
}

/// Owner of a decoded event stream.
///
/// Dereferences to the view covering the whole collection. Views created from
/// it (or from each other) share its storage: a change made through any of
/// them is visible to all of them immediately.
#[derive(Debug)]
pub struct EventCollection {
    root: View,
}

impl EventCollection {
    pub fn new() -> EventCollection {
        EventCollection::from_events(Vec::new())
    }

    pub fn from_events(events: impl IntoIterator<Item = Event>) -> EventCollection {
        let store = Rc::new(RefCell::new(Store::from_events(events)));
        EventCollection {
            root: View::root(store),
        }
    }

    pub fn view(&self) -> View {
        self.root.clone()
    }
}

impl Default for EventCollection {
    fn default() -> EventCollection {
        EventCollection::new()
    }
}

impl FromIterator<Event> for EventCollection {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> EventCollection {
        EventCollection::from_events(iter)
    }
}

impl Deref for EventCollection {
    type Target = View;

    fn deref(&self) -> &View {
        &self.root
    }
}

impl DerefMut for EventCollection {
    fn deref_mut(&mut self) -> &mut View {
        &mut self.root
    }
}
