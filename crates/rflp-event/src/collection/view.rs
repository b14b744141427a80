use std::cell::{Cell, RefCell};
use std::fmt;
use std::ops::{Bound, Range, RangeBounds};
use std::rc::Rc;

use smallvec::{smallvec, SmallVec};

use super::{EventId, Store};
use crate::event::{Event, Payload};
use crate::kind::{EventKind, KindSet};
use crate::{Error, Result};

type Predicate = Rc<dyn Fn(&Event) -> bool>;
type Spans = SmallVec<[Rc<SpanCell>; 1]>;

/// Span record shared by every handle derived from the same view. `None`
/// once the span lost all of its events.
pub(super) type SpanCell = Cell<Option<Span>>;

/// Contiguous run of the collection. `None` bounds are open and follow the
/// start or end of the collection; anchored bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Span {
    first: Option<EventId>,
    last: Option<EventId>,
}

impl Span {
    const OPEN: Span = Span {
        first: None,
        last: None,
    };

    fn between(first: EventId, last: EventId) -> Span {
        Span {
            first: Some(first),
            last: Some(last),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Located {
    span: usize,
    position: usize,
    id: EventId,
}

/// A window onto an [`EventCollection`](super::EventCollection).
///
/// A view is made of one or more spans of the collection plus an optional
/// filter on which events inside them are visible. Indices passed to a view
/// count visible events only. Reads and writes go straight to the shared
/// storage, so parents and siblings observe them without any bookkeeping.
///
/// Spans are anchored to their first and last events. A view keeps its own
/// anchors up to date when events are inserted or removed through it; if an
/// anchor is removed through a different handle the view reports
/// [`Error::DanglingView`].
///
/// Span records live in the shared storage. An insert at the edge of a view
/// moves that edge for every view anchored on the same event, so nested
/// views, clones and separately derived handles over the same run all see it.
#[derive(Clone)]
pub struct View {
    store: Rc<RefCell<Store>>,
    spans: Spans,
    kinds: KindSet,
    predicate: Option<Predicate>,
}

impl View {
    pub(super) fn root(store: Rc<RefCell<Store>>) -> View {
        let span = store.borrow_mut().track(Span::OPEN);
        View {
            store,
            spans: smallvec![span],
            kinds: KindSet::ALL,
            predicate: None,
        }
    }

    fn derive(&self, spans: impl IntoIterator<Item = Span>) -> View {
        let mut store = self.store.borrow_mut();
        let spans = spans.into_iter().map(|span| store.track(span)).collect();
        drop(store);

        View {
            store: self.store.clone(),
            spans,
            kinds: self.kinds,
            predicate: self.predicate.clone(),
        }
    }

    fn accepts(&self, event: &Event) -> bool {
        self.kinds.contains(event.kind()) && self.predicate.as_ref().map_or(true, |p| p(event))
    }

    /// Absolute ranges of the view's live spans, tagged with the span index.
    fn resolve(&self, store: &mut Store) -> Result<SmallVec<[(usize, Range<usize>); 1]>> {
        self.spans
            .iter()
            .enumerate()
            .filter_map(|(index, cell)| cell.get().map(|span| (index, span)))
            .map(|(index, span)| {
                let start = match span.first {
                    Some(id) => store.position(id).ok_or(Error::DanglingView)?,
                    None => 0,
                };
                let end = match span.last {
                    Some(id) => store.position(id).ok_or(Error::DanglingView)? + 1,
                    None => store.len(),
                };

                if start > end {
                    return Err(Error::DanglingView);
                }

                Ok((index, start..end))
            })
            .collect()
    }

    fn locate_in(&self, store: &Store, ranges: &[(usize, Range<usize>)]) -> Vec<Located> {
        let mut located = Vec::new();
        for &(span, ref range) in ranges {
            for position in range.clone() {
                let id = store.order[position];
                if self.accepts(&store.events[id]) {
                    located.push(Located { span, position, id });
                }
            }
        }
        located
    }

    fn locate(&self) -> Result<Vec<Located>> {
        let mut store = self.store.borrow_mut();
        let ranges = self.resolve(&mut store)?;
        Ok(self.locate_in(&store, &ranges))
    }

    fn nth(&self, index: usize) -> Result<Located> {
        let located = self.locate()?;
        located.get(index).copied().ok_or(Error::IndexOutOfBounds {
            index,
            len: located.len(),
        })
    }

    /// View over the whole collection this view belongs to.
    pub fn root_view(&self) -> View {
        View::root(self.store.clone())
    }

    pub fn shares_storage(&self, other: &View) -> bool {
        Rc::ptr_eq(&self.store, &other.store)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.locate()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn ids(&self) -> Result<Vec<EventId>> {
        Ok(self.locate()?.into_iter().map(|l| l.id).collect())
    }

    pub fn events(&self) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        self.visit(|_, event| events.push(event.clone()))?;
        Ok(events)
    }

    /// Calls `f` for every visible event in order. The collection cannot be
    /// modified from inside `f`.
    pub fn visit(&self, mut f: impl FnMut(EventId, &Event)) -> Result<()> {
        let located = self.locate()?;
        let store = self.store.borrow();
        for item in located {
            f(item.id, &store.events[item.id]);
        }
        Ok(())
    }

    pub fn id_at(&self, index: usize) -> Result<EventId> {
        Ok(self.nth(index)?.id)
    }

    pub fn get(&self, index: usize) -> Result<Event> {
        self.with_event(index, Event::clone)
    }

    pub fn event(&self, id: EventId) -> Result<Event> {
        self.with_id(id, Event::clone)
    }

    pub fn contains(&self, id: EventId) -> Result<bool> {
        Ok(self.locate()?.iter().any(|l| l.id == id))
    }

    pub fn with_event<R>(&self, index: usize, f: impl FnOnce(&Event) -> R) -> Result<R> {
        let id = self.id_at(index)?;
        self.with_id(id, f)
    }

    pub fn with_event_mut<R>(&self, index: usize, f: impl FnOnce(&mut Event) -> R) -> Result<R> {
        let id = self.id_at(index)?;
        self.with_id_mut(id, f)
    }

    pub fn with_id<R>(&self, id: EventId, f: impl FnOnce(&Event) -> R) -> Result<R> {
        let store = self.store.borrow();
        store.get(id).map(f).ok_or(Error::UnknownEvent)
    }

    pub fn with_id_mut<R>(&self, id: EventId, f: impl FnOnce(&mut Event) -> R) -> Result<R> {
        let mut store = self.store.borrow_mut();
        store.get_mut(id).map(f).ok_or(Error::UnknownEvent)
    }

    pub fn set_payload(&self, id: EventId, payload: &[u8]) -> Result<()> {
        self.with_id_mut(id, |event| event.set_payload(payload))?
    }

    pub fn ids_of_kind(&self, kind: EventKind) -> Result<Vec<EventId>> {
        if !self.kinds.contains(kind) {
            return Ok(Vec::new());
        }

        let mut store = self.store.borrow_mut();
        let ranges = self.resolve(&mut store)?;
        let positions = store.positions_of_kind(kind);

        let mut ids = Vec::new();
        for (_, range) in &ranges {
            let lo = positions.partition_point(|&p| p < range.start);
            let hi = positions.partition_point(|&p| p < range.end);
            for &position in &positions[lo..hi] {
                let id = store.order[position];
                if self.accepts(&store.events[id]) {
                    ids.push(id);
                }
            }
        }

        Ok(ids)
    }

    /// Events of `kind` in collection order.
    pub fn events_of_kind(&self, kind: EventKind) -> Result<Vec<Event>> {
        let ids = self.ids_of_kind(kind)?;
        let store = self.store.borrow();
        Ok(ids.into_iter().map(|id| store.events[id].clone()).collect())
    }

    /// First visible event whose kind is in `kinds`.
    pub fn first_of_kind(&self, kinds: KindSet) -> Result<Option<EventId>> {
        let mut store = self.store.borrow_mut();
        let ranges = self.resolve(&mut store)?;
        let kinds = kinds.intersection(self.kinds);

        for (_, range) in ranges {
            for position in range {
                let id = store.order[position];
                let event = &store.events[id];
                if kinds.contains(event.kind()) && self.accepts(event) {
                    return Ok(Some(id));
                }
            }
        }

        Ok(None)
    }

    pub fn count(&self, kind: EventKind) -> Result<usize> {
        Ok(self.ids_of_kind(kind)?.len())
    }

    pub fn contains_kind(&self, kind: EventKind) -> Result<bool> {
        Ok(self.first_of_kind(KindSet::new().with(kind))?.is_some())
    }

    /// Inserts `event` before the visible event at `index`, or after the end
    /// of the view if `index` equals its length.
    ///
    /// Inserting before the first event of the view, or after its last one,
    /// extends every view that starts or ends at the same event.
    pub fn insert(&mut self, index: usize, event: Event) -> Result<EventId> {
        if !self.accepts(&event) {
            return Err(Error::KindNotInView { kind: event.kind() });
        }

        let mut store = self.store.borrow_mut();
        let ranges = self.resolve(&mut store)?;
        let located = self.locate_in(&store, &ranges);

        let (span, position, target) = match located.get(index) {
            Some(item) => (item.span, item.position, Some(item.id)),
            None if index == located.len() => {
                let (span, range) = ranges.last().ok_or(Error::EmptyView)?;
                (*span, range.end, None)
            }
            None => {
                return Err(Error::IndexOutOfBounds {
                    index,
                    len: located.len(),
                })
            }
        };

        let id = store.insert(position, event);

        let Some(bounds) = self.spans[span].get() else {
            return Ok(id);
        };
        match (target, bounds.last) {
            (Some(target), _) if bounds.first == Some(target) => store.retarget(|mut span| {
                if span.first == Some(target) {
                    span.first = Some(id);
                }
                Some(span)
            }),
            (None, Some(last)) => store.retarget(|mut span| {
                if span.last == Some(last) {
                    span.last = Some(id);
                }
                Some(span)
            }),
            _ => {}
        }

        Ok(id)
    }

    pub fn push(&mut self, event: Event) -> Result<EventId> {
        let len = self.len()?;
        self.insert(len, event)
    }

    /// Inserts `event` right before the visible event `id`.
    pub fn insert_before(&mut self, id: EventId, event: Event) -> Result<EventId> {
        let index = self
            .locate()?
            .iter()
            .position(|l| l.id == id)
            .ok_or(Error::UnknownEvent)?;
        self.insert(index, event)
    }

    pub fn remove(&mut self, index: usize) -> Result<Event> {
        let mut store = self.store.borrow_mut();
        let ranges = self.resolve(&mut store)?;
        let located = self.locate_in(&store, &ranges);
        let target = *located.get(index).ok_or(Error::IndexOutOfBounds {
            index,
            len: located.len(),
        })?;

        detach(&self.spans, &mut store, target);
        store.remove(target.id).ok_or(Error::UnknownEvent)
    }

    pub fn remove_id(&mut self, id: EventId) -> Result<Event> {
        let mut store = self.store.borrow_mut();
        let ranges = self.resolve(&mut store)?;
        let located = self.locate_in(&store, &ranges);
        let target = *located
            .iter()
            .find(|l| l.id == id)
            .ok_or(Error::UnknownEvent)?;

        detach(&self.spans, &mut store, target);
        store.remove(target.id).ok_or(Error::UnknownEvent)
    }

    /// Removes the `nth` event of `kind`, counting from zero.
    pub fn remove_of_kind(&mut self, kind: EventKind, nth: usize) -> Result<Event> {
        let ids = self.ids_of_kind(kind)?;
        let id = *ids.get(nth).ok_or(Error::IndexOutOfBounds {
            index: nth,
            len: ids.len(),
        })?;
        self.remove_id(id)
    }

    /// Sub-view over a range of visible indices.
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Result<View> {
        let located = self.locate()?;
        let len = located.len();

        let start = match range.start_bound() {
            Bound::Included(&start) => start,
            Bound::Excluded(&start) => start + 1,
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&end) => end + 1,
            Bound::Excluded(&end) => end,
            Bound::Unbounded => len,
        };

        if end > len {
            return Err(Error::IndexOutOfBounds { index: end, len });
        }
        if start > end {
            return Err(Error::IndexOutOfBounds { index: start, len });
        }

        let mut spans: SmallVec<[(usize, Span); 1]> = SmallVec::new();
        for item in &located[start..end] {
            match spans.last_mut() {
                Some((span, run)) if *span == item.span => run.last = Some(item.id),
                _ => spans.push((item.span, Span::between(item.id, item.id))),
            }
        }

        Ok(self.derive(spans.into_iter().map(|(_, span)| span)))
    }

    /// Narrows the view to events whose kind is in `kinds`.
    pub fn filter(&self, kinds: KindSet) -> View {
        let mut view = self.clone();
        view.kinds = self.kinds.intersection(kinds);
        view
    }

    /// Narrows the view to events matching `predicate`.
    pub fn filter_by(&self, predicate: impl Fn(&Event) -> bool + 'static) -> View {
        let predicate: Predicate = match self.predicate.clone() {
            Some(outer) => Rc::new(move |event: &Event| outer(event) && predicate(event)),
            None => Rc::new(predicate),
        };

        let mut view = self.clone();
        view.predicate = Some(predicate);
        view
    }

    fn runs(&self, marker: EventKind, stops: KindSet) -> Result<Vec<(EventId, Span)>> {
        if !self.kinds.contains(marker) {
            return Ok(Vec::new());
        }

        let mut store = self.store.borrow_mut();
        let ranges = self.resolve(&mut store)?;
        let markers = store.positions_of_kind(marker);

        let mut bounds = markers.clone();
        for kind in stops.iter().filter(|&k| k != marker) {
            bounds.extend(store.positions_of_kind(kind));
        }
        bounds.sort_unstable();

        let mut runs = Vec::new();
        for (_, range) in &ranges {
            let lo = markers.partition_point(|&p| p < range.start);
            let hi = markers.partition_point(|&p| p < range.end);

            for &start in &markers[lo..hi] {
                let first = store.order[start];
                if !self.accepts(&store.events[first]) {
                    continue;
                }

                let next = bounds.partition_point(|&p| p <= start);
                let end = bounds.get(next).copied().unwrap_or(usize::MAX).min(range.end);
                runs.push((first, Span::between(first, store.order[end - 1])));
            }
        }

        Ok(runs)
    }

    /// Splits the view into runs that each start at an event of `marker`
    /// and end just before the next one. Events preceding the first marker
    /// belong to no run.
    pub fn group_by(&self, marker: EventKind) -> Result<Vec<View>> {
        self.group_by_until(marker, KindSet::EMPTY)
    }

    /// Like [`group_by`](View::group_by), but a run also ends before any
    /// event whose kind is in `stops`.
    pub fn group_by_until(&self, marker: EventKind, stops: KindSet) -> Result<Vec<View>> {
        Ok(self
            .runs(marker, stops)?
            .into_iter()
            .map(|(_, span)| self.derive([span]))
            .collect())
    }

    /// Like [`group_by`](View::group_by), but runs whose markers carry equal
    /// payloads are merged into a single view, ordered by first appearance.
    pub fn group_by_value(&self, marker: EventKind) -> Result<Vec<View>> {
        self.group_by_value_until(marker, KindSet::EMPTY)
    }

    pub fn group_by_value_until(&self, marker: EventKind, stops: KindSet) -> Result<Vec<View>> {
        let runs = self.runs(marker, stops)?;
        let store = self.store.borrow();

        let mut groups: Vec<(Payload, SmallVec<[Span; 1]>)> = Vec::new();
        for (marker, span) in runs {
            let key = store.events[marker].payload();
            match groups.iter_mut().find(|(k, _)| k.as_slice() == key) {
                Some((_, spans)) => spans.push(span),
                None => groups.push((Payload::from_slice(key), smallvec![span])),
            }
        }
        drop(store);

        Ok(groups
            .into_iter()
            .map(|(_, spans)| self.derive(spans))
            .collect())
    }

    /// One single-event view per occurrence of `kind`.
    pub fn separate(&self, kind: EventKind) -> Result<Vec<View>> {
        Ok(self
            .ids_of_kind(kind)?
            .into_iter()
            .map(|id| self.derive([Span::between(id, id)]))
            .collect())
    }
}

/// Moves anchors off an event that is about to be removed. Only edges the
/// removing view anchors itself are moved; other views anchored on the event
/// are left dangling.
fn detach(spans: &Spans, store: &mut Store, target: Located) {
    let anchor = Some(target.id);
    let (at_first, at_last) = spans
        .iter()
        .filter_map(|cell| cell.get())
        .fold((false, false), |(first, last), span| {
            (first || span.first == anchor, last || span.last == anchor)
        });

    if !at_first && !at_last {
        return;
    }

    let prev = target
        .position
        .checked_sub(1)
        .and_then(|p| store.id_at(p));
    let next = store.id_at(target.position + 1);

    store.retarget(|mut span| {
        let is_first = span.first == anchor;
        let is_last = span.last == anchor;

        if !(at_first && is_first) && !(at_last && is_last) {
            return Some(span);
        }

        if is_first && is_last {
            return None;
        }

        if is_first {
            span.first = Some(next?);
        }

        if is_last {
            span.last = Some(prev?);
        }

        Some(span)
    });
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("spans", &self.spans)
            .field("kinds", &self.kinds)
            .field("filtered", &self.predicate.is_some())
            .finish_non_exhaustive()
    }
}
