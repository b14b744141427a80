use std::fmt;

pub const BYTE: u8 = 0;
pub const WORD: u8 = 64;
pub const DWORD: u8 = 128;
pub const TEXT: u8 = 192;
pub const DATA: u8 = 208;

/// Numeric discriminator of an event. Identifies both the role of the event
/// and the width of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKind(pub u8);

impl EventKind {
    pub const fn new(id: u8) -> EventKind {
        EventKind(id)
    }

    pub const fn id(self) -> u8 {
        self.0
    }

    pub const fn width(self) -> Width {
        Width::of(self)
    }

    /// Payload length implied by the kind, or `None` for length-prefixed
    /// kinds.
    pub const fn fixed_len(self) -> Option<usize> {
        self.width().fixed_len()
    }

    pub const fn is_prefixed(self) -> bool {
        matches!(self.width(), Width::Prefixed)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u8> for EventKind {
    fn from(id: u8) -> EventKind {
        EventKind(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    Byte,
    Word,
    DWord,
    Prefixed,
}

impl Width {
    pub const fn of(kind: EventKind) -> Width {
        match kind.0 {
            0..=63 => Width::Byte,
            64..=127 => Width::Word,
            128..=191 => Width::DWord,
            _ => Width::Prefixed,
        }
    }

    pub const fn fixed_len(self) -> Option<usize> {
        match self {
            Width::Byte => Some(1),
            Width::Word => Some(2),
            Width::DWord => Some(4),
            Width::Prefixed => None,
        }
    }
}

/// Set of event kinds backed by a 256-bit mask.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KindSet([u64; 4]);

impl KindSet {
    pub const EMPTY: KindSet = KindSet([0; 4]);
    pub const ALL: KindSet = KindSet([u64::MAX; 4]);

    pub const fn new() -> KindSet {
        KindSet::EMPTY
    }

    pub const fn with(mut self, kind: EventKind) -> KindSet {
        self.0[(kind.0 >> 6) as usize] |= 1 << (kind.0 & 63);
        self
    }

    pub const fn from_slice(kinds: &[EventKind]) -> KindSet {
        let mut set = KindSet::EMPTY;
        let mut i = 0;
        while i < kinds.len() {
            set = set.with(kinds[i]);
            i += 1;
        }
        set
    }

    pub fn insert(&mut self, kind: EventKind) {
        *self = self.with(kind);
    }

    pub fn remove(&mut self, kind: EventKind) {
        self.0[(kind.0 >> 6) as usize] &= !(1 << (kind.0 & 63));
    }

    pub const fn contains(&self, kind: EventKind) -> bool {
        self.0[(kind.0 >> 6) as usize] & (1 << (kind.0 & 63)) != 0
    }

    pub fn union(self, other: KindSet) -> KindSet {
        KindSet(std::array::from_fn(|i| self.0[i] | other.0[i]))
    }

    pub fn intersection(self, other: KindSet) -> KindSet {
        KindSet(std::array::from_fn(|i| self.0[i] & other.0[i]))
    }

    pub fn is_empty(&self) -> bool {
        self.0 == [0; 4]
    }

    pub fn iter(&self) -> impl Iterator<Item = EventKind> + '_ {
        (0..=u8::MAX)
            .map(EventKind)
            .filter(|&kind| self.contains(kind))
    }
}

impl fmt::Debug for KindSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|k| k.0)).finish()
    }
}

impl FromIterator<EventKind> for KindSet {
    fn from_iter<I: IntoIterator<Item = EventKind>>(iter: I) -> KindSet {
        let mut set = KindSet::EMPTY;
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_classes() {
        for id in 0..=u8::MAX {
            let kind = EventKind(id);
            let expected = match id {
                0..=63 => Some(1),
                64..=127 => Some(2),
                128..=191 => Some(4),
                _ => None,
            };
            assert_eq!(kind.fixed_len(), expected, "kind {id}");
            assert_eq!(kind.is_prefixed(), expected.is_none());
        }
    }

    #[test]
    fn kind_set() {
        let mut set = KindSet::from_slice(&[EventKind(0), EventKind(64), EventKind(255)]);
        assert!(set.contains(EventKind(0)));
        assert!(set.contains(EventKind(255)));
        assert!(!set.contains(EventKind(1)));

        set.remove(EventKind(64));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![EventKind(0), EventKind(255)]);

        let other: KindSet = [EventKind(255), EventKind(3)].into_iter().collect();
        assert_eq!(
            set.intersection(other).iter().collect::<Vec<_>>(),
            vec![EventKind(255)]
        );
        assert_eq!(set.union(other).iter().count(), 3);
        assert!(KindSet::EMPTY.is_empty());
        assert_eq!(KindSet::ALL.iter().count(), 256);
    }
}
