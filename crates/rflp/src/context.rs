use rflp_event::TextEncoding;

use crate::FlVersion;

/// Read-only facts about a file that change how some events are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Context {
    pub version: Option<FlVersion>,
    pub encoding: TextEncoding,
}

impl Context {
    /// Files without a version event are treated as UTF-16.
    pub fn new(version: Option<FlVersion>) -> Context {
        Context {
            version,
            encoding: version.map_or(TextEncoding::Utf16Le, |v| v.text_encoding()),
        }
    }
}
