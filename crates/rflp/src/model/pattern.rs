use rflp_event::{Rgba, View};

use crate::descriptor::{Bool, Color, EventProp, Model, Text, U16, U32};
use crate::ids::pattern;
use crate::{Context, Result};

/// A pattern and every run of events that belongs to it.
///
/// The file introduces a pattern once for its notes and again for its
/// metadata, both times with the same index. The view spans all of them, so
/// a property may live in any run.
#[derive(Debug, Clone)]
pub struct Pattern {
    events: View,
    context: Context,
}

impl Model for Pattern {
    fn events(&self) -> &View {
        &self.events
    }

    fn events_mut(&mut self) -> &mut View {
        &mut self.events
    }

    fn context(&self) -> &Context {
        &self.context
    }
}

impl Pattern {
    pub fn new(events: View, context: Context) -> Pattern {
        Pattern { events, context }
    }

    pub fn index(&self) -> Result<Option<u16>> {
        EventProp::new("index", pattern::NEW, U16).get(self)
    }

    pub fn name(&self) -> Result<Option<String>> {
        EventProp::new("name", pattern::NAME, Text).get(self)
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        EventProp::new("name", pattern::NAME, Text).set(self, name.into())
    }

    pub fn color(&self) -> Result<Option<Rgba>> {
        EventProp::new("color", pattern::COLOR, Color).get(self)
    }

    pub fn set_color(&mut self, color: Rgba) -> Result<()> {
        EventProp::new("color", pattern::COLOR, Color).set(self, color)
    }

    pub fn looped(&self) -> Result<bool> {
        Ok(EventProp::new("looped", pattern::LOOPED, Bool)
            .default_value(false)
            .get(self)?
            .unwrap_or_default())
    }

    pub fn set_looped(&mut self, looped: bool) -> Result<()> {
        EventProp::new("looped", pattern::LOOPED, Bool).set(self, looped)
    }

    /// Length in steps, `None` when the pattern sizes itself to its notes.
    pub fn length(&self) -> Result<Option<u32>> {
        EventProp::new("length", pattern::LENGTH, U32).get(self)
    }

    pub fn set_length(&mut self, steps: u32) -> Result<()> {
        EventProp::new("length", pattern::LENGTH, U32).set(self, steps)
    }
}
