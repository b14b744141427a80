use rflp_event::{Event, EventId, EventKind, Field, FieldType, KindSet, RecordLayout, View};

use super::{Channel, Pattern};
use crate::descriptor::{Ascii, Bool, Check, Enum, EventProp, FieldProp, Model, Text, I16, U16, U32, U8};
use crate::ids::{arrangement, channel, mixer, pattern, project};
use crate::{Context, Error, FlVersion, Result};

crate::define_event_enum! {
    pub enum PanLaw: u8 {
        Circular = 0,
        Triangular = 2,
    }
}

static TIMESTAMP: RecordLayout = RecordLayout::new(
    "timestamp",
    &[
        Field::new("created_on", 0, FieldType::F64),
        Field::new("time_spent", 8, FieldType::F64),
    ],
);

const MIN_TEMPO: f64 = 10.0;

/// Kinds that begin the arrangement and mixer sections of a file.
const TRAILING_SECTIONS: KindSet = KindSet::from_slice(&[
    arrangement::NEW,
    mixer::APDC,
    mixer::INSERT_ICON,
    mixer::SLOT_INDEX,
    mixer::INSERT_OUTPUT,
    mixer::INSERT_COLOR,
    mixer::INSERT_INPUT,
    mixer::INSERT_NAME,
    mixer::PARAMS,
    mixer::INSERT_ROUTING,
    mixer::INSERT_FLAGS,
]);

/// Kinds that begin any per-instance section. Project events precede them.
const SECTIONS: KindSet = TRAILING_SECTIONS.with(channel::NEW).with(pattern::NEW);

/// Project-wide settings and the entry point to channels and patterns.
#[derive(Debug, Clone)]
pub struct Project {
    events: View,
    context: Context,
}

impl Model for Project {
    fn events(&self) -> &View {
        &self.events
    }

    fn events_mut(&mut self) -> &mut View {
        &mut self.events
    }

    fn context(&self) -> &Context {
        &self.context
    }

    /// New project events go before the first section event, so they never
    /// extend an instance's run.
    fn materialize(&mut self, event: Event) -> Result<EventId> {
        match self.events.first_of_kind(SECTIONS)? {
            Some(section) => Ok(self.events.insert_before(section, event)?),
            None => Ok(self.events.push(event)?),
        }
    }
}

fn text(name: &'static str, kind: EventKind) -> EventProp<Text> {
    EventProp::new(name, kind, Text)
}

fn main_pitch() -> EventProp<I16> {
    EventProp::new("main_pitch", project::MAIN_PITCH, I16)
        .default_value(0)
        .check(Check::Range(-1200..=1200))
}

impl Project {
    pub fn new(events: View, context: Context) -> Project {
        Project { events, context }
    }

    pub fn title(&self) -> Result<Option<String>> {
        text("title", project::TITLE).get(self)
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<()> {
        text("title", project::TITLE).set(self, title.into())
    }

    /// Plain text comments. Older files store them as RTF under another kind.
    pub fn comments(&self) -> Result<Option<String>> {
        text("comments", project::COMMENTS)
            .alias(project::RTF_COMMENTS)
            .get(self)
    }

    pub fn set_comments(&mut self, comments: impl Into<String>) -> Result<()> {
        text("comments", project::COMMENTS)
            .alias(project::RTF_COMMENTS)
            .set(self, comments.into())
    }

    pub fn url(&self) -> Result<Option<String>> {
        text("url", project::URL).get(self)
    }

    pub fn set_url(&mut self, url: impl Into<String>) -> Result<()> {
        text("url", project::URL).set(self, url.into())
    }

    pub fn genre(&self) -> Result<Option<String>> {
        text("genre", project::GENRE).get(self)
    }

    pub fn set_genre(&mut self, genre: impl Into<String>) -> Result<()> {
        text("genre", project::GENRE).set(self, genre.into())
    }

    pub fn artists(&self) -> Result<Option<String>> {
        text("artists", project::ARTISTS).get(self)
    }

    pub fn set_artists(&mut self, artists: impl Into<String>) -> Result<()> {
        text("artists", project::ARTISTS).set(self, artists.into())
    }

    pub fn data_path(&self) -> Result<Option<String>> {
        text("data_path", project::DATA_PATH).get(self)
    }

    pub fn set_data_path(&mut self, path: impl Into<String>) -> Result<()> {
        text("data_path", project::DATA_PATH).set(self, path.into())
    }

    /// Version that saved the file. The context the project was created
    /// with is not affected by [`Project::set_version`].
    pub fn version(&self) -> Result<Option<FlVersion>> {
        EventProp::new("version", project::VERSION, Ascii)
            .get(self)?
            .map(|s| s.parse())
            .transpose()
    }

    pub fn set_version(&mut self, version: FlVersion) -> Result<()> {
        EventProp::new("version", project::VERSION, Ascii).set(self, version.to_string())
    }

    pub fn build(&self) -> Result<Option<u32>> {
        EventProp::new("build", project::BUILD, U32).get(self)
    }

    pub fn set_build(&mut self, build: u32) -> Result<()> {
        EventProp::new("build", project::BUILD, U32).set(self, build)
    }

    pub fn looped(&self) -> Result<Option<bool>> {
        EventProp::new("looped", project::LOOP_ACTIVE, Bool).get(self)
    }

    pub fn set_looped(&mut self, looped: bool) -> Result<()> {
        EventProp::new("looped", project::LOOP_ACTIVE, Bool).set(self, looped)
    }

    /// Whether the project info is shown when the file is opened.
    pub fn show_info(&self) -> Result<Option<bool>> {
        EventProp::new("show_info", project::SHOW_INFO, Bool).get(self)
    }

    pub fn set_show_info(&mut self, show: bool) -> Result<()> {
        EventProp::new("show_info", project::SHOW_INFO, Bool).set(self, show)
    }

    pub fn licensed(&self) -> Result<Option<bool>> {
        EventProp::new("licensed", project::LICENSED, Bool).get(self)
    }

    pub fn set_licensed(&mut self, licensed: bool) -> Result<()> {
        EventProp::new("licensed", project::LICENSED, Bool).set(self, licensed)
    }

    /// Master pitch in cents.
    pub fn main_pitch(&self) -> Result<Option<i16>> {
        main_pitch().get(self)
    }

    pub fn set_main_pitch(&mut self, cents: i16) -> Result<()> {
        main_pitch().set(self, cents)
    }

    pub fn main_volume(&self) -> Result<Option<u8>> {
        EventProp::new("main_volume", project::MAIN_VOLUME, U8).get(self)
    }

    pub fn set_main_volume(&mut self, volume: u8) -> Result<()> {
        EventProp::new("main_volume", project::MAIN_VOLUME, U8).set(self, volume)
    }

    pub fn pan_law(&self) -> Result<Option<PanLaw>> {
        EventProp::new("pan_law", project::PAN_LAW, Enum::<PanLaw>::new()).get(self)
    }

    pub fn set_pan_law(&mut self, law: PanLaw) -> Result<()> {
        EventProp::new("pan_law", project::PAN_LAW, Enum::<PanLaw>::new()).set(self, law)
    }

    /// Tempo in beats per minute.
    ///
    /// Newer files store it once, scaled by 1000. Older files split it into
    /// a whole part and a thousandths part, each in its own event.
    pub fn tempo(&self) -> Result<Option<f64>> {
        if let Some(scaled) = EventProp::new("tempo", project::TEMPO, U32).get(self)? {
            return Ok(Some(f64::from(scaled) / 1000.0));
        }

        let coarse = EventProp::new("tempo", project::TEMPO_COARSE, U16).get(self)?;
        let fine = EventProp::new("tempo", project::TEMPO_FINE, U16).get(self)?;
        Ok(coarse.map(|coarse| f64::from(coarse) + f64::from(fine.unwrap_or(0)) / 1000.0))
    }

    /// Writes whichever tempo events the file already has, or the scaled
    /// event if it has none.
    pub fn set_tempo(&mut self, bpm: f64) -> Result<()> {
        let max = self.max_tempo();
        if !(MIN_TEMPO..=max).contains(&bpm) {
            return Err(Error::validation(
                "tempo",
                format!("{bpm} is outside {MIN_TEMPO}..={max}"),
            ));
        }

        let scaled = EventProp::new("tempo", project::TEMPO, U32);
        let legacy = KindSet::new()
            .with(project::TEMPO_COARSE)
            .with(project::TEMPO_FINE);
        let has_scaled = self.events.contains_kind(project::TEMPO)?;
        let has_legacy = self.events.first_of_kind(legacy)?.is_some();

        if has_scaled || !has_legacy {
            scaled.set(self, (bpm * 1000.0).round() as u32)?;
        }

        if has_legacy {
            let whole = bpm.floor();
            let fine = ((bpm - whole) * 1000.0).round() as u16;
            if self.events.contains_kind(project::TEMPO_COARSE)? {
                EventProp::new("tempo", project::TEMPO_COARSE, U16).set(self, whole as u16)?;
            }
            if self.events.contains_kind(project::TEMPO_FINE)? {
                EventProp::new("tempo", project::TEMPO_FINE, U16).set(self, fine)?;
            }
        }

        Ok(())
    }

    fn max_tempo(&self) -> f64 {
        match self.context.version {
            Some(v) if v.at_least(1, 4, 2) && !v.at_least(11, 0, 0) => 999.0,
            _ => 522.0,
        }
    }

    /// Creation time as days since 1899-12-30.
    pub fn created_on(&self) -> Result<Option<f64>> {
        FieldProp::<f64>::new("created_on", project::TIMESTAMP, &TIMESTAMP, "created_on").get(self)
    }

    pub fn set_created_on(&mut self, days: f64) -> Result<()> {
        FieldProp::<f64>::new("created_on", project::TIMESTAMP, &TIMESTAMP, "created_on")
            .set(self, days)
    }

    /// Editing time in days.
    pub fn time_spent(&self) -> Result<Option<f64>> {
        FieldProp::<f64>::new("time_spent", project::TIMESTAMP, &TIMESTAMP, "time_spent").get(self)
    }

    pub fn set_time_spent(&mut self, days: f64) -> Result<()> {
        FieldProp::<f64>::new("time_spent", project::TIMESTAMP, &TIMESTAMP, "time_spent")
            .set(self, days)
    }

    /// One channel per channel marker, each running up to the next channel
    /// or pattern marker, or up to the arrangement and mixer sections.
    pub fn channels(&self) -> Result<Vec<Channel>> {
        let stops = TRAILING_SECTIONS.with(pattern::NEW);
        Ok(self
            .events
            .group_by_until(channel::NEW, stops)?
            .into_iter()
            .map(|events| Channel::new(events, self.context))
            .collect())
    }

    /// Patterns keyed by index. A pattern's runs are merged into one view
    /// wherever they occur in the file.
    pub fn patterns(&self) -> Result<Vec<Pattern>> {
        let stops = TRAILING_SECTIONS.with(channel::NEW);
        Ok(self
            .events
            .group_by_value_until(pattern::NEW, stops)?
            .into_iter()
            .map(|events| Pattern::new(events, self.context))
            .collect())
    }
}
