use rflp_event::{
    Field, FieldType, KindSet, NestedLayout, NestedPayload, RecordLayout, Rgba, SubField, View,
};
use tracing::warn;

use crate::descriptor::{
    BareAscii, Bool, Color, Enum, EventEnum, EventProp, FieldProp, FlagProp, Model, Raw,
    RecordFlagProp, SubEventProp, Text, I8, U16,
};
use crate::ids::{channel, plugin, vst};
use crate::{Context, Result};

crate::define_event_enum! {
    pub enum ChannelType: u8 {
        Sampler = 0,
        Native = 2,
        Layer = 3,
        Instrument = 4,
        Automation = 5,
    }
}

crate::define_event_enum! {
    /// Tab shown when the plugin window opens.
    pub enum WrapperPage: u8 {
        Editor = 0,
        Settings = 1,
        Sample = 3,
        Envelope = 4,
        Miscellaneous = 5,
    }
}

macro_rules! flag_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $Name:ident {
            $($Variant:ident = $bit:literal => $name:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $Name {
            $($Variant),*
        }

        impl $Name {
            const fn mask(self) -> u64 {
                match self {
                    $($Name::$Variant => 1 << $bit),*
                }
            }

            const fn name(self) -> &'static str {
                match self {
                    $($Name::$Variant => $name),*
                }
            }
        }
    };
}

flag_enum! {
    /// Bits of the plugin wrapper flags field.
    pub enum WrapperFlag {
        Visible = 0 => "visible",
        Disabled = 1 => "disabled",
        Detached = 2 => "detached",
        Generator = 4 => "generator",
        SmartDisable = 5 => "smart_disable",
        ThreadedProcessing = 6 => "threaded_processing",
        DemoMode = 7 => "demo_mode",
        HideSettings = 8 => "hide_settings",
        Minimized = 9 => "minimized",
    }
}

flag_enum! {
    pub enum SamplerFlag {
        Resample = 0 => "resample",
        LoadRegions = 1 => "load_regions",
        LoadSliceMarkers = 2 => "load_slice_markers",
        UsesLoopPoints = 3 => "uses_loop_points",
        KeepOnDisk = 8 => "keep_on_disk",
    }
}

flag_enum! {
    pub enum FxFlag {
        FadeStereo = 0 => "fade_stereo",
        Reverse = 1 => "reverse",
        Clip = 2 => "clip",
        SwapStereo = 8 => "swap_stereo",
    }
}

flag_enum! {
    pub enum LayerFlag {
        Random = 0 => "random",
        Crossfade = 1 => "crossfade",
    }
}

static LEVELS: RecordLayout = RecordLayout::new(
    "levels",
    &[
        Field::new("pan", 0, FieldType::I32),
        Field::new("volume", 4, FieldType::U32),
        Field::new("pitch_shift", 8, FieldType::I32),
    ],
);

static WRAPPER: RecordLayout = RecordLayout::new(
    "plugin wrapper",
    &[
        Field::new("flags", 16, FieldType::U16),
        Field::new("page", 20, FieldType::U8),
        Field::new("width", 44, FieldType::U32),
        Field::new("height", 48, FieldType::U32),
    ],
);

static VST_DATA: NestedLayout = NestedLayout::new(
    "vst plugin data",
    4,
    &[
        SubField::new("midi", vst::MIDI),
        SubField::new("flags", vst::FLAGS),
        SubField::new("io", vst::IO),
        SubField::new("inputs", vst::INPUTS),
        SubField::new("outputs", vst::OUTPUTS),
        SubField::new("plugin_info", vst::PLUGIN_INFO),
        SubField::new("fourcc", vst::FOUR_CC),
        SubField::new("guid", vst::GUID),
        SubField::new("state", vst::STATE),
        SubField::new("name", vst::NAME),
        SubField::new("plugin_path", vst::PLUGIN_PATH),
        SubField::new("vendor", vst::VENDOR),
    ],
);

/// Marker written at the start of newly created VST plugin data.
static VST_MARKER: [u8; 4] = 10u32.to_le_bytes();

/// A channel rack entry: a sampler, an instrument plugin, a layer or an
/// automation clip.
#[derive(Debug, Clone)]
pub struct Channel {
    events: View,
    context: Context,
}

impl Model for Channel {
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

fn vst_text(name: &'static str, field: &'static str) -> SubEventProp<BareAscii> {
    SubEventProp::new(name, plugin::STATE, &VST_DATA, field, &VST_MARKER, BareAscii)
}

fn vst_raw(name: &'static str, field: &'static str) -> SubEventProp<Raw> {
    SubEventProp::new(name, plugin::STATE, &VST_DATA, field, &VST_MARKER, Raw)
}

fn wrapper_flag(flag: WrapperFlag) -> RecordFlagProp {
    RecordFlagProp::new(flag.name(), plugin::WRAPPER, &WRAPPER, "flags", flag.mask())
}

impl Channel {
    pub fn new(events: View, context: Context) -> Channel {
        Channel { events, context }
    }

    /// Internal index, the payload of the channel's marker event.
    pub fn iid(&self) -> Result<Option<u16>> {
        EventProp::new("iid", channel::NEW, U16).get(self)
    }

    pub fn enabled(&self) -> Result<Option<bool>> {
        EventProp::new("enabled", channel::ENABLED, Bool).get(self)
    }

    pub fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        EventProp::new("enabled", channel::ENABLED, Bool).set(self, enabled)
    }

    pub fn zipped(&self) -> Result<Option<bool>> {
        EventProp::new("zipped", channel::ZIPPED, Bool).get(self)
    }

    pub fn set_zipped(&mut self, zipped: bool) -> Result<()> {
        EventProp::new("zipped", channel::ZIPPED, Bool).set(self, zipped)
    }

    pub fn locked(&self) -> Result<Option<bool>> {
        EventProp::new("locked", channel::LOCKED, Bool).get(self)
    }

    pub fn set_locked(&mut self, locked: bool) -> Result<()> {
        EventProp::new("locked", channel::LOCKED, Bool).set(self, locked)
    }

    pub fn channel_type(&self) -> Result<Option<ChannelType>> {
        EventProp::new("type", channel::TYPE, Enum::<ChannelType>::new()).get(self)
    }

    pub fn set_channel_type(&mut self, ty: ChannelType) -> Result<()> {
        EventProp::new("type", channel::TYPE, Enum::<ChannelType>::new()).set(self, ty)
    }

    /// Mixer insert the channel is routed to, -1 for none.
    pub fn routed_to(&self) -> Result<Option<i8>> {
        EventProp::new("routed_to", channel::ROUTED_TO, I8).get(self)
    }

    pub fn set_routed_to(&mut self, insert: i8) -> Result<()> {
        EventProp::new("routed_to", channel::ROUTED_TO, I8).set(self, insert)
    }

    pub fn color(&self) -> Result<Option<Rgba>> {
        EventProp::new("color", channel::COLOR, Color).get(self)
    }

    pub fn set_color(&mut self, color: Rgba) -> Result<()> {
        EventProp::new("color", channel::COLOR, Color).set(self, color)
    }

    pub fn name(&self) -> Result<Option<String>> {
        EventProp::new("name", channel::NAME, Text).get(self)
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        EventProp::new("name", channel::NAME, Text).set(self, name.into())
    }

    pub fn sample_path(&self) -> Result<Option<String>> {
        EventProp::new("sample_path", channel::SAMPLE_PATH, Text).get(self)
    }

    pub fn set_sample_path(&mut self, path: impl Into<String>) -> Result<()> {
        EventProp::new("sample_path", channel::SAMPLE_PATH, Text).set(self, path.into())
    }

    pub fn pan(&self) -> Result<Option<i32>> {
        FieldProp::new("pan", channel::LEVELS, &LEVELS, "pan").get(self)
    }

    pub fn set_pan(&mut self, pan: i32) -> Result<()> {
        FieldProp::new("pan", channel::LEVELS, &LEVELS, "pan").set(self, pan)
    }

    pub fn volume(&self) -> Result<Option<u32>> {
        FieldProp::new("volume", channel::LEVELS, &LEVELS, "volume").get(self)
    }

    pub fn set_volume(&mut self, volume: u32) -> Result<()> {
        FieldProp::new("volume", channel::LEVELS, &LEVELS, "volume").set(self, volume)
    }

    pub fn pitch_shift(&self) -> Result<Option<i32>> {
        FieldProp::new("pitch_shift", channel::LEVELS, &LEVELS, "pitch_shift").get(self)
    }

    pub fn set_pitch_shift(&mut self, cents: i32) -> Result<()> {
        FieldProp::new("pitch_shift", channel::LEVELS, &LEVELS, "pitch_shift").set(self, cents)
    }

    pub fn sampler_flag(&self, flag: SamplerFlag) -> Result<bool> {
        FlagProp::new(flag.name(), channel::SAMPLER_FLAGS, flag.mask()).get(self)
    }

    pub fn set_sampler_flag(&mut self, flag: SamplerFlag, on: bool) -> Result<()> {
        FlagProp::new(flag.name(), channel::SAMPLER_FLAGS, flag.mask()).set(self, on)
    }

    pub fn fx_flag(&self, flag: FxFlag) -> Result<bool> {
        FlagProp::new(flag.name(), channel::FX_FLAGS, flag.mask()).get(self)
    }

    pub fn set_fx_flag(&mut self, flag: FxFlag, on: bool) -> Result<()> {
        FlagProp::new(flag.name(), channel::FX_FLAGS, flag.mask()).set(self, on)
    }

    pub fn layer_flag(&self, flag: LayerFlag) -> Result<bool> {
        FlagProp::new(flag.name(), channel::LAYER_FLAGS, flag.mask()).get(self)
    }

    pub fn set_layer_flag(&mut self, flag: LayerFlag, on: bool) -> Result<()> {
        FlagProp::new(flag.name(), channel::LAYER_FLAGS, flag.mask()).set(self, on)
    }

    pub fn wrapper_flag(&self, flag: WrapperFlag) -> Result<bool> {
        wrapper_flag(flag).get(self)
    }

    pub fn set_wrapper_flag(&mut self, flag: WrapperFlag, on: bool) -> Result<()> {
        wrapper_flag(flag).set(self, on)
    }

    /// Unknown page numbers read as `None`.
    pub fn wrapper_page(&self) -> Result<Option<WrapperPage>> {
        let raw = FieldProp::<u8>::new("page", plugin::WRAPPER, &WRAPPER, "page").get(self)?;
        Ok(raw.and_then(|raw| WrapperPage::from_raw(i64::from(raw))))
    }

    pub fn set_wrapper_page(&mut self, page: WrapperPage) -> Result<()> {
        FieldProp::new("page", plugin::WRAPPER, &WRAPPER, "page").set(self, page.to_raw() as u8)
    }

    /// Editor window size in pixels.
    pub fn editor_size(&self) -> Result<Option<(u32, u32)>> {
        let width = FieldProp::<u32>::new("width", plugin::WRAPPER, &WRAPPER, "width").get(self)?;
        let height = FieldProp::<u32>::new("height", plugin::WRAPPER, &WRAPPER, "height").get(self)?;
        Ok(width.zip(height))
    }

    /// Writes both dimensions or neither.
    pub fn set_editor_size(&mut self, width: u32, height: u32) -> Result<()> {
        let width_prop = FieldProp::<u32>::new("width", plugin::WRAPPER, &WRAPPER, "width");
        let height_prop = FieldProp::<u32>::new("height", plugin::WRAPPER, &WRAPPER, "height");
        width_prop.validate(self, &width)?;
        height_prop.validate(self, &height)?;

        width_prop.set(self, width)?;
        height_prop.set(self, height)
    }

    /// Decoded VST plugin data, if the channel hosts a VST plugin.
    ///
    /// Data of native plugins has no sub-events and is not recognised here.
    pub fn vst_data(&self) -> Result<Option<NestedPayload>> {
        let events = &self.events;
        let Some(id) = events.first_of_kind(KindSet::new().with(plugin::STATE))? else {
            return Ok(None);
        };

        let nested = events.with_id(id, |e| VST_DATA.decode(e.payload()))??;
        let marker = <[u8; 4]>::try_from(nested.prefix()).map(u32::from_le_bytes);
        if !matches!(marker, Ok(8 | 10)) {
            warn!(?marker, "unexpected VST plugin data marker");
        }

        Ok(Some(nested))
    }

    pub fn plugin_name(&self) -> Result<Option<String>> {
        vst_text("plugin_name", "name").get(self)
    }

    pub fn set_plugin_name(&mut self, name: impl Into<String>) -> Result<()> {
        vst_text("plugin_name", "name").set(self, name.into())
    }

    pub fn vendor(&self) -> Result<Option<String>> {
        vst_text("vendor", "vendor").get(self)
    }

    pub fn set_vendor(&mut self, vendor: impl Into<String>) -> Result<()> {
        vst_text("vendor", "vendor").set(self, vendor.into())
    }

    pub fn plugin_path(&self) -> Result<Option<String>> {
        vst_text("plugin_path", "plugin_path").get(self)
    }

    pub fn set_plugin_path(&mut self, path: impl Into<String>) -> Result<()> {
        vst_text("plugin_path", "plugin_path").set(self, path.into())
    }

    pub fn fourcc(&self) -> Result<Option<String>> {
        vst_text("fourcc", "fourcc").get(self)
    }

    pub fn guid(&self) -> Result<Option<Vec<u8>>> {
        vst_raw("guid", "guid").get(self)
    }

    /// Opaque state saved by the plugin itself.
    pub fn plugin_state(&self) -> Result<Option<Vec<u8>>> {
        vst_raw("plugin_state", "state").get(self)
    }

    pub fn set_plugin_state(&mut self, state: Vec<u8>) -> Result<()> {
        vst_raw("plugin_state", "state").set(self, state)
    }
}
