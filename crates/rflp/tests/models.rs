mod common;

use common::{ascii, sample_project, utf16, FileBuilder};
use rflp::descriptor::Model;
use rflp::event::{Error as EventError, EventKind, Rgba};
use rflp::{
    ChannelType, Error, FlVersion, FlpFile, FxFlag, PanLaw, SamplerFlag, WrapperFlag, WrapperPage,
};

fn kinds(file: &FlpFile) -> Vec<u8> {
    file.events
        .events()
        .unwrap()
        .iter()
        .map(|e| e.kind().0)
        .collect()
}

fn view_kinds(model: &impl Model) -> Vec<u8> {
    model
        .events()
        .events()
        .unwrap()
        .iter()
        .map(|e| e.kind().0)
        .collect()
}

fn sub_event(kind: u8, data: &[u8]) -> Vec<u8> {
    let mut out = vec![kind];
    out.extend_from_slice(&(data.len() as u64).to_le_bytes());
    out.extend_from_slice(data);
    out
}

#[test]
fn project_properties() {
    let file = FlpFile::parse(&sample_project()).unwrap();
    let project = file.project().unwrap();

    assert_eq!(project.title().unwrap().as_deref(), Some("Demo"));
    assert_eq!(project.build().unwrap(), Some(2576));
    assert_eq!(project.licensed().unwrap(), Some(true));
    assert_eq!(
        project.version().unwrap(),
        Some(FlVersion::new(20, 8, 4).with_build(2576))
    );
    assert_eq!(project.tempo().unwrap(), Some(140.0));
    assert_eq!(project.comments().unwrap(), None);
    assert_eq!(project.pan_law().unwrap(), None);
}

#[test]
fn single_field_locality() {
    let data = sample_project();
    let file = FlpFile::parse(&data).unwrap();

    file.project().unwrap().set_tempo(120.5).unwrap();
    let saved = file.serialize().unwrap();

    assert_eq!(saved.len(), data.len());
    let changed = (0..data.len())
        .filter(|&i| data[i] != saved[i])
        .collect::<Vec<_>>();
    assert!(!changed.is_empty());
    assert!(changed[changed.len() - 1] - changed[0] < 4);

    let reparsed = FlpFile::parse(&saved).unwrap();
    assert_eq!(reparsed.project().unwrap().tempo().unwrap(), Some(120.5));
}

#[test]
fn validation_is_atomic() {
    let data = sample_project();
    let file = FlpFile::parse(&data).unwrap();
    let mut project = file.project().unwrap();

    assert!(matches!(
        project.set_main_pitch(5000),
        Err(Error::ValidationFailed { name: "main_pitch", .. })
    ));
    assert!(matches!(
        project.set_tempo(600.0),
        Err(Error::ValidationFailed { name: "tempo", .. })
    ));
    assert!(matches!(
        project.set_tempo(5.0),
        Err(Error::ValidationFailed { .. })
    ));
    assert_eq!(file.serialize().unwrap(), data);
}

#[test]
fn absent_events_are_materialized_on_set() {
    let file = FlpFile::parse(&sample_project()).unwrap();
    let mut project = file.project().unwrap();
    let before = file.events.len().unwrap();
    let first_channel = kinds(&file).iter().position(|&k| k == 64).unwrap();

    assert_eq!(project.main_pitch().unwrap(), Some(0));
    assert_eq!(file.events.len().unwrap(), before);

    // Project events go ahead of the first channel.
    project.set_main_pitch(-50).unwrap();
    project.set_pan_law(PanLaw::Triangular).unwrap();
    assert_eq!(file.events.len().unwrap(), before + 2);
    assert_eq!(&kinds(&file)[first_channel..first_channel + 3], &[80, 23, 64]);
    assert_eq!(
        file.events.get(first_channel).unwrap().payload(),
        &(-50i16).to_le_bytes()
    );

    assert_eq!(project.main_pitch().unwrap(), Some(-50));
    assert_eq!(project.pan_law().unwrap(), Some(PanLaw::Triangular));
}

#[test]
fn project_events_stay_out_of_instances() {
    let data = FileBuilder::new()
        .word(64, 0)
        .word(65, 1)
        .event(193, &utf16("A"))
        .build();
    let file = FlpFile::parse(&data).unwrap();
    let mut project = file.project().unwrap();

    project.set_main_pitch(10).unwrap();
    assert_eq!(kinds(&file), vec![80, 64, 65, 193]);

    let pattern = project.patterns().unwrap().remove(0);
    assert_eq!(view_kinds(&pattern), vec![65, 193]);
    let channel = project.channels().unwrap().remove(0);
    assert_eq!(view_kinds(&channel), vec![64]);
}

#[test]
fn text_follows_file_version() {
    let file = FlpFile::parse(&FileBuilder::new().version("9.1.0").build()).unwrap();
    file.project().unwrap().set_title("Hi").unwrap();
    let title = file.events.events_of_kind(EventKind(194)).unwrap();
    assert_eq!(title[0].payload(), ascii("Hi").as_slice());

    let file = FlpFile::parse(&sample_project()).unwrap();
    file.project().unwrap().set_title("Hi").unwrap();
    let title = file.events.events_of_kind(EventKind(194)).unwrap();
    assert_eq!(title[0].payload(), utf16("Hi").as_slice());

    let file = FlpFile::parse(&FileBuilder::new().event(198, &utf16("rtf")).build()).unwrap();
    assert_eq!(file.project().unwrap().comments().unwrap().as_deref(), Some("rtf"));
}

#[test]
fn legacy_tempo() {
    let data = FileBuilder::new()
        .version("10.0.0")
        .word(66, 145)
        .word(93, 500)
        .build();
    let file = FlpFile::parse(&data).unwrap();
    let mut project = file.project().unwrap();

    assert_eq!(project.tempo().unwrap(), Some(145.5));

    project.set_tempo(900.25).unwrap();
    assert_eq!(project.tempo().unwrap(), Some(900.25));
    assert_eq!(kinds(&file), vec![199, 66, 93]);
    assert_eq!(file.events.get(1).unwrap().payload(), &900u16.to_le_bytes());
    assert_eq!(file.events.get(2).unwrap().payload(), &250u16.to_le_bytes());

    let empty = FlpFile::parse(&FileBuilder::new().version("21.0.0").build()).unwrap();
    let mut project = empty.project().unwrap();
    assert_eq!(project.tempo().unwrap(), None);
    project.set_tempo(128.0).unwrap();
    assert_eq!(kinds(&empty), vec![199, 156]);
    assert_eq!(project.tempo().unwrap(), Some(128.0));
}

#[test]
fn channels() {
    let file = FlpFile::parse(&sample_project()).unwrap();
    let project = file.project().unwrap();
    let mut channels = project.channels().unwrap();
    assert_eq!(channels.len(), 2);

    let kick = &channels[0];
    assert_eq!(kick.iid().unwrap(), Some(0));
    assert_eq!(kick.name().unwrap().as_deref(), Some("Kick"));
    assert_eq!(kick.channel_type().unwrap(), Some(ChannelType::Sampler));
    assert_eq!(kick.enabled().unwrap(), Some(true));
    assert_eq!(kick.volume().unwrap(), Some(10000));
    assert_eq!(kick.pan().unwrap(), Some(0));

    let synth = &mut channels[1];
    assert_eq!(synth.iid().unwrap(), Some(1));
    assert_eq!(synth.channel_type().unwrap(), Some(ChannelType::Instrument));
    assert_eq!(synth.volume().unwrap(), None);

    // The new levels record lands at the end of the channel, before the
    // pattern that follows it.
    synth.set_volume(6400).unwrap();
    synth.set_color(Rgba::new(255, 0, 0)).unwrap();
    assert_eq!(synth.volume().unwrap(), Some(6400));
    assert_eq!(synth.pan().unwrap(), Some(0));
    assert_eq!(view_kinds(&*synth), vec![64, 21, 203, 219, 128]);

    let all = kinds(&file);
    let pattern_at = all.iter().position(|&k| k == 65).unwrap();
    assert_eq!(&all[pattern_at - 2..pattern_at], &[219, 128]);

    assert_eq!(channels[0].volume().unwrap(), Some(10000));
    assert_eq!(project.channels().unwrap()[1].color().unwrap(), Some(Rgba::new(255, 0, 0)));
}

#[test]
fn channel_handles_share_materialized_events() {
    let file = FlpFile::parse(&sample_project()).unwrap();
    let project = file.project().unwrap();
    let mut synth = project.channels().unwrap().remove(1);
    let copy = synth.clone();
    let other = project.channels().unwrap().remove(1);

    synth.set_color(Rgba::new(0, 0, 255)).unwrap();
    synth.set_name("Lead").unwrap();

    assert_eq!(copy.color().unwrap(), Some(Rgba::new(0, 0, 255)));
    assert_eq!(other.color().unwrap(), Some(Rgba::new(0, 0, 255)));
    assert_eq!(other.name().unwrap().as_deref(), Some("Lead"));
    assert_eq!(view_kinds(&other), view_kinds(&synth));
    assert_eq!(project.channels().unwrap()[0].color().unwrap(), None);
}

#[test]
fn channel_rack_ends_at_mixer() {
    let mut slot = 8u32.to_le_bytes().to_vec();
    slot.extend(sub_event(54, b"Mixer"));

    let data = FileBuilder::new()
        .version("20.8.4")
        .word(64, 0)
        .event(203, &utf16("Kick"))
        .event(236, &[0; 12])
        .event(213, &slot)
        .build();
    let file = FlpFile::parse(&data).unwrap();
    let mut kick = file.project().unwrap().channels().unwrap().remove(0);

    assert_eq!(view_kinds(&kick), vec![64, 203]);
    assert_eq!(kick.plugin_name().unwrap(), None);

    kick.set_plugin_state(vec![7]).unwrap();
    assert_eq!(kinds(&file), vec![199, 64, 203, 213, 236, 213]);
    let states = file.events.events_of_kind(EventKind(213)).unwrap();
    assert_eq!(states[1].payload(), slot.as_slice());
    assert_eq!(kick.plugin_state().unwrap(), Some(vec![7]));
}

#[test]
fn editor_size_is_written_whole() {
    let data = FileBuilder::new()
        .word(64, 0)
        .event(212, &[0; 48])
        .build();
    let file = FlpFile::parse(&data).unwrap();
    let mut channel = file.project().unwrap().channels().unwrap().remove(0);

    assert!(matches!(
        channel.set_editor_size(640, 480),
        Err(Error::Event(EventError::FieldAbsent { .. }))
    ));
    assert_eq!(file.serialize().unwrap(), data);
}

#[test]
fn short_record_fields_are_absent() {
    let mut levels = Vec::new();
    levels.extend_from_slice(&(-64i32).to_le_bytes());
    levels.extend_from_slice(&12800u32.to_le_bytes());

    let data = FileBuilder::new().word(64, 0).event(219, &levels).build();
    let file = FlpFile::parse(&data).unwrap();
    let mut channel = file.project().unwrap().channels().unwrap().remove(0);

    assert_eq!(channel.pan().unwrap(), Some(-64));
    assert_eq!(channel.pitch_shift().unwrap(), None);
    assert!(matches!(
        channel.set_pitch_shift(100),
        Err(Error::Event(EventError::FieldAbsent { .. }))
    ));

    channel.set_pan(64).unwrap();
    assert_eq!(channel.volume().unwrap(), Some(12800));
    let saved = file.serialize().unwrap();
    assert_eq!(saved.len(), data.len());
    assert_eq!(&saved[saved.len() - 8..saved.len() - 4], &64i32.to_le_bytes());
}

#[test]
fn wrapper_flags() {
    let file = FlpFile::parse(&FileBuilder::new().word(64, 0).build()).unwrap();
    let mut channel = file.project().unwrap().channels().unwrap().remove(0);

    assert!(!channel.wrapper_flag(WrapperFlag::Visible).unwrap());
    assert_eq!(channel.wrapper_page().unwrap(), None);

    channel.set_wrapper_flag(WrapperFlag::Visible, true).unwrap();
    channel.set_wrapper_flag(WrapperFlag::Minimized, true).unwrap();
    channel.set_wrapper_flag(WrapperFlag::Detached, true).unwrap();
    channel.set_wrapper_flag(WrapperFlag::Detached, false).unwrap();
    channel.set_wrapper_page(WrapperPage::Settings).unwrap();
    channel.set_editor_size(640, 480).unwrap();

    assert!(channel.wrapper_flag(WrapperFlag::Visible).unwrap());
    assert!(channel.wrapper_flag(WrapperFlag::Minimized).unwrap());
    assert!(!channel.wrapper_flag(WrapperFlag::Detached).unwrap());
    assert_eq!(channel.wrapper_page().unwrap(), Some(WrapperPage::Settings));
    assert_eq!(channel.editor_size().unwrap(), Some((640, 480)));

    let wrapper = file.events.events_of_kind(EventKind(212)).unwrap();
    assert_eq!(wrapper.len(), 1);
    let payload = wrapper[0].payload();
    assert_eq!(payload.len(), 52);
    assert_eq!(&payload[16..18], &0x0201u16.to_le_bytes());
    assert_eq!(payload[20], 1);
}

#[test]
fn shared_flag_events() {
    let data = FileBuilder::new()
        .word(64, 0)
        .dword(143, 0x0101)
        .build();
    let file = FlpFile::parse(&data).unwrap();
    let mut channel = file.project().unwrap().channels().unwrap().remove(0);

    assert!(channel.sampler_flag(SamplerFlag::Resample).unwrap());
    assert!(channel.sampler_flag(SamplerFlag::KeepOnDisk).unwrap());
    assert!(!channel.sampler_flag(SamplerFlag::LoadRegions).unwrap());

    channel.set_sampler_flag(SamplerFlag::LoadRegions, true).unwrap();
    channel.set_sampler_flag(SamplerFlag::Resample, false).unwrap();
    let flags = file.events.events_of_kind(EventKind(143)).unwrap();
    assert_eq!(flags[0].payload(), &0x0102u32.to_le_bytes());

    assert!(!channel.fx_flag(FxFlag::Reverse).unwrap());
    channel.set_fx_flag(FxFlag::Reverse, true).unwrap();
    assert_eq!(kinds(&file), vec![64, 143, 70]);
    assert_eq!(file.events.get(2).unwrap().payload(), &[2, 0]);
    assert!(channel.fx_flag(FxFlag::Reverse).unwrap());
}

#[test]
fn vst_plugin_data() {
    let mut state = 8u32.to_le_bytes().to_vec();
    state.extend(sub_event(54, b"Old"));
    state.extend(sub_event(99, &[7, 7]));
    state.extend(sub_event(54, b"Serum"));
    state.extend(sub_event(56, b"Xfer"));

    let data = FileBuilder::new().word(64, 0).event(213, &state).build();
    let file = FlpFile::parse(&data).unwrap();
    let mut channel = file.project().unwrap().channels().unwrap().remove(0);

    assert_eq!(channel.plugin_name().unwrap().as_deref(), Some("Serum"));
    assert_eq!(channel.vendor().unwrap().as_deref(), Some("Xfer"));
    assert_eq!(channel.guid().unwrap(), None);

    channel.set_plugin_name("Serum 2").unwrap();
    let nested = channel.vst_data().unwrap().unwrap();
    let entries = nested
        .entries()
        .iter()
        .map(|e| (e.kind, e.data.clone()))
        .collect::<Vec<_>>();
    assert_eq!(
        entries,
        vec![
            (54, b"Old".to_vec()),
            (99, vec![7, 7]),
            (54, b"Serum 2".to_vec()),
            (56, b"Xfer".to_vec()),
        ]
    );
    assert_eq!(nested.prefix(), &8u32.to_le_bytes());
}

#[test]
fn vst_plugin_data_is_created_on_set() {
    let file = FlpFile::parse(&FileBuilder::new().word(64, 0).build()).unwrap();
    let mut channel = file.project().unwrap().channels().unwrap().remove(0);

    assert_eq!(channel.vst_data().unwrap(), None);
    channel.set_plugin_state(vec![1, 2, 3]).unwrap();

    let mut expected = 10u32.to_le_bytes().to_vec();
    expected.extend(sub_event(53, &[1, 2, 3]));
    let state = file.events.events_of_kind(EventKind(213)).unwrap();
    assert_eq!(state[0].payload(), expected.as_slice());
    assert_eq!(channel.plugin_state().unwrap(), Some(vec![1, 2, 3]));
}

#[test]
fn patterns_merge_runs() {
    let file = FlpFile::parse(&sample_project()).unwrap();
    let mut patterns = file.project().unwrap().patterns().unwrap();
    assert_eq!(patterns.len(), 1);

    let intro = &mut patterns[0];
    assert_eq!(intro.index().unwrap(), Some(1));
    assert_eq!(intro.name().unwrap().as_deref(), Some("Intro"));
    assert!(intro.looped().unwrap());
    assert_eq!(intro.length().unwrap(), None);

    intro.set_length(64).unwrap();
    assert_eq!(intro.length().unwrap(), Some(64));
    assert_eq!(kinds(&file).last(), Some(&164));
}

#[test]
fn removed_marker_dangles_models() {
    let mut file = FlpFile::parse(&sample_project()).unwrap();
    let channels = file.project().unwrap().channels().unwrap();

    file.events.remove_of_kind(EventKind(64), 1).unwrap();

    assert!(matches!(
        channels[1].name(),
        Err(Error::Event(EventError::DanglingView))
    ));
    assert_eq!(channels[0].name().unwrap().as_deref(), Some("Kick"));
    assert_eq!(file.project().unwrap().channels().unwrap().len(), 1);
}
