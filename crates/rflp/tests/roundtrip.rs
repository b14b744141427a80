mod common;

use common::{init_tracing, sample_project, FileBuilder};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rflp::event::{EventKind, KindSet, TextEncoding, Value};
use rflp::{Error, FileFormat, FlVersion, FlpFile, ParseOptions};

#[test]
fn unmodified_file_is_identical() {
    init_tracing();

    let data = sample_project();
    let file = FlpFile::parse(&data).unwrap();

    assert_eq!(file.header.format, FileFormat::Project);
    assert_eq!(file.header.channel_count, 2);
    assert_eq!(file.header.ppq, 96);
    assert!(file.trailer.is_empty());
    assert_eq!(file.serialize().unwrap(), data);
}

#[test]
fn test_random() {
    let mut rng = SmallRng::seed_from_u64(0);

    for _ in 0..30 {
        let mut builder = FileBuilder::new();
        for _ in 0..rng.gen_range(0..200) {
            let kind: u8 = rng.gen();
            let len = EventKind(kind)
                .fixed_len()
                .unwrap_or_else(|| rng.gen_range(0..200));
            let payload = (0..len).map(|_| rng.gen()).collect::<Vec<u8>>();
            builder = builder.event(kind, &payload);
        }

        let data = builder.build();
        let file = FlpFile::parse(&data).unwrap();
        assert_eq!(file.serialize().unwrap(), data);
    }
}

#[test]
fn unknown_kinds_survive_edits() {
    let data = sample_project();
    let file = FlpFile::parse(&data).unwrap();

    let mut project = file.project().unwrap();
    project.set_title("Demo 2").unwrap();

    let saved = file.serialize().unwrap();
    let reparsed = FlpFile::parse(&saved).unwrap();
    let unknown = reparsed.events.events_of_kind(EventKind(250)).unwrap();
    assert_eq!(unknown.len(), 1);
    assert_eq!(unknown[0].payload(), &[1, 2, 3, 4, 5]);
    assert_eq!(
        reparsed.project().unwrap().title().unwrap().as_deref(),
        Some("Demo 2")
    );
}

#[test]
fn trailing_bytes() {
    let mut data = sample_project();
    data.extend_from_slice(b"junk");

    let file = FlpFile::parse(&data).unwrap();
    assert_eq!(file.trailer, b"junk");
    assert_eq!(file.serialize().unwrap(), data);

    let strict = ParseOptions {
        strict_data_size: true,
        ..ParseOptions::default()
    };
    assert!(matches!(
        FlpFile::parse_with(&data, &strict),
        Err(Error::DataSizeMismatch { .. })
    ));
}

#[test]
fn corrupt_files_are_rejected() {
    let data = sample_project();

    let mut bad_magic = data.clone();
    bad_magic[0] = b'X';
    assert!(matches!(
        FlpFile::parse(&bad_magic),
        Err(Error::InvalidMagic { .. })
    ));

    let short = &data[..data.len() - 3];
    assert!(matches!(
        FlpFile::parse(short),
        Err(Error::DataSizeMismatch { .. })
    ));

    // Declared size matches, but the last event is cut short.
    let mut truncated = FileBuilder::new().word(64, 0).build();
    truncated.pop();
    let declared = (truncated.len() - 22) as u32;
    truncated[18..22].copy_from_slice(&declared.to_le_bytes());
    assert!(matches!(
        FlpFile::parse(&truncated),
        Err(Error::Event(rflp::event::Error::CorruptStream { .. }))
    ));
}

#[test]
fn text_encoding_follows_version() {
    let old = FlpFile::parse(&FileBuilder::new().version("9.1.0").build()).unwrap();
    let ctx = old.context().unwrap();
    assert_eq!(ctx.version, Some(FlVersion::new(9, 1, 0)));
    assert_eq!(ctx.encoding, TextEncoding::Ascii);

    let new = FlpFile::parse(&sample_project()).unwrap();
    let ctx = new.context().unwrap();
    assert_eq!(ctx.version, Some(FlVersion::new(20, 8, 4).with_build(2576)));
    assert_eq!(ctx.encoding, TextEncoding::Utf16Le);

    let none = FlpFile::parse(&FileBuilder::new().build()).unwrap();
    assert_eq!(none.context().unwrap().encoding, TextEncoding::Utf16Le);

    let garbage = FlpFile::parse(&FileBuilder::new().version("beta").build()).unwrap();
    assert_eq!(garbage.context().unwrap().version, None);
}

#[test]
fn generic_values() {
    let file = FlpFile::parse(&sample_project()).unwrap();
    let events = &file.events;

    let title = events.first_of_kind(KindSet::new().with(EventKind(194))).unwrap().unwrap();
    assert_eq!(file.value(title).unwrap(), Value::Str("Demo".into()));

    let tempo = events.id_at(3).unwrap();
    assert_eq!(file.value(tempo).unwrap(), Value::U32(140_000));

    let unknown = events.first_of_kind(KindSet::new().with(EventKind(250))).unwrap().unwrap();
    assert_eq!(file.value(unknown).unwrap(), Value::Raw(vec![1, 2, 3, 4, 5]));
}
