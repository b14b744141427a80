#![allow(dead_code)]

use rflp_core::Writer;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn ascii(text: &str) -> Vec<u8> {
    let mut bytes = text.as_bytes().to_vec();
    bytes.push(0);
    bytes
}

pub fn utf16(text: &str) -> Vec<u8> {
    text.encode_utf16()
        .chain([0])
        .flat_map(u16::to_le_bytes)
        .collect()
}

/// Builds a project file event by event.
pub struct FileBuilder {
    body: Writer,
    ppq: u16,
    channel_count: u16,
}

impl FileBuilder {
    pub fn new() -> FileBuilder {
        FileBuilder {
            body: Writer::new(),
            ppq: 96,
            channel_count: 0,
        }
    }

    pub fn channel_count(mut self, count: u16) -> FileBuilder {
        self.channel_count = count;
        self
    }

    pub fn event(mut self, kind: u8, payload: &[u8]) -> FileBuilder {
        self.body.write_u8(kind);
        if kind >= 192 {
            self.body.write_varint(payload.len() as u64);
        }
        self.body.write_bytes(payload);
        self
    }

    pub fn byte(self, kind: u8, value: u8) -> FileBuilder {
        self.event(kind, &[value])
    }

    pub fn word(self, kind: u8, value: u16) -> FileBuilder {
        self.event(kind, &value.to_le_bytes())
    }

    pub fn dword(self, kind: u8, value: u32) -> FileBuilder {
        self.event(kind, &value.to_le_bytes())
    }

    pub fn version(self, version: &str) -> FileBuilder {
        self.event(199, &ascii(version))
    }

    pub fn body(&self) -> &[u8] {
        self.body.as_slice()
    }

    pub fn build(self) -> Vec<u8> {
        let body = self.body.into_inner();
        let mut out = Writer::new();
        out.write_bytes(b"FLhd");
        out.write_u32(6);
        out.write_i16(0);
        out.write_u16(self.channel_count);
        out.write_u16(self.ppq);
        out.write_bytes(b"FLdt");
        out.write_u32(body.len() as u32);
        out.write_bytes(&body);
        out.into_inner()
    }
}

/// A small modern project: one sampler channel, one plugin channel and a
/// pattern split over two runs.
pub fn sample_project() -> Vec<u8> {
    let mut levels = Vec::new();
    levels.extend_from_slice(&0i32.to_le_bytes());
    levels.extend_from_slice(&10000u32.to_le_bytes());
    levels.extend_from_slice(&0i32.to_le_bytes());

    FileBuilder::new()
        .channel_count(2)
        .version("20.8.4.2576")
        .dword(159, 2576)
        .byte(28, 1)
        .dword(156, 140_000)
        .event(194, &utf16("Demo"))
        .event(250, &[1, 2, 3, 4, 5])
        .word(64, 0)
        .byte(21, 0)
        .byte(0, 1)
        .event(203, &utf16("Kick"))
        .event(219, &levels)
        .word(64, 1)
        .byte(21, 4)
        .event(203, &utf16("Synth"))
        .word(65, 1)
        .event(224, &[0; 24])
        .word(65, 1)
        .event(193, &utf16("Intro"))
        .byte(26, 1)
        .build()
}
