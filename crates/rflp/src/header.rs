use rflp_core::{Reader, Writer};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const HEADER_MAGIC: [u8; 4] = *b"FLhd";
pub const DATA_MAGIC: [u8; 4] = *b"FLdt";

const HEADER_SIZE: u32 = 6;

/// PPQ values the program can save.
pub const VALID_PPQS: [u16; 11] = [24, 48, 72, 96, 120, 144, 168, 192, 384, 768, 960];

/// Kind of document stored in the file. Values not known here are kept
/// as they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileFormat {
    None,
    Project,
    Score,
    Automation,
    ChannelState,
    PluginState,
    GeneratorState,
    FxState,
    InsertState,
    Unknown(i16),
}

impl FileFormat {
    pub fn from_i16(v: i16) -> FileFormat {
        match v {
            -1 => FileFormat::None,
            0x00 => FileFormat::Project,
            0x10 => FileFormat::Score,
            0x18 => FileFormat::Automation,
            0x20 => FileFormat::ChannelState,
            0x30 => FileFormat::PluginState,
            0x31 => FileFormat::GeneratorState,
            0x32 => FileFormat::FxState,
            0x40 => FileFormat::InsertState,
            v => FileFormat::Unknown(v),
        }
    }

    pub fn as_i16(self) -> i16 {
        match self {
            FileFormat::None => -1,
            FileFormat::Project => 0x00,
            FileFormat::Score => 0x10,
            FileFormat::Automation => 0x18,
            FileFormat::ChannelState => 0x20,
            FileFormat::PluginState => 0x30,
            FileFormat::GeneratorState => 0x31,
            FileFormat::FxState => 0x32,
            FileFormat::InsertState => 0x40,
            FileFormat::Unknown(v) => v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub format: FileFormat,
    pub channel_count: u16,
    pub ppq: u16,
}

impl Header {
    /// Encoded size, including the event section preamble.
    pub const SIZE: usize = 22;

    pub fn new(ppq: u16) -> Result<Header> {
        let mut header = Header {
            format: FileFormat::Project,
            channel_count: 0,
            ppq: 96,
        };
        header.set_ppq(ppq)?;
        Ok(header)
    }

    pub fn set_ppq(&mut self, ppq: u16) -> Result<()> {
        if !VALID_PPQS.contains(&ppq) {
            return Err(Error::InvalidPpq(ppq));
        }
        self.ppq = ppq;
        Ok(())
    }

    /// Reads the header and returns it with the declared event section size.
    pub fn decode(reader: &mut Reader<'_>) -> Result<(Header, usize)> {
        expect_magic(reader, HEADER_MAGIC)?;

        let size = reader.read_u32()?;
        if size != HEADER_SIZE {
            return Err(Error::InvalidHeaderSize(size));
        }

        let format = FileFormat::from_i16(reader.read_i16()?);
        let channel_count = reader.read_u16()?;
        let ppq = reader.read_u16()?;

        expect_magic(reader, DATA_MAGIC)?;
        let data_size = reader.read_u32()? as usize;

        let header = Header {
            format,
            channel_count,
            ppq,
        };

        Ok((header, data_size))
    }

    pub fn encode(&self, writer: &mut Writer, data_size: u32) {
        writer.write_bytes(&HEADER_MAGIC);
        writer.write_u32(HEADER_SIZE);
        writer.write_i16(self.format.as_i16());
        writer.write_u16(self.channel_count);
        writer.write_u16(self.ppq);
        writer.write_bytes(&DATA_MAGIC);
        writer.write_u32(data_size);
    }
}

fn expect_magic(reader: &mut Reader<'_>, expected: [u8; 4]) -> Result<()> {
    let found = reader.read_array::<4>()?;
    if found != expected {
        return Err(Error::InvalidMagic { expected, found });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_layout() -> Result<()> {
        let header = Header {
            format: FileFormat::Project,
            channel_count: 3,
            ppq: 96,
        };

        let mut writer = Writer::new();
        header.encode(&mut writer, 1234);
        let bytes = writer.into_inner();
        assert_eq!(bytes.len(), Header::SIZE);
        assert_eq!(&bytes[..8], b"FLhd\x06\0\0\0");
        assert_eq!(&bytes[14..18], b"FLdt");

        let (decoded, size) = Header::decode(&mut Reader::new(&bytes))?;
        assert_eq!(decoded, header);
        assert_eq!(size, 1234);

        Ok(())
    }

    #[test]
    fn rejects_bad_headers() {
        let mut bytes = b"FLhd\x07\0\0\0\0\0\0\0\x60\0FLdt\0\0\0\0".to_vec();
        assert_eq!(
            Header::decode(&mut Reader::new(&bytes)),
            Err(Error::InvalidHeaderSize(7))
        );

        bytes[4] = 6;
        bytes[14] = b'X';
        assert!(matches!(
            Header::decode(&mut Reader::new(&bytes)),
            Err(Error::InvalidMagic { .. })
        ));

        assert!(matches!(
            Header::decode(&mut Reader::new(b"FLhd")),
            Err(Error::Event(rflp_event::Error::CorruptStream { .. }))
        ));
    }

    #[test]
    fn formats_and_ppq() -> Result<()> {
        assert_eq!(FileFormat::from_i16(0x31), FileFormat::GeneratorState);
        assert_eq!(FileFormat::from_i16(0x77), FileFormat::Unknown(0x77));
        assert_eq!(FileFormat::Unknown(0x77).as_i16(), 0x77);
        assert_eq!(FileFormat::None.as_i16(), -1);

        let mut header = Header::new(960)?;
        assert_eq!(header.set_ppq(100), Err(Error::InvalidPpq(100)));
        assert_eq!(header.ppq, 960);

        Ok(())
    }
}
