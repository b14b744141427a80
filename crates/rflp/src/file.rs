use rflp_core::{Reader, Writer};
use rflp_event::{stream, EventCollection, EventId, KindSet, Registry, TextEncoding, Value};
use tracing::{debug, instrument, warn};

use crate::ids::project;
use crate::model::Project;
use crate::{Context, Error, FlVersion, Header, Result};

#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Value types used by [`FlpFile::value`].
    pub registry: Registry,
    /// Reject files with bytes after the declared event section instead of
    /// keeping them as a trailer.
    pub strict_data_size: bool,
}

/// A parsed project file.
#[derive(Debug)]
pub struct FlpFile {
    pub header: Header,
    pub events: EventCollection,
    /// Bytes after the declared event section, written back unchanged.
    pub trailer: Vec<u8>,
    registry: Registry,
}

impl FlpFile {
    pub fn new(header: Header) -> FlpFile {
        FlpFile {
            header,
            events: EventCollection::new(),
            trailer: Vec::new(),
            registry: Registry::new(),
        }
    }

    pub fn parse(data: &[u8]) -> Result<FlpFile> {
        FlpFile::parse_with(data, &ParseOptions::default())
    }

    /// Parses a whole file. Nothing is returned unless every event decodes.
    #[instrument(skip_all, err)]
    pub fn parse_with(data: &[u8], options: &ParseOptions) -> Result<FlpFile> {
        let mut reader = Reader::new(data);
        let (header, declared) = Header::decode(&mut reader)?;

        let available = reader.remaining();
        if declared > available {
            return Err(Error::DataSizeMismatch {
                declared,
                actual: available,
            });
        }
        if declared < available {
            if options.strict_data_size {
                return Err(Error::DataSizeMismatch {
                    declared,
                    actual: available,
                });
            }
            warn!(
                trailing = available - declared,
                "bytes after the event section"
            );
        }

        let mut section = reader.sub(declared)?;
        let events = stream::decode_from(&mut section)?;
        let trailer = reader.rest().to_vec();

        let file = FlpFile {
            header,
            events,
            trailer,
            registry: options.registry.clone(),
        };

        let context = file.context()?;
        debug!(
            format = ?file.header.format,
            ppq = file.header.ppq,
            version = ?context.version,
            encoding = ?context.encoding,
            "parsed file"
        );

        Ok(file)
    }

    /// Encodes the file. The event section size is recomputed.
    #[instrument(skip_all, err)]
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let size = stream::encoded_size(&self.events)?;
        let declared = u32::try_from(size).map_err(|_| Error::DataSizeMismatch {
            declared: size,
            actual: u32::MAX as usize,
        })?;

        let mut writer = Writer::with_capacity(Header::SIZE + size + self.trailer.len());
        self.header.encode(&mut writer, declared);
        stream::encode_into(&self.events, &mut writer)?;
        writer.write_bytes(&self.trailer);
        Ok(writer.into_inner())
    }

    /// Reads the version event. An unparsable version is logged and treated
    /// as missing, so the file stays readable.
    pub fn context(&self) -> Result<Context> {
        let Some(id) = self.events.first_of_kind(KindSet::new().with(project::VERSION))? else {
            return Ok(Context::new(None));
        };

        let version = self
            .events
            .with_id(id, |e| TextEncoding::Ascii.decode(e.payload()))?
            .map_err(Error::from)
            .and_then(|text| text.parse::<FlVersion>());
        let version = match version {
            Ok(version) => Some(version),
            Err(error) => {
                warn!(%error, "ignoring version event");
                None
            }
        };

        Ok(Context::new(version))
    }

    pub fn project(&self) -> Result<Project> {
        Ok(Project::new(self.events.view(), self.context()?))
    }

    /// Decodes an event with the registry the file was parsed with.
    pub fn value(&self, id: EventId) -> Result<Value> {
        let encoding = self.context()?.encoding;
        let value = self
            .events
            .with_id(id, |e| self.registry.decode(e, encoding))??;
        Ok(value)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
