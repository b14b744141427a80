#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid magic: expected {expected:?}, found {found:?}")]
    InvalidMagic { expected: [u8; 4], found: [u8; 4] },
    #[error("invalid header size {0}, expected 6")]
    InvalidHeaderSize(u32),
    #[error("event section declares {declared} bytes, {actual} available")]
    DataSizeMismatch { declared: usize, actual: usize },
    #[error("invalid version string {0:?}")]
    InvalidVersion(String),
    #[error("unsupported PPQ {0}")]
    InvalidPpq(u16),

    #[error("invalid value for {name}: {reason}")]
    ValidationFailed { name: &'static str, reason: String },
    #[error("payload of {name} holds {actual} bytes, expected {expected}")]
    PayloadSize {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("unknown {name} value {value}")]
    UnknownVariant { name: &'static str, value: i64 },

    #[error(transparent)]
    Event(#[from] rflp_event::Error),
}

impl Error {
    #[cold]
    pub fn validation(name: &'static str, reason: impl Into<String>) -> Error {
        Error::ValidationFailed {
            name,
            reason: reason.into(),
        }
    }
}

impl From<rflp_core::cursor::Error> for Error {
    #[cold]
    fn from(error: rflp_core::cursor::Error) -> Error {
        Error::Event(error.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
