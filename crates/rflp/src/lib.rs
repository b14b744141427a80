//! Reading and editing FL Studio project files.
//!
//! [`FlpFile::parse`] splits a file into its [`Header`] and an event
//! collection. Typed access goes through models such as [`Project`], whose
//! accessors decode and encode event payloads on every call. Saving with
//! [`FlpFile::serialize`] reproduces an unmodified file byte for byte.

mod context;
pub mod descriptor;
mod error;
mod file;
mod header;
pub mod ids;
pub mod model;
mod version;

pub use rflp_event as event;

pub use self::context::Context;
pub use self::error::{Error, Result};
pub use self::file::{FlpFile, ParseOptions};
pub use self::header::{FileFormat, Header, DATA_MAGIC, HEADER_MAGIC, VALID_PPQS};
pub use self::model::{
    Channel, ChannelType, FxFlag, LayerFlag, PanLaw, Pattern, Project, SamplerFlag, WrapperFlag,
    WrapperPage,
};
pub use self::version::FlVersion;
