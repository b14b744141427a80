//! Typed objects over views of the event collection.
//!
//! Models hold nothing but a view and the file context. Dropping one loses
//! no data and creating one is cheap.

mod channel;
mod pattern;
mod project;

pub use self::channel::{
    Channel, ChannelType, FxFlag, LayerFlag, SamplerFlag, WrapperFlag, WrapperPage,
};
pub use self::pattern::Pattern;
pub use self::project::{PanLaw, Project};
