pub mod collections;
pub mod cursor;

pub use self::cursor::{varint_len, Reader, Writer};
