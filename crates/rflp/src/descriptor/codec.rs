use std::fmt;
use std::marker::PhantomData;

use rflp_event::{Rgba, TextEncoding};

use crate::{Context, Error, Result};

/// Conversion between a payload and a semantic value.
pub trait Codec {
    type Value: Clone + PartialOrd + fmt::Debug;

    fn decode(&self, payload: &[u8], ctx: &Context) -> Result<Self::Value>;

    fn encode(&self, value: &Self::Value, ctx: &Context) -> Result<Vec<u8>>;
}

fn check_len(name: &'static str, payload: &[u8], expected: usize) -> Result<()> {
    if payload.len() != expected {
        return Err(Error::PayloadSize {
            name,
            expected,
            actual: payload.len(),
        });
    }
    Ok(())
}

macro_rules! scalar_codecs {
    ($($Codec:ident => $ty:ty),* $(,)?) => {$(
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $Codec;

        impl Codec for $Codec {
            type Value = $ty;

            fn decode(&self, payload: &[u8], _: &Context) -> Result<$ty> {
                const LEN: usize = std::mem::size_of::<$ty>();
                check_len(stringify!($ty), payload, LEN)?;
                let mut buf = [0; LEN];
                buf.copy_from_slice(payload);
                Ok(<$ty>::from_le_bytes(buf))
            }

            fn encode(&self, value: &$ty, _: &Context) -> Result<Vec<u8>> {
                Ok(value.to_le_bytes().to_vec())
            }
        }
    )*};
}

scalar_codecs! {
    U8 => u8,
    I8 => i8,
    U16 => u16,
    I16 => i16,
    U32 => u32,
    I32 => i32,
    F32 => f32,
}

/// Single byte, nonzero is `true`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bool;

impl Codec for Bool {
    type Value = bool;

    fn decode(&self, payload: &[u8], _: &Context) -> Result<bool> {
        check_len("bool", payload, 1)?;
        Ok(payload[0] != 0)
    }

    fn encode(&self, value: &bool, _: &Context) -> Result<Vec<u8>> {
        Ok(vec![u8::from(*value)])
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Color;

impl Codec for Color {
    type Value = Rgba;

    fn decode(&self, payload: &[u8], _: &Context) -> Result<Rgba> {
        check_len("color", payload, 4)?;
        Ok(Rgba::from_bytes([payload[0], payload[1], payload[2], payload[3]]))
    }

    fn encode(&self, value: &Rgba, _: &Context) -> Result<Vec<u8>> {
        Ok(value.to_bytes().to_vec())
    }
}

/// String in the file's text encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Text;

impl Codec for Text {
    type Value = String;

    fn decode(&self, payload: &[u8], ctx: &Context) -> Result<String> {
        Ok(ctx.encoding.decode(payload)?)
    }

    fn encode(&self, value: &String, ctx: &Context) -> Result<Vec<u8>> {
        Ok(ctx.encoding.encode(value)?)
    }
}

/// String that is ASCII whatever the file's text encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ascii;

impl Codec for Ascii {
    type Value = String;

    fn decode(&self, payload: &[u8], _: &Context) -> Result<String> {
        Ok(TextEncoding::Ascii.decode(payload)?)
    }

    fn encode(&self, value: &String, _: &Context) -> Result<Vec<u8>> {
        Ok(TextEncoding::Ascii.encode(value)?)
    }
}

/// ASCII string filling the whole payload, without a terminator.
#[derive(Debug, Clone, Copy, Default)]
pub struct BareAscii;

impl Codec for BareAscii {
    type Value = String;

    fn decode(&self, payload: &[u8], _: &Context) -> Result<String> {
        Ok(TextEncoding::Ascii.decode(payload)?)
    }

    fn encode(&self, value: &String, _: &Context) -> Result<Vec<u8>> {
        let mut bytes = TextEncoding::Ascii.encode(value)?;
        bytes.pop();
        Ok(bytes)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Raw;

impl Codec for Raw {
    type Value = Vec<u8>;

    fn decode(&self, payload: &[u8], _: &Context) -> Result<Vec<u8>> {
        Ok(payload.to_vec())
    }

    fn encode(&self, value: &Vec<u8>, _: &Context) -> Result<Vec<u8>> {
        Ok(value.clone())
    }
}

/// Enumeration stored as a little-endian integer.
pub trait EventEnum: Sized + Copy + PartialOrd + fmt::Debug {
    const NAME: &'static str;
    const WIDTH: usize;

    fn from_raw(raw: i64) -> Option<Self>;

    fn to_raw(self) -> i64;
}

pub struct Enum<E>(PhantomData<E>);

impl<E> Enum<E> {
    pub const fn new() -> Enum<E> {
        Enum(PhantomData)
    }
}

impl<E> Default for Enum<E> {
    fn default() -> Enum<E> {
        Enum::new()
    }
}

impl<E: EventEnum> Codec for Enum<E> {
    type Value = E;

    fn decode(&self, payload: &[u8], _: &Context) -> Result<E> {
        check_len(E::NAME, payload, E::WIDTH)?;
        let mut buf = [0; 8];
        buf[..payload.len()].copy_from_slice(payload);
        let raw = u64::from_le_bytes(buf) as i64;

        E::from_raw(raw).ok_or(Error::UnknownVariant {
            name: E::NAME,
            value: raw,
        })
    }

    fn encode(&self, value: &E, _: &Context) -> Result<Vec<u8>> {
        Ok(value.to_raw().to_le_bytes()[..E::WIDTH].to_vec())
    }
}

/// Defines a fieldless enum stored as a `$Repr` integer.
#[macro_export]
macro_rules! define_event_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $Name:ident : $Repr:ty {
            $($(#[$vmeta:meta])* $Variant:ident = $value:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis enum $Name {
            $($(#[$vmeta])* $Variant),*
        }

        impl $crate::descriptor::EventEnum for $Name {
            const NAME: &'static str = stringify!($Name);
            const WIDTH: usize = std::mem::size_of::<$Repr>();

            fn from_raw(raw: i64) -> Option<$Name> {
                match raw {
                    $( $value => Some($Name::$Variant), )*
                    _ => None,
                }
            }

            fn to_raw(self) -> i64 {
                match self {
                    $( $Name::$Variant => $value, )*
                }
            }
        }
    };
}
