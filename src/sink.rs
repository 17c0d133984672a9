use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};

use crate::error::Result;
use crate::mutf8;

pub fn write_u8<W: Write + ?Sized>(sink: &mut W, n: u8) -> Result<()> {
    Ok(sink.write_u8(n)?)
}

pub fn write_i8<W: Write + ?Sized>(sink: &mut W, n: i8) -> Result<()> {
    Ok(sink.write_i8(n)?)
}

macro_rules! write_be_types {
    ($($typ:ident),+) => {
        paste::item! {
            $(
                pub fn [<write_ $typ>]<W: Write + ?Sized>(sink: &mut W, n: $typ) -> Result<()> {
                    Ok(sink.[<write_ $typ>]::<BigEndian>(n)?)
                }
            )+
        }
    };
}

write_be_types!(u16, i16, u32, i32, i64, f32, f64);

pub fn write_bytes<W: Write + ?Sized>(sink: &mut W, bytes: &[u8]) -> Result<()> {
    sink.write_all(bytes)?;
    Ok(())
}

pub fn write_mutf8_string<W: Write + ?Sized>(sink: &mut W, s: &str) -> Result<()> {
    let encoded = mutf8::encode(s);
    if encoded.len() > u16::MAX as usize {
        return Err(crate::error::Error::ValueOutOfRange(
            "string's modified UTF-8 encoding exceeds 65535 bytes",
        ));
    }
    write_u16(sink, encoded.len() as u16)?;
    write_bytes(sink, &encoded)
}
