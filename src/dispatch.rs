use crate::error::{Error, Result};
use crate::kind::Kind;
use crate::node::{Compound, List, Node};
use crate::source::{self, Source};

#[derive(Debug, Clone, Copy)]
pub enum Metadata {
    None,
    List { content_kind: Kind, length: i32 },
}

impl Metadata {
    fn list_parts(self) -> (Kind, i32) {
        match self {
            Metadata::List {
                content_kind,
                length,
            } => (content_kind, length),
            Metadata::None => unreachable!("read_payload(List, ..) called without list metadata"),
        }
    }
}

fn len_to_usize(len: i32) -> Result<usize> {
    if len < 0 {
        return Err(Error::ValueOutOfRange("array or list length is negative"));
    }
    Ok(len as usize)
}

pub fn read_metadata<S: Source + ?Sized>(source: &mut S, kind: Kind) -> Result<Metadata> {
    if kind != Kind::List {
        return Ok(Metadata::None);
    }
    let content_kind = Kind::try_from_u8(source::read_u8(source)?)?;
    let length = source::read_i32(source)?;
    if length < 0 {
        return Err(Error::ValueOutOfRange("list length is negative"));
    }
    // empty lists may declare any content kind, some encoders wrote (Int8, 0)
    if content_kind == Kind::End && length > 0 {
        return Err(Error::ListContentMismatch {
            declared: Kind::End,
            found: Kind::End,
        });
    }
    if content_kind != Kind::End && length == 0 {
        log::warn!(
            "accepting legacy empty-list encoding with content-kind {} instead of TEnd",
            content_kind
        );
    }
    Ok(Metadata::List {
        content_kind,
        length,
    })
}

pub fn read_payload<S: Source + ?Sized>(
    source: &mut S,
    kind: Kind,
    metadata: Metadata,
) -> Result<Node> {
    Ok(match kind {
        Kind::End => {
            return Err(Error::FormatError(
                "TAG_End cannot be materialized as a value".into(),
            ))
        }
        Kind::Int8 => Node::Int8(source::read_i8(source)?),
        Kind::Int16 => Node::Int16(source::read_i16(source)?),
        Kind::Int32 => Node::Int32(source::read_i32(source)?),
        Kind::Int64 => Node::Int64(source::read_i64(source)?),
        Kind::Float32 => Node::Float32(source::read_f32(source)?),
        Kind::Float64 => Node::Float64(source::read_f64(source)?),
        Kind::Int8Array => {
            let len = len_to_usize(source::read_i32(source)?)?;
            let bytes = source::read_exact(source, len)?;
            Node::Int8Array(bytes.into_iter().map(|b| b as i8).collect())
        }
        Kind::String => Node::String(source::read_mutf8_string(source)?),
        Kind::List => {
            let (content_kind, length) = metadata.list_parts();
            let mut items = Vec::with_capacity(length as usize);
            for _ in 0..length {
                let child_metadata = read_metadata(source, content_kind)?;
                items.push(read_payload(source, content_kind, child_metadata)?);
            }
            Node::List(List::new(content_kind, items)?)
        }
        Kind::Compound => {
            let mut compound = Compound::new();
            loop {
                let child_kind = Kind::try_from_u8(source::read_u8(source)?)?;
                if child_kind == Kind::End {
                    break;
                }
                let name = source::read_mutf8_string(source)?;
                let child_metadata = read_metadata(source, child_kind)?;
                let value = read_payload(source, child_kind, child_metadata)?;
                compound.try_insert(name, value)?;
            }
            Node::Compound(compound)
        }
        Kind::Int32Array => {
            let len = len_to_usize(source::read_i32(source)?)?;
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(source::read_i32(source)?);
            }
            Node::Int32Array(items)
        }
        Kind::Int64Array => {
            let len = len_to_usize(source::read_i32(source)?)?;
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(source::read_i64(source)?);
            }
            Node::Int64Array(items)
        }
    })
}

pub fn skip_payload<S: Source + ?Sized>(
    source: &mut S,
    kind: Kind,
    metadata: Metadata,
) -> Result<()> {
    match kind {
        Kind::End => {}
        Kind::Int8 | Kind::Int16 | Kind::Int32 | Kind::Int64 | Kind::Float32 | Kind::Float64 => {
            let width = kind.fixed_width().expect("fixed-width kind");
            source.skip(width as u64)?;
        }
        Kind::Int8Array => {
            let len = len_to_usize(source::read_i32(source)?)?;
            source.skip(len as u64)?;
        }
        Kind::String => {
            let len = source::read_u16(source)?;
            source.skip(len as u64)?;
        }
        Kind::List => {
            let (content_kind, length) = metadata.list_parts();
            for _ in 0..length {
                let child_metadata = read_metadata(source, content_kind)?;
                skip_payload(source, content_kind, child_metadata)?;
            }
        }
        Kind::Compound => loop {
            let child_kind = Kind::try_from_u8(source::read_u8(source)?)?;
            if child_kind == Kind::End {
                break;
            }
            let _name = source::read_mutf8_string(source)?;
            let child_metadata = read_metadata(source, child_kind)?;
            skip_payload(source, child_kind, child_metadata)?;
        },
        Kind::Int32Array => {
            let len = len_to_usize(source::read_i32(source)?)?;
            let width = kind.array_element_width().expect("array kind");
            source.skip((len * width) as u64)?;
        }
        Kind::Int64Array => {
            let len = len_to_usize(source::read_i32(source)?)?;
            let width = kind.array_element_width().expect("array kind");
            source.skip((len * width) as u64)?;
        }
    }
    Ok(())
}

pub fn write_payload<W: std::io::Write + ?Sized>(sink: &mut W, node: &Node) -> Result<()> {
    use crate::sink;
    match node {
        Node::Int8(v) => sink::write_i8(sink, *v)?,
        Node::Int16(v) => sink::write_i16(sink, *v)?,
        Node::Int32(v) => sink::write_i32(sink, *v)?,
        Node::Int64(v) => sink::write_i64(sink, *v)?,
        Node::Float32(v) => sink::write_f32(sink, *v)?,
        Node::Float64(v) => sink::write_f64(sink, *v)?,
        Node::Int8Array(items) => {
            write_array_len(sink, items.len())?;
            let bytes: Vec<u8> = items.iter().map(|b| *b as u8).collect();
            sink::write_bytes(sink, &bytes)?;
        }
        Node::String(s) => sink::write_mutf8_string(sink, s)?,
        Node::List(list) => {
            sink::write_u8(sink, list.content_kind().to_u8())?;
            write_array_len(sink, list.len())?;
            for item in list.items() {
                write_payload(sink, item)?;
            }
        }
        Node::Compound(compound) => {
            for (name, child) in compound.iter() {
                sink::write_u8(sink, child.kind().to_u8())?;
                sink::write_mutf8_string(sink, name)?;
                write_payload(sink, child)?;
            }
            sink::write_u8(sink, Kind::End.to_u8())?;
        }
        Node::Int32Array(items) => {
            write_array_len(sink, items.len())?;
            for v in items {
                sink::write_i32(sink, *v)?;
            }
        }
        Node::Int64Array(items) => {
            write_array_len(sink, items.len())?;
            for v in items {
                sink::write_i64(sink, *v)?;
            }
        }
    }
    Ok(())
}

fn write_array_len<W: std::io::Write + ?Sized>(sink: &mut W, len: usize) -> Result<()> {
    if len > i32::MAX as usize {
        return Err(Error::ValueOutOfRange(
            "array or list length does not fit in a signed 32-bit integer",
        ));
    }
    crate::sink::write_i32(sink, len as i32)
}
