use std::io::{Read, Seek};

use flate2::read::GzDecoder;

use crate::dispatch;
use crate::error::{Error, Result};
use crate::filter::{FilteredNodes, NodeFilter};
use crate::kind::Kind;
use crate::node::Node;
use crate::source::{self, BufferedSource, SeekableSource, Source};
use crate::xml::{self, Element};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Auto,
}

pub struct Reader {
    source: Box<dyn Source>,
}

impl Reader {
    pub fn open<R: Read + 'static>(source: R, compression: Compression) -> Result<Self> {
        let boxed: Box<dyn Source> = match compression {
            Compression::None => Box::new(BufferedSource::new(source)),
            Compression::Gzip => Box::new(BufferedSource::new(GzDecoder::new(source))),
            Compression::Auto => {
                return Err(Error::FormatError(
                    "Compression::Auto requires a seekable source; use Reader::open_seekable"
                        .into(),
                ))
            }
        };
        Ok(Reader { source: boxed })
    }

    pub fn open_seekable<R: Read + Seek + 'static>(
        source: R,
        compression: Compression,
    ) -> Result<Self> {
        let boxed: Box<dyn Source> = match compression {
            Compression::None => Box::new(SeekableSource::new(source)),
            Compression::Gzip => Box::new(BufferedSource::new(GzDecoder::new(source))),
            Compression::Auto => {
                let mut seekable = SeekableSource::new(source);
                let peeked = seekable.peek2()?;
                log::trace!("gzip auto-detect peeked {:?}, rewound", peeked);
                if peeked == Some([0x1F, 0x8B]) {
                    Box::new(BufferedSource::new(GzDecoder::new(seekable.into_inner())))
                } else {
                    Box::new(seekable)
                }
            }
        };
        Ok(Reader { source: boxed })
    }

    fn read_root_header(&mut self, has_name: bool) -> Result<(Kind, String)> {
        let kind = Kind::try_from_u8(source::read_u8(self.source.as_mut())?)?;
        let name = if has_name {
            source::read_mutf8_string(self.source.as_mut())?
        } else {
            String::new()
        };
        Ok((kind, name))
    }

    pub fn read_tree(&mut self, has_name: bool) -> Result<(Node, String)> {
        let (kind, name) = self.read_root_header(has_name)?;
        let metadata = dispatch::read_metadata(self.source.as_mut(), kind)?;
        let node = dispatch::read_payload(self.source.as_mut(), kind, metadata)?;
        Ok((node, name))
    }

    pub fn read_xml(&mut self, has_name: bool) -> Result<(Element, Kind)> {
        let (node, name) = self.read_tree(has_name)?;
        let root_name = if has_name { Some(name.as_str()) } else { None };
        let kind = node.kind();
        Ok((xml::node_to_element(&node, root_name), kind))
    }

    pub fn read_filtered<F: NodeFilter>(
        &mut self,
        filter: F,
        has_name: bool,
    ) -> Result<impl Iterator<Item = Result<Node>> + '_> {
        let (kind, name) = self.read_root_header(has_name)?;
        FilteredNodes::new(self.source.as_mut(), filter, name, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{AbsolutePath, NameAnywhere, NoFilter};
    use crate::node::Compound;
    use std::io::Cursor;

    fn hello_world_bytes() -> Vec<u8> {
        vec![
            0x0A, 0x00, 0x05, b'h', b'e', b'l', b'l', b'o', 0x08, 0x00, 0x04, b'n', b'a', b'm',
            b'e', 0x00, 0x06, b'B', b'a', b'n', b'a', b'n', b'a', 0x00,
        ]
    }

    #[test]
    fn read_tree_materializes_hello_world() {
        let mut reader = Reader::open(Cursor::new(hello_world_bytes()), Compression::None).unwrap();
        let (node, name) = reader.read_tree(true).unwrap();
        assert_eq!(name, "hello");
        match node {
            Node::Compound(c) => {
                assert_eq!(c.get("name"), Some(&Node::String("Banana".into())));
            }
            other => panic!("expected Compound, got {:?}", other),
        }
    }

    #[test]
    fn read_filtered_no_filter_emits_root_only() {
        let mut reader = Reader::open(Cursor::new(hello_world_bytes()), Compression::None).unwrap();
        let nodes: Vec<_> = reader
            .read_filtered(NoFilter, true)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn read_filtered_absolute_path_finds_nested_value() {
        let mut inner = Compound::new();
        inner.try_insert("x".into(), Node::Int32(42)).unwrap();
        inner.try_insert("y".into(), Node::Int32(7)).unwrap();
        let mut root = Compound::new();
        root.try_insert("a".into(), Node::Compound(inner)).unwrap();

        let mut buf = Vec::new();
        {
            let mut writer = crate::writer::Writer::open(&mut buf, false);
            writer.write_tree(&Node::Compound(root), "").unwrap();
        }

        let mut reader = Reader::open(Cursor::new(buf), Compression::None).unwrap();
        let filter = AbsolutePath::new(["", "a", "x"]);
        let nodes: Vec<_> = reader
            .read_filtered(filter, true)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(nodes, vec![Node::Int32(42)]);
    }

    #[test]
    fn read_filtered_skips_large_array_without_materializing_it() {
        let mut root = Compound::new();
        root.try_insert(
            "numbers".into(),
            Node::Int32Array(vec![0; 1_000_000]),
        )
        .unwrap();
        root.try_insert("tail".into(), Node::String("ok".into()))
            .unwrap();

        let mut buf = Vec::new();
        {
            let mut writer = crate::writer::Writer::open(&mut buf, false);
            writer.write_tree(&Node::Compound(root), "").unwrap();
        }

        let mut reader = Reader::open(Cursor::new(buf), Compression::None).unwrap();
        let nodes: Vec<_> = reader
            .read_filtered(NameAnywhere::new("tail"), true)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(nodes, vec![Node::String("ok".into())]);
    }

    #[test]
    fn gzip_auto_detect_round_trips() {
        let mut writer = crate::writer::Writer::open(Vec::new(), true);
        writer.write_tree(&Node::Int8(7), "").unwrap();
        let compressed = writer.finish().unwrap();

        let mut reader =
            Reader::open_seekable(Cursor::new(compressed), Compression::Auto).unwrap();
        let (node, _) = reader.read_tree(true).unwrap();
        assert_eq!(node, Node::Int8(7));
    }
}
