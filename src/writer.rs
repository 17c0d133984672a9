use std::io::{self, Write};

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::dispatch;
use crate::error::Result;
use crate::node::Node;
use crate::xml::{self, Element};

pub struct Writer<W: Write> {
    sink: WriterSink<W>,
}

enum WriterSink<W: Write> {
    Plain(W),
    Gzip(GzEncoder<W>),
}

impl<W: Write> Write for WriterSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            WriterSink::Plain(w) => w.write(buf),
            WriterSink::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            WriterSink::Plain(w) => w.flush(),
            WriterSink::Gzip(w) => w.flush(),
        }
    }
}

impl<W: Write> Writer<W> {
    pub fn open(sink: W, compressed: bool) -> Self {
        let sink = if compressed {
            WriterSink::Gzip(GzEncoder::new(sink, Compression::default()))
        } else {
            WriterSink::Plain(sink)
        };
        Writer { sink }
    }

    pub fn write_tree(&mut self, node: &Node, name: &str) -> Result<()> {
        crate::sink::write_u8(&mut self.sink, node.kind().to_u8())?;
        crate::sink::write_mutf8_string(&mut self.sink, name)?;
        dispatch::write_payload(&mut self.sink, node)?;
        Ok(())
    }

    pub fn write_xml(&mut self, root: &Element) -> Result<()> {
        xml::write_element(&mut self.sink, root)
    }

    pub fn finish(self) -> Result<W> {
        match self.sink {
            WriterSink::Plain(w) => Ok(w),
            WriterSink::Gzip(enc) => Ok(enc.finish()?),
        }
    }
}
