use std::io::{self, Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::{Error, Result};
use crate::mutf8;

const SKIP_CHUNK: usize = 1024 * 1024;

pub trait Source: Read {
    fn skip(&mut self, n: u64) -> io::Result<()>;
}

pub struct BufferedSource<R: Read> {
    inner: R,
    scratch: Vec<u8>,
}

impl<R: Read> BufferedSource<R> {
    pub fn new(inner: R) -> Self {
        BufferedSource {
            inner,
            scratch: Vec::new(),
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for BufferedSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read> Source for BufferedSource<R> {
    fn skip(&mut self, n: u64) -> io::Result<()> {
        let mut remaining = n;
        if self.scratch.is_empty() {
            self.scratch.resize(SKIP_CHUNK, 0);
        }
        while remaining > 0 {
            let chunk = remaining.min(SKIP_CHUNK as u64) as usize;
            self.inner.read_exact(&mut self.scratch[..chunk])?;
            remaining -= chunk as u64;
        }
        Ok(())
    }
}

pub struct SeekableSource<R: Read + Seek> {
    inner: R,
}

impl<R: Read + Seek> SeekableSource<R> {
    pub fn new(inner: R) -> Self {
        SeekableSource { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    // always restores the original position, even if fewer than two bytes were available
    pub fn peek2(&mut self) -> io::Result<Option<[u8; 2]>> {
        let start = self.inner.stream_position()?;
        let mut buf = [0u8; 2];
        let result = self.inner.read_exact(&mut buf);
        self.inner.seek(SeekFrom::Start(start))?;
        match result {
            Ok(()) => Ok(Some(buf)),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl<R: Read + Seek> Read for SeekableSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read + Seek> Source for SeekableSource<R> {
    fn skip(&mut self, n: u64) -> io::Result<()> {
        self.inner.seek(SeekFrom::Current(n as i64))?;
        Ok(())
    }
}

macro_rules! read_be_types {
    ($($typ:ident),+) => {
        paste::item! {
            $(
                pub fn [<read_ $typ>]<S: Source + ?Sized>(source: &mut S) -> Result<$typ> {
                    Ok(source.[<read_ $typ>]::<BigEndian>()?)
                }
            )+
        }
    };
}

pub fn read_u8<S: Source + ?Sized>(source: &mut S) -> Result<u8> {
    Ok(source.read_u8()?)
}

pub fn read_i8<S: Source + ?Sized>(source: &mut S) -> Result<i8> {
    Ok(source.read_i8()?)
}

read_be_types!(u16, i16, u32, i32, i64, f32, f64);

pub fn read_exact<S: Source + ?Sized>(source: &mut S, n: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; n];
    source.read_exact(&mut buf)?;
    Ok(buf)
}

pub fn read_mutf8_string<S: Source + ?Sized>(source: &mut S) -> Result<String> {
    let len = read_u16(source)?;
    let bytes = read_exact(source, len as usize)?;
    mutf8::decode(&bytes)
}
