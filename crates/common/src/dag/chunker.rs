use std::io::{self, Read};

use bytes::Bytes;

pub const DEFAULT_CHUNK_SIZE: usize = 256 * 1024;

/// Cuts a byte stream into chunks, one at a time
pub trait Splitter: Send + Sync + std::fmt::Debug {
    /// Read the next chunk. `Ok(None)` once the reader is exhausted.
    fn next_chunk(&self, reader: &mut dyn Read) -> io::Result<Option<Bytes>>;

    /// Lazily split `reader`
    fn split<R: Read>(&self, reader: R) -> Chunks<'_, Self, R>
    where
        Self: Sized,
    {
        Chunks {
            splitter: self,
            reader,
            done: false,
        }
    }
}

/// Iterator returned by [`Splitter::split`]
#[derive(Debug)]
pub struct Chunks<'s, S, R> {
    splitter: &'s S,
    reader: R,
    done: bool,
}

impl<S: Splitter, R: Read> Iterator for Chunks<'_, S, R> {
    type Item = io::Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.splitter.next_chunk(&mut self.reader) {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Fixed-size chunks. Every chunk but the last is exactly `size` bytes,
///  however the reader happens to hand its data over.
#[derive(Debug, Clone, Copy)]
pub struct SizeSplitter {
    size: usize,
}

impl SizeSplitter {
    /// A zero size is bumped to one byte
    pub fn new(size: usize) -> Self {
        Self { size: size.max(1) }
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl Default for SizeSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl Splitter for SizeSplitter {
    fn next_chunk(&self, reader: &mut dyn Read) -> io::Result<Option<Bytes>> {
        let mut buf = vec![0u8; self.size];
        let mut filled = 0;
        while filled < self.size {
            match reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
        if filled == 0 {
            return Ok(None);
        }
        buf.truncate(filled);
        Ok(Some(Bytes::from(buf)))
    }
}
