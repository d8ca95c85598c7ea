//! File input and output streams.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::ops::Deref;
use std::path::Path;

use memmap2::Mmap;

use crate::util::{Error, Result};

/// Whole-file input, memory-mapped when possible.
pub struct IStream {
    inner: StreamInner,
}

enum StreamInner {
    /// Memory-mapped file
    Mmap(Mmap),
    /// Owned bytes (empty files, in-memory input)
    Owned(Vec<u8>),
}

impl IStream {
    /// Open a file for reading with memory mapping.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                Error::FileNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;

        let size = file.metadata()?.len();
        let inner = if size > 0 {
            // Safety: the map is read-only and dropped with the stream.
            StreamInner::Mmap(unsafe { Mmap::map(&file) }?)
        } else {
            StreamInner::Owned(Vec::new())
        };

        Ok(Self { inner })
    }

    /// Wrap bytes already in memory.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            inner: StreamInner::Owned(data),
        }
    }

    #[inline]
    pub fn size(&self) -> u64 {
        self.len() as u64
    }

    /// Whether the data is memory-mapped.
    pub fn is_mapped(&self) -> bool {
        matches!(self.inner, StreamInner::Mmap(_))
    }
}

impl Deref for IStream {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match &self.inner {
            StreamInner::Mmap(mmap) => &mmap[..],
            StreamInner::Owned(data) => &data[..],
        }
    }
}

/// Buffered output file with position tracking.
pub struct OStream {
    writer: BufWriter<File>,
    pos: u64,
}

impl OStream {
    /// Create (or truncate) the file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: BufWriter::with_capacity(1024 * 1024, file),
            pos: 0,
        })
    }

    /// Bytes written so far.
    #[inline]
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Flush and close.
    pub fn finish(mut self) -> Result<u64> {
        self.writer.flush()?;
        Ok(self.pos)
    }
}

impl Write for OStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.writer.write(buf)?;
        self.pos += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Write `data` to `path` in one pass.
pub fn write_file(path: impl AsRef<Path>, data: &[u8]) -> Result<u64> {
    let mut out = OStream::create(path)?;
    out.write_all(data)?;
    out.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_write_then_map() {
        let file = NamedTempFile::new().unwrap();
        assert_eq!(write_file(file.path(), b"*LZ4*data").unwrap(), 9);

        let input = IStream::open(file.path()).unwrap();
        assert!(input.is_mapped());
        assert_eq!(&input[..], b"*LZ4*data");
        assert_eq!(input.size(), 9);
    }

    #[test]
    fn test_empty_file() {
        let file = NamedTempFile::new().unwrap();
        let input = IStream::open(file.path()).unwrap();
        assert!(!input.is_mapped());
        assert!(input.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let err = IStream::open("/definitely/not/here.xmodel_bin").err().unwrap();
        assert!(matches!(err, Error::FileNotFound(_)));
    }
}
