//! Error types for the XModel library.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::AssetType;

/// Where in the input an error was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Byte offset into a binary stream.
    Offset(u64),
    /// 1-based line number in a text file.
    Line(usize),
    /// Face index while splitting meshes.
    Face(usize),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Offset(pos) => write!(f, "offset 0x{:X}", pos),
            Location::Line(line) => write!(f, "line {}", line),
            Location::Face(face) => write!(f, "face {}", face),
        }
    }
}

/// Main error type for XModel operations.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Container does not start with the LZ4 magic
    #[error("Bad magic {found:?}, expected b\"*LZ4*\"")]
    BadMagic { found: Vec<u8> },

    /// Compressed block could not be decoded
    #[error("LZ4 decompression failed: {0}")]
    Decompress(String),

    /// Container size field disagrees with the decompressed payload
    #[error("Container declares {expected} uncompressed bytes, payload has {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Tag value not present in the block table
    #[error("Unknown block tag 0x{tag:04X} at offset 0x{offset:X}")]
    UnknownTag { tag: u16, offset: u64 },

    /// Tag is known but reading it is not supported
    #[error("Unimplemented block '{name}' (0x{tag:04X}) at offset 0x{offset:X}")]
    UnimplementedTag { tag: u16, name: &'static str, offset: u64 },

    /// File holds a different asset type than requested
    #[error("Found {found} asset, expected {expected}")]
    AssetTypeMismatch { expected: AssetType, found: AssetType },

    /// Declared version is outside the supported set
    #[error("Invalid version: {version} - must be one of {supported:?}")]
    UnsupportedVersion { version: i32, supported: &'static [u16] },

    /// Neither the caller nor the object provides a version
    #[error("Unable to choose a valid version for the output file")]
    NoVersion,

    /// Index read from the stream exceeds the declared count
    #[error("{what} index {index} out of range [0, {count}) at {at}")]
    IndexOutOfRange {
        what: &'static str,
        index: i64,
        count: usize,
        at: Location,
    },

    /// Declared slot never filled by the stream
    #[error("{what} {index} was declared but never defined")]
    MissingEntry { what: &'static str, index: usize },

    /// Sub-record appeared with no entity open to receive it
    #[error("Block 0x{tag:04X} at offset 0x{offset:X} has no active target")]
    NoActiveTarget { tag: u16, offset: u64 },

    /// Stream ended in the middle of a record
    #[error("Unexpected end of data at offset 0x{0:X}")]
    UnexpectedEof(u64),

    /// String ran to end of stream without a terminator
    #[error("Unterminated string starting at offset 0x{0:X}")]
    UnterminatedString(u64),

    /// Malformed line in an ASCII file
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Strict-mode format limit violated on write
    #[error("Strict mode: {what} is {value}, limit is {limit}")]
    StrictLimit {
        what: &'static str,
        value: usize,
        limit: usize,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 conversion error
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create a parse error for the given line.
    pub fn parse(line: usize, msg: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: msg.into(),
        }
    }
}

/// Result type alias for XModel operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::BadMagic {
            found: b"Ogawa".to_vec(),
        };
        assert!(e.to_string().contains("*LZ4*"));

        let e = Error::UnknownTag {
            tag: 0xFFFF,
            offset: 5,
        };
        let msg = e.to_string();
        assert!(msg.contains("0xFFFF"));
        assert!(msg.contains("0x5"));

        let e = Error::IndexOutOfRange {
            what: "bone",
            index: 12,
            count: 3,
            at: Location::Line(40),
        };
        assert!(e.to_string().contains("line 40"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
