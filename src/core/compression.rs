//! `*LZ4*` container framing for binary payloads.
//!
//! Layout: 5-byte magic, u32 LE uncompressed size, raw LZ4 block.

use std::cell::Cell;

use byteorder::{ByteOrder, LittleEndian};

use crate::util::{Error, Result};

/// Magic bytes opening every compressed binary file.
pub const LZ4_MAGIC: &[u8; 5] = b"*LZ4*";

/// Magic plus the size field.
pub const CONTAINER_HEADER_SIZE: usize = LZ4_MAGIC.len() + 4;

/// Wraps and unwraps binary payloads.
///
/// Each instance reports codec details at most once when `verbose` is set.
#[derive(Debug, Default)]
pub struct Lz4Container {
    verbose: bool,
    info_shown: Cell<bool>,
}

impl Lz4Container {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            info_shown: Cell::new(false),
        }
    }

    fn report_support_info(&self) {
        if self.verbose && !self.info_shown.replace(true) {
            tracing::info!("LZ4 block codec: lz4_flex (raw block, size-prefixed container)");
        }
    }

    /// Frame `payload` into a container.
    pub fn compress(&self, payload: &[u8]) -> Result<Vec<u8>> {
        self.report_support_info();

        let size = u32::try_from(payload.len())
            .map_err(|_| Error::other(format!("payload of {} bytes exceeds u32", payload.len())))?;
        let block = lz4_flex::block::compress(payload);

        let mut out = Vec::with_capacity(CONTAINER_HEADER_SIZE + block.len());
        out.extend_from_slice(LZ4_MAGIC);
        let mut size_field = [0u8; 4];
        LittleEndian::write_u32(&mut size_field, size);
        out.extend_from_slice(&size_field);
        out.extend_from_slice(&block);

        tracing::debug!(
            "compressed {} bytes into {} byte container",
            payload.len(),
            out.len()
        );
        Ok(out)
    }

    /// Unwrap a container, returning the tagged-block payload.
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.report_support_info();

        if data.len() < LZ4_MAGIC.len() || &data[..LZ4_MAGIC.len()] != LZ4_MAGIC {
            let n = data.len().min(LZ4_MAGIC.len());
            return Err(Error::BadMagic {
                found: data[..n].to_vec(),
            });
        }
        if data.len() < CONTAINER_HEADER_SIZE {
            return Err(Error::UnexpectedEof(data.len() as u64));
        }

        let expected = LittleEndian::read_u32(&data[LZ4_MAGIC.len()..CONTAINER_HEADER_SIZE]) as usize;
        let payload = lz4_flex::block::decompress(&data[CONTAINER_HEADER_SIZE..], expected)
            .map_err(|e| Error::Decompress(e.to_string()))?;

        if payload.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: payload.len(),
            });
        }

        tracing::debug!("decompressed {} byte payload", payload.len());
        Ok(payload)
    }
}

/// Returns true when `data` opens with the container magic.
pub fn has_lz4_magic(data: &[u8]) -> bool {
    data.starts_with(LZ4_MAGIC)
}
