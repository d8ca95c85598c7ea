//! Binary `xmodel_bin` / `xanim_bin` implementation.
//!
//! This module handles the tagged-block binary format:
//! - [`IStream`] / [`OStream`] - File access
//! - [`BlockReader`] / [`BlockWriter`] - Record primitives
//! - [`read_model`] / [`read_anim`] - Tag dispatch into the data model
//! - [`write_model`] / [`write_anim`] - Payload serialization
//!
//! Payloads are plain records; files wrap them in the `*LZ4*` container
//! handled by [`crate::core::Lz4Container`].

mod block;
pub mod format;
mod reader;
mod stream;
mod writer;

use std::borrow::Cow;
use std::path::Path;

pub use block::{BlockReader, BlockWriter};
pub use format::Tag;
pub use reader::{read_anim, read_model};
pub use stream::{write_file, IStream, OStream};
pub use writer::{write_anim, write_model};

use crate::core::{Lz4Container, ReadOptions, LZ4_MAGIC};
use crate::util::Result;

/// Strip the container from file contents when `opts.compressed` is set.
///
/// With `opts.dump` the payload is also written beside `path` as `.dump`.
pub fn unwrap_payload<'a>(input: &'a [u8], path: &Path, opts: &ReadOptions) -> Result<Cow<'a, [u8]>> {
    if !opts.compressed {
        return Ok(Cow::Borrowed(input));
    }

    let payload = Lz4Container::new(opts.verbose).decompress(input)?;
    if opts.dump {
        let dump_path = path.with_extension("dump");
        write_file(&dump_path, &payload)?;
        tracing::info!("dumped {} payload bytes to '{}'", payload.len(), dump_path.display());
    }
    Ok(Cow::Owned(payload))
}

/// Offset added to payload positions in error messages.
pub fn payload_base(opts: &ReadOptions) -> u64 {
    if opts.compressed {
        LZ4_MAGIC.len() as u64
    } else {
        0
    }
}
