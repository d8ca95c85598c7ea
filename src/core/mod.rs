//! Core layer - asset identity, versions, options and container framing.
//!
//! This module provides:
//! - [`AssetType`] - Model vs. animation identity of a file
//! - [`resolve_version`] - Version selection shared by every writer
//! - [`ReadOptions`] / [`WriteOptions`] / [`Format`] - Load/save configuration
//! - [`Lz4Container`] - The `*LZ4*` envelope around binary payloads

mod compression;
mod options;
mod version;

use std::fmt;

pub use compression::{has_lz4_magic, Lz4Container, CONTAINER_HEADER_SIZE, LZ4_MAGIC};
pub use options::{Format, ReadOptions, WriteOptions};
pub use version::{
    header_comment, resolve_version, validate_version, ANIM_SUPPORTED_VERSIONS,
    MODEL_SUPPORTED_VERSIONS,
};

/// Kind of asset stored in a binary file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetType {
    Model,
    Anim,
}

impl AssetType {
    /// Versions accepted for this asset type.
    pub fn supported_versions(self) -> &'static [u16] {
        match self {
            AssetType::Model => MODEL_SUPPORTED_VERSIONS,
            AssetType::Anim => ANIM_SUPPORTED_VERSIONS,
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetType::Model => f.write_str("MODEL"),
            AssetType::Anim => f.write_str("ANIM"),
        }
    }
}
