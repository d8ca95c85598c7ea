//! Skeletal animations (`xanim_bin`).

use std::path::Path;

use crate::core::{resolve_version, AssetType, Lz4Container, ReadOptions, WriteOptions};
use crate::util::{Result, Vec3};
use crate::xbin;

/// Animated part (bone) name.
#[derive(Debug, Clone, PartialEq)]
pub struct PartInfo {
    pub name: String,
}

impl PartInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Transform of one part at one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePart {
    pub offset: Vec3,
    /// Rotation rows.
    pub matrix: [Vec3; 3],
}

impl Default for FramePart {
    fn default() -> Self {
        Self {
            offset: Vec3::ZERO,
            matrix: [Vec3::X, Vec3::Y, Vec3::Z],
        }
    }
}

/// One keyed frame, holding a transform per part.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub frame: i32,
    pub parts: Vec<FramePart>,
}

impl Frame {
    pub fn new(frame: i32, parts: Vec<FramePart>) -> Self {
        Self { frame, parts }
    }
}

/// Notetrack event.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub frame: i32,
    pub string: String,
}

impl Note {
    pub fn new(frame: i32, string: impl Into<String>) -> Self {
        Self {
            frame,
            string: string.into(),
        }
    }
}

/// An animation.
#[derive(Debug, Clone, PartialEq)]
pub struct Anim {
    pub name: String,
    pub version: Option<u16>,
    pub comment: Option<String>,
    pub framerate: i16,
    pub parts: Vec<PartInfo>,
    pub frames: Vec<Frame>,
    pub notes: Vec<Note>,
}

impl Default for Anim {
    fn default() -> Self {
        Self {
            name: "$anim".to_string(),
            version: None,
            comment: None,
            framerate: 30,
            parts: Vec::new(),
            frames: Vec::new(),
            notes: Vec::new(),
        }
    }
}

impl Anim {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an `xanim_bin` file.
    pub fn load_bin(path: impl AsRef<Path>, opts: &ReadOptions) -> Result<Self> {
        let path = path.as_ref();
        let input = xbin::IStream::open(path)?;
        let payload = xbin::unwrap_payload(&input, path, opts)?;
        let mut anim = xbin::read_anim(&payload, xbin::payload_base(opts))?;
        if let Some(stem) = path.file_stem() {
            anim.name = stem.to_string_lossy().into_owned();
        }
        tracing::info!(
            "loaded anim '{}': {} parts, {} frames, {} notes",
            anim.name,
            anim.parts.len(),
            anim.frames.len(),
            anim.notes.len()
        );
        Ok(anim)
    }

    /// Parse an `xanim_bin` image held in memory.
    pub fn from_bin_bytes(data: &[u8], opts: &ReadOptions) -> Result<Self> {
        let payload = if opts.compressed {
            Lz4Container::new(opts.verbose).decompress(data)?
        } else {
            data.to_vec()
        };
        xbin::read_anim(&payload, xbin::payload_base(opts))
    }

    /// Serialize to a compressed `xanim_bin` image.
    pub fn to_bin_bytes(&mut self, opts: &WriteOptions) -> Result<Vec<u8>> {
        let version = resolve_version(AssetType::Anim, &mut self.version, opts.version)?;
        let payload = xbin::write_anim(self, version, &opts.header_message)?;
        Lz4Container::new(opts.verbose).compress(&payload)
    }

    /// Write an `xanim_bin` file.
    pub fn save_bin(&mut self, path: impl AsRef<Path>, opts: &WriteOptions) -> Result<()> {
        let path = path.as_ref();
        let data = self.to_bin_bytes(opts)?;
        xbin::write_file(path, &data)?;
        tracing::info!("wrote '{}' ({} bytes)", path.display(), data.len());
        Ok(())
    }
}
