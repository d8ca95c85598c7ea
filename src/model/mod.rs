//! In-memory model and its load/save entry points.
//!
//! A [`Model`] owns bones, meshes and materials. All cross references
//! (bone parents, weight bones, face vertices) are plain indices.
//!
//! # Example
//!
//! ```ignore
//! use xmodel::prelude::*;
//!
//! let mut model = Model::load("gun.xmodel_export")?;
//! model.normalize_weights();
//! model.save("gun.xmodel_bin", &WriteOptions::for_path("gun.xmodel_bin").with_version(7))?;
//! ```

mod anim;
mod assembly;
mod bone;
pub mod cosmetic;
mod layout;
mod material;
mod mesh;
mod reorder;

use std::path::Path;

pub use anim::{Anim, Frame, FramePart, Note, PartInfo};
pub use assembly::{generate_meshes, RawModel, DEFAULT_MESH_NAME};
pub use bone::Bone;
pub use layout::{check_strict_limits, uses_wide_indices, VertexLayout, MAX_PACKED_IDS, MAX_VERTS_16};
pub use material::{ImageSlot, Images, Material};
pub use mesh::{Face, FaceVertex, Mesh, Vertex, Weight, Weights, MAX_WEIGHTS};
pub use reorder::reorder_cosmetic_bones;

use crate::core::{has_lz4_magic, resolve_version, AssetType, Format, Lz4Container, ReadOptions, WriteOptions};
use crate::export;
use crate::util::{Error, Result};
use crate::xbin;

/// A skinned model.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub name: String,
    /// Format version, set by loading or by a successful save.
    pub version: Option<u16>,
    /// Comment block found in a binary file.
    pub comment: Option<String>,
    pub bones: Vec<Bone>,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            name: "$model".to_string(),
            version: None,
            comment: None,
            bones: Vec::new(),
            meshes: Vec::new(),
            materials: Vec::new(),
        }
    }
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Load a model, detecting the format from its contents and extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(path, &ReadOptions::default())
    }

    /// Load a model with explicit read options.
    ///
    /// Data opening with `*LZ4*` is always read as compressed binary. Otherwise
    /// a binary extension selects binary (honoring `opts.compressed`) and
    /// anything else is read as text.
    pub fn load_with(path: impl AsRef<Path>, opts: &ReadOptions) -> Result<Self> {
        let path = path.as_ref();
        let input = xbin::IStream::open(path)?;

        let mut model = if has_lz4_magic(&input) {
            let opts = opts.clone().with_compressed(true);
            Self::bin_from_input(&input, path, &opts)?
        } else if Format::from_path(path) == Some(Format::Bin) {
            Self::bin_from_input(&input, path, opts)?
        } else {
            let text = std::str::from_utf8(&input).map_err(|e| Error::other(e.to_string()))?;
            Self::from_export_str(text, opts)?
        };

        model.name = model_name(path);
        model.log_summary();
        Ok(model)
    }

    /// Load an `xmodel_export` file.
    pub fn load_export(path: impl AsRef<Path>, opts: &ReadOptions) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
            _ => e.into(),
        })?;
        let mut model = Self::from_export_str(&text, opts)?;
        model.name = model_name(path);
        model.log_summary();
        Ok(model)
    }

    /// Load an `xmodel_bin` file.
    pub fn load_bin(path: impl AsRef<Path>, opts: &ReadOptions) -> Result<Self> {
        let path = path.as_ref();
        let input = xbin::IStream::open(path)?;
        let mut model = Self::bin_from_input(&input, path, opts)?;
        model.name = model_name(path);
        model.log_summary();
        Ok(model)
    }

    fn bin_from_input(input: &[u8], path: &Path, opts: &ReadOptions) -> Result<Self> {
        let payload = xbin::unwrap_payload(input, path, opts)?;
        xbin::read_model(&payload, xbin::payload_base(opts))?.assemble(opts.split_meshes)
    }

    /// Parse `xmodel_export` text.
    pub fn from_export_str(text: &str, opts: &ReadOptions) -> Result<Self> {
        export::read_model(text, opts.split_meshes)?.assemble(opts.split_meshes)
    }

    /// Parse an `xmodel_bin` image held in memory.
    pub fn from_bin_bytes(data: &[u8], opts: &ReadOptions) -> Result<Self> {
        let payload = if opts.compressed {
            Lz4Container::new(opts.verbose).decompress(data)?
        } else {
            data.to_vec()
        };
        xbin::read_model(&payload, xbin::payload_base(opts))?.assemble(opts.split_meshes)
    }

    // ========================================================================
    // Saving
    // ========================================================================

    /// Save in the format named by `opts.format`.
    ///
    /// Version 7 output moves cosmetic bones last, so bone indices of `self`
    /// may change.
    pub fn save(&mut self, path: impl AsRef<Path>, opts: &WriteOptions) -> Result<()> {
        match opts.format {
            Format::Export => self.write_export(path, opts),
            Format::Bin => self.write_bin(path, opts),
        }
    }

    /// Write an `xmodel_export` file.
    pub fn write_export(&mut self, path: impl AsRef<Path>, opts: &WriteOptions) -> Result<()> {
        let path = path.as_ref();
        let (version, layout) = self.prepare_write(opts)?;
        let mut out = xbin::OStream::create(path)?;
        export::write_model(&mut out, self, version, &layout, opts)?;
        let size = out.finish()?;
        tracing::info!("wrote '{}' (version {}, {} bytes)", path.display(), version, size);
        Ok(())
    }

    /// Write a compressed `xmodel_bin` file.
    pub fn write_bin(&mut self, path: impl AsRef<Path>, opts: &WriteOptions) -> Result<()> {
        let path = path.as_ref();
        let data = self.to_bin_bytes(opts)?;
        xbin::write_file(path, &data)?;
        tracing::info!("wrote '{}' ({} bytes)", path.display(), data.len());
        Ok(())
    }

    /// Serialize to `xmodel_export` text.
    pub fn to_export_string(&mut self, opts: &WriteOptions) -> Result<String> {
        let (version, layout) = self.prepare_write(opts)?;
        let mut out = Vec::new();
        export::write_model(&mut out, self, version, &layout, opts)?;
        Ok(String::from_utf8(out)?)
    }

    /// Serialize to a compressed `xmodel_bin` image.
    pub fn to_bin_bytes(&mut self, opts: &WriteOptions) -> Result<Vec<u8>> {
        let payload = self.to_bin_payload(opts)?;
        Lz4Container::new(opts.verbose).compress(&payload)
    }

    /// Serialize to the uncompressed tagged-block payload.
    pub fn to_bin_payload(&mut self, opts: &WriteOptions) -> Result<Vec<u8>> {
        let (version, layout) = self.prepare_write(opts)?;
        xbin::write_model(self, version, &layout, opts)
    }

    /// Shared pre-write pipeline: version, strict limits, cosmetic reorder, layout.
    fn prepare_write(&mut self, opts: &WriteOptions) -> Result<(u16, VertexLayout)> {
        let version = resolve_version(AssetType::Model, &mut self.version, opts.version)?;
        let layout = VertexLayout::new(&self.meshes, version);

        if opts.strict {
            check_strict_limits(version, self.meshes.len(), self.materials.len(), layout.total)?;
        } else if self.materials.len() >= MAX_PACKED_IDS || self.meshes.len() >= MAX_PACKED_IDS {
            tracing::warn!(
                "{} meshes / {} materials exceed what the engine accepts",
                self.meshes.len(),
                self.materials.len()
            );
        }

        if version == 7 {
            reorder_cosmetic_bones(&mut self.bones, &mut self.meshes)?;
        }
        Ok((version, layout))
    }

    // ========================================================================
    // Utilities
    // ========================================================================

    /// L2-normalize the weights of every vertex in every mesh.
    pub fn normalize_weights(&mut self) {
        for vert in self.meshes.iter_mut().flat_map(|m| m.verts.iter_mut()) {
            vert.normalize_weights();
        }
    }

    /// Cap every vertex to [`MAX_WEIGHTS`] weights. Returns true if any changed.
    pub fn fix_too_many_weights(&mut self) -> bool {
        let mut changed = false;
        for vert in self.meshes.iter_mut().flat_map(|m| m.verts.iter_mut()) {
            changed |= vert.fix_too_many_weights();
        }
        changed
    }

    /// Mark bones cosmetic by their facial-rig names. Returns how many were marked.
    pub fn mark_cosmetic_bones(&mut self) -> usize {
        self.bones
            .iter_mut()
            .map(|b| b.mark_cosmetic_by_name())
            .filter(|&c| c)
            .count()
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.verts.len()).sum()
    }

    pub fn face_count(&self) -> usize {
        self.meshes.iter().map(|m| m.faces.len()).sum()
    }

    pub fn cosmetic_count(&self) -> usize {
        self.bones.iter().filter(|b| b.cosmetic).count()
    }

    fn log_summary(&self) {
        tracing::info!(
            "loaded model '{}' v{}: {} bones, {} meshes, {} verts, {} faces, {} materials",
            self.name,
            self.version.unwrap_or(0),
            self.bones.len(),
            self.meshes.len(),
            self.vertex_count(),
            self.face_count(),
            self.materials.len()
        );
    }
}

fn model_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "$model".to_string())
}
