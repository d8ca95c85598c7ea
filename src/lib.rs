//! # XModel
//!
//! Rust implementation of the XModel skinned-model and animation formats:
//! the line-oriented `xmodel_export` text format and the LZ4-framed binary
//! `xmodel_bin` / `xanim_bin` formats.
//!
//! ## Modules
//!
//! - [`util`] - Errors, math types and fixed-point conversions
//! - [`core`] - Asset types, versions, load/save options, LZ4 container
//! - [`xbin`] - Binary tagged-block codec
//! - [`export`] - Text `xmodel_export` codec
//! - [`model`] - In-memory model, animation and the load/save API
//!
//! ## Example
//!
//! ```ignore
//! use xmodel::prelude::*;
//!
//! let mut model = Model::load("viewmodel.xmodel_export")?;
//! println!("{} bones, {} meshes", model.bones.len(), model.meshes.len());
//!
//! let opts = WriteOptions::new(Format::Bin).with_version(7);
//! model.save("viewmodel.xmodel_bin", &opts)?;
//! ```

pub mod util;
pub mod core;
pub mod xbin;
pub mod export;
pub mod model;

// Re-export commonly used types
pub use util::{Error, Result};
pub use model::{Anim, Model};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, Result, Vec2, Vec3, Vec4};
    pub use crate::core::{AssetType, Format, ReadOptions, WriteOptions};
    pub use crate::model::{
        Anim, Bone, Face, FaceVertex, Frame, FramePart, ImageSlot, Images, Material, Mesh, Model,
        Note, PartInfo, Vertex, Weight, MAX_WEIGHTS,
    };
}
