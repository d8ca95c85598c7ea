//! Text `xmodel_export` implementation.
//!
//! - [`tokens`] - Line tokenizer
//! - [`read_model`] - Section-by-section parser into a flat model
//! - [`write_model`] - Text serializer

pub mod tokens;
mod reader;
mod writer;

pub use reader::read_model;
pub use writer::write_model;
