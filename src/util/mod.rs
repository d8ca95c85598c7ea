//! Utility types and functions for XModel.
//!
//! This module contains fundamental types used throughout the library:
//! - [`Error`] / [`Result`] - Error handling
//! - Math type re-exports from glam plus the fixed-point conversions

mod error;
mod math;

pub use error::*;
pub use math::*;
