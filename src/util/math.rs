//! Math type re-exports and XModel-specific numeric conversions.
//!
//! This module re-exports the `glam` vector types used by the data model and
//! provides the fixed-point conversions the binary format relies on.

pub use glam::{Mat3, Vec2, Vec3, Vec4};

/// Scale used by the short-vector codec (matrix rows and normals).
pub const SHORT_SCALE: f32 = 32767.0;

/// Scale used by the byte color codec.
pub const COLOR_SCALE: f32 = 255.0;

/// Smallest normal component the engine importer can tell apart from zero.
///
/// Anything below this after a float-to-short conversion makes the importer
/// fail with "vertex normal is 0", so such components are flushed.
pub const ROUNDING_THRESHOLD: f32 = 0.00001526;

/// Length below which a normal is treated as a zero vector.
pub const ZERO_NORMAL_EPSILON: f32 = 1e-6;

/// Clamp a value to `[-1.0, 1.0]`.
#[inline]
pub fn clamp_unit(value: f32) -> f32 {
    value.clamp(-1.0, 1.0)
}

/// Clamp every component of a vector to `[-1.0, 1.0]`.
#[inline]
pub fn clamp_unit_vec3(v: Vec3) -> Vec3 {
    v.clamp(Vec3::splat(-1.0), Vec3::splat(1.0))
}

/// Quantize a float in `[-1, 1]` to a signed short. Out-of-range input is clamped.
#[inline]
pub fn quantize_short(value: f32) -> i16 {
    (clamp_unit(value) * SHORT_SCALE).round() as i16
}

/// Map a signed short back to a float.
#[inline]
pub fn dequantize_short(value: i16) -> f32 {
    value as f32 / SHORT_SCALE
}

/// Quantize a color channel in `[0, 1]` to a byte. Out-of-range input is clamped.
#[inline]
pub fn quantize_color(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * COLOR_SCALE).round() as u8
}

/// Map a color byte back to a float.
#[inline]
pub fn dequantize_color(value: u8) -> f32 {
    value as f32 / COLOR_SCALE
}

/// Round `size` up to the next multiple of 4.
#[inline]
pub const fn padded(size: usize) -> usize {
    (size + 3) & !3
}

/// Prepare a face-vertex normal for text output.
///
/// Normalizes, flushes components below [`ROUNDING_THRESHOLD`], then
/// normalizes again. Zero-length input becomes `(0, 0, 1)`.
pub fn process_normal(normal: Vec3) -> Vec3 {
    if normal.length() < ZERO_NORMAL_EPSILON {
        return Vec3::Z;
    }

    let n = normal.normalize();
    let flush = |c: f32| if c.abs() < ROUNDING_THRESHOLD { 0.0 } else { c };
    let flushed = Vec3::new(flush(n.x), flush(n.y), flush(n.z));

    // Normalized input always keeps at least one component near 1/sqrt(3).
    flushed.normalize()
}
