//! Primitive block codec.
//!
//! Records open with a u16 tag. Most reserve two padding bytes after the
//! tag and end on a 4-byte boundary measured from the tag. The plain
//! 16-bit records (`Hh` layout) and the short-vector, weight, triangle
//! and UV records are fixed-size and carry no trailing padding.

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::util::{
    dequantize_color, dequantize_short, padded, quantize_color, quantize_short, Error, Result,
    Vec2, Vec3, Vec4,
};

use super::format as tags;

// ============================================================================
// Reading
// ============================================================================

/// Little-endian cursor over a decompressed payload.
///
/// `base` is added to every reported offset so errors point into the file
/// rather than the decompressed buffer.
#[derive(Clone)]
pub struct BlockReader<'a> {
    data: &'a [u8],
    pos: usize,
    base: u64,
    record_start: usize,
}

impl<'a> BlockReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_base(data, 0)
    }

    pub fn with_base(data: &'a [u8], base: u64) -> Self {
        Self {
            data,
            pos: 0,
            base,
            record_start: 0,
        }
    }

    /// Reported offset of the cursor.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.base + self.pos as u64
    }

    /// Reported offset of the current record's tag.
    #[inline]
    pub fn record_offset(&self) -> u64 {
        self.base + self.record_start as u64
    }

    /// Cursor position within the payload.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if self.remaining() < n {
            return Err(Error::UnexpectedEof(self.base + self.data.len() as u64));
        }
        Ok(())
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Start the next record. Returns `None` at a clean end of stream.
    pub fn read_tag(&mut self) -> Result<Option<u16>> {
        if self.is_empty() {
            return Ok(None);
        }
        self.record_start = self.pos;
        self.read_u16().map(Some)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    pub fn read_vec2(&mut self) -> Result<Vec2> {
        Ok(Vec2::new(self.read_f32()?, self.read_f32()?))
    }

    pub fn read_vec3(&mut self) -> Result<Vec3> {
        Ok(Vec3::new(self.read_f32()?, self.read_f32()?, self.read_f32()?))
    }

    pub fn read_vec4(&mut self) -> Result<Vec4> {
        Ok(Vec4::new(
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
        ))
    }

    /// Three i16 values mapped to `[-1, 1]`.
    pub fn read_short_vec3(&mut self) -> Result<Vec3> {
        Ok(Vec3::new(
            dequantize_short(self.read_i16()?),
            dequantize_short(self.read_i16()?),
            dequantize_short(self.read_i16()?),
        ))
    }

    /// Four bytes mapped to `[0, 1]`.
    pub fn read_color(&mut self) -> Result<Vec4> {
        let [r, g, b, a] = self.read_array::<4>()?;
        Ok(Vec4::new(
            dequantize_color(r),
            dequantize_color(g),
            dequantize_color(b),
            dequantize_color(a),
        ))
    }

    /// Null-terminated UTF-8 string.
    pub fn read_string(&mut self) -> Result<String> {
        let start = self.pos;
        let len = self.data[start..]
            .iter()
            .position(|&b| b == 0)
            .ok_or(Error::UnterminatedString(self.base + start as u64))?;
        let bytes = self.data[start..start + len].to_vec();
        self.pos = start + len + 1;
        Ok(String::from_utf8(bytes)?)
    }

    /// Null-terminated string padded to 4 bytes from where it starts.
    pub fn read_string_aligned(&mut self) -> Result<String> {
        let start = self.pos;
        let s = self.read_string()?;
        self.align_from(start)?;
        Ok(s)
    }

    fn align_from(&mut self, start: usize) -> Result<()> {
        let end = start + padded(self.pos - start);
        if end > self.data.len() {
            return Err(Error::UnexpectedEof(self.base + self.data.len() as u64));
        }
        self.pos = end;
        Ok(())
    }

    /// Pad the cursor to 4 bytes from the current record's tag.
    pub fn align_record(&mut self) -> Result<()> {
        self.align_from(self.record_start)
    }

    // ---- record bodies (cursor just past the tag) ----

    /// `Hh`
    pub fn int16_block(&mut self) -> Result<i16> {
        self.read_i16()
    }

    /// `HH`
    pub fn uint16_block(&mut self) -> Result<u16> {
        self.read_u16()
    }

    /// `Hxxi`
    pub fn int32_block(&mut self) -> Result<i32> {
        self.skip(2)?;
        self.read_i32()
    }

    pub fn float_block(&mut self) -> Result<f32> {
        self.skip(2)?;
        let v = self.read_f32()?;
        self.align_record()?;
        Ok(v)
    }

    pub fn vec2_block(&mut self) -> Result<Vec2> {
        self.skip(2)?;
        let v = self.read_vec2()?;
        self.align_record()?;
        Ok(v)
    }

    pub fn vec3_block(&mut self) -> Result<Vec3> {
        self.skip(2)?;
        let v = self.read_vec3()?;
        self.align_record()?;
        Ok(v)
    }

    pub fn vec4_block(&mut self) -> Result<Vec4> {
        self.skip(2)?;
        let v = self.read_vec4()?;
        self.align_record()?;
        Ok(v)
    }

    pub fn comment_block(&mut self) -> Result<String> {
        self.skip(2)?;
        let s = self.read_string()?;
        self.align_record()?;
        Ok(s)
    }

    /// Bone index, parent index and name.
    pub fn bone_block(&mut self) -> Result<(i32, i32, String)> {
        self.skip(2)?;
        let index = self.read_i32()?;
        let parent = self.read_i32()?;
        let name = self.read_string()?;
        self.align_record()?;
        Ok((index, parent, name))
    }

    /// Bone index and raw influence.
    pub fn weight_block(&mut self) -> Result<(i16, f32)> {
        Ok((self.read_i16()?, self.read_f32()?))
    }

    /// Mesh and material id, byte packed.
    pub fn triangle_block(&mut self) -> Result<(u16, u16)> {
        Ok((self.read_u8()? as u16, self.read_u8()? as u16))
    }

    /// Mesh and material id, 16-bit.
    pub fn triangle16_block(&mut self) -> Result<(u16, u16)> {
        self.skip(2)?;
        Ok((self.read_u16()?, self.read_u16()?))
    }

    pub fn color_block(&mut self) -> Result<Vec4> {
        self.skip(2)?;
        self.read_color()
    }

    /// Layer count then `count` UV pairs. Only the first layer is returned.
    pub fn uv_block(&mut self) -> Result<Vec2> {
        let at = self.offset();
        let count = self.read_i16()?;
        if count < 0 {
            return Err(Error::other(format!(
                "negative UV layer count {} at offset 0x{:X}",
                count, at
            )));
        }
        let mut first = Vec2::ZERO;
        for layer in 0..count {
            let uv = self.read_vec2()?;
            if layer == 0 {
                first = uv;
            }
        }
        Ok(first)
    }

    /// Index and name. Shared by object and part info records.
    pub fn object_block(&mut self) -> Result<(i16, String)> {
        let index = self.read_i16()?;
        let name = self.read_string()?;
        self.align_record()?;
        Ok((index, name))
    }

    /// Index, name, type and image reference string.
    pub fn material_block(&mut self) -> Result<(i16, String, String, String)> {
        let index = self.read_i16()?;
        let name = self.read_string_aligned()?;
        let kind = self.read_string_aligned()?;
        let images = self.read_string_aligned()?;
        self.align_record()?;
        Ok((index, name, kind, images))
    }

    /// Frame number and note text.
    pub fn note_frame_block(&mut self) -> Result<(i32, String)> {
        self.skip(2)?;
        let frame = self.read_i32()?;
        let text = self.read_string()?;
        self.align_record()?;
        Ok((frame, text))
    }
}

// ============================================================================
// Writing
// ============================================================================

/// Writes records to any byte sink, tracking the byte position.
pub struct BlockWriter<W: Write> {
    inner: W,
    pos: u64,
}

impl BlockWriter<Vec<u8>> {
    /// Writer backed by an in-memory payload buffer.
    pub fn buffer() -> Self {
        Self::new(Vec::new())
    }
}

impl<W: Write> BlockWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, pos: 0 }
    }

    #[inline]
    pub fn pos(&self) -> u64 {
        self.pos
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.inner.write_all(data)?;
        self.pos += data.len() as u64;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.inner.write_u8(value)?;
        self.pos += 1;
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.inner.write_u16::<LittleEndian>(value)?;
        self.pos += 2;
        Ok(())
    }

    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        self.inner.write_i16::<LittleEndian>(value)?;
        self.pos += 2;
        Ok(())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.inner.write_i32::<LittleEndian>(value)?;
        self.pos += 4;
        Ok(())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.inner.write_f32::<LittleEndian>(value)?;
        self.pos += 4;
        Ok(())
    }

    fn write_floats(&mut self, values: &[f32]) -> Result<()> {
        for &v in values {
            self.write_f32(v)?;
        }
        Ok(())
    }

    /// Tag plus two padding bytes.
    pub fn write_tag_padded(&mut self, tag: u16) -> Result<()> {
        self.write_u16(tag)?;
        self.write_u16(0)
    }

    /// Null-terminated string, zero-filled to a multiple of 4 bytes.
    pub fn write_padded_string(&mut self, s: &str) -> Result<()> {
        let size = s.len() + 1;
        self.write_bytes(s.as_bytes())?;
        self.write_bytes(&[0u8; 4][..padded(size) - size + 1])
    }

    // ---- records ----

    pub fn int16_block(&mut self, tag: u16, value: i16) -> Result<()> {
        self.write_u16(tag)?;
        self.write_i16(value)
    }

    pub fn uint16_block(&mut self, tag: u16, value: u16) -> Result<()> {
        self.write_u16(tag)?;
        self.write_u16(value)
    }

    pub fn int32_block(&mut self, tag: u16, value: i32) -> Result<()> {
        self.write_tag_padded(tag)?;
        self.write_i32(value)
    }

    pub fn float_block(&mut self, tag: u16, value: f32) -> Result<()> {
        self.write_tag_padded(tag)?;
        self.write_f32(value)
    }

    pub fn vec2_block(&mut self, tag: u16, v: Vec2) -> Result<()> {
        self.write_tag_padded(tag)?;
        self.write_floats(&v.to_array())
    }

    pub fn vec3_block(&mut self, tag: u16, v: Vec3) -> Result<()> {
        self.write_tag_padded(tag)?;
        self.write_floats(&v.to_array())
    }

    pub fn vec4_block(&mut self, tag: u16, v: Vec4) -> Result<()> {
        self.write_tag_padded(tag)?;
        self.write_floats(&v.to_array())
    }

    pub fn comment_block(&mut self, comment: &str) -> Result<()> {
        self.write_tag_padded(tags::COMMENT)?;
        self.write_padded_string(comment)
    }

    pub fn bone_info_block(&mut self, index: i32, parent: i32, name: &str) -> Result<()> {
        self.write_tag_padded(tags::BONE_INFO)?;
        self.write_i32(index)?;
        self.write_i32(parent)?;
        self.write_padded_string(name)
    }

    /// Index and name under `tag` (object and part info).
    pub fn object_block(&mut self, tag: u16, index: i16, name: &str) -> Result<()> {
        self.int16_block(tag, index)?;
        self.write_padded_string(name)
    }

    pub fn material_block(&mut self, index: i16, name: &str, kind: &str, images: &str) -> Result<()> {
        self.int16_block(tags::MATERIAL_INFO, index)?;
        self.write_padded_string(name)?;
        self.write_padded_string(kind)?;
        self.write_padded_string(images)
    }

    /// The three matrix row records, quantized to shorts.
    pub fn matrix_blocks(&mut self, rows: &[Vec3; 3]) -> Result<()> {
        for (tag, row) in [tags::MATRIX_X, tags::MATRIX_Y, tags::MATRIX_Z].into_iter().zip(rows) {
            self.short_vec3_block(tag, *row)?;
        }
        Ok(())
    }

    pub fn short_vec3_block(&mut self, tag: u16, v: Vec3) -> Result<()> {
        self.write_u16(tag)?;
        self.write_i16(quantize_short(v.x))?;
        self.write_i16(quantize_short(v.y))?;
        self.write_i16(quantize_short(v.z))
    }

    pub fn weight_block(&mut self, bone: i16, influence: f32) -> Result<()> {
        self.write_u16(tags::WEIGHT)?;
        self.write_i16(bone)?;
        self.write_f32(influence)
    }

    /// Byte-packed record when both ids fit in a byte, 16-bit record otherwise.
    pub fn triangle_block(&mut self, mesh_id: u16, material_id: u16) -> Result<()> {
        if mesh_id > 255 || material_id > 255 {
            self.write_tag_padded(tags::TRIANGLE_16)?;
            self.write_u16(mesh_id)?;
            self.write_u16(material_id)
        } else {
            self.write_u16(tags::TRIANGLE)?;
            self.write_u8(mesh_id as u8)?;
            self.write_u8(material_id as u8)
        }
    }

    pub fn color_block(&mut self, color: Vec4) -> Result<()> {
        self.write_tag_padded(tags::COLOR)?;
        for c in color.to_array() {
            self.write_u8(quantize_color(c))?;
        }
        Ok(())
    }

    /// Always a single layer.
    pub fn uv_block(&mut self, uv: Vec2) -> Result<()> {
        self.write_u16(tags::UV)?;
        self.write_i16(1)?;
        self.write_floats(&uv.to_array())
    }

    pub fn note_frame_block(&mut self, frame: i32, text: &str) -> Result<()> {
        self.write_tag_padded(tags::NOTE_FRAME)?;
        self.write_i32(frame)?;
        self.write_padded_string(text)
    }
}
