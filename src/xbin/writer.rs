//! Binary payload writers.
//!
//! Both writers build the uncompressed tagged-block payload in memory; the
//! caller wraps it in the `*LZ4*` container.

use crate::core::WriteOptions;
use crate::model::{Anim, Model, VertexLayout};
use crate::util::{Error, Result};

use super::block::BlockWriter;
use super::format as tags;

/// Serialize a model payload. Bones must already be in their write order.
pub fn write_model(
    model: &Model,
    version: u16,
    layout: &VertexLayout,
    opts: &WriteOptions,
) -> Result<Vec<u8>> {
    let mut w = BlockWriter::buffer();

    if !opts.header_message.is_empty() {
        w.comment_block(&opts.header_message)?;
    }
    w.write_tag_padded(tags::MODEL)?;
    w.int16_block(tags::VERSION, version as i16)?;

    // ---- bones ----
    w.int16_block(tags::BONE_COUNT, narrow(model.bones.len(), "bone count")?)?;
    let cosmetic_count = model.cosmetic_count();
    // Only v7 keeps cosmetic bones in a tail partition.
    if version == 7 && cosmetic_count > 0 {
        w.int32_block(tags::COSMETIC_COUNT, narrow(cosmetic_count, "cosmetic count")?)?;
    }
    for (index, bone) in model.bones.iter().enumerate() {
        w.bone_info_block(narrow(index, "bone index")?, bone.parent, &bone.name)?;
    }
    for (index, bone) in model.bones.iter().enumerate() {
        w.int16_block(tags::BONE_INDEX, narrow(index, "bone index")?)?;
        w.vec3_block(tags::OFFSET, bone.offset)?;
        w.vec3_block(tags::BONE_SCALE, bone.scale)?;
        w.matrix_blocks(&bone.matrix)?;
    }

    // ---- vertices ----
    let vertex_index = |w: &mut BlockWriter<Vec<u8>>, index: usize| -> Result<()> {
        if layout.wide {
            w.int32_block(tags::VERTEX_INDEX_32, narrow(index, "vertex index")?)
        } else {
            w.uint16_block(tags::VERTEX_INDEX_16, narrow(index, "vertex index")?)
        }
    };

    if layout.wide {
        w.int32_block(tags::VERTEX_COUNT_32, narrow(layout.total, "vertex count")?)?;
    } else {
        w.uint16_block(tags::VERTEX_COUNT_16, narrow(layout.total, "vertex count")?)?;
    }

    let mut capped = 0usize;
    for (mesh, &base) in model.meshes.iter().zip(&layout.offsets) {
        for (i, vert) in mesh.verts.iter().enumerate() {
            vertex_index(&mut w, base + i)?;
            w.vec3_block(tags::OFFSET, vert.offset)?;

            let weights = vert.capped_weights();
            if weights.len() < vert.weights.len() {
                capped += 1;
            }
            w.int16_block(tags::WEIGHT_COUNT, weights.len() as i16)?;
            for weight in weights.iter() {
                w.weight_block(narrow(weight.bone, "weight bone")?, weight.influence)?;
            }
        }
    }
    if capped > 0 {
        tracing::warn!("{} vertices had more than 15 weights and were capped", capped);
    }

    // ---- faces ----
    w.int32_block(tags::FACE_COUNT, narrow(model.face_count(), "face count")?)?;
    for (mesh, &base) in model.meshes.iter().zip(&layout.offsets) {
        for face in &mesh.faces {
            w.triangle_block(
                narrow(face.mesh_id, "face mesh id")?,
                narrow(face.material_id, "face material id")?,
            )?;
            for corner in &face.indices {
                vertex_index(&mut w, base + corner.vertex)?;
                w.short_vec3_block(tags::NORMAL, corner.normal)?;
                w.color_block(corner.color)?;
                w.uv_block(corner.uv)?;
            }
        }
    }

    // ---- objects ----
    w.int16_block(tags::OBJECT_COUNT, narrow(model.meshes.len(), "object count")?)?;
    for (index, mesh) in model.meshes.iter().enumerate() {
        w.object_block(tags::OBJECT_INFO, narrow(index, "object index")?, &mesh.name)?;
    }

    // ---- materials ----
    w.int16_block(tags::MATERIAL_COUNT, narrow(model.materials.len(), "material count")?)?;
    for (index, m) in model.materials.iter().enumerate() {
        w.material_block(
            narrow(index, "material index")?,
            &m.name,
            &m.material_type,
            &m.images.to_ref_string(opts.extended_features),
        )?;
        w.color_block(m.color)?;
        w.vec4_block(tags::MATERIAL_TRANSPARENCY, m.transparency)?;
        w.vec4_block(tags::MATERIAL_AMBIENT, m.color_ambient)?;
        w.vec4_block(tags::MATERIAL_INCANDESCENCE, m.incandescence)?;
        w.vec2_block(tags::MATERIAL_COEFFS, m.coeffs)?;
        w.vec2_block(tags::MATERIAL_GLOW, [m.glow.0, m.glow.1 as f32].into())?;
        w.vec2_block(tags::MATERIAL_REFRACTIVE, [m.refractive.0 as f32, m.refractive.1].into())?;
        w.vec4_block(tags::MATERIAL_SPECULAR, m.color_specular)?;
        w.vec4_block(tags::MATERIAL_REFLECTIVE_COLOR, m.color_reflective)?;
        w.vec2_block(tags::MATERIAL_REFLECTIVE, [m.reflective.0 as f32, m.reflective.1].into())?;
        w.vec2_block(tags::MATERIAL_BLINN, m.blinn)?;
        w.float_block(tags::MATERIAL_PHONG, m.phong)?;
    }

    tracing::debug!("model payload is {} bytes", w.pos());
    Ok(w.into_inner())
}

/// Serialize an animation payload.
pub fn write_anim(anim: &Anim, version: u16, header: &str) -> Result<Vec<u8>> {
    let mut w = BlockWriter::buffer();

    if !header.is_empty() {
        w.comment_block(header)?;
    }
    w.write_tag_padded(tags::ANIM)?;
    w.int16_block(tags::VERSION, version as i16)?;

    w.int16_block(tags::PART_COUNT, narrow(anim.parts.len(), "part count")?)?;
    for (index, part) in anim.parts.iter().enumerate() {
        w.object_block(tags::PART_INFO, narrow(index, "part index")?, &part.name)?;
    }

    w.int16_block(tags::FRAMERATE, anim.framerate)?;
    w.int32_block(tags::FRAME_COUNT, narrow(anim.frames.len(), "frame count")?)?;
    for frame in &anim.frames {
        if frame.parts.len() != anim.parts.len() {
            return Err(Error::other(format!(
                "frame {} has {} parts, anim has {}",
                frame.frame,
                frame.parts.len(),
                anim.parts.len()
            )));
        }
        w.int32_block(tags::FRAME_INDEX, frame.frame)?;
        for (index, part) in frame.parts.iter().enumerate() {
            w.int16_block(tags::PART_INDEX, narrow(index, "part index")?)?;
            w.vec3_block(tags::OFFSET, part.offset)?;
            w.matrix_blocks(&part.matrix)?;
        }
    }

    w.int16_block(tags::NUM_KEYS, narrow(anim.notes.len(), "note count")?)?;
    for note in &anim.notes {
        w.note_frame_block(note.frame, &note.string)?;
    }

    Ok(w.into_inner())
}

/// Convert a count or index to its record field width.
fn narrow<T: TryFrom<usize>>(value: usize, what: &str) -> Result<T> {
    T::try_from(value).map_err(|_| {
        Error::other(format!(
            "{} {} does not fit its {}-byte record field",
            what,
            value,
            std::mem::size_of::<T>()
        ))
    })
}
