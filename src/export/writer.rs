//! `xmodel_export` writer.
//!
//! Shortest round-trip formatting (`{:?}`) is used for bone offsets, matrix
//! rows, weights, colors and material values. Vertex offsets, normals and
//! version 6+ UVs use six fixed decimals.

use std::io::Write;

use crate::core::WriteOptions;
use crate::model::{FaceVertex, Material, Model, VertexLayout, MAX_PACKED_IDS};
use crate::util::{clamp_unit, process_normal, Result};

/// Write a model. Bones must already be in their write order.
pub fn write_model<W: Write>(
    out: &mut W,
    model: &Model,
    version: u16,
    layout: &VertexLayout,
    opts: &WriteOptions,
) -> Result<()> {
    if !opts.header_message.is_empty() {
        out.write_all(opts.header_message.as_bytes())?;
    }
    write!(out, "MODEL\nVERSION {}\n\n", version)?;

    // ---- bones ----
    writeln!(out, "NUMBONES {}", model.bones.len())?;
    let cosmetics = model.cosmetic_count();
    // Only v7 keeps cosmetic bones in a tail partition.
    if version == 7 && cosmetics > 0 {
        writeln!(out, "NUMCOSMETICS {}", cosmetics)?;
    }
    for (index, bone) in model.bones.iter().enumerate() {
        writeln!(out, "BONE {} {} \"{}\"", index, bone.parent, bone.name)?;
    }
    writeln!(out)?;

    for (index, bone) in model.bones.iter().enumerate() {
        writeln!(out, "BONE {}", index)?;
        writeln!(out, "OFFSET {}", reprs(&bone.offset.to_array()))?;
        writeln!(out, "SCALE 1.0 1.0 1.0")?;
        for (axis, row) in ["X", "Y", "Z"].iter().zip(&bone.matrix) {
            let row = row.to_array().map(clamp_unit);
            writeln!(out, "{} {}", axis, reprs(&row))?;
        }
        writeln!(out)?;
    }

    // ---- vertices ----
    let suffix = if layout.wide { "32" } else { "" };
    writeln!(out, "NUMVERTS{} {}", suffix, layout.total)?;

    let mut capped = 0usize;
    for (mesh, &base) in model.meshes.iter().zip(&layout.offsets) {
        for (i, vert) in mesh.verts.iter().enumerate() {
            let weights = vert.capped_weights();
            if weights.len() < vert.weights.len() {
                capped += 1;
            }
            writeln!(out, "VERT{} {}", suffix, base + i)?;
            writeln!(out, "OFFSET {}", fixed(&vert.offset.to_array()))?;
            writeln!(out, "BONES {}", weights.len())?;
            for w in weights.iter() {
                writeln!(out, "BONE {} {:?}", w.bone, w.influence)?;
            }
            writeln!(out)?;
        }
    }
    if capped > 0 {
        tracing::warn!("{} vertices had more than 15 weights and were capped", capped);
    }

    // ---- faces ----
    writeln!(out, "NUMFACES {}", model.face_count())?;
    let packed = MAX_PACKED_IDS - 1;
    for (mesh, &base) in model.meshes.iter().zip(&layout.offsets) {
        for face in &mesh.faces {
            let token = if version >= 7 && (face.mesh_id > packed || face.material_id > packed) {
                "TRI16"
            } else {
                "TRI"
            };
            writeln!(out, "{} {} {} 0 0", token, face.mesh_id, face.material_id)?;
            for corner in &face.indices {
                write_face_vertex(out, corner, base, version, suffix)?;
            }
            writeln!(out)?;
        }
    }

    // ---- objects ----
    writeln!(out, "NUMOBJECTS {}", model.meshes.len())?;
    for (index, mesh) in model.meshes.iter().enumerate() {
        writeln!(out, "OBJECT {} \"{}\"", index, mesh.name)?;
    }
    writeln!(out)?;

    // ---- materials ----
    writeln!(out, "NUMMATERIALS {}", model.materials.len())?;
    for (index, material) in model.materials.iter().enumerate() {
        write_material(out, material, index, version, opts.extended_features)?;
    }

    out.flush()?;
    Ok(())
}

fn write_face_vertex<W: Write>(
    out: &mut W,
    corner: &FaceVertex,
    base: usize,
    version: u16,
    suffix: &str,
) -> Result<()> {
    let id = base + corner.vertex;
    let normal = fixed(&process_normal(corner.normal).to_array());
    if version == 5 {
        writeln!(out, "VERT {} {} {}", id, normal, reprs(&corner.uv.to_array()))?;
    } else {
        writeln!(out, "VERT{} {}", suffix, id)?;
        writeln!(out, "NORMAL {}", normal)?;
        writeln!(out, "COLOR {}", reprs(&corner.color.to_array()))?;
        writeln!(out, "UV 1 {}", fixed(&corner.uv.to_array()))?;
        writeln!(out)?;
    }
    Ok(())
}

fn write_material<W: Write>(
    out: &mut W,
    m: &Material,
    index: usize,
    version: u16,
    extended: bool,
) -> Result<()> {
    let images = m.images.to_ref_string(extended);
    if version == 5 {
        writeln!(out, "MATERIAL {} \"{}\"", index, images)?;
        return Ok(());
    }

    writeln!(
        out,
        "MATERIAL {} \"{}\" \"{}\" \"{}\"",
        index, m.name, m.material_type, images
    )?;
    writeln!(out, "COLOR {}", reprs(&m.color.to_array()))?;
    writeln!(out, "TRANSPARENCY {}", reprs(&m.transparency.to_array()))?;
    writeln!(out, "AMBIENTCOLOR {}", reprs(&m.color_ambient.to_array()))?;
    writeln!(out, "INCANDESCENCE {}", reprs(&m.incandescence.to_array()))?;
    writeln!(out, "COEFFS {}", reprs(&m.coeffs.to_array()))?;
    writeln!(out, "GLOW {:?} {}", m.glow.0, m.glow.1)?;
    writeln!(out, "REFRACTIVE {} {:?}", m.refractive.0, m.refractive.1)?;
    writeln!(out, "SPECULARCOLOR {}", reprs(&m.color_specular.to_array()))?;
    writeln!(out, "REFLECTIVECOLOR {}", reprs(&m.color_reflective.to_array()))?;
    writeln!(out, "REFLECTIVE {} {:?}", m.reflective.0, m.reflective.1)?;
    writeln!(out, "BLINN {}", reprs(&m.blinn.to_array()))?;
    writeln!(out, "PHONG {:?}", m.phong)?;
    writeln!(out)?;
    Ok(())
}

fn reprs(values: &[f32]) -> String {
    values
        .iter()
        .map(|v| format!("{:?}", v))
        .collect::<Vec<_>>()
        .join(" ")
}

fn fixed(values: &[f32]) -> String {
    values
        .iter()
        .map(|v| format!("{:.6}", v))
        .collect::<Vec<_>>()
        .join(" ")
}
