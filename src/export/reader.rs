//! `xmodel_export` parser.
//!
//! The document is read section by section: header, bone table, bone
//! transforms, vertices, faces, objects and materials. Inside a section,
//! lines that do not carry the keyword the parser is waiting for are
//! skipped.

use crate::core::{validate_version, AssetType};
use crate::model::{
    Bone, Face, FaceVertex, Images, Material, Mesh, RawModel, Vertex, Weight, DEFAULT_MESH_NAME,
};
use crate::util::{Error, Location, Result};

use super::tokens::{Line, LineReader};

/// Parse a whole document into a flat [`RawModel`].
///
/// The object table is only read when `split` is set; otherwise it is
/// skipped along with any other unrecognized line.
pub fn read_model(text: &str, split: bool) -> Result<RawModel> {
    let mut r = LineReader::new(text);

    let version = read_header(&mut r)?;
    let bones = read_bones(&mut r)?;

    let mut default_mesh = Mesh::new(DEFAULT_MESH_NAME);
    let vert_token = read_verts(&mut r, &mut default_mesh, bones.len())?;
    read_faces(&mut r, &mut default_mesh, version, vert_token)?;

    let objects = if split { read_objects(&mut r)? } else { Vec::new() };
    let materials = read_materials(&mut r, version)?;

    tracing::debug!(
        "parsed export v{}: {} bones, {} verts, {} faces, {} objects, {} materials",
        version,
        bones.len(),
        default_mesh.verts.len(),
        default_mesh.faces.len(),
        objects.len(),
        materials.len()
    );

    Ok(RawModel {
        version,
        comment: None,
        bones,
        objects,
        materials,
        default_mesh,
    })
}

fn read_header(r: &mut LineReader<'_>) -> Result<u16> {
    r.expect("MODEL")?;
    let line = r.expect("VERSION")?;
    validate_version(AssetType::Model, line.parse(1)?)
}

// ============================================================================
// Bones
// ============================================================================

fn read_bones(r: &mut LineReader<'_>) -> Result<Vec<Bone>> {
    let mut cosmetic_count = 0usize;
    let mut bones: Vec<Option<Bone>> = Vec::new();
    let mut declared = false;
    let mut read = 0usize;

    while !declared || read < bones.len() {
        let line = r.expect_any(&["NUMCOSMETICS", "NUMBONES", "BONE"])?;
        match line.keyword() {
            "NUMCOSMETICS" => cosmetic_count = line.parse(1)?,
            "NUMBONES" => {
                bones = slots_for(r, &line, "bone")?;
                declared = true;
                read = 0;
            }
            _ => {
                let count = bones.len();
                let index = index_in(&line, 1, count, "bone")?;
                let parent: i32 = line.parse(2)?;
                if parent != -1 {
                    index_in(&line, 2, count, "parent bone")?;
                }
                let cosmetic = index.saturating_add(cosmetic_count) >= count;
                bones[index] = Some(Bone::new(line.token(3)?, parent).with_cosmetic(cosmetic));
                read += 1;
            }
        }
    }

    let mut bones = fill_slots(bones, "bone")?;
    for _ in 0..bones.len() {
        read_bone_transform(r, &mut bones)?;
    }
    Ok(bones)
}

fn read_bone_transform(r: &mut LineReader<'_>, bones: &mut [Bone]) -> Result<()> {
    let line = r.expect("BONE")?;
    let index = index_in(&line, 1, bones.len(), "bone")?;
    let bone = &mut bones[index];

    bone.offset = r.expect("OFFSET")?.vec3(1)?;
    loop {
        let line = r.expect_any(&["SCALE", "X"])?;
        if line.keyword() == "X" {
            bone.matrix[0] = line.vec3(1)?;
            break;
        }
        bone.scale = line.vec3(1)?;
    }
    bone.matrix[1] = r.expect("Y")?.vec3(1)?;
    bone.matrix[2] = r.expect("Z")?.vec3(1)?;
    Ok(())
}

// ============================================================================
// Geometry
// ============================================================================

/// Returns the vertex keyword selected by the count line.
fn read_verts(r: &mut LineReader<'_>, mesh: &mut Mesh, bone_count: usize) -> Result<&'static str> {
    let line = r.expect_any(&["NUMVERTS", "NUMVERTS32"])?;
    let token = if line.keyword() == "NUMVERTS32" {
        "VERT32"
    } else {
        "VERT"
    };
    let mut verts: Vec<Option<Vertex>> = slots_for(r, &line, "vertex")?;

    for _ in 0..verts.len() {
        let line = r.expect(token)?;
        let index = index_in(&line, 1, verts.len(), "vertex")?;
        let mut vert = Vertex::new(r.expect("OFFSET")?.vec3(1)?);

        let weight_count: usize = r.expect_any(&["BONES", "WEIGHTS"])?.parse(1)?;
        for _ in 0..weight_count {
            let line = r.expect("BONE")?;
            let bone = index_in(&line, 1, bone_count, "weight bone")?;
            vert.weights.push(Weight::new(bone, line.parse(2)?));
        }
        verts[index] = Some(vert);
    }

    mesh.verts = fill_slots(verts, "vertex")?;
    Ok(token)
}

fn read_faces(r: &mut LineReader<'_>, mesh: &mut Mesh, version: u16, token: &str) -> Result<()> {
    let line = r.expect("NUMFACES")?;
    let count = declared_count(r, &line, "face")?;
    let vert_count = mesh.verts.len();
    mesh.faces.reserve(count);

    for _ in 0..count {
        let line = r.expect_any(&["TRI", "TRI16"])?;
        let mesh_id = line.parse(1)?;
        let material_id = line.parse(2)?;

        let mut corners = [FaceVertex::default(); 3];
        for corner in &mut corners {
            let line = r.expect(token)?;
            corner.vertex = index_in(&line, 1, vert_count, "vertex")?;
            if version == 5 {
                corner.normal = line.vec3(2)?;
                corner.uv = line.vec2(5)?;
            } else {
                corner.normal = r.expect("NORMAL")?.vec3(1)?;
                corner.color = r.expect("COLOR")?.vec4(1)?;
                corner.uv = r.expect("UV")?.vec2(2)?;
            }
        }
        mesh.faces.push(Face::new(mesh_id, material_id, corners));
    }
    Ok(())
}

fn read_objects(r: &mut LineReader<'_>) -> Result<Vec<Mesh>> {
    let line = r.expect("NUMOBJECTS")?;
    let mut objects: Vec<Option<Mesh>> = slots_for(r, &line, "object")?;
    for _ in 0..objects.len() {
        let line = r.expect("OBJECT")?;
        let index = index_in(&line, 1, objects.len(), "object")?;
        objects[index] = Some(Mesh::new(line.token(2)?));
    }
    fill_slots(objects, "object")
}

// ============================================================================
// Materials
// ============================================================================

fn read_materials(r: &mut LineReader<'_>, version: u16) -> Result<Vec<Material>> {
    let mut materials: Option<Vec<Option<Material>>> = None;
    let mut current: Option<usize> = None;

    while let Some(line) = r.next() {
        match line.keyword() {
            "NUMMATERIALS" if materials.is_none() => {
                materials = Some(slots_for(r, &line, "material")?);
            }
            "MATERIAL" => {
                let count = materials.as_ref().map_or(0, Vec::len);
                let index = index_in(&line, 1, count, "material")?;
                let material = if version == 5 {
                    Material::legacy(index, Images::from_ref_string(line.token(2)?))
                } else {
                    Material::new(
                        line.token(2)?,
                        line.token(3)?,
                        Images::from_ref_string(line.token(4)?),
                    )
                };
                if let Some(slot) = materials.as_mut().and_then(|slots| slots.get_mut(index)) {
                    *slot = Some(material);
                }
                current = Some(index);
            }
            _ => {
                let material = current
                    .zip(materials.as_mut())
                    .and_then(|(i, slots)| slots.get_mut(i))
                    .and_then(Option::as_mut);
                if let Some(material) = material {
                    apply_material_property(material, &line)?;
                }
            }
        }
    }

    fill_slots(materials.unwrap_or_default(), "material")
}

fn apply_material_property(m: &mut Material, line: &Line<'_>) -> Result<()> {
    match line.keyword() {
        "COLOR" => m.color = line.vec4(1)?,
        "TRANSPARENCY" => m.transparency = line.vec4(1)?,
        "AMBIENTCOLOR" => m.color_ambient = line.vec4(1)?,
        "INCANDESCENCE" => m.incandescence = line.vec4(1)?,
        "COEFFS" => m.coeffs = line.vec2(1)?,
        "GLOW" => m.glow = (line.parse(1)?, line.parse(2)?),
        "REFRACTIVE" => m.refractive = (line.parse(1)?, line.parse(2)?),
        "SPECULARCOLOR" => m.color_specular = line.vec4(1)?,
        "REFLECTIVECOLOR" => m.color_reflective = line.vec4(1)?,
        "REFLECTIVE" => m.reflective = (line.parse(1)?, line.parse(2)?),
        "BLINN" => m.blinn = line.vec2(1)?,
        "PHONG" => m.phong = line.parse(1)?,
        _ => {}
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn index_in(line: &Line<'_>, token: usize, count: usize, what: &'static str) -> Result<usize> {
    let index: i64 = line.parse(token)?;
    if index < 0 || index as u64 >= count as u64 {
        return Err(Error::IndexOutOfRange {
            what,
            index,
            count,
            at: Location::Line(line.number),
        });
    }
    Ok(index as usize)
}

/// Count on a `NUM*` line, bounded by the lines left since every entry
/// starts with a line of its own.
fn declared_count(r: &LineReader<'_>, line: &Line<'_>, what: &'static str) -> Result<usize> {
    let count: usize = line.parse(1)?;
    let left = r.remaining();
    if count > left {
        return Err(line.error(format!(
            "{} count {} exceeds the {} lines left in the file",
            what, count, left
        )));
    }
    Ok(count)
}

fn slots_for<T: Clone>(r: &LineReader<'_>, line: &Line<'_>, what: &'static str) -> Result<Vec<Option<T>>> {
    Ok(vec![None; declared_count(r, line, what)?])
}

fn fill_slots<T>(slots: Vec<Option<T>>, what: &'static str) -> Result<Vec<T>> {
    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| slot.ok_or(Error::MissingEntry { what, index }))
        .collect()
}
