//! Binary tag dispatcher.
//!
//! Walks a decompressed payload record by record. Many records carry no
//! target of their own and apply to whatever entity the last opening record
//! made active, so the walk keeps an explicit [`LoadState`].

use smallvec::SmallVec;

use crate::core::{validate_version, AssetType};
use crate::model::{
    Anim, Bone, Face, FaceVertex, Frame, FramePart, Images, Material, Mesh, Note, PartInfo,
    RawModel, Vertex, Weight, DEFAULT_MESH_NAME,
};
use crate::util::{Error, Location, Result, Vec3};

use super::block::BlockReader;
use super::format::{Tag, EXTRA_BODY_SIZE, MIN_RECORD_SIZE};

/// Read a model payload.
pub fn read_model(payload: &[u8], base: u64) -> Result<RawModel> {
    let state = walk(payload, base, AssetType::Model)?;
    state.into_model()
}

/// Read an animation payload.
pub fn read_anim(payload: &[u8], base: u64) -> Result<Anim> {
    let state = walk(payload, base, AssetType::Anim)?;
    state.into_anim()
}

fn walk(payload: &[u8], base: u64, expected: AssetType) -> Result<LoadState> {
    let mut r = BlockReader::with_base(payload, base);
    let mut state = LoadState::new(expected);

    while let Some(value) = r.read_tag()? {
        let tag = Tag::from_u16(value);
        tracing::debug!("block '{}' at 0x{:X}", tag.name(), r.record_offset());
        state.apply(tag, value, &mut r)?;
    }

    Ok(state)
}

/// Entity the sub-field records currently write into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Active {
    None,
    Bone(usize),
    Vertex(usize),
    /// Last corner of the last triangle.
    FaceVertex,
    Material(usize),
    FramePart(usize),
}

/// Which frame receives part records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameTarget {
    None,
    Frame(usize),
    /// Placeholder used inside notetrack sections.
    Dummy,
}

struct PendingFace {
    mesh_id: usize,
    material_id: usize,
    corners: SmallVec<[FaceVertex; 3]>,
}

struct PendingFrame {
    frame: i32,
    parts: Vec<Option<FramePart>>,
}

impl PendingFrame {
    fn new(frame: i32, part_count: usize) -> Self {
        Self {
            frame,
            parts: vec![None; part_count],
        }
    }
}

struct LoadState {
    expected: AssetType,
    asset: Option<AssetType>,
    version: Option<u16>,
    comment: Option<String>,
    active: Active,

    // model
    cosmetic_count: i32,
    bones: Vec<Option<Bone>>,
    verts: Vec<Option<Vertex>>,
    declared_faces: i32,
    faces: Vec<PendingFace>,
    objects: Vec<Option<Mesh>>,
    materials: Vec<Option<Material>>,

    // anim
    framerate: i16,
    parts: Vec<Option<PartInfo>>,
    frames: Vec<PendingFrame>,
    dummy_frame: PendingFrame,
    frame_target: FrameTarget,
    notes: Vec<Note>,
}

impl LoadState {
    fn new(expected: AssetType) -> Self {
        Self {
            expected,
            asset: None,
            version: None,
            comment: None,
            active: Active::None,
            cosmetic_count: 0,
            bones: Vec::new(),
            verts: Vec::new(),
            declared_faces: 0,
            faces: Vec::new(),
            objects: Vec::new(),
            materials: Vec::new(),
            framerate: 0,
            parts: Vec::new(),
            frames: Vec::new(),
            dummy_frame: PendingFrame::new(-1, 0),
            frame_target: FrameTarget::None,
            notes: Vec::new(),
        }
    }

    fn apply(&mut self, tag: Tag, raw: u16, r: &mut BlockReader<'_>) -> Result<()> {
        let at = r.record_offset();
        let no_target = || Error::NoActiveTarget { tag: raw, offset: at };

        match tag {
            Tag::Comment => {
                self.comment = Some(r.comment_block()?);
            }
            Tag::Model | Tag::Anim => {
                r.int16_block()?;
                let found = if tag == Tag::Model {
                    AssetType::Model
                } else {
                    AssetType::Anim
                };
                if found != self.expected {
                    return Err(Error::AssetTypeMismatch {
                        expected: self.expected,
                        found,
                    });
                }
                self.asset = Some(found);
            }
            Tag::Version => {
                let version = r.int16_block()?;
                let asset = self.asset.unwrap_or(self.expected);
                self.version = Some(validate_version(asset, version as i32)?);
            }

            // ---- bones ----
            Tag::BoneCount => {
                self.bones = slots_for(r.int16_block()? as i64, "bone", at, r)?;
                self.active = Active::None;
            }
            Tag::CosmeticCount => {
                self.cosmetic_count = r.int32_block()?;
            }
            Tag::BoneInfo => {
                let (index, parent, name) = r.bone_block()?;
                let count = self.bones.len();
                let slot = index_in(index as i64, count, "bone", at)?;
                if parent != -1 {
                    index_in(parent as i64, count, "parent bone", at)?;
                }
                let cosmetic = index as i64 >= count as i64 - self.cosmetic_count as i64;
                self.bones[slot] = Some(Bone::new(name, parent).with_cosmetic(cosmetic));
            }
            Tag::BoneIndex => {
                let index = index_in(r.int16_block()? as i64, self.bones.len(), "bone", at)?;
                if self.bones[index].is_none() {
                    return Err(Error::MissingEntry { what: "bone", index });
                }
                self.active = Active::Bone(index);
            }
            Tag::BoneScale => {
                let scale = r.vec3_block()?;
                match self.active {
                    Active::Bone(i) => self.bone_mut(i)?.scale = scale,
                    _ => return Err(no_target()),
                }
            }
            Tag::Offset => {
                let offset = r.vec3_block()?;
                match self.active {
                    Active::Bone(i) => self.bone_mut(i)?.offset = offset,
                    Active::Vertex(i) => self.vertex_mut(i)?.offset = offset,
                    Active::FramePart(i) => self.frame_part_mut(i)?.offset = offset,
                    _ => return Err(no_target()),
                }
            }
            Tag::MatrixRow(row) => {
                let v = r.read_short_vec3()?;
                match self.active {
                    Active::Bone(i) => self.bone_mut(i)?.matrix[row] = v,
                    Active::FramePart(i) => self.frame_part_mut(i)?.matrix[row] = v,
                    _ => return Err(no_target()),
                }
            }

            // ---- vertices ----
            Tag::VertexCount16 => {
                self.verts = slots_for(r.uint16_block()? as i64, "vertex", at, r)?;
                self.active = Active::None;
            }
            Tag::VertexCount32 => {
                self.verts = slots_for(r.int32_block()? as i64, "vertex", at, r)?;
                self.active = Active::None;
            }
            Tag::VertexIndex16 => {
                let index = r.uint16_block()? as i64;
                self.vertex_index(index, at)?;
            }
            Tag::VertexIndex32 => {
                let index = r.int32_block()? as i64;
                self.vertex_index(index, at)?;
            }
            Tag::WeightCount => {
                let count = r.int16_block()?;
                match self.active {
                    Active::Vertex(i) => {
                        let weights = &mut self.vertex_mut(i)?.weights;
                        weights.clear();
                        weights.reserve(count.max(0) as usize);
                    }
                    _ => return Err(no_target()),
                }
            }
            Tag::Weight => {
                let (bone, influence) = r.weight_block()?;
                let bone = index_in(bone as i64, self.bones.len(), "weight bone", at)?;
                match self.active {
                    Active::Vertex(i) => self.vertex_mut(i)?.weights.push(Weight::new(bone, influence)),
                    _ => return Err(no_target()),
                }
            }

            // ---- faces ----
            Tag::FaceCount => {
                self.declared_faces = r.int32_block()?;
                self.faces.clear();
                self.active = Active::None;
            }
            Tag::Triangle | Tag::Triangle16 => {
                let (mesh_id, material_id) = if tag == Tag::Triangle {
                    r.triangle_block()?
                } else {
                    r.triangle16_block()?
                };
                self.faces.push(PendingFace {
                    mesh_id: mesh_id as usize,
                    material_id: material_id as usize,
                    corners: SmallVec::new(),
                });
                self.active = Active::None;
            }
            Tag::Normal => {
                let normal = r.read_short_vec3()?;
                self.face_vertex_mut().ok_or_else(no_target)?.normal = normal;
            }
            Tag::Color => {
                let color = r.color_block()?;
                match self.active {
                    Active::FaceVertex => self.face_vertex_mut().ok_or_else(no_target)?.color = color,
                    Active::Material(i) => self.material_mut(i)?.color = color,
                    _ => return Err(no_target()),
                }
            }
            Tag::Uv => {
                let uv = r.uv_block()?;
                self.face_vertex_mut().ok_or_else(no_target)?.uv = uv;
            }

            // ---- objects ----
            Tag::ObjectCount => {
                self.objects = slots_for(r.int16_block()? as i64, "object", at, r)?;
            }
            Tag::ObjectInfo => {
                let (index, name) = r.object_block()?;
                let slot = index_in(index as i64, self.objects.len(), "object", at)?;
                self.objects[slot] = Some(Mesh::new(name));
            }

            // ---- materials ----
            Tag::MaterialCount => {
                self.materials = slots_for(r.int16_block()? as i64, "material", at, r)?;
                self.active = Active::None;
            }
            Tag::MaterialInfo => {
                let (index, name, kind, images) = r.material_block()?;
                let slot = index_in(index as i64, self.materials.len(), "material", at)?;
                self.materials[slot] = Some(Material::new(name, kind, Images::from_ref_string(&images)));
                self.active = Active::Material(slot);
            }
            Tag::MaterialTransparency
            | Tag::MaterialAmbient
            | Tag::MaterialIncandescence
            | Tag::MaterialSpecular
            | Tag::MaterialReflectiveColor => {
                let v = r.vec4_block()?;
                let Active::Material(i) = self.active else {
                    return Err(no_target());
                };
                let m = self.material_mut(i)?;
                match tag {
                    Tag::MaterialTransparency => m.transparency = v,
                    Tag::MaterialAmbient => m.color_ambient = v,
                    Tag::MaterialIncandescence => m.incandescence = v,
                    Tag::MaterialSpecular => m.color_specular = v,
                    _ => m.color_reflective = v,
                }
            }
            Tag::MaterialCoeffs
            | Tag::MaterialGlow
            | Tag::MaterialRefractive
            | Tag::MaterialReflective
            | Tag::MaterialBlinn => {
                let v = r.vec2_block()?;
                let Active::Material(i) = self.active else {
                    return Err(no_target());
                };
                let m = self.material_mut(i)?;
                match tag {
                    Tag::MaterialCoeffs => m.coeffs = v,
                    Tag::MaterialGlow => m.glow = (v.x, v.y as i32),
                    Tag::MaterialRefractive => m.refractive = (v.x as i32, v.y),
                    Tag::MaterialReflective => m.reflective = (v.x as i32, v.y),
                    _ => m.blinn = v,
                }
            }
            Tag::MaterialPhong => {
                let v = r.float_block()?;
                match self.active {
                    Active::Material(i) => self.material_mut(i)?.phong = v,
                    _ => return Err(no_target()),
                }
            }

            // ---- animation ----
            Tag::PartCount => {
                self.parts = slots_for(r.int16_block()? as i64, "part", at, r)?;
                self.active = Active::None;
            }
            Tag::PartInfo => {
                let (index, name) = r.object_block()?;
                let slot = index_in(index as i64, self.parts.len(), "part", at)?;
                self.parts[slot] = Some(PartInfo::new(name));
            }
            Tag::PartIndex => {
                let index = index_in(r.int16_block()? as i64, self.parts.len(), "part", at)?;
                let frame = self.active_frame_mut().ok_or_else(no_target)?;
                if frame.parts.len() <= index {
                    frame.parts.resize(index + 1, None);
                }
                frame.parts[index] = Some(FramePart::default());
                self.active = Active::FramePart(index);
            }
            Tag::Framerate => {
                self.framerate = r.int16_block()?;
            }
            Tag::FrameCount => {
                let count = r.int32_block()?;
                tracing::debug!("anim declares {} frames", count);
            }
            Tag::FrameIndex => {
                let frame = r.int32_block()?;
                self.frames.push(PendingFrame::new(frame, self.parts.len()));
                self.frame_target = FrameTarget::Frame(self.frames.len() - 1);
                self.active = Active::None;
            }
            Tag::NotetrackSection => {
                r.int16_block()?;
                // Notetracks reuse part index records; keep them off real frames.
                self.dummy_frame = PendingFrame::new(-1, self.parts.len());
                self.frame_target = FrameTarget::Dummy;
                self.active = Active::None;
            }
            Tag::NumTracks | Tag::NumKeys | Tag::Notetrack => {
                r.int16_block()?;
            }
            Tag::NoteFrame => {
                let (frame, text) = r.note_frame_block()?;
                self.notes.push(Note::new(frame, text));
            }

            Tag::Extra => r.skip(EXTRA_BODY_SIZE)?,
            Tag::Unimplemented(name) => {
                return Err(Error::UnimplementedTag {
                    tag: raw,
                    name,
                    offset: at,
                })
            }
            Tag::Unknown(tag) => return Err(Error::UnknownTag { tag, offset: at }),
        }
        Ok(())
    }

    /// Vertex index records declare a vertex until the first triangle, then a corner.
    fn vertex_index(&mut self, index: i64, at: u64) -> Result<()> {
        let index = index_in(index, self.verts.len(), "vertex", at)?;
        match self.faces.last_mut() {
            None => {
                self.verts[index] = Some(Vertex::default());
                self.active = Active::Vertex(index);
            }
            Some(face) => {
                if face.corners.len() == 3 {
                    return Err(Error::other(format!(
                        "triangle {} has more than three vertices at offset 0x{:X}",
                        self.faces.len() - 1,
                        at
                    )));
                }
                face.corners.push(FaceVertex {
                    vertex: index,
                    ..Default::default()
                });
                self.active = Active::FaceVertex;
            }
        }
        Ok(())
    }

    fn bone_mut(&mut self, index: usize) -> Result<&mut Bone> {
        self.bones
            .get_mut(index)
            .and_then(Option::as_mut)
            .ok_or(Error::MissingEntry { what: "bone", index })
    }

    fn vertex_mut(&mut self, index: usize) -> Result<&mut Vertex> {
        self.verts
            .get_mut(index)
            .and_then(Option::as_mut)
            .ok_or(Error::MissingEntry { what: "vertex", index })
    }

    fn material_mut(&mut self, index: usize) -> Result<&mut Material> {
        self.materials
            .get_mut(index)
            .and_then(Option::as_mut)
            .ok_or(Error::MissingEntry { what: "material", index })
    }

    fn face_vertex_mut(&mut self) -> Option<&mut FaceVertex> {
        if self.active != Active::FaceVertex {
            return None;
        }
        self.faces.last_mut()?.corners.last_mut()
    }

    fn active_frame_mut(&mut self) -> Option<&mut PendingFrame> {
        match self.frame_target {
            FrameTarget::None => None,
            FrameTarget::Frame(i) => self.frames.get_mut(i),
            FrameTarget::Dummy => Some(&mut self.dummy_frame),
        }
    }

    fn frame_part_mut(&mut self, index: usize) -> Result<&mut FramePart> {
        self.active_frame_mut()
            .and_then(|f| f.parts.get_mut(index))
            .and_then(Option::as_mut)
            .ok_or(Error::MissingEntry { what: "frame part", index })
    }

    fn into_model(self) -> Result<RawModel> {
        self.check_header()?;
        let version = self.version.ok_or(Error::NoVersion)?;

        if self.declared_faces as usize != self.faces.len() {
            tracing::warn!(
                "face count block declares {} faces, {} were read",
                self.declared_faces,
                self.faces.len()
            );
        }

        let mut default_mesh = Mesh::new(DEFAULT_MESH_NAME);
        default_mesh.verts = fill_slots(self.verts, "vertex")?;
        default_mesh.faces = self
            .faces
            .into_iter()
            .enumerate()
            .map(|(i, face)| {
                let corners: [FaceVertex; 3] = face.corners.into_inner().map_err(|c| {
                    Error::other(format!("triangle {} has {} vertices", i, c.len()))
                })?;
                Ok(Face::new(face.mesh_id, face.material_id, corners))
            })
            .collect::<Result<_>>()?;

        Ok(RawModel {
            version,
            comment: self.comment,
            bones: fill_slots(self.bones, "bone")?,
            objects: fill_slots(self.objects, "object")?,
            materials: fill_slots(self.materials, "material")?,
            default_mesh,
        })
    }

    fn into_anim(self) -> Result<Anim> {
        self.check_header()?;
        let version = self.version.ok_or(Error::NoVersion)?;

        let frames = self
            .frames
            .into_iter()
            .map(|f| {
                let parts = fill_slots(f.parts, "frame part")?;
                Ok(Frame::new(f.frame, parts))
            })
            .collect::<Result<_>>()?;

        Ok(Anim {
            version: Some(version),
            comment: self.comment,
            framerate: self.framerate,
            parts: fill_slots(self.parts, "part")?,
            frames,
            notes: self.notes,
            ..Anim::default()
        })
    }

    fn check_header(&self) -> Result<()> {
        if self.asset.is_none() {
            return Err(Error::other(format!(
                "payload has no {} identification block",
                self.expected
            )));
        }
        Ok(())
    }
}

fn fill_slots<T>(slots: Vec<Option<T>>, what: &'static str) -> Result<Vec<T>> {
    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| slot.ok_or(Error::MissingEntry { what, index }))
        .collect()
}

fn index_in(index: i64, count: usize, what: &'static str, at: u64) -> Result<usize> {
    if index < 0 || index as u64 >= count as u64 {
        return Err(Error::IndexOutOfRange {
            what,
            index,
            count,
            at: Location::Offset(at),
        });
    }
    Ok(index as usize)
}

/// Empty slots for a declared entity count.
///
/// Every entry is filled by at least one record of its own, so a count the
/// rest of the payload cannot hold is rejected before anything is allocated.
fn slots_for<T: Clone>(
    count: i64,
    what: &'static str,
    at: u64,
    r: &BlockReader<'_>,
) -> Result<Vec<Option<T>>> {
    let count = usize::try_from(count)
        .map_err(|_| Error::other(format!("negative {} count {} at offset 0x{:X}", what, count, at)))?;
    let room = r.remaining() / MIN_RECORD_SIZE;
    if count > room {
        return Err(Error::other(format!(
            "{} count {} at offset 0x{:X} exceeds the {} records left in the payload",
            what, count, at, room
        )));
    }
    Ok(vec![None; count])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xbin::block::BlockWriter;
    use crate::xbin::format as tags;

    fn payload(f: impl FnOnce(&mut BlockWriter<Vec<u8>>) -> Result<()>) -> Vec<u8> {
        let mut w = BlockWriter::buffer();
        f(&mut w).unwrap();
        w.into_inner()
    }

    fn header(w: &mut BlockWriter<Vec<u8>>) -> Result<()> {
        w.write_tag_padded(tags::MODEL)?;
        w.int16_block(tags::VERSION, 7)
    }

    #[test]
    fn test_unknown_tag_reports_offset() {
        let data = [0xFF, 0xFF, 0, 0];
        let err = read_model(&data, 5).unwrap_err();
        assert!(matches!(err, Error::UnknownTag { tag: 0xFFFF, offset: 5 }));
    }

    #[test]
    fn test_unimplemented_tag() {
        let data = payload(|w| {
            header(w)?;
            w.int16_block(tags::SIEGE_BONE_COUNT, 2)
        });
        let err = read_model(&data, 0).unwrap_err();
        assert!(matches!(err, Error::UnimplementedTag { tag: 0x1FC2, offset: 8, .. }));
    }

    #[test]
    fn test_asset_type_mismatch() {
        let data = payload(header);
        let err = read_anim(&data, 0).unwrap_err();
        assert!(matches!(
            err,
            Error::AssetTypeMismatch {
                expected: AssetType::Anim,
                found: AssetType::Model
            }
        ));
    }

    #[test]
    fn test_bad_version() {
        let data = payload(|w| {
            w.write_tag_padded(tags::MODEL)?;
            w.int16_block(tags::VERSION, 4)
        });
        assert!(matches!(
            read_model(&data, 0),
            Err(Error::UnsupportedVersion { version: 4, .. })
        ));
    }

    #[test]
    fn test_bone_index_out_of_range() {
        let data = payload(|w| {
            header(w)?;
            w.int16_block(tags::BONE_COUNT, 1)?;
            w.bone_info_block(3, -1, "tag_origin")
        });
        let err = read_model(&data, 0).unwrap_err();
        assert!(matches!(
            err,
            Error::IndexOutOfRange { what: "bone", index: 3, count: 1, .. }
        ));
    }

    #[test]
    fn test_sub_record_without_target() {
        let data = payload(|w| {
            header(w)?;
            w.vec3_block(tags::OFFSET, Vec3::ONE)
        });
        assert!(matches!(
            read_model(&data, 0),
            Err(Error::NoActiveTarget { tag: tags::OFFSET, .. })
        ));
    }

    #[test]
    fn test_missing_bone_slot() {
        let data = payload(|w| {
            header(w)?;
            w.int16_block(tags::BONE_COUNT, 2)?;
            w.bone_info_block(0, -1, "tag_origin")
        });
        assert!(matches!(
            read_model(&data, 0),
            Err(Error::MissingEntry { what: "bone", index: 1 })
        ));
    }

    #[test]
    fn test_cosmetic_count_marks_tail_bones() {
        let data = payload(|w| {
            header(w)?;
            w.int16_block(tags::BONE_COUNT, 3)?;
            w.int32_block(tags::COSMETIC_COUNT, 1)?;
            w.bone_info_block(0, -1, "tag_origin")?;
            w.bone_info_block(1, 0, "j_head")?;
            w.bone_info_block(2, 1, "j_jaw")
        });
        let raw = read_model(&data, 0).unwrap();
        let flags: Vec<_> = raw.bones.iter().map(|b| b.cosmetic).collect();
        assert_eq!(flags, vec![false, false, true]);
    }

    #[test]
    fn test_notetrack_parts_do_not_touch_frames() {
        let data = payload(|w| {
            w.write_tag_padded(tags::ANIM)?;
            w.int16_block(tags::VERSION, 3)?;
            w.int16_block(tags::PART_COUNT, 1)?;
            w.object_block(tags::PART_INFO, 0, "tag_origin")?;
            w.int16_block(tags::FRAMERATE, 30)?;
            w.int32_block(tags::FRAME_COUNT, 1)?;
            w.int32_block(tags::FRAME_INDEX, 0)?;
            w.int16_block(tags::PART_INDEX, 0)?;
            w.vec3_block(tags::OFFSET, Vec3::new(1.0, 2.0, 3.0))?;
            w.matrix_blocks(&[Vec3::X, Vec3::Y, Vec3::Z])?;
            w.int16_block(tags::NOTETRACK_SECTION, 0)?;
            w.int16_block(tags::PART_INDEX, 0)?;
            w.vec3_block(tags::OFFSET, Vec3::splat(99.0))?;
            w.int16_block(tags::NUM_KEYS, 1)?;
            w.note_frame_block(0, "fire")
        });
        let anim = read_anim(&data, 0).unwrap();
        assert_eq!(anim.frames.len(), 1);
        assert_eq!(anim.frames[0].parts[0].offset, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(anim.notes, vec![Note::new(0, "fire")]);
        assert_eq!(anim.framerate, 30);
    }

    #[test]
    fn test_extra_block_is_skipped() {
        let data = payload(|w| {
            w.write_tag_padded(tags::ANIM)?;
            w.int16_block(tags::VERSION, 3)?;
            w.write_u16(tags::EXTRA)?;
            w.write_bytes(&[0xAB; EXTRA_BODY_SIZE])?;
            w.int16_block(tags::PART_COUNT, 0)
        });
        let anim = read_anim(&data, 0).unwrap();
        assert!(anim.parts.is_empty());
    }

    #[test]
    fn test_empty_payload() {
        assert!(read_model(&[], 0).is_err());
    }

    // ------------------------------------------------------------------------
    // Malformed structure
    // ------------------------------------------------------------------------

    #[test]
    fn test_redeclared_bone_count_clears_active_bone() {
        let data = payload(|w| {
            header(w)?;
            w.int16_block(tags::BONE_COUNT, 2)?;
            w.bone_info_block(0, -1, "tag_origin")?;
            w.bone_info_block(1, 0, "j_head")?;
            w.int16_block(tags::BONE_INDEX, 1)?;
            w.int16_block(tags::BONE_COUNT, 1)?;
            w.vec3_block(tags::OFFSET, Vec3::ONE)
        });
        assert!(matches!(
            read_model(&data, 0),
            Err(Error::NoActiveTarget { tag: tags::OFFSET, .. })
        ));
    }

    #[test]
    fn test_redeclared_vertex_count_clears_active_vertex() {
        let data = payload(|w| {
            header(w)?;
            w.int16_block(tags::BONE_COUNT, 1)?;
            w.bone_info_block(0, -1, "tag_origin")?;
            w.uint16_block(tags::VERTEX_COUNT_16, 3)?;
            w.uint16_block(tags::VERTEX_INDEX_16, 2)?;
            w.uint16_block(tags::VERTEX_COUNT_16, 1)?;
            w.int16_block(tags::WEIGHT_COUNT, 1)?;
            w.weight_block(0, 1.0)
        });
        assert!(matches!(
            read_model(&data, 0),
            Err(Error::NoActiveTarget { tag: tags::WEIGHT_COUNT, .. })
        ));
    }

    #[test]
    fn test_stale_index_is_missing_entry() {
        let mut state = LoadState::new(AssetType::Model);
        state.bones = vec![None];
        assert!(matches!(
            state.bone_mut(4),
            Err(Error::MissingEntry { what: "bone", index: 4 })
        ));
        assert!(matches!(
            state.vertex_mut(0),
            Err(Error::MissingEntry { what: "vertex", index: 0 })
        ));
        assert!(matches!(
            state.material_mut(1),
            Err(Error::MissingEntry { what: "material", index: 1 })
        ));
    }

    #[test]
    fn test_oversized_counts_are_rejected() {
        let data = payload(|w| {
            header(w)?;
            w.int32_block(tags::VERTEX_COUNT_32, 0x7FFF_FFFF)
        });
        let err = read_model(&data, 0).unwrap_err();
        println!("{}", err);
        assert!(matches!(err, Error::Other(_)));

        let data = payload(|w| {
            header(w)?;
            w.uint16_block(tags::VERTEX_COUNT_16, u16::MAX)
        });
        assert!(matches!(read_model(&data, 0), Err(Error::Other(_))));

        let data = payload(|w| {
            header(w)?;
            w.int16_block(tags::MATERIAL_COUNT, i16::MAX)?;
            w.material_block(0, "gun", "lambert", "color:gun_c.tga")
        });
        assert!(matches!(read_model(&data, 0), Err(Error::Other(_))));
    }

    #[test]
    fn test_negative_count_is_rejected() {
        let data = payload(|w| {
            header(w)?;
            w.int16_block(tags::BONE_COUNT, -1)
        });
        assert!(matches!(read_model(&data, 0), Err(Error::Other(_))));

        let data = payload(|w| {
            w.write_tag_padded(tags::ANIM)?;
            w.int16_block(tags::VERSION, 3)?;
            w.int16_block(tags::PART_COUNT, -2)
        });
        assert!(matches!(read_anim(&data, 0), Err(Error::Other(_))));
    }

    #[test]
    fn test_vertex_index_without_count() {
        let data = payload(|w| {
            header(w)?;
            w.uint16_block(tags::VERTEX_INDEX_16, 0)?;
            w.vec3_block(tags::OFFSET, Vec3::ZERO)
        });
        assert!(matches!(
            read_model(&data, 0),
            Err(Error::IndexOutOfRange { what: "vertex", index: 0, count: 0, .. })
        ));
    }

    #[test]
    fn test_record_cut_mid_body() {
        let mut prefix = 0;
        let data = payload(|w| {
            header(w)?;
            w.int16_block(tags::BONE_COUNT, 1)?;
            prefix = w.pos() as usize;
            w.bone_info_block(0, -1, "tag_origin")
        });
        // Tag, padding and half of the bone index.
        let cut = &data[..prefix + 6];
        assert!(matches!(read_model(cut, 0), Err(Error::UnexpectedEof(_))));
    }

    #[test]
    fn test_truncation_never_panics() {
        use crate::core::WriteOptions;
        use crate::model::{Model, VertexLayout};
        use crate::util::Vec2;
        use crate::xbin::writer::write_model;

        let mut mesh = Mesh::new("body");
        mesh.verts = vec![
            Vertex::new(Vec3::ZERO).with_weight(0, 1.0),
            Vertex::new(Vec3::X).with_weight(1, 1.0),
            Vertex::new(Vec3::Y).with_weight(1, 1.0),
        ];
        let corner = |v| FaceVertex::new(v, Vec3::Z, Vec2::ZERO);
        mesh.faces.push(Face::new(0, 0, [corner(0), corner(1), corner(2)]));
        let model = Model {
            bones: vec![Bone::new("tag_origin", -1), Bone::new("j_head", 0)],
            meshes: vec![mesh],
            materials: vec![Material::new("gun", "lambert", Images::color("gun_c.tga"))],
            ..Model::new("triangle")
        };
        let layout = VertexLayout::new(&model.meshes, 7);
        let data = write_model(&model, 7, &layout, &WriteOptions::default()).unwrap();
        assert!(read_model(&data, 0).is_ok());

        // Cuts on a record boundary may still parse; none may panic.
        for end in 0..data.len() {
            let _ = read_model(&data[..end], 0);
        }
        // The phong record closes the payload: tag, padding and one float.
        for end in data.len() - 7..data.len() {
            assert!(
                matches!(read_model(&data[..end], 0), Err(Error::UnexpectedEof(_))),
                "cut at {} was accepted",
                end
            );
        }
    }
}
