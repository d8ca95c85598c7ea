//! Binary block tags.
//!
//! Every record in a decompressed payload opens with one of these u16 tags.

// ============================================================================
// Shared
// ============================================================================

pub const COMMENT: u16 = 0xC355;
pub const MODEL: u16 = 0x46C8;
pub const ANIM: u16 = 0x7AAC;
pub const VERSION: u16 = 0x24D1;
pub const OFFSET: u16 = 0x9383;
pub const MATRIX_X: u16 = 0xDCFD;
pub const MATRIX_Y: u16 = 0xCCDC;
pub const MATRIX_Z: u16 = 0xFCBF;

// ============================================================================
// Model
// ============================================================================

pub const BONE_COUNT: u16 = 0x76BA;
pub const COSMETIC_COUNT: u16 = 0x7836;
pub const BONE_INFO: u16 = 0xF099;
pub const BONE_INDEX: u16 = 0xDD9A;
pub const BONE_SCALE: u16 = 0x1C56;

pub const VERTEX_COUNT_16: u16 = 0x950D;
pub const VERTEX_COUNT_32: u16 = 0x2AEC;
pub const VERTEX_INDEX_16: u16 = 0x8F03;
pub const VERTEX_INDEX_32: u16 = 0xB097;
pub const WEIGHT_COUNT: u16 = 0xEA46;
pub const WEIGHT: u16 = 0xF1AB;

pub const FACE_COUNT: u16 = 0xBE92;
pub const TRIANGLE: u16 = 0x562F;
pub const TRIANGLE_16: u16 = 0x6711;
pub const NORMAL: u16 = 0x89EC;
pub const COLOR: u16 = 0x6DD8;
pub const UV: u16 = 0x1AD4;

pub const OBJECT_COUNT: u16 = 0x62AF;
pub const OBJECT_INFO: u16 = 0x87D4;

pub const MATERIAL_COUNT: u16 = 0xA1B2;
pub const MATERIAL_INFO: u16 = 0xA700;
pub const MATERIAL_TRANSPARENCY: u16 = 0x6DAB;
pub const MATERIAL_AMBIENT: u16 = 0x37FF;
pub const MATERIAL_INCANDESCENCE: u16 = 0x4265;
pub const MATERIAL_COEFFS: u16 = 0xC835;
pub const MATERIAL_GLOW: u16 = 0xFE0C;
pub const MATERIAL_REFRACTIVE: u16 = 0x7E24;
pub const MATERIAL_SPECULAR: u16 = 0x317C;
pub const MATERIAL_REFLECTIVE_COLOR: u16 = 0xE593;
pub const MATERIAL_REFLECTIVE: u16 = 0x7D76;
pub const MATERIAL_BLINN: u16 = 0x83C7;
pub const MATERIAL_PHONG: u16 = 0x5CD2;

// ============================================================================
// Animation
// ============================================================================

pub const PART_COUNT: u16 = 0x9279;
pub const PART_INFO: u16 = 0x360B;
pub const PART_INDEX: u16 = 0x745A;
pub const FRAMERATE: u16 = 0x92D3;
pub const FRAME_COUNT: u16 = 0xB917;
pub const FRAME_INDEX: u16 = 0xC723;

pub const NOTETRACK_SECTION: u16 = 0xC7F3;
pub const NUM_TRACKS: u16 = 0x9016;
pub const NUM_KEYS: u16 = 0x7A6C;
pub const NOTETRACK: u16 = 0x4643;
pub const NOTE_FRAME: u16 = 0x1675;

// ============================================================================
// Recognized but not decoded
// ============================================================================

pub const FIRST_FRAME: u16 = 0xBCD4;
pub const SIEGE_BONE_COUNT: u16 = 0x1FC2;
pub const SIEGE_WEIGHT_COUNT: u16 = 0xB35E;
pub const QUATERNION: u16 = 0xEF69;
pub const IK_PITCH_LAYER_COUNT: u16 = 0xA65B;
pub const IK_PITCH_LAYER: u16 = 0x1D7D;
pub const ROTATION: u16 = 0xA58B;

/// Opaque 18-byte record seen in some animation files.
pub const EXTRA: u16 = 0x6EEE;

/// Size of an [`EXTRA`] record body after the tag.
pub const EXTRA_BODY_SIZE: usize = 18;

/// Smallest record on disk: a tag and one 16-bit value.
pub const MIN_RECORD_SIZE: usize = 4;

/// Decoded record kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Comment,
    Model,
    Anim,
    Version,
    BoneCount,
    CosmeticCount,
    BoneInfo,
    BoneIndex,
    Offset,
    BoneScale,
    /// Matrix row 0, 1 or 2.
    MatrixRow(usize),
    VertexCount16,
    VertexCount32,
    VertexIndex16,
    VertexIndex32,
    WeightCount,
    Weight,
    FaceCount,
    Triangle,
    Triangle16,
    Normal,
    Color,
    Uv,
    ObjectCount,
    ObjectInfo,
    MaterialCount,
    MaterialInfo,
    MaterialTransparency,
    MaterialAmbient,
    MaterialIncandescence,
    MaterialCoeffs,
    MaterialGlow,
    MaterialRefractive,
    MaterialSpecular,
    MaterialReflectiveColor,
    MaterialReflective,
    MaterialBlinn,
    MaterialPhong,
    PartCount,
    PartInfo,
    PartIndex,
    Framerate,
    FrameCount,
    FrameIndex,
    NotetrackSection,
    NumTracks,
    NumKeys,
    Notetrack,
    NoteFrame,
    Extra,
    /// Known record this crate cannot decode.
    Unimplemented(&'static str),
    /// Value missing from the table.
    Unknown(u16),
}

impl Tag {
    pub fn from_u16(value: u16) -> Self {
        match value {
            COMMENT => Tag::Comment,
            MODEL => Tag::Model,
            ANIM => Tag::Anim,
            VERSION => Tag::Version,
            BONE_COUNT => Tag::BoneCount,
            COSMETIC_COUNT => Tag::CosmeticCount,
            BONE_INFO => Tag::BoneInfo,
            BONE_INDEX => Tag::BoneIndex,
            OFFSET => Tag::Offset,
            BONE_SCALE => Tag::BoneScale,
            MATRIX_X => Tag::MatrixRow(0),
            MATRIX_Y => Tag::MatrixRow(1),
            MATRIX_Z => Tag::MatrixRow(2),
            VERTEX_COUNT_16 => Tag::VertexCount16,
            VERTEX_COUNT_32 => Tag::VertexCount32,
            VERTEX_INDEX_16 => Tag::VertexIndex16,
            VERTEX_INDEX_32 => Tag::VertexIndex32,
            WEIGHT_COUNT => Tag::WeightCount,
            WEIGHT => Tag::Weight,
            FACE_COUNT => Tag::FaceCount,
            TRIANGLE => Tag::Triangle,
            TRIANGLE_16 => Tag::Triangle16,
            NORMAL => Tag::Normal,
            COLOR => Tag::Color,
            UV => Tag::Uv,
            OBJECT_COUNT => Tag::ObjectCount,
            OBJECT_INFO => Tag::ObjectInfo,
            MATERIAL_COUNT => Tag::MaterialCount,
            MATERIAL_INFO => Tag::MaterialInfo,
            MATERIAL_TRANSPARENCY => Tag::MaterialTransparency,
            MATERIAL_AMBIENT => Tag::MaterialAmbient,
            MATERIAL_INCANDESCENCE => Tag::MaterialIncandescence,
            MATERIAL_COEFFS => Tag::MaterialCoeffs,
            MATERIAL_GLOW => Tag::MaterialGlow,
            MATERIAL_REFRACTIVE => Tag::MaterialRefractive,
            MATERIAL_SPECULAR => Tag::MaterialSpecular,
            MATERIAL_REFLECTIVE_COLOR => Tag::MaterialReflectiveColor,
            MATERIAL_REFLECTIVE => Tag::MaterialReflective,
            MATERIAL_BLINN => Tag::MaterialBlinn,
            MATERIAL_PHONG => Tag::MaterialPhong,
            PART_COUNT => Tag::PartCount,
            PART_INFO => Tag::PartInfo,
            PART_INDEX => Tag::PartIndex,
            FRAMERATE => Tag::Framerate,
            FRAME_COUNT => Tag::FrameCount,
            FRAME_INDEX => Tag::FrameIndex,
            NOTETRACK_SECTION => Tag::NotetrackSection,
            NUM_TRACKS => Tag::NumTracks,
            NUM_KEYS => Tag::NumKeys,
            NOTETRACK => Tag::Notetrack,
            NOTE_FRAME => Tag::NoteFrame,
            EXTRA => Tag::Extra,
            FIRST_FRAME => Tag::Unimplemented("FIRSTFRAME"),
            SIEGE_BONE_COUNT => Tag::Unimplemented("NUMSBONES (siege models)"),
            SIEGE_WEIGHT_COUNT => Tag::Unimplemented("NUMSWEIGHTS"),
            QUATERNION => Tag::Unimplemented("QUATERNION"),
            IK_PITCH_LAYER_COUNT => Tag::Unimplemented("NUMIKPITCHLAYERS"),
            IK_PITCH_LAYER => Tag::Unimplemented("IKPITCHLAYER"),
            ROTATION => Tag::Unimplemented("ROTATION"),
            other => Tag::Unknown(other),
        }
    }

    /// Human readable record name for block logging.
    pub fn name(&self) -> &'static str {
        match self {
            Tag::Comment => "Comment",
            Tag::Model => "Model identification",
            Tag::Anim => "Animation identification",
            Tag::Version => "Version",
            Tag::BoneCount => "Bone count",
            Tag::CosmeticCount => "Cosmetic bone count",
            Tag::BoneInfo => "Bone info",
            Tag::BoneIndex => "Bone index",
            Tag::Offset => "Offset",
            Tag::BoneScale => "Bone scale",
            Tag::MatrixRow(0) => "Matrix X",
            Tag::MatrixRow(1) => "Matrix Y",
            Tag::MatrixRow(_) => "Matrix Z",
            Tag::VertexCount16 => "Vertex count",
            Tag::VertexCount32 => "Vertex count (32)",
            Tag::VertexIndex16 => "Vertex index",
            Tag::VertexIndex32 => "Vertex index (32)",
            Tag::WeightCount => "Weight count",
            Tag::Weight => "Weight",
            Tag::FaceCount => "Face count",
            Tag::Triangle => "Triangle",
            Tag::Triangle16 => "Triangle (16)",
            Tag::Normal => "Normal",
            Tag::Color => "Color",
            Tag::Uv => "UV",
            Tag::ObjectCount => "Object count",
            Tag::ObjectInfo => "Object info",
            Tag::MaterialCount => "Material count",
            Tag::MaterialInfo => "Material info",
            Tag::MaterialTransparency => "Material transparency",
            Tag::MaterialAmbient => "Material ambient color",
            Tag::MaterialIncandescence => "Material incandescence",
            Tag::MaterialCoeffs => "Material coeffs",
            Tag::MaterialGlow => "Material glow",
            Tag::MaterialRefractive => "Material refractive",
            Tag::MaterialSpecular => "Material specular color",
            Tag::MaterialReflectiveColor => "Material reflective color",
            Tag::MaterialReflective => "Material reflective",
            Tag::MaterialBlinn => "Material blinn",
            Tag::MaterialPhong => "Material phong",
            Tag::PartCount => "Part count",
            Tag::PartInfo => "Part info",
            Tag::PartIndex => "Part index",
            Tag::Framerate => "Framerate",
            Tag::FrameCount => "Frame count",
            Tag::FrameIndex => "Frame",
            Tag::NotetrackSection => "Notetrack section",
            Tag::NumTracks => "Track count",
            Tag::NumKeys => "Key count",
            Tag::Notetrack => "Notetrack",
            Tag::NoteFrame => "Note frame",
            Tag::Extra => "Extra data",
            Tag::Unimplemented(name) => name,
            Tag::Unknown(_) => "Unknown",
        }
    }
}
