//! Integration tests for the compressed xmodel_bin format.

use xmodel::core::{header_comment, Lz4Container, LZ4_MAGIC};
use xmodel::prelude::*;

use tempfile::tempdir;

fn triangle_model() -> Model {
    let mut mesh = Mesh::new("triangle");
    mesh.verts = vec![
        Vertex::new(Vec3::new(0.0, 0.0, 0.0)).with_weight(0, 1.0),
        Vertex::new(Vec3::new(1.0, 0.0, 0.0)).with_weight(0, 1.0),
        Vertex::new(Vec3::new(0.5, 1.0, 0.0)).with_weight(0, 1.0),
    ];
    let corner = |v, uv| FaceVertex::new(v, Vec3::Z, uv);
    mesh.faces.push(Face::new(
        0,
        0,
        [
            corner(0, Vec2::new(0.0, 0.0)),
            corner(1, Vec2::new(1.0, 0.0)),
            corner(2, Vec2::new(0.5, 1.0)),
        ],
    ));

    Model {
        bones: vec![Bone::new("tag_origin", -1)],
        meshes: vec![mesh],
        materials: vec![Material::new("body_mtl", "lambert", Images::color("body_c.tga"))],
        ..Model::new("triangle")
    }
}

#[test]
fn test_size_field_matches_payload() {
    let opts = WriteOptions::new(Format::Bin).with_version(7);

    let payload = triangle_model().to_bin_payload(&opts).expect("Failed to build payload");
    let data = triangle_model().to_bin_bytes(&opts).expect("Failed to build container");

    assert_eq!(&data[..5], LZ4_MAGIC);
    let size = u32::from_le_bytes([data[5], data[6], data[7], data[8]]);
    assert_eq!(size as usize, payload.len());

    let unpacked = Lz4Container::new(false).decompress(&data).expect("Failed to decompress");
    assert_eq!(unpacked, payload);
}

#[test]
fn test_roundtrip_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("triangle.xmodel_bin");

    let mut model = triangle_model();
    let opts = WriteOptions::for_path(&path)
        .with_version(7)
        .with_header(header_comment(&path));
    model.save(&path, &opts).expect("Failed to write model");

    let loaded = Model::load(&path).expect("Failed to read model");
    assert_eq!(loaded.name, "triangle");

    assert_eq!(loaded.version, Some(7));
    let comment = loaded.comment.as_deref().unwrap_or_default();
    println!("comment: {}", comment);
    assert!(comment.contains("Export filename"));

    assert_eq!(loaded.bones, model.bones);
    assert_eq!(loaded.meshes.len(), 1);
    assert_eq!(loaded.meshes[0].name, "triangle");
    assert_eq!(loaded.meshes[0].verts, model.meshes[0].verts);
    assert_eq!(loaded.meshes[0].faces, model.meshes[0].faces);
    assert_eq!(loaded.materials, model.materials);
}

#[test]
fn test_unknown_tag_reports_offset() {
    let container = Lz4Container::new(false)
        .compress(&[0xFF, 0xFF, 0x00, 0x00])
        .expect("Failed to compress");

    let err = Model::from_bin_bytes(&container, &ReadOptions::default()).unwrap_err();
    println!("{}", err);
    assert!(matches!(err, Error::UnknownTag { tag: 0xFFFF, offset: 5 }));
}

#[test]
fn test_bad_magic() {
    let err = Model::from_bin_bytes(b"*LZ5*\x04\0\0\0abcd", &ReadOptions::default()).unwrap_err();
    match err {
        Error::BadMagic { found } => assert_eq!(found, b"*LZ5*".to_vec()),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_size_mismatch_is_fatal() {
    let payload = triangle_model()
        .to_bin_payload(&WriteOptions::default().with_version(6))
        .expect("Failed to build payload");
    let mut data = Lz4Container::new(false).compress(&payload).expect("Failed to compress");
    data[5..9].copy_from_slice(&(payload.len() as u32 + 4).to_le_bytes());

    let err = Model::from_bin_bytes(&data, &ReadOptions::default()).unwrap_err();
    println!("{}", err);
    assert!(matches!(err, Error::SizeMismatch { .. } | Error::Decompress(_)));
}

#[test]
fn test_uncompressed_payload() {
    let payload = triangle_model()
        .to_bin_payload(&WriteOptions::default().with_version(6))
        .expect("Failed to build payload");

    let opts = ReadOptions::default().with_compressed(false);
    let loaded = Model::from_bin_bytes(&payload, &opts).expect("Failed to read payload");
    assert_eq!(loaded.version, Some(6));
    assert_eq!(loaded.face_count(), 1);
}

#[test]
fn test_oversized_vertex_count_is_an_error() {
    let mut payload = Vec::new();
    payload.extend_from_slice(&[0xC8, 0x46, 0x00, 0x00]);
    payload.extend_from_slice(&[0xD1, 0x24, 0x07, 0x00]);
    payload.extend_from_slice(&[0xEC, 0x2A, 0x00, 0x00]);
    payload.extend_from_slice(&0x7FFF_FFFFi32.to_le_bytes());

    let opts = ReadOptions::default().with_compressed(false);
    let err = Model::from_bin_bytes(&payload, &opts).unwrap_err();
    println!("{}", err);
    assert!(matches!(err, Error::Other(_)));

    let container = Lz4Container::new(false).compress(&payload).expect("Failed to compress");
    assert!(Model::from_bin_bytes(&container, &ReadOptions::default()).is_err());
}

#[test]
fn test_truncated_container_payload() {
    let payload = triangle_model()
        .to_bin_payload(&WriteOptions::default().with_version(7))
        .expect("Failed to build payload");

    let opts = ReadOptions::default().with_compressed(false);
    for end in [1, 6, payload.len() - 1] {
        assert!(Model::from_bin_bytes(&payload[..end], &opts).is_err(), "cut at {}", end);
    }
}

#[test]
fn test_anim_rejected_as_model() {
    let mut anim = Anim::new();
    anim.parts.push(PartInfo::new("tag_origin"));
    anim.frames.push(Frame::new(0, vec![FramePart::default()]));
    let data = anim
        .to_bin_bytes(&WriteOptions::default().with_version(3))
        .expect("Failed to write anim");

    let err = Model::from_bin_bytes(&data, &ReadOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        Error::AssetTypeMismatch {
            expected: AssetType::Model,
            found: AssetType::Anim
        }
    ));
}

#[test]
fn test_missing_version_is_fatal() {
    let mut model = triangle_model();
    let err = model.to_bin_bytes(&WriteOptions::default()).unwrap_err();
    assert!(matches!(err, Error::NoVersion));
}

#[test]
fn test_dump_writes_payload() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("gun.xmodel_bin");
    let opts = WriteOptions::for_path(&path).with_version(7);
    triangle_model().save(&path, &opts).expect("Failed to write model");

    let read = ReadOptions::default().with_dump(true);
    Model::load_with(&path, &read).expect("Failed to read model");

    let dump = std::fs::read(dir.path().join("gun.dump")).expect("Dump file missing");
    let payload = triangle_model().to_bin_payload(&opts).expect("Failed to build payload");
    assert_eq!(dump, payload);
}

#[test]
fn test_ascii_and_binary_agree() {
    let opts_text = WriteOptions::new(Format::Export).with_version(6);
    let text = triangle_model().to_export_string(&opts_text).expect("Failed to serialize text");
    let from_text = Model::from_export_str(&text, &ReadOptions::default()).expect("Failed to parse");

    let data = triangle_model()
        .to_bin_bytes(&WriteOptions::default().with_version(6))
        .expect("Failed to serialize binary");
    let from_bin = Model::from_bin_bytes(&data, &ReadOptions::default()).expect("Failed to read");

    assert_eq!(from_text.bones, from_bin.bones);
    assert_eq!(from_text.meshes, from_bin.meshes);
    assert_eq!(from_text.materials, from_bin.materials);
}
