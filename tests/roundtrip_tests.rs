//! Round-trip tests shared by both formats: cosmetic bone ordering, vertex
//! index width, weight capping and strict limits.

use xmodel::model::reorder_cosmetic_bones;
use xmodel::prelude::*;

fn load_text(text: &str) -> Model {
    Model::from_export_str(text, &ReadOptions::default()).expect("Failed to parse text")
}

fn load_bin(data: &[u8]) -> Model {
    Model::from_bin_bytes(data, &ReadOptions::default()).expect("Failed to read binary")
}

/// One triangle per bone, each vertex weighted fully to that bone.
fn skinned_model(bones: Vec<Bone>) -> Model {
    let mut mesh = Mesh::new("body");
    for (b, _) in bones.iter().enumerate() {
        let base = mesh.verts.len();
        for k in 0..3 {
            let offset = Vec3::new(b as f32, k as f32, 0.0);
            mesh.verts.push(Vertex::new(offset).with_weight(b, 1.0));
        }
        let corner = |v| FaceVertex::new(v, Vec3::Z, Vec2::ZERO);
        mesh.faces
            .push(Face::new(0, 0, [corner(base), corner(base + 1), corner(base + 2)]));
    }

    Model {
        bones,
        meshes: vec![mesh],
        materials: vec![Material::new("skin", "lambert", Images::color("skin_c.tga"))],
        ..Model::new("skinned")
    }
}

fn ten_bones() -> Vec<Bone> {
    let parents = [-1, 0, 1, 2, 1, 4, 0, 3, 7, 7];
    parents
        .iter()
        .enumerate()
        .map(|(i, &parent)| {
            Bone::new(format!("j_bone_{}", i), parent)
                .with_offset(Vec3::new(i as f32, 0.0, 0.0))
                .with_cosmetic(i >= 7)
        })
        .collect()
}

/// Bone names with parent names, independent of bone order.
fn hierarchy(model: &Model) -> Vec<(String, Option<String>)> {
    model
        .bones
        .iter()
        .map(|b| {
            let parent = usize::try_from(b.parent)
                .ok()
                .map(|p| model.bones[p].name.clone());
            (b.name.clone(), parent)
        })
        .collect()
}

fn assert_cosmetics_last(model: &Model) {
    let first_cosmetic = model.bones.iter().position(|b| b.cosmetic).unwrap_or(model.bones.len());
    assert!(model.bones[first_cosmetic..].iter().all(|b| b.cosmetic));
}

// ============================================================================
// Cosmetic bones
// ============================================================================

#[test]
fn test_cosmetic_tail_text() {
    let mut model = skinned_model(ten_bones());
    let text = model
        .to_export_string(&WriteOptions::new(Format::Export).with_version(7))
        .expect("Failed to serialize");
    assert!(text.contains("NUMBONES 10\nNUMCOSMETICS 3\n"));

    let loaded = load_text(&text);
    let flags: Vec<bool> = loaded.bones.iter().map(|b| b.cosmetic).collect();
    assert_eq!(flags, [vec![false; 7], vec![true; 3]].concat());
    assert_eq!(loaded.bones[8].parent, 7);
    assert_eq!(loaded.bones[9].parent, 7);
    assert_eq!(hierarchy(&loaded), hierarchy(&skinned_model(ten_bones())));
}

#[test]
fn test_cosmetic_tail_binary() {
    let mut model = skinned_model(ten_bones());
    let data = model
        .to_bin_bytes(&WriteOptions::default().with_version(7))
        .expect("Failed to serialize");

    let loaded = load_bin(&data);
    assert_eq!(loaded.cosmetic_count(), 3);
    assert_cosmetics_last(&loaded);
    assert_eq!(loaded.bones, model.bones);
}

#[test]
fn test_interleaved_cosmetics_are_moved() {
    let bones = vec![
        Bone::new("tag_origin", -1),
        Bone::new("j_brow_le", 0).with_cosmetic(true),
        Bone::new("j_spine", 0),
        Bone::new("j_brow_ri", 1).with_cosmetic(true),
        Bone::new("j_neck", 2),
    ];
    let original = skinned_model(bones);
    let mut model = original.clone();

    let data = model
        .to_bin_bytes(&WriteOptions::default().with_version(7))
        .expect("Failed to serialize");

    // The save reorders the caller's model too
    let names: Vec<&str> = model.bones.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["tag_origin", "j_spine", "j_neck", "j_brow_le", "j_brow_ri"]);
    assert_eq!(model.bones[4].parent, 3);
    assert_eq!(model.bones[2].parent, 1);

    let loaded = load_bin(&data);
    assert_cosmetics_last(&loaded);
    assert_eq!(hierarchy(&loaded), hierarchy(&model));

    // Every vertex still follows the same named bone
    for (mesh, source) in loaded.meshes.iter().zip(&original.meshes) {
        for (vert, src) in mesh.verts.iter().zip(&source.verts) {
            let now = &loaded.bones[vert.weights[0].bone].name;
            let before = &original.bones[src.weights[0].bone].name;
            assert_eq!(now, before);
        }
    }
}

#[test]
fn test_v6_keeps_bone_order() {
    let bones = vec![
        Bone::new("tag_origin", -1),
        Bone::new("j_brow_le", 0).with_cosmetic(true),
        Bone::new("j_spine", 0),
    ];
    let mut model = skinned_model(bones);
    let text = model
        .to_export_string(&WriteOptions::new(Format::Export).with_version(6))
        .expect("Failed to serialize");
    assert!(!text.contains("NUMCOSMETICS"));
    let names: Vec<&str> = model.bones.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["tag_origin", "j_brow_le", "j_spine"]);
}

#[test]
fn test_reorder_without_cosmetics_is_noop() {
    let mut model = skinned_model(vec![Bone::new("a", -1), Bone::new("b", 0)]);
    let before = model.clone();
    let map = reorder_cosmetic_bones(&mut model.bones, &mut model.meshes).expect("Reorder failed");
    assert!(map.is_none());
    assert_eq!(model, before);
}

#[test]
fn test_mark_cosmetic_by_name() {
    let mut model = skinned_model(vec![
        Bone::new("tag_origin", -1),
        Bone::new("j_brow_a01_le", 0),
        Bone::new("j_spine", 0),
    ]);
    assert_eq!(model.mark_cosmetic_bones(), 1);
    assert!(model.bones[1].cosmetic);
    assert!(!model.bones[2].cosmetic);
}

// ============================================================================
// Vertex index width
// ============================================================================

fn flat_model(vertex_count: usize) -> Model {
    let mut mesh = Mesh::new("cloud");
    mesh.verts = (0..vertex_count)
        .map(|i| Vertex::new(Vec3::new(i as f32, 0.0, 0.0)))
        .collect();
    Model {
        bones: vec![Bone::new("tag_origin", -1)],
        meshes: vec![mesh],
        ..Model::new("cloud")
    }
}

#[test]
fn test_index_width_selection() {
    let v7 = WriteOptions::new(Format::Export).with_version(7);
    let v6 = WriteOptions::new(Format::Export).with_version(6);

    let text = flat_model(65535).to_export_string(&v7).expect("Failed to serialize");
    assert!(text.contains("NUMVERTS 65535\nVERT 0\n"));

    let text = flat_model(65536).to_export_string(&v7).expect("Failed to serialize");
    assert!(text.contains("NUMVERTS32 65536\nVERT32 0\n"));

    let text = flat_model(65536).to_export_string(&v6).expect("Failed to serialize");
    assert!(text.contains("NUMVERTS 65536\nVERT 0\n"));
}

#[test]
fn test_wide_binary_reads_back() {
    let data = flat_model(65536)
        .to_bin_bytes(&WriteOptions::default().with_version(7))
        .expect("Failed to serialize");

    let opts = ReadOptions::default().with_split_meshes(false);
    let loaded = Model::from_bin_bytes(&data, &opts).expect("Failed to read");
    assert_eq!(loaded.vertex_count(), 65536);
    assert_eq!(loaded.meshes[0].verts[65535].offset.x, 65535.0);
}

#[test]
fn test_wide_text_reads_back() {
    let text = flat_model(65536)
        .to_export_string(&WriteOptions::new(Format::Export).with_version(7))
        .expect("Failed to serialize");

    let opts = ReadOptions::default().with_split_meshes(false);
    let loaded = Model::from_export_str(&text, &opts).expect("Failed to parse");
    assert_eq!(loaded.vertex_count(), 65536);
}

// ============================================================================
// Weights
// ============================================================================

fn heavy_model() -> Model {
    let bones: Vec<Bone> = (0..20)
        .map(|i| Bone::new(format!("j_{}", i), if i == 0 { -1 } else { 0 }))
        .collect();
    let mut model = skinned_model(bones);
    let vert = &mut model.meshes[0].verts[0];
    vert.weights.clear();
    for b in 0..20 {
        vert.weights.push(Weight::new(b, (b + 1) as f32));
    }
    model
}

#[test]
fn test_writers_cap_weights() {
    let mut model = heavy_model();
    let data = model
        .to_bin_bytes(&WriteOptions::default().with_version(6))
        .expect("Failed to serialize");
    // The caller's model is left alone
    assert_eq!(model.meshes[0].verts[0].weights.len(), 20);

    let loaded = load_bin(&data);
    let weights = &loaded.meshes[0].verts[0].weights;
    assert_eq!(weights.len(), MAX_WEIGHTS);
    // The five smallest influences are the ones dropped
    assert!(weights.iter().all(|w| w.bone >= 5));
    let sum: f32 = weights.iter().map(|w| w.influence * w.influence).sum();
    assert!((sum - 1.0).abs() < 1e-5);

    let text = model
        .to_export_string(&WriteOptions::new(Format::Export).with_version(6))
        .expect("Failed to serialize");
    assert_eq!(load_text(&text).meshes[0].verts[0].weights.len(), MAX_WEIGHTS);
}

#[test]
fn test_fix_and_normalize_weights() {
    let mut model = heavy_model();
    assert!(model.fix_too_many_weights());
    assert!(!model.fix_too_many_weights());
    assert_eq!(model.meshes[0].verts[0].weights.len(), MAX_WEIGHTS);

    model.meshes[0].verts[1].weights = vec![Weight::new(0, 3.0), Weight::new(1, 4.0)].into();
    model.normalize_weights();
    let w = &model.meshes[0].verts[1].weights;
    assert!((w[0].influence - 0.6).abs() < 1e-6);
    assert!((w[1].influence - 0.8).abs() < 1e-6);
}

// ============================================================================
// Strict mode
// ============================================================================

#[test]
fn test_strict_limits() {
    let mut model = flat_model(65536);
    let strict = WriteOptions::new(Format::Export).with_version(6).with_strict(true);
    let err = model.to_export_string(&strict).unwrap_err();
    assert!(matches!(err, Error::StrictLimit { what: "vertex count", .. }));

    let mut model = skinned_model(vec![Bone::new("tag_origin", -1)]);
    model.materials = (0..256)
        .map(|i| Material::new(format!("m{}", i), "lambert", Images::color("x.tga")))
        .collect();
    let err = model
        .to_bin_bytes(&WriteOptions::default().with_version(7).with_strict(true))
        .unwrap_err();
    assert!(matches!(err, Error::StrictLimit { what: "material count", value: 256, limit: 255 }));

    // Lenient mode writes it anyway
    let text = model
        .to_export_string(&WriteOptions::new(Format::Export).with_version(7))
        .expect("Lenient write failed");
    assert!(text.contains("NUMMATERIALS 256\n"));
}
