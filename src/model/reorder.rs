//! Cosmetic bone reordering.
//!
//! Version 7 requires every cosmetic bone to come after all regular bones.
//! The partition is stable, and parent and weight indices are rewritten
//! through the resulting old-to-new map.

use crate::util::{Error, Result};

use super::{Bone, Mesh};

/// Move cosmetic bones to the end and remap every bone reference.
///
/// Returns the old-to-new index map, or `None` when no bone is cosmetic and
/// nothing was touched.
pub fn reorder_cosmetic_bones(bones: &mut Vec<Bone>, meshes: &mut [Mesh]) -> Result<Option<Vec<usize>>> {
    if !bones.iter().any(|b| b.cosmetic) {
        return Ok(None);
    }

    let count = bones.len();
    check_references(bones, meshes)?;

    let mut order: Vec<(usize, Bone)> = std::mem::take(bones).into_iter().enumerate().collect();
    // Stable: keeps relative order inside each partition.
    order.sort_by_key(|(_, bone)| bone.cosmetic);

    let mut bone_map = vec![0usize; count];
    for (new, (old, _)) in order.iter().enumerate() {
        bone_map[*old] = new;
    }
    *bones = order.into_iter().map(|(_, bone)| bone).collect();

    for bone in bones.iter_mut() {
        if bone.parent >= 0 {
            bone.parent = bone_map[bone.parent as usize] as i32;
        }
    }

    for mesh in meshes.iter_mut() {
        for vert in &mut mesh.verts {
            for w in &mut vert.weights {
                w.bone = bone_map[w.bone];
            }
        }
        if mesh.bone_groups.len() == count {
            let mut groups = vec![Vec::new(); count];
            for (old, group) in std::mem::take(&mut mesh.bone_groups).into_iter().enumerate() {
                groups[bone_map[old]] = group;
            }
            mesh.bone_groups = groups;
        }
    }

    tracing::debug!(
        "moved {} cosmetic bones after {} regular bones",
        bones.iter().filter(|b| b.cosmetic).count(),
        bones.iter().filter(|b| !b.cosmetic).count()
    );
    Ok(Some(bone_map))
}

fn check_references(bones: &[Bone], meshes: &[Mesh]) -> Result<()> {
    let count = bones.len();
    for (i, bone) in bones.iter().enumerate() {
        if bone.parent >= count as i32 {
            return Err(Error::other(format!(
                "bone {} '{}' has parent {} outside [0, {})",
                i, bone.name, bone.parent, count
            )));
        }
    }
    for mesh in meshes {
        for (v, vert) in mesh.verts.iter().enumerate() {
            if let Some(w) = vert.weights.iter().find(|w| w.bone >= count) {
                return Err(Error::other(format!(
                    "vertex {} of mesh '{}' is weighted to bone {} outside [0, {})",
                    v, mesh.name, w.bone, count
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Vertex;
    use crate::util::Vec3;

    fn skeleton() -> Vec<Bone> {
        // 0 root, 1 <- 0, 2 (cosmetic) <- 1, 3 <- 1, 4 (cosmetic) <- 2, 5 <- 3
        vec![
            Bone::new("tag_origin", -1),
            Bone::new("j_head", 0),
            Bone::new("j_jaw", 1).with_cosmetic(true),
            Bone::new("j_neck", 1),
            Bone::new("j_teeth_lower", 2).with_cosmetic(true),
            Bone::new("j_spine", 3),
        ]
    }

    #[test]
    fn test_no_cosmetics_is_noop() {
        let mut bones = vec![Bone::new("a", -1), Bone::new("b", 0)];
        let before = bones.clone();
        assert!(reorder_cosmetic_bones(&mut bones, &mut []).unwrap().is_none());
        assert_eq!(bones, before);
    }

    #[test]
    fn test_partition_and_remap() {
        let mut bones = skeleton();
        let names_before: Vec<_> = bones.iter().map(|b| b.name.clone()).collect();
        let parents_before: Vec<_> = bones
            .iter()
            .map(|b| (b.parent >= 0).then(|| names_before[b.parent as usize].clone()))
            .collect();

        let mut mesh = Mesh::new("body");
        mesh.verts.push(Vertex::new(Vec3::ZERO).with_weight(4, 0.5).with_weight(5, 0.5));
        let mut meshes = vec![mesh];

        let map = reorder_cosmetic_bones(&mut bones, &mut meshes).unwrap().unwrap();
        assert_eq!(map, vec![0, 1, 4, 2, 5, 3]);

        let names: Vec<_> = bones.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["tag_origin", "j_head", "j_neck", "j_spine", "j_jaw", "j_teeth_lower"]
        );

        // Every regular bone precedes every cosmetic bone.
        let first_cosmetic = bones.iter().position(|b| b.cosmetic).unwrap();
        assert!(bones[first_cosmetic..].iter().all(|b| b.cosmetic));

        // Parents still name the same bones.
        for (old, name) in names_before.iter().enumerate() {
            let bone = &bones[map[old]];
            assert_eq!(&bone.name, name);
            let parent = (bone.parent >= 0).then(|| bones[bone.parent as usize].name.clone());
            assert_eq!(parent, parents_before[old]);
        }

        let weights: Vec<_> = meshes[0].verts[0].weights.iter().map(|w| w.bone).collect();
        assert_eq!(weights, vec![5, 3]);
    }

    #[test]
    fn test_bad_parent_is_rejected() {
        let mut bones = vec![Bone::new("a", -1), Bone::new("b", 7).with_cosmetic(true)];
        assert!(reorder_cosmetic_bones(&mut bones, &mut []).is_err());
    }
}
