//! Turn parser output into per-object meshes.
//!
//! Both readers produce one flat `$default` mesh whose faces carry model-wide
//! mesh and material ids. Splitting moves every face into its object's mesh
//! and gives each mesh its own vertex list.

use crate::util::{Error, Location, Result};

use super::{Bone, Material, Mesh, Model};

/// Name of the flattened mesh produced by the readers.
pub const DEFAULT_MESH_NAME: &str = "$default";

/// Model contents as read, before splitting.
#[derive(Debug, Default)]
pub struct RawModel {
    pub version: u16,
    pub comment: Option<String>,
    pub bones: Vec<Bone>,
    /// Named, empty meshes from the object table.
    pub objects: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub default_mesh: Mesh,
}

impl RawModel {
    /// Build the model, splitting the default mesh when `split` is set.
    pub fn assemble(self, split: bool) -> Result<Model> {
        let RawModel {
            version,
            comment,
            bones,
            objects,
            materials,
            default_mesh,
        } = self;

        let meshes = if split {
            generate_meshes(objects, default_mesh, bones.len(), materials.len())?
        } else {
            vec![default_mesh]
        };

        Ok(Model {
            version: Some(version),
            comment,
            bones,
            meshes,
            materials,
            ..Model::default()
        })
    }
}

/// Distribute the default mesh's faces over `meshes`.
///
/// A source vertex used by several meshes is duplicated into each. The first
/// face to touch a vertex decides its local index.
pub fn generate_meshes(
    mut meshes: Vec<Mesh>,
    default_mesh: Mesh,
    bone_count: usize,
    material_count: usize,
) -> Result<Vec<Mesh>> {
    for mesh in &mut meshes {
        mesh.bone_groups = vec![Vec::new(); bone_count];
        mesh.material_groups = vec![Vec::new(); material_count];
    }

    let Mesh { verts, faces, .. } = default_mesh;
    let mut vertex_map: Vec<Vec<Option<usize>>> = vec![vec![None; verts.len()]; meshes.len()];

    for (face_index, mut face) in faces.into_iter().enumerate() {
        let mesh_count = meshes.len();
        let mesh = meshes
            .get_mut(face.mesh_id)
            .ok_or_else(|| face_error("mesh", face.mesh_id, mesh_count, face_index))?;
        if face.material_id >= material_count {
            return Err(face_error("material", face.material_id, material_count, face_index));
        }

        let map = &mut vertex_map[face.mesh_id];
        for corner in &mut face.indices {
            let source = corner.vertex;
            let slot = map
                .get_mut(source)
                .ok_or_else(|| face_error("vertex", source, verts.len(), face_index))?;

            let local = match *slot {
                Some(local) => local,
                None => {
                    let local = mesh.verts.len();
                    *slot = Some(local);
                    let vert = verts[source].clone();
                    for w in &vert.weights {
                        let group = mesh.bone_groups.get_mut(w.bone).ok_or_else(|| {
                            face_error("weight bone", w.bone, bone_count, face_index)
                        })?;
                        group.push((local, w.influence));
                    }
                    mesh.verts.push(vert);
                    local
                }
            };
            corner.vertex = local;
            mesh.material_groups[face.material_id].push(local);
        }
        mesh.faces.push(face);
    }

    for mesh in &mut meshes {
        for group in &mut mesh.bone_groups {
            group.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));
            group.dedup();
        }
        for group in &mut mesh.material_groups {
            group.sort_unstable();
            group.dedup();
        }
    }

    tracing::debug!(
        "split {} vertices into {} meshes",
        verts.len(),
        meshes.len()
    );
    Ok(meshes)
}

fn face_error(what: &'static str, index: usize, count: usize, face: usize) -> Error {
    Error::IndexOutOfRange {
        what,
        index: index as i64,
        count,
        at: Location::Face(face),
    }
}
