//! Vertex numbering shared by both writers.

use crate::util::{Error, Result};

use super::Mesh;

/// Largest vertex count or index the 16-bit records can hold.
pub const MAX_VERTS_16: usize = 0xFFFF;

/// Most meshes or materials a byte-packed triangle record can address.
pub const MAX_PACKED_IDS: usize = 256;

/// Where each mesh's vertices land in the flat on-disk vertex table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    /// Vertices preceding each mesh.
    pub offsets: Vec<usize>,
    pub total: usize,
    /// Use the 32-bit vertex count and index records.
    pub wide: bool,
}

impl VertexLayout {
    pub fn new(meshes: &[Mesh], version: u16) -> Self {
        let mut offsets = Vec::with_capacity(meshes.len());
        let mut total = 0;
        for mesh in meshes {
            offsets.push(total);
            total += mesh.verts.len();
        }
        Self {
            offsets,
            total,
            wide: uses_wide_indices(version, total),
        }
    }
}

/// Only version 7 has 32-bit vertex records, and only needs them past 65535.
pub fn uses_wide_indices(version: u16, vertex_count: usize) -> bool {
    version == 7 && vertex_count > MAX_VERTS_16
}

/// Enforce the format capacity limits.
pub fn check_strict_limits(
    version: u16,
    mesh_count: usize,
    material_count: usize,
    vertex_count: usize,
) -> Result<()> {
    if material_count >= MAX_PACKED_IDS {
        return Err(Error::StrictLimit {
            what: "material count",
            value: material_count,
            limit: MAX_PACKED_IDS - 1,
        });
    }
    if mesh_count >= MAX_PACKED_IDS {
        return Err(Error::StrictLimit {
            what: "mesh count",
            value: mesh_count,
            limit: MAX_PACKED_IDS - 1,
        });
    }
    if version < 7 && vertex_count > MAX_VERTS_16 {
        return Err(Error::StrictLimit {
            what: "vertex count",
            value: vertex_count,
            limit: MAX_VERTS_16,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Vertex;

    #[test]
    fn test_index_width_thresholds() {
        assert!(!uses_wide_indices(7, 65535));
        assert!(uses_wide_indices(7, 65536));
        assert!(!uses_wide_indices(6, 65536));
        assert!(!uses_wide_indices(5, 1_000_000));
    }

    #[test]
    fn test_offsets() {
        let mut a = Mesh::new("a");
        a.verts = vec![Vertex::default(); 3];
        let b = Mesh::new("b");
        let mut c = Mesh::new("c");
        c.verts = vec![Vertex::default(); 2];

        let layout = VertexLayout::new(&[a, b, c], 6);
        assert_eq!(layout.offsets, vec![0, 3, 3]);
        assert_eq!(layout.total, 5);
        assert!(!layout.wide);
    }

    #[test]
    fn test_strict_limits() {
        assert!(check_strict_limits(6, 255, 255, 65535).is_ok());
        assert!(matches!(
            check_strict_limits(6, 1, 256, 10),
            Err(Error::StrictLimit { what: "material count", .. })
        ));
        assert!(matches!(
            check_strict_limits(7, 256, 1, 10),
            Err(Error::StrictLimit { what: "mesh count", .. })
        ));
        assert!(check_strict_limits(6, 1, 1, 65536).is_err());
        assert!(check_strict_limits(7, 1, 1, 65536).is_ok());
    }
}
