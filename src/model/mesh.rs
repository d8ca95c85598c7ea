//! Mesh geometry: vertices, weights and faces.

use std::borrow::Cow;

use smallvec::SmallVec;

use crate::util::{Vec2, Vec3, Vec4};

/// Most weights a vertex may carry in either format.
pub const MAX_WEIGHTS: usize = 15;

/// Skeletal influence of one bone on a vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weight {
    pub bone: usize,
    pub influence: f32,
}

impl Weight {
    pub fn new(bone: usize, influence: f32) -> Self {
        Self { bone, influence }
    }
}

/// Inline storage for the common case of a handful of influences.
pub type Weights = SmallVec<[Weight; 4]>;

/// A mesh vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vertex {
    pub offset: Vec3,
    pub weights: Weights,
}

impl Vertex {
    pub fn new(offset: Vec3) -> Self {
        Self {
            offset,
            weights: Weights::new(),
        }
    }

    pub fn with_weight(mut self, bone: usize, influence: f32) -> Self {
        self.weights.push(Weight::new(bone, influence));
        self
    }

    /// Scale the influences so their squares sum to 1. Zero weights are left alone.
    pub fn normalize_weights(&mut self) {
        l2_normalize(&mut self.weights);
    }

    /// Keep the [`MAX_WEIGHTS`] largest influences and renormalize.
    ///
    /// Returns true when weights were dropped.
    pub fn fix_too_many_weights(&mut self) -> bool {
        if self.weights.len() <= MAX_WEIGHTS {
            return false;
        }
        self.weights = strongest(&self.weights).into_iter().collect();
        true
    }

    /// Weights as they are written: capped to [`MAX_WEIGHTS`].
    pub fn capped_weights(&self) -> Cow<'_, [Weight]> {
        if self.weights.len() <= MAX_WEIGHTS {
            Cow::Borrowed(&self.weights[..])
        } else {
            Cow::Owned(strongest(&self.weights))
        }
    }
}

fn strongest(weights: &[Weight]) -> Vec<Weight> {
    let mut kept = weights.to_vec();
    kept.sort_by(|a, b| b.influence.abs().total_cmp(&a.influence.abs()));
    kept.truncate(MAX_WEIGHTS);
    l2_normalize(&mut kept);
    kept
}

fn l2_normalize(weights: &mut [Weight]) {
    let length = weights
        .iter()
        .map(|w| w.influence * w.influence)
        .sum::<f32>()
        .sqrt();
    if length > 0.0 {
        let inv = 1.0 / length;
        for w in weights.iter_mut() {
            w.influence *= inv;
        }
    }
}

/// One corner of a triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceVertex {
    /// Index into the owning mesh's vertex list.
    pub vertex: usize,
    pub normal: Vec3,
    /// RGBA in `[0, 1]`.
    pub color: Vec4,
    pub uv: Vec2,
}

impl Default for FaceVertex {
    fn default() -> Self {
        Self {
            vertex: 0,
            normal: Vec3::Z,
            color: Vec4::ONE,
            uv: Vec2::ZERO,
        }
    }
}

impl FaceVertex {
    pub fn new(vertex: usize, normal: Vec3, uv: Vec2) -> Self {
        Self {
            vertex,
            normal,
            uv,
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }
}

/// A triangle.
///
/// `mesh_id` and `material_id` are model-wide indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub mesh_id: usize,
    pub material_id: usize,
    pub indices: [FaceVertex; 3],
}

impl Face {
    pub fn new(mesh_id: usize, material_id: usize, indices: [FaceVertex; 3]) -> Self {
        Self {
            mesh_id,
            material_id,
            indices,
        }
    }

    /// True when the three corners reference distinct vertices.
    pub fn is_valid(&self) -> bool {
        let [a, b, c] = [
            self.indices[0].vertex,
            self.indices[1].vertex,
            self.indices[2].vertex,
        ];
        a != b && a != c && b != c
    }

    /// Swap corners 1 and 2.
    pub fn flip_winding(&mut self) {
        self.indices.swap(1, 2);
    }
}

/// A named mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub verts: Vec<Vertex>,
    pub faces: Vec<Face>,
    /// Per bone: `(local vertex, influence)` pairs. Filled when splitting.
    pub bone_groups: Vec<Vec<(usize, f32)>>,
    /// Per material: local vertex indices. Filled when splitting.
    pub material_groups: Vec<Vec<usize>>,
}

impl Mesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Faces that reference the same vertex more than once.
    pub fn degenerate_faces(&self) -> impl Iterator<Item = (usize, &Face)> {
        self.faces.iter().enumerate().filter(|(_, f)| !f.is_valid())
    }
}
