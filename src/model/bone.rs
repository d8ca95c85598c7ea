//! Skeleton bones.

use crate::util::{Mat3, Vec3};

use super::cosmetic::is_cosmetic_bone_name;

/// A bone in the model skeleton.
///
/// `parent` is an index into the owning model's bone list, `-1` for roots.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: String,
    pub parent: i32,
    /// World-space translation.
    pub offset: Vec3,
    /// Rotation basis as three rows (X, Y, Z).
    pub matrix: [Vec3; 3],
    pub scale: Vec3,
    /// Facial-rig bone, sorted after all regular bones in version 7 output.
    pub cosmetic: bool,
}

impl Default for Bone {
    fn default() -> Self {
        Self {
            name: String::new(),
            parent: -1,
            offset: Vec3::ZERO,
            matrix: [Vec3::X, Vec3::Y, Vec3::Z],
            scale: Vec3::ONE,
            cosmetic: false,
        }
    }
}

impl Bone {
    pub fn new(name: impl Into<String>, parent: i32) -> Self {
        Self {
            name: name.into(),
            parent,
            ..Default::default()
        }
    }

    pub fn with_cosmetic(mut self, cosmetic: bool) -> Self {
        self.cosmetic = cosmetic;
        self
    }

    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    /// Set the rotation rows from a column-major matrix.
    pub fn with_rotation(mut self, rotation: Mat3) -> Self {
        let t = rotation.transpose();
        self.matrix = [t.x_axis, t.y_axis, t.z_axis];
        self
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent < 0
    }

    /// Mark the bone cosmetic when its name is a known facial-rig bone.
    pub fn mark_cosmetic_by_name(&mut self) -> bool {
        self.cosmetic = is_cosmetic_bone_name(&self.name);
        self.cosmetic
    }
}
