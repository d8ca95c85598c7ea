//! Facial rig bones treated as cosmetic.

/// Bone names that belong to the facial rig, sorted for binary search.
pub const COSMETIC_BONE_NAMES: &[&str] = &[
    "j_brow_a01", "j_brow_a01_le", "j_brow_a01_ri", "j_brow_a03_le", "j_brow_a03_ri",
    "j_brow_a05_le", "j_brow_a05_ri", "j_brow_a07_le", "j_brow_a07_ri", "j_brow_a09_le",
    "j_brow_a09_ri", "j_brow_b01_le", "j_brow_b01_ri", "j_brow_b03_le", "j_brow_b03_ri",
    "j_brow_b05_le", "j_brow_b05_ri", "j_cheek_a01_le", "j_cheek_a01_ri", "j_cheek_a03_le",
    "j_cheek_a03_ri", "j_cheek_a05_le", "j_cheek_a05_ri", "j_cheek_a07_le",
    "j_cheek_a07_ri", "j_cheek_b01_le", "j_cheek_b01_ri", "j_cheek_b03_le",
    "j_cheek_b03_ri", "j_cheek_b05_le", "j_cheek_b05_ri", "j_cheek_b07_le",
    "j_cheek_b07_ri", "j_cheek_b09_le", "j_cheek_b09_ri", "j_cheek_c01_le",
    "j_cheek_c01_ri", "j_cheek_c03_le", "j_cheek_c03_ri", "j_cheek_c05_le",
    "j_cheek_c05_ri", "j_chin_a01", "j_chin_a01_le", "j_chin_a01_ri", "j_chin_a03_le",
    "j_chin_a03_ri", "j_chin_jaw", "j_ear_a01_le", "j_ear_a01_ri", "j_ear_a03_le",
    "j_ear_a03_ri", "j_ear_b01_le", "j_ear_b01_ri", "j_eye_a01_le", "j_eye_a01_ri",
    "j_eye_a03_le", "j_eye_a03_ri", "j_eye_a05_le", "j_eye_a05_ri", "j_eye_a07_le",
    "j_eye_a07_ri", "j_eye_a09_le", "j_eye_a09_ri", "j_eye_b01_le", "j_eye_b01_ri",
    "j_eye_b03_le", "j_eye_b03_ri", "j_eye_b05_le", "j_eye_b05_ri", "j_eyelid_bot_01_le",
    "j_eyelid_bot_01_ri", "j_eyelid_bot_03_le", "j_eyelid_bot_03_ri", "j_eyelid_bot_05_le",
    "j_eyelid_bot_05_ri", "j_eyelid_top_03_le", "j_eyelid_top_03_ri", "j_eyelid_top_05_le",
    "j_eyelid_top_05_ri", "j_eyelid_top_07_le", "j_eyelid_top_07_ri", "j_forehead_a01",
    "j_forehead_a01_le", "j_forehead_a01_ri", "j_forehead_a03_le", "j_forehead_a03_ri",
    "j_forehead_b01", "j_forehead_b01_le", "j_forehead_b01_ri", "j_forehead_b03_le",
    "j_forehead_b03_ri", "j_forehead_b05_le", "j_forehead_b05_ri", "j_forehead_b07_le",
    "j_forehead_b07_ri", "j_forehead_b09_le", "j_forehead_b09_ri", "j_jaw", "j_jaw_a01",
    "j_jaw_a01_le", "j_jaw_a01_ri", "j_jaw_a03_le", "j_jaw_a03_ri", "j_jaw_a05_le",
    "j_jaw_a05_ri", "j_jaw_a07_le", "j_jaw_a07_ri", "j_jaw_a09_le", "j_jaw_a09_ri",
    "j_jaw_b01", "j_jaw_b01_le", "j_jaw_b01_ri", "j_jaw_b03_le", "j_jaw_b03_ri",
    "j_jaw_b05_le", "j_jaw_b05_ri", "j_jaw_b07_le", "j_jaw_b07_ri", "j_jaw_b09_le",
    "j_jaw_b09_ri", "j_jaw_c01", "j_jaw_c01_le", "j_jaw_c01_ri", "j_jaw_c03_le",
    "j_jaw_c03_ri", "j_jaw_c05_le", "j_jaw_c05_ri", "j_jaw_c07_le", "j_jaw_c07_ri",
    "j_mouth_a01", "j_mouth_a01_le", "j_mouth_a01_ri", "j_mouth_a03_le", "j_mouth_a03_ri",
    "j_mouth_a05_le", "j_mouth_a05_ri", "j_mouth_a07_le", "j_mouth_a07_ri",
    "j_mouth_a09_le", "j_mouth_a09_ri", "j_mouth_b01", "j_mouth_b01_le", "j_mouth_b01_ri",
    "j_mouth_b03_le", "j_mouth_b03_ri", "j_mouth_c01", "j_mouth_c01_le", "j_mouth_c01_ri",
    "j_mouth_c03_le", "j_mouth_c03_ri", "j_mouth_c05_le", "j_mouth_c05_ri",
    "j_mouth_c07_le", "j_mouth_c07_ri", "j_mouth_inner_le", "j_mouth_inner_ri",
    "j_mouth_innerlow", "j_mouth_innerlow_le", "j_mouth_innerlow_ri", "j_mouth_innerup",
    "j_mouth_innerup_le", "j_mouth_innerup_ri", "j_nose_a01", "j_nose_a01_le",
    "j_nose_a01_ri", "j_nose_b01", "j_nose_b01_le", "j_nose_b01_ri", "j_nose_c01",
    "j_nose_c01_le", "j_nose_c01_ri", "j_nose_c03_le", "j_nose_c03_ri", "j_teeth_lower",
    "j_teeth_upper", "j_tongue", "j_uppercheek_a01_le", "j_uppercheek_a01_ri",
    "j_uppercheek_a03_le", "j_uppercheek_a03_ri", "j_uppercheek_a05_le",
    "j_uppercheek_a05_ri", "j_uppercheek_a07_le", "j_uppercheek_a07_ri",
    "j_uppercheek_a08_le", "j_uppercheek_a08_ri", "j_uppercheek_a09_le",
    "j_uppercheek_a09_ri",
];

/// Whether `name` is a known facial rig bone.
pub fn is_cosmetic_bone_name(name: &str) -> bool {
    COSMETIC_BONE_NAMES.binary_search(&name).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted() {
        assert!(COSMETIC_BONE_NAMES.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_lookup() {
        assert!(is_cosmetic_bone_name("j_jaw"));
        assert!(is_cosmetic_bone_name("j_uppercheek_a09_ri"));
        assert!(!is_cosmetic_bone_name("j_spine4"));
        assert!(!is_cosmetic_bone_name("J_JAW"));
    }
}
