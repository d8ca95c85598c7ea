//! Materials and their image references.

use std::fmt;

use crate::util::{Vec2, Vec4};

/// Texture slot key in an image reference string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageSlot {
    Color,
    Normal,
    Specular,
    Cosine,
    Gloss,
    Detail,
    Other(String),
}

impl ImageSlot {
    /// Parse a slot key. Keys are case-insensitive.
    pub fn from_key(key: &str) -> Self {
        let key = key.to_lowercase();
        match key.as_str() {
            "color" => ImageSlot::Color,
            "normal" => ImageSlot::Normal,
            "specular" => ImageSlot::Specular,
            "cosine" => ImageSlot::Cosine,
            "gloss" => ImageSlot::Gloss,
            "detail" => ImageSlot::Detail,
            _ => ImageSlot::Other(key),
        }
    }

    pub fn as_key(&self) -> &str {
        match self {
            ImageSlot::Color => "color",
            ImageSlot::Normal => "normal",
            ImageSlot::Specular => "specular",
            ImageSlot::Cosine => "cosine",
            ImageSlot::Gloss => "gloss",
            ImageSlot::Detail => "detail",
            ImageSlot::Other(key) => key,
        }
    }
}

impl fmt::Display for ImageSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

/// Ordered slot to image mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Images(Vec<(ImageSlot, String)>);

impl Images {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapping with only a color map.
    pub fn color(path: impl Into<String>) -> Self {
        let mut images = Self::new();
        images.insert(ImageSlot::Color, path);
        images
    }

    /// Set a slot, keeping its original position when already present.
    pub fn insert(&mut self, slot: ImageSlot, path: impl Into<String>) {
        let path = path.into();
        match self.0.iter_mut().find(|(s, _)| *s == slot) {
            Some(entry) => entry.1 = path,
            None => self.0.push((slot, path)),
        }
    }

    pub fn get(&self, slot: &ImageSlot) -> Option<&str> {
        self.0.iter().find(|(s, _)| s == slot).map(|(_, p)| p.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ImageSlot, &str)> {
        self.0.iter().map(|(s, p)| (s, p.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse an image reference string.
    ///
    /// The string is a space separated list of `key:value` pairs. Spaces
    /// around the colon are allowed. A string with no pairs is a bare color
    /// map path; an empty string maps color to `$none.tga`.
    pub fn from_ref_string(s: &str) -> Self {
        if s.is_empty() {
            return Self::color("$none.tga");
        }

        let tokens: Vec<&str> = s.split_whitespace().collect();
        let mut images = Self::new();
        let mut i = 0;
        while i < tokens.len() {
            let tok = tokens[i];
            i += 1;

            // The key is at least one character long, so a leading colon is part of it.
            let (key, rest) = match tok.get(1..).and_then(|t| t.find(':')) {
                Some(at) => (&tok[..at + 1], &tok[at + 2..]),
                None => match tokens.get(i) {
                    Some(next) if next.starts_with(':') => {
                        i += 1;
                        (tok, &next[1..])
                    }
                    _ => continue,
                },
            };

            let value = if !rest.is_empty() {
                rest
            } else if let Some(next) = tokens.get(i) {
                i += 1;
                next
            } else {
                continue;
            };
            images.insert(ImageSlot::from_key(key), value);
        }

        if images.is_empty() {
            return Self::color(s);
        }
        images
    }

    /// Serialize for a material record.
    ///
    /// With `extended` every slot is written as `key:value`; otherwise only the
    /// color map (or the first image) is written.
    pub fn to_ref_string(&self, extended: bool) -> String {
        if extended {
            return self
                .iter()
                .map(|(slot, path)| format!("{}:{}", slot, path))
                .collect::<Vec<_>>()
                .join(" ");
        }
        self.get(&ImageSlot::Color)
            .or_else(|| self.0.first().map(|(_, p)| p.as_str()))
            .unwrap_or_default()
            .to_string()
    }
}

/// A surface material with the shading attributes both formats carry.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    /// Shader family, e.g. `lambert` or `phong`.
    pub material_type: String,
    pub images: Images,
    pub color: Vec4,
    pub color_ambient: Vec4,
    pub color_specular: Vec4,
    pub color_reflective: Vec4,
    pub transparency: Vec4,
    pub incandescence: Vec4,
    pub coeffs: Vec2,
    /// Glow amount and glow type.
    pub glow: (f32, i32),
    /// Refraction limit and refractive index.
    pub refractive: (i32, f32),
    /// Reflection limit and reflectivity.
    pub reflective: (i32, f32),
    pub blinn: Vec2,
    pub phong: f32,
}

impl Material {
    pub fn new(name: impl Into<String>, material_type: impl Into<String>, images: Images) -> Self {
        Self {
            name: name.into(),
            material_type: material_type.into(),
            images,
            color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            color_ambient: Vec4::new(0.0, 0.0, 0.0, 1.0),
            color_specular: Vec4::new(-1.0, -1.0, -1.0, 1.0),
            color_reflective: Vec4::new(-1.0, -1.0, -1.0, 1.0),
            transparency: Vec4::new(0.0, 0.0, 0.0, 1.0),
            incandescence: Vec4::new(0.0, 0.0, 0.0, 1.0),
            coeffs: Vec2::new(0.8, 0.0),
            glow: (0.0, 0),
            refractive: (6, 1.0),
            reflective: (-1, 1.0),
            blinn: Vec2::new(-1.0, -1.0),
            phong: -1.0,
        }
    }

    /// Material synthesized for legacy version 5 data, which has no name or type.
    pub fn legacy(index: usize, images: Images) -> Self {
        Self::new(format!("Material_{}", index), "Lambert", images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(images: &Images) -> Vec<(String, String)> {
        images
            .iter()
            .map(|(s, p)| (s.to_string(), p.to_string()))
            .collect()
    }

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn test_parse_pairs() {
        let images = Images::from_ref_string("color:gun_c.tga NORMAL:gun_n.tga");
        assert_eq!(
            pairs(&images),
            vec![pair("color", "gun_c.tga"), pair("normal", "gun_n.tga")]
        );
        assert_eq!(images.get(&ImageSlot::Normal), Some("gun_n.tga"));
    }

    #[test]
    fn test_parse_spaced_colon() {
        let images = Images::from_ref_string("color : a.tga gloss: b.tga spec :c.tga");
        assert_eq!(
            pairs(&images),
            vec![pair("color", "a.tga"), pair("gloss", "b.tga"), pair("spec", "c.tga")]
        );
    }

    #[test]
    fn test_parse_fallbacks() {
        assert_eq!(pairs(&Images::from_ref_string("")), vec![pair("color", "$none.tga")]);
        assert_eq!(pairs(&Images::from_ref_string("gun.tga")), vec![pair("color", "gun.tga")]);
        assert_eq!(pairs(&Images::from_ref_string(":gun.tga")), vec![pair("color", ":gun.tga")]);
        assert_eq!(pairs(&Images::from_ref_string("color:")), vec![pair("color", "color:")]);
    }

    #[test]
    fn test_value_may_contain_colon() {
        let images = Images::from_ref_string("color:c:/tex/a.tga");
        assert_eq!(images.get(&ImageSlot::Color), Some("c:/tex/a.tga"));
    }

    #[test]
    fn test_serialize() {
        let mut images = Images::color("a.tga");
        images.insert(ImageSlot::Normal, "b.tga");
        assert_eq!(images.to_ref_string(true), "color:a.tga normal:b.tga");
        assert_eq!(images.to_ref_string(false), "a.tga");

        let mut only_normal = Images::new();
        only_normal.insert(ImageSlot::Normal, "n.tga");
        assert_eq!(only_normal.to_ref_string(false), "n.tga");
        assert_eq!(Images::new().to_ref_string(false), "");
    }

    #[test]
    fn test_material_defaults() {
        let m = Material::legacy(3, Images::color("x.tga"));
        assert_eq!(m.name, "Material_3");
        assert_eq!(m.material_type, "Lambert");
        assert_eq!(m.coeffs, Vec2::new(0.8, 0.0));
        assert_eq!(m.refractive, (6, 1.0));
        assert_eq!(m.reflective, (-1, 1.0));
        assert_eq!(m.color_specular, Vec4::new(-1.0, -1.0, -1.0, 1.0));
        assert_eq!(m.phong, -1.0);
    }
}
