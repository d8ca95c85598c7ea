//! Load and save configuration.

use std::path::Path;

/// On-disk representation of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Line-oriented text (`.xmodel_export`).
    Export,
    /// LZ4-compressed tagged blocks (`.xmodel_bin`, `.xanim_bin`).
    #[default]
    Bin,
}

impl Format {
    /// Guess the format from a file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xmodel_export" | "xanim_export" => Some(Format::Export),
            "xmodel_bin" | "xanim_bin" => Some(Format::Bin),
            _ => None,
        }
    }

    /// Conventional model file extension for this format.
    pub fn model_extension(self) -> &'static str {
        match self {
            Format::Export => "xmodel_export",
            Format::Bin => "xmodel_bin",
        }
    }
}

/// Options controlling how files are read.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Split the flattened default mesh into one mesh per object.
    pub split_meshes: bool,
    /// Binary input is wrapped in the `*LZ4*` container.
    pub compressed: bool,
    /// Write the decompressed binary payload next to the input as `<stem>.dump`.
    pub dump: bool,
    /// Log container details at info level.
    pub verbose: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            split_meshes: true,
            compressed: true,
            dump: false,
            verbose: false,
        }
    }
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_split_meshes(mut self, split: bool) -> Self {
        self.split_meshes = split;
        self
    }

    pub fn with_compressed(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }

    pub fn with_dump(mut self, dump: bool) -> Self {
        self.dump = dump;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Options controlling how files are written.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub format: Format,
    /// Target version; falls back to the object's own version when `None`.
    pub version: Option<u16>,
    /// Written verbatim before the body (text) or as a comment block (binary).
    pub header_message: String,
    /// Serialize the full image dictionary instead of only the color map.
    pub extended_features: bool,
    /// Enforce format capacity limits as fatal errors.
    pub strict: bool,
    /// Log container details at info level.
    pub verbose: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            format: Format::Bin,
            version: None,
            header_message: String::new(),
            extended_features: true,
            strict: false,
            verbose: false,
        }
    }
}

impl WriteOptions {
    pub fn new(format: Format) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    /// Options for the format implied by `path`, defaulting to binary.
    pub fn for_path(path: impl AsRef<Path>) -> Self {
        Self::new(Format::from_path(path).unwrap_or_default())
    }

    pub fn with_version(mut self, version: u16) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header_message = header.into();
        self
    }

    pub fn with_extended_features(mut self, extended: bool) -> Self {
        self.extended_features = extended;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path("a/b/gun.xmodel_export"), Some(Format::Export));
        assert_eq!(Format::from_path("gun.XMODEL_BIN"), Some(Format::Bin));
        assert_eq!(Format::from_path("walk.xanim_bin"), Some(Format::Bin));
        assert_eq!(Format::from_path("gun.obj"), None);
        assert_eq!(Format::from_path("noext"), None);
    }

    #[test]
    fn test_write_options_builder() {
        let opts = WriteOptions::for_path("x.xmodel_export")
            .with_version(6)
            .with_strict(true);
        assert_eq!(opts.format, Format::Export);
        assert_eq!(opts.version, Some(6));
        assert!(opts.strict);
        assert!(opts.extended_features);
    }
}
