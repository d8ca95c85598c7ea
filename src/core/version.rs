//! Format version handling.

use std::path::Path;

use crate::util::{Error, Result};
use super::AssetType;

/// Versions of `xmodel_export` / `xmodel_bin` this crate reads and writes.
pub const MODEL_SUPPORTED_VERSIONS: &[u16] = &[5, 6, 7];

/// Versions of `xanim_bin` this crate reads and writes.
pub const ANIM_SUPPORTED_VERSIONS: &[u16] = &[3];

/// Check a declared version against the supported set for `asset`.
pub fn validate_version(asset: AssetType, version: i32) -> Result<u16> {
    let supported = asset.supported_versions();
    match u16::try_from(version) {
        Ok(v) if supported.contains(&v) => Ok(v),
        _ => Err(Error::UnsupportedVersion { version, supported }),
    }
}

/// Pick the version to write.
///
/// The caller's choice wins, otherwise the object's current version is used.
/// On success the object's version is updated to the chosen value.
pub fn resolve_version(
    asset: AssetType,
    current: &mut Option<u16>,
    requested: Option<u16>,
) -> Result<u16> {
    let version = requested.or(*current).ok_or(Error::NoVersion)?;
    let version = validate_version(asset, version as i32)?;
    *current = Some(version);
    Ok(version)
}

/// Default header comment written at the top of exported files.
pub fn header_comment(path: impl AsRef<Path>) -> String {
    let date = option_env!("XMODEL_BUILD_DATE").unwrap_or("unknown");
    let time = option_env!("XMODEL_BUILD_TIME").unwrap_or("unknown");
    let path = path.as_ref().to_string_lossy().replace('\\', "/");
    format!(
        "// Exported using xmodel {} (built {} at {})\n// Export filename: '{}'\n",
        env!("CARGO_PKG_VERSION"),
        date,
        time,
        path
    )
}
