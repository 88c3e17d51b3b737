use serde::Serialize;

use crate::adapter::SourceInfo;
use crate::package::PackageId;
use crate::source::Source;

/// A download link chosen from exactly one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLink {
    pub package_id: String,
    pub download_url: String,
    pub source: Source,
    pub version: String,
    pub version_code: String,
    pub title: String,
    /// Bytes, or [`crate::UNKNOWN_SIZE`].
    pub file_size: i64,
}

impl ResolvedLink {
    /// Build the unified record from one store's answer.
    /// A store that does not echo the package id falls back to the requested one.
    pub fn from_source_info(
        requested: &PackageId,
        source: Source,
        info: SourceInfo,
        file_size: i64,
    ) -> Self {
        let package_id = if info.package_id.trim().is_empty() {
            requested.as_str().to_owned()
        } else {
            info.package_id
        };

        Self {
            package_id,
            download_url: info.download_url,
            source,
            version: info.version,
            version_code: info.version_code,
            title: info.title,
            file_size,
        }
    }

    pub fn has_known_size(&self) -> bool {
        self.file_size >= 0
    }
}
