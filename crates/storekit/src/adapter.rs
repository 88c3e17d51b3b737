use std::sync::Arc;

use serde::Serialize;

use crate::package::{Locale, PackageId};
use crate::source::Source;

/// Errors a single store can report for a lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// The store answered the canonical lookup with a non-success status.
    #[error("package {package_id} does not exist or is not accessible (HTTP {status})")]
    NotFound { package_id: PackageId, status: u16 },

    /// Transport failure or a response that could not be decoded.
    #[error("{0}")]
    Unavailable(String),

    /// The store knows the package but offers nothing to download.
    #[error("no download link available for package {0}")]
    MissingDownloadLink(PackageId),
}

impl SourceError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

/// What one store reports about a package.
///
/// Fields a store does not publish are left empty rather than optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    pub package_id: String,
    pub title: String,
    pub version: String,
    pub version_code: String,
    /// Absolute URL of the downloadable artifact.
    pub download_url: String,
    /// Store page the data was read from.
    pub page_url: String,
    /// Lowercase hex SHA-1 of the signing certificate, when published.
    pub signature: String,
}

/// A store that can look up a package by its identifier.
#[async_trait::async_trait]
pub trait StoreAdapter: Send + Sync {
    /// The store this adapter talks to.
    fn source(&self) -> Source;

    /// Look up one package. Performs one logical fetch sequence.
    async fn fetch(&self, package_id: &PackageId, locale: &Locale)
        -> Result<SourceInfo, SourceError>;
}

#[async_trait::async_trait]
impl<T: StoreAdapter + ?Sized> StoreAdapter for Arc<T> {
    fn source(&self) -> Source {
        (**self).source()
    }

    async fn fetch(
        &self,
        package_id: &PackageId,
        locale: &Locale,
    ) -> Result<SourceInfo, SourceError> {
        (**self).fetch(package_id, locale).await
    }
}
