use serde::{Deserialize, Serialize};
use storekit::{Locale, PackageId, Source, SourceError, SourceInfo, StoreAdapter};

use crate::http::{ensure_found, transport_error};

pub const DEFAULT_BASE_URL: &str = "https://ws75.aptoide.com";

/// Envelope returned by `GET /api/7/app/getMeta`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AptoideResponse {
    pub info: AptoideInfo,
    pub data: AptoideApp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AptoideInfo {
    pub status: String,
}

/// Application metadata. Every field defaults when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AptoideApp {
    pub id: i64,
    pub name: String,
    #[serde(rename = "package")]
    pub package_name: String,
    pub uname: String,
    pub size: i64,
    pub icon: String,
    pub graphic: String,
    pub added: String,
    pub modified: String,
    pub updated: String,
    pub main_package: Option<String>,
    pub developer: AptoideDeveloper,
    pub store: AptoideStore,
    pub file: AptoideFile,
    pub stats: AptoideStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AptoideDeveloper {
    pub id: i64,
    pub name: String,
    pub website: String,
    pub email: String,
    pub privacy: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AptoideStore {
    pub id: i64,
    pub name: String,
    pub avatar: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AptoideFile {
    pub vername: String,
    pub vercode: i64,
    pub md5sum: String,
    pub filesize: i64,
    pub signature: AptoideSignature,
    pub added: String,
    pub path: String,
    pub path_alt: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AptoideSignature {
    pub sha1: String,
    pub owner: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AptoideStats {
    pub downloads: i64,
    pub pdownloads: i64,
    pub rating: AptoideRating,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AptoideRating {
    pub avg: f64,
    pub total: i64,
}

impl AptoideSignature {
    /// SHA-1 as plain lowercase hex (`AB:CD:..` becomes `abcd..`).
    pub fn normalized_sha1(&self) -> String {
        self.sha1.replace(':', "").to_lowercase()
    }
}

impl AptoideApp {
    /// Primary file path, falling back to the mirror.
    pub fn download_link(&self) -> &str {
        if self.file.path.trim().is_empty() {
            &self.file.path_alt
        } else {
            &self.file.path
        }
    }
}

/// Queries Aptoide's public metadata web service.
pub struct AptoideAdapter {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl AptoideAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    fn base(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub async fn by_package_name(
        &self,
        package_id: &PackageId,
        language: &str,
    ) -> Result<AptoideApp, SourceError> {
        self.get_meta(("package_name", package_id.as_str()), language, package_id)
            .await
    }

    pub async fn by_app_id(&self, app_id: i64, language: &str) -> Result<AptoideApp, SourceError> {
        let id = app_id.to_string();
        self.get_meta(("app_id", id.as_str()), language, &PackageId::new(id.clone()))
            .await
    }

    pub async fn by_md5sum(&self, md5sum: &str, language: &str) -> Result<AptoideApp, SourceError> {
        self.get_meta(("apk_md5sum", md5sum), language, &PackageId::new(md5sum))
            .await
    }

    async fn get_meta(
        &self,
        key: (&str, &str),
        language: &str,
        lookup: &PackageId,
    ) -> Result<AptoideApp, SourceError> {
        let url = format!("{}/api/7/app/getMeta", self.base());
        tracing::debug!("Fetching Aptoide metadata for {}={}", key.0, key.1);

        let response = self
            .client
            .get(&url)
            .query(&[key, ("language", language)])
            .send()
            .await
            .map_err(transport_error)?;

        let body: AptoideResponse = ensure_found(response, lookup)?
            .json()
            .await
            .map_err(|e| SourceError::unavailable(format!("invalid Aptoide response: {e}")))?;

        Ok(body.data)
    }
}

#[async_trait::async_trait]
impl StoreAdapter for AptoideAdapter {
    fn source(&self) -> Source {
        Source::Aptoide
    }

    async fn fetch(
        &self,
        package_id: &PackageId,
        locale: &Locale,
    ) -> Result<SourceInfo, SourceError> {
        let app = self.by_package_name(package_id, &locale.language).await?;

        let page_url = if app.uname.is_empty() {
            String::new()
        } else {
            format!("https://{}.en.aptoide.com/app", app.uname)
        };

        Ok(SourceInfo {
            package_id: app.package_name.clone(),
            title: app.name.clone(),
            version: app.file.vername.clone(),
            version_code: app.file.vercode.to_string(),
            download_url: app.download_link().to_owned(),
            page_url,
            signature: app.file.signature.normalized_sha1(),
        })
    }
}
