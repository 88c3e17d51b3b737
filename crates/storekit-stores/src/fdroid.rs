use serde::{Deserialize, Serialize};
use storekit::{Locale, PackageId, Source, SourceError, SourceInfo, StoreAdapter};

use crate::http::{ensure_found, transport_error};

pub const DEFAULT_BASE_URL: &str = "https://f-droid.org";

/// Response from F-Droid's package API.
/// `GET /api/v1/packages/{package}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FDroidPackage {
    pub package_name: String,
    #[serde(default)]
    pub suggested_version_code: i64,
    #[serde(default)]
    pub packages: Vec<FDroidVersion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FDroidVersion {
    #[serde(default)]
    pub version_name: String,
    pub version_code: i64,
}

impl FDroidPackage {
    pub fn version(&self, version_code: i64) -> Option<&FDroidVersion> {
        self.packages.iter().find(|v| v.version_code == version_code)
    }

    /// The version F-Droid recommends installing, when it is still published.
    pub fn suggested_version(&self) -> Option<&FDroidVersion> {
        self.version(self.suggested_version_code)
    }
}

/// Looks packages up in the main F-Droid repository.
pub struct FDroidAdapter {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl FDroidAdapter {
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

    pub async fn package(&self, package_id: &PackageId) -> Result<FDroidPackage, SourceError> {
        let url = format!("{}/api/v1/packages/{package_id}", self.base());
        tracing::debug!("Fetching F-Droid package {url}");

        let response = self.client.get(&url).send().await.map_err(transport_error)?;
        ensure_found(response, package_id)?
            .json()
            .await
            .map_err(|e| SourceError::unavailable(format!("invalid F-Droid response: {e}")))
    }

    /// Repository URL of one published build, or `None` when that version
    /// code is not listed for the package.
    pub fn download_link(&self, package: &FDroidPackage, version_code: i64) -> Option<String> {
        package.version(version_code).map(|v| {
            format!(
                "{}/repo/{}_{}.apk",
                self.base(),
                package.package_name,
                v.version_code
            )
        })
    }
}

#[async_trait::async_trait]
impl StoreAdapter for FDroidAdapter {
    fn source(&self) -> Source {
        Source::FDroid
    }

    async fn fetch(
        &self,
        package_id: &PackageId,
        _locale: &Locale,
    ) -> Result<SourceInfo, SourceError> {
        let package = self.package(package_id).await?;

        let download_url = self
            .download_link(&package, package.suggested_version_code)
            .ok_or_else(|| SourceError::MissingDownloadLink(package_id.clone()))?;

        let version = package
            .suggested_version()
            .map(|v| v.version_name.clone())
            .unwrap_or_default();

        Ok(SourceInfo {
            package_id: package.package_name.clone(),
            title: package.package_name.clone(),
            version,
            version_code: package.suggested_version_code.to_string(),
            download_url,
            page_url: format!("{}/packages/{}/", self.base(), package.package_name),
            signature: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FDroidPackage {
        serde_json::from_str(
            r#"{
                "packageName": "org.fdroid.fdroid",
                "suggestedVersionCode": 1019050,
                "packages": [
                    {"versionName": "1.19.1", "versionCode": 1019051},
                    {"versionName": "1.19.0", "versionCode": 1019050}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn suggested_version_is_looked_up_by_code() {
        let package = sample();
        assert_eq!(package.suggested_version().unwrap().version_name, "1.19.0");
    }

    #[test]
    fn download_link_only_for_listed_versions() {
        let adapter = FDroidAdapter::new(reqwest::Client::new());
        let package = sample();

        assert_eq!(
            adapter.download_link(&package, 1019050).as_deref(),
            Some("https://f-droid.org/repo/org.fdroid.fdroid_1019050.apk")
        );
        assert_eq!(adapter.download_link(&package, 42), None);
    }

    #[test]
    fn missing_fields_default() {
        let package: FDroidPackage =
            serde_json::from_str(r#"{"packageName": "a.b"}"#).unwrap();
        assert_eq!(package.suggested_version_code, 0);
        assert!(package.packages.is_empty());
        assert!(package.suggested_version().is_none());
    }

    #[test]
    fn base_url_override_drops_trailing_slash() {
        let adapter =
            FDroidAdapter::new(reqwest::Client::new()).with_base_url("http://127.0.0.1:9/");
        assert_eq!(adapter.base(), "http://127.0.0.1:9");
    }
}
