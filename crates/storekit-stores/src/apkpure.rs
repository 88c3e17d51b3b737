use std::sync::OnceLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde::Serialize;
use storekit::{Locale, PackageId, Source, SourceError, SourceInfo, StoreAdapter};

use crate::extract::{cached_regex, capture, fill_first, select_text};
use crate::http::fetch_page;

pub const DEFAULT_BASE_URL: &str = "https://apkpure.com";
pub const DEFAULT_DOWNLOAD_BASE_URL: &str = "https://d.apkpure.com/b/XAPK";

const UNKNOWN_TITLE: &str = "Unknown App";

/// What the APKPure download page tells us about a package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApkPureApp {
    pub package_id: String,
    pub title: String,
    pub version: String,
    pub version_code: String,
    pub signature: String,
    pub download_link: String,
    pub url: String,
}

/// Scrapes the APKPure download page and links to its direct-download host.
pub struct ApkPureAdapter {
    client: reqwest::Client,
    base_url: Option<String>,
    download_base_url: Option<String>,
}

impl ApkPureAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: None,
            download_base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_download_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.download_base_url = Some(base_url.into());
        self
    }

    fn base(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    fn download_base(&self) -> &str {
        self.download_base_url
            .as_deref()
            .unwrap_or(DEFAULT_DOWNLOAD_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn page_url(&self, package_id: &PackageId) -> String {
        format!("{}/app/{package_id}/download", self.base())
    }

    /// Direct link to a build; a blank version means the latest one.
    pub fn download_url(&self, package_id: &PackageId, version: &str) -> String {
        let version = if version.trim().is_empty() {
            "latest"
        } else {
            version.trim()
        };
        format!("{}/{package_id}?version={version}", self.download_base())
    }

    pub async fn app(&self, package_id: &PackageId) -> Result<ApkPureApp, SourceError> {
        let url = self.page_url(package_id);
        tracing::debug!("Fetching APKPure page {url}");

        let html = fetch_page(self.client.get(&url), package_id).await?;
        tracing::debug!("APKPure page for {package_id} is {} bytes", html.len());

        let mut app = parse_page(&html);
        app.package_id = package_id.as_str().to_owned();
        app.download_link = self.download_url(package_id, "latest");
        app.url = url;
        Ok(app)
    }
}

#[async_trait::async_trait]
impl StoreAdapter for ApkPureAdapter {
    fn source(&self) -> Source {
        Source::ApkPure
    }

    async fn fetch(
        &self,
        package_id: &PackageId,
        _locale: &Locale,
    ) -> Result<SourceInfo, SourceError> {
        let app = self.app(package_id).await?;
        Ok(SourceInfo {
            package_id: app.package_id,
            title: app.title,
            version: app.version,
            version_code: app.version_code,
            download_url: app.download_link,
            page_url: app.url,
            signature: app.signature,
        })
    }
}

/// Read the page fields. Location fields are left for the caller.
pub fn parse_page(html: &str) -> ApkPureApp {
    let doc = Html::parse_document(html);

    let mut title = extract_title(&doc);
    if title.is_empty() {
        title = UNKNOWN_TITLE.to_owned();
    }

    ApkPureApp {
        title,
        version: extract_version(&doc),
        version_code: extract_version_code(&doc, html),
        signature: extract_signature(html),
        ..ApkPureApp::default()
    }
}

fn extract_title(doc: &Html) -> String {
    let mut title = String::new();
    fill_first(&mut title, select_text(doc, r#"h1[class*="name"]"#));
    fill_first(&mut title, select_text(doc, "title"));
    title.replace(" - APK Download", "").trim().to_owned()
}

fn extract_version(doc: &Html) -> String {
    let mut version = String::new();
    fill_first(&mut version, select_text(doc, r#"div[class*="version"] > span"#));
    fill_first(&mut version, select_text(doc, r#"span[class*="vername"]"#));
    version
}

fn strip_parens(text: String) -> String {
    text.trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim()
        .to_owned()
}

fn extract_version_code(doc: &Html, html: &str) -> String {
    static HREF_CODE: OnceLock<Option<Regex>> = OnceLock::new();
    static ANY_CODE: OnceLock<Option<Regex>> = OnceLock::new();

    let mut code = String::new();
    fill_first(
        &mut code,
        select_text(doc, r#"span[class*="vercode"]"#).map(strip_parens),
    );
    fill_first(&mut code, variant_code(doc));
    fill_first(
        &mut code,
        capture(
            cached_regex(&HREF_CODE, r#"href="[^"]*versionCode=([0-9]+)[^"]*""#),
            html,
        ),
    );
    fill_first(
        &mut code,
        capture(cached_regex(&ANY_CODE, r"\(\s*([0-9]{3,})\s*\)"), html),
    );
    code
}

/// First `*code*` span, in document order, whose text is `(digits)`.
fn variant_code(doc: &Html) -> Option<String> {
    static VARIANT_CODE: OnceLock<Option<Regex>> = OnceLock::new();

    let selector = Selector::parse(r#"span[class*="code"]"#).ok()?;
    let re = cached_regex(&VARIANT_CODE, r"^\(\s*([0-9]+)\s*\)$");
    doc.select(&selector)
        .find_map(|el| capture(re, el.text().collect::<String>().trim()))
}

fn extract_signature(html: &str) -> String {
    static MORE_INFO: OnceLock<Option<Regex>> = OnceLock::new();
    static VARIANT_DIALOG: OnceLock<Option<Regex>> = OnceLock::new();

    let mut signature = String::new();
    fill_first(
        &mut signature,
        capture(
            cached_regex(
                &MORE_INFO,
                r#"(?i)Signature</div>\s*<div[^>]*class="value[^"]*"[^>]*>\s*([a-f0-9]{8,})\s*</div>"#,
            ),
            html,
        ),
    );
    fill_first(
        &mut signature,
        capture(
            cached_regex(
                &VARIANT_DIALOG,
                r#"(?i)<span[^>]*class="label"[^>]*>\s*Signature\s*</span>\s*<span[^>]*class="value"[^>]*>\s*([a-f0-9]{8,})\s*</span>"#,
            ),
            html,
        ),
    );
    signature.to_lowercase()
}
