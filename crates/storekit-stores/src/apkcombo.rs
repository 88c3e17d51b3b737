use std::sync::OnceLock;

use regex::Regex;
use scraper::Html;
use serde::Serialize;
use storekit::{Locale, PackageId, Source, SourceError, SourceInfo, StoreAdapter};

use crate::extract::{absolutize, cached_regex, capture, fill_first, select_attr, select_text};
use crate::http::fetch_page;

pub const DEFAULT_BASE_URL: &str = "https://apkcombo.com";

/// What the APKCombo download page tells us about a package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApkComboApp {
    pub package_id: String,
    pub title: String,
    pub version: String,
    pub version_code: String,
    pub download_link: String,
    pub url: String,
}

/// Scrapes APKCombo, following its script-driven download endpoint when the
/// first page only carries a loader.
pub struct ApkComboAdapter {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl ApkComboAdapter {
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

    /// The `/app` path redirects to the canonical slug.
    pub fn page_url(&self, package_id: &PackageId) -> String {
        format!("{}/app/{package_id}/download/apk", self.base())
    }

    pub async fn app(&self, package_id: &PackageId) -> Result<ApkComboApp, SourceError> {
        let url = self.page_url(package_id);
        tracing::debug!("Fetching APKCombo page {url}");

        let initial = fetch_page(self.client.get(&url), package_id).await?;
        let html = self.follow_dynamic_content(initial, package_id).await;

        let mut app = parse_page(&html, self.base());
        app.package_id = package_id.as_str().to_owned();
        app.url = url;
        Ok(app)
    }

    /// Swap the loader page for the variant list it would fetch in a browser.
    /// Any failure keeps the first page.
    async fn follow_dynamic_content(&self, initial: String, package_id: &PackageId) -> String {
        if has_direct_links(&initial) {
            tracing::debug!("APKCombo page for {package_id} has direct download links");
            return initial;
        }
        if !(initial.contains("fetchData") || initial.contains("app-details")) {
            return initial;
        }

        let Some(endpoint) = extract_download_endpoint(&initial, package_id.as_str(), self.base())
        else {
            tracing::warn!("Could not find the APKCombo download endpoint for {package_id}");
            return initial;
        };

        tracing::debug!("Posting to APKCombo endpoint {endpoint}");
        let response = self
            .client
            .post(&endpoint)
            .form(&[("package_name", package_id.as_str()), ("version", "")])
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => match resp.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!("Failed to read APKCombo endpoint body: {e}");
                    initial
                }
            },
            Ok(resp) => {
                tracing::warn!("APKCombo endpoint answered {}", resp.status());
                initial
            }
            Err(e) => {
                tracing::warn!("APKCombo endpoint request failed: {e}");
                initial
            }
        }
    }
}

#[async_trait::async_trait]
impl StoreAdapter for ApkComboAdapter {
    fn source(&self) -> Source {
        Source::ApkCombo
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
            signature: String::new(),
        })
    }
}

fn has_direct_links(html: &str) -> bool {
    html.contains("class=\"variant\"")
        && (html.contains("/r2?u=") || html.contains(".apk") || html.contains(".xapk"))
}

/// Read the first variant from a download page or endpoint response.
pub fn parse_page(html: &str, base: &str) -> ApkComboApp {
    let doc = Html::parse_document(html);

    let mut app = ApkComboApp::default();
    fill_first(
        &mut app.download_link,
        select_attr(&doc, r#"a[class*="variant"]"#, "href").map(|href| clean_download_link(base, &href)),
    );
    fill_first(&mut app.version, select_text(&doc, r#"span[class*="vername"]"#));
    fill_first(
        &mut app.version_code,
        select_text(&doc, r#"span[class*="vercode"]"#).map(|code| {
            code.trim_start_matches('(')
                .trim_end_matches(')')
                .trim()
                .to_owned()
        }),
    );
    fill_first(&mut app.title, select_text(&doc, "h1"));
    app
}

/// Locate the POST endpoint the page script would call for its variant list.
fn extract_download_endpoint(html: &str, package_id: &str, base: &str) -> Option<String> {
    static XID: OnceLock<Option<Regex>> = OnceLock::new();
    static DIRECT_DL: OnceLock<Option<Regex>> = OnceLock::new();
    static CONCAT: OnceLock<Option<Regex>> = OnceLock::new();
    static SCRIPT: OnceLock<Option<Regex>> = OnceLock::new();

    let pkg = regex::escape(package_id);
    let join = |path: &str| {
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    };

    if let Some(xid) = capture(cached_regex(&XID, r#"var xid = "([^"]+)""#), html) {
        let app_path = Regex::new(&format!(r#"fetchData\("([^"]+/{pkg}/)" \+ xid \+ "/dl"\)"#)).ok();
        if let Some(path) = capture(app_path.as_ref(), html) {
            return Some(join(&format!("{path}{xid}/dl")));
        }

        let any_path = Regex::new(&format!(r#""/([^"/]+/{pkg}/)""#)).ok();
        if let Some(path) = capture(any_path.as_ref(), html) {
            return Some(join(&format!("/{path}{xid}/dl")));
        }
    }

    let direct = [
        cached_regex(&DIRECT_DL, r#"fetchData\("([^"]+/dl)""#),
        cached_regex(&CONCAT, r#"fetchData\("([^"]+)" \+ [^"]+ \+ "([^"]+)""#),
    ];
    for re in direct {
        if let Some(endpoint) = capture(re, html) {
            if endpoint.contains(package_id) || endpoint.ends_with("/dl") {
                return Some(if endpoint.starts_with('/') {
                    join(&endpoint)
                } else {
                    endpoint
                });
            }
        }
    }

    let dl_in_script = Regex::new(&format!(r#"["']([^"']*{pkg}[^"']*dl)["']"#)).ok();
    let scripts = cached_regex(&SCRIPT, r"(?s)<script[^>]*>(.*?)</script>")?;
    scripts
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|script| script.contains("fetchData") && script.contains(package_id))
        .find_map(|script| capture(dl_in_script.as_ref(), script))
        .map(|endpoint| join(&endpoint))
}

/// Turn a variant href into a direct URL.
///
/// `/r2?u=<encoded>` redirects are unwrapped; a malformed escape leaves the
/// link unchanged. Everything else is made absolute against `base`.
pub fn clean_download_link(base: &str, link: &str) -> String {
    if let Some(query) = link.strip_prefix("/r2?") {
        return redirect_target(query)
            .map(|target| absolutize(base, &target))
            .unwrap_or_else(|| link.to_owned());
    }
    absolutize(base, link)
}

/// The `u` parameter of an `/r2?` query. `None` when it is missing or any
/// `%` is not followed by two hex digits.
fn redirect_target(query: &str) -> Option<String> {
    static ESCAPES: OnceLock<Option<Regex>> = OnceLock::new();

    if !cached_regex(&ESCAPES, r"^(?:[^%]|%[0-9A-Fa-f]{2})*$")?.is_match(query) {
        return None;
    }
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "u")
        .map(|(_, value)| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
