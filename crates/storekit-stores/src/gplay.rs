use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde::Serialize;
use serde_json::Value;
use storekit::{Locale, PackageId, Source, SourceError, SourceInfo, StoreAdapter};

use crate::extract::{cached_regex, capture, decode_html};
use crate::http::fetch_page;

pub const DEFAULT_BASE_URL: &str = "https://play.google.com";

const VARIES_WITH_DEVICE: &str = "Varies with device";

/// Details shown on a Google Play store page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GooglePlayApp {
    pub app_id: String,
    pub url: String,
    pub title: String,
    pub summary: String,
    pub description: String,
    #[serde(rename = "descriptionHTML")]
    pub description_html: String,
    pub installs: String,
    pub min_installs: i64,
    pub real_installs: i64,
    pub score: f64,
    pub ratings: i64,
    pub reviews: i64,
    pub price: f64,
    pub free: bool,
    pub currency: String,
    pub developer: String,
    pub developer_id: String,
    pub developer_email: String,
    pub developer_website: String,
    pub genre: String,
    pub genre_id: String,
    pub icon: String,
    pub header_image: String,
    pub screenshots: Vec<String>,
    pub content_rating: String,
    pub contains_ads: bool,
    pub released: String,
    /// Unix seconds.
    pub updated: i64,
    pub version: String,
}

/// Reads public app details from Google Play. Play serves no APK files, so
/// as a store adapter it reports metadata with an empty download URL.
pub struct GooglePlayAdapter {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl GooglePlayAdapter {
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

    pub fn page_url(&self, package_id: &PackageId, locale: &Locale) -> String {
        format!(
            "{}/store/apps/details?id={package_id}&hl={}&gl={}",
            self.base(),
            locale.language,
            locale.country
        )
    }

    pub async fn details(
        &self,
        package_id: &PackageId,
        locale: &Locale,
    ) -> Result<GooglePlayApp, SourceError> {
        let request = self
            .client
            .get(format!("{}/store/apps/details", self.base()))
            .query(&[
                ("id", package_id.as_str()),
                ("hl", locale.language.as_str()),
                ("gl", locale.country.as_str()),
            ]);
        tracing::debug!("Fetching Google Play details for {package_id}");

        let html = fetch_page(request, package_id).await?;
        let datasets = parse_datasets(&html);
        tracing::debug!(
            "Google Play page for {package_id} carries {} datasets",
            datasets.len()
        );

        let detail = datasets.get("ds:5").ok_or_else(|| {
            SourceError::unavailable(format!(
                "Google Play page for {package_id} has no app details"
            ))
        })?;

        let mut app = app_from_details(detail);
        app.app_id = package_id.as_str().to_owned();
        app.url = self.page_url(package_id, locale);
        Ok(app)
    }
}

#[async_trait::async_trait]
impl StoreAdapter for GooglePlayAdapter {
    fn source(&self) -> Source {
        Source::GooglePlay
    }

    async fn fetch(
        &self,
        package_id: &PackageId,
        locale: &Locale,
    ) -> Result<SourceInfo, SourceError> {
        let app = self.details(package_id, locale).await?;
        Ok(SourceInfo {
            package_id: app.app_id,
            title: app.title,
            version: app.version,
            version_code: String::new(),
            download_url: String::new(),
            page_url: app.url,
            signature: String::new(),
        })
    }
}

/// Collect `AF_initDataCallback` payloads keyed by their `ds:N` name.
/// Payloads that are not valid JSON are skipped.
pub fn parse_datasets(html: &str) -> HashMap<String, Value> {
    static KEY: OnceLock<Option<Regex>> = OnceLock::new();
    static VALUE: OnceLock<Option<Regex>> = OnceLock::new();

    let Ok(script) = Selector::parse("script") else {
        return HashMap::new();
    };
    let doc = Html::parse_document(html);

    doc.select(&script)
        .map(|el| el.text().collect::<String>())
        .filter(|text| text.contains("AF_initDataCallback"))
        .filter_map(|text| {
            let key = capture(cached_regex(&KEY, r"(ds:\d+)"), &text)?;
            let raw = capture(
                cached_regex(&VALUE, r"data:([\s\S]*?),\s*sideChannel:"),
                &text,
            )?;
            match serde_json::from_str::<Value>(&raw) {
                Ok(value) => Some((key, value)),
                Err(e) => {
                    tracing::debug!("Skipping unparseable dataset {key}: {e}");
                    None
                }
            }
        })
        .collect()
}

/// Walk nested arrays by index.
pub fn nested_lookup<'a>(value: &'a Value, path: &[usize]) -> Option<&'a Value> {
    path.iter().try_fold(value, |node, index| node.get(*index))
}

fn lookup_str(value: &Value, path: &[usize]) -> Option<String> {
    nested_lookup(value, path)
        .and_then(Value::as_str)
        .map(str::to_owned)
}

fn lookup_i64(value: &Value, path: &[usize]) -> Option<i64> {
    nested_lookup(value, path).and_then(Value::as_i64)
}

fn lookup_f64(value: &Value, path: &[usize]) -> Option<f64> {
    nested_lookup(value, path).and_then(Value::as_f64)
}

/// `<br>` becomes a newline, then common entities are decoded.
fn unescape_html(s: &str) -> String {
    decode_html(&s.replace("<br>", "\n"))
}

const PRICE_MICROS: [usize; 10] = [1, 2, 57, 0, 0, 0, 0, 1, 0, 0];
const PRICE_CURRENCY: [usize; 10] = [1, 2, 57, 0, 0, 0, 0, 1, 0, 1];

fn app_from_details(detail: &Value) -> GooglePlayApp {
    let description_html = lookup_str(detail, &[1, 2, 12, 0, 0, 1])
        .or_else(|| lookup_str(detail, &[1, 2, 72, 0, 1]))
        .unwrap_or_default();

    let price_micros = lookup_f64(detail, &PRICE_MICROS);

    let screenshots = nested_lookup(detail, &[1, 2, 78, 0])
        .and_then(Value::as_array)
        .map(|shots| {
            shots
                .iter()
                .filter_map(|shot| lookup_str(shot, &[3, 2]))
                .collect()
        })
        .unwrap_or_default();

    GooglePlayApp {
        title: lookup_str(detail, &[1, 2, 0, 0]).unwrap_or_default(),
        summary: lookup_str(detail, &[1, 2, 73, 0, 1])
            .map(|s| unescape_html(&s))
            .unwrap_or_default(),
        description: unescape_html(&description_html),
        description_html,
        installs: lookup_str(detail, &[1, 2, 13, 0]).unwrap_or_default(),
        min_installs: lookup_i64(detail, &[1, 2, 13, 1]).unwrap_or(0),
        real_installs: lookup_i64(detail, &[1, 2, 13, 2]).unwrap_or(0),
        score: lookup_f64(detail, &[1, 2, 51, 0, 1]).unwrap_or(0.0),
        ratings: lookup_i64(detail, &[1, 2, 51, 2, 1]).unwrap_or(0),
        reviews: lookup_i64(detail, &[1, 2, 51, 3, 1]).unwrap_or(0),
        price: price_micros.map(|m| m / 1_000_000.0).unwrap_or(0.0),
        free: lookup_i64(detail, &PRICE_MICROS) == Some(0),
        currency: lookup_str(detail, &PRICE_CURRENCY).unwrap_or_default(),
        developer: lookup_str(detail, &[1, 2, 68, 0]).unwrap_or_default(),
        developer_id: lookup_str(detail, &[1, 2, 68, 1, 4, 2])
            .map(|link| match link.split_once("id=") {
                Some((_, id)) => id.to_owned(),
                None => link,
            })
            .unwrap_or_default(),
        developer_email: lookup_str(detail, &[1, 2, 69, 1, 0]).unwrap_or_default(),
        developer_website: lookup_str(detail, &[1, 2, 69, 0, 5, 2]).unwrap_or_default(),
        genre: lookup_str(detail, &[1, 2, 79, 0, 0, 0]).unwrap_or_default(),
        genre_id: lookup_str(detail, &[1, 2, 79, 0, 0, 2]).unwrap_or_default(),
        icon: lookup_str(detail, &[1, 2, 95, 0, 3, 2]).unwrap_or_default(),
        header_image: lookup_str(detail, &[1, 2, 96, 0, 3, 2]).unwrap_or_default(),
        screenshots,
        content_rating: lookup_str(detail, &[1, 2, 9, 0]).unwrap_or_default(),
        contains_ads: lookup_i64(detail, &[1, 2, 48]) == Some(1),
        released: lookup_str(detail, &[1, 2, 10, 0]).unwrap_or_default(),
        updated: lookup_i64(detail, &[1, 2, 145, 0, 1, 0]).unwrap_or(0),
        version: lookup_str(detail, &[1, 2, 140, 0, 0, 0])
            .unwrap_or_else(|| VARIES_WITH_DEVICE.to_owned()),
        ..GooglePlayApp::default()
    }
}
