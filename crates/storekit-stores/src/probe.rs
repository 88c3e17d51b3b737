use reqwest::StatusCode;
use reqwest::header::{CONTENT_LENGTH, CONTENT_RANGE, HeaderMap, RANGE};
use storekit::{SizeProbe, UNKNOWN_SIZE};

/// Finds a remote file's size from response headers; bodies are never read.
///
/// Tries `HEAD`, then a one-byte ranged `GET`, then a plain `GET`.
pub struct HttpSizeProbe {
    client: reqwest::Client,
}

impl HttpSizeProbe {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn from_head(&self, url: &str) -> Option<i64> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .inspect_err(|e| tracing::debug!("HEAD {url} failed: {e}"))
            .ok()?;

        if response.status() != StatusCode::OK {
            return None;
        }
        content_length(response.headers())
    }

    async fn from_range(&self, url: &str) -> Option<i64> {
        let response = self
            .client
            .get(url)
            .header(RANGE, "bytes=0-0")
            .send()
            .await
            .inspect_err(|e| tracing::debug!("ranged GET {url} failed: {e}"))
            .ok()?;

        // A 416 still reports the total as `bytes */N`.
        content_range_total(response.headers()).or_else(|| content_length(response.headers()))
    }

    async fn from_get(&self, url: &str) -> Option<i64> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .inspect_err(|e| tracing::debug!("GET {url} failed: {e}"))
            .ok()?;

        if response.status() != StatusCode::OK {
            return None;
        }
        content_length(response.headers())
    }
}

#[async_trait::async_trait]
impl SizeProbe for HttpSizeProbe {
    async fn probe(&self, url: &str) -> i64 {
        if url.trim().is_empty() {
            return UNKNOWN_SIZE;
        }

        if let Some(size) = self.from_head(url).await {
            return size;
        }
        if let Some(size) = self.from_range(url).await {
            return size;
        }
        if let Some(size) = self.from_get(url).await {
            return size;
        }

        tracing::debug!("Could not determine size of {url}");
        UNKNOWN_SIZE
    }
}

/// Positive `Content-Length`.
fn content_length(headers: &HeaderMap) -> Option<i64> {
    headers
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|len| *len > 0)
}

/// Positive total from `Content-Range: bytes 0-0/N` or `bytes */N`.
fn content_range_total(headers: &HeaderMap) -> Option<i64> {
    let value = headers.get(CONTENT_RANGE)?.to_str().ok()?;
    let (_, total) = value.rsplit_once('/')?;
    total
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|len| *len > 0)
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;

    fn headers(name: reqwest::header::HeaderName, value: &'static str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(name, HeaderValue::from_static(value));
        map
    }

    #[test]
    fn content_range_total_is_parsed() {
        assert_eq!(
            content_range_total(&headers(CONTENT_RANGE, "bytes 0-0/4096")),
            Some(4096)
        );
        assert_eq!(
            content_range_total(&headers(CONTENT_RANGE, "bytes */512")),
            Some(512)
        );
        assert_eq!(content_range_total(&headers(CONTENT_RANGE, "bytes 0-0/*")), None);
        assert_eq!(content_range_total(&HeaderMap::new()), None);
    }

    #[test]
    fn zero_or_garbage_length_is_unknown() {
        assert_eq!(content_length(&headers(CONTENT_LENGTH, "0")), None);
        assert_eq!(content_length(&headers(CONTENT_LENGTH, "abc")), None);
        assert_eq!(content_length(&headers(CONTENT_LENGTH, "2048")), Some(2048));
    }

    #[tokio::test]
    async fn blank_url_is_unknown_without_requests() {
        let probe = HttpSizeProbe::new(reqwest::Client::new());
        assert_eq!(probe.probe("  ").await, UNKNOWN_SIZE);
    }
}
