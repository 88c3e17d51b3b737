use std::time::Duration;

use storekit::{PackageId, SourceError};

/// Mobile Chrome; some stores serve reduced pages to unknown agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 16) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/137.0.7151.116 Mobile";

/// Settings shared by every store client.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Build the client every adapter and the size probe share.
pub fn build_client(config: &HttpConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .build()
}

pub(crate) fn transport_error(e: reqwest::Error) -> SourceError {
    SourceError::unavailable(format!("request failed: {e}"))
}

/// Reject a non-success answer to the canonical lookup.
pub(crate) fn ensure_found(
    response: reqwest::Response,
    package_id: &PackageId,
) -> Result<reqwest::Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(SourceError::NotFound {
            package_id: package_id.clone(),
            status: status.as_u16(),
        })
    }
}

/// Send a request and read the body as text, mapping failures the same way
/// for every HTML store.
pub(crate) async fn fetch_page(
    request: reqwest::RequestBuilder,
    package_id: &PackageId,
) -> Result<String, SourceError> {
    let response = request.send().await.map_err(transport_error)?;
    let response = ensure_found(response, package_id)?;
    response
        .text()
        .await
        .map_err(|e| SourceError::unavailable(format!("failed to read response body: {e}")))
}
