use std::sync::Arc;

/// Reserved size value meaning "unknown".
pub const UNKNOWN_SIZE: i64 = -1;

/// Best-effort discovery of a remote file's length without downloading it.
#[async_trait::async_trait]
pub trait SizeProbe: Send + Sync {
    /// Size in bytes, or [`UNKNOWN_SIZE`]. Never fails.
    async fn probe(&self, url: &str) -> i64;
}

#[async_trait::async_trait]
impl<T: SizeProbe + ?Sized> SizeProbe for Arc<T> {
    async fn probe(&self, url: &str) -> i64 {
        (**self).probe(url).await
    }
}

/// A probe that never touches the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProbe;

#[async_trait::async_trait]
impl SizeProbe for NoProbe {
    async fn probe(&self, _url: &str) -> i64 {
        UNKNOWN_SIZE
    }
}
