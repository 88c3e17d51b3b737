use std::sync::Arc;

use storekit::{Source, StoreAdapter};

pub mod apkcombo;
pub mod apkpure;
pub mod aptoide;
pub mod extract;
pub mod fdroid;
pub mod gplay;
pub mod http;
pub mod probe;

pub use apkcombo::{ApkComboAdapter, ApkComboApp};
pub use apkpure::{ApkPureAdapter, ApkPureApp};
pub use aptoide::{AptoideAdapter, AptoideApp};
pub use fdroid::{FDroidAdapter, FDroidPackage};
pub use gplay::{GooglePlayAdapter, GooglePlayApp};
pub use http::{DEFAULT_USER_AGENT, HttpConfig, build_client};
pub use probe::HttpSizeProbe;

/// The production adapter for `source`, talking to the store's public host.
pub fn adapter_for(source: Source, client: reqwest::Client) -> Arc<dyn StoreAdapter> {
    match source {
        Source::GooglePlay => Arc::new(GooglePlayAdapter::new(client)),
        Source::Aptoide => Arc::new(AptoideAdapter::new(client)),
        Source::FDroid => Arc::new(FDroidAdapter::new(client)),
        Source::ApkPure => Arc::new(ApkPureAdapter::new(client)),
        Source::ApkCombo => Arc::new(ApkComboAdapter::new(client)),
    }
}

/// One adapter per known source, all sharing `client`.
pub fn default_adapters(client: &reqwest::Client) -> Vec<Arc<dyn StoreAdapter>> {
    Source::ALL
        .iter()
        .map(|source| adapter_for(*source, client.clone()))
        .collect()
}
