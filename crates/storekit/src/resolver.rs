use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::adapter::{SourceError, SourceInfo, StoreAdapter};
use crate::link::ResolvedLink;
use crate::package::{Locale, PackageId};
use crate::priority::SourcePriority;
use crate::probe::SizeProbe;
use crate::source::Source;

/// How strictly a store's answer is checked before it counts as a success.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkPolicy {
    /// Any successful lookup ends resolution, even with an empty download URL.
    #[default]
    Lenient,
    /// A blank download URL is recorded as a failure and the next source is tried.
    RequireDownloadLink,
}

/// One failed attempt, in the order it was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub source: Source,
    pub message: String,
}

/// Every source in the priority order failed.
///
/// The display format is stable; callers parse it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", aggregate_message(.package_id, .failures))]
pub struct ResolveError {
    pub package_id: PackageId,
    pub failures: Vec<SourceFailure>,
}

impl ResolveError {
    /// Sources in the order they were tried.
    pub fn sources_tried(&self) -> Vec<Source> {
        self.failures.iter().map(|f| f.source).collect()
    }
}

fn aggregate_message(package_id: &PackageId, failures: &[SourceFailure]) -> String {
    let mut msg = format!(
        "Failed to retrieve APK download link for package: {package_id}. Tried the following sources: "
    );

    for (index, failure) in failures.iter().enumerate() {
        if index > 0 {
            msg.push_str(", ");
        }
        msg.push_str(failure.source.name());
    }

    msg.push_str(". Errors: ");

    for (index, failure) in failures.iter().enumerate() {
        if index > 0 {
            msg.push_str("; ");
        }
        let _ = write!(msg, "{}: {}", failure.source.name(), failure.message);
    }

    msg
}

/// Tries stores one at a time, in priority order, until one answers.
pub struct LinkResolver {
    adapters: HashMap<Source, Arc<dyn StoreAdapter>>,
    priority: SourcePriority,
    probe: Arc<dyn SizeProbe>,
    policy: LinkPolicy,
    locale: Locale,
}

impl LinkResolver {
    /// Adapters are keyed by the source they report; a later adapter for the
    /// same source replaces an earlier one.
    pub fn new(
        adapters: impl IntoIterator<Item = Arc<dyn StoreAdapter>>,
        priority: SourcePriority,
        probe: Arc<dyn SizeProbe>,
    ) -> Self {
        let adapters = adapters
            .into_iter()
            .map(|adapter| (adapter.source(), adapter))
            .collect();

        Self {
            adapters,
            priority,
            probe,
            policy: LinkPolicy::default(),
            locale: Locale::default(),
        }
    }

    pub fn with_policy(mut self, policy: LinkPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Resolve a download link for `package_id`.
    ///
    /// The priority order is read once. Sources are tried strictly in
    /// sequence; the first success is probed for its size and returned, and
    /// no later source is contacted.
    pub async fn resolve(&self, package_id: &PackageId) -> Result<ResolvedLink, ResolveError> {
        let order = self.priority.get_order();
        tracing::info!(
            "Resolving download link for {package_id} using order {}",
            order
                .iter()
                .map(|s| s.name())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut failures = Vec::new();

        for source in order {
            tracing::debug!("Trying {} for {package_id}", source.display_label());

            match self.attempt(source, package_id).await {
                Ok(info) => {
                    let file_size = self.probe.probe(&info.download_url).await;
                    tracing::info!(
                        "Resolved {package_id} from {} ({} bytes)",
                        source.name(),
                        file_size
                    );
                    return Ok(ResolvedLink::from_source_info(
                        package_id, source, info, file_size,
                    ));
                }
                Err(e) => {
                    tracing::warn!("Failed to get download link from {source}: {e}");
                    failures.push(SourceFailure {
                        source,
                        message: e.to_string(),
                    });
                }
            }
        }

        let err = ResolveError {
            package_id: package_id.clone(),
            failures,
        };
        tracing::error!("{err}");
        Err(err)
    }

    async fn attempt(
        &self,
        source: Source,
        package_id: &PackageId,
    ) -> Result<SourceInfo, SourceError> {
        let adapter = self.adapters.get(&source).ok_or_else(|| {
            SourceError::unavailable(format!("no adapter registered for {source}"))
        })?;

        let info = adapter.fetch(package_id, &self.locale).await?;

        if self.policy == LinkPolicy::RequireDownloadLink && info.download_url.trim().is_empty() {
            return Err(SourceError::MissingDownloadLink(package_id.clone()));
        }

        Ok(info)
    }
}
