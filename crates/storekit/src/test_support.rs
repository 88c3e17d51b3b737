use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::adapter::{SourceError, SourceInfo, StoreAdapter};
use crate::package::{Locale, PackageId};
use crate::probe::SizeProbe;
use crate::source::Source;

/// An adapter that always gives the same answer and counts how often it was asked.
pub struct ScriptedAdapter {
    source: Source,
    outcome: Result<SourceInfo, SourceError>,
    calls: AtomicUsize,
    last_locale: Mutex<Option<Locale>>,
}

impl ScriptedAdapter {
    pub fn succeeding(source: Source, info: SourceInfo) -> Self {
        Self::with_outcome(source, Ok(info))
    }

    pub fn failing(source: Source, error: SourceError) -> Self {
        Self::with_outcome(source, Err(error))
    }

    fn with_outcome(source: Source, outcome: Result<SourceInfo, SourceError>) -> Self {
        Self {
            source,
            outcome,
            calls: AtomicUsize::new(0),
            last_locale: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_locale(&self) -> Option<Locale> {
        self.last_locale
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait::async_trait]
impl StoreAdapter for ScriptedAdapter {
    fn source(&self) -> Source {
        self.source
    }

    async fn fetch(
        &self,
        _package_id: &PackageId,
        locale: &Locale,
    ) -> Result<SourceInfo, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self
            .last_locale
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(locale.clone());
        self.outcome.clone()
    }
}

/// A size probe that reports a fixed size and records every URL it saw.
pub struct FixedProbe {
    size: i64,
    urls: Mutex<Vec<String>>,
}

impl FixedProbe {
    pub fn new(size: i64) -> Self {
        Self {
            size,
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn probed_urls(&self) -> Vec<String> {
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait::async_trait]
impl SizeProbe for FixedProbe {
    async fn probe(&self, url: &str) -> i64 {
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_owned());
        self.size
    }
}
