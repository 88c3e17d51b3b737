use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use crate::source::Source;

/// Built-in resolution order. Google Play serves no APK files, so it comes last.
pub const DEFAULT_ORDER: [Source; 5] = [
    Source::ApkPure,
    Source::ApkCombo,
    Source::FDroid,
    Source::Aptoide,
    Source::GooglePlay,
];

/// Rejected priority requests. The registry is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriorityError {
    #[error("priority list cannot be empty")]
    Empty,

    #[error("priority list cannot contain duplicates: {0} appears more than once")]
    Duplicate(Source),
}

/// Shared, mutable source order.
///
/// Clones share the same state: the last successful `set_order` or
/// `reset_to_default` from any clone wins. Readers always get a complete
/// snapshot; a writer replaces the whole sequence in one assignment.
#[derive(Debug, Clone)]
pub struct SourcePriority {
    order: Arc<RwLock<Arc<[Source]>>>,
}

impl SourcePriority {
    pub fn new() -> Self {
        Self {
            order: Arc::new(RwLock::new(Arc::from(DEFAULT_ORDER))),
        }
    }

    /// Start from an explicit request instead of the default order.
    pub fn with_order(requested: &[Source]) -> Result<Self, PriorityError> {
        let priority = Self::new();
        priority.set_order(requested)?;
        Ok(priority)
    }

    /// Snapshot of the current order.
    pub fn get_order(&self) -> Vec<Source> {
        let current: Arc<[Source]> = self
            .order
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        current.to_vec()
    }

    /// Replace the order. Sources missing from `requested` are appended
    /// after it, in their default relative order.
    pub fn set_order(&self, requested: &[Source]) -> Result<(), PriorityError> {
        let merged = merge_with_default(requested)?;
        self.swap(Arc::from(merged));
        Ok(())
    }

    pub fn reset_to_default(&self) {
        self.swap(Arc::from(DEFAULT_ORDER));
    }

    fn swap(&self, next: Arc<[Source]>) {
        *self.order.write().unwrap_or_else(PoisonError::into_inner) = next;
    }
}

impl Default for SourcePriority {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a requested order and complete it with the default order.
pub fn merge_with_default(requested: &[Source]) -> Result<Vec<Source>, PriorityError> {
    if requested.is_empty() {
        return Err(PriorityError::Empty);
    }

    let mut seen = HashSet::with_capacity(requested.len());
    for source in requested {
        if !seen.insert(*source) {
            return Err(PriorityError::Duplicate(*source));
        }
    }

    let mut merged = requested.to_vec();
    merged.extend(DEFAULT_ORDER.iter().filter(|s| !seen.contains(*s)));
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_covers_all(order: &[Source]) {
        assert_eq!(order.len(), Source::ALL.len());
        for source in Source::ALL {
            assert_eq!(order.iter().filter(|s| **s == source).count(), 1);
        }
    }

    #[test]
    fn starts_with_default_order() {
        let priority = SourcePriority::new();
        assert_eq!(priority.get_order(), DEFAULT_ORDER.to_vec());
    }

    #[test]
    fn default_order_covers_every_source() {
        assert_covers_all(&DEFAULT_ORDER);
    }

    #[test]
    fn single_source_moves_to_front() {
        let priority = SourcePriority::new();
        priority.set_order(&[Source::FDroid]).unwrap();

        assert_eq!(
            priority.get_order(),
            vec![
                Source::FDroid,
                Source::ApkPure,
                Source::ApkCombo,
                Source::Aptoide,
                Source::GooglePlay,
            ]
        );
    }

    #[test]
    fn partial_order_keeps_caller_sequence_then_defaults() {
        let priority = SourcePriority::new();
        priority
            .set_order(&[Source::Aptoide, Source::ApkCombo, Source::FDroid])
            .unwrap();

        assert_eq!(
            priority.get_order(),
            vec![
                Source::Aptoide,
                Source::ApkCombo,
                Source::FDroid,
                Source::ApkPure,
                Source::GooglePlay,
            ]
        );
    }

    #[test]
    fn every_prefix_of_every_rotation_merges_without_loss() {
        for start in 0..Source::ALL.len() {
            let rotated: Vec<Source> = Source::ALL
                .iter()
                .cycle()
                .skip(start)
                .take(Source::ALL.len())
                .copied()
                .collect();

            for len in 1..=rotated.len() {
                let requested = &rotated[..len];
                let merged = merge_with_default(requested).unwrap();

                assert_eq!(&merged[..len], requested);
                let tail: Vec<Source> = DEFAULT_ORDER
                    .iter()
                    .filter(|s| !requested.contains(*s))
                    .copied()
                    .collect();
                assert_eq!(&merged[len..], tail.as_slice());
                assert_covers_all(&merged);
            }
        }
    }

    #[test]
    fn empty_request_is_rejected_and_state_kept() {
        let priority = SourcePriority::new();
        priority.set_order(&[Source::Aptoide]).unwrap();
        let before = priority.get_order();

        assert_eq!(priority.set_order(&[]), Err(PriorityError::Empty));
        assert_eq!(priority.get_order(), before);
    }

    #[test]
    fn duplicate_request_is_rejected_and_state_kept() {
        let priority = SourcePriority::new();
        priority.set_order(&[Source::ApkCombo]).unwrap();
        let before = priority.get_order();

        assert_eq!(
            priority.set_order(&[Source::FDroid, Source::FDroid]),
            Err(PriorityError::Duplicate(Source::FDroid))
        );
        assert_eq!(priority.get_order(), before);
    }

    #[test]
    fn reset_restores_default_from_any_state() {
        let priority = SourcePriority::new();
        priority.reset_to_default();
        assert_eq!(priority.get_order(), DEFAULT_ORDER.to_vec());

        priority
            .set_order(&[Source::GooglePlay, Source::Aptoide])
            .unwrap();
        priority.reset_to_default();
        assert_eq!(priority.get_order(), DEFAULT_ORDER.to_vec());

        priority.reset_to_default();
        assert_eq!(priority.get_order(), DEFAULT_ORDER.to_vec());
    }

    #[test]
    fn clones_share_state() {
        let priority = SourcePriority::new();
        let handle = priority.clone();

        handle.set_order(&[Source::FDroid]).unwrap();
        assert_eq!(priority.get_order()[0], Source::FDroid);
    }

    #[test]
    fn snapshot_is_not_affected_by_later_writes() {
        let priority = SourcePriority::new();
        let snapshot = priority.get_order();

        priority.set_order(&[Source::GooglePlay]).unwrap();
        assert_eq!(snapshot, DEFAULT_ORDER.to_vec());
    }

    #[test]
    fn with_order_validates() {
        assert!(SourcePriority::with_order(&[]).is_err());
        let priority = SourcePriority::with_order(&[Source::Aptoide]).unwrap();
        assert_eq!(priority.get_order()[0], Source::Aptoide);
    }
}
