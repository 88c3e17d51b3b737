//! Resolve a downloadable APK for an Android package by asking several
//! third-party stores in a configurable order.

pub mod adapter;
pub mod link;
pub mod package;
pub mod priority;
pub mod probe;
pub mod resolver;
pub mod source;

pub use adapter::{SourceError, SourceInfo, StoreAdapter};
pub use link::ResolvedLink;
pub use package::{Locale, PackageId};
pub use priority::{DEFAULT_ORDER, PriorityError, SourcePriority, merge_with_default};
pub use probe::{NoProbe, SizeProbe, UNKNOWN_SIZE};
pub use resolver::{LinkPolicy, LinkResolver, ResolveError, SourceFailure};
pub use source::{Source, UnknownSource};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
