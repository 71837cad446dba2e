//! Process-wide, reference-counted cache of external classpath scans.
//!
//! Scanning a classpath for declared symbols is expensive and the same
//! classpath (or a near-identical one) is commonly requested by several
//! project scopes at once — this crate is the shared store that lets them
//! reuse one another's scans instead of rescanning, with exact, superset,
//! and high-overlap reuse, plus an atomic on-disk cache.

#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

mod cache;
mod key;
mod scanner;

pub use cache::{ClasspathScanCache, ScanHandle};
pub use key::{canonical_urls, classpath_key};
pub use scanner::{ClasspathScanner, ClasspathSymbol, ScanResult, SymbolKind};
