//! Classpath identity: canonicalization and the SHA-256 cache key.

use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Canonicalizes, sorts, and deduplicates a list of classpath entries.
/// Entries that fail to canonicalize (already deleted, or not yet
/// materialized on disk) are kept as-is rather than dropped, so a scope
/// with a stale classpath entry still gets a stable, if imperfect, key.
pub fn canonical_urls(urls: &[PathBuf]) -> Vec<PathBuf> {
    let mut canon: Vec<PathBuf> = urls.iter().map(|p| p.canonicalize().unwrap_or_else(|_| p.clone())).collect();
    canon.sort();
    canon.dedup();
    canon
}

/// The cache key for a classpath: canonicalize each entry, sort, UTF-8
/// join with `\n`, SHA-256 hex.
pub fn classpath_key(urls: &[PathBuf]) -> String {
    let canon = canonical_urls(urls);
    let joined = canon.iter().map(|p| p.to_string_lossy().into_owned()).collect::<Vec<_>>().join("\n");
    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_order_independent() {
        let a = vec![PathBuf::from("/a"), PathBuf::from("/b")];
        let b = vec![PathBuf::from("/b"), PathBuf::from("/a")];
        assert_eq!(classpath_key(&a), classpath_key(&b));
    }

    #[test]
    fn key_changes_with_contents() {
        let a = vec![PathBuf::from("/a")];
        let b = vec![PathBuf::from("/a"), PathBuf::from("/b")];
        assert_ne!(classpath_key(&a), classpath_key(&b));
    }

    #[test]
    fn key_is_a_sha256_hex_digest() {
        let key = classpath_key(&[PathBuf::from("/a")]);
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
