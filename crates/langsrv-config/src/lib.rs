//! Engine-wide configuration knobs.
//!
//! The engine has no config-file format of its own: the embedding language
//! server glue is responsible for translating editor/user settings into a
//! [`Config`] and handing it to the scope manager at construction time.

#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

/// Tunable defaults for scope eviction, classpath-scan reuse, dependency
/// traversal, and incremental-recompile fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Soft cap on the number of project scopes kept resident at once
    /// (`scope.keep_count`). Least-recently-accessed scopes beyond this
    /// count are evicted.
    pub scope_keep_count: usize,

    /// Minimum `|requested ∩ cached| / |requested|` ratio for the classpath
    /// cache to reuse an existing scan rather than delegate to the scanner
    /// (`classpath_cache.overlap_threshold`).
    pub classpath_overlap_threshold: f64,

    /// Whether classpath scan results are persisted to the on-disk cache
    /// directory (`classpath_cache.persist_to_disk`).
    pub classpath_persist_to_disk: bool,

    /// Maximum BFS depth for dependency-graph transitive traversal
    /// (`dep_graph.max_transitive_depth`).
    pub dep_graph_max_transitive_depth: usize,

    /// If the expanded incremental-recompile set exceeds this fraction of
    /// a scope's total source count, the service promotes the recompile to
    /// a full rebuild (`incremental.fallback_fraction`).
    pub incremental_fallback_fraction: f64,

    /// Fully-qualified-name prefixes treated as platform/standard-library
    /// namespaces; dependencies under these prefixes are filtered out of
    /// `deps_by_uri` (`runtime.filtered_namespace_prefixes`).
    pub filtered_namespace_prefixes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scope_keep_count: 16,
            classpath_overlap_threshold: 0.90,
            classpath_persist_to_disk: true,
            dep_graph_max_transitive_depth: 5,
            incremental_fallback_fraction: 0.5,
            filtered_namespace_prefixes: default_filtered_namespace_prefixes(),
        }
    }
}

impl Config {
    /// Returns true if `fqn` falls under one of the configured
    /// runtime/platform namespace prefixes and should be filtered out of
    /// dependency tracking.
    pub fn is_filtered_namespace(&self, fqn: &str) -> bool {
        self.filtered_namespace_prefixes.iter().any(|prefix| fqn.starts_with(prefix.as_str()))
    }
}

fn default_filtered_namespace_prefixes() -> Vec<String> {
    [
        "java.lang.",
        "java.util.",
        "java.io.",
        "java.nio.",
        "java.net.",
        "java.math.",
        "java.time.",
        "groovy.lang.",
        "groovy.util.",
        "kotlin.",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.scope_keep_count, 16);
        assert!((cfg.classpath_overlap_threshold - 0.90).abs() < f64::EPSILON);
        assert!(cfg.classpath_persist_to_disk);
        assert_eq!(cfg.dep_graph_max_transitive_depth, 5);
        assert!((cfg.incremental_fallback_fraction - 0.5).abs() < f64::EPSILON);
        assert!(!cfg.filtered_namespace_prefixes.is_empty());
    }

    #[test]
    fn filters_runtime_namespaces() {
        let cfg = Config::default();
        assert!(cfg.is_filtered_namespace("java.lang.String"));
        assert!(!cfg.is_filtered_namespace("com.example.Widget"));
    }

    #[test]
    fn overrides_are_field_by_field() {
        let mut cfg = Config::default();
        cfg.scope_keep_count = 4;
        assert_eq!(cfg.scope_keep_count, 4);
        assert_eq!(cfg.dep_graph_max_transitive_depth, 5);
    }
}
