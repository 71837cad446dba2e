//! The workspace-wide project-scope manager.

use crate::scope::ProjectScope;
use langsrv_classpath_cache::{ClasspathScanCache, ClasspathScanner, ScanHandle};
use langsrv_config::Config;
use langsrv_error::CoreResult;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Sentinel root for the workspace-wide scope that owns any document not
/// covered by a registered project.
const DEFAULT_ROOT: &str = "";

/// Owns every registered [`ProjectScope`] plus the workspace-wide default
/// scope, and routes operations to the right one by URI.
pub struct ProjectScopeManager {
    scopes: Mutex<HashMap<PathBuf, Arc<ProjectScope>>>,
    default_scope: Arc<ProjectScope>,
    classpath_cache: Arc<ClasspathScanCache>,
    config: Config,
    source_extension: String,
}

impl ProjectScopeManager {
    pub fn new(config: Config, classpath_cache: Arc<ClasspathScanCache>, source_extension: impl Into<String>) -> Self {
        let source_extension = source_extension.into();
        let default_scope = Arc::new(ProjectScope::new(PathBuf::from(DEFAULT_ROOT), "default".to_string(), &source_extension, Vec::new()));
        Self { scopes: Mutex::new(HashMap::new()), default_scope, classpath_cache, config, source_extension }
    }

    /// The scope whose project root is the longest prefix of `uri`'s
    /// filesystem path, or the default workspace-wide scope if none
    /// matches (or `uri` isn't a `file:` URI at all).
    pub fn find_scope(&self, uri: &str) -> Arc<ProjectScope> {
        let Some(path) = langsrv_uri::uri_to_fs_path(uri) else { return self.default_scope.clone() };
        let scopes = self.scopes.lock();
        scopes
            .values()
            .filter(|scope| path.starts_with(scope.root()))
            .max_by_key(|scope| scope.root().as_os_str().len())
            .cloned()
            .unwrap_or_else(|| self.default_scope.clone())
    }

    /// Creates and registers a scope rooted at `root`. Any already-registered
    /// scope whose root lies under `root` is excluded from `root`'s own
    /// source walk, so the two scopes never claim the same file.
    pub fn register_scope(&self, root: PathBuf, build_tool_tag: impl Into<String>, classpath: Vec<PathBuf>) -> Arc<ProjectScope> {
        let scope = Arc::new(ProjectScope::new(root.clone(), build_tool_tag.into(), &self.source_extension, classpath));

        let mut scopes = self.scopes.lock();
        let nested_roots: Vec<PathBuf> = scopes.keys().filter(|other| other.starts_with(&root) && *other != &root).cloned().collect();
        scope.unit_factory().set_excluded_sub_roots(nested_roots);
        scopes.insert(root, scope.clone());
        scope
    }

    /// Looks up a previously-registered scope by its exact root.
    pub fn scope_at(&self, root: &Path) -> Option<Arc<ProjectScope>> {
        self.scopes.lock().get(root).cloned()
    }

    pub fn default_scope(&self) -> Arc<ProjectScope> {
        self.default_scope.clone()
    }

    /// Every currently-registered project scope (excludes the default
    /// scope, which is never evicted).
    pub fn scopes(&self) -> Vec<Arc<ProjectScope>> {
        self.scopes.lock().values().cloned().collect()
    }

    /// Releases the AST index and classpath handle of every registered
    /// scope beyond the `keep_count` most-recently-accessed.
    pub fn evict_idle(&self, keep_count: usize) {
        let scopes = self.scopes();
        if scopes.len() <= keep_count {
            return;
        }
        let mut by_recency = scopes;
        by_recency.sort_by_key(|s| std::cmp::Reverse(s.last_access()));
        for stale in &by_recency[keep_count..] {
            tracing::debug!(root = %stale.root().display(), "evicting idle scope");
            stale.release_resident_state();
            if let Some(handle) = stale.classpath_handle() {
                self.classpath_cache.release(&handle);
                stale.set_classpath_handle(None);
            }
        }
    }

    /// Convenience wrapper around [`Self::evict_idle`] using the manager's
    /// configured `scope_keep_count`.
    pub fn evict_idle_to_configured_limit(&self) {
        self.evict_idle(self.config.scope_keep_count);
    }

    /// Replaces `root`'s classpath: invalidates its unit factory, releases
    /// the old shared scan (refcount decrement), and clears the handle so
    /// the next compile re-acquires one lazily via [`Self::ensure_classpath`].
    pub fn invalidate_classpath(&self, root: &Path, new_classpath: Vec<PathBuf>) -> bool {
        let Some(scope) = self.scope_at(root) else { return false };
        scope.unit_factory().set_additional_classpath(new_classpath);
        if let Some(old) = scope.classpath_handle() {
            self.classpath_cache.release(&old);
        }
        scope.set_classpath_handle(None);
        true
    }

    /// Acquires (or reuses) the shared classpath scan for `scope`,
    /// without re-scanning if a handle is already held.
    pub fn ensure_classpath(&self, scope: &ProjectScope, classpath: &[PathBuf], scanner: &dyn ClasspathScanner) -> CoreResult<ScanHandle> {
        if let Some(handle) = scope.classpath_handle() {
            return Ok(handle);
        }
        let handle = self.classpath_cache.acquire(classpath, scanner)?;
        scope.set_classpath_handle(Some(handle.clone()));
        Ok(handle)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
