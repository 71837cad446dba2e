//! Builds [`CompilationUnit`]s rooted at a project, seeding sources from
//! disk and open buffers.
//!
//! One factory instance is owned per project scope. It caches the disk
//! walk (a project can easily have thousands of source files, and most
//! compiles don't touch the file system layout at all) but never caches
//! file *contents* — those are re-read from the tracker or disk on every
//! `create` so an edit is always reflected.

use langsrv_documents::DocumentTracker;
use langsrv_frontend::{CompilationUnit, SourceInput};
use langsrv_uri::{fs_path_to_uri, is_special_scheme, uri_to_fs_path};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory names pruned from the source walk regardless of configured
/// exclusions: dotfiles/dotdirs, common build output, and dependency
/// caches.
fn is_always_excluded_dir(name: &str) -> bool {
    name.starts_with('.') || matches!(name, "build" | "target" | "out" | "node_modules" | "dist")
}

#[derive(Default)]
struct Inner {
    file_cache: Option<Vec<PathBuf>>,
    excluded_sub_roots: Vec<PathBuf>,
    additional_classpath: Vec<PathBuf>,
    /// Set by [`CompilationUnitFactory::invalidate_compilation_unit`] and
    /// whichever setters imply it (classpath changes); cleared on the next
    /// `create`/`create_incremental`. A true value does not by itself
    /// force a disk rescan — that's `file_cache`'s job — it signals that
    /// the *previous* unit (if a caller cached one) is stale and a full
    /// recompile, not just an incremental one, is warranted.
    rebuild_requested: bool,
}

/// Builds compilation units rooted at a single project.
pub struct CompilationUnitFactory {
    project_root: PathBuf,
    source_extension: String,
    base_classpath: Vec<PathBuf>,
    inner: Mutex<Inner>,
}

impl CompilationUnitFactory {
    pub fn new(project_root: impl Into<PathBuf>, source_extension: impl Into<String>, base_classpath: Vec<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            source_extension: source_extension.into(),
            base_classpath,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Builds a unit from every source under the project root (using
    /// open-buffer text where available) plus synthetic Java-source
    /// stubs for any FQN under an adjacent `src/main/java`/`src/test/java`
    /// tree that isn't already in `known_classpath_names`.
    pub fn create(&self, tracker: &DocumentTracker, known_classpath_names: &HashSet<String>) -> CompilationUnit {
        let files = self.cached_files();
        let mut sources: Vec<SourceInput> = files
            .iter()
            .filter_map(|path| {
                let uri = fs_path_to_uri(path).ok()?;
                let text = tracker.get(&uri).unwrap_or_else(|| std::fs::read_to_string(path).unwrap_or_default());
                Some(SourceInput::new(uri, text))
            })
            .collect();
        sources.extend(self.synthetic_stubs(known_classpath_names));

        self.inner.lock().rebuild_requested = false;
        CompilationUnit::new(self.project_root.clone()).with_sources(sources).with_classpath(self.combined_classpath())
    }

    /// Builds a unit containing only `included` URIs, skipping the full
    /// disk walk and synthetic-stub refresh. Used for a bounded
    /// incremental recompile.
    pub fn create_incremental(&self, tracker: &DocumentTracker, included: &HashSet<String>) -> CompilationUnit {
        let mut included: Vec<&String> = included.iter().collect();
        included.sort();
        let sources: Vec<SourceInput> = included
            .into_iter()
            .filter(|uri| !is_special_scheme(uri))
            .map(|uri| {
                let text = tracker
                    .get(uri)
                    .or_else(|| uri_to_fs_path(uri).and_then(|p| std::fs::read_to_string(p).ok()))
                    .unwrap_or_default();
                SourceInput::new(uri.clone(), text)
            })
            .collect();

        self.inner.lock().rebuild_requested = false;
        CompilationUnit::new(self.project_root.clone()).with_sources(sources).with_classpath(self.combined_classpath())
    }

    /// Forces the next `create`/`create_incremental` to be treated as a
    /// full rebuild by callers inspecting [`Self::needs_rebuild`].
    pub fn invalidate_compilation_unit(&self) {
        self.inner.lock().rebuild_requested = true;
    }

    pub fn needs_rebuild(&self) -> bool {
        self.inner.lock().rebuild_requested
    }

    /// Forces the next `create` to re-walk the project tree rather than
    /// reuse the cached file list.
    pub fn invalidate_file_cache(&self) {
        self.inner.lock().file_cache = None;
    }

    pub fn set_additional_classpath(&self, classpath: Vec<PathBuf>) {
        let mut inner = self.inner.lock();
        inner.additional_classpath = classpath;
        inner.rebuild_requested = true;
    }

    pub fn set_excluded_sub_roots(&self, roots: Vec<PathBuf>) {
        let mut inner = self.inner.lock();
        inner.excluded_sub_roots = roots;
        inner.file_cache = None;
        inner.rebuild_requested = true;
    }

    fn combined_classpath(&self) -> Vec<PathBuf> {
        let mut combined = self.base_classpath.clone();
        combined.extend(self.inner.lock().additional_classpath.iter().cloned());
        combined
    }

    fn cached_files(&self) -> Vec<PathBuf> {
        let mut inner = self.inner.lock();
        if let Some(files) = &inner.file_cache {
            return files.clone();
        }
        let files = self.walk_sources(&inner.excluded_sub_roots);
        inner.file_cache = Some(files.clone());
        files
    }

    fn walk_sources(&self, excluded_sub_roots: &[PathBuf]) -> Vec<PathBuf> {
        if !self.project_root.is_dir() {
            return Vec::new();
        }
        let mut found = Vec::new();
        let walker = WalkDir::new(&self.project_root).into_iter().filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            if entry.file_type().is_dir() {
                let name = entry.file_name().to_string_lossy();
                if is_always_excluded_dir(&name) {
                    return false;
                }
                if excluded_sub_roots.iter().any(|root| entry.path() == root) {
                    return false;
                }
            }
            true
        });
        for entry in walker.filter_map(Result::ok) {
            if entry.file_type().is_file() && entry.path().extension().map(|e| e == self.source_extension.as_str()).unwrap_or(false) {
                found.push(entry.path().to_path_buf());
            }
        }
        found
    }

    fn synthetic_stubs(&self, known_classpath_names: &HashSet<String>) -> Vec<SourceInput> {
        let mut stubs = Vec::new();
        for java_root in ["src/main/java", "src/test/java"] {
            let dir = self.project_root.join(java_root);
            if !dir.is_dir() {
                continue;
            }
            for entry in WalkDir::new(&dir).into_iter().filter_map(Result::ok) {
                if !entry.file_type().is_file() || entry.path().extension().map(|e| e != "java").unwrap_or(true) {
                    continue;
                }
                let Some(fqn) = fqn_from_java_path(&dir, entry.path()) else { continue };
                if known_classpath_names.contains(&fqn) {
                    continue;
                }
                stubs.push(stub_source(&fqn));
            }
        }
        stubs
    }
}

/// Derives a dotted fully-qualified name from a `.java` file's path
/// relative to its source root (`com/example/Foo.java` -> `com.example.Foo`).
fn fqn_from_java_path(root: &Path, file: &Path) -> Option<String> {
    let rel = file.strip_prefix(root).ok()?;
    let rel = rel.with_extension("");
    let parts: Vec<String> = rel.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("."))
}

fn stub_source(fqn: &str) -> SourceInput {
    let (package, simple_name) = match fqn.rsplit_once('.') {
        Some((pkg, name)) => (Some(pkg), name),
        None => (None, fqn),
    };
    let text = match package {
        Some(pkg) => format!("package {pkg}; public class {simple_name} {{}}\n"),
        None => format!("public class {simple_name} {{}}\n"),
    };
    SourceInput::new(format!("synthetic:///{}.java", fqn.replace('.', "/")), text)
}
