//! Shared error type for the core compilation and analysis engine.
//!
//! Per the engine's error-handling design, no error crosses a scope boundary
//! as an exception from a public API: most operations degrade locally and
//! return `None`, an empty collection, or a result container instead of
//! propagating a failure. `CoreError` exists for the smaller set of
//! operations that do need to surface a hard failure to their caller
//! (disk I/O in the classpath-scan cache and the compilation-unit factory,
//! mainly) rather than degrade silently.

#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

use std::path::PathBuf;
use thiserror::Error;

/// The engine's single error type.
///
/// Every variant is recoverable by the caller: callers are expected to log
/// the error (or fold it into a diagnostic) and continue operating in a
/// degraded mode rather than abort.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Filesystem I/O failed while walking a project or reading a source file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The on-disk classpath-scan cache contained a file that could not be
    /// parsed as the expected JSON payload.
    #[error("corrupt classpath cache entry at {path}: {source}")]
    CacheCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The external classpath scanner failed to produce a scan result.
    #[error("classpath scan failed for {classpath_key}: {message}")]
    ScanFailed { classpath_key: String, message: String },

    /// The external compiler front-end failed catastrophically (not a
    /// syntax/type error in the analyzed source, but a crash or resource
    /// exhaustion in the compiler itself).
    #[error("compiler front-end failed on {uri}: {message}")]
    CompilerFailure { uri: String, message: String },
}

impl CoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn cache_corrupt(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::CacheCorrupt { path: path.into(), source }
    }

    pub fn scan_failed(classpath_key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ScanFailed { classpath_key: classpath_key.into(), message: message.into() }
    }

    pub fn compiler_failure(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CompilerFailure { uri: uri.into(), message: message.into() }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
