//! Error types and handling for docsite-core operations.
//!
//! Every fallible operation in this crate returns [`Result<T>`]. Errors are
//! grouped into categories for logging and carry a recoverability hint so
//! callers can decide whether a retry is worthwhile.
//!
//! ## Error Categories
//!
//! - **I/O Errors**: reading corpus files and configuration
//! - **Network Errors**: talking to a remote content store
//! - **Parse Errors**: corpus JSON that does not match the document shape
//! - **Index Errors**: search index construction and querying
//! - **Store Errors**: content store responses that are unusable
//! - **Configuration Errors**: invalid settings or config files
//! - **Build Errors**: a shared index build that failed for every waiter
//!
//! Malformed rich-text blocks are never errors: a heading without text is
//! simply skipped, and a block without children reads as empty.
//!
//! ```rust
//! use docsite_core::Error;
//!
//! let err = Error::Store("upstream returned no result field".to_string());
//! assert_eq!(err.category(), "store");
//! assert!(!err.is_recoverable());
//! ```

use std::sync::Arc;
use thiserror::Error;

/// The main error type for docsite-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Covers reading corpus files from disk and loading configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network operation failed.
    ///
    /// Raised by the HTTP content store. Connection and timeout failures are
    /// recoverable; everything else is treated as permanent.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Content could not be parsed into documents.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Search index operation failed.
    ///
    /// Wraps tantivy failures during schema setup, writing, committing, or
    /// searching.
    #[error("Index error: {0}")]
    Index(String),

    /// Content store returned something unusable.
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A shared index build failed.
    ///
    /// Every caller that was waiting on the same build receives a clone of
    /// the same underlying cause.
    #[error("Index build failed: {0}")]
    IndexBuild(#[source] Arc<Error>),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl Error {
    /// Check if the error might be recoverable through retry logic.
    ///
    /// A failed index build is never retried automatically, but the next
    /// search call starts a fresh build, so this tells callers whether
    /// issuing that next call is worthwhile.
    ///
    /// ```rust
    /// use docsite_core::Error;
    /// use std::io;
    ///
    /// assert!(Error::Io(io::Error::new(io::ErrorKind::TimedOut, "timeout")).is_recoverable());
    /// assert!(!Error::Parse("bad corpus".to_string()).is_recoverable());
    /// ```
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            Self::IndexBuild(cause) => cause.is_recoverable(),
            _ => false,
        }
    }

    /// Get the error category as a string identifier.
    ///
    /// Used as a structured field when logging failures.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Network(_) => "network",
            Self::Parse(_) => "parse",
            Self::Index(_) => "index",
            Self::Store(_) => "store",
            Self::Config(_) => "config",
            Self::NotFound(_) => "not_found",
            Self::Serialization(_) => "serialization",
            Self::IndexBuild(_) => "index_build",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
