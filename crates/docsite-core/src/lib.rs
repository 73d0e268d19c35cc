//! # docsite-core
//!
//! Search and navigation for documentation sites authored as structured rich
//! text in a headless CMS.
//!
//! The crate turns a corpus of rich-text documents into an in-memory
//! full-text index and serves ranked queries against it, and derives a
//! two-level table of contents with unique anchor ids from any single
//! document.
//!
//! ## Architecture
//!
//! - **Slugs**: URL-safe anchor ids, unique within one extraction pass
//! - **Outline**: H1/H2 sections and H3 subsections from a block stream
//! - **Corpus**: flattening documents into searchable records
//! - **Index**: Tantivy-backed index builder and query engine
//! - **Store**: where documents come from (memory, JSON file, HTTP)
//! - **Lifecycle**: lazy, single-flight index construction shared by all queries
//!
//! ## Quick Start
//!
//! ```rust
//! use docsite_core::{Config, Document, MemoryStore, PageType, RichTextBlock, SearchOptions, SearchService};
//! use std::sync::Arc;
//!
//! # tokio::runtime::Runtime::new()?.block_on(async {
//! let store = MemoryStore::new(vec![Document {
//!     id: "1".into(),
//!     title: "Coherent OFDM Radar".into(),
//!     slug: "coherent-ofdm-radar".into(),
//!     page_type: PageType::Dataset,
//!     meta_description: None,
//!     content: vec![RichTextBlock::paragraph("Raw backscatter captures.")],
//! }]);
//!
//! let service = SearchService::new(Arc::new(store), Config::default());
//! let hits = service.search("backscatter", &SearchOptions::default()).await?;
//! assert_eq!(hits[0].url, "/datasets/coherent-ofdm-radar");
//! # Ok::<(), docsite_core::Error>(())
//! # })?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, Error>`]. Malformed rich text
//! is never an error; it reads as empty text.

/// Configuration for routing, search, and the content store
pub mod config;
/// Flattening documents into search records
pub mod corpus;
/// Error types and result aliases
pub mod error;
/// Search index implementation using Tantivy
pub mod index;
/// Shared index lifecycle
pub mod lifecycle;
/// Table of contents extraction
pub mod outline;
/// Slug generation and per-pass allocation
pub mod slug;
/// Content store abstraction and implementations
pub mod store;
/// Core data types and structures
pub mod types;

// Re-export commonly used types
pub use config::{Config, RoutesConfig, SearchConfig, StoreConfig, Tokenize};
pub use corpus::flatten_text;
pub use error::{Error, Result};
pub use index::SearchIndex;
pub use lifecycle::{IndexState, SearchService};
pub use outline::{extract_outline, heading_anchors};
pub use slug::{SlugAllocator, slugify};
pub use store::{ContentStore, HttpStore, JsonFileStore, MemoryStore, open_store};
pub use types::*;
