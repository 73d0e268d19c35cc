//! Lazy, single-flight construction of the shared search index.
//!
//! [`SearchService`] owns the index state machine:
//!
//! ```text
//! Uninitialized ──► Building ──► Ready
//!                      │
//!                      ▼
//!                   Failed ──► Building (on the next call)
//! ```
//!
//! The first caller spawns the build on the runtime and every caller,
//! including the first, awaits the same shared handle. Dropping a waiter
//! never cancels the build. A failed build is reported to all of its
//! waiters and is not retried on its own; the next call starts over.

use crate::config::Config;
use crate::index::SearchIndex;
use crate::outline::{extract_outline, heading_anchors};
use crate::store::ContentStore;
use crate::types::{Page, SearchOptions, SearchResult};
use crate::{Error, Result};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, info, warn};

type BuildOutcome = std::result::Result<Arc<SearchIndex>, Arc<Error>>;
type SharedBuild = Shared<BoxFuture<'static, BuildOutcome>>;

/// Observable state of the shared index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    /// No build has been started.
    Uninitialized,
    /// A build is in flight.
    Building,
    /// The index is built and serving queries.
    Ready,
    /// The last build failed; the next call rebuilds.
    Failed,
}

enum Slot {
    Uninitialized,
    Building { generation: u64, build: SharedBuild },
    Ready(Arc<SearchIndex>),
    Failed(Arc<Error>),
}

struct Inner {
    slot: Slot,
    generation: u64,
}

/// Search and page lookup over one content store.
///
/// Cheap to clone; clones share the same index.
#[derive(Clone)]
pub struct SearchService {
    store: Arc<dyn ContentStore>,
    config: Arc<Config>,
    inner: Arc<Mutex<Inner>>,
}

impl SearchService {
    /// Service over `store`; nothing is fetched until the first search.
    pub fn new(store: Arc<dyn ContentStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
            inner: Arc::new(Mutex::new(Inner {
                slot: Slot::Uninitialized,
                generation: 0,
            })),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Backing content store.
    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    /// Current index state.
    pub fn state(&self) -> IndexState {
        match lock(&self.inner).slot {
            Slot::Uninitialized => IndexState::Uninitialized,
            Slot::Building { .. } => IndexState::Building,
            Slot::Ready(_) => IndexState::Ready,
            Slot::Failed(_) => IndexState::Failed,
        }
    }

    /// The most recent build failure, while in the `Failed` state.
    pub fn last_error(&self) -> Option<Arc<Error>> {
        match &lock(&self.inner).slot {
            Slot::Failed(err) => Some(Arc::clone(err)),
            Slot::Uninitialized | Slot::Building { .. } | Slot::Ready(_) => None,
        }
    }

    /// The built index, building it first if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexBuild`] carrying the shared cause when the build
    /// this call waited on failed.
    pub async fn index(&self) -> Result<Arc<SearchIndex>> {
        let (generation, build) = {
            let mut inner = lock(&self.inner);
            match &inner.slot {
                Slot::Ready(index) => return Ok(Arc::clone(index)),
                Slot::Building { generation, build } => (*generation, build.clone()),
                Slot::Uninitialized | Slot::Failed(_) => self.start_build(&mut inner),
            }
        };

        let outcome = build.await;
        // the build task publishes its own outcome; this covers a task that
        // never got to do so
        publish(&self.inner, generation, &outcome);
        outcome.map_err(Error::IndexBuild)
    }

    /// Query the shared index, waiting for it to be built.
    pub async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        let index = self.index().await?;
        index.search(query, options)
    }

    /// Fetch one page fresh from the store with its navigation.
    ///
    /// Independent of the search index: this never waits for a build.
    pub async fn page(&self, slug: &str) -> Result<Option<Page>> {
        let Some(document) = self.store.fetch_by_slug(slug).await? else {
            debug!("No page with slug '{}'", slug);
            return Ok(None);
        };

        Ok(Some(Page {
            url: document.url(&self.config.routes),
            outline: extract_outline(&document.content),
            anchors: heading_anchors(&document.content),
            document,
        }))
    }

    fn start_build(&self, inner: &mut Inner) -> (u64, SharedBuild) {
        inner.generation += 1;
        let generation = inner.generation;
        debug!("Starting index build #{}", generation);

        let store = Arc::clone(&self.store);
        let config = Arc::clone(&self.config);
        let state = Arc::clone(&self.inner);

        let task = tokio::spawn(async move {
            let outcome = build_index(store.as_ref(), config).await.map_err(Arc::new);
            publish(&state, generation, &outcome);
            outcome
        });

        let build = task
            .map(|joined| {
                joined.unwrap_or_else(|e| {
                    Err(Arc::new(Error::Index(format!("Index build task failed: {e}"))))
                })
            })
            .boxed()
            .shared();

        inner.slot = Slot::Building {
            generation,
            build: build.clone(),
        };
        (generation, build)
    }
}

async fn build_index(store: &dyn ContentStore, config: Arc<Config>) -> Result<Arc<SearchIndex>> {
    let start = Instant::now();
    let documents = store.fetch_all().await?;
    debug!("Fetched {} documents for indexing", documents.len());

    let index = tokio::task::spawn_blocking(move || SearchIndex::build(&documents, &config))
        .await
        .map_err(|e| Error::Index(format!("Index build task failed: {e}")))??;

    info!(
        "Search index ready with {} records in {}ms",
        index.len(),
        start.elapsed().as_millis()
    );
    Ok(Arc::new(index))
}

/// Record a finished build, unless a newer build has already taken over.
fn publish(state: &Mutex<Inner>, generation: u64, outcome: &BuildOutcome) {
    let mut inner = lock(state);
    let current = matches!(
        inner.slot,
        Slot::Building { generation: g, .. } if g == generation
    );
    if !current {
        return;
    }

    inner.slot = match outcome {
        Ok(index) => Slot::Ready(Arc::clone(index)),
        Err(err) => {
            warn!("Index build #{} failed ({}): {}", generation, err.category(), err);
            Slot::Failed(Arc::clone(err))
        },
    };
}

fn lock(state: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
