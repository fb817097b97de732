//! Async driver for the preview card.
//!
//! [`PreviewCard`] owns the state machine behind a mutex and executes the
//! effects [`PreviewState::set_link`] emits, one task per request. Source
//! failures are logged and degraded to terminal outcomes rather than
//! propagated; the card stays usable and retries on the next link change.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use tokio::sync::Notify;

use crate::cli::PreviewArgs;
use crate::error::FetchError;
use crate::imagery::{self, ImageResult, ImageSearchClient};
use crate::metadata::{self, MetadataClient, MetadataPayload};
use crate::render::CardSnapshot;
use crate::state::{Effect, MetadataOutcome, PreviewState};

/// Bound on how long a single request may keep the card loading.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the card gets page metadata from. [`MetadataClient`] is the HTTP
/// implementation; tests substitute scripted sources.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn fetch(&self, link: &str) -> Result<Option<MetadataPayload>, FetchError>;
}

/// Where the card gets related imagery from.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn search(&self, query: &str) -> Result<Option<Vec<ImageResult>>, FetchError>;
}

#[async_trait]
impl MetadataSource for MetadataClient {
    async fn fetch(&self, link: &str) -> Result<Option<MetadataPayload>, FetchError> {
        MetadataClient::fetch(self, link).await
    }
}

#[async_trait]
impl ImageSource for ImageSearchClient {
    async fn search(&self, query: &str) -> Result<Option<Vec<ImageResult>>, FetchError> {
        ImageSearchClient::search(self, query).await
    }
}

#[derive(Default)]
struct Inflight {
    count: AtomicUsize,
    drained: Notify,
}

pub struct PreviewCard {
    state: Arc<Mutex<PreviewState>>,
    metadata: Arc<dyn MetadataSource>,
    images: Arc<dyn ImageSource>,
    fetch_timeout: Duration,
    inflight: Arc<Inflight>,
}

impl PreviewCard {
    pub fn new(
        metadata: Arc<dyn MetadataSource>,
        images: Arc<dyn ImageSource>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(PreviewState::new())),
            metadata,
            images,
            fetch_timeout,
            inflight: Arc::new(Inflight::default()),
        }
    }

    /// React to the tracked link changing. Returns immediately; completions
    /// are applied by background tasks and surface through [`Self::snapshot`].
    pub fn set_link(&self, link: &str) {
        let effects = lock(&self.state).set_link(link);
        for effect in effects {
            self.issue(effect);
        }
    }

    fn issue(&self, effect: Effect) {
        self.inflight.count.fetch_add(1, Ordering::AcqRel);

        let state = Arc::clone(&self.state);
        let metadata = Arc::clone(&self.metadata);
        let images = Arc::clone(&self.images);
        let inflight = Arc::clone(&self.inflight);
        let fetch_timeout = self.fetch_timeout;

        tokio::spawn(async move {
            match effect {
                Effect::FetchMetadata { link, generation } => {
                    let outcome =
                        match tokio::time::timeout(fetch_timeout, metadata.fetch(&link)).await {
                            Ok(Ok(Some(payload))) => MetadataOutcome::Resolved(payload),
                            Ok(Ok(None)) => MetadataOutcome::Missing,
                            Ok(Err(err)) => {
                                tracing::warn!(%link, error = %err, "metadata fetch failed");
                                MetadataOutcome::Failed
                            }
                            Err(_) => {
                                tracing::warn!(%link, "metadata fetch timed out");
                                MetadataOutcome::Failed
                            }
                        };
                    lock(&state).apply_metadata(generation, outcome);
                }
                Effect::SearchImages { query, generation } => {
                    match tokio::time::timeout(fetch_timeout, images.search(&query)).await {
                        Ok(Ok(found)) => {
                            lock(&state).apply_search(generation, found);
                        }
                        Ok(Err(err)) => tracing::warn!(%query, error = %err, "image search failed"),
                        Err(_) => tracing::warn!(%query, "image search timed out"),
                    }
                }
            }

            if inflight.count.fetch_sub(1, Ordering::AcqRel) == 1 {
                // notify_one stores a permit, so a settle() that checks the
                // counter just before this decrement still wakes up.
                inflight.drained.notify_one();
            }
        });
    }

    /// Wait until every task issued so far has applied or discarded its
    /// completion. Intended for one waiter at a time (the CLI and tests).
    pub async fn settle(&self) {
        while self.inflight.count.load(Ordering::Acquire) != 0 {
            self.inflight.drained.notified().await;
        }
    }

    pub fn snapshot(&self) -> CardSnapshot {
        lock(&self.state).snapshot()
    }

    pub fn items(&self) -> Vec<ImageResult> {
        lock(&self.state).items().to_vec()
    }
}

fn lock(state: &Mutex<PreviewState>) -> MutexGuard<'_, PreviewState> {
    state.lock().expect("preview state lock poisoned")
}

/// `preview` subcommand: resolve one URL and print the renderer snapshot.
pub async fn run(args: PreviewArgs) -> anyhow::Result<()> {
    let timeout = Duration::from_secs(args.timeout_secs);

    let metadata = MetadataClient::new(metadata::resolve_endpoint(args.metadata_endpoint), timeout)
        .context("build metadata client")?;
    let images = ImageSearchClient::new(imagery::resolve_endpoint(args.image_endpoint), timeout)
        .context("build image search client")?;

    let card = PreviewCard::new(Arc::new(metadata), Arc::new(images), timeout);
    card.set_link(&args.url);
    card.settle().await;

    let snapshot = card.snapshot();
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&snapshot).context("serialize snapshot")?
        );
    } else {
        print!("{}", snapshot.to_text());
        let items = card.items();
        if !items.is_empty() {
            println!("Related imagery: {} item(s)", items.len());
        }
    }

    Ok(())
}
