//! Pure transition logic for the preview card.
//!
//! State changes happen in two steps: [`PreviewState::set_link`] mutates the
//! tracked fields and returns the network effects to issue, each tagged with
//! the generation it belongs to; [`PreviewState::apply_metadata`] and
//! [`PreviewState::apply_search`] accept a completion only while its
//! generation is still current, so a response for a link that is no longer
//! tracked can never clobber newer state. Network execution lives in
//! [`crate::card`].

use crate::imagery::ImageResult;
use crate::metadata::MetadataPayload;
use crate::render::CardSnapshot;
use crate::theme;

pub const FALLBACK_TITLE: &str = "No Title Available";
pub const FALLBACK_DESC: &str = "No Description Available";
pub const FALLBACK_IMAGE: &str = "No Image Available";

/// Network request the caller must issue after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SearchImages { query: String, generation: u64 },
    FetchMetadata { link: String, generation: u64 },
}

/// Terminal result of a metadata fetch, as seen by the state machine.
#[derive(Debug, Clone)]
pub enum MetadataOutcome {
    /// The service returned a usable payload.
    Resolved(MetadataPayload),
    /// The service answered but had nothing for the page.
    Missing,
    /// Transport, status, decode, or timeout failure.
    Failed,
}

#[derive(Debug, Default)]
pub struct PreviewState {
    link: String,
    title: String,
    desc: String,
    image: String,
    theme_color: String,
    loading: bool,
    items: Vec<ImageResult>,
    generation: u64,
}

impl PreviewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// React to the tracked link changing.
    ///
    /// A new non-empty link starts a resolution cycle: the loading flag goes
    /// up, stale imagery is dropped, and both lookups are requested under a
    /// fresh generation. Re-setting the identical link does nothing. An empty
    /// link clears the imagery and invalidates whatever is still in flight
    /// without issuing requests.
    pub fn set_link(&mut self, new_link: &str) -> Vec<Effect> {
        if new_link.is_empty() {
            self.items.clear();
            self.link.clear();
            self.generation += 1;
            // Terminates an outstanding cycle; there is no longer a fetch
            // for the current (empty) link.
            self.loading = false;
            return Vec::new();
        }

        if new_link == self.link {
            return Vec::new();
        }

        self.link = new_link.to_owned();
        self.generation += 1;
        self.loading = true;
        self.items.clear();

        vec![
            Effect::SearchImages {
                query: self.link.clone(),
                generation: self.generation,
            },
            Effect::FetchMetadata {
                link: self.link.clone(),
                generation: self.generation,
            },
        ]
    }

    /// Apply a metadata completion. Returns false when the completion was
    /// issued under an older generation and has been discarded.
    ///
    /// Every accepted outcome, failure included, ends the loading state.
    pub fn apply_metadata(&mut self, generation: u64, outcome: MetadataOutcome) -> bool {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "discarding stale metadata completion"
            );
            return false;
        }

        match outcome {
            MetadataOutcome::Resolved(payload) => {
                self.title = payload.title.unwrap_or_default();
                self.desc = payload.description.unwrap_or_default();
                self.image = payload.image.unwrap_or_default();
                self.theme_color =
                    theme::resolve(payload.theme_color.as_deref(), &host_of(&self.link));
            }
            MetadataOutcome::Missing => {
                self.title = FALLBACK_TITLE.to_owned();
                self.desc = FALLBACK_DESC.to_owned();
                self.image = FALLBACK_IMAGE.to_owned();
                self.theme_color = theme::resolve(None, &host_of(&self.link));
            }
            MetadataOutcome::Failed => {}
        }

        self.loading = false;
        true
    }

    /// Apply an image-search completion. `None` means the response carried no
    /// collection, which leaves the current imagery untouched. Never affects
    /// the loading flag; only metadata resolution ends a cycle.
    pub fn apply_search(&mut self, generation: u64, found: Option<Vec<ImageResult>>) -> bool {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "discarding stale search completion"
            );
            return false;
        }

        if let Some(items) = found {
            self.items = items;
        }
        true
    }

    pub fn items(&self) -> &[ImageResult] {
        &self.items
    }

    /// Read-only copy for the renderer boundary.
    pub fn snapshot(&self) -> CardSnapshot {
        CardSnapshot {
            loading: self.loading,
            link: self.link.clone(),
            title: self.title.clone(),
            desc: self.desc.clone(),
            image: self.image.clone(),
            theme_color: self.theme_color.clone(),
        }
    }
}

fn host_of(link: &str) -> String {
    url::Url::parse(link)
        .ok()
        .and_then(|url| url.host_str().map(str::to_owned))
        .unwrap_or_default()
}
