use std::time::Duration;

use anyhow::Context as _;
use serde::Deserialize;

use crate::cli::SearchArgs;
use crate::error::FetchError;

/// Production image-search service.
pub const DEFAULT_ENDPOINT: &str = "https://images-api.nasa.gov/search";

/// Environment override for the image-search endpoint.
pub const ENDPOINT_ENV: &str = "LINKCARD_IMAGE_ENDPOINT";

/// Item records are opaque to the card; they are passed through to consumers
/// exactly as the service returned them.
pub type ImageResult = serde_json::Value;

#[derive(Debug, Deserialize)]
struct Collection {
    #[serde(default)]
    items: Vec<ImageResult>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    collection: Option<Collection>,
}

/// Pick the image-search endpoint: explicit flag, then environment, then the
/// production default.
pub fn resolve_endpoint(flag: Option<String>) -> String {
    flag.or_else(|| std::env::var(ENDPOINT_ENV).ok())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned())
}

#[derive(Debug, Clone)]
pub struct ImageSearchClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ImageSearchClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build image search http client")?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    /// Search the image collections for `query`, filtered to image media.
    ///
    /// `Ok(Some(items))` preserves the service's ordering. `Ok(None)` means
    /// the response was successful but carried no collection; callers decide
    /// whether that replaces anything.
    pub async fn search(&self, query: &str) -> Result<Option<Vec<ImageResult>>, FetchError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("media_type", "image"), ("q", query)])
            .send()
            .await
            .map_err(FetchError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status));
        }

        let raw = response.text().await.map_err(FetchError::Network)?;
        let envelope: Envelope = serde_json::from_str(&raw).map_err(FetchError::Decode)?;

        Ok(envelope.collection.map(|collection| collection.items))
    }
}

/// `search` subcommand: query the image service directly and print one JSON
/// record per item.
pub async fn run(args: SearchArgs) -> anyhow::Result<()> {
    let client = ImageSearchClient::new(
        resolve_endpoint(args.endpoint),
        Duration::from_secs(args.timeout_secs),
    )
    .context("build image search client")?;

    let Some(items) = client.search(&args.query).await.context("image search")? else {
        tracing::info!(query = %args.query, "response carried no collection");
        return Ok(());
    };

    for item in items {
        println!("{}", serde_json::to_string(&item).context("serialize item")?);
    }

    Ok(())
}
