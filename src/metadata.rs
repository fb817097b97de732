use std::time::Duration;

use anyhow::Context as _;
use serde::Deserialize;

use crate::error::FetchError;

/// Production metadata-lookup service.
pub const DEFAULT_ENDPOINT: &str = "https://open-apis.hax.cloud/api/services/website/metadata";

/// Environment override for the metadata-lookup endpoint.
pub const ENDPOINT_ENV: &str = "LINKCARD_METADATA_ENDPOINT";

/// Open Graph subset served by the metadata-lookup service. Every field is
/// optional; a page may declare any combination of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MetadataPayload {
    #[serde(rename = "og:title")]
    pub title: Option<String>,
    #[serde(rename = "og:description")]
    pub description: Option<String>,
    #[serde(rename = "og:image")]
    pub image: Option<String>,
    #[serde(rename = "theme-color")]
    pub theme_color: Option<String>,
}

impl MetadataPayload {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.image.is_none()
            && self.theme_color.is_none()
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    data: Option<MetadataPayload>,
}

/// Pick the metadata endpoint: explicit flag, then environment, then the
/// production default.
pub fn resolve_endpoint(flag: Option<String>) -> String {
    flag.or_else(|| std::env::var(ENDPOINT_ENV).ok())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned())
}

#[derive(Debug, Clone)]
pub struct MetadataClient {
    http: reqwest::Client,
    endpoint: String,
}

impl MetadataClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build metadata http client")?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    /// Look up page metadata for `link`. `Ok(None)` means the service
    /// answered but had nothing usable for the page, which is a valid
    /// outcome, not an error.
    pub async fn fetch(&self, link: &str) -> Result<Option<MetadataPayload>, FetchError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("q", link)])
            .send()
            .await
            .map_err(FetchError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status));
        }

        let raw = response.text().await.map_err(FetchError::Network)?;
        let envelope: Envelope = serde_json::from_str(&raw).map_err(FetchError::Decode)?;

        // `data: {}` carries no recognized field and counts as absent.
        Ok(envelope.data.filter(|payload| !payload.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::thread;

    use super::*;

    fn spawn_metadata_server(
        status: u16,
        body: &'static str,
    ) -> (String, mpsc::Sender<()>, thread::JoinHandle<()>) {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start tiny_http server");
        let addr = server.server_addr();
        let endpoint = format!("http://{addr}/metadata");

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }
                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let resp = tiny_http::Response::from_string(body).with_status_code(status);
                let _ = request.respond(resp);
            }
        });

        (endpoint, shutdown_tx, handle)
    }

    fn client(endpoint: &str) -> MetadataClient {
        MetadataClient::new(endpoint, Duration::from_secs(5)).expect("build client")
    }

    #[tokio::test]
    async fn fetch_returns_payload_fields() {
        let (endpoint, shutdown_tx, handle) = spawn_metadata_server(
            200,
            r##"{"data":{"og:title":"A","og:description":"B","og:image":"C","theme-color":"#fff"}}"##,
        );

        let payload = client(&endpoint)
            .fetch("https://example.com")
            .await
            .unwrap()
            .expect("payload present");
        assert_eq!(payload.title.as_deref(), Some("A"));
        assert_eq!(payload.description.as_deref(), Some("B"));
        assert_eq!(payload.image.as_deref(), Some("C"));
        assert_eq!(payload.theme_color.as_deref(), Some("#fff"));

        let _ = shutdown_tx.send(());
        let _ = handle.join();
    }

    #[tokio::test]
    async fn absent_data_is_a_valid_outcome() {
        let (endpoint, shutdown_tx, handle) = spawn_metadata_server(200, r#"{}"#);

        let payload = client(&endpoint).fetch("https://example.com").await.unwrap();
        assert!(payload.is_none());

        let _ = shutdown_tx.send(());
        let _ = handle.join();
    }

    #[tokio::test]
    async fn empty_data_object_counts_as_absent() {
        let (endpoint, shutdown_tx, handle) = spawn_metadata_server(200, r#"{"data":{}}"#);

        let payload = client(&endpoint).fetch("https://example.com").await.unwrap();
        assert!(payload.is_none());

        let _ = shutdown_tx.send(());
        let _ = handle.join();
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (endpoint, shutdown_tx, handle) = spawn_metadata_server(502, "bad gateway");

        let err = client(&endpoint)
            .fetch("https://example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::HttpStatus(status) if status.as_u16() == 502));

        let _ = shutdown_tx.send(());
        let _ = handle.join();
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let (endpoint, shutdown_tx, handle) = spawn_metadata_server(200, "not json");

        let err = client(&endpoint)
            .fetch("https://example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));

        let _ = shutdown_tx.send(());
        let _ = handle.join();
    }

    #[test]
    fn endpoint_resolution_prefers_the_flag() {
        assert_eq!(
            resolve_endpoint(Some("http://localhost:9/meta".to_owned())),
            "http://localhost:9/meta"
        );
    }
}
