use reqwest::StatusCode;

/// Failure modes shared by the metadata and image-search clients.
///
/// A successful response whose envelope lacks the expected payload is not an
/// error; the clients surface that as `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("transport failure: {0}")]
    Network(reqwest::Error),
    #[error("unexpected response status: {0}")]
    HttpStatus(StatusCode),
    #[error("malformed response body: {0}")]
    Decode(serde_json::Error),
}
