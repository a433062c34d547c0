use crate::{feeds::FeedSpec, http_client::HttpClient};
use bytes::Bytes;
use reqwest::StatusCode;
use tracing::{info, warn};
use url::Url;

/// Content type every relayed feed is served with.
pub const PROTOBUF_CONTENT_TYPE: &str = "application/x-protobuf";

/// Outcome of relaying a single feed request.
pub type RelayResult = Result<FeedPayload, RelayError>;

/// The unmodified body of a successful upstream response.
#[derive(Debug, Clone)]
pub struct FeedPayload {
    /// Raw bytes exactly as received from the upstream.
    pub body: Bytes,
}

impl FeedPayload {
    /// See [`PROTOBUF_CONTENT_TYPE`].
    pub const fn content_type(&self) -> &'static str {
        PROTOBUF_CONTENT_TYPE
    }
}

/// Why a feed could not be relayed.
///
/// Both variants are reported to clients the same way; the distinction only
/// exists for diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The upstream could not be reached or its body could not be read
    /// (timeout, refused connection, DNS failure, ...).
    #[error("{0}")]
    Unreachable(#[source] reqwest::Error),

    /// The upstream answered with a status outside of 2xx, including
    /// redirects that were not followed.
    #[error("upstream responded with unsuccessful status {status} for url ({url})")]
    Rejected {
        /// Status the upstream answered with.
        status: StatusCode,
        /// Upstream that was fetched.
        url: Url,
    },
}

/// Fetch the feed described by `spec` from its upstream with a single GET.
pub async fn fetch_feed(client: &HttpClient, spec: &FeedSpec<'_>) -> RelayResult {
    info!("Relaying request for {} from {}", spec.name, spec.upstream);
    fetch_upstream(client, spec).await.inspect_err(|err| {
        warn!("Failed to fetch {} for {}: {err}", spec.upstream, spec.name);
    })
}

async fn fetch_upstream(client: &HttpClient, spec: &FeedSpec<'_>) -> RelayResult {
    let response = client
        .get(spec.upstream.as_str())
        .send()
        .await
        .map_err(RelayError::Unreachable)?;
    if !response.status().is_success() {
        return Err(RelayError::Rejected {
            status: response.status(),
            url: spec.upstream.clone(),
        });
    }
    let body = response.bytes().await.map_err(RelayError::Unreachable)?;
    Ok(FeedPayload { body })
}
