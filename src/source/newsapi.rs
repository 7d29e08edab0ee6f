//! NewsAPI "everything" endpoint client.
//!
//! One call, one GET: the request URL is the configured base query with the
//! API key appended.  The body is always decoded, whatever the HTTP status,
//! because NewsAPI reports its own failures as a JSON error body.

use reqwest::header::USER_AGENT;
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use super::NewsSource;
use crate::article::{decode_api_failure, decode_envelope, Article};
use crate::error::FetchError;

const AGENT: &str = concat!("news-explorer/", env!("CARGO_PKG_VERSION"));

/// A NewsAPI query, e.g. `https://newsapi.org/v2/everything?q=football`.
pub struct NewsApiSource {
    client: Client,
    /// Base query URL, already carrying its search parameters.
    base_query: String,
    api_key: String,
}

impl NewsApiSource {
    /// Create a source that queries `base_query` with `api_key`.
    ///
    /// The client is taken from the caller so timeouts and connection
    /// pooling are configured in one place.
    pub fn new(client: Client, base_query: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_query: base_query.into(),
            api_key: api_key.into(),
        }
    }

    /// Build the request URL: `<base_query>&apiKey=<key>`.
    ///
    /// Fails without touching the network if the result is not an absolute
    /// http(s) URL.
    pub fn request_url(&self) -> Result<Url, FetchError> {
        let raw = format!("{}&apiKey={}", self.base_query, self.api_key);
        let invalid = |reason: String| FetchError::InvalidUrl {
            url: self.base_query.clone(),
            reason,
        };

        let url = Url::parse(&raw).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(invalid(format!("unsupported scheme `{other}`"))),
        }
    }
}

impl NewsSource for NewsApiSource {
    fn name(&self) -> &str {
        "NewsAPI"
    }

    async fn fetch_articles(&self) -> Result<Vec<Article>, FetchError> {
        let url = self.request_url()?;
        debug!(base = %self.base_query, "requesting articles");

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, AGENT)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.without_url().to_string()))?;
        debug!(%status, bytes = body.len(), "received response");

        match decode_envelope(&body) {
            Ok(envelope) => {
                info!(
                    total_results = envelope.total_results,
                    received = envelope.articles.len(),
                    "decoded articles"
                );
                Ok(envelope.articles)
            }
            Err(decode_err) => {
                if let Some(failure) = decode_api_failure(&body) {
                    warn!(%status, code = %failure.code, "API reported an error");
                    return Err(FetchError::Api {
                        code: failure.code,
                        message: failure.message,
                    });
                }
                warn!(
                    %status,
                    field = decode_err.field().unwrap_or("-"),
                    detail = decode_err.detail(),
                    "could not decode response"
                );
                Err(decode_err.into())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
