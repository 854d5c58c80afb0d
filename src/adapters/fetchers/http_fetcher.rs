use std::path::Path;
use std::time::Duration;

use tracing::debug;

use crate::core::errors::{KeyringSyncError, Result};
use crate::core::traits::fetcher::Fetcher;

/// Default timeout for a single key download.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Fetches key sources over HTTP(S), or from disk for `file://` URLs
/// and plain paths.
pub struct HttpFetcher {
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn build_client(&self, url: &str) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(format!("keyring-sync/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| fetch_failed(url, format!("Failed to create HTTP client: {e}")))
    }

    fn download(&self, url: &str) -> Result<Vec<u8>> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| fetch_failed(url, format!("Failed to create async runtime: {e}")))?;

        rt.block_on(async {
            let client = self.build_client(url)?;
            let resp = client
                .get(url)
                .send()
                .await
                .map_err(|e| fetch_failed(url, format!("request failed: {e}")))?;

            if !resp.status().is_success() {
                return Err(fetch_failed(
                    url,
                    format!("server returned status {}", resp.status()),
                ));
            }

            resp.bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| fetch_failed(url, format!("failed to read response body: {e}")))
        })
    }

    fn read_local(&self, url: &str, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path)
            .map_err(|e| fetch_failed(url, format!("cannot read {}: {e}", path.display())))
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let body = match source_kind(url) {
            SourceKind::Http => self.download(url)?,
            SourceKind::File(path) => self.read_local(url, Path::new(path))?,
        };
        debug!(%url, bytes = body.len(), "fetched key source");
        Ok(body)
    }
}

/// Where a configured source URL points.
#[derive(Debug, PartialEq, Eq)]
pub enum SourceKind<'a> {
    Http,
    File(&'a str),
}

/// Classify a source URL. Anything without an `http(s)://` scheme is a
/// local path, with an optional `file://` prefix.
pub fn source_kind(url: &str) -> SourceKind<'_> {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        SourceKind::Http
    } else {
        SourceKind::File(url.strip_prefix("file://").unwrap_or(url))
    }
}

fn fetch_failed(url: &str, reason: String) -> KeyringSyncError {
    KeyringSyncError::FetchFailed {
        url: url.to_string(),
        reason,
    }
}
