//! Loading the dataset from disk or over HTTP, and the connectivity probe run before it.

use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

use super::types::Dataset;
use crate::error::DatasetError;
use crate::TARGET_WEB_REQUEST;

pub const CONNECTIVITY_PROBE_URL: &str = "https://www.qwant.com";
pub const CONNECTIVITY_TIMEOUT: Duration = Duration::from_secs(5);

/// Helper function to validate a URL
pub fn is_valid_url(url: &str) -> bool {
    if let Ok(parsed) = url::Url::parse(url) {
        parsed.scheme() == "http" || parsed.scheme() == "https"
    } else {
        false
    }
}

/// Returns true when `url` answers at all, whatever the status code.
pub async fn check_connection(client: &reqwest::Client, url: &str) -> bool {
    check_connection_within(client, url, CONNECTIVITY_TIMEOUT).await
}

/// As `check_connection`, giving up after `limit`.
pub async fn check_connection_within(client: &reqwest::Client, url: &str, limit: Duration) -> bool {
    match timeout(limit, client.get(url).send()).await {
        Ok(Ok(response)) => {
            debug!(target: TARGET_WEB_REQUEST, "Connectivity probe to {} returned {}", url, response.status());
            true
        }
        Ok(Err(err)) => {
            warn!(target: TARGET_WEB_REQUEST, "Connectivity probe to {} failed: {}", url, err);
            false
        }
        Err(_) => {
            warn!(
                target: TARGET_WEB_REQUEST,
                "Connectivity probe to {} timed out after {:?}", url, limit
            );
            false
        }
    }
}

/// Download a JSON dataset. The whole request, body included, must finish within `limit`.
pub async fn fetch_dataset(
    client: &reqwest::Client,
    url: &str,
    limit: Duration,
) -> Result<Dataset, DatasetError> {
    info!(target: TARGET_WEB_REQUEST, "Downloading dataset from {}", url);

    let remote_error = |reason: String| DatasetError::Remote {
        url: url.to_string(),
        reason,
    };

    let download = async {
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| remote_error(e.to_string()))?;

        if !response.status().is_success() {
            return Err(remote_error(format!("status {}", response.status())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| remote_error(e.to_string()))?;
        Ok::<_, DatasetError>(body)
    };

    let body = timeout(limit, download)
        .await
        .map_err(|_| remote_error(format!("timed out after {} seconds", limit.as_secs_f64())))??;
    Dataset::from_json_str(&body)
}

/// `source` is either an http(s) URL or a local path.
pub async fn load_dataset(
    client: &reqwest::Client,
    source: &str,
    limit: Duration,
) -> Result<Dataset, DatasetError> {
    if is_valid_url(source) {
        fetch_dataset(client, source, limit).await
    } else {
        debug!("Reading dataset from {}", source);
        Dataset::from_json_file(source)
    }
}
