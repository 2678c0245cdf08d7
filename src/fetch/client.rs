//! HTTP access to catalog detail pages.

use async_trait::async_trait;
use reqwest::{cookie::Jar, header};
use std::sync::Arc;
use tokio::time::{timeout, Duration};
use tracing::debug;

use crate::error::FetchError;
use crate::TARGET_WEB_REQUEST;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/115.0";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Something that can return the HTML body behind a URL.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn get(&self, url: &str) -> Result<String, FetchError>;
}

/// Create a client with a cookie store and gzip support
pub fn create_http_client() -> Result<reqwest::Client, reqwest::Error> {
    let cookie_store = Jar::default();
    reqwest::Client::builder()
        .cookie_store(true)
        .cookie_provider(Arc::new(cookie_store))
        .gzip(true)
        .redirect(reqwest::redirect::Policy::default())
        .build()
}

/// `PageSource` over reqwest, sending browser-like headers.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: reqwest::Client,
    user_agent: String,
    request_timeout: Duration,
}

impl HttpPageSource {
    pub fn new(user_agent: impl Into<String>, request_timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(create_http_client()?, user_agent, request_timeout))
    }

    pub fn with_client(
        client: reqwest::Client,
        user_agent: impl Into<String>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            client,
            user_agent: user_agent.into(),
            request_timeout,
        }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    async fn get_body(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .header(header::USER_AGENT, &self.user_agent)
            .header(
                header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.5")
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        debug!(target: TARGET_WEB_REQUEST, "Request to {} returned {}", url, status);
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|err| FetchError::Body {
            url: url.to_string(),
            reason: err.to_string(),
        })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        match timeout(self.request_timeout, self.get_body(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
                secs: self.request_timeout.as_secs(),
            }),
        }
    }
}
