use async_trait::async_trait;
use std::collections::HashMap;

use super::PageSource;
use crate::error::FetchError;

pub(crate) const DETAIL_PAGE: &str = include_str!("../../tests/fixtures/detail_page.html");
pub(crate) const NO_MARKER_PAGE: &str = include_str!("../../tests/fixtures/no_marker_page.html");

/// Serves fixed bodies by URL; anything else is a 404.
#[derive(Default)]
pub(crate) struct StaticPages {
    pages: HashMap<String, String>,
}

impl StaticPages {
    pub(crate) fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }
}

#[async_trait]
impl PageSource for StaticPages {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}
