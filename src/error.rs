//! Error types shared across the selection and enrichment pipeline.

use thiserror::Error;

/// Malformed predicate input, rejected before it reaches the filters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name must be at least 2 characters long, got '{0}'")]
    NameTooShort(String),
    #[error("Name must contain at least one letter, got '{0}'")]
    NameWithoutLetter(String),
    #[error("Numeric ID range must be one or two integers separated by a comma, got '{0}'")]
    InvalidRange(String),
    #[error("Country not found in the list of countries: '{0}'")]
    UnknownCountry(String),
    #[error("mtype not found in the list of types. Check entire lists utils: '{0}'")]
    UnknownType(String),
}

/// A detail page could not be turned into enrichment fields.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} timed out after {secs} seconds")]
    Timeout { url: String, secs: u64 },
    #[error("non-success status {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("failed to read response body from {url}: {reason}")]
    Body { url: String, reason: String },
    #[error("page layout not recognized at {url}: {reason}")]
    LayoutMismatch { url: String, reason: &'static str },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Transport { url, .. }
            | FetchError::Timeout { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Body { url, .. }
            | FetchError::LayoutMismatch { url, .. } => url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrichError {
    #[error("concurrency must be an integer of at least 1, got '{0}'")]
    InvalidConcurrency(String),
}

/// An environment setting that is present but unreadable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Concurrency(#[from] EnrichError),
    #[error("request timeout must be a whole number of seconds of at least 1, got '{0}'")]
    InvalidTimeout(String),
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to download dataset from {url}: {reason}")]
    Remote { url: String, reason: String },
    #[error("dataset row {index} has an empty name")]
    EmptyName { index: usize },
    #[error("dataset row {index} has an empty detail URL")]
    EmptyUrl { index: usize },
    #[error("numeric_id {0} appears more than once in the dataset")]
    DuplicateId(u64),
}

/// An operation on the session aggregate that its current state does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no selection has been made yet, run a search first")]
    NoSelection,
    #[error("selected meteorites have not been enriched yet")]
    NotEnriched,
    #[error(transparent)]
    Enrich(#[from] EnrichError),
}
