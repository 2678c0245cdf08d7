pub mod boulder;
pub mod dataset;
pub mod enrich;
pub mod environment;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod meteorite;
pub mod normalize;
pub mod progress;
pub mod report;
pub mod search;

pub use boulder::{Boulder, SessionState};
pub use dataset::{AllowLists, Dataset, DatasetRow};
pub use enrich::{enrich_batch, BatchProgress, BatchReport, ConcurrencyLimit};
pub use error::{ConfigError, DatasetError, EnrichError, FetchError, SessionError, ValidationError};
pub use fetch::{HttpPageSource, PageSource};
pub use meteorite::Meteorite;
pub use search::{IdRange, SearchOutcome, SearchQuery};

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_ENRICHMENT: &str = "enrichment";
pub const TARGET_SEARCH: &str = "search";

/// Hard ceiling on parallel detail-page requests against the catalog site.
pub const MAX_CONCURRENCY: usize = 25;
