//! Fetching a meteorite's detail page and extracting its fields.

mod client;
mod parser;
#[cfg(test)]
pub(crate) mod testing;

pub use self::client::*;
pub use self::parser::*;

use tracing::{debug, warn};

use crate::error::FetchError;
use crate::meteorite::Meteorite;
use crate::TARGET_WEB_REQUEST;

/// Download the page and locate its detail sub-table.
pub async fn fetch_detail_table<S>(source: &S, url: &str) -> Result<DetailTable, FetchError>
where
    S: PageSource + ?Sized,
{
    let body = source.get(url).await?;
    debug!(target: TARGET_WEB_REQUEST, "Received {} bytes from {}", body.len(), url);
    DetailTable::parse(&body, url)
}

/// Enrich one meteorite from its detail page.
///
/// Previous details are cleared first. On error the meteorite is left with every detail
/// field unset and a `Failed` status; nothing else is affected.
pub async fn fetch_and_extract<S>(source: &S, meteorite: &mut Meteorite) -> Result<(), FetchError>
where
    S: PageSource + ?Sized,
{
    let url = meteorite.detail_url.clone();
    meteorite.begin_attempt();

    match fetch_detail_table(source, &url).await {
        Ok(table) => {
            meteorite.attach_document(table);
            meteorite.extract_properties();
            Ok(())
        }
        Err(err) => {
            if let FetchError::LayoutMismatch { .. } = err {
                warn!(
                    target: TARGET_WEB_REQUEST,
                    "The table couldn't be found for {}, more information may be available at {}",
                    meteorite.name,
                    url
                );
            }
            meteorite.mark_failed(&err);
            Err(err)
        }
    }
}
