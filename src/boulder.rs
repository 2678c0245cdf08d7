//! The session aggregate: a dataset, its allow-lists, and the current selection.
//!
//! A `Boulder` moves through `Empty -> Selected -> Enriched`. A new search replaces the
//! selection and drops any earlier enrichment; `dump_search` returns to `Empty`.

use std::fmt;
use tracing::info;

use crate::dataset::{AllowLists, Dataset};
use crate::enrich::{enrich_batch, BatchProgress, BatchReport, ConcurrencyLimit};
use crate::error::SessionError;
use crate::fetch::PageSource;
use crate::meteorite::Meteorite;
use crate::report::{Column, Report};
use crate::search::{NotFound, SearchQuery};
use crate::TARGET_SEARCH;

#[derive(Debug, Default)]
pub enum SessionState {
    #[default]
    Empty,
    Selected(Vec<Meteorite>),
    Enriched {
        meteorites: Vec<Meteorite>,
        batch: BatchReport,
    },
}

impl SessionState {
    pub fn meteorites(&self) -> &[Meteorite] {
        match self {
            SessionState::Empty => &[],
            SessionState::Selected(meteorites) => meteorites,
            SessionState::Enriched { meteorites, .. } => meteorites,
        }
    }
}

#[derive(Debug)]
pub struct Boulder {
    dataset: Dataset,
    allow_lists: AllowLists,
    state: SessionState,
}

impl Boulder {
    pub fn new(dataset: Dataset) -> Self {
        let allow_lists = AllowLists::from_dataset(&dataset);
        Self {
            dataset,
            allow_lists,
            state: SessionState::Empty,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn allow_lists(&self) -> &AllowLists {
        &self.allow_lists
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn selection(&self) -> &[Meteorite] {
        self.state.meteorites()
    }

    pub fn is_enriched(&self) -> bool {
        matches!(self.state, SessionState::Enriched { .. })
    }

    /// Run `query` and replace the selection with fresh entities built from the matches.
    ///
    /// On `NotFound` the previous state is kept.
    pub fn search(&mut self, query: &SearchQuery) -> Result<usize, NotFound> {
        let rows = query.apply(&self.dataset).into_result()?;
        let meteorites: Vec<Meteorite> = rows.into_iter().map(Meteorite::from_row).collect();
        let count = meteorites.len();

        info!(target: TARGET_SEARCH, "Selected {} meteorites", count);
        self.state = SessionState::Selected(meteorites);
        Ok(count)
    }

    pub fn validate_selection(&self) -> Result<&[Meteorite], SessionError> {
        match &self.state {
            SessionState::Empty => Err(SessionError::NoSelection),
            state => Ok(state.meteorites()),
        }
    }

    pub fn dump_search(&mut self) {
        self.state = SessionState::Empty;
    }

    /// Enrich every selected meteorite. The session is marked enriched once the batch has
    /// completed, whatever the per-meteorite outcomes were.
    pub async fn request_details<S, F>(
        &mut self,
        source: &S,
        max_concurrency: usize,
        on_progress: F,
    ) -> Result<&BatchReport, SessionError>
    where
        S: PageSource + ?Sized,
        F: FnMut(BatchProgress<'_>),
    {
        let limit = ConcurrencyLimit::new(max_concurrency)?;
        let mut meteorites = match std::mem::take(&mut self.state) {
            SessionState::Empty => return Err(SessionError::NoSelection),
            SessionState::Selected(meteorites) => meteorites,
            SessionState::Enriched { meteorites, .. } => meteorites,
        };

        match enrich_batch(source, &mut meteorites, limit.get(), on_progress).await {
            Ok(batch) => {
                self.state = SessionState::Enriched { meteorites, batch };
            }
            Err(err) => {
                self.state = SessionState::Selected(meteorites);
                return Err(err.into());
            }
        }

        match &self.state {
            SessionState::Enriched { batch, .. } => Ok(batch),
            _ => Err(SessionError::NotEnriched),
        }
    }

    pub fn last_batch(&self) -> Option<&BatchReport> {
        match &self.state {
            SessionState::Enriched { batch, .. } => Some(batch),
            _ => None,
        }
    }

    pub fn report(&self, omit: &[Column]) -> Result<Report, SessionError> {
        match &self.state {
            SessionState::Empty => Err(SessionError::NoSelection),
            SessionState::Selected(_) => Err(SessionError::NotEnriched),
            SessionState::Enriched { meteorites, .. } => Ok(Report::build(meteorites, omit)),
        }
    }
}

impl fmt::Display for Boulder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Boulder with {} rows of meteorite data, {} selected",
            self.dataset.len(),
            self.selection().len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EnrichError;
    use crate::fetch::testing::{StaticPages, DETAIL_PAGE};

    const DATASET: &str = r#"[
        {"name": "Abee", "numeric_id": 4, "year": 1952, "country": "Alberta, Canada", "type": "EH4", "mass": "107000", "URL": "https://example.org/4"},
        {"name": "Acapulco", "numeric_id": 10, "year": 1976, "country": "Mexico", "type": "Acapulcoite", "mass": "1914", "URL": "https://example.org/10"},
        {"name": "Achiras", "numeric_id": 370, "year": 1902, "country": "Argentina", "type": "L6", "mass": "780", "URL": "https://example.org/370"}
    ]"#;

    fn boulder() -> Boulder {
        Boulder::new(Dataset::from_json_str(DATASET).unwrap())
    }

    fn by_name(name: &str) -> SearchQuery {
        SearchQuery {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_search_and_dump() {
        let mut boulder = boulder();
        assert!(matches!(
            boulder.validate_selection(),
            Err(SessionError::NoSelection)
        ));

        assert_eq!(boulder.search(&by_name("ac")).unwrap(), 2);
        let names: Vec<_> = boulder
            .validate_selection()
            .unwrap()
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["Acapulco", "Achiras"]);

        boulder.dump_search();
        assert!(matches!(boulder.state(), SessionState::Empty));
    }

    #[test]
    fn test_not_found_keeps_selection() {
        let mut boulder = boulder();
        boulder.search(&by_name("abee")).unwrap();

        let not_found = boulder.search(&by_name("zagami")).unwrap_err();
        assert!(not_found.to_string().contains("zagami"));
        assert_eq!(boulder.selection().len(), 1);
    }

    #[test]
    fn test_allow_lists_derived_from_dataset() {
        let boulder = boulder();
        assert!(boulder.allow_lists().contains_country("Mexico"));
        assert!(boulder.allow_lists().contains_type("Acapulcoite"));
    }

    #[tokio::test]
    async fn test_request_details_without_selection() {
        let mut boulder = boulder();
        let err = boulder
            .request_details(&StaticPages::default(), 5, |_| {})
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::NoSelection);
    }

    #[tokio::test]
    async fn test_invalid_concurrency_keeps_selection() {
        let mut boulder = boulder();
        boulder.search(&by_name("abee")).unwrap();

        let err = boulder
            .request_details(&StaticPages::default(), 0, |_| {})
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SessionError::Enrich(EnrichError::InvalidConcurrency("0".to_string()))
        );
        assert!(matches!(boulder.state(), SessionState::Selected(_)));
    }

    #[tokio::test]
    async fn test_request_details_then_report() {
        let mut boulder = boulder();
        boulder.search(&by_name("a")).unwrap();
        assert_eq!(boulder.report(&[]), Err(SessionError::NotEnriched));

        let pages = StaticPages::default().with_page("https://example.org/4", DETAIL_PAGE);
        let batch = boulder.request_details(&pages, 25, |_| {}).await.unwrap();
        assert_eq!(batch.total, 3);
        assert_eq!(batch.succeeded, 1);
        assert_eq!(batch.failures.len(), 2);
        assert!(boulder.is_enriched());

        let report = boulder.report(&[Column::Coordinates]).unwrap();
        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.duds, 2);
    }
}
