//! Row predicates over the dataset. Every filter is stable: matches keep dataset order.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::types::{IdRange, NotFound, SearchOutcome};
use crate::dataset::{Dataset, DatasetRow};
use crate::TARGET_SEARCH;

lazy_static! {
    static ref DIGITS: Regex = Regex::new(r"\d").unwrap();
}

/// Name with digits removed, trimmed and lower-cased ("Meteorite12" -> "meteorite").
fn name_stem(name: &str) -> String {
    DIGITS.replace_all(name, "").trim().to_lowercase()
}

fn equals_ignore_case(value: Option<&str>, query: &str) -> bool {
    value.is_some_and(|v| v.trim().to_lowercase() == query)
}

/// Substring match on the name stem, optionally narrowed by `numeric_id`.
pub fn filter_by_name<'a, I>(rows: I, query: &str, id_range: Option<IdRange>) -> SearchOutcome<'a>
where
    I: IntoIterator<Item = &'a DatasetRow>,
{
    let needle = query.to_lowercase();
    let matched = rows
        .into_iter()
        .filter(|row| name_stem(&row.name).contains(&needle))
        .filter(|row| id_range.map_or(true, |range| range.contains(row.numeric_id)))
        .collect();

    SearchOutcome::from_rows(matched, || NotFound::Name {
        query: query.to_string(),
        range: id_range,
    })
}

pub fn filter_by_id_range<'a, I>(rows: I, id_range: IdRange) -> SearchOutcome<'a>
where
    I: IntoIterator<Item = &'a DatasetRow>,
{
    let matched = rows
        .into_iter()
        .filter(|row| id_range.contains(row.numeric_id))
        .collect();
    SearchOutcome::from_rows(matched, || NotFound::IdRange(id_range))
}

/// Case-insensitive exact match on `type`.
pub fn filter_by_type<'a, I>(rows: I, query: &str) -> SearchOutcome<'a>
where
    I: IntoIterator<Item = &'a DatasetRow>,
{
    let needle = query.trim().to_lowercase();
    let matched = rows
        .into_iter()
        .filter(|row| equals_ignore_case(row.kind.as_deref(), &needle))
        .collect();
    SearchOutcome::from_rows(matched, || NotFound::Type(query.to_string()))
}

/// Case-insensitive exact match on `country`.
pub fn filter_by_country<'a, I>(rows: I, query: &str) -> SearchOutcome<'a>
where
    I: IntoIterator<Item = &'a DatasetRow>,
{
    let needle = query.trim().to_lowercase();
    let matched = rows
        .into_iter()
        .filter(|row| equals_ignore_case(row.country.as_deref(), &needle))
        .collect();
    SearchOutcome::from_rows(matched, || NotFound::Country(query.to_string()))
}

/// A set of optional predicates combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub name: Option<String>,
    pub id_range: Option<IdRange>,
    pub country: Option<String>,
    pub kind: Option<String>,
}

impl SearchQuery {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.id_range.is_none() && self.country.is_none() && self.kind.is_none()
    }

    /// Apply name, id range, country and type in that order. The first predicate to
    /// empty the set determines the `NotFound` reported.
    pub fn apply<'a>(&self, dataset: &'a Dataset) -> SearchOutcome<'a> {
        let mut rows: Vec<&'a DatasetRow> = dataset.rows().iter().collect();

        let name_step = match (&self.name, self.id_range) {
            (Some(name), range) => Some(filter_by_name(rows.iter().copied(), name, range)),
            (None, Some(range)) => Some(filter_by_id_range(rows.iter().copied(), range)),
            (None, None) => None,
        };
        if let Some(outcome) = name_step {
            rows = match outcome.into_result() {
                Ok(rows) => rows,
                Err(not_found) => return SearchOutcome::NotFound(not_found),
            };
        }

        if let Some(country) = &self.country {
            rows = match filter_by_country(rows, country).into_result() {
                Ok(rows) => rows,
                Err(not_found) => return SearchOutcome::NotFound(not_found),
            };
        }

        if let Some(kind) = &self.kind {
            rows = match filter_by_type(rows, kind).into_result() {
                Ok(rows) => rows,
                Err(not_found) => return SearchOutcome::NotFound(not_found),
            };
        }

        debug!(target: TARGET_SEARCH, "Query {:?} matched {} rows", self, rows.len());
        SearchOutcome::Found(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, id: u64, kind: &str, country: &str) -> DatasetRow {
        DatasetRow {
            name: name.to_string(),
            numeric_id: id,
            year: None,
            country: Some(country.to_string()),
            kind: Some(kind.to_string()),
            mass: None,
            detail_url: format!("https://example.org/metbull.php?code={id}"),
        }
    }

    fn sample() -> Dataset {
        Dataset::from_rows(vec![
            row("Meteorite1", 100, "Type1", "Country1"),
            row("Meteorite2", 200, "Type2", "Country2"),
            row("Meteorite3", 300, "Type10", "Country3"),
        ])
        .unwrap()
    }

    fn ids(outcome: &SearchOutcome<'_>) -> Vec<u64> {
        outcome.rows().iter().map(|r| r.numeric_id).collect()
    }

    #[test]
    fn test_filter_by_name() {
        let dataset = sample();

        let all = filter_by_name(dataset.rows(), "Meteorite", None);
        assert_eq!(ids(&all), vec![100, 200, 300]);

        let ranged = filter_by_name(dataset.rows(), "Meteorite", Some(IdRange::between(100, 200)));
        assert_eq!(ids(&ranged), vec![100, 200]);
        assert_eq!(ranged.rows()[0].name, "Meteorite1");

        let exact = filter_by_name(dataset.rows(), "Meteorite", Some(IdRange::Exact(200)));
        assert_eq!(ids(&exact), vec![200]);
        assert_eq!(exact.rows()[0].name, "Meteorite2");
    }

    #[test]
    fn test_filter_by_name_ignores_digits_and_case() {
        let dataset = Dataset::from_rows(vec![
            row("Northwest Africa 869", 1, "L5", "Morocco"),
            row("Allende", 2, "CV3", "Mexico"),
        ])
        .unwrap();

        assert_eq!(ids(&filter_by_name(dataset.rows(), "AFRICA", None)), vec![1]);
        // Digits in the name are never matched.
        assert!(!filter_by_name(dataset.rows(), "869", None).is_found());
    }

    #[test]
    fn test_name_stem_strips_non_ascii_digits() {
        assert_eq!(name_stem("Dhofar ٠٠٨"), "dhofar");
        assert_eq!(name_stem("Meteorite１２"), "meteorite");
        assert_eq!(name_stem("Allan Hills 84001"), "allan hills");
    }

    #[test]
    fn test_filter_by_name_not_found_echoes_query() {
        let dataset = sample();
        let outcome = filter_by_name(dataset.rows(), "Meteorite", Some(IdRange::Exact(999)));
        match outcome {
            SearchOutcome::NotFound(not_found) => {
                assert_eq!(
                    not_found,
                    NotFound::Name {
                        query: "Meteorite".to_string(),
                        range: Some(IdRange::Exact(999)),
                    }
                );
                assert!(not_found.to_string().contains("'Meteorite'"));
                assert!(not_found.to_string().contains("999"));
            }
            SearchOutcome::Found(_) => panic!("expected no match"),
        }
    }

    #[test]
    fn test_filter_by_type_is_exact() {
        let dataset = sample();
        assert_eq!(ids(&filter_by_type(dataset.rows(), "Type1")), vec![100]);
        assert_eq!(ids(&filter_by_type(dataset.rows(), "type10")), vec![300]);

        let missing = filter_by_type(dataset.rows(), "Type4");
        assert!(missing
            .into_result()
            .unwrap_err()
            .to_string()
            .contains("No meteorite type exactly matching"));
    }

    #[test]
    fn test_filter_by_country_is_exact() {
        let dataset = sample();
        assert_eq!(ids(&filter_by_country(dataset.rows(), "COUNTRY2")), vec![200]);
        assert!(!filter_by_country(dataset.rows(), "Country").is_found());

        let missing = filter_by_country(dataset.rows(), "Country4");
        assert!(missing
            .into_result()
            .unwrap_err()
            .to_string()
            .contains("No meteorite found with country exactly matching"));
    }

    #[test]
    fn test_query_composes_predicates() {
        let dataset = sample();

        let query = SearchQuery {
            name: Some("meteorite".to_string()),
            id_range: Some(IdRange::between(300, 100)),
            country: Some("country2".to_string()),
            kind: Some("type2".to_string()),
        };
        assert_eq!(ids(&query.apply(&dataset)), vec![200]);

        let range_only = SearchQuery {
            id_range: Some(IdRange::between(150, 400)),
            ..Default::default()
        };
        assert_eq!(ids(&range_only.apply(&dataset)), vec![200, 300]);
    }

    #[test]
    fn test_query_reports_first_failing_predicate() {
        let dataset = sample();
        let query = SearchQuery {
            name: Some("meteorite".to_string()),
            country: Some("Country1".to_string()),
            kind: Some("Type2".to_string()),
            ..Default::default()
        };
        assert_eq!(
            query.apply(&dataset),
            SearchOutcome::NotFound(NotFound::Type("Type2".to_string()))
        );
    }
}
