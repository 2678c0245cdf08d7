//! A selected meteorite and its detail-page enrichment state.

mod types;

pub use self::types::*;

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

use crate::dataset::DatasetRow;
use crate::fetch::DetailTable;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^\w\s]").unwrap();
}

pub const UNKNOWN_COUNTRY: &str = "unknown";

/// One selected dataset row plus whatever its detail page added.
///
/// Detail fields are either all unset or all come from the most recent successful
/// fetch. A failed attempt clears them.
#[derive(Debug, Clone)]
pub struct Meteorite {
    pub name: String,
    pub numeric_id: u64,
    pub fall_year: Option<i32>,
    pub fall_country: String,
    pub kind: Option<String>,
    pub mass: Option<String>,
    pub detail_url: String,
    details: DetailFields,
    status: EnrichmentStatus,
    // Held only between fetch and extraction.
    detail_document: Option<DetailTable>,
}

impl Meteorite {
    pub fn from_row(row: &DatasetRow) -> Self {
        Self {
            name: row.name.clone(),
            numeric_id: row.numeric_id,
            fall_year: row.year,
            fall_country: fall_country(row.country.as_deref()),
            kind: row.kind.as_deref().map(|k| NON_WORD.replace_all(k, "").into_owned()),
            mass: row.mass.clone(),
            detail_url: row.detail_url.clone(),
            details: DetailFields::default(),
            status: EnrichmentStatus::Pending,
            detail_document: None,
        }
    }

    pub fn details(&self) -> &DetailFields {
        &self.details
    }

    pub fn status(&self) -> &EnrichmentStatus {
        &self.status
    }

    pub fn is_enriched(&self) -> bool {
        self.status == EnrichmentStatus::Enriched
    }

    pub fn has_detail_document(&self) -> bool {
        self.detail_document.is_some()
    }

    /// Mass reported by the detail page, falling back to the dataset value.
    pub fn reported_mass(&self) -> Option<&str> {
        self.details.mass.as_deref().or(self.mass.as_deref())
    }

    /// Clear previous results before a new fetch.
    pub(crate) fn begin_attempt(&mut self) {
        self.details = DetailFields::default();
        self.detail_document = None;
        self.status = EnrichmentStatus::Pending;
    }

    pub(crate) fn attach_document(&mut self, document: DetailTable) {
        self.detail_document = Some(document);
    }

    pub(crate) fn mark_failed(&mut self, reason: impl fmt::Display) {
        self.details = DetailFields::default();
        self.detail_document = None;
        self.status = EnrichmentStatus::Failed(reason.to_string());
    }

    /// Copy every labelled value out of the attached document, derive coordinates,
    /// then drop the document. Returns false if no document was attached.
    pub fn extract_properties(&mut self) -> bool {
        let Some(document) = self.detail_document.take() else {
            return false;
        };

        let mut details = DetailFields::default();
        for field in DetailField::ALL {
            if let Some(value) = document.value_for(field.label()) {
                details.set(field, value);
            }
        }
        details.coordinates = crate::normalize::resolve_coordinates(
            details.latitude.as_deref(),
            details.longitude.as_deref(),
        );

        self.details = details;
        self.status = EnrichmentStatus::Enriched;
        true
    }

    /// Labelled summary of the meteorite, in display order.
    pub fn properties(&self) -> Vec<(&'static str, Option<String>)> {
        let d = &self.details;
        let number = |v: Option<f64>| v.map(|v| v.to_string());
        vec![
            ("Name", Some(self.name.clone())),
            ("Year", self.fall_year.map(|y| y.to_string())),
            ("Coordinates (dec)", d.coordinates.map(|c| c.to_string())),
            ("Mass", self.reported_mass().map(str::to_string)),
            ("Weathering grade", d.weathering_grade.clone()),
            ("Magnetic susceptibility", d.magnetic_susceptibility.clone()),
            ("Ferrosilite", number(d.ferrosilite_content)),
            ("Fayalite", number(d.fayalite_content)),
            ("Type specific mass", d.type_spec_mass.clone()),
            ("Pieces", d.pieces_count.clone()),
            ("Location of the subsample", d.type_spec_location.clone()),
            ("Shock stage", d.shock_stage.clone()),
        ]
    }
}

impl From<&DatasetRow> for Meteorite {
    fn from(row: &DatasetRow) -> Self {
        Meteorite::from_row(row)
    }
}

impl fmt::Display for Meteorite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Last comma-separated component of the country field ("Alberta, Canada" -> "Canada").
fn fall_country(country: Option<&str>) -> String {
    match country {
        None => UNKNOWN_COUNTRY.to_string(),
        Some(country) => match country.rsplit_once(',') {
            Some((_, last)) => last.trim().to_string(),
            None => country.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> DatasetRow {
        DatasetRow {
            name: "Sample Meteorite".to_string(),
            numeric_id: 7,
            year: Some(2022),
            country: Some("Western Australia, Australia".to_string()),
            kind: Some("L6-melt breccia".to_string()),
            mass: Some("1000 kg".to_string()),
            detail_url: "https://example.com".to_string(),
        }
    }

    #[test]
    fn test_from_row_derives_fields() {
        let meteorite = Meteorite::from_row(&row());
        assert_eq!(meteorite.name, "Sample Meteorite");
        assert_eq!(meteorite.fall_year, Some(2022));
        assert_eq!(meteorite.fall_country, "Australia");
        assert_eq!(meteorite.kind.as_deref(), Some("L6melt breccia"));
        assert_eq!(meteorite.mass.as_deref(), Some("1000 kg"));
        assert_eq!(meteorite.to_string(), "Sample Meteorite");
        assert_eq!(meteorite.status(), &EnrichmentStatus::Pending);
        assert!(meteorite.details().is_unset());
        assert!(!meteorite.has_detail_document());
    }

    #[test]
    fn test_fall_country() {
        assert_eq!(fall_country(None), "unknown");
        assert_eq!(fall_country(Some("USA")), "USA");
        assert_eq!(fall_country(Some("Texas, USA ")), "USA");
        assert_eq!(fall_country(Some("a, b,  South Africa")), "South Africa");
    }

    #[test]
    fn test_missing_type_stays_missing() {
        let mut source = row();
        source.kind = None;
        assert_eq!(Meteorite::from_row(&source).kind, None);
    }

    #[test]
    fn test_extract_without_document() {
        let mut meteorite = Meteorite::from_row(&row());
        assert!(!meteorite.extract_properties());
        assert_eq!(meteorite.status(), &EnrichmentStatus::Pending);
    }

    #[test]
    fn test_extract_properties_releases_document() {
        let mut meteorite = Meteorite::from_row(&row());
        meteorite.attach_document(DetailTable::from_pairs([
            ("Latitude:", "34°12'24\"N"),
            ("Longitude:", "45°12'24\"W"),
            ("Mass (g):", "1200"),
            ("Fayalite (mol%):", "24.5±0.3"),
            ("Shock stage:", ""),
        ]));

        assert!(meteorite.extract_properties());
        assert!(!meteorite.has_detail_document());
        assert!(meteorite.is_enriched());

        let details = meteorite.details();
        let coordinates = details.coordinates.unwrap();
        assert!((coordinates.latitude - 34.206_666_666_666_67).abs() < 1e-9);
        assert!((coordinates.longitude + 45.206_666_666_666_67).abs() < 1e-9);
        assert_eq!(details.fayalite_content, Some(24.5));
        assert_eq!(details.shock_stage, None);
        assert_eq!(meteorite.reported_mass(), Some("1200"));
    }

    #[test]
    fn test_failed_attempt_clears_previous_details() {
        let mut meteorite = Meteorite::from_row(&row());
        meteorite.attach_document(DetailTable::from_pairs([("Pieces:", "3")]));
        meteorite.extract_properties();
        assert_eq!(meteorite.details().pieces_count.as_deref(), Some("3"));

        meteorite.begin_attempt();
        meteorite.mark_failed("status 503");
        assert!(meteorite.details().is_unset());
        assert_eq!(
            meteorite.status(),
            &EnrichmentStatus::Failed("status 503".to_string())
        );
        assert_eq!(meteorite.reported_mass(), Some("1000 kg"));
    }

    #[test]
    fn test_properties_order() {
        let meteorite = Meteorite::from_row(&row());
        let labels: Vec<_> = meteorite.properties().into_iter().map(|(k, _)| k).collect();
        assert_eq!(labels.first(), Some(&"Name"));
        assert_eq!(labels.last(), Some(&"Shock stage"));
        assert_eq!(labels.len(), 12);
    }
}
