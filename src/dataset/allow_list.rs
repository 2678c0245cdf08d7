use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;

use super::types::Dataset;

pub const COUNTRY_VALIDATION_FILE: &str = "country_validation.json";
pub const TYPE_VALIDATION_FILE: &str = "type_validation.json";

/// Distinct countries and types in the dataset, lower-cased and trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowLists {
    countries: BTreeSet<String>,
    types: BTreeSet<String>,
}

impl AllowLists {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let normalize = |value: &Option<String>| value.as_deref().map(|v| v.trim().to_lowercase());

        let countries = dataset
            .rows()
            .iter()
            .filter_map(|row| normalize(&row.country))
            .filter(|v| !v.is_empty())
            .collect();
        let types = dataset
            .rows()
            .iter()
            .filter_map(|row| normalize(&row.kind))
            .filter(|v| !v.is_empty())
            .collect();

        Self { countries, types }
    }

    pub fn contains_country(&self, value: &str) -> bool {
        self.countries.contains(&value.trim().to_lowercase())
    }

    pub fn contains_type(&self, value: &str) -> bool {
        self.types.contains(&value.trim().to_lowercase())
    }

    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.countries.iter().map(String::as_str)
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(String::as_str)
    }

    /// Write both lists as JSON arrays into `dir`.
    pub fn write_json(&self, dir: impl AsRef<Path>) -> io::Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        fs::write(
            dir.join(COUNTRY_VALIDATION_FILE),
            serde_json::to_string_pretty(&self.countries)?,
        )?;
        fs::write(
            dir.join(TYPE_VALIDATION_FILE),
            serde_json::to_string_pretty(&self.types)?,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DatasetRow;

    fn row(id: u64, country: Option<&str>, kind: Option<&str>) -> DatasetRow {
        DatasetRow {
            name: format!("Fall {id}"),
            numeric_id: id,
            year: None,
            country: country.map(str::to_string),
            kind: kind.map(str::to_string),
            mass: None,
            detail_url: format!("https://example.org/{id}"),
        }
    }

    #[test]
    fn test_distinct_lowercased_values() {
        let dataset = Dataset::from_rows(vec![
            row(1, Some("Chile"), Some("H5")),
            row(2, Some(" chile "), Some("L6")),
            row(3, None, Some("h5")),
            row(4, Some("Morocco"), None),
        ])
        .unwrap();

        let lists = AllowLists::from_dataset(&dataset);
        assert_eq!(lists.countries().collect::<Vec<_>>(), vec!["chile", "morocco"]);
        assert_eq!(lists.types().collect::<Vec<_>>(), vec!["h5", "l6"]);
        assert!(lists.contains_country("CHILE"));
        assert!(lists.contains_type(" H5"));
        assert!(!lists.contains_type("H"));
    }

    #[test]
    fn test_write_json() {
        let dataset = Dataset::from_rows(vec![row(1, Some("Chile"), Some("H5"))]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        AllowLists::from_dataset(&dataset).write_json(dir.path()).unwrap();

        let countries: Vec<String> = serde_json::from_str(
            &fs::read_to_string(dir.path().join(COUNTRY_VALIDATION_FILE)).unwrap(),
        )
        .unwrap();
        assert_eq!(countries, vec!["chile"]);
    }
}
