//! Row and dataset definitions.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::DatasetError;

/// One meteorite fall as listed in the tabular dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRow {
    pub name: String,
    pub numeric_id: u64,
    #[serde(default, deserialize_with = "deserialize_year")]
    pub year: Option<i32>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "deserialize_mass")]
    pub mass: Option<String>,
    #[serde(alias = "URL", alias = "url")]
    pub detail_url: String,
}

/// Years arrive as integers, floats (from dataframe exports) or strings.
fn deserialize_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .and_then(|y| i32::try_from(y).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Mass is free text on the catalog ("1.2 kg") but numeric in some exports.
fn deserialize_mass<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

/// The full dataset, in its original order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<DatasetRow>,
}

impl Dataset {
    /// Build a dataset, rejecting empty names or URLs and duplicate ids.
    pub fn from_rows(rows: Vec<DatasetRow>) -> Result<Self, DatasetError> {
        let mut seen = HashSet::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            if row.name.trim().is_empty() {
                return Err(DatasetError::EmptyName { index });
            }
            if row.detail_url.trim().is_empty() {
                return Err(DatasetError::EmptyUrl { index });
            }
            if !seen.insert(row.numeric_id) {
                return Err(DatasetError::DuplicateId(row.numeric_id));
            }
        }
        debug!("Loaded dataset with {} rows", rows.len());
        Ok(Self { rows })
    }

    /// Parse a JSON array of row objects.
    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        let rows: Vec<DatasetRow> = serde_json::from_str(json)?;
        Self::from_rows(rows)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn rows(&self) -> &[DatasetRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
