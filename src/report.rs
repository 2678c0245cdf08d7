//! Tabular projection of enriched meteorites, keyed by name.

use prettytable::{Cell, Row as PrettyRow, Table};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::meteorite::Meteorite;
use crate::normalize::Coordinates;

const MISSING: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown report column '{0}'")]
pub struct UnknownColumn(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Type,
    Coordinates,
    Latitude,
    Longitude,
    FallCountry,
    WeatheringGrade,
    ShockStage,
    MagneticSusceptibility,
    Ferrosilite,
    Wollastonite,
    Fayalite,
    TypeSpecMass,
    Pieces,
    TypeSpecLocation,
}

impl Column {
    pub const ALL: [Column; 14] = [
        Column::Type,
        Column::Coordinates,
        Column::Latitude,
        Column::Longitude,
        Column::FallCountry,
        Column::WeatheringGrade,
        Column::ShockStage,
        Column::MagneticSusceptibility,
        Column::Ferrosilite,
        Column::Wollastonite,
        Column::Fayalite,
        Column::TypeSpecMass,
        Column::Pieces,
        Column::TypeSpecLocation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::Type => "type",
            Column::Coordinates => "coordinates",
            Column::Latitude => "latitude",
            Column::Longitude => "longitude",
            Column::FallCountry => "fall_country",
            Column::WeatheringGrade => "weathering_grade",
            Column::ShockStage => "shock_stage",
            Column::MagneticSusceptibility => "magnetic_susceptibility",
            Column::Ferrosilite => "ferrosilite_content",
            Column::Wollastonite => "wollastonite_content",
            Column::Fayalite => "fayalite_content",
            Column::TypeSpecMass => "type_spec_mass",
            Column::Pieces => "pieces_count",
            Column::TypeSpecLocation => "type_spec_location",
        }
    }

    fn value(self, meteorite: &Meteorite) -> Option<ReportValue> {
        let d = meteorite.details();
        let text = |v: &Option<String>| v.clone().map(ReportValue::Text);
        let number = |v: Option<f64>| v.map(ReportValue::Number);
        match self {
            Column::Type => text(&meteorite.kind),
            Column::Coordinates => d.coordinates.map(ReportValue::Coordinates),
            Column::Latitude => text(&d.latitude),
            Column::Longitude => text(&d.longitude),
            Column::FallCountry => Some(ReportValue::Text(meteorite.fall_country.clone())),
            Column::WeatheringGrade => text(&d.weathering_grade),
            Column::ShockStage => text(&d.shock_stage),
            Column::MagneticSusceptibility => text(&d.magnetic_susceptibility),
            Column::Ferrosilite => number(d.ferrosilite_content),
            Column::Wollastonite => number(d.wollastonite_content),
            Column::Fayalite => number(d.fayalite_content),
            Column::TypeSpecMass => text(&d.type_spec_mass),
            Column::Pieces => text(&d.pieces_count),
            Column::TypeSpecLocation => text(&d.type_spec_location),
        }
    }
}

impl FromStr for Column {
    type Err = UnknownColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Column::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| UnknownColumn(s.to_string()))
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A report cell, typed so the JSON export keeps numbers and coordinate pairs intact.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportValue {
    Text(String),
    Number(f64),
    Coordinates(Coordinates),
}

impl ReportValue {
    /// Coordinates become a `[latitude, longitude]` array.
    pub fn to_json(&self) -> Value {
        match self {
            ReportValue::Text(text) => Value::String(text.clone()),
            ReportValue::Number(number) => json!(number),
            ReportValue::Coordinates(c) => json!([c.latitude, c.longitude]),
        }
    }
}

impl fmt::Display for ReportValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportValue::Text(text) => f.write_str(text),
            ReportValue::Number(number) => write!(f, "{}", number),
            ReportValue::Coordinates(c) => write!(f, "{}", c),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub name: String,
    pub values: Vec<Option<ReportValue>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub columns: Vec<Column>,
    pub rows: Vec<ReportRow>,
    /// Meteorites whose detail page was never successfully read.
    pub duds: usize,
}

impl Report {
    /// One row per meteorite with every column not in `omit`.
    pub fn build(meteorites: &[Meteorite], omit: &[Column]) -> Self {
        let columns: Vec<Column> = Column::ALL
            .into_iter()
            .filter(|c| !omit.contains(c))
            .collect();

        let rows = meteorites
            .iter()
            .map(|meteorite| ReportRow {
                name: meteorite.name.clone(),
                values: columns.iter().map(|c| c.value(meteorite)).collect(),
            })
            .collect();
        let duds = meteorites.iter().filter(|m| !m.is_enriched()).count();

        Self {
            columns,
            rows,
            duds,
        }
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();

        let mut titles = vec![Cell::new("name")];
        titles.extend(self.columns.iter().map(|c| Cell::new(c.name())));
        table.set_titles(PrettyRow::new(titles));

        for row in &self.rows {
            let mut cells = vec![Cell::new(&row.name)];
            cells.extend(row.values.iter().map(|v| match v {
                Some(value) => Cell::new(&value.to_string()),
                None => Cell::new(MISSING),
            }));
            table.add_row(PrettyRow::new(cells));
        }
        table
    }

    /// Rows as JSON objects; missing values become `null`.
    pub fn to_json(&self) -> Value {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut object = Map::new();
                object.insert("name".to_string(), Value::String(row.name.clone()));
                for (column, value) in self.columns.iter().zip(&row.values) {
                    let value = value.as_ref().map_or(Value::Null, ReportValue::to_json);
                    object.insert(column.name().to_string(), value);
                }
                Value::Object(object)
            })
            .collect();
        Value::Array(rows)
    }
}
