//! Enrichment field definitions for the meteorite module.

use serde::Serialize;

use crate::normalize::{strip_uncertainty, Coordinates};

/// A field read from the detail page, identified by its row label there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailField {
    Latitude,
    Longitude,
    Mass,
    WeatheringGrade,
    MagneticSusceptibility,
    Ferrosilite,
    Wollastonite,
    Fayalite,
    TypeSpecMass,
    Pieces,
    TypeSpecLocation,
    ShockStage,
}

impl DetailField {
    pub const ALL: [DetailField; 12] = [
        DetailField::Latitude,
        DetailField::Longitude,
        DetailField::Mass,
        DetailField::WeatheringGrade,
        DetailField::MagneticSusceptibility,
        DetailField::Ferrosilite,
        DetailField::Wollastonite,
        DetailField::Fayalite,
        DetailField::TypeSpecMass,
        DetailField::Pieces,
        DetailField::TypeSpecLocation,
        DetailField::ShockStage,
    ];

    /// Text the label cell contains on the catalog page.
    pub fn label(self) -> &'static str {
        match self {
            DetailField::Latitude => "Latitude:",
            DetailField::Longitude => "Longitude:",
            DetailField::Mass => "Mass",
            DetailField::WeatheringGrade => "Weathering grade:",
            DetailField::MagneticSusceptibility => "Magnetic suscept.:",
            DetailField::Ferrosilite => "Ferrosilite (mol%):",
            DetailField::Wollastonite => "Wollastonite (mol%):",
            DetailField::Fayalite => "Fayalite (mol%):",
            DetailField::TypeSpecMass => "Type spec mass (g):",
            DetailField::Pieces => "Pieces:",
            DetailField::TypeSpecLocation => "Type spec location:",
            DetailField::ShockStage => "Shock stage:",
        }
    }
}

/// Values scraped from a detail page. `None` means unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetailFields {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub mass: Option<String>,
    pub weathering_grade: Option<String>,
    pub magnetic_susceptibility: Option<String>,
    pub ferrosilite_content: Option<f64>,
    pub wollastonite_content: Option<f64>,
    pub fayalite_content: Option<f64>,
    pub type_spec_mass: Option<String>,
    pub pieces_count: Option<String>,
    pub type_spec_location: Option<String>,
    pub shock_stage: Option<String>,
}

impl DetailFields {
    /// Store the raw cell text for `field`. Mineral contents keep only their leading number.
    pub fn set(&mut self, field: DetailField, text: &str) {
        let text = text.to_string();
        match field {
            DetailField::Latitude => self.latitude = Some(text),
            DetailField::Longitude => self.longitude = Some(text),
            DetailField::Mass => self.mass = Some(text),
            DetailField::WeatheringGrade => self.weathering_grade = Some(text),
            DetailField::MagneticSusceptibility => self.magnetic_susceptibility = Some(text),
            DetailField::Ferrosilite => self.ferrosilite_content = strip_uncertainty(&text),
            DetailField::Wollastonite => self.wollastonite_content = strip_uncertainty(&text),
            DetailField::Fayalite => self.fayalite_content = strip_uncertainty(&text),
            DetailField::TypeSpecMass => self.type_spec_mass = Some(text),
            DetailField::Pieces => self.pieces_count = Some(text),
            DetailField::TypeSpecLocation => self.type_spec_location = Some(text),
            DetailField::ShockStage => self.shock_stage = Some(text),
        }
    }

    pub fn is_unset(&self) -> bool {
        *self == DetailFields::default()
    }
}

/// Where a meteorite stands with respect to detail-page enrichment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum EnrichmentStatus {
    #[default]
    Pending,
    Enriched,
    Failed(String),
}
