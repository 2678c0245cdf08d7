//! Text-to-number normalization for values scraped from detail pages.
//!
//! Catalog pages report positions in several degree/minute/second spellings and report
//! mineral compositions with uncertainty or sample-count annotations attached. Everything
//! here maps such text to a plain `f64`, or `None` when the text cannot be read.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    /// Coordinate grammars, tried in order. Each is anchored at the start only.
    static ref DMS_PATTERNS: [Regex; 3] = [
        // 34.5°N
        Regex::new(r"^(\d+\.?\d*)°([NSWE])").unwrap(),
        // 34°12.4'S
        Regex::new(r"^(\d+)°(\d+\.?\d*)'([NSWE])").unwrap(),
        // 34°12'24"N, seconds optional
        Regex::new(r#"^(\d+)°(\d+)'(\d*\.?\d*)?"?([NSWE])"#).unwrap(),
    ];
    static ref LEADING_NUMBER: Regex = Regex::new(r"^[-+]?\d*\.?\d+").unwrap();
}

/// A latitude/longitude pair in signed decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.5}, {:.5})", self.latitude, self.longitude)
    }
}

/// Convert a coordinate string to signed decimal degrees.
///
/// Plain decimal text is returned as parsed. Otherwise whitespace and `~` are dropped, a
/// doubled apostrophe is read as a double quote, and the text is matched against the
/// degrees-only, decimal-minutes and full DMS grammars. South and west are negative.
pub fn parse_coordinate(text: Option<&str>) -> Option<f64> {
    let text = text?;

    if let Ok(value) = text.trim().parse::<f64>() {
        return value.is_finite().then_some(value);
    }

    let cleaned: String = text
        .replace("''", "\"")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '~')
        .collect();

    for pattern in DMS_PATTERNS.iter() {
        let Some(caps) = pattern.captures(&cleaned) else {
            continue;
        };
        // Last group is always the direction letter.
        let groups: Vec<&str> = caps
            .iter()
            .skip(1)
            .map(|m| m.map_or("", |m| m.as_str()))
            .collect();
        let (direction, numbers) = groups.split_last()?;

        let degrees = parse_component(numbers.first().copied())?;
        let minutes = parse_component(numbers.get(1).copied())?;
        let seconds = parse_component(numbers.get(2).copied())?;

        let decimal = degrees + minutes / 60.0 + seconds / 3600.0;
        return Some(match *direction {
            "S" | "W" => -decimal,
            _ => decimal,
        });
    }

    None
}

/// Absent or empty components count as zero; anything else must be a number.
fn parse_component(component: Option<&str>) -> Option<f64> {
    match component {
        None | Some("") => Some(0.0),
        Some(value) => value.parse().ok(),
    }
}

/// Parse both axes, yielding a pair only when both are readable.
pub fn resolve_coordinates(latitude: Option<&str>, longitude: Option<&str>) -> Option<Coordinates> {
    let latitude = parse_coordinate(latitude)?;
    let longitude = parse_coordinate(longitude)?;
    Some(Coordinates {
        latitude,
        longitude,
    })
}

/// Read the leading signed number from text such as `21.3±0.4` or `18.2 (n=6)`.
pub fn strip_uncertainty(text: &str) -> Option<f64> {
    LEADING_NUMBER
        .find(text.trim_start())
        .and_then(|m| m.as_str().parse().ok())
}
