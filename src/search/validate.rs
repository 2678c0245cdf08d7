//! Validation of raw predicate input before a `SearchQuery` is built from it.

use super::types::IdRange;
use crate::dataset::AllowLists;
use crate::error::ValidationError;

/// Names need two characters and at least one letter.
pub fn validate_name(input: &str) -> Result<String, ValidationError> {
    let name = input.trim();
    if name.chars().count() < 2 {
        return Err(ValidationError::NameTooShort(name.to_string()));
    }
    if !name.chars().any(char::is_alphabetic) {
        return Err(ValidationError::NameWithoutLetter(name.to_string()));
    }
    Ok(name.to_string())
}

/// Accepts `"200"` or `"100,200"`. Two bounds are sorted ascending.
pub fn validate_numeric_range(input: &str) -> Result<IdRange, ValidationError> {
    let invalid = || ValidationError::InvalidRange(input.to_string());

    let bounds = input
        .split(',')
        .map(|part| part.trim().parse::<u64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;

    match bounds.as_slice() {
        [id] => Ok(IdRange::Exact(*id)),
        [a, b] => Ok(IdRange::between(*a, *b)),
        _ => Err(invalid()),
    }
}

/// Blank input means "no country predicate" and yields `Ok(None)`.
pub fn validate_country(input: &str, allow_lists: &AllowLists) -> Result<Option<String>, ValidationError> {
    let country = input.trim().to_lowercase();
    if country.is_empty() {
        return Ok(None);
    }
    if !allow_lists.contains_country(&country) {
        return Err(ValidationError::UnknownCountry(input.trim().to_string()));
    }
    Ok(Some(country))
}

/// Blank input means "no type predicate" and yields `Ok(None)`.
pub fn validate_type(input: &str, allow_lists: &AllowLists) -> Result<Option<String>, ValidationError> {
    let kind = input.trim().to_lowercase();
    if kind.is_empty() {
        return Ok(None);
    }
    if !allow_lists.contains_type(&kind) {
        return Err(ValidationError::UnknownType(input.trim().to_string()));
    }
    Ok(Some(kind))
}
