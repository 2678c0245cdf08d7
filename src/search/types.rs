//! Type definitions for the search module.

use serde::Serialize;
use std::fmt;

use crate::dataset::DatasetRow;

/// Constraint on `numeric_id`: an exact id or an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IdRange {
    Exact(u64),
    Between(u64, u64),
}

impl IdRange {
    /// Inclusive range; bounds given in either order are sorted ascending.
    pub fn between(a: u64, b: u64) -> Self {
        if a <= b {
            IdRange::Between(a, b)
        } else {
            IdRange::Between(b, a)
        }
    }

    pub fn contains(&self, id: u64) -> bool {
        match *self {
            IdRange::Exact(n) => id == n,
            IdRange::Between(start, end) => start <= id && id <= end,
        }
    }
}

impl fmt::Display for IdRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdRange::Exact(n) => write!(f, "{}", n),
            IdRange::Between(start, end) => write!(f, "[{}, {}]", start, end),
        }
    }
}

/// Which predicate emptied the result set, with the input echoed back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NotFound {
    Name {
        query: String,
        range: Option<IdRange>,
    },
    IdRange(IdRange),
    Country(String),
    Type(String),
}

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFound::Name { query, range: None } => {
                write!(f, "No meteorite matching '{}' found.", query)
            }
            NotFound::Name {
                query,
                range: Some(range),
            } => write!(
                f,
                "No meteorite matching '{}' with numeric_id in range {} found.",
                query, range
            ),
            NotFound::IdRange(range) => {
                write!(f, "No meteorite with numeric_id in range {} found.", range)
            }
            NotFound::Country(query) => write!(
                f,
                "No meteorite found with country exactly matching '{}'.",
                query
            ),
            NotFound::Type(query) => {
                write!(f, "No meteorite type exactly matching '{}' found.", query)
            }
        }
    }
}

/// Result of a filter. An empty match is an ordinary outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome<'a> {
    Found(Vec<&'a DatasetRow>),
    NotFound(NotFound),
}

impl<'a> SearchOutcome<'a> {
    pub(crate) fn from_rows(rows: Vec<&'a DatasetRow>, not_found: impl FnOnce() -> NotFound) -> Self {
        if rows.is_empty() {
            SearchOutcome::NotFound(not_found())
        } else {
            SearchOutcome::Found(rows)
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }

    pub fn rows(&self) -> &[&'a DatasetRow] {
        match self {
            SearchOutcome::Found(rows) => rows,
            SearchOutcome::NotFound(_) => &[],
        }
    }

    pub fn into_result(self) -> Result<Vec<&'a DatasetRow>, NotFound> {
        match self {
            SearchOutcome::Found(rows) => Ok(rows),
            SearchOutcome::NotFound(not_found) => Err(not_found),
        }
    }
}
