//! Locating the detail sub-table on a catalog page.
//!
//! The page has no stable schema. The only convention relied on is that the measurements
//! table sits in the cell right after the cell holding a `<big>Data from:</big>` marker,
//! all inside `table#maintable`.

use scraper::{ElementRef, Html};

use crate::error::FetchError;

const MAIN_TABLE_ID: &str = "maintable";
const DATA_MARKER: &str = "Data from:";

/// First descendant of `root` (excluding `root`) with tag `tag` satisfying `predicate`.
pub fn find_first<'a, P>(root: ElementRef<'a>, tag: &str, predicate: P) -> Option<ElementRef<'a>>
where
    P: Fn(&ElementRef<'a>) -> bool,
{
    root.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == tag && predicate(el))
}

/// Next following sibling element with tag `tag`.
pub fn next_sibling<'a>(element: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    element
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == tag)
}

/// Closest enclosing element with tag `tag`.
pub fn parent_of<'a>(element: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == tag)
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// A table cell whose text is looked up by label, with the text of the cell beside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailCell {
    pub text: String,
    pub value: Option<String>,
}

/// The leaf cells of the detail sub-table, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailTable {
    cells: Vec<DetailCell>,
}

impl DetailTable {
    /// Parse a full page and pull out the detail sub-table.
    pub fn parse(body: &str, url: &str) -> Result<Self, FetchError> {
        let layout = |reason| FetchError::LayoutMismatch {
            url: url.to_string(),
            reason,
        };

        let document = Html::parse_document(body);
        let main_table = find_first(document.root_element(), "table", |el| {
            el.value().id() == Some(MAIN_TABLE_ID)
        })
        .ok_or_else(|| layout("main table not found"))?;

        let marker = find_first(main_table, "big", |el| text_of(*el).contains(DATA_MARKER))
            .ok_or_else(|| layout("'Data from:' marker not found"))?;
        let marker_cell =
            parent_of(marker, "td").ok_or_else(|| layout("'Data from:' marker is not in a cell"))?;
        let data_cell =
            next_sibling(marker_cell, "td").ok_or_else(|| layout("no cell follows the marker"))?;

        Ok(Self::from_cell(data_cell))
    }

    /// Collect the innermost cells of `data_cell`, each with its next sibling cell's text.
    fn from_cell(data_cell: ElementRef<'_>) -> Self {
        let cells = data_cell
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "td")
            .filter(|el| find_first(*el, "td", |_| true).is_none())
            .map(|el| DetailCell {
                text: text_of(el),
                value: next_sibling(el, "td").map(|sibling| text_of(sibling).trim().to_string()),
            })
            .collect();
        Self { cells }
    }

    /// Build a table from `(label cell, value cell)` text pairs.
    pub fn from_pairs<I, L, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (L, V)>,
        L: Into<String>,
        V: Into<String>,
    {
        let cells = pairs
            .into_iter()
            .map(|(label, value)| DetailCell {
                text: label.into(),
                value: Some(value.into().trim().to_string()),
            })
            .collect();
        Self { cells }
    }

    pub fn cells(&self) -> &[DetailCell] {
        &self.cells
    }

    /// Trimmed text beside the first cell containing `label`. An empty cell counts as absent.
    pub fn value_for(&self, label: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|cell| cell.text.contains(label))
            .and_then(|cell| cell.value.as_deref())
            .filter(|value| !value.is_empty())
    }
}
