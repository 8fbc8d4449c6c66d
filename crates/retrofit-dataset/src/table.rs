//! In-memory model of the wide simulation tables.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    /// Numeric value of the cell.
    ///
    /// Text is parsed after trimming, accepting a decimal comma.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(value) => Some(*value),
            Cell::Text(text) => text.trim().replace(',', ".").parse().ok(),
            Cell::Empty => None,
        }
    }

    /// Trimmed text of the cell, `None` if it is blank.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Text(text) if !text.trim().is_empty() => Some(text.trim().to_owned()),
            Cell::Number(value) => Some(value.to_string()),
            Cell::Text(_) | Cell::Empty => None,
        }
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(value) => write!(f, "{value}"),
            Cell::Text(text) => write!(f, "{text:?}"),
            Cell::Empty => f.write_str("an empty cell"),
        }
    }
}

/// A wide simulation table, stored row by row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WideTable {
    pub rows: Vec<Vec<Cell>>,
}

impl WideTable {
    #[must_use]
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }
}

/// A whole dataset: one wide table per partition name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: BTreeMap<String, WideTable>,
}
