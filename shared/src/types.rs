//! Common types used across the platform

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Visual tone the dashboard attaches to a classified row
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Danger,
    Warn,
    Info,
    Muted,
}

/// Error returned when a wire string does not name a known variant
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Tabular report payload: everything a printable document needs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportTable {
    pub title: String,
    pub subtitle: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; short rows are padded so every row matches the header width
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_rows_padded_to_header() {
        let mut table = ReportTable::new("Stock", "Por producto", &["SKU", "Nombre", "Stock"]);
        table.push_row(vec!["CC-355".into(), "Coca-Cola 355ml".into()]);
        assert_eq!(table.rows[0].len(), 3);
        assert_eq!(table.rows[0][2], "");
    }
}
