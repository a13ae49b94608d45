use std::fmt;

use thiserror::Error;

/// A single reconciliation failure found by the consistency validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// Column sum (aggregate row included) is not twice the aggregate value.
    Column {
        column: String,
        column_sum: i128,
        declared_total: Option<i64>,
    },
    /// Row sum (totals included) is not twice the row's totals value.
    Row {
        state: String,
        row_sum: i128,
        declared_total: i128,
    },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::Column {
                column,
                column_sum,
                declared_total: Some(total),
            } => write!(
                f,
                "vertical totals don't match on {} (sum {}, declared {})",
                column, column_sum, total
            ),
            Mismatch::Column {
                column,
                column_sum,
                declared_total: None,
            } => write!(
                f,
                "vertical totals don't match on {} (sum {}, declared total is empty)",
                column, column_sum
            ),
            Mismatch::Row {
                state,
                row_sum,
                declared_total,
            } => write!(
                f,
                "horizontal totals don't match on {} (sum {}, declared {})",
                state, row_sum, declared_total
            ),
        }
    }
}

fn join_mismatches(mismatches: &[Mismatch]) -> String {
    mismatches
        .iter()
        .map(Mismatch::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors raised while turning report pages into a validated dataset.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("header text does not match '<Month> - <Year>': {text:?}")]
    Format { text: String },

    #[error("non-numeric value {value:?} in column {column}")]
    Parse { column: String, value: String },

    #[error("{}", join_mismatches(.0))]
    Reconciliation(Vec<Mismatch>),

    #[error("no data found")]
    EmptyData,

    #[error("row {row} has {found} cells, expected {expected}")]
    ColumnCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("no abbreviation known for state {0:?}")]
    UnknownState(String),

    #[error("invalid data for page {page}{}: {source}", .month.as_deref().map(|m| format!(" ({})", m)).unwrap_or_default())]
    Page {
        page: usize,
        month: Option<String>,
        #[source]
        source: Box<ExtractError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ExtractError {
    /// Wrap a page-local failure with the page number and, once known, its month.
    pub fn on_page(self, page: usize, month: Option<&str>) -> Self {
        ExtractError::Page {
            page,
            month: month.map(str::to_string),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping any page tagging.
    pub fn root(&self) -> &ExtractError {
        match self {
            ExtractError::Page { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_error_mentions_month() {
        let err = ExtractError::EmptyData.on_page(3, Some("2021-03"));
        assert_eq!(err.to_string(), "invalid data for page 3 (2021-03): no data found");
        assert!(matches!(err.root(), ExtractError::EmptyData));
    }

    #[test]
    fn test_page_error_without_month() {
        let err = ExtractError::Format {
            text: "Page 1".into(),
        }
        .on_page(1, None);
        assert!(err.to_string().starts_with("invalid data for page 1: header text"));
    }

    #[test]
    fn test_reconciliation_lists_every_mismatch() {
        let err = ExtractError::Reconciliation(vec![
            Mismatch::Column {
                column: "handgun".into(),
                column_sum: 7,
                declared_total: Some(3),
            },
            Mismatch::Row {
                state: "Alaska".into(),
                row_sum: 10,
                declared_total: 4,
            },
        ]);
        let msg = err.to_string();
        assert!(msg.contains("handgun"));
        assert!(msg.contains("Alaska"));
    }
}
