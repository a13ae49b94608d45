//! Column schema of the monthly background-check table
//!
//! The report grid carries a state label, 24 check categories and a
//! totals column. The month is not printed in the grid; it is injected from
//! the page header as column 0.

/// Fixed column order of the report, month first.
pub const NICS_COLUMNS: &[&str] = &[
    "month",
    "state",
    "permit",
    "permit_recheck",
    "handgun",
    "long_gun",
    "other",
    "multiple",
    "admin",
    "prepawn_handgun",
    "prepawn_long_gun",
    "prepawn_other",
    "redemption_handgun",
    "redemption_long_gun",
    "redemption_other",
    "returned_handgun",
    "returned_long_gun",
    "returned_other",
    "rentals_handgun",
    "rentals_long_gun",
    "private_sale_handgun",
    "private_sale_long_gun",
    "private_sale_other",
    "return_to_seller_handgun",
    "return_to_seller_long_gun",
    "return_to_seller_other",
    "totals",
];

/// Named columns bound to every extracted row.
///
/// Columns 0 and 1 are always the month and the state label; every column
/// after them is numeric and the last one is the declared row total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    columns: Vec<String>,
}

impl ColumnSchema {
    /// Number of leading label columns (month, state).
    pub const LABEL_COLUMNS: usize = 2;

    /// Build a schema from column names.
    ///
    /// Returns `None` unless there is at least one numeric column after
    /// the two label columns.
    pub fn new<I, S>(columns: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.len() <= Self::LABEL_COLUMNS {
            return None;
        }
        Some(Self { columns })
    }

    /// The 27-column layout of the NICS monthly report.
    pub fn nics() -> Self {
        Self {
            columns: NICS_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.columns
    }

    /// Number of cells a grid row carries (every column except the month).
    pub fn grid_width(&self) -> usize {
        self.columns.len() - 1
    }

    /// Names of the numeric columns, totals included.
    pub fn data_columns(&self) -> &[String] {
        &self.columns[Self::LABEL_COLUMNS..]
    }

    /// Number of numeric columns, totals included.
    pub fn data_width(&self) -> usize {
        self.columns.len() - Self::LABEL_COLUMNS
    }

    /// Name of the declared-total column.
    pub fn totals_column(&self) -> &str {
        &self.columns[self.columns.len() - 1]
    }

    /// Position of `name` among the numeric columns.
    pub fn data_index(&self, name: &str) -> Option<usize> {
        self.data_columns().iter().position(|c| c == name)
    }
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self::nics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nics_schema_shape() {
        let schema = ColumnSchema::nics();
        assert_eq!(schema.len(), 27);
        assert_eq!(schema.grid_width(), 26);
        assert_eq!(schema.data_width(), 25);
        assert_eq!(schema.names()[0], "month");
        assert_eq!(schema.names()[1], "state");
        assert_eq!(schema.totals_column(), "totals");
    }

    #[test]
    fn test_data_index() {
        let schema = ColumnSchema::nics();
        assert_eq!(schema.data_index("permit"), Some(0));
        assert_eq!(schema.data_index("totals"), Some(24));
        assert_eq!(schema.data_index("state"), None);
    }

    #[test]
    fn test_schema_needs_numeric_column() {
        assert!(ColumnSchema::new(["month", "state"]).is_none());
        let schema = ColumnSchema::new(["month", "state", "col", "totals"]).unwrap();
        assert_eq!(schema.data_columns(), &["col".to_string(), "totals".to_string()]);
    }
}
