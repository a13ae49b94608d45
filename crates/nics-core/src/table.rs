//! Row-labelled tables produced by extraction

use std::collections::HashSet;

use crate::coerce::CellValue;
use crate::month::MonthKey;
use crate::schema::ColumnSchema;

/// Label of the report's own per-month aggregate row.
pub const AGGREGATE_LABEL: &str = "Totals";

/// One state's checks for one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRow {
    pub month: MonthKey,
    pub state: String,
    /// Numeric cells in schema order; the last one is the declared total.
    pub values: Vec<CellValue>,
}

impl DataRow {
    pub fn new(month: MonthKey, state: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self {
            month,
            state: state.into(),
            values,
        }
    }

    /// Declared row total.
    pub fn totals(&self) -> CellValue {
        self.values.last().copied().flatten()
    }

    /// Value of a named numeric column.
    pub fn get(&self, schema: &ColumnSchema, column: &str) -> CellValue {
        schema
            .data_index(column)
            .and_then(|i| self.values.get(i).copied())
            .flatten()
    }

    /// Whether this is the report's aggregate row.
    pub fn is_aggregate(&self) -> bool {
        self.state == AGGREGATE_LABEL
    }
}

/// All rows of one report page, ending with the aggregate row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTable {
    pub month: MonthKey,
    pub rows: Vec<DataRow>,
}

impl StateTable {
    pub fn new(month: MonthKey, rows: Vec<DataRow>) -> Self {
        Self { month, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Validated rows of a whole document, aggregate rows removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub schema: ColumnSchema,
    pub rows: Vec<DataRow>,
}

impl Dataset {
    /// Concatenate page tables in the given order, dropping aggregate rows.
    pub fn from_tables<I>(schema: ColumnSchema, tables: I) -> Self
    where
        I: IntoIterator<Item = StateTable>,
    {
        let rows = tables
            .into_iter()
            .flat_map(|t| t.rows)
            .filter(|r| !r.is_aggregate())
            .collect();
        Self { schema, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct months, in order of first appearance.
    pub fn months(&self) -> Vec<&MonthKey> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .map(|row| &row.month)
            .filter(|month| seen.insert(*month))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month() -> MonthKey {
        MonthKey::new(2021, 3).unwrap()
    }

    #[test]
    fn test_row_accessors() {
        let schema = ColumnSchema::new(["month", "state", "col", "totals"]).unwrap();
        let row = DataRow::new(month(), "Alaska", vec![Some(4), None]);
        assert_eq!(row.get(&schema, "col"), Some(4));
        assert_eq!(row.get(&schema, "totals"), None);
        assert_eq!(row.get(&schema, "missing"), None);
        assert_eq!(row.totals(), None);
        assert!(!row.is_aggregate());
    }

    #[test]
    fn test_dataset_drops_aggregate_rows() {
        let schema = ColumnSchema::new(["month", "state", "col", "totals"]).unwrap();
        let march = StateTable::new(
            month(),
            vec![
                DataRow::new(month(), "Alaska", vec![Some(1), Some(1)]),
                DataRow::new(month(), AGGREGATE_LABEL, vec![Some(1), Some(1)]),
            ],
        );
        let april_key = MonthKey::new(2021, 4).unwrap();
        let april = StateTable::new(
            april_key.clone(),
            vec![
                DataRow::new(april_key.clone(), "Alaska", vec![Some(2), Some(2)]),
                DataRow::new(april_key, AGGREGATE_LABEL, vec![Some(2), Some(2)]),
            ],
        );
        let dataset = Dataset::from_tables(schema, vec![march, april]);
        assert_eq!(dataset.len(), 2);
        assert!(dataset.rows.iter().all(|r| !r.is_aggregate()));
        let months: Vec<&str> = dataset.months().iter().map(|m| m.as_str()).collect();
        assert_eq!(months, vec!["2021-03", "2021-04"]);
    }

    #[test]
    fn test_months_are_distinct_across_pages() {
        let schema = ColumnSchema::new(["month", "state", "col"]).unwrap();
        let april = MonthKey::new(2021, 4).unwrap();
        let table = |key: &MonthKey, state: &str| {
            StateTable::new(key.clone(), vec![DataRow::new(key.clone(), state, vec![Some(1)])])
        };
        // a month split over two pages that are not adjacent
        let dataset = Dataset::from_tables(
            schema,
            vec![table(&month(), "Alabama"), table(&april, "Alaska"), table(&month(), "Wyoming")],
        );
        let months: Vec<&str> = dataset.months().iter().map(|m| m.as_str()).collect();
        assert_eq!(months, vec!["2021-03", "2021-04"]);
    }
}
