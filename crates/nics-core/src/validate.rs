//! Totals reconciliation
//!
//! The report counts every check twice: once in its category and once in
//! the totals. A consistent table therefore satisfies two doubling rules:
//!
//! - vertical: each numeric column, summed over all rows including the
//!   aggregate row, equals twice the aggregate row's value;
//! - horizontal: each row, summed over all numeric columns including the
//!   totals column, equals twice the row's totals value.
//!
//! Empty cells count as zero in sums. An empty aggregate cell has no value
//! to reconcile against and is reported as a mismatch.

use tracing::debug;

use crate::coerce::or_zero;
use crate::error::{ExtractError, Mismatch, Result};
use crate::schema::ColumnSchema;
use crate::table::DataRow;

/// Check both doubling rules over `rows`, whose last row is the aggregate row.
///
/// Every mismatch is collected before failing.
pub fn validate_rows(rows: &[DataRow], schema: &ColumnSchema) -> Result<()> {
    if rows.is_empty() {
        return Err(ExtractError::EmptyData);
    }

    let mut mismatches = vertical_mismatches(rows, schema);
    mismatches.extend(horizontal_mismatches(rows));

    if mismatches.is_empty() {
        debug!(rows = rows.len(), "totals reconcile");
        Ok(())
    } else {
        Err(ExtractError::Reconciliation(mismatches))
    }
}

/// Columns whose sum is not twice the aggregate row's value.
pub fn vertical_mismatches(rows: &[DataRow], schema: &ColumnSchema) -> Vec<Mismatch> {
    let Some(aggregate) = rows.last() else {
        return Vec::new();
    };

    schema
        .data_columns()
        .iter()
        .enumerate()
        .filter_map(|(i, column)| {
            let column_sum: i128 = rows
                .iter()
                .map(|r| or_zero(r.values.get(i).copied().flatten()))
                .sum();
            let declared_total = aggregate.values.get(i).copied().flatten();
            let reconciles = declared_total
                .map(|total| column_sum == 2 * i128::from(total))
                .unwrap_or(false);
            (!reconciles).then(|| Mismatch::Column {
                column: column.clone(),
                column_sum,
                declared_total,
            })
        })
        .collect()
}

/// Rows whose sum is not twice their own totals value.
pub fn horizontal_mismatches(rows: &[DataRow]) -> Vec<Mismatch> {
    rows.iter()
        .filter_map(|row| {
            let row_sum: i128 = row.values.iter().copied().map(or_zero).sum();
            let declared_total = or_zero(row.totals());
            (row_sum != 2 * declared_total).then(|| Mismatch::Row {
                state: row.state.clone(),
                row_sum,
                declared_total,
            })
        })
        .collect()
}
