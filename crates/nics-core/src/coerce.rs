// Cell text to numeric value coercion

use crate::error::{ExtractError, Result};

/// A coerced numeric cell. `None` marks an empty cell and is kept distinct from zero.
pub type CellValue = Option<i64>;

/// Coerce one raw grid cell.
///
/// Missing or empty cells become `None`. Anything else has its thousands
/// separators stripped and must then be an integer literal.
pub fn coerce_cell(raw: Option<&str>, column: &str) -> Result<CellValue> {
    let text = match raw {
        None => return Ok(None),
        Some(t) if t.is_empty() => return Ok(None),
        Some(t) => t,
    };

    let stripped: String = text.chars().filter(|c| *c != ',').collect();
    stripped
        .trim()
        .parse::<i64>()
        .map(Some)
        .map_err(|_| ExtractError::Parse {
            column: column.to_string(),
            value: text.to_string(),
        })
}

/// Coerce every numeric cell of a grid row, pairing cells with column names.
pub fn coerce_row(cells: &[Option<String>], columns: &[String]) -> Result<Vec<CellValue>> {
    cells
        .iter()
        .zip(columns)
        .map(|(cell, column)| coerce_cell(cell.as_deref(), column))
        .collect()
}

/// Zero-filled view of a cell for totals arithmetic.
pub fn or_zero(value: CellValue) -> i128 {
    value.map(i128::from).unwrap_or(0)
}
