//! CSV export of a validated dataset
//!
//! Rows for the excluded territories are dropped, then each remaining row is
//! written with its schema columns followed by `year`, `mon_num` and the
//! state's postal code. Empty cells are written as empty fields.

use std::path::Path;

use tracing::{debug, info};

use crate::config::ExportConfig;
use crate::error::{ExtractError, Result};
use crate::states::State;
use crate::table::{DataRow, Dataset};

/// Columns appended after the schema columns.
pub const DERIVED_COLUMNS: [&str; 3] = ["year", "mon_num", "state_abbr"];

/// Header row of the exported CSV.
pub fn export_header(dataset: &Dataset) -> Vec<String> {
    dataset
        .schema
        .names()
        .iter()
        .cloned()
        .chain(DERIVED_COLUMNS.iter().map(|c| c.to_string()))
        .collect()
}

/// Render the rows that survive the exclusion filter, in dataset order.
///
/// # Errors
///
/// Fails with [`ExtractError::UnknownState`] on the first kept row whose
/// label is not one of the fifty states.
pub fn export_records(dataset: &Dataset, config: &ExportConfig) -> Result<Vec<Vec<String>>> {
    dataset
        .rows
        .iter()
        .filter(|row| !is_excluded(row, config))
        .map(export_record)
        .collect()
}

fn is_excluded(row: &DataRow, config: &ExportConfig) -> bool {
    config.excluded_states.iter().any(|s| s == &row.state)
}

fn export_record(row: &DataRow) -> Result<Vec<String>> {
    let state =
        State::from_name(&row.state).ok_or_else(|| ExtractError::UnknownState(row.state.clone()))?;
    let (year, mon_num) = row.month.split();

    let mut record = Vec::with_capacity(row.values.len() + 5);
    record.push(row.month.to_string());
    record.push(row.state.clone());
    record.extend(
        row.values
            .iter()
            .map(|v| v.map(|n| n.to_string()).unwrap_or_default()),
    );
    record.push(year.to_string());
    record.push(mon_num.to_string());
    record.push(state.abbr().to_string());
    Ok(record)
}

/// Write the dataset as CSV to `path`.
///
/// Records are rendered before anything touches the filesystem, and the file
/// is written beside `path` and renamed into place, so a failed export
/// leaves any previous file untouched.
pub fn write_csv(path: &Path, dataset: &Dataset, config: &ExportConfig) -> Result<usize> {
    let records = export_records(dataset, config)?;
    debug!(
        kept = records.len(),
        excluded = dataset.len() - records.len(),
        "filtered export rows"
    );

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    {
        let mut writer = csv::Writer::from_writer(&mut tmp);
        writer.write_record(export_header(dataset))?;
        for record in &records {
            writer.write_record(record)?;
        }
        writer.flush()?;
    }
    tmp.persist(path).map_err(|e| e.error)?;

    info!(path = %path.display(), rows = records.len(), "wrote csv");
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::month::MonthKey;
    use crate::schema::ColumnSchema;
    use pretty_assertions::assert_eq;

    fn dataset(states: &[&str]) -> Dataset {
        let schema = ColumnSchema::new(["month", "state", "handgun", "totals"]).unwrap();
        let month = MonthKey::new(2021, 3).unwrap();
        let rows = states
            .iter()
            .map(|s| DataRow::new(month.clone(), *s, vec![Some(1200), None]))
            .collect();
        Dataset { schema, rows }
    }

    #[test]
    fn test_header_appends_derived_columns() {
        assert_eq!(
            export_header(&dataset(&[])),
            vec!["month", "state", "handgun", "totals", "year", "mon_num", "state_abbr"]
        );
    }

    #[test]
    fn test_records_drop_territories_and_add_codes() {
        let data = dataset(&["Alabama", "Guam", "District of Columbia", "Wyoming"]);
        let records = export_records(&data, &ExportConfig::default()).unwrap();
        assert_eq!(
            records,
            vec![
                vec!["2021-03", "Alabama", "1200", "", "2021", "03", "AL"],
                vec!["2021-03", "Wyoming", "1200", "", "2021", "03", "WY"],
            ]
        );
    }

    #[test]
    fn test_unknown_state_fails() {
        let data = dataset(&["Alabama", "Atlantis"]);
        match export_records(&data, &ExportConfig::default()) {
            Err(ExtractError::UnknownState(name)) => assert_eq!(name, "Atlantis"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_write_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guns_output.csv");
        let written = write_csv(&path, &dataset(&["Alaska", "Puerto Rico"]), &ExportConfig::default())
            .unwrap();
        assert_eq!(written, 1);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "month,state,handgun,totals,year,mon_num,state_abbr\n\
             2021-03,Alaska,1200,,2021,03,AK\n"
        );
    }

    #[test]
    fn test_failed_export_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        assert!(write_csv(&path, &dataset(&["Atlantis"]), &ExportConfig::default()).is_err());
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
