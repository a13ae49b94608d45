//! Per-page table extraction
//!
//! A report page is read in two fixed bands: the header band yields the
//! month label and the body band holds the state grid. The grid has vertical
//! rules but no horizontal ones and no rule on its left border, so rows are
//! inferred from text alignment and the left border is taken from the
//! leftmost glyph of the body.

use tracing::{debug, instrument};

use crate::coerce::coerce_row;
use crate::config::PageLayout;
use crate::corrections::StateCorrections;
use crate::error::{ExtractError, Result};
use crate::month::{parse_month_label, MonthKey};
use crate::page::{PageRegion, RawPage, TableGrid};
use crate::schema::ColumnSchema;
use crate::table::{DataRow, StateTable};
use crate::validate::validate_rows;

/// Turns one report page into a validated [`StateTable`].
#[derive(Debug, Clone, Copy)]
pub struct PageExtractor<'a> {
    schema: &'a ColumnSchema,
    layout: &'a PageLayout,
    corrections: &'a StateCorrections,
}

impl<'a> PageExtractor<'a> {
    pub fn new(
        schema: &'a ColumnSchema,
        layout: &'a PageLayout,
        corrections: &'a StateCorrections,
    ) -> Self {
        Self {
            schema,
            layout,
            corrections,
        }
    }

    pub fn schema(&self) -> &'a ColumnSchema {
        self.schema
    }

    /// Extract, correct and validate one page.
    ///
    /// Failures are wrapped in [`ExtractError::Page`] with the page number
    /// and, once the header has been read, the page's month.
    #[instrument(level = "debug", skip_all, fields(page = page.number()))]
    pub fn extract_page<P: RawPage>(&self, page: &P) -> Result<StateTable> {
        let month = self
            .read_month(page)
            .map_err(|e| e.on_page(page.number(), None))?;
        debug!(month = %month, "read page header");

        self.read_table(page, month.clone())
            .map_err(|e| e.on_page(page.number(), Some(month.as_str())))
    }

    /// Parse the month label in the header band.
    pub fn read_month<P: RawPage>(&self, page: &P) -> Result<MonthKey> {
        let header = page.within_bbox(self.layout.header.bbox(page.width()));
        let text = header.extract_text(
            self.layout.header_x_tolerance,
            self.layout.header_y_tolerance,
        );
        parse_month_label(&text)
    }

    fn read_table<P: RawPage>(&self, page: &P, month: MonthKey) -> Result<StateTable> {
        let body = page.crop(self.layout.body.bbox(page.width()));
        let left_edge = body.min_char_x0().ok_or(ExtractError::EmptyData)?;
        let settings = self.layout.table_settings(left_edge);
        let grid = body
            .extract_table(&settings)
            .ok_or(ExtractError::EmptyData)?;
        debug!(left_edge, rows = grid.len(), "reconstructed body grid");

        let rows = self.bind_rows(&month, grid)?;
        validate_rows(&rows, self.schema)?;
        Ok(StateTable::new(month, rows))
    }

    /// Bind grid rows to the schema: month first, then the state label and
    /// the coerced numeric cells. Known label artifacts are corrected.
    pub fn bind_rows(&self, month: &MonthKey, grid: TableGrid) -> Result<Vec<DataRow>> {
        let expected = self.schema.grid_width();
        grid.into_iter()
            .enumerate()
            .map(|(i, mut cells)| {
                if cells.len() != expected {
                    return Err(ExtractError::ColumnCount {
                        row: i + 1,
                        expected,
                        found: cells.len(),
                    });
                }
                let numeric = cells.split_off(1);
                let mut state = cells
                    .pop()
                    .flatten()
                    .map(|s| s.trim().to_string())
                    .unwrap_or_default();
                let values = coerce_row(&numeric, self.schema.data_columns())?;
                self.corrections.apply(&mut state, month.as_str());
                Ok(DataRow::new(month.clone(), state, values))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{BBox, TableSettings};
    use std::cell::RefCell;

    /// Page with canned header text and grid that records the settings it was asked for.
    struct CannedPage {
        header: String,
        grid: Option<TableGrid>,
        left_edge: Option<f64>,
        seen: RefCell<Vec<TableSettings>>,
    }

    struct CannedRegion<'p> {
        page: &'p CannedPage,
        header: bool,
    }

    impl PageRegion for CannedRegion<'_> {
        fn extract_text(&self, _x: f64, _y: f64) -> String {
            if self.header {
                self.page.header.clone()
            } else {
                String::new()
            }
        }

        fn min_char_x0(&self) -> Option<f64> {
            self.page.left_edge
        }

        fn extract_table(&self, settings: &TableSettings) -> Option<TableGrid> {
            self.page.seen.borrow_mut().push(settings.clone());
            self.page.grid.clone()
        }
    }

    impl<'p> RawPage for &'p CannedPage {
        type Region = CannedRegion<'p>;

        fn number(&self) -> usize {
            2
        }

        fn width(&self) -> f64 {
            792.0
        }

        fn height(&self) -> f64 {
            612.0
        }

        fn within_bbox(&self, bbox: BBox) -> Self::Region {
            assert_eq!(bbox, BBox::new(0.0, 35.0, 792.0, 65.0));
            CannedRegion {
                page: *self,
                header: true,
            }
        }

        fn crop(&self, bbox: BBox) -> Self::Region {
            assert_eq!(bbox, BBox::new(0.0, 80.0, 792.0, 485.0));
            CannedRegion {
                page: *self,
                header: false,
            }
        }
    }

    fn cells(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    fn small_schema() -> ColumnSchema {
        ColumnSchema::new(["month", "state", "handgun", "long_gun", "totals"]).unwrap()
    }

    fn page(header: &str, grid: TableGrid) -> CannedPage {
        CannedPage {
            header: header.to_string(),
            grid: Some(grid),
            left_edge: Some(18.0),
            seen: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn test_extracts_and_corrects_page() {
        let schema = small_schema();
        let layout = PageLayout::default();
        let corrections = StateCorrections::default();
        let extractor = PageExtractor::new(&schema, &layout, &corrections);

        let page = page(
            "March - 2021",
            vec![
                cells(&["Alabama", "1,000", "500", "1,500"]),
                vec![Some("llinois".into()), Some("".into()), None, Some("".into())],
                cells(&["Totals", "1,000", "500", "1,500"]),
            ],
        );
        let table = extractor.extract_page(&&page).unwrap();

        assert_eq!(table.month.as_str(), "2021-03");
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0].values, vec![Some(1000), Some(500), Some(1500)]);
        assert_eq!(table.rows[1].state, "Illinois");
        assert_eq!(table.rows[1].values, vec![None, None, None]);
        assert!(table.rows.iter().all(|r| r.month.as_str() == "2021-03"));

        let seen = page.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].explicit_vertical_lines, vec![18.0]);
        assert_eq!(seen[0].intersection_tolerance, 5.0);
    }

    #[test]
    fn test_bad_header_fails_with_page_number() {
        let schema = small_schema();
        let layout = PageLayout::default();
        let corrections = StateCorrections::default();
        let extractor = PageExtractor::new(&schema, &layout, &corrections);

        let page = page("Firearm Checks", vec![]);
        let err = extractor.extract_page(&&page).unwrap_err();
        match &err {
            ExtractError::Page { page, month, .. } => {
                assert_eq!(*page, 2);
                assert!(month.is_none());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(err.root(), ExtractError::Format { .. }));
    }

    #[test]
    fn test_reconciliation_failure_is_tagged_with_month() {
        let schema = small_schema();
        let layout = PageLayout::default();
        let corrections = StateCorrections::default();
        let extractor = PageExtractor::new(&schema, &layout, &corrections);

        let page = page(
            "April - 2020",
            vec![
                cells(&["Alabama", "10", "5", "15"]),
                cells(&["Totals", "10", "5", "16"]),
            ],
        );
        let err = extractor.extract_page(&&page).unwrap_err();
        match &err {
            ExtractError::Page { month, .. } => assert_eq!(month.as_deref(), Some("2020-04")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(err.root(), ExtractError::Reconciliation(_)));
        assert!(err.to_string().contains("2020-04"));
    }

    #[test]
    fn test_wrong_column_count_fails() {
        let schema = small_schema();
        let layout = PageLayout::default();
        let corrections = StateCorrections::default();
        let extractor = PageExtractor::new(&schema, &layout, &corrections);

        let page = page("May - 2020", vec![cells(&["Alabama", "10", "5"])]);
        let err = extractor.extract_page(&&page).unwrap_err();
        assert!(matches!(
            err.root(),
            ExtractError::ColumnCount {
                row: 1,
                expected: 4,
                found: 3
            }
        ));
    }

    #[test]
    fn test_non_numeric_cell_fails() {
        let schema = small_schema();
        let layout = PageLayout::default();
        let corrections = StateCorrections::default();
        let extractor = PageExtractor::new(&schema, &layout, &corrections);

        let page = page("May - 2020", vec![cells(&["Alabama", "1O", "5", "15"])]);
        let err = extractor.extract_page(&&page).unwrap_err();
        match err.root() {
            ExtractError::Parse { column, value } => {
                assert_eq!(column, "handgun");
                assert_eq!(value, "1O");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_grid_is_empty_data() {
        let schema = small_schema();
        let layout = PageLayout::default();
        let corrections = StateCorrections::default();
        let extractor = PageExtractor::new(&schema, &layout, &corrections);

        let mut page = page("May - 2020", vec![]);
        page.grid = None;
        let err = extractor.extract_page(&&page).unwrap_err();
        assert!(matches!(err.root(), ExtractError::EmptyData));

        page.grid = Some(vec![]);
        let err = extractor.extract_page(&&page).unwrap_err();
        assert!(matches!(err.root(), ExtractError::EmptyData));

        page.left_edge = None;
        let err = extractor.extract_page(&&page).unwrap_err();
        assert!(matches!(err.root(), ExtractError::EmptyData));
    }
}
