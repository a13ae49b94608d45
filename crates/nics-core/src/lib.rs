//! NICS monthly firearm background check tables
//!
//! This crate turns pages of the monthly NICS report into validated,
//! row-labelled records. It is independent of any PDF library: pages are
//! reached through the [`RawPage`] and [`PageRegion`] traits, which a
//! geometry backend implements.
//!
//! - `extract`: per-page header and grid reading
//! - `validate`: doubling-rule reconciliation of row and column totals
//! - `assemble`: whole-document concatenation, sequential or on rayon
//! - `export`: territory filtering and CSV output

pub mod assemble;
pub mod coerce;
pub mod config;
pub mod corrections;
pub mod error;
pub mod export;
pub mod extract;
pub mod month;
pub mod page;
pub mod schema;
pub mod states;
pub mod table;
pub mod validate;

pub use assemble::{assemble, assemble_parallel};
pub use coerce::{coerce_cell, CellValue};
pub use config::{Config, ExportConfig, PageLayout};
pub use corrections::StateCorrections;
pub use error::{ExtractError, Mismatch, Result};
pub use export::write_csv;
pub use extract::PageExtractor;
pub use month::{parse_month_label, MonthKey};
pub use page::{BBox, PageRegion, RawPage, Strategy, TableGrid, TableSettings};
pub use schema::ColumnSchema;
pub use states::State;
pub use table::{DataRow, Dataset, StateTable};
pub use validate::validate_rows;
