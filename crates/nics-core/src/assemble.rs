//! Document assembly
//!
//! Pages are independent: each one is extracted and validated on its own and
//! the results are concatenated in document order. The first failing page
//! (by page order) aborts the whole document.

use rayon::prelude::*;
use tracing::info;

use crate::error::Result;
use crate::extract::PageExtractor;
use crate::page::RawPage;
use crate::table::{Dataset, StateTable};

/// Extract every page in order and build the dataset.
pub fn assemble<P: RawPage>(pages: &[P], extractor: &PageExtractor<'_>) -> Result<Dataset> {
    let tables = pages
        .iter()
        .map(|page| extractor.extract_page(page))
        .collect::<Result<Vec<StateTable>>>()?;
    Ok(finish(tables, extractor))
}

/// Like [`assemble`], with pages extracted on the rayon pool.
///
/// Output order and the reported error are the same as the sequential run:
/// rows follow page order and the error of the lowest-numbered failing page
/// is returned, whichever page finished first.
pub fn assemble_parallel<P>(pages: &[P], extractor: &PageExtractor<'_>) -> Result<Dataset>
where
    P: RawPage + Sync,
{
    let results: Vec<Result<StateTable>> = pages
        .par_iter()
        .map(|page| extractor.extract_page(page))
        .collect();
    let tables = results.into_iter().collect::<Result<Vec<StateTable>>>()?;
    Ok(finish(tables, extractor))
}

fn finish(tables: Vec<StateTable>, extractor: &PageExtractor<'_>) -> Dataset {
    let pages = tables.len();
    let dataset = Dataset::from_tables(extractor.schema().clone(), tables);
    info!(pages, rows = dataset.len(), "assembled dataset");
    dataset
}
