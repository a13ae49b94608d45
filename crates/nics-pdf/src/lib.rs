//! lopdf page backend for NICS report extraction
//!
//! Interprets page content streams into positioned glyphs and ruling lines
//! and implements the `nics_core` page traits over them: region cropping,
//! plain-text extraction and geometric table reconstruction.

pub mod content;
pub mod document;
pub mod error;
mod font;
pub mod geometry;
mod objects;
pub mod page;
pub mod table;
pub mod text;

pub use content::{MediaBox, PageObjects};
pub use document::PdfDocument;
pub use error::PdfError;
pub use geometry::{Char, Edge, Orientation};
pub use page::{PdfPage, PdfRegion};
pub use table::{Table, TableFinder};
