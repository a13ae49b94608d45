//! Loading documents and interpreting their pages

use std::path::Path;

use lopdf::{Document, ObjectId};
use tracing::{debug, info};

use crate::content::{ContentInterpreter, MediaBox};
use crate::error::{PdfError, Result};
use crate::objects::{inherited, numbers};
use crate::page::PdfPage;

/// A parsed PDF document.
pub struct PdfDocument {
    doc: Document,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let doc = Document::load(path)?;
        info!(path = %path.display(), pages = doc.get_pages().len(), "loaded pdf");
        Ok(Self { doc })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            doc: Document::load_mem(bytes)?,
        })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Interpret every page, in document order.
    pub fn pages(&self) -> Result<Vec<PdfPage>> {
        self.doc
            .get_pages()
            .into_iter()
            .enumerate()
            .map(|(i, (_, id))| self.interpret(i + 1, id))
            .collect()
    }

    /// Interpret one page by 1-based number.
    pub fn page(&self, number: usize) -> Result<PdfPage> {
        let id = number
            .checked_sub(1)
            .and_then(|i| self.doc.get_pages().into_values().nth(i))
            .ok_or(PdfError::MissingPage(number))?;
        self.interpret(number, id)
    }

    fn interpret(&self, number: usize, id: ObjectId) -> Result<PdfPage> {
        let media_box = inherited(&self.doc, id, b"MediaBox")
            .and_then(|o| o.as_array().ok())
            .and_then(|a| numbers(&self.doc, a))
            .and_then(|v| MediaBox::from_array(&v))
            .unwrap_or(MediaBox::LETTER);
        let resources = inherited(&self.doc, id, b"Resources").and_then(|o| o.as_dict().ok());

        let content_error = |e: lopdf::Error| PdfError::Content {
            page: number,
            message: e.to_string(),
        };
        let content = self.doc.get_page_content(id).map_err(content_error)?;
        let objects = ContentInterpreter::new(&self.doc, resources, media_box)
            .run(&content)
            .map_err(content_error)?;

        debug!(
            page = number,
            chars = objects.chars.len(),
            edges = objects.edges.len(),
            "interpreted page"
        );
        Ok(PdfPage::new(number, media_box.width(), media_box.height(), objects))
    }
}
