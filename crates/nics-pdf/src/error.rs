use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to parse PDF: {0}")]
    Load(#[from] lopdf::Error),

    #[error("Failed to read content of page {page}: {message}")]
    Content { page: usize, message: String },

    #[error("Page {0} does not exist")]
    MissingPage(usize),
}

pub type Result<T> = std::result::Result<T, PdfError>;
