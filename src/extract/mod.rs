//! Document text extraction
//!
//! Maps an uploaded file's declared MIME type onto one of the supported
//! document kinds and turns its bytes into plain text:
//! - PDF → text of every page, in page order (`lopdf`)
//! - XLSX / XLS → every sheet rendered as CSV, one trailing newline per sheet (`calamine` + `csv`)

pub mod pdf;
pub mod spreadsheet;

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

pub const PDF_MIME: &str = "application/pdf";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const XLS_MIME: &str = "application/vnd.ms-excel";

/// Errors raised while turning a document into text
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF parsing failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Spreadsheet parsing failed: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("CSV rendering failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rendered text is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Extraction task failed: {0}")]
    Join(String),
}

/// The closed set of document types the upload endpoint accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Xlsx,
    Xls,
}

impl DocumentKind {
    /// Resolve a declared MIME type. Parameters (`; charset=...`) and case are ignored.
    pub fn from_mime(content_type: &str) -> Option<Self> {
        let parsed: mime::Mime = content_type.trim().parse().ok()?;
        match parsed.essence_str().to_ascii_lowercase().as_str() {
            PDF_MIME => Some(DocumentKind::Pdf),
            XLSX_MIME => Some(DocumentKind::Xlsx),
            XLS_MIME => Some(DocumentKind::Xls),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => PDF_MIME,
            DocumentKind::Xlsx => XLSX_MIME,
            DocumentKind::Xls => XLS_MIME,
        }
    }

    pub fn extract(&self, data: &[u8]) -> Result<String, ExtractError> {
        match self {
            DocumentKind::Pdf => pdf::extract_text(data),
            DocumentKind::Xlsx | DocumentKind::Xls => spreadsheet::extract_text(data),
        }
    }

    /// Run [`DocumentKind::extract`] on the blocking pool so parsing never stalls the runtime.
    pub async fn extract_blocking(self, data: Bytes) -> Result<String, ExtractError> {
        debug!(kind = ?self, size = data.len(), "Extracting document text");
        tokio::task::spawn_blocking(move || self.extract(&data))
            .await
            .map_err(|e| ExtractError::Join(e.to_string()))?
    }
}
