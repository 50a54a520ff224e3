//! File-to-text collaborators feeding `CvParser`.
//!
//! Extraction never fails from the caller's point of view: any error is
//! logged and reported as empty text, which the parser turns into an empty
//! record.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use tracing::{debug, error, warn};

/// Turns a file into plain text. Returns `""` when nothing can be read.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, path: &Path) -> String;
}

/// Page-ordered text of a PDF via `pdf-extract`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, path: &Path) -> String {
        // pdf-extract panics on some malformed documents.
        let result = panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text(path)));

        match result {
            Ok(Ok(text)) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    warn!(path = %path.display(), "PDF contains no extractable text");
                } else {
                    debug!(path = %path.display(), chars = text.len(), "PDF text extracted");
                }
                text
            }
            Ok(Err(e)) => {
                error!(path = %path.display(), "PDF extraction failed: {e}");
                String::new()
            }
            Err(_) => {
                error!(path = %path.display(), "PDF extraction panicked");
                String::new()
            }
        }
    }
}

/// Reads a UTF-8 text file as is; invalid sequences are replaced.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, path: &Path) -> String {
        match std::fs::read(path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                error!(path = %path.display(), "Failed to read text file: {e}");
                String::new()
            }
        }
    }
}
