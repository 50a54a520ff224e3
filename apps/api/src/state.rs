use std::sync::Arc;

use crate::config::Config;
use crate::extraction::TextExtractor;
use crate::parser::CvParser;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Compiled once at startup, read-only afterwards.
    pub parser: Arc<CvParser>,
    /// Pluggable PDF-to-text extractor. Default: PdfTextExtractor.
    pub extractor: Arc<dyn TextExtractor>,
    pub config: Config,
}
