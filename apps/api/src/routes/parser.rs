use std::io::Write;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::cv::CvRecord;
use crate::state::AppState;

/// Multipart part carrying the uploaded CV.
const FILE_FIELD: &str = "file";
const PDF_CONTENT_TYPE: &str = "application/pdf";
const TEXT_CONTENT_TYPE: &str = "text/plain";
/// Shorter plain-text uploads can't hold a CV.
const MIN_TEXT_CHARS: usize = 10;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResponse {
    pub success: bool,
    pub data: CvRecord,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_length: Option<usize>,
}

/// The `file` part of a multipart upload.
struct Upload {
    file_name: String,
    content_type: String,
    data: Bytes,
}

impl Upload {
    fn is_pdf(&self) -> bool {
        self.content_type == PDF_CONTENT_TYPE || self.file_name.to_lowercase().ends_with(".pdf")
    }

    fn is_plain_text(&self) -> bool {
        self.content_type.starts_with(TEXT_CONTENT_TYPE)
    }
}

/// POST /api/parser
/// Multipart PDF upload -> parsed CV.
pub async fn handle_parse_pdf(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ParseResponse>, AppError> {
    let max = state.config.max_upload_bytes;
    let upload = read_upload(multipart, max).await?;
    info!(
        file = %upload.file_name,
        size = upload.data.len(),
        content_type = %upload.content_type,
        "PDF upload received"
    );

    if !upload.is_pdf() {
        return Err(AppError::UnsupportedMediaType(
            "Only PDF files are allowed".to_string(),
        ));
    }
    check_size(&upload, max)?;

    let parser = Arc::clone(&state.parser);
    let extractor = Arc::clone(&state.extractor);
    let data = upload.data;

    // PDF extraction and parsing are CPU-bound; the temp file is removed on drop.
    let record = tokio::task::spawn_blocking(move || -> anyhow::Result<CvRecord> {
        let mut file = tempfile::Builder::new()
            .prefix("cv-upload-")
            .suffix(".pdf")
            .tempfile()
            .context("Failed to create temporary PDF file")?;
        file.write_all(&data)
            .and_then(|_| file.flush())
            .context("Failed to write temporary PDF file")?;
        Ok(parser.parse_file(file.path(), extractor.as_ref()))
    })
    .await
    .map_err(|e| AppError::Internal(anyhow!("spawn_blocking failed in PDF parsing: {e}")))??;

    let message = if record.is_empty() {
        "No information could be extracted from the PDF"
    } else {
        "CV parsed successfully"
    };

    Ok(Json(ParseResponse {
        success: true,
        data: record,
        message: message.to_string(),
        source: None,
        text_length: None,
    }))
}

/// POST /api/parser/text
/// Multipart plain-text upload -> parsed CV, no PDF extraction.
pub async fn handle_parse_text(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ParseResponse>, AppError> {
    let max = state.config.max_upload_bytes;
    let upload = read_upload(multipart, max).await?;
    info!(
        file = %upload.file_name,
        size = upload.data.len(),
        content_type = %upload.content_type,
        "Text upload received"
    );

    if !upload.is_plain_text() {
        return Err(AppError::UnsupportedMediaType(
            "Only plain text files are supported".to_string(),
        ));
    }
    check_size(&upload, max)?;

    let text = String::from_utf8_lossy(&upload.data).into_owned();
    let text_length = text.chars().count();
    if text_length < MIN_TEXT_CHARS {
        return Err(AppError::Validation(
            "File content is empty or too short".to_string(),
        ));
    }

    let parser = Arc::clone(&state.parser);
    let record = tokio::task::spawn_blocking(move || parser.parse(&text))
        .await
        .map_err(|e| AppError::Internal(anyhow!("spawn_blocking failed in text parsing: {e}")))?;

    Ok(Json(ParseResponse {
        success: true,
        data: record,
        message: "CV parsed successfully".to_string(),
        source: Some("regex-only"),
        text_length: Some(text_length),
    }))
}

/// Returns the first `file` part; other parts are skipped.
async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
    max: usize,
) -> Result<Upload, AppError> {
    let mut multipart = multipart.map_err(|e| {
        warn!("Rejected upload: {e}");
        AppError::Validation("Invalid form data".to_string())
    })?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(|e| multipart_error(e, max))?;
        return Ok(Upload {
            file_name,
            content_type,
            data,
        });
    }

    Err(AppError::Validation("No file provided".to_string()))
}

fn check_size(upload: &Upload, max: usize) -> Result<(), AppError> {
    if upload.data.len() > max {
        warn!(size = upload.data.len(), max, "Upload too large");
        return Err(AppError::PayloadTooLarge { max });
    }
    Ok(())
}

/// Body-limit overruns surface as multipart errors.
fn multipart_error(e: MultipartError, max: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!(max, "Upload exceeded the body limit");
        return AppError::PayloadTooLarge { max };
    }
    warn!("Failed to read multipart body: {e}");
    AppError::Validation("Invalid form data".to_string())
}
