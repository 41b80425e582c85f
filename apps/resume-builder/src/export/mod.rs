pub mod pdf;

use std::sync::Arc;

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tracing::info;

use crate::models::resume::non_blank;
use pdf::{ExportError, PdfOptions, PdfRenderer};

/// A rendered PDF ready to be served as a download.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    pub filename: String,
    pub bytes: Bytes,
}

impl IntoResponse for PdfDocument {
    fn into_response(self) -> Response {
        let disposition = format!("attachment; filename=\"{}\"", self.filename);
        (
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.bytes,
        )
            .into_response()
    }
}

/// Feeds populated HTML to the renderer with the fixed export options.
#[derive(Clone)]
pub struct PdfExporter {
    renderer: Arc<dyn PdfRenderer>,
    options: PdfOptions,
}

impl PdfExporter {
    pub fn new(renderer: Arc<dyn PdfRenderer>) -> Self {
        Self {
            renderer,
            options: PdfOptions::default(),
        }
    }

    pub async fn export(&self, html: &str, filename: String) -> Result<PdfDocument, ExportError> {
        let bytes = self.renderer.render(html, &self.options).await?;
        info!("Exported {filename} ({} bytes)", bytes.len());
        Ok(PdfDocument {
            filename,
            bytes: Bytes::from(bytes),
        })
    }
}

/// "{name} - Resume.pdf", falling back to "Resume".
pub fn resume_filename(full_name: Option<&str>) -> String {
    sanitize_filename(&format!("{} - Resume.pdf", non_blank(full_name).unwrap_or("Resume")))
}

/// "CoverLetter_{company}.pdf", falling back to "Document".
pub fn cover_letter_filename(company_name: Option<&str>) -> String {
    sanitize_filename(&format!(
        "CoverLetter_{}.pdf",
        non_blank(company_name).unwrap_or("Document")
    ))
}

/// Replaces characters that would break a quoted `Content-Disposition` filename.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' | '/' | ':' | '*' | '?' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
