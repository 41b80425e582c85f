//! HTML → PDF rendering through an external converter.
//!
//! `PdfRenderer` is the seam; `WkhtmltopdfRenderer` is the default and runs
//! the `wkhtmltopdf` binary on temporary files removed on drop.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF renderer '{command}' is not available: {message}")]
    RendererMissing { command: String, message: String },

    #[error("PDF renderer exited with status {status:?}: {stderr}")]
    RendererFailed { status: Option<i32>, stderr: String },

    #[error("PDF renderer produced no output")]
    EmptyOutput,

    #[error("PDF export I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Page and image settings passed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfOptions {
    pub margin_in: f32,
    pub image_quality: u8,
    pub scale: u8,
    pub page_size: &'static str,
    pub orientation: &'static str,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            margin_in: 0.5,
            image_quality: 98,
            scale: 2,
            page_size: "Letter",
            orientation: "Portrait",
        }
    }
}

#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, ExportError>;
}

/// Renderer backed by the `wkhtmltopdf` command.
#[derive(Debug, Clone)]
pub struct WkhtmltopdfRenderer {
    program: PathBuf,
}

impl WkhtmltopdfRenderer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

/// Command-line arguments for one conversion.
fn build_args(options: &PdfOptions, input: &Path, output: &Path) -> Vec<OsString> {
    let margin = format!("{}in", options.margin_in);
    let mut args: Vec<OsString> = vec!["--quiet".into(), "--enable-local-file-access".into()];
    for flag in ["--margin-top", "--margin-right", "--margin-bottom", "--margin-left"] {
        args.push(flag.into());
        args.push(margin.clone().into());
    }
    let settings = [
        ("--image-quality", options.image_quality.to_string()),
        // 96 dpi is the CSS reference resolution
        ("--dpi", (96 * u32::from(options.scale)).to_string()),
        ("--page-size", options.page_size.to_string()),
        ("--orientation", options.orientation.to_string()),
    ];
    for (flag, value) in settings {
        args.push(flag.into());
        args.push(value.into());
    }
    args.push(input.as_os_str().to_owned());
    args.push(output.as_os_str().to_owned());
    args
}

#[async_trait]
impl PdfRenderer for WkhtmltopdfRenderer {
    async fn render(&self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, ExportError> {
        let input = tempfile::Builder::new()
            .prefix("resume-")
            .suffix(".html")
            .tempfile()?;
        tokio::fs::write(input.path(), html).await?;
        let output = tempfile::Builder::new()
            .prefix("resume-")
            .suffix(".pdf")
            .tempfile()?;

        let args = build_args(options, input.path(), output.path());
        debug!("Running {} with {} args", self.program.display(), args.len());

        let result = tokio::process::Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .map_err(|e| ExportError::RendererMissing {
                command: self.program.display().to_string(),
                message: e.to_string(),
            })?;

        if !result.status.success() {
            return Err(ExportError::RendererFailed {
                status: result.status.code(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        let bytes = tokio::fs::read(output.path()).await?;
        if bytes.is_empty() {
            return Err(ExportError::EmptyOutput);
        }
        Ok(bytes)
    }
}
