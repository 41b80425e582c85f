use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::templates::catalog;

pub const COVER_LETTER_TEMPLATE: &str = "cover-letter-template.html";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Unknown template '{0}'")]
    UnknownTemplate(String),

    #[error("Template '{0}' is not installed")]
    Missing(String),

    #[error("Failed to read template '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Reads static HTML templates from the template directory.
#[derive(Debug, Clone)]
pub struct TemplateFetcher {
    root: PathBuf,
}

impl TemplateFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns `{root}/{id}/index.html`. Ids outside the catalog are rejected
    /// before any file access.
    pub async fn fetch(&self, template_id: &str) -> Result<String, TemplateError> {
        if catalog::find(template_id).is_none() {
            return Err(TemplateError::UnknownTemplate(template_id.to_string()));
        }
        self.read(template_id, self.root.join(template_id).join("index.html"))
            .await
    }

    pub async fn fetch_cover_letter(&self) -> Result<String, TemplateError> {
        self.read(COVER_LETTER_TEMPLATE, self.root.join(COVER_LETTER_TEMPLATE))
            .await
    }

    async fn read(&self, name: &str, path: PathBuf) -> Result<String, TemplateError> {
        debug!("Loading template {}", path.display());
        tokio::fs::read_to_string(&path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                TemplateError::Missing(name.to_string())
            } else {
                TemplateError::Io {
                    name: name.to_string(),
                    source,
                }
            }
        })
    }
}
