mod alerts;
mod api_client;
mod auth;
mod config;
mod errors;
mod export;
mod models;
mod resume;
mod routes;
mod state;
mod templates;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::api_client::BackendClient;
use crate::auth::form::AuthForm;
use crate::auth::session::SessionManager;
use crate::auth::storage::FileSessionStorage;
use crate::config::Config;
use crate::export::pdf::WkhtmltopdfRenderer;
use crate::export::PdfExporter;
use crate::resume::store::ResumeStore;
use crate::routes::build_router;
use crate::state::AppState;
use crate::templates::fetcher::TemplateFetcher;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume-builder v{}", env!("CARGO_PKG_VERSION"));

    // One client serves every backend trait
    let backend = Arc::new(BackendClient::new(&config.api_url, config.api_key.clone())?);
    info!("Backend client initialized ({})", config.api_url);

    // Restore the persisted session, if any
    let storage = Arc::new(FileSessionStorage::new(config.session_file.clone()));
    let session = SessionManager::restore(backend.clone(), storage).await;

    let renderer = Arc::new(WkhtmltopdfRenderer::new(config.wkhtmltopdf_path.clone()));
    info!(
        "Templates from {}, PDFs via {}",
        config.templates_dir.display(),
        config.wkhtmltopdf_path.display()
    );

    let state = AppState {
        session: Arc::new(session),
        auth_form: Arc::new(Mutex::new(AuthForm::default())),
        resumes: Arc::new(ResumeStore::new(backend.clone())),
        alerts: backend,
        templates: TemplateFetcher::new(config.templates_dir.clone()),
        pdf: PdfExporter::new(renderer),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
