//! Local JSON API over the person registry and the tree cache.
//!
//! Renderers fetch a tree's graph or a positioned layout and draw it
//! themselves; the server does no rendering. Person records can be created
//! and edited; an edit is merged into the editee's own stored tree.
//!
//! # Module Structure
//!
//! - `handlers` - HTTP route handlers and error mapping
//! - `models` - API request/response types (DTOs)

mod handlers;
mod models;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use lineage_core::{Config, FileStorage, PersonRegistry, TreeCache};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state for the server.
pub struct AppState {
    /// Person registry over the configured storage.
    pub registry: RwLock<PersonRegistry<FileStorage>>,
    /// Tree cache over the same storage.
    pub cache: RwLock<TreeCache<FileStorage>>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            registry: RwLock::new(PersonRegistry::new(FileStorage::with_config(
                config.storage.clone(),
            ))),
            cache: RwLock::new(TreeCache::with_layout_config(
                FileStorage::with_config(config.storage.clone()),
                config.layout.clone(),
            )),
        }
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

/// Configuration for the tree server.
pub struct ServeConfig {
    /// Port to listen on.
    pub port: u16,
    /// Storage and layout settings.
    pub config: Config,
}

// =============================================================================
// Server Entry Point
// =============================================================================

/// Builds the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/persons",
            get(handlers::list_persons).post(handlers::create_person),
        )
        .route("/api/persons/search", get(handlers::search_persons))
        .route(
            "/api/persons/{id}",
            get(handlers::get_person).put(handlers::update_person),
        )
        .route("/api/trees/{id}", get(handlers::get_tree))
        .route("/api/trees/{id}/graph", get(handlers::get_graph))
        .route("/api/trees/{id}/layout", get(handlers::get_layout))
        // CORS for browser renderers and edit forms
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Start the tree server.
pub async fn start_server(config: ServeConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState::new(&config.config));
    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));

    info!(%addr, data_dir = %config.config.storage.data_dir, "starting tree server");
    println!("Lineage API: http://localhost:{}/api/persons", config.port);
    println!("Press Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
