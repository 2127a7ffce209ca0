//! Rug Atelier Backend
//!
//! REST backend for a handmade-rug retailer: lead capture, catalog administration,
//! file uploads and an admin audit trail, persisted in SQLite.

mod api;
mod auth;
mod cache;
mod config;
mod db;
mod errors;
mod mailer;
mod models;
mod storage;
mod validation;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::{SessionVerifier, StaticSessionVerifier};
use cache::CacheTags;
use config::Config;
use db::Repository;
use mailer::Mailer;
use storage::{LocalObjectStorage, ObjectStorage, MAX_FILES_PER_UPLOAD};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub storage: Arc<dyn ObjectStorage>,
    pub sessions: Arc<dyn SessionVerifier>,
    pub cache: Arc<CacheTags>,
    pub mailer: Arc<Mailer>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire up the default collaborators for a configuration.
    pub fn new(repo: Repository, config: Config) -> Self {
        let storage = LocalObjectStorage::new(config.upload_dir.clone(), &config.base_url);
        let sessions = StaticSessionVerifier::new(config.admin_sessions.clone());
        if sessions.is_empty() {
            tracing::warn!("No admin sessions configured (RUGS_ADMIN_SESSIONS). Admin routes will reject every request!");
        }
        Self {
            repo: Arc::new(repo),
            storage: Arc::new(storage),
            sessions: Arc::new(sessions),
            cache: Arc::new(CacheTags::new()),
            mailer: Arc::new(Mailer::new(&config)),
            config: Arc::new(config),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging first so configuration fallbacks are reported
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config::log_level_from_env()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();

    tracing::info!("Starting Rug Atelier Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Upload directory: {:?}", config.upload_dir);
    tracing::info!("Bind address: {}", config.bind_addr);

    tokio::fs::create_dir_all(&config.upload_dir).await?;

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let state = AppState::new(Repository::new(pool), config.clone());

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let upload_limit = DefaultBodyLimit::max(upload_body_limit(state.config.max_upload_bytes));

    let sessions = state.sessions.clone();

    // Public routes
    let public_routes = Router::new()
        // Lead forms
        .route("/leads/contact", post(api::create_contact_lead))
        .route("/leads/enquiry", post(api::create_enquiry_lead))
        .route("/leads/customize", post(api::create_customize_lead))
        .route("/leads/trade", post(api::create_trade_lead))
        // Moodboard images for the customize form
        .route(
            "/uploads/moodboard",
            post(api::upload_moodboard).layer(upload_limit.clone()),
        )
        // Catalog
        .route("/products", get(api::list_public_products))
        .route("/products/featured", get(api::list_featured_products))
        .route("/products/{slug}", get(api::get_public_product))
        .route("/collections", get(api::list_public_collections))
        .route("/collections/{slug}", get(api::get_public_collection))
        .route("/weave-types", get(api::list_public_weave_types))
        // Site documents
        .route("/settings", get(api::get_site_settings))
        .route("/lookbook", get(api::get_lookbook))
        .route("/cache/tags", get(api::get_cache_tags));

    // Admin routes
    let admin_routes = Router::new()
        // Leads
        .route("/leads", get(api::list_leads))
        .route("/leads/stats", get(api::get_lead_stats))
        .route("/leads/bulk/status", put(api::bulk_update_lead_status))
        .route("/leads/bulk/delete", post(api::bulk_delete_leads))
        .route(
            "/leads/{id}",
            get(api::get_lead)
                .put(api::update_lead)
                .delete(api::delete_lead),
        )
        .route("/leads/{id}/status", put(api::update_lead_status))
        .route("/leads/{id}/notes", post(api::add_lead_note))
        .route("/leads/{id}/assign", put(api::assign_lead))
        // Products
        .route("/products", get(api::list_products).post(api::create_product))
        .route("/products/bulk", put(api::bulk_update_products))
        .route(
            "/products/{id}",
            get(api::get_product)
                .put(api::update_product)
                .delete(api::delete_product),
        )
        .route("/products/{id}/toggle-status", post(api::toggle_product_status))
        .route("/products/{id}/toggle-featured", post(api::toggle_product_featured))
        .route("/products/{id}/duplicate", post(api::duplicate_product))
        // Collections
        .route(
            "/collections",
            get(api::list_collections).post(api::create_collection),
        )
        .route("/collections/bulk", put(api::bulk_update_collections))
        .route(
            "/collections/{id}",
            get(api::get_collection)
                .put(api::update_collection)
                .delete(api::delete_collection),
        )
        .route(
            "/collections/{id}/toggle-status",
            post(api::toggle_collection_status),
        )
        .route("/collections/{id}/duplicate", post(api::duplicate_collection))
        // Weave types
        .route(
            "/weave-types",
            get(api::list_weave_types).post(api::create_weave_type),
        )
        .route("/weave-types/bulk", put(api::bulk_update_weave_types))
        .route(
            "/weave-types/{id}",
            get(api::get_weave_type)
                .put(api::update_weave_type)
                .delete(api::delete_weave_type),
        )
        .route(
            "/weave-types/{id}/toggle-status",
            post(api::toggle_weave_type_status),
        )
        .route("/weave-types/{id}/duplicate", post(api::duplicate_weave_type))
        // Site documents
        .route("/settings", put(api::update_site_settings))
        .route("/lookbook", put(api::update_lookbook))
        // Uploads
        .route("/uploads", delete(api::delete_upload))
        .route(
            "/uploads/{context}",
            post(api::upload_admin_files).layer(upload_limit),
        )
        // Audit log
        .route("/audit-logs", get(api::list_audit_logs))
        .route("/audit-logs/cleanup", post(api::cleanup_audit_logs))
        // Apply admin session middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::admin_auth_layer(sessions.clone(), req, next)
        }));

    // Health check and stored media (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));
    let media = ServeDir::new(state.config.upload_dir.clone());

    Router::new()
        .nest("/api/admin", admin_routes)
        .nest("/api", public_routes)
        .nest_service("/media", media)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Room for a full batch of maximum-size files plus multipart framing.
fn upload_body_limit(max_upload_bytes: usize) -> usize {
    max_upload_bytes
        .saturating_mul(MAX_FILES_PER_UPLOAD)
        .saturating_add(1024 * 1024)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
