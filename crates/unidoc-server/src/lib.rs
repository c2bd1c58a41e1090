//! unidoc-server - HTTP API for consultation note processing.
//!
//! # Example
//!
//! ```ignore
//! use unidoc_core::{Database, Extractor, ReportRenderer, UnidocCore};
//! use unidoc_server::{create_server, AppState};
//!
//! #[tokio::main]
//! async fn main() {
//!     let core = UnidocCore::new(
//!         Database::open("consultations.db").unwrap(),
//!         Extractor::new(),
//!         ReportRenderer::default(),
//!     );
//!     let app = create_server(AppState::new(core));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::{Config, ConfigError};
pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{middleware as axum_middleware, Router};
use tower_http::trace::TraceLayer;

/// Create the server with all routes and middleware.
pub fn create_server(state: AppState) -> Router {
    routes::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors_layer())
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
}
