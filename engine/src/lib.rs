use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod v1;

pub use config::Config;
pub use error::{Error, Result};
pub use model::{Classifier, ResNetClassifier};
pub use pipeline::{Classification, Label};

/// Everything a request handler needs. The classifier is loaded once before
/// the router is built and shared read-only for the life of the process.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<dyn Classifier>,
}

impl AppState {
    pub fn new(classifier: impl Classifier + 'static) -> Self {
        Self {
            classifier: Arc::new(classifier),
        }
    }
}

pub fn create_app(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(v1::health_check))
        .route("/api/predict/", post(v1::predict))
        .route("/api/predict", post(v1::predict))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
