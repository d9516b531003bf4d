use std::sync::Arc;

use crate::artifacts::ModelArtifacts;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Fitted vectorizer, classifier and label encoder. Read-only for the process lifetime.
    pub artifacts: Arc<ModelArtifacts>,
}
