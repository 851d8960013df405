use axum::{extract::State, response::Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::FetchStrategy;
use crate::utils::logging::*;
use crate::AppState;

/// GET / - liveness simples, espelha o serviço original
pub async fn root() -> &'static str {
    "✅ Zoho Sheet middleware running"
}

/// GET /health - status do serviço e estratégia ativa
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    log_health_check();

    let strategy = match state.fetcher.strategy() {
        FetchStrategy::PublicScrape => "scrape",
        FetchStrategy::AuthenticatedApi => "api",
    };

    Json(json!({
        "status": "healthy",
        "service": "zoho-sheet-middleware",
        "version": env!("CARGO_PKG_VERSION"),
        "strategy": strategy,
        "authenticated": state.token_store.is_authenticated().await,
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
