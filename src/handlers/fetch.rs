use axum::{extract::State, http::Method, response::Json};
use serde_json::Value;
use std::sync::Arc;
use tokio::time::Instant;

use crate::utils::logging::*;
use crate::utils::AppResult;
use crate::AppState;

/// GET|POST /fetch-data
///
/// Executa a estratégia configurada (scrape ou api) e devolve o JSON
/// extraído. Tradução pura de request em chamada de componente: toda a
/// lógica mora no SheetFetcher.
pub async fn handle_fetch_data(
    method: Method,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Value>> {
    let start_time = Instant::now();
    log_request_received("/fetch-data", method.as_str());

    let payload = state.fetcher.fetch(&state.token_store).await?;

    let processing_time = start_time.elapsed().as_millis() as u64;
    log_request_processed("/fetch-data", 200, processing_time);

    Ok(Json(payload))
}
