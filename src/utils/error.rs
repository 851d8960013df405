use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    /// Troca de token rejeitada pelo provedor ou resposta malformada
    Auth(String),
    /// Fetch autenticado tentado antes de existir qualquer token
    NotAuthenticated,
    /// Chamada à API de planilha falhou (status e body propagados)
    Upstream { status: u16, body: String },
    /// Scrape não encontrou tabela nem literal recuperável, ou parse falhou
    Extraction(String),
    ConfigError(String),
    ValidationError(String),
    JsonError(serde_json::Error),
    HttpError(reqwest::Error),
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Auth(msg) => write!(f, "OAuth2 error: {}", msg),
            AppError::NotAuthenticated => {
                write!(f, "Not authenticated: no access token cached yet")
            }
            AppError::Upstream { status, body } => {
                write!(f, "Zoho API error [{}]: {}", status, body)
            }
            AppError::Extraction(msg) => write!(f, "Extraction error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::JsonError(err) => write!(f, "JSON error: {}", err),
            AppError::HttpError(err) => write!(f, "HTTP error: {}", err),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::JsonError(err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::HttpError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotAuthenticated => (
                StatusCode::UNAUTHORIZED,
                "No access token cached. Call /get-token or /refresh-token first.".to_string(),
            ),
            AppError::Upstream { status, body } => (
                StatusCode::BAD_GATEWAY,
                format!("Zoho API returned {}: {}", status, body),
            ),
            AppError::Extraction(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::ConfigError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::JsonError(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::HttpError(err) => (StatusCode::BAD_GATEWAY, err.to_string()),
            AppError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = json!({
            "error": error_message,
            "status": status.as_u16()
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_authenticated_maps_to_401() {
        let response = AppError::NotAuthenticated.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_upstream_maps_to_502() {
        let err = AppError::Upstream {
            status: 500,
            body: "boom".to_string(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_extraction_maps_to_500() {
        let response = AppError::Extraction("no table".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
