//! OAuth2 HTTP Client
//!
//! Cliente HTTP isolado para comunicação com o endpoint de tokens do Zoho

use reqwest::Client;
use serde_json::Value;

use super::{AccessToken, OAuth2Config, TokenSource};
use crate::utils::logging::*;
use crate::utils::{truncate_safe, AppError, AppResult};

/// Cliente OAuth2 para o Zoho Accounts
pub struct OAuth2Client {
    config: OAuth2Config,
    http_client: Client,
}

impl OAuth2Client {
    /// Criar novo cliente OAuth2
    pub fn new(config: OAuth2Config) -> Self {
        Self {
            config,
            http_client: Client::new(),
        }
    }

    pub fn config(&self) -> &OAuth2Config {
        &self.config
    }

    /// Trocar authorization code por access token (uso único)
    ///
    /// # Retorno
    /// - `Ok(AccessToken)`: Token obtido com sucesso
    /// - `Err(AppError::Auth)`: Provedor rejeitou a troca ou resposta sem token
    pub async fn exchange_authorization_code(&self, code: &str) -> AppResult<AccessToken> {
        log_info(&format!(
            "🔐 [OAuth2] Trocando authorization code por access token: {}...",
            truncate_safe(code, 10)
        ));

        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let value = self.request_token(&params).await?;
        self.extract_access_token(value, TokenSource::CodeExchange)
    }

    /// Trocar refresh token por um novo access token (repetível)
    ///
    /// Cada chamada produz um token novo no provedor; do ponto de vista do
    /// chamador a operação é idempotente.
    pub async fn exchange_refresh_token(&self, refresh_token: &str) -> AppResult<AccessToken> {
        log_info("🔄 [OAuth2] Trocando refresh token por novo access token...");

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        let value = self.request_token(&params).await?;
        self.extract_access_token(value, TokenSource::RefreshExchange)
    }

    /// POST form ao endpoint de tokens; status não-2xx vira AppError::Auth
    async fn request_token(&self, params: &[(&str, &str)]) -> AppResult<Value> {
        let url = self.config.token_url();

        let response = self
            .http_client
            .post(&url)
            .form(params)
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("Falha ao conectar com Zoho OAuth API: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log_error(&format!(
                "❌ [OAuth2] Token exchange failed: {} - {}",
                status, error_text
            ));
            return Err(AppError::Auth(format!(
                "OAuth token exchange failed [{}]: {}",
                status, error_text
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AppError::Auth(format!("Falha ao parsear resposta do token: {}", e)))
    }

    /// Valida o corpo da resposta: o Zoho devolve HTTP 200 com um campo
    /// `error` quando o code/refresh token é inválido, então sucesso HTTP
    /// não basta — o campo `access_token` precisa existir.
    fn extract_access_token(&self, value: Value, source: TokenSource) -> AppResult<AccessToken> {
        match value.get("access_token").and_then(|v| v.as_str()) {
            Some(token) => {
                log_info(&format!(
                    "✅ [OAuth2] Access token obtido ({}): {}...",
                    source.as_str(),
                    truncate_safe(token, 20)
                ));
                Ok(AccessToken::new(token.to_string(), source))
            }
            None => {
                let provider_error = value
                    .get("error")
                    .and_then(|v| v.as_str())
                    .unwrap_or("resposta sem campo access_token");
                log_error(&format!(
                    "❌ [OAuth2] Token exchange rejeitado: {}",
                    provider_error
                ));
                Err(AppError::Auth(format!(
                    "OAuth token exchange rejected: {}",
                    provider_error
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn config_for(server: &MockServer) -> OAuth2Config {
        OAuth2Config {
            client_id: "test_client_id".to_string(),
            client_secret: "test_secret".to_string(),
            redirect_uri: "https://example.com/oauth/callback".to_string(),
            accounts_base_url: server.base_url(),
            auth_code: None,
            refresh_token: None,
        }
    }

    #[tokio::test]
    async fn test_refresh_exchange_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/oauth/v2/token")
                .body_contains("grant_type=refresh_token")
                .body_contains("refresh_token=refresh_1")
                .body_contains("client_id=test_client_id");
            then.status(200).json_body(json!({
                "access_token": "fresh_token_123",
                "token_type": "Bearer",
                "expires_in": 3600
            }));
        });

        let client = OAuth2Client::new(config_for(&server));
        let token = client.exchange_refresh_token("refresh_1").await.unwrap();

        mock.assert();
        assert_eq!(token.value, "fresh_token_123");
        assert_eq!(token.source, TokenSource::RefreshExchange);
    }

    #[tokio::test]
    async fn test_code_exchange_sends_redirect_uri() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/oauth/v2/token")
                .body_contains("grant_type=authorization_code")
                .body_contains("code=one_time_code");
            then.status(200).json_body(json!({
                "access_token": "code_token_456",
                "token_type": "Bearer"
            }));
        });

        let client = OAuth2Client::new(config_for(&server));
        let token = client
            .exchange_authorization_code("one_time_code")
            .await
            .unwrap();

        mock.assert();
        assert_eq!(token.value, "code_token_456");
        assert_eq!(token.source, TokenSource::CodeExchange);
    }

    #[tokio::test]
    async fn test_non_success_status_is_auth_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/oauth/v2/token");
            then.status(400).body("invalid_client");
        });

        let client = OAuth2Client::new(config_for(&server));
        let err = client
            .exchange_refresh_token("bad_refresh")
            .await
            .unwrap_err();

        match err {
            AppError::Auth(msg) => assert!(msg.contains("invalid_client")),
            other => panic!("esperado AppError::Auth, veio {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_200_with_error_body_is_auth_error() {
        // Zoho responde 200 com {"error": "invalid_code"} para code inválido
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/oauth/v2/token");
            then.status(200).json_body(json!({"error": "invalid_code"}));
        });

        let client = OAuth2Client::new(config_for(&server));
        let err = client
            .exchange_authorization_code("expired_code")
            .await
            .unwrap_err();

        match err {
            AppError::Auth(msg) => assert!(msg.contains("invalid_code")),
            other => panic!("esperado AppError::Auth, veio {:?}", other),
        }
    }
}
