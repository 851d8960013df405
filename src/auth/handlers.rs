//! OAuth2 HTTP Handlers
//!
//! Endpoints HTTP para iniciar e completar o fluxo OAuth2

use axum::{
    extract::{Query, State},
    response::{Html, Json, Redirect},
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{OAuth2Client, OAuth2Config, TokenStore};
use crate::utils::logging::*;
use crate::utils::{truncate_safe, AppError, AppResult};

/// Parâmetros do callback OAuth2
#[derive(Debug, Deserialize)]
pub struct OAuthCallbackParams {
    /// Authorization code retornado pelo Zoho
    code: Option<String>,
    /// Erro retornado pelo Zoho (se houver)
    error: Option<String>,
}

/// State compartilhado para os handlers OAuth2
pub struct OAuth2State {
    pub client: OAuth2Client,
    pub token_store: Arc<TokenStore>,
}

impl OAuth2State {
    pub fn new(config: OAuth2Config, token_store: Arc<TokenStore>) -> Self {
        Self {
            client: OAuth2Client::new(config),
            token_store,
        }
    }
}

/// GET /auth
///
/// Inicia o fluxo OAuth2 redirecionando o usuário para a tela de
/// consentimento do Zoho
pub async fn start_oauth_flow(State(oauth_state): State<Arc<OAuth2State>>) -> Redirect {
    log_request_received("/auth", "GET");

    let auth_url = oauth_state.client.config().authorization_url();

    log_info(&format!("↗️  [OAuth2] Redirecionando para: {}", auth_url));

    Redirect::to(&auth_url)
}

/// GET /oauth/callback?code=XXX
///
/// Recebe o callback OAuth2 do Zoho e troca o code por access token
pub async fn handle_oauth_callback(
    State(oauth_state): State<Arc<OAuth2State>>,
    Query(params): Query<OAuthCallbackParams>,
) -> AppResult<Html<String>> {
    log_request_received("/oauth/callback", "GET");

    // Verificar se houve erro na autorização
    if let Some(error) = params.error {
        log_error(&format!("❌ [OAuth2] Erro na autorização: {}", error));
        return Ok(render_error_page(&error));
    }

    // Obter authorization code
    let code = params.code.ok_or_else(|| {
        log_error("❌ [OAuth2] Code não recebido no callback");
        AppError::ValidationError("Missing code parameter".to_string())
    })?;

    log_info(&format!(
        "🔑 [OAuth2] Code recebido: {}...",
        truncate_safe(&code, 10)
    ));

    // Trocar code por access token; só grava no store em caso de sucesso
    let token = oauth_state.client.exchange_authorization_code(&code).await?;
    let preview = truncate_safe(&token.value, 20).to_string();
    oauth_state.token_store.set(token).await;

    log_info("✅ [OAuth2] Token armazenado em memória");

    Ok(render_success_page(&preview))
}

/// GET /get-token
///
/// Troca manual usando o authorization code de uso único da configuração
pub async fn handle_manual_exchange(
    State(oauth_state): State<Arc<OAuth2State>>,
) -> AppResult<Json<Value>> {
    log_request_received("/get-token", "GET");

    let code = oauth_state
        .client
        .config()
        .auth_code
        .clone()
        .ok_or_else(|| {
            AppError::ConfigError(
                "ZOHO_AUTH_CODE não configurado. Use /auth para o fluxo interativo.".to_string(),
            )
        })?;

    let token = oauth_state.client.exchange_authorization_code(&code).await?;
    let response = token_response_body(&token.value, token.source.as_str());
    oauth_state.token_store.set(token).await;

    Ok(Json(response))
}

/// GET /refresh-token
///
/// Troca repetível usando o refresh token da configuração. Cada chamada
/// sobrescreve o token corrente com um token novo do provedor.
pub async fn handle_refresh_token(
    State(oauth_state): State<Arc<OAuth2State>>,
) -> AppResult<Json<Value>> {
    log_request_received("/refresh-token", "GET");

    let refresh_token = oauth_state
        .client
        .config()
        .refresh_token
        .clone()
        .ok_or_else(|| {
            AppError::ConfigError("ZOHO_REFRESH_TOKEN não configurado".to_string())
        })?;

    let token = oauth_state.client.exchange_refresh_token(&refresh_token).await?;
    let response = token_response_body(&token.value, token.source.as_str());
    oauth_state.token_store.set(token).await;

    Ok(Json(response))
}

fn token_response_body(access_token: &str, source: &str) -> Value {
    json!({
        "status": "success",
        "access_token": access_token,
        "source": source,
        "timestamp": chrono::Utc::now().to_rfc3339()
    })
}

/// Renderizar página de sucesso
fn render_success_page(token_preview: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Zoho OAuth - Sucesso</title>
    <meta charset="UTF-8">
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Arial, sans-serif;
               max-width: 600px; margin: 50px auto; padding: 20px; background: #f5f5f5; }}
        .container {{ background: white; padding: 30px; border-radius: 12px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }}
        .success {{ background: #d4edda; border: 2px solid #28a745; padding: 20px; border-radius: 8px; }}
        h1 {{ color: #28a745; margin-top: 0; }}
        code {{ background: #f8f9fa; padding: 2px 6px; border-radius: 4px; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="success">
            <h1>✅ Autorização OAuth2 Concluída!</h1>
            <p>Token armazenado em memória: <code>{}...</code></p>
            <p>O middleware já pode chamar <code>/fetch-data</code>. Você pode fechar esta janela.</p>
        </div>
    </div>
</body>
</html>
"#,
        token_preview
    ))
}

/// Renderizar página de erro
fn render_error_page(error: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Zoho OAuth - Erro</title>
    <meta charset="UTF-8">
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Arial, sans-serif;
               max-width: 600px; margin: 50px auto; padding: 20px; background: #f5f5f5; }}
        .container {{ background: white; padding: 30px; border-radius: 12px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }}
        .error {{ background: #f8d7da; border: 2px solid #dc3545; padding: 20px; border-radius: 8px; }}
        h1 {{ color: #721c24; margin-top: 0; }}
        a {{ color: #007bff; text-decoration: none; font-weight: bold; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="error">
            <h1>❌ Erro na Autorização</h1>
            <p><strong>Erro:</strong> {}</p>
            <p><a href="/auth">← Tentar novamente</a></p>
        </div>
    </div>
</body>
</html>
"#,
        error
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn oauth_state_for(
        server: &MockServer,
        auth_code: Option<&str>,
        refresh_token: Option<&str>,
    ) -> Arc<OAuth2State> {
        let config = OAuth2Config {
            client_id: "test_client_id".to_string(),
            client_secret: "test_secret".to_string(),
            redirect_uri: "https://example.com/oauth/callback".to_string(),
            accounts_base_url: server.base_url(),
            auth_code: auth_code.map(String::from),
            refresh_token: refresh_token.map(String::from),
        };
        Arc::new(OAuth2State::new(config, Arc::new(TokenStore::new())))
    }

    #[tokio::test]
    async fn test_refresh_endpoint_caches_token_on_success() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/oauth/v2/token")
                .body_contains("grant_type=refresh_token");
            then.status(200)
                .json_body(json!({"access_token": "novo_token"}));
        });

        let oauth_state = oauth_state_for(&server, None, Some("refresh_1"));
        let response = handle_refresh_token(State(oauth_state.clone())).await.unwrap();

        assert_eq!(response.0["access_token"], "novo_token");
        assert_eq!(response.0["source"], "refresh_token");

        let cached = oauth_state.token_store.current().await.unwrap();
        assert_eq!(cached.value, "novo_token");
    }

    #[tokio::test]
    async fn test_failed_refresh_leaves_store_empty() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/oauth/v2/token");
            then.status(200).json_body(json!({"error": "invalid_code"}));
        });

        let oauth_state = oauth_state_for(&server, None, Some("ruim"));
        let err = handle_refresh_token(State(oauth_state.clone()))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Auth(_)));
        assert!(!oauth_state.token_store.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_refresh_endpoint_without_credential_is_config_error() {
        let server = MockServer::start();
        let oauth_state = oauth_state_for(&server, None, None);

        let err = handle_refresh_token(State(oauth_state)).await.unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_callback_without_code_is_validation_error() {
        let server = MockServer::start();
        let oauth_state = oauth_state_for(&server, None, None);

        let params = OAuthCallbackParams {
            code: None,
            error: None,
        };
        let err = handle_oauth_callback(State(oauth_state), Query(params))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_manual_exchange_uses_configured_code() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/oauth/v2/token")
                .body_contains("grant_type=authorization_code")
                .body_contains("code=code_da_config");
            then.status(200)
                .json_body(json!({"access_token": "tok_code"}));
        });

        let oauth_state = oauth_state_for(&server, Some("code_da_config"), None);
        let response = handle_manual_exchange(State(oauth_state.clone())).await.unwrap();

        mock.assert();
        assert_eq!(response.0["access_token"], "tok_code");
        assert_eq!(response.0["source"], "authorization_code");
        assert!(oauth_state.token_store.is_authenticated().await);
    }
}
