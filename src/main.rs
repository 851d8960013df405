/// Zoho Sheet Middleware
///
/// Um único servidor configurável no lugar das variantes copy-paste do
/// protótipo original: a estratégia de busca (scrape da página publicada
/// ou API REST autenticada) é escolhida no startup, e os endpoints OAuth2
/// só são montados quando há credenciais configuradas.
use anyhow::Context;
use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use zoho_sheet_middleware::{
    auth::{
        handle_manual_exchange, handle_oauth_callback, handle_refresh_token, start_oauth_flow,
        OAuth2Config, OAuth2State, TokenStore,
    },
    config::Settings,
    handlers::{handle_fetch_data, health_check, root},
    services::SheetFetcher,
    utils::logging::*,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Carregar variáveis de ambiente do arquivo .env (se existir).
    // O .env pode definir RUST_LOG, então carrega antes do subscriber;
    // o log do resultado só sai depois do init.
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    // Inicializar tracing
    tracing_subscriber::fmt::init();

    if !dotenv_loaded {
        // Em produção não existe .env - variáveis vêm do ambiente
        tracing::debug!("Arquivo .env não encontrado - usando variáveis de ambiente do sistema");
    }

    // Carregar configurações
    let settings = Settings::new().context("Failed to load settings")?;

    log_config_loaded(&std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string()));

    // Resolver a estratégia uma única vez; valor inválido aborta o startup
    let strategy = settings
        .fetch_strategy()
        .context("Invalid fetch strategy")?;
    log_info(&format!("📋 Fetch strategy: {:?}", strategy));

    // Token store explícito e compartilhado (sem estado global)
    let token_store = Arc::new(TokenStore::new());

    let fetcher = SheetFetcher::new(settings.zoho.clone(), strategy);

    let app_state = Arc::new(AppState {
        settings: settings.clone(),
        token_store: token_store.clone(),
        fetcher,
    });

    // Rotas base
    let mut app = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/fetch-data", get(handle_fetch_data).post(handle_fetch_data))
        .with_state(app_state);

    // Rotas OAuth2, apenas se as credenciais estiverem configuradas
    match OAuth2Config::from_settings(&settings.zoho) {
        Ok(oauth_config) => {
            log_info("✅ OAuth2 endpoints enabled: /auth, /oauth/callback, /get-token, /refresh-token");

            let oauth_state = Arc::new(OAuth2State::new(oauth_config, token_store));
            let oauth_router = Router::new()
                .route("/auth", get(start_oauth_flow))
                .route("/oauth/callback", get(handle_oauth_callback))
                .route("/get-token", get(handle_manual_exchange))
                .route("/refresh-token", get(handle_refresh_token))
                .with_state(oauth_state);

            app = app.merge(oauth_router);
        }
        Err(e) => {
            log_warning(&format!(
                "⚠️  OAuth2 endpoints disabled ({}). Apenas a estratégia scrape funcionará.",
                e
            ));
        }
    }

    // CORS liberado como no serviço original
    let app = app.layer(CorsLayer::permissive());

    // Em cloud, usar a variável de ambiente PORT
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(settings.server.port);
    let listener = TcpListener::bind(format!("{}:{}", settings.server.host, port)).await?;

    log_server_startup(port);
    log_server_ready(port);

    // Graceful shutdown com signal handling
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log_info("🛑 Server shut down gracefully");
    Ok(())
}

/// Signal handler para graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log_info("🛑 Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            log_info("🛑 Received SIGTERM, shutting down gracefully...");
        }
    }
}
