//! # Zoho OAuth2 Authentication Module
//!
//! Módulo isolado para gerenciar autenticação OAuth2 com a API do Zoho Sheet.
//!
//! ## Responsabilidades:
//! - Iniciar fluxo OAuth2 (authorization URL)
//! - Trocar authorization code por access token
//! - Trocar refresh token por um novo access token (repetível)
//! - Guardar o token corrente em memória (sem expiry, refresh manual)
//!
//! ## Estrutura:
//! - `config.rs`: Configurações OAuth2
//! - `client.rs`: Cliente HTTP OAuth2
//! - `token_store.rs`: Armazenamento do token em memória
//! - `handlers.rs`: Handlers HTTP (auth, callback, get-token, refresh-token)

pub mod client;
pub mod config;
pub mod handlers;
pub mod token_store;

pub use client::OAuth2Client;
pub use config::OAuth2Config;
pub use handlers::{
    handle_manual_exchange, handle_oauth_callback, handle_refresh_token, start_oauth_flow,
    OAuth2State,
};
pub use token_store::{AccessToken, TokenSource, TokenStore};
